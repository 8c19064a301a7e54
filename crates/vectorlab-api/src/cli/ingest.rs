//! `vlab ingest`: CSV -> titles -> embeddings -> PostgreSQL.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tokio_util::sync::CancellationToken;

use vectorlab_core::ingest::IngestPipeline;
use vectorlab_infra::source::CsvRecordSource;
use vectorlab_types::error::IngestError;
use vectorlab_types::ingest::{IngestPhase, IngestProgress};

use super::Output;
use crate::state::AppState;

/// Ingest `path`, cancelling cleanly on Ctrl+C.
pub async fn ingest(
    state: &AppState,
    path: &Path,
    batch_size: usize,
    no_titles: bool,
    out: Output,
) -> Result<()> {
    let source = CsvRecordSource::open(path)
        .with_context(|| format!("cannot read {}", path.display()))?;

    let cancel = CancellationToken::new();
    let ctrl_c = tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        }
    });

    let spinner = if out.styled() {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
        spinner.enable_steady_tick(Duration::from_millis(80));
        spinner
    } else {
        ProgressBar::hidden()
    };
    spinner.set_message(format!("Reading {}...", path.display()));

    let titles = (!no_titles).then_some(&state.titles);
    let pipeline = IngestPipeline::new(&state.schema, &state.store, &state.embedder)
        .with_titles(titles)
        .with_cancellation(cancel);

    let mut last = None;
    let result = pipeline
        .ingest(source, batch_size, |progress| {
            spinner.set_message(progress_message(&progress));
            last = Some(progress);
        })
        .await;

    ctrl_c.abort();
    spinner.finish_and_clear();

    match result {
        Ok(count) => {
            if out.json {
                println!(
                    "{}",
                    serde_json::json!({"file": path.display().to_string(), "inserted": count})
                );
            } else if !out.quiet {
                println!();
                println!(
                    "  {} Ingested {} conversation{} from {}",
                    style("✓").green().bold(),
                    style(count).bold(),
                    if count == 1 { "" } else { "s" },
                    style(path.display()).dim()
                );
                println!();
            }
            Ok(())
        }
        Err(err) => {
            let inserted = last.map(|p| p.inserted).unwrap_or(0);
            if out.json {
                println!(
                    "{}",
                    serde_json::json!({
                        "file": path.display().to_string(),
                        "inserted": inserted,
                        "error": err.to_string(),
                    })
                );
            } else if !matches!(err, IngestError::InvalidBatchSize) {
                eprintln!(
                    "  {} {} record{} stored before the run stopped",
                    style("!").yellow().bold(),
                    inserted,
                    if inserted == 1 { " was" } else { "s were" }
                );
            }
            Err(err).context("ingestion failed")
        }
    }
}

fn progress_message(progress: &IngestProgress) -> String {
    match progress.phase {
        IngestPhase::Opened => "Preparing schema...".to_string(),
        IngestPhase::Reading => format!("Reading batch {}...", progress.batch + 1),
        IngestPhase::Completed | IngestPhase::Failed | IngestPhase::Cancelled => {
            format!("{} ({} inserted)", progress.phase, progress.inserted)
        }
        phase => format!(
            "Batch {} · record {} · {} · {} inserted",
            progress.batch, progress.record, phase, progress.inserted
        ),
    }
}
