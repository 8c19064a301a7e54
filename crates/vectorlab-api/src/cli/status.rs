//! System status dashboard command.

use anyhow::Result;
use console::style;

use vectorlab_core::embedding::{Embedder, TitleSummarizer};
use vectorlab_core::store::SchemaManager;
use vectorlab_infra::pg::connection_target;

use super::Output;
use crate::state::AppState;

/// Display connectivity, provider and table status.
///
/// Database problems are reported, not returned as errors.
pub async fn status(state: &AppState, out: Output) -> Result<()> {
    let db = &state.config.database;
    let target = connection_target(db)?;
    let version = state.db_pool.server_version().await;
    let stats = match &version {
        Ok(_) => Some(state.schema.stats().await),
        Err(_) => None,
    };

    if out.json {
        let status = serde_json::json!({
            "version": env!("CARGO_PKG_VERSION"),
            "database": {
                "target": target,
                "table": db.table,
                "metric": db.metric.to_string(),
                "connected": version.is_ok(),
                "server_version": version.as_ref().ok(),
                "error": version.as_ref().err().map(|e| e.to_string()),
            },
            "embedding": {
                "provider": state.embedder.provider_name(),
                "model": state.embedder.model_name(),
                "dimension": state.embedder.dimension(),
                "title_model": state.titles.model_name(),
            },
            "stats": stats.as_ref().and_then(|s| s.as_ref().ok()),
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} vectorlab v{}",
        style("⚡").bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!();

    println!("  {}", style("── Database ──").dim());
    match &version {
        Ok(v) => println!(
            "  {} PostgreSQL {} at {}",
            style("✓").green(),
            v,
            target
        ),
        Err(e) => println!("  {} {} ({})", style("✗").red(), e, target),
    }
    println!("  Table:  {}", style(&db.table).cyan());
    println!("  Metric: {} ({})", db.metric, db.metric.operator());
    println!();

    println!("  {}", style("── Embeddings ──").dim());
    println!(
        "  Provider:    {}",
        style(state.embedder.provider_name()).bold()
    );
    println!("  Model:       {}", state.embedder.model_name());
    println!("  Dimension:   {}", state.embedder.dimension());
    println!("  Title model: {}", state.titles.model_name());
    println!();

    if let Some(stats) = stats {
        println!("  {}", style("── Data ──").dim());
        match stats {
            Ok(stats) => {
                println!("  Rows:          {}", style(stats.row_count).bold());
                let vector_indexes: Vec<_> = stats
                    .vector_indexes()
                    .map(|i| format!("{} ({}, {})", i.name, i.kind, i.size))
                    .collect();
                if vector_indexes.is_empty() {
                    println!("  Vector index:  {}", style("none").yellow());
                } else {
                    for index in vector_indexes {
                        println!("  Vector index:  {index}");
                    }
                }
            }
            Err(e) => println!("  {} {}", style("✗").red(), e),
        }
        println!();
    }

    Ok(())
}
