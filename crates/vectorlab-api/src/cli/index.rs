//! `vlab index create|drop`.

use anyhow::Result;
use console::style;
use dialoguer::Confirm;

use vectorlab_core::store::SchemaManager;
use vectorlab_types::index::IndexSpec;

use super::Output;
use crate::state::AppState;

pub async fn create_index(state: &AppState, spec: IndexSpec, out: Output) -> Result<()> {
    let descriptor = state.schema.create_index(&spec).await?;

    if out.json {
        println!("{}", serde_json::to_string_pretty(&descriptor)?);
    } else if !out.quiet {
        let mark = if descriptor.created {
            style("✓").green().bold()
        } else {
            style("=").yellow().bold()
        };
        println!();
        println!("  {mark} {descriptor}");
        println!();
    }
    Ok(())
}

/// Drop all similarity indexes, asking first unless `force` (or `--json`).
pub async fn drop_indexes(state: &AppState, force: bool, out: Output) -> Result<()> {
    if !force && !out.json {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Drop every similarity index on '{}'? Searches fall back to sequential scans.",
                style(state.schema.table()).red().bold()
            ))
            .default(false)
            .interact()?;

        if !confirmed {
            println!("  Cancelled.");
            return Ok(());
        }
    }

    state.schema.drop_indexes().await?;

    if out.json {
        println!(
            "{}",
            serde_json::json!({"dropped": true, "table": state.schema.table()})
        );
    } else if !out.quiet {
        println!(
            "  {} Similarity indexes on '{}' dropped.",
            style("✓").red().bold(),
            state.schema.table()
        );
    }
    Ok(())
}
