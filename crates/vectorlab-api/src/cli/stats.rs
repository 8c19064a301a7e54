//! `vlab stats`: row count and index sizes.

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use vectorlab_core::store::SchemaManager;
use vectorlab_types::index::{IndexKind, SchemaStats};

use super::Output;
use crate::state::AppState;

pub async fn stats(state: &AppState, out: Output) -> Result<()> {
    let stats = state.schema.stats().await?;

    if out.json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }
    print_stats(&stats, state.schema.table());
    Ok(())
}

pub fn print_stats(stats: &SchemaStats, table_name: &str) {
    println!();
    println!(
        "  {} {} rows in {}",
        style("▸").cyan().bold(),
        style(stats.row_count).bold(),
        style(table_name).cyan()
    );

    if stats.indexes.is_empty() {
        println!();
        println!(
            "  {} No indexes yet. Run: {}",
            style("i").blue().bold(),
            style("vlab ingest <csv>").yellow()
        );
        println!();
        return;
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Index").fg(Color::White),
        Cell::new("Type").fg(Color::White),
        Cell::new("Size").fg(Color::White),
    ]);

    for index in &stats.indexes {
        let kind = match index.kind {
            IndexKind::Hnsw => Cell::new("hnsw").fg(Color::Green),
            IndexKind::IvfFlat => Cell::new("ivfflat").fg(Color::Cyan),
            IndexKind::Other => Cell::new("other").fg(Color::DarkGrey),
        };
        table.add_row(vec![Cell::new(&index.name), kind, Cell::new(&index.size)]);
    }

    println!();
    println!("{table}");
    println!();
}
