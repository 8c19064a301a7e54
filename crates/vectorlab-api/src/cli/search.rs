//! `vlab search`: similarity and hybrid search.

use anyhow::{Context, Result};
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use vectorlab_core::embedding::Embedder;
use vectorlab_core::store::ConversationStore;
use vectorlab_types::search::{HybridHit, SimilarHit};

use super::{Output, snippet};
use crate::state::AppState;

/// Results of one search, either kind.
pub enum SearchResults {
    Similar(Vec<SimilarHit>),
    Hybrid(Vec<HybridHit>),
}

impl SearchResults {
    pub fn len(&self) -> usize {
        match self {
            SearchResults::Similar(hits) => hits.len(),
            SearchResults::Hybrid(hits) => hits.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Embed `query` and run the requested search.
pub async fn run_search(
    state: &AppState,
    query: &str,
    limit: usize,
    hybrid: bool,
) -> Result<SearchResults> {
    let embedding = state
        .embedder
        .embed(query)
        .await
        .context("failed to embed query")?;

    Ok(if hybrid {
        SearchResults::Hybrid(state.store.search_hybrid(&embedding, query, limit).await?)
    } else {
        SearchResults::Similar(state.store.search_similar(&embedding, limit).await?)
    })
}

pub async fn search(
    state: &AppState,
    query: &str,
    limit: usize,
    hybrid: bool,
    out: Output,
) -> Result<()> {
    let results = run_search(state, query, limit, hybrid).await?;

    if out.json {
        let json = match &results {
            SearchResults::Similar(hits) => serde_json::to_string_pretty(hits)?,
            SearchResults::Hybrid(hits) => serde_json::to_string_pretty(hits)?,
        };
        println!("{json}");
        return Ok(());
    }

    print_results(&results, query);
    Ok(())
}

/// Styled table output; shared with the interactive shell.
pub fn print_results(results: &SearchResults, query: &str) {
    if results.is_empty() {
        println!();
        println!(
            "  {} No conversations matched '{}'.",
            style("i").blue().bold(),
            style(query).yellow()
        );
        println!();
        return;
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    match results {
        SearchResults::Similar(hits) => {
            table.set_header(vec![
                Cell::new("#").fg(Color::White),
                Cell::new("Distance").fg(Color::White),
                Cell::new("User").fg(Color::White),
                Cell::new("Title").fg(Color::White),
                Cell::new("Conversation").fg(Color::White),
            ]);
            for (i, hit) in hits.iter().enumerate() {
                table.add_row(vec![
                    Cell::new(i + 1).fg(Color::DarkGrey),
                    Cell::new(format!("{:.4}", hit.distance)).fg(Color::Cyan),
                    Cell::new(&hit.username),
                    Cell::new(hit.title.as_deref().unwrap_or("-")),
                    Cell::new(snippet(&hit.content, 60)),
                ]);
            }
        }
        SearchResults::Hybrid(hits) => {
            table.set_header(vec![
                Cell::new("#").fg(Color::White),
                Cell::new("Rank").fg(Color::White),
                Cell::new("Distance").fg(Color::White),
                Cell::new("Match").fg(Color::White),
                Cell::new("User").fg(Color::White),
                Cell::new("Title").fg(Color::White),
                Cell::new("Conversation").fg(Color::White),
            ]);
            for (i, hit) in hits.iter().enumerate() {
                let matched = if hit.text_match {
                    Cell::new("text").fg(Color::Green)
                } else {
                    Cell::new("vector").fg(Color::DarkGrey)
                };
                table.add_row(vec![
                    Cell::new(i + 1).fg(Color::DarkGrey),
                    Cell::new(format!("{:.4}", hit.rank)).fg(Color::Cyan),
                    Cell::new(format!("{:.4}", hit.distance)),
                    matched,
                    Cell::new(&hit.username),
                    Cell::new(hit.title.as_deref().unwrap_or("-")),
                    Cell::new(snippet(&hit.content, 50)),
                ]);
            }
        }
    }

    println!();
    println!("{table}");
    println!();
    println!(
        "  {} result{}",
        style(results.len()).bold(),
        if results.len() == 1 { "" } else { "s" }
    );
    println!();
}
