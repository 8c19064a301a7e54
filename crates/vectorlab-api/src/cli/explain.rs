//! `vlab explain`: query plans, to see whether an index is used.

use anyhow::{Context, Result};
use console::style;

use vectorlab_core::embedding::Embedder;
use vectorlab_core::store::ConversationStore;
use vectorlab_types::search::DistanceMetric;

use super::Output;
use crate::state::AppState;

/// What to explain.
pub enum ExplainTarget<'a> {
    Sql(&'a str),
    /// The similarity query for `query`; `metric` defaults to the store's.
    Text {
        query: &'a str,
        limit: usize,
        metric: Option<DistanceMetric>,
    },
}

/// Plan text for `target`. Database errors come back inside the plan string.
pub async fn plan_for(state: &AppState, target: ExplainTarget<'_>) -> Result<String> {
    match target {
        ExplainTarget::Sql(sql) => Ok(state.store.explain(sql).await),
        ExplainTarget::Text {
            query,
            limit,
            metric,
        } => {
            let embedding = state
                .embedder
                .embed(query)
                .await
                .context("failed to embed query")?;
            let metric = metric.unwrap_or_else(|| state.store.metric());
            Ok(state
                .store
                .explain_similarity(&embedding, limit, metric)
                .await?)
        }
    }
}

pub async fn explain(state: &AppState, target: ExplainTarget<'_>, out: Output) -> Result<()> {
    let plan = plan_for(state, target).await?;

    if out.json {
        println!("{}", serde_json::json!({ "plan": plan }));
        return Ok(());
    }
    print_plan(&plan);
    Ok(())
}

/// Print a plan, highlighting index usage.
pub fn print_plan(plan: &str) {
    println!();
    if plan.starts_with("Error:") {
        println!("  {}", style(plan).red());
        println!();
        return;
    }
    for line in plan.lines() {
        if line.contains("Index Scan") {
            println!("  {}", style(line).green());
        } else if line.contains("Seq Scan") {
            println!("  {}", style(line).yellow());
        } else {
            println!("  {line}");
        }
    }
    println!();
}
