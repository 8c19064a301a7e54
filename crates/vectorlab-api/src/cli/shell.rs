//! Interactive search shell (`vlab shell`).
//!
//! Input lines become [`Event`]s, [`reduce`] turns them into [`Effect`]s
//! while updating [`ShellState`], and the loop runner performs the effects.
//! Keeping the reducer pure makes the command handling testable without a
//! terminal, a database or a provider.

use anyhow::Result;
use console::style;
use rustyline_async::{Readline, ReadlineEvent};
use tokio::io::{AsyncBufReadExt, BufReader};

use super::explain::{ExplainTarget, plan_for, print_plan};
use super::search::{print_results, run_search};
use super::stats::print_stats;
use crate::state::AppState;
use vectorlab_core::store::SchemaManager;
use vectorlab_types::search::DistanceMetric;

const DEFAULT_LIMIT: usize = 5;
const MAX_LIMIT: usize = 100;

/// Session settings carried between lines.
#[derive(Debug, Clone, PartialEq)]
pub struct ShellState {
    pub limit: usize,
    pub hybrid: bool,
    pub running: bool,
}

impl Default for ShellState {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            hybrid: false,
            running: true,
        }
    }
}

/// Something the user did.
#[derive(Debug)]
pub enum Event {
    Line(String),
    Interrupted,
    Eof,
}

/// Something the loop must do in response.
#[derive(Debug, PartialEq)]
pub enum Effect {
    Search {
        query: String,
        hybrid: bool,
        limit: usize,
    },
    ExplainSql(String),
    ExplainText {
        query: String,
        limit: usize,
        metric: Option<DistanceMetric>,
    },
    Stats,
    Help,
    Print(String),
    Error(String),
    Exit,
}

/// Apply one event to the state.
///
/// Returns `None` when nothing needs doing (blank line).
pub fn reduce(state: &mut ShellState, event: Event) -> Option<Effect> {
    let line = match event {
        Event::Eof => {
            state.running = false;
            return Some(Effect::Exit);
        }
        Event::Interrupted => {
            return Some(Effect::Print(
                "Press Ctrl+D or type /quit to exit.".to_string(),
            ));
        }
        Event::Line(line) => line,
    };

    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }
    if !trimmed.starts_with('/') {
        return Some(Effect::Search {
            query: trimmed.to_string(),
            hybrid: state.hybrid,
            limit: state.limit,
        });
    }

    let (cmd, arg) = match trimmed.split_once(char::is_whitespace) {
        Some((cmd, arg)) => (cmd.to_lowercase(), arg.trim()),
        None => (trimmed.to_lowercase(), ""),
    };

    let effect = match cmd.as_str() {
        "/help" | "/h" | "/?" => Effect::Help,
        "/quit" | "/exit" | "/q" => {
            state.running = false;
            Effect::Exit
        }
        "/limit" => match arg.parse::<usize>() {
            Ok(n) if (1..=MAX_LIMIT).contains(&n) => {
                state.limit = n;
                Effect::Print(format!("Limit set to {n}."))
            }
            _ => Effect::Error(format!("/limit takes a number between 1 and {MAX_LIMIT}")),
        },
        "/hybrid" => {
            let next = match arg.to_lowercase().as_str() {
                "" => Some(!state.hybrid),
                "on" | "true" | "1" => Some(true),
                "off" | "false" | "0" => Some(false),
                _ => None,
            };
            match next {
                Some(hybrid) => {
                    state.hybrid = hybrid;
                    Effect::Print(format!(
                        "Hybrid search {}.",
                        if hybrid { "on" } else { "off" }
                    ))
                }
                None => Effect::Error("/hybrid takes on or off".to_string()),
            }
        }
        "/stats" => Effect::Stats,
        "/explain" if !arg.is_empty() => Effect::ExplainSql(arg.to_string()),
        "/explain" => Effect::Error("/explain requires a SQL query".to_string()),
        "/plan" => match parse_plan_args(arg) {
            Ok((metric, query)) => Effect::ExplainText {
                query: query.to_string(),
                limit: state.limit,
                metric,
            },
            Err(message) => Effect::Error(message),
        },
        other => Effect::Error(format!(
            "Unknown command: {other}. Type /help for available commands."
        )),
    };
    Some(effect)
}

/// Split `[--metric <m>] <text>` for `/plan`.
fn parse_plan_args(arg: &str) -> Result<(Option<DistanceMetric>, &str), String> {
    let (metric, query) = match arg.strip_prefix("--metric") {
        Some(rest) => {
            let rest = rest.trim_start();
            let (name, query) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
            let metric = name
                .parse::<DistanceMetric>()
                .map_err(|e| format!("/plan: {e} (use cosine, l2 or inner)"))?;
            (Some(metric), query.trim())
        }
        None => (None, arg),
    };
    if query.is_empty() {
        return Err("/plan requires query text".to_string());
    }
    Ok((metric, query))
}

/// Line source: a readline editor on a terminal, plain stdin otherwise.
enum ShellInput {
    Editor(Readline),
    Plain(tokio::io::Lines<BufReader<tokio::io::Stdin>>),
}

impl ShellInput {
    fn new() -> Self {
        match Readline::new(prompt()) {
            Ok((rl, _writer)) => ShellInput::Editor(rl),
            Err(e) => {
                tracing::debug!(error = %e, "readline unavailable, reading plain stdin");
                ShellInput::Plain(BufReader::new(tokio::io::stdin()).lines())
            }
        }
    }

    async fn next_event(&mut self) -> Event {
        match self {
            ShellInput::Editor(rl) => match rl.readline().await {
                Ok(ReadlineEvent::Line(line)) => {
                    rl.add_history_entry(line.clone());
                    Event::Line(line)
                }
                Ok(ReadlineEvent::Interrupted) => Event::Interrupted,
                Ok(ReadlineEvent::Eof) | Err(_) => Event::Eof,
            },
            ShellInput::Plain(lines) => match lines.next_line().await {
                Ok(Some(line)) => Event::Line(line),
                Ok(None) | Err(_) => Event::Eof,
            },
        }
    }
}

fn prompt() -> String {
    format!("{} ", style("vlab>").cyan().bold())
}

/// Run the shell until `/quit` or end of input.
pub async fn run_shell(state: &AppState) -> Result<()> {
    print_banner(state);

    let mut shell = ShellState::default();
    let mut input = ShellInput::new();

    while shell.running {
        let event = input.next_event().await;
        let Some(effect) = reduce(&mut shell, event) else {
            continue;
        };
        if let Err(e) = perform(state, effect).await {
            println!("\n  {} {e:#}\n", style("!").red().bold());
        }
    }

    println!("\n  {}", style("Session ended.").dim());
    Ok(())
}

async fn perform(state: &AppState, effect: Effect) -> Result<()> {
    match effect {
        Effect::Search {
            query,
            hybrid,
            limit,
        } => {
            let results = run_search(state, &query, limit, hybrid).await?;
            print_results(&results, &query);
        }
        Effect::ExplainSql(sql) => {
            let plan = plan_for(state, ExplainTarget::Sql(&sql)).await?;
            print_plan(&plan);
        }
        Effect::ExplainText {
            query,
            limit,
            metric,
        } => {
            let plan = plan_for(
                state,
                ExplainTarget::Text {
                    query: &query,
                    limit,
                    metric,
                },
            )
            .await?;
            print_plan(&plan);
        }
        Effect::Stats => {
            let stats = state.schema.stats().await?;
            print_stats(&stats, state.schema.table());
        }
        Effect::Help => print_help(),
        Effect::Print(message) => println!("  {}", style(message).dim()),
        Effect::Error(message) => println!("  {} {message}", style("?").yellow().bold()),
        Effect::Exit => {}
    }
    Ok(())
}

fn print_banner(state: &AppState) {
    println!();
    println!(
        "  {} vectorlab shell on {} ({})",
        style("⚡").bold(),
        style(state.schema.table()).cyan(),
        state.config.database.metric
    );
    println!(
        "  {}",
        style("Type text to search, /help for commands, Ctrl+D to exit.").dim()
    );
    println!();
}

fn print_help() {
    let commands = [
        ("<text>", "Similarity search (hybrid if enabled)"),
        ("/limit <n>", "Set the number of results"),
        ("/hybrid [on|off]", "Toggle hybrid search"),
        ("/plan [--metric m] <text>", "Execution plan of a similarity search"),
        ("/explain <sql>", "Execution plan of any query"),
        ("/stats", "Row count and indexes"),
        ("/help", "Show this help message"),
        ("/quit", "Leave the shell"),
    ];
    println!();
    println!("  {}", style("Available commands:").bold());
    println!();
    for (cmd, description) in commands {
        println!("  {:<26} {}", style(cmd).cyan(), description);
    }
    println!();
}
