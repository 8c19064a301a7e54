//! vectorlab CLI entry point.
//!
//! Binary name: `vlab`
//!
//! Parses CLI arguments, resolves configuration, initializes tracing and the
//! database/provider state, then dispatches to the command handler.

mod cli;
mod state;

use anyhow::{Context, anyhow};
use clap::Parser;
use clap_complete::generate;

use cli::{Cli, Commands, IndexCommand, Output};
use state::AppState;
use vectorlab_observe::{TracingOptions, init_tracing, shutdown_tracing, verbosity_filter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Shell completions don't need config or state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "vlab", &mut std::io::stdout());
        return Ok(());
    }

    // Config warnings are emitted before the global subscriber exists.
    let config = {
        let _guard = vectorlab_observe::bootstrap_logging();
        vectorlab_infra::config::resolve_config(cli.config.as_deref())
            .await
            .context("invalid configuration")?
    };

    init_tracing(&TracingOptions {
        filter: verbosity_filter(cli.verbose, cli.quiet).to_string(),
        enable_otel: config.telemetry.enabled,
        service_name: config.telemetry.service_name.clone(),
    })
    .map_err(|e| anyhow!("failed to initialize tracing: {e}"))?;

    let result = run(cli, config).await;
    shutdown_tracing();
    result
}

async fn run(cli: Cli, config: vectorlab_types::config::AppConfig) -> anyhow::Result<()> {
    let out = Output {
        json: cli.json,
        quiet: cli.quiet,
    };

    if let Commands::Status = cli.command {
        let state = AppState::init_lazy(config)?;
        cli::status::status(&state, out).await?;
        state.db_pool.close().await;
        return Ok(());
    }

    let state = AppState::init(config).await?;

    let result = match cli.command {
        Commands::Ingest {
            csv,
            batch_size,
            no_titles,
        } => cli::ingest::ingest(&state, &csv, batch_size, no_titles, out).await,

        Commands::Search {
            query,
            limit,
            hybrid,
        } => cli::search::search(&state, &query, limit, hybrid, out).await,

        Commands::Index { action } => match action {
            IndexCommand::Create { kind } => {
                cli::index::create_index(&state, kind.into_spec(), out).await
            }
            IndexCommand::Drop { force } => cli::index::drop_indexes(&state, force, out).await,
        },

        Commands::Explain {
            sql,
            text,
            limit,
            metric,
        } => {
            let target = match (&sql, &text) {
                (Some(sql), _) => cli::explain::ExplainTarget::Sql(sql),
                (None, Some(query)) => cli::explain::ExplainTarget::Text {
                    query,
                    limit,
                    metric,
                },
                (None, None) => return Err(anyhow!("either --sql or --text is required")),
            };
            cli::explain::explain(&state, target, out).await
        }

        Commands::Stats => cli::stats::stats(&state, out).await,

        Commands::Shell => cli::shell::run_shell(&state).await,

        Commands::Status | Commands::Completions { .. } => unreachable!("handled above"),
    };

    state.db_pool.close().await;
    result
}
