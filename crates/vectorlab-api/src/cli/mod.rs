//! CLI command definitions and dispatch for the `vlab` binary.
//!
//! Uses clap derive macros for argument parsing. Subcommands follow a
//! verb-noun pattern (e.g., `vlab index create hnsw`, `vlab index drop`).

pub mod explain;
pub mod index;
pub mod ingest;
pub mod search;
pub mod shell;
pub mod stats;
pub mod status;

use std::path::PathBuf;

use clap::{ArgGroup, Parser, Subcommand};
use clap_complete::Shell;

use vectorlab_core::ingest::DEFAULT_BATCH_SIZE;
use vectorlab_types::index::IndexSpec;
use vectorlab_types::search::DistanceMetric;

/// Learn PostgreSQL vector search hands-on.
#[derive(Parser)]
#[command(name = "vlab", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file (default: {config_dir}/vectorlab/config.toml).
    #[arg(long, global = true, env = "VECTORLAB_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Embed and store every conversation in a CSV file.
    Ingest {
        /// CSV with `username` and `session_content` columns.
        csv: PathBuf,

        /// Records per progress batch.
        #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
        batch_size: usize,

        /// Do not generate titles for records without one.
        #[arg(long)]
        no_titles: bool,
    },

    /// Find conversations similar to a piece of text.
    #[command(alias = "s")]
    Search {
        /// Query text; embedded with the configured provider.
        query: String,

        /// Maximum number of results.
        #[arg(short, long, default_value_t = 5)]
        limit: usize,

        /// Combine full-text ranking with vector distance.
        #[arg(long)]
        hybrid: bool,
    },

    /// Create or drop similarity indexes.
    Index {
        #[command(subcommand)]
        action: IndexCommand,
    },

    /// Show the execution plan for a query.
    #[command(group(ArgGroup::new("target").required(true).args(["sql", "text"])))]
    Explain {
        /// Raw SQL to explain (it is executed with ANALYZE).
        #[arg(long)]
        sql: Option<String>,

        /// Explain the similarity search for this text.
        #[arg(long)]
        text: Option<String>,

        /// LIMIT used with --text.
        #[arg(short, long, default_value_t = 5)]
        limit: usize,

        /// Distance metric for --text: cosine, l2 or inner (default: configured).
        #[arg(long, requires = "text")]
        metric: Option<DistanceMetric>,
    },

    /// Row count and index sizes.
    Stats,

    /// Connectivity, provider and table overview.
    Status,

    /// Interactive search shell.
    Shell,

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum IndexCommand {
    /// Build an alternate index (no-op if it already exists).
    Create {
        #[command(subcommand)]
        kind: CreateIndex,
    },

    /// Drop every similarity index on the table.
    Drop {
        /// Skip the confirmation prompt.
        #[arg(long)]
        force: bool,
    },
}

#[derive(Subcommand)]
pub enum CreateIndex {
    /// Graph index: fast, accurate, slower to build.
    Hnsw {
        /// Max connections per node.
        #[arg(long, default_value_t = IndexSpec::DEFAULT_CONNECTIONS_PER_NODE)]
        m: u32,

        /// Candidate list size while building.
        #[arg(long, default_value_t = IndexSpec::DEFAULT_BUILD_QUALITY)]
        ef_construction: u32,

        /// Distance metric: cosine, l2 or inner.
        #[arg(long, default_value = "cosine")]
        metric: DistanceMetric,
    },

    /// Inverted-list index: quick to build, needs data first.
    Ivfflat {
        /// Number of lists (clusters).
        #[arg(long, default_value_t = IndexSpec::DEFAULT_PARTITION_COUNT)]
        lists: u32,

        /// Distance metric: cosine, l2 or inner.
        #[arg(long, default_value = "cosine")]
        metric: DistanceMetric,
    },
}

impl CreateIndex {
    pub fn into_spec(self) -> IndexSpec {
        match self {
            CreateIndex::Hnsw {
                m,
                ef_construction,
                metric,
            } => IndexSpec::Hnsw {
                connections_per_node: m,
                build_quality: ef_construction,
                metric,
            },
            CreateIndex::Ivfflat { lists, metric } => IndexSpec::IvfFlat {
                partition_count: lists,
                metric,
            },
        }
    }
}

/// Global output flags threaded through every command.
#[derive(Debug, Clone, Copy)]
pub struct Output {
    pub json: bool,
    pub quiet: bool,
}

impl Output {
    /// Whether styled, human-oriented text should be printed.
    pub fn styled(&self) -> bool {
        !self.json && !self.quiet
    }
}

/// First `max` characters of `text` on one line, with an ellipsis if cut.
pub fn snippet(text: &str, max: usize) -> String {
    let flat: String = text
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    match flat.char_indices().nth(max.saturating_sub(3)) {
        Some((idx, _)) if flat.chars().count() > max => format!("{}...", &flat[..idx]),
        _ => flat,
    }
}
