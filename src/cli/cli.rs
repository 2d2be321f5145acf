use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::application::data::LogLevel;

/// Rebuild a directory tree from a shell session log and query its sizes.
#[derive(Parser, Debug, Clone)]
#[command(version)]
pub struct Cli {
    /// Session log to replay
    pub log: PathBuf,
    #[clap(long, short, default_value = "warn", value_enum)]
    pub log_level: LogLevel,

    /// Query configuration file. Defaults to ./dirlog.yaml when present
    #[clap(long, short)]
    pub config: Option<PathBuf>,

    /// Fail when the log holds malformed, conflicting or unreachable records
    #[clap(long)]
    pub strict: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Default, PartialEq, Eq)]
pub enum Command {
    /// Sum the sizes of every directory no larger than a threshold
    SumUnder {
        #[clap(long, short)]
        threshold: Option<u64>,
    },
    /// Find the smallest directory whose deletion frees enough space
    Free {
        #[clap(long)]
        capacity: Option<u64>,
        #[clap(long)]
        required: Option<u64>,
    },
    /// Print the rebuilt tree with aggregate sizes
    Tree {
        #[clap(long, short)]
        depth: Option<usize>,
    },
    /// Answer both size queries
    #[default]
    Summary,
}
