use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(version, about = "Search service for the schema documentation site")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Increase verbosity. Can be used multiple times (e.g., -v, -vv, -vvv).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Content root holding schemas/, examples/ and docs/ (overrides the config file)
    #[arg(long, global = true)]
    pub content_root: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve search over HTTP and the local RPC socket
    Serve,
    /// Run one query and print the ranked results
    Search {
        query: String,
        /// Maximum number of results (defaults to the configured cap)
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Build the index and print what it contains
    Index,
    /// List the example documents
    Examples,
}
