use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// Interactive search box. Each line read from stdin is the current text of
/// the box; `:open`, `:close` and `:quit` control it.
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Cli {
    /// RPC socket of a running server (defaults to the runtime directory)
    #[arg(long, conflicts_with = "content_root")]
    pub socket: Option<PathBuf>,

    /// Search this content root in-process instead of asking a server
    #[arg(long)]
    pub content_root: Option<PathBuf>,

    /// Search settings (TOML) for the in-process engine
    #[arg(long, requires = "content_root")]
    pub search_config: Option<PathBuf>,

    /// Delay after the last keystroke before querying
    #[arg(long, default_value_t = 300)]
    pub debounce_ms: u64,

    /// Increase verbosity. Can be used multiple times (e.g., -v, -vv, -vvv).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}
