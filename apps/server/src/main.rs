mod cli;
mod command;
mod config;
mod error;
mod http;

use error::WrapErr;

use clap::CommandFactory;
use clap::Parser;
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> error::Result<()> {
    color_eyre::install()?;
    let command_line = cli::Cli::parse();
    init_tracing(command_line.verbose);

    let mut cfg = config::Config::load().context("Load configuration error")?;
    if let Some(content_root) = command_line.content_root {
        cfg.content_root = content_root;
    }

    if let Some(command) = command_line.command {
        let cmd: Box<dyn command::Command> = match command {
            cli::Commands::Serve => Box::new(command::ServeCommand::new(cfg)),
            cli::Commands::Search { query, limit } => {
                Box::new(command::SearchCommand::new(cfg, query, limit))
            }
            cli::Commands::Index => Box::new(command::IndexCommand::new(cfg)),
            cli::Commands::Examples => Box::new(command::ExamplesCommand::new(cfg)),
        };
        cmd.execute().await?;
    } else {
        cli::Cli::command().print_help()?;
    }

    Ok(())
}
