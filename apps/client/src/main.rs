mod backend;
mod cli;
mod error;
mod search_box;

use clap::Parser;
use search_core::{SearchTrigger, TriggerEvent};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use search_box::SearchBox;

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> error::Result<()> {
    color_eyre::install()?;
    let cli = cli::Cli::parse();
    init_tracing(cli.verbose);

    let backend = match &cli.content_root {
        Some(root) => backend::local(root, cli.search_config.as_deref())?,
        None => {
            let socket = cli.socket.clone().unwrap_or_else(config::default_socket_path);
            backend::connect(&socket).await?
        }
    };
    let mut search_box = SearchBox::new(backend, Duration::from_millis(cli.debounce_ms));

    // Anything holding the trigger can open or close the box.
    let trigger = SearchTrigger::new();
    let (tx_event, mut rx_event) = mpsc::unbounded_channel();
    let _subscription = trigger.subscribe(move |event: &TriggerEvent| {
        let _ = tx_event.send(*event);
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match line.trim() {
                    ":quit" => break,
                    ":open" if search_box.is_open() => println!("Search is already open"),
                    ":open" => {
                        trigger.notify(&TriggerEvent::OpenSearch);
                    }
                    ":close" => {
                        trigger.notify(&TriggerEvent::CloseSearch);
                    }
                    _ => search_box.input(&line),
                }
            }
            Some(event) = rx_event.recv() => search_box.handle(event),
        }
    }

    search_box.close();
    Ok(())
}
