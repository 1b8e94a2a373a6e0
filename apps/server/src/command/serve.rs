use super::Command;
use crate::config::Config;
use crate::error::{Result, WrapErr};
use crate::http;
use futures::{future, prelude::*};
use std::fs;
use std::sync::Arc;
use tracing::info;

use rpc::{DocsSearch, search::SearchResponse};
use tarpc::{
    context::Context,
    server::{self, Channel},
    tokio_serde::formats::Bincode,
};

use search_core::{SearchEngine, rpc_compat};

async fn spawn(fut: impl Future<Output = ()> + Send + 'static) {
    tokio::spawn(fut);
}

#[derive(Clone)]
struct Server {
    engine: Arc<SearchEngine>,
}

impl DocsSearch for Server {
    async fn ping(self, _c: Context) -> String {
        "Pong".to_string()
    }

    async fn search(self, _c: Context, query: Option<String>) -> SearchResponse {
        info!("search request: {:?}", query);
        let engine = self.engine.clone();
        tokio::task::spawn_blocking(move || rpc_compat::search_response(&engine, query.as_deref()))
            .await
            .unwrap_or_else(|e| {
                tracing::error!("search task failed: {}", e);
                SearchResponse::Unavailable
            })
    }
}

pub struct ServeCommand {
    config: Config,
}

impl ServeCommand {
    pub fn new(cfg: Config) -> Self {
        Self { config: cfg }
    }
}

#[async_trait::async_trait]
impl Command for ServeCommand {
    async fn execute(&self) -> Result<()> {
        let unix_socket_path = self.config.socket_path();

        if let Some(parent) = unix_socket_path.parent() {
            fs::create_dir_all(parent)?;
        }

        if unix_socket_path.exists() {
            fs::remove_file(&unix_socket_path)?;
        }

        info!("content root {:?}, index policy {:?}", self.config.content_root, self.config.index_policy);
        let engine = Arc::new(self.config.engine().context("Failed to build the search index")?);

        let http_listener = tokio::net::TcpListener::bind(self.config.http_bind)
            .await
            .with_context(|| format!("Failed to bind {}", self.config.http_bind))?;
        info!("HTTP listening on http://{}", self.config.http_bind);
        let http_server = axum::serve(http_listener, http::router(engine.clone()));

        let mut listener = tarpc::serde_transport::unix::listen(&unix_socket_path, Bincode::default).await?;
        listener.config_mut().max_frame_length(usize::MAX);
        info!("RPC listening on {:?}", unix_socket_path);

        let server = Server { engine };
        let rpc_server = listener
            .filter_map(|r| future::ready(r.ok()))
            .map(server::BaseChannel::with_defaults)
            .map(|channel| {
                let server = server.clone();
                channel.execute(server.serve()).for_each(spawn)
            })
            .buffer_unordered(10)
            .for_each(|_| async {});

        let outcome = tokio::select! {
            result = http_server.into_future() => result.context("HTTP server stopped"),
            _ = rpc_server => Ok(()),
            _ = tokio::signal::ctrl_c() => {
                info!("shutting down");
                Ok(())
            }
        };

        if unix_socket_path.exists() {
            fs::remove_file(&unix_socket_path)?;
        }
        outcome
    }
}
