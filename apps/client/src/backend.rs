use crate::error::{Result, WrapErr};
use rpc::DocsSearchClient;
use search_core::rpc_compat::RemoteBackend;
use search_core::{Error, FsContentStore, SearchBackend, SearchConfig, SearchEngine};
use std::path::Path;
use std::sync::Arc;
use tarpc::{client, context, tokio_serde::formats::Bincode};
use tracing::info;

/// Connects to a running server over its unix socket.
pub async fn connect(unix_socket_path: &Path) -> Result<Arc<dyn SearchBackend>> {
    let mut transport = tarpc::serde_transport::unix::connect(unix_socket_path, Bincode::default);
    transport.config_mut().max_frame_length(usize::MAX);
    let transport = transport
        .await
        .with_context(|| format!("Could not connect to {unix_socket_path:?}"))?;

    let client = DocsSearchClient::new(client::Config::default(), transport).spawn();
    let pong = client.ping(context::current()).await?;
    info!("connected to search server ({})", pong);

    Ok(Arc::new(RemoteBackend::new(move |query: String| {
        let client = client.clone();
        async move {
            client
                .search(context::current(), Some(query))
                .await
                .map_err(|e| Error::Backend(e.to_string()))
        }
    })))
}

/// Searches `content_root` in-process, reloading it for every query.
pub fn local(content_root: &Path, search_config: Option<&Path>) -> Result<Arc<dyn SearchBackend>> {
    let config = match search_config {
        Some(path) => SearchConfig::load_from_file(path)
            .with_context(|| format!("Invalid search config {path:?}"))?,
        None => SearchConfig::default(),
    };
    let store = FsContentStore::new(content_root);
    Ok(Arc::new(SearchEngine::new(Arc::new(store), config)))
}
