// search-core/src/rpc_compat.rs
//! RPC 适配层 - 在 rpc crate 的类型与内部类型之间转换

use async_trait::async_trait;
use rpc::search::{HitKind, SearchHit, SearchResponse};

use crate::error::{Error, Result};
use crate::models::{ItemKind, RankedResult};
use crate::session::SearchBackend;
use crate::SearchEngine;

impl From<ItemKind> for HitKind {
    fn from(kind: ItemKind) -> Self {
        match kind {
            ItemKind::Schema => HitKind::Schema,
            ItemKind::Example => HitKind::Example,
            ItemKind::Doc => HitKind::Doc,
        }
    }
}

impl From<HitKind> for ItemKind {
    fn from(kind: HitKind) -> Self {
        match kind {
            HitKind::Schema => ItemKind::Schema,
            HitKind::Example => ItemKind::Example,
            HitKind::Doc => ItemKind::Doc,
        }
    }
}

impl From<RankedResult> for SearchHit {
    fn from(result: RankedResult) -> Self {
        Self {
            kind: result.kind.into(),
            title: result.title,
            description: result.description,
            href: result.href,
        }
    }
}

impl From<SearchHit> for RankedResult {
    fn from(hit: SearchHit) -> Self {
        Self {
            kind: hit.kind.into(),
            title: hit.title,
            description: hit.description,
            href: hit.href,
        }
    }
}

/// Answers an RPC search request. Load failures are logged, not forwarded.
pub fn search_response(engine: &SearchEngine, query: Option<&str>) -> SearchResponse {
    let query = query.unwrap_or_default();
    match engine.query_top(query) {
        Ok(results) => SearchResponse::Results(results.into_iter().map(SearchHit::from).collect()),
        Err(e) => {
            tracing::error!("search for {:?} failed: {}", query, e);
            SearchResponse::Unavailable
        }
    }
}

/// Unwraps a response received over RPC.
pub fn into_results(response: SearchResponse) -> Result<Vec<RankedResult>> {
    match response {
        SearchResponse::Results(hits) => Ok(hits.into_iter().map(RankedResult::from).collect()),
        SearchResponse::Unavailable => Err(Error::Backend("search unavailable".into())),
    }
}

/// A backend that answers by calling `search` on a remote service.
pub struct RemoteBackend<F> {
    call: F,
}

impl<F> RemoteBackend<F> {
    pub fn new(call: F) -> Self {
        Self { call }
    }
}

#[async_trait]
impl<F, Fut> SearchBackend for RemoteBackend<F>
where
    F: Fn(String) -> Fut + Send + Sync,
    Fut: std::future::Future<Output = Result<SearchResponse>> + Send,
{
    async fn search(&self, query: &str) -> Result<Vec<RankedResult>> {
        into_results((self.call)(query.to_string()).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::MemoryContentStore;
    use crate::models::DocRecord;
    use crate::SearchConfig;
    use serde_json::Map;
    use std::sync::Arc;

    fn engine() -> SearchEngine {
        let store = MemoryContentStore::new().with_doc(DocRecord {
            slug: "getting-started".into(),
            title: "Getting Started".into(),
            front_matter: Map::new(),
            body_text: "Install the tools".into(),
        });
        SearchEngine::new(Arc::new(store), SearchConfig::default())
    }

    #[test]
    fn test_search_response() {
        let SearchResponse::Results(hits) = search_response(&engine(), Some("getting")) else {
            panic!("expected results");
        };
        assert_eq!(hits[0].kind, HitKind::Doc);
        assert_eq!(hits[0].href, "/docs/getting-started");

        assert_eq!(search_response(&engine(), None), SearchResponse::Results(Vec::new()));
    }

    #[tokio::test]
    async fn test_remote_backend_maps_unavailable() {
        let backend = RemoteBackend::new(|_query: String| async { Ok::<_, Error>(SearchResponse::Unavailable) });
        assert!(matches!(backend.search("x").await, Err(Error::Backend(_))));

        let backend = RemoteBackend::new(|query: String| async move {
            Ok::<_, Error>(SearchResponse::Results(vec![SearchHit {
                kind: HitKind::Schema,
                title: query,
                description: None,
                href: "/schemas/collection".into(),
            }]))
        });
        let results = backend.search("collection").await.unwrap();
        assert_eq!(results[0].title, "collection");
        assert_eq!(results[0].kind, ItemKind::Schema);
    }
}
