// search-core/src/lib.rs
//! 搜索引擎核心库
//!
//! Fuzzy search over the content of a schema documentation site:
//! - 内容加载: schemas, examples and docs pages ([`loader`])
//! - 索引构建: one [`SearchableItem`] per record ([`index`])
//! - 模糊匹配: weighted, typo tolerant ranking ([`matcher`])
//! - 查询会话: debounced, cancellable interactive queries ([`session`])

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

pub mod config;
pub mod error;
pub mod index;
pub mod loader;
pub mod matcher;
pub mod models;
pub mod session;
pub mod trigger;

// RPC 适配层（可选功能）
#[cfg(feature = "rpc-compat")]
pub mod rpc_compat;

// 重导出核心类型
pub use config::{FieldWeights, IndexConfig, MAX_RESULTS, MatcherConfig, SearchConfig, SessionConfig};
pub use error::{Error, Result};
pub use index::{SearchIndex, build_index, extract_property_names};
pub use loader::{ContentSource, FsContentStore, MemoryContentStore, load_all};
pub use matcher::{Matcher, ScoredMatch};
pub use models::{
    ContentRecord, DocRecord, ExampleRecord, ItemKind, RankedResult, SchemaRecord, SearchableItem,
};
pub use session::{Outcome, QuerySession, RequestToken, SearchBackend, SessionSnapshot, SessionState};
pub use trigger::{Observers, SearchTrigger, Subscription, TriggerEvent};

/// 搜索引擎统一入口
///
/// Without a preloaded index every query reloads the content and rebuilds
/// the index, so edits to the content root show up immediately.
#[derive(Clone)]
pub struct SearchEngine {
    source: Arc<dyn ContentSource>,
    config: SearchConfig,
    matcher: Matcher,
    preloaded: Option<SearchIndex>,
}

impl SearchEngine {
    pub fn new(source: Arc<dyn ContentSource>, config: SearchConfig) -> Self {
        let matcher = Matcher::new(config.matcher.clone());
        Self {
            source,
            config,
            matcher,
            preloaded: None,
        }
    }

    /// Builds the index once; later queries reuse it.
    pub fn preload(mut self) -> Result<Self> {
        let index = self.build_index()?;
        tracing::info!("preloaded search index with {} items", index.len());
        self.preloaded = Some(index);
        Ok(self)
    }

    pub fn source(&self) -> &dyn ContentSource {
        self.source.as_ref()
    }

    pub fn is_preloaded(&self) -> bool {
        self.preloaded.is_some()
    }

    /// Loads every record and builds a fresh index.
    pub fn build_index(&self) -> Result<SearchIndex> {
        let records = load_all(self.source.as_ref())?;
        Ok(SearchIndex::build(&records, &self.config.index))
    }

    /// The preloaded index, or a freshly built one.
    pub fn current_index(&self) -> Result<SearchIndex> {
        match &self.preloaded {
            Some(index) => Ok(index.clone()),
            None => self.build_index(),
        }
    }

    /// Ranked results for `query`, at most `limit`.
    ///
    /// A blank query returns nothing without touching the content.
    pub fn query(&self, query: &str, limit: usize) -> Result<Vec<RankedResult>> {
        self.query_until(query, limit, &AtomicBool::new(false))
    }

    /// Like [`query`](Self::query); matching stops early once `cancelled`
    /// is set and the result is then empty.
    pub fn query_until(&self, query: &str, limit: usize, cancelled: &AtomicBool) -> Result<Vec<RankedResult>> {
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }
        let index = self.current_index()?;
        Ok(self.matcher.search_until(index.items(), query, limit, cancelled))
    }

    /// Like [`query`](Self::query), capped at the configured result count
    /// and never more than [`MAX_RESULTS`].
    pub fn query_top(&self, query: &str) -> Result<Vec<RankedResult>> {
        self.query(query, self.top_limit())
    }

    fn top_limit(&self) -> usize {
        self.config.matcher.max_results.min(MAX_RESULTS)
    }
}

/// Sets the flag when dropped, i.e. when the awaiting task goes away.
struct CancelOnDrop(Arc<AtomicBool>);

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        self.0.store(true, Ordering::Release);
    }
}

#[async_trait]
impl SearchBackend for SearchEngine {
    /// A superseded or closed session drops this future, which also stops
    /// the blocking matcher between items.
    async fn search(&self, query: &str) -> Result<Vec<RankedResult>> {
        let engine = self.clone();
        let query = query.to_string();
        let cancelled = Arc::new(AtomicBool::new(false));
        let guard = CancelOnDrop(Arc::clone(&cancelled));
        let outcome = tokio::task::spawn_blocking(move || {
            engine.query_until(&query, engine.top_limit(), &cancelled)
        })
        .await;
        drop(guard);
        outcome.map_err(|e| Error::Backend(e.to_string()))?
    }
}
