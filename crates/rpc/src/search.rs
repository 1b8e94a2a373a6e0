use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HitKind {
    Schema,
    Example,
    Doc,
}

/// One ranked result as shown in the search box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub kind: HitKind,
    pub title: String,
    pub description: Option<String>,
    /// Site route of the matched page
    pub href: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SearchResponse {
    /// Best matches first; empty when nothing matched
    Results(Vec<SearchHit>),

    /// The content could not be loaded. Details stay in the server log.
    Unavailable,
}
