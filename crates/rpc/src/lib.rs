
pub mod search;

use search::SearchResponse;

#[tarpc::service]
pub trait DocsSearch {
    /// Heartbeat
    async fn ping() -> String;

    /// Ranked matches for `query`; a missing or blank query yields no results
    async fn search(query: Option<String>) -> SearchResponse;
}
