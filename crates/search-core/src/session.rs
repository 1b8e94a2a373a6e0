// search-core/src/session.rs
//! 查询会话模块
//!
//! Drives one interactive search box: debounces keystrokes, runs at most one
//! backend request at a time and publishes the visible state through a
//! [`tokio::sync::watch`] channel.
//!
//! ```text
//! Idle ──input──▶ Pending ──debounce, backend──▶ Settled
//!   ▲                │                              │
//!   └──blank input───┴──────────────────────────────┘
//!            close() from any state ──▶ Cancelled
//! ```
//!
//! Every input mints a new [`RequestToken`]. A response is applied only while
//! its token is still the current one, so a slow answer to an old query can
//! never overwrite a newer one.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::error::Result;
use crate::models::RankedResult;

/// Anything that can answer a query with ranked results.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<RankedResult>>;
}

/// Monotonic id of one input event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

impl RequestToken {
    fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Results(Vec<RankedResult>),
    /// The backend answered, but nothing matched.
    Empty,
    /// The backend failed; details go to the log, not to the user.
    Unavailable,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Pending,
    Settled(Outcome),
    Cancelled,
}

/// What observers see.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SessionSnapshot {
    pub token: RequestToken,
    pub query: String,
    pub state: SessionState,
}

impl SessionSnapshot {
    /// Visible results; empty unless settled with results.
    pub fn results(&self) -> &[RankedResult] {
        match &self.state {
            SessionState::Settled(Outcome::Results(results)) => results,
            _ => &[],
        }
    }

    pub fn is_settled(&self) -> bool {
        matches!(self.state, SessionState::Settled(_))
    }
}

pub struct QuerySession {
    backend: Arc<dyn SearchBackend>,
    debounce: Duration,
    state: Arc<watch::Sender<SessionSnapshot>>,
    task: Option<JoinHandle<()>>,
}

impl QuerySession {
    pub fn new(backend: Arc<dyn SearchBackend>, debounce: Duration) -> Self {
        let (state, _) = watch::channel(SessionSnapshot::default());
        Self {
            backend,
            debounce,
            state: Arc::new(state),
            task: None,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.borrow().clone()
    }

    pub fn is_closed(&self) -> bool {
        matches!(self.state.borrow().state, SessionState::Cancelled)
    }

    /// Feeds the current text of the search box.
    ///
    /// Must be called inside a tokio runtime. Does nothing once closed.
    pub fn input(&mut self, text: &str) -> RequestToken {
        if self.is_closed() {
            tracing::debug!("input {:?} ignored, session closed", text);
            return self.state.borrow().token;
        }
        self.abort_in_flight();

        let token = self.state.borrow().token.next();
        if text.trim().is_empty() {
            self.state.send_replace(SessionSnapshot {
                token,
                query: String::new(),
                state: SessionState::Idle,
            });
            return token;
        }

        let query = text.to_string();
        self.state.send_replace(SessionSnapshot {
            token,
            query: query.clone(),
            state: SessionState::Pending,
        });

        let backend = Arc::clone(&self.backend);
        let state = Arc::clone(&self.state);
        let debounce = self.debounce;
        self.task = Some(tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            let outcome = match backend.search(&query).await {
                Ok(results) if results.is_empty() => Outcome::Empty,
                Ok(results) => Outcome::Results(results),
                Err(e) => {
                    tracing::warn!("search for {:?} failed: {}", query, e);
                    Outcome::Unavailable
                }
            };
            if !settle(&state, token, outcome) {
                tracing::debug!("discarded stale response for {:?}", query);
            }
        }));
        token
    }

    /// Tears the session down. No state changes happen afterwards.
    pub fn close(&mut self) {
        self.abort_in_flight();
        self.state.send_if_modified(|snapshot| {
            if snapshot.state == SessionState::Cancelled {
                return false;
            }
            snapshot.token = snapshot.token.next();
            snapshot.state = SessionState::Cancelled;
            true
        });
    }

    fn abort_in_flight(&mut self) {
        if let Some(handle) = self.task.take() {
            handle.abort();
        }
    }
}

impl Drop for QuerySession {
    fn drop(&mut self) {
        self.close();
    }
}

/// Applies `outcome` if `token` is still current. Returns whether it did.
fn settle(state: &watch::Sender<SessionSnapshot>, token: RequestToken, outcome: Outcome) -> bool {
    state.send_if_modified(|snapshot| {
        if snapshot.token != token || snapshot.state == SessionState::Cancelled {
            return false;
        }
        snapshot.state = SessionState::Settled(outcome);
        true
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::models::ItemKind;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Answers with one result titled after the query, after a per-query delay.
    #[derive(Default)]
    struct ScriptedBackend {
        delays: HashMap<String, Duration>,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedBackend {
        fn with_delay(mut self, query: &str, delay: Duration) -> Self {
            self.delays.insert(query.to_string(), delay);
            self
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl SearchBackend for ScriptedBackend {
        async fn search(&self, query: &str) -> Result<Vec<RankedResult>> {
            self.calls.lock().unwrap().push(query.to_string());
            if let Some(delay) = self.delays.get(query) {
                tokio::time::sleep(*delay).await;
            }
            match query {
                "nothing" => Ok(Vec::new()),
                "broken" => Err(Error::Backend("connection reset".into())),
                _ => Ok(vec![RankedResult {
                    kind: ItemKind::Doc,
                    title: query.to_string(),
                    description: None,
                    href: format!("/docs/{query}"),
                }]),
            }
        }
    }

    const DEBOUNCE: Duration = Duration::from_millis(300);

    fn session(backend: &Arc<ScriptedBackend>) -> QuerySession {
        QuerySession::new(backend.clone(), DEBOUNCE)
    }

    async fn settled(session: &QuerySession) -> SessionSnapshot {
        let mut rx = session.subscribe();
        rx.wait_for(SessionSnapshot::is_settled).await.unwrap().clone()
    }

    fn titles(snapshot: &SessionSnapshot) -> Vec<&str> {
        snapshot.results().iter().map(|r| r.title.as_str()).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_settles_after_debounce() {
        let backend = Arc::new(ScriptedBackend::default());
        let mut session = session(&backend);

        session.input("interview");
        assert_eq!(session.snapshot().state, SessionState::Pending);

        let snapshot = settled(&session).await;
        assert_eq!(titles(&snapshot), vec!["interview"]);
        assert_eq!(backend.calls(), vec!["interview"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_debounce_restarts_on_each_keystroke() {
        let backend = Arc::new(ScriptedBackend::default());
        let mut session = session(&backend);

        session.input("in");
        tokio::time::sleep(Duration::from_millis(200)).await;
        session.input("int");
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(backend.calls().is_empty());

        let snapshot = settled(&session).await;
        assert_eq!(titles(&snapshot), vec!["int"]);
        assert_eq!(backend.calls(), vec!["int"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_response_is_discarded() {
        let backend = Arc::new(
            ScriptedBackend::default()
                .with_delay("a", Duration::from_secs(5))
                .with_delay("ab", Duration::from_millis(10)),
        );
        let mut session = session(&backend);

        session.input("a");
        tokio::time::sleep(DEBOUNCE + Duration::from_millis(50)).await;
        assert_eq!(backend.calls(), vec!["a"]);

        session.input("ab");
        let snapshot = settled(&session).await;
        assert_eq!(titles(&snapshot), vec!["ab"]);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(titles(&session.snapshot()), vec!["ab"]);
    }

    #[test]
    fn test_settle_rejects_old_token() {
        let (state, _rx) = watch::channel(SessionSnapshot::default());
        let old = RequestToken(1);
        state.send_replace(SessionSnapshot {
            token: RequestToken(2),
            query: "ab".into(),
            state: SessionState::Pending,
        });

        assert!(!settle(&state, old, Outcome::Empty));
        assert_eq!(state.borrow().state, SessionState::Pending);
        assert!(settle(&state, RequestToken(2), Outcome::Empty));
        assert_eq!(state.borrow().state, SessionState::Settled(Outcome::Empty));
    }

    #[tokio::test(start_paused = true)]
    async fn test_clearing_is_synchronous() {
        let backend = Arc::new(ScriptedBackend::default());
        let mut session = session(&backend);

        session.input("interview");
        settled(&session).await;

        session.input("interv");
        session.input("   ");
        let snapshot = session.snapshot();
        assert_eq!(snapshot.state, SessionState::Idle);
        assert!(snapshot.results().is_empty());

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(session.snapshot().state, SessionState::Idle);
        assert_eq!(backend.calls(), vec!["interview"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_cancels_in_flight_request() {
        let backend = Arc::new(ScriptedBackend::default().with_delay("slow", Duration::from_secs(1)));
        let mut session = session(&backend);
        let mut rx = session.subscribe();

        session.input("slow");
        tokio::time::sleep(DEBOUNCE + Duration::from_millis(10)).await;
        session.close();
        assert_eq!(session.snapshot().state, SessionState::Cancelled);
        rx.mark_unchanged();

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(!rx.has_changed().unwrap());

        session.input("again");
        assert_eq!(session.snapshot().state, SessionState::Cancelled);
        assert_eq!(backend.calls(), vec!["slow"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels() {
        let backend = Arc::new(ScriptedBackend::default());
        let mut session = session(&backend);
        let rx = session.subscribe();

        session.input("interview");
        drop(session);
        assert_eq!(rx.borrow().state, SessionState::Cancelled);

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(backend.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_and_unavailable_outcomes() {
        let backend = Arc::new(ScriptedBackend::default());
        let mut session = session(&backend);

        session.input("nothing");
        assert_eq!(settled(&session).await.state, SessionState::Settled(Outcome::Empty));

        session.input("broken");
        assert_eq!(
            settled(&session).await.state,
            SessionState::Settled(Outcome::Unavailable)
        );
    }
}
