use search_core::{
    Outcome, QuerySession, SearchBackend, SessionSnapshot, SessionState, TriggerEvent,
};
use std::fmt::Write;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// A search box that is either closed or owns one live query session.
pub struct SearchBox {
    backend: Arc<dyn SearchBackend>,
    debounce: Duration,
    open: Option<OpenBox>,
}

struct OpenBox {
    session: QuerySession,
    renderer: JoinHandle<()>,
}

impl SearchBox {
    pub fn new(backend: Arc<dyn SearchBackend>, debounce: Duration) -> Self {
        Self {
            backend,
            debounce,
            open: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    pub fn handle(&mut self, event: TriggerEvent) {
        match event {
            TriggerEvent::OpenSearch => self.open(),
            TriggerEvent::CloseSearch => self.close(),
        }
    }

    pub fn open(&mut self) {
        if self.open.is_some() {
            return;
        }
        let session = QuerySession::new(Arc::clone(&self.backend), self.debounce);
        let renderer = tokio::spawn(render(session.subscribe()));
        self.open = Some(OpenBox { session, renderer });
        println!("Start typing to search...");
    }

    pub fn close(&mut self) {
        if let Some(mut open) = self.open.take() {
            open.session.close();
            open.renderer.abort();
            println!("Search closed");
        }
    }

    /// Typing into a closed box opens it first.
    pub fn input(&mut self, text: &str) {
        self.open();
        if let Some(open) = self.open.as_mut() {
            open.session.input(text);
        }
    }

    #[cfg(test)]
    fn snapshot(&self) -> Option<SessionSnapshot> {
        self.open.as_ref().map(|open| open.session.snapshot())
    }
}

async fn render(mut rx: watch::Receiver<SessionSnapshot>) {
    while rx.changed().await.is_ok() {
        let text = render_snapshot(&rx.borrow_and_update());
        if !text.is_empty() {
            print!("{text}");
        }
    }
}

/// Text shown for one state of the box; empty when nothing should change.
pub fn render_snapshot(snapshot: &SessionSnapshot) -> String {
    let mut out = String::new();
    match &snapshot.state {
        SessionState::Idle | SessionState::Cancelled => {}
        SessionState::Pending => {
            let _ = writeln!(out, "Searching...");
        }
        SessionState::Settled(Outcome::Results(results)) => {
            for (rank, result) in results.iter().enumerate() {
                let _ = writeln!(out, "{:>2}. {} ({})", rank + 1, result.title, result.kind);
                if let Some(description) = &result.description {
                    let _ = writeln!(out, "    {description}");
                }
                let _ = writeln!(out, "    {}", result.href);
            }
        }
        SessionState::Settled(Outcome::Empty) => {
            let _ = writeln!(out, "No results found for \"{}\"", snapshot.query);
        }
        SessionState::Settled(Outcome::Unavailable) => {
            let _ = writeln!(out, "Search unavailable");
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use search_core::{ItemKind, MemoryContentStore, RankedResult, SearchConfig, SearchEngine};

    fn result(title: &str, description: Option<&str>) -> RankedResult {
        RankedResult {
            kind: ItemKind::Doc,
            title: title.into(),
            description: description.map(String::from),
            href: "/docs/intro".into(),
        }
    }

    fn snapshot(query: &str, state: SessionState) -> SessionSnapshot {
        SessionSnapshot {
            query: query.into(),
            state,
            ..Default::default()
        }
    }

    #[rstest]
    #[case(SessionState::Idle, "")]
    #[case(SessionState::Cancelled, "")]
    #[case(SessionState::Pending, "Searching...\n")]
    #[case(SessionState::Settled(Outcome::Empty), "No results found for \"zebra\"\n")]
    #[case(SessionState::Settled(Outcome::Unavailable), "Search unavailable\n")]
    fn test_render_states(#[case] state: SessionState, #[case] expected: &str) {
        assert_eq!(render_snapshot(&snapshot("zebra", state)), expected);
    }

    #[test]
    fn test_render_results() {
        let state = SessionState::Settled(Outcome::Results(vec![
            result("Intro", Some("Where to start")),
            result("Glossary", None),
        ]));
        assert_eq!(
            render_snapshot(&snapshot("in", state)),
            " 1. Intro (doc)\n    Where to start\n    /docs/intro\n 2. Glossary (doc)\n    /docs/intro\n"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_open_input_close() {
        let backend: Arc<dyn SearchBackend> = Arc::new(SearchEngine::new(
            Arc::new(MemoryContentStore::new()),
            SearchConfig::default(),
        ));
        let mut search_box = SearchBox::new(backend, Duration::from_millis(300));
        assert!(!search_box.is_open());

        search_box.input("schema");
        assert!(search_box.is_open());
        assert_eq!(search_box.snapshot().unwrap().state, SessionState::Pending);

        search_box.handle(TriggerEvent::CloseSearch);
        assert!(!search_box.is_open());

        search_box.handle(TriggerEvent::OpenSearch);
        assert_eq!(search_box.snapshot().unwrap().state, SessionState::Idle);
    }
}
