use super::LoadState;
use crate::application::services::SearchService;
use crate::domain::entities::Profile;
use crate::presentation::router::Router;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::debug;

/// 検索画面
///
/// Keystrokes go to [`SearchView::set_term`]; a search runs only once the term
/// has been left unchanged for the debounce window.
pub struct SearchView {
    search: Arc<SearchService>,
    router: Arc<Router>,
    debounce: Duration,
    input: watch::Sender<String>,
    pending: watch::Receiver<String>,
    settled_term: String,
    results: LoadState<Vec<Profile>>,
}

impl SearchView {
    pub fn new(search: Arc<SearchService>, router: Arc<Router>, debounce: Duration) -> Self {
        let (input, pending) = watch::channel(String::new());
        Self {
            search,
            router,
            debounce,
            input,
            pending,
            settled_term: String::new(),
            results: LoadState::Idle,
        }
    }

    pub fn set_term(&self, term: impl Into<String>) {
        self.input.send_replace(term.into());
    }

    /// Term of the last search that ran.
    pub fn settled_term(&self) -> &str {
        &self.settled_term
    }

    pub fn results(&self) -> &LoadState<Vec<Profile>> {
        &self.results
    }

    /// Searches for the current term without waiting, e.g. when the screen opens.
    pub async fn search_now(&mut self) -> &LoadState<Vec<Profile>> {
        let term = self.pending.borrow_and_update().clone();
        self.run(term).await;
        &self.results
    }

    /// Waits for the next term to settle and searches for it. Returns `false`
    /// once the input side has gone away.
    pub async fn next_settled(&mut self) -> bool {
        match settle_term(&mut self.pending, self.debounce).await {
            Some(term) => {
                self.run(term).await;
                true
            }
            None => false,
        }
    }

    async fn run(&mut self, term: String) {
        let ticket = self.router.ticket();
        self.results = LoadState::Loading;
        let result = self.search.search_profiles(&term).await;
        if self.results.settle(&self.router, ticket, result) {
            self.settled_term = term;
        }
    }
}

// 最後の変更から debounce 経過するまで待つ
async fn settle_term(rx: &mut watch::Receiver<String>, debounce: Duration) -> Option<String> {
    rx.changed().await.ok()?;
    loop {
        match tokio::time::timeout(debounce, rx.changed()).await {
            Ok(Ok(())) => continue,
            Ok(Err(_)) | Err(_) => break,
        }
    }
    let term = rx.borrow_and_update().clone();
    debug!(term = %term, "search term settled");
    Some(term)
}
