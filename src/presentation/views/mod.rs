pub mod feed;
pub mod new_post;
pub mod post_card;
pub mod profile;
pub mod search;

pub use feed::FeedView;
pub use new_post::NewPostView;
pub use post_card::PostCardView;
pub use profile::ProfileView;
pub use search::SearchView;

use crate::presentation::router::{RouteTicket, Router};
use crate::shared::AppError;
use tracing::debug;

/// 画面ごとの読み込み状態
#[derive(Debug, Clone, PartialEq)]
pub enum LoadState<T> {
    Idle,
    Loading,
    Loaded(T),
    Failed(AppError),
}

impl<T> LoadState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading)
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            LoadState::Loaded(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&AppError> {
        match self {
            LoadState::Failed(err) => Some(err),
            _ => None,
        }
    }

    /// Applies `result` if `ticket` is still current; returns whether it was applied.
    pub fn settle(
        &mut self,
        router: &Router,
        ticket: RouteTicket,
        result: Result<T, AppError>,
    ) -> bool {
        if !router.is_current(ticket) {
            debug!(ticket = ?ticket, "discarding result for a retired route");
            return false;
        }
        *self = match result {
            Ok(value) => LoadState::Loaded(value),
            Err(err) => LoadState::Failed(err),
        };
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stale_ticket_leaves_state_untouched() {
        let router = Router::new();
        let mut state: LoadState<u32> = LoadState::Loading;

        let ticket = router.ticket();
        router.select_search();
        assert!(!state.settle(&router, ticket, Ok(1)));
        assert!(state.is_loading());

        let ticket = router.ticket();
        assert!(state.settle(&router, ticket, Err(AppError::Network("down".into()))));
        assert_eq!(state.error(), Some(&AppError::Network("down".into())));
    }
}
