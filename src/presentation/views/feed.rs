use super::LoadState;
use crate::application::services::PostService;
use crate::domain::entities::Post;
use crate::presentation::router::Router;
use std::sync::Arc;

/// フィード画面
pub struct FeedView {
    posts: Arc<PostService>,
    router: Arc<Router>,
    state: LoadState<Vec<Post>>,
}

impl FeedView {
    pub fn new(posts: Arc<PostService>, router: Arc<Router>) -> Self {
        Self {
            posts,
            router,
            state: LoadState::Idle,
        }
    }

    pub fn state(&self) -> &LoadState<Vec<Post>> {
        &self.state
    }

    /// Loaded with no posts at all.
    pub fn is_empty(&self) -> bool {
        self.state.value().is_some_and(|posts| posts.is_empty())
    }

    pub async fn load(&mut self) -> &LoadState<Vec<Post>> {
        let ticket = self.router.ticket();
        self.state = LoadState::Loading;
        let result = self.posts.all_posts().await;
        self.state.settle(&self.router, ticket, result);
        &self.state
    }
}
