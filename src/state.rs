use crate::application::ports::backend::SocialBackend;
use crate::application::ports::identity::IdentityProvider;
use crate::application::services::{
    PostService, ProfileService, QueryClient, RoleService, SearchService, SessionService,
};
use crate::domain::entities::Post;
use crate::infrastructure::backend::InMemoryBackend;
use crate::infrastructure::cache::MemoryQueryCache;
use crate::presentation::app::AppShell;
use crate::presentation::router::Router;
use crate::presentation::views::{FeedView, NewPostView, PostCardView, ProfileView, SearchView};
use crate::shared::config::ClientConfig;
use std::sync::Arc;
use tracing::info;

/// セッション全体の状態を管理する構造体
///
/// Owns the query cache for one client session. Views and services receive
/// their collaborators from here; nothing is global.
#[derive(Clone)]
pub struct AppState {
    pub config: ClientConfig,
    pub identity: Arc<dyn IdentityProvider>,
    pub queries: Arc<QueryClient>,
    pub profile_service: Arc<ProfileService>,
    pub post_service: Arc<PostService>,
    pub search_service: Arc<SearchService>,
    pub role_service: Arc<RoleService>,
    pub session_service: Arc<SessionService>,
    pub router: Arc<Router>,
}

impl AppState {
    pub fn new(
        config: ClientConfig,
        backend: Arc<dyn SocialBackend>,
        identity: Arc<dyn IdentityProvider>,
    ) -> anyhow::Result<Self> {
        config
            .validate()
            .map_err(|e| anyhow::anyhow!("Invalid client configuration: {e}"))?;

        let queries = Arc::new(QueryClient::new(
            Box::new(MemoryQueryCache::new()),
            config.cache.clone(),
        ));

        let profile_service = Arc::new(ProfileService::new(
            Arc::clone(&backend),
            Arc::clone(&identity),
            Arc::clone(&queries),
        ));
        let post_service = Arc::new(PostService::new(
            Arc::clone(&backend),
            Arc::clone(&identity),
            Arc::clone(&queries),
        ));
        let search_service = Arc::new(SearchService::new(
            Arc::clone(&backend),
            Arc::clone(&queries),
        ));
        let role_service = Arc::new(RoleService::new(
            backend,
            Arc::clone(&identity),
            Arc::clone(&queries),
        ));
        let session_service = Arc::new(SessionService::new(
            Arc::clone(&identity),
            Arc::clone(&queries),
        ));

        info!(
            feed_stale_secs = config.cache.feed_stale_secs,
            search_stale_secs = config.cache.search_stale_secs,
            "client state initialized"
        );

        Ok(Self {
            config,
            identity,
            queries,
            profile_service,
            post_service,
            search_service,
            role_service,
            session_service,
            router: Arc::new(Router::new()),
        })
    }

    /// Wires the session to an in-process backend.
    pub fn in_memory(
        config: ClientConfig,
        backend: &InMemoryBackend,
        identity: Arc<dyn IdentityProvider>,
    ) -> anyhow::Result<Self> {
        let actor = backend.connect(Arc::clone(&identity));
        Self::new(config, Arc::new(actor), identity)
    }

    pub fn app_shell(&self) -> AppShell {
        AppShell::new(
            Arc::clone(&self.identity),
            Arc::clone(&self.profile_service),
        )
    }

    pub fn feed_view(&self) -> FeedView {
        FeedView::new(Arc::clone(&self.post_service), Arc::clone(&self.router))
    }

    pub fn profile_view(&self) -> ProfileView {
        ProfileView::new(
            Arc::clone(&self.profile_service),
            Arc::clone(&self.post_service),
            Arc::clone(&self.identity),
            Arc::clone(&self.router),
        )
    }

    pub fn search_view(&self) -> SearchView {
        SearchView::new(
            Arc::clone(&self.search_service),
            Arc::clone(&self.router),
            self.config.search.debounce(),
        )
    }

    pub fn post_card(&self, post: Post) -> PostCardView {
        PostCardView::new(
            Arc::clone(&self.post_service),
            Arc::clone(&self.profile_service),
            Arc::clone(&self.router),
            self.identity.identity(),
            post,
        )
    }

    pub fn new_post_view(&self) -> NewPostView {
        NewPostView::new(Arc::clone(&self.post_service))
    }
}
