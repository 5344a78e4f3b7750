use crate::application::ports::backend::SocialBackend;
use crate::application::services::query_client::QueryClient;
use crate::domain::entities::Profile;
use crate::domain::value_objects::QueryKey;
use crate::shared::AppError;
use std::sync::Arc;

pub struct SearchService {
    backend: Arc<dyn SocialBackend>,
    queries: Arc<QueryClient>,
}

impl SearchService {
    pub fn new(backend: Arc<dyn SocialBackend>, queries: Arc<QueryClient>) -> Self {
        Self { backend, queries }
    }

    /// 空文字なら全プロフィールを返す
    pub async fn search_profiles(&self, search_term: &str) -> Result<Vec<Profile>, AppError> {
        let term = search_term.trim().to_string();
        let backend = Arc::clone(&self.backend);

        self.queries
            .fetch(QueryKey::SearchProfiles(term.clone()), move || async move {
                backend.search_profiles(&term).await
            })
            .await
    }
}
