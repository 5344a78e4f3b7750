use crate::application::ports::identity::{IdentityProvider, LoginStatus};
use crate::application::services::invalidation::InvalidationSet;
use crate::application::services::query_client::QueryClient;
use crate::domain::value_objects::Principal;
use crate::shared::AppError;
use std::sync::Arc;
use tracing::{info, warn};

/// サインイン・サインアウトとキャッシュのライフサイクルを結びつける
pub struct SessionService {
    identity: Arc<dyn IdentityProvider>,
    queries: Arc<QueryClient>,
}

impl SessionService {
    pub fn new(identity: Arc<dyn IdentityProvider>, queries: Arc<QueryClient>) -> Self {
        Self { identity, queries }
    }

    pub fn status(&self) -> LoginStatus {
        self.identity.status()
    }

    pub fn current_identity(&self) -> Option<Principal> {
        self.identity.identity()
    }

    pub async fn sign_in(&self) -> Result<Principal, AppError> {
        let principal = self.identity.login().await?;
        for filter in InvalidationSet::identity_changed().filters() {
            self.queries.invalidate(filter).await;
        }
        info!(principal = %principal, "session started");
        Ok(principal)
    }

    /// Clears every cached query, even when the provider reports a logout error.
    pub async fn sign_out(&self) -> Result<(), AppError> {
        let result = self.identity.logout().await;
        if let Err(err) = &result {
            warn!(error = %err, "logout reported an error; clearing cache anyway");
        }
        self.queries.clear().await;
        result
    }
}
