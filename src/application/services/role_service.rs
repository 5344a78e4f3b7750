use crate::application::ports::backend::SocialBackend;
use crate::application::ports::identity::IdentityProvider;
use crate::application::services::invalidation::InvalidationSet;
use crate::application::services::query_client::QueryClient;
use crate::domain::value_objects::{Principal, QueryKey, UserRole};
use crate::shared::AppError;
use std::sync::Arc;
use tracing::info;

pub struct RoleService {
    backend: Arc<dyn SocialBackend>,
    identity: Arc<dyn IdentityProvider>,
    queries: Arc<QueryClient>,
}

impl RoleService {
    pub fn new(
        backend: Arc<dyn SocialBackend>,
        identity: Arc<dyn IdentityProvider>,
        queries: Arc<QueryClient>,
    ) -> Self {
        Self {
            backend,
            identity,
            queries,
        }
    }

    pub async fn caller_role(&self) -> Result<UserRole, AppError> {
        let backend = Arc::clone(&self.backend);
        self.queries
            .fetch(QueryKey::CallerRole, move || async move {
                backend.get_caller_user_role().await
            })
            .await
    }

    pub async fn is_caller_admin(&self) -> Result<bool, AppError> {
        let backend = Arc::clone(&self.backend);
        self.queries
            .fetch(QueryKey::IsCallerAdmin, move || async move {
                backend.is_caller_admin().await
            })
            .await
    }

    /// Requires an admin caller; the backend reports `Unauthorized` otherwise.
    pub async fn assign_role(&self, user: &Principal, role: UserRole) -> Result<(), AppError> {
        let caller = self.identity.require_identity()?;
        self.queries
            .mutate(
                &InvalidationSet::role_assigned(),
                self.backend.assign_caller_user_role(user, role),
            )
            .await?;
        info!(caller = %caller, user = %user, role = %role, "role assigned");
        Ok(())
    }
}
