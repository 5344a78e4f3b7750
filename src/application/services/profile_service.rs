use crate::application::ports::backend::SocialBackend;
use crate::application::ports::identity::IdentityProvider;
use crate::application::services::invalidation::InvalidationSet;
use crate::application::services::query_client::QueryClient;
use crate::domain::entities::Profile;
use crate::domain::value_objects::{Principal, QueryKey};
use crate::shared::validation::validate_display_name;
use crate::shared::{AppError, ValidationFailureKind};
use std::sync::Arc;
use tracing::{debug, info};

pub struct ProfileService {
    backend: Arc<dyn SocialBackend>,
    identity: Arc<dyn IdentityProvider>,
    queries: Arc<QueryClient>,
}

impl ProfileService {
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

    /// ログイン中ユーザーのプロフィール。未作成なら `Ok(None)`（初回セットアップ用）
    pub async fn current_profile(&self) -> Result<Option<Profile>, AppError> {
        let caller = self.identity.require_identity()?;
        let backend = Arc::clone(&self.backend);

        self.queries
            .fetch(QueryKey::CurrentUserProfile, move || async move {
                match backend.get_profile(&caller).await {
                    Ok(profile) => Ok(Some(profile)),
                    Err(err) if err.is_missing_profile() => {
                        debug!(caller = %caller, "caller has no profile yet");
                        Ok(None)
                    }
                    Err(err) => Err(err),
                }
            })
            .await
    }

    pub async fn profile(&self, user: &Principal) -> Result<Profile, AppError> {
        let backend = Arc::clone(&self.backend);
        let user = user.clone();

        self.queries
            .fetch(QueryKey::Profile(user.clone()), move || async move {
                backend.get_profile(&user).await
            })
            .await
    }

    pub async fn create_or_update_profile(&self, display_name: &str, bio: &str) -> Result<(), AppError> {
        let display_name = validate_display_name(display_name)?;
        let bio = bio.trim();
        let caller = self.identity.require_identity()?;

        self.queries
            .mutate(
                &InvalidationSet::profile_saved(&caller),
                self.backend.create_or_update_profile(&display_name, bio),
            )
            .await?;
        info!(caller = %caller, "profile saved");
        Ok(())
    }

    pub async fn follow(&self, target: &Principal) -> Result<(), AppError> {
        let caller = self.follow_precondition(target)?;
        self.queries
            .mutate(
                &InvalidationSet::follow_changed(&caller, target),
                self.backend.follow(target),
            )
            .await?;
        info!(caller = %caller, target = %target, "followed user");
        Ok(())
    }

    pub async fn unfollow(&self, target: &Principal) -> Result<(), AppError> {
        let caller = self.follow_precondition(target)?;
        self.queries
            .mutate(
                &InvalidationSet::follow_changed(&caller, target),
                self.backend.unfollow(target),
            )
            .await?;
        info!(caller = %caller, target = %target, "unfollowed user");
        Ok(())
    }

    fn follow_precondition(&self, target: &Principal) -> Result<Principal, AppError> {
        let caller = self.identity.require_identity()?;
        if &caller == target {
            return Err(AppError::validation(
                ValidationFailureKind::Generic,
                "You cannot follow yourself",
            ));
        }
        Ok(caller)
    }
}
