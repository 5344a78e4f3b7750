use crate::application::ports::identity::IdentityProvider;
use crate::application::services::ProfileService;
use crate::domain::entities::Profile;
use crate::presentation::forms::{ProfileForm, Validate};
use crate::shared::AppError;
use std::sync::Arc;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    SignIn,
    Loading,
    Main { needs_profile_setup: bool },
}

/// 認証状態とプロフィール有無から表示する画面を決める
pub struct AppShell {
    identity: Arc<dyn IdentityProvider>,
    profiles: Arc<ProfileService>,
}

impl AppShell {
    pub fn new(identity: Arc<dyn IdentityProvider>, profiles: Arc<ProfileService>) -> Self {
        Self { identity, profiles }
    }

    /// Screen for the current identity before the profile check has run.
    pub fn initial_screen(&self) -> Screen {
        match self.identity.identity() {
            None => Screen::SignIn,
            Some(_) => Screen::Loading,
        }
    }

    pub async fn screen(&self) -> Screen {
        if self.identity.identity().is_none() {
            return Screen::SignIn;
        }
        if !self.identity.status().is_settled() {
            return Screen::Loading;
        }

        match self.profiles.current_profile().await {
            Ok(profile) => Screen::Main {
                needs_profile_setup: profile.is_none(),
            },
            Err(err) => {
                warn!(error = %err, "could not check current profile");
                Screen::Main {
                    needs_profile_setup: false,
                }
            }
        }
    }

    /// Submits the first-run profile dialog and returns the stored profile.
    pub async fn complete_profile_setup(&self, form: ProfileForm) -> Result<Profile, AppError> {
        form.validate()?;
        self.profiles
            .create_or_update_profile(form.display_name(), form.bio())
            .await?;
        self.profiles
            .current_profile()
            .await?
            .ok_or_else(|| AppError::Internal("Profile missing after setup".to_string()))
    }
}
