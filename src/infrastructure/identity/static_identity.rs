use crate::application::ports::identity::{IdentityProvider, LoginStatus};
use crate::domain::value_objects::Principal;
use crate::shared::error::AppError;
use async_trait::async_trait;
use tokio::sync::watch;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentitySnapshot {
    pub identity: Option<Principal>,
    pub status: LoginStatus,
}

/// 固定の Principal でログインする ID プロバイダ
///
/// Stands in for the external identity service: `login` always yields the
/// configured principal. Status changes are observable through
/// [`StaticIdentityProvider::subscribe`].
pub struct StaticIdentityProvider {
    login_as: Principal,
    remember_session: bool,
    state: watch::Sender<IdentitySnapshot>,
}

impl StaticIdentityProvider {
    /// Uninitialized provider; call [`initialize`](Self::initialize) first.
    pub fn new(login_as: Principal) -> Self {
        Self::with_state(login_as, None, LoginStatus::Uninitialized)
    }

    pub fn signed_in(principal: Principal) -> Self {
        Self::with_state(principal.clone(), Some(principal), LoginStatus::Idle)
    }

    pub fn signed_out(login_as: Principal) -> Self {
        Self::with_state(login_as, None, LoginStatus::Idle)
    }

    /// Restores the principal as an existing session during `initialize`.
    pub fn with_remembered_session(mut self) -> Self {
        self.remember_session = true;
        self
    }

    fn with_state(login_as: Principal, identity: Option<Principal>, status: LoginStatus) -> Self {
        let (state, _) = watch::channel(IdentitySnapshot { identity, status });
        Self {
            login_as,
            remember_session: false,
            state,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<IdentitySnapshot> {
        self.state.subscribe()
    }

    pub async fn initialize(&self) {
        self.set_status(LoginStatus::Initializing);
        tokio::task::yield_now().await;

        let restored = self.remember_session.then(|| self.login_as.clone());
        self.state.send_modify(|state| {
            state.identity = restored;
            state.status = LoginStatus::Idle;
        });
    }

    fn set_status(&self, status: LoginStatus) {
        self.state.send_modify(|state| state.status = status);
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentityProvider {
    fn identity(&self) -> Option<Principal> {
        self.state.borrow().identity.clone()
    }

    fn status(&self) -> LoginStatus {
        self.state.borrow().status
    }

    async fn login(&self) -> Result<Principal, AppError> {
        if self.status() == LoginStatus::LoggingIn {
            return Err(AppError::Unauthorized("Login already in progress".to_string()));
        }
        self.set_status(LoginStatus::LoggingIn);
        tokio::task::yield_now().await;

        let principal = self.login_as.clone();
        self.state.send_modify(|state| {
            state.identity = Some(principal.clone());
            state.status = LoginStatus::Idle;
        });
        info!(principal = %principal, "signed in");
        Ok(principal)
    }

    async fn logout(&self) -> Result<(), AppError> {
        self.state.send_modify(|state| {
            state.identity = None;
            state.status = LoginStatus::Idle;
        });
        info!("signed out");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn principal() -> Principal {
        Principal::from_text("2vxsx-fae").unwrap()
    }

    #[tokio::test]
    async fn initialize_settles_without_identity_by_default() {
        let provider = StaticIdentityProvider::new(principal());
        assert_eq!(provider.status(), LoginStatus::Uninitialized);
        assert!(!provider.status().is_settled());

        provider.initialize().await;
        assert_eq!(provider.status(), LoginStatus::Idle);
        assert!(provider.identity().is_none());
    }

    #[tokio::test]
    async fn initialize_restores_remembered_session() {
        let provider = StaticIdentityProvider::new(principal()).with_remembered_session();
        provider.initialize().await;
        assert_eq!(provider.identity(), Some(principal()));
    }

    #[tokio::test]
    async fn login_and_logout_update_identity() {
        let provider = StaticIdentityProvider::signed_out(principal());
        assert!(provider.require_identity().is_err());

        let signed_in = provider.login().await.expect("login");
        assert_eq!(signed_in, principal());
        assert_eq!(provider.require_identity().unwrap(), principal());

        provider.logout().await.expect("logout");
        assert!(provider.identity().is_none());
        assert_eq!(provider.status(), LoginStatus::Idle);
    }

    #[tokio::test]
    async fn subscribers_observe_status_changes() {
        let provider = StaticIdentityProvider::new(principal());
        let mut snapshots = provider.subscribe();
        assert_eq!(snapshots.borrow().status, LoginStatus::Uninitialized);

        provider.initialize().await;
        assert!(snapshots.has_changed().expect("provider alive"));
        let latest = snapshots.borrow_and_update().clone();
        assert_eq!(latest.status, LoginStatus::Idle);
        assert_eq!(latest.identity, None);
    }
}
