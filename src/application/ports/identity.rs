use crate::domain::value_objects::Principal;
use crate::shared::error::AppError;
use async_trait::async_trait;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginStatus {
    Uninitialized,
    Initializing,
    LoggingIn,
    Idle,
}

impl LoginStatus {
    /// 初期化が完了し、画面を描画してよい状態か
    pub fn is_settled(&self) -> bool {
        matches!(self, LoginStatus::LoggingIn | LoginStatus::Idle)
    }
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    fn identity(&self) -> Option<Principal>;
    fn status(&self) -> LoginStatus;
    async fn login(&self) -> Result<Principal, AppError>;
    async fn logout(&self) -> Result<(), AppError>;

    fn require_identity(&self) -> Result<Principal, AppError> {
        self.identity()
            .ok_or_else(|| AppError::Unauthorized("Identity not available".to_string()))
    }
}
