use crate::application::ports::backend::SocialBackend;
use crate::domain::entities::{ExternalBlob, Post, Profile};
use crate::domain::value_objects::{PostId, Principal, UserRole};
use crate::shared::error::AppError;
use async_trait::async_trait;
use mockall::mock;

mock! {
    pub Backend {}

    #[async_trait]
    impl SocialBackend for Backend {
        async fn get_profile(&self, user: &Principal) -> Result<Profile, AppError>;
        async fn create_or_update_profile(&self, display_name: &str, bio: &str) -> Result<(), AppError>;
        async fn create_post(&self, caption: &str, image: ExternalBlob) -> Result<PostId, AppError>;
        async fn get_post(&self, post_id: PostId) -> Result<Post, AppError>;
        async fn get_posts_by_user(&self, user: &Principal) -> Result<Vec<Post>, AppError>;
        async fn like_post(&self, post_id: PostId) -> Result<(), AppError>;
        async fn add_comment(&self, post_id: PostId, text: &str) -> Result<(), AppError>;
        async fn follow(&self, user_to_follow: &Principal) -> Result<(), AppError>;
        async fn unfollow(&self, user_to_unfollow: &Principal) -> Result<(), AppError>;
        async fn search_profiles(&self, search_term: &str) -> Result<Vec<Profile>, AppError>;
        async fn get_caller_user_role(&self) -> Result<UserRole, AppError>;
        async fn assign_caller_user_role(&self, user: &Principal, role: UserRole) -> Result<(), AppError>;
        async fn is_caller_admin(&self) -> Result<bool, AppError>;
    }
}
