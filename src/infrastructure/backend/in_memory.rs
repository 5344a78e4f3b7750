use crate::application::ports::backend::SocialBackend;
use crate::application::ports::identity::IdentityProvider;
use crate::domain::entities::{Comment, ExternalBlob, Post, Profile};
use crate::domain::value_objects::{PostId, Principal, UserRole};
use crate::shared::error::{AppError, MISSING_PROFILE_MESSAGE};
use crate::shared::validation::{validate_comment_text, validate_display_name};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Default)]
struct BackendState {
    profiles: BTreeMap<Principal, Profile>,
    posts: BTreeMap<PostId, Post>,
    following: HashMap<Principal, BTreeSet<Principal>>,
    roles: HashMap<Principal, UserRole>,
    next_post_id: u64,
    last_timestamp: i64,
    calls: HashMap<&'static str, usize>,
    failures: HashMap<&'static str, AppError>,
}

impl BackendState {
    // 同一ナノ秒に複数投稿しても順序が崩れないよう単調増加させる
    fn next_timestamp(&mut self) -> i64 {
        let now = Utc::now().timestamp_nanos_opt().unwrap_or(0);
        self.last_timestamp = now.max(self.last_timestamp + 1);
        self.last_timestamp
    }

    fn record_call(&mut self, operation: &'static str) -> Result<(), AppError> {
        *self.calls.entry(operation).or_default() += 1;
        match self.failures.remove(operation) {
            Some(err) => {
                debug!(operation, error = %err, "injected backend failure");
                Err(err)
            }
            None => Ok(()),
        }
    }

    /// Profile with counts derived from the current follow graph and posts.
    fn profile_view(&self, user: &Principal) -> Option<Profile> {
        let mut profile = self.profiles.get(user)?.clone();
        profile.following_count = self.following.get(user).map_or(0, |set| set.len() as u64);
        profile.followers_count = self
            .following
            .values()
            .filter(|set| set.contains(user))
            .count() as u64;
        profile.posts_count = self
            .posts
            .values()
            .filter(|post| &post.author == user)
            .count() as u64;
        Some(profile)
    }

    fn role_of(&self, user: &Principal) -> UserRole {
        match self.roles.get(user) {
            Some(role) => *role,
            None if self.profiles.contains_key(user) => UserRole::User,
            None => UserRole::Guest,
        }
    }

    fn post_mut(&mut self, post_id: PostId) -> Result<&mut Post, AppError> {
        self.posts
            .get_mut(&post_id)
            .ok_or_else(|| AppError::NotFound(format!("Post not found: {post_id}")))
    }
}

/// プロセス内で完結するバックエンド実装
///
/// Shared state for every caller. Use [`InMemoryBackend::connect`] to obtain a
/// [`SocialBackend`] bound to an identity provider, the way a real agent binds
/// the caller's identity to its transport.
#[derive(Clone, Default)]
pub struct InMemoryBackend {
    state: Arc<RwLock<BackendState>>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds `admin` with the admin role, which is needed before anyone can
    /// assign roles.
    pub async fn with_admin(self, admin: &Principal) -> Self {
        self.state
            .write()
            .await
            .roles
            .insert(admin.clone(), UserRole::Admin);
        self
    }

    pub fn connect(&self, identity: Arc<dyn IdentityProvider>) -> InMemoryActor {
        InMemoryActor {
            backend: self.clone(),
            identity,
        }
    }

    /// Makes the next call of `operation` fail with `error`.
    pub async fn inject_failure(&self, operation: &'static str, error: AppError) {
        self.state.write().await.failures.insert(operation, error);
    }

    pub async fn call_count(&self, operation: &str) -> usize {
        self.state
            .read()
            .await
            .calls
            .get(operation)
            .copied()
            .unwrap_or(0)
    }

    pub async fn total_calls(&self) -> usize {
        self.state.read().await.calls.values().sum()
    }
}

/// 特定の ID プロバイダに紐づいたバックエンド接続
pub struct InMemoryActor {
    backend: InMemoryBackend,
    identity: Arc<dyn IdentityProvider>,
}

impl InMemoryActor {
    fn caller(&self) -> Result<Principal, AppError> {
        self.identity.require_identity()
    }
}

#[async_trait]
impl SocialBackend for InMemoryActor {
    async fn get_profile(&self, user: &Principal) -> Result<Profile, AppError> {
        let mut state = self.backend.state.write().await;
        state.record_call("get_profile")?;
        state
            .profile_view(user)
            .ok_or_else(|| AppError::NotFound(MISSING_PROFILE_MESSAGE.to_string()))
    }

    async fn create_or_update_profile(&self, display_name: &str, bio: &str) -> Result<(), AppError> {
        let caller = self.caller()?;
        let display_name = validate_display_name(display_name)?;
        let mut state = self.backend.state.write().await;
        state.record_call("create_or_update_profile")?;

        let profile = state
            .profiles
            .entry(caller.clone())
            .or_insert_with(|| Profile::new(caller.clone(), String::new(), String::new()));
        profile.display_name = display_name;
        profile.bio = bio.to_string();
        debug!(caller = %caller, "stored profile");
        Ok(())
    }

    async fn create_post(&self, caption: &str, image: ExternalBlob) -> Result<PostId, AppError> {
        let caller = self.caller()?;
        {
            let mut state = self.backend.state.write().await;
            state.record_call("create_post")?;
        }

        for percentage in [25, 50, 75] {
            image.report_upload_progress(percentage);
            tokio::task::yield_now().await;
        }

        let mut state = self.backend.state.write().await;
        state.next_post_id += 1;
        let post_id = PostId::new(state.next_post_id);
        let timestamp = state.next_timestamp();
        let post = Post::new(
            post_id,
            caller,
            image.detached(),
            caption.to_string(),
            timestamp,
        );
        state.posts.insert(post_id, post);
        Ok(post_id)
    }

    async fn get_post(&self, post_id: PostId) -> Result<Post, AppError> {
        let mut state = self.backend.state.write().await;
        state.record_call("get_post")?;
        state
            .posts
            .get(&post_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Post not found: {post_id}")))
    }

    async fn get_posts_by_user(&self, user: &Principal) -> Result<Vec<Post>, AppError> {
        let mut state = self.backend.state.write().await;
        state.record_call("get_posts_by_user")?;
        let mut posts: Vec<Post> = state
            .posts
            .values()
            .filter(|post| &post.author == user)
            .cloned()
            .collect();
        Post::sort_by_recency(&mut posts);
        Ok(posts)
    }

    async fn like_post(&self, post_id: PostId) -> Result<(), AppError> {
        let caller = self.caller()?;
        let mut state = self.backend.state.write().await;
        state.record_call("like_post")?;
        let post = state.post_mut(post_id)?;
        if !post.is_liked_by(&caller) {
            post.likes.push(caller);
        }
        Ok(())
    }

    async fn add_comment(&self, post_id: PostId, text: &str) -> Result<(), AppError> {
        let caller = self.caller()?;
        let text = validate_comment_text(text)?;
        let mut state = self.backend.state.write().await;
        state.record_call("add_comment")?;
        let timestamp = state.next_timestamp();
        state.post_mut(post_id)?.comments.push(Comment {
            author: caller,
            text,
            timestamp,
        });
        Ok(())
    }

    async fn follow(&self, user_to_follow: &Principal) -> Result<(), AppError> {
        let caller = self.caller()?;
        if &caller == user_to_follow {
            return Err(AppError::Backend("Cannot follow yourself".to_string()));
        }
        let mut state = self.backend.state.write().await;
        state.record_call("follow")?;
        state
            .following
            .entry(caller)
            .or_default()
            .insert(user_to_follow.clone());
        Ok(())
    }

    async fn unfollow(&self, user_to_unfollow: &Principal) -> Result<(), AppError> {
        let caller = self.caller()?;
        let mut state = self.backend.state.write().await;
        state.record_call("unfollow")?;
        if let Some(set) = state.following.get_mut(&caller) {
            set.remove(user_to_unfollow);
        }
        Ok(())
    }

    async fn search_profiles(&self, search_term: &str) -> Result<Vec<Profile>, AppError> {
        let mut state = self.backend.state.write().await;
        state.record_call("search_profiles")?;
        let needle = search_term.trim().to_lowercase();
        let ids: Vec<Principal> = state
            .profiles
            .values()
            .filter(|profile| {
                needle.is_empty() || profile.display_name.to_lowercase().contains(&needle)
            })
            .map(|profile| profile.id.clone())
            .collect();
        Ok(ids.iter().filter_map(|id| state.profile_view(id)).collect())
    }

    async fn get_caller_user_role(&self) -> Result<UserRole, AppError> {
        let mut state = self.backend.state.write().await;
        state.record_call("get_caller_user_role")?;
        Ok(match self.identity.identity() {
            Some(caller) => state.role_of(&caller),
            None => UserRole::Guest,
        })
    }

    async fn assign_caller_user_role(&self, user: &Principal, role: UserRole) -> Result<(), AppError> {
        let caller = self.caller()?;
        let mut state = self.backend.state.write().await;
        state.record_call("assign_caller_user_role")?;
        if !state.role_of(&caller).is_admin() {
            return Err(AppError::Unauthorized(
                "Only admins can assign user roles".to_string(),
            ));
        }
        state.roles.insert(user.clone(), role);
        Ok(())
    }

    async fn is_caller_admin(&self) -> Result<bool, AppError> {
        let mut state = self.backend.state.write().await;
        state.record_call("is_caller_admin")?;
        Ok(self
            .identity
            .identity()
            .is_some_and(|caller| state.role_of(&caller).is_admin()))
    }
}
