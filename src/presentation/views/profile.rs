use super::LoadState;
use crate::application::ports::identity::IdentityProvider;
use crate::application::services::{PostService, ProfileService};
use crate::domain::entities::{Post, Profile};
use crate::domain::value_objects::Principal;
use crate::presentation::forms::{ProfileForm, Validate};
use crate::presentation::router::{Router, View};
use crate::shared::AppError;
use std::sync::Arc;

/// プロフィール画面。表示対象はルーターの viewed identity
pub struct ProfileView {
    profiles: Arc<ProfileService>,
    posts: Arc<PostService>,
    identity: Arc<dyn IdentityProvider>,
    router: Arc<Router>,
    profile: LoadState<Profile>,
    user_posts: LoadState<Vec<Post>>,
}

impl ProfileView {
    pub fn new(
        profiles: Arc<ProfileService>,
        posts: Arc<PostService>,
        identity: Arc<dyn IdentityProvider>,
        router: Arc<Router>,
    ) -> Self {
        Self {
            profiles,
            posts,
            identity,
            router,
            profile: LoadState::Idle,
            user_posts: LoadState::Idle,
        }
    }

    pub fn profile(&self) -> &LoadState<Profile> {
        &self.profile
    }

    pub fn posts(&self) -> &LoadState<Vec<Post>> {
        &self.user_posts
    }

    pub fn viewed_identity(&self) -> Option<Principal> {
        let route = self.router.current();
        match route.view {
            View::Profile => route.viewed_identity,
            _ => None,
        }
    }

    pub fn is_own_profile(&self) -> bool {
        match (self.identity.identity(), self.viewed_identity()) {
            (Some(caller), Some(viewed)) => caller == viewed,
            _ => false,
        }
    }

    /// Loads the profile and posts of the viewed identity in parallel.
    pub async fn load(&mut self) {
        let Some(user) = self.viewed_identity() else {
            return;
        };
        let ticket = self.router.ticket();
        self.profile = LoadState::Loading;
        self.user_posts = LoadState::Loading;

        let (profile, posts) =
            tokio::join!(self.profiles.profile(&user), self.posts.posts_by_user(&user));
        self.profile.settle(&self.router, ticket, profile);
        self.user_posts.settle(&self.router, ticket, posts);
    }

    pub async fn follow(&mut self) -> Result<(), AppError> {
        let user = self.follow_target()?;
        self.profiles.follow(&user).await?;
        self.load().await;
        Ok(())
    }

    pub async fn unfollow(&mut self) -> Result<(), AppError> {
        let user = self.follow_target()?;
        self.profiles.unfollow(&user).await?;
        self.load().await;
        Ok(())
    }

    /// 自分のプロフィール表示中のみ編集できる
    pub async fn edit_profile(&mut self, form: ProfileForm) -> Result<(), AppError> {
        if !self.is_own_profile() {
            return Err(AppError::Unauthorized(
                "Only your own profile can be edited".to_string(),
            ));
        }
        form.validate()?;
        self.profiles
            .create_or_update_profile(form.display_name(), form.bio())
            .await?;
        self.load().await;
        Ok(())
    }

    fn follow_target(&self) -> Result<Principal, AppError> {
        self.viewed_identity()
            .ok_or_else(|| AppError::Internal("No profile is being viewed".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::shared::tests::fixtures::{
        principal, query_client, sample_post, sample_profile, signed_in,
    };
    use crate::application::shared::tests::mocks::MockBackend;
    use std::sync::atomic::{AtomicU64, Ordering};

    fn view(backend: MockBackend, caller: &str, router: Arc<Router>) -> ProfileView {
        let backend: Arc<MockBackend> = Arc::new(backend);
        let identity = signed_in(caller);
        let queries = query_client();
        let profiles = ProfileService::new(backend.clone(), identity.clone(), queries.clone());
        let posts = PostService::new(backend, identity.clone(), queries);
        ProfileView::new(Arc::new(profiles), Arc::new(posts), identity, router)
    }

    #[tokio::test]
    async fn loads_viewed_profile_and_posts() {
        let mut backend = MockBackend::new();
        backend
            .expect_get_profile()
            .returning(|id| Ok(sample_profile(id.as_str(), "Bob")));
        backend
            .expect_get_posts_by_user()
            .returning(|id| Ok(vec![sample_post(4, id.as_str(), 1)]));

        let router = Arc::new(Router::new());
        router.select_profile(&principal("bob"));
        let mut profile = view(backend, "alice", router);
        profile.load().await;

        assert!(!profile.is_own_profile());
        assert_eq!(profile.profile().value().unwrap().display_name, "Bob");
        assert_eq!(profile.posts().value().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn own_profile_is_detected() {
        let router = Arc::new(Router::new());
        router.navigate_to_own_profile(Some(&principal("alice")));
        let profile = view(MockBackend::new(), "alice", router);
        assert!(profile.is_own_profile());
    }

    #[tokio::test]
    async fn nothing_loads_outside_profile_route() {
        let mut backend = MockBackend::new();
        backend.expect_get_profile().never();
        backend.expect_get_posts_by_user().never();

        let mut profile = view(backend, "alice", Arc::new(Router::new()));
        profile.load().await;
        assert_eq!(profile.profile(), &LoadState::Idle);
        assert!(profile.follow().await.is_err());
    }

    #[tokio::test]
    async fn follow_reloads_follower_count() {
        let followers = Arc::new(AtomicU64::new(0));
        let mut backend = MockBackend::new();
        let seen = followers.clone();
        backend.expect_get_profile().returning(move |id| {
            let mut profile = sample_profile(id.as_str(), "Bob");
            profile.followers_count = seen.load(Ordering::SeqCst);
            Ok(profile)
        });
        backend.expect_get_posts_by_user().returning(|_| Ok(Vec::new()));
        let bump = followers.clone();
        backend.expect_follow().times(1).returning(move |_| {
            bump.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        let router = Arc::new(Router::new());
        router.select_profile(&principal("bob"));
        let mut profile = view(backend, "alice", router);
        profile.load().await;
        assert_eq!(profile.profile().value().unwrap().followers_count, 0);

        profile.follow().await.expect("follow");
        assert_eq!(profile.profile().value().unwrap().followers_count, 1);
    }

    #[tokio::test]
    async fn edit_profile_saves_and_reloads_own_profile() {
        let saved = Arc::new(std::sync::Mutex::new(("Alice".to_string(), String::new())));
        let mut backend = MockBackend::new();
        let current = saved.clone();
        backend.expect_get_profile().returning(move |id| {
            let (name, bio) = current.lock().unwrap().clone();
            let mut profile = sample_profile(id.as_str(), &name);
            profile.bio = bio;
            Ok(profile)
        });
        backend.expect_get_posts_by_user().returning(|_| Ok(Vec::new()));
        let store = saved.clone();
        backend
            .expect_create_or_update_profile()
            .withf(|name, bio| name == "Alicia" && bio == "film only")
            .times(1)
            .returning(move |name, bio| {
                *store.lock().unwrap() = (name.to_string(), bio.to_string());
                Ok(())
            });

        let router = Arc::new(Router::new());
        router.navigate_to_own_profile(Some(&principal("alice")));
        let mut profile = view(backend, "alice", router);
        profile.load().await;
        assert_eq!(profile.profile().value().unwrap().display_name, "Alice");

        assert!(profile.edit_profile(ProfileForm::new("  ", "")).await.is_err());
        profile
            .edit_profile(ProfileForm::new(" Alicia ", " film only "))
            .await
            .expect("edit");
        let loaded = profile.profile().value().unwrap();
        assert_eq!(loaded.display_name, "Alicia");
        assert_eq!(loaded.bio, "film only");
    }

    #[tokio::test]
    async fn edit_profile_is_refused_on_other_profiles() {
        let mut backend = MockBackend::new();
        backend.expect_create_or_update_profile().never();

        let router = Arc::new(Router::new());
        router.select_profile(&principal("bob"));
        let mut profile = view(backend, "alice", router);
        let err = profile
            .edit_profile(ProfileForm::new("Bob", ""))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }
}
