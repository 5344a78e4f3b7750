use crate::application::ports::backend::SocialBackend;
use crate::application::ports::identity::IdentityProvider;
use crate::application::services::invalidation::InvalidationSet;
use crate::application::services::query_client::QueryClient;
use crate::domain::entities::{ExternalBlob, Post};
use crate::domain::value_objects::{PostId, Principal, QueryKey};
use crate::shared::validation::validate_comment_text;
use crate::shared::AppError;
use futures::future::join_all;
use std::sync::Arc;
use tracing::{info, warn};

pub struct PostService {
    backend: Arc<dyn SocialBackend>,
    identity: Arc<dyn IdentityProvider>,
    queries: Arc<QueryClient>,
}

impl PostService {
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

    /// 全ユーザーの投稿を新しい順で返す
    pub async fn all_posts(&self) -> Result<Vec<Post>, AppError> {
        let backend = Arc::clone(&self.backend);
        self.queries
            .fetch(QueryKey::AllPosts, move || collect_feed(backend))
            .await
    }

    pub async fn post(&self, post_id: PostId) -> Result<Post, AppError> {
        let backend = Arc::clone(&self.backend);
        self.queries
            .fetch(QueryKey::Post(post_id), move || async move {
                backend.get_post(post_id).await
            })
            .await
    }

    pub async fn posts_by_user(&self, user: &Principal) -> Result<Vec<Post>, AppError> {
        let backend = Arc::clone(&self.backend);
        let user = user.clone();
        self.queries
            .fetch(QueryKey::UserPosts(user.clone()), move || async move {
                backend.get_posts_by_user(&user).await
            })
            .await
    }

    /// Uploads `image` with `caption`. A progress observer registered on the
    /// image is always terminated, whether or not the upload succeeds.
    pub async fn create_post(&self, caption: &str, image: ExternalBlob) -> Result<PostId, AppError> {
        let author = match self.identity.require_identity() {
            Ok(author) => author,
            Err(err) => {
                image.fail_upload();
                return Err(err);
            }
        };
        let caption = caption.trim();
        let observer = image.clone();

        let result = self
            .queries
            .mutate(
                &InvalidationSet::post_created(&author),
                self.backend.create_post(caption, image),
            )
            .await;

        match &result {
            Ok(post_id) => {
                observer.finish_upload();
                info!(author = %author, post_id = %post_id, "post created");
            }
            Err(_) => observer.fail_upload(),
        }
        result
    }

    /// Liking is idempotent on the backend; a repeated like leaves one entry.
    pub async fn like_post(&self, post_id: PostId) -> Result<(), AppError> {
        self.identity.require_identity()?;
        self.queries
            .mutate(
                &InvalidationSet::post_liked(post_id),
                self.backend.like_post(post_id),
            )
            .await
    }

    pub async fn add_comment(&self, post_id: PostId, text: &str) -> Result<(), AppError> {
        let text = validate_comment_text(text)?;
        self.identity.require_identity()?;
        self.queries
            .mutate(
                &InvalidationSet::comment_added(post_id),
                self.backend.add_comment(post_id, &text),
            )
            .await
    }
}

// 各ユーザーの投稿取得に失敗しても、そのユーザー分を空として扱う
async fn collect_feed(backend: Arc<dyn SocialBackend>) -> Result<Vec<Post>, AppError> {
    let profiles = backend.search_profiles("").await?;

    let per_user = profiles.iter().map(|profile| {
        let backend = Arc::clone(&backend);
        async move {
            match backend.get_posts_by_user(&profile.id).await {
                Ok(posts) => posts,
                Err(err) => {
                    warn!(user = %profile.id, error = %err, "skipping user posts in feed");
                    Vec::new()
                }
            }
        }
    });

    let mut posts: Vec<Post> = join_all(per_user).await.into_iter().flatten().collect();
    Post::sort_by_recency(&mut posts);
    Ok(posts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::shared::tests::fixtures::{
        principal, query_client, sample_post, sample_profile, signed_in, signed_out,
    };
    use crate::application::shared::tests::mocks::MockBackend;
    use crate::shared::ValidationFailureKind;

    fn service(backend: MockBackend, identity: Arc<dyn IdentityProvider>) -> PostService {
        PostService::new(Arc::new(backend), identity, query_client())
    }

    #[tokio::test]
    async fn feed_merges_users_and_sorts_newest_first() {
        let mut backend = MockBackend::new();
        backend
            .expect_search_profiles()
            .withf(|term| term.is_empty())
            .times(1)
            .returning(|_| {
                Ok(vec![
                    sample_profile("alice", "Alice"),
                    sample_profile("bob", "Bob"),
                ])
            });
        backend
            .expect_get_posts_by_user()
            .times(2)
            .returning(|user| match user.as_str() {
                "alice" => Ok(vec![sample_post(1, "alice", 5), sample_post(2, "alice", 1)]),
                _ => Ok(vec![sample_post(3, "bob", 3)]),
            });

        let service = service(backend, signed_in("alice"));
        let feed = service.all_posts().await.expect("feed");
        let timestamps: Vec<i64> = feed.iter().map(|p| p.timestamp).collect();
        assert_eq!(timestamps, vec![5, 3, 1]);

        // 30 秒以内の再取得はキャッシュから
        let again = service.all_posts().await.expect("cached feed");
        assert_eq!(again.len(), 3);
    }

    #[tokio::test]
    async fn feed_tolerates_single_user_failure() {
        let mut backend = MockBackend::new();
        backend.expect_search_profiles().returning(|_| {
            Ok(vec![
                sample_profile("alice", "Alice"),
                sample_profile("bob", "Bob"),
            ])
        });
        backend
            .expect_get_posts_by_user()
            .returning(|user| match user.as_str() {
                "alice" => Err(AppError::Network("timeout".into())),
                _ => Ok(vec![sample_post(3, "bob", 3)]),
            });

        let service = service(backend, signed_out());
        let feed = service.all_posts().await.expect("feed");
        assert_eq!(feed.len(), 1);
        assert_eq!(feed[0].author, principal("bob"));
    }

    #[tokio::test]
    async fn feed_fails_when_profile_listing_fails() {
        let mut backend = MockBackend::new();
        backend
            .expect_search_profiles()
            .returning(|_| Err(AppError::Network("offline".into())));
        backend.expect_get_posts_by_user().never();

        let service = service(backend, signed_out());
        assert!(service.all_posts().await.is_err());
    }

    #[tokio::test]
    async fn like_refreshes_post_and_author_lists() {
        let mut backend = MockBackend::new();
        backend
            .expect_get_post()
            .times(2)
            .returning(|id| Ok(sample_post(id.value(), "bob", 1)));
        backend
            .expect_get_posts_by_user()
            .times(2)
            .returning(|user| Ok(vec![sample_post(1, user.as_str(), 1)]));
        backend.expect_like_post().times(1).returning(|_| Ok(()));

        let service = service(backend, signed_in("alice"));
        let id = PostId::new(1);
        service.post(id).await.unwrap();
        service.posts_by_user(&principal("bob")).await.unwrap();

        service.like_post(id).await.expect("like");

        service.post(id).await.unwrap();
        service.posts_by_user(&principal("bob")).await.unwrap();
    }

    #[tokio::test]
    async fn failed_like_keeps_cached_post() {
        let mut backend = MockBackend::new();
        backend
            .expect_get_post()
            .times(1)
            .returning(|id| Ok(sample_post(id.value(), "bob", 1)));
        backend
            .expect_like_post()
            .returning(|_| Err(AppError::Backend("trap".into())));

        let service = service(backend, signed_in("alice"));
        let id = PostId::new(1);
        service.post(id).await.unwrap();
        assert!(service.like_post(id).await.is_err());
        service.post(id).await.unwrap();
    }

    #[tokio::test]
    async fn blank_comment_is_rejected_before_remote_call() {
        let mut backend = MockBackend::new();
        backend.expect_add_comment().never();

        let service = service(backend, signed_in("alice"));
        let err = service.add_comment(PostId::new(1), " \n ").await.unwrap_err();
        assert_eq!(
            err.validation_kind(),
            Some(ValidationFailureKind::RequiredFieldMissing)
        );
    }

    #[tokio::test]
    async fn create_post_terminates_progress_on_failure() {
        let mut backend = MockBackend::new();
        backend
            .expect_create_post()
            .returning(|_, image| {
                image.report_upload_progress(30);
                Err(AppError::Network("upload aborted".into()))
            });

        let service = service(backend, signed_in("alice"));
        let (image, mut progress) = ExternalBlob::from_bytes(vec![1u8, 2]).with_upload_progress();
        assert!(service.create_post("caption", image).await.is_err());

        assert_eq!(progress.next().await, Some(30));
        assert_eq!(progress.next().await, None);
    }

    #[tokio::test]
    async fn create_post_passes_trimmed_caption_and_completes_progress() {
        let mut backend = MockBackend::new();
        backend
            .expect_create_post()
            .withf(|caption, _| caption == "sunset")
            .times(1)
            .returning(|_, _| Ok(PostId::new(9)));

        let service = service(backend, signed_in("alice"));
        let (image, mut progress) = ExternalBlob::from_bytes(vec![1u8]).with_upload_progress();
        let id = service.create_post("  sunset ", image).await.expect("create");

        assert_eq!(id, PostId::new(9));
        assert_eq!(progress.next().await, Some(100));
        assert_eq!(progress.next().await, None);
    }
}
