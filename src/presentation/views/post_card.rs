use super::LoadState;
use crate::application::services::{PostService, ProfileService};
use crate::domain::entities::{Post, Profile};
use crate::domain::value_objects::Principal;
use crate::presentation::forms::{CommentForm, Validate};
use crate::presentation::router::Router;
use crate::shared::AppError;
use futures::future::join_all;
use std::sync::Arc;

pub struct PostCardView {
    posts: Arc<PostService>,
    profiles: Arc<ProfileService>,
    router: Arc<Router>,
    caller: Option<Principal>,
    post: Post,
    author: LoadState<Profile>,
}

impl PostCardView {
    pub fn new(
        posts: Arc<PostService>,
        profiles: Arc<ProfileService>,
        router: Arc<Router>,
        caller: Option<Principal>,
        post: Post,
    ) -> Self {
        Self {
            posts,
            profiles,
            router,
            caller,
            post,
            author: LoadState::Idle,
        }
    }

    pub fn post(&self) -> &Post {
        &self.post
    }

    pub fn author(&self) -> &LoadState<Profile> {
        &self.author
    }

    /// 作者の表示名。未取得なら principal をそのまま使う
    pub fn author_name(&self) -> String {
        self.author
            .value()
            .map(|profile| profile.display_name.clone())
            .unwrap_or_else(|| self.post.author.to_string())
    }

    /// Loads the author's profile through the shared cache.
    pub async fn load_author(&mut self) {
        let ticket = self.router.ticket();
        self.author = LoadState::Loading;
        let result = self.profiles.profile(&self.post.author).await;
        self.author.settle(&self.router, ticket, result);
    }

    /// Display names for the post's comments, in comment order.
    pub async fn comment_author_names(&self) -> Vec<String> {
        let lookups = self
            .post
            .comments
            .iter()
            .map(|comment| self.profiles.profile(&comment.author));
        join_all(lookups)
            .await
            .into_iter()
            .zip(&self.post.comments)
            .map(|(profile, comment)| match profile {
                Ok(profile) => profile.display_name,
                Err(_) => comment.author.to_string(),
            })
            .collect()
    }

    pub fn is_liked_by_caller(&self) -> bool {
        self.caller
            .as_ref()
            .is_some_and(|caller| self.post.is_liked_by(caller))
    }

    pub fn likes_count(&self) -> usize {
        self.post.likes_count()
    }

    pub fn comments_count(&self) -> usize {
        self.post.comments_count()
    }

    pub fn image_url(&self) -> String {
        self.post.image.direct_url()
    }

    pub async fn like(&mut self) -> Result<(), AppError> {
        self.posts.like_post(self.post.id).await?;
        self.refresh().await
    }

    pub async fn comment(&mut self, form: CommentForm) -> Result<(), AppError> {
        form.validate()?;
        self.posts.add_comment(self.post.id, form.text()).await?;
        self.refresh().await
    }

    // 変更後の投稿を取り直す
    async fn refresh(&mut self) -> Result<(), AppError> {
        self.post = self.posts.post(self.post.id).await?;
        Ok(())
    }
}
