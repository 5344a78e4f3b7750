use crate::domain::value_objects::{PostId, Principal, QueryFilter, QueryKey, QueryKind};

/// Keys a mutation marks stale once it succeeds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvalidationSet {
    filters: Vec<QueryFilter>,
}

impl InvalidationSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, filter: impl Into<QueryFilter>) -> Self {
        self.filters.push(filter.into());
        self
    }

    pub fn filters(&self) -> &[QueryFilter] {
        &self.filters
    }

    pub fn covers(&self, key: &QueryKey) -> bool {
        self.filters.iter().any(|filter| filter.matches(key))
    }

    /// プロフィール作成・更新
    pub fn profile_saved(caller: &Principal) -> Self {
        Self::new()
            .with(QueryKey::CurrentUserProfile)
            .with(QueryKey::Profile(caller.clone()))
    }

    /// 投稿作成。作者の投稿数が変わるためプロフィールも無効化する
    pub fn post_created(author: &Principal) -> Self {
        Self::new()
            .with(QueryKey::AllPosts)
            .with(QueryKey::UserPosts(author.clone()))
            .with(QueryKey::Profile(author.clone()))
            .with(QueryKey::CurrentUserProfile)
    }

    /// The author is not known from the id alone, so every per-author list goes.
    pub fn post_liked(post_id: PostId) -> Self {
        Self::new()
            .with(QueryKey::AllPosts)
            .with(QueryKey::Post(post_id))
            .with(QueryKind::UserPosts)
    }

    pub fn comment_added(post_id: PostId) -> Self {
        Self::post_liked(post_id)
    }

    /// フォロー・フォロー解除
    pub fn follow_changed(caller: &Principal, target: &Principal) -> Self {
        Self::new()
            .with(QueryKey::Profile(target.clone()))
            .with(QueryKey::CurrentUserProfile)
            .with(QueryKey::Profile(caller.clone()))
    }

    pub fn role_assigned() -> Self {
        Self::new()
            .with(QueryKey::CallerRole)
            .with(QueryKey::IsCallerAdmin)
    }

    /// Identity-scoped keys, refreshed when a new caller signs in.
    pub fn identity_changed() -> Self {
        Self::new()
            .with(QueryKey::CurrentUserProfile)
            .with(QueryKey::CallerRole)
            .with(QueryKey::IsCallerAdmin)
    }
}
