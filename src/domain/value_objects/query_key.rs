use super::{PostId, Principal};
use std::fmt;

/// Logical resource descriptor that cached query results are keyed by.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    CurrentUserProfile,
    Profile(Principal),
    AllPosts,
    Post(PostId),
    UserPosts(Principal),
    SearchProfiles(String),
    CallerRole,
    IsCallerAdmin,
}

/// Resource kind of a [`QueryKey`], used for kind-wide invalidation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKind {
    CurrentUserProfile,
    Profile,
    AllPosts,
    Post,
    UserPosts,
    SearchProfiles,
    CallerRole,
    IsCallerAdmin,
}

impl QueryKey {
    pub fn kind(&self) -> QueryKind {
        match self {
            QueryKey::CurrentUserProfile => QueryKind::CurrentUserProfile,
            QueryKey::Profile(_) => QueryKind::Profile,
            QueryKey::AllPosts => QueryKind::AllPosts,
            QueryKey::Post(_) => QueryKind::Post,
            QueryKey::UserPosts(_) => QueryKind::UserPosts,
            QueryKey::SearchProfiles(_) => QueryKind::SearchProfiles,
            QueryKey::CallerRole => QueryKind::CallerRole,
            QueryKey::IsCallerAdmin => QueryKind::IsCallerAdmin,
        }
    }
}

impl QueryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryKind::CurrentUserProfile => "currentUserProfile",
            QueryKind::Profile => "profile",
            QueryKind::AllPosts => "allPosts",
            QueryKind::Post => "post",
            QueryKind::UserPosts => "userPosts",
            QueryKind::SearchProfiles => "searchProfiles",
            QueryKind::CallerRole => "callerRole",
            QueryKind::IsCallerAdmin => "isCallerAdmin",
        }
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = self.kind().as_str();
        match self {
            QueryKey::Profile(principal) | QueryKey::UserPosts(principal) => {
                write!(f, "{kind}:{principal}")
            }
            QueryKey::Post(id) => write!(f, "{kind}:{id}"),
            QueryKey::SearchProfiles(term) => write!(f, "{kind}:{term:?}"),
            _ => f.write_str(kind),
        }
    }
}

/// Selects cached keys for invalidation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryFilter {
    Exact(QueryKey),
    Kind(QueryKind),
}

impl QueryFilter {
    pub fn matches(&self, key: &QueryKey) -> bool {
        match self {
            QueryFilter::Exact(expected) => expected == key,
            QueryFilter::Kind(kind) => key.kind() == *kind,
        }
    }
}

impl From<QueryKey> for QueryFilter {
    fn from(key: QueryKey) -> Self {
        QueryFilter::Exact(key)
    }
}

impl From<QueryKind> for QueryFilter {
    fn from(kind: QueryKind) -> Self {
        QueryFilter::Kind(kind)
    }
}
