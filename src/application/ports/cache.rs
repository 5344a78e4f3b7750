use crate::domain::entities::{Post, Profile};
use crate::domain::value_objects::{QueryFilter, QueryKey, UserRole};
use crate::shared::error::AppError;
use std::time::{Duration, Instant};

/// キャッシュに保存されるクエリ結果
#[derive(Debug, Clone, PartialEq)]
pub enum QueryData {
    Profile(Profile),
    MaybeProfile(Option<Profile>),
    Profiles(Vec<Profile>),
    Post(Post),
    Posts(Vec<Post>),
    Role(UserRole),
    Flag(bool),
}

impl QueryData {
    pub fn variant_name(&self) -> &'static str {
        match self {
            QueryData::Profile(_) => "Profile",
            QueryData::MaybeProfile(_) => "MaybeProfile",
            QueryData::Profiles(_) => "Profiles",
            QueryData::Post(_) => "Post",
            QueryData::Posts(_) => "Posts",
            QueryData::Role(_) => "Role",
            QueryData::Flag(_) => "Flag",
        }
    }
}

/// Typed values that can live in the query cache.
pub trait QueryValue: Sized + Send + 'static {
    fn into_data(self) -> QueryData;
    fn from_data(data: QueryData) -> Result<Self, AppError>;
}

macro_rules! query_value {
    ($ty:ty, $variant:ident) => {
        impl QueryValue for $ty {
            fn into_data(self) -> QueryData {
                QueryData::$variant(self)
            }

            fn from_data(data: QueryData) -> Result<Self, AppError> {
                match data {
                    QueryData::$variant(value) => Ok(value),
                    other => Err(AppError::Internal(format!(
                        "Cached value type mismatch: expected {}, found {}",
                        stringify!($variant),
                        other.variant_name()
                    ))),
                }
            }
        }
    };
}

query_value!(Profile, Profile);
query_value!(Option<Profile>, MaybeProfile);
query_value!(Vec<Profile>, Profiles);
query_value!(Post, Post);
query_value!(Vec<Post>, Posts);
query_value!(UserRole, Role);
query_value!(bool, Flag);

/// クエリ結果ストアのポート
///
/// Implementations hold plain values; in-flight de-duplication and ordering
/// are handled by the query client that owns the store.
pub trait QueryStore: Send {
    /// Returns the value only while it is fresh.
    fn lookup(&self, key: &QueryKey, now: Instant) -> Option<QueryData>;

    /// Stores a value; `stale_time` of `None` keeps it fresh until invalidated.
    fn store(&mut self, key: QueryKey, data: QueryData, stale_time: Option<Duration>, now: Instant);

    /// Marks matching entries stale and returns how many were affected.
    fn invalidate(&mut self, filter: &QueryFilter) -> usize;

    fn clear(&mut self);

    /// Drops entries that are stale and older than `gc_window`.
    fn collect_garbage(&mut self, gc_window: Duration, now: Instant) -> usize;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_data_rejects_mismatched_variant() {
        let err = Vec::<Post>::from_data(QueryData::Flag(true)).unwrap_err();
        assert_eq!(
            err,
            AppError::Internal("Cached value type mismatch: expected Posts, found Flag".into())
        );
        assert!(bool::from_data(true.into_data()).unwrap());
    }
}
