use super::external_blob::ExternalBlob;
use crate::domain::value_objects::{PostId, Principal};

#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    pub author: Principal,
    pub text: String,
    pub timestamp: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Post {
    pub id: PostId,
    pub author: Principal,
    pub image: ExternalBlob,
    pub caption: String,
    /// Creation time in nanoseconds since the Unix epoch.
    pub timestamp: i64,
    pub likes: Vec<Principal>,
    pub comments: Vec<Comment>,
}

impl Post {
    pub fn new(
        id: PostId,
        author: Principal,
        image: ExternalBlob,
        caption: String,
        timestamp: i64,
    ) -> Self {
        Self {
            id,
            author,
            image,
            caption,
            timestamp,
            likes: Vec::new(),
            comments: Vec::new(),
        }
    }

    pub fn is_liked_by(&self, principal: &Principal) -> bool {
        self.likes.iter().any(|liker| liker == principal)
    }

    pub fn likes_count(&self) -> usize {
        self.likes.len()
    }

    pub fn comments_count(&self) -> usize {
        self.comments.len()
    }

    /// Newest first.
    pub fn sort_by_recency(posts: &mut [Post]) {
        posts.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn principal(text: &str) -> Principal {
        Principal::from_text(text).unwrap()
    }

    fn post_at(id: u64, timestamp: i64) -> Post {
        Post::new(
            PostId::new(id),
            principal("alice"),
            ExternalBlob::from_url("https://example.invalid/p.png"),
            String::new(),
            timestamp,
        )
    }

    #[test]
    fn sort_by_recency_orders_newest_first() {
        let mut posts = vec![post_at(1, 5), post_at(2, 1), post_at(3, 3)];
        Post::sort_by_recency(&mut posts);
        let timestamps: Vec<i64> = posts.iter().map(|p| p.timestamp).collect();
        assert_eq!(timestamps, vec![5, 3, 1]);
    }

    #[test]
    fn liked_state_and_counts_follow_lists() {
        let mut post = post_at(1, 1);
        post.likes.push(principal("bob"));
        post.comments.push(Comment {
            author: principal("bob"),
            text: "nice".into(),
            timestamp: 2,
        });

        assert!(post.is_liked_by(&principal("bob")));
        assert!(!post.is_liked_by(&principal("alice")));
        assert_eq!(post.likes_count(), 1);
        assert_eq!(post.comments_count(), 1);
    }
}
