use crate::domain::value_objects::Principal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Profile {
    pub id: Principal,
    pub display_name: String,
    pub bio: String,
    pub followers_count: u64,
    pub following_count: u64,
    pub posts_count: u64,
}

impl Profile {
    pub fn new(id: Principal, display_name: String, bio: String) -> Self {
        Self {
            id,
            display_name,
            bio,
            followers_count: 0,
            following_count: 0,
            posts_count: 0,
        }
    }

    /// アバター表示用の頭文字
    pub fn initials(&self) -> String {
        self.display_name
            .split_whitespace()
            .filter_map(|word| word.chars().next())
            .take(2)
            .flat_map(char::to_uppercase)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initials_use_first_two_words() {
        let id = Principal::from_text("alice").unwrap();
        let profile = Profile::new(id.clone(), "ada lovelace byron".into(), String::new());
        assert_eq!(profile.initials(), "AL");
        assert_eq!(Profile::new(id, String::new(), String::new()).initials(), "");
    }
}
