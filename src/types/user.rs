//! User entities.
//!
//! The API's `user` type, trimmed to the fields the default filter returns,
//! plus a placeholder for users that could not be resolved (usually
//! deleted accounts).

use serde::{Deserialize, Serialize};

/// Site user id.
pub type UserId = u64;

/// Badge tallies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgeCounts {
    #[serde(default)]
    pub gold: u32,
    #[serde(default)]
    pub silver: u32,
    #[serde(default)]
    pub bronze: u32,
}

/// Account type as reported by the API.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserType {
    Unregistered,
    #[default]
    Registered,
    Moderator,
    TeamAdmin,
    DoesNotExist,
}

/// A user returned by the API.
///
/// `display_name` is unescaped when fetched through an unsafe filter (the
/// default one is); sanitise it before putting it in markup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExistingUser {
    pub user_id: UserId,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub reputation: u64,
    #[serde(default)]
    pub profile_image: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub badge_counts: BadgeCounts,
    #[serde(default)]
    pub is_employee: bool,
    #[serde(default)]
    pub user_type: UserType,
}

impl ExistingUser {
    pub fn is_moderator(&self) -> bool {
        self.user_type == UserType::Moderator
    }

    pub fn is_admin(&self) -> bool {
        self.user_type == UserType::TeamAdmin
    }
}

/// Stand-in for an id the API did not return.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingUser {
    pub user_id: UserId,
    pub link: String,
}

impl MissingUser {
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            link: format!("/users/{user_id}"),
        }
    }
}

/// A resolved user: either fetched, or a placeholder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum User {
    Existing(ExistingUser),
    Missing(MissingUser),
}

impl User {
    pub fn user_id(&self) -> UserId {
        match self {
            User::Existing(u) => u.user_id,
            User::Missing(u) => u.user_id,
        }
    }

    pub fn link(&self) -> &str {
        match self {
            User::Existing(u) => &u.link,
            User::Missing(u) => &u.link,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, User::Missing(_))
    }

    pub fn as_existing(&self) -> Option<&ExistingUser> {
        match self {
            User::Existing(u) => Some(u),
            User::Missing(_) => None,
        }
    }
}

impl From<ExistingUser> for User {
    fn from(user: ExistingUser) -> Self {
        User::Existing(user)
    }
}

impl From<MissingUser> for User {
    fn from(user: MissingUser) -> Self {
        User::Missing(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_api_user() {
        let json = r#"{
            "user_id": 42,
            "display_name": "Test User",
            "reputation": 17424,
            "profile_image": "https://images.example.com/42.png",
            "link": "https://example.com/users/42/test-user",
            "badge_counts": {"gold": 1, "silver": 2, "bronze": 3},
            "is_employee": false,
            "user_type": "team_admin"
        }"#;
        let user: ExistingUser = serde_json::from_str(json).unwrap();
        assert_eq!(user.user_id, 42);
        assert_eq!(user.badge_counts.silver, 2);
        assert!(user.is_admin());
        assert!(!user.is_moderator());
    }

    #[test]
    fn optional_fields_default() {
        let user: ExistingUser = serde_json::from_str(r#"{"user_id": 7}"#).unwrap();
        assert_eq!(user.user_type, UserType::Registered);
        assert_eq!(user.badge_counts, BadgeCounts::default());
    }

    #[test]
    fn missing_user_links_to_profile() {
        let user = User::from(MissingUser::new(42));
        assert_eq!(user.user_id(), 42);
        assert_eq!(user.link(), "/users/42");
        assert!(user.is_missing());
        assert!(user.as_existing().is_none());
    }
}
