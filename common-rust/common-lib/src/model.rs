//! Client-side view of users and follow relationships.

use crate::wire::RawUser;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Image shown when a user has no avatar, or when theirs fails to load.
pub const PLACEHOLDER_AVATAR_URL: &str = "https://placehold.co/100x100/334155/64748b?text=U";

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: String,
    pub username: String,
    pub full_name: String,
    pub avatar_url: String,
    pub followers_count: u64,
    pub following_count: u64,
    pub bio: Option<String>,
    pub is_friend: bool,
}

impl From<RawUser> for UserSummary {
    fn from(raw: RawUser) -> Self {
        let username = raw.username.unwrap_or_default();
        let full_name = full_name(
            raw.first_name.as_deref(),
            raw.last_name.as_deref(),
            &username,
        );
        UserSummary {
            id: raw.uid,
            username,
            full_name,
            avatar_url: raw.avatar_url.unwrap_or_default(),
            followers_count: raw.followers_count.unwrap_or(0),
            following_count: raw.following_count.unwrap_or(0),
            bio: raw.bio,
            is_friend: raw.is_friend.unwrap_or(false),
        }
    }
}

/// `first last` trimmed, or the username when both names are blank.
pub fn full_name(first_name: Option<&str>, last_name: Option<&str>, username: &str) -> String {
    let joined = format!(
        "{} {}",
        first_name.unwrap_or_default(),
        last_name.unwrap_or_default()
    );
    let trimmed = joined.trim();
    if trimmed.is_empty() {
        username.to_string()
    } else {
        trimmed.to_string()
    }
}

/// A user reached through a follower or following edge.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FollowEntry {
    pub user: UserSummary,
    pub is_friend: bool,
}

impl FollowEntry {
    pub fn new(raw: RawUser, is_friend: bool) -> Self {
        let mut user = UserSummary::from(raw);
        user.is_friend = is_friend;
        FollowEntry { user, is_friend }
    }

    pub fn id(&self) -> &str {
        &self.user.id
    }
}

/// A user as shown on the admin screen, with the fields an admin may edit.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ManagedUser {
    pub summary: UserSummary,
    pub email: Option<String>,
    pub first_name: String,
    pub last_name: String,
}

impl From<RawUser> for ManagedUser {
    fn from(raw: RawUser) -> Self {
        let email = raw.email.clone();
        let first_name = raw.first_name.clone().unwrap_or_default();
        let last_name = raw.last_name.clone().unwrap_or_default();
        let mut summary = UserSummary::from(raw);
        if summary.avatar_url.is_empty() {
            summary.avatar_url = PLACEHOLDER_AVATAR_URL.to_string();
        }
        summary.bio = Some(summary.bio.unwrap_or_default());
        ManagedUser {
            summary,
            email,
            first_name,
            last_name,
        }
    }
}

impl ManagedUser {
    pub fn id(&self) -> &str {
        &self.summary.id
    }
}

/// Follow status of a listed user relative to the viewer.
///
/// `None` means the row offers no follow affordance at all.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FollowStatus {
    #[default]
    None,
    Follow,
    Following,
}

impl FollowStatus {
    /// Status shown for a row: a friend is always displayed as followed.
    pub fn resolve(is_following: bool, is_friend: bool) -> Self {
        if is_friend || is_following {
            FollowStatus::Following
        } else {
            FollowStatus::Follow
        }
    }

    /// The status a click on this row's button asks for.
    ///
    /// `Following` requests a follow, `Follow` requests an unfollow.
    pub fn toggled(self, is_friend: bool) -> Self {
        if is_friend || self == FollowStatus::Following {
            FollowStatus::Follow
        } else {
            FollowStatus::Following
        }
    }
}

impl Display for FollowStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FollowStatus::None => write!(f, "none"),
            FollowStatus::Follow => write!(f, "follow"),
            FollowStatus::Following => write!(f, "following"),
        }
    }
}

/// A directed follow relationship: `follower_id` follows `following_id`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FollowEdge {
    pub follower_id: String,
    pub following_id: String,
}

/// Which side of a managed user an edge sits on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FollowDirection {
    /// The other user follows the managed user.
    Follower,
    /// The managed user follows the other user.
    Following,
}

impl FollowDirection {
    pub fn edge(self, user_id: &str, other_id: &str) -> FollowEdge {
        match self {
            FollowDirection::Follower => FollowEdge {
                follower_id: other_id.to_string(),
                following_id: user_id.to_string(),
            },
            FollowDirection::Following => FollowEdge {
                follower_id: user_id.to_string(),
                following_id: other_id.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn raw(uid: &str) -> RawUser {
        RawUser {
            uid: uid.to_string(),
            username: Some("ann_lee".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_full_name_joins_and_trims() {
        assert_eq!(full_name(Some("Ann"), Some("Lee"), "ann_lee"), "Ann Lee");
        assert_eq!(full_name(Some("Ann"), None, "ann_lee"), "Ann");
        assert_eq!(full_name(None, Some("  "), "ann_lee"), "ann_lee");
        assert_eq!(full_name(None, None, "ann_lee"), "ann_lee");
    }

    #[test]
    fn test_summary_from_raw_defaults() {
        let summary = UserSummary::from(raw("u1"));
        assert_eq!(summary.id, "u1");
        assert_eq!(summary.full_name, "ann_lee");
        assert_eq!(summary.followers_count, 0);
        assert_eq!(summary.following_count, 0);
        assert!(!summary.is_friend);
        assert!(summary.avatar_url.is_empty());
    }

    #[test]
    fn test_managed_user_placeholder_avatar() {
        let mut user = raw("u2");
        user.email = Some("ann@x.com".to_string());
        user.first_name = Some("Ann".to_string());
        let managed = ManagedUser::from(user);
        assert_eq!(managed.summary.avatar_url, PLACEHOLDER_AVATAR_URL);
        assert_eq!(managed.email.as_deref(), Some("ann@x.com"));
        assert_eq!(managed.first_name, "Ann");
        assert_eq!(managed.last_name, "");
        assert_eq!(managed.summary.bio.as_deref(), Some(""));
    }

    #[test]
    fn test_follow_entry_takes_edge_friend_flag() {
        let mut user = raw("u3");
        user.is_friend = Some(false);
        let entry = FollowEntry::new(user, true);
        assert!(entry.is_friend);
        assert!(entry.user.is_friend);
        assert_eq!(entry.id(), "u3");
    }

    #[test]
    fn test_status_resolve_friend_wins() {
        assert_eq!(FollowStatus::resolve(false, false), FollowStatus::Follow);
        assert_eq!(FollowStatus::resolve(true, false), FollowStatus::Following);
        assert_eq!(FollowStatus::resolve(false, true), FollowStatus::Following);
    }

    #[test]
    fn test_status_toggled() {
        assert_eq!(FollowStatus::Follow.toggled(false), FollowStatus::Following);
        assert_eq!(FollowStatus::None.toggled(false), FollowStatus::Following);
        assert_eq!(FollowStatus::Following.toggled(false), FollowStatus::Follow);
        assert_eq!(FollowStatus::Follow.toggled(true), FollowStatus::Follow);
    }

    #[test]
    fn test_direction_edge() {
        assert_eq!(
            FollowDirection::Follower.edge("me", "them"),
            FollowEdge {
                follower_id: "them".to_string(),
                following_id: "me".to_string()
            }
        );
        assert_eq!(
            FollowDirection::Following.edge("me", "them"),
            FollowEdge {
                follower_id: "me".to_string(),
                following_id: "them".to_string()
            }
        );
    }
}
