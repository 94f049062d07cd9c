//! Payload shapes of the backend REST API.
//!
//! These types mirror the JSON exactly as the backend emits it, including its
//! inconsistencies. Everything above the HTTP boundary works with the
//! normalised [`crate::model`] types instead.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A user record as returned by the directory, profile and admin endpoints.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RawUser {
    pub uid: String,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[serde(rename = "avatarUrl")]
    pub avatar_url: Option<String>,
    #[serde(rename = "followersCount")]
    pub followers_count: Option<u64>,
    #[serde(rename = "followingCount")]
    pub following_count: Option<u64>,
    #[serde(rename = "isFriend")]
    pub is_friend: Option<bool>,
    pub email: Option<String>,
    pub bio: Option<String>,
}

/// One element of a follower or following list.
///
/// The viewer endpoints nest the user under `follower` / `following` next to a
/// server-computed `isFriend`; the admin endpoints return bare users.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum EdgeItem {
    Follower {
        follower: RawUser,
        #[serde(rename = "isFriend")]
        is_friend: Option<bool>,
    },
    Following {
        following: RawUser,
        #[serde(rename = "isFriend")]
        is_friend: Option<bool>,
    },
    Bare(RawUser),
}

impl EdgeItem {
    /// Splits the item into the nested user and its friendship flag.
    pub fn into_parts(self) -> (RawUser, bool) {
        match self {
            EdgeItem::Follower {
                follower,
                is_friend,
            } => (follower, is_friend.unwrap_or(false)),
            EdgeItem::Following {
                following,
                is_friend,
            } => (following, is_friend.unwrap_or(false)),
            EdgeItem::Bare(user) => {
                let is_friend = user.is_friend.unwrap_or(false);
                (user, is_friend)
            }
        }
    }
}

/// A follower/following list body.
///
/// The followings endpoints sometimes wrap the array in an object keyed
/// `follwings` (sic).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum EdgeList {
    Wrapped {
        #[serde(alias = "followings")]
        follwings: Vec<EdgeItem>,
    },
    Items(Vec<EdgeItem>),
}

impl EdgeList {
    pub fn into_items(self) -> Vec<EdgeItem> {
        match self {
            EdgeList::Wrapped { follwings } => follwings,
            EdgeList::Items(items) => items,
        }
    }
}

/// Body of `POST /users`, sent when a new user completes their profile.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct NewUserRecord {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    pub age: String,
    pub dob: String,
    pub country_code: String,
    pub phone: String,
    pub bio: String,
    #[serde(rename = "avatarUrl")]
    pub avatar_url: String,
    #[serde(rename = "clerkUserId")]
    pub identity_user_id: Option<String>,
}

/// Partial update sent by `PUT /admin/users/{id}`.
///
/// It has no email field. The address belongs to the identity provider and
/// cannot be edited from here.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct UserPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(rename = "avatarUrl", skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

impl UserPatch {
    pub fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.first_name.is_none()
            && self.last_name.is_none()
            && self.bio.is_none()
            && self.avatar_url.is_none()
    }
}

/// Error body carried by 4xx responses such as the 409 on profile save.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ErrorMessage {
    pub message: Option<String>,
}
