//! Endpoint and upload configuration.
//!
//! Every backend endpoint is a full URL. By default they hang off a single base
//! URL, but each one can be pointed elsewhere through its own environment
//! variable.

use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";
pub const DEFAULT_UPLOAD_BASE_URL: &str = "https://api.cloudinary.com";
pub const DEFAULT_UPLOAD_FOLDER: &str = "user_avatars";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Endpoints {
    pub all_users: String,
    pub profile: String,
    pub followers: String,
    pub followings: String,
    pub follow: String,
    pub unfollow: String,
    pub add_user: String,
    pub admin_users: String,
    pub admin_update_user: String,
    pub admin_delete_user: String,
    pub admin_followers: String,
    pub admin_followings: String,
    pub admin_remove_follower: String,
    pub admin_remove_following: String,
}

impl Endpoints {
    pub fn from_base(base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        Endpoints {
            all_users: format!("{base}/users/all"),
            profile: format!("{base}/users/profile"),
            followers: format!("{base}/users/followers"),
            followings: format!("{base}/users/followings"),
            follow: format!("{base}/follow"),
            unfollow: format!("{base}/unfollow"),
            add_user: format!("{base}/users"),
            admin_users: format!("{base}/admin/users"),
            admin_update_user: format!("{base}/admin/users"),
            admin_delete_user: format!("{base}/admin/users"),
            admin_followers: format!("{base}/admin/users/followers"),
            admin_followings: format!("{base}/admin/users/followings"),
            admin_remove_follower: format!("{base}/admin/followers"),
            admin_remove_following: format!("{base}/admin/followings"),
        }
    }

    fn overrides(&mut self) -> [(&'static str, &mut String); 14] {
        [
            ("FOLLOW_ALL_USERS_URL", &mut self.all_users),
            ("FOLLOW_PROFILE_URL", &mut self.profile),
            ("FOLLOW_FOLLOWERS_URL", &mut self.followers),
            ("FOLLOW_FOLLOWING_URL", &mut self.followings),
            ("FOLLOW_FOLLOW_URL", &mut self.follow),
            ("FOLLOW_UNFOLLOW_URL", &mut self.unfollow),
            ("FOLLOW_ADD_USER_URL", &mut self.add_user),
            ("FOLLOW_ADMIN_USERS_URL", &mut self.admin_users),
            ("FOLLOW_ADMIN_UPDATE_USER_URL", &mut self.admin_update_user),
            ("FOLLOW_ADMIN_DELETE_USER_URL", &mut self.admin_delete_user),
            ("FOLLOW_FOLLOWERS_BY_ID_URL", &mut self.admin_followers),
            ("FOLLOW_FOLLOWINGS_BY_ID_URL", &mut self.admin_followings),
            ("FOLLOW_DELETE_FOLLOWER_URL", &mut self.admin_remove_follower),
            ("FOLLOW_DELETE_FOLLOWING_URL", &mut self.admin_remove_following),
        ]
    }
}

/// Image hosting settings for avatar uploads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadConfig {
    pub base_url: String,
    pub cloud_name: Option<String>,
    pub upload_preset: Option<String>,
    pub folder: String,
}

impl Default for UploadConfig {
    fn default() -> Self {
        UploadConfig {
            base_url: DEFAULT_UPLOAD_BASE_URL.to_string(),
            cloud_name: None,
            upload_preset: None,
            folder: DEFAULT_UPLOAD_FOLDER.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    pub endpoints: Endpoints,
    pub upload: UploadConfig,
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig::with_base_url(DEFAULT_BASE_URL)
    }
}

impl ClientConfig {
    pub fn with_base_url(base_url: &str) -> Self {
        ClientConfig {
            endpoints: Endpoints::from_base(base_url),
            upload: UploadConfig::default(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Builds the configuration from process environment variables.
    pub fn from_env() -> Self {
        ClientConfig::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let base_url = lookup("FOLLOW_API_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let mut config = ClientConfig::with_base_url(&base_url);

        for (key, slot) in config.endpoints.overrides() {
            if let Some(value) = lookup(key).filter(|v| !v.is_empty()) {
                *slot = value;
            }
        }

        if let Some(value) = lookup("FOLLOW_UPLOAD_BASE_URL") {
            config.upload.base_url = value;
        }
        config.upload.cloud_name = lookup("FOLLOW_UPLOAD_CLOUD").filter(|v| !v.is_empty());
        config.upload.upload_preset = lookup("FOLLOW_UPLOAD_PRESET").filter(|v| !v.is_empty());

        if let Some(secs) = lookup("FOLLOW_TIMEOUT_SECS").and_then(|v| v.parse().ok()) {
            config.timeout_secs = secs;
        }

        log::debug!("client config - all users: {}", config.endpoints.all_users);
        config
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
