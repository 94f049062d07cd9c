//! Account management for administrators.
//!
//! The same discard-and-refetch discipline as the dashboard, scoped to an
//! arbitrary target user. The admin claim is checked up front to pick what
//! to show; the backend's 403 remains the actual authority.

use crate::dashboard::ListState;
use crate::error::ClientError;
use crate::http::ApiClient;
use crate::session::Viewer;
use common_lib::{FollowDirection, ManagedUser, UserPatch};

pub const ACCESS_DENIED_MESSAGE: &str =
    "Access Denied: You do not have administrator privileges to view this page.";

#[derive(Clone, Debug, Default, PartialEq)]
pub enum AdminView {
    #[default]
    Idle,
    Ready,
    AccessDenied,
    Error(String),
}

/// Proof that a delete for `user_id` was asked for and confirmed.
#[derive(Clone, Debug, PartialEq)]
pub struct DeleteConfirmation {
    user_id: String,
    username: String,
}

impl DeleteConfirmation {
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn prompt(&self) -> String {
        format!(
            "Are you sure you want to delete user {}? This action cannot be undone.",
            self.username
        )
    }
}

/// Follow sub-lists of the user currently being managed.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TargetFollows {
    pub user_id: String,
    pub followers: Vec<ManagedUser>,
    pub following: Vec<ManagedUser>,
    pub loading: bool,
    pub error: Option<String>,
}

pub struct AdminPanel {
    api: ApiClient,
    view: AdminView,
    users: ListState<Vec<ManagedUser>>,
    follows: Option<TargetFollows>,
    action_error: Option<String>,
}

impl AdminPanel {
    pub fn new(api: ApiClient) -> Self {
        AdminPanel {
            api,
            view: AdminView::Idle,
            users: ListState::default(),
            follows: None,
            action_error: None,
        }
    }

    pub fn view(&self) -> &AdminView {
        &self.view
    }

    pub fn users(&self) -> &ListState<Vec<ManagedUser>> {
        &self.users
    }

    pub fn follows(&self) -> Option<&TargetFollows> {
        self.follows.as_ref()
    }

    pub fn action_error(&self) -> Option<&str> {
        self.action_error.as_deref()
    }

    /// Returns false, and switches to the access-denied view, for a viewer
    /// without the admin claim.
    pub fn gate(&mut self, viewer: &Viewer) -> bool {
        if viewer.is_admin {
            true
        } else {
            log::info!("admin view refused - viewer: {}", viewer.user_id);
            self.view = AdminView::AccessDenied;
            false
        }
    }

    pub async fn load_users(&mut self) {
        self.users.begin();
        match self.api.admin_users().await {
            Ok(users) => {
                log::debug!("admin users loaded - count: {}", users.len());
                self.users.succeed(users);
                self.view = AdminView::Ready;
            }
            Err(e) if e.is_forbidden() => {
                self.users.fail_and_clear(ACCESS_DENIED_MESSAGE.to_string());
                self.view = AdminView::AccessDenied;
            }
            Err(e) => {
                log::warn!("admin users fetch failed: {e}");
                let message = format!("Failed to fetch users: {e}");
                self.users.fail(message.clone());
                self.view = AdminView::Error(message);
            }
        }
    }

    /// Applies a partial update and re-fetches the user list.
    /// Email is not part of [`UserPatch`] and so can never be changed here.
    pub async fn edit_user(&mut self, user_id: &str, patch: &UserPatch) -> bool {
        self.action_error = None;
        if patch.is_empty() {
            self.action_error = Some("Nothing to update.".to_string());
            return false;
        }

        let result = self.api.admin_update_user(user_id, patch).await;
        self.finish_action(result, "update user").await
    }

    /// First step of a delete. Only users currently listed can be deleted.
    pub fn request_delete(&self, user_id: &str) -> Option<DeleteConfirmation> {
        self.users
            .data
            .iter()
            .find(|u| u.id() == user_id)
            .map(|u| DeleteConfirmation {
                user_id: u.id().to_string(),
                username: u.summary.username.clone(),
            })
    }

    pub async fn delete_user(&mut self, confirmation: DeleteConfirmation) -> bool {
        self.action_error = None;
        let result = self.api.admin_delete_user(&confirmation.user_id).await;
        if result.is_ok() {
            if let Some(follows) = &self.follows {
                if follows.user_id == confirmation.user_id {
                    self.follows = None;
                }
            }
        }
        self.finish_action(result, "delete user").await
    }

    /// Loads followers, then followings, of `user_id`.
    pub async fn load_follows(&mut self, user_id: &str) {
        let follows = self.follows.get_or_insert_with(TargetFollows::default);
        if follows.user_id != user_id {
            *follows = TargetFollows {
                user_id: user_id.to_string(),
                ..Default::default()
            };
        }
        follows.loading = true;
        follows.error = None;

        let result = match self.api.admin_followers(user_id).await {
            Ok(followers) => self
                .api
                .admin_followings(user_id)
                .await
                .map(|following| (followers, following)),
            Err(e) => Err(e),
        };

        let Some(follows) = self.follows.as_mut() else {
            return;
        };
        follows.loading = false;
        match result {
            Ok((followers, following)) => {
                follows.followers = followers;
                follows.following = following;
            }
            Err(e) => {
                log::warn!("follow lists for {user_id} failed: {e}");
                follows.error = Some(format!("Failed to fetch follow data: {e}"));
            }
        }
    }

    /// Removes one edge touching `user_id`, then re-fetches that user's
    /// sub-lists and the user list.
    pub async fn remove_follow_edge(
        &mut self,
        direction: FollowDirection,
        user_id: &str,
        other_id: &str,
    ) -> bool {
        self.action_error = None;
        let edge = direction.edge(user_id, other_id);
        match self.api.remove_follow_edge(direction, &edge).await {
            Ok(()) => {
                self.load_follows(user_id).await;
                self.load_users().await;
                true
            }
            Err(e) => {
                self.record_action_error("remove follow", &e);
                false
            }
        }
    }

    async fn finish_action(&mut self, result: Result<(), ClientError>, what: &str) -> bool {
        match result {
            Ok(()) => {
                self.load_users().await;
                true
            }
            Err(e) => {
                self.record_action_error(what, &e);
                false
            }
        }
    }

    fn record_action_error(&mut self, what: &str, error: &ClientError) {
        log::warn!("admin {what} failed: {error}");
        if error.is_forbidden() {
            self.view = AdminView::AccessDenied;
        }
        self.action_error = Some(format!("Failed to {what}: {error}"));
    }
}
