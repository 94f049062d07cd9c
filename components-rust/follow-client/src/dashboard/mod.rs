//! Follow-state reconciliation for the signed-in viewer.
//!
//! Four sources are tracked independently: the viewer's own profile, their
//! followers, the users they follow, and the user directory. None of them is
//! ever patched locally. After a follow or unfollow the client throws the
//! lists away and fetches them again, and that re-fetch is the only thing
//! that makes the view consistent with the server.

use crate::error::{ClientError, ClientResult};
use crate::http::{ApiClient, FollowAction};
use crate::session::Viewer;
use common_lib::{FollowEntry, FollowStatus, UserSummary};
use std::collections::{HashMap, HashSet};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

/// Loading flag, error and data of one independently fetched source.
#[derive(Clone, Debug, PartialEq)]
pub struct ListState<T> {
    pub data: T,
    pub loading: bool,
    pub error: Option<String>,
    resolutions: u64,
}

impl<T: Default> Default for ListState<T> {
    fn default() -> Self {
        ListState {
            data: T::default(),
            loading: false,
            error: None,
            resolutions: 0,
        }
    }
}

impl<T> ListState<T> {
    pub fn begin(&mut self) {
        self.loading = true;
        self.error = None;
    }

    pub fn succeed(&mut self, data: T) {
        self.data = data;
        self.loading = false;
        self.error = None;
        self.resolutions += 1;
    }

    /// Records a failure and keeps whatever data the last success left.
    pub fn fail(&mut self, message: String) {
        self.loading = false;
        self.error = Some(message);
        self.resolutions += 1;
    }

    /// True once at least one fetch has resolved, successfully or not.
    pub fn is_settled(&self) -> bool {
        self.resolutions > 0
    }

    pub fn resolutions(&self) -> u64 {
        self.resolutions
    }
}

impl<T: Default> ListState<T> {
    /// Records a failure and drops the previous data.
    pub fn fail_and_clear(&mut self, message: String) {
        self.data = T::default();
        self.fail(message);
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Tab {
    #[default]
    AllUsers,
    Followers,
    Following,
}

impl FromStr for Tab {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" | "all-users" | "all_users" => Ok(Tab::AllUsers),
            "followers" => Ok(Tab::Followers),
            "following" | "followings" => Ok(Tab::Following),
            other => Err(format!("unknown tab: {other}")),
        }
    }
}

impl Display for Tab {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Tab::AllUsers => write!(f, "All Users"),
            Tab::Followers => write!(f, "Followers"),
            Tab::Following => write!(f, "Following"),
        }
    }
}

/// A listed user together with the status derived for the viewer.
#[derive(Clone, Debug, PartialEq)]
pub struct UserRow {
    pub user: UserSummary,
    pub status: FollowStatus,
    pub is_self: bool,
}

impl UserRow {
    /// Status a click on this row asks for, or `None` for the viewer's own row.
    pub fn next_action(&self) -> Option<FollowStatus> {
        if self.is_self {
            None
        } else {
            Some(self.status.toggled(self.user.is_friend))
        }
    }
}

/// The all-users tab, joined against the current following list.
#[derive(Clone, Debug, PartialEq)]
pub struct AllUsersView {
    pub rows: Vec<UserRow>,
    /// The following list has not resolved yet, so statuses may still change.
    pub provisional: bool,
    pub loading: bool,
    pub error: Option<String>,
}

/// Outcome of one reconciliation cycle.
#[derive(Clone, Debug, PartialEq)]
pub struct RefreshReport {
    pub cycle_id: Uuid,
    pub own_profile_ok: bool,
    pub followers_ok: bool,
    pub following_ok: bool,
}

impl RefreshReport {
    pub fn all_ok(&self) -> bool {
        self.own_profile_ok && self.followers_ok && self.following_ok
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ToggleReport {
    pub action: FollowAction,
    pub request_ok: bool,
    pub refresh: RefreshReport,
    /// The directory was fetched again to pick up the new counts.
    pub directory_refreshed: bool,
}

pub struct Dashboard {
    api: ApiClient,
    viewer: Viewer,
    own_profile: ListState<Option<UserSummary>>,
    followers: ListState<Vec<FollowEntry>>,
    following: ListState<Vec<FollowEntry>>,
    directory: ListState<Vec<UserSummary>>,
    optimistic: HashMap<String, FollowStatus>,
    toggle_error: Option<String>,
    cycles: u64,
}

impl Dashboard {
    pub fn new(api: ApiClient, viewer: Viewer) -> Self {
        Dashboard {
            api,
            viewer,
            own_profile: ListState::default(),
            followers: ListState::default(),
            following: ListState::default(),
            directory: ListState::default(),
            optimistic: HashMap::new(),
            toggle_error: None,
            cycles: 0,
        }
    }

    pub fn viewer(&self) -> &Viewer {
        &self.viewer
    }

    pub fn own_profile(&self) -> &ListState<Option<UserSummary>> {
        &self.own_profile
    }

    pub fn followers(&self) -> &ListState<Vec<FollowEntry>> {
        &self.followers
    }

    pub fn following(&self) -> &ListState<Vec<FollowEntry>> {
        &self.following
    }

    pub fn directory(&self) -> &ListState<Vec<UserSummary>> {
        &self.directory
    }

    pub fn toggle_error(&self) -> Option<&str> {
        self.toggle_error.as_deref()
    }

    /// Number of reconciliation cycles run so far.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn pending_status(&self, user_id: &str) -> Option<FollowStatus> {
        self.optimistic.get(user_id).copied()
    }

    pub async fn load_own_profile(&mut self) {
        self.own_profile.begin();
        let result = self.api.profile(&self.viewer.user_id).await;
        self.apply_own_profile(result);
    }

    pub async fn load_followers(&mut self) {
        self.followers.begin();
        let result = self.api.followers().await;
        self.apply_followers(result);
    }

    pub async fn load_following(&mut self) {
        self.following.begin();
        let result = self.api.followings().await;
        self.apply_following(result);
    }

    pub async fn load_all_users(&mut self) {
        self.directory.begin();
        let result = self.api.all_users().await;
        self.apply_directory(result);
    }

    /// One reconciliation cycle: own profile, followers and following are
    /// fetched together and each result lands on its own list.
    pub async fn refresh(&mut self) -> RefreshReport {
        let cycle_id = Uuid::new_v4();
        log::info!("reconciliation cycle {cycle_id} - viewer: {}", self.viewer.user_id);

        self.own_profile.begin();
        self.followers.begin();
        self.following.begin();

        let (profile, followers, following) = futures::join!(
            self.api.profile(&self.viewer.user_id),
            self.api.followers(),
            self.api.followings(),
        );

        let report = RefreshReport {
            cycle_id,
            own_profile_ok: profile.is_ok(),
            followers_ok: followers.is_ok(),
            following_ok: following.is_ok(),
        };

        self.apply_own_profile(profile);
        self.apply_followers(followers);
        self.apply_following(following);
        self.cycles += 1;

        log::debug!("reconciliation cycle {cycle_id} done - all ok: {}", report.all_ok());
        report
    }

    /// Initial load and tab switches: a reconciliation cycle plus the directory.
    pub async fn reload(&mut self) -> RefreshReport {
        let report = self.refresh().await;
        self.load_all_users().await;
        report
    }

    /// Asks the backend to move `target_id` to `desired` and reconciles.
    ///
    /// `Following` sends a follow, `Follow` an unfollow. The re-fetch runs
    /// whether or not the request succeeded. Returns `None` when there is
    /// nothing to send (the viewer themself, or a `None` status).
    pub async fn toggle_follow(
        &mut self,
        target_id: &str,
        desired: FollowStatus,
    ) -> Option<ToggleReport> {
        let action = FollowAction::for_desired(desired)?;
        if target_id == self.viewer.user_id {
            log::debug!("ignoring follow toggle on own profile");
            return None;
        }

        self.toggle_error = None;
        self.optimistic.insert(target_id.to_string(), desired);

        let result = self.api.follow_action(target_id, action).await;
        if let Err(e) = &result {
            log::warn!("{} {target_id} failed: {e}", action.verb());
            self.toggle_error = Some(format!("Failed to {} user: {e}", action.verb()));
        }

        let refresh = self.refresh().await;

        // counts shown in the directory moved with the follow
        let directory_refreshed =
            result.is_ok() && refresh.following_ok && self.directory.is_settled();
        if directory_refreshed {
            self.load_all_users().await;
        }

        Some(ToggleReport {
            action,
            request_ok: result.is_ok(),
            refresh,
            directory_refreshed,
        })
    }

    /// Toggles the row currently shown for `target_id` in the all-users tab.
    pub async fn toggle_row(&mut self, target_id: &str) -> ClientResult<Option<ToggleReport>> {
        let desired = self
            .all_users()
            .rows
            .into_iter()
            .find(|row| row.user.id == target_id)
            .and_then(|row| row.next_action())
            .ok_or_else(|| ClientError::NotListed(target_id.to_string()))?;
        Ok(self.toggle_follow(target_id, desired).await)
    }

    pub fn all_users(&self) -> AllUsersView {
        let followed: HashSet<&str> = self.following.data.iter().map(FollowEntry::id).collect();

        let rows = self
            .directory
            .data
            .iter()
            .map(|user| {
                let is_self = user.id == self.viewer.user_id;
                let status = if is_self {
                    FollowStatus::None
                } else {
                    self.pending_status(&user.id).unwrap_or_else(|| {
                        FollowStatus::resolve(followed.contains(user.id.as_str()), user.is_friend)
                    })
                };
                UserRow {
                    user: user.clone(),
                    status,
                    is_self,
                }
            })
            .collect();

        AllUsersView {
            rows,
            provisional: !self.following.is_settled(),
            loading: self.directory.loading,
            error: self.directory.error.clone(),
        }
    }

    pub fn tab(&self, tab: Tab) -> Vec<UserRow> {
        match tab {
            Tab::AllUsers => self.all_users().rows,
            Tab::Followers => self.entry_rows(&self.followers.data, FollowStatus::Follow),
            Tab::Following => self.entry_rows(&self.following.data, FollowStatus::Following),
        }
    }

    /// The viewer's own card, once their profile has loaded.
    pub fn own_card(&self) -> Option<UserRow> {
        self.own_profile.data.as_ref().map(|user| UserRow {
            user: user.clone(),
            status: FollowStatus::None,
            is_self: true,
        })
    }

    /// Inline error for a tab, if its source failed.
    pub fn tab_error(&self, tab: Tab) -> Option<&str> {
        match tab {
            Tab::AllUsers => self.directory.error.as_deref(),
            Tab::Followers => self.followers.error.as_deref(),
            Tab::Following => self.following.error.as_deref(),
        }
    }

    fn entry_rows(&self, entries: &[FollowEntry], base: FollowStatus) -> Vec<UserRow> {
        entries
            .iter()
            .map(|entry| {
                let is_self = entry.user.id == self.viewer.user_id;
                let status = if is_self {
                    FollowStatus::None
                } else if let Some(pending) = self.pending_status(entry.id()) {
                    pending
                } else if entry.is_friend {
                    FollowStatus::Following
                } else {
                    base
                };
                UserRow {
                    user: entry.user.clone(),
                    status,
                    is_self,
                }
            })
            .collect()
    }

    fn apply_own_profile(&mut self, result: ClientResult<UserSummary>) {
        match result {
            Ok(user) => self.own_profile.succeed(Some(user)),
            Err(e) => {
                log::warn!("own profile fetch failed: {e}");
                self.own_profile
                    .fail(format!("Failed to update your details: {e}"));
            }
        }
    }

    fn apply_followers(&mut self, result: ClientResult<Vec<FollowEntry>>) {
        match result {
            Ok(entries) => {
                log::debug!("followers loaded - count: {}", entries.len());
                self.followers.succeed(entries);
            }
            Err(e) => {
                log::warn!("followers fetch failed: {e}");
                self.followers
                    .fail(format!("Failed to update followers list: {e}"));
            }
        }
    }

    fn apply_following(&mut self, result: ClientResult<Vec<FollowEntry>>) {
        match result {
            Ok(entries) => {
                log::debug!("following loaded - count: {}", entries.len());
                self.following.succeed(entries);
                // fresh server state supersedes every pending toggle
                self.optimistic.clear();
            }
            Err(e) => {
                log::warn!("following fetch failed: {e}");
                self.following
                    .fail(format!("Failed to update following list: {e}"));
            }
        }
    }

    fn apply_directory(&mut self, result: ClientResult<Vec<UserSummary>>) {
        match result {
            Ok(users) => {
                log::debug!("directory loaded - count: {}", users.len());
                self.directory.succeed(users);
            }
            Err(e) => {
                log::warn!("directory fetch failed: {e}");
                self.directory
                    .fail_and_clear(format!("Failed to load all users: {e}"));
            }
        }
    }
}
