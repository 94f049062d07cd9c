//! HTTP adapter for the backend REST API.
//!
//! Injects the bearer token into every call, maps status codes onto
//! [`ClientError`] and normalises the backend's response shapes into the
//! client model. There is no retry: a failed call is reported once and left to
//! the caller's next re-fetch.

use crate::config::{ClientConfig, Endpoints};
use crate::error::{ClientError, ClientResult};
use crate::session::TokenProvider;
use common_lib::{
    EdgeItem, EdgeList, ErrorMessage, FollowDirection, FollowEdge, FollowEntry, FollowStatus,
    ManagedUser, NewUserRecord, RawUser, UserPatch, UserSummary,
};
use reqwest::{Client, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

/// The two follow mutations the backend offers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FollowAction {
    Follow,
    Unfollow,
}

impl FollowAction {
    /// Maps the status a user asked for onto the request that produces it.
    pub fn for_desired(desired: FollowStatus) -> Option<Self> {
        match desired {
            FollowStatus::Following => Some(FollowAction::Follow),
            FollowStatus::Follow => Some(FollowAction::Unfollow),
            FollowStatus::None => None,
        }
    }

    pub fn verb(self) -> &'static str {
        match self {
            FollowAction::Follow => "follow",
            FollowAction::Unfollow => "unfollow",
        }
    }
}

#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    endpoints: Endpoints,
    tokens: Arc<dyn TokenProvider>,
}

impl ApiClient {
    pub fn new(config: &ClientConfig, tokens: Arc<dyn TokenProvider>) -> ClientResult<Self> {
        let http = Client::builder().timeout(config.timeout()).build()?;
        Ok(ApiClient {
            http,
            endpoints: config.endpoints.clone(),
            tokens,
        })
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    // viewer endpoints

    pub async fn all_users(&self) -> ClientResult<Vec<UserSummary>> {
        let users: Option<Vec<RawUser>> = self.get_json(parse_url(&self.endpoints.all_users)?).await?;
        Ok(users
            .unwrap_or_default()
            .into_iter()
            .map(UserSummary::from)
            .collect())
    }

    pub async fn profile(&self, user_id: &str) -> ClientResult<UserSummary> {
        let url = join_url(&self.endpoints.profile, &[user_id])?;
        let user: Option<RawUser> = self.get_json(url.clone()).await?;
        user.map(UserSummary::from)
            .ok_or_else(|| ClientError::EmptyResponse(url.to_string()))
    }

    pub async fn followers(&self) -> ClientResult<Vec<FollowEntry>> {
        self.edge_entries(parse_url(&self.endpoints.followers)?).await
    }

    pub async fn followings(&self) -> ClientResult<Vec<FollowEntry>> {
        self.edge_entries(parse_url(&self.endpoints.followings)?).await
    }

    pub async fn follow_action(&self, target_id: &str, action: FollowAction) -> ClientResult<()> {
        let base = match action {
            FollowAction::Follow => &self.endpoints.follow,
            FollowAction::Unfollow => &self.endpoints.unfollow,
        };
        let url = join_url(base, &[target_id])?;
        log::info!("{} user {target_id} via {url}", action.verb());
        self.send(self.http.post(url)).await?;
        Ok(())
    }

    /// Saves a completed profile. A 409 comes back as [`ClientError::Conflict`].
    pub async fn create_user(&self, record: &NewUserRecord) -> ClientResult<Option<UserSummary>> {
        let url = parse_url(&self.endpoints.add_user)?;
        log::info!("saving profile for username {}", record.username);
        let saved: Option<RawUser> = self.send_json(self.http.post(url), record).await?;
        Ok(saved.map(UserSummary::from))
    }

    // admin endpoints

    pub async fn admin_users(&self) -> ClientResult<Vec<ManagedUser>> {
        let users: Option<Vec<RawUser>> =
            self.get_json(parse_url(&self.endpoints.admin_users)?).await?;
        Ok(users
            .unwrap_or_default()
            .into_iter()
            .map(ManagedUser::from)
            .collect())
    }

    pub async fn admin_update_user(&self, user_id: &str, patch: &UserPatch) -> ClientResult<()> {
        let url = join_url(&self.endpoints.admin_update_user, &[user_id])?;
        log::info!("admin update user - id: {user_id}");
        self.send(self.http.put(url).json(patch)).await?;
        Ok(())
    }

    pub async fn admin_delete_user(&self, user_id: &str) -> ClientResult<()> {
        let url = join_url(&self.endpoints.admin_delete_user, &[user_id])?;
        log::info!("admin delete user - id: {user_id}");
        self.send(self.http.delete(url)).await?;
        Ok(())
    }

    pub async fn admin_followers(&self, user_id: &str) -> ClientResult<Vec<ManagedUser>> {
        let url = join_url(&self.endpoints.admin_followers, &[user_id])?;
        self.managed_edges(url).await
    }

    pub async fn admin_followings(&self, user_id: &str) -> ClientResult<Vec<ManagedUser>> {
        let url = join_url(&self.endpoints.admin_followings, &[user_id])?;
        self.managed_edges(url).await
    }

    pub async fn remove_follow_edge(
        &self,
        direction: FollowDirection,
        edge: &FollowEdge,
    ) -> ClientResult<()> {
        let base = match direction {
            FollowDirection::Follower => &self.endpoints.admin_remove_follower,
            FollowDirection::Following => &self.endpoints.admin_remove_following,
        };
        let url = join_url(base, &[&edge.follower_id, &edge.following_id])?;
        log::info!(
            "admin remove follow - follower: {}, following: {}",
            edge.follower_id,
            edge.following_id
        );
        self.send(self.http.delete(url)).await?;
        Ok(())
    }

    // plumbing

    async fn edge_entries(&self, url: Url) -> ClientResult<Vec<FollowEntry>> {
        let list: Option<EdgeList> = self.get_json(url).await?;
        Ok(list
            .map(EdgeList::into_items)
            .unwrap_or_default()
            .into_iter()
            .map(EdgeItem::into_parts)
            .map(|(user, is_friend)| FollowEntry::new(user, is_friend))
            .collect())
    }

    async fn managed_edges(&self, url: Url) -> ClientResult<Vec<ManagedUser>> {
        let list: Option<EdgeList> = self.get_json(url).await?;
        Ok(list
            .map(EdgeList::into_items)
            .unwrap_or_default()
            .into_iter()
            .map(|item| ManagedUser::from(item.into_parts().0))
            .collect())
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> ClientResult<Option<T>> {
        log::debug!("GET {url}");
        let response = self.send(self.http.get(url)).await?;
        decode_body(response).await
    }

    async fn send_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        body: &B,
    ) -> ClientResult<Option<T>> {
        let response = self.send(builder.json(body)).await?;
        decode_body(response).await
    }

    async fn send(&self, builder: RequestBuilder) -> ClientResult<Response> {
        let token = self.tokens.token().await?;
        let response = builder.bearer_auth(token).send().await?;
        check_status(response).await
    }
}

/// Turns a non-2xx response into the matching error variant.
pub(crate) async fn check_status(response: Response) -> ClientResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    log::debug!("request failed - status: {status}, body: {body}");

    match status.as_u16() {
        403 => Err(ClientError::Forbidden { body }),
        409 => {
            let message = serde_json::from_str::<ErrorMessage>(&body)
                .ok()
                .and_then(|m| m.message)
                .unwrap_or(body);
            Err(ClientError::Conflict { message })
        }
        code => Err(ClientError::Status { status: code, body }),
    }
}

/// Reads a JSON body where an empty body or `null` both mean "nothing".
async fn decode_body<T: DeserializeOwned>(response: Response) -> ClientResult<Option<T>> {
    let text = response.text().await?;
    if text.trim().is_empty() {
        return Ok(None);
    }
    Ok(serde_json::from_str(&text)?)
}

pub(crate) fn parse_url(raw: &str) -> ClientResult<Url> {
    Url::parse(raw).map_err(|e| ClientError::Config(format!("invalid endpoint {raw}: {e}")))
}

/// Appends path segments to an endpoint, escaping each one.
pub(crate) fn join_url(base: &str, segments: &[&str]) -> ClientResult<Url> {
    let mut url = parse_url(base)?;
    url.path_segments_mut()
        .map_err(|_| ClientError::Config(format!("endpoint cannot take a path: {base}")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_follow_action_for_desired() {
        assert_eq!(
            FollowAction::for_desired(FollowStatus::Following),
            Some(FollowAction::Follow)
        );
        assert_eq!(
            FollowAction::for_desired(FollowStatus::Follow),
            Some(FollowAction::Unfollow)
        );
        assert_eq!(FollowAction::for_desired(FollowStatus::None), None);
    }

    #[test]
    fn test_join_url() {
        let url = join_url("http://api.test/follow/", &["user_1"]).unwrap();
        assert_eq!(url.as_str(), "http://api.test/follow/user_1");

        let url = join_url("http://api.test/admin/followers", &["a", "b c"]).unwrap();
        assert_eq!(url.as_str(), "http://api.test/admin/followers/a/b%20c");
    }

    #[test]
    fn test_join_url_rejects_garbage() {
        assert!(matches!(
            join_url("not a url", &["x"]),
            Err(ClientError::Config(_))
        ));
    }
}
