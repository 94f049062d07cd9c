mod common;

use common::{create_test_api, raw_user};
use common_lib::{FollowDirection, UserPatch};
use follow_client::admin::{AdminPanel, AdminView, ACCESS_DENIED_MESSAGE};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn ids(panel: &AdminPanel) -> Vec<String> {
    panel
        .users()
        .data
        .iter()
        .map(|u| u.id().to_string())
        .collect()
}

#[tokio::test]
async fn test_load_users() {
    let server = MockServer::start().await;
    let mut alice = raw_user("u1", "alice");
    alice["avatarUrl"] = json!(null);
    Mock::given(method("GET"))
        .and(path("/admin/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([alice])))
        .expect(1)
        .mount(&server)
        .await;

    let mut panel = AdminPanel::new(create_test_api(&server));
    panel.load_users().await;

    assert_eq!(panel.view(), &AdminView::Ready);
    let user = &panel.users().data[0];
    assert_eq!(user.email.as_deref(), Some("alice@example.com"));
    assert_eq!(user.summary.avatar_url, common_lib::PLACEHOLDER_AVATAR_URL);
}

#[tokio::test]
async fn test_forbidden_is_access_denied() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/admin/users"))
        .respond_with(ResponseTemplate::new(403).set_body_string("Forbidden"))
        .mount(&server)
        .await;

    let mut panel = AdminPanel::new(create_test_api(&server));
    panel.load_users().await;

    assert_eq!(panel.view(), &AdminView::AccessDenied);
    assert_eq!(panel.users().error.as_deref(), Some(ACCESS_DENIED_MESSAGE));
}

#[tokio::test]
async fn test_server_error_is_not_access_denied() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/admin/users"))
        .respond_with(ResponseTemplate::new(500).set_body_string("oops"))
        .mount(&server)
        .await;

    let mut panel = AdminPanel::new(create_test_api(&server));
    panel.load_users().await;

    assert_eq!(
        panel.view(),
        &AdminView::Error("Failed to fetch users: HTTP error! status: 500 - oops".to_string())
    );
}

#[tokio::test]
async fn test_delete_user_removes_it_from_refetched_list() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/admin/users"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([raw_user("u1", "alice"), raw_user("u2", "bob")])),
        )
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/admin/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([raw_user("u1", "alice")])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/admin/users/u2"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let mut panel = AdminPanel::new(create_test_api(&server));
    panel.load_users().await;
    assert_eq!(ids(&panel), vec!["u1", "u2"]);

    let confirmation = panel.request_delete("u2").unwrap();
    assert!(panel.delete_user(confirmation).await);

    assert_eq!(ids(&panel), vec!["u1"]);
    assert_eq!(panel.action_error(), None);
    server.verify().await;
}

#[tokio::test]
async fn test_edit_user_refetches() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/admin/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([raw_user("u1", "alice")])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/admin/users/u1"))
        .and(body_json(json!({ "first_name": "Alicia" })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let mut panel = AdminPanel::new(create_test_api(&server));
    let patch = UserPatch {
        first_name: Some("Alicia".to_string()),
        ..Default::default()
    };
    assert!(panel.edit_user("u1", &patch).await);
    assert_eq!(panel.view(), &AdminView::Ready);
    server.verify().await;
}

#[tokio::test]
async fn test_failed_edit_keeps_list_and_reports() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/admin/users/u1"))
        .respond_with(ResponseTemplate::new(400).set_body_string("bad username"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/admin/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let mut panel = AdminPanel::new(create_test_api(&server));
    let patch = UserPatch {
        username: Some("x".to_string()),
        ..Default::default()
    };
    assert!(!panel.edit_user("u1", &patch).await);
    assert_eq!(
        panel.action_error(),
        Some("Failed to update user: HTTP error! status: 400 - bad username")
    );
    server.verify().await;
}

#[tokio::test]
async fn test_remove_follower_edge_refetches_sub_lists() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/admin/users/followers/u1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "follower": raw_user("u2", "bob"), "isFriend": false },
            { "follower": raw_user("u3", "carol"), "isFriend": false }
        ])))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/admin/users/followers/u1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "follower": raw_user("u3", "carol"), "isFriend": false }
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/admin/users/followings/u1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "follwings": [] })))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/admin/followers/u2/u1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/admin/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([raw_user("u1", "alice")])))
        .expect(1)
        .mount(&server)
        .await;

    let mut panel = AdminPanel::new(create_test_api(&server));
    panel.load_follows("u1").await;
    assert_eq!(panel.follows().unwrap().followers.len(), 2);

    assert!(
        panel
            .remove_follow_edge(FollowDirection::Follower, "u1", "u2")
            .await
    );

    let follows = panel.follows().unwrap();
    assert_eq!(follows.user_id, "u1");
    assert!(follows.followers.iter().all(|u| u.id() != "u2"));
    assert_eq!(follows.followers.len(), 1);
    assert!(follows.following.is_empty());
    assert_eq!(follows.error, None);
    server.verify().await;
}

#[tokio::test]
async fn test_follows_failure_sets_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/admin/users/followers/u1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/admin/users/followings/u1"))
        .respond_with(ResponseTemplate::new(500).set_body_string("nope"))
        .mount(&server)
        .await;

    let mut panel = AdminPanel::new(create_test_api(&server));
    panel.load_follows("u1").await;

    let follows = panel.follows().unwrap();
    assert!(!follows.loading);
    assert_eq!(
        follows.error.as_deref(),
        Some("Failed to fetch follow data: HTTP error! status: 500 - nope")
    );
}
