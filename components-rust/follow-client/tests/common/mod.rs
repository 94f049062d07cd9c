#![allow(dead_code)]

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use follow_client::session::StaticToken;
use follow_client::{ApiClient, ClientConfig, Viewer};
use serde_json::{json, Value};
use std::sync::Arc;
use wiremock::MockServer;

pub const VIEWER_ID: &str = "user_me";

pub fn jwt(claims: Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"RS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{header}.{payload}.signature")
}

pub fn viewer_token(is_admin: bool) -> String {
    jwt(json!({
        "sub": VIEWER_ID,
        "email": "me@example.com",
        "username": "me",
        "public_metadata": { "isAdmin": is_admin }
    }))
}

pub fn create_test_api(server: &MockServer) -> ApiClient {
    let config = ClientConfig::with_base_url(&server.uri());
    ApiClient::new(&config, Arc::new(StaticToken::new(viewer_token(false)))).unwrap()
}

pub fn viewer() -> Viewer {
    Viewer::from_token(&viewer_token(false)).unwrap()
}

pub fn raw_user(uid: &str, username: &str) -> Value {
    json!({
        "uid": uid,
        "username": username,
        "first_name": username,
        "last_name": "Tester",
        "avatarUrl": "",
        "followersCount": 3,
        "followingCount": 4,
        "email": format!("{username}@example.com"),
        "bio": "hello"
    })
}

pub fn friend(uid: &str, username: &str) -> Value {
    let mut user = raw_user(uid, username);
    user["isFriend"] = json!(true);
    user
}
