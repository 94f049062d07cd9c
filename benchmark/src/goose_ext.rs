use async_trait::async_trait;
use goose::goose::{GooseMethod, GooseRequest, GooseResponse, GooseUser, TransactionError};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE, HOST};
use serde::de::DeserializeOwned;

#[async_trait]
pub trait GooseRequestExt {
    async fn get_request(
        &mut self,
        name: &str,
        path: &str,
    ) -> Result<GooseResponse, Box<TransactionError>>;

    /// POST without a body, as the follow endpoints expect.
    async fn post_empty_request(
        &mut self,
        name: &str,
        path: &str,
    ) -> Result<GooseResponse, Box<TransactionError>>;
}

#[async_trait]
impl GooseRequestExt for GooseUser {
    async fn get_request(
        &mut self,
        name: &str,
        path: &str,
    ) -> Result<GooseResponse, Box<TransactionError>> {
        let request_builder =
            self.get_request_builder(&GooseMethod::Get, path)?.headers(get_headers());

        self.request(
            GooseRequest::builder().set_request_builder(request_builder).name(name).build(),
        )
        .await
    }

    async fn post_empty_request(
        &mut self,
        name: &str,
        path: &str,
    ) -> Result<GooseResponse, Box<TransactionError>> {
        let request_builder =
            self.get_request_builder(&GooseMethod::Post, path)?.headers(get_headers());

        self.request(
            GooseRequest::builder().set_request_builder(request_builder).name(name).build(),
        )
        .await
    }
}

fn get_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    if let Some(token) = crate::data::bearer_token() {
        if let Ok(value) = HeaderValue::from_str(&format!("Bearer {token}")) {
            headers.insert(AUTHORIZATION, value);
        }
    }
    if let Ok(host) = std::env::var("API_HOST") {
        if let Ok(value) = host.parse() {
            headers.insert(HOST, value);
        }
    }
    headers
}

#[async_trait]
pub trait GooseResponseExt {
    async fn json<T: DeserializeOwned>(self) -> Result<T, Box<TransactionError>>;
}

#[async_trait]
impl GooseResponseExt for GooseResponse {
    async fn json<T: DeserializeOwned>(self) -> Result<T, Box<TransactionError>> {
        match self.response {
            Ok(response) => response.json().await.map_err(|e| Box::new(e.into())),
            Err(e) => Err(Box::new(e.into())),
        }
    }
}
