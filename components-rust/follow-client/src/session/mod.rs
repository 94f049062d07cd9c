//! Bearer tokens and the viewer identity carried in them.
//!
//! The client never stores a token: every request asks its [`TokenProvider`]
//! again, so the token's lifetime stays with the identity provider's session.

use crate::error::{ClientError, ClientResult};
use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};

#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn token(&self) -> ClientResult<String>;
}

/// A token handed over once, e.g. on the command line.
#[derive(Clone)]
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        StaticToken(token.into())
    }
}

#[async_trait]
impl TokenProvider for StaticToken {
    async fn token(&self) -> ClientResult<String> {
        if self.0.is_empty() {
            Err(ClientError::MissingToken)
        } else {
            Ok(self.0.clone())
        }
    }
}

/// Reads the token from an environment variable on every call, so an external
/// session helper can rotate it underneath a running client.
#[derive(Clone)]
pub struct EnvToken {
    var: String,
}

impl EnvToken {
    pub fn new(var: impl Into<String>) -> Self {
        EnvToken { var: var.into() }
    }
}

#[async_trait]
impl TokenProvider for EnvToken {
    async fn token(&self) -> ClientResult<String> {
        std::env::var(&self.var)
            .ok()
            .filter(|t| !t.is_empty())
            .ok_or(ClientError::MissingToken)
    }
}

/// The signed-in user, as far as the identity token tells.
///
/// None of this is verified here. `is_admin` only decides what to show; the
/// backend enforces authorization on its own.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Viewer {
    pub user_id: String,
    pub email: Option<String>,
    pub username: Option<String>,
    pub is_admin: bool,
}

#[derive(Deserialize)]
struct Claims {
    sub: String,
    email: Option<String>,
    username: Option<String>,
    #[serde(default, alias = "publicMetadata", alias = "metadata")]
    public_metadata: PublicMetadata,
}

#[derive(Default, Deserialize)]
struct PublicMetadata {
    #[serde(rename = "isAdmin", default)]
    is_admin: bool,
}

impl Viewer {
    pub fn new(user_id: impl Into<String>) -> Self {
        Viewer {
            user_id: user_id.into(),
            ..Default::default()
        }
    }

    /// Reads the claims segment of a JWT without checking its signature.
    pub fn from_token(token: &str) -> ClientResult<Self> {
        let payload = token
            .split('.')
            .nth(1)
            .ok_or_else(|| ClientError::InvalidToken("expected three segments".to_string()))?;

        let bytes = URL_SAFE_NO_PAD
            .decode(payload.trim_end_matches('='))
            .map_err(|e| ClientError::InvalidToken(e.to_string()))?;

        let claims: Claims = serde_json::from_slice(&bytes)
            .map_err(|e| ClientError::InvalidToken(e.to_string()))?;

        Ok(Viewer {
            user_id: claims.sub,
            email: claims.email,
            username: claims.username,
            is_admin: claims.public_metadata.is_admin,
        })
    }

    pub async fn from_provider(tokens: &dyn TokenProvider) -> ClientResult<Self> {
        let token = tokens.token().await?;
        Viewer::from_token(&token)
    }
}

#[cfg(test)]
pub(crate) fn test_jwt(claims: serde_json::Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{header}.{payload}.sig")
}
