//! Client for the follow-graph backend: profile completion, the follower
//! dashboard and account administration.

pub mod admin;
pub mod card;
pub mod config;
pub mod dashboard;
pub mod draft;
pub mod error;
pub mod http;
pub mod profile;
pub mod session;
pub mod shell;
pub mod upload;

pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use http::ApiClient;
pub use session::{TokenProvider, Viewer};
