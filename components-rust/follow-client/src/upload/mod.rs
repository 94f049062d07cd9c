//! Avatar upload to the external image host.

use crate::config::UploadConfig;
use crate::error::{ClientError, ClientResult};
use crate::http::join_url;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

#[async_trait]
pub trait ImageUploader: Send + Sync {
    /// Uploads the image at `file` and returns its public URL.
    async fn upload(&self, file: &Path) -> ClientResult<String>;
}

#[derive(Deserialize)]
struct UploadResponse {
    secure_url: String,
}

#[derive(Deserialize)]
struct UploadErrorBody {
    error: Option<UploadErrorDetail>,
}

#[derive(Deserialize)]
struct UploadErrorDetail {
    message: String,
}

/// Unsigned multipart upload to a Cloudinary-style image host.
pub struct HostedImageUploader {
    http: Client,
    config: UploadConfig,
}

impl HostedImageUploader {
    pub fn new(config: UploadConfig, timeout: Duration) -> ClientResult<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(HostedImageUploader { http, config })
    }
}

#[async_trait]
impl ImageUploader for HostedImageUploader {
    async fn upload(&self, file: &Path) -> ClientResult<String> {
        let (cloud_name, preset) = match (&self.config.cloud_name, &self.config.upload_preset) {
            (Some(cloud), Some(preset)) => (cloud, preset),
            _ => {
                return Err(ClientError::Config(
                    "image upload needs FOLLOW_UPLOAD_CLOUD and FOLLOW_UPLOAD_PRESET".to_string(),
                ))
            }
        };

        let bytes = tokio::fs::read(file).await?;
        let file_name = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "avatar".to_string());

        let form = Form::new()
            .part("file", Part::bytes(bytes).file_name(file_name))
            .text("upload_preset", preset.clone())
            .text("folder", self.config.folder.clone());

        let url = join_url(&self.config.base_url, &["v1_1", cloud_name, "image", "upload"])?;
        log::debug!("uploading avatar {} to {url}", file.display());

        let response = self.http.post(url).multipart(form).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<UploadErrorBody>(&text)
                .ok()
                .and_then(|b| b.error)
                .map(|e| e.message)
                .unwrap_or_else(|| {
                    format!("Failed to upload image. Status: {}", status.as_u16())
                });
            return Err(ClientError::Upload(message));
        }

        let uploaded: UploadResponse = serde_json::from_str(&text)?;
        log::info!("avatar uploaded - url: {}", uploaded.secure_url);
        Ok(uploaded.secure_url)
    }
}
