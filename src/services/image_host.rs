//! Image host client
//!
//! Uploads images to an ImgBB-style API: `POST {api_url}?key=...` with a
//! multipart `image` field, answered by `{"data": {"url": ...}}`.

use std::time::Duration;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tracing::debug;
use crate::config::ImageHostConfig;
use crate::utils::errors::{EventHubError, Result};
use crate::utils::helpers::sanitize_filename;
use crate::utils::logging::log_api_error;

/// Largest image accepted for upload
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

#[derive(Debug, Deserialize)]
struct UploadResponse {
    data: Option<UploadData>,
    #[serde(default)]
    success: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct UploadData {
    url: String,
}

#[derive(Clone)]
pub struct ImageHostClient {
    client: reqwest::Client,
    config: ImageHostConfig,
}

impl ImageHostClient {
    pub fn new(config: ImageHostConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self { client, config })
    }

    /// Upload `bytes` and return the public URL
    pub async fn upload(&self, filename: &str, bytes: Vec<u8>) -> Result<String> {
        if bytes.is_empty() {
            return Err(EventHubError::Validation("Image is empty".to_string()));
        }
        if bytes.len() > MAX_IMAGE_BYTES {
            return Err(EventHubError::Validation(format!(
                "Image exceeds {} MB",
                MAX_IMAGE_BYTES / (1024 * 1024)
            )));
        }

        let name = format!("{}-{}", uuid::Uuid::new_v4().simple(), sanitize_filename(filename));
        let form = Form::new().part("image", Part::bytes(bytes).file_name(name.clone()));

        debug!(file = %name, "Uploading image");
        let response = self.client
            .post(&self.config.api_url)
            .query(&[("key", self.config.api_key.as_str())])
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            log_api_error("image_host", &format!("upload rejected with status {}", status), Some(&body));
            return Err(EventHubError::ImageHost(format!("upload failed with status {}", status)));
        }

        let parsed: UploadResponse = response.json().await?;
        match (parsed.success, parsed.data) {
            (Some(false), _) | (_, None) => Err(EventHubError::ImageHost("response carried no image URL".to_string())),
            (_, Some(data)) => Ok(data.url),
        }
    }
}
