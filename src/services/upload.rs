//! Image host client
//!
//! Uploads go straight through to the host; the returned URL is what the
//! records store. Replaced images are not deleted.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::UploadConfig;
use crate::error::{AppError, AppResult};

/// What the host returns for an upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedAsset {
    pub url: String,
    pub public_id: String,
    #[serde(default = "default_resource_type")]
    pub resource_type: String,
}

fn default_resource_type() -> String {
    "image".to_string()
}

/// File received from the admin panel
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

#[async_trait]
pub trait ImageHost: Send + Sync {
    async fn upload(&self, file: UploadFile) -> AppResult<UploadedAsset>;

    async fn delete(&self, public_id: &str) -> AppResult<()>;
}

pub struct HttpImageHost {
    client: reqwest::Client,
    config: UploadConfig,
}

impl HttpImageHost {
    pub fn new(config: UploadConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }
}

fn upstream(e: impl std::fmt::Display) -> AppError {
    AppError::Upstream(e.to_string())
}

#[async_trait]
impl ImageHost for HttpImageHost {
    async fn upload(&self, file: UploadFile) -> AppResult<UploadedAsset> {
        if self.config.endpoint.is_empty() {
            return Err(AppError::Upstream("image host is not configured".to_string()));
        }

        let mut part = reqwest::multipart::Part::bytes(file.bytes).file_name(file.file_name.clone());
        if let Some(mime) = &file.content_type {
            part = part.mime_str(mime).map_err(upstream)?;
        }
        let mut form = reqwest::multipart::Form::new().part("file", part);
        if !self.config.preset.is_empty() {
            form = form.text("upload_preset", self.config.preset.clone());
        }
        if !self.config.api_key.is_empty() {
            form = form.text("api_key", self.config.api_key.clone());
        }

        let response = self
            .client
            .post(&self.config.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(upstream)?;
        if !response.status().is_success() {
            return Err(AppError::Upstream(format!(
                "upload of {} failed with {}",
                file.file_name,
                response.status()
            )));
        }
        let asset: UploadedAsset = response.json().await.map_err(upstream)?;
        tracing::info!("Uploaded {} as {}", file.file_name, asset.public_id);
        Ok(asset)
    }

    async fn delete(&self, public_id: &str) -> AppResult<()> {
        if self.config.delete_endpoint.is_empty() {
            return Err(AppError::Upstream("image host is not configured".to_string()));
        }
        let response = self
            .client
            .post(&self.config.delete_endpoint)
            .json(&serde_json::json!({ "public_id": public_id }))
            .send()
            .await
            .map_err(upstream)?;
        if !response.status().is_success() {
            return Err(AppError::Upstream(format!(
                "delete of {} failed with {}",
                public_id,
                response.status()
            )));
        }
        tracing::info!("Deleted asset {}", public_id);
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use tokio::sync::Mutex;

    /// Hands out predictable URLs and remembers deletions
    #[derive(Default)]
    pub struct FakeImageHost {
        pub deleted: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ImageHost for FakeImageHost {
        async fn upload(&self, file: UploadFile) -> AppResult<UploadedAsset> {
            Ok(UploadedAsset {
                url: format!("https://img.example/{}", file.file_name),
                public_id: format!("uploads/{}", file.file_name),
                resource_type: "image".to_string(),
            })
        }

        async fn delete(&self, public_id: &str) -> AppResult<()> {
            self.deleted.lock().await.push(public_id.to_string());
            Ok(())
        }
    }
}
