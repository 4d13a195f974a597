//! Best-effort remote upload
//!
//! The widget only knows the [`UploadService`] capability. [`HttpUploadService`]
//! talks to the study relay's `/api/upload` endpoint, which stores the file and
//! answers with its storage path and public URL.

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::models::FileContent;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Invalid upload URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("Upload rejected with status {status}: {message}")]
    Status { status: u16, message: String },
    #[error("Upload rejected: {0}")]
    Rejected(String),
}

/// Upload outcome as reported by the service
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub ok: bool,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub public_url: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[async_trait]
pub trait UploadService: Send + Sync {
    async fn upload_file(
        &self,
        content: &FileContent,
        declared_name: &str,
    ) -> Result<UploadResponse, UploadError>;
}

/// JSON body accepted by the relay
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UploadBody<'a> {
    name: &'a str,
    content_type: &'a str,
    base64: String,
}

/// Uploads through the relay's JSON endpoint
pub struct HttpUploadService {
    client: reqwest::Client,
    endpoint: Url,
    token: Option<String>,
}

impl HttpUploadService {
    /// `base_url` is the relay root; the endpoint is `{base_url}/api/upload`
    pub fn new(base_url: &str, token: Option<String>) -> Result<Self, UploadError> {
        let endpoint = Url::parse(base_url)?.join("/api/upload")?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()?;
        Ok(Self { client, endpoint, token })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl UploadService for HttpUploadService {
    async fn upload_file(
        &self,
        content: &FileContent,
        declared_name: &str,
    ) -> Result<UploadResponse, UploadError> {
        let content_type = if content.mime_type.is_empty() {
            "application/octet-stream"
        } else {
            content.mime_type.as_str()
        };
        let body = UploadBody {
            name: declared_name,
            content_type,
            base64: base64::engine::general_purpose::STANDARD.encode(content.bytes()),
        };

        let mut request = self.client.post(self.endpoint.clone()).json(&body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(UploadError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: UploadResponse = response.json().await?;
        if !parsed.ok {
            return Err(UploadError::Rejected(
                parsed.error.unwrap_or_else(|| "service reported failure".to_string()),
            ));
        }
        Ok(parsed)
    }
}
