//! Driving port for upload URL issuance.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::Error;

/// Request for a signed upload URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadUrlRequest {
    pub file_name: String,
    pub content_type: Option<String>,
}

/// Signed upload URL plus the object key to store on the trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadUrlPayload {
    pub upload_url: String,
    pub image_path: String,
    pub blob_url: String,
    pub expires_at: DateTime<Utc>,
}

/// Driving port for media operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaCommand: Send + Sync {
    /// Mint a short-lived, write-scoped URL for a new blob.
    async fn issue_upload_url(&self, request: UploadUrlRequest)
    -> Result<UploadUrlPayload, Error>;
}
