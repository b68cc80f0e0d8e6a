//! Upload URL issuance.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::{info, warn};

use crate::domain::media::DEFAULT_UPLOAD_CONTENT_TYPE;
use crate::domain::ports::{
    BlobUrlSigner, BlobUrlSignerError, MediaCommand, UploadUrlPayload, UploadUrlRequest,
};
use crate::domain::{BlobName, Error, SasPolicy};

fn map_signer_error(error: BlobUrlSignerError) -> Error {
    match error {
        BlobUrlSignerError::NotConfigured => {
            Error::misconfigured("blob storage credentials are not configured")
        }
        BlobUrlSignerError::InvalidKey { .. } => {
            warn!(error = %error, "blob account key rejected");
            Error::misconfigured("blob account key is invalid")
        }
        BlobUrlSignerError::InvalidUrl { message } => {
            Error::internal(format!("blob url could not be built: {message}"))
        }
    }
}

/// Media service implementing [`MediaCommand`].
pub struct MediaService {
    signer: Arc<dyn BlobUrlSigner>,
    clock: Arc<dyn Clock>,
    sas_policy: SasPolicy,
}

impl MediaService {
    /// Create a media service.
    pub fn new(
        signer: Arc<dyn BlobUrlSigner>,
        clock: Arc<dyn Clock>,
        sas_policy: SasPolicy,
    ) -> Self {
        Self {
            signer,
            clock,
            sas_policy,
        }
    }
}

#[async_trait]
impl MediaCommand for MediaService {
    async fn issue_upload_url(
        &self,
        request: UploadUrlRequest,
    ) -> Result<UploadUrlPayload, Error> {
        let now = self.clock.utc();
        let blob_name = BlobName::from_file_name(&request.file_name, now).map_err(|err| {
            Error::invalid_request(err.to_string())
                .with_details(json!({ "field": "fileName", "code": "missing" }))
        })?;
        let content_type = request
            .content_type
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_UPLOAD_CONTENT_TYPE.to_owned());

        let signing_request = self
            .sas_policy
            .upload_request(blob_name.clone(), Some(content_type), now);
        let signed = self
            .signer
            .sign(&signing_request)
            .map_err(map_signer_error)?;

        info!(
            blob_name = %blob_name,
            permissions = %signing_request.permissions,
            expires_at = %signed.expires_at,
            "upload url issued"
        );
        Ok(UploadUrlPayload {
            upload_url: signed.url.to_string(),
            image_path: blob_name.to_string(),
            blob_url: signed.blob_url.to_string(),
            expires_at: signed.expires_at,
        })
    }
}
