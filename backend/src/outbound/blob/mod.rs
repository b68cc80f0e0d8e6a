//! Azure Blob Storage service SAS signing.
//!
//! Produces single-blob service SAS URLs signed locally with the storage
//! account key (HMAC-SHA256). No network call is made. Only metadata is
//! logged; a signed query string never reaches the logs.

mod fingerprint;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use chrono::{DateTime, SecondsFormat, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::{debug, info};
use url::Url;
use zeroize::Zeroizing;

use crate::domain::ports::{BlobUrlSigner, BlobUrlSignerError};
use crate::domain::{SignedUrl, SignedUrlRequest};

pub use fingerprint::key_fingerprint;

type HmacSha256 = Hmac<Sha256>;

/// Storage service version signed into every URL.
pub const SAS_VERSION: &str = "2022-11-02";

/// Container used when none is configured.
pub const DEFAULT_CONTAINER: &str = "media";

/// Blob storage account settings.
#[derive(Clone)]
pub struct BlobStorageConfig {
    pub account_name: String,
    pub account_key: Zeroizing<String>,
    pub container: String,
    /// Service endpoint; defaults to `https://<account>.blob.core.windows.net`.
    pub endpoint: Option<Url>,
}

impl std::fmt::Debug for BlobStorageConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlobStorageConfig")
            .field("account_name", &self.account_name)
            .field("account_key", &"<redacted>")
            .field("container", &self.container)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

/// Signs blob URLs with a storage account key.
pub struct AzureBlobSasSigner {
    account_name: String,
    key: Zeroizing<Vec<u8>>,
    container: String,
    endpoint: Url,
}

fn sas_time(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

impl AzureBlobSasSigner {
    /// Decode the account key and resolve the endpoint.
    ///
    /// # Errors
    ///
    /// [`BlobUrlSignerError::InvalidKey`] when the key is not Base64 and
    /// [`BlobUrlSignerError::InvalidUrl`] when the endpoint cannot be built.
    pub fn new(config: BlobStorageConfig) -> Result<Self, BlobUrlSignerError> {
        let key = STANDARD
            .decode(config.account_key.trim())
            .map(Zeroizing::new)
            .map_err(|err| BlobUrlSignerError::invalid_key(err.to_string()))?;
        if key.is_empty() {
            return Err(BlobUrlSignerError::invalid_key("key is empty"));
        }
        let endpoint = match config.endpoint {
            Some(endpoint) => endpoint,
            None => Url::parse(&format!(
                "https://{}.blob.core.windows.net",
                config.account_name
            ))
            .map_err(|err| BlobUrlSignerError::invalid_url(err.to_string()))?,
        };

        info!(
            account = %config.account_name,
            container = %config.container,
            key_fingerprint = %key_fingerprint(&key),
            "blob sas signer ready"
        );
        Ok(Self {
            account_name: config.account_name,
            key,
            container: config.container,
            endpoint,
        })
    }

    fn blob_url(&self, blob_name: &str) -> Result<Url, BlobUrlSignerError> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|()| BlobUrlSignerError::invalid_url("endpoint cannot be a base"))?
            .pop_if_empty()
            .push(&self.container)
            .extend(blob_name.split('/'));
        url.set_query(None);
        Ok(url)
    }

    fn protocol(&self) -> &'static str {
        if self.endpoint.scheme() == "https" {
            "https"
        } else {
            "https,http"
        }
    }

    fn string_to_sign(&self, request: &SignedUrlRequest, permissions: &str) -> String {
        let resource = format!(
            "/blob/{}/{}/{}",
            self.account_name, self.container, request.blob_name
        );
        let start = sas_time(request.starts_at);
        let expiry = sas_time(request.expires_at);
        [
            permissions,
            start.as_str(),
            expiry.as_str(),
            resource.as_str(),
            "", // signed identifier
            "", // signed IP
            self.protocol(),
            SAS_VERSION,
            "b",
            "", // snapshot time
            "", // encryption scope
            "", // rscc
            "", // rscd
            "", // rsce
            "", // rscl
            request.content_type.as_deref().unwrap_or_default(),
        ]
        .join("\n")
    }

    fn signature(&self, string_to_sign: &str) -> Result<String, BlobUrlSignerError> {
        let mut mac = HmacSha256::new_from_slice(&self.key)
            .map_err(|err| BlobUrlSignerError::invalid_key(err.to_string()))?;
        mac.update(string_to_sign.as_bytes());
        Ok(STANDARD.encode(mac.finalize().into_bytes()))
    }
}

impl BlobUrlSigner for AzureBlobSasSigner {
    fn sign(&self, request: &SignedUrlRequest) -> Result<SignedUrl, BlobUrlSignerError> {
        let blob_url = self.blob_url(request.blob_name.as_str())?;
        let permissions = request.permissions.to_string();
        let signature = self.signature(&self.string_to_sign(request, &permissions))?;

        let mut url = blob_url.clone();
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("sv", SAS_VERSION)
                .append_pair("st", &sas_time(request.starts_at))
                .append_pair("se", &sas_time(request.expires_at))
                .append_pair("sr", "b")
                .append_pair("sp", &permissions)
                .append_pair("spr", self.protocol());
            if let Some(content_type) = request.content_type.as_deref() {
                query.append_pair("rsct", content_type);
            }
            query.append_pair("sig", &signature);
        }

        debug!(
            container = %self.container,
            blob_name = %request.blob_name,
            permissions = %permissions,
            expires_at = %request.expires_at,
            "blob url signed"
        );
        Ok(SignedUrl {
            url,
            blob_url,
            expires_at: request.expires_at,
        })
    }
}

#[cfg(test)]
#[path = "signer_tests.rs"]
mod tests;
