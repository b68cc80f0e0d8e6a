//! Driven port for minting signed blob URLs.
//!
//! Signing is a local computation over the account key, so this port is
//! synchronous.

use crate::domain::{SignedUrl, SignedUrlRequest};

use super::define_port_error;

define_port_error! {
    /// Errors raised while signing blob URLs.
    pub enum BlobUrlSignerError {
        /// Blob storage credentials are not configured.
        NotConfigured =>
            "blob storage credentials are not configured",
        /// The account key could not be decoded.
        InvalidKey { message: String } =>
            "blob account key is invalid: {message}",
        /// The blob URL could not be built.
        InvalidUrl { message: String } =>
            "blob url could not be built: {message}",
    }
}

/// Port for producing time-boxed, permission-scoped blob URLs.
#[cfg_attr(test, mockall::automock)]
pub trait BlobUrlSigner: Send + Sync {
    /// Sign a URL for one blob.
    fn sign(&self, request: &SignedUrlRequest) -> Result<SignedUrl, BlobUrlSignerError>;
}

/// Signer used when no blob credentials are configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledBlobUrlSigner;

impl BlobUrlSigner for DisabledBlobUrlSigner {
    fn sign(&self, _request: &SignedUrlRequest) -> Result<SignedUrl, BlobUrlSignerError> {
        Err(BlobUrlSignerError::not_configured())
    }
}

/// Signer that fails every request with the error it was built from.
///
/// Stands in when blob credentials are present but unusable, so signing
/// routes report the fault per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectingBlobUrlSigner {
    error: BlobUrlSignerError,
}

impl RejectingBlobUrlSigner {
    /// Fail every signing request with `error`.
    #[must_use]
    pub fn new(error: BlobUrlSignerError) -> Self {
        Self { error }
    }
}

impl BlobUrlSigner for RejectingBlobUrlSigner {
    fn sign(&self, _request: &SignedUrlRequest) -> Result<SignedUrl, BlobUrlSignerError> {
        Err(self.error.clone())
    }
}
