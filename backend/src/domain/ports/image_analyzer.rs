//! Driven port for image captioning and tagging.

use async_trait::async_trait;

use crate::domain::ImageAnalysis;

use super::define_port_error;

define_port_error! {
    /// Errors surfaced while calling the image analysis service.
    pub enum ImageAnalyzerError {
        /// No analysis endpoint is configured.
        NotConfigured =>
            "image analysis is not configured",
        /// Network transport failed before receiving a response.
        Transport { message: String } =>
            "image analysis transport failed: {message}",
        /// The call exceeded its timeout.
        Timeout { message: String } =>
            "image analysis timeout: {message}",
        /// The service answered with a non-success status.
        Status { status: u16, message: String } =>
            "image analysis returned status {status}: {message}",
        /// The response could not be decoded.
        Decode { message: String } =>
            "image analysis response decode failed: {message}",
    }
}

/// Port for describing an image reachable at a URL.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageAnalyzer: Send + Sync {
    /// Caption and tag the image at `image_url`.
    async fn analyze(&self, image_url: &str) -> Result<ImageAnalysis, ImageAnalyzerError>;
}

/// Analyzer used when no endpoint is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledImageAnalyzer;

#[async_trait]
impl ImageAnalyzer for DisabledImageAnalyzer {
    async fn analyze(&self, _image_url: &str) -> Result<ImageAnalysis, ImageAnalyzerError> {
        Err(ImageAnalyzerError::not_configured())
    }
}
