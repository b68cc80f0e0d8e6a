//! Reqwest-backed image analysis adapter.
//!
//! Owns transport details only: request serialisation, timeout and HTTP error
//! mapping, and JSON decoding into [`ImageAnalysis`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use tracing::debug;
use zeroize::Zeroizing;

use super::dto::{AnalyzeRequestDto, AnalyzeResponseDto};
use crate::domain::ImageAnalysis;
use crate::domain::ports::{ImageAnalyzer, ImageAnalyzerError};
use crate::outbound::http_client::{
    AdapterBuildError, SUBSCRIPTION_KEY_HEADER, build_client, is_timeout_status, operation_url,
    status_message,
};

const ANALYZE_PATH: &str = "/vision/v3.2/analyze";
const VISUAL_FEATURES: &str = "Tags,Description";

/// Image analysis adapter bound to one Computer Vision resource.
pub struct AzureVisionAnalyzer {
    client: Client,
    analyze_url: Url,
    key: Zeroizing<String>,
}

impl AzureVisionAnalyzer {
    /// Build an adapter whose requests are bounded by `timeout`.
    ///
    /// # Errors
    ///
    /// Returns an error when the client cannot be constructed or the endpoint
    /// cannot be joined with the operation path.
    pub fn new(
        endpoint: &Url,
        key: Zeroizing<String>,
        timeout: Duration,
    ) -> Result<Self, AdapterBuildError> {
        let analyze_url = operation_url(
            endpoint,
            ANALYZE_PATH,
            &[("visualFeatures", VISUAL_FEATURES)],
        )?;
        Ok(Self {
            client: build_client(timeout)?,
            analyze_url,
            key,
        })
    }
}

#[async_trait]
impl ImageAnalyzer for AzureVisionAnalyzer {
    async fn analyze(&self, image_url: &str) -> Result<ImageAnalysis, ImageAnalyzerError> {
        let response = self
            .client
            .post(self.analyze_url.clone())
            .header(SUBSCRIPTION_KEY_HEADER, self.key.as_str())
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&AnalyzeRequestDto { url: image_url })
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }

        let analysis = parse_analysis(body.as_ref())?;
        debug!(
            has_caption = analysis.caption().is_some(),
            tag_count = analysis.tags().len(),
            "image analysis decoded"
        );
        Ok(analysis)
    }
}

fn parse_analysis(body: &[u8]) -> Result<ImageAnalysis, ImageAnalyzerError> {
    let decoded: AnalyzeResponseDto = serde_json::from_slice(body).map_err(|error| {
        ImageAnalyzerError::decode(format!("invalid analysis JSON payload: {error}"))
    })?;
    Ok(decoded.into_domain())
}

fn map_transport_error(error: reqwest::Error) -> ImageAnalyzerError {
    if error.is_timeout() {
        ImageAnalyzerError::timeout(error.to_string())
    } else {
        ImageAnalyzerError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> ImageAnalyzerError {
    let message = status_message(status, body);
    if is_timeout_status(status) {
        ImageAnalyzerError::timeout(message)
    } else {
        ImageAnalyzerError::status(status.as_u16(), message)
    }
}
