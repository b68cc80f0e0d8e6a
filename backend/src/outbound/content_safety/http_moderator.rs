//! Reqwest-backed content moderation adapter.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use zeroize::Zeroizing;

use super::dto::{AnalyzeImageRequestDto, AnalyzeImageResponseDto, ImageSourceDto};
use crate::domain::CategorySeverity;
use crate::domain::ports::{ContentModerator, ContentModeratorError};
use crate::outbound::http_client::{
    AdapterBuildError, SUBSCRIPTION_KEY_HEADER, build_client, is_timeout_status, operation_url,
    status_message,
};

const ANALYZE_IMAGE_PATH: &str = "/contentsafety/image:analyze";
const API_VERSION: &str = "2023-10-01";

/// Moderation adapter bound to one Content Safety resource.
pub struct AzureContentSafetyModerator {
    client: Client,
    analyze_url: Url,
    key: Zeroizing<String>,
}

impl AzureContentSafetyModerator {
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
        let analyze_url =
            operation_url(endpoint, ANALYZE_IMAGE_PATH, &[("api-version", API_VERSION)])?;
        Ok(Self {
            client: build_client(timeout)?,
            analyze_url,
            key,
        })
    }
}

#[async_trait]
impl ContentModerator for AzureContentSafetyModerator {
    async fn analyze(
        &self,
        image_url: &str,
    ) -> Result<Vec<CategorySeverity>, ContentModeratorError> {
        let request = AnalyzeImageRequestDto {
            image: ImageSourceDto { url: image_url },
        };
        let response = self
            .client
            .post(self.analyze_url.clone())
            .header(SUBSCRIPTION_KEY_HEADER, self.key.as_str())
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&request)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        parse_categories(body.as_ref())
    }
}

fn parse_categories(body: &[u8]) -> Result<Vec<CategorySeverity>, ContentModeratorError> {
    let decoded: AnalyzeImageResponseDto = serde_json::from_slice(body).map_err(|error| {
        ContentModeratorError::decode(format!("invalid moderation JSON payload: {error}"))
    })?;
    Ok(decoded.into_domain())
}

fn map_transport_error(error: reqwest::Error) -> ContentModeratorError {
    if error.is_timeout() {
        ContentModeratorError::timeout(error.to_string())
    } else {
        ContentModeratorError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> ContentModeratorError {
    let message = status_message(status, body);
    if is_timeout_status(status) {
        ContentModeratorError::timeout(message)
    } else {
        ContentModeratorError::status(status.as_u16(), message)
    }
}
