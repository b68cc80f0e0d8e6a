//! On-demand image analysis and moderation.
//!
//! Both operations are load-bearing: adapter failures surface to the caller
//! as upstream failures instead of degrading.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::{info, warn};
use url::Url;

use crate::domain::ports::{
    ContentModerator, ContentModeratorError, ImageAnalysisPayload, ImageAnalyzer,
    ImageAnalyzerError, ImageInsights, ModerationPayload,
};
use crate::domain::{Error, ModerationPolicy};

fn require_image_url(raw: &str) -> Result<&str, Error> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(Error::invalid_request("imageUrl is required")
            .with_details(json!({ "field": "imageUrl", "code": "missing" })));
    }
    match Url::parse(trimmed) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(trimmed),
        _ => Err(Error::invalid_request("imageUrl must be an absolute http(s) URL")
            .with_details(json!({ "field": "imageUrl", "code": "invalid_url" }))),
    }
}

fn map_analyzer_error(error: ImageAnalyzerError) -> Error {
    if matches!(error, ImageAnalyzerError::NotConfigured) {
        return Error::misconfigured("image analysis is not configured");
    }
    warn!(error = %error, "image analysis failed");
    Error::upstream_failure("image analysis service failed")
        .with_details(json!({ "reason": error.kind() }))
}

fn map_moderator_error(error: ContentModeratorError) -> Error {
    if matches!(error, ContentModeratorError::NotConfigured) {
        return Error::misconfigured("content moderation is not configured");
    }
    warn!(error = %error, "content moderation failed");
    Error::upstream_failure("content moderation service failed")
        .with_details(json!({ "reason": error.kind() }))
}

/// Service implementing [`ImageInsights`].
pub struct ImageInsightService {
    analyzer: Arc<dyn ImageAnalyzer>,
    moderator: Arc<dyn ContentModerator>,
    policy: ModerationPolicy,
}

impl ImageInsightService {
    /// Create an insight service.
    pub fn new(
        analyzer: Arc<dyn ImageAnalyzer>,
        moderator: Arc<dyn ContentModerator>,
        policy: ModerationPolicy,
    ) -> Self {
        Self {
            analyzer,
            moderator,
            policy,
        }
    }
}

#[async_trait]
impl ImageInsights for ImageInsightService {
    async fn analyze_image(&self, image_url: &str) -> Result<ImageAnalysisPayload, Error> {
        let image_url = require_image_url(image_url)?;
        let analysis = self
            .analyzer
            .analyze(image_url)
            .await
            .map_err(map_analyzer_error)?;
        info!(
            tags = analysis.tags().len(),
            captioned = analysis.caption().is_some(),
            "image analysed"
        );
        Ok(ImageAnalysisPayload::from(analysis))
    }

    async fn moderate_image(&self, image_url: &str) -> Result<ModerationPayload, Error> {
        let image_url = require_image_url(image_url)?;
        let categories = self
            .moderator
            .analyze(image_url)
            .await
            .map_err(map_moderator_error)?;
        let verdict = self.policy.evaluate(categories);
        info!(
            allowed = verdict.allowed(),
            max_severity = verdict.max_severity(),
            threshold = verdict.threshold(),
            "image moderated"
        );
        Ok(ModerationPayload::from(verdict))
    }
}

#[cfg(test)]
#[path = "image_insight_service_tests.rs"]
mod tests;
