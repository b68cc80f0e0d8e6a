//! Driving port for on-demand image analysis and moderation.
//!
//! Unlike analysis during trail creation, failures here are reported to the
//! caller.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{CategorySeverity, Error, ImageAnalysis, ModerationVerdict};

/// Caption and tags for an image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageAnalysisPayload {
    pub caption: Option<String>,
    pub tags: Vec<String>,
}

impl From<ImageAnalysis> for ImageAnalysisPayload {
    fn from(value: ImageAnalysis) -> Self {
        let (caption, tags) = value.into_parts();
        Self { caption, tags }
    }
}

/// One moderation category score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySeverityPayload {
    pub category: String,
    pub severity: u8,
}

impl From<&CategorySeverity> for CategorySeverityPayload {
    fn from(value: &CategorySeverity) -> Self {
        Self {
            category: value.category.clone(),
            severity: value.severity,
        }
    }
}

/// Moderation decision for an image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModerationPayload {
    pub allowed: bool,
    pub threshold: u8,
    pub max_severity: u8,
    pub categories: BTreeMap<String, u8>,
    pub failing: Vec<CategorySeverityPayload>,
}

impl From<ModerationVerdict> for ModerationPayload {
    fn from(value: ModerationVerdict) -> Self {
        Self {
            allowed: value.allowed(),
            threshold: value.threshold(),
            max_severity: value.max_severity(),
            categories: value
                .categories()
                .iter()
                .map(|entry| (entry.category.clone(), entry.severity))
                .collect(),
            failing: value
                .failing()
                .iter()
                .map(CategorySeverityPayload::from)
                .collect(),
        }
    }
}

/// Driving port for image insight operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageInsights: Send + Sync {
    /// Caption and tag the image at `image_url`.
    async fn analyze_image(&self, image_url: &str) -> Result<ImageAnalysisPayload, Error>;

    /// Decide whether the image at `image_url` may be published.
    async fn moderate_image(&self, image_url: &str) -> Result<ModerationPayload, Error>;
}
