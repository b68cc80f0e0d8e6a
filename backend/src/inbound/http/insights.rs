//! On-demand image analysis and moderation handlers.
//!
//! Both routes accept the image as `imageUrl`, `image.url` or `url`, in that
//! order of preference.

use std::collections::BTreeMap;

use actix_web::{post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::{CategorySeverityPayload, ImageAnalysisPayload, ModerationPayload};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, first_present, missing_field_error};

/// Nested image reference.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(default)]
pub struct ImageRefBody {
    pub url: Option<String>,
}

/// Request payload naming the image to inspect.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct ImageRequestBody {
    #[schema(example = "https://trailshare.blob.core.windows.net/media/1714564800000_coast.jpg")]
    pub image_url: Option<String>,
    pub image: Option<ImageRefBody>,
    pub url: Option<String>,
}

impl ImageRequestBody {
    fn resolve_url(&self) -> ApiResult<&str> {
        first_present([
            self.image_url.as_deref(),
            self.image.as_ref().and_then(|image| image.url.as_deref()),
            self.url.as_deref(),
        ])
        .ok_or_else(|| missing_field_error(FieldName::new("imageUrl")))
    }
}

/// Caption and tags for an image.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct AnalysisResponseBody {
    #[schema(example = "a rocky coastline")]
    pub caption: Option<String>,
    pub tags: Vec<String>,
}

impl From<ImageAnalysisPayload> for AnalysisResponseBody {
    fn from(value: ImageAnalysisPayload) -> Self {
        Self {
            caption: value.caption,
            tags: value.tags,
        }
    }
}

/// A category at or above the moderation threshold.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct FailingCategoryBody {
    #[schema(example = "Hate")]
    pub category: String,
    pub severity: u8,
}

impl From<CategorySeverityPayload> for FailingCategoryBody {
    fn from(value: CategorySeverityPayload) -> Self {
        Self {
            category: value.category,
            severity: value.severity,
        }
    }
}

/// Moderation verdict for an image.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ModerationResponseBody {
    pub allowed: bool,
    pub threshold: u8,
    pub max_severity: u8,
    /// Severity per reported category.
    pub categories: BTreeMap<String, u8>,
    pub failing: Vec<FailingCategoryBody>,
}

impl From<ModerationPayload> for ModerationResponseBody {
    fn from(value: ModerationPayload) -> Self {
        Self {
            allowed: value.allowed,
            threshold: value.threshold,
            max_severity: value.max_severity,
            categories: value.categories,
            failing: value
                .failing
                .into_iter()
                .map(FailingCategoryBody::from)
                .collect(),
        }
    }
}

/// Caption and tag an image.
#[utoipa::path(
    post,
    path = "/api/analyze-image",
    request_body = ImageRequestBody,
    responses(
        (status = 200, description = "Image analysed", body = AnalysisResponseBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 500, description = "Image analysis misconfigured", body = ErrorSchema),
        (status = 502, description = "Image analysis service failed", body = ErrorSchema)
    ),
    tags = ["insights"],
    operation_id = "analyzeImage"
)]
#[post("/analyze-image")]
pub async fn analyze_image(
    state: web::Data<HttpState>,
    payload: web::Json<ImageRequestBody>,
) -> ApiResult<web::Json<AnalysisResponseBody>> {
    let image_url = payload.resolve_url()?;
    let analysis = state.insights.analyze_image(image_url).await?;
    Ok(web::Json(AnalysisResponseBody::from(analysis)))
}

/// Decide whether an image may be published.
#[utoipa::path(
    post,
    path = "/api/moderate-image",
    request_body = ImageRequestBody,
    responses(
        (status = 200, description = "Moderation verdict", body = ModerationResponseBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 500, description = "Content moderation misconfigured", body = ErrorSchema),
        (status = 502, description = "Content moderation service failed", body = ErrorSchema)
    ),
    tags = ["insights"],
    operation_id = "moderateImage"
)]
#[post("/moderate-image")]
pub async fn moderate_image(
    state: web::Data<HttpState>,
    payload: web::Json<ImageRequestBody>,
) -> ApiResult<web::Json<ModerationResponseBody>> {
    let image_url = payload.resolve_url()?;
    let verdict = state.insights.moderate_image(image_url).await?;
    Ok(web::Json(ModerationResponseBody::from(verdict)))
}
