//! Driving ports for trail mutations and reads.
//!
//! Payload types here are the serialisable projection of [`Trail`]; HTTP
//! handlers translate them into response bodies.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Error, Trail, TrailDraft, TrailPatch};

/// Serialisable trail document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrailPayload {
    pub id: String,
    pub trail_id: String,
    pub title: String,
    pub description: String,
    pub location: String,
    pub image_path: Option<String>,
    pub media: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub ai_caption: Option<String>,
    pub ai_tags: Vec<String>,
    pub ai_analyzed_at: Option<DateTime<Utc>>,
}

impl From<Trail> for TrailPayload {
    fn from(value: Trail) -> Self {
        let id = value.id().to_string();
        Self {
            trail_id: id.clone(),
            id,
            title: value.title().to_owned(),
            description: value.description().to_owned(),
            location: value.location().to_owned(),
            image_path: value.image_path().map(str::to_owned),
            media: value.media().to_vec(),
            created_at: value.created_at(),
            updated_at: value.updated_at(),
            ai_caption: value.ai_caption().map(str::to_owned),
            ai_tags: value.ai_tags().to_vec(),
            ai_analyzed_at: value.ai_analyzed_at(),
        }
    }
}

/// Trail document annotated with a read URL for its image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrailListItemPayload {
    #[serde(flatten)]
    pub trail: TrailPayload,
    /// Read-only signed URL, `None` when there is no image or signing is
    /// unavailable.
    pub image_url: Option<String>,
}

/// Request to create a trail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTrailRequest {
    pub draft: TrailDraft,
}

/// Request to merge fields into an existing trail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateTrailRequest {
    pub trail_id: String,
    pub patch: TrailPatch,
}

/// Request to list trails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListTrailsRequest {
    /// Attach read URLs for trail images.
    pub sign_images: bool,
}

impl Default for ListTrailsRequest {
    fn default() -> Self {
        Self { sign_images: true }
    }
}

/// Driving port for trail writes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TrailCommand: Send + Sync {
    /// Validate, optionally analyse the image, and insert a new trail.
    ///
    /// Image analysis never fails the call. A duplicate identifier fails
    /// with a conflict.
    async fn create(&self, request: CreateTrailRequest) -> Result<TrailPayload, Error>;

    /// Merge the provided fields into an existing trail.
    async fn update(&self, request: UpdateTrailRequest) -> Result<TrailPayload, Error>;

    /// Hard-delete a trail.
    async fn delete(&self, trail_id: &str) -> Result<(), Error>;
}

/// Driving port for trail reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TrailQuery: Send + Sync {
    /// Point lookup by identifier.
    async fn get(&self, trail_id: &str) -> Result<TrailPayload, Error>;

    /// Every trail, newest first.
    async fn list(&self, request: ListTrailsRequest) -> Result<Vec<TrailListItemPayload>, Error>;

    /// Check that the backing store answers.
    async fn ping_store(&self) -> Result<(), Error>;
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use chrono::TimeZone;
    use rstest::rstest;
    use serde_json::Value;

    use super::*;
    use crate::domain::{ImageAnalysis, TrailLimits};

    #[rstest]
    fn payload_repeats_id_as_trail_id_and_serialises_camel_case() {
        let now = Utc
            .timestamp_millis_opt(1_700_000_000_000)
            .single()
            .expect("valid instant");
        let fields = TrailDraft {
            trail_id: Some("loop-1".to_owned()),
            title: "Loop".to_owned(),
            ..TrailDraft::default()
        }
        .validate(&TrailLimits::default())
        .expect("valid draft");
        let payload = TrailPayload::from(Trail::create(fields, ImageAnalysis::default(), now));

        let item = TrailListItemPayload {
            trail: payload,
            image_url: None,
        };
        let value = serde_json::to_value(&item).expect("serialise item");

        assert_eq!(value.get("id"), Some(&Value::from("loop-1")));
        assert_eq!(value.get("trailId"), Some(&Value::from("loop-1")));
        assert_eq!(value.get("imagePath"), Some(&Value::Null));
        assert_eq!(value.get("imageUrl"), Some(&Value::Null));
        assert_eq!(value.get("aiTags"), Some(&Value::Array(Vec::new())));
        assert_eq!(
            value.get("createdAt").and_then(Value::as_str),
            Some("2023-11-14T22:13:20Z")
        );
    }
}
