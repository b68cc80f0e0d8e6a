//! Trail records: the only persisted aggregate.
//!
//! A trail is keyed by its [`TrailId`], which doubles as the storage key so
//! reads are point lookups. Text fields are trimmed and bounded on the way in
//! (see [`TrailDraft::validate`] and [`TrailPatch::validate`]); the image is
//! referenced by its object key inside the media container, never by a signed
//! URL.

use std::fmt;

use chrono::{DateTime, Utc};

use super::vision::ImageAnalysis;

mod validation;

pub use validation::{ValidatedTrail, ValidatedTrailPatch};

/// Minimum title length in characters after trimming.
pub const TITLE_MIN_CHARS: usize = 2;
/// Maximum title length in characters after trimming.
pub const TITLE_MAX_CHARS: usize = 80;
/// Maximum description length in characters after trimming.
pub const DESCRIPTION_MAX_CHARS: usize = 500;
/// Maximum location length in characters after trimming.
pub const LOCATION_MAX_CHARS: usize = 120;
/// Maximum caller-supplied trail identifier length.
pub const TRAIL_ID_MAX_CHARS: usize = 128;
/// Default bound for `imagePath` when none is configured.
pub const DEFAULT_IMAGE_PATH_MAX_CHARS: usize = 300;

/// Validation errors raised while normalising trail input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrailValidationError {
    InvalidTrailId { value: String },
    TitleTooShort { length: usize },
    TitleTooLong { length: usize },
    DescriptionTooLong { length: usize },
    LocationTooLong { length: usize },
    ImagePathTooLong { length: usize, limit: usize },
    ImagePathIsUrl,
}

impl TrailValidationError {
    /// Wire name of the offending field.
    #[must_use]
    pub fn field(&self) -> &'static str {
        match self {
            Self::InvalidTrailId { .. } => "trailId",
            Self::TitleTooShort { .. } | Self::TitleTooLong { .. } => "title",
            Self::DescriptionTooLong { .. } => "description",
            Self::LocationTooLong { .. } => "location",
            Self::ImagePathTooLong { .. } | Self::ImagePathIsUrl => "imagePath",
        }
    }

    /// Stable machine-readable reason.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidTrailId { .. } => "invalid_trail_id",
            Self::TitleTooShort { .. } => "too_short",
            Self::TitleTooLong { .. }
            | Self::DescriptionTooLong { .. }
            | Self::LocationTooLong { .. }
            | Self::ImagePathTooLong { .. } => "too_long",
            Self::ImagePathIsUrl => "url_not_allowed",
        }
    }

    /// Bound that was violated, when the failure is a length check.
    #[must_use]
    pub fn limit(&self) -> Option<usize> {
        match self {
            Self::TitleTooShort { .. } => Some(TITLE_MIN_CHARS),
            Self::TitleTooLong { .. } => Some(TITLE_MAX_CHARS),
            Self::DescriptionTooLong { .. } => Some(DESCRIPTION_MAX_CHARS),
            Self::LocationTooLong { .. } => Some(LOCATION_MAX_CHARS),
            Self::ImagePathTooLong { limit, .. } => Some(*limit),
            Self::InvalidTrailId { .. } | Self::ImagePathIsUrl => None,
        }
    }

    /// Observed length of the rejected value, when relevant.
    #[must_use]
    pub fn length(&self) -> Option<usize> {
        match self {
            Self::TitleTooShort { length }
            | Self::TitleTooLong { length }
            | Self::DescriptionTooLong { length }
            | Self::LocationTooLong { length }
            | Self::ImagePathTooLong { length, .. } => Some(*length),
            Self::InvalidTrailId { .. } | Self::ImagePathIsUrl => None,
        }
    }
}

impl fmt::Display for TrailValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidTrailId { value } => write!(
                f,
                "trailId must be 1-{TRAIL_ID_MAX_CHARS} characters of A-Z, a-z, 0-9, '.', '_' or '-' (got {value:?})"
            ),
            Self::TitleTooShort { length } => write!(
                f,
                "title must be at least {TITLE_MIN_CHARS} characters (got {length})"
            ),
            Self::TitleTooLong { length } => write!(
                f,
                "title must be at most {TITLE_MAX_CHARS} characters (got {length})"
            ),
            Self::DescriptionTooLong { length } => write!(
                f,
                "description must be at most {DESCRIPTION_MAX_CHARS} characters (got {length})"
            ),
            Self::LocationTooLong { length } => write!(
                f,
                "location must be at most {LOCATION_MAX_CHARS} characters (got {length})"
            ),
            Self::ImagePathTooLong { length, limit } => write!(
                f,
                "imagePath must be at most {limit} characters (got {length})"
            ),
            Self::ImagePathIsUrl => write!(
                f,
                "imagePath must be an object key, not a URL or signed URL"
            ),
        }
    }
}

impl std::error::Error for TrailValidationError {}

/// Trail identifier; also the storage key.
///
/// # Examples
/// ```
/// use chrono::{TimeZone, Utc};
/// use trailshare::domain::TrailId;
///
/// let at = Utc.timestamp_millis_opt(1_700_000_000_123).single().expect("valid instant");
/// assert_eq!(TrailId::generate(at).as_str(), "trail_1700000000123");
/// assert!(TrailId::new("ben-nevis.north_face").is_ok());
/// assert!(TrailId::new("../etc").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TrailId(String);

impl TrailId {
    /// Validate a caller-supplied identifier.
    pub fn new(raw: impl Into<String>) -> Result<Self, TrailValidationError> {
        let value = raw.into();
        let length = value.chars().count();
        let allowed = value
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '.' | '_' | '-'));
        if length == 0 || length > TRAIL_ID_MAX_CHARS || !allowed || value.chars().all(|ch| ch == '.')
        {
            return Err(TrailValidationError::InvalidTrailId { value });
        }
        Ok(Self(value))
    }

    /// Generate the default identifier `trail_<epoch-ms>` for `at`.
    #[must_use]
    pub fn generate(at: DateTime<Utc>) -> Self {
        Self(format!("trail_{}", at.timestamp_millis()))
    }

    /// Borrow the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for TrailId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for TrailId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Configurable bounds applied during validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrailLimits {
    image_path_max_chars: usize,
}

impl TrailLimits {
    /// Build limits with an explicit `imagePath` bound.
    #[must_use]
    pub const fn new(image_path_max_chars: usize) -> Self {
        Self {
            image_path_max_chars,
        }
    }

    /// Maximum `imagePath` length in characters.
    #[must_use]
    pub const fn image_path_max_chars(&self) -> usize {
        self.image_path_max_chars
    }
}

impl Default for TrailLimits {
    fn default() -> Self {
        Self::new(DEFAULT_IMAGE_PATH_MAX_CHARS)
    }
}

/// Raw create input prior to validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrailDraft {
    pub trail_id: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub image_path: Option<String>,
    pub media: Vec<String>,
}

/// Raw partial update. `None` leaves the stored value untouched.
///
/// An empty `image_path` clears the stored image reference.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrailPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub image_path: Option<String>,
    pub media: Option<Vec<String>>,
}

/// Persisted field set, used by storage adapters to rebuild a [`Trail`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrailSnapshot {
    pub id: String,
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

/// A stored trail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trail {
    id: TrailId,
    title: String,
    description: String,
    location: String,
    image_path: Option<String>,
    media: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    ai_caption: Option<String>,
    ai_tags: Vec<String>,
    ai_analyzed_at: Option<DateTime<Utc>>,
}

impl Trail {
    /// Build a new trail from validated input.
    ///
    /// The identifier defaults to `trail_<epoch-ms>` of `now`; `createdAt` and
    /// `updatedAt` are both `now`. `aiAnalyzedAt` is only set when the
    /// analysis produced something.
    #[must_use]
    pub fn create(fields: ValidatedTrail, analysis: ImageAnalysis, now: DateTime<Utc>) -> Self {
        let ValidatedTrail {
            trail_id,
            title,
            description,
            location,
            image_path,
            media,
        } = fields;
        let analysed = !analysis.is_empty();
        let (ai_caption, ai_tags) = analysis.into_parts();

        Self {
            id: trail_id.unwrap_or_else(|| TrailId::generate(now)),
            title,
            description,
            location,
            image_path,
            media,
            created_at: now,
            updated_at: now,
            ai_caption,
            ai_tags,
            ai_analyzed_at: analysed.then_some(now),
        }
    }

    /// Merge a validated patch, refreshing `updatedAt`.
    #[must_use]
    pub fn apply_patch(self, patch: ValidatedTrailPatch, now: DateTime<Utc>) -> Self {
        let ValidatedTrailPatch {
            title,
            description,
            location,
            image_path,
            media,
        } = patch;

        Self {
            title: title.unwrap_or(self.title),
            description: description.unwrap_or(self.description),
            location: location.unwrap_or(self.location),
            image_path: image_path.unwrap_or(self.image_path),
            media: media.unwrap_or(self.media),
            updated_at: now,
            ..self
        }
    }

    /// Rebuild a trail from stored fields.
    ///
    /// Only the identifier is re-validated; length bounds may have changed
    /// since the record was written.
    pub fn restore(snapshot: TrailSnapshot) -> Result<Self, TrailValidationError> {
        let TrailSnapshot {
            id,
            title,
            description,
            location,
            image_path,
            media,
            created_at,
            updated_at,
            ai_caption,
            ai_tags,
            ai_analyzed_at,
        } = snapshot;

        Ok(Self {
            id: TrailId::new(id)?,
            title,
            description,
            location,
            image_path,
            media,
            created_at,
            updated_at,
            ai_caption,
            ai_tags,
            ai_analyzed_at,
        })
    }

    /// Trail identifier.
    #[must_use]
    pub fn id(&self) -> &TrailId {
        &self.id
    }

    /// Trimmed title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Trimmed description, empty when absent.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Trimmed location, empty when absent.
    #[must_use]
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Object key of the cover image inside the media container.
    #[must_use]
    pub fn image_path(&self) -> Option<&str> {
        self.image_path.as_deref()
    }

    /// Auxiliary attachment references.
    #[must_use]
    pub fn media(&self) -> &[String] {
        &self.media
    }

    /// Creation instant.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Last mutation instant.
    #[must_use]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Caption produced by image analysis at creation.
    #[must_use]
    pub fn ai_caption(&self) -> Option<&str> {
        self.ai_caption.as_deref()
    }

    /// Tags produced by image analysis at creation.
    #[must_use]
    pub fn ai_tags(&self) -> &[String] {
        &self.ai_tags
    }

    /// When image analysis produced a result.
    #[must_use]
    pub fn ai_analyzed_at(&self) -> Option<DateTime<Utc>> {
        self.ai_analyzed_at
    }
}
