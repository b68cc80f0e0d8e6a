//! Trimming and bounds checks for trail input.

use super::{
    DESCRIPTION_MAX_CHARS, LOCATION_MAX_CHARS, TITLE_MAX_CHARS, TITLE_MIN_CHARS, TrailDraft,
    TrailId, TrailLimits, TrailPatch, TrailValidationError,
};

/// Create input that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedTrail {
    pub(super) trail_id: Option<TrailId>,
    pub(super) title: String,
    pub(super) description: String,
    pub(super) location: String,
    pub(super) image_path: Option<String>,
    pub(super) media: Vec<String>,
}

impl ValidatedTrail {
    /// Caller-supplied identifier, if any.
    #[must_use]
    pub fn trail_id(&self) -> Option<&TrailId> {
        self.trail_id.as_ref()
    }

    /// Normalised image object key, if any.
    #[must_use]
    pub fn image_path(&self) -> Option<&str> {
        self.image_path.as_deref()
    }
}

/// Update input that passed validation.
///
/// `image_path` is doubly optional: `Some(None)` clears the stored key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidatedTrailPatch {
    pub(super) title: Option<String>,
    pub(super) description: Option<String>,
    pub(super) location: Option<String>,
    pub(super) image_path: Option<Option<String>>,
    pub(super) media: Option<Vec<String>>,
}

impl ValidatedTrailPatch {
    /// Wire names of the fields this patch replaces.
    #[must_use]
    pub fn changed_fields(&self) -> Vec<&'static str> {
        [
            ("title", self.title.is_some()),
            ("description", self.description.is_some()),
            ("location", self.location.is_some()),
            ("imagePath", self.image_path.is_some()),
            ("media", self.media.is_some()),
        ]
        .into_iter()
        .filter_map(|(name, present)| present.then_some(name))
        .collect()
    }
}

impl TrailDraft {
    /// Trim and bound every field.
    ///
    /// # Examples
    /// ```
    /// use trailshare::domain::{TrailDraft, TrailLimits};
    ///
    /// let draft = TrailDraft {
    ///     title: "  Coastal loop ".to_owned(),
    ///     ..TrailDraft::default()
    /// };
    /// assert!(draft.validate(&TrailLimits::default()).is_ok());
    /// ```
    pub fn validate(self, limits: &TrailLimits) -> Result<ValidatedTrail, TrailValidationError> {
        let trail_id = non_blank(self.trail_id).map(TrailId::new).transpose()?;
        Ok(ValidatedTrail {
            trail_id,
            title: normalise_title(&self.title)?,
            description: normalise_description(self.description.as_deref().unwrap_or_default())?,
            location: normalise_location(self.location.as_deref().unwrap_or_default())?,
            image_path: normalise_image_path(self.image_path.as_deref(), limits)?,
            media: normalise_media(self.media),
        })
    }
}

impl TrailPatch {
    /// Validate only the fields present in the patch.
    pub fn validate(
        self,
        limits: &TrailLimits,
    ) -> Result<ValidatedTrailPatch, TrailValidationError> {
        Ok(ValidatedTrailPatch {
            title: self.title.as_deref().map(normalise_title).transpose()?,
            description: self
                .description
                .as_deref()
                .map(normalise_description)
                .transpose()?,
            location: self
                .location
                .as_deref()
                .map(normalise_location)
                .transpose()?,
            image_path: self
                .image_path
                .as_deref()
                .map(|raw| normalise_image_path(Some(raw), limits))
                .transpose()?,
            media: self.media.map(normalise_media),
        })
    }
}

fn char_len(value: &str) -> usize {
    value.chars().count()
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_owned())
        .filter(|trimmed| !trimmed.is_empty())
}

fn normalise_title(raw: &str) -> Result<String, TrailValidationError> {
    let title = raw.trim();
    let length = char_len(title);
    if length < TITLE_MIN_CHARS {
        return Err(TrailValidationError::TitleTooShort { length });
    }
    if length > TITLE_MAX_CHARS {
        return Err(TrailValidationError::TitleTooLong { length });
    }
    Ok(title.to_owned())
}

fn normalise_description(raw: &str) -> Result<String, TrailValidationError> {
    let description = raw.trim();
    let length = char_len(description);
    if length > DESCRIPTION_MAX_CHARS {
        return Err(TrailValidationError::DescriptionTooLong { length });
    }
    Ok(description.to_owned())
}

fn normalise_location(raw: &str) -> Result<String, TrailValidationError> {
    let location = raw.trim();
    let length = char_len(location);
    if length > LOCATION_MAX_CHARS {
        return Err(TrailValidationError::LocationTooLong { length });
    }
    Ok(location.to_owned())
}

fn normalise_image_path(
    raw: Option<&str>,
    limits: &TrailLimits,
) -> Result<Option<String>, TrailValidationError> {
    let Some(path) = raw.map(str::trim).filter(|path| !path.is_empty()) else {
        return Ok(None);
    };

    let length = char_len(path);
    if length > limits.image_path_max_chars() {
        return Err(TrailValidationError::ImagePathTooLong {
            length,
            limit: limits.image_path_max_chars(),
        });
    }

    let lowered = path.to_ascii_lowercase();
    if lowered.starts_with("http://") || lowered.starts_with("https://") || path.contains('?') {
        return Err(TrailValidationError::ImagePathIsUrl);
    }
    Ok(Some(path.to_owned()))
}

fn normalise_media(media: Vec<String>) -> Vec<String> {
    media
        .into_iter()
        .filter_map(|entry| non_blank(Some(entry)))
        .collect()
}
