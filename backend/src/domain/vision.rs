//! Image understanding results.
//!
//! Analysis during trail creation is advisory: a missing or failed analysis
//! is represented by [`AnalysisSkipped`], a normal terminal value that
//! degrades to an empty [`ImageAnalysis`].

use std::fmt;

/// Maximum number of tags kept from an analysis.
pub const MAX_TAGS: usize = 6;

/// Caption and tags extracted from an image.
///
/// # Examples
/// ```
/// use trailshare::domain::ImageAnalysis;
///
/// let tags = ["tree", " ", "outdoor", "sky", "grass", "hill", "path", "cloud"];
/// let analysis = ImageAnalysis::new(Some("a path".to_owned()), tags.map(str::to_owned));
/// assert_eq!(analysis.tags().len(), 6);
/// assert_eq!(analysis.tags().first().map(String::as_str), Some("tree"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageAnalysis {
    caption: Option<String>,
    tags: Vec<String>,
}

impl ImageAnalysis {
    /// Build an analysis, dropping blank values and keeping at most
    /// [`MAX_TAGS`] tags in their original order.
    pub fn new(caption: Option<String>, tags: impl IntoIterator<Item = String>) -> Self {
        let caption = caption
            .map(|text| text.trim().to_owned())
            .filter(|text| !text.is_empty());
        let tags = tags
            .into_iter()
            .map(|tag| tag.trim().to_owned())
            .filter(|tag| !tag.is_empty())
            .take(MAX_TAGS)
            .collect();
        Self { caption, tags }
    }

    /// Caption text, if the service produced one.
    #[must_use]
    pub fn caption(&self) -> Option<&str> {
        self.caption.as_deref()
    }

    /// Tag names.
    #[must_use]
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// True when there is neither a caption nor a tag.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.caption.is_none() && self.tags.is_empty()
    }

    /// Split into caption and tags.
    #[must_use]
    pub fn into_parts(self) -> (Option<String>, Vec<String>) {
        (self.caption, self.tags)
    }
}

/// Reason an advisory analysis produced no result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisSkipped {
    /// The trail has no image.
    NoImage,
    /// No analysis service is configured.
    AnalyzerDisabled,
    /// A readable URL for the image could not be produced.
    ImageUrlUnavailable { reason: String },
    /// The analysis service failed.
    UpstreamFailed { reason: String },
}

impl fmt::Display for AnalysisSkipped {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoImage => f.write_str("no image to analyse"),
            Self::AnalyzerDisabled => f.write_str("image analysis is not configured"),
            Self::ImageUrlUnavailable { reason } => {
                write!(f, "image url unavailable: {reason}")
            }
            Self::UpstreamFailed { reason } => write!(f, "image analysis failed: {reason}"),
        }
    }
}

/// Outcome of an advisory analysis.
pub type AnalysisOutcome = Result<ImageAnalysis, AnalysisSkipped>;

/// Collapse an outcome into the analysis to store, empty when skipped.
#[must_use]
pub fn settle(outcome: AnalysisOutcome) -> ImageAnalysis {
    outcome.unwrap_or_default()
}
