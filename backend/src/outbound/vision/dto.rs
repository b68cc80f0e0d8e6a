//! DTOs for decoding image analysis (v3.2 `analyze`) responses.

use serde::{Deserialize, Serialize};

use crate::domain::ImageAnalysis;

#[derive(Debug, Serialize)]
pub(super) struct AnalyzeRequestDto<'a> {
    pub(super) url: &'a str,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct AnalyzeResponseDto {
    #[serde(default)]
    pub(super) description: Option<DescriptionDto>,
    #[serde(default)]
    pub(super) tags: Vec<TagDto>,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct DescriptionDto {
    #[serde(default)]
    pub(super) captions: Vec<CaptionDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct CaptionDto {
    #[serde(default)]
    pub(super) text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct TagDto {
    #[serde(default)]
    pub(super) name: Option<String>,
}

impl AnalyzeResponseDto {
    /// First caption and the tag names in service order.
    pub(super) fn into_domain(self) -> ImageAnalysis {
        let caption = self
            .description
            .and_then(|description| description.captions.into_iter().next())
            .and_then(|caption| caption.text);
        let tags = self.tags.into_iter().filter_map(|tag| tag.name);
        ImageAnalysis::new(caption, tags)
    }
}
