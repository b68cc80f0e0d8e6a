//! DTOs for the content-safety `image:analyze` operation.

use serde::{Deserialize, Serialize};

use crate::domain::CategorySeverity;

#[derive(Debug, Serialize)]
pub(super) struct AnalyzeImageRequestDto<'a> {
    pub(super) image: ImageSourceDto<'a>,
}

#[derive(Debug, Serialize)]
pub(super) struct ImageSourceDto<'a> {
    pub(super) url: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct AnalyzeImageResponseDto {
    /// Older API versions name this field `categoryAnalysis`.
    #[serde(default, alias = "categoryAnalysis")]
    pub(super) categories_analysis: Vec<CategoryAnalysisDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct CategoryAnalysisDto {
    pub(super) category: String,
    #[serde(default)]
    pub(super) severity: Option<i64>,
}

impl AnalyzeImageResponseDto {
    /// Category scores in response order; missing severities count as zero.
    pub(super) fn into_domain(self) -> Vec<CategorySeverity> {
        self.categories_analysis
            .into_iter()
            .map(|entry| {
                let severity = entry
                    .severity
                    .unwrap_or(0)
                    .clamp(0, i64::from(u8::MAX));
                CategorySeverity::new(entry.category, u8::try_from(severity).unwrap_or(u8::MAX))
            })
            .collect()
    }
}
