//! Domain ports for the hexagonal boundary.
//!
//! Driven ports (`TrailRepository`, `BlobUrlSigner`, `ImageAnalyzer`,
//! `ContentModerator`) are implemented by outbound adapters. Driving ports
//! (`TrailCommand`, `TrailQuery`, `MediaCommand`, `ImageInsights`) are
//! implemented by domain services and consumed by inbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod blob_url_signer;
mod content_moderator;
mod image_analyzer;
mod image_insights;
mod media_command;
mod trail_command;
mod trail_repository;

#[cfg(test)]
pub use blob_url_signer::MockBlobUrlSigner;
pub use blob_url_signer::{
    BlobUrlSigner, BlobUrlSignerError, DisabledBlobUrlSigner, RejectingBlobUrlSigner,
};
#[cfg(test)]
pub use content_moderator::MockContentModerator;
pub use content_moderator::{ContentModerator, ContentModeratorError, DisabledContentModerator};
#[cfg(test)]
pub use image_analyzer::MockImageAnalyzer;
pub use image_analyzer::{DisabledImageAnalyzer, ImageAnalyzer, ImageAnalyzerError};
#[cfg(test)]
pub use image_insights::MockImageInsights;
pub use image_insights::{
    CategorySeverityPayload, ImageAnalysisPayload, ImageInsights, ModerationPayload,
};
#[cfg(test)]
pub use media_command::MockMediaCommand;
pub use media_command::{MediaCommand, UploadUrlPayload, UploadUrlRequest};
#[cfg(test)]
pub use trail_command::{MockTrailCommand, MockTrailQuery};
pub use trail_command::{
    CreateTrailRequest, ListTrailsRequest, TrailCommand, TrailListItemPayload, TrailPayload,
    TrailQuery, UpdateTrailRequest,
};
#[cfg(test)]
pub use trail_repository::MockTrailRepository;
pub use trail_repository::{TrailRepository, TrailRepositoryError};
