//! Domain primitives, services and ports.
//!
//! Purpose: keep trail validation, signed URL policy and moderation
//! decisions free of I/O so they can be tested directly. Adapters live in
//! `inbound` and `outbound` and only meet the domain through [`ports`].
//!
//! Public surface:
//! - Error / ErrorCode: API error payload and stable identifier.
//! - Trail and its draft/patch inputs: the only persisted aggregate.
//! - BlobName, SasPolicy: object keys and signed URL windows.
//! - ImageAnalysis, ModerationPolicy: image insight results.
//! - TrailService, MediaService, ImageInsightService: driving port
//!   implementations.

pub mod error;
pub mod media;
pub mod moderation;
pub mod ports;
pub mod trail;
pub mod vision;

mod image_insight_service;
mod media_service;
mod trace_id;
mod trail_service;

pub use self::error::{Error, ErrorCode};
pub use self::image_insight_service::ImageInsightService;
pub use self::media::{
    BlobName, MediaValidationError, SasPermissions, SasPolicy, SignedUrl, SignedUrlRequest,
};
pub use self::media_service::MediaService;
pub use self::moderation::{CategorySeverity, ModerationPolicy, ModerationVerdict};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::trail::{
    Trail, TrailDraft, TrailId, TrailLimits, TrailPatch, TrailSnapshot, TrailValidationError,
    ValidatedTrail, ValidatedTrailPatch,
};
pub use self::trail_service::TrailService;
pub use self::vision::{AnalysisOutcome, AnalysisSkipped, ImageAnalysis};
