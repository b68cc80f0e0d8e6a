//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] collects every route annotated with `utoipa::path` plus the
//! schema wrappers from [`crate::inbound::http::schemas`]. Swagger UI serves
//! it in debug builds and `cargo run --bin openapi-dump` prints it.

use utoipa::OpenApi;

use crate::inbound::http::health::StoreHealthBody;
use crate::inbound::http::insights::{
    AnalysisResponseBody, FailingCategoryBody, ImageRefBody, ImageRequestBody,
    ModerationResponseBody,
};
use crate::inbound::http::media::{UploadUrlRequestBody, UploadUrlResponseBody};
use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};
use crate::inbound::http::trails::{
    CreateTrailRequestBody, TrailBody, TrailListItemBody, UpdateTrailRequestBody,
};

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "TrailShare backend API",
        description = "Trail records, direct-to-storage image uploads and image insights."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::trails::create_trail,
        crate::inbound::http::trails::list_trails,
        crate::inbound::http::trails::get_trail,
        crate::inbound::http::trails::update_trail,
        crate::inbound::http::trails::delete_trail,
        crate::inbound::http::media::issue_upload_url,
        crate::inbound::http::insights::analyze_image,
        crate::inbound::http::insights::moderate_image,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
        crate::inbound::http::health::store_check,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        CreateTrailRequestBody,
        UpdateTrailRequestBody,
        TrailBody,
        TrailListItemBody,
        UploadUrlRequestBody,
        UploadUrlResponseBody,
        ImageRequestBody,
        ImageRefBody,
        AnalysisResponseBody,
        ModerationResponseBody,
        FailingCategoryBody,
        StoreHealthBody,
    )),
    tags(
        (name = "trails", description = "Trail records"),
        (name = "media", description = "Signed upload URLs"),
        (name = "insights", description = "Image analysis and moderation"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
