//! Trail HTTP handlers.
//!
//! ```text
//! POST   /api/trails
//! GET    /api/trails
//! GET    /api/trails/{id}
//! PUT    /api/trails/{id}
//! DELETE /api/trails/{id}
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::{
    CreateTrailRequest, ListTrailsRequest, TrailListItemPayload, TrailPayload,
    UpdateTrailRequest,
};
use crate::domain::{TrailDraft, TrailPatch};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_bool_flag};

/// Request payload for creating a trail.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateTrailRequestBody {
    /// Optional caller-chosen identifier; generated when absent.
    #[schema(example = "coastal-loop")]
    pub trail_id: Option<String>,
    #[schema(example = "Coastal loop")]
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    /// Object key returned by `/api/upload-url`; never a URL.
    #[schema(example = "1714564800000_coast.jpg")]
    pub image_path: Option<String>,
    pub media: Option<Vec<String>>,
}

impl From<CreateTrailRequestBody> for TrailDraft {
    fn from(body: CreateTrailRequestBody) -> Self {
        Self {
            trail_id: body.trail_id,
            title: body.title.unwrap_or_default(),
            description: body.description,
            location: body.location,
            image_path: body.image_path,
            media: body.media.unwrap_or_default(),
        }
    }
}

/// Partial update payload. Absent or `null` fields are left unchanged.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdateTrailRequestBody {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    /// An empty string clears the stored image reference.
    pub image_path: Option<String>,
    pub media: Option<Vec<String>>,
}

impl From<UpdateTrailRequestBody> for TrailPatch {
    fn from(body: UpdateTrailRequestBody) -> Self {
        Self {
            title: body.title,
            description: body.description,
            location: body.location,
            image_path: body.image_path,
            media: body.media,
        }
    }
}

/// Trail document as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TrailBody {
    pub id: String,
    pub trail_id: String,
    pub title: String,
    pub description: String,
    pub location: String,
    pub image_path: Option<String>,
    pub media: Vec<String>,
    #[schema(format = "date-time")]
    pub created_at: String,
    #[schema(format = "date-time")]
    pub updated_at: String,
    pub ai_caption: Option<String>,
    pub ai_tags: Vec<String>,
    #[schema(format = "date-time")]
    pub ai_analyzed_at: Option<String>,
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

impl From<TrailPayload> for TrailBody {
    fn from(value: TrailPayload) -> Self {
        Self {
            id: value.id,
            trail_id: value.trail_id,
            title: value.title,
            description: value.description,
            location: value.location,
            image_path: value.image_path,
            media: value.media,
            created_at: timestamp(value.created_at),
            updated_at: timestamp(value.updated_at),
            ai_caption: value.ai_caption,
            ai_tags: value.ai_tags,
            ai_analyzed_at: value.ai_analyzed_at.map(timestamp),
        }
    }
}

/// Trail document with a read-only signed URL for its image.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TrailListItemBody {
    #[serde(flatten)]
    pub trail: TrailBody,
    /// `null` when the trail has no image or signing is unavailable.
    pub image_url: Option<String>,
}

impl From<TrailListItemPayload> for TrailListItemBody {
    fn from(value: TrailListItemPayload) -> Self {
        Self {
            trail: TrailBody::from(value.trail),
            image_url: value.image_url,
        }
    }
}

/// Query parameters for listing trails.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListTrailsQuery {
    /// Attach `imageUrl` to each trail (default `true`).
    #[param(example = "false")]
    pub sign_images: Option<String>,
}

/// Create a trail.
#[utoipa::path(
    post,
    path = "/api/trails",
    request_body = CreateTrailRequestBody,
    responses(
        (status = 201, description = "Trail created", body = TrailBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 409, description = "Trail identifier already exists", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["trails"],
    operation_id = "createTrail"
)]
#[post("/trails")]
pub async fn create_trail(
    state: web::Data<HttpState>,
    payload: web::Json<CreateTrailRequestBody>,
) -> ApiResult<HttpResponse> {
    let created = state
        .trails
        .create(CreateTrailRequest {
            draft: payload.into_inner().into(),
        })
        .await?;
    Ok(HttpResponse::Created().json(TrailBody::from(created)))
}

/// List every trail, newest first.
#[utoipa::path(
    get,
    path = "/api/trails",
    params(ListTrailsQuery),
    responses(
        (status = 200, description = "Trails, newest first", body = [TrailListItemBody]),
        (status = 400, description = "Invalid query", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["trails"],
    operation_id = "listTrails"
)]
#[get("/trails")]
pub async fn list_trails(
    state: web::Data<HttpState>,
    query: web::Query<ListTrailsQuery>,
) -> ApiResult<web::Json<Vec<TrailListItemBody>>> {
    let sign_images = parse_bool_flag(
        query.sign_images.as_deref(),
        FieldName::new("signImages"),
        ListTrailsRequest::default().sign_images,
    )?;
    let items = state
        .trails_query
        .list(ListTrailsRequest { sign_images })
        .await?;
    Ok(web::Json(
        items.into_iter().map(TrailListItemBody::from).collect(),
    ))
}

/// Fetch one trail.
#[utoipa::path(
    get,
    path = "/api/trails/{id}",
    params(("id" = String, Path, description = "Trail identifier")),
    responses(
        (status = 200, description = "Trail", body = TrailBody),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["trails"],
    operation_id = "getTrail"
)]
#[get("/trails/{id}")]
pub async fn get_trail(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<TrailBody>> {
    let trail = state.trails_query.get(path.as_str()).await?;
    Ok(web::Json(TrailBody::from(trail)))
}

/// Merge fields into a trail.
#[utoipa::path(
    put,
    path = "/api/trails/{id}",
    params(("id" = String, Path, description = "Trail identifier")),
    request_body = UpdateTrailRequestBody,
    responses(
        (status = 200, description = "Updated trail", body = TrailBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["trails"],
    operation_id = "updateTrail"
)]
#[put("/trails/{id}")]
pub async fn update_trail(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<UpdateTrailRequestBody>,
) -> ApiResult<web::Json<TrailBody>> {
    let updated = state
        .trails
        .update(UpdateTrailRequest {
            trail_id: path.into_inner(),
            patch: payload.into_inner().into(),
        })
        .await?;
    Ok(web::Json(TrailBody::from(updated)))
}

/// Delete a trail.
#[utoipa::path(
    delete,
    path = "/api/trails/{id}",
    params(("id" = String, Path, description = "Trail identifier")),
    responses(
        (status = 204, description = "Trail deleted"),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["trails"],
    operation_id = "deleteTrail"
)]
#[delete("/trails/{id}")]
pub async fn delete_trail(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    state.trails.delete(path.as_str()).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
#[path = "trails_tests.rs"]
mod tests;
