//! Upload URL issuance handler.
//!
//! ```text
//! POST /api/upload-url {"fileName":"coast.jpg","contentType":"image/jpeg"}
//! ```

use actix_web::{post, web};
use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::{UploadUrlPayload, UploadUrlRequest};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, first_present, missing_field_error};

/// Request payload for a signed upload URL.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct UploadUrlRequestBody {
    #[schema(example = "coast.jpg")]
    pub file_name: Option<String>,
    /// Content type the client will upload; `application/octet-stream` when absent.
    #[schema(example = "image/jpeg")]
    pub content_type: Option<String>,
}

/// Signed upload URL and the object key to store on the trail.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadUrlResponseBody {
    /// Write-scoped URL to `PUT` the image to.
    pub upload_url: String,
    /// Object key to send as the trail's `imagePath`.
    #[schema(example = "1714564800000_coast.jpg")]
    pub image_path: String,
    /// Unsigned object URL.
    pub blob_url: String,
    #[schema(example = "2024-05-01T12:10:00.000Z")]
    pub expires_at: String,
}

impl From<UploadUrlPayload> for UploadUrlResponseBody {
    fn from(value: UploadUrlPayload) -> Self {
        Self {
            upload_url: value.upload_url,
            image_path: value.image_path,
            blob_url: value.blob_url,
            expires_at: value.expires_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

/// Issue a short-lived URL for uploading one image.
#[utoipa::path(
    post,
    path = "/api/upload-url",
    request_body = UploadUrlRequestBody,
    responses(
        (status = 200, description = "Upload URL issued", body = UploadUrlResponseBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 500, description = "Blob storage misconfigured", body = ErrorSchema)
    ),
    tags = ["media"],
    operation_id = "issueUploadUrl"
)]
#[post("/upload-url")]
pub async fn issue_upload_url(
    state: web::Data<HttpState>,
    payload: web::Json<UploadUrlRequestBody>,
) -> ApiResult<web::Json<UploadUrlResponseBody>> {
    let UploadUrlRequestBody {
        file_name,
        content_type,
    } = payload.into_inner();
    let file_name = first_present([file_name.as_deref()])
        .ok_or_else(|| missing_field_error(FieldName::new("fileName")))?
        .to_owned();
    let issued = state
        .media
        .issue_upload_url(UploadUrlRequest {
            file_name,
            content_type,
        })
        .await?;
    Ok(web::Json(UploadUrlResponseBody::from(issued)))
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::{App, test as actix_test};
    use rstest::rstest;
    use serde_json::{Value, json};

    use super::*;
    use crate::inbound::http::error::json_error_handler;
    use crate::inbound::http::test_utils::{TestAdapters, in_memory_state, test_signer};

    async fn call(adapters: TestAdapters, body: Value) -> actix_web::dev::ServiceResponse {
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(in_memory_state(adapters)))
                .app_data(web::JsonConfig::default().error_handler(json_error_handler))
                .service(web::scope("/api").service(issue_upload_url)),
        )
        .await;
        actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/upload-url")
                .set_json(body)
                .to_request(),
        )
        .await
    }

    #[actix_web::test]
    async fn issues_write_scoped_upload_url() {
        let adapters = TestAdapters {
            signer: test_signer(),
            ..TestAdapters::default()
        };

        let response = call(
            adapters,
            json!({ "fileName": "coast view.jpg", "contentType": "image/jpeg" }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["imagePath"], "1714564800000_coast_view.jpg");
        assert_eq!(
            body["blobUrl"],
            "https://trailshare.blob.core.windows.net/media/1714564800000_coast_view.jpg"
        );
        assert_eq!(body["expiresAt"], "2024-05-01T12:10:00.000Z");
        let upload_url = body["uploadUrl"].as_str().expect("upload url");
        assert!(upload_url.contains("sp=cw&"));
        assert!(upload_url.contains("&sig="));
    }

    #[rstest]
    #[case::missing(json!({}))]
    #[case::blank(json!({ "fileName": "   " }))]
    #[actix_web::test]
    async fn missing_file_name_is_rejected(#[case] body: Value) {
        let adapters = TestAdapters {
            signer: test_signer(),
            ..TestAdapters::default()
        };

        let response = call(adapters, body).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["code"], "invalid_request");
        assert_eq!(body["details"]["field"], "fileName");
        assert_eq!(body["details"]["code"], "missing");
    }

    #[actix_web::test]
    async fn unconfigured_storage_is_a_configuration_error() {
        let response = call(TestAdapters::default(), json!({ "fileName": "a.jpg" })).await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["code"], "misconfigured");
    }
}
