//! Shared wiring for HTTP integration suites.
//!
//! Builds the production services over the in-memory store and test doubles,
//! then drives requests through the same middleware stack the server uses.

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::test::{self as actix_test, TestRequest};
use actix_web::{App, web};
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;
use trailshare::Trace;
use trailshare::domain::ports::{
    BlobUrlSigner, ContentModerator, DisabledBlobUrlSigner, DisabledContentModerator,
    DisabledImageAnalyzer, ImageAnalyzer,
};
use trailshare::domain::{
    ImageInsightService, MediaService, ModerationPolicy, SasPolicy, TRACE_ID_HEADER, TrailService,
};
use trailshare::inbound::http::error::json_error_handler;
use trailshare::inbound::http::health::{HealthState, live, ready, store_check};
use trailshare::inbound::http::insights::{analyze_image, moderate_image};
use trailshare::inbound::http::media::issue_upload_url;
use trailshare::inbound::http::state::{HttpState, HttpStatePorts};
use trailshare::inbound::http::trails::{
    create_trail, delete_trail, get_trail, list_trails, update_trail,
};
use trailshare::outbound::blob::{AzureBlobSasSigner, BlobStorageConfig};
use trailshare::outbound::memory::InMemoryTrailRepository;
use trailshare::test_support::{MutableClock, TEST_ACCOUNT_KEY};
use url::Url;
use zeroize::Zeroizing;

/// 2024-05-01T12:00:00Z, i.e. epoch millisecond 1714564800000.
pub fn start_instant() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0)
        .single()
        .expect("valid instant")
}

/// Signer for the `trailshare` account and `media` container.
pub fn blob_signer() -> Arc<dyn BlobUrlSigner> {
    Arc::new(
        AzureBlobSasSigner::new(BlobStorageConfig {
            account_name: "trailshare".to_owned(),
            account_key: Zeroizing::new(TEST_ACCOUNT_KEY.to_owned()),
            container: "media".to_owned(),
            endpoint: Some(Url::parse("https://trailshare.blob.core.windows.net").expect("url")),
        })
        .expect("test key decodes"),
    )
}

/// Adapters plugged into the services under test.
pub struct Adapters {
    pub clock: Arc<MutableClock>,
    pub signer: Arc<dyn BlobUrlSigner>,
    pub analyzer: Arc<dyn ImageAnalyzer>,
    pub moderator: Arc<dyn ContentModerator>,
}

impl Default for Adapters {
    fn default() -> Self {
        Self {
            clock: Arc::new(MutableClock::new(start_instant())),
            signer: Arc::new(DisabledBlobUrlSigner),
            analyzer: Arc::new(DisabledImageAnalyzer),
            moderator: Arc::new(DisabledContentModerator),
        }
    }
}

/// Application state shared across requests.
#[derive(Clone)]
pub struct TestServer {
    http: web::Data<HttpState>,
    health: web::Data<HealthState>,
}

impl TestServer {
    pub fn new(adapters: Adapters) -> Self {
        let Adapters {
            clock,
            signer,
            analyzer,
            moderator,
        } = adapters;
        let trails = Arc::new(TrailService::new(
            Arc::new(InMemoryTrailRepository::new()),
            analyzer.clone(),
            signer.clone(),
            clock.clone(),
        ));
        let http = HttpState::new(HttpStatePorts {
            trails: trails.clone(),
            trails_query: trails,
            media: Arc::new(MediaService::new(signer, clock, SasPolicy::default())),
            insights: Arc::new(ImageInsightService::new(
                analyzer,
                moderator,
                ModerationPolicy::default(),
            )),
        });
        let health = HealthState::new("memory");
        health.mark_ready();
        Self {
            http: web::Data::new(http),
            health: web::Data::new(health),
        }
    }

    /// Send one request through a freshly initialised app.
    pub async fn send(&self, request: TestRequest) -> Reply {
        let app = actix_test::init_service(
            App::new()
                .app_data(self.http.clone())
                .app_data(self.health.clone())
                .app_data(web::JsonConfig::default().error_handler(json_error_handler))
                .wrap(Trace)
                .service(
                    web::scope("/api")
                        .service(create_trail)
                        .service(list_trails)
                        .service(get_trail)
                        .service(update_trail)
                        .service(delete_trail)
                        .service(issue_upload_url)
                        .service(analyze_image)
                        .service(moderate_image),
                )
                .service(ready)
                .service(live)
                .service(store_check),
        )
        .await;
        let response = actix_test::call_service(&app, request.to_request()).await;
        let status = response.status();
        let trace_id = response
            .headers()
            .get(TRACE_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        let bytes = actix_test::read_body(response).await;
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("json body")
        };
        Reply {
            status,
            trace_id,
            body,
        }
    }
}

/// Status, trace header and decoded body of one response.
#[derive(Debug, Clone)]
pub struct Reply {
    pub status: StatusCode,
    pub trace_id: Option<String>,
    pub body: Value,
}
