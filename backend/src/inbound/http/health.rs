//! Health endpoints: liveness, readiness and store checks for orchestration
//! and load balancers.

use std::sync::atomic::{AtomicBool, Ordering};

use actix_web::{HttpResponse, get, http::header, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;

/// Shared health state for readiness and liveness checks.
pub struct HealthState {
    ready: AtomicBool,
    live: AtomicBool,
    store: &'static str,
}

impl Default for HealthState {
    fn default() -> Self {
        Self::new("memory")
    }
}

impl HealthState {
    /// Create a health state that starts live but not ready.
    ///
    /// `store` names the trail store reported by `/health/store`.
    pub fn new(store: &'static str) -> Self {
        Self {
            ready: AtomicBool::new(false),
            live: AtomicBool::new(true),
            store,
        }
    }

    /// Mark the service as ready.
    pub fn mark_ready(&self) {
        self.ready.store(true, Ordering::Release);
    }

    /// Flag the service as unhealthy so liveness checks fail fast during shutdown.
    pub fn mark_unhealthy(&self) {
        self.live.store(false, Ordering::Release);
    }

    /// Return readiness state.
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// Return liveness state. When false, liveness checks emit 503.
    pub fn is_alive(&self) -> bool {
        self.live.load(Ordering::Acquire)
    }

    /// Name of the configured trail store.
    pub fn store(&self) -> &'static str {
        self.store
    }

    fn status_response(healthy: bool) -> HttpResponse {
        let mut response = if healthy {
            HttpResponse::Ok()
        } else {
            HttpResponse::ServiceUnavailable()
        };

        response
            .insert_header((header::CACHE_CONTROL, "no-store"))
            .finish()
    }
}

/// Store check payload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
pub struct StoreHealthBody {
    pub ok: bool,
    #[schema(example = "postgres")]
    pub store: String,
}

/// Readiness check. 200 once the server can handle traffic, 503 otherwise.
#[utoipa::path(
    get,
    path = "/health/ready",
    tags = ["health"],
    responses(
        (status = 200, description = "Server is ready to handle traffic"),
        (status = 503, description = "Server is not ready")
    )
)]
#[get("/health/ready")]
pub async fn ready(state: web::Data<HealthState>) -> HttpResponse {
    HealthState::status_response(state.is_ready())
}

/// Liveness check. 200 while the process is marked alive, 503 once draining.
#[utoipa::path(
    get,
    path = "/health/live",
    tags = ["health"],
    responses(
        (status = 200, description = "Server is alive"),
        (status = 503, description = "Server is shutting down")
    )
)]
#[get("/health/live")]
pub async fn live(state: web::Data<HealthState>) -> HttpResponse {
    HealthState::status_response(state.is_alive())
}

/// Store check. Round-trips a trivial query against the trail store.
#[utoipa::path(
    get,
    path = "/health/store",
    tags = ["health"],
    responses(
        (status = 200, description = "Trail store answered", body = StoreHealthBody),
        (status = 503, description = "Trail store unavailable", body = ErrorSchema)
    )
)]
#[get("/health/store")]
pub async fn store_check(
    health: web::Data<HealthState>,
    state: web::Data<HttpState>,
) -> ApiResult<HttpResponse> {
    state.trails_query.ping_store().await?;
    Ok(HttpResponse::Ok()
        .insert_header((header::CACHE_CONTROL, "no-store"))
        .json(StoreHealthBody {
            ok: true,
            store: health.store().to_owned(),
        }))
}
