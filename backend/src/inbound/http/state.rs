//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{ImageInsights, MediaCommand, TrailCommand, TrailQuery};

/// Parameter object bundling all port implementations for HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub trails: Arc<dyn TrailCommand>,
    pub trails_query: Arc<dyn TrailQuery>,
    pub media: Arc<dyn MediaCommand>,
    pub insights: Arc<dyn ImageInsights>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub trails: Arc<dyn TrailCommand>,
    pub trails_query: Arc<dyn TrailQuery>,
    pub media: Arc<dyn MediaCommand>,
    pub insights: Arc<dyn ImageInsights>,
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports)
    }
}

impl HttpState {
    /// Construct state from a ports bundle.
    ///
    /// # Examples
    /// ```no_run
    /// use std::sync::Arc;
    ///
    /// use mockable::DefaultClock;
    /// use trailshare::domain::ports::{
    ///     DisabledBlobUrlSigner, DisabledContentModerator, DisabledImageAnalyzer,
    /// };
    /// use trailshare::domain::{
    ///     ImageInsightService, MediaService, ModerationPolicy, SasPolicy, TrailService,
    /// };
    /// use trailshare::inbound::http::state::{HttpState, HttpStatePorts};
    /// use trailshare::outbound::memory::InMemoryTrailRepository;
    ///
    /// let trails = Arc::new(TrailService::new(
    ///     Arc::new(InMemoryTrailRepository::new()),
    ///     Arc::new(DisabledImageAnalyzer),
    ///     Arc::new(DisabledBlobUrlSigner),
    ///     Arc::new(DefaultClock),
    /// ));
    /// let state = HttpState::new(HttpStatePorts {
    ///     trails: trails.clone(),
    ///     trails_query: trails,
    ///     media: Arc::new(MediaService::new(
    ///         Arc::new(DisabledBlobUrlSigner),
    ///         Arc::new(DefaultClock),
    ///         SasPolicy::default(),
    ///     )),
    ///     insights: Arc::new(ImageInsightService::new(
    ///         Arc::new(DisabledImageAnalyzer),
    ///         Arc::new(DisabledContentModerator),
    ///         ModerationPolicy::default(),
    ///     )),
    /// });
    /// let _media = state.media.clone();
    /// ```
    pub fn new(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            trails,
            trails_query,
            media,
            insights,
        } = ports;
        Self {
            trails,
            trails_query,
            media,
            insights,
        }
    }
}
