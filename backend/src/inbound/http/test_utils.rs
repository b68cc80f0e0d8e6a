//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use url::Url;
use zeroize::Zeroizing;

use crate::domain::ports::{
    BlobUrlSigner, ContentModerator, DisabledBlobUrlSigner, DisabledContentModerator,
    DisabledImageAnalyzer, ImageAnalyzer,
};
use crate::domain::{
    ImageInsightService, MediaService, ModerationPolicy, SasPolicy, TrailService,
};
use crate::inbound::http::state::{HttpState, HttpStatePorts};
use crate::outbound::blob::{AzureBlobSasSigner, BlobStorageConfig};
use crate::outbound::memory::InMemoryTrailRepository;
use crate::test_support::{MutableClock, TEST_ACCOUNT_KEY};

/// Instant every test clock starts at: 2024-05-01T12:00:00Z.
pub fn test_instant() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0)
        .single()
        .expect("valid instant")
}

/// Signer for the `trailshare` account using the shared test key.
pub fn test_signer() -> Arc<dyn BlobUrlSigner> {
    let signer = AzureBlobSasSigner::new(BlobStorageConfig {
        account_name: "trailshare".to_owned(),
        account_key: Zeroizing::new(TEST_ACCOUNT_KEY.to_owned()),
        container: "media".to_owned(),
        endpoint: Some(Url::parse("https://trailshare.blob.core.windows.net").expect("url")),
    })
    .expect("test key decodes");
    Arc::new(signer)
}

/// Adapters wired into [`in_memory_state`].
pub struct TestAdapters {
    pub clock: Arc<MutableClock>,
    pub signer: Arc<dyn BlobUrlSigner>,
    pub analyzer: Arc<dyn ImageAnalyzer>,
    pub moderator: Arc<dyn ContentModerator>,
}

impl Default for TestAdapters {
    fn default() -> Self {
        Self {
            clock: Arc::new(MutableClock::new(test_instant())),
            signer: Arc::new(DisabledBlobUrlSigner),
            analyzer: Arc::new(DisabledImageAnalyzer),
            moderator: Arc::new(DisabledContentModerator),
        }
    }
}

/// HTTP state backed by real services over an in-memory store.
pub fn in_memory_state(adapters: TestAdapters) -> HttpState {
    let TestAdapters {
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
    HttpState::new(HttpStatePorts {
        trails: trails.clone(),
        trails_query: trails,
        media: Arc::new(MediaService::new(signer, clock, SasPolicy::default())),
        insights: Arc::new(ImageInsightService::new(
            analyzer,
            moderator,
            ModerationPolicy::default(),
        )),
    })
}
