//! Builders turning validated settings into driving ports.
//!
//! Each optional integration falls back to its disabled adapter when its
//! credentials are absent, and blob signing also falls back when the account
//! key cannot be decoded. The routes that need them answer `misconfigured`
//! instead of the process refusing to start.

use std::sync::Arc;

use mockable::{Clock, DefaultClock};
use tracing::{info, warn};
use trailshare::domain::ports::{
    BlobUrlSigner, ContentModerator, DisabledBlobUrlSigner, DisabledContentModerator,
    DisabledImageAnalyzer, ImageAnalyzer, RejectingBlobUrlSigner, TrailRepository,
};
use trailshare::domain::{ImageInsightService, MediaService, TrailService};
use trailshare::inbound::http::state::{HttpState, HttpStatePorts};
use trailshare::outbound::AdapterBuildError;
use trailshare::outbound::blob::AzureBlobSasSigner;
use trailshare::outbound::content_safety::AzureContentSafetyModerator;
use trailshare::outbound::memory::InMemoryTrailRepository;
use trailshare::outbound::persistence::DieselTrailRepository;
use trailshare::outbound::vision::AzureVisionAnalyzer;
use trailshare::settings::SettingsError;

use super::ServerConfig;

/// Errors raised while wiring adapters at startup.
#[derive(Debug, thiserror::Error)]
pub enum StateBuildError {
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error("{service} client could not be built: {source}")]
    Adapter {
        service: &'static str,
        #[source]
        source: AdapterBuildError,
    },
}

fn build_trail_repository(config: &ServerConfig) -> Arc<dyn TrailRepository> {
    match &config.db_pool {
        Some(pool) => Arc::new(DieselTrailRepository::new(pool.clone())),
        None => {
            warn!("DATABASE_URL not set; trails are kept in memory and lost on restart");
            Arc::new(InMemoryTrailRepository::new())
        }
    }
}

fn build_signer(config: &ServerConfig) -> Arc<dyn BlobUrlSigner> {
    match &config.settings.blob {
        Some(blob) => match AzureBlobSasSigner::new(blob.clone()) {
            Ok(signer) => Arc::new(signer),
            Err(err) => {
                warn!(error = %err, "blob account key unusable; upload and image URLs will fail");
                Arc::new(RejectingBlobUrlSigner::new(err))
            }
        },
        None => {
            warn!("blob storage not configured; upload and image URLs are disabled");
            Arc::new(DisabledBlobUrlSigner)
        }
    }
}

fn build_analyzer(config: &ServerConfig) -> Result<Arc<dyn ImageAnalyzer>, StateBuildError> {
    let timeout = config.settings.tuning.outbound_timeout()?;
    match &config.settings.vision {
        Some(vision) => {
            let analyzer = AzureVisionAnalyzer::new(&vision.endpoint, vision.key.clone(), timeout)
                .map_err(|source| StateBuildError::Adapter {
                    service: "vision",
                    source,
                })?;
            info!(endpoint = %vision.endpoint, "image analysis enabled");
            Ok(Arc::new(analyzer))
        }
        None => {
            warn!("vision not configured; image analysis is disabled");
            Ok(Arc::new(DisabledImageAnalyzer))
        }
    }
}

fn build_moderator(config: &ServerConfig) -> Result<Arc<dyn ContentModerator>, StateBuildError> {
    let timeout = config.settings.tuning.outbound_timeout()?;
    match &config.settings.content_safety {
        Some(safety) => {
            let moderator =
                AzureContentSafetyModerator::new(&safety.endpoint, safety.key.clone(), timeout)
                    .map_err(|source| StateBuildError::Adapter {
                        service: "content safety",
                        source,
                    })?;
            info!(endpoint = %safety.endpoint, "content moderation enabled");
            Ok(Arc::new(moderator))
        }
        None => {
            warn!("content safety not configured; moderation is disabled");
            Ok(Arc::new(DisabledContentModerator))
        }
    }
}

/// Wire services over the configured adapters.
pub(super) fn build_http_state(config: &ServerConfig) -> Result<HttpState, StateBuildError> {
    let tuning = &config.settings.tuning;
    let sas_policy = tuning.sas_policy()?;
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let signer = build_signer(config);
    let analyzer = build_analyzer(config)?;
    let moderator = build_moderator(config)?;

    let trails = Arc::new(
        TrailService::new(
            build_trail_repository(config),
            analyzer.clone(),
            signer.clone(),
            clock.clone(),
        )
        .with_limits(tuning.trail_limits()?)
        .with_sas_policy(sas_policy),
    );

    Ok(HttpState::new(HttpStatePorts {
        trails: trails.clone(),
        trails_query: trails,
        media: Arc::new(MediaService::new(signer, clock, sas_policy)),
        insights: Arc::new(ImageInsightService::new(
            analyzer,
            moderator,
            tuning.moderation_policy()?,
        )),
    }))
}

#[cfg(test)]
mod tests {
    //! Unit tests for adapter selection.

    use std::collections::HashMap;

    use mockable::MockEnv;
    use rstest::rstest;
    use trailshare::domain::ErrorCode;
    use trailshare::domain::ports::{ImageInsights, MediaCommand, UploadUrlRequest};
    use trailshare::settings::{AppSettings, TuningSettings};

    use super::*;

    fn settings(vars: &[(&str, &str)]) -> AppSettings {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(name, value)| ((*name).to_owned(), (*value).to_owned()))
            .collect();
        let mut env = MockEnv::new();
        env.expect_string()
            .returning(move |key| vars.get(key).cloned());
        AppSettings::from_env(&env).expect("valid settings")
    }

    #[rstest]
    #[tokio::test]
    async fn missing_credentials_select_disabled_adapters() {
        let state = build_http_state(&ServerConfig::new(settings(&[]))).expect("state builds");

        let upload = state
            .media
            .issue_upload_url(UploadUrlRequest {
                file_name: "a.jpg".to_owned(),
                content_type: None,
            })
            .await
            .expect_err("signing disabled");
        let analysis = state
            .insights
            .analyze_image("https://example.com/a.jpg")
            .await
            .expect_err("analysis disabled");

        assert_eq!(upload.code(), ErrorCode::Misconfigured);
        assert_eq!(analysis.code(), ErrorCode::Misconfigured);
        state.trails_query.ping_store().await.expect("memory store answers");
    }

    #[rstest]
    #[tokio::test]
    async fn blob_credentials_enable_upload_urls() {
        let config = ServerConfig::new(settings(&[
            ("BLOB_ACCOUNT_NAME", "trailshare"),
            ("BLOB_ACCOUNT_KEY", "dHJhaWxzaGFyZS10ZXN0LWFjY291bnQta2V5"),
        ]));
        let state = build_http_state(&config).expect("state builds");

        let issued = state
            .media
            .issue_upload_url(UploadUrlRequest {
                file_name: "a.jpg".to_owned(),
                content_type: Some("image/jpeg".to_owned()),
            })
            .await
            .expect("upload url issued");

        assert!(
            issued
                .blob_url
                .starts_with("https://trailshare.blob.core.windows.net/media/")
        );
    }

    #[rstest]
    #[tokio::test]
    async fn undecodable_account_key_answers_misconfigured() {
        let config = ServerConfig::new(settings(&[
            ("BLOB_ACCOUNT_NAME", "trailshare"),
            ("BLOB_ACCOUNT_KEY", "not base64!"),
        ]));
        let state = build_http_state(&config).expect("state builds");

        let err = state
            .media
            .issue_upload_url(UploadUrlRequest {
                file_name: "a.jpg".to_owned(),
                content_type: None,
            })
            .await
            .expect_err("signing rejected");

        assert_eq!(err.code(), ErrorCode::Misconfigured);
        assert_eq!(err.message(), "blob account key is invalid");
    }

    #[rstest]
    fn memory_store_is_reported_without_pool() {
        assert_eq!(ServerConfig::new(settings(&[])).store_label(), "memory");
    }

    #[rstest]
    fn unusable_tuning_fails_startup() {
        let mut config = ServerConfig::new(settings(&[]));
        config.settings.tuning = TuningSettings {
            outbound_timeout_seconds: Some(0),
            ..TuningSettings::default()
        };

        assert!(matches!(
            build_http_state(&config),
            Err(StateBuildError::Settings(_))
        ));
    }
}
