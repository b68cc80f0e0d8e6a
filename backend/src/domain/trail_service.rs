//! Trail domain service.
//!
//! Implements the trail driving ports on top of the trail repository. Image
//! analysis during creation is advisory and never fails the request.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, SubsecRound, Utc};
use mockable::Clock;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::domain::ports::{
    BlobUrlSigner, CreateTrailRequest, ImageAnalyzer, ImageAnalyzerError, ListTrailsRequest,
    TrailCommand, TrailListItemPayload, TrailPayload, TrailQuery, TrailRepository,
    TrailRepositoryError, UpdateTrailRequest,
};
use crate::domain::vision::{self, AnalysisOutcome, AnalysisSkipped};
use crate::domain::{BlobName, Error, SasPolicy, Trail, TrailId, TrailLimits, TrailValidationError};

fn map_validation_error(error: TrailValidationError) -> Error {
    let mut details = Map::new();
    details.insert("field".to_owned(), Value::from(error.field()));
    details.insert("code".to_owned(), Value::from(error.code()));
    if let Some(limit) = error.limit() {
        details.insert("limit".to_owned(), Value::from(limit));
    }
    if let Some(length) = error.length() {
        details.insert("length".to_owned(), Value::from(length));
    }
    Error::invalid_request(error.to_string()).with_details(Value::Object(details))
}

fn map_repository_error(error: TrailRepositoryError) -> Error {
    match error {
        TrailRepositoryError::Conflict { trail_id } => {
            Error::conflict(format!("trail {trail_id} already exists"))
        }
        TrailRepositoryError::Connection { message } => {
            Error::internal(format!("trail store unavailable: {message}"))
        }
        TrailRepositoryError::Query { message } => {
            Error::internal(format!("trail store error: {message}"))
        }
    }
}

fn trail_not_found(trail_id: &str) -> Error {
    Error::not_found(format!("trail {trail_id} not found"))
}

/// An identifier that fails validation cannot name a stored trail.
fn parse_trail_id(raw: &str) -> Result<TrailId, Error> {
    TrailId::new(raw.trim()).map_err(|_| trail_not_found(raw))
}

/// Trail service implementing [`TrailCommand`] and [`TrailQuery`].
pub struct TrailService<R: ?Sized> {
    trail_repo: Arc<R>,
    analyzer: Arc<dyn ImageAnalyzer>,
    signer: Arc<dyn BlobUrlSigner>,
    clock: Arc<dyn Clock>,
    limits: TrailLimits,
    sas_policy: SasPolicy,
}

impl<R: ?Sized> TrailService<R> {
    /// Create a service with default limits and signing windows.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use mockable::DefaultClock;
    /// use trailshare::domain::TrailService;
    /// use trailshare::domain::ports::{DisabledBlobUrlSigner, DisabledImageAnalyzer};
    /// use trailshare::outbound::memory::InMemoryTrailRepository;
    ///
    /// let _service = TrailService::new(
    ///     Arc::new(InMemoryTrailRepository::new()),
    ///     Arc::new(DisabledImageAnalyzer),
    ///     Arc::new(DisabledBlobUrlSigner),
    ///     Arc::new(DefaultClock),
    /// );
    /// ```
    pub fn new(
        trail_repo: Arc<R>,
        analyzer: Arc<dyn ImageAnalyzer>,
        signer: Arc<dyn BlobUrlSigner>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            trail_repo,
            analyzer,
            signer,
            clock,
            limits: TrailLimits::default(),
            sas_policy: SasPolicy::default(),
        }
    }

    /// Override validation limits.
    #[must_use]
    pub fn with_limits(mut self, limits: TrailLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Override the signing windows used for image read URLs.
    #[must_use]
    pub fn with_sas_policy(mut self, sas_policy: SasPolicy) -> Self {
        self.sas_policy = sas_policy;
        self
    }

    fn now(&self) -> DateTime<Utc> {
        self.clock.utc().trunc_subsecs(3)
    }

    fn read_url(&self, image_path: &str, now: DateTime<Utc>) -> Result<String, String> {
        let request = self
            .sas_policy
            .read_request(BlobName::existing(image_path), now);
        self.signer
            .sign(&request)
            .map(|signed| signed.url.to_string())
            .map_err(|err| err.to_string())
    }

    async fn analyse_image(&self, image_path: Option<&str>, now: DateTime<Utc>) -> AnalysisOutcome {
        let path = image_path.ok_or(AnalysisSkipped::NoImage)?;
        let image_url = self
            .read_url(path, now)
            .map_err(|reason| AnalysisSkipped::ImageUrlUnavailable { reason })?;
        self.analyzer
            .analyze(&image_url)
            .await
            .map_err(|err| match err {
                ImageAnalyzerError::NotConfigured => AnalysisSkipped::AnalyzerDisabled,
                other => AnalysisSkipped::UpstreamFailed {
                    reason: other.to_string(),
                },
            })
    }
}

#[async_trait]
impl<R> TrailCommand for TrailService<R>
where
    R: TrailRepository + ?Sized,
{
    async fn create(&self, request: CreateTrailRequest) -> Result<TrailPayload, Error> {
        let fields = request
            .draft
            .validate(&self.limits)
            .map_err(map_validation_error)?;
        let now = self.now();

        let outcome = self.analyse_image(fields.image_path(), now).await;
        if let Err(skipped) = &outcome {
            match skipped {
                AnalysisSkipped::UpstreamFailed { .. }
                | AnalysisSkipped::ImageUrlUnavailable { .. } => {
                    warn!(reason = %skipped, "image analysis skipped");
                }
                AnalysisSkipped::NoImage | AnalysisSkipped::AnalyzerDisabled => {
                    debug!(reason = %skipped, "image analysis skipped");
                }
            }
        }

        let trail = Trail::create(fields, vision::settle(outcome), now);
        self.trail_repo
            .insert(&trail)
            .await
            .map_err(map_repository_error)?;

        info!(
            trail_id = %trail.id(),
            analysed = trail.ai_analyzed_at().is_some(),
            "trail created"
        );
        Ok(TrailPayload::from(trail))
    }

    async fn update(&self, request: UpdateTrailRequest) -> Result<TrailPayload, Error> {
        let trail_id = parse_trail_id(&request.trail_id)?;
        let patch = request
            .patch
            .validate(&self.limits)
            .map_err(map_validation_error)?;
        let changed_fields = patch.changed_fields();

        let existing = self
            .trail_repo
            .find_by_id(&trail_id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| trail_not_found(trail_id.as_str()))?;

        let updated = existing.apply_patch(patch, self.now());
        let replaced = self
            .trail_repo
            .replace(&updated)
            .await
            .map_err(map_repository_error)?;
        if !replaced {
            return Err(trail_not_found(trail_id.as_str()));
        }

        info!(trail_id = %trail_id, ?changed_fields, "trail updated");
        Ok(TrailPayload::from(updated))
    }

    async fn delete(&self, trail_id: &str) -> Result<(), Error> {
        let id = parse_trail_id(trail_id)?;
        let removed = self
            .trail_repo
            .delete(&id)
            .await
            .map_err(map_repository_error)?;
        if !removed {
            return Err(trail_not_found(id.as_str()));
        }
        info!(trail_id = %id, "trail deleted");
        Ok(())
    }
}

#[async_trait]
impl<R> TrailQuery for TrailService<R>
where
    R: TrailRepository + ?Sized,
{
    async fn get(&self, trail_id: &str) -> Result<TrailPayload, Error> {
        let id = parse_trail_id(trail_id)?;
        self.trail_repo
            .find_by_id(&id)
            .await
            .map_err(map_repository_error)?
            .map(TrailPayload::from)
            .ok_or_else(|| trail_not_found(id.as_str()))
    }

    async fn list(&self, request: ListTrailsRequest) -> Result<Vec<TrailListItemPayload>, Error> {
        let trails = self
            .trail_repo
            .list_newest_first()
            .await
            .map_err(map_repository_error)?;

        let now = self.now();
        let mut unsigned = 0_usize;
        let items: Vec<TrailListItemPayload> = trails
            .into_iter()
            .map(|trail| {
                let image_url = match trail.image_path() {
                    Some(path) if request.sign_images => match self.read_url(path, now) {
                        Ok(url) => Some(url),
                        Err(reason) => {
                            unsigned += 1;
                            debug!(trail_id = %trail.id(), %reason, "image url not signed");
                            None
                        }
                    },
                    _ => None,
                };
                TrailListItemPayload {
                    trail: TrailPayload::from(trail),
                    image_url,
                }
            })
            .collect();

        if unsigned > 0 {
            warn!(unsigned, "trail images listed without read urls");
        }
        debug!(count = items.len(), "trails listed");
        Ok(items)
    }

    async fn ping_store(&self) -> Result<(), Error> {
        self.trail_repo.ping().await.map_err(|err| {
            warn!(error = %err, "trail store ping failed");
            Error::service_unavailable(format!("trail store unavailable: {err}"))
        })
    }
}

#[cfg(test)]
#[path = "trail_service_tests.rs"]
mod tests;
