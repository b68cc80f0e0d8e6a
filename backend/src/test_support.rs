//! Test utilities for the backend crate.
//!
//! Shared helpers for unit tests (in `src/`) and integration tests (in
//! `tests/`). Only compiled for tests or with the `test-support` feature.

use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Local, TimeDelta, Utc};
use mockable::Clock;

use crate::domain::ports::{
    ContentModerator, ContentModeratorError, ImageAnalyzer, ImageAnalyzerError,
};
use crate::domain::{CategorySeverity, ImageAnalysis};

/// Base64 of `trailshare-test-account-key`, usable as a blob account key.
pub const TEST_ACCOUNT_KEY: &str = "dHJhaWxzaGFyZS10ZXN0LWFjY291bnQta2V5";

/// Clock whose current instant is set and advanced explicitly.
pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    pub fn advance(&self, delta: Duration) {
        let delta = match TimeDelta::from_std(delta) {
            Ok(delta) => delta,
            Err(error) => {
                panic!("failed to convert Duration to TimeDelta: {error}; delta={delta:?}")
            }
        };
        *self.lock_clock() += delta;
    }

    pub fn advance_seconds(&self, seconds: i64) {
        *self.lock_clock() += TimeDelta::seconds(seconds);
    }

    fn lock_clock(&self) -> MutexGuard<'_, DateTime<Utc>> {
        match self.0.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("clock mutex"),
        }
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.lock_clock()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(_) => panic!("test double mutex"),
    }
}

/// Analyzer double answering with a fixed result and recording image URLs.
pub struct StubImageAnalyzer {
    result: Result<ImageAnalysis, ImageAnalyzerError>,
    calls: Mutex<Vec<String>>,
}

impl StubImageAnalyzer {
    /// Always succeed with `analysis`.
    pub fn returning(analysis: ImageAnalysis) -> Self {
        Self {
            result: Ok(analysis),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Always fail with `error`.
    pub fn failing(error: ImageAnalyzerError) -> Self {
        Self {
            result: Err(error),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Image URLs received so far.
    pub fn calls(&self) -> Vec<String> {
        lock(&self.calls).clone()
    }
}

#[async_trait]
impl ImageAnalyzer for StubImageAnalyzer {
    async fn analyze(&self, image_url: &str) -> Result<ImageAnalysis, ImageAnalyzerError> {
        lock(&self.calls).push(image_url.to_owned());
        self.result.clone()
    }
}

/// Moderator double answering with fixed category scores.
pub struct StubContentModerator {
    result: Result<Vec<CategorySeverity>, ContentModeratorError>,
}

impl StubContentModerator {
    /// Always report `scores` as `(category, severity)` pairs.
    pub fn returning(scores: &[(&str, u8)]) -> Self {
        Self {
            result: Ok(scores
                .iter()
                .map(|(category, severity)| CategorySeverity::new(*category, *severity))
                .collect()),
        }
    }

    /// Always fail with `error`.
    pub fn failing(error: ContentModeratorError) -> Self {
        Self { result: Err(error) }
    }
}

#[async_trait]
impl ContentModerator for StubContentModerator {
    async fn analyze(
        &self,
        _image_url: &str,
    ) -> Result<Vec<CategorySeverity>, ContentModeratorError> {
        self.result.clone()
    }
}
