//! Correlation identifier shared by a request's log lines, error bodies and
//! `trace-id` response header.
//!
//! The identifier lives in tokio task-local storage while a request is
//! handled. Work moved onto another task must re-enter it with
//! [`TraceId::scope`].

use std::fmt;
use std::future::Future;
use std::str::FromStr;

use tokio::task_local;
use uuid::Uuid;

/// Header carrying the correlation identifier on requests and responses.
pub const TRACE_ID_HEADER: &str = "trace-id";

task_local! {
    static CURRENT: TraceId;
}

/// Correlation identifier for one API request.
///
/// Rendered as a lowercase hyphenated UUID wherever it leaves the process.
///
/// # Examples
/// ```
/// use trailshare::TraceId;
///
/// let upstream = "5F0C3E1A-8B0E-4C57-9E43-0F4B7D0A2C11";
/// let id = TraceId::continue_or_generate(Some(upstream));
/// assert_eq!(id.to_string(), upstream.to_lowercase());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TraceId(Uuid);

impl TraceId {
    pub(crate) fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Keep the caller's identifier when the inbound `trace-id` header holds
    /// a UUID; start a new one otherwise.
    #[must_use]
    pub fn continue_or_generate(header: Option<&str>) -> Self {
        header
            .and_then(|raw| raw.trim().parse().ok())
            .unwrap_or_else(Self::generate)
    }

    /// Identifier of the request being handled, if any.
    #[must_use]
    pub fn current() -> Option<Self> {
        CURRENT.try_with(|id| *id).ok()
    }

    /// Run `fut` with this identifier in scope.
    ///
    /// ```
    /// use trailshare::TraceId;
    ///
    /// # tokio::runtime::Runtime::new().expect("runtime").block_on(async {
    /// let id = TraceId::continue_or_generate(None);
    /// assert_eq!(TraceId::scope(id, async { TraceId::current() }).await, Some(id));
    /// # });
    /// ```
    pub async fn scope<F: Future>(self, fut: F) -> F::Output {
        CURRENT.scope(self, fut).await
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0.hyphenated(), f)
    }
}

impl FromStr for TraceId {
    type Err = uuid::Error;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(raw).map(Self)
    }
}
