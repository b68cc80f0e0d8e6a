//! Shared plumbing for the reqwest-backed AI service adapters.

use std::time::Duration;

use reqwest::{Client, StatusCode, Url};

/// Header carrying the Cognitive Services subscription key.
pub(crate) const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";

const PREVIEW_CHAR_LIMIT: usize = 160;

/// Errors raised while constructing an outbound HTTP adapter.
#[derive(Debug, thiserror::Error)]
pub enum AdapterBuildError {
    /// The reqwest client could not be built.
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
    /// The configured endpoint cannot be joined with the operation path.
    #[error("invalid endpoint {endpoint}: {source}")]
    Endpoint {
        endpoint: String,
        #[source]
        source: url::ParseError,
    },
}

/// Build a client with an explicit whole-request timeout.
pub(crate) fn build_client(timeout: Duration) -> Result<Client, AdapterBuildError> {
    Ok(Client::builder().timeout(timeout).build()?)
}

/// Append `path` to `endpoint`, ignoring trailing slashes, and set the query.
pub(crate) fn operation_url(
    endpoint: &Url,
    path: &str,
    query: &[(&str, &str)],
) -> Result<Url, AdapterBuildError> {
    let base = endpoint.as_str().trim_end_matches('/');
    let mut url =
        Url::parse(&format!("{base}{path}")).map_err(|source| AdapterBuildError::Endpoint {
            endpoint: endpoint.to_string(),
            source,
        })?;
    url.set_query(None);
    if !query.is_empty() {
        url.query_pairs_mut().extend_pairs(query);
    }
    Ok(url)
}

/// Whether a status means the upstream gave up waiting.
pub(crate) fn is_timeout_status(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT
    )
}

/// `status <code>[: <preview>]` for a failed response.
pub(crate) fn status_message(status: StatusCode, body: &[u8]) -> String {
    let preview = body_preview(body);
    if preview.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {preview}", status.as_u16())
    }
}

/// Whitespace-collapsed prefix of a response body.
pub(crate) fn body_preview(body: &[u8]) -> String {
    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}
