//! Driven port for image content moderation.
//!
//! Adapters only report per-category severities; the decision is made by
//! [`crate::domain::ModerationPolicy`].

use async_trait::async_trait;

use crate::domain::CategorySeverity;

use super::define_port_error;

define_port_error! {
    /// Errors surfaced while calling the moderation service.
    pub enum ContentModeratorError {
        /// No moderation endpoint is configured.
        NotConfigured =>
            "content moderation is not configured",
        /// Network transport failed before receiving a response.
        Transport { message: String } =>
            "content moderation transport failed: {message}",
        /// The call exceeded its timeout.
        Timeout { message: String } =>
            "content moderation timeout: {message}",
        /// The service answered with a non-success status.
        Status { status: u16, message: String } =>
            "content moderation returned status {status}: {message}",
        /// The response could not be decoded.
        Decode { message: String } =>
            "content moderation response decode failed: {message}",
    }
}

/// Port for scoring an image against moderation categories.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContentModerator: Send + Sync {
    /// Severity per category for the image at `image_url`, in service order.
    async fn analyze(&self, image_url: &str)
    -> Result<Vec<CategorySeverity>, ContentModeratorError>;
}

/// Moderator used when no endpoint is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledContentModerator;

#[async_trait]
impl ContentModerator for DisabledContentModerator {
    async fn analyze(
        &self,
        _image_url: &str,
    ) -> Result<Vec<CategorySeverity>, ContentModeratorError> {
        Err(ContentModeratorError::not_configured())
    }
}
