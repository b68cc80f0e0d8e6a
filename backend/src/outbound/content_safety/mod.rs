//! Image content moderation adapter.
//!
//! Reports per-category severities only; the allow/block decision belongs to
//! `domain::moderation`.

mod dto;
mod http_moderator;

pub use http_moderator::AzureContentSafetyModerator;
