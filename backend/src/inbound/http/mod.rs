//! HTTP inbound adapter exposing the REST endpoints.
//!
//! Handlers translate request bodies into driving-port calls on
//! [`state::HttpState`] and map domain errors through [`error`].

pub mod error;
pub mod health;
pub mod insights;
pub mod media;
pub mod schemas;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod trails;
pub mod validation;

pub use error::ApiResult;
