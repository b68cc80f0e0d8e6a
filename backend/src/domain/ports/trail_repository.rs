//! Driven port for trail document storage.
//!
//! The store is keyed by [`TrailId`]; a duplicate insert must fail with
//! [`TrailRepositoryError::Conflict`] rather than overwrite.

use async_trait::async_trait;

use crate::domain::{Trail, TrailId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by trail repository adapters.
    pub enum TrailRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "trail repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "trail repository query failed: {message}",
        /// A trail with the same identifier already exists.
        Conflict { trail_id: String } =>
            "trail {trail_id} already exists",
    }
}

/// Port for reading and writing trail documents.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TrailRepository: Send + Sync {
    /// Insert a new trail.
    async fn insert(&self, trail: &Trail) -> Result<(), TrailRepositoryError>;

    /// Point lookup by identifier.
    async fn find_by_id(&self, id: &TrailId) -> Result<Option<Trail>, TrailRepositoryError>;

    /// Every trail ordered by `createdAt` descending, ties by id descending.
    async fn list_newest_first(&self) -> Result<Vec<Trail>, TrailRepositoryError>;

    /// Replace an existing trail; returns `false` when it no longer exists.
    async fn replace(&self, trail: &Trail) -> Result<bool, TrailRepositoryError>;

    /// Delete by identifier; returns `false` when nothing was removed.
    async fn delete(&self, id: &TrailId) -> Result<bool, TrailRepositoryError>;

    /// Cheap connectivity check.
    async fn ping(&self) -> Result<(), TrailRepositoryError>;
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use rstest::rstest;

    use super::*;

    #[rstest]
    fn conflict_message_names_trail() {
        let err = TrailRepositoryError::conflict("ridge");
        assert_eq!(err.to_string(), "trail ridge already exists");
    }

    #[rstest]
    #[case::conflict(TrailRepositoryError::conflict("ridge"), "conflict")]
    #[case::connection(TrailRepositoryError::connection("refused"), "connection")]
    fn kind_names_the_failure(#[case] err: TrailRepositoryError, #[case] expected: &str) {
        assert_eq!(err.kind(), expected);
    }
}
