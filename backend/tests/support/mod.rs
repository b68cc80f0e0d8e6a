//! Embedded PostgreSQL helpers for repository integration suites.

pub mod cluster;
pub mod embedded_postgres;

pub use cluster::{handle_cluster_setup_failure, shared_cluster};
pub use embedded_postgres::provision_template_database;
