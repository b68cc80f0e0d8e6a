//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL-backed trail repository using Diesel
//! - **memory**: process-local trail repository for database-less runs
//! - **blob**: shared-key SAS signing for blob storage URLs
//! - **vision**: image captioning and tagging over HTTP
//! - **content_safety**: image moderation scoring over HTTP
//!
//! Adapters translate between domain types and infrastructure
//! representations. They contain no business logic.

pub mod blob;
pub mod content_safety;
mod http_client;
pub mod memory;
pub mod persistence;
pub mod vision;

pub use http_client::AdapterBuildError;
