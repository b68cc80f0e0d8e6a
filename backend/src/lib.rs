//! TrailShare backend: trail records, direct-to-storage image uploads and
//! AI-assisted image insights behind a REST API.
//!
//! The crate follows a hexagonal layout: [`domain`] holds validation,
//! services and ports; [`inbound`] adapts HTTP onto the driving ports;
//! [`outbound`] implements the driven ports against PostgreSQL, blob
//! storage and the vision and content-safety services.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
