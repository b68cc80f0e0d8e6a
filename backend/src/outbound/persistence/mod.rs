//! PostgreSQL persistence for trails using Diesel.
//!
//! Row structs (`models.rs`) and the table definition (`schema.rs`) stay
//! private to this module; the repository converts rows into validated
//! domain trails.
//!
//! ```ignore
//! use trailshare::outbound::persistence::{DbPool, DieselTrailRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/trailshare")).await?;
//! let repo = DieselTrailRepository::new(pool);
//! ```

mod diesel_trail_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_trail_repository::DieselTrailRepository;
pub use migrations::{MIGRATIONS, MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
