//! Template-database provisioning for embedded PostgreSQL suites.
//!
//! The `trails` schema is migrated once into a template named after a hash of
//! `backend/migrations`; every test then clones the template into its own
//! temporary database.

use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};
use std::time::Duration;

use diesel::Connection;
use diesel::pg::PgConnection;
use diesel_migrations::MigrationHarness;
use pg_embedded_setup_unpriv::test_support::hash_directory;
use pg_embedded_setup_unpriv::{ClusterHandle, TemporaryDatabase};
use trailshare::domain::ports::TrailRepositoryError;
use trailshare::outbound::persistence::MIGRATIONS;
use uuid::Uuid;

static TEMPLATE_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

const TEMPLATE_NAME_PREFIX: &str = "trailshare_template";
const TEMPLATE_PROVISION_RETRIES: usize = 5;
const TEMPLATE_PROVISION_RETRY_DELAY: Duration = Duration::from_millis(500);

fn migrations_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("migrations")
}

fn template_database_name() -> Result<String, TrailRepositoryError> {
    let hash = hash_directory(migrations_dir())
        .map_err(|err| TrailRepositoryError::query(format!("hash migrations: {err}")))?;
    let short_hash = hash.get(..8).unwrap_or(&hash);
    Ok(format!("{TEMPLATE_NAME_PREFIX}_{short_hash}"))
}

/// Create the migrated template unless an earlier test already did.
fn ensure_template_database(cluster: &ClusterHandle) -> Result<String, TrailRepositoryError> {
    let template_name = template_database_name()?;
    let _lock = TEMPLATE_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|err| err.into_inner());

    let exists = cluster
        .database_exists(template_name.as_str())
        .map_err(|err| TrailRepositoryError::query(format!("template check: {err:?}")))?;

    if !exists {
        cluster
            .create_database(template_name.as_str())
            .map_err(|err| TrailRepositoryError::query(format!("create template: {err:?}")))?;

        let url = cluster.connection().database_url(&template_name);
        migrate_schema(&url)?;
    }

    Ok(template_name)
}

fn provision_attempt(
    cluster: &ClusterHandle,
    attempt: usize,
) -> Result<TemporaryDatabase, TrailRepositoryError> {
    let template_name = ensure_template_database(cluster).map_err(|err| {
        TrailRepositoryError::query(format!(
            "attempt {attempt}/{TEMPLATE_PROVISION_RETRIES}: {err}"
        ))
    })?;
    let db_name = format!("test_{}", Uuid::new_v4().simple());
    cluster
        .temporary_database_from_template(db_name.as_str(), template_name.as_str())
        .map_err(|err| {
            TrailRepositoryError::query(format!(
                "clone template: attempt {attempt}/{TEMPLATE_PROVISION_RETRIES}: {err:?}"
            ))
        })
}

/// Clone a fresh database from the migrated template.
///
/// The database is dropped when the returned guard goes out of scope.
pub fn provision_template_database(
    cluster: &ClusterHandle,
) -> Result<TemporaryDatabase, TrailRepositoryError> {
    let mut last_error = None;
    for attempt in 1..=TEMPLATE_PROVISION_RETRIES {
        match provision_attempt(cluster, attempt) {
            Ok(database) => return Ok(database),
            Err(err) => last_error = Some(err),
        }
        if attempt < TEMPLATE_PROVISION_RETRIES {
            std::thread::sleep(TEMPLATE_PROVISION_RETRY_DELAY);
        }
    }

    Err(last_error
        .unwrap_or_else(|| TrailRepositoryError::query("clone template: exhausted retries")))
}

/// Apply the crate's embedded migrations to `url`.
pub fn migrate_schema(url: &str) -> Result<(), TrailRepositoryError> {
    let mut conn = PgConnection::establish(url)
        .map_err(|err| TrailRepositoryError::connection(format!("{err:?}")))?;
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|err| TrailRepositoryError::query(format!("migration: {err:?}")))?;
    Ok(())
}
