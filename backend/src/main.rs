//! Backend entry-point: validates configuration, applies migrations and
//! serves the REST API.

mod server;

use std::ffi::OsString;

use actix_web::web;
use color_eyre::eyre::{Context, Result, eyre};
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use server::{ServerConfig, create_server};
use trailshare::inbound::http::health::HealthState;
use trailshare::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use trailshare::settings::{AppSettings, TuningSettings};

fn init_tracing() {
    if let Err(error) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(%error, "tracing init failed");
    }
}

fn load_settings(args: impl IntoIterator<Item = OsString>) -> Result<AppSettings> {
    let tuning = TuningSettings::load_from_iter(args)
        .map_err(|err| eyre!("failed to load tunables: {err}"))?;
    AppSettings::from_env(&DefaultEnv::new())
        .and_then(|settings| settings.with_tuning(tuning))
        .context("invalid configuration")
}

async fn connect_store(settings: &AppSettings) -> Result<Option<DbPool>> {
    let Some(database_url) = settings.database_url.as_deref() else {
        return Ok(None);
    };
    run_pending_migrations(database_url)
        .await
        .context("failed to apply database migrations")?;
    let pool = DbPool::new(PoolConfig::new(database_url.as_str()))
        .await
        .context("failed to build database pool")?;
    info!("trail store connected");
    Ok(Some(pool))
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    init_tracing();

    let settings = load_settings(std::env::args_os())?;
    let pool = connect_store(&settings).await?;

    let mut config = ServerConfig::new(settings);
    if let Some(pool) = pool {
        config = config.with_db_pool(pool);
    }
    #[cfg(feature = "metrics")]
    let config = config.with_metrics(Some(server::prometheus_metrics()?));

    let health_state = web::Data::new(HealthState::new(config.store_label()));
    let server = create_server(health_state.clone(), config)?;
    let result = server.await;
    health_state.mark_unhealthy();
    result.context("http server failed")
}
