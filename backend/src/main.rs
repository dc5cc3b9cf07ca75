//! Backend entry-point: loads settings, prepares storage and serves the POI
//! REST endpoints with OpenAPI docs.

mod server;

use std::path::Path;

use actix_web::web;
#[cfg(feature = "metrics")]
use actix_web_prom::{PrometheusMetrics, PrometheusMetricsBuilder};
use cap_std::{ambient_authority, fs::Dir};
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use poi_backend::inbound::http::health::HealthState;
use poi_backend::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use server::{ServerConfig, ServerSettings, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = ServerSettings::load()
        .map_err(|e| std::io::Error::other(format!("failed to load settings: {e}")))?;
    let upload_dir = settings.upload_dir();
    prepare_upload_dir(&upload_dir);

    let mut config = ServerConfig::new(
        settings.bind_addr()?,
        upload_dir,
        settings.max_upload_bytes(),
    );
    if let Some(pool) = connect_database(&settings).await? {
        config = config.with_db_pool(pool);
    } else {
        warn!("no database configured; serving fixture POIs");
    }

    #[cfg(feature = "metrics")]
    let config = config.with_metrics(initialize_metrics(|| {
        PrometheusMetricsBuilder::new("poi")
            .endpoint("/metrics")
            .build()
    }));

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, config)?;
    server.await
}

/// Create the upload directory. Failure is logged and startup continues;
/// uploads then fail at request time instead.
fn prepare_upload_dir(path: &Path) {
    match Dir::create_ambient_dir_all(path, ambient_authority()) {
        Ok(()) => info!(path = %path.display(), "upload directory ready"),
        Err(error) => warn!(%error, path = %path.display(), "failed to create upload directory"),
    }
}

/// Apply migrations and open the pool when a database URL is configured.
async fn connect_database(settings: &ServerSettings) -> std::io::Result<Option<DbPool>> {
    let Some(database_url) = settings.database_url() else {
        return Ok(None);
    };
    if settings.run_migrations() {
        run_pending_migrations(&database_url)
            .await
            .map_err(|e| std::io::Error::other(e.to_string()))?;
    }
    let pool_config = PoolConfig::new(database_url)
        .with_max_size(settings.db_max_connections())
        .with_connection_timeout(settings.db_connect_timeout());
    let pool = DbPool::new(pool_config)
        .await
        .map_err(|e| std::io::Error::other(e.to_string()))?;
    Ok(Some(pool))
}

/// Build Prometheus middleware, logging and continuing without it on error.
#[cfg(feature = "metrics")]
fn initialize_metrics<F, E>(make: F) -> Option<PrometheusMetrics>
where
    F: FnOnce() -> Result<PrometheusMetrics, E>,
    E: std::fmt::Display,
{
    match make() {
        Ok(metrics) => Some(metrics),
        Err(error) => {
            warn!(%error, "failed to initialise Prometheus metrics; continuing without them");
            None
        }
    }
}
