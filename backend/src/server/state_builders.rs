//! Builders wiring domain services onto persistence adapters or fixtures.

use std::io;
use std::sync::Arc;

use actix_web::web;
use mockable::DefaultClock;

use poi_backend::domain::ports::{
    FixturePoiRepository, FixturePoiStore, ImportMetrics, NoOpImportMetrics, PoiImportCommand,
    PoiQuery, PoiRepository, PoiStore,
};
use poi_backend::domain::{PoiImportService, PoiQueryService};
use poi_backend::inbound::http::state::HttpState;
#[cfg(feature = "metrics")]
use poi_backend::outbound::metrics::PrometheusImportMetrics;
use poi_backend::outbound::persistence::{DieselPoiRepository, DieselPoiStore};
use poi_backend::outbound::spreadsheet::CalamineSpreadsheetSource;

use super::ServerConfig;

type PoiPorts = (Arc<dyn PoiQuery>, Arc<dyn PoiImportCommand>);

/// Build import metrics, registering Prometheus counters when the
/// middleware registry is available.
///
/// # Errors
/// Returns [`io::Error`] if metric registration fails.
#[cfg(feature = "metrics")]
fn build_import_metrics(config: &ServerConfig) -> io::Result<Arc<dyn ImportMetrics>> {
    match &config.prometheus {
        Some(prometheus) => PrometheusImportMetrics::new(&prometheus.registry)
            .map(|metrics| Arc::new(metrics) as Arc<dyn ImportMetrics>)
            .map_err(|err| io::Error::other(format!("import metrics registration failed: {err}"))),
        None => Ok(Arc::new(NoOpImportMetrics)),
    }
}

#[cfg(not(feature = "metrics"))]
fn build_import_metrics(_config: &ServerConfig) -> io::Result<Arc<dyn ImportMetrics>> {
    Ok(Arc::new(NoOpImportMetrics))
}

/// Wire the query and import services onto one repository/store pair.
fn wire_poi_ports<R, S>(repository: R, store: S, metrics: Arc<dyn ImportMetrics>) -> PoiPorts
where
    R: PoiRepository + 'static,
    S: PoiStore + 'static,
{
    let query = PoiQueryService::new(Arc::new(repository));
    let import = PoiImportService::new(
        Arc::new(CalamineSpreadsheetSource),
        Arc::new(store),
        metrics,
        Arc::new(DefaultClock),
    );
    (Arc::new(query), Arc::new(import))
}

/// Build the shared HTTP state, using Diesel adapters when a pool is
/// configured and fixtures otherwise.
///
/// # Errors
/// Returns [`io::Error`] if metric registration fails.
pub(super) fn build_http_state(config: &ServerConfig) -> io::Result<web::Data<HttpState>> {
    let metrics = build_import_metrics(config)?;
    let (pois, poi_import) = match &config.db_pool {
        Some(pool) => wire_poi_ports(
            DieselPoiRepository::new(pool.clone()),
            DieselPoiStore::new(pool.clone()),
            metrics.clone(),
        ),
        None => wire_poi_ports(FixturePoiRepository, FixturePoiStore, metrics.clone()),
    };
    Ok(web::Data::new(
        HttpState::new(pois, poi_import).with_import_metrics(metrics),
    ))
}
