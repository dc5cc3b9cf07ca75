//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod import_metrics;
mod poi_import_command;
mod poi_query;
mod poi_repository;
mod poi_store;
mod spreadsheet_source;

#[cfg(test)]
pub use import_metrics::MockImportMetrics;
pub use import_metrics::{
    ImportMetrics, ImportMetricsError, ImportOutcomeKind, NoOpImportMetrics,
    SuppressedFailureStage,
};
#[cfg(test)]
pub use poi_import_command::MockPoiImportCommand;
pub use poi_import_command::{PoiImportCommand, PoiImportOutcome, PoiImportRequest};
#[cfg(test)]
pub use poi_query::MockPoiQuery;
pub use poi_query::{PoiListRequest, PoiQuery};
#[cfg(test)]
pub use poi_repository::MockPoiRepository;
pub use poi_repository::{FixturePoiRepository, PoiRepository, PoiRepositoryError};
#[cfg(test)]
pub use poi_store::MockPoiStore;
pub use poi_store::{FixturePoiStore, PoiReplaceTransaction, PoiStore, PoiStoreError};
#[cfg(test)]
pub use spreadsheet_source::MockSpreadsheetSource;
pub use spreadsheet_source::{
    FixtureSpreadsheetSource, RawCell, SheetRow, SpreadsheetSource, SpreadsheetSourceError,
};
