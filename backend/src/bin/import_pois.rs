//! Replace the stored POIs with the rows of a spreadsheet file.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::env;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use mockable::DefaultClock;
use poi_backend::domain::PoiImportService;
use poi_backend::domain::ports::{PoiImportCommand, PoiImportRequest};
use poi_backend::outbound::persistence::{
    DbPool, DieselPoiStore, PoolConfig, run_pending_migrations,
};
use poi_backend::outbound::spreadsheet::CalamineSpreadsheetSource;
use tokio::runtime::Builder;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

/// `import-pois` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "import-pois",
    about = "Replace every stored POI with the rows of a spreadsheet",
    version
)]
struct CliArgs {
    /// Path to an xlsx, xls, xlsb or ods workbook.
    #[arg(long = "file", value_name = "path")]
    file: PathBuf,
    /// Database connection URL. Falls back to `DATABASE_URL` when omitted.
    #[arg(long = "database-url", value_name = "url")]
    database_url: Option<String>,
}

fn main() -> io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .with_writer(io::stderr)
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|error| io::Error::other(format!("create Tokio runtime: {error}")))?;
    runtime.block_on(async_main())
}

async fn async_main() -> io::Result<()> {
    let args = CliArgs::try_parse().map_err(io::Error::other)?;
    let database_url = resolve_database_url(args.database_url, env::var("DATABASE_URL").ok())?;

    run_pending_migrations(&database_url)
        .await
        .map_err(|error| io::Error::other(format!("apply migrations: {error}")))?;
    let pool = DbPool::new(PoolConfig::new(&database_url).with_max_size(1))
        .await
        .map_err(|error| io::Error::other(format!("create database pool: {error}")))?;

    let command = PoiImportService::with_noop_metrics(
        Arc::new(CalamineSpreadsheetSource),
        Arc::new(DieselPoiStore::new(pool)),
        Arc::new(DefaultClock),
    );
    let outcome = command
        .import(PoiImportRequest {
            upload_path: Some(args.file),
        })
        .await
        .map_err(|error| io::Error::other(format!("import failed: {error}")))?;

    println!("imported_count={}", outcome.imported_count);
    println!("skipped_count={}", outcome.skipped_count);
    println!("imported_at={}", outcome.imported_at.to_rfc3339());
    Ok(())
}

/// Pick the explicit URL, else the environment value; blank values are errors.
fn resolve_database_url(explicit: Option<String>, from_env: Option<String>) -> io::Result<String> {
    let (value, source) = match (explicit, from_env) {
        (Some(value), _) => (value, "--database-url"),
        (None, Some(value)) => (value, "DATABASE_URL"),
        (None, None) => {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "database URL missing: set --database-url or DATABASE_URL",
            ));
        }
    };
    if value.trim().is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{source} must not be empty"),
        ));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    //! Unit tests for CLI parsing helpers.

    use std::path::Path;

    use clap::Parser;
    use rstest::rstest;

    use super::{CliArgs, resolve_database_url};

    #[rstest]
    fn explicit_url_wins_over_environment() {
        let url = resolve_database_url(
            Some("postgres://cli/pois".to_owned()),
            Some("postgres://env/pois".to_owned()),
        )
        .expect("explicit url");
        assert_eq!(url, "postgres://cli/pois");
    }

    #[rstest]
    fn environment_url_is_used_when_flag_is_absent() {
        let url = resolve_database_url(None, Some("postgres://env/pois".to_owned()))
            .expect("environment url");
        assert_eq!(url, "postgres://env/pois");
    }

    #[rstest]
    #[case(Some("   ".to_owned()), None)]
    #[case(None, Some(String::new()))]
    #[case(None, None)]
    fn missing_or_blank_urls_are_rejected(
        #[case] explicit: Option<String>,
        #[case] from_env: Option<String>,
    ) {
        let error = resolve_database_url(explicit, from_env).expect_err("should fail");
        assert_eq!(error.kind(), std::io::ErrorKind::InvalidInput);
    }

    #[rstest]
    fn file_flag_is_required() {
        assert!(CliArgs::try_parse_from(["import-pois"]).is_err());
    }

    #[rstest]
    fn flags_parse() {
        let args = CliArgs::try_parse_from([
            "import-pois",
            "--file",
            "pois.xlsx",
            "--database-url",
            "postgres://localhost/pois",
        ])
        .expect("flags parse");
        assert_eq!(args.file, Path::new("pois.xlsx"));
        assert_eq!(args.database_url.as_deref(), Some("postgres://localhost/pois"));
    }
}
