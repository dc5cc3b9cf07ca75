//! Server settings loaded via OrthoConfig.
//!
//! Values come from `POI_*` environment variables, configuration files and
//! command-line flags. The database URL also honours the conventional
//! `DATABASE_URL` variable.

use std::env;
use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_DB_CONNECT_TIMEOUT_SECS: u64 = 30;

/// Runtime configuration for the HTTP server.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "POI")]
pub struct ServerSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// PostgreSQL connection URL; fixture ports are used when absent.
    pub database_url: Option<String>,
    /// Directory receiving upload temp files.
    pub upload_dir: Option<PathBuf>,
    /// Upper bound on a multipart request body.
    pub max_upload_bytes: Option<usize>,
    /// Maximum pooled database connections.
    pub db_max_connections: Option<u32>,
    /// Seconds to wait for a pooled connection.
    pub db_connect_timeout_secs: Option<u64>,
    /// Leave the schema untouched at startup instead of applying the
    /// embedded migrations.
    #[ortho_config(default = false)]
    pub skip_migrations: bool,
}

impl ServerSettings {
    /// Parse the configured bind address.
    pub fn bind_addr(&self) -> io::Result<SocketAddr> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse().map_err(|err| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid bind address '{raw}': {err}"),
            )
        })
    }

    /// Database URL from settings, falling back to `DATABASE_URL`.
    pub fn database_url(&self) -> Option<String> {
        self.database_url
            .clone()
            .or_else(|| env::var("DATABASE_URL").ok())
            .filter(|url| !url.trim().is_empty())
    }

    pub fn upload_dir(&self) -> PathBuf {
        self.upload_dir
            .clone()
            .unwrap_or_else(|| env::temp_dir().join("poi-uploads"))
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_bytes.unwrap_or(DEFAULT_MAX_UPLOAD_BYTES)
    }

    pub fn db_max_connections(&self) -> u32 {
        self.db_max_connections
            .unwrap_or(DEFAULT_DB_MAX_CONNECTIONS)
    }

    pub fn db_connect_timeout(&self) -> Duration {
        Duration::from_secs(
            self.db_connect_timeout_secs
                .unwrap_or(DEFAULT_DB_CONNECT_TIMEOUT_SECS),
        )
    }

    /// Embedded migrations run unless `skip_migrations` is set.
    pub const fn run_migrations(&self) -> bool {
        !self.skip_migrations
    }
}
