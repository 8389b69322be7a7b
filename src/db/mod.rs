//! Storage backends and per-call connection resolution.
//!
//! Every operation resolves its own connection and drops it when done; nothing
//! is pooled or cached between requests.

pub mod postgres;
pub mod sqlite;

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::{Config, DeploymentMode};
use crate::error::{BackendError, ConnectionError};
use crate::types::{ColumnDescriptor, Row};

pub use postgres::PostgresBackend;
pub use sqlite::SqliteBackend;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    #[serde(rename = "sqlite")]
    EmbeddedFile,
    #[serde(rename = "sqlite_memory")]
    EmbeddedMemory,
    #[serde(rename = "postgresql")]
    Server,
}

impl BackendKind {
    pub fn as_str(self) -> &'static str {
        match self {
            BackendKind::EmbeddedFile => "sqlite",
            BackendKind::EmbeddedMemory => "sqlite_memory",
            BackendKind::Server => "postgresql",
        }
    }

    pub fn is_embedded(self) -> bool {
        !matches!(self, BackendKind::Server)
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A live connection to one engine. Dropping it closes the connection.
#[async_trait]
pub trait Backend: Send + Sync {
    fn kind(&self) -> BackendKind;

    /// User tables, in catalog order.
    async fn list_tables(&self) -> Result<Vec<String>, BackendError>;

    /// Columns of `table` in ordinal order.
    async fn describe_columns(&self, table: &str) -> Result<Vec<ColumnDescriptor>, BackendError>;

    /// Run `sql` verbatim and collect every row.
    async fn execute(&self, sql: &str) -> Result<Vec<Row>, BackendError>;
}

/// True when `dsn` names a server database.
pub fn is_server_dsn(dsn: &str) -> bool {
    let dsn = dsn.trim();
    dsn.starts_with("postgresql://") || dsn.starts_with("postgres://")
}

/// Picks a backend for each call: server first, then in-memory when deployed,
/// then the local file.
#[derive(Debug, Clone)]
pub struct ConnectionResolver {
    database_url: Option<String>,
    mode: DeploymentMode,
    sqlite_path: PathBuf,
    connect_timeout: Duration,
}

impl ConnectionResolver {
    pub fn new(
        database_url: Option<String>,
        mode: DeploymentMode,
        sqlite_path: impl Into<PathBuf>,
        connect_timeout: Duration,
    ) -> Self {
        Self {
            database_url,
            mode,
            sqlite_path: sqlite_path.into(),
            connect_timeout,
        }
    }

    pub fn from_config(config: &Config, mode: DeploymentMode) -> Self {
        Self::new(
            config.database_url.clone(),
            mode,
            config.sqlite_path.clone(),
            config.connect_timeout(),
        )
    }

    pub fn mode(&self) -> DeploymentMode {
        self.mode
    }

    pub async fn resolve(&self) -> Result<Box<dyn Backend>, ConnectionError> {
        if let Some(url) = self.database_url.as_deref().filter(|u| is_server_dsn(u)) {
            match PostgresBackend::connect(url.trim(), self.connect_timeout).await {
                Ok(backend) => return Ok(Box::new(backend)),
                Err(e) => warn!("PostgreSQL connection failed: {}", e),
            }
        }

        if self.mode.is_deployed() {
            info!("deployment detected, using in-memory SQLite");
            return Ok(Box::new(SqliteBackend::open_in_memory()?));
        }

        Ok(Box::new(SqliteBackend::open(&self.sqlite_path)?))
    }
}
