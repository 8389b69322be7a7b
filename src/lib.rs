//! Natural-language questions in, SQL and plain-language answers out.
//!
//! A question is grounded in the live schema of whichever database the
//! [`db::ConnectionResolver`] reaches (PostgreSQL, or SQLite as a fallback),
//! turned into SQL by a hosted model, executed verbatim, and explained.

pub mod chat;
pub mod config;
pub mod db;
pub mod error;
pub mod gateway;
pub mod llm;
pub mod logging;
pub mod orchestrator;
pub mod prompt;
pub mod schema;
pub mod types;

pub use config::{Config, DeploymentMode};
pub use db::{Backend, BackendKind, ConnectionResolver};
pub use error::{BackendError, ConnectionError, LlmError, QueryError};
pub use orchestrator::Orchestrator;
