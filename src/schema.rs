//! Schema introspection. Failures never propagate: callers get an empty
//! descriptor and treat it as "schema unavailable".

use std::fmt::Write as _;

use tracing::warn;

use crate::db::{Backend, ConnectionResolver};
use crate::error::BackendError;
use crate::types::SchemaDescriptor;

/// Describe every table reachable through `backend`.
pub async fn introspect(backend: &dyn Backend) -> SchemaDescriptor {
    match try_introspect(backend).await {
        Ok(schema) => schema,
        Err(e) => {
            warn!("Error getting schema from {}: {}", backend.kind(), e);
            SchemaDescriptor::new()
        }
    }
}

async fn try_introspect(backend: &dyn Backend) -> Result<SchemaDescriptor, BackendError> {
    let mut schema = SchemaDescriptor::new();
    for table in backend.list_tables().await? {
        let columns = backend.describe_columns(&table).await?;
        schema.insert(table, columns);
    }
    Ok(schema)
}

/// Resolve a fresh connection and describe it. The connection is closed before returning.
pub async fn fetch(resolver: &ConnectionResolver) -> SchemaDescriptor {
    match resolver.resolve().await {
        Ok(backend) => introspect(backend.as_ref()).await,
        Err(e) => {
            warn!("Error getting schema: {}", e);
            SchemaDescriptor::new()
        }
    }
}

/// Plain-text schema listing embedded in the SQL prompt.
pub fn render(schema: &SchemaDescriptor) -> String {
    let mut text = String::new();
    for (table, columns) in schema {
        let _ = writeln!(text, "\nTable: {}", table);
        for col in columns {
            let _ = writeln!(text, "  - {} ({})", col.name, col.data_type);
        }
    }
    text
}
