use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use rusqlite::types::ValueRef;
use rusqlite::{Batch, Connection};
use serde_json::{Number, Value};

use super::{Backend, BackendKind};
use crate::error::{BackendError, ConnectionError};
use crate::types::{ColumnDescriptor, Row};

pub struct SqliteBackend {
    conn: Mutex<Connection>,
    kind: BackendKind,
}

impl SqliteBackend {
    pub fn open(path: &Path) -> Result<Self, ConnectionError> {
        let conn = Connection::open(path).map_err(|e| ConnectionError::Embedded {
            path: path.display().to_string(),
            source: e.into(),
        })?;
        Ok(Self {
            conn: Mutex::new(conn),
            kind: BackendKind::EmbeddedFile,
        })
    }

    pub fn open_in_memory() -> Result<Self, ConnectionError> {
        let conn = Connection::open_in_memory().map_err(|e| ConnectionError::Embedded {
            path: ":memory:".to_string(),
            source: e.into(),
        })?;
        Ok(Self {
            conn: Mutex::new(conn),
            kind: BackendKind::EmbeddedMemory,
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, BackendError> {
        self.conn
            .lock()
            .map_err(|_| BackendError::new("sqlite connection lock poisoned"))
    }
}

/// Quote an identifier for interpolation into a PRAGMA.
fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn to_json(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Number(i.into()),
        ValueRef::Real(f) => Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null),
        ValueRef::Text(t) => Value::String(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => match std::str::from_utf8(b) {
            Ok(s) => Value::String(s.to_string()),
            Err(_) => Value::Array(b.iter().map(|byte| Value::from(*byte)).collect()),
        },
    }
}

#[async_trait]
impl Backend for SqliteBackend {
    fn kind(&self) -> BackendKind {
        self.kind
    }

    async fn list_tables(&self) -> Result<Vec<String>, BackendError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT name FROM sqlite_master WHERE type='table'")?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(names)
    }

    async fn describe_columns(&self, table: &str) -> Result<Vec<ColumnDescriptor>, BackendError> {
        let conn = self.lock()?;
        let sql = format!("PRAGMA table_info({})", quote_ident(table));
        let mut stmt = conn.prepare(&sql)?;
        // cid, name, type, notnull, dflt_value, pk; rows come back in cid order
        let columns = stmt
            .query_map([], |row| {
                let not_null: i64 = row.get(3)?;
                Ok(ColumnDescriptor {
                    name: row.get(1)?,
                    data_type: row.get(2)?,
                    nullable: not_null == 0,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(columns)
    }

    async fn execute(&self, sql: &str) -> Result<Vec<Row>, BackendError> {
        let conn = self.lock()?;
        // one statement per call; anything after it is an error, not ignored
        let mut batch = Batch::new(&conn, sql);
        let mut stmt = match batch.next()? {
            Some(stmt) => stmt,
            None => return Err(BackendError::new("no SQL statement to execute")),
        };
        if batch.next()?.is_some() {
            return Err(BackendError::new(
                "You can only execute one statement at a time.",
            ));
        }

        let column_names: Vec<String> = stmt
            .column_names()
            .into_iter()
            .map(str::to_string)
            .collect();

        let mut rows = stmt.query([])?;
        let mut result = Vec::new();
        while let Some(row) = rows.next()? {
            let mut mapped = Row::new();
            for (i, name) in column_names.iter().enumerate() {
                mapped.insert(name.clone(), to_json(row.get_ref(i)?));
            }
            result.push(mapped);
        }
        Ok(result)
    }
}
