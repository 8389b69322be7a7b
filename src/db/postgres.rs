use std::error::Error;
use std::fmt::Write as _;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use native_tls::TlsConnector;
use postgres_native_tls::MakeTlsConnector;
use serde_json::{Number, Value};
use tokio_postgres::config::SslMode;
use tokio_postgres::types::{FromSql, Kind, Type};
use tokio_postgres::Client;
use tracing::{debug, info};

use super::{Backend, BackendKind};
use crate::error::{BackendError, ConnectionError};
use crate::types::{ColumnDescriptor, Row};

const LIST_TABLES: &str =
    "SELECT table_name::text FROM information_schema.tables WHERE table_schema = 'public'";

const DESCRIBE_COLUMNS: &str = "SELECT column_name::text, data_type::text, is_nullable::text \
     FROM information_schema.columns \
     WHERE table_schema = 'public' AND table_name = $1 \
     ORDER BY ordinal_position";

pub struct PostgresBackend {
    client: Client,
}

/// `sslmode=require`: the link is encrypted, the certificate is not checked.
fn require_tls() -> Result<MakeTlsConnector, ConnectionError> {
    let connector = TlsConnector::builder()
        .danger_accept_invalid_certs(true)
        .danger_accept_invalid_hostnames(true)
        .build()
        .map_err(|e| ConnectionError::Tls(e.to_string()))?;
    Ok(MakeTlsConnector::new(connector))
}

impl PostgresBackend {
    /// Open an encrypted connection and probe it with `SELECT 1`.
    pub async fn connect(url: &str, timeout: Duration) -> Result<Self, ConnectionError> {
        let mut config: tokio_postgres::Config = url
            .parse()
            .map_err(|e: tokio_postgres::Error| ConnectionError::Server(e.into()))?;
        config.ssl_mode(SslMode::Require);
        config.connect_timeout(timeout);

        let tls = require_tls()?;

        let (client, connection) = tokio::time::timeout(timeout, config.connect(tls))
            .await
            .map_err(|_| ConnectionError::Timeout(timeout.as_secs()))?
            .map_err(|e| ConnectionError::Server(e.into()))?;

        tokio::spawn(async move {
            if let Err(e) = connection.await {
                debug!("postgres connection closed with error: {}", e);
            }
        });

        client
            .simple_query("SELECT 1")
            .await
            .map_err(|e| ConnectionError::Server(e.into()))?;

        info!("connected to PostgreSQL");
        Ok(Self { client })
    }
}

/// information_schema reports nullability as the text `YES` or `NO`.
fn nullable_from_flag(flag: &str) -> bool {
    flag.eq_ignore_ascii_case("YES")
}

#[async_trait]
impl Backend for PostgresBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Server
    }

    async fn list_tables(&self) -> Result<Vec<String>, BackendError> {
        let rows = self.client.query(LIST_TABLES, &[]).await?;
        rows.iter()
            .map(|row| row.try_get::<_, String>(0).map_err(BackendError::from))
            .collect()
    }

    async fn describe_columns(&self, table: &str) -> Result<Vec<ColumnDescriptor>, BackendError> {
        let rows = self.client.query(DESCRIBE_COLUMNS, &[&table]).await?;
        rows.iter()
            .map(|row| -> Result<ColumnDescriptor, BackendError> {
                let flag: String = row.try_get(2)?;
                Ok(ColumnDescriptor {
                    name: row.try_get(0)?,
                    data_type: row.try_get(1)?,
                    nullable: nullable_from_flag(&flag),
                })
            })
            .collect()
    }

    async fn execute(&self, sql: &str) -> Result<Vec<Row>, BackendError> {
        let rows = self.client.query(sql, &[]).await?;
        let mut result = Vec::with_capacity(rows.len());
        for row in &rows {
            let mut mapped = Row::new();
            for (i, column) in row.columns().iter().enumerate() {
                let Cell(value) = row.try_get(i)?;
                mapped.insert(column.name().to_string(), value);
            }
            result.push(mapped);
        }
        Ok(result)
    }
}

type BoxError = Box<dyn Error + Sync + Send>;

/// Any column value, converted to JSON.
struct Cell(Value);

impl<'a> FromSql<'a> for Cell {
    fn from_sql(ty: &Type, raw: &'a [u8]) -> Result<Self, BoxError> {
        let value = match *ty {
            Type::BOOL => Value::Bool(bool::from_sql(ty, raw)?),
            Type::INT2 => i16::from_sql(ty, raw)?.into(),
            Type::INT4 => i32::from_sql(ty, raw)?.into(),
            Type::INT8 => i64::from_sql(ty, raw)?.into(),
            Type::OID => u32::from_sql(ty, raw)?.into(),
            Type::FLOAT4 => float(f64::from(f32::from_sql(ty, raw)?)),
            Type::FLOAT8 => float(f64::from_sql(ty, raw)?),
            Type::NUMERIC => numeric_value(&decode_numeric(raw)?),
            Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME | Type::UNKNOWN => {
                Value::String(String::from_sql(ty, raw)?)
            }
            Type::JSON | Type::JSONB => Value::from_sql(ty, raw)?,
            Type::TIMESTAMP => Value::String(
                NaiveDateTime::from_sql(ty, raw)?
                    .format("%Y-%m-%dT%H:%M:%S%.f")
                    .to_string(),
            ),
            Type::TIMESTAMPTZ => Value::String(DateTime::<Utc>::from_sql(ty, raw)?.to_rfc3339()),
            Type::DATE => Value::String(NaiveDate::from_sql(ty, raw)?.to_string()),
            Type::TIME => Value::String(NaiveTime::from_sql(ty, raw)?.to_string()),
            Type::UUID => Value::String(format_uuid(raw)?),
            Type::BYTEA => Value::Array(raw.iter().map(|b| Value::from(*b)).collect()),
            _ => match ty.kind() {
                // enum labels travel as plain text
                Kind::Enum(_) => Value::String(String::from_utf8_lossy(raw).into_owned()),
                _ => match std::str::from_utf8(raw) {
                    Ok(s) => Value::String(s.to_string()),
                    Err(_) => Value::Null,
                },
            },
        };
        Ok(Cell(value))
    }

    fn from_sql_null(_: &Type) -> Result<Self, BoxError> {
        Ok(Cell(Value::Null))
    }

    fn accepts(_: &Type) -> bool {
        true
    }
}

fn float(f: f64) -> Value {
    Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null)
}

fn numeric_value(text: &str) -> Value {
    if !text.contains('.') {
        if let Ok(i) = text.parse::<i64>() {
            return i.into();
        }
    }
    match text.parse::<f64>().ok().and_then(Number::from_f64) {
        Some(n) => Value::Number(n),
        None => Value::String(text.to_string()),
    }
}

/// Decode the binary NUMERIC wire format into its decimal text.
fn decode_numeric(raw: &[u8]) -> Result<String, BoxError> {
    if raw.len() < 8 {
        return Err("numeric value too short".into());
    }
    let word = |at: usize| u16::from_be_bytes([raw[at], raw[at + 1]]);
    let ndigits = word(0) as usize;
    let weight = word(2) as i16 as i32;
    let sign = word(4);
    let dscale = word(6) as usize;
    if raw.len() < 8 + ndigits * 2 {
        return Err("numeric value truncated".into());
    }

    match sign {
        0xC000 => return Ok("NaN".to_string()),
        0xD000 => return Ok("Infinity".to_string()),
        0xF000 => return Ok("-Infinity".to_string()),
        _ => {}
    }

    // base-10000 digit at index j, zero outside the stored range
    let digit = |j: i32| -> u16 {
        if j >= 0 && (j as usize) < ndigits {
            word(8 + 2 * j as usize)
        } else {
            0
        }
    };

    let mut out = String::new();
    if sign == 0x4000 {
        out.push('-');
    }
    if weight < 0 {
        out.push('0');
    } else {
        for j in 0..=weight {
            if j == 0 {
                write!(out, "{}", digit(j))?;
            } else {
                write!(out, "{:04}", digit(j))?;
            }
        }
    }
    if dscale > 0 {
        let mut frac = String::new();
        let mut j = weight + 1;
        while frac.len() < dscale {
            write!(frac, "{:04}", digit(j))?;
            j += 1;
        }
        frac.truncate(dscale);
        out.push('.');
        out.push_str(&frac);
    }
    Ok(out)
}

fn format_uuid(raw: &[u8]) -> Result<String, BoxError> {
    if raw.len() != 16 {
        return Err("uuid must be 16 bytes".into());
    }
    let hex: String = raw.iter().map(|b| format!("{:02x}", b)).collect();
    Ok(format!(
        "{}-{}-{}-{}-{}",
        &hex[0..8],
        &hex[8..12],
        &hex[12..16],
        &hex[16..20],
        &hex[20..32]
    ))
}
