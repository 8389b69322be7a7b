use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One result-set row, keyed by column name in the order the engine reported them.
pub type Row = Map<String, Value>;

/// Table name to ordered column descriptors.
pub type SchemaDescriptor = BTreeMap<String, Vec<ColumnDescriptor>>;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: String,
    pub nullable: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Ko,
}

impl Language {
    pub fn code(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Ko => "ko",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl std::str::FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "en" => Ok(Language::En),
            "ko" => Ok(Language::Ko),
            other => Err(format!("unsupported language '{}', expected 'en' or 'ko'", other)),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct QueryRequest {
    pub question: String,
    #[serde(default)]
    pub language: Language,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct QueryResult {
    pub sql_query: String,
    pub result: Vec<Row>,
    pub explanation: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SchemaResponse {
    pub schema: SchemaDescriptor,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum HealthResponse {
    Healthy {
        status: String,
        database: String,
        db_type: String,
    },
    Unhealthy {
        status: String,
        error: String,
    },
}

impl HealthResponse {
    pub fn healthy(db_type: &str) -> Self {
        HealthResponse::Healthy {
            status: "healthy".to_string(),
            database: "connected".to_string(),
            db_type: db_type.to_string(),
        }
    }

    pub fn unhealthy(error: impl fmt::Display) -> Self {
        HealthResponse::Unhealthy {
            status: "unhealthy".to_string(),
            error: error.to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ErrorBody {
    pub detail: String,
}
