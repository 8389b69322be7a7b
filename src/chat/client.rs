use std::time::Duration;

use reqwest::StatusCode;
use tracing::warn;

use super::terminal::UiText;
use super::ChatOutcome;
use crate::error::QueryError;
use crate::orchestrator::Orchestrator;
use crate::schema;
use crate::types::{Language, QueryRequest, QueryResult, SchemaDescriptor, SchemaResponse};

const HEALTH_TIMEOUT: Duration = Duration::from_secs(5);
const SCHEMA_TIMEOUT: Duration = Duration::from_secs(10);
const QUERY_TIMEOUT: Duration = Duration::from_secs(30);

/// Talks to a running gateway over HTTP.
pub struct GatewayClient {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Debug)]
pub enum GatewayReply {
    Answered(QueryResult),
    Rejected { status: StatusCode, body: String },
}

impl GatewayClient {
    pub fn new(base_url: &str) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();
        // a gateway on this machine is never reached through a proxy
        let builder = if is_loopback(&base_url) {
            reqwest::Client::builder().no_proxy()
        } else {
            reqwest::Client::builder()
        };
        Self {
            base_url,
            client: builder.build().unwrap_or_default(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn is_healthy(&self) -> bool {
        match self
            .client
            .get(self.url("/health"))
            .timeout(HEALTH_TIMEOUT)
            .send()
            .await
        {
            Ok(resp) => resp.status() == StatusCode::OK,
            Err(_) => false,
        }
    }

    /// `Ok(None)` when the gateway answered with a non-success status.
    pub async fn schema(&self) -> Result<Option<SchemaDescriptor>, reqwest::Error> {
        let resp = self
            .client
            .get(self.url("/schema"))
            .timeout(SCHEMA_TIMEOUT)
            .send()
            .await?;
        if !resp.status().is_success() {
            return Ok(None);
        }
        let body: SchemaResponse = resp.json().await?;
        Ok(Some(body.schema))
    }

    pub async fn query(&self, question: &str, language: Language) -> Result<GatewayReply, reqwest::Error> {
        let request = QueryRequest {
            question: question.to_string(),
            language,
        };
        let resp = self
            .client
            .post(self.url("/query"))
            .timeout(QUERY_TIMEOUT)
            .json(&request)
            .send()
            .await?;

        let status = resp.status();
        if status == StatusCode::OK {
            Ok(GatewayReply::Answered(resp.json().await?))
        } else {
            let body = resp.text().await.unwrap_or_default();
            Ok(GatewayReply::Rejected { status, body })
        }
    }
}

fn is_loopback(url: &str) -> bool {
    let rest = url.split_once("://").map(|(_, r)| r).unwrap_or(url);
    let host = rest.split(['/', ':']).next().unwrap_or_default();
    matches!(host, "localhost" | "127.0.0.1")
}

/// Schema for display: from the gateway, or straight from the database when
/// the gateway cannot be reached.
pub async fn schema_for_display(
    client: &GatewayClient,
    local: &Orchestrator,
) -> Option<SchemaDescriptor> {
    match client.schema().await {
        Ok(schema) => schema,
        Err(e) => {
            warn!("schema request failed, reading directly: {}", e);
            Some(schema::fetch(local.resolver()).await)
        }
    }
}

/// Ask through the gateway. If it cannot be reached at all, answer in-process.
pub async fn ask(
    client: &GatewayClient,
    local: &Orchestrator,
    question: &str,
    language: Language,
) -> ChatOutcome {
    let text = UiText::for_language(language);
    match client.query(question, language).await {
        Ok(GatewayReply::Answered(result)) => ChatOutcome::Answered(result),
        Ok(GatewayReply::Rejected { status, body }) => {
            ChatOutcome::failed(format!("API Error: {} - {}", status.as_u16(), body))
        }
        Err(e) if e.is_timeout() => ChatOutcome::failed(text.timeout),
        Err(e) => {
            warn!("gateway unreachable, answering directly: {}", e);
            match local.answer(question, language).await {
                Ok(result) => ChatOutcome::Answered(result),
                Err(QueryError::SchemaUnavailable) => {
                    ChatOutcome::failed(QueryError::SchemaUnavailable.to_string())
                }
                Err(err) => ChatOutcome::failed(format!("{}: {}", text.connection_error, err)),
            }
        }
    }
}
