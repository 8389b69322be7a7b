use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::db::ConnectionResolver;
use crate::error::QueryError;
use crate::llm::{GenerationOptions, LlmProvider};
use crate::prompt;
use crate::schema;
use crate::types::{Language, QueryResult, Row};

/// Drives one question through schema lookup, SQL generation, execution and
/// explanation. Holds no per-request state.
#[derive(Clone)]
pub struct Orchestrator {
    resolver: ConnectionResolver,
    llm: Arc<dyn LlmProvider>,
    explainer: Arc<dyn LlmProvider>,
}

impl Orchestrator {
    pub fn new(resolver: ConnectionResolver, llm: Arc<dyn LlmProvider>) -> Self {
        Self {
            resolver,
            explainer: llm.clone(),
            llm,
        }
    }

    /// Use a different provider for the explanation call.
    pub fn with_explainer(mut self, explainer: Arc<dyn LlmProvider>) -> Self {
        self.explainer = explainer;
        self
    }

    pub fn resolver(&self) -> &ConnectionResolver {
        &self.resolver
    }

    pub async fn answer(&self, question: &str, language: Language) -> Result<QueryResult, QueryError> {
        let schema = schema::fetch(&self.resolver).await;
        if schema.is_empty() {
            return Err(QueryError::SchemaUnavailable);
        }

        let raw = self
            .llm
            .complete(&prompt::sql_prompt(question, &schema, language), &GenerationOptions::SQL)
            .await?;
        let sql = prompt::clean_sql(&raw);
        if sql.is_empty() {
            return Err(QueryError::Execution(
                "the generated SQL query is empty".to_string(),
            ));
        }
        debug!("generated SQL: {}", sql);

        let result = self.execute(&sql).await?;
        let explanation = self.explain(question, &sql, result.len(), language).await;

        Ok(QueryResult {
            sql_query: sql,
            result,
            explanation,
        })
    }

    /// Runs on a fresh connection; no timeout applies here.
    async fn execute(&self, sql: &str) -> Result<Vec<Row>, QueryError> {
        let backend = self.resolver.resolve().await?;
        let rows = backend.execute(sql).await?;
        info!("query on {} returned {} rows", backend.kind(), rows.len());
        Ok(rows)
    }

    async fn explain(&self, question: &str, sql: &str, row_count: usize, language: Language) -> String {
        let prompt = prompt::explanation_prompt(question, sql, row_count, language);
        match self.explainer.complete(&prompt, &GenerationOptions::EXPLANATION).await {
            Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
            Ok(_) => {
                warn!("empty explanation from {}, using fallback", self.explainer.name());
                prompt::fallback_explanation(question, row_count, language)
            }
            Err(e) => {
                warn!("explanation failed: {}", e);
                prompt::fallback_explanation(question, row_count, language)
            }
        }
    }
}
