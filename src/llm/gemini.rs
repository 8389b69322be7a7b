//! Google Gemini `generateContent` provider.

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{GenerationOptions, LlmError, LlmProvider};

const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

pub struct GeminiProvider {
    api_key: Option<String>,
    model: String,
    client: reqwest::Client,
}

impl GeminiProvider {
    pub fn new(api_key: Option<String>, model: &str) -> Self {
        Self {
            api_key: api_key.filter(|k| !k.is_empty()),
            model: model.to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn request_body(prompt: &str, options: &GenerationOptions) -> Value {
        json!({
            "contents": [{"parts": [{"text": prompt}]}],
            "generationConfig": {
                "temperature": options.temperature,
                "maxOutputTokens": options.max_output_tokens,
                "topP": options.top_p,
            }
        })
    }

    pub fn parse_response(json: &Value) -> Result<String, LlmError> {
        json.pointer("/candidates/0/content/parts/0/text")
            .and_then(|v| v.as_str())
            .map(|s| s.trim().to_string())
            .ok_or_else(|| LlmError::Parse("missing candidates[0].content.parts[0].text".to_string()))
    }
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    async fn complete(&self, prompt: &str, options: &GenerationOptions) -> Result<String, LlmError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| LlmError::Config("GEMINI_API_KEY is not set".to_string()))?;

        let url = format!("{}/models/{}:generateContent", BASE_URL, self.model);

        let resp = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&Self::request_body(prompt, options))
            .send()
            .await
            .map_err(|e| LlmError::ProviderUnavailable(format!("gemini: {}", e)))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            let truncated: String = body.chars().take(200).collect();
            return Err(LlmError::Http(format!("gemini HTTP {}: {}", status, truncated)));
        }

        let json: Value = resp.json().await?;
        Self::parse_response(&json)
    }

    fn name(&self) -> &str {
        "gemini"
    }
}
