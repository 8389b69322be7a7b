//! Hosted text generation behind a provider trait.

pub mod gemini;

use async_trait::async_trait;

pub use crate::error::LlmError;
pub use gemini::GeminiProvider;

/// Sampling settings for one generation call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationOptions {
    pub temperature: f32,
    pub max_output_tokens: u32,
    pub top_p: f32,
}

impl GenerationOptions {
    /// Near-deterministic, sized for a single SQL statement.
    pub const SQL: GenerationOptions = GenerationOptions {
        temperature: 0.1,
        max_output_tokens: 500,
        top_p: 0.8,
    };

    /// A little looser, sized for a short paragraph.
    pub const EXPLANATION: GenerationOptions = GenerationOptions {
        temperature: 0.3,
        max_output_tokens: 300,
        top_p: 0.8,
    };
}

#[async_trait]
pub trait LlmProvider: Send + Sync {
    async fn complete(&self, prompt: &str, options: &GenerationOptions) -> Result<String, LlmError>;

    fn name(&self) -> &str;
}
