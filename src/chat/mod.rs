//! Session-scoped chat history and the terminal front-end that owns it.
//!
//! A `ChatSession` lives exactly as long as one interactive session. Entries
//! are appended for every submitted question, whether it succeeded or not,
//! and are only removed by `clear`.

pub mod client;
pub mod terminal;

use chrono::Local;
use serde::Serialize;

use crate::types::QueryResult;

pub use client::{ask, GatewayClient, GatewayReply};

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum ChatOutcome {
    Answered(QueryResult),
    Failed { error: String },
}

impl ChatOutcome {
    pub fn failed(message: impl Into<String>) -> Self {
        ChatOutcome::Failed {
            error: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ChatOutcome::Failed { .. })
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ChatEntry {
    pub timestamp: String,
    pub question: String,
    pub result: ChatOutcome,
}

#[derive(Debug, Default)]
pub struct ChatSession {
    entries: Vec<ChatEntry>,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, question: &str, result: ChatOutcome) -> &ChatEntry {
        let timestamp = Local::now().format("%H:%M:%S").to_string();
        self.entries.push(ChatEntry {
            timestamp,
            question: question.to_string(),
            result,
        });
        &self.entries[self.entries.len() - 1]
    }

    /// Oldest first.
    pub fn entries(&self) -> &[ChatEntry] {
        &self.entries
    }

    pub fn latest_first(&self) -> impl Iterator<Item = &ChatEntry> {
        self.entries.iter().rev()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
