#![allow(dead_code)]

use std::collections::VecDeque;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use sqlchat::llm::{GenerationOptions, LlmProvider};
use sqlchat::{ConnectionResolver, DeploymentMode, LlmError, Orchestrator};

/// Replays canned replies in order and records every call.
#[derive(Default)]
pub struct ScriptedLlm {
    replies: Mutex<VecDeque<Result<String, LlmError>>>,
    calls: AtomicUsize,
    seen: Mutex<Vec<(String, GenerationOptions)>>,
}

impl ScriptedLlm {
    pub fn new(replies: Vec<Result<String, LlmError>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            ..Default::default()
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<(String, GenerationOptions)> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmProvider for ScriptedLlm {
    async fn complete(&self, prompt: &str, options: &GenerationOptions) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push((prompt.to_string(), *options));
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::ProviderUnavailable("script exhausted".into())))
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

pub fn local_resolver(path: &Path) -> ConnectionResolver {
    ConnectionResolver::new(None, DeploymentMode::Local, path, Duration::from_secs(1))
}

pub fn orchestrator(path: &Path, llm: Arc<ScriptedLlm>) -> Orchestrator {
    Orchestrator::new(local_resolver(path), llm)
}

/// Creates `t(id, name)` with three rows.
pub fn seed(path: &Path) {
    let conn = rusqlite::Connection::open(path).unwrap();
    conn.execute_batch(
        "CREATE TABLE t (id INTEGER PRIMARY KEY, name TEXT NOT NULL);
         INSERT INTO t (id, name) VALUES (1, 'alpha'), (2, 'beta'), (3, 'gamma');",
    )
    .unwrap();
}
