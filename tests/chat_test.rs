mod common;

use std::sync::Arc;

use common::{orchestrator, seed, ScriptedLlm};
use sqlchat::chat::{self, ChatOutcome, ChatSession, GatewayClient};
use sqlchat::gateway;
use sqlchat::types::Language;
use tokio::net::TcpListener;

async fn spawn_gateway(app: axum::Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

#[tokio::test]
async fn unreachable_gateway_falls_back_in_process() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("demo.db");
    seed(&db);
    let local = orchestrator(
        &db,
        ScriptedLlm::new(vec![Ok("SELECT name FROM t".into()), Ok("Names.".into())]),
    );
    let client = GatewayClient::new("http://127.0.0.1:1");

    assert!(!client.is_healthy().await);
    match chat::ask(&client, &local, "names", Language::En).await {
        ChatOutcome::Answered(result) => assert_eq!(result.result.len(), 3),
        other => panic!("expected an answer, got {:?}", other),
    }
}

#[tokio::test]
async fn in_process_failure_is_recorded_as_connection_error() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("demo.db");
    seed(&db);
    let local = orchestrator(&db, ScriptedLlm::new(vec![Ok("SELECT broken FROM t".into())]));
    let client = GatewayClient::new("http://127.0.0.1:1");

    let outcome = chat::ask(&client, &local, "q", Language::En).await;
    match outcome {
        ChatOutcome::Failed { error } => {
            assert!(error.starts_with("Connection error: SQL execution error:"), "{}", error)
        }
        other => panic!("expected a failure, got {:?}", other),
    }
}

#[tokio::test]
async fn answers_through_running_gateway() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("demo.db");
    seed(&db);

    let remote_llm = ScriptedLlm::new(vec![Ok("SELECT id FROM t".into()), Ok("Ids.".into())]);
    let url = spawn_gateway(gateway::router(Arc::new(orchestrator(&db, remote_llm.clone())))).await;

    let local_llm = ScriptedLlm::new(vec![]);
    let local = orchestrator(&db, local_llm.clone());
    let client = GatewayClient::new(&url);

    assert!(client.is_healthy().await);
    let schema = client.schema().await.unwrap().unwrap();
    assert_eq!(schema["t"].len(), 2);

    let mut session = ChatSession::new();
    let outcome = chat::ask(&client, &local, "ids", Language::En).await;
    let entry = session.record("ids", outcome);
    match &entry.result {
        ChatOutcome::Answered(result) => {
            assert_eq!(result.sql_query, "SELECT id FROM t");
            assert_eq!(result.explanation, "Ids.");
        }
        other => panic!("expected an answer, got {:?}", other),
    }
    assert_eq!(remote_llm.calls(), 2);
    assert_eq!(local_llm.calls(), 0);
}

#[tokio::test]
async fn gateway_rejection_keeps_history() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("demo.db");
    seed(&db);

    let remote_llm = ScriptedLlm::new(vec![
        Ok("SELECT name FROM t".into()),
        Ok("Names.".into()),
        Ok("SELECT missing FROM t".into()),
    ]);
    let url = spawn_gateway(gateway::router(Arc::new(orchestrator(&db, remote_llm)))).await;
    let local = orchestrator(&db, ScriptedLlm::new(vec![]));
    let client = GatewayClient::new(&url);

    let mut session = ChatSession::new();
    let first = chat::ask(&client, &local, "names", Language::En).await;
    session.record("names", first);
    let second = chat::ask(&client, &local, "missing", Language::En).await;
    session.record("missing", second);

    assert_eq!(session.len(), 2);
    assert!(!session.entries()[0].result.is_error());
    match &session.entries()[1].result {
        ChatOutcome::Failed { error } => {
            assert!(error.starts_with("API Error: 400 - "), "{}", error);
            assert!(error.contains("no such column: missing"));
        }
        other => panic!("expected a failure, got {:?}", other),
    }
}
