mod common;

use common::{orchestrator, seed, ScriptedLlm};
use serde_json::json;
use sqlchat::llm::GenerationOptions;
use sqlchat::types::Language;
use sqlchat::{LlmError, QueryError};

#[tokio::test]
async fn answers_show_all_rows() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("demo.db");
    seed(&db);

    let llm = ScriptedLlm::new(vec![
        Ok("```sql\nSELECT id, name FROM t ORDER BY id;\n```".into()),
        Ok("Lists every row of t.".into()),
    ]);
    let result = orchestrator(&db, llm.clone())
        .answer("show all rows in table T", Language::En)
        .await
        .unwrap();

    assert_eq!(result.sql_query, "SELECT id, name FROM t ORDER BY id;");
    assert_eq!(result.result.len(), 3);
    for row in &result.result {
        let keys: Vec<_> = row.keys().map(String::as_str).collect();
        assert_eq!(keys, ["id", "name"]);
    }
    assert_eq!(result.result[0]["id"], json!(1));
    assert_eq!(result.result[2]["name"], json!("gamma"));
    assert_eq!(result.explanation, "Lists every row of t.");
    assert_eq!(llm.calls(), 2);
}

#[tokio::test]
async fn prompts_carry_schema_count_and_sampling() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("demo.db");
    seed(&db);

    let llm = ScriptedLlm::new(vec![
        Ok("SELECT name FROM t WHERE id > 1".into()),
        Ok("Two names.".into()),
    ]);
    orchestrator(&db, llm.clone())
        .answer("names after the first", Language::En)
        .await
        .unwrap();

    let prompts = llm.prompts();
    let (sql_prompt, sql_opts) = &prompts[0];
    assert!(sql_prompt.contains("Table: t"));
    assert!(sql_prompt.contains("  - id (INTEGER)\n  - name (TEXT)"));
    assert!(sql_prompt.contains("Question: names after the first"));
    assert_eq!(*sql_opts, GenerationOptions::SQL);

    let (explain_prompt, explain_opts) = &prompts[1];
    assert!(explain_prompt.contains("Number of results: 2"));
    assert!(!explain_prompt.contains("beta"));
    assert_eq!(*explain_opts, GenerationOptions::EXPLANATION);
}

#[tokio::test]
async fn empty_schema_makes_no_llm_calls() {
    let dir = tempfile::tempdir().unwrap();
    let llm = ScriptedLlm::new(vec![Ok("SELECT 1".into())]);

    let err = orchestrator(&dir.path().join("empty.db"), llm.clone())
        .answer("anything", Language::En)
        .await
        .unwrap_err();

    assert!(matches!(err, QueryError::SchemaUnavailable));
    assert_eq!(llm.calls(), 0);
}

#[tokio::test]
async fn generation_failure_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("demo.db");
    seed(&db);

    let llm = ScriptedLlm::new(vec![Err(LlmError::Http("gemini HTTP 503".into()))]);
    let err = orchestrator(&db, llm.clone())
        .answer("show all rows", Language::En)
        .await
        .unwrap_err();

    assert!(matches!(err, QueryError::Generation(_)));
    assert!(err.to_string().contains("503"));
    assert_eq!(llm.calls(), 1);
}

#[tokio::test]
async fn invalid_sql_surfaces_engine_message() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("demo.db");
    seed(&db);

    let llm = ScriptedLlm::new(vec![Ok("SELEC name FROM t".into())]);
    let err = orchestrator(&db, llm.clone())
        .answer("show names", Language::En)
        .await
        .unwrap_err();

    match err {
        QueryError::Execution(message) => assert!(message.contains("syntax error"), "{}", message),
        other => panic!("expected execution error, got {:?}", other),
    }
    assert_eq!(llm.calls(), 1);
}

#[tokio::test]
async fn missing_table_is_execution_error() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("demo.db");
    seed(&db);

    let llm = ScriptedLlm::new(vec![Ok("SELECT * FROM employees".into())]);
    let err = orchestrator(&db, llm)
        .answer("show employees", Language::En)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("no such table: employees"));
}

#[tokio::test]
async fn empty_explanation_uses_fallback() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("demo.db");
    seed(&db);

    let llm = ScriptedLlm::new(vec![Ok("SELECT * FROM t".into()), Ok("   ".into())]);
    let result = orchestrator(&db, llm)
        .answer("show all rows in table T", Language::En)
        .await
        .unwrap();

    assert_eq!(
        result.explanation,
        "This query searches the database to answer 'show all rows in table T'. It returned 3 results."
    );
}

#[tokio::test]
async fn failed_explanation_uses_localized_fallback() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("demo.db");
    seed(&db);

    let llm = ScriptedLlm::new(vec![
        Ok("SELECT * FROM t WHERE id = 2".into()),
        Err(LlmError::ProviderUnavailable("gemini: timed out".into())),
    ]);
    let result = orchestrator(&db, llm)
        .answer("두 번째 행", Language::Ko)
        .await
        .unwrap();

    assert_eq!(result.result.len(), 1);
    assert!(!result.explanation.is_empty());
    assert!(result.explanation.contains("'두 번째 행'"));
    assert!(result.explanation.contains("1개"));
}

#[tokio::test]
async fn korean_requests_use_korean_template() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("demo.db");
    seed(&db);

    let llm = ScriptedLlm::new(vec![Ok("SELECT COUNT(*) AS n FROM t".into()), Ok("세 개".into())]);
    let result = orchestrator(&db, llm.clone())
        .answer("행이 몇 개인가요?", Language::Ko)
        .await
        .unwrap();

    assert_eq!(result.result[0]["n"], json!(3));
    let prompts = llm.prompts();
    assert!(prompts[0].0.contains("질문: 행이 몇 개인가요?"));
    assert!(prompts[1].0.contains("결과 개수: 1"));
}

#[tokio::test]
async fn fences_only_reply_is_execution_error() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("demo.db");
    seed(&db);

    let llm = ScriptedLlm::new(vec![Ok("```sql\n   \n```".into())]);
    let err = orchestrator(&db, llm.clone())
        .answer("show all rows", Language::En)
        .await
        .unwrap_err();

    match err {
        QueryError::Execution(message) => assert_eq!(message, "the generated SQL query is empty"),
        other => panic!("expected execution error, got {:?}", other),
    }
    assert_eq!(llm.calls(), 1);
}

#[tokio::test]
async fn multiple_statements_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("demo.db");
    seed(&db);

    let llm = ScriptedLlm::new(vec![Ok("SELECT 1; SELECT 2".into())]);
    let err = orchestrator(&db, llm.clone())
        .answer("two things", Language::En)
        .await
        .unwrap_err();

    assert!(matches!(err, QueryError::Execution(_)));
    assert_eq!(
        err.to_string(),
        "SQL execution error: You can only execute one statement at a time."
    );
    assert_eq!(llm.calls(), 1);
}

#[tokio::test]
async fn separate_explainer_handles_explanation() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("demo.db");
    seed(&db);

    let sql_llm = ScriptedLlm::new(vec![Ok("SELECT name FROM t".into())]);
    let explainer = ScriptedLlm::new(vec![Ok("Three names.".into())]);
    let result = orchestrator(&db, sql_llm.clone())
        .with_explainer(explainer.clone())
        .answer("names", Language::En)
        .await
        .unwrap();

    assert_eq!(result.explanation, "Three names.");
    assert_eq!(sql_llm.calls(), 1);
    assert_eq!(explainer.calls(), 1);
    assert_eq!(explainer.prompts()[0].1, GenerationOptions::EXPLANATION);
}
