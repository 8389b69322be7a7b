use std::fmt::Write as _;

use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use serde_json::Value;

use super::client::{ask, schema_for_display, GatewayClient};
use super::{ChatEntry, ChatOutcome, ChatSession};
use crate::orchestrator::Orchestrator;
use crate::types::{Language, Row, SchemaDescriptor};

pub struct UiText {
    pub title: &'static str,
    pub subtitle: &'static str,
    pub api_connected: &'static str,
    pub direct_mode: &'static str,
    pub db_schema: &'static str,
    pub schema_error: &'static str,
    pub sample_questions: &'static str,
    pub samples: &'static [&'static str],
    pub thinking: &'static str,
    pub chat_history: &'static str,
    pub question: &'static str,
    pub generated_sql: &'static str,
    pub explanation: &'static str,
    pub result: &'static str,
    pub error: &'static str,
    pub no_results: &'static str,
    pub history_cleared: &'static str,
    pub help: &'static str,
    pub timeout: &'static str,
    pub connection_error: &'static str,
}

static EN: UiText = UiText {
    title: "Text-to-SQL Chatbot Demo",
    subtitle: "Ask questions in natural language and get SQL queries with results.",
    api_connected: "API Server Connected",
    direct_mode: "Direct mode (API server unreachable)",
    db_schema: "Database Schema",
    schema_error: "Unable to retrieve schema information.",
    sample_questions: "Sample Questions",
    samples: &[
        "Show me all employee names and salaries",
        "Who are the employees in Computer Science department?",
        "Who is the highest paid employee?",
        "What is the average salary by department?",
        "Show me current ongoing projects",
        "What is the average GPA of students?",
        "Show me information about Mathematics students",
    ],
    thinking: "Generating SQL query and executing...",
    chat_history: "Chat History",
    question: "Question",
    generated_sql: "Generated SQL Query",
    explanation: "Explanation",
    result: "Result",
    error: "Error",
    no_results: "No results found.",
    history_cleared: "Chat history cleared.",
    help: "Type a question, a sample number, :history, :clear or :quit.",
    timeout: "Request timeout. Please try again.",
    connection_error: "Connection error",
};

static KO: UiText = UiText {
    title: "Text-to-SQL 챗봇 데모",
    subtitle: "자연어로 질문하면 SQL 쿼리를 생성하고 결과를 보여드립니다.",
    api_connected: "API 서버 연결됨",
    direct_mode: "직접 모드 (API 서버 연결 실패)",
    db_schema: "데이터베이스 스키마",
    schema_error: "스키마 정보를 가져올 수 없습니다.",
    sample_questions: "예시 질문들",
    samples: &[
        "모든 직원의 이름과 급여를 보여주세요",
        "컴퓨터 과학과에 속한 직원들은 누구인가요?",
        "가장 높은 급여를 받는 직원은 누구인가요?",
        "각 부서별 평균 급여는 얼마인가요?",
        "현재 진행 중인 프로젝트들을 보여주세요",
        "학생들의 평균 GPA는 얼마인가요?",
        "수학과 학생들의 정보를 보여주세요",
    ],
    thinking: "SQL 쿼리를 생성하고 실행 중...",
    chat_history: "대화 기록",
    question: "질문",
    generated_sql: "생성된 SQL 쿼리",
    explanation: "설명",
    result: "결과",
    error: "오류",
    no_results: "결과가 없습니다.",
    history_cleared: "대화 기록을 지웠습니다.",
    help: "질문, 예시 번호, :history, :clear 또는 :quit 을 입력하세요.",
    timeout: "요청 시간이 초과되었습니다. 다시 시도해주세요.",
    connection_error: "연결 오류",
};

impl UiText {
    pub fn for_language(language: Language) -> &'static UiText {
        match language {
            Language::En => &EN,
            Language::Ko => &KO,
        }
    }
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Fixed-width text table; column order follows the first row.
pub fn render_rows(rows: &[Row]) -> String {
    let Some(first) = rows.first() else {
        return String::new();
    };
    let headers: Vec<&String> = first.keys().collect();
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            headers
                .iter()
                .map(|h| row.get(h.as_str()).map(cell_text).unwrap_or_default())
                .collect()
        })
        .collect();

    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| {
            cells
                .iter()
                .map(|r| r[i].chars().count())
                .chain(std::iter::once(h.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let line = |values: Vec<&str>| -> String {
        values
            .iter()
            .zip(&widths)
            .map(|(v, w)| format!("{:<width$}", v, width = *w))
            .collect::<Vec<_>>()
            .join(" | ")
            .trim_end()
            .to_string()
    };

    let mut out = String::new();
    let _ = writeln!(out, "{}", line(headers.iter().map(|h| h.as_str()).collect()));
    let _ = writeln!(
        out,
        "{}",
        widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>().join("-+-")
    );
    for row in &cells {
        let _ = writeln!(out, "{}", line(row.iter().map(String::as_str).collect()));
    }
    out
}

pub fn render_entry(entry: &ChatEntry, text: &UiText) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "[{}] {}: {}", entry.timestamp, text.question, entry.question);
    match &entry.result {
        ChatOutcome::Failed { error } => {
            let _ = writeln!(out, "{}: {}", text.error, error);
        }
        ChatOutcome::Answered(result) => {
            let _ = writeln!(out, "{}:\n  {}", text.generated_sql, result.sql_query);
            let _ = writeln!(out, "{}:\n  {}", text.explanation, result.explanation);
            let _ = writeln!(out, "{}:", text.result);
            if result.result.is_empty() {
                let _ = writeln!(out, "  {}", text.no_results);
            } else {
                out.push_str(&render_rows(&result.result));
            }
        }
    }
    out
}

pub fn render_schema(schema: Option<&SchemaDescriptor>, text: &UiText) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", text.db_schema);
    match schema {
        Some(schema) if !schema.is_empty() => {
            for (table, columns) in schema {
                let _ = writeln!(out, "  {}", table);
                for col in columns {
                    let _ = writeln!(out, "    - {} ({})", col.name, col.data_type);
                }
            }
        }
        _ => {
            let _ = writeln!(out, "  {}", text.schema_error);
        }
    }
    out
}

/// A bare number picks the matching sample question.
fn pick_question(input: &str, text: &UiText) -> String {
    input
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| text.samples.get(i))
        .map(|s| s.to_string())
        .unwrap_or_else(|| input.to_string())
}

pub async fn run(
    api_url: &str,
    language: Language,
    local: &Orchestrator,
) -> anyhow::Result<()> {
    let text = UiText::for_language(language);
    let client = GatewayClient::new(api_url);

    println!("{}\n{}\n", text.title, text.subtitle);
    if client.is_healthy().await {
        println!("{}", text.api_connected);
    } else {
        println!("{}", text.direct_mode);
    }
    let schema = schema_for_display(&client, local).await;
    println!("{}", render_schema(schema.as_ref(), text));

    println!("{}", text.sample_questions);
    for (i, sample) in text.samples.iter().enumerate() {
        println!("  {}. {}", i + 1, sample);
    }
    println!("\n{}", text.help);

    let mut editor = DefaultEditor::new()?;
    let mut session = ChatSession::new();

    loop {
        let line = match editor.readline("> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        let _ = editor.add_history_entry(input);

        match input {
            ":quit" | ":q" => break,
            ":clear" => {
                session.clear();
                println!("{}", text.history_cleared);
            }
            ":history" => {
                println!("{}", text.chat_history);
                for entry in session.latest_first() {
                    println!("{}", render_entry(entry, text));
                }
            }
            _ => {
                let question = pick_question(input, text);
                println!("{}", text.thinking);
                let outcome = ask(&client, local, &question, language).await;
                let entry = session.record(&question, outcome);
                println!("{}", render_entry(entry, text));
            }
        }
    }
    Ok(())
}
