//! Prompt templates and post-processing of model output.

use crate::schema;
use crate::types::{Language, SchemaDescriptor};

pub fn sql_prompt(question: &str, schema: &SchemaDescriptor, language: Language) -> String {
    let schema_text = schema::render(schema);
    match language {
        Language::Ko => format!(
            "\n당신은 SQL 전문가입니다. 다음 데이터베이스 스키마와 자연어 질문을 보고 유효한 SQL 쿼리를 생성하세요.\n\
             \n\
             데이터베이스 스키마:\n\
             {schema_text}\n\
             \n\
             질문: {question}\n\
             \n\
             규칙:\n\
             1. SQL 쿼리만 생성하고 설명은 하지 마세요\n\
             2. 적절한 SQL 문법을 사용하세요\n\
             3. 테이블과 컬럼 이름을 정확히 사용하세요\n\
             4. 필요시 적절한 JOIN을 사용하세요\n\
             5. 마크다운 포맷 없이 SQL 쿼리만 반환하세요\n\
             \n\
             SQL 쿼리:\n"
        ),
        Language::En => format!(
            "\nYou are a SQL expert. Given the following database schema and a natural language question,\n\
             generate a valid SQL query.\n\
             \n\
             Database Schema:\n\
             {schema_text}\n\
             \n\
             Question: {question}\n\
             \n\
             Rules:\n\
             1. Generate only the SQL query, no explanations\n\
             2. Use proper SQL syntax\n\
             3. Be precise with table and column names\n\
             4. Use appropriate JOINs when needed\n\
             5. Return only the SQL query without any markdown formatting\n\
             \n\
             SQL Query:\n"
        ),
    }
}

/// Only the row count is sent back to the model, never the rows.
pub fn explanation_prompt(question: &str, sql: &str, row_count: usize, language: Language) -> String {
    match language {
        Language::Ko => format!(
            "\n다음 SQL 쿼리를 간단한 용어로 설명해주세요:\n\
             \n\
             질문: {question}\n\
             SQL 쿼리: {sql}\n\
             결과 개수: {row_count}\n\
             \n\
             쿼리가 무엇을 하는지, 결과가 무엇을 보여주는지 간단하고 명확하게 설명해주세요.\n\
             마크다운 형식 없이 일반 텍스트로만 답변해주세요.\n"
        ),
        Language::En => format!(
            "\nExplain this SQL query in simple terms:\n\
             \n\
             Question: {question}\n\
             SQL Query: {sql}\n\
             Number of results: {row_count}\n\
             \n\
             Provide a brief, clear explanation of what the query does and what the results show.\n\
             Answer in plain text without any markdown formatting.\n"
        ),
    }
}

/// Used whenever the explanation call fails or comes back empty.
pub fn fallback_explanation(question: &str, row_count: usize, language: Language) -> String {
    match language {
        Language::Ko => format!(
            "이 쿼리는 '{}' 질문에 대한 답을 찾기 위해 데이터베이스를 검색합니다. 총 {}개의 결과를 반환했습니다.",
            question, row_count
        ),
        Language::En => format!(
            "This query searches the database to answer '{}'. It returned {} results.",
            question, row_count
        ),
    }
}

/// Remove markdown code fences and surrounding whitespace from model output.
pub fn clean_sql(raw: &str) -> String {
    raw.trim()
        .replace("```sql", "")
        .replace("```SQL", "")
        .replace("```", "")
        .trim()
        .to_string()
}
