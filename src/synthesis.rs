//! Query synthesis
//!
//! Turns an accepted question into a `GeneratedQuery` via a generation call
//! constrained to a two-field JSON object. The response parser is defensive:
//! generators wrap payloads in code fences or chat around them, so the raw
//! text is fence-stripped first and brace-scanned as a fallback.

use crate::catalog::SchemaCatalog;
use crate::error::{GatewayError, Result};
use crate::llm::{GenerationRequest, GenerationService};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

lazy_static! {
    static ref FENCE_OPEN: Regex = Regex::new(r"^```[^\n]*\n?").unwrap();
    static ref FENCE_CLOSE: Regex = Regex::new(r"\n?```$").unwrap();
}

/// The two-field synthesis contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedQuery {
    /// Normalized restatement of the question. May be empty.
    #[serde(default)]
    pub clean_query: String,
    /// The single candidate SELECT statement.
    pub sql: String,
}

/// Lowercase a question and strip punctuation. Applied between the safety
/// gate and synthesis, so the generator sees the cleaned form.
pub fn normalize_question(question: &str) -> String {
    question
        .chars()
        .filter(|c| !c.is_ascii_punctuation())
        .collect::<String>()
        .trim()
        .to_lowercase()
}

pub struct QuerySynthesizer {
    llm: Arc<dyn GenerationService>,
    model: String,
    catalog: &'static SchemaCatalog,
}

impl QuerySynthesizer {
    pub fn new(
        llm: Arc<dyn GenerationService>,
        model: impl Into<String>,
        catalog: &'static SchemaCatalog,
    ) -> Self {
        Self {
            llm,
            model: model.into(),
            catalog,
        }
    }

    /// Generate one candidate query for the question. Only reachable after
    /// the safety gate has accepted the question.
    pub async fn synthesize(&self, question: &str) -> Result<GeneratedQuery> {
        let prompt = self.build_prompt(question);
        let request = GenerationRequest::new(self.model.clone(), prompt)
            .with_temperature(0.0)
            .with_json_format();

        let response = self.llm.generate(request).await?;
        let generated = parse_generation(&response)?;
        info!("Synthesized SQL: {}", generated.sql);
        Ok(generated)
    }

    fn build_prompt(&self, question: &str) -> String {
        format!(
            r#"You are an expert in converting natural language to SQL queries.
Convert the following user natural query into a valid SQL query.
Follow this schema:
{schema}
Respond with a JSON object with two keys:
{{
    "clean_query": "list all books with price over 20",
    "sql": "SELECT title, price FROM book WHERE price > 20;"
}}
We are only interested in SELECT queries. No other type of queries are allowed.
Make sure the SQL query is syntactically correct.
User query: "{question}"
"#,
            schema = self.catalog.describe(),
            question = question
        )
    }
}

/// Coerce raw generator text into the two-field contract.
///
/// Strips a leading fenced-block opener (with optional language tag) and a
/// trailing closer, drops any residual fence markers, then parses. If that
/// fails, the substring between the first `{` and the last `}` is tried.
pub fn parse_generation(raw: &str) -> Result<GeneratedQuery> {
    let mut content = raw.trim().to_string();
    content = FENCE_OPEN.replace(&content, "").into_owned();
    content = FENCE_CLOSE.replace(&content, "").into_owned();
    content = content.replace("```", "").trim().to_string();

    let parsed: GeneratedQuery = match serde_json::from_str(&content) {
        Ok(parsed) => parsed,
        Err(_) => {
            let start = content.find('{');
            let end = content.rfind('}');
            match (start, end) {
                (Some(start), Some(end)) if end > start => {
                    serde_json::from_str(&content[start..=end]).map_err(|e| {
                        GatewayError::Parse(format!(
                            "Could not parse JSON from model response: {}",
                            e
                        ))
                    })?
                }
                _ => {
                    return Err(GatewayError::Parse(
                        "Could not parse JSON from model response".to_string(),
                    ))
                }
            }
        }
    };

    if parsed.sql.trim().is_empty() {
        return Err(GatewayError::Parse(
            "Generated object has an empty 'sql' field".to_string(),
        ));
    }
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bare_object() {
        let generated =
            parse_generation(r#"{"clean_query":"x","sql":"SELECT 1;"}"#).unwrap();
        assert_eq!(generated.clean_query, "x");
        assert_eq!(generated.sql, "SELECT 1;");
    }

    #[test]
    fn test_parse_fenced_with_language_tag() {
        let raw = "```json\n{\"clean_query\":\"x\",\"sql\":\"SELECT 1;\"}\n```";
        let generated = parse_generation(raw).unwrap();
        assert_eq!(generated.clean_query, "x");
        assert_eq!(generated.sql, "SELECT 1;");
    }

    #[test]
    fn test_parse_fenced_without_tag() {
        let raw = "```\n{\"clean_query\":\"x\",\"sql\":\"SELECT 1;\"}\n```";
        let generated = parse_generation(raw).unwrap();
        assert_eq!(generated.sql, "SELECT 1;");
    }

    #[test]
    fn test_parse_falls_back_to_brace_scanning() {
        let raw = "Here is your query: {\"clean_query\":\"x\",\"sql\":\"SELECT 1;\"} hope it helps";
        let generated = parse_generation(raw).unwrap();
        assert_eq!(generated.sql, "SELECT 1;");
    }

    #[test]
    fn test_parse_missing_clean_query_defaults_to_empty() {
        let generated = parse_generation(r#"{"sql":"SELECT 1;"}"#).unwrap();
        assert_eq!(generated.clean_query, "");
    }

    #[test]
    fn test_parse_rejects_non_json() {
        let result = parse_generation("sorry, I cannot help with that");
        assert!(matches!(result, Err(GatewayError::Parse(_))));
    }

    #[test]
    fn test_parse_rejects_empty_sql() {
        let result = parse_generation(r#"{"clean_query":"x","sql":"  "}"#);
        assert!(matches!(result, Err(GatewayError::Parse(_))));
    }

    #[test]
    fn test_normalize_question() {
        assert_eq!(
            normalize_question("List all books, with price over $20!"),
            "list all books with price over 20"
        );
        assert_eq!(normalize_question("  Plain question  "), "plain question");
    }
}
