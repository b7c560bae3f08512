//! Result summarization
//!
//! The one stage where an external failure degrades instead of aborting: an
//! empty result set is answered deterministically with no generation call,
//! and a failed generation call falls back to a row-count sentence.

use crate::executor::ResultSet;
use crate::llm::{GenerationRequest, GenerationService};
use crate::synthesis::GeneratedQuery;
use std::sync::Arc;
use tracing::warn;

/// Terminal artifact of the pipeline: a single sentence.
pub type Summary = String;

pub struct ResultSummarizer {
    llm: Arc<dyn GenerationService>,
    model: String,
}

impl ResultSummarizer {
    pub fn new(llm: Arc<dyn GenerationService>, model: impl Into<String>) -> Self {
        Self {
            llm,
            model: model.into(),
        }
    }

    /// Produce one sentence for the result set. Never fails.
    pub async fn summarize(&self, results: &ResultSet, generated: &GeneratedQuery) -> Summary {
        if results.is_empty() {
            let question = if generated.clean_query.is_empty() {
                &generated.sql
            } else {
                &generated.clean_query
            };
            return format!("No results found for the query: {}", question);
        }

        let rows_json =
            serde_json::to_string(results).unwrap_or_else(|_| "[]".to_string());
        let prompt = format!(
            r#"You are an expert summarizer. Given the validated SQL query and its result set,
produce a single short direct sentence that clearly summarizes the findings.
Only output the summary sentence and nothing else.

Validated SQL: {}
Cleaned user query: {}
Result rows (JSON array of arrays): {}
"#,
            generated.sql, generated.clean_query, rows_json
        );

        let request = GenerationRequest::new(self.model.clone(), prompt).with_temperature(0.0);
        match self.llm.generate(request).await {
            Ok(text) => text.trim().to_string(),
            Err(e) => {
                warn!("Summary generation failed, using row-count fallback: {}", e);
                format!("{} rows returned for the query.", results.len())
            }
        }
    }
}
