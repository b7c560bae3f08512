//! Pipeline wiring
//!
//! Runs the five stages strictly in order for one question at a time:
//! safety gate, synthesis, static validation, execution, summarization.
//! Rejections are user-visible outcomes; fatal stage failures are errors and
//! stop the pipeline before any later stage runs.

use crate::catalog::SchemaCatalog;
use crate::error::Result;
use crate::executor::QueryExecutor;
use crate::llm::GenerationService;
use crate::safety::SafetyGate;
use crate::summarize::ResultSummarizer;
use crate::synthesis::{normalize_question, QuerySynthesizer};
use crate::validate::QueryValidator;
use std::sync::Arc;
use tracing::info;

/// Terminal outcome of one pipeline run.
#[derive(Debug, Clone)]
pub enum GatewayOutcome {
    /// The safety gate or the validator said no. Not an error.
    Rejected { message: String },
    /// The query ran; `summary` is the answer shown to the user.
    Answered {
        summary: String,
        sql: String,
        rows_returned: usize,
    },
}

pub struct QueryGateway {
    safety: SafetyGate,
    synthesizer: QuerySynthesizer,
    validator: QueryValidator,
    executor: Arc<dyn QueryExecutor>,
    summarizer: ResultSummarizer,
}

impl QueryGateway {
    pub fn new(
        llm: Arc<dyn GenerationService>,
        model: impl Into<String>,
        executor: Arc<dyn QueryExecutor>,
        catalog: &'static SchemaCatalog,
    ) -> Self {
        let model = model.into();
        Self {
            safety: SafetyGate::new(Arc::clone(&llm), model.clone()),
            synthesizer: QuerySynthesizer::new(Arc::clone(&llm), model.clone(), catalog),
            validator: QueryValidator::new(catalog),
            executor,
            summarizer: ResultSummarizer::new(llm, model),
        }
    }

    /// Process one question start to finish.
    pub async fn answer(&self, question: &str) -> Result<GatewayOutcome> {
        info!("Processing question: {}", question);

        let verdict = self.safety.check(question).await?;
        if !verdict.is_safe {
            return Ok(GatewayOutcome::Rejected {
                message: "The question is either not safe to execute or off topic."
                    .to_string(),
            });
        }

        let normalized = normalize_question(question);
        let generated = self.synthesizer.synthesize(&normalized).await?;

        if !self.validator.validate(&generated.sql).is_valid {
            info!("Generated SQL failed validation: {}", generated.sql);
            return Ok(GatewayOutcome::Rejected {
                message: format!("The generated SQL failed validation: {}", generated.sql),
            });
        }

        let results = self.executor.execute(&generated.sql).await?;
        let summary = self.summarizer.summarize(&results, &generated).await;

        Ok(GatewayOutcome::Answered {
            summary,
            sql: generated.sql,
            rows_returned: results.len(),
        })
    }
}
