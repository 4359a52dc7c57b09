//! Model-written summaries with a statistical fallback.

pub mod digest;
#[cfg(feature = "openai")]
pub mod openai;
pub mod parse;
pub mod provider;

use std::sync::Arc;

use tracing::{info, warn};

use crate::models::{AnalysisOutcome, Dataset, Language};
use crate::risk;

pub use provider::{create_generator, DisabledGenerator, GenerationRequest, ProviderError, TextGenerator};

/// Summarizes through a [`TextGenerator`]; any provider failure yields the
/// rule-based analysis instead.
#[derive(Clone)]
pub struct AiSummarizer {
    generator: Arc<dyn TextGenerator>,
    section_headers: Vec<String>,
}

impl AiSummarizer {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            generator,
            section_headers: parse::DEFAULT_SECTION_HEADERS
                .iter()
                .map(|h| h.to_string())
                .collect(),
        }
    }

    pub fn with_section_headers(mut self, headers: Vec<String>) -> Self {
        self.section_headers = headers;
        self
    }

    pub fn is_available(&self) -> bool {
        self.generator.is_available()
    }

    pub async fn summarize(&self, dataset: &Dataset, lang: Language) -> AnalysisOutcome {
        if !self.generator.is_available() {
            return AnalysisOutcome::Statistical(risk::summarize(dataset, lang));
        }

        let request = GenerationRequest {
            system: digest::SYSTEM_PROMPT.to_string(),
            prompt: digest::build_prompt(&digest::build_digest(dataset), lang),
        };

        match self.generator.generate(&request).await {
            Ok(reply) if !reply.trim().is_empty() => {
                info!(provider = self.generator.name(), chars = reply.len(), "AI analysis received");
                let headers: Vec<&str> = self.section_headers.iter().map(String::as_str).collect();
                AnalysisOutcome::AiEnhanced(parse::split_response(&reply, &headers))
            }
            Ok(_) => {
                warn!(provider = self.generator.name(), "empty AI reply, falling back to statistical analysis");
                AnalysisOutcome::Statistical(risk::summarize(dataset, lang))
            }
            Err(e) => {
                warn!(
                    provider = self.generator.name(),
                    error = %e,
                    "AI analysis failed, falling back to statistical analysis"
                );
                AnalysisOutcome::Statistical(risk::summarize(dataset, lang))
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{FailingProvider, FixedReply};
    use super::*;
    use crate::models::AnalysisType;

    fn dataset() -> Dataset {
        Dataset::from_rows(
            &["Date", "RiskCategory", "Risikoscore", "Verluste"],
            &[
                &["2024-01-10", "Market", "100", "10"],
                &["2024-04-10", "Credit", "120", "100"],
            ],
        )
    }

    #[tokio::test]
    async fn successful_reply_is_split_and_tagged() {
        let summarizer = AiSummarizer::new(Arc::new(FixedReply(
            "Risk rose in Q2.\n\nRecommendations:\n- Cap market exposure",
        )));
        let outcome = summarizer.summarize(&dataset(), Language::English).await;
        assert_eq!(outcome.analysis_type(), AnalysisType::AiEnhanced);
        assert_eq!(outcome.analysis().summary, "Risk rose in Q2.");
        assert_eq!(outcome.analysis().recommendations, "- Cap market exposure");
    }

    #[tokio::test]
    async fn provider_failure_falls_back_to_statistics() {
        let summarizer = AiSummarizer::new(Arc::new(FailingProvider));
        let outcome = summarizer.summarize(&dataset(), Language::German).await;
        assert_eq!(
            outcome,
            AnalysisOutcome::Statistical(risk::summarize(&dataset(), Language::German))
        );
    }

    #[tokio::test]
    async fn blank_reply_falls_back_to_statistics() {
        let summarizer = AiSummarizer::new(Arc::new(FixedReply("   \n")));
        let outcome = summarizer.summarize(&dataset(), Language::English).await;
        assert_eq!(outcome.analysis_type(), AnalysisType::Statistical);
    }

    #[tokio::test]
    async fn unavailable_provider_matches_statistical_path() {
        let summarizer = AiSummarizer::new(Arc::new(DisabledGenerator));
        let outcome = summarizer.summarize(&dataset(), Language::English).await;
        assert_eq!(outcome.analysis_type(), AnalysisType::Statistical);
        assert_eq!(
            outcome.into_analysis(),
            risk::summarize(&dataset(), Language::English)
        );
    }

    #[tokio::test]
    async fn custom_section_headers_are_used() {
        let summarizer = AiSummarizer::new(Arc::new(FixedReply("Overview. Actions: hedge.")))
            .with_section_headers(vec!["actions:".to_string()]);
        let outcome = summarizer.summarize(&dataset(), Language::English).await;
        assert_eq!(outcome.analysis().summary, "Overview.");
        assert_eq!(outcome.analysis().recommendations, "hedge.");
    }
}
