//! Technology summarization via a chat model.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use crate::config::AiConfig;
use crate::models::{Summary, SummaryRequest};

use super::{ChatClient, Summarizer};

/// One way of asking the model for a summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryStrategy {
    /// Search-enabled model; grounds links and facts in live results.
    WebSearch,
    /// Plain chat model answering from its own knowledge.
    KnowledgeOnly,
}

pub struct LlmSummarizer {
    client: Arc<ChatClient>,
    model: String,
    search_model: Option<String>,
    language: String,
}

impl LlmSummarizer {
    pub fn new(client: Arc<ChatClient>, config: &AiConfig) -> Self {
        Self {
            client,
            model: config.model.clone(),
            search_model: config.search_model.clone(),
            language: config.language.clone(),
        }
    }

    /// The strategies tried by [`Summarizer::summarize`], in order.
    pub fn strategies(&self) -> Vec<SummaryStrategy> {
        let mut out = Vec::with_capacity(2);
        if self.search_model.is_some() {
            out.push(SummaryStrategy::WebSearch);
        }
        out.push(SummaryStrategy::KnowledgeOnly);
        out
    }

    async fn attempt(&self, strategy: SummaryStrategy, request: &SummaryRequest) -> Result<Summary> {
        let (model, web_search) = match strategy {
            SummaryStrategy::WebSearch => match &self.search_model {
                Some(m) => (m.as_str(), true),
                None => anyhow::bail!("web search model not configured"),
            },
            SummaryStrategy::KnowledgeOnly => (self.model.as_str(), false),
        };

        let system = system_prompt(&self.language);
        let user = user_prompt(request);
        let value = self.client.complete_json(model, &system, &user, web_search).await?;
        let summary: Summary = serde_json::from_value(value)
            .map_err(|e| anyhow::anyhow!("Invalid summary payload: {}", e))?;
        summary.validated()
    }
}

#[async_trait]
impl Summarizer for LlmSummarizer {
    async fn summarize(&self, request: &SummaryRequest) -> Result<Summary> {
        let mut last_err = None;
        for strategy in self.strategies() {
            match self.attempt(strategy, request).await {
                Ok(summary) => return Ok(summary),
                Err(e) => {
                    tracing::warn!(?strategy, error = %format!("{:#}", e), "summarization strategy failed");
                    last_err = Some(e);
                }
            }
        }
        Err(last_err.unwrap_or_else(|| anyhow::anyhow!("no summarization strategy available")))
    }
}

fn system_prompt(language: &str) -> String {
    format!(
        "You are a technology expert. Summarize the technology the user describes, \
identify its categories, common use cases, and relevant links (official site first). \
Write all prose in {language}. Always return at least one category. \
Reply with a single JSON object of the form \
{{\"summary\": string, \"categories\": [string], \"useCases\": [string], \"relevantLinks\": [string]}} \
and nothing else."
    )
}

fn user_prompt(request: &SummaryRequest) -> String {
    let mut prompt = format!("Technology information: {}\n", request.tech_info);
    if !request.known_categories.is_empty() {
        prompt.push_str(
            "\nExisting categories (reuse one of these when it fits instead of inventing a near-duplicate):\n",
        );
        for c in &request.known_categories {
            prompt.push_str("- ");
            prompt.push_str(c);
            prompt.push('\n');
        }
    }
    prompt
}
