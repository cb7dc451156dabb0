//! Semantic search over the knowledge-base text via a chat model.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

use crate::config::AiConfig;
use crate::models::{clean_list, SearchRequest};

use super::{ChatClient, SemanticSearcher};

pub struct LlmSemanticSearcher {
    client: Arc<ChatClient>,
    model: String,
}

impl LlmSemanticSearcher {
    pub fn new(client: Arc<ChatClient>, config: &AiConfig) -> Self {
        Self {
            client,
            model: config.model.clone(),
        }
    }
}

const SYSTEM_PROMPT: &str = "You help users find relevant technologies in a knowledge base. \
The user describes what they want to achieve. Using only the knowledge base, pick the \
technologies that fit and return their names exactly as written after 'Technology:'. \
Reply with a single JSON object {\"relevantTechnologies\": [string]} and nothing else.";

#[async_trait]
impl SemanticSearcher for LlmSemanticSearcher {
    async fn search(&self, request: &SearchRequest) -> Result<Vec<String>> {
        let user = format!(
            "Knowledge Base:\n{}\n\nUser Query: {}",
            request.knowledge_base, request.query
        );
        let value = self
            .client
            .complete_json(&self.model, SYSTEM_PROMPT, &user, false)
            .await?;
        parse_relevant(&value)
    }
}

fn parse_relevant(value: &Value) -> Result<Vec<String>> {
    let names = value
        .get("relevantTechnologies")
        .and_then(|v| v.as_array())
        .ok_or_else(|| anyhow::anyhow!("Invalid search payload: missing relevantTechnologies"))?;

    let names = names
        .iter()
        .map(|n| {
            n.as_str()
                .map(str::to_string)
                .ok_or_else(|| anyhow::anyhow!("Invalid search payload: non-string name"))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(clean_list(names))
}
