//! AI collaborators.
//!
//! Three traits describe what the request handlers need from a language
//! model. Each has an HTTP implementation backed by [`ChatClient`], which
//! speaks the OpenAI-compatible `chat/completions` and `images/generations`
//! endpoints:
//!
//! | Trait | Implementation | Strategies (tried in order) |
//! |-------|----------------|-----------------------------|
//! | [`Summarizer`] | [`LlmSummarizer`] | web search, knowledge only |
//! | [`ImageFinder`] | [`LlmImageFinder`] | web search, image generation, empty |
//! | [`SemanticSearcher`] | [`LlmSemanticSearcher`] | single prompt |
//!
//! Outputs are validated at this boundary. A successful [`Summary`] always
//! has a summary and at least one category.

pub mod client;
pub mod image;
pub mod search;
pub mod summarize;

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use crate::config::AiConfig;
use crate::models::{SearchRequest, Summary, SummaryRequest};

pub use client::ChatClient;
pub use image::{ImageStrategy, LlmImageFinder};
pub use search::LlmSemanticSearcher;
pub use summarize::{LlmSummarizer, SummaryStrategy};

/// Produces a summary, categories, use cases, and links for free text.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, request: &SummaryRequest) -> Result<Summary>;
}

/// Finds or generates an image for a technology name.
///
/// Returns a URL, a `data:` URI, or an empty string when nothing was found.
#[async_trait]
pub trait ImageFinder: Send + Sync {
    async fn find_image(&self, name: &str) -> Result<String>;
}

/// Picks the technologies in a knowledge-base text relevant to a query.
#[async_trait]
pub trait SemanticSearcher: Send + Sync {
    async fn search(&self, request: &SearchRequest) -> Result<Vec<String>>;
}

/// The three HTTP collaborators sharing one client.
pub struct Collaborators {
    pub summarizer: Arc<dyn Summarizer>,
    pub image_finder: Arc<dyn ImageFinder>,
    pub searcher: Arc<dyn SemanticSearcher>,
}

impl Collaborators {
    pub fn from_config(config: &AiConfig) -> Result<Self> {
        let client = Arc::new(ChatClient::new(config)?);
        Ok(Self {
            summarizer: Arc::new(LlmSummarizer::new(client.clone(), config)),
            image_finder: Arc::new(LlmImageFinder::new(client.clone(), config)),
            searcher: Arc::new(LlmSemanticSearcher::new(client, config)),
        })
    }
}
