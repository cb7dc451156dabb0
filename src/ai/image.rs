//! Illustrative image lookup: web search first, generation second.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use crate::config::AiConfig;

use super::{ChatClient, ImageFinder};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageStrategy {
    /// Ask a search-enabled model for a logo URL.
    WebSearch,
    /// Generate a minimalist logo.
    Generate,
}

pub struct LlmImageFinder {
    client: Arc<ChatClient>,
    search_model: Option<String>,
    image_model: Option<String>,
}

impl LlmImageFinder {
    pub fn new(client: Arc<ChatClient>, config: &AiConfig) -> Self {
        Self {
            client,
            search_model: config.search_model.clone(),
            image_model: config.image_model.clone(),
        }
    }

    pub fn strategies(&self) -> Vec<ImageStrategy> {
        let mut out = Vec::with_capacity(2);
        if self.search_model.is_some() {
            out.push(ImageStrategy::WebSearch);
        }
        if self.image_model.is_some() {
            out.push(ImageStrategy::Generate);
        }
        out
    }

    async fn attempt(&self, strategy: ImageStrategy, name: &str) -> Result<String> {
        match (strategy, &self.search_model, &self.image_model) {
            (ImageStrategy::WebSearch, Some(model), _) => {
                let system = "You find logo images on the web. Use search. \
Reply with a single JSON object {\"imageUrl\": string} containing a direct image URL and nothing else.";
                let user = format!("Technology: {}", name);
                let value = self.client.complete_json(model, system, &user, true).await?;
                let url = value
                    .get("imageUrl")
                    .and_then(|v| v.as_str())
                    .unwrap_or_default()
                    .trim()
                    .to_string();
                if !url.starts_with("http") {
                    anyhow::bail!("search returned no usable image URL");
                }
                Ok(url)
            }
            (ImageStrategy::Generate, _, Some(model)) => {
                let prompt = format!(
                    "Create a minimalist and abstract logo for the technology: {}",
                    name
                );
                self.client.generate_image(model, &prompt).await
            }
            _ => anyhow::bail!("{:?} image strategy not configured", strategy),
        }
    }
}

#[async_trait]
impl ImageFinder for LlmImageFinder {
    /// Never fails: when every strategy fails the result is an empty string.
    async fn find_image(&self, name: &str) -> Result<String> {
        for strategy in self.strategies() {
            match self.attempt(strategy, name).await {
                Ok(url) if !url.is_empty() => return Ok(url),
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(?strategy, error = %format!("{:#}", e), "image strategy failed");
                }
            }
        }
        Ok(String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finder(search: Option<&str>, image: Option<&str>) -> LlmImageFinder {
        let config = AiConfig {
            search_model: search.map(str::to_string),
            image_model: image.map(str::to_string),
            ..AiConfig::default()
        };
        let client = Arc::new(ChatClient::new(&config).unwrap());
        LlmImageFinder::new(client, &config)
    }

    #[test]
    fn test_strategy_order() {
        assert_eq!(
            finder(Some("s"), Some("i")).strategies(),
            vec![ImageStrategy::WebSearch, ImageStrategy::Generate]
        );
        assert_eq!(finder(None, Some("i")).strategies(), vec![ImageStrategy::Generate]);
    }

    #[tokio::test]
    async fn test_no_strategies_yields_empty_url() {
        let f = finder(None, None);
        assert!(f.strategies().is_empty());
        assert_eq!(f.find_image("Rust").await.unwrap(), "");
    }
}
