//! Request handlers.
//!
//! [`Actions`] is the orchestration layer between callers (CLI, HTTP) and
//! the record store plus AI collaborators. Every handler validates its
//! input, performs one request/response round trip, and reports failures as
//! an [`ActionError`] with a human-readable message. Nothing is retried.
//!
//! # Add flow
//!
//! ```text
//! validate ─▶ distinct_categories ─▶ ┌ summarize ┐ ─▶ merge ─▶ insert
//!                                    └ find_image┘
//! ```
//!
//! Both collaborator calls run concurrently and are both awaited. Only the
//! summarization result is fatal; a failed or empty image becomes the
//! placeholder URL.

use std::collections::HashSet;
use std::sync::Arc;

use crate::ai::{Collaborators, ImageFinder, SemanticSearcher, Summarizer};
use crate::config::Config;
use crate::error::ActionError;
use crate::models::{NewTechnology, SearchRequest, SearchResponse, SummaryRequest, Technology};
use crate::store::{open_store, DeleteOutcome, Store};

pub const MIN_TECH_INFO_CHARS: usize = 3;

pub struct Actions {
    store: Arc<dyn Store>,
    summarizer: Arc<dyn Summarizer>,
    image_finder: Arc<dyn ImageFinder>,
    searcher: Arc<dyn SemanticSearcher>,
    placeholder_url: String,
}

impl Actions {
    pub fn new(
        store: Arc<dyn Store>,
        summarizer: Arc<dyn Summarizer>,
        image_finder: Arc<dyn ImageFinder>,
        searcher: Arc<dyn SemanticSearcher>,
        placeholder_url: impl Into<String>,
    ) -> Self {
        Self {
            store,
            summarizer,
            image_finder,
            searcher,
            placeholder_url: placeholder_url.into(),
        }
    }

    /// Opens the configured store and HTTP collaborators.
    pub async fn from_config(config: &Config) -> anyhow::Result<Self> {
        let store = open_store(config).await?;
        let ai = Collaborators::from_config(&config.ai)?;
        Ok(Self::new(
            store,
            ai.summarizer,
            ai.image_finder,
            ai.searcher,
            config.image.placeholder_url.clone(),
        ))
    }

    /// Summarizes `tech_info`, attaches an image, and persists the record.
    pub async fn add(&self, tech_info: &str) -> Result<Technology, ActionError> {
        if tech_info.chars().count() < MIN_TECH_INFO_CHARS {
            return Err(ActionError::validation(
                "Technology info must be at least 3 characters long.",
            ));
        }

        let known_categories = self
            .store
            .distinct_categories()
            .await
            .map_err(|e| ActionError::storage("Failed to read existing categories.", &e))?;

        let request = SummaryRequest {
            tech_info: tech_info.to_string(),
            known_categories,
        };

        let (summary, image) = tokio::join!(
            self.summarizer.summarize(&request),
            self.image_finder.find_image(tech_info),
        );

        let summary = summary.map_err(|e| {
            tracing::error!(error = %format!("{:#}", e), tech_info, "summarization failed");
            ActionError::dependency("AI summarization", &e)
        })?;

        let image_url = match image {
            Ok(url) if !url.trim().is_empty() => url,
            Ok(_) => {
                tracing::info!(tech_info, "no image found; using placeholder");
                self.placeholder_url.clone()
            }
            Err(e) => {
                tracing::warn!(error = %format!("{:#}", e), tech_info, "image lookup failed; using placeholder");
                self.placeholder_url.clone()
            }
        };

        let new = NewTechnology {
            name: tech_info.to_string(),
            description: summary.summary.clone(),
            summary: summary.summary,
            categories: summary.categories,
            use_cases: summary.use_cases,
            relevant_links: summary.relevant_links,
            image_url,
        };

        let tech = self
            .store
            .insert(new)
            .await
            .map_err(|e| ActionError::storage("Failed to save technology.", &e))?;

        tracing::info!(id = tech.id, name = %tech.name, "technology added");
        Ok(tech)
    }

    /// Asks the search collaborator which stored technologies match `query`.
    pub async fn search(&self, query: &str) -> Result<SearchResponse, ActionError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ActionError::validation("Search query must not be empty."));
        }

        let records = self
            .store
            .list()
            .await
            .map_err(|e| ActionError::storage("Failed to read technologies.", &e))?;

        let knowledge_base = knowledge_base_text(&records);
        if knowledge_base.trim().is_empty() {
            return Ok(SearchResponse {
                relevant_technologies: Vec::new(),
            });
        }

        let relevant = self
            .searcher
            .search(&SearchRequest {
                query: query.to_string(),
                knowledge_base,
            })
            .await
            .map_err(|e| {
                tracing::error!(error = %format!("{:#}", e), "semantic search failed");
                ActionError::dependency("AI search", &e)
            })?;

        Ok(SearchResponse {
            relevant_technologies: relevant,
        })
    }

    pub async fn delete_technology(&self, id: i64) -> Result<(), ActionError> {
        if id <= 0 {
            return Err(ActionError::validation("id must be a positive integer"));
        }

        match self.store.delete_by_id(id).await {
            Ok(DeleteOutcome::Deleted) => {
                tracing::info!(id, "technology deleted");
                Ok(())
            }
            Ok(DeleteOutcome::NotFound) => Err(ActionError::NotFound(format!(
                "technology not found: {}",
                id
            ))),
            Err(e) => Err(ActionError::storage("Failed to delete technology.", &e)),
        }
    }

    pub async fn list(&self) -> Result<Vec<Technology>, ActionError> {
        self.store
            .list()
            .await
            .map_err(|e| ActionError::storage("Failed to read technologies.", &e))
    }

    pub async fn categories(&self) -> Result<Vec<String>, ActionError> {
        self.store
            .distinct_categories()
            .await
            .map_err(|e| ActionError::storage("Failed to read categories.", &e))
    }

    pub async fn close(&self) {
        self.store.close().await;
    }
}

/// Parses a raw identifier, accepting only positive integers.
pub fn parse_id(raw: &str) -> Result<i64, ActionError> {
    match raw.trim().parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(ActionError::validation("id must be a positive integer")),
    }
}

/// Renders records as `Technology: X\nDescription: Y` blocks separated by a
/// blank line.
pub fn knowledge_base_text(records: &[Technology]) -> String {
    records
        .iter()
        .map(|t| format!("Technology: {}\nDescription: {}", t.name, t.summary))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Keeps records carrying any of the `active` categories. An empty filter
/// keeps everything.
pub fn filter_by_categories<'a>(records: &'a [Technology], active: &[String]) -> Vec<&'a Technology> {
    if active.is_empty() {
        return records.iter().collect();
    }
    records
        .iter()
        .filter(|t| t.categories.iter().any(|c| active.contains(c)))
        .collect()
}

/// Keeps records whose name appears in `names`.
pub fn filter_by_names<'a>(records: &'a [Technology], names: &[String]) -> Vec<&'a Technology> {
    let wanted: HashSet<&str> = names.iter().map(String::as_str).collect();
    records
        .iter()
        .filter(|t| wanted.contains(t.name.as_str()))
        .collect()
}
