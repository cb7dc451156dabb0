//! Core data models.
//!
//! [`Technology`] is the only persisted entity. The remaining types are the
//! inputs and outputs exchanged with the AI collaborators.

use serde::{Deserialize, Serialize};

/// A stored knowledge-base entry.
///
/// Serialized with camelCase keys; this is both the HTTP response shape and
/// the on-disk shape of the JSON-file backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Technology {
    pub id: i64,
    pub name: String,
    pub summary: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub use_cases: Vec<String>,
    #[serde(default)]
    pub relevant_links: Vec<String>,
    /// URL or `data:` URI. An empty string means "no image".
    #[serde(default)]
    pub image_url: String,
}

impl Technology {
    /// The first relevant link, used as the entry's primary link.
    pub fn primary_link(&self) -> Option<&str> {
        self.relevant_links.first().map(String::as_str)
    }
}

/// Fields of a technology before the store assigns an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTechnology {
    pub name: String,
    pub summary: String,
    pub description: String,
    pub categories: Vec<String>,
    pub use_cases: Vec<String>,
    pub relevant_links: Vec<String>,
    pub image_url: String,
}

impl NewTechnology {
    pub fn with_id(self, id: i64) -> Technology {
        Technology {
            id,
            name: self.name,
            summary: self.summary,
            description: self.description,
            categories: self.categories,
            use_cases: self.use_cases,
            relevant_links: self.relevant_links,
            image_url: self.image_url,
        }
    }
}

/// Input to the summarization collaborator.
#[derive(Debug, Clone)]
pub struct SummaryRequest {
    pub tech_info: String,
    /// Categories already present in the store, offered for reuse.
    pub known_categories: Vec<String>,
}

/// Validated output of the summarization collaborator.
///
/// Construct with [`Summary::validated`]; a `Summary` always carries a
/// non-empty summary and at least one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub summary: String,
    pub categories: Vec<String>,
    #[serde(default)]
    pub use_cases: Vec<String>,
    #[serde(default)]
    pub relevant_links: Vec<String>,
}

impl Summary {
    /// Trims every field, drops blank list entries, and rejects payloads
    /// without a summary or without any category.
    pub fn validated(self) -> anyhow::Result<Self> {
        let summary = self.summary.trim().to_string();
        if summary.is_empty() {
            anyhow::bail!("summary is empty");
        }
        let categories = clean_list(self.categories);
        if categories.is_empty() {
            anyhow::bail!("no categories returned");
        }
        Ok(Self {
            summary,
            categories,
            use_cases: clean_list(self.use_cases),
            relevant_links: clean_list(self.relevant_links),
        })
    }
}

/// Input to the semantic search collaborator.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub query: String,
    pub knowledge_base: String,
}

/// Output of a search, as returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub relevant_technologies: Vec<String>,
}

pub(crate) fn clean_list(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_validated_trims_and_drops_blanks() {
        let raw = Summary {
            summary: "  A framework  ".into(),
            categories: vec![" AI/ML ".into(), "".into()],
            use_cases: vec!["RAG".into(), "   ".into()],
            relevant_links: vec![],
        };
        let s = raw.validated().unwrap();
        assert_eq!(s.summary, "A framework");
        assert_eq!(s.categories, vec!["AI/ML"]);
        assert_eq!(s.use_cases, vec!["RAG"]);
        assert!(s.relevant_links.is_empty());
    }

    #[test]
    fn test_summary_without_categories_rejected() {
        let raw = Summary {
            summary: "x".into(),
            categories: vec![" ".into()],
            use_cases: vec![],
            relevant_links: vec![],
        };
        assert!(raw.validated().is_err());
    }

    #[test]
    fn test_technology_json_uses_camel_case() {
        let tech = Technology {
            id: 1,
            name: "Rust".into(),
            summary: "s".into(),
            description: "d".into(),
            categories: vec!["Lang".into()],
            use_cases: vec![],
            relevant_links: vec!["https://rust-lang.org".into()],
            image_url: String::new(),
        };
        let json = serde_json::to_value(&tech).unwrap();
        assert!(json.get("useCases").is_some());
        assert!(json.get("relevantLinks").is_some());
        assert_eq!(json["imageUrl"], "");
        assert_eq!(tech.primary_link(), Some("https://rust-lang.org"));
    }

    #[test]
    fn test_technology_missing_arrays_default_empty() {
        let tech: Technology =
            serde_json::from_str(r#"{"id": 3, "name": "Go", "summary": "s"}"#).unwrap();
        assert!(tech.categories.is_empty());
        assert!(tech.use_cases.is_empty());
        assert_eq!(tech.image_url, "");
    }
}
