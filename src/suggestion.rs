//! Suggestion service request and response types.
//!
//! The service fills in defaults for anything it has no opinion on (`0`, `""`,
//! `[]`), and some deployments answer with unrelated bodies such as
//! `{"message": "..."}`. Accessors here treat all of those as absent.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::dates::parse_suggested_deadline;

/// Priority as sent to the suggestion service: a numeric score from the task
/// editor, or a label when suggesting from raw context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SuggestionPriority {
    Score(f64),
    Label(String),
}

/// Body of `POST /api/ai/suggest/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestionRequest {
    pub task: String,
    pub priority: SuggestionPriority,
    pub deadline: DateTime<Utc>,
    pub context: String,
}

/// AI-derived enrichment for a task.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SuggestionResult {
    #[serde(default)]
    pub priority_score: Option<f64>,
    #[serde(default)]
    pub deadline_suggestions: Option<Vec<String>>,
    #[serde(default)]
    pub improved_description: Option<String>,
    #[serde(default)]
    pub categories: Option<Vec<String>>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub rationale: Option<String>,
}

impl SuggestionResult {
    /// Suggested score; zero and non-finite values count as absent.
    pub fn priority_score(&self) -> Option<f64> {
        self.priority_score.filter(|s| s.is_finite() && *s != 0.0)
    }

    /// Every deadline suggestion that is an RFC 3339 timestamp or a
    /// `YYYY-MM-DD` date, in order. Anything else is skipped.
    pub fn deadlines(&self) -> Vec<DateTime<Utc>> {
        self.deadline_suggestions
            .iter()
            .flatten()
            .filter_map(|s| parse_suggested_deadline(s))
            .collect()
    }

    /// First usable deadline suggestion.
    pub fn first_deadline(&self) -> Option<DateTime<Utc>> {
        self.deadlines().into_iter().next()
    }

    pub fn improved_description(&self) -> Option<&str> {
        self.improved_description
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Suggested category names, trimmed, blanks dropped.
    pub fn category_names(&self) -> Vec<&str> {
        self.categories
            .iter()
            .flatten()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect()
    }

    pub fn tags(&self) -> Vec<&str> {
        self.tags
            .iter()
            .flatten()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect()
    }

    pub fn rationale(&self) -> Option<&str> {
        self.rationale.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    /// Whether the result carries nothing that could change a task.
    pub fn is_empty(&self) -> bool {
        self.priority_score().is_none()
            && self.first_deadline().is_none()
            && self.improved_description().is_none()
            && self.category_names().is_empty()
    }
}
