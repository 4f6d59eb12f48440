//! Enumerations and field types for tasks and context entries.
//!
//! These mirror the value sets the backend accepts: form priority levels, task
//! status, context source types, and the client-side sort options.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Form-level priority. The backend stores a numeric score, so each level maps
/// to an integer (low = 1, medium = 2, high = 3).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ValueEnum, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    /// Numeric priority score sent to the task store.
    pub fn score(self) -> f64 {
        match self {
            Priority::Low => 1.0,
            Priority::Medium => 2.0,
            Priority::High => 3.0,
        }
    }

    /// Map a stored score back to a form level. Only exact form scores map;
    /// AI-assigned scores (0–100) have no form level.
    pub fn from_score(score: f64) -> Option<Priority> {
        [Priority::Low, Priority::Medium, Priority::High]
            .into_iter()
            .find(|p| p.score() == score)
    }
}

/// Task completion status as reported by the backend.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ValueEnum, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    #[default]
    #[serde(alias = "pending")]
    Todo,
    InProgress,
    #[serde(alias = "completed")]
    Done,
}

/// Where a context entry came from.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ValueEnum, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    #[default]
    Note,
    Email,
    Whatsapp,
    /// Anything the backend reports that this client does not know about.
    #[serde(other)]
    #[value(skip)]
    Unknown,
}

/// Client-side ordering for task lists.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SortKey {
    /// Keep the order the backend returned.
    Server,
    /// Highest priority score first.
    Priority,
    /// Earliest deadline first, tasks without a deadline last.
    Deadline,
}
