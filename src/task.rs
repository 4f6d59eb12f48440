//! Task data structures and the task form.
//!
//! `Task` is the record the backend returns; `TaskPayload` is the write shape
//! sent on create and update; `TaskForm` is the user input that maps onto a
//! payload.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::category::Category;
use crate::dates::parse_deadline_input;
use crate::error::{ApiError, Result};
use crate::fields::*;

/// A task as stored by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub priority_score: f64,
    #[serde(default)]
    pub deadline: Option<DateTime<Utc>>,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Task {
    pub fn category_ids(&self) -> Vec<u64> {
        self.categories.iter().map(|c| c.id).collect()
    }

    /// The write payload that would recreate this task's editable fields.
    pub fn payload(&self) -> TaskPayload {
        TaskPayload {
            title: self.title.clone(),
            description: self.description.clone(),
            category_ids: self.category_ids(),
            priority_score: self.priority_score,
            deadline: self.deadline,
        }
    }
}

/// Body of `POST /api/tasks/` and `PUT /api/tasks/{id}/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskPayload {
    pub title: String,
    pub description: String,
    pub category_ids: Vec<u64>,
    pub priority_score: f64,
    pub deadline: Option<DateTime<Utc>>,
}

/// User input for creating or editing a task.
#[derive(Debug, Clone, Default)]
pub struct TaskForm {
    pub title: String,
    pub description: String,
    /// `None` keeps the edited task's score, or uses the default level on create.
    pub priority: Option<Priority>,
    /// Free-form deadline; empty means no deadline.
    pub deadline: String,
    pub category_ids: Vec<u64>,
}

impl TaskForm {
    /// Prefill a form from an existing task, as the edit path does.
    pub fn from_task(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone(),
            priority: None,
            deadline: task.deadline.map(|d| d.to_rfc3339()).unwrap_or_default(),
            category_ids: task.category_ids(),
        }
    }

    /// Validate the form and map it onto a write payload.
    ///
    /// `editing` is the task being edited, used when the form leaves the
    /// priority unset.
    pub fn to_payload(&self, editing: Option<&Task>, now: DateTime<Utc>) -> Result<TaskPayload> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(ApiError::Validation("title cannot be empty".into()));
        }
        let description = self.description.trim();
        if description.is_empty() {
            return Err(ApiError::Validation("description cannot be empty".into()));
        }

        let deadline = if self.deadline.trim().is_empty() {
            None
        } else {
            match parse_deadline_input(&self.deadline, now) {
                Some(d) => Some(d),
                None => {
                    return Err(ApiError::Validation(format!(
                        "unrecognised deadline '{}'. Use YYYY-MM-DD, YYYY-MM-DDTHH:MM, 'today', 'tomorrow' or 'in Nd'",
                        self.deadline.trim()
                    )))
                }
            }
        };

        let priority_score = match (self.priority, editing) {
            (Some(p), _) => p.score(),
            (None, Some(task)) => task.priority_score,
            (None, None) => Priority::default().score(),
        };

        let mut seen = HashSet::new();
        let mut category_ids = self.category_ids.clone();
        category_ids.retain(|id| seen.insert(*id));

        Ok(TaskPayload {
            title: title.to_string(),
            description: description.to_string(),
            category_ids,
            priority_score,
            deadline,
        })
    }
}
