//! Task save-then-enrich workflow.
//!
//! Saving a new task runs four dependent steps, each waiting on the one
//! before:
//!
//! 1. **Persist** the form as a new task (or update the edited one).
//! 2. **Suggest**: ask the suggestion service about the persisted task.
//! 3. **Reconcile** suggested category names into category ids, creating
//!    missing categories.
//! 4. **Apply** the suggestion onto the task with a second update.
//!
//! Only step 1 is binding. Steps 2–4 are best-effort and never roll back the
//! persisted task; their outcome is reported separately in [`Submission`] so
//! callers see the partial-failure case instead of losing it.

use chrono::{DateTime, Utc};

use crate::category::{reconcile_categories, Category};
use crate::error::{ApiError, Result};
use crate::store::{CategoryStore, SuggestionService, TaskStore};
use crate::suggestion::{SuggestionPriority, SuggestionRequest, SuggestionResult};
use crate::task::{Task, TaskForm, TaskPayload};

/// What happened after the task was persisted.
#[derive(Debug)]
pub enum Enrichment {
    /// Edits are not enriched.
    Skipped,
    /// The service answered but nothing in its answer changes the task.
    Unchanged { suggestion: SuggestionResult },
    /// The task was updated with the suggestion.
    Applied {
        suggestion: SuggestionResult,
        task: Task,
        created_categories: Vec<Category>,
    },
    /// Enrichment failed; the persisted task stands as it was.
    Failed {
        error: ApiError,
        suggestion: Option<SuggestionResult>,
        created_categories: Vec<Category>,
    },
}

/// Two-phase result of a task submission.
#[derive(Debug)]
pub struct Submission {
    /// The task as saved by step 1.
    pub persisted: Task,
    pub enrichment: Enrichment,
}

impl Submission {
    /// The task as it now stands in the store.
    pub fn task(&self) -> &Task {
        match &self.enrichment {
            Enrichment::Applied { task, .. } => task,
            _ => &self.persisted,
        }
    }

    pub fn suggestion(&self) -> Option<&SuggestionResult> {
        match &self.enrichment {
            Enrichment::Unchanged { suggestion } | Enrichment::Applied { suggestion, .. } => Some(suggestion),
            Enrichment::Failed { suggestion, .. } => suggestion.as_ref(),
            Enrichment::Skipped => None,
        }
    }

    pub fn created_categories(&self) -> &[Category] {
        match &self.enrichment {
            Enrichment::Applied { created_categories, .. } | Enrichment::Failed { created_categories, .. } => {
                created_categories
            }
            _ => &[],
        }
    }

    pub fn enrichment_error(&self) -> Option<&ApiError> {
        match &self.enrichment {
            Enrichment::Failed { error, .. } => Some(error),
            _ => None,
        }
    }
}

/// Build the suggestion request for a persisted task. Tasks without a
/// deadline are sent with `now`.
pub fn suggestion_request(task: &Task, now: DateTime<Utc>) -> SuggestionRequest {
    SuggestionRequest {
        task: task.title.clone(),
        priority: SuggestionPriority::Score(task.priority_score),
        deadline: task.deadline.unwrap_or(now),
        context: task.description.clone(),
    }
}

/// Merge a suggestion onto a task: each field takes the suggested value when
/// present, otherwise keeps the task's. `category_ids` replaces the task's
/// categories only when non-empty. The title is never changed.
pub fn apply_suggestion(
    task: &Task,
    suggestion: &SuggestionResult,
    category_ids: &[u64],
) -> TaskPayload {
    TaskPayload {
        title: task.title.clone(),
        description: suggestion
            .improved_description()
            .map(str::to_string)
            .unwrap_or_else(|| task.description.clone()),
        category_ids: if category_ids.is_empty() {
            task.category_ids()
        } else {
            category_ids.to_vec()
        },
        priority_score: suggestion.priority_score().unwrap_or(task.priority_score),
        deadline: suggestion.first_deadline().or(task.deadline),
    }
}

/// Binds the workflow to its three collaborators.
pub struct TaskEnrichmentWorkflow<'a> {
    tasks: &'a dyn TaskStore,
    categories: &'a dyn CategoryStore,
    suggestions: &'a dyn SuggestionService,
}

impl<'a> TaskEnrichmentWorkflow<'a> {
    pub fn new(
        tasks: &'a dyn TaskStore,
        categories: &'a dyn CategoryStore,
        suggestions: &'a dyn SuggestionService,
    ) -> Self {
        Self { tasks, categories, suggestions }
    }

    /// Save a task form and, for new tasks, enrich the result.
    ///
    /// `editing` is the current state of the task being edited; edits are
    /// saved with PUT and not enriched. Validation and step-1 failures are
    /// returned as errors with nothing committed. Later failures are carried
    /// in [`Enrichment::Failed`].
    pub fn submit_task(&self, form: &TaskForm, editing: Option<&Task>) -> Result<Submission> {
        self.submit_task_at(form, editing, Utc::now())
    }

    pub fn submit_task_at(&self, form: &TaskForm, editing: Option<&Task>, now: DateTime<Utc>) -> Result<Submission> {
        let payload = form.to_payload(editing, now)?;

        let persisted = match editing {
            Some(current) => {
                let task = self.tasks.update_task(current.id, &payload)?;
                tracing::info!(id = task.id, "task updated");
                return Ok(Submission { persisted: task, enrichment: Enrichment::Skipped });
            }
            None => self.tasks.create_task(&payload)?,
        };
        tracing::info!(id = persisted.id, title = %persisted.title, "task created");

        let enrichment = self.enrich_at(&persisted, now);
        if let Enrichment::Failed { error, .. } = &enrichment {
            tracing::warn!(id = persisted.id, %error, "enrichment failed, keeping task as saved");
        }
        Ok(Submission { persisted, enrichment })
    }

    /// Steps 2–4 for an already persisted task. Never fails; failures are
    /// reported as [`Enrichment::Failed`].
    pub fn enrich_at(&self, task: &Task, now: DateTime<Utc>) -> Enrichment {
        let request = suggestion_request(task, now);
        let suggestion = match self.suggestions.suggest(&request) {
            Ok(s) => s,
            Err(error) => {
                return Enrichment::Failed { error, suggestion: None, created_categories: Vec::new() };
            }
        };
        tracing::debug!(id = task.id, ?suggestion, "suggestion received");

        let names = suggestion.category_names();
        let mut created_categories = Vec::new();
        let mut category_ids = Vec::new();
        if !names.is_empty() {
            match reconcile_categories(self.categories, &names) {
                Ok(r) => {
                    for name in &r.skipped {
                        tracing::warn!(id = task.id, name = %name, "suggested category not attached");
                    }
                    category_ids = r.ids;
                    created_categories = r.created;
                }
                Err(error) => {
                    tracing::warn!(id = task.id, %error, "category reconciliation skipped");
                }
            }
        }

        let updated = apply_suggestion(task, &suggestion, &category_ids);
        if updated == task.payload() {
            tracing::info!(id = task.id, "suggestion changes nothing");
            return Enrichment::Unchanged { suggestion };
        }

        match self.tasks.update_task(task.id, &updated) {
            Ok(enriched) => {
                tracing::info!(
                    id = enriched.id,
                    priority_score = enriched.priority_score,
                    categories = enriched.categories.len(),
                    "task enriched"
                );
                Enrichment::Applied { suggestion, task: enriched, created_categories }
            }
            Err(error) => Enrichment::Failed { error, suggestion: Some(suggestion), created_categories },
        }
    }
}
