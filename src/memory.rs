//! In-process backend implementing every store trait.
//!
//! Holds tasks, categories and context entries in vectors, assigns ids the way
//! the server does, enforces unique category names, records every call, and
//! can be told to fail specific calls. Used to exercise the workflow without a
//! server.

use std::cell::RefCell;
use std::collections::HashSet;

use chrono::Utc;

use crate::category::{normalise_category_name, Category};
use crate::context::{ContextEntry, NewContextEntry};
use crate::error::{ApiError, Result};
use crate::store::*;
use crate::suggestion::{SuggestionRequest, SuggestionResult};
use crate::task::{Task, TaskPayload};

#[derive(Debug, Default)]
struct State {
    tasks: Vec<Task>,
    categories: Vec<Category>,
    contexts: Vec<ContextEntry>,
    calls: Vec<&'static str>,
    suggestion_requests: Vec<SuggestionRequest>,
    suggestion: Option<SuggestionResult>,
    suggestion_status: Option<u16>,
    fail_task_create: bool,
    fail_task_update: bool,
    fail_category_listing: bool,
    hide_next_listing: bool,
    failing_category_names: HashSet<String>,
}

impl State {
    fn next_id<T>(items: &[T], id: impl Fn(&T) -> u64) -> u64 {
        items.iter().map(id).max().unwrap_or(0) + 1
    }

    /// Resolve category ids against stored categories, as the server does.
    fn categories_for(&self, ids: &[u64]) -> Result<Vec<Category>> {
        ids.iter()
            .map(|id| {
                self.categories.iter().find(|c| c.id == *id).cloned().ok_or_else(|| rejected(
                    "save task",
                    400,
                    format!("Invalid pk \"{id}\" - object does not exist."),
                ))
            })
            .collect()
    }
}

fn rejected(what: &'static str, status: u16, body: String) -> ApiError {
    ApiError::Persistence { what, status, body }
}

/// In-memory stand-in for the REST backend.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    state: RefCell<State>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed_category(&self, name: &str) -> Category {
        let mut s = self.state.borrow_mut();
        let category = Category {
            id: State::next_id(&s.categories, |c| c.id),
            name: name.to_string(),
            slug: Some(normalise_category_name(name).replace(' ', "-")),
            usage_count: Some(0),
        };
        s.categories.push(category.clone());
        category
    }

    pub fn seed_task(&self, title: &str, priority_score: f64) -> Task {
        let mut s = self.state.borrow_mut();
        let now = Utc::now();
        let task = Task {
            id: State::next_id(&s.tasks, |t| t.id),
            title: title.to_string(),
            description: String::new(),
            priority_score,
            deadline: None,
            categories: Vec::new(),
            status: Default::default(),
            created_at: Some(now),
            updated_at: Some(now),
        };
        s.tasks.push(task.clone());
        task
    }

    /// Answer the next suggestion calls with this result.
    pub fn respond_with(&self, suggestion: SuggestionResult) {
        let mut s = self.state.borrow_mut();
        s.suggestion = Some(suggestion);
        s.suggestion_status = None;
    }

    /// Answer the next suggestion calls with this HTTP status.
    pub fn suggestion_fails_with(&self, status: u16) {
        self.state.borrow_mut().suggestion_status = Some(status);
    }

    pub fn fail_task_create(&self) {
        self.state.borrow_mut().fail_task_create = true;
    }

    pub fn fail_task_update(&self) {
        self.state.borrow_mut().fail_task_update = true;
    }

    pub fn fail_category_listing(&self) {
        self.state.borrow_mut().fail_category_listing = true;
    }

    pub fn fail_category_create(&self, name: &str) {
        self.state.borrow_mut().failing_category_names.insert(normalise_category_name(name));
    }

    /// The next category listing returns nothing, as if another client created
    /// the categories right after it was read.
    pub fn hide_categories_from_next_listing(&self) {
        self.state.borrow_mut().hide_next_listing = true;
    }

    pub fn tasks(&self) -> Vec<Task> {
        self.state.borrow().tasks.clone()
    }

    pub fn task(&self, id: u64) -> Option<Task> {
        self.state.borrow().tasks.iter().find(|t| t.id == id).cloned()
    }

    pub fn category_names(&self) -> Vec<String> {
        self.state.borrow().categories.iter().map(|c| c.name.clone()).collect()
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.state.borrow().calls.clone()
    }

    pub fn calls_to(&self, call: &str) -> usize {
        self.state.borrow().calls.iter().filter(|c| **c == call).count()
    }

    pub fn suggestion_requests(&self) -> Vec<SuggestionRequest> {
        self.state.borrow().suggestion_requests.clone()
    }
}

impl TaskStore for MemoryBackend {
    fn list_tasks(&self, page_size: usize) -> Result<Vec<Task>> {
        let mut s = self.state.borrow_mut();
        s.calls.push("list_tasks");
        Ok(s.tasks.iter().take(page_size).cloned().collect())
    }

    fn create_task(&self, payload: &TaskPayload) -> Result<Task> {
        let mut s = self.state.borrow_mut();
        s.calls.push("create_task");
        if s.fail_task_create {
            return Err(rejected("create task", 500, "server error".into()));
        }
        let categories = s.categories_for(&payload.category_ids)?;
        let now = Utc::now();
        let task = Task {
            id: State::next_id(&s.tasks, |t| t.id),
            title: payload.title.clone(),
            description: payload.description.clone(),
            priority_score: payload.priority_score,
            deadline: payload.deadline,
            categories,
            status: Default::default(),
            created_at: Some(now),
            updated_at: Some(now),
        };
        s.tasks.push(task.clone());
        Ok(task)
    }

    fn update_task(&self, id: u64, payload: &TaskPayload) -> Result<Task> {
        let mut s = self.state.borrow_mut();
        s.calls.push("update_task");
        if s.fail_task_update {
            return Err(rejected("update task", 500, "server error".into()));
        }
        let categories = s.categories_for(&payload.category_ids)?;
        let Some(task) = s.tasks.iter_mut().find(|t| t.id == id) else {
            return Err(rejected("update task", 404, "Not found.".into()));
        };
        task.title = payload.title.clone();
        task.description = payload.description.clone();
        task.priority_score = payload.priority_score;
        task.deadline = payload.deadline;
        task.categories = categories;
        task.updated_at = Some(Utc::now());
        Ok(task.clone())
    }

    fn delete_task(&self, id: u64) -> Result<()> {
        let mut s = self.state.borrow_mut();
        s.calls.push("delete_task");
        let before = s.tasks.len();
        s.tasks.retain(|t| t.id != id);
        if s.tasks.len() == before {
            return Err(rejected("delete task", 404, "Not found.".into()));
        }
        Ok(())
    }
}

impl CategoryStore for MemoryBackend {
    fn list_categories(&self) -> Result<Vec<Category>> {
        let mut s = self.state.borrow_mut();
        s.calls.push("list_categories");
        if s.fail_category_listing {
            return Err(rejected("list categories", 503, "unavailable".into()));
        }
        if s.hide_next_listing {
            s.hide_next_listing = false;
            return Ok(Vec::new());
        }
        Ok(s.categories.clone())
    }

    fn create_category(&self, name: &str) -> Result<Category> {
        let key = normalise_category_name(name);
        {
            let mut s = self.state.borrow_mut();
            s.calls.push("create_category");
            if s.failing_category_names.contains(&key) {
                return Err(rejected("create category", 500, "server error".into()));
            }
            if s.categories.iter().any(|c| normalise_category_name(&c.name) == key) {
                return Err(rejected(
                    "create category",
                    400,
                    r#"{"name":["category with this name already exists."]}"#.into(),
                ));
            }
        }
        Ok(self.seed_category(name))
    }
}

impl ContextStore for MemoryBackend {
    fn list_context(&self, page_size: usize) -> Result<Vec<ContextEntry>> {
        let mut s = self.state.borrow_mut();
        s.calls.push("list_context");
        // Newest first, like the server.
        Ok(s.contexts.iter().rev().take(page_size).cloned().collect())
    }

    fn create_context(&self, entry: &NewContextEntry) -> Result<ContextEntry> {
        let mut s = self.state.borrow_mut();
        s.calls.push("create_context");
        let created = ContextEntry {
            id: State::next_id(&s.contexts, |c| c.id),
            source_type: entry.source_type,
            content: entry.content.clone().into(),
            processed_insights: None,
            created_at: Some(Utc::now()),
        };
        s.contexts.push(created.clone());
        Ok(created)
    }
}

impl SuggestionService for MemoryBackend {
    fn suggest(&self, request: &SuggestionRequest) -> Result<SuggestionResult> {
        let mut s = self.state.borrow_mut();
        s.calls.push("suggest");
        s.suggestion_requests.push(request.clone());
        if let Some(status) = s.suggestion_status {
            return Err(ApiError::Suggestion(format!("HTTP {status}")));
        }
        Ok(s.suggestion.clone().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_assigned_sequentially() {
        let backend = MemoryBackend::new();
        let a = backend.seed_task("a", 1.0);
        let b = backend.seed_task("b", 1.0);
        assert_eq!((a.id, b.id), (1, 2));
        backend.delete_task(1).unwrap();
        assert_eq!(backend.seed_task("c", 1.0).id, 3);
    }

    #[test]
    fn test_delete_missing_task_leaves_list_unchanged() {
        let backend = MemoryBackend::new();
        backend.seed_task("keep", 2.0);
        let err = backend.delete_task(42).unwrap_err();
        assert_eq!(err.status(), Some(404));
        assert_eq!(backend.tasks().len(), 1);
    }

    #[test]
    fn test_unknown_category_ids_are_rejected() {
        let backend = MemoryBackend::new();
        let payload = TaskPayload {
            title: "t".into(),
            description: "d".into(),
            category_ids: vec![99],
            priority_score: 1.0,
            deadline: None,
        };
        assert_eq!(backend.create_task(&payload).unwrap_err().status(), Some(400));
        assert!(backend.tasks().is_empty());
    }
}
