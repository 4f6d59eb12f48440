//! Collaborator interfaces.
//!
//! Each backend resource is a trait so the enrichment workflow can run against
//! the HTTP client or an in-process backend. Methods take `&self`; a store is
//! expected to handle its own interior state.

use crate::category::Category;
use crate::context::{ContextEntry, NewContextEntry};
use crate::error::Result;
use crate::suggestion::{SuggestionRequest, SuggestionResult};
use crate::task::{Task, TaskPayload};

/// Persists tasks. Identity is assigned by the store.
pub trait TaskStore {
    fn list_tasks(&self, page_size: usize) -> Result<Vec<Task>>;
    fn create_task(&self, payload: &TaskPayload) -> Result<Task>;
    fn update_task(&self, id: u64, payload: &TaskPayload) -> Result<Task>;
    fn delete_task(&self, id: u64) -> Result<()>;
}

/// Persists categories.
pub trait CategoryStore {
    fn list_categories(&self) -> Result<Vec<Category>>;
    fn create_category(&self, name: &str) -> Result<Category>;
}

/// Read/append access to context entries.
pub trait ContextStore {
    fn list_context(&self, page_size: usize) -> Result<Vec<ContextEntry>>;
    fn create_context(&self, entry: &NewContextEntry) -> Result<ContextEntry>;
}

/// Produces AI enrichment for a task-like payload.
pub trait SuggestionService {
    fn suggest(&self, request: &SuggestionRequest) -> Result<SuggestionResult>;
}
