//! HTTP client for the SmartTodo REST backend.
//!
//! One blocking `ureq` agent per process, one request per call. Status codes
//! are inspected here rather than by the transport so that error bodies can be
//! reported back to the user.
//!
//! # Endpoints
//!
//! | Call | Method | Path |
//! |---|---|---|
//! | list tasks | GET | `/api/tasks/?page_size=N` |
//! | create task | POST | `/api/tasks/` |
//! | update task | PUT | `/api/tasks/{id}/` |
//! | delete task | DELETE | `/api/tasks/{id}/` |
//! | list categories | GET | `/api/categories/` |
//! | create category | POST | `/api/categories/` |
//! | list context | GET | `/api/context/?page_size=N` |
//! | create context | POST | `/api/context/` |
//! | suggestions | POST | `/api/ai/suggest/` |
//!
//! List endpoints answer either `{"results": [...]}` (paginated) or a bare
//! array; both are accepted. Only the first page is read.

use std::time::{Duration, Instant};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use ureq::http::Response;
use ureq::{Agent, Body, RequestBuilder};

use crate::category::{Category, NewCategory};
use crate::config::Config;
use crate::context::{ContextEntry, NewContextEntry};
use crate::error::{ApiError, Result};
use crate::store::*;
use crate::suggestion::{SuggestionRequest, SuggestionResult};
use crate::task::{Task, TaskPayload};

const CSRF_HEADER: &str = "X-CSRFToken";

#[derive(Deserialize)]
#[serde(untagged)]
enum Listing<T> {
    Bare(Vec<T>),
    Page { results: Vec<T> },
}

impl<T> Listing<T> {
    fn into_items(self) -> Vec<T> {
        match self {
            Listing::Bare(items) => items,
            Listing::Page { results } => results,
        }
    }
}

/// Blocking client bound to one backend base URL.
pub struct ApiClient {
    agent: Agent,
    base_url: String,
    csrf_token: Option<String>,
}

impl ApiClient {
    pub fn new(config: &Config) -> Self {
        let agent: Agent = Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(Duration::from_secs(config.timeout_secs)))
            .build()
            .into();
        Self {
            agent,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            csrf_token: config.csrf_token.clone(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn with_token<B>(&self, req: RequestBuilder<B>) -> RequestBuilder<B> {
        match &self.csrf_token {
            Some(token) => req.header(CSRF_HEADER, token),
            None => req,
        }
    }

    fn get<T: DeserializeOwned>(&self, what: &'static str, path: &str, page_size: Option<usize>) -> Result<T> {
        let url = self.url(path);
        tracing::debug!(%url, ?page_size, "GET");
        let mut req = self.with_token(self.agent.get(&url));
        if let Some(n) = page_size {
            req = req.query("page_size", n.to_string());
        }
        let started = Instant::now();
        let (status, body) = exchange(req.call())?;
        tracing::debug!(what, status, elapsed = ?started.elapsed(), "response");
        decode(what, status, &body)
    }

    fn send<P: Serialize, T: DeserializeOwned>(
        &self,
        what: &'static str,
        method: Method,
        path: &str,
        payload: &P,
    ) -> Result<T> {
        let (status, body) = self.send_raw(what, method, path, payload)?;
        decode(what, status, &body)
    }

    fn send_raw<P: Serialize>(
        &self,
        what: &'static str,
        method: Method,
        path: &str,
        payload: &P,
    ) -> Result<(u16, String)> {
        let url = self.url(path);
        tracing::debug!(%url, method = method.as_str(), "sending");
        let req = match method {
            Method::Post => self.agent.post(&url),
            Method::Put => self.agent.put(&url),
        };
        let started = Instant::now();
        let result = exchange(self.with_token(req).send_json(payload));
        if let Ok((status, _)) = &result {
            tracing::debug!(what, status, elapsed = ?started.elapsed(), "response");
        }
        result
    }
}

#[derive(Debug, Clone, Copy)]
enum Method {
    Post,
    Put,
}

impl Method {
    fn as_str(self) -> &'static str {
        match self {
            Method::Post => "POST",
            Method::Put => "PUT",
        }
    }
}

fn exchange(result: std::result::Result<Response<Body>, ureq::Error>) -> Result<(u16, String)> {
    let mut resp = result.map_err(|e| ApiError::Network(e.to_string()))?;
    let status = resp.status().as_u16();
    let body = resp
        .body_mut()
        .read_to_string()
        .map_err(|e| ApiError::Network(e.to_string()))?;
    Ok((status, body))
}

fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

fn decode<T: DeserializeOwned>(what: &'static str, status: u16, body: &str) -> Result<T> {
    if !is_success(status) {
        return Err(ApiError::Persistence { what, status, body: body.trim().to_string() });
    }
    serde_json::from_str(body).map_err(|e| ApiError::Decode { what, message: e.to_string() })
}

impl TaskStore for ApiClient {
    fn list_tasks(&self, page_size: usize) -> Result<Vec<Task>> {
        let listing: Listing<Task> = self.get("list tasks", "/api/tasks/", Some(page_size))?;
        Ok(listing.into_items())
    }

    fn create_task(&self, payload: &TaskPayload) -> Result<Task> {
        self.send("create task", Method::Post, "/api/tasks/", payload)
    }

    fn update_task(&self, id: u64, payload: &TaskPayload) -> Result<Task> {
        self.send("update task", Method::Put, &format!("/api/tasks/{id}/"), payload)
    }

    fn delete_task(&self, id: u64) -> Result<()> {
        let url = self.url(&format!("/api/tasks/{id}/"));
        tracing::debug!(%url, "DELETE");
        let (status, body) = exchange(self.with_token(self.agent.delete(&url)).call())?;
        if !is_success(status) {
            return Err(ApiError::Persistence { what: "delete task", status, body: body.trim().to_string() });
        }
        Ok(())
    }
}

impl CategoryStore for ApiClient {
    fn list_categories(&self) -> Result<Vec<Category>> {
        let listing: Listing<Category> = self.get("list categories", "/api/categories/", None)?;
        Ok(listing.into_items())
    }

    fn create_category(&self, name: &str) -> Result<Category> {
        let body = NewCategory { name: name.to_string() };
        self.send("create category", Method::Post, "/api/categories/", &body)
    }
}

impl ContextStore for ApiClient {
    fn list_context(&self, page_size: usize) -> Result<Vec<ContextEntry>> {
        let listing: Listing<ContextEntry> = self.get("list context", "/api/context/", Some(page_size))?;
        Ok(listing.into_items())
    }

    fn create_context(&self, entry: &NewContextEntry) -> Result<ContextEntry> {
        self.send("create context", Method::Post, "/api/context/", entry)
    }
}

impl SuggestionService for ApiClient {
    fn suggest(&self, request: &SuggestionRequest) -> Result<SuggestionResult> {
        let (status, body) = self.send_raw("suggestions", Method::Post, "/api/ai/suggest/", request)?;
        if !is_success(status) {
            return Err(ApiError::Suggestion(format!("HTTP {status}: {}", body.trim())));
        }
        if body.trim().is_empty() {
            return Ok(SuggestionResult::default());
        }
        serde_json::from_str(&body).map_err(|e| ApiError::Suggestion(format!("malformed response: {e}")))
    }
}
