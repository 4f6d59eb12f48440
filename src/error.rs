//! Error taxonomy shared by the HTTP client, the in-process stores and the
//! enrichment workflow.
//!
//! Every failure is scoped to the single command that triggered it: nothing in
//! this crate retries, and nothing below the command handlers ends the process.

/// Errors raised while talking to the backend or validating user input.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// A store (tasks, categories, context) answered with a non-2xx status.
    #[error("{what} failed with HTTP {status}: {body}")]
    Persistence {
        what: &'static str,
        status: u16,
        body: String,
    },

    /// The suggestion service answered with a non-2xx status or a body that
    /// is not a suggestion object.
    #[error("Suggestion service error: {0}")]
    Suggestion(String),

    /// Transport failure: unreachable host, refused connection, timeout.
    #[error("Network error: {0}")]
    Network(String),

    /// A store answered 2xx but the body did not match the expected shape.
    #[error("Unexpected response from {what}: {message}")]
    Decode { what: &'static str, message: String },

    /// Form input rejected before any request was sent.
    #[error("Invalid input: {0}")]
    Validation(String),

    /// Configuration file or environment could not be used.
    #[error("Config error: {0}")]
    Config(String),
}

impl ApiError {
    /// HTTP status of a rejected store call, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Persistence { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the store rejected the request as conflicting with existing
    /// data. Django REST reports unique-constraint violations as 400.
    pub fn is_conflict(&self) -> bool {
        matches!(self.status(), Some(400) | Some(409))
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
