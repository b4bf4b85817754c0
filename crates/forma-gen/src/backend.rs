//! Generation backend trait and request/response types

use async_trait::async_trait;
use forma_core::{ErrorKind, FormaError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A request to turn free text into an intent tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// The user's description of the screen
    pub intent: String,
    /// Component names the generator may reference
    #[serde(default)]
    pub component_names: Vec<String>,
    /// Feedback from an earlier attempt, when regenerating
    #[serde(default)]
    pub feedback: Option<String>,
}

impl GenerationRequest {
    pub fn new(intent: impl Into<String>) -> Self {
        Self {
            intent: intent.into(),
            component_names: Vec::new(),
            feedback: None,
        }
    }
}

/// Raw generator output; the tree is validated downstream, not here
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedDesign {
    pub tree_json: String,
    /// The generator's own confidence in (0, 1], when it reports one
    #[serde(default)]
    pub self_assessment: Option<f64>,
}

/// Failure classes a backend can report
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationFailure {
    #[error("rate limited: {0}")]
    RateLimited(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("server error: {0}")]
    Server(String),

    #[error("authentication failed: {0}")]
    Authentication(String),

    #[error("quota exhausted: {0}")]
    QuotaExhausted(String),

    #[error("{0}")]
    Other(String),
}

impl GenerationFailure {
    /// Rate-limit, network and server failures are worth another attempt
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            GenerationFailure::RateLimited(_)
                | GenerationFailure::Network(_)
                | GenerationFailure::Server(_)
        )
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            GenerationFailure::RateLimited(_) => ErrorKind::RateLimited,
            GenerationFailure::Network(_) => ErrorKind::Network,
            GenerationFailure::Authentication(_) => ErrorKind::Authentication,
            GenerationFailure::QuotaExhausted(_) => ErrorKind::QuotaExhausted,
            GenerationFailure::Server(_) | GenerationFailure::Other(_) => ErrorKind::Generation,
        }
    }

    /// Classify an HTTP status the way backends report them
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            401 | 403 => GenerationFailure::Authentication(message),
            402 => GenerationFailure::QuotaExhausted(message),
            429 => GenerationFailure::RateLimited(message),
            500..=599 => GenerationFailure::Server(message),
            _ => GenerationFailure::Other(message),
        }
    }
}

impl From<GenerationFailure> for FormaError {
    fn from(failure: GenerationFailure) -> Self {
        FormaError::Generation {
            kind: failure.kind(),
            message: failure.to_string(),
        }
    }
}

/// Implemented by each generator (hosted model, local model, mock)
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Backend name (e.g. "mock")
    fn name(&self) -> &str;

    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> std::result::Result<GeneratedDesign, GenerationFailure>;
}
