//! Error types for Forma

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Machine-readable classification shared by errors and diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    MissingField,
    InvalidColor,
    MissingColorChannel,
    DanglingVariable,
    UnresolvedComponent,
    AtomicityViolation,
    DuplicateId,
    Cycle,
    DepthExceeded,
    MalformedInput,
    EmptyText,
    ResolutionFailure,
    TooComplex,
    Cancelled,
    NodeRender,
    RootRender,
    UnknownStyle,
    Config,
    Io,
    Generation,
    RateLimited,
    Network,
    Authentication,
    QuotaExhausted,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::MissingField => "MISSING_FIELD",
            ErrorKind::InvalidColor => "INVALID_COLOR",
            ErrorKind::MissingColorChannel => "MISSING_COLOR_CHANNEL",
            ErrorKind::DanglingVariable => "DANGLING_VARIABLE",
            ErrorKind::UnresolvedComponent => "UNRESOLVED_COMPONENT",
            ErrorKind::AtomicityViolation => "ATOMICITY_VIOLATION",
            ErrorKind::DuplicateId => "DUPLICATE_ID",
            ErrorKind::Cycle => "CYCLE",
            ErrorKind::DepthExceeded => "DEPTH_EXCEEDED",
            ErrorKind::MalformedInput => "MALFORMED_INPUT",
            ErrorKind::EmptyText => "EMPTY_TEXT",
            ErrorKind::ResolutionFailure => "RESOLUTION_FAILURE",
            ErrorKind::TooComplex => "TOO_COMPLEX",
            ErrorKind::Cancelled => "CANCELLED",
            ErrorKind::NodeRender => "NODE_RENDER",
            ErrorKind::RootRender => "ROOT_RENDER",
            ErrorKind::UnknownStyle => "UNKNOWN_STYLE",
            ErrorKind::Config => "CONFIG",
            ErrorKind::Io => "IO",
            ErrorKind::Generation => "GENERATION",
            ErrorKind::RateLimited => "RATE_LIMITED",
            ErrorKind::Network => "NETWORK",
            ErrorKind::Authentication => "AUTHENTICATION",
            ErrorKind::QuotaExhausted => "QUOTA_EXHAUSTED",
        }
    }

    /// Suggested remediation shown to the user, separate from technical detail
    pub fn remediation(&self) -> &'static str {
        match self {
            ErrorKind::MissingField => "Regenerate the design or add the missing field.",
            ErrorKind::InvalidColor => "Use color channels between 0 and 1.",
            ErrorKind::MissingColorChannel => {
                "The style will be skipped; provide r, g and b to apply it."
            }
            ErrorKind::DanglingVariable => {
                "Reference a variable that exists in the library, or remove the binding."
            }
            ErrorKind::UnresolvedComponent => {
                "A similar component or styled fallback will be used instead."
            }
            ErrorKind::AtomicityViolation => {
                "Component instances cannot contain children; wrap them in a container."
            }
            ErrorKind::DuplicateId => "Give every node a unique id.",
            ErrorKind::Cycle => "Remove the node that contains one of its own ancestors.",
            ErrorKind::DepthExceeded => "Flatten the layout so it nests less deeply.",
            ErrorKind::MalformedInput => "Regenerate the design; the input could not be read.",
            ErrorKind::EmptyText => "Add text content or remove the empty text node.",
            ErrorKind::ResolutionFailure => "Report this design; no fallback could be applied.",
            ErrorKind::TooComplex => "Split the request into smaller screens or sections.",
            ErrorKind::Cancelled => "Run the request again when ready.",
            ErrorKind::NodeRender => "The rest of the design was rendered; check this element.",
            ErrorKind::RootRender => "Regenerate the design; its top-level frame failed.",
            ErrorKind::UnknownStyle => "The style token was ignored.",
            ErrorKind::Config => "Check .forma/config.toml for invalid values.",
            ErrorKind::Io => "Check that the file exists and is readable.",
            ErrorKind::Generation => "Try the request again.",
            ErrorKind::RateLimited => "Wait a moment before sending another request.",
            ErrorKind::Network => "Check your network connection and try again.",
            ErrorKind::Authentication => "Check the configured API key.",
            ErrorKind::QuotaExhausted => "The generation quota is used up; check your plan.",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The main error type for Forma operations
#[derive(Debug, Error)]
pub enum FormaError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Validation failed with {errors} error(s)")]
    ValidationFailed { errors: usize },

    #[error("No resolution tier succeeded for node '{node_id}' (tried: {})", .history.join(" -> "))]
    ResolutionFailure {
        node_id: String,
        history: Vec<String>,
    },

    #[error("Design too complex: {nodes} nodes exceeds the budget of {budget}")]
    TooComplex { nodes: usize, budget: usize },

    #[error("Render cancelled after {processed} node(s)")]
    Cancelled { processed: usize },

    #[error("Root node '{node_id}' failed to render: {reason}")]
    RootRender { node_id: String, reason: String },

    #[error("Generation error ({kind}): {message}")]
    Generation { kind: ErrorKind, message: String },

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(String),

    #[error("TOML parse error: {0}")]
    TomlParse(String),
}

/// Result type alias for Forma operations
pub type Result<T> = std::result::Result<T, FormaError>;

impl FormaError {
    /// Machine-readable kind of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            FormaError::InvalidInput(_) | FormaError::Json(_) => ErrorKind::MalformedInput,
            FormaError::ValidationFailed { .. } => ErrorKind::MissingField,
            FormaError::ResolutionFailure { .. } => ErrorKind::ResolutionFailure,
            FormaError::TooComplex { .. } => ErrorKind::TooComplex,
            FormaError::Cancelled { .. } => ErrorKind::Cancelled,
            FormaError::RootRender { .. } => ErrorKind::RootRender,
            FormaError::Generation { kind, .. } => *kind,
            FormaError::Config(_) | FormaError::TomlParse(_) => ErrorKind::Config,
            FormaError::Io(_) => ErrorKind::Io,
        }
    }

    /// Human guidance, kept apart from the technical `Display` text
    pub fn guidance(&self) -> String {
        match self {
            FormaError::TooComplex { budget, .. } => format!(
                "This design has more than {} elements, which is too many to build at once.",
                budget
            ),
            FormaError::Cancelled { .. } => "The render was cancelled.".to_string(),
            FormaError::ValidationFailed { errors } => {
                format!("The design has {} problem(s) that must be fixed first.", errors)
            }
            FormaError::RootRender { .. } => "The design's top-level frame could not be built.".to_string(),
            FormaError::Generation { kind, .. } => match kind {
                ErrorKind::RateLimited => "The generation service is busy.".to_string(),
                ErrorKind::Authentication => "The generation service rejected the credentials.".to_string(),
                ErrorKind::QuotaExhausted => "The generation quota has been exhausted.".to_string(),
                _ => "The generation service failed to respond.".to_string(),
            },
            _ => "Something went wrong while building the design.".to_string(),
        }
    }

    /// Suggested remediation
    pub fn remediation(&self) -> &'static str {
        self.kind().remediation()
    }
}

impl From<serde_json::Error> for FormaError {
    fn from(err: serde_json::Error) -> Self {
        FormaError::Json(err.to_string())
    }
}

impl From<toml::de::Error> for FormaError {
    fn from(err: toml::de::Error) -> Self {
        FormaError::TomlParse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        let err = FormaError::TooComplex {
            nodes: 900,
            budget: 500,
        };
        assert_eq!(err.kind(), ErrorKind::TooComplex);
        assert!(err.to_string().contains("900"));
        assert!(err.guidance().contains("500"));

        let err = FormaError::Cancelled { processed: 3 };
        assert_eq!(err.kind(), ErrorKind::Cancelled);
    }

    #[test]
    fn test_guidance_separate_from_detail() {
        let err = FormaError::Generation {
            kind: ErrorKind::RateLimited,
            message: "HTTP 429 from upstream".to_string(),
        };
        assert!(err.to_string().contains("429"));
        assert!(!err.guidance().contains("429"));
        assert_eq!(err.remediation(), ErrorKind::RateLimited.remediation());
    }

    #[test]
    fn test_json_error_is_malformed_input() {
        let parse: std::result::Result<serde_json::Value, _> = serde_json::from_str("{not json");
        let err: FormaError = parse.unwrap_err().into();
        assert_eq!(err.kind(), ErrorKind::MalformedInput);
    }

    #[test]
    fn test_kind_serializes_screaming_snake() {
        let json = serde_json::to_string(&ErrorKind::DepthExceeded).unwrap();
        assert_eq!(json, "\"DEPTH_EXCEEDED\"");
        assert_eq!(ErrorKind::DepthExceeded.to_string(), "DEPTH_EXCEEDED");
    }

    #[test]
    fn test_resolution_failure_lists_history() {
        let err = FormaError::ResolutionFailure {
            node_id: "btn".to_string(),
            history: vec!["exact_reference".to_string(), "hard_default".to_string()],
        };
        assert!(err.to_string().contains("exact_reference -> hard_default"));
    }
}
