//! Node-scoped diagnostics shared by validation, resolution and rendering

use crate::error::ErrorKind;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity level for a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

/// A single issue tied (usually) to one node of the intent tree.
///
/// `message` is the human guidance; `detail` carries the raw technical
/// context so the two can be surfaced differently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: ErrorKind,
    pub severity: Severity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_id: Option<String>,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    pub remediation: String,
}

impl Diagnostic {
    pub fn error(kind: ErrorKind, node_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(kind, Severity::Error, Some(node_id.into()), message.into())
    }

    pub fn warning(kind: ErrorKind, node_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(kind, Severity::Warning, Some(node_id.into()), message.into())
    }

    /// A diagnostic that is not tied to any node (e.g. unparseable input)
    pub fn global(kind: ErrorKind, severity: Severity, message: impl Into<String>) -> Self {
        Self::new(kind, severity, None, message.into())
    }

    fn new(kind: ErrorKind, severity: Severity, node_id: Option<String>, message: String) -> Self {
        Self {
            kind,
            severity,
            node_id,
            message,
            detail: None,
            remediation: kind.remediation().to_string(),
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.node_id {
            Some(id) => write!(f, "[{}] {}: {}", self.kind, id, self.message),
            None => write!(f, "[{}] {}", self.kind, self.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_carries_remediation() {
        let d = Diagnostic::error(ErrorKind::DanglingVariable, "card", "Unknown variable 'v:9'");
        assert!(d.is_error());
        assert_eq!(d.remediation, ErrorKind::DanglingVariable.remediation());
        assert_eq!(d.to_string(), "[DANGLING_VARIABLE] card: Unknown variable 'v:9'");
    }

    #[test]
    fn test_detail_kept_separate() {
        let d = Diagnostic::global(ErrorKind::MalformedInput, Severity::Error, "Could not read design")
            .with_detail("expected value at line 1 column 2");
        assert!(!d.message.contains("line 1"));
        assert_eq!(d.detail.as_deref(), Some("expected value at line 1 column 2"));
        assert!(d.node_id.is_none());
    }
}
