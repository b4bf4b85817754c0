//! Validation and audit report types

use forma_core::{Diagnostic, Severity};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Result of validating an intent tree
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub errors: Vec<Diagnostic>,
    pub warnings: Vec<Diagnostic>,
}

impl ValidationReport {
    /// Create an empty report
    pub fn new() -> Self {
        Self::default()
    }

    /// Route a diagnostic to errors or warnings by its severity
    pub fn push(&mut self, diagnostic: Diagnostic) {
        if diagnostic.is_error() {
            self.errors.push(diagnostic);
        } else {
            self.warnings.push(diagnostic);
        }
    }

    /// Check if the tree is valid (no errors)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    /// All diagnostics for one node
    pub fn for_node<'a>(&'a self, node_id: &'a str) -> impl Iterator<Item = &'a Diagnostic> + 'a {
        self.errors
            .iter()
            .chain(self.warnings.iter())
            .filter(move |d| d.node_id.as_deref() == Some(node_id))
    }

    /// Get a human-readable summary
    pub fn summary(&self) -> String {
        let total = self.errors.len() + self.warnings.len();
        if total == 0 {
            return "No issues found.".to_string();
        }

        format!(
            "{} issue(s): {} error(s), {} warning(s)",
            total,
            self.error_count(),
            self.warning_count(),
        )
    }
}

/// Design-quality category of an audit warning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditCategory {
    VisualHierarchy,
    Typography,
    Accessibility,
    Completeness,
}

impl AuditCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditCategory::VisualHierarchy => "VISUAL_HIERARCHY",
            AuditCategory::Typography => "TYPOGRAPHY",
            AuditCategory::Accessibility => "ACCESSIBILITY",
            AuditCategory::Completeness => "COMPLETENESS",
        }
    }
}

impl fmt::Display for AuditCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A non-blocking design-quality issue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditWarning {
    pub message: String,
    pub node_id: String,
    pub category: AuditCategory,
    pub severity: Severity,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuditReport {
    pub warnings: Vec<AuditWarning>,
}

impl AuditReport {
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn count(&self, category: AuditCategory) -> usize {
        self.warnings
            .iter()
            .filter(|w| w.category == category)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use forma_core::ErrorKind;

    #[test]
    fn test_push_routes_by_severity() {
        let mut report = ValidationReport::new();
        assert!(report.is_valid());
        assert_eq!(report.summary(), "No issues found.");

        report.push(Diagnostic::warning(ErrorKind::EmptyText, "t", "empty"));
        assert!(report.is_valid());

        report.push(Diagnostic::error(ErrorKind::DuplicateId, "a", "dup"));
        assert!(!report.is_valid());
        assert_eq!(report.summary(), "2 issue(s): 1 error(s), 1 warning(s)");
        assert_eq!(report.for_node("a").count(), 1);
    }

    #[test]
    fn test_category_serializes_screaming_snake() {
        let json = serde_json::to_string(&AuditCategory::VisualHierarchy).unwrap();
        assert_eq!(json, "\"VISUAL_HIERARCHY\"");
    }
}
