//! Forma Constraint - Validation, audit and auto-fix passes
//!
//! This crate checks intent trees before resolution (blocking errors vs.
//! warnings), audits resolved trees for design-quality issues, and fixes
//! the mistakes generators commonly make.

mod auditor;
mod fixer;
mod report;
mod validator;

pub use auditor::Auditor;
pub use fixer::{FixRecord, FixReport, FixType, Fixer, FixerConfig};
pub use report::{AuditCategory, AuditReport, AuditWarning, ValidationReport};
pub use validator::{ValidationConfig, Validator};
