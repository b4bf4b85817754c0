//! Forma Core - Foundational types for the Forma design pipeline
//!
//! This crate provides the types every other Forma crate depends on:
//! - `FormaError` / `ErrorKind` - Error taxonomy and Result alias
//! - `Diagnostic`, `Severity` - Node-scoped issues with guidance and remediation
//! - `Color`, `Lab` - sRGB colors and CIELAB perceptual distance

mod color;
mod diagnostic;
mod error;

pub use color::{Color, Lab};
pub use diagnostic::{Diagnostic, Severity};
pub use error::{ErrorKind, FormaError, Result};
