//! Forma Pipeline - Runs intent trees through every stage
//!
//! - `FormaConfig` - Layered configuration (global, project, environment)
//! - `ConfidenceScorer` - Decides between auto-apply, preview and clarification
//! - `Pipeline` - Validator, scorer, resolver, auditor, fixer and translator in order
//! - `PipelineSession` - Per-run caches and cancellation

mod config;
mod pipeline;
mod score;
mod session;

pub use config::FormaConfig;
pub use pipeline::{Pipeline, PipelineOutcome, PipelineRun};
pub use score::{ConfidenceFactors, ConfidenceScore, ConfidenceScorer, Route, ScoringConfig};
pub use session::PipelineSession;
