//! Forma Gen - Front door to the intent-tree generator
//!
//! The generator itself lives outside Forma. This crate defines the
//! `GenerationBackend` trait, the `GenerationQueue` that serializes and
//! retries calls to it, and a `MockBackend` for tests.

mod backend;
mod mock;
mod queue;

pub use backend::{GeneratedDesign, GenerationBackend, GenerationFailure, GenerationRequest};
pub use mock::MockBackend;
pub use queue::{GenerationQueue, QueueConfig};
