//! Mock backend for tests and offline runs
//!
//! Replays scripted results in order; once the script is exhausted every
//! call returns the fallback design.

use crate::backend::{GeneratedDesign, GenerationBackend, GenerationFailure, GenerationRequest};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

type Scripted = std::result::Result<GeneratedDesign, GenerationFailure>;

pub struct MockBackend {
    script: Mutex<VecDeque<Scripted>>,
    fallback: GeneratedDesign,
    calls: AtomicUsize,
}

impl MockBackend {
    /// Always answer with the same tree
    pub fn new(tree_json: impl Into<String>) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: GeneratedDesign {
                tree_json: tree_json.into(),
                self_assessment: None,
            },
            calls: AtomicUsize::new(0),
        }
    }

    /// Queue a result to return before falling back
    pub fn then(self, result: Scripted) -> Self {
        if let Ok(mut script) = self.script.lock() {
            script.push_back(result);
        }
        self
    }

    pub fn with_self_assessment(mut self, score: f64) -> Self {
        self.fallback.self_assessment = Some(score);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GenerationBackend for MockBackend {
    fn name(&self) -> &str {
        "mock"
    }

    async fn generate(&self, _request: &GenerationRequest) -> Scripted {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = match self.script.lock() {
            Ok(mut script) => script.pop_front(),
            Err(_) => None,
        };
        next.unwrap_or_else(|| Ok(self.fallback.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_script_then_fallback() {
        let backend = MockBackend::new("{}")
            .then(Err(GenerationFailure::Network("reset".to_string())));
        let request = GenerationRequest::new("a login form");

        assert!(backend.generate(&request).await.is_err());
        assert_eq!(backend.generate(&request).await.unwrap().tree_json, "{}");
        assert_eq!(backend.calls(), 2);
    }
}
