//! Serialized, rate-limited access to a generation backend
//!
//! Every call goes through one async mutex, so at most one request is in
//! flight per queue. The mutex also guards the time of the last call, which
//! enforces the minimum interval between requests.

use crate::backend::{GeneratedDesign, GenerationBackend, GenerationFailure, GenerationRequest};
use forma_core::Result;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    /// Minimum gap between two backend calls
    pub min_interval_ms: u64,
    /// First retry delay; doubles with every attempt
    pub retry_base_delay_ms: u64,
    /// Upper bound of the random delay added to each backoff
    pub max_jitter_ms: u64,
    /// Total attempts per request, including the first
    pub max_retries: usize,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            min_interval_ms: 1000,
            retry_base_delay_ms: 2000,
            max_jitter_ms: 500,
            max_retries: 3,
        }
    }
}

impl QueueConfig {
    /// Backoff before retrying after `attempt` (0-based) failed
    pub fn backoff_delay(&self, attempt: usize) -> Duration {
        let base = self
            .retry_base_delay_ms
            .saturating_mul(1u64 << attempt.min(16));
        let jitter = if self.max_jitter_ms > 0 {
            rand::thread_rng().gen_range(0..=self.max_jitter_ms)
        } else {
            0
        };
        Duration::from_millis(base.saturating_add(jitter))
    }
}

pub struct GenerationQueue {
    backend: Arc<dyn GenerationBackend>,
    config: QueueConfig,
    last_call: Mutex<Option<Instant>>,
}

impl GenerationQueue {
    pub fn new(backend: Arc<dyn GenerationBackend>, config: QueueConfig) -> Self {
        Self {
            backend,
            config,
            last_call: Mutex::new(None),
        }
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Run one request, retrying retryable failures with backoff
    pub async fn submit(&self, request: &GenerationRequest) -> Result<GeneratedDesign> {
        let mut last_call = self.last_call.lock().await;
        let attempts = self.config.max_retries.max(1);

        for attempt in 0..attempts {
            if let Some(previous) = *last_call {
                let min_interval = Duration::from_millis(self.config.min_interval_ms);
                let elapsed = previous.elapsed();
                if elapsed < min_interval {
                    tokio::time::sleep(min_interval - elapsed).await;
                }
            }

            *last_call = Some(Instant::now());
            let result = self.backend.generate(request).await;

            match result {
                Ok(design) => {
                    debug!(backend = %self.backend.name(), attempt, "Generation succeeded");
                    return Ok(design);
                }
                Err(failure) => {
                    if attempt + 1 < attempts && failure.is_retryable() {
                        let delay = self.config.backoff_delay(attempt);
                        warn!(
                            backend = %self.backend.name(),
                            attempt,
                            delay_ms = delay.as_millis() as u64,
                            error = %failure,
                            "Generation failed; retrying"
                        );
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                    return Err(failure.into());
                }
            }
        }

        Err(GenerationFailure::Other("generation failed after retries".to_string()).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockBackend;
    use forma_core::{ErrorKind, FormaError};

    fn fast_config() -> QueueConfig {
        QueueConfig {
            min_interval_ms: 0,
            retry_base_delay_ms: 1,
            max_jitter_ms: 1,
            max_retries: 3,
        }
    }

    #[tokio::test]
    async fn test_retries_rate_limited_calls() {
        let backend = Arc::new(
            MockBackend::new("{\"kind\":\"Container\"}")
                .then(Err(GenerationFailure::RateLimited("429".to_string())))
                .then(Err(GenerationFailure::Network("reset".to_string()))),
        );
        let queue = GenerationQueue::new(backend.clone(), fast_config());

        let design = queue
            .submit(&GenerationRequest::new("settings page"))
            .await
            .unwrap();

        assert!(design.tree_json.contains("Container"));
        assert_eq!(backend.calls(), 3);
    }

    #[tokio::test]
    async fn test_auth_failure_is_not_retried() {
        let backend = Arc::new(
            MockBackend::new("{}")
                .then(Err(GenerationFailure::Authentication("bad key".to_string()))),
        );
        let queue = GenerationQueue::new(backend.clone(), fast_config());

        let err = queue
            .submit(&GenerationRequest::new("settings page"))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Authentication);
        assert_eq!(backend.calls(), 1);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_retries() {
        let backend = Arc::new(
            MockBackend::new("{}")
                .then(Err(GenerationFailure::Server("502".to_string())))
                .then(Err(GenerationFailure::Server("502".to_string())))
                .then(Err(GenerationFailure::Server("503".to_string()))),
        );
        let queue = GenerationQueue::new(backend.clone(), fast_config());

        let err = queue
            .submit(&GenerationRequest::new("dashboard"))
            .await
            .unwrap_err();

        assert!(matches!(err, FormaError::Generation { .. }));
        assert!(err.to_string().contains("503"));
        assert_eq!(backend.calls(), 3);
    }

    #[tokio::test]
    async fn test_min_interval_between_calls() {
        let backend = Arc::new(MockBackend::new("{}"));
        let config = QueueConfig {
            min_interval_ms: 30,
            ..fast_config()
        };
        let queue = GenerationQueue::new(backend, config);
        let request = GenerationRequest::new("profile card");

        let start = Instant::now();
        queue.submit(&request).await.unwrap();
        queue.submit(&request).await.unwrap();

        assert!(start.elapsed() >= Duration::from_millis(30));
    }

    #[test]
    fn test_backoff_grows_exponentially() {
        let config = QueueConfig {
            retry_base_delay_ms: 100,
            max_jitter_ms: 0,
            ..QueueConfig::default()
        };
        assert_eq!(config.backoff_delay(0), Duration::from_millis(100));
        assert_eq!(config.backoff_delay(2), Duration::from_millis(400));

        let jittered = QueueConfig {
            max_jitter_ms: 50,
            ..config
        };
        let delay = jittered.backoff_delay(1);
        assert!(delay >= Duration::from_millis(200) && delay <= Duration::from_millis(250));
    }
}
