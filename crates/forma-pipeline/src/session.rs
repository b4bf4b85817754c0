//! State that lives for one pipeline run

use forma_render::{BuiltinFontLoader, FontLoader, RenderSession};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Caches and the cancellation handle for one run. Create one per run and
/// drop it afterwards; nothing is shared between runs.
#[derive(Debug)]
pub struct PipelineSession {
    pub render: RenderSession,
    cancel: CancellationToken,
}

impl PipelineSession {
    pub fn new(font_loader: Arc<dyn FontLoader>) -> Self {
        Self {
            render: RenderSession::new(font_loader),
            cancel: CancellationToken::new(),
        }
    }

    /// A handle another task can use to cancel this run
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

impl Default for PipelineSession {
    fn default() -> Self {
        Self::new(Arc::new(BuiltinFontLoader))
    }
}
