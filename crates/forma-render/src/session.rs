//! Per-run render state: font loading and variable lookup caches
//!
//! A `RenderSession` is created for each translation run and dropped with
//! it. Nothing here is process-global.

use crate::node::FontRef;
use async_trait::async_trait;
use forma_intent::{InventoryIndex, VariableDef};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Loads a font before text using it can be built
#[async_trait]
pub trait FontLoader: Send + Sync {
    async fn load_font(&self, font: &FontRef) -> Result<(), String>;
}

/// Accepts every font; the host is assumed to have them installed
#[derive(Debug, Default, Clone, Copy)]
pub struct BuiltinFontLoader;

#[async_trait]
impl FontLoader for BuiltinFontLoader {
    async fn load_font(&self, _font: &FontRef) -> Result<(), String> {
        Ok(())
    }
}

/// Counters exposed for logging and tests
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SessionStats {
    pub font_loads: usize,
    pub font_cache_hits: usize,
    pub variable_lookups: usize,
    pub variable_cache_hits: usize,
}

pub struct RenderSession {
    font_loader: Arc<dyn FontLoader>,
    fonts: HashMap<FontRef, Result<(), String>>,
    variables: HashMap<String, Option<VariableDef>>,
    stats: SessionStats,
}

impl RenderSession {
    pub fn new(font_loader: Arc<dyn FontLoader>) -> Self {
        Self {
            font_loader,
            fonts: HashMap::new(),
            variables: HashMap::new(),
            stats: SessionStats::default(),
        }
    }

    /// Load a font at most once per session; failures are cached too
    pub async fn ensure_font(&mut self, font: &FontRef) -> Result<(), String> {
        if let Some(result) = self.fonts.get(font) {
            self.stats.font_cache_hits += 1;
            return result.clone();
        }

        self.stats.font_loads += 1;
        let result = self.font_loader.load_font(font).await;
        debug!(family = %font.family, style = %font.style, ok = result.is_ok(), "Loaded font");
        self.fonts.insert(font.clone(), result.clone());
        result
    }

    /// Look up a variable by id, then by name, memoizing the answer
    pub fn resolve_variable(
        &mut self,
        index: &InventoryIndex<'_>,
        reference: &str,
    ) -> Option<VariableDef> {
        if let Some(cached) = self.variables.get(reference) {
            self.stats.variable_cache_hits += 1;
            return cached.clone();
        }

        self.stats.variable_lookups += 1;
        let found = index
            .variable(reference)
            .or_else(|| {
                index
                    .inventory()
                    .variables
                    .iter()
                    .find(|v| v.name == reference)
            })
            .cloned();
        self.variables.insert(reference.to_string(), found.clone());
        found
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }
}

impl Default for RenderSession {
    fn default() -> Self {
        Self::new(Arc::new(BuiltinFontLoader))
    }
}

impl std::fmt::Debug for RenderSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderSession")
            .field("fonts", &self.fonts.len())
            .field("variables", &self.variables.len())
            .field("stats", &self.stats)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use forma_intent::{Inventory, VariableType};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingLoader {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl FontLoader for CountingLoader {
        async fn load_font(&self, font: &FontRef) -> Result<(), String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if font.style == "Black" {
                Err("style not installed".to_string())
            } else {
                Ok(())
            }
        }
    }

    fn font(style: &str) -> FontRef {
        FontRef {
            family: "Inter".to_string(),
            style: style.to_string(),
        }
    }

    #[tokio::test]
    async fn test_fonts_loaded_once() {
        let loader = Arc::new(CountingLoader {
            calls: AtomicUsize::new(0),
        });
        let mut session = RenderSession::new(loader.clone());

        assert!(session.ensure_font(&font("Regular")).await.is_ok());
        assert!(session.ensure_font(&font("Regular")).await.is_ok());
        assert!(session.ensure_font(&font("Black")).await.is_err());
        assert!(session.ensure_font(&font("Black")).await.is_err());

        assert_eq!(loader.calls.load(Ordering::SeqCst), 2);
        assert_eq!(session.stats().font_loads, 2);
        assert_eq!(session.stats().font_cache_hits, 2);
    }

    #[test]
    fn test_variable_lookup_by_id_and_name() {
        let mut inventory = Inventory::new();
        inventory.variables.push(VariableDef {
            id: "VariableID:1:2".to_string(),
            name: "color/primary".to_string(),
            resolved_type: VariableType::Color,
            value: None,
        });
        let index = inventory.index();
        let mut session = RenderSession::default();

        assert!(session.resolve_variable(&index, "VariableID:1:2").is_some());
        assert!(session.resolve_variable(&index, "color/primary").is_some());
        assert!(session.resolve_variable(&index, "color/missing").is_none());
        assert!(session.resolve_variable(&index, "color/missing").is_none());

        let stats = session.stats();
        assert_eq!(stats.variable_lookups, 3);
        assert_eq!(stats.variable_cache_hits, 1);
    }
}
