//! The resolution strategy interface shared by every tier

use crate::outcome::ResolutionOutcome;
use forma_intent::{ComponentDef, ComponentNode, InventoryIndex};
use forma_tokens::TokenMatcher;
use serde::{Deserialize, Serialize};

/// Resolver settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Components handed to the structural tier when no keyword scores
    pub fallback_candidates: usize,
    /// Lowest archetype score the structural tier accepts
    pub structural_threshold: f64,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            fallback_candidates: 5,
            structural_threshold: 0.6,
        }
    }
}

/// Read-only inputs for one resolution run
pub struct ResolveContext<'a> {
    pub index: &'a InventoryIndex<'a>,
    pub matcher: TokenMatcher<'a>,
    pub config: ResolverConfig,
}

/// State carried from one tier to the next while resolving a single node
#[derive(Debug, Default)]
pub struct ResolutionState<'a> {
    /// Components an earlier tier narrowed the search to
    pub candidates: Option<Vec<&'a ComponentDef>>,
    /// Names of the strategies tried so far
    pub history: Vec<String>,
}

/// One tier of the resolution chain
pub trait ResolutionStrategy: Send + Sync {
    /// Strategy name (e.g. "exact_reference", "hard_default")
    fn name(&self) -> &'static str;

    /// Tier number, 1 (best) to 5
    fn tier(&self) -> u8;

    /// Try to resolve the node; `None` passes it to the next tier
    fn resolve<'a>(
        &self,
        node: &ComponentNode,
        ctx: &ResolveContext<'a>,
        state: &mut ResolutionState<'a>,
    ) -> Option<ResolutionOutcome>;
}
