//! The ordered resolution chain

use crate::strategy::{ResolutionState, ResolutionStrategy, ResolveContext, ResolverConfig};
use crate::summary::{NodeResolution, ResolutionSummary};
use crate::tiers::{ExactReference, HardDefault, KeywordMatch, StructuralMatch, TokenApproximate};
use crate::outcome::ResolutionOutcome;
use forma_core::{FormaError, Result};
use forma_intent::{ComponentNode, IntentNode, InventoryIndex};
use forma_tokens::{MatchThresholds, TokenMatcher};
use serde::Serialize;
use std::collections::HashSet;

/// Everything the resolver decided for one tree
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolutionReport {
    pub resolutions: Vec<NodeResolution>,
    pub summary: ResolutionSummary,
}

/// Chain of responsibility over resolution tiers; the first tier that
/// returns an outcome wins
pub struct Resolver {
    strategies: Vec<Box<dyn ResolutionStrategy>>,
    config: ResolverConfig,
    thresholds: MatchThresholds,
}

impl Resolver {
    /// The standard five-tier chain
    pub fn new(config: ResolverConfig, thresholds: MatchThresholds) -> Self {
        Self::with_strategies(
            vec![
                Box::new(ExactReference),
                Box::new(KeywordMatch),
                Box::new(StructuralMatch),
                Box::new(TokenApproximate),
                Box::new(HardDefault),
            ],
            config,
            thresholds,
        )
    }

    pub fn with_strategies(
        strategies: Vec<Box<dyn ResolutionStrategy>>,
        config: ResolverConfig,
        thresholds: MatchThresholds,
    ) -> Self {
        Self {
            strategies,
            config,
            thresholds,
        }
    }

    /// Resolve every component instance in the tree, mutating nodes in place
    pub fn resolve_tree(
        &self,
        tree: &mut IntentNode,
        index: &InventoryIndex<'_>,
    ) -> Result<ResolutionReport> {
        let ctx = ResolveContext {
            index,
            matcher: TokenMatcher::with_thresholds(&index.inventory().usage, self.thresholds),
            config: self.config,
        };

        let mut taken_ids = HashSet::new();
        tree.visit(&mut |node| {
            taken_ids.insert(node.id().to_string());
        });

        let mut resolutions = Vec::new();
        self.resolve_node(tree, &ctx, &mut taken_ids, &mut resolutions)?;

        let summary = ResolutionSummary::from_resolutions(&resolutions);
        tracing::info!(
            tiers = ?summary.tier_counts,
            quality = %summary.quality_rating,
            "Resolution complete"
        );
        Ok(ResolutionReport {
            resolutions,
            summary,
        })
    }

    fn resolve_node(
        &self,
        node: &mut IntentNode,
        ctx: &ResolveContext<'_>,
        taken_ids: &mut HashSet<String>,
        resolutions: &mut Vec<NodeResolution>,
    ) -> Result<()> {
        match node {
            IntentNode::Component(component) => {
                let outcome = self.resolve_component(component, ctx)?;
                outcome.apply(node, taken_ids);
                resolutions.push(NodeResolution {
                    node_id: node.id().to_string(),
                    outcome,
                });
            }
            IntentNode::Container(container) => {
                for child in container.children.iter_mut() {
                    self.resolve_node(child, ctx, taken_ids, resolutions)?;
                }
            }
            IntentNode::Text(_) => {}
        }
        Ok(())
    }

    /// Run the chain for one component node without mutating it
    pub fn resolve_component<'a>(
        &self,
        node: &ComponentNode,
        ctx: &ResolveContext<'a>,
    ) -> Result<ResolutionOutcome> {
        let mut state = ResolutionState::default();
        for strategy in &self.strategies {
            state.history.push(strategy.name().to_string());
            if let Some(outcome) = strategy.resolve(node, ctx, &mut state) {
                tracing::debug!(
                    node = %node.base.id,
                    tier = outcome.tier,
                    strategy = strategy.name(),
                    confidence = outcome.confidence,
                    "Resolved component"
                );
                return Ok(outcome);
            }
            tracing::debug!(node = %node.base.id, strategy = strategy.name(), "Tier passed");
        }

        Err(FormaError::ResolutionFailure {
            node_id: node.base.id.clone(),
            history: state.history,
        })
    }
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new(ResolverConfig::default(), MatchThresholds::default())
    }
}
