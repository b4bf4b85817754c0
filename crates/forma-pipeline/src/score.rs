//! Confidence scoring: how far to trust a generated tree
//!
//! Five factors in [0, 1] are combined with fixed weights into a final
//! score, which decides whether the tree is applied automatically, shown
//! for approval, or sent back for clarification.

use forma_constraint::ValidationReport;
use forma_intent::vocabulary::{is_known_primitive, is_known_role};
use forma_intent::IntentNode;
use serde::{Deserialize, Serialize};
use std::fmt;

const WEIGHT_VALIDATION: f64 = 0.30;
const WEIGHT_AMBIGUITY: f64 = 0.20;
const WEIGHT_COMPLEXITY: f64 = 0.25;
const WEIGHT_UNKNOWN: f64 = 0.15;
const WEIGHT_NESTING: f64 = 0.10;

const MIN_SCORE: f64 = 0.3;

/// Words that make a request vague
const VAGUE_TERMS: &[&str] = &[
    "something", "stuff", "thing", "things", "whatever", "somehow", "maybe", "nice", "cool",
    "good", "some", "etc", "kinda", "sorta", "basically", "just", "like", "anything",
];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// At or above this the tree is applied without asking
    pub auto_apply_threshold: f64,
    /// At or above this (and below auto-apply) the tree is previewed
    pub preview_threshold: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            auto_apply_threshold: 0.9,
            preview_threshold: 0.6,
        }
    }
}

/// What to do with a tree given its confidence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    AutoApply,
    PreviewForApproval,
    RequestClarification,
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::AutoApply => write!(f, "auto-apply"),
            Route::PreviewForApproval => write!(f, "preview"),
            Route::RequestClarification => write!(f, "clarify"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceFactors {
    pub validation: f64,
    pub ambiguity: f64,
    pub complexity_match: f64,
    pub unknown_elements: f64,
    pub nesting_depth: f64,
    #[serde(default)]
    pub self_assessment: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceScore {
    pub final_score: f64,
    pub factors: ConfidenceFactors,
    /// One human-readable line per factor
    pub breakdown: Vec<String>,
    pub route: Route,
}

pub struct ConfidenceScorer {
    config: ScoringConfig,
}

impl ConfidenceScorer {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn score(
        &self,
        intent: &str,
        tree: &IntentNode,
        validation: &ValidationReport,
        self_assessment: Option<f64>,
    ) -> ConfidenceScore {
        let factors = ConfidenceFactors {
            validation: validation_factor(validation),
            ambiguity: ambiguity_factor(intent),
            complexity_match: complexity_factor(intent, tree),
            unknown_elements: unknown_factor(tree),
            nesting_depth: nesting_factor(tree.max_depth()),
            self_assessment: self_assessment.filter(|s| *s > 0.0 && *s <= 1.0),
        };

        let weighted = factors.validation * WEIGHT_VALIDATION
            + factors.ambiguity * WEIGHT_AMBIGUITY
            + factors.complexity_match * WEIGHT_COMPLEXITY
            + factors.unknown_elements * WEIGHT_UNKNOWN
            + factors.nesting_depth * WEIGHT_NESTING;
        let mut final_score = weighted.clamp(MIN_SCORE, 1.0);
        if let Some(cap) = factors.self_assessment {
            final_score = final_score.min(cap);
        }

        let route = self.route(final_score);
        tracing::info!(score = final_score, %route, "Scored design");

        ConfidenceScore {
            final_score,
            breakdown: breakdown(&factors),
            factors,
            route,
        }
    }

    pub fn route(&self, score: f64) -> Route {
        if score >= self.config.auto_apply_threshold {
            Route::AutoApply
        } else if score >= self.config.preview_threshold {
            Route::PreviewForApproval
        } else {
            Route::RequestClarification
        }
    }
}

impl Default for ConfidenceScorer {
    fn default() -> Self {
        Self::new(ScoringConfig::default())
    }
}

fn validation_factor(report: &ValidationReport) -> f64 {
    if !report.is_valid() {
        (0.3 - 0.1 * report.error_count() as f64).max(0.1)
    } else if report.warning_count() == 0 {
        1.0
    } else {
        (0.8 - 0.05 * report.warning_count() as f64).max(0.5)
    }
}

fn words(intent: &str) -> Vec<String> {
    intent
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn ambiguity_factor(intent: &str) -> f64 {
    let words = words(intent);
    let vague = words
        .iter()
        .filter(|w| VAGUE_TERMS.contains(&w.as_str()))
        .count();
    let mut score = 1.0 - 0.1 * vague as f64;
    if words.len() < 3 {
        score -= 0.3;
    }
    score.max(0.2)
}

fn complexity_factor(intent: &str, tree: &IntentNode) -> f64 {
    let intent_complexity = (words(intent).len() as f64 / 4.0).min(10.0);
    let tree_complexity = (tree.node_count() as f64 / 3.0).min(10.0);
    if intent_complexity == 0.0 || tree_complexity == 0.0 {
        return 0.5;
    }
    intent_complexity.min(tree_complexity) / intent_complexity.max(tree_complexity)
}

fn unknown_factor(tree: &IntentNode) -> f64 {
    let mut unknown_roles = 0;
    let mut unknown_primitives = 0;
    tree.visit(&mut |node| {
        if !is_known_role(node.role()) {
            unknown_roles += 1;
        }
        if let Some(layout) = node.base().layout.as_deref() {
            if !is_known_primitive(layout) {
                unknown_primitives += 1;
            }
        }
    });
    (1.0 - 0.2 * unknown_roles as f64 - 0.15 * unknown_primitives as f64).max(0.0)
}

fn nesting_factor(depth: usize) -> f64 {
    match depth {
        0..=3 => 1.0,
        4..=5 => 0.95,
        6..=7 => 0.85,
        _ => 0.7,
    }
}

fn breakdown(factors: &ConfidenceFactors) -> Vec<String> {
    let mut lines = vec![
        format!("validation: {:.2} (x{:.2})", factors.validation, WEIGHT_VALIDATION),
        format!("ambiguity: {:.2} (x{:.2})", factors.ambiguity, WEIGHT_AMBIGUITY),
        format!(
            "complexity match: {:.2} (x{:.2})",
            factors.complexity_match, WEIGHT_COMPLEXITY
        ),
        format!(
            "unknown elements: {:.2} (x{:.2})",
            factors.unknown_elements, WEIGHT_UNKNOWN
        ),
        format!("nesting depth: {:.2} (x{:.2})", factors.nesting_depth, WEIGHT_NESTING),
    ];
    if let Some(cap) = factors.self_assessment {
        lines.push(format!("self-assessment cap: {:.2}", cap));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use forma_core::{Diagnostic, ErrorKind};
    use forma_intent::NodeBase;

    fn form(children: usize) -> IntentNode {
        let kids = (0..children)
            .map(|i| IntentNode::text(NodeBase::new(format!("t{}", i), "Text"), "copy"))
            .collect();
        IntentNode::container(
            NodeBase {
                layout: Some("VerticalStack".to_string()),
                ..NodeBase::new("form", "Form")
            },
            kids,
        )
    }

    #[test]
    fn test_validation_factor_levels() {
        let mut report = ValidationReport::new();
        assert_eq!(validation_factor(&report), 1.0);

        report.push(Diagnostic::warning(ErrorKind::EmptyText, "a", "empty"));
        assert!((validation_factor(&report) - 0.75).abs() < 1e-9);

        report.push(Diagnostic::error(ErrorKind::MissingField, "b", "missing"));
        report.push(Diagnostic::error(ErrorKind::MissingField, "c", "missing"));
        assert!((validation_factor(&report) - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_ambiguity_penalizes_vague_short_intents() {
        assert_eq!(ambiguity_factor("a login form with email and password"), 1.0);
        assert!((ambiguity_factor("something nice") - 0.5).abs() < 1e-9);
        assert_eq!(
            ambiguity_factor("stuff things whatever maybe nice cool good some etc kinda"),
            0.2
        );
    }

    #[test]
    fn test_complexity_match_ratio() {
        // 8 words -> 2.0; 6 nodes -> 2.0
        let tree = form(5);
        assert_eq!(
            complexity_factor("a login form with email password and submit", &tree),
            1.0
        );
        assert_eq!(complexity_factor("", &tree), 0.5);
    }

    #[test]
    fn test_unknown_elements() {
        let mut tree = form(1);
        assert_eq!(unknown_factor(&tree), 1.0);
        tree.base_mut().layout = Some("Spiral".to_string());
        tree.base_mut().semantic_role = Some("Gizmo".to_string());
        assert!((unknown_factor(&tree) - 0.65).abs() < 1e-9);
    }

    #[test]
    fn test_nesting_levels() {
        assert_eq!(nesting_factor(3), 1.0);
        assert_eq!(nesting_factor(5), 0.95);
        assert_eq!(nesting_factor(7), 0.85);
        assert_eq!(nesting_factor(9), 0.7);
    }

    #[test]
    fn test_score_bounds_and_self_assessment_cap() {
        let scorer = ConfidenceScorer::default();
        let tree = form(5);
        let report = ValidationReport::new();

        let score = scorer.score("a login form with email password and submit", &tree, &report, None);
        assert!(score.final_score >= 0.3 && score.final_score <= 1.0);
        assert_eq!(score.route, Route::AutoApply);
        assert_eq!(score.breakdown.len(), 5);

        let capped = scorer.score(
            "a login form with email password and submit",
            &tree,
            &report,
            Some(0.4),
        );
        assert_eq!(capped.final_score, 0.4);
        assert_eq!(capped.route, Route::RequestClarification);
    }

    #[test]
    fn test_score_floor() {
        let scorer = ConfidenceScorer::default();
        let blob = |id: String, children| {
            IntentNode::container(
                NodeBase {
                    layout: Some("Blob".to_string()),
                    ..NodeBase::new(id, "Blob")
                },
                children,
            )
        };
        let mut tree = blob("n8".to_string(), Vec::new());
        for depth in (0..8).rev() {
            tree = blob(format!("n{}", depth), vec![tree]);
        }
        let mut report = ValidationReport::new();
        for id in ["a", "b", "c"] {
            report.push(Diagnostic::error(ErrorKind::MissingField, id, "missing"));
        }

        let score = scorer.score("stuff", &tree, &report, None);
        assert_eq!(score.final_score, 0.3);
        assert_eq!(score.factors.nesting_depth, 0.7);
        assert_eq!(score.factors.unknown_elements, 0.0);
    }

    #[test]
    fn test_routing_thresholds() {
        let scorer = ConfidenceScorer::default();
        assert_eq!(scorer.route(0.9), Route::AutoApply);
        assert_eq!(scorer.route(0.75), Route::PreviewForApproval);
        assert_eq!(scorer.route(0.59), Route::RequestClarification);
    }
}
