//! Resolution summary: tier counts, warnings and a quality rating

use crate::outcome::ResolutionOutcome;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How a node was resolved
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeResolution {
    pub node_id: String,
    pub outcome: ResolutionOutcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityRating {
    Good,
    Fair,
    Poor,
}

impl fmt::Display for QualityRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QualityRating::Good => write!(f, "good"),
            QualityRating::Fair => write!(f, "fair"),
            QualityRating::Poor => write!(f, "poor"),
        }
    }
}

/// A resolution warning with its category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorizedWarning {
    pub category: String,
    pub node_id: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolutionSummary {
    /// Nodes resolved by tier 1 through 5
    pub tier_counts: [usize; 5],
    pub categorized_warnings: Vec<CategorizedWarning>,
    pub quality_rating: QualityRating,
    pub recommendations: Vec<String>,
}

fn tier_category(tier: u8) -> Option<&'static str> {
    match tier {
        2 => Some("KEYWORD_MATCH"),
        3 => Some("STRUCTURAL_MATCH"),
        4 => Some("TOKEN_APPROXIMATION"),
        5 => Some("HARD_DEFAULT"),
        _ => None,
    }
}

impl ResolutionSummary {
    pub fn from_resolutions(resolutions: &[NodeResolution]) -> Self {
        let mut tier_counts = [0usize; 5];
        let mut categorized_warnings = Vec::new();

        for resolution in resolutions {
            let tier = resolution.outcome.tier;
            if let Some(slot) = (tier as usize).checked_sub(1).and_then(|i| tier_counts.get_mut(i)) {
                *slot += 1;
            }
            if let Some(category) = tier_category(tier) {
                categorized_warnings.push(CategorizedWarning {
                    category: category.to_string(),
                    node_id: resolution.node_id.clone(),
                    message: format!(
                        "'{}' resolved at tier {} by {}: {} (confidence {:.2})",
                        resolution.node_id,
                        tier,
                        resolution.outcome.strategy,
                        resolution.outcome.detail,
                        resolution.outcome.confidence
                    ),
                });
            }
        }

        let quality_rating = rate(&tier_counts);
        let recommendations = recommend(&tier_counts);
        Self {
            tier_counts,
            categorized_warnings,
            quality_rating,
            recommendations,
        }
    }

    pub fn total(&self) -> usize {
        self.tier_counts.iter().sum()
    }

    /// Nodes resolved at a tier (1-5)
    pub fn count(&self, tier: u8) -> usize {
        (tier as usize)
            .checked_sub(1)
            .and_then(|i| self.tier_counts.get(i))
            .copied()
            .unwrap_or(0)
    }
}

fn rate(counts: &[usize; 5]) -> QualityRating {
    let total: usize = counts.iter().sum();
    if total == 0 {
        return QualityRating::Good;
    }
    let total = total as f64;
    let strong = (counts[0] + counts[1]) as f64 / total;
    let weak = (counts[3] + counts[4]) as f64 / total;
    if strong >= 0.7 {
        QualityRating::Good
    } else if weak >= 0.5 {
        QualityRating::Poor
    } else {
        QualityRating::Fair
    }
}

fn recommend(counts: &[usize; 5]) -> Vec<String> {
    let mut recommendations = Vec::new();
    if counts[1] > 0 {
        recommendations.push(format!(
            "{} component(s) were matched by keyword; use exact component references for predictable results.",
            counts[1]
        ));
    }
    if counts[2] > 0 {
        recommendations.push(format!(
            "{} component(s) were matched by shape; add descriptions and semantic types to library components.",
            counts[2]
        ));
    }
    if counts[3] > 0 {
        recommendations.push(format!(
            "{} element(s) were built from existing tokens; consider adding library components for them.",
            counts[3]
        ));
    }
    if counts[4] > 0 {
        recommendations.push(format!(
            "{} element(s) used built-in default styling; publish color, spacing and radius tokens in the library.",
            counts[4]
        ));
    }
    recommendations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::Instruction;
    use std::collections::BTreeMap;

    fn resolution(id: &str, tier: u8) -> NodeResolution {
        NodeResolution {
            node_id: id.to_string(),
            outcome: ResolutionOutcome {
                tier,
                strategy: "test".to_string(),
                confidence: 0.5,
                instruction: Instruction::SynthesizeContainer {
                    styling: vec![],
                    variable_bindings: BTreeMap::new(),
                },
                detail: "detail".to_string(),
            },
        }
    }

    #[test]
    fn test_quality_rating() {
        let good = ResolutionSummary::from_resolutions(&[resolution("a", 1), resolution("b", 2)]);
        assert_eq!(good.quality_rating, QualityRating::Good);
        assert_eq!(good.count(1), 1);
        assert_eq!(good.categorized_warnings.len(), 1);

        let poor = ResolutionSummary::from_resolutions(&[resolution("a", 5), resolution("b", 4)]);
        assert_eq!(poor.quality_rating, QualityRating::Poor);
        assert_eq!(poor.recommendations.len(), 2);

        let fair = ResolutionSummary::from_resolutions(&[
            resolution("a", 1),
            resolution("b", 3),
            resolution("c", 3),
        ]);
        assert_eq!(fair.quality_rating, QualityRating::Fair);
    }

    #[test]
    fn test_empty_is_good() {
        let summary = ResolutionSummary::from_resolutions(&[]);
        assert_eq!(summary.total(), 0);
        assert_eq!(summary.quality_rating, QualityRating::Good);
        assert!(summary.recommendations.is_empty());
    }
}
