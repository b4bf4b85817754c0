use forma_core::Color;
use forma_intent::{ColorUsage, NumericUsage, TokenUsage};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Largest acceptable weighted distance per token family
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchThresholds {
    /// CIELAB ΔE
    pub color: f64,
    /// Pixels
    pub spacing: f64,
    /// Pixels
    pub radius: f64,
}

impl Default for MatchThresholds {
    fn default() -> Self {
        Self {
            color: 10.0,
            spacing: 8.0,
            radius: 8.0,
        }
    }
}

/// An accepted nearest-neighbour match
#[derive(Debug, Clone, PartialEq)]
pub struct TokenMatch<T> {
    pub value: T,
    /// Raw distance to the requested value
    pub distance: f64,
    /// Distance after the usage-frequency discount
    pub weighted_distance: f64,
    pub confidence: f64,
    pub usage_count: u32,
    pub variable_id: Option<String>,
}

/// Brute-force nearest-neighbour search over token usage
pub struct TokenMatcher<'a> {
    usage: &'a TokenUsage,
    thresholds: MatchThresholds,
}

struct Candidate<'a, T> {
    value: T,
    distance: f64,
    count: u32,
    variable_id: &'a Option<String>,
}

impl<'a> TokenMatcher<'a> {
    pub fn new(usage: &'a TokenUsage) -> Self {
        Self::with_thresholds(usage, MatchThresholds::default())
    }

    pub fn with_thresholds(usage: &'a TokenUsage, thresholds: MatchThresholds) -> Self {
        Self { usage, thresholds }
    }

    pub fn thresholds(&self) -> MatchThresholds {
        self.thresholds
    }

    /// Closest used color by perceptual distance
    pub fn find_closest_color(&self, target: Color) -> Option<TokenMatch<Color>> {
        let target_lab = target.to_lab();
        let candidates = self.usage.colors.iter().map(|u: &ColorUsage| Candidate {
            value: u.color,
            distance: target_lab.distance(&u.color.to_lab()),
            count: u.count,
            variable_id: &u.variable_id,
        });
        let max = max_count(self.usage.colors.iter().map(|u| u.count));
        best_match(candidates, self.thresholds.color, max)
    }

    /// Closest used spacing value
    pub fn find_closest_spacing(&self, value: f64) -> Option<TokenMatch<f64>> {
        closest_numeric(&self.usage.spacing, value, self.thresholds.spacing)
    }

    /// Closest used corner radius
    pub fn find_closest_radius(&self, value: f64) -> Option<TokenMatch<f64>> {
        closest_numeric(&self.usage.radii, value, self.thresholds.radius)
    }
}

fn closest_numeric(
    usage: &[NumericUsage],
    value: f64,
    threshold: f64,
) -> Option<TokenMatch<f64>> {
    if !value.is_finite() {
        return None;
    }
    let candidates = usage.iter().map(|u| Candidate {
        value: u.value,
        distance: (u.value - value).abs(),
        count: u.count,
        variable_id: &u.variable_id,
    });
    best_match(candidates, threshold, max_count(usage.iter().map(|u| u.count)))
}

fn max_count(counts: impl Iterator<Item = u32>) -> u32 {
    counts.max().unwrap_or(1).max(1)
}

/// Raw distance discounted by log-scaled frequency
fn weighted(distance: f64, count: u32) -> f64 {
    distance / (1.0 + (count.max(1) as f64).ln())
}

fn best_match<'a, T>(
    candidates: impl Iterator<Item = Candidate<'a, T>>,
    threshold: f64,
    max_count: u32,
) -> Option<TokenMatch<T>> {
    let best = candidates
        .filter(|c| c.distance.is_finite())
        .min_by(|a, b| {
            weighted(a.distance, a.count)
                .partial_cmp(&weighted(b.distance, b.count))
                .unwrap_or(Ordering::Equal)
                // Equal weighted distance: the more common value wins
                .then_with(|| b.count.cmp(&a.count))
        })?;

    let weighted_distance = weighted(best.distance, best.count);
    if weighted_distance > threshold {
        tracing::debug!(weighted_distance, threshold, "Nearest token rejected as too far");
        return None;
    }

    let closeness = if threshold > 0.0 {
        1.0 - weighted_distance / threshold
    } else {
        1.0
    };
    let frequency = (1.0 + best.count as f64).ln() / (1.0 + max_count as f64).ln();
    let confidence = (0.9 * closeness + 0.1 * frequency).clamp(0.0, 1.0);

    Some(TokenMatch {
        value: best.value,
        distance: best.distance,
        weighted_distance,
        confidence,
        usage_count: best.count,
        variable_id: best.variable_id.clone(),
    })
}
