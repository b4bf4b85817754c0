//! The five built-in resolution tiers

use crate::anatomy::{Anatomy, Archetype};
use crate::keywords::{extract_keywords, score_component};
use crate::outcome::{restyle, Instruction, ResolutionOutcome, StyleDefaults};
use crate::strategy::{ResolutionState, ResolutionStrategy, ResolveContext};
use forma_intent::{ComponentDef, ComponentNode, PropertyValue};
use std::collections::BTreeMap;

/// Keep the node's properties that the component exposes, renamed to the
/// component's own spelling
fn supported_properties(
    node: &ComponentNode,
    component: &ComponentDef,
) -> BTreeMap<String, PropertyValue> {
    node.properties
        .iter()
        .filter_map(|(name, value)| {
            component
                .variant_properties
                .keys()
                .find(|k| k.eq_ignore_ascii_case(name))
                .map(|k| (k.clone(), value.clone()))
        })
        .collect()
}

fn bind(
    tier: u8,
    strategy: &str,
    node: &ComponentNode,
    component: &ComponentDef,
    confidence: f64,
    detail: String,
) -> ResolutionOutcome {
    ResolutionOutcome {
        tier,
        strategy: strategy.to_string(),
        confidence,
        instruction: Instruction::BindComponent {
            component_id: component.id.clone(),
            component_key: (!component.key.is_empty()).then(|| component.key.clone()),
            properties: supported_properties(node, component),
        },
        detail,
    }
}

/// Tier 1: the reference names a library component verbatim
pub struct ExactReference;

impl ResolutionStrategy for ExactReference {
    fn name(&self) -> &'static str {
        "exact_reference"
    }

    fn tier(&self) -> u8 {
        1
    }

    fn resolve<'a>(
        &self,
        node: &ComponentNode,
        ctx: &ResolveContext<'a>,
        _state: &mut ResolutionState<'a>,
    ) -> Option<ResolutionOutcome> {
        let reference = node.component_ref.as_ref()?;
        let component = ctx.index.find_ref(reference)?;
        Some(bind(
            self.tier(),
            self.name(),
            node,
            component,
            1.0,
            format!("reference matches '{}'", component.name),
        ))
    }
}

/// Tier 2: keyword relevance between the node's intent and component metadata
pub struct KeywordMatch;

impl KeywordMatch {
    /// Keywords from the node's intent text, falling back to its role,
    /// name and reference
    pub fn keywords_for(node: &ComponentNode) -> Vec<String> {
        if let Some(intent) = node.base.intent.as_deref() {
            let keywords = extract_keywords(intent);
            if !keywords.is_empty() {
                return keywords;
            }
        }

        let mut text = vec![node.base.role().to_string()];
        text.extend(node.base.name.clone());
        if let Some(reference) = &node.component_ref {
            text.extend(reference.id.clone());
            text.extend(reference.key.clone());
        }
        extract_keywords(&text.join(" "))
    }
}

impl ResolutionStrategy for KeywordMatch {
    fn name(&self) -> &'static str {
        "keyword_match"
    }

    fn tier(&self) -> u8 {
        2
    }

    fn resolve<'a>(
        &self,
        node: &ComponentNode,
        ctx: &ResolveContext<'a>,
        state: &mut ResolutionState<'a>,
    ) -> Option<ResolutionOutcome> {
        let keywords = Self::keywords_for(node);
        let by_name = ctx.index.components_by_name();

        // Stable sort keeps name order among equal scores
        let mut scored: Vec<(u32, &'a ComponentDef)> = by_name
            .iter()
            .map(|c| (score_component(c, &keywords), *c))
            .filter(|(score, _)| *score > 0)
            .collect();
        scored.sort_by(|a, b| b.0.cmp(&a.0));

        let Some(&(score, best)) = scored.first() else {
            tracing::debug!(
                node = %node.base.id,
                ?keywords,
                "No keyword relevance; falling back to first components by name"
            );
            state.candidates = Some(
                by_name
                    .into_iter()
                    .take(ctx.config.fallback_candidates)
                    .collect(),
            );
            return None;
        };

        let confidence = (0.5 + score as f64 / 60.0).min(0.95);
        Some(bind(
            self.tier(),
            self.name(),
            node,
            best,
            confidence,
            format!("keywords {:?} scored {} on '{}'", keywords, score, best.name),
        ))
    }
}

/// Tier 3: component anatomy against a named archetype
pub struct StructuralMatch;

impl ResolutionStrategy for StructuralMatch {
    fn name(&self) -> &'static str {
        "structural_match"
    }

    fn tier(&self) -> u8 {
        3
    }

    fn resolve<'a>(
        &self,
        node: &ComponentNode,
        ctx: &ResolveContext<'a>,
        state: &mut ResolutionState<'a>,
    ) -> Option<ResolutionOutcome> {
        let archetype = Archetype::for_role(node.base.role())?;
        let candidates = state
            .candidates
            .clone()
            .unwrap_or_else(|| ctx.index.components_by_name());

        let mut best: Option<(f64, &ComponentDef)> = None;
        for component in candidates {
            let Some(structure) = &component.structure else {
                continue;
            };
            let score = archetype.score(&Anatomy::analyze(structure));
            if best.map_or(true, |(s, _)| score > s) {
                best = Some((score, component));
            }
        }

        let (score, component) = best?;
        if score < ctx.config.structural_threshold {
            tracing::debug!(
                node = %node.base.id,
                %archetype,
                score,
                "Best structural match below threshold"
            );
            return None;
        }

        Some(bind(
            self.tier(),
            self.name(),
            node,
            component,
            score * 0.8,
            format!("'{}' looks like {} ({:.2})", component.name, archetype, score),
        ))
    }
}

/// Tier 4: styled container using token values the document already uses
pub struct TokenApproximate;

impl ResolutionStrategy for TokenApproximate {
    fn name(&self) -> &'static str {
        "token_approximate"
    }

    fn tier(&self) -> u8 {
        4
    }

    fn resolve<'a>(
        &self,
        node: &ComponentNode,
        ctx: &ResolveContext<'a>,
        _state: &mut ResolutionState<'a>,
    ) -> Option<ResolutionOutcome> {
        if ctx.index.inventory().usage.is_empty() {
            return None;
        }

        let defaults = StyleDefaults::for_role(node.base.role());
        let requested = node.base.computed_style();
        let want_fill = requested.fill.unwrap_or(defaults.fill);
        let want_padding = if requested.padding.is_zero() {
            defaults.padding
        } else {
            requested.padding.top.max(requested.padding.left)
        };
        let want_radius = requested.radius.unwrap_or(defaults.radius);

        let mut bindings = BTreeMap::new();
        let mut confidences = Vec::new();
        let mut matched = 0;

        let fill = match ctx.matcher.find_closest_color(want_fill) {
            Some(m) => {
                if let Some(variable) = m.variable_id {
                    bindings.insert("fill".to_string(), variable);
                }
                matched += 1;
                confidences.push(m.confidence);
                m.value
            }
            None => {
                confidences.push(0.3);
                want_fill
            }
        };
        let padding = match ctx.matcher.find_closest_spacing(want_padding) {
            Some(m) => {
                if let Some(variable) = m.variable_id {
                    bindings.insert("padding".to_string(), variable);
                }
                matched += 1;
                confidences.push(m.confidence);
                m.value
            }
            None => {
                confidences.push(0.3);
                want_padding
            }
        };
        let radius = match ctx.matcher.find_closest_radius(want_radius) {
            Some(m) => {
                if let Some(variable) = m.variable_id {
                    bindings.insert("cornerRadius".to_string(), variable);
                }
                matched += 1;
                confidences.push(m.confidence);
                m.value
            }
            None => {
                confidences.push(0.3);
                want_radius
            }
        };

        if matched == 0 {
            tracing::debug!(
                node = %node.base.id,
                "No used token value is close enough; leaving it to the defaults"
            );
            return None;
        }

        let confidence = 0.6 * confidences.iter().sum::<f64>() / confidences.len() as f64;
        let stroke = requested.stroke_color.or(defaults.stroke);
        Some(ResolutionOutcome {
            tier: self.tier(),
            strategy: self.name().to_string(),
            confidence,
            instruction: Instruction::SynthesizeContainer {
                styling: restyle(&node.base.style, fill, padding, radius, stroke),
                variable_bindings: bindings,
            },
            detail: format!("synthesized from {} used token value(s)", matched),
        })
    }
}

/// Tier 5: fixed built-in palette; always succeeds
pub struct HardDefault;

impl ResolutionStrategy for HardDefault {
    fn name(&self) -> &'static str {
        "hard_default"
    }

    fn tier(&self) -> u8 {
        5
    }

    fn resolve<'a>(
        &self,
        node: &ComponentNode,
        _ctx: &ResolveContext<'a>,
        _state: &mut ResolutionState<'a>,
    ) -> Option<ResolutionOutcome> {
        let defaults = StyleDefaults::for_role(node.base.role());
        Some(ResolutionOutcome {
            tier: self.tier(),
            strategy: self.name().to_string(),
            confidence: 0.2,
            instruction: Instruction::SynthesizeContainer {
                styling: restyle(
                    &node.base.style,
                    defaults.fill,
                    defaults.padding,
                    defaults.radius,
                    defaults.stroke,
                ),
                variable_bindings: BTreeMap::new(),
            },
            detail: "built-in default styling".to_string(),
        })
    }
}
