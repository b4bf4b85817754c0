//! Resolution outcomes and how they are applied to a node

use forma_core::Color;
use forma_intent::vocabulary::{is_actionable_role, is_content_container_role, is_input_role};
use forma_intent::{
    ComponentNode, ComponentRef, ContainerNode, IntentNode, LayoutPrimitive, NodeBase,
    PropertyValue, Side, SizingConstraints, StyleToken, TextNode,
};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

/// What to do with a component node once a tier has matched
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Instruction {
    /// Point the node at a library component and merge variant properties
    BindComponent {
        component_id: String,
        component_key: Option<String>,
        properties: BTreeMap<String, PropertyValue>,
    },
    /// Replace the node with a styled container built from tokens
    SynthesizeContainer {
        styling: Vec<StyleToken>,
        variable_bindings: BTreeMap<String, String>,
    },
}

/// The winning tier's decision for one node
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolutionOutcome {
    pub tier: u8,
    pub strategy: String,
    pub confidence: f64,
    pub instruction: Instruction,
    /// Why this tier matched, for the summary
    pub detail: String,
}

impl ResolutionOutcome {
    /// Mutate the node in place according to the instruction. `taken_ids`
    /// holds every id already in the tree; ids of synthesized children are
    /// chosen outside it and added to it.
    pub fn apply(&self, node: &mut IntentNode, taken_ids: &mut HashSet<String>) {
        let IntentNode::Component(component) = node else {
            return;
        };

        match &self.instruction {
            Instruction::BindComponent {
                component_id,
                component_key,
                properties,
            } => {
                component.component_ref = Some(ComponentRef {
                    id: Some(component_id.clone()),
                    key: component_key.clone(),
                });
                for (name, value) in properties {
                    component.properties.insert(name.clone(), value.clone());
                }
            }
            Instruction::SynthesizeContainer {
                styling,
                variable_bindings,
            } => {
                let container = synthesize(component, styling, variable_bindings, taken_ids);
                *node = IntentNode::Container(container);
            }
        }
    }
}

fn synthesize(
    component: &ComponentNode,
    styling: &[StyleToken],
    variable_bindings: &BTreeMap<String, String>,
    taken_ids: &mut HashSet<String>,
) -> ContainerNode {
    let mut base = component.base.clone();
    base.style = styling.to_vec();
    base.variable_bindings
        .extend(variable_bindings.iter().map(|(k, v)| (k.clone(), v.clone())));
    if base.layout.is_none() {
        let role = base.role();
        let layout = if is_actionable_role(role) || is_input_role(role) {
            LayoutPrimitive::HorizontalStack
        } else {
            LayoutPrimitive::VerticalStack
        };
        base.layout = Some(layout.name().to_string());
    }

    let mut children = Vec::new();
    if let Some(label) = label_text(component) {
        let fill = base.computed_style().fill;
        let mut style = Vec::new();
        // Light text on dark fills
        if fill.map_or(false, |c| c.to_lab().l < 60.0) {
            style.push(StyleToken::TextColor(Color::WHITE));
        }
        children.push(IntentNode::Text(TextNode {
            base: NodeBase {
                style,
                constraints: Some(SizingConstraints::HUG),
                ..NodeBase::new(unique_id(&format!("{}__label", base.id), taken_ids), "Label")
            },
            content: Some(label),
        }));
    }

    ContainerNode { base, children }
}

fn unique_id(wanted: &str, taken_ids: &mut HashSet<String>) -> String {
    let mut id = wanted.to_string();
    let mut suffix = 2;
    while taken_ids.contains(&id) {
        id = format!("{}_{}", wanted, suffix);
        suffix += 1;
    }
    taken_ids.insert(id.clone());
    id
}

fn label_text(component: &ComponentNode) -> Option<String> {
    component
        .characters
        .clone()
        .or_else(|| {
            ["label", "text", "title", "placeholder"]
                .iter()
                .find_map(|name| component.property(name).map(|v| v.to_string()))
        })
        .filter(|s| !s.trim().is_empty())
}

/// Styling a synthesized element starts from when nothing else is known
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StyleDefaults {
    pub fill: Color,
    pub padding: f64,
    pub radius: f64,
    pub stroke: Option<Color>,
}

impl StyleDefaults {
    /// Built-in palette keyed by role
    pub fn for_role(role: &str) -> Self {
        if is_input_role(role) {
            Self {
                fill: Color::WHITE,
                padding: 12.0,
                radius: 6.0,
                stroke: Some(Color::from_hex(0xD1D5DB)),
            }
        } else if is_actionable_role(role) {
            Self {
                fill: Color::from_hex(0x2563EB),
                padding: 12.0,
                radius: 6.0,
                stroke: None,
            }
        } else if is_content_container_role(role) {
            Self {
                fill: Color::WHITE,
                padding: 24.0,
                radius: 8.0,
                stroke: Some(Color::from_hex(0xE5E7EB)),
            }
        } else {
            Self {
                fill: Color::from_hex(0xF3F4F6),
                padding: 8.0,
                radius: 4.0,
                stroke: None,
            }
        }
    }
}

/// Replace fill, padding, radius and stroke color in a token list,
/// keeping every other token
pub(crate) fn restyle(
    original: &[StyleToken],
    fill: Color,
    padding: f64,
    radius: f64,
    stroke: Option<Color>,
) -> Vec<StyleToken> {
    let mut tokens: Vec<StyleToken> = original
        .iter()
        .filter(|t| {
            !matches!(
                t,
                StyleToken::Fill(_)
                    | StyleToken::Padding { .. }
                    | StyleToken::Radius(_)
                    | StyleToken::StrokeColor(_)
            )
        })
        .cloned()
        .collect();
    tokens.push(StyleToken::Fill(fill));
    tokens.push(StyleToken::Padding {
        side: Side::All,
        value: padding,
    });
    tokens.push(StyleToken::Radius(radius));
    if let Some(stroke) = stroke {
        tokens.push(StyleToken::StrokeColor(stroke));
        if !original.iter().any(|t| matches!(t, StyleToken::StrokeWeight(_))) {
            tokens.push(StyleToken::StrokeWeight(1.0));
        }
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    fn button() -> IntentNode {
        IntentNode::Component(ComponentNode {
            base: NodeBase::new("submit", "PrimaryButton"),
            component_ref: Some(ComponentRef::by_id("missing")),
            characters: Some("Sign in".to_string()),
            ..Default::default()
        })
    }

    #[test]
    fn test_bind_sets_reference_and_merges_properties() {
        let mut node = button();
        let outcome = ResolutionOutcome {
            tier: 2,
            strategy: "keyword_match".to_string(),
            confidence: 0.8,
            instruction: Instruction::BindComponent {
                component_id: "1:2".to_string(),
                component_key: Some("k".to_string()),
                properties: BTreeMap::from([("Variant".to_string(), PropertyValue::from("Primary"))]),
            },
            detail: String::new(),
        };
        outcome.apply(&mut node, &mut HashSet::new());
        match &node {
            IntentNode::Component(c) => {
                assert_eq!(c.component_ref.as_ref().unwrap().id.as_deref(), Some("1:2"));
                assert_eq!(c.property("variant").and_then(|v| v.as_str()), Some("Primary"));
            }
            _ => panic!("expected component"),
        }
    }

    #[test]
    fn test_synthesize_converts_to_container_with_label() {
        let mut node = button();
        let defaults = StyleDefaults::for_role("PrimaryButton");
        let outcome = ResolutionOutcome {
            tier: 5,
            strategy: "hard_default".to_string(),
            confidence: 0.2,
            instruction: Instruction::SynthesizeContainer {
                styling: restyle(&[], defaults.fill, defaults.padding, defaults.radius, None),
                variable_bindings: BTreeMap::new(),
            },
            detail: String::new(),
        };
        outcome.apply(&mut node, &mut HashSet::new());

        assert_eq!(node.kind_name(), "Container");
        assert_eq!(node.base().layout.as_deref(), Some("HorizontalStack"));
        let label = &node.children()[0];
        assert_eq!(label.id(), "submit__label");
        match label {
            IntentNode::Text(t) => {
                assert_eq!(t.content.as_deref(), Some("Sign in"));
                assert_eq!(t.base.computed_style().text_color, Some(Color::WHITE));
            }
            _ => panic!("expected text label"),
        }
    }

    #[test]
    fn test_label_id_avoids_existing_ids() {
        let mut node = button();
        let outcome = ResolutionOutcome {
            tier: 5,
            strategy: "hard_default".to_string(),
            confidence: 0.2,
            instruction: Instruction::SynthesizeContainer {
                styling: Vec::new(),
                variable_bindings: BTreeMap::new(),
            },
            detail: String::new(),
        };
        let mut taken: HashSet<String> = ["submit", "submit__label", "submit__label_2"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        outcome.apply(&mut node, &mut taken);

        assert_eq!(node.children()[0].id(), "submit__label_3");
        assert!(taken.contains("submit__label_3"));
    }

    #[test]
    fn test_restyle_keeps_other_tokens() {
        let original = vec![
            StyleToken::parse("p-2"),
            StyleToken::parse("shadow-sm"),
            StyleToken::parse("bg-red-500"),
        ];
        let tokens = restyle(&original, Color::WHITE, 16.0, 8.0, Some(Color::BLACK));
        let text: Vec<String> = tokens.iter().map(|t| t.to_string()).collect();
        assert_eq!(
            text,
            vec!["shadow-sm", "bg-[#FFFFFF]", "p-4", "rounded-lg", "border-[#000000]", "border"]
        );
    }
}
