//! The design-intent tree

use crate::style::{ComputedStyle, StyleToken};
use crate::vocabulary::role_typography;
use forma_core::Color;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// How a node sizes itself along one axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sizing {
    Hug,
    Fill,
    Fixed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizingConstraints {
    pub width: Sizing,
    pub height: Sizing,
}

impl SizingConstraints {
    pub const HUG: Self = Self {
        width: Sizing::Hug,
        height: Sizing::Hug,
    };

    pub fn new(width: Sizing, height: Sizing) -> Self {
        Self { width, height }
    }
}

/// A color as it arrives from the generator; channels may be missing
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RawColor {
    #[serde(default)]
    pub r: Option<f64>,
    #[serde(default)]
    pub g: Option<f64>,
    #[serde(default)]
    pub b: Option<f64>,
    #[serde(default)]
    pub a: Option<f64>,
}

impl RawColor {
    pub fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self {
            r: Some(r),
            g: Some(g),
            b: Some(b),
            a: None,
        }
    }

    /// The usable color, or None if any channel is missing or NaN
    pub fn to_color(&self) -> Option<Color> {
        let channel = |c: Option<f64>| c.filter(|v| v.is_finite());
        Some(Color::new(
            channel(self.r)?,
            channel(self.g)?,
            channel(self.b)?,
            match self.a {
                Some(a) if a.is_finite() => a,
                Some(_) => return None,
                None => 1.0,
            },
        ))
    }

    /// Channels that are present and finite but outside [0, 1]
    pub fn out_of_range_channels(&self) -> Vec<(&'static str, f64)> {
        [("r", self.r), ("g", self.g), ("b", self.b), ("a", self.a)]
            .into_iter()
            .filter_map(|(name, value)| value.map(|v| (name, v)))
            .filter(|(_, v)| v.is_finite() && !(0.0..=1.0).contains(v))
            .collect()
    }
}

impl From<Color> for RawColor {
    fn from(color: Color) -> Self {
        Self {
            r: Some(color.r),
            g: Some(color.g),
            b: Some(color.b),
            a: Some(color.a),
        }
    }
}

/// Reference to a library component by id and/or key
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

impl ComponentRef {
    pub fn by_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            key: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.id.as_deref().map(str::is_empty).unwrap_or(true)
            && self.key.as_deref().map(str::is_empty).unwrap_or(true)
    }
}

impl fmt::Display for ComponentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.id, &self.key) {
            (Some(id), Some(key)) => write!(f, "{} ({})", id, key),
            (Some(id), None) => f.write_str(id),
            (None, Some(key)) => write!(f, "key {}", key),
            (None, None) => f.write_str("<none>"),
        }
    }
}

/// A variant property value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl PropertyValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Bool(b) => write!(f, "{}", b),
            PropertyValue::Number(n) => write!(f, "{}", n),
            PropertyValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::Text(value.to_string())
    }
}

/// Fields shared by every node kind
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeBase {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semantic_role: Option<String>,
    #[serde(default, rename = "layoutPrimitive", skip_serializing_if = "Option::is_none")]
    pub layout: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub style: Vec<StyleToken>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraints: Option<SizingConstraints>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fills: Vec<RawColor>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub strokes: Vec<RawColor>,
    /// Node property (e.g. "fill") -> inventory variable id
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub variable_bindings: BTreeMap<String, String>,
    /// Free text the generator attached to this element
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent: Option<String>,
}

impl NodeBase {
    pub fn new(id: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            semantic_role: Some(role.into()),
            constraints: Some(SizingConstraints::HUG),
            ..Default::default()
        }
    }

    pub fn role(&self) -> &str {
        self.semantic_role.as_deref().unwrap_or("")
    }

    pub fn computed_style(&self) -> ComputedStyle {
        ComputedStyle::from_tokens(&self.style)
    }

    /// True when the node paints a background, via tokens or raw fills
    pub fn has_fill(&self) -> bool {
        !self.fills.is_empty()
            || self.variable_bindings.contains_key("fill")
            || self.style.iter().any(|t| matches!(t, StyleToken::Fill(_)))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContainerNode {
    #[serde(flatten)]
    pub base: NodeBase,
    #[serde(default)]
    pub children: Vec<IntentNode>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentNode {
    #[serde(flatten)]
    pub base: NodeBase,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component_ref: Option<ComponentRef>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, PropertyValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub characters: Option<String>,
    /// Children supplied by the generator. Always a violation: the validator
    /// strips them and the translator never renders them.
    #[serde(default, rename = "children", skip_serializing_if = "Vec::is_empty")]
    pub stray_children: Vec<IntentNode>,
}

impl ComponentNode {
    /// Look up a property case-insensitively
    pub fn property(&self, name: &str) -> Option<&PropertyValue> {
        self.properties
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextNode {
    #[serde(flatten)]
    pub base: NodeBase,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl TextNode {
    /// Effective font size: explicit token, else the role default
    pub fn font_size(&self) -> f64 {
        self.base
            .computed_style()
            .font_size
            .unwrap_or_else(|| role_typography(self.base.role()).0)
    }
}

/// One node of the design-intent tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum IntentNode {
    Container(ContainerNode),
    #[serde(rename = "InstantiatedComponent", alias = "Component")]
    Component(ComponentNode),
    Text(TextNode),
}

impl IntentNode {
    pub fn container(base: NodeBase, children: Vec<IntentNode>) -> Self {
        IntentNode::Container(ContainerNode { base, children })
    }

    pub fn component(base: NodeBase, component_ref: Option<ComponentRef>) -> Self {
        IntentNode::Component(ComponentNode {
            base,
            component_ref,
            ..Default::default()
        })
    }

    pub fn text(base: NodeBase, content: impl Into<String>) -> Self {
        IntentNode::Text(TextNode {
            base,
            content: Some(content.into()),
        })
    }

    pub fn base(&self) -> &NodeBase {
        match self {
            IntentNode::Container(n) => &n.base,
            IntentNode::Component(n) => &n.base,
            IntentNode::Text(n) => &n.base,
        }
    }

    pub fn base_mut(&mut self) -> &mut NodeBase {
        match self {
            IntentNode::Container(n) => &mut n.base,
            IntentNode::Component(n) => &mut n.base,
            IntentNode::Text(n) => &mut n.base,
        }
    }

    pub fn id(&self) -> &str {
        &self.base().id
    }

    pub fn role(&self) -> &str {
        self.base().role()
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            IntentNode::Container(_) => "Container",
            IntentNode::Component(_) => "InstantiatedComponent",
            IntentNode::Text(_) => "Text",
        }
    }

    /// Real children; stray children of components are never included
    pub fn children(&self) -> &[IntentNode] {
        match self {
            IntentNode::Container(n) => &n.children,
            IntentNode::Component(_) | IntentNode::Text(_) => &[],
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<IntentNode>> {
        match self {
            IntentNode::Container(n) => Some(&mut n.children),
            IntentNode::Component(_) | IntentNode::Text(_) => None,
        }
    }

    /// Total number of nodes including this one
    pub fn node_count(&self) -> usize {
        1 + self.children().iter().map(IntentNode::node_count).sum::<usize>()
    }

    /// Depth of the deepest node, counting this one as depth 1
    pub fn max_depth(&self) -> usize {
        1 + self
            .children()
            .iter()
            .map(IntentNode::max_depth)
            .max()
            .unwrap_or(0)
    }

    /// Pre-order visit of every node
    pub fn visit<'a>(&'a self, f: &mut impl FnMut(&'a IntentNode)) {
        f(self);
        for child in self.children() {
            child.visit(f);
        }
    }

    /// Pre-order visit with mutable access
    pub fn visit_mut(&mut self, f: &mut impl FnMut(&mut IntentNode)) {
        f(self);
        if let Some(children) = self.children_mut() {
            for child in children {
                child.visit_mut(f);
            }
        }
    }

    pub fn find(&self, id: &str) -> Option<&IntentNode> {
        if self.id() == id {
            return Some(self);
        }
        self.children().iter().find_map(|c| c.find(id))
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut IntentNode> {
        if self.id() == id {
            return Some(self);
        }
        self.children_mut()?
            .iter_mut()
            .find_map(|c| c.find_mut(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tree() -> IntentNode {
        IntentNode::container(
            NodeBase {
                layout: Some("VerticalStack".to_string()),
                ..NodeBase::new("root", "Card")
            },
            vec![
                IntentNode::text(NodeBase::new("title", "Heading"), "Welcome"),
                IntentNode::container(
                    NodeBase::new("row", "Row"),
                    vec![IntentNode::component(
                        NodeBase::new("ok", "Button"),
                        Some(ComponentRef::by_id("btn-1")),
                    )],
                ),
            ],
        )
    }

    #[test]
    fn test_counts_and_depth() {
        let tree = sample_tree();
        assert_eq!(tree.node_count(), 4);
        assert_eq!(tree.max_depth(), 3);
    }

    #[test]
    fn test_find() {
        let mut tree = sample_tree();
        assert_eq!(tree.find("ok").map(|n| n.kind_name()), Some("InstantiatedComponent"));
        tree.find_mut("title").unwrap().base_mut().name = Some("Title".to_string());
        assert_eq!(tree.find("title").unwrap().base().name.as_deref(), Some("Title"));
        assert!(tree.find("missing").is_none());
    }

    #[test]
    fn test_parse_json_tree() {
        let json = r#"{
            "kind": "Container",
            "id": "form",
            "semanticRole": "Form",
            "layoutPrimitive": "VerticalStack",
            "style": ["p-6", "gap-4"],
            "constraints": {"width": "fill", "height": "hug"},
            "children": [
                {"kind": "InstantiatedComponent", "id": "submit", "semanticRole": "Button",
                 "componentRef": {"key": "abc"}, "properties": {"Variant": "Primary", "Disabled": false},
                 "children": [{"kind": "Text", "id": "oops", "content": "x"}]},
                {"kind": "Text", "id": "hint", "semanticRole": "Caption", "content": "We never share it"}
            ]
        }"#;

        let tree: IntentNode = serde_json::from_str(json).unwrap();
        assert_eq!(tree.children().len(), 2);
        match &tree.children()[0] {
            IntentNode::Component(c) => {
                assert_eq!(c.component_ref.as_ref().unwrap().key.as_deref(), Some("abc"));
                assert_eq!(c.stray_children.len(), 1);
                assert_eq!(c.property("variant").and_then(|v| v.as_str()), Some("Primary"));
                assert_eq!(c.property("disabled"), Some(&PropertyValue::Bool(false)));
            }
            other => panic!("expected component, got {}", other.kind_name()),
        }
        // Stray children are not real children
        assert_eq!(tree.node_count(), 3);
    }

    #[test]
    fn test_raw_color() {
        assert_eq!(RawColor::rgb(1.0, 0.0, 0.0).to_color(), Some(Color::rgb(1.0, 0.0, 0.0)));
        assert_eq!(RawColor::rgb(f64::NAN, 0.0, 0.0).to_color(), None);
        let missing = RawColor {
            r: Some(0.5),
            ..Default::default()
        };
        assert_eq!(missing.to_color(), None);
        assert_eq!(RawColor::rgb(1.2, 0.0, -0.1).out_of_range_channels().len(), 2);
    }

    #[test]
    fn test_text_font_size_defaults() {
        let heading = TextNode {
            base: NodeBase::new("h", "Heading"),
            content: Some("Hi".to_string()),
        };
        assert_eq!(heading.font_size(), 24.0);

        let body = TextNode {
            base: NodeBase {
                style: vec![StyleToken::parse("text-lg")],
                ..NodeBase::new("b", "Body")
            },
            content: Some("Hello".to_string()),
        };
        assert_eq!(body.font_size(), 18.0);
    }
}
