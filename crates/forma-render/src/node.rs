//! The renderable output tree

use forma_core::Color;
use forma_intent::Edges;
use serde::Serialize;
use std::collections::BTreeMap;

/// How a node sizes itself along one axis of its parent's auto-layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SizingMode {
    Fixed,
    Hug,
    Fill,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AxisSizing {
    pub horizontal: SizingMode,
    pub vertical: SizingMode,
}

impl Default for AxisSizing {
    fn default() -> Self {
        Self {
            horizontal: SizingMode::Hug,
            vertical: SizingMode::Hug,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LayoutDirection {
    Vertical,
    Horizontal,
    /// Free positioning; children cannot fill
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Align {
    Min,
    Center,
    Max,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AutoLayout {
    pub direction: LayoutDirection,
    pub wrap: bool,
    pub primary_align: Align,
    pub counter_align: Align,
    pub item_spacing: f64,
    pub padding: Edges,
}

impl Default for AutoLayout {
    fn default() -> Self {
        Self {
            direction: LayoutDirection::Vertical,
            wrap: false,
            primary_align: Align::Min,
            counter_align: Align::Min,
            item_spacing: 0.0,
            padding: Edges::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DropShadow {
    pub color: Color,
    pub offset_y: f64,
    pub radius: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct FontRef {
    pub family: String,
    pub style: String,
}

/// A generic container; the only node kind that owns children
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameNode {
    pub id: String,
    pub name: String,
    pub layout: AutoLayout,
    pub sizing: AxisSizing,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub fills: Vec<Color>,
    pub strokes: Vec<Color>,
    pub stroke_weight: f64,
    pub corner_radius: f64,
    pub effects: Vec<DropShadow>,
    pub bound_variables: BTreeMap<String, String>,
    pub children: Vec<RenderNode>,
}

/// An instance of a library component. Has no children field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstanceNode {
    pub id: String,
    pub name: String,
    pub component_id: String,
    pub component_key: Option<String>,
    pub properties: BTreeMap<String, String>,
    pub characters: Option<String>,
    pub sizing: AxisSizing,
    pub width: Option<f64>,
    pub height: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextRenderNode {
    pub id: String,
    pub name: String,
    pub characters: String,
    pub font: FontRef,
    pub font_size: f64,
    pub fill: Color,
    pub sizing: AxisSizing,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RenderNode {
    Frame(FrameNode),
    Instance(InstanceNode),
    Text(TextRenderNode),
}

impl RenderNode {
    pub fn id(&self) -> &str {
        match self {
            RenderNode::Frame(n) => &n.id,
            RenderNode::Instance(n) => &n.id,
            RenderNode::Text(n) => &n.id,
        }
    }

    pub fn children(&self) -> &[RenderNode] {
        match self {
            RenderNode::Frame(n) => &n.children,
            RenderNode::Instance(_) | RenderNode::Text(_) => &[],
        }
    }

    pub fn sizing(&self) -> AxisSizing {
        match self {
            RenderNode::Frame(n) => n.sizing,
            RenderNode::Instance(n) => n.sizing,
            RenderNode::Text(n) => n.sizing,
        }
    }

    pub fn sizing_mut(&mut self) -> &mut AxisSizing {
        match self {
            RenderNode::Frame(n) => &mut n.sizing,
            RenderNode::Instance(n) => &mut n.sizing,
            RenderNode::Text(n) => &mut n.sizing,
        }
    }

    pub fn node_count(&self) -> usize {
        1 + self.children().iter().map(RenderNode::node_count).sum::<usize>()
    }

    pub fn find(&self, id: &str) -> Option<&RenderNode> {
        if self.id() == id {
            return Some(self);
        }
        self.children().iter().find_map(|c| c.find(id))
    }

    /// Pre-order visit of every node
    pub fn visit<'a>(&'a self, f: &mut impl FnMut(&'a RenderNode)) {
        f(self);
        for child in self.children() {
            child.visit(f);
        }
    }
}
