//! Intent tree -> render tree translation
//!
//! The tree is flattened pre-order and nodes are built in fixed-size chunks,
//! yielding to the runtime between chunks and checking the cancellation
//! token before each one. Children are attached bottom-up once every node
//! exists, which is also when each child's sizing is applied against its
//! parent's layout.

use crate::node::{
    Align, AutoLayout, AxisSizing, DropShadow, FontRef, FrameNode, InstanceNode, LayoutDirection,
    RenderNode, SizingMode, TextRenderNode,
};
use crate::session::{RenderSession, SessionStats};
use forma_core::{Color, Diagnostic, ErrorKind, FormaError, Result};
use forma_intent::vocabulary::role_typography;
use forma_intent::{
    ComponentNode, ContainerNode, Dimension, IntentNode, InventoryIndex, LayoutPrimitive,
    NodeBase, RawColor, Sizing, TextNode,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// A node-scoped render problem
pub type RenderIssue = Diagnostic;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Trees with more nodes than this are rejected up front
    pub node_budget: usize,
    pub chunk_size: usize,
    pub font_family: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            node_budget: 500,
            chunk_size: 50,
            font_family: "Inter".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RenderOutput {
    pub root: RenderNode,
    pub errors: Vec<RenderIssue>,
    pub warnings: Vec<RenderIssue>,
    pub stats: SessionStats,
}

impl RenderOutput {
    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }
}

struct FlatNode<'t> {
    node: &'t IntentNode,
    parent: Option<usize>,
}

#[derive(Default)]
struct Issues {
    errors: Vec<RenderIssue>,
    warnings: Vec<RenderIssue>,
}

impl Issues {
    fn warn(&mut self, kind: ErrorKind, node_id: &str, message: impl Into<String>) {
        self.warnings.push(Diagnostic::warning(kind, node_id, message));
    }
}

pub struct Translator<'a> {
    index: &'a InventoryIndex<'a>,
    config: RenderConfig,
}

impl<'a> Translator<'a> {
    pub fn new(index: &'a InventoryIndex<'a>, config: RenderConfig) -> Self {
        Self { index, config }
    }

    pub async fn translate(
        &self,
        tree: &IntentNode,
        session: &mut RenderSession,
        cancel: &CancellationToken,
    ) -> Result<RenderOutput> {
        let nodes = tree.node_count();
        if nodes > self.config.node_budget {
            return Err(FormaError::TooComplex {
                nodes,
                budget: self.config.node_budget,
            });
        }

        let mut issues = Issues::default();
        let flat = flatten(tree);
        let mut shells: Vec<Option<RenderNode>> = Vec::with_capacity(flat.len());
        let chunk_size = self.config.chunk_size.max(1);

        for (chunk_index, chunk) in flat.chunks(chunk_size).enumerate() {
            let processed = chunk_index * chunk_size;
            if cancel.is_cancelled() {
                info!(processed, "Translation cancelled");
                return Err(FormaError::Cancelled { processed });
            }

            for entry in chunk {
                let index = shells.len();
                let parent_missing = entry.parent.map(|p| shells[p].is_none()).unwrap_or(false);
                if parent_missing {
                    shells.push(None);
                    continue;
                }

                match self.build_shell(entry.node, session, &mut issues).await {
                    Ok(shell) => shells.push(Some(shell)),
                    Err(reason) if index == 0 => {
                        return Err(FormaError::RootRender {
                            node_id: entry.node.id().to_string(),
                            reason,
                        });
                    }
                    Err(reason) => {
                        warn!(node = %entry.node.id(), %reason, "Node failed to render");
                        issues.errors.push(
                            Diagnostic::error(
                                ErrorKind::NodeRender,
                                entry.node.id(),
                                format!(
                                    "{} '{}' could not be rendered and was skipped",
                                    entry.node.kind_name(),
                                    entry.node.id()
                                ),
                            )
                            .with_detail(reason),
                        );
                        shells.push(None);
                    }
                }
            }

            tokio::task::yield_now().await;
        }

        let root = assemble(&flat, shells, &mut issues).ok_or_else(|| FormaError::RootRender {
            node_id: tree.id().to_string(),
            reason: "root node was not built".to_string(),
        })?;

        info!(
            nodes = root.node_count(),
            errors = issues.errors.len(),
            warnings = issues.warnings.len(),
            "Translation complete"
        );

        Ok(RenderOutput {
            root,
            errors: issues.errors,
            warnings: issues.warnings,
            stats: session.stats(),
        })
    }

    async fn build_shell(
        &self,
        node: &IntentNode,
        session: &mut RenderSession,
        issues: &mut Issues,
    ) -> std::result::Result<RenderNode, String> {
        match node {
            IntentNode::Container(container) => self.build_frame(container, session, issues),
            IntentNode::Component(component) => self.build_instance(component, issues),
            IntentNode::Text(text) => self.build_text(text, session, issues).await,
        }
    }

    fn build_frame(
        &self,
        container: &ContainerNode,
        session: &mut RenderSession,
        issues: &mut Issues,
    ) -> std::result::Result<RenderNode, String> {
        let base = &container.base;
        let style = base.computed_style();
        report_unknown_tokens(base, &style.unknown, issues);

        let mut layout = match base.layout.as_deref() {
            Some(name) => match LayoutPrimitive::parse(name) {
                Some(primitive) => auto_layout(primitive),
                None => {
                    issues.warn(
                        ErrorKind::UnknownStyle,
                        &base.id,
                        format!("Unknown layout primitive '{}'; using VerticalStack", name),
                    );
                    AutoLayout::default()
                }
            },
            None => AutoLayout::default(),
        };
        layout.padding = style.padding;
        layout.item_spacing = style.gap.unwrap_or(0.0);

        let mut fills: Vec<Color> = style.fill.into_iter().collect();
        fills.extend(usable_colors(base, "fill", &base.fills, issues));
        let mut strokes: Vec<Color> = style.stroke_color.into_iter().collect();
        strokes.extend(usable_colors(base, "stroke", &base.strokes, issues));
        let stroke_weight = match style.stroke_weight {
            Some(weight) => weight,
            None if !strokes.is_empty() => 1.0,
            None => 0.0,
        };

        let effects = style
            .shadow
            .map(|size| size.geometry())
            .filter(|(radius, _)| *radius > 0.0)
            .map(|(radius, offset_y)| DropShadow {
                color: Color::new(0.0, 0.0, 0.0, 0.1),
                offset_y,
                radius,
            })
            .into_iter()
            .collect();

        let (sizing, width, height) = initial_sizing(base, style.width, style.height);

        let mut bound_variables = BTreeMap::new();
        for (field, reference) in &base.variable_bindings {
            match session.resolve_variable(self.index, reference) {
                Some(variable) => {
                    bound_variables.insert(field.clone(), variable.id);
                }
                None => issues.warn(
                    ErrorKind::DanglingVariable,
                    &base.id,
                    format!("Variable '{}' bound to {} was not found", reference, field),
                ),
            }
        }

        Ok(RenderNode::Frame(FrameNode {
            id: base.id.clone(),
            name: display_name(base),
            layout,
            sizing,
            width,
            height,
            fills,
            strokes,
            stroke_weight,
            corner_radius: style.radius.unwrap_or(0.0),
            effects,
            bound_variables,
            children: Vec::new(),
        }))
    }

    fn build_instance(
        &self,
        component: &ComponentNode,
        issues: &mut Issues,
    ) -> std::result::Result<RenderNode, String> {
        let base = &component.base;
        let reference = component
            .component_ref
            .as_ref()
            .filter(|r| !r.is_empty())
            .ok_or_else(|| "component has no reference".to_string())?;
        let def = self.index.find_ref(reference).ok_or_else(|| {
            format!(
                "component '{}' is not in the inventory",
                reference.id.as_deref().or(reference.key.as_deref()).unwrap_or("?")
            )
        })?;

        let mut properties = BTreeMap::new();
        for (name, value) in &component.properties {
            let variant = def
                .variant_properties
                .keys()
                .find(|key| key.eq_ignore_ascii_case(name));
            match variant {
                Some(key) => {
                    properties.insert(key.clone(), value.to_string());
                }
                None => debug!(node = %base.id, property = %name, "Dropping non-variant property"),
            }
        }

        if !component.stray_children.is_empty() {
            warn!(node = %base.id, count = component.stray_children.len(), "Component instance has children; dropping them");
            issues.warn(
                ErrorKind::AtomicityViolation,
                &base.id,
                format!(
                    "Dropped {} child node(s) from component instance '{}'",
                    component.stray_children.len(),
                    base.id
                ),
            );
        }

        let style = base.computed_style();
        let (sizing, width, height) = initial_sizing(base, style.width, style.height);

        Ok(RenderNode::Instance(InstanceNode {
            id: base.id.clone(),
            name: base.name.clone().unwrap_or_else(|| def.name.clone()),
            component_id: def.id.clone(),
            component_key: (!def.key.is_empty()).then(|| def.key.clone()),
            properties,
            characters: component.characters.clone(),
            sizing,
            width,
            height,
        }))
    }

    async fn build_text(
        &self,
        text: &TextNode,
        session: &mut RenderSession,
        issues: &mut Issues,
    ) -> std::result::Result<RenderNode, String> {
        let base = &text.base;
        let style = base.computed_style();
        report_unknown_tokens(base, &style.unknown, issues);

        let (default_size, default_weight) = role_typography(base.role());
        let font = FontRef {
            family: self.config.font_family.clone(),
            style: style
                .font_weight
                .unwrap_or(default_weight)
                .style_name()
                .to_string(),
        };
        session
            .ensure_font(&font)
            .await
            .map_err(|e| format!("font {} {} failed to load: {}", font.family, font.style, e))?;

        let (sizing, _, _) = initial_sizing(base, style.width, style.height);

        Ok(RenderNode::Text(TextRenderNode {
            id: base.id.clone(),
            name: display_name(base),
            characters: text.content.clone().unwrap_or_default(),
            font,
            font_size: style.font_size.unwrap_or(default_size),
            fill: style.text_color.unwrap_or(Color::BLACK),
            sizing,
        }))
    }
}

fn flatten(tree: &IntentNode) -> Vec<FlatNode<'_>> {
    let mut flat = Vec::new();
    let mut stack = vec![FlatNode {
        node: tree,
        parent: None,
    }];

    while let Some(entry) = stack.pop() {
        let index = flat.len();
        let node = entry.node;
        flat.push(entry);

        for child in node.children().iter().rev() {
            stack.push(FlatNode {
                node: child,
                parent: Some(index),
            });
        }
    }

    flat
}

/// Attach children to parents, deepest first, applying child sizing
fn assemble(
    flat: &[FlatNode<'_>],
    mut shells: Vec<Option<RenderNode>>,
    issues: &mut Issues,
) -> Option<RenderNode> {
    let mut children: Vec<Vec<RenderNode>> = (0..flat.len()).map(|_| Vec::new()).collect();

    for index in (0..flat.len()).rev() {
        let Some(mut shell) = shells[index].take() else {
            continue;
        };
        if let RenderNode::Frame(frame) = &mut shell {
            let mut kids = std::mem::take(&mut children[index]);
            kids.reverse();
            frame.children = kids;
        }

        match flat[index].parent {
            Some(parent) => {
                let auto_layout = match flat[parent].node.base().layout.as_deref() {
                    Some(name) => LayoutPrimitive::parse(name)
                        .map(|p| p.is_auto_layout())
                        .unwrap_or(true),
                    None => true,
                };
                apply_child_sizing(&mut shell, auto_layout, issues);
                children[parent].push(shell);
            }
            None => {
                apply_child_sizing(&mut shell, false, issues);
                return Some(shell);
            }
        }
    }

    None
}

/// FILL only means something inside an auto-layout parent
fn apply_child_sizing(node: &mut RenderNode, parent_auto_layout: bool, issues: &mut Issues) {
    if parent_auto_layout {
        return;
    }
    let id = node.id().to_string();
    let sizing = node.sizing_mut();
    let mut demoted = false;
    for axis in [&mut sizing.horizontal, &mut sizing.vertical] {
        if *axis == SizingMode::Fill {
            *axis = SizingMode::Fixed;
            demoted = true;
        }
    }
    if demoted {
        issues.warn(
            ErrorKind::UnknownStyle,
            &id,
            "FILL sizing needs an auto-layout parent; using FIXED",
        );
    }
}

fn auto_layout(primitive: LayoutPrimitive) -> AutoLayout {
    let mut layout = AutoLayout::default();
    match primitive {
        LayoutPrimitive::VerticalStack => {}
        LayoutPrimitive::HorizontalStack => {
            layout.direction = LayoutDirection::Horizontal;
            layout.counter_align = Align::Center;
        }
        LayoutPrimitive::Grid | LayoutPrimitive::Wrap => {
            layout.direction = LayoutDirection::Horizontal;
            layout.wrap = true;
        }
        LayoutPrimitive::Overlay => layout.direction = LayoutDirection::None,
        LayoutPrimitive::Center => {
            layout.primary_align = Align::Center;
            layout.counter_align = Align::Center;
        }
    }
    layout
}

fn sizing_mode(sizing: Sizing) -> SizingMode {
    match sizing {
        Sizing::Hug => SizingMode::Hug,
        Sizing::Fill => SizingMode::Fill,
        Sizing::Fixed => SizingMode::Fixed,
    }
}

/// Sizing from constraints, overridden by explicit `w-*`/`h-*` tokens
fn initial_sizing(
    base: &NodeBase,
    width_token: Option<Dimension>,
    height_token: Option<Dimension>,
) -> (AxisSizing, Option<f64>, Option<f64>) {
    let mut sizing = base
        .constraints
        .map(|c| AxisSizing {
            horizontal: sizing_mode(c.width),
            vertical: sizing_mode(c.height),
        })
        .unwrap_or_default();
    let mut width = base.width;
    let mut height = base.height;

    match width_token {
        Some(Dimension::Fixed(w)) => {
            width = Some(w);
            sizing.horizontal = SizingMode::Fixed;
        }
        Some(Dimension::Full) => sizing.horizontal = SizingMode::Fill,
        None => {}
    }
    match height_token {
        Some(Dimension::Fixed(h)) => {
            height = Some(h);
            sizing.vertical = SizingMode::Fixed;
        }
        Some(Dimension::Full) => sizing.vertical = SizingMode::Fill,
        None => {}
    }

    (sizing, width, height)
}

fn report_unknown_tokens(base: &NodeBase, unknown: &[String], issues: &mut Issues) {
    for token in unknown {
        issues.warn(
            ErrorKind::UnknownStyle,
            &base.id,
            format!("Style token '{}' is not recognised", token),
        );
    }
}

/// Colors that can be painted; the rest are skipped with a warning
fn usable_colors(
    base: &NodeBase,
    what: &str,
    colors: &[RawColor],
    issues: &mut Issues,
) -> Vec<Color> {
    let mut usable = Vec::with_capacity(colors.len());
    for raw in colors {
        match raw.to_color() {
            Some(color) if raw.out_of_range_channels().is_empty() => usable.push(color),
            Some(_) => issues.warn(
                ErrorKind::InvalidColor,
                &base.id,
                format!("Skipped a {} color with channels outside [0, 1]", what),
            ),
            None => issues.warn(
                ErrorKind::MissingColorChannel,
                &base.id,
                format!("Skipped a {} color with a missing or non-numeric channel", what),
            ),
        }
    }
    usable
}

fn display_name(base: &NodeBase) -> String {
    base.name
        .clone()
        .or_else(|| base.semantic_role.clone())
        .unwrap_or_else(|| base.id.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::FontLoader;
    use async_trait::async_trait;
    use forma_intent::{ComponentDef, ComponentRef, Inventory, SizingConstraints, StyleToken};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn inventory() -> Inventory {
        let mut inventory = Inventory::new();
        inventory.components.push(ComponentDef {
            id: "1:20".to_string(),
            key: "btn-key".to_string(),
            name: "Button".to_string(),
            variant_properties: [(
                "Variant".to_string(),
                vec!["Primary".to_string(), "Secondary".to_string()],
            )]
            .into_iter()
            .collect(),
            ..Default::default()
        });
        inventory
    }

    fn stack(id: &str, layout: &str, children: Vec<IntentNode>) -> IntentNode {
        IntentNode::container(
            NodeBase {
                layout: Some(layout.to_string()),
                style: vec![StyleToken::parse("p-4"), StyleToken::parse("gap-2")],
                ..NodeBase::new(id, "Card")
            },
            children,
        )
    }

    fn text(id: &str, role: &str) -> IntentNode {
        IntentNode::text(NodeBase::new(id, role), id)
    }

    fn button(id: &str, component_id: &str) -> IntentNode {
        let mut node = IntentNode::component(
            NodeBase::new(id, "Button"),
            Some(ComponentRef::by_id(component_id)),
        );
        if let IntentNode::Component(component) = &mut node {
            component.characters = Some("Sign in".to_string());
            component.properties.insert("variant".to_string(), "Primary".into());
            component.properties.insert("tone".to_string(), "loud".into());
        }
        node
    }

    /// Fails for one font style and counts every load
    struct PickyLoader {
        reject: &'static str,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl FontLoader for PickyLoader {
        async fn load_font(&self, font: &FontRef) -> std::result::Result<(), String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if font.style == self.reject {
                Err(format!("{} is unavailable", font.style))
            } else {
                Ok(())
            }
        }
    }

    /// Cancels the run the first time a font is requested
    struct CancellingLoader {
        token: CancellationToken,
    }

    #[async_trait]
    impl FontLoader for CancellingLoader {
        async fn load_font(&self, _font: &FontRef) -> std::result::Result<(), String> {
            self.token.cancel();
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_translates_tree_shape() {
        let inventory = inventory();
        let index = inventory.index();
        let tree = stack(
            "card",
            "VerticalStack",
            vec![text("title", "Heading"), button("submit", "1:20")],
        );
        let translator = Translator::new(&index, RenderConfig::default());
        let mut session = RenderSession::default();

        let output = translator
            .translate(&tree, &mut session, &CancellationToken::new())
            .await
            .unwrap();

        assert!(output.is_complete());
        assert_eq!(output.root.node_count(), 3);
        let RenderNode::Frame(frame) = &output.root else {
            panic!("root should be a frame");
        };
        assert_eq!(frame.layout.direction, LayoutDirection::Vertical);
        assert_eq!(frame.layout.padding.top, 16.0);
        assert_eq!(frame.layout.item_spacing, 8.0);
        assert_eq!(frame.children[0].id(), "title");

        let Some(RenderNode::Text(title)) = output.root.find("title") else {
            panic!("title should be text");
        };
        assert_eq!(title.font_size, 24.0);
        assert_eq!(title.font.style, "Bold");

        let Some(RenderNode::Instance(instance)) = output.root.find("submit") else {
            panic!("submit should be an instance");
        };
        assert_eq!(instance.component_key.as_deref(), Some("btn-key"));
        assert_eq!(instance.properties.get("Variant").map(String::as_str), Some("Primary"));
        assert!(!instance.properties.contains_key("tone"));
        assert_eq!(instance.characters.as_deref(), Some("Sign in"));
    }

    #[tokio::test]
    async fn test_instances_never_have_children() {
        let inventory = inventory();
        let index = inventory.index();
        let mut tree = stack("row", "HorizontalStack", vec![button("submit", "1:20")]);
        if let Some(IntentNode::Component(component)) = tree.find_mut("submit") {
            component.stray_children.push(text("inner", "Label"));
        }
        let translator = Translator::new(&index, RenderConfig::default());

        let output = translator
            .translate(&tree, &mut RenderSession::default(), &CancellationToken::new())
            .await
            .unwrap();

        let mut instances = 0;
        output.root.visit(&mut |node| {
            if let RenderNode::Instance(_) = node {
                instances += 1;
                assert!(node.children().is_empty());
            }
        });
        assert_eq!(instances, 1);
        assert!(output.root.find("inner").is_none());
        assert!(output
            .warnings
            .iter()
            .any(|w| w.kind == ErrorKind::AtomicityViolation));
    }

    #[tokio::test]
    async fn test_over_budget_builds_nothing() {
        let inventory = inventory();
        let index = inventory.index();
        let tree = stack(
            "card",
            "VerticalStack",
            vec![text("a", "Text"), text("b", "Text")],
        );
        let loader = Arc::new(PickyLoader {
            reject: "",
            calls: AtomicUsize::new(0),
        });
        let config = RenderConfig {
            node_budget: 2,
            ..Default::default()
        };
        let translator = Translator::new(&index, config);
        let mut session = RenderSession::new(loader.clone());

        let err = translator
            .translate(&tree, &mut session, &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, FormaError::TooComplex { nodes: 3, budget: 2 }));
        assert_eq!(loader.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_cancellation_between_chunks() {
        let inventory = inventory();
        let index = inventory.index();
        let tree = stack(
            "card",
            "VerticalStack",
            vec![text("a", "Text"), text("b", "Text"), text("c", "Text")],
        );
        let token = CancellationToken::new();
        let mut session = RenderSession::new(Arc::new(CancellingLoader {
            token: token.clone(),
        }));
        let config = RenderConfig {
            chunk_size: 1,
            ..Default::default()
        };
        let translator = Translator::new(&index, config);

        let err = translator
            .translate(&tree, &mut session, &token)
            .await
            .unwrap_err();

        assert!(matches!(err, FormaError::Cancelled { processed: 2 }));
    }

    #[tokio::test]
    async fn test_node_failure_is_collected() {
        let inventory = inventory();
        let index = inventory.index();
        let tree = stack(
            "card",
            "VerticalStack",
            vec![
                text("title", "Heading"),
                text("body", "Paragraph"),
                button("ghost", "9:99"),
            ],
        );
        let mut session = RenderSession::new(Arc::new(PickyLoader {
            reject: "Bold",
            calls: AtomicUsize::new(0),
        }));
        let translator = Translator::new(&index, RenderConfig::default());

        let output = translator
            .translate(&tree, &mut session, &CancellationToken::new())
            .await
            .unwrap();

        assert!(output.root.find("title").is_none());
        assert!(output.root.find("ghost").is_none());
        assert!(output.root.find("body").is_some());
        let failed: Vec<_> = output
            .errors
            .iter()
            .filter(|e| e.kind == ErrorKind::NodeRender)
            .filter_map(|e| e.node_id.as_deref())
            .collect();
        assert_eq!(failed, vec!["title", "ghost"]);
    }

    #[tokio::test]
    async fn test_root_failure_is_fatal() {
        let inventory = inventory();
        let index = inventory.index();
        let tree = text("headline", "Heading");
        let mut session = RenderSession::new(Arc::new(PickyLoader {
            reject: "Bold",
            calls: AtomicUsize::new(0),
        }));
        let translator = Translator::new(&index, RenderConfig::default());

        let err = translator
            .translate(&tree, &mut session, &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, FormaError::RootRender { ref node_id, .. } if node_id == "headline"));
    }

    #[tokio::test]
    async fn test_fill_under_overlay_becomes_fixed() {
        let inventory = inventory();
        let index = inventory.index();
        let mut child = text("caption", "Caption");
        child.base_mut().constraints = Some(SizingConstraints::new(Sizing::Fill, Sizing::Hug));
        let tree = stack("layer", "Overlay", vec![child]);
        let translator = Translator::new(&index, RenderConfig::default());

        let output = translator
            .translate(&tree, &mut RenderSession::default(), &CancellationToken::new())
            .await
            .unwrap();

        let caption = output.root.find("caption").unwrap();
        assert_eq!(caption.sizing().horizontal, SizingMode::Fixed);
        assert_eq!(caption.sizing().vertical, SizingMode::Hug);
        assert!(output.warnings.iter().any(|w| w.node_id.as_deref() == Some("caption")));
    }

    #[tokio::test]
    async fn test_unknown_primitive_and_tokens_warn() {
        let inventory = inventory();
        let index = inventory.index();
        let mut tree = stack("odd", "Spiral", vec![text("a", "Text")]);
        tree.base_mut().style.push(StyleToken::parse("sparkle-3"));
        let translator = Translator::new(&index, RenderConfig::default());

        let output = translator
            .translate(&tree, &mut RenderSession::default(), &CancellationToken::new())
            .await
            .unwrap();

        let RenderNode::Frame(frame) = &output.root else {
            panic!("root should be a frame");
        };
        assert_eq!(frame.layout.direction, LayoutDirection::Vertical);
        let unknown = output
            .warnings
            .iter()
            .filter(|w| w.kind == ErrorKind::UnknownStyle)
            .count();
        assert_eq!(unknown, 2);
    }

    #[tokio::test]
    async fn test_unpaintable_colors_skipped() {
        let inventory = inventory();
        let index = inventory.index();
        let mut tree = stack("panel", "VerticalStack", vec![text("a", "Text")]);
        let base = tree.base_mut();
        base.fills = vec![
            RawColor::rgb(f64::NAN, 0.5, 0.5),
            RawColor::rgb(0.2, 0.4, 0.6),
        ];
        base.strokes = vec![RawColor::rgb(1.5, 0.0, 0.0)];
        let translator = Translator::new(&index, RenderConfig::default());

        let output = translator
            .translate(&tree, &mut RenderSession::default(), &CancellationToken::new())
            .await
            .unwrap();

        let RenderNode::Frame(frame) = &output.root else {
            panic!("root should be a frame");
        };
        assert_eq!(frame.fills, vec![Color::new(0.2, 0.4, 0.6, 1.0)]);
        assert!(frame.strokes.is_empty());
        assert_eq!(frame.stroke_weight, 0.0);
        let kinds: Vec<ErrorKind> = output.warnings.iter().map(|w| w.kind).collect();
        assert!(kinds.contains(&ErrorKind::MissingColorChannel));
        assert!(kinds.contains(&ErrorKind::InvalidColor));
        assert!(output.is_complete());
    }

    #[tokio::test]
    async fn test_fonts_memoized_across_nodes() {
        let inventory = inventory();
        let index = inventory.index();
        let tree = stack(
            "list",
            "VerticalStack",
            vec![text("a", "Text"), text("b", "Text"), text("c", "Heading")],
        );
        let loader = Arc::new(PickyLoader {
            reject: "",
            calls: AtomicUsize::new(0),
        });
        let mut session = RenderSession::new(loader.clone());
        let translator = Translator::new(&index, RenderConfig::default());

        let output = translator
            .translate(&tree, &mut session, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(loader.calls.load(Ordering::SeqCst), 2);
        assert_eq!(output.stats.font_cache_hits, 1);
    }
}
