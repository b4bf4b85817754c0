//! Structural validation of intent trees

use crate::report::ValidationReport;
use forma_core::{Diagnostic, ErrorKind, Severity};
use forma_intent::{parse_intent_tree, IntentNode, InventoryIndex, NodeBase, RawColor};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Validator settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Deepest allowed nesting, counting the root as 1
    pub max_depth: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self { max_depth: 8 }
    }
}

/// Checks an intent tree against the inventory.
///
/// Pure apart from one auto-correction: children found under an
/// InstantiatedComponent are stripped and reported as a warning.
pub struct Validator<'a> {
    index: &'a InventoryIndex<'a>,
    config: ValidationConfig,
}

struct Walk {
    path: HashSet<String>,
    seen: HashSet<String>,
    report: ValidationReport,
}

impl<'a> Validator<'a> {
    /// Create a new validator
    pub fn new(index: &'a InventoryIndex<'a>, config: ValidationConfig) -> Self {
        Self { index, config }
    }

    /// Validate a tree, stripping children from component instances
    pub fn validate(&self, tree: &mut IntentNode) -> ValidationReport {
        let mut walk = Walk {
            path: HashSet::new(),
            seen: HashSet::new(),
            report: ValidationReport::new(),
        };
        self.check_node(tree, 1, &mut walk);

        tracing::info!(
            errors = walk.report.error_count(),
            warnings = walk.report.warning_count(),
            "Validation complete"
        );
        walk.report
    }

    /// Parse and validate raw JSON. Unreadable input becomes a
    /// `MalformedInput` error instead of a failure.
    pub fn validate_json(&self, json: &str) -> (Option<IntentNode>, ValidationReport) {
        match parse_intent_tree(json) {
            Ok(mut tree) => {
                let report = self.validate(&mut tree);
                (Some(tree), report)
            }
            Err(e) => {
                let mut report = ValidationReport::new();
                report.push(
                    Diagnostic::global(
                        ErrorKind::MalformedInput,
                        Severity::Error,
                        "The design could not be read.",
                    )
                    .with_detail(e.to_string()),
                );
                (None, report)
            }
        }
    }

    fn check_node(&self, node: &mut IntentNode, depth: usize, walk: &mut Walk) {
        let label = node_label(node, depth);

        if depth > self.config.max_depth {
            walk.report.push(Diagnostic::error(
                ErrorKind::DepthExceeded,
                label,
                format!(
                    "Nesting depth {} exceeds the maximum of {}",
                    depth, self.config.max_depth
                ),
            ));
            return;
        }

        let id = node.id().to_string();
        if id.is_empty() {
            walk.report.push(Diagnostic::error(
                ErrorKind::MissingField,
                label.clone(),
                "Node has no id",
            ));
        } else if walk.path.contains(&id) {
            // Same id as an ancestor: following it would loop forever
            walk.report.push(Diagnostic::error(
                ErrorKind::Cycle,
                label,
                format!("Node '{}' appears inside itself", id),
            ));
            return;
        } else if !walk.seen.insert(id.clone()) {
            walk.report.push(Diagnostic::error(
                ErrorKind::DuplicateId,
                label.clone(),
                format!("Id '{}' is used more than once", id),
            ));
        }

        self.check_base(node.base(), &label, &mut walk.report);

        match node {
            IntentNode::Container(container) => {
                if container.base.layout.as_deref().map_or(true, str::is_empty) {
                    walk.report.push(Diagnostic::error(
                        ErrorKind::MissingField,
                        label.clone(),
                        "Container has no layout primitive",
                    ));
                }
            }
            IntentNode::Component(component) => {
                match &component.component_ref {
                    Some(reference) if !reference.is_empty() => {
                        if self.index.find_ref(reference).is_none() {
                            walk.report.push(
                                Diagnostic::warning(
                                    ErrorKind::UnresolvedComponent,
                                    label.clone(),
                                    "Component is not in the library",
                                )
                                .with_detail(format!("reference {}", reference)),
                            );
                        }
                    }
                    _ => walk.report.push(Diagnostic::error(
                        ErrorKind::MissingField,
                        label.clone(),
                        "Component has no component reference",
                    )),
                }

                if !component.stray_children.is_empty() {
                    let stripped = std::mem::take(&mut component.stray_children);
                    tracing::warn!(
                        node = %label,
                        count = stripped.len(),
                        "Stripped children from component instance"
                    );
                    walk.report.push(Diagnostic::warning(
                        ErrorKind::AtomicityViolation,
                        label.clone(),
                        format!(
                            "Component instance had {} child node(s); they were removed",
                            stripped.len()
                        ),
                    ));
                }
            }
            IntentNode::Text(text) => {
                if text.content.as_deref().map_or(true, |c| c.trim().is_empty()) {
                    walk.report.push(Diagnostic::warning(
                        ErrorKind::EmptyText,
                        label.clone(),
                        "Text node has no content",
                    ));
                }
            }
        }

        if let Some(children) = node.children_mut() {
            let on_path = !id.is_empty() && walk.path.insert(id.clone());
            for child in children.iter_mut() {
                self.check_node(child, depth + 1, walk);
            }
            if on_path {
                walk.path.remove(&id);
            }
        }
    }

    fn check_base(&self, base: &NodeBase, label: &str, report: &mut ValidationReport) {
        if base.semantic_role.as_deref().map_or(true, str::is_empty) {
            report.push(Diagnostic::error(
                ErrorKind::MissingField,
                label,
                "Node has no semantic role",
            ));
        }
        if base.constraints.is_none() {
            report.push(Diagnostic::error(
                ErrorKind::MissingField,
                label,
                "Node has no sizing constraints",
            ));
        }

        let colors = base
            .fills
            .iter()
            .map(|c| ("fill", c))
            .chain(base.strokes.iter().map(|c| ("stroke", c)));
        for (what, color) in colors {
            check_color(what, color, label, report);
        }

        for (property, variable_id) in &base.variable_bindings {
            if self.index.variable(variable_id).is_none() {
                report.push(Diagnostic::error(
                    ErrorKind::DanglingVariable,
                    label,
                    format!("Binding '{}' points at unknown variable '{}'", property, variable_id),
                ));
            }
        }
    }
}

fn check_color(what: &str, color: &RawColor, label: &str, report: &mut ValidationReport) {
    let out_of_range = color.out_of_range_channels();
    for (channel, value) in &out_of_range {
        report.push(Diagnostic::error(
            ErrorKind::InvalidColor,
            label,
            format!("{} channel {} = {} is outside [0, 1]", what, channel, value),
        ));
    }
    if out_of_range.is_empty() && color.to_color().is_none() {
        report.push(Diagnostic::warning(
            ErrorKind::MissingColorChannel,
            label,
            format!("{} color is missing a channel or is not a number", what),
        ));
    }
}

fn node_label(node: &IntentNode, depth: usize) -> String {
    if node.id().is_empty() {
        format!("<{} at depth {}>", node.kind_name(), depth)
    } else {
        node.id().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use forma_intent::{
        ComponentDef, ComponentNode, ComponentRef, Inventory, NodeBase, VariableDef, VariableType,
    };

    fn inventory() -> Inventory {
        Inventory {
            components: vec![ComponentDef {
                id: "btn".to_string(),
                key: "k-btn".to_string(),
                name: "Button".to_string(),
                ..Default::default()
            }],
            variables: vec![VariableDef {
                id: "v:1".to_string(),
                name: "color/primary".to_string(),
                resolved_type: VariableType::Color,
                value: None,
            }],
            ..Default::default()
        }
    }

    fn container(id: &str, children: Vec<IntentNode>) -> IntentNode {
        IntentNode::container(
            NodeBase {
                layout: Some("VerticalStack".to_string()),
                ..NodeBase::new(id, "Section")
            },
            children,
        )
    }

    fn valid_tree() -> IntentNode {
        container(
            "root",
            vec![
                IntentNode::text(NodeBase::new("title", "Heading"), "Sign in"),
                IntentNode::component(NodeBase::new("ok", "Button"), Some(ComponentRef::by_id("btn"))),
            ],
        )
    }

    #[test]
    fn test_valid_tree() {
        let inventory = inventory();
        let index = inventory.index();
        let validator = Validator::new(&index, ValidationConfig::default());
        let report = validator.validate(&mut valid_tree());
        assert!(report.is_valid());
        assert_eq!(report.error_count(), 0);
        assert_eq!(report.warning_count(), 0);
    }

    #[test]
    fn test_missing_required_fields() {
        let inventory = inventory();
        let index = inventory.index();
        let validator = Validator::new(&index, ValidationConfig::default());

        let mut tree = IntentNode::container(
            NodeBase {
                constraints: None,
                semantic_role: None,
                ..NodeBase::new("root", "")
            },
            vec![IntentNode::component(NodeBase::new("c", "Button"), None)],
        );
        let report = validator.validate(&mut tree);
        // role, constraints, layout, component ref
        assert_eq!(report.error_count(), 4);
        assert!(report.errors.iter().all(|d| d.kind == ErrorKind::MissingField));
    }

    #[test]
    fn test_unresolved_reference_is_warning() {
        let inventory = inventory();
        let index = inventory.index();
        let validator = Validator::new(&index, ValidationConfig::default());
        let mut tree = container(
            "root",
            vec![IntentNode::component(
                NodeBase::new("email", "EmailInput"),
                Some(ComponentRef::by_id("missing")),
            )],
        );
        let report = validator.validate(&mut tree);
        assert!(report.is_valid());
        assert_eq!(report.warnings[0].kind, ErrorKind::UnresolvedComponent);
    }

    #[test]
    fn test_component_children_are_stripped() {
        let inventory = inventory();
        let index = inventory.index();
        let validator = Validator::new(&index, ValidationConfig::default());
        let component = IntentNode::Component(ComponentNode {
            base: NodeBase::new("ok", "Button"),
            component_ref: Some(ComponentRef::by_id("btn")),
            stray_children: vec![IntentNode::text(NodeBase::new("inner", "Label"), "OK")],
            ..Default::default()
        });
        let mut tree = container("root", vec![component]);

        let report = validator.validate(&mut tree);
        assert!(report.is_valid());
        assert_eq!(report.warnings[0].kind, ErrorKind::AtomicityViolation);
        match tree.find("ok") {
            Some(IntentNode::Component(c)) => assert!(c.stray_children.is_empty()),
            _ => panic!("component missing"),
        }
        // The stripped child was never visited
        assert!(tree.find("inner").is_none());
    }

    #[test]
    fn test_duplicate_id_vs_cycle() {
        let inventory = inventory();
        let index = inventory.index();
        let validator = Validator::new(&index, ValidationConfig::default());

        let mut siblings = container(
            "root",
            vec![
                IntentNode::text(NodeBase::new("a", "Text"), "one"),
                IntentNode::text(NodeBase::new("a", "Text"), "two"),
            ],
        );
        let report = validator.validate(&mut siblings);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].kind, ErrorKind::DuplicateId);

        let mut nested = container("loop", vec![container("loop", vec![])]);
        let report = validator.validate(&mut nested);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].kind, ErrorKind::Cycle);
    }

    #[test]
    fn test_depth_exceeded() {
        let inventory = inventory();
        let index = inventory.index();
        let validator = Validator::new(&index, ValidationConfig { max_depth: 3 });

        let mut tree = container(
            "d1",
            vec![container("d2", vec![container("d3", vec![container("d4", vec![])])])],
        );
        let report = validator.validate(&mut tree);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].kind, ErrorKind::DepthExceeded);
        assert_eq!(report.errors[0].node_id.as_deref(), Some("d4"));
    }

    #[test]
    fn test_color_and_variable_checks() {
        let inventory = inventory();
        let index = inventory.index();
        let validator = Validator::new(&index, ValidationConfig::default());

        let mut base = NodeBase {
            layout: Some("VerticalStack".to_string()),
            fills: vec![
                RawColor::rgb(1.5, 0.0, 0.0),
                RawColor {
                    r: Some(0.2),
                    ..Default::default()
                },
            ],
            ..NodeBase::new("root", "Card")
        };
        base.variable_bindings
            .insert("fill".to_string(), "v:1".to_string());
        base.variable_bindings
            .insert("stroke".to_string(), "v:gone".to_string());

        let mut tree = IntentNode::container(base, vec![]);
        let report = validator.validate(&mut tree);
        let kinds: Vec<_> = report.errors.iter().map(|d| d.kind).collect();
        assert_eq!(kinds, vec![ErrorKind::InvalidColor, ErrorKind::DanglingVariable]);
        assert_eq!(report.warnings[0].kind, ErrorKind::MissingColorChannel);
    }

    #[test]
    fn test_empty_text_warns() {
        let inventory = inventory();
        let index = inventory.index();
        let validator = Validator::new(&index, ValidationConfig::default());
        let mut tree = container("root", vec![IntentNode::text(NodeBase::new("t", "Text"), "  ")]);
        let report = validator.validate(&mut tree);
        assert!(report.is_valid());
        assert_eq!(report.warnings[0].kind, ErrorKind::EmptyText);
    }

    #[test]
    fn test_malformed_json() {
        let inventory = inventory();
        let index = inventory.index();
        let validator = Validator::new(&index, ValidationConfig::default());
        let (tree, report) = validator.validate_json("{\"kind\": ");
        assert!(tree.is_none());
        assert!(!report.is_valid());
        assert_eq!(report.errors[0].kind, ErrorKind::MalformedInput);
        assert!(report.errors[0].detail.is_some());
    }
}
