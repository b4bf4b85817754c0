//! Design-quality audit over a resolved intent tree

use crate::report::{AuditCategory, AuditReport, AuditWarning};
use forma_core::Severity;
use forma_intent::vocabulary::{is_actionable_role, is_input_role, is_label_role};
use forma_intent::{ComponentDef, ComponentNode, IntentNode, InventoryIndex};

/// Read-only walk producing categorized design warnings.
///
/// Runs after resolution, so component instances are judged by the
/// library component they are bound to as well as by their role.
pub struct Auditor<'a> {
    index: &'a InventoryIndex<'a>,
}

impl<'a> Auditor<'a> {
    pub fn new(index: &'a InventoryIndex<'a>) -> Self {
        Self { index }
    }

    pub fn audit(&self, tree: &IntentNode) -> AuditReport {
        let mut report = AuditReport::default();
        tree.visit(&mut |node| {
            if let IntentNode::Container(container) = node {
                let id = &container.base.id;
                if container.children.is_empty() && !container.base.has_fill() {
                    report.warnings.push(warning(
                        AuditCategory::Completeness,
                        id,
                        format!("Container '{}' is empty and has no fill; it looks unfinished", id),
                    ));
                }
                self.check_siblings(id, &container.children, &mut report);
            }
        });

        tracing::info!(warnings = report.warnings.len(), "Audit complete");
        report
    }

    fn check_siblings(&self, parent_id: &str, children: &[IntentNode], report: &mut AuditReport) {
        let primaries = children.iter().filter(|c| self.is_primary_action(c)).count();
        if primaries > 1 {
            report.warnings.push(warning(
                AuditCategory::VisualHierarchy,
                parent_id,
                format!(
                    "{} primary action buttons in '{}' compete for attention; keep one primary action",
                    primaries, parent_id
                ),
            ));
        }

        let mut sizes: Vec<(f64, usize)> = Vec::new();
        for child in children {
            if let IntentNode::Text(text) = child {
                let size = text.font_size();
                match sizes.iter_mut().find(|(s, _)| *s == size) {
                    Some((_, count)) => *count += 1,
                    None => sizes.push((size, 1)),
                }
            }
        }
        for (size, count) in sizes.into_iter().filter(|(_, count)| *count >= 2) {
            report.warnings.push(warning(
                AuditCategory::Typography,
                parent_id,
                format!(
                    "{} sibling text nodes in '{}' share the same {}px size; vary size to show hierarchy",
                    count, parent_id, size
                ),
            ));
        }

        for (i, child) in children.iter().enumerate() {
            if !self.is_input(child) || has_own_label(child) {
                continue;
            }
            let before = i.checked_sub(1).and_then(|j| children.get(j));
            let after = children.get(i + 1);
            let labelled = before.into_iter().chain(after).any(is_label_text);
            if !labelled {
                report.warnings.push(warning(
                    AuditCategory::Accessibility,
                    child.id(),
                    format!(
                        "Input '{}' has no adjacent label and no label or placeholder",
                        child.id()
                    ),
                ));
            }
        }
    }

    fn resolved(&self, component: &ComponentNode) -> Option<&'a ComponentDef> {
        component
            .component_ref
            .as_ref()
            .and_then(|r| self.index.find_ref(r))
    }

    fn is_primary_action(&self, node: &IntentNode) -> bool {
        let role = node.role();
        match node {
            IntentNode::Component(component) => {
                let def = self.resolved(component);
                let actionable = is_actionable_role(role)
                    || def.map_or(false, |d| is_actionable_role(&semantics(d)));
                let primary = contains_primary(role)
                    || component
                        .properties
                        .values()
                        .any(|v| v.as_str().map_or(false, contains_primary))
                    || def.map_or(false, |d| contains_primary(&d.name));
                actionable && primary
            }
            IntentNode::Container(_) | IntentNode::Text(_) => {
                is_actionable_role(role) && contains_primary(role)
            }
        }
    }

    fn is_input(&self, node: &IntentNode) -> bool {
        match node {
            IntentNode::Component(component) => {
                is_input_role(node.role())
                    || self
                        .resolved(component)
                        .map_or(false, |d| is_input_role(&semantics(d)))
            }
            IntentNode::Container(_) => is_input_role(node.role()),
            IntentNode::Text(_) => false,
        }
    }
}

fn warning(category: AuditCategory, node_id: &str, message: String) -> AuditWarning {
    AuditWarning {
        message,
        node_id: node_id.to_string(),
        category,
        severity: Severity::Warning,
    }
}

fn semantics(def: &ComponentDef) -> String {
    format!("{} {}", def.semantic_type.as_deref().unwrap_or(""), def.name)
}

fn contains_primary(text: &str) -> bool {
    text.to_lowercase().contains("primary")
}

fn has_own_label(node: &IntentNode) -> bool {
    match node {
        IntentNode::Component(component) => {
            component.characters.as_deref().map_or(false, |c| !c.trim().is_empty())
                || ["label", "placeholder"]
                    .iter()
                    .any(|name| component.property(name).is_some())
        }
        IntentNode::Container(container) => container.children.iter().any(is_label_text),
        IntentNode::Text(_) => true,
    }
}

fn is_label_text(node: &IntentNode) -> bool {
    matches!(node, IntentNode::Text(_)) && is_label_role(node.role())
}
