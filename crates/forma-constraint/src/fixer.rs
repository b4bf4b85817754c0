//! Deterministic auto-fix pass for common generator mistakes

use forma_intent::vocabulary::{
    is_body_role, is_compact_role, is_content_container_role, is_title_role,
};
use forma_intent::{
    fmt_num, Guidelines, IntentNode, LayoutPrimitive, Side, Sizing, SizingConstraints, StyleToken,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fixer settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FixerConfig {
    pub root_width: f64,
    pub root_height: f64,
    /// Root dimensions below this are treated as missing
    pub min_root_dimension: f64,
    /// Smallest padding a card-like container may have
    pub card_min_padding: f64,
}

impl Default for FixerConfig {
    fn default() -> Self {
        Self {
            root_width: 1440.0,
            root_height: 1024.0,
            min_root_dimension: 100.0,
            card_min_padding: 16.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FixType {
    RootDimensions,
    RootLayout,
    SizingMode,
    SpacingSnap,
    CardPadding,
    TextHierarchy,
}

impl fmt::Display for FixType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FixType::RootDimensions => "root_dimensions",
            FixType::RootLayout => "root_layout",
            FixType::SizingMode => "sizing_mode",
            FixType::SpacingSnap => "spacing_snap",
            FixType::CardPadding => "card_padding",
            FixType::TextHierarchy => "text_hierarchy",
        };
        f.write_str(name)
    }
}

/// A single change the fixer made
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixRecord {
    pub node_id: String,
    pub fix_type: FixType,
    pub before: String,
    pub after: String,
}

/// Report of fix operations
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FixReport {
    pub records: Vec<FixRecord>,
}

impl FixReport {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn count(&self, fix_type: FixType) -> usize {
        self.records.iter().filter(|r| r.fix_type == fix_type).count()
    }

    fn record(
        &mut self,
        node_id: &str,
        fix_type: FixType,
        before: impl Into<String>,
        after: impl Into<String>,
    ) {
        let record = FixRecord {
            node_id: node_id.to_string(),
            fix_type,
            before: before.into(),
            after: after.into(),
        };
        tracing::debug!(
            node = %record.node_id,
            fix = %record.fix_type,
            before = %record.before,
            after = %record.after,
            "Applied fix"
        );
        self.records.push(record);
    }
}

/// Applies the fix passes in a fixed order; each pass assumes the earlier
/// ones already ran. Running it on its own output changes nothing.
pub struct Fixer<'a> {
    guidelines: &'a Guidelines,
    config: FixerConfig,
}

impl<'a> Fixer<'a> {
    /// Create a new fixer
    pub fn new(guidelines: &'a Guidelines, config: FixerConfig) -> Self {
        Self { guidelines, config }
    }

    pub fn fix(&self, tree: &mut IntentNode) -> FixReport {
        let mut report = FixReport::default();

        self.fix_root(tree, &mut report);
        fix_sizing(tree, &mut report);
        tree.visit_mut(&mut |node| self.snap_spacing(node, &mut report));
        tree.visit_mut(&mut |node| self.pad_card(node, &mut report));
        tree.visit_mut(&mut |node| self.fix_text_hierarchy(node, &mut report));

        tracing::info!(fixes = report.records.len(), "Fix pass complete");
        report
    }

    /// Dry run: fix a copy and report what would change
    pub fn dry_run(&self, tree: &IntentNode) -> FixReport {
        let mut copy = tree.clone();
        self.fix(&mut copy)
    }

    fn fix_root(&self, root: &mut IntentNode, report: &mut FixReport) {
        let min = self.config.min_root_dimension;
        let id = root.id().to_string();
        let base = root.base_mut();

        if base.width.map_or(true, |w| w < min) {
            report.record(
                &id,
                FixType::RootDimensions,
                format!("width {}", describe(base.width)),
                format!("width {}", fmt_num(self.config.root_width)),
            );
            base.width = Some(self.config.root_width);
        }
        if base.height.map_or(true, |h| h < min) {
            report.record(
                &id,
                FixType::RootDimensions,
                format!("height {}", describe(base.height)),
                format!("height {}", fmt_num(self.config.root_height)),
            );
            base.height = Some(self.config.root_height);
        }

        if let IntentNode::Container(container) = root {
            if container.base.layout.as_deref().map_or(true, str::is_empty) {
                let layout = LayoutPrimitive::VerticalStack.name();
                report.record(&id, FixType::RootLayout, "none", layout);
                container.base.layout = Some(layout.to_string());
            }
        }
    }

    fn snap_spacing(&self, node: &mut IntentNode, report: &mut FixReport) {
        let id = node.id().to_string();
        for token in node.base_mut().style.iter_mut() {
            let snapped = match token {
                StyleToken::Padding { side, value } => {
                    let target = self.guidelines.snap_spacing(*value);
                    (target != *value).then_some(StyleToken::Padding {
                        side: *side,
                        value: target,
                    })
                }
                StyleToken::Gap(value) => {
                    let target = self.guidelines.snap_spacing(*value);
                    (target != *value).then_some(StyleToken::Gap(target))
                }
                _ => None,
            };
            if let Some(snapped) = snapped {
                report.record(&id, FixType::SpacingSnap, token.to_string(), snapped.to_string());
                *token = snapped;
            }
        }
    }

    fn pad_card(&self, node: &mut IntentNode, report: &mut FixReport) {
        let IntentNode::Container(container) = node else {
            return;
        };
        let style = container.base.computed_style();
        let card_like = container.base.has_fill() || style.radius.map_or(false, |r| r > 0.0);
        if !card_like || container.children.len() < 2 || !style.padding.is_zero() {
            return;
        }

        let padding = self.guidelines.spacing_at_least(self.config.card_min_padding);
        if padding <= 0.0 {
            return;
        }
        let token = StyleToken::Padding {
            side: Side::All,
            value: padding,
        };
        report.record(&container.base.id, FixType::CardPadding, "padding 0", token.to_string());
        container.base.style.push(token);
    }

    fn fix_text_hierarchy(&self, node: &mut IntentNode, report: &mut FixReport) {
        let IntentNode::Container(container) = node else {
            return;
        };

        let body_size = container
            .children
            .iter()
            .filter_map(|c| match c {
                IntentNode::Text(text) if is_body_role(text.base.role()) => Some(text.font_size()),
                _ => None,
            })
            .fold(None, |acc: Option<f64>, s| Some(acc.map_or(s, |a| a.max(s))));
        let Some(body_size) = body_size else {
            return;
        };

        let title = container.children.iter_mut().find_map(|c| match c {
            IntentNode::Text(text) if is_title_role(text.base.role()) => Some(text),
            _ => None,
        });
        let Some(title) = title else {
            return;
        };

        let current = title.font_size();
        if current > body_size {
            return;
        }
        let target = self
            .guidelines
            .next_type_size_above(body_size)
            .unwrap_or(body_size + 4.0);

        title
            .base
            .style
            .retain(|t| !matches!(t, StyleToken::FontSize(_)));
        title.base.style.push(StyleToken::FontSize(target));
        report.record(
            &title.base.id,
            FixType::TextHierarchy,
            format!("{}px", fmt_num(current)),
            format!("{}px", fmt_num(target)),
        );
    }
}

/// Content containers fill the parent's cross axis; compact elements hug
fn fix_sizing(node: &mut IntentNode, report: &mut FixReport) {
    let layout = node.base().layout.as_deref().and_then(LayoutPrimitive::parse);
    let Some(children) = node.children_mut() else {
        return;
    };

    for child in children.iter_mut() {
        let role = child.role().to_string();
        let id = child.id().to_string();
        let base = child.base_mut();

        if is_content_container_role(&role) {
            // Overlay children cannot fill
            let horizontal = match layout {
                Some(primitive) if !primitive.is_auto_layout() => None,
                Some(primitive) => Some(primitive.is_horizontal()),
                None => Some(false),
            };
            if let Some(horizontal) = horizontal {
                let mut constraints = base.constraints.unwrap_or(SizingConstraints::HUG);
                let cross = if horizontal {
                    &mut constraints.height
                } else {
                    &mut constraints.width
                };
                if *cross == Sizing::Hug {
                    *cross = Sizing::Fill;
                    report.record(
                        &id,
                        FixType::SizingMode,
                        describe_constraints(base.constraints),
                        describe_constraints(Some(constraints)),
                    );
                    base.constraints = Some(constraints);
                }
            }
        } else if is_compact_role(&role) {
            // Fixed axes are an explicit size and stay
            let hug = |axis: Sizing| if axis == Sizing::Fill { Sizing::Hug } else { axis };
            let target = base.constraints.map_or(SizingConstraints::HUG, |c| {
                SizingConstraints::new(hug(c.width), hug(c.height))
            });
            if base.constraints != Some(target) {
                report.record(
                    &id,
                    FixType::SizingMode,
                    describe_constraints(base.constraints),
                    describe_constraints(Some(target)),
                );
                base.constraints = Some(target);
            }
        }

        fix_sizing(child, report);
    }
}

fn describe(value: Option<f64>) -> String {
    value.map_or_else(|| "none".to_string(), fmt_num)
}

fn describe_constraints(constraints: Option<SizingConstraints>) -> String {
    match constraints {
        Some(c) => format!("{:?}/{:?}", c.width, c.height).to_lowercase(),
        None => "none".to_string(),
    }
}
