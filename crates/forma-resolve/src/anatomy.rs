//! Component anatomy analysis and archetype rubrics

use forma_intent::vocabulary::{
    is_actionable_role, is_content_container_role, is_input_role, normalize,
};
use forma_intent::{ComponentStructure, LayoutMode, StructureKind};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Structural facts about a component, read from its scanned structure
#[derive(Debug, Clone, PartialEq)]
pub struct Anatomy {
    pub has_icon: bool,
    pub has_text_label: bool,
    pub child_count: usize,
    pub width: f64,
    pub height: f64,
    pub layout: LayoutMode,
}

impl Anatomy {
    pub fn analyze(structure: &ComponentStructure) -> Self {
        let has_icon = structure.children.iter().any(|c| {
            matches!(c.kind, StructureKind::Vector | StructureKind::Ellipse)
                || c.name.to_lowercase().contains("icon")
        });
        let has_text_label = structure
            .children
            .iter()
            .any(|c| c.kind == StructureKind::Text);

        Self {
            has_icon,
            has_text_label,
            child_count: structure.children.len(),
            width: structure.width,
            height: structure.height,
            layout: structure.layout,
        }
    }

    pub fn is_multi_child(&self) -> bool {
        self.child_count >= 2
    }
}

/// Named component shapes the structural tier can recognise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Archetype {
    ActionableElement,
    InputField,
    ContentCard,
    ListRow,
    IconElement,
}

impl fmt::Display for Archetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Archetype::ActionableElement => "ActionableElement",
            Archetype::InputField => "InputField",
            Archetype::ContentCard => "ContentCard",
            Archetype::ListRow => "ListRow",
            Archetype::IconElement => "IconElement",
        };
        f.write_str(name)
    }
}

impl Archetype {
    /// The archetype a semantic role asks for, if any
    pub fn for_role(role: &str) -> Option<Self> {
        let normalized = normalize(role);
        if normalized.contains("icon") && !normalized.contains("button") {
            Some(Archetype::IconElement)
        } else if is_input_role(role) {
            Some(Archetype::InputField)
        } else if is_actionable_role(role) {
            Some(Archetype::ActionableElement)
        } else if normalized.contains("listitem") || normalized == "row" {
            Some(Archetype::ListRow)
        } else if is_content_container_role(role) {
            Some(Archetype::ContentCard)
        } else {
            None
        }
    }

    /// Score an anatomy against this archetype's point rubric, in [0, 1]
    pub fn score(&self, anatomy: &Anatomy) -> f64 {
        let criteria: Vec<(bool, u32)> = match self {
            Archetype::ActionableElement => vec![
                (anatomy.has_text_label, 3),
                (anatomy.layout == LayoutMode::Horizontal, 2),
                ((24.0..=56.0).contains(&anatomy.height), 2),
                ((48.0..=320.0).contains(&anatomy.width), 1),
                (anatomy.child_count <= 3, 1),
            ],
            Archetype::InputField => vec![
                (anatomy.has_text_label, 2),
                ((32.0..=56.0).contains(&anatomy.height), 2),
                (anatomy.width >= 160.0, 3),
                (anatomy.layout != LayoutMode::Vertical, 1),
            ],
            Archetype::ContentCard => vec![
                (anatomy.layout == LayoutMode::Vertical, 3),
                (anatomy.is_multi_child(), 2),
                (anatomy.height >= 100.0, 2),
                (anatomy.width >= 200.0, 1),
                (anatomy.has_text_label, 1),
            ],
            Archetype::ListRow => vec![
                (anatomy.layout == LayoutMode::Horizontal, 3),
                (anatomy.has_text_label, 2),
                ((32.0..=80.0).contains(&anatomy.height), 2),
                (anatomy.width >= 200.0, 2),
            ],
            Archetype::IconElement => vec![
                (anatomy.has_icon, 3),
                (anatomy.width <= 48.0, 2),
                (anatomy.height <= 48.0, 2),
                (!anatomy.has_text_label, 1),
            ],
        };

        let max: u32 = criteria.iter().map(|(_, points)| points).sum();
        let earned: u32 = criteria
            .iter()
            .filter(|(hit, _)| *hit)
            .map(|(_, points)| points)
            .sum();
        earned as f64 / max as f64
    }
}
