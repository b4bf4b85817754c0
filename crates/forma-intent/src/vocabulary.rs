//! Approved semantic roles and layout primitives, plus role classifiers

use crate::style::FontWeight;

/// Semantic roles the generator is expected to use
pub const APPROVED_ROLES: &[&str] = &[
    "Page", "Screen", "Section", "Container", "Card", "Form", "Header", "Footer", "Hero",
    "Navigation", "NavBar", "Sidebar", "Toolbar", "Modal", "Dialog", "List", "ListItem",
    "Table", "Grid", "Row", "Column", "Stack", "Group", "Spacer", "Divider", "Button",
    "PrimaryButton", "SecondaryButton", "IconButton", "Link", "Input", "TextField",
    "EmailInput", "PasswordInput", "SearchInput", "TextArea", "Select", "Dropdown",
    "Checkbox", "Radio", "Toggle", "Switch", "Slider", "Label", "Heading", "Title",
    "Subtitle", "Text", "Paragraph", "Body", "Caption", "Icon", "Image", "Avatar", "Badge",
    "Chip", "Tag", "Tabs", "Tab", "Tooltip", "Alert", "Banner", "Toast", "Progress",
];

/// Normalise a role or primitive for comparison: lowercase, no separators
pub fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(|c| c.to_lowercase())
        .collect()
}

pub fn is_known_role(role: &str) -> bool {
    let role = normalize(role);
    APPROVED_ROLES.iter().any(|r| normalize(r) == role)
}

/// Layout primitives understood by the translator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayoutPrimitive {
    VerticalStack,
    HorizontalStack,
    Grid,
    Wrap,
    Overlay,
    Center,
}

impl LayoutPrimitive {
    pub fn parse(name: &str) -> Option<Self> {
        Some(match normalize(name).as_str() {
            "verticalstack" | "vstack" | "stack" | "column" | "flexcol" | "vertical" => {
                LayoutPrimitive::VerticalStack
            }
            "horizontalstack" | "hstack" | "row" | "flexrow" | "horizontal" => {
                LayoutPrimitive::HorizontalStack
            }
            "grid" => LayoutPrimitive::Grid,
            "wrap" | "flexwrap" => LayoutPrimitive::Wrap,
            "overlay" | "zstack" | "absolute" => LayoutPrimitive::Overlay,
            "center" | "centered" => LayoutPrimitive::Center,
            _ => return None,
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            LayoutPrimitive::VerticalStack => "VerticalStack",
            LayoutPrimitive::HorizontalStack => "HorizontalStack",
            LayoutPrimitive::Grid => "Grid",
            LayoutPrimitive::Wrap => "Wrap",
            LayoutPrimitive::Overlay => "Overlay",
            LayoutPrimitive::Center => "Center",
        }
    }

    /// True when children are laid out left-to-right
    pub fn is_horizontal(&self) -> bool {
        matches!(
            self,
            LayoutPrimitive::HorizontalStack | LayoutPrimitive::Grid | LayoutPrimitive::Wrap
        )
    }

    /// Overlay has no auto-layout, so children cannot fill it
    pub fn is_auto_layout(&self) -> bool {
        !matches!(self, LayoutPrimitive::Overlay)
    }
}

pub fn is_known_primitive(name: &str) -> bool {
    LayoutPrimitive::parse(name).is_some()
}

fn role_has(role: &str, needles: &[&str]) -> bool {
    let role = normalize(role);
    needles.iter().any(|n| role.contains(n))
}

/// Buttons, links and other click targets
pub fn is_actionable_role(role: &str) -> bool {
    role_has(role, &["button", "btn", "cta", "action", "link"])
}

pub fn is_input_role(role: &str) -> bool {
    role_has(
        role,
        &["input", "textfield", "textarea", "field", "select", "dropdown", "search"],
    )
}

pub fn is_label_role(role: &str) -> bool {
    role_has(role, &["label"])
}

pub fn is_title_role(role: &str) -> bool {
    role_has(role, &["heading", "title", "headline"]) && !role_has(role, &["subtitle"])
}

pub fn is_body_role(role: &str) -> bool {
    role_has(
        role,
        &["body", "paragraph", "description", "subtitle", "caption"],
    ) || normalize(role) == "text"
}

/// Small elements that should hug their content
pub fn is_compact_role(role: &str) -> bool {
    role_has(
        role,
        &[
            "button", "icon", "badge", "avatar", "chip", "tag", "toggle", "switch", "checkbox",
            "radio", "link",
        ],
    )
}

/// Structural containers whose content should stretch across the parent
pub fn is_content_container_role(role: &str) -> bool {
    role_has(
        role,
        &[
            "card", "form", "section", "list", "table", "header", "footer", "navigation",
            "navbar", "toolbar", "hero", "group", "row", "container", "content",
        ],
    )
}

/// Role-driven default typography: (font size, weight)
pub fn role_typography(role: &str) -> (f64, FontWeight) {
    if is_title_role(role) {
        (24.0, FontWeight::Bold)
    } else if is_label_role(role) {
        (14.0, FontWeight::Medium)
    } else {
        (16.0, FontWeight::Regular)
    }
}
