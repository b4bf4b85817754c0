//! The caller-supplied inventory of components and design tokens
//!
//! Built by an external discovery step; the pipeline only reads it.

use crate::node::ComponentRef;
use forma_core::{Color, FormaError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

/// Auto-layout direction of a component's top frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LayoutMode {
    Horizontal,
    Vertical,
    #[default]
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StructureKind {
    Text,
    Vector,
    Frame,
    Instance,
    Rectangle,
    Ellipse,
}

/// A direct child of a component's top frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructureChild {
    #[serde(default)]
    pub name: String,
    pub kind: StructureKind,
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
    /// Number of nested children, for frames and instances
    #[serde(default)]
    pub child_count: usize,
}

/// The internal shape of a component, as scanned from the host document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentStructure {
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub layout: LayoutMode,
    #[serde(default)]
    pub children: Vec<StructureChild>,
}

/// A reusable library component
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentDef {
    pub id: String,
    #[serde(default)]
    pub key: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub semantic_type: Option<String>,
    /// Variant property -> allowed values
    #[serde(default)]
    pub variant_properties: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub structure: Option<ComponentStructure>,
}

impl ComponentDef {
    pub fn has_variants(&self) -> bool {
        !self.variant_properties.is_empty()
    }

    /// A description long enough to carry meaning
    pub fn has_meaningful_description(&self) -> bool {
        self.description
            .as_deref()
            .map(|d| d.split_whitespace().count() >= 3)
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VariableType {
    Color,
    Float,
    String,
    Boolean,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VariableValue {
    Color(Color),
    Number(f64),
    Bool(bool),
    Text(String),
}

/// A design variable (token) published in the library
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableDef {
    pub id: String,
    pub name: String,
    pub resolved_type: VariableType,
    #[serde(default)]
    pub value: Option<VariableValue>,
}

/// Scales the design system allows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Guidelines {
    #[serde(default = "default_spacing_scale")]
    pub spacing_scale: Vec<f64>,
    #[serde(default = "default_typography_scale")]
    pub typography_scale: Vec<f64>,
    #[serde(default = "default_radius_scale")]
    pub radius_scale: Vec<f64>,
    #[serde(default = "default_padding")]
    pub default_padding: f64,
    #[serde(default = "default_max_content_width")]
    pub max_content_width: f64,
}

fn default_spacing_scale() -> Vec<f64> {
    vec![0.0, 4.0, 8.0, 12.0, 16.0, 24.0, 32.0, 48.0, 64.0]
}
fn default_typography_scale() -> Vec<f64> {
    vec![12.0, 14.0, 16.0, 18.0, 20.0, 24.0, 30.0, 36.0, 48.0]
}
fn default_radius_scale() -> Vec<f64> {
    vec![0.0, 2.0, 4.0, 8.0, 12.0, 16.0, 9999.0]
}
fn default_padding() -> f64 {
    16.0
}
fn default_max_content_width() -> f64 {
    1200.0
}

impl Default for Guidelines {
    fn default() -> Self {
        Self {
            spacing_scale: default_spacing_scale(),
            typography_scale: default_typography_scale(),
            radius_scale: default_radius_scale(),
            default_padding: default_padding(),
            max_content_width: default_max_content_width(),
        }
    }
}

impl Guidelines {
    /// Nearest spacing scale value; ties go to the smaller value
    pub fn snap_spacing(&self, value: f64) -> f64 {
        nearest(&self.spacing_scale, value).unwrap_or(value)
    }

    /// Smallest spacing scale value that is at least `min`, or the largest
    /// scale value when none is. Always on the scale unless it is empty.
    pub fn spacing_at_least(&self, min: f64) -> f64 {
        let scale = self.spacing_scale.iter().copied();
        scale
            .clone()
            .filter(|v| *v >= min)
            .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |a| a.min(v))))
            .or_else(|| scale.fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |a| a.max(v)))))
            .unwrap_or(min)
    }

    /// Smallest typography scale value strictly above `size`
    pub fn next_type_size_above(&self, size: f64) -> Option<f64> {
        self.typography_scale
            .iter()
            .copied()
            .filter(|v| *v > size)
            .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |a| a.min(v))))
    }
}

fn nearest(scale: &[f64], value: f64) -> Option<f64> {
    scale.iter().copied().fold(None, |best: Option<f64>, v| match best {
        None => Some(v),
        Some(b) => {
            let (db, dv) = ((b - value).abs(), (v - value).abs());
            if dv < db || (dv == db && v < b) {
                Some(v)
            } else {
                Some(b)
            }
        }
    })
}

/// A color already used in the host document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorUsage {
    pub color: Color,
    pub count: u32,
    #[serde(default)]
    pub variable_id: Option<String>,
}

/// A spacing or radius value already used in the host document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NumericUsage {
    pub value: f64,
    pub count: u32,
    #[serde(default)]
    pub variable_id: Option<String>,
}

/// Token values in use, with frequencies
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenUsage {
    #[serde(default)]
    pub colors: Vec<ColorUsage>,
    #[serde(default)]
    pub spacing: Vec<NumericUsage>,
    #[serde(default)]
    pub radii: Vec<NumericUsage>,
}

impl TokenUsage {
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty() && self.spacing.is_empty() && self.radii.is_empty()
    }
}

/// Components, variables, guidelines and token usage for one pipeline run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Inventory {
    #[serde(default)]
    pub components: Vec<ComponentDef>,
    #[serde(default)]
    pub variables: Vec<VariableDef>,
    #[serde(default)]
    pub guidelines: Guidelines,
    #[serde(default)]
    pub usage: TokenUsage,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load an inventory from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        serde_json::from_str(content)
            .map_err(|e| FormaError::InvalidInput(format!("Failed to parse inventory JSON: {}", e)))
    }

    /// Build lookup tables for this run
    pub fn index(&self) -> InventoryIndex<'_> {
        InventoryIndex::new(self)
    }
}

/// Id/key lookups over an inventory, built once per pipeline run
#[derive(Debug)]
pub struct InventoryIndex<'a> {
    inventory: &'a Inventory,
    by_id: HashMap<&'a str, &'a ComponentDef>,
    by_key: HashMap<&'a str, &'a ComponentDef>,
    variables: HashMap<&'a str, &'a VariableDef>,
}

impl<'a> InventoryIndex<'a> {
    pub fn new(inventory: &'a Inventory) -> Self {
        let mut by_id = HashMap::new();
        let mut by_key = HashMap::new();
        for component in &inventory.components {
            by_id.insert(component.id.as_str(), component);
            if !component.key.is_empty() {
                by_key.insert(component.key.as_str(), component);
            }
        }
        let variables = inventory
            .variables
            .iter()
            .map(|v| (v.id.as_str(), v))
            .collect();

        Self {
            inventory,
            by_id,
            by_key,
            variables,
        }
    }

    pub fn inventory(&self) -> &'a Inventory {
        self.inventory
    }

    pub fn component(&self, id: &str) -> Option<&'a ComponentDef> {
        self.by_id.get(id).copied()
    }

    pub fn component_by_key(&self, key: &str) -> Option<&'a ComponentDef> {
        self.by_key.get(key).copied()
    }

    /// Resolve a reference verbatim: id first, then key
    pub fn find_ref(&self, reference: &ComponentRef) -> Option<&'a ComponentDef> {
        reference
            .id
            .as_deref()
            .and_then(|id| self.component(id))
            .or_else(|| {
                reference
                    .key
                    .as_deref()
                    .and_then(|key| self.component_by_key(key))
            })
    }

    pub fn variable(&self, id: &str) -> Option<&'a VariableDef> {
        self.variables.get(id).copied()
    }

    /// Components sorted by name, for deterministic fallbacks
    pub fn components_by_name(&self) -> Vec<&'a ComponentDef> {
        let mut components: Vec<_> = self.inventory.components.iter().collect();
        components.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        components
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_json() -> &'static str {
        r#"{
            "components": [
                {"id": "1:2", "key": "k-btn", "name": "Button / Primary",
                 "description": "Primary call to action button",
                 "semanticType": "button",
                 "variantProperties": {"Size": ["Small", "Large"]},
                 "structure": {"width": 120, "height": 40, "layout": "HORIZONTAL",
                               "children": [{"name": "Label", "kind": "TEXT"}]}},
                {"id": "1:3", "name": "Avatar"}
            ],
            "variables": [
                {"id": "v:1", "name": "color/primary", "resolvedType": "COLOR",
                 "value": {"r": 0.2, "g": 0.4, "b": 1.0}}
            ],
            "guidelines": {"spacingScale": [0, 8, 16, 24]},
            "usage": {"spacing": [{"value": 16, "count": 40}]}
        }"#
    }

    #[test]
    fn test_parse_inventory() {
        let inventory = Inventory::from_json_str(sample_json()).unwrap();
        assert_eq!(inventory.components.len(), 2);
        assert_eq!(inventory.guidelines.spacing_scale, vec![0.0, 8.0, 16.0, 24.0]);
        // Unspecified guideline fields fall back to defaults
        assert_eq!(inventory.guidelines.default_padding, 16.0);
        let structure = inventory.components[0].structure.as_ref().unwrap();
        assert_eq!(structure.layout, LayoutMode::Horizontal);
        assert!(matches!(
            inventory.variables[0].value,
            Some(VariableValue::Color(_))
        ));
    }

    #[test]
    fn test_malformed_inventory() {
        let err = Inventory::from_json_str("{\"components\": 3}").unwrap_err();
        assert!(matches!(err, FormaError::InvalidInput(_)));
    }

    #[test]
    fn test_index_lookups() {
        let inventory = Inventory::from_json_str(sample_json()).unwrap();
        let index = inventory.index();
        assert_eq!(index.component("1:3").unwrap().name, "Avatar");
        assert_eq!(index.component_by_key("k-btn").unwrap().id, "1:2");
        let by_key = ComponentRef {
            id: Some("nope".to_string()),
            key: Some("k-btn".to_string()),
        };
        assert_eq!(index.find_ref(&by_key).unwrap().id, "1:2");
        assert!(index.variable("v:1").is_some());
        assert_eq!(index.components_by_name()[0].name, "Avatar");
    }

    #[test]
    fn test_guideline_helpers() {
        let g = Guidelines::default();
        assert_eq!(g.snap_spacing(15.0), 16.0);
        assert_eq!(g.snap_spacing(10.0), 8.0); // tie goes to the smaller value
        assert_eq!(g.spacing_at_least(14.0), 16.0);
        assert_eq!(g.next_type_size_above(16.0), Some(18.0));
        assert_eq!(g.next_type_size_above(48.0), None);
    }

    #[test]
    fn test_spacing_at_least_stays_on_short_scale() {
        let g = Guidelines {
            spacing_scale: vec![0.0, 4.0, 8.0, 12.0],
            ..Default::default()
        };
        assert_eq!(g.spacing_at_least(16.0), 12.0);
        assert_eq!(g.snap_spacing(g.spacing_at_least(16.0)), 12.0);

        let empty = Guidelines {
            spacing_scale: vec![],
            ..Default::default()
        };
        assert_eq!(empty.spacing_at_least(16.0), 16.0);
    }
}
