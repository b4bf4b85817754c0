//! Forma Intent - The design-intent data model
//!
//! This crate defines what the generator produces and what the rest of the
//! pipeline consumes:
//! - `IntentNode` - Tagged union of Container, InstantiatedComponent and Text
//! - `StyleToken` - Parsed utility style tokens (`p-4`, `bg-[#FFF]`, ...)
//! - `Inventory` - Components, variables, guidelines and token usage
//! - Role and layout-primitive vocabulary

mod inventory;
mod loader;
mod node;
mod style;
pub mod vocabulary;

pub use inventory::{
    ColorUsage, ComponentDef, ComponentStructure, Guidelines, Inventory, InventoryIndex,
    LayoutMode, NumericUsage, StructureChild, StructureKind, TokenUsage, VariableDef,
    VariableType, VariableValue,
};
pub use loader::{intent_tree_to_json, load_intent_tree, parse_intent_tree};
pub use node::{
    ComponentNode, ComponentRef, ContainerNode, IntentNode, NodeBase, PropertyValue, RawColor,
    Sizing, SizingConstraints, TextNode,
};
pub use style::{
    fmt_num, ComputedStyle, Dimension, Edges, FontWeight, ShadowSize, Side, StyleToken,
    SPACING_UNIT,
};
pub use vocabulary::LayoutPrimitive;
