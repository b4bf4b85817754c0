pub mod config;
pub mod render;
pub mod validate;

use anyhow::{Context, Result};
use forma_intent::Inventory;

/// Load the inventory, or an empty one when no path is given
pub fn load_inventory(path: Option<&str>) -> Result<Inventory> {
    match path {
        Some(path) => {
            Inventory::load(path).with_context(|| format!("Failed to load inventory {}", path))
        }
        None => Ok(Inventory::new()),
    }
}
