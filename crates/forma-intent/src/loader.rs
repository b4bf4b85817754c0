//! JSON loading for intent trees

use crate::node::IntentNode;
use forma_core::{FormaError, Result};
use std::path::Path;

/// Load an intent tree from a `.json` file.
///
/// The file holds a single root node:
/// ```json
/// { "kind": "Container", "id": "root", "semanticRole": "Page",
///   "layoutPrimitive": "VerticalStack",
///   "constraints": { "width": "fixed", "height": "hug" },
///   "children": [] }
/// ```
pub fn load_intent_tree(path: &Path) -> Result<IntentNode> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        FormaError::InvalidInput(format!("Failed to read {}: {}", path.display(), e))
    })?;
    parse_intent_tree(&content)
}

/// Parse an intent tree from a JSON string
pub fn parse_intent_tree(content: &str) -> Result<IntentNode> {
    serde_json::from_str(content).map_err(|e| FormaError::Json(e.to_string()))
}

/// Serialize a tree back to pretty JSON
pub fn intent_tree_to_json(tree: &IntentNode) -> Result<String> {
    Ok(serde_json::to_string_pretty(tree)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use forma_core::ErrorKind;

    #[test]
    fn test_parse_minimal_tree() {
        let tree = parse_intent_tree(
            r#"{"kind": "Text", "id": "t", "semanticRole": "Label", "content": "Email"}"#,
        )
        .unwrap();
        assert_eq!(tree.kind_name(), "Text");
        assert_eq!(tree.role(), "Label");
    }

    #[test]
    fn test_component_alias() {
        let tree = parse_intent_tree(r#"{"kind": "Component", "id": "c"}"#).unwrap();
        assert_eq!(tree.kind_name(), "InstantiatedComponent");
    }

    #[test]
    fn test_malformed_json_is_error_not_panic() {
        let err = parse_intent_tree("{\"kind\": \"Container\", ").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedInput);

        let err = parse_intent_tree(r#"{"kind": "Spaceship", "id": "x"}"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedInput);
    }

    #[test]
    fn test_serialize_keeps_tag_and_tokens() {
        let json = r#"{"kind": "Container", "id": "card", "style": ["p-4", "bg-[#FFFFFF]"],
                       "children": [{"kind": "Text", "id": "t", "content": "Hi"}]}"#;
        let tree = parse_intent_tree(json).unwrap();
        let out = intent_tree_to_json(&tree).unwrap();
        assert!(out.contains("\"kind\": \"Container\""));
        assert!(out.contains("\"p-4\""));
        let again = parse_intent_tree(&out).unwrap();
        assert_eq!(again, tree);
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_intent_tree(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to read"));
    }
}
