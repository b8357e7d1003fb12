//! Structural validation and repair for externally supplied state.
//!
//! Anything that arrives from outside the process (a remote payload, an
//! imported file) goes through the same gate: parse to a JSON value, repair
//! missing `children` arrays, then pass the deep shape check. Payloads that
//! fail the check are rejected wholesale; there is no partial repair beyond
//! the `children` normalization.

use serde_json::Value;

use crate::error::TaskTreeError;
use crate::tree::AppState;

/// Deep structural validator for a candidate app state.
///
/// Confirms `items` is an array whose every node (at every depth) carries a
/// defined `id`, a string `value`, and an array `children`, and that
/// `hideDoneItems` and `darkMode` are booleans.
#[must_use]
pub fn is_valid_app_state(candidate: &Value) -> bool {
    let Some(obj) = candidate.as_object() else {
        return false;
    };
    let Some(items) = obj.get("items").and_then(Value::as_array) else {
        return false;
    };
    if !obj.get("hideDoneItems").is_some_and(Value::is_boolean) {
        return false;
    }
    if !obj.get("darkMode").is_some_and(Value::is_boolean) {
        return false;
    }
    items.iter().all(is_valid_node)
}

fn is_valid_node(node: &Value) -> bool {
    let Some(obj) = node.as_object() else {
        return false;
    };
    if !obj.contains_key("id") || obj.get("id").is_some_and(Value::is_null) {
        return false;
    }
    if !obj.get("value").is_some_and(Value::is_string) {
        return false;
    }
    match obj.get("children").and_then(Value::as_array) {
        Some(children) => children.iter().all(is_valid_node),
        None => false,
    }
}

/// Normalize missing `children` arrays to empty ones, at every depth.
///
/// Remote or imported payloads sometimes drop empty arrays; repair runs
/// before validation so such payloads are not rejected outright.
pub fn repair_children(candidate: &mut Value) {
    if let Some(items) = candidate
        .as_object_mut()
        .and_then(|obj| obj.get_mut("items"))
        .and_then(Value::as_array_mut)
    {
        for node in items {
            repair_node(node);
        }
    }
}

fn repair_node(node: &mut Value) {
    let Some(obj) = node.as_object_mut() else {
        return;
    };
    let children = obj
        .entry("children")
        .or_insert_with(|| Value::Array(Vec::new()));
    if let Some(children) = children.as_array_mut() {
        for child in children {
            repair_node(child);
        }
    }
}

/// Decode an external JSON document into an [`AppState`].
///
/// Runs the repair pass, then the deep shape check, and only then the typed
/// decode.
///
/// # Errors
///
/// Returns [`TaskTreeError::Parse`] for malformed JSON and
/// [`TaskTreeError::Validation`] for payloads failing the shape check.
pub fn decode_app_state(bytes: &[u8]) -> Result<AppState, TaskTreeError> {
    let mut value: Value = serde_json::from_slice(bytes)?;
    repair_children(&mut value);
    if !is_valid_app_state(&value) {
        return Err(TaskTreeError::Validation(
            "payload does not have the expected shape".to_string(),
        ));
    }
    Ok(serde_json::from_value(value)?)
}

/// Encode an [`AppState`] for upload, validating it first.
///
/// Serializes exactly `{items, hideDoneItems, darkMode}`; nothing transient
/// is ever written remotely.
///
/// # Errors
///
/// Returns [`TaskTreeError::Validation`] if the state fails its own shape
/// check (which would indicate a bug in a mutation path).
pub fn encode_app_state(state: &AppState) -> Result<Vec<u8>, TaskTreeError> {
    let value = serde_json::to_value(state)?;
    if !is_valid_app_state(&value) {
        return Err(TaskTreeError::Validation(
            "refusing to persist a malformed state".to_string(),
        ));
    }
    Ok(serde_json::to_vec(&value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{ops, seed, TreeNode};
    use serde_json::json;

    #[test]
    fn test_round_trip_is_valid() {
        let state = AppState::with_items(seed::seed_forest());
        let bytes = encode_app_state(&state).unwrap();
        let decoded = decode_app_state(&bytes).unwrap();
        assert_eq!(decoded, state);
    }

    #[test]
    fn test_root_order_survives_round_trip() {
        let state = AppState::with_items(vec![
            TreeNode::new("2", "b"),
            TreeNode::new("1", "a"),
            TreeNode::new("3", "c"),
        ]);
        let decoded = decode_app_state(&encode_app_state(&state).unwrap()).unwrap();
        let ids: Vec<&str> = decoded.items.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, ["2", "1", "3"]);
    }

    #[test]
    fn test_missing_children_fails_without_repair() {
        let value = json!({
            "items": [{"id": "1", "value": "a"}],
            "hideDoneItems": false,
            "darkMode": false,
        });
        assert!(!is_valid_app_state(&value));
    }

    #[test]
    fn test_missing_children_is_repaired_at_depth() {
        let mut value = json!({
            "items": [{"id": "1", "value": "a", "children": [
                {"id": "2", "value": "b"}
            ]}],
            "hideDoneItems": true,
            "darkMode": false,
        });
        repair_children(&mut value);
        assert!(is_valid_app_state(&value));

        let state: AppState = serde_json::from_value(value).unwrap();
        assert!(state.items[0].children[0].children.is_empty());
    }

    #[test]
    fn test_rejects_non_boolean_settings() {
        let value = json!({
            "items": [],
            "hideDoneItems": "yes",
            "darkMode": false,
        });
        assert!(!is_valid_app_state(&value));
    }

    #[test]
    fn test_rejects_missing_items() {
        assert!(!is_valid_app_state(&json!({"hideDoneItems": false, "darkMode": false})));
        assert!(!is_valid_app_state(&json!("not an object")));
    }

    #[test]
    fn test_rejects_node_without_value() {
        let value = json!({
            "items": [{"id": "1", "children": []}],
            "hideDoneItems": false,
            "darkMode": false,
        });
        assert!(!is_valid_app_state(&value));
    }

    #[test]
    fn test_decode_malformed_json_is_a_parse_error() {
        let err = decode_app_state(b"{not json").unwrap_err();
        assert!(matches!(err, TaskTreeError::Parse(_)));
    }

    #[test]
    fn test_decode_wrong_shape_is_a_validation_error() {
        let err = decode_app_state(b"{\"items\": 5}").unwrap_err();
        assert!(matches!(err, TaskTreeError::Validation(_)));
    }

    #[test]
    fn test_decoded_state_accepts_mutations() {
        let bytes = encode_app_state(&AppState::with_items(seed::seed_forest())).unwrap();
        let mut state = decode_app_state(&bytes).unwrap();
        assert!(ops::add_task(&mut state.items, None, "fresh").is_some());
    }
}
