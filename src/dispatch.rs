//! Action dispatch
//!
//! Builds outbound user-action messages. Context bindings declared on the
//! action are resolved at the moment of dispatch, scoped by the source node's
//! data context, so the message carries the data model's current values.
//! Sending the message is the host transport's responsibility.

use serde_json::Value;

use crate::errors::Diagnostic;
use crate::protocol::{Action, ActionContext, UserActionMessage};
use crate::resolver::{primitives::resolve_primitive, ResolvedNode};

/// Build a [`UserActionMessage`] for `action` fired from `source_node`.
///
/// Reads the data model; has no other side effects.
pub fn build_user_action(
    action: &Action,
    source_node: &ResolvedNode,
    surface_id: &str,
    data: &Value,
    diagnostics: &mut Vec<Diagnostic>,
) -> UserActionMessage {
    let mut context = ActionContext::new();
    for entry in &action.context {
        let resolved = resolve_primitive(
            &entry.value,
            &source_node.data_context_path,
            data,
            diagnostics,
        );
        context.insert(entry.key.clone(), resolved);
    }

    UserActionMessage {
        name: action.name.clone(),
        source_component_id: source_node.id.clone(),
        surface_id: surface_id.to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        context,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{ActionContextEntry, BoundValue, Weight};
    use serde_json::json;
    use std::collections::BTreeMap;

    fn node(id: &str, context: &str) -> ResolvedNode {
        ResolvedNode {
            id: id.to_string(),
            type_name: "Button".to_string(),
            weight: Weight::Initial,
            data_context_path: context.to_string(),
            slot_name: None,
            properties: BTreeMap::new(),
        }
    }

    #[test]
    fn test_context_resolved_at_dispatch_time() {
        let action = Action {
            name: "select".to_string(),
            context: vec![
                ActionContextEntry {
                    key: "id".to_string(),
                    value: BoundValue::path("id"),
                },
                ActionContextEntry {
                    key: "origin".to_string(),
                    value: BoundValue::literal_string("list"),
                },
            ],
        };
        let data = json!({"rows": [{"id": "r0"}, {"id": "r1"}]});
        let mut diags = Vec::new();

        let msg = build_user_action(&action, &node("row:1", "/rows/1"), "main", &data, &mut diags);

        assert_eq!(msg.name, "select");
        assert_eq!(msg.source_component_id, "row:1");
        assert_eq!(msg.surface_id, "main");
        assert_eq!(msg.context.get("id"), Some(&json!("r1")));
        assert_eq!(msg.context.get("origin"), Some(&json!("list")));
        assert!(diags.is_empty());
        // RFC 3339 with an explicit offset
        assert!(msg.timestamp.contains('T'));
    }

    #[test]
    fn test_missing_binding_resolves_to_null() {
        let action = Action {
            name: "noop".to_string(),
            context: vec![ActionContextEntry {
                key: "gone".to_string(),
                value: BoundValue::path("/nope"),
            }],
        };
        let mut diags = Vec::new();
        let msg = build_user_action(&action, &node("b", "/"), "main", &json!({}), &mut diags);
        assert_eq!(msg.context.get("gone"), Some(&Value::Null));
    }
}
