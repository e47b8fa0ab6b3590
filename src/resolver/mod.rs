//! Tree resolution
//!
//! Turns a surface's flat component map into a fully linked tree of
//! [`ResolvedNode`]s: child references are substituted, explicit lists are
//! expanded in order, and list templates are instantiated once per element of
//! the data-model sequence they bind to.
//!
//! Resolution is pure and deterministic: identical inputs produce
//! structurally identical trees, so the whole tree is cheaply recomputed from
//! scratch after every message batch instead of being patched incrementally.
//! Bound scalar values are deliberately left unresolved in the tree; they are
//! evaluated lazily (see [`primitives`]) so a pure data update refreshes
//! rendered values without requiring a rebuild.
//!
//! Nothing in here fails hard: a dangling or cyclic reference drops that one
//! reference with a diagnostic and the rest of the tree survives.

mod node;
pub mod primitives;

pub use node::{ResolvedNode, ResolvedValue};

use std::collections::HashMap;

use serde_json::Value;

use crate::errors::Diagnostic;
use crate::pointer;
use crate::protocol::{ComponentArrayReference, ListTemplate, RawComponent};

/// Property key conventionally holding a single child reference. A bare
/// string under this key is always treated as a component id, even when the
/// id is (still) unknown, so a dangling child degrades to an empty slot
/// instead of leaking the id as a literal.
const CHILD_KEY: &str = "child";

/// Delimiter between a template's component id and the instance index chain.
const TEMPLATE_ID_DELIMITER: char = ':';

/// Resolve the component tree rooted at `root_id`.
///
/// Returns `None` when `root_id` is `None` or names no known component.
/// Recoverable problems are pushed onto `diagnostics`.
pub fn resolve_tree(
    root_id: Option<&str>,
    components: &HashMap<String, RawComponent>,
    data: &Value,
    diagnostics: &mut Vec<Diagnostic>,
) -> Option<ResolvedNode> {
    let root_id = root_id?;
    if !components.contains_key(root_id) {
        return None;
    }
    let mut resolver = TreeResolver {
        components,
        data,
        diagnostics,
        in_flight: Vec::new(),
    };
    resolver.resolve_node(root_id, "", "", None)
}

struct TreeResolver<'a> {
    components: &'a HashMap<String, RawComponent>,
    data: &'a Value,
    diagnostics: &'a mut Vec<Diagnostic>,
    /// (component id, data context) pairs currently being resolved, for cycle
    /// detection
    in_flight: Vec<(String, String)>,
}

impl TreeResolver<'_> {
    fn resolve_node(
        &mut self,
        base_id: &str,
        context: &str,
        id_suffix: &str,
        slot_name: Option<&str>,
    ) -> Option<ResolvedNode> {
        let raw = self.components.get(base_id)?;
        let full_id = format!("{base_id}{id_suffix}");

        let context = match &raw.data_context {
            Some(override_path) => pointer::join(context, override_path),
            None => context.to_string(),
        };

        // Template suffixes make every full id unique, so cycles are keyed on
        // the (component, data context) pair instead: a repeated pair means
        // the expansion is not progressing through the data.
        if self
            .in_flight
            .iter()
            .any(|(id, ctx)| id == base_id && ctx == &context)
        {
            self.diagnostics
                .push(Diagnostic::CyclicReference { id: full_id });
            return None;
        }

        self.in_flight.push((base_id.to_string(), context.clone()));
        let mut properties = std::collections::BTreeMap::new();
        for (key, value) in &raw.component.properties {
            if let Some(resolved) =
                self.resolve_property(&raw.id, key, value, &context, id_suffix)
            {
                properties.insert(key.clone(), resolved);
            }
        }
        self.in_flight.pop();

        Some(ResolvedNode {
            id: full_id,
            type_name: raw.component.type_name.clone(),
            weight: raw.weight.unwrap_or_default(),
            data_context_path: context,
            slot_name: slot_name.map(str::to_string),
            properties,
        })
    }

    /// Resolve one raw property value. `None` means the property is omitted
    /// from the resolved node (a dropped dangling/cyclic reference).
    fn resolve_property(
        &mut self,
        referrer: &str,
        key: &str,
        value: &Value,
        context: &str,
        id_suffix: &str,
    ) -> Option<ResolvedValue> {
        if let Some(reference) = ComponentArrayReference::from_raw(value) {
            return Some(match reference {
                ComponentArrayReference::ExplicitList(ids) => {
                    ResolvedValue::List(self.resolve_explicit_list(referrer, key, &ids, context, id_suffix))
                }
                ComponentArrayReference::Template(template) => ResolvedValue::List(
                    self.expand_template(referrer, key, &template, context, id_suffix),
                ),
            });
        }

        if let Some(bound) = crate::protocol::BoundValue::from_raw(value) {
            return Some(ResolvedValue::Bound(bound));
        }

        match value {
            Value::String(id) if self.components.contains_key(id.as_str()) => self
                .resolve_node(id, context, id_suffix, Some(key))
                .map(|node| ResolvedValue::Node(Box::new(node))),
            Value::String(id) if key == CHILD_KEY => {
                self.diagnostics.push(Diagnostic::UnresolvedReference {
                    referrer: referrer.to_string(),
                    missing: id.clone(),
                });
                None
            }
            Value::Array(items) => Some(ResolvedValue::Array(
                items
                    .iter()
                    .filter_map(|item| {
                        self.resolve_property(referrer, key, item, context, id_suffix)
                    })
                    .collect(),
            )),
            Value::Object(map) => Some(ResolvedValue::Object(
                map.iter()
                    .filter_map(|(k, v)| {
                        self.resolve_property(referrer, k, v, context, id_suffix)
                            .map(|resolved| (k.clone(), resolved))
                    })
                    .collect(),
            )),
            other => Some(ResolvedValue::Raw(other.clone())),
        }
    }

    fn resolve_explicit_list(
        &mut self,
        referrer: &str,
        key: &str,
        ids: &[String],
        context: &str,
        id_suffix: &str,
    ) -> Vec<ResolvedNode> {
        ids.iter()
            .filter_map(|id| {
                if !self.components.contains_key(id) {
                    self.diagnostics.push(Diagnostic::UnresolvedReference {
                        referrer: referrer.to_string(),
                        missing: id.clone(),
                    });
                    return None;
                }
                self.resolve_node(id, context, id_suffix, Some(key))
            })
            .collect()
    }

    /// Instantiate a template once per element of the sequence its binding
    /// resolves to. Anything other than a sequence produces zero instances.
    fn expand_template(
        &mut self,
        referrer: &str,
        key: &str,
        template: &ListTemplate,
        context: &str,
        id_suffix: &str,
    ) -> Vec<ResolvedNode> {
        let binding = pointer::join(context, &template.data_binding);
        // Joined bindings are absolute, so only data shape can make this miss.
        let bound = pointer::resolve(self.data, &binding).ok().flatten();

        let items = match bound {
            Some(Value::Array(items)) => items,
            Some(_) => {
                self.diagnostics.push(Diagnostic::TemplateBindingNotAList {
                    binding: binding.clone(),
                });
                return Vec::new();
            }
            // Data not streamed yet; a later batch re-expands.
            None => {
                tracing::debug!(binding = %binding, "template binding absent, no instances");
                return Vec::new();
            }
        };

        if !self.components.contains_key(&template.component_id) {
            self.diagnostics.push(Diagnostic::UnresolvedReference {
                referrer: referrer.to_string(),
                missing: template.component_id.clone(),
            });
            return Vec::new();
        }

        (0..items.len())
            .filter_map(|index| {
                let instance_context = format!("{binding}/{index}");
                let instance_suffix =
                    format!("{id_suffix}{TEMPLATE_ID_DELIMITER}{index}");
                self.resolve_node(
                    &template.component_id,
                    &instance_context,
                    &instance_suffix,
                    Some(key),
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{BoundValue, ComponentBody, Weight};
    use serde_json::json;

    fn component(id: &str, type_name: &str, props: Value) -> RawComponent {
        let properties = match props {
            Value::Object(map) => map,
            _ => panic!("props must be an object"),
        };
        RawComponent {
            id: id.to_string(),
            weight: None,
            data_context: None,
            component: ComponentBody::new(type_name, properties),
        }
    }

    fn component_map(components: Vec<RawComponent>) -> HashMap<String, RawComponent> {
        components
            .into_iter()
            .map(|c| (c.id.clone(), c))
            .collect()
    }

    #[test]
    fn test_missing_root_resolves_to_none() {
        let components = component_map(vec![]);
        let mut diags = Vec::new();
        assert!(resolve_tree(None, &components, &json!({}), &mut diags).is_none());
        assert!(resolve_tree(Some("root"), &components, &json!({}), &mut diags).is_none());
        assert!(diags.is_empty());
    }

    #[test]
    fn test_child_reference_expansion() {
        let components = component_map(vec![
            component("root", "Card", json!({"child": "inner"})),
            component("inner", "Text", json!({"text": {"literalString": "hi"}})),
        ]);
        let mut diags = Vec::new();
        let tree = resolve_tree(Some("root"), &components, &json!({}), &mut diags).unwrap();

        assert_eq!(tree.id, "root");
        assert_eq!(tree.type_name, "Card");
        assert_eq!(tree.weight, Weight::Initial);
        let child = match tree.properties.get("child").unwrap() {
            ResolvedValue::Node(node) => node,
            other => panic!("expected node, got {other:?}"),
        };
        assert_eq!(child.type_name, "Text");
        assert_eq!(child.slot_name.as_deref(), Some("child"));
        assert_eq!(child.data_context_path, "");
        assert!(diags.is_empty());
    }

    #[test]
    fn test_dangling_child_drops_slot_only() {
        let components = component_map(vec![
            component(
                "root",
                "Card",
                json!({"child": "missing", "title": {"literalString": "t"}}),
            ),
        ]);
        let mut diags = Vec::new();
        let tree = resolve_tree(Some("root"), &components, &json!({}), &mut diags).unwrap();

        assert!(!tree.properties.contains_key("child"));
        assert!(tree.properties.contains_key("title"));
        assert_eq!(
            diags,
            vec![Diagnostic::UnresolvedReference {
                referrer: "root".to_string(),
                missing: "missing".to_string(),
            }]
        );
    }

    #[test]
    fn test_explicit_list_skips_missing_ids() {
        let components = component_map(vec![
            component(
                "root",
                "Column",
                json!({"children": {"explicitList": ["a", "ghost", "b"]}}),
            ),
            component("a", "Text", json!({})),
            component("b", "Text", json!({})),
        ]);
        let mut diags = Vec::new();
        let tree = resolve_tree(Some("root"), &components, &json!({}), &mut diags).unwrap();

        let children = match tree.properties.get("children").unwrap() {
            ResolvedValue::List(nodes) => nodes,
            other => panic!("expected list, got {other:?}"),
        };
        let ids: Vec<&str> = children.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(diags.len(), 1);
    }

    #[test]
    fn test_template_expansion_and_scoping() {
        let components = component_map(vec![
            component(
                "list",
                "List",
                json!({"children": {"template": {"componentId": "row", "dataBinding": "/items"}}}),
            ),
            component("row", "Text", json!({"text": {"path": "name"}})),
        ]);
        let data = json!({"items": [{"name": "A"}, {"name": "B"}, {"name": "C"}]});
        let mut diags = Vec::new();
        let tree = resolve_tree(Some("list"), &components, &data, &mut diags).unwrap();

        let rows = match tree.properties.get("children").unwrap() {
            ResolvedValue::List(nodes) => nodes,
            other => panic!("expected list, got {other:?}"),
        };
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].id, "row:0");
        assert_eq!(rows[2].id, "row:2");
        assert_eq!(rows[1].data_context_path, "/items/1");
        assert!(diags.is_empty());
    }

    #[test]
    fn test_template_ids_stable_as_array_grows() {
        let components = component_map(vec![
            component(
                "list",
                "List",
                json!({"children": {"template": {"componentId": "row", "dataBinding": "/items"}}}),
            ),
            component("row", "Text", json!({})),
        ]);
        let mut diags = Vec::new();

        let small = resolve_tree(
            Some("list"),
            &components,
            &json!({"items": [1, 2, 3]}),
            &mut diags,
        )
        .unwrap();
        let grown = resolve_tree(
            Some("list"),
            &components,
            &json!({"items": [1, 2, 3, 4]}),
            &mut diags,
        )
        .unwrap();

        let ids = |tree: &ResolvedNode| match tree.properties.get("children").unwrap() {
            ResolvedValue::List(nodes) => nodes.iter().map(|n| n.id.clone()).collect::<Vec<_>>(),
            other => panic!("expected list, got {other:?}"),
        };
        assert_eq!(ids(&small), vec!["row:0", "row:1", "row:2"]);
        assert_eq!(ids(&grown), vec!["row:0", "row:1", "row:2", "row:3"]);
    }

    #[test]
    fn test_nested_template_suffixes_accumulate() {
        let components = component_map(vec![
            component(
                "outer",
                "List",
                json!({"children": {"template": {"componentId": "group", "dataBinding": "/groups"}}}),
            ),
            component(
                "group",
                "List",
                json!({"children": {"template": {"componentId": "row", "dataBinding": "rows"}}}),
            ),
            component("row", "Text", json!({"text": {"path": "name"}})),
        ]);
        let data = json!({
            "groups": [
                {"rows": [{"name": "a"}]},
                {"rows": [{"name": "b"}, {"name": "c"}]}
            ]
        });
        let mut diags = Vec::new();
        let tree = resolve_tree(Some("outer"), &components, &data, &mut diags).unwrap();

        let groups = match tree.properties.get("children").unwrap() {
            ResolvedValue::List(nodes) => nodes,
            other => panic!("expected list, got {other:?}"),
        };
        let rows = match groups[1].properties.get("children").unwrap() {
            ResolvedValue::List(nodes) => nodes,
            other => panic!("expected list, got {other:?}"),
        };
        assert_eq!(rows[0].id, "row:1:0");
        assert_eq!(rows[1].id, "row:1:1");
        assert_eq!(rows[1].data_context_path, "/groups/1/rows/1");
        assert!(diags.is_empty());
    }

    #[test]
    fn test_template_on_non_array_produces_nothing() {
        let components = component_map(vec![
            component(
                "list",
                "List",
                json!({"children": {"template": {"componentId": "row", "dataBinding": "/items"}}}),
            ),
            component("row", "Text", json!({})),
        ]);
        let data = json!({"items": {"0": "not", "1": "a list"}});
        let mut diags = Vec::new();
        let tree = resolve_tree(Some("list"), &components, &data, &mut diags).unwrap();

        match tree.properties.get("children").unwrap() {
            ResolvedValue::List(nodes) => assert!(nodes.is_empty()),
            other => panic!("expected list, got {other:?}"),
        }
        assert_eq!(
            diags,
            vec![Diagnostic::TemplateBindingNotAList {
                binding: "/items".to_string(),
            }]
        );
    }

    #[test]
    fn test_template_with_absent_binding_is_quiet() {
        let components = component_map(vec![
            component(
                "list",
                "List",
                json!({"children": {"template": {"componentId": "row", "dataBinding": "/items"}}}),
            ),
            component("row", "Text", json!({})),
        ]);
        // nothing at /items yet: zero instances, and no diagnostic because
        // the data may simply not have been streamed
        let mut diags = Vec::new();
        let tree = resolve_tree(Some("list"), &components, &json!({}), &mut diags).unwrap();
        match tree.properties.get("children").unwrap() {
            ResolvedValue::List(nodes) => assert!(nodes.is_empty()),
            other => panic!("expected list, got {other:?}"),
        }
        assert!(diags.is_empty());
    }

    #[test]
    fn test_self_referencing_template_terminates() {
        // an absolute binding never deepens the context, so the repeated
        // (component, context) pair must be cut instead of recursing
        let components = component_map(vec![component(
            "a",
            "List",
            json!({"children": {"template": {"componentId": "a", "dataBinding": "/items"}}}),
        )]);
        let data = json!({"items": ["x"]});
        let mut diags = Vec::new();
        let tree = resolve_tree(Some("a"), &components, &data, &mut diags).unwrap();

        let outer = match tree.properties.get("children").unwrap() {
            ResolvedValue::List(nodes) => nodes,
            other => panic!("expected list, got {other:?}"),
        };
        assert_eq!(outer.len(), 1);
        assert_eq!(outer[0].id, "a:0");
        match outer[0].properties.get("children").unwrap() {
            ResolvedValue::List(nodes) => assert!(nodes.is_empty()),
            other => panic!("expected list, got {other:?}"),
        }
        assert_eq!(
            diags,
            vec![Diagnostic::CyclicReference {
                id: "a:0:0".to_string(),
            }]
        );
    }

    #[test]
    fn test_recursive_template_progresses_through_nested_data() {
        // a relative binding deepens the context each level, so recursion
        // bottoms out where the data does
        let components = component_map(vec![component(
            "node",
            "Tree",
            json!({"children": {"template": {"componentId": "node", "dataBinding": "kids"}}}),
        )]);
        let data = json!({"kids": [{"kids": [{"kids": []}]}]});
        let mut diags = Vec::new();
        let tree = resolve_tree(Some("node"), &components, &data, &mut diags).unwrap();

        let level1 = match tree.properties.get("children").unwrap() {
            ResolvedValue::List(nodes) => nodes,
            other => panic!("expected list, got {other:?}"),
        };
        assert_eq!(level1[0].id, "node:0");
        assert_eq!(level1[0].data_context_path, "/kids/0");
        let level2 = match level1[0].properties.get("children").unwrap() {
            ResolvedValue::List(nodes) => nodes,
            other => panic!("expected list, got {other:?}"),
        };
        assert_eq!(level2[0].id, "node:0:0");
        assert_eq!(level2[0].data_context_path, "/kids/0/kids/0");
        assert!(diags.is_empty());
    }

    #[test]
    fn test_cycle_drops_back_reference() {
        let components = component_map(vec![
            component("a", "Card", json!({"child": "b"})),
            component("b", "Card", json!({"child": "a"})),
        ]);
        let mut diags = Vec::new();
        let tree = resolve_tree(Some("a"), &components, &json!({}), &mut diags).unwrap();

        let b = match tree.properties.get("child").unwrap() {
            ResolvedValue::Node(node) => node,
            other => panic!("expected node, got {other:?}"),
        };
        assert_eq!(b.id, "b");
        assert!(!b.properties.contains_key("child"));
        assert_eq!(
            diags,
            vec![Diagnostic::CyclicReference {
                id: "a".to_string(),
            }]
        );
    }

    #[test]
    fn test_data_context_override() {
        let components = component_map(vec![
            component("root", "Card", json!({"child": "inner"})),
            {
                let mut c = component("inner", "Text", json!({"text": {"path": "name"}}));
                c.data_context = Some("/user".to_string());
                c
            },
        ]);
        let mut diags = Vec::new();
        let tree = resolve_tree(Some("root"), &components, &json!({}), &mut diags).unwrap();
        let inner = match tree.properties.get("child").unwrap() {
            ResolvedValue::Node(node) => node,
            other => panic!("expected node, got {other:?}"),
        };
        assert_eq!(inner.data_context_path, "/user");
    }

    #[test]
    fn test_unknown_shapes_pass_through() {
        let components = component_map(vec![component(
            "root",
            "Custom",
            json!({
                "label": "plain string",
                "count": 3,
                "meta": {"nested": {"deep": true}}
            }),
        )]);
        let mut diags = Vec::new();
        let tree = resolve_tree(Some("root"), &components, &json!({}), &mut diags).unwrap();

        assert_eq!(
            tree.properties.get("label"),
            Some(&ResolvedValue::Raw(json!("plain string")))
        );
        assert_eq!(
            tree.properties.get("count"),
            Some(&ResolvedValue::Raw(json!(3)))
        );
        match tree.properties.get("meta").unwrap() {
            ResolvedValue::Object(map) => {
                assert!(map.contains_key("nested"));
            }
            other => panic!("expected object, got {other:?}"),
        }
        assert!(diags.is_empty());
    }

    #[test]
    fn test_bound_values_stay_unresolved() {
        let components = component_map(vec![component(
            "root",
            "Text",
            json!({"text": {"path": "/title"}}),
        )]);
        let data = json!({"title": "Hi"});
        let mut diags = Vec::new();
        let tree = resolve_tree(Some("root"), &components, &data, &mut diags).unwrap();

        assert_eq!(
            tree.properties.get("text"),
            Some(&ResolvedValue::Bound(BoundValue::path("/title")))
        );
    }

    #[test]
    fn test_idempotent_re_resolution() {
        let components = component_map(vec![
            component(
                "root",
                "Column",
                json!({"children": {"explicitList": ["title", "list"]}}),
            ),
            component("title", "Text", json!({"text": {"path": "/title"}})),
            component(
                "list",
                "List",
                json!({"children": {"template": {"componentId": "row", "dataBinding": "/rows"}}}),
            ),
            component("row", "Text", json!({"text": {"path": "name"}})),
        ]);
        let data = json!({"title": "Hi", "rows": [{"name": "A"}, {"name": "B"}]});
        let mut diags = Vec::new();
        let first = resolve_tree(Some("root"), &components, &data, &mut diags);
        let second = resolve_tree(Some("root"), &components, &data, &mut diags);
        assert_eq!(first, second);
        assert!(diags.is_empty());
    }
}
