//! Resolved node types

use std::collections::BTreeMap;

use serde_json::Value;

use crate::protocol::{Action, BoundValue, Weight};

/// A structurally resolved UI node: child/template references expanded,
/// bound scalar values kept as unresolved descriptors.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedNode {
    /// The raw component id, with a `:index` chain appended for
    /// template-generated instances
    pub id: String,

    /// Component type name, dispatched on by the host's catalog
    pub type_name: String,

    pub weight: Weight,

    /// Pointer prefix this node and its descendants use for relative paths
    pub data_context_path: String,

    /// Key of the parent property this node was referenced from
    pub slot_name: Option<String>,

    pub properties: BTreeMap<String, ResolvedValue>,
}

impl ResolvedNode {
    pub fn property(&self, key: &str) -> Option<&ResolvedValue> {
        self.properties.get(key)
    }

    /// The single child node under `key`, if that property resolved to one.
    pub fn child(&self, key: &str) -> Option<&ResolvedNode> {
        match self.properties.get(key)? {
            ResolvedValue::Node(node) => Some(node),
            _ => None,
        }
    }

    /// The child list under `key`; empty when the property is absent or not a
    /// list.
    pub fn children(&self, key: &str) -> &[ResolvedNode] {
        match self.properties.get(key) {
            Some(ResolvedValue::List(nodes)) => nodes,
            _ => &[],
        }
    }

    /// The unresolved bound value under `key`, if any.
    pub fn bound(&self, key: &str) -> Option<&BoundValue> {
        match self.properties.get(key)? {
            ResolvedValue::Bound(bound) => Some(bound),
            _ => None,
        }
    }

    /// Reconstruct an [`Action`] declared under `key`.
    ///
    /// Actions are never pre-resolved; this re-reads the pass-through
    /// property shape at interaction time.
    pub fn action(&self, key: &str) -> Option<Action> {
        let raw = self.properties.get(key)?.to_json()?;
        serde_json::from_value(raw).ok()
    }
}

/// A resolved property value.
///
/// Component references become `Node`/`List`; bound scalar descriptors stay
/// unresolved as `Bound`; everything else is pass-through data.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedValue {
    /// A single substituted subtree
    Node(Box<ResolvedNode>),
    /// An expanded explicit list or template
    List(Vec<ResolvedNode>),
    /// An unresolved literal-or-path descriptor
    Bound(BoundValue),
    /// Pass-through array (may contain further resolved values)
    Array(Vec<ResolvedValue>),
    /// Pass-through object (may contain further resolved values)
    Object(BTreeMap<String, ResolvedValue>),
    /// Pass-through scalar
    Raw(Value),
}

impl ResolvedValue {
    /// Convert a pass-through shape back to plain JSON. Returns `None` if the
    /// value contains substituted component nodes.
    pub fn to_json(&self) -> Option<Value> {
        match self {
            Self::Node(_) | Self::List(_) => None,
            Self::Bound(bound) => serde_json::to_value(bound).ok(),
            Self::Array(items) => items
                .iter()
                .map(ResolvedValue::to_json)
                .collect::<Option<Vec<_>>>()
                .map(Value::Array),
            Self::Object(map) => map
                .iter()
                .map(|(k, v)| v.to_json().map(|json| (k.clone(), json)))
                .collect::<Option<serde_json::Map<_, _>>>()
                .map(Value::Object),
            Self::Raw(value) => Some(value.clone()),
        }
    }
}
