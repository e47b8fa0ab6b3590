//! Component and binding wire types
//!
//! A `RawComponent` is the flat, adjacency-list description of one UI node.
//! On the wire its type discriminant is the single key of the `component`
//! object (`{"component": {"Text": {...}}}`); internally that is stored as an
//! explicit `(type_name, properties)` pair so resolution code can match on it
//! directly.

use std::collections::BTreeMap;

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Flex-weight hint attached to a component.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Weight {
    /// Sizing left to the host layout (the wire sentinel `"initial"`)
    #[default]
    Initial,
    /// Explicit flex weight
    Fixed(f64),
}

impl Serialize for Weight {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Weight::Initial => serializer.serialize_str("initial"),
            Weight::Fixed(n) => serializer.serialize_f64(*n),
        }
    }
}

impl<'de> Deserialize<'de> for Weight {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::String(s) if s == "initial" => Ok(Weight::Initial),
            Value::Number(n) => n
                .as_f64()
                .map(Weight::Fixed)
                .ok_or_else(|| D::Error::custom("weight is not representable as f64")),
            other => Err(D::Error::custom(format!(
                "weight must be a number or \"initial\", got {other}"
            ))),
        }
    }
}

/// The `(typeName, properties)` pair of a component definition.
///
/// Serializes as the wire's single-key map. Deserialization rejects component
/// objects with zero or multiple type keys.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentBody {
    pub type_name: String,
    pub properties: serde_json::Map<String, Value>,
}

impl ComponentBody {
    pub fn new(type_name: impl Into<String>, properties: serde_json::Map<String, Value>) -> Self {
        Self {
            type_name: type_name.into(),
            properties,
        }
    }
}

impl Serialize for ComponentBody {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut wrapper = serde_json::Map::with_capacity(1);
        wrapper.insert(
            self.type_name.clone(),
            Value::Object(self.properties.clone()),
        );
        wrapper.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ComponentBody {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut wrapper = serde_json::Map::deserialize(deserializer)?;
        if wrapper.len() != 1 {
            return Err(D::Error::custom(format!(
                "component object must have exactly one type key, got {}",
                wrapper.len()
            )));
        }
        // len() == 1 checked above
        let (type_name, props) = wrapper.iter_mut().next().map(|(k, v)| (k.clone(), v.take()))
            .ok_or_else(|| D::Error::custom("component object is empty"))?;
        let properties = match props {
            Value::Object(map) => map,
            // Tolerate a null/absent property bag
            Value::Null => serde_json::Map::new(),
            other => {
                return Err(D::Error::custom(format!(
                    "component properties for {type_name:?} must be an object, got {other}"
                )))
            }
        };
        Ok(Self {
            type_name,
            properties,
        })
    }
}

/// Wire-level description of one UI node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawComponent {
    /// Unique within a surface
    pub id: String,

    /// Flex-weight hint; absent means `initial`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<Weight>,

    /// Explicit data-context override, joined onto the inherited context
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_context: Option<String>,

    pub component: ComponentBody,
}

/// A literal-or-path scalar descriptor.
///
/// Exactly one field should be present; violations are tolerated at parse
/// time and reported as an `AmbiguousBoundValue` diagnostic when resolved.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BoundValue {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub literal_string: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub literal_number: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub literal_boolean: Option<bool>,

    /// Absolute or data-context-relative pointer into the data model
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl BoundValue {
    pub fn literal_string(s: impl Into<String>) -> Self {
        Self {
            literal_string: Some(s.into()),
            ..Self::default()
        }
    }

    pub fn literal_number(n: f64) -> Self {
        Self {
            literal_number: Some(n),
            ..Self::default()
        }
    }

    pub fn literal_boolean(b: bool) -> Self {
        Self {
            literal_boolean: Some(b),
            ..Self::default()
        }
    }

    pub fn path(p: impl Into<String>) -> Self {
        Self {
            path: Some(p.into()),
            ..Self::default()
        }
    }

    /// Number of declared branches. A well-formed bound value has exactly one.
    pub fn declared_count(&self) -> usize {
        [
            self.literal_string.is_some(),
            self.literal_number.is_some(),
            self.literal_boolean.is_some(),
            self.path.is_some(),
        ]
        .iter()
        .filter(|present| **present)
        .count()
    }

    /// Try to read a raw property value as a bound-value descriptor.
    ///
    /// Only objects whose keys all belong to the bound-value shape (and which
    /// declare at least one branch) qualify; everything else is opaque
    /// pass-through data.
    pub fn from_raw(value: &Value) -> Option<Self> {
        if !value.is_object() {
            return None;
        }
        let parsed: Self = serde_json::from_value(value.clone()).ok()?;
        (parsed.declared_count() > 0).then_some(parsed)
    }
}

/// A list of children: either explicit ids in order, or a template
/// instantiated once per element of a data-model sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ComponentArrayReference {
    ExplicitList(Vec<String>),
    Template(ListTemplate),
}

impl ComponentArrayReference {
    /// Try to read a raw property value as an array reference.
    pub fn from_raw(value: &Value) -> Option<Self> {
        if !value.is_object() {
            return None;
        }
        serde_json::from_value(value.clone()).ok()
    }
}

/// Template directive: instantiate `component_id` once per element found at
/// `data_binding`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListTemplate {
    pub component_id: String,
    pub data_binding: String,
}

/// A user-interaction declaration attached to an interactive node's
/// properties. Context bindings are resolved at dispatch time, never during
/// tree resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub name: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub context: Vec<ActionContextEntry>,
}

/// One declared context binding of an [`Action`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionContextEntry {
    pub key: String,
    pub value: BoundValue,
}

/// Resolved action context: scalar or null per key.
pub type ActionContext = BTreeMap<String, Value>;
