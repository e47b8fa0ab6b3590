//! Inbound and outbound protocol messages

use serde::{Deserialize, Serialize};

use super::components::{ActionContext, RawComponent};

/// Inbound message union. Each wire message is an object with exactly one of
/// these keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ServerMessage {
    BeginRendering(BeginRendering),
    SurfaceUpdate(SurfaceUpdate),
    DataModelUpdate(DataModelUpdate),
    DeleteSurface(DeleteSurface),
}

impl ServerMessage {
    /// The surface this message addresses, if it names one explicitly.
    pub fn surface_id(&self) -> Option<&str> {
        match self {
            Self::BeginRendering(m) => m.surface_id.as_deref(),
            Self::SurfaceUpdate(m) => m.surface_id.as_deref(),
            Self::DataModelUpdate(m) => m.surface_id.as_deref(),
            Self::DeleteSurface(m) => m.surface_id.as_deref(),
        }
    }
}

/// Declares the root component and styles of a surface and marks it ready to
/// render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeginRendering {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub surface_id: Option<String>,

    /// Id of the root component
    pub root: String,

    /// Opaque style map, merged key-by-key across repeated messages
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub styles: serde_json::Map<String, serde_json::Value>,
}

/// Upserts flat component definitions into a surface (full replace per id).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurfaceUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub surface_id: Option<String>,

    pub components: Vec<RawComponent>,
}

/// Merges a recursive key/value description into a surface's data model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataModelUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub surface_id: Option<String>,

    /// Merge point; absent means the data model root
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    #[serde(default)]
    pub contents: Vec<ValueEntry>,
}

/// Removes a surface entirely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteSurface {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub surface_id: Option<String>,
}

/// One entry of a `dataModelUpdate` payload: a key plus exactly one typed
/// value field. Entries violating the exactly-one rule are tolerated by
/// taking the first present field, with a diagnostic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueEntry {
    pub key: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_string: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_number: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_boolean: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_map: Option<Vec<ValueEntry>>,
}

impl ValueEntry {
    pub fn string(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value_string: Some(value.into()),
            ..Self::empty()
        }
    }

    pub fn number(key: impl Into<String>, value: f64) -> Self {
        Self {
            key: key.into(),
            value_number: Some(value),
            ..Self::empty()
        }
    }

    pub fn boolean(key: impl Into<String>, value: bool) -> Self {
        Self {
            key: key.into(),
            value_boolean: Some(value),
            ..Self::empty()
        }
    }

    pub fn map(key: impl Into<String>, entries: Vec<ValueEntry>) -> Self {
        Self {
            key: key.into(),
            value_map: Some(entries),
            ..Self::empty()
        }
    }

    fn empty() -> Self {
        Self {
            key: String::new(),
            value_string: None,
            value_number: None,
            value_boolean: None,
            value_map: None,
        }
    }
}

/// Outbound user-interaction report, built by the action dispatcher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserActionMessage {
    /// The action's declared name
    pub name: String,

    /// Id of the resolved node the interaction originated from
    pub source_component_id: String,

    pub surface_id: String,

    /// RFC 3339 UTC dispatch time
    pub timestamp: String,

    /// Context bindings resolved at dispatch time (values may be null)
    pub context: ActionContext,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_message_union_parses_wire_shapes() {
        let msg: ServerMessage = serde_json::from_value(json!({
            "beginRendering": {"surfaceId": "main", "root": "root", "styles": {"accent": "#f00"}}
        }))
        .unwrap();
        match &msg {
            ServerMessage::BeginRendering(m) => {
                assert_eq!(m.surface_id.as_deref(), Some("main"));
                assert_eq!(m.root, "root");
                assert_eq!(m.styles.get("accent"), Some(&json!("#f00")));
            }
            other => panic!("unexpected variant: {other:?}"),
        }
        assert_eq!(msg.surface_id(), Some("main"));

        let msg: ServerMessage = serde_json::from_value(json!({
            "surfaceUpdate": {
                "components": [{"id": "a", "component": {"Text": {}}}]
            }
        }))
        .unwrap();
        match &msg {
            ServerMessage::SurfaceUpdate(m) => assert_eq!(m.components.len(), 1),
            other => panic!("unexpected variant: {other:?}"),
        }
        assert_eq!(msg.surface_id(), None);

        let msg: ServerMessage = serde_json::from_value(json!({
            "dataModelUpdate": {
                "path": "/user",
                "contents": [{"key": "name", "valueString": "Ada"}]
            }
        }))
        .unwrap();
        match msg {
            ServerMessage::DataModelUpdate(m) => {
                assert_eq!(m.path.as_deref(), Some("/user"));
                assert_eq!(m.contents[0].value_string.as_deref(), Some("Ada"));
            }
            other => panic!("unexpected variant: {other:?}"),
        }

        let msg: ServerMessage =
            serde_json::from_value(json!({"deleteSurface": {"surfaceId": "main"}})).unwrap();
        assert!(matches!(msg, ServerMessage::DeleteSurface(_)));
    }

    #[test]
    fn test_user_action_message_shape() {
        let mut context = ActionContext::new();
        context.insert("id".to_string(), json!("r-1"));
        let msg = UserActionMessage {
            name: "select".to_string(),
            source_component_id: "row:1".to_string(),
            surface_id: "main".to_string(),
            timestamp: "2026-01-01T00:00:00Z".to_string(),
            context,
        };
        assert_eq!(
            serde_json::to_value(&msg).unwrap(),
            json!({
                "name": "select",
                "sourceComponentId": "row:1",
                "surfaceId": "main",
                "timestamp": "2026-01-01T00:00:00Z",
                "context": {"id": "r-1"}
            })
        );
    }

    #[test]
    fn test_nested_value_entries() {
        let update: DataModelUpdate = serde_json::from_value(json!({
            "contents": [
                {"key": "user", "valueMap": [
                    {"key": "name", "valueString": "Ada"},
                    {"key": "admin", "valueBoolean": true}
                ]},
                {"key": "count", "valueNumber": 3}
            ]
        }))
        .unwrap();
        let user = update.contents[0].value_map.as_ref().unwrap();
        assert_eq!(user[1].value_boolean, Some(true));
        assert_eq!(update.contents[1].value_number, Some(3.0));
    }
}
