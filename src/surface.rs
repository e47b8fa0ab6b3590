//! Surface state
//!
//! A surface is the unit of independent UI state: its own flat component
//! registry, data model, styles, root id, and cached resolved tree. Surfaces
//! are created implicitly by the first message that references them and
//! destroyed only by an explicit delete (or the host clearing everything).

use std::collections::HashMap;

use serde_json::Value;

use crate::errors::Diagnostic;
use crate::model::DataModel;
use crate::protocol::RawComponent;
use crate::resolver::{self, ResolvedNode};

/// Lifecycle phase of a surface, computed from its contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfacePhase {
    /// Nothing received yet
    Empty,
    /// Has components and/or data but no renderable root
    Populating,
    /// Root declared and resolved to a non-null tree
    Renderable,
}

/// Per-surface UI state.
#[derive(Debug, Clone, Default)]
pub struct Surface {
    id: String,
    root_component_id: Option<String>,
    styles: serde_json::Map<String, Value>,
    components: HashMap<String, RawComponent>,
    data_model: DataModel,
    resolved_tree: Option<ResolvedNode>,
}

impl Surface {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn root_component_id(&self) -> Option<&str> {
        self.root_component_id.as_deref()
    }

    /// Opaque style map, passed through to the host untouched.
    pub fn styles(&self) -> &serde_json::Map<String, Value> {
        &self.styles
    }

    pub fn components(&self) -> &HashMap<String, RawComponent> {
        &self.components
    }

    pub fn data_model(&self) -> &DataModel {
        &self.data_model
    }

    pub fn data_model_mut(&mut self) -> &mut DataModel {
        &mut self.data_model
    }

    /// The cached tree from the last resolution; `None` until a root
    /// resolves.
    pub fn resolved_tree(&self) -> Option<&ResolvedNode> {
        self.resolved_tree.as_ref()
    }

    pub fn phase(&self) -> SurfacePhase {
        if self.resolved_tree.is_some() {
            SurfacePhase::Renderable
        } else if self.root_component_id.is_some()
            || !self.components.is_empty()
            || !self.data_model.is_empty()
        {
            SurfacePhase::Populating
        } else {
            SurfacePhase::Empty
        }
    }

    /// Set the root id and merge styles key-by-key (later values win).
    pub(crate) fn begin_rendering(
        &mut self,
        root: &str,
        styles: &serde_json::Map<String, Value>,
    ) {
        self.root_component_id = Some(root.to_string());
        for (key, value) in styles {
            self.styles.insert(key.clone(), value.clone());
        }
    }

    /// Full replace of one component definition; no partial patching.
    pub(crate) fn upsert_component(&mut self, component: RawComponent) {
        self.components.insert(component.id.clone(), component);
    }

    /// Recompute the resolved tree from scratch.
    pub(crate) fn rebuild(&mut self, diagnostics: &mut Vec<Diagnostic>) {
        self.resolved_tree = resolver::resolve_tree(
            self.root_component_id.as_deref(),
            &self.components,
            self.data_model.root(),
            diagnostics,
        );
    }
}
