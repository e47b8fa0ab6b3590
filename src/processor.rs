//! Surface coordinator
//!
//! The top-level façade: applies batches of inbound protocol messages to the
//! per-surface registries and data models, re-resolves each touched surface
//! once per batch, and exposes the resulting surfaces plus scoped data access
//! and action dispatch to the host binding.
//!
//! Construct one `UiProcessor` per surface-owning consumer and pass it
//! explicitly; there is no process-wide default instance.

use std::collections::{BTreeSet, HashMap};

use serde_json::Value;

use crate::dispatch;
use crate::errors::{Diagnostic, PointerError};
use crate::pointer;
use crate::protocol::{Action, BoundValue, ServerMessage, UserActionMessage};
use crate::resolver::{primitives, ResolvedNode};
use crate::surface::Surface;

/// Surface id used by messages that do not name one.
pub const DEFAULT_SURFACE_ID: &str = "@default";

/// The protocol/data-binding state machine.
#[derive(Debug, Default)]
pub struct UiProcessor {
    surfaces: HashMap<String, Surface>,
    diagnostics: Vec<Diagnostic>,
}

impl UiProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a batch of inbound messages in order, then re-resolve every
    /// surface the batch touched (once per surface, not once per message).
    pub fn process_messages(&mut self, messages: &[ServerMessage]) {
        let mut touched: BTreeSet<String> = BTreeSet::new();
        let mut diagnostics = Vec::new();

        for message in messages {
            let surface_id = message
                .surface_id()
                .unwrap_or(DEFAULT_SURFACE_ID)
                .to_string();
            match message {
                ServerMessage::BeginRendering(msg) => {
                    self.surface_entry(&surface_id)
                        .begin_rendering(&msg.root, &msg.styles);
                    touched.insert(surface_id);
                }
                ServerMessage::SurfaceUpdate(msg) => {
                    let surface = self.surface_entry(&surface_id);
                    for component in &msg.components {
                        surface.upsert_component(component.clone());
                    }
                    touched.insert(surface_id);
                }
                ServerMessage::DataModelUpdate(msg) => {
                    self.surface_entry(&surface_id).data_model_mut().merge(
                        msg.path.as_deref(),
                        &msg.contents,
                        &mut diagnostics,
                    );
                    touched.insert(surface_id);
                }
                ServerMessage::DeleteSurface(_) => {
                    self.surfaces.remove(&surface_id);
                    touched.remove(&surface_id);
                }
            }
        }

        for surface_id in &touched {
            if let Some(surface) = self.surfaces.get_mut(surface_id) {
                surface.rebuild(&mut diagnostics);
            }
        }

        self.record(diagnostics);
    }

    pub fn get_surface(&self, surface_id: &str) -> Option<&Surface> {
        self.surfaces.get(surface_id)
    }

    /// Ids of all live surfaces, in stable (sorted) order.
    pub fn surface_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.surfaces.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    pub fn surfaces(&self) -> impl Iterator<Item = &Surface> {
        self.surfaces.values()
    }

    /// Host-driven reset, e.g. when a new request cycle supersedes in-flight
    /// state.
    pub fn clear_surfaces(&mut self) {
        self.surfaces.clear();
    }

    /// Resolve a bound scalar/array value against a surface's data model,
    /// scoped by `node`'s data context.
    pub fn resolve_primitive(
        &mut self,
        value: &BoundValue,
        node: &ResolvedNode,
        surface_id: &str,
    ) -> Value {
        let mut diagnostics = Vec::new();
        let resolved = match self.surfaces.get(surface_id) {
            Some(surface) => primitives::resolve_primitive(
                value,
                &node.data_context_path,
                surface.data_model().root(),
                &mut diagnostics,
            ),
            None => Value::Null,
        };
        self.record(diagnostics);
        resolved
    }

    /// Read the data model at a path relative to `node`'s data context.
    pub fn get_data(
        &self,
        node: &ResolvedNode,
        relative_path: &str,
        surface_id: &str,
    ) -> Option<Value> {
        let surface = self.surfaces.get(surface_id)?;
        let absolute = pointer::join(&node.data_context_path, relative_path);
        pointer::resolve(surface.data_model().root(), &absolute)
            .ok()
            .flatten()
            .cloned()
    }

    /// Write the data model at a path relative to `node`'s data context.
    /// Used by host bindings for input widgets; does not trigger a rebuild
    /// (bound values are resolved lazily).
    pub fn set_data(
        &mut self,
        node: &ResolvedNode,
        relative_path: &str,
        value: Value,
        surface_id: &str,
    ) -> Result<(), PointerError> {
        let absolute = pointer::join(&node.data_context_path, relative_path);
        self.surface_entry(surface_id)
            .data_model_mut()
            .set(&absolute, value)
    }

    /// Build the outbound message for a user interaction on `source_node`.
    pub fn dispatch_action(
        &mut self,
        action: &Action,
        source_node: &ResolvedNode,
        surface_id: &str,
    ) -> UserActionMessage {
        let mut diagnostics = Vec::new();
        let empty = Value::Object(serde_json::Map::new());
        let data = self
            .surfaces
            .get(surface_id)
            .map(|s| s.data_model().root())
            .unwrap_or(&empty);
        let message =
            dispatch::build_user_action(action, source_node, surface_id, data, &mut diagnostics);
        self.record(diagnostics);
        message
    }

    /// Take all diagnostics recorded since the last drain.
    pub fn drain_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    fn surface_entry(&mut self, surface_id: &str) -> &mut Surface {
        self.surfaces
            .entry(surface_id.to_string())
            .or_insert_with(|| Surface::new(surface_id))
    }

    fn record(&mut self, diagnostics: Vec<Diagnostic>) {
        for diagnostic in diagnostics {
            tracing::warn!(%diagnostic, "recoverable processing problem");
            self.diagnostics.push(diagnostic);
        }
    }
}
