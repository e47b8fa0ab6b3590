//! weft: framework-agnostic processor for agent-driven declarative UIs
//!
//! A backend agent describes a user interface as a stream of small protocol
//! messages; this crate is the state machine that turns that stream into
//! something a host UI framework can render:
//! - accumulates flat, adjacency-list component definitions per surface
//! - maintains a per-surface hierarchical data model with partial merges
//! - resolves the flat definitions into a navigable tree, expanding list
//!   templates against live data
//! - resolves literal-or-path bound values with data-context scoping
//! - builds outbound user-action messages at dispatch time
//!
//! Host bindings supply a [`catalog::Catalog`] of renderers and re-render
//! from [`surface::Surface::resolved_tree`] after each processed batch; the
//! processor depends on no rendering technology and owns no transport.

pub mod catalog;
pub mod dispatch;
pub mod errors;
pub mod model;
pub mod pointer;
pub mod processor;
pub mod protocol;
pub mod resolver;
pub mod surface;

pub use catalog::Catalog;
pub use errors::{Diagnostic, PointerError};
pub use processor::{UiProcessor, DEFAULT_SURFACE_ID};
pub use protocol::{Action, BoundValue, RawComponent, ServerMessage, UserActionMessage};
pub use resolver::{ResolvedNode, ResolvedValue};
pub use surface::{Surface, SurfacePhase};
