//! Protocol wire types
//!
//! Serde definitions for the message stream exchanged with the backend agent.
//! Inbound messages describe surfaces, flat component lists, and data model
//! updates; the single outbound message reports a user action.
//!
//! All field names are camelCase on the wire.

mod components;
mod messages;

pub use components::{
    Action, ActionContext, ActionContextEntry, BoundValue, ComponentArrayReference, ComponentBody,
    ListTemplate, RawComponent, Weight,
};
pub use messages::{
    BeginRendering, DataModelUpdate, DeleteSurface, ServerMessage, SurfaceUpdate,
    UserActionMessage, ValueEntry,
};
