//! Error and diagnostic taxonomy
//!
//! Two tiers: `PointerError` is fatal to the single pointer operation that
//! raised it and surfaces as a `Result` to the caller. `Diagnostic` covers
//! recoverable resolution problems - the offending reference or value is
//! dropped, the rest of the tree survives, and the diagnostic is recorded on
//! the processor for the host to inspect.

use thiserror::Error;

/// Errors raised by the pointer engine.
///
/// Pointer strings are constructed by the host or the transport, not authored
/// by the agent, so these are allowed to propagate as hard errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PointerError {
    /// Malformed pointer string (e.g. missing leading `/`)
    #[error("malformed pointer {pointer:?}: {reason}")]
    Syntax { pointer: String, reason: String },

    /// Attempted to navigate or write through a non-container value
    #[error("pointer {pointer:?} traverses a non-container value at {token:?}")]
    Type { pointer: String, token: String },
}

impl PointerError {
    pub(crate) fn syntax(pointer: &str, reason: impl Into<String>) -> Self {
        Self::Syntax {
            pointer: pointer.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn type_error(pointer: &str, token: &str) -> Self {
        Self::Type {
            pointer: pointer.to_string(),
            token: token.to_string(),
        }
    }
}

/// Recoverable problems found while processing messages or resolving a tree.
///
/// None of these abort resolution: the affected reference/value is omitted and
/// the surface renders with fewer nodes than intended.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Diagnostic {
    /// A child/list/template reference names a component id that does not exist
    #[error("component {referrer:?} references unknown component id {missing:?}")]
    UnresolvedReference { referrer: String, missing: String },

    /// A component reference would revisit an id already on the resolution path
    #[error("cyclic reference to component {id:?} dropped")]
    CyclicReference { id: String },

    /// A bound value declares both a literal and a path, or neither
    #[error("bound value is ambiguous ({reason}); resolved to null")]
    AmbiguousBoundValue { reason: String },

    /// A data model entry carries zero or multiple value fields
    #[error("data entry {key:?} is malformed: {reason}")]
    MalformedValueEntry { key: String, reason: String },

    /// A template's data binding resolved to something other than a sequence
    #[error("template binding {binding:?} did not resolve to an array; produced no instances")]
    TemplateBindingNotAList { binding: String },

    /// A value map used numeric string keys that do not form a dense
    /// zero-based sequence; it was stored as an object, not guessed into an
    /// array
    #[error("value map at {path:?} has sparse numeric keys; stored as an object")]
    SparseArrayIndices { path: String },

    /// A pointer operation failed while applying a data model update
    #[error("data model update skipped: {0}")]
    DataUpdateFailed(#[from] PointerError),
}
