//! Bound-value resolution
//!
//! Resolves a single literal-or-path descriptor against a data model,
//! honoring the owning node's data-context scope. Intentionally stateless and
//! never cached: it is re-evaluated whenever the host re-reads a property, so
//! a pure data update refreshes rendered values without a tree rebuild.

use serde_json::Value;

use crate::errors::Diagnostic;
use crate::pointer;
use crate::protocol::BoundValue;

/// Resolve a bound value to a scalar (or `Value::Null`).
///
/// A descriptor declaring both a literal and a path, or nothing at all, is an
/// `AmbiguousBoundValue` diagnostic and resolves to null; this never panics
/// or errors toward the renderer.
pub fn resolve_primitive(
    value: &BoundValue,
    data_context_path: &str,
    data: &Value,
    diagnostics: &mut Vec<Diagnostic>,
) -> Value {
    match value.declared_count() {
        1 => {}
        0 => {
            diagnostics.push(Diagnostic::AmbiguousBoundValue {
                reason: "neither literal nor path declared".to_string(),
            });
            return Value::Null;
        }
        n => {
            diagnostics.push(Diagnostic::AmbiguousBoundValue {
                reason: format!("{n} branches declared"),
            });
            return Value::Null;
        }
    }

    if let Some(s) = &value.literal_string {
        return Value::String(s.clone());
    }
    if let Some(n) = value.literal_number {
        return serde_json::Number::from_f64(n)
            .map(Value::Number)
            .unwrap_or(Value::Null);
    }
    if let Some(b) = value.literal_boolean {
        return Value::Bool(b);
    }

    // declared_count() == 1 guarantees the path branch here
    let path = value.path.as_deref().unwrap_or_default();
    let absolute = pointer::join(data_context_path, path);
    // The joined pointer is always absolute, so resolve cannot hit a syntax
    // error; missing data is simply null.
    pointer::resolve(data, &absolute)
        .ok()
        .flatten()
        .cloned()
        .unwrap_or(Value::Null)
}
