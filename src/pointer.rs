//! Pointer engine
//!
//! RFC 6901-style pointer resolution and mutation over `serde_json::Value`,
//! plus the relative-path composition used for data-context scoping. Pure and
//! stateless; all surface-specific state lives in the data model store.
//!
//! `resolve` never fails on missing data - it returns `None` for any path that
//! does not lead to a value. Only a malformed pointer string (or an attempt to
//! write through a scalar) is an error.

use serde_json::Value;

use crate::errors::PointerError;

/// The append sentinel, valid only as the final token of a `set`.
const APPEND_TOKEN: &str = "-";

/// Compile a pointer into its unescaped reference tokens.
///
/// `""` is the root pointer and compiles to no tokens. Any other pointer must
/// start with `/`. Escapes are applied per RFC 6901: `~1` then `~0`.
pub fn compile(pointer: &str) -> Result<Vec<String>, PointerError> {
    if pointer.is_empty() {
        return Ok(Vec::new());
    }
    if !pointer.starts_with('/') {
        return Err(PointerError::syntax(pointer, "must start with '/'"));
    }
    Ok(pointer.split('/').skip(1).map(unescape).collect())
}

/// Escape a single reference token for embedding in a pointer string.
pub fn escape(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}

fn unescape(token: &str) -> String {
    token.replace("~1", "/").replace("~0", "~")
}

/// Parse an array index token: a non-negative decimal integer with no leading
/// zeros (except `"0"` itself).
pub(crate) fn parse_index(token: &str) -> Option<usize> {
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if token.len() > 1 && token.starts_with('0') {
        return None;
    }
    token.parse().ok()
}

/// Resolve a pointer against a root value.
///
/// Returns `None` when traversal hits a missing key, a non-container value,
/// or an invalid/out-of-range array index. Errors only on malformed syntax.
pub fn resolve<'a>(root: &'a Value, pointer: &str) -> Result<Option<&'a Value>, PointerError> {
    let tokens = compile(pointer)?;
    let mut current = root;
    for token in &tokens {
        match current {
            Value::Object(map) => match map.get(token) {
                Some(next) => current = next,
                None => return Ok(None),
            },
            Value::Array(items) => match parse_index(token).and_then(|i| items.get(i)) {
                Some(next) => current = next,
                None => return Ok(None),
            },
            _ => return Ok(None),
        }
    }
    Ok(Some(current))
}

/// Set `value` at the location named by `pointer`, creating missing
/// intermediate containers as objects.
///
/// The final token may be `-` to append to an array. Writing through an
/// existing scalar is a [`PointerError::Type`].
pub fn set(root: &mut Value, pointer: &str, value: Value) -> Result<(), PointerError> {
    let mut tokens = compile(pointer)?;
    let last = match tokens.pop() {
        Some(last) => last,
        None => return Err(PointerError::syntax(pointer, "cannot set the root value")),
    };

    let mut current = root;
    for token in &tokens {
        current = match current {
            Value::Object(map) => map
                .entry(token.clone())
                .or_insert_with(|| Value::Object(Default::default())),
            Value::Array(items) => {
                if token == APPEND_TOKEN {
                    return Err(PointerError::syntax(
                        pointer,
                        "'-' is only valid as the final token",
                    ));
                }
                let index = parse_index(token)
                    .filter(|i| *i < items.len())
                    .ok_or_else(|| PointerError::type_error(pointer, token))?;
                &mut items[index]
            }
            _ => return Err(PointerError::type_error(pointer, token)),
        };
    }

    match current {
        Value::Object(map) => {
            map.insert(last, value);
            Ok(())
        }
        Value::Array(items) => {
            if last == APPEND_TOKEN {
                items.push(value);
                return Ok(());
            }
            match parse_index(&last) {
                Some(index) if index < items.len() => {
                    items[index] = value;
                    Ok(())
                }
                Some(index) if index == items.len() => {
                    items.push(value);
                    Ok(())
                }
                _ => Err(PointerError::type_error(pointer, &last)),
            }
        }
        _ => Err(PointerError::type_error(pointer, &last)),
    }
}

/// Remove the value at `pointer`. Returns `false` (not an error) when the
/// target path does not exist. Traversing a scalar is a [`PointerError::Type`].
pub fn remove(root: &mut Value, pointer: &str) -> Result<bool, PointerError> {
    let mut tokens = compile(pointer)?;
    let last = match tokens.pop() {
        Some(last) => last,
        None => return Err(PointerError::syntax(pointer, "cannot remove the root value")),
    };

    let mut current = root;
    for token in &tokens {
        current = match current {
            Value::Object(map) => match map.get_mut(token) {
                Some(next) => next,
                None => return Ok(false),
            },
            Value::Array(items) => {
                let len = items.len();
                match parse_index(token).filter(|i| *i < len) {
                    Some(index) => &mut items[index],
                    None => return Ok(false),
                }
            }
            _ => return Err(PointerError::type_error(pointer, token)),
        };
    }

    match current {
        Value::Object(map) => Ok(map.remove(&last).is_some()),
        Value::Array(items) => match parse_index(&last) {
            Some(index) if index < items.len() => {
                items.remove(index);
                Ok(true)
            }
            _ => Ok(false),
        },
        _ => Err(PointerError::type_error(pointer, &last)),
    }
}

/// Join a possibly-relative path onto a data-context prefix.
///
/// Absolute paths (leading `/`) pass through unchanged. `""` and `"."` mean
/// "the context itself". Relative paths are appended to the context with a
/// single separating slash. Trailing slashes on the context are trimmed, so a
/// root context of `"/"` or `""` always yields a pointer `resolve` accepts
/// (`join("/", ".")` is `""`, the root pointer, not `"/"`, the empty key).
pub fn join(context: &str, path: &str) -> String {
    if path.starts_with('/') {
        return path.to_string();
    }
    let base = context.trim_end_matches('/');
    if path.is_empty() || path == "." {
        return base.to_string();
    }
    format!("{}/{}", base, path)
}
