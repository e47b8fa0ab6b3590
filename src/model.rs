//! Data model store
//!
//! Per-surface hierarchical value store. The root is always a JSON object;
//! inbound `dataModelUpdate` payloads are merged in key-by-key, never
//! wholesale-replacing the model, so partial updates from successive messages
//! accumulate.

use serde_json::Value;

use crate::errors::{Diagnostic, PointerError};
use crate::pointer;
use crate::protocol::ValueEntry;

/// A surface's hierarchical data model.
#[derive(Debug, Clone, PartialEq)]
pub struct DataModel {
    root: Value,
}

impl Default for DataModel {
    fn default() -> Self {
        Self::new()
    }
}

impl DataModel {
    pub fn new() -> Self {
        Self {
            root: Value::Object(serde_json::Map::new()),
        }
    }

    /// Read-only view of the whole model.
    pub fn root(&self) -> &Value {
        &self.root
    }

    /// True until the first merge or write lands.
    pub fn is_empty(&self) -> bool {
        matches!(&self.root, Value::Object(map) if map.is_empty())
    }

    /// Resolve an absolute pointer. Missing paths are `None`, not errors.
    pub fn get(&self, pointer: &str) -> Result<Option<&Value>, PointerError> {
        pointer::resolve(&self.root, pointer)
    }

    /// Write a value at an absolute pointer, creating intermediates.
    pub fn set(&mut self, pointer: &str, value: Value) -> Result<(), PointerError> {
        pointer::set(&mut self.root, pointer, value)
    }

    /// Remove the value at an absolute pointer.
    pub fn remove(&mut self, pointer: &str) -> Result<bool, PointerError> {
        pointer::remove(&mut self.root, pointer)
    }

    /// Merge a `dataModelUpdate` payload at `base_path` (default: root).
    ///
    /// Each entry sets its key under the merge point; `valueMap` entries with
    /// non-numeric keys recurse so sibling keys already in the model survive.
    /// A `valueMap` whose keys form a dense zero-based index sequence is a
    /// sequence on the wire: it is stored as an array, replacing whatever the
    /// path held before. Entry keys are literal map keys and are
    /// pointer-escaped before joining.
    pub fn merge(
        &mut self,
        base_path: Option<&str>,
        entries: &[ValueEntry],
        diagnostics: &mut Vec<Diagnostic>,
    ) {
        let base = base_path.unwrap_or("").trim_end_matches('/').to_string();
        self.merge_entries(&base, entries, diagnostics);
    }

    fn merge_entries(&mut self, base: &str, entries: &[ValueEntry], diagnostics: &mut Vec<Diagnostic>) {
        for entry in entries {
            let target = format!("{}/{}", base, pointer::escape(&entry.key));
            match entry_value(entry, diagnostics) {
                EntryValue::Map(nested) => match classify_map(&nested) {
                    MapShape::Array(ordered) => {
                        let items = ordered
                            .into_iter()
                            .map(|item| entry_to_value(item, diagnostics))
                            .collect();
                        if let Err(err) = self.set(&target, Value::Array(items)) {
                            diagnostics.push(Diagnostic::DataUpdateFailed(err));
                        }
                    }
                    MapShape::Sparse => {
                        diagnostics.push(Diagnostic::SparseArrayIndices {
                            path: target.clone(),
                        });
                        self.merge_as_object(&target, &nested, diagnostics);
                    }
                    MapShape::Object => self.merge_as_object(&target, &nested, diagnostics),
                },
                EntryValue::Scalar(value) => {
                    if let Err(err) = self.set(&target, value) {
                        diagnostics.push(Diagnostic::DataUpdateFailed(err));
                    }
                }
            }
        }
    }

    /// Replace any non-object at the merge point, then recurse so existing
    /// keys under it are preserved.
    fn merge_as_object(
        &mut self,
        target: &str,
        entries: &[ValueEntry],
        diagnostics: &mut Vec<Diagnostic>,
    ) {
        if !matches!(self.get(target), Ok(Some(Value::Object(_)))) {
            if let Err(err) = self.set(target, Value::Object(serde_json::Map::new())) {
                diagnostics.push(Diagnostic::DataUpdateFailed(err));
                return;
            }
        }
        self.merge_entries(target, entries, diagnostics);
    }
}

enum EntryValue {
    Scalar(Value),
    Map(Vec<ValueEntry>),
}

enum MapShape<'a> {
    /// Dense zero-based numeric keys, returned in index order
    Array(Vec<&'a ValueEntry>),
    /// All-numeric keys that skip or repeat indices
    Sparse,
    Object,
}

fn classify_map(entries: &[ValueEntry]) -> MapShape<'_> {
    if entries.is_empty() {
        return MapShape::Object;
    }
    let mut indexed = Vec::with_capacity(entries.len());
    for entry in entries {
        match pointer::parse_index(&entry.key) {
            Some(index) => indexed.push((index, entry)),
            None => return MapShape::Object,
        }
    }
    indexed.sort_by_key(|(index, _)| *index);
    if indexed.iter().enumerate().all(|(pos, (index, _))| pos == *index) {
        MapShape::Array(indexed.into_iter().map(|(_, entry)| entry).collect())
    } else {
        MapShape::Sparse
    }
}

/// Pick the entry's value, tolerating exactly-one violations by taking the
/// first present field in declaration order.
fn entry_value(entry: &ValueEntry, diagnostics: &mut Vec<Diagnostic>) -> EntryValue {
    let present = [
        entry.value_string.is_some(),
        entry.value_number.is_some(),
        entry.value_boolean.is_some(),
        entry.value_map.is_some(),
    ]
    .iter()
    .filter(|p| **p)
    .count();

    if present != 1 {
        diagnostics.push(Diagnostic::MalformedValueEntry {
            key: entry.key.clone(),
            reason: if present == 0 {
                "no value field present".to_string()
            } else {
                format!("{present} value fields present")
            },
        });
    }

    if let Some(s) = &entry.value_string {
        EntryValue::Scalar(Value::String(s.clone()))
    } else if let Some(n) = entry.value_number {
        EntryValue::Scalar(
            serde_json::Number::from_f64(n)
                .map(Value::Number)
                .unwrap_or(Value::Null),
        )
    } else if let Some(b) = entry.value_boolean {
        EntryValue::Scalar(Value::Bool(b))
    } else if let Some(map) = &entry.value_map {
        EntryValue::Map(map.clone())
    } else {
        EntryValue::Scalar(Value::Null)
    }
}

/// Build a standalone JSON value for an entry nested inside an array element.
fn entry_to_value(entry: &ValueEntry, diagnostics: &mut Vec<Diagnostic>) -> Value {
    match entry_value(entry, diagnostics) {
        EntryValue::Scalar(value) => value,
        EntryValue::Map(nested) => match classify_map(&nested) {
            MapShape::Array(ordered) => Value::Array(
                ordered
                    .into_iter()
                    .map(|item| entry_to_value(item, diagnostics))
                    .collect(),
            ),
            shape => {
                if matches!(shape, MapShape::Sparse) {
                    diagnostics.push(Diagnostic::SparseArrayIndices {
                        path: entry.key.clone(),
                    });
                }
                let mut map = serde_json::Map::new();
                for item in &nested {
                    map.insert(item.key.clone(), entry_to_value(item, diagnostics));
                }
                Value::Object(map)
            }
        },
    }
}
