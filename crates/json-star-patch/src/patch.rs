//! The decoded patch document.
//!
//! On the wire a patch is a plain JSON object whose entries are told apart by
//! shape: a non-object is an assignment, `{"*": null}` a delete, `{"*": v}` a
//! wholesale replace and any other object a nested edit. [`PatchEntry`] makes
//! that distinction once, when the patch is decoded.

use indexmap::IndexMap;
use serde_json::Value;

/// One instruction of a patch.
#[derive(Debug, Clone, PartialEq)]
pub enum PatchEntry {
    /// Set the field to exactly this value. Not allowed on array targets.
    Literal(Value),
    /// Recurse into the existing value with a nested patch.
    Edit(Patch),
    /// Replace the field or array element wholesale (`{"*": value}`).
    Replace(Value),
    /// Remove the field or array element (`{"*": null}`).
    Delete,
}

impl PatchEntry {
    /// Assignment of `value`.
    ///
    /// A bare object on the wire always means a nested edit, so object values
    /// become [`PatchEntry::Replace`] instead. On object targets both assign.
    pub fn literal(value: Value) -> Self {
        if value.is_object() {
            PatchEntry::Replace(value)
        } else {
            PatchEntry::Literal(value)
        }
    }

    /// Wholesale replacement; a `null` replacement is a delete.
    pub fn replace(value: Value) -> Self {
        if value.is_null() {
            PatchEntry::Delete
        } else {
            PatchEntry::Replace(value)
        }
    }

    pub fn is_edit(&self) -> bool {
        matches!(self, PatchEntry::Edit(_))
    }
}

/// A patch document: ordered instructions keyed by object field or array
/// element identity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Patch {
    entries: IndexMap<String, PatchEntry>,
}

impl Patch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: IndexMap::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&PatchEntry> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Inserts an entry. An existing key keeps its position.
    pub fn insert(&mut self, key: impl Into<String>, entry: PatchEntry) -> Option<PatchEntry> {
        self.entries.insert(key.into(), entry)
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, PatchEntry> {
        self.entries.iter()
    }

    pub fn keys(&self) -> indexmap::map::Keys<'_, String, PatchEntry> {
        self.entries.keys()
    }

    /// Nesting depth of edits: a patch without [`PatchEntry::Edit`] entries
    /// has depth 1. Replace and literal payloads are not counted.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(self, 1)];
        while let Some((patch, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            for entry in patch.entries.values() {
                if let PatchEntry::Edit(sub) = entry {
                    stack.push((sub, depth + 1));
                }
            }
        }
        deepest
    }

    // ── Builder ───────────────────────────────────────────────────────────

    /// Assigns `value` to `key`, see [`PatchEntry::literal`].
    pub fn set(mut self, key: impl Into<String>, value: Value) -> Self {
        self.insert(key, PatchEntry::literal(value));
        self
    }

    pub fn edit(mut self, key: impl Into<String>, patch: Patch) -> Self {
        self.insert(key, PatchEntry::Edit(patch));
        self
    }

    pub fn replace(mut self, key: impl Into<String>, value: Value) -> Self {
        self.insert(key, PatchEntry::replace(value));
        self
    }

    pub fn delete(mut self, key: impl Into<String>) -> Self {
        self.insert(key, PatchEntry::Delete);
        self
    }
}

impl FromIterator<(String, PatchEntry)> for Patch {
    fn from_iter<I: IntoIterator<Item = (String, PatchEntry)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Patch {
    type Item = (&'a String, &'a PatchEntry);
    type IntoIter = indexmap::map::Iter<'a, String, PatchEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl IntoIterator for Patch {
    type Item = (String, PatchEntry);
    type IntoIter = indexmap::map::IntoIter<String, PatchEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
