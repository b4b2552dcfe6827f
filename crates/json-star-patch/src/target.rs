//! Uniform key access over the two kinds of patchable containers.
//!
//! Objects are addressed by field name. Arrays are addressed by the identity
//! field (`"_"`) of their object elements; elements without a string
//! identity cannot be reached by a patch.

use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::types::IDENTITY_KEY;

pub(crate) trait PointerTarget {
    /// Whether a bare literal may be assigned to a key.
    const ACCEPTS_LITERALS: bool;

    fn has(&self, key: &str) -> bool;

    fn get_mut(&mut self, key: &str) -> Option<&mut Value>;

    fn remove(&mut self, key: &str) -> Option<Value>;

    /// Whether `value` may be stored under a key by [`PointerTarget::set`].
    fn accepts(&self, value: &Value) -> bool;

    fn set(&mut self, key: &str, value: Value);
}

// ── Object ────────────────────────────────────────────────────────────────

pub(crate) struct ObjectTarget<'a> {
    map: &'a mut Map<String, Value>,
}

impl<'a> ObjectTarget<'a> {
    pub(crate) fn new(map: &'a mut Map<String, Value>) -> Self {
        Self { map }
    }
}

impl PointerTarget for ObjectTarget<'_> {
    const ACCEPTS_LITERALS: bool = true;

    fn has(&self, key: &str) -> bool {
        self.map.contains_key(key)
    }

    fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.map.get_mut(key)
    }

    fn remove(&mut self, key: &str) -> Option<Value> {
        self.map.shift_remove(key)
    }

    fn accepts(&self, _value: &Value) -> bool {
        true
    }

    fn set(&mut self, key: &str, value: Value) {
        self.map.insert(key.to_owned(), value);
    }
}

// ── Array by identity ─────────────────────────────────────────────────────

/// Returns the identity of an array element, if it has one.
pub(crate) fn identity_of(item: &Value) -> Option<&str> {
    item.as_object()?.get(IDENTITY_KEY)?.as_str()
}

pub(crate) struct ArrayByIdentityTarget<'a> {
    items: &'a mut Vec<Value>,
    /// Identity to position. On duplicate identities the last element wins.
    index: HashMap<String, usize>,
}

impl<'a> ArrayByIdentityTarget<'a> {
    pub(crate) fn new(items: &'a mut Vec<Value>) -> Self {
        let index = items
            .iter()
            .enumerate()
            .filter_map(|(pos, item)| identity_of(item).map(|id| (id.to_owned(), pos)))
            .collect();
        Self { items, index }
    }
}

impl PointerTarget for ArrayByIdentityTarget<'_> {
    const ACCEPTS_LITERALS: bool = false;

    fn has(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        let pos = *self.index.get(key)?;
        self.items.get_mut(pos)
    }

    fn remove(&mut self, key: &str) -> Option<Value> {
        let pos = self.index.remove(key)?;
        for other in self.index.values_mut() {
            if *other > pos {
                *other -= 1;
            }
        }
        Some(self.items.remove(pos))
    }

    fn accepts(&self, value: &Value) -> bool {
        value.is_object()
    }

    /// Replaces the element in place, or appends it for a new identity. The
    /// stored object always carries `key` as its identity.
    fn set(&mut self, key: &str, value: Value) {
        let value = match value {
            Value::Object(mut map) => {
                if identity_of_map(&map) != Some(key) {
                    map.insert(IDENTITY_KEY.to_owned(), Value::String(key.to_owned()));
                }
                Value::Object(map)
            }
            other => other,
        };
        match self.index.get(key) {
            Some(&pos) => self.items[pos] = value,
            None => {
                self.index.insert(key.to_owned(), self.items.len());
                self.items.push(value);
            }
        }
    }
}

fn identity_of_map(map: &Map<String, Value>) -> Option<&str> {
    map.get(IDENTITY_KEY)?.as_str()
}
