//! Conversion between [`Patch`] and its JSON form.

use serde_json::{Map, Value};

use crate::patch::{Patch, PatchEntry};
use crate::types::{PatchError, PatchOptions, REPLACE_KEY};

// ── Decoding ──────────────────────────────────────────────────────────────

/// Decode a patch with default options.
pub fn from_json(value: &Value) -> Result<Patch, PatchError> {
    from_json_with(value, &PatchOptions::default())
}

/// Decode a patch, rejecting non-objects and anything nested deeper than
/// `options.max_depth` (replace payloads and literals included).
pub fn from_json_with(value: &Value, options: &PatchOptions) -> Result<Patch, PatchError> {
    let map = value.as_object().ok_or(PatchError::InvalidPatch)?;
    check_depth(value, options.max_depth)?;
    Ok(decode_map(map))
}

/// Decode an object whose depth is already known to be bounded.
fn decode_map(map: &Map<String, Value>) -> Patch {
    map.iter()
        .map(|(key, value)| (key.clone(), decode_entry(value)))
        .collect()
}

fn decode_entry(value: &Value) -> PatchEntry {
    match value {
        // Keys next to "*" are ignored.
        Value::Object(map) => match map.get(REPLACE_KEY) {
            Some(Value::Null) => PatchEntry::Delete,
            Some(replacement) => PatchEntry::Replace(replacement.clone()),
            None => PatchEntry::Edit(decode_map(map)),
        },
        other => PatchEntry::Literal(other.clone()),
    }
}

/// Fails if `value` holds containers nested deeper than `limit`.
///
/// Iterative, so hostile input cannot overflow the stack here.
fn check_depth(value: &Value, limit: usize) -> Result<(), PatchError> {
    let mut stack: Vec<(&Value, usize)> = vec![(value, 1)];
    while let Some((node, depth)) = stack.pop() {
        if !(node.is_object() || node.is_array()) {
            continue;
        }
        if depth > limit {
            return Err(PatchError::DepthExceeded { limit });
        }
        match node {
            Value::Object(map) => stack.extend(map.values().map(|child| (child, depth + 1))),
            Value::Array(items) => stack.extend(items.iter().map(|child| (child, depth + 1))),
            _ => {}
        }
    }
    Ok(())
}

// ── Encoding ──────────────────────────────────────────────────────────────

/// Encode a patch back to its JSON form.
pub fn to_json(patch: &Patch) -> Value {
    let map: Map<String, Value> = patch
        .iter()
        .map(|(key, entry)| (key.clone(), encode_entry(entry)))
        .collect();
    Value::Object(map)
}

fn encode_entry(entry: &PatchEntry) -> Value {
    match entry {
        // A bare object would read back as an edit.
        PatchEntry::Literal(value) if value.is_object() => wrap(value.clone()),
        PatchEntry::Literal(value) => value.clone(),
        PatchEntry::Edit(patch) => to_json(patch),
        PatchEntry::Replace(value) => wrap(value.clone()),
        PatchEntry::Delete => wrap(Value::Null),
    }
}

fn wrap(value: Value) -> Value {
    let mut map = Map::new();
    map.insert(REPLACE_KEY.to_string(), value);
    Value::Object(map)
}

// ── Conversions ───────────────────────────────────────────────────────────

impl Patch {
    /// See [`from_json`].
    pub fn from_json(value: &Value) -> Result<Self, PatchError> {
        from_json(value)
    }

    /// See [`from_json_with`].
    pub fn from_json_with(value: &Value, options: &PatchOptions) -> Result<Self, PatchError> {
        from_json_with(value, options)
    }

    /// See [`to_json`].
    pub fn to_json(&self) -> Value {
        to_json(self)
    }
}

impl TryFrom<Value> for Patch {
    type Error = PatchError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        from_json(&value)
    }
}

impl TryFrom<&Value> for Patch {
    type Error = PatchError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        from_json(value)
    }
}

impl From<Patch> for Value {
    fn from(patch: Patch) -> Self {
        to_json(&patch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decode_entry_shapes() {
        let patch = from_json(&json!({
            "lit": 5,
            "nul": null,
            "arr": [1, {"*": null}],
            "del": {"*": null},
            "rep": {"*": {"d": 3}},
            "edit": {"d": 3},
        }))
        .unwrap();
        assert_eq!(patch.get("lit"), Some(&PatchEntry::Literal(json!(5))));
        assert_eq!(patch.get("nul"), Some(&PatchEntry::Literal(json!(null))));
        assert_eq!(patch.get("arr"), Some(&PatchEntry::Literal(json!([1, {"*": null}]))));
        assert_eq!(patch.get("del"), Some(&PatchEntry::Delete));
        assert_eq!(patch.get("rep"), Some(&PatchEntry::Replace(json!({"d": 3}))));
        assert_eq!(
            patch.get("edit"),
            Some(&PatchEntry::Edit(Patch::new().set("d", json!(3))))
        );
    }

    #[test]
    fn star_wins_over_sibling_keys() {
        let patch = from_json(&json!({"a": {"*": 1, "b": 2}})).unwrap();
        assert_eq!(patch.get("a"), Some(&PatchEntry::Replace(json!(1))));
        let patch = from_json(&json!({"a": {"b": 2, "*": null}})).unwrap();
        assert_eq!(patch.get("a"), Some(&PatchEntry::Delete));
    }

    #[test]
    fn rejects_non_object_patch() {
        assert_eq!(from_json(&json!([])), Err(PatchError::InvalidPatch));
        assert_eq!(from_json(&json!(null)), Err(PatchError::InvalidPatch));
        assert_eq!(Patch::try_from(json!("x")), Err(PatchError::InvalidPatch));
    }

    #[test]
    fn depth_limit() {
        let value = json!({"a": {"b": {"c": 1}}});
        let options = PatchOptions::default().with_max_depth(3);
        assert!(from_json_with(&value, &options).is_ok());
        let options = PatchOptions::default().with_max_depth(2);
        assert_eq!(
            from_json_with(&value, &options),
            Err(PatchError::DepthExceeded { limit: 2 })
        );
    }

    #[test]
    fn depth_limit_covers_payloads() {
        let value = json!({"a": {"*": {"b": [[1]]}}});
        let options = PatchOptions::default().with_max_depth(4);
        assert_eq!(
            from_json_with(&value, &options),
            Err(PatchError::DepthExceeded { limit: 4 })
        );
        let options = PatchOptions::default().with_max_depth(5);
        assert!(from_json_with(&value, &options).is_ok());
    }

    #[test]
    fn encode_matches_wire_form() {
        let wire = json!({
            "b": 7,
            "c": {"d": 3, "e": {"*": null}},
            "f": {"*": {"g": 1}},
        });
        let patch = from_json(&wire).unwrap();
        assert_eq!(to_json(&patch), wire);
        assert_eq!(Value::from(patch), wire);
    }

    #[test]
    fn encode_object_literal_as_replace() {
        let patch = Patch::from_iter([("a".to_string(), PatchEntry::Literal(json!({"x": 1})))]);
        assert_eq!(to_json(&patch), json!({"a": {"*": {"x": 1}}}));
    }
}
