//! Patch application.
//!
//! The patch and the document are walked in lock-step. Object fields are
//! addressed by name and array elements by identity (see [`crate::target`]).
//! Stale deletes and edits are anomalies: they are recorded, logged and
//! skipped. Everything else that does not fit the document is an error and
//! aborts the call.

use serde_json::Value;

use crate::codec::from_json_with;
use crate::patch::{Patch, PatchEntry};
use crate::target::{ArrayByIdentityTarget, ObjectTarget, PointerTarget};
use crate::types::{
    Anomaly, AnomalyKind, PatchError, PatchOptions, PatchResult, IDENTITY_KEY,
};
use crate::util::format_pointer;

// ── Public API ────────────────────────────────────────────────────────────

/// Apply `patch` to `doc` with default options.
pub fn apply_patch(doc: Value, patch: &Patch) -> Result<PatchResult, PatchError> {
    apply_patch_with(doc, patch, &PatchOptions::default())
}

/// Apply `patch` to `doc`, which must be an object or an array.
///
/// The document is modified in place and returned. Application is not
/// transactional: on error the partially patched document is dropped.
pub fn apply_patch_with(
    mut doc: Value,
    patch: &Patch,
    options: &PatchOptions,
) -> Result<PatchResult, PatchError> {
    let span = tracing::debug_span!("apply_patch", entries = patch.len(), strict = options.strict);
    let _guard = span.enter();

    let mut walker = Walker::new(options);
    walker.apply(&mut doc, patch)?;
    Ok(PatchResult {
        doc,
        anomalies: walker.anomalies,
    })
}

/// Decode `patch` from JSON and apply it with default options.
pub fn apply_json(doc: Value, patch: &Value) -> Result<PatchResult, PatchError> {
    apply_json_with(doc, patch, &PatchOptions::default())
}

pub fn apply_json_with(
    doc: Value,
    patch: &Value,
    options: &PatchOptions,
) -> Result<PatchResult, PatchError> {
    let patch = from_json_with(patch, options)?;
    apply_patch_with(doc, &patch, options)
}

// ── Walker ────────────────────────────────────────────────────────────────

struct Walker<'o> {
    options: &'o PatchOptions,
    /// Path of the entry being applied.
    path: Vec<String>,
    anomalies: Vec<Anomaly>,
}

impl<'o> Walker<'o> {
    fn new(options: &'o PatchOptions) -> Self {
        Self {
            options,
            path: Vec::new(),
            anomalies: Vec::new(),
        }
    }

    fn apply(&mut self, doc: &mut Value, patch: &Patch) -> Result<(), PatchError> {
        if self.path.len() >= self.options.max_depth {
            return Err(PatchError::DepthExceeded {
                limit: self.options.max_depth,
            });
        }
        match doc {
            Value::Object(map) => self.apply_entries(&mut ObjectTarget::new(map), patch),
            Value::Array(items) => {
                self.apply_entries(&mut ArrayByIdentityTarget::new(items), patch)
            }
            _ => Err(PatchError::InvalidTarget),
        }
    }

    fn apply_entries<T: PointerTarget>(
        &mut self,
        target: &mut T,
        patch: &Patch,
    ) -> Result<(), PatchError> {
        for (key, entry) in patch {
            if key == IDENTITY_KEY {
                continue;
            }
            self.path.push(key.clone());
            let result = self.apply_entry(target, key, entry);
            self.path.pop();
            result?;
        }
        Ok(())
    }

    fn apply_entry<T: PointerTarget>(
        &mut self,
        target: &mut T,
        key: &str,
        entry: &PatchEntry,
    ) -> Result<(), PatchError> {
        match entry {
            PatchEntry::Literal(value) => {
                if !T::ACCEPTS_LITERALS {
                    return Err(self.type_change());
                }
                target.set(key, value.clone());
            }
            PatchEntry::Delete => {
                if !target.has(key) {
                    return self.report(AnomalyKind::StaleDelete);
                }
                target.remove(key);
            }
            PatchEntry::Replace(value) => {
                if !target.accepts(value) {
                    return Err(self.type_change());
                }
                target.set(key, value.clone());
            }
            PatchEntry::Edit(sub) => {
                let Some(current) = target.get_mut(key) else {
                    return self.report(AnomalyKind::StaleEdit);
                };
                if !(current.is_object() || current.is_array()) {
                    return Err(PatchError::NonPatchableTarget {
                        path: format_pointer(&self.path),
                    });
                }
                self.apply(current, sub)?;
            }
        }
        Ok(())
    }

    fn type_change(&self) -> PatchError {
        PatchError::TypeChangeOnArray {
            path: format_pointer(&self.path),
        }
    }

    /// Records an anomaly at the current path, or fails in strict mode.
    fn report(&mut self, kind: AnomalyKind) -> Result<(), PatchError> {
        let anomaly = Anomaly {
            kind,
            path: format_pointer(&self.path),
        };
        if self.options.strict {
            return Err(PatchError::Anomaly(anomaly));
        }
        tracing::warn!(kind = %anomaly.kind, path = %anomaly.path, "{}", kind.message());
        self.anomalies.push(anomaly);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn patch(value: Value) -> Patch {
        Patch::from_json(&value).unwrap()
    }

    fn apply(doc: Value, p: Value) -> Result<PatchResult, PatchError> {
        apply_patch(doc, &patch(p))
    }

    #[test]
    fn literal_sets_field() {
        let res = apply(json!({"a": 1}), json!({"a": 2, "b": [1]})).unwrap();
        assert_eq!(res.doc, json!({"a": 2, "b": [1]}));
        assert!(res.is_clean());
    }

    #[test]
    fn null_literal_assigns_null() {
        let res = apply(json!({"a": 1, "b": 2}), json!({"a": null})).unwrap();
        assert_eq!(res.doc, json!({"a": null, "b": 2}));
    }

    #[test]
    fn delete_keeps_remaining_order() {
        let res = apply(json!({"a": 1, "b": 2, "c": 3}), json!({"a": {"*": null}})).unwrap();
        let keys: Vec<&String> = res.doc.as_object().unwrap().keys().collect();
        assert_eq!(keys, ["b", "c"]);
    }

    #[test]
    fn identity_key_is_skipped() {
        let res = apply(json!({"_": "keep", "a": 1}), json!({"_": "drop", "a": 2})).unwrap();
        assert_eq!(res.doc, json!({"_": "keep", "a": 2}));
    }

    #[test]
    fn replace_on_object_accepts_scalars() {
        let res = apply(json!({"a": {"b": 1}}), json!({"a": {"*": 5}})).unwrap();
        assert_eq!(res.doc, json!({"a": 5}));
    }

    #[test]
    fn replace_array_item_with_scalar_fails() {
        let err = apply(json!([{"_": "x"}]), json!({"x": {"*": 5}})).unwrap_err();
        assert_eq!(err, PatchError::TypeChangeOnArray { path: "/x".into() });
    }

    #[test]
    fn delete_array_item() {
        let res = apply(
            json!([{"_": "x"}, {"_": "y"}, {"_": "z"}]),
            json!({"x": {"*": null}, "z": {"n": 1}}),
        )
        .unwrap();
        assert_eq!(res.doc, json!([{"_": "y"}, {"_": "z", "n": 1}]));
    }

    #[test]
    fn stale_delete_on_array() {
        let res = apply(json!([{"_": "x"}]), json!({"q": {"*": null}})).unwrap();
        assert_eq!(res.doc, json!([{"_": "x"}]));
        assert_eq!(
            res.anomalies,
            vec![Anomaly { kind: AnomalyKind::StaleDelete, path: "/q".into() }]
        );
    }

    #[test]
    fn nested_error_path() {
        let err = apply(
            json!({"a": [{"_": "x", "b": {"c": 1}}]}),
            json!({"a": {"x": {"b": {"c": {"d": 1}}}}}),
        )
        .unwrap_err();
        assert_eq!(err, PatchError::NonPatchableTarget { path: "/a/x/b/c".into() });
    }

    #[test]
    fn edit_nested_array() {
        let res = apply(json!({"a": [[1]]}), json!({"a": {"x": {"*": null}}})).unwrap();
        assert_eq!(res.doc, json!({"a": [[1]]}));
        assert_eq!(res.anomalies.len(), 1);
    }

    #[test]
    fn scalar_document_is_rejected() {
        assert_eq!(apply(json!(5), json!({})), Err(PatchError::InvalidTarget));
        assert_eq!(apply(json!("s"), json!({"a": 1})), Err(PatchError::InvalidTarget));
    }

    #[test]
    fn empty_patch_is_identity() {
        let doc = json!({"a": [{"_": "x"}], "b": null});
        assert_eq!(apply(doc.clone(), json!({})).unwrap().doc, doc);
    }

    #[test]
    fn strict_mode_aborts_on_anomaly() {
        let options = PatchOptions::default().strict(true);
        let err = apply_json_with(json!({"b": 2}), &json!({"a": {"*": null}}), &options)
            .unwrap_err();
        assert_eq!(
            err,
            PatchError::Anomaly(Anomaly { kind: AnomalyKind::StaleDelete, path: "/a".into() })
        );
    }

    #[test]
    fn depth_limit_while_applying() {
        let deep = Patch::new().edit("a", Patch::new().edit("b", Patch::new().set("c", json!(1))));
        let doc = json!({"a": {"b": {"c": 0}}});
        let options = PatchOptions::default().with_max_depth(2);
        assert_eq!(
            apply_patch_with(doc.clone(), &deep, &options),
            Err(PatchError::DepthExceeded { limit: 2 })
        );
        let options = PatchOptions::default().with_max_depth(3);
        assert_eq!(
            apply_patch_with(doc, &deep, &options).unwrap().doc,
            json!({"a": {"b": {"c": 1}}})
        );
    }

    #[test]
    fn apply_json_rejects_non_object_patch() {
        assert_eq!(apply_json(json!({}), &json!([1])), Err(PatchError::InvalidPatch));
    }
}
