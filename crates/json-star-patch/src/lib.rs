//! Structural patches for JSON documents.
//!
//! A patch is a JSON object that mirrors the shape of the document it edits:
//!
//! - a non-object value assigns the field: `{"a": 5}`, `{"a": null}`;
//! - `{"*": value}` replaces the field wholesale, `{"*": null}` deletes it;
//! - any other object edits the existing value in place, recursively.
//!
//! Arrays are addressed by the `"_"` identity field of their object
//! elements rather than by position. Replacing an unknown identity appends a
//! new element, so `{"*": ..}` doubles as an upsert.
//!
//! Two patches [`compose`] into one that has the same effect as applying them
//! in sequence.
//!
//! # Example
//!
//! ```
//! use json_star_patch::{apply_json, compose_json};
//! use serde_json::json;
//!
//! let doc = json!({
//!     "name": "pump",
//!     "ports": [{"_": "p1", "speed": 10}, {"_": "p2", "speed": 20}],
//! });
//!
//! let first = json!({"ports": {"p1": {"speed": 15}}});
//! let second = json!({"ports": {"p3": {"*": {"speed": 30}}}, "name": {"*": null}});
//!
//! let res = apply_json(doc.clone(), &first).unwrap();
//! let res = apply_json(res.doc, &second).unwrap();
//! assert_eq!(res.doc, json!({
//!     "ports": [
//!         {"_": "p1", "speed": 15},
//!         {"_": "p2", "speed": 20},
//!         {"_": "p3", "speed": 30},
//!     ],
//! }));
//!
//! let both = compose_json(&first, &second).unwrap();
//! assert_eq!(apply_json(doc, &both).unwrap().doc, res.doc);
//! ```
//!
//! Deleting or editing something that is not there is not an error. The
//! entry is skipped and reported as an [`Anomaly`]:
//!
//! ```
//! use json_star_patch::{apply_json, AnomalyKind};
//! use serde_json::json;
//!
//! let res = apply_json(json!({"b": 2}), &json!({"a": {"*": null}})).unwrap();
//! assert_eq!(res.doc, json!({"b": 2}));
//! assert_eq!(res.anomalies[0].kind, AnomalyKind::StaleDelete);
//! assert_eq!(res.anomalies[0].path, "/a");
//! ```

pub mod apply;
pub mod codec;
pub mod compose;
pub mod patch;
pub mod types;
pub mod util;

mod target;

pub use apply::{apply_json, apply_json_with, apply_patch, apply_patch_with};
pub use codec::{from_json, from_json_with, to_json};
pub use compose::{compose, compose_all, compose_json, compose_with};
pub use patch::{Patch, PatchEntry};
pub use types::{
    Anomaly, AnomalyKind, PatchError, PatchOptions, PatchResult, DEFAULT_MAX_DEPTH,
    IDENTITY_KEY, REPLACE_KEY,
};
