//! Errors, anomalies, options and results shared by the applier and composer.

use std::fmt;

use serde_json::Value;
use thiserror::Error;

/// Reserved patch key marking a replace (`{"*": value}`) or delete
/// (`{"*": null}`) wrapper.
pub const REPLACE_KEY: &str = "*";

/// Identity field of array elements. As a patch key it is metadata and is
/// never applied.
pub const IDENTITY_KEY: &str = "_";

/// Default nesting limit, the same as serde_json's parser recursion limit.
pub const DEFAULT_MAX_DEPTH: usize = 128;

// ── Error ─────────────────────────────────────────────────────────────────

#[derive(Debug, Error, Clone, PartialEq)]
pub enum PatchError {
    /// A literal was assigned to an array element, or an array element was
    /// replaced with a non-object.
    #[error("TYPE_CHANGE_ON_ARRAY: cannot change type of array item at {path}")]
    TypeChangeOnArray { path: String },
    /// A sub-patch addressed a scalar value.
    #[error("NON_PATCHABLE_TARGET: cannot edit non-patchable value at {path}")]
    NonPatchableTarget { path: String },
    /// The document handed to `apply` is neither an object nor an array.
    #[error("INVALID_TARGET: only objects and arrays can be patched")]
    InvalidTarget,
    /// The patch is not a JSON object.
    #[error("INVALID_PATCH: a patch must be an object")]
    InvalidPatch,
    #[error("DEPTH_EXCEEDED: nesting deeper than {limit}")]
    DepthExceeded { limit: usize },
    /// An anomaly promoted to an error by [`PatchOptions::strict`].
    #[error("ANOMALY: {0}")]
    Anomaly(Anomaly),
}

// ── Anomalies ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnomalyKind {
    /// Delete of a key or identity that does not exist.
    StaleDelete,
    /// Edit of a key or identity that does not exist.
    StaleEdit,
}

impl AnomalyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnomalyKind::StaleDelete => "STALE_DELETE",
            AnomalyKind::StaleEdit => "STALE_EDIT",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            AnomalyKind::StaleDelete => "trying to delete a value that doesn't exist anymore",
            AnomalyKind::StaleEdit => "trying to edit a value that doesn't exist anymore",
        }
    }
}

impl fmt::Display for AnomalyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A non-fatal condition met while applying a patch. The offending entry is
/// skipped and application continues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anomaly {
    pub kind: AnomalyKind,
    /// JSON Pointer of the skipped entry; array elements are addressed by
    /// identity.
    pub path: String,
}

impl fmt::Display for Anomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}: {}", self.kind, self.path, self.kind.message())
    }
}

// ── Options ───────────────────────────────────────────────────────────────

/// Options for decoding and applying patches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchOptions {
    /// Maximum container nesting accepted in a patch, and followed while
    /// applying one.
    pub max_depth: usize,
    /// If true, the first anomaly aborts the call with
    /// [`PatchError::Anomaly`] instead of being recorded.
    pub strict: bool,
}

impl Default for PatchOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            strict: false,
        }
    }
}

impl PatchOptions {
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}

// ── Result ────────────────────────────────────────────────────────────────

/// Result of applying a patch.
#[derive(Debug, Clone, PartialEq)]
pub struct PatchResult {
    /// The patched document.
    pub doc: Value,
    /// Anomalies met along the way, in patch order.
    pub anomalies: Vec<Anomaly>,
}

impl PatchResult {
    pub fn is_clean(&self) -> bool {
        self.anomalies.is_empty()
    }
}
