//! Patch composition.
//!
//! `compose(minor, major)` folds two patches into one, `major` taking effect
//! after `minor`, without looking at any document.

use serde_json::Value;

use crate::codec::from_json;
use crate::patch::{Patch, PatchEntry};
use crate::target::{ArrayByIdentityTarget, ObjectTarget, PointerTarget};
use crate::types::{PatchError, PatchOptions, IDENTITY_KEY};

/// Compose two patches into one.
///
/// Keys keep `minor`'s order, followed by the keys only `major` has. Where
/// both patches touch a key, an assignment, replace or delete in `major`
/// wins outright, and an edit in `major` is folded into whatever `minor` did.
///
/// Recursion follows the nesting of the inputs. Decoded patches are bounded
/// by [`PatchOptions::max_depth`]; patches built in code should go through
/// [`compose_with`].
pub fn compose(minor: &Patch, major: &Patch) -> Patch {
    let mut result = Patch::with_capacity(minor.len() + major.len());
    for (key, minor_entry) in minor {
        let entry = match major.get(key) {
            Some(major_entry) => compose_entry(minor_entry, major_entry),
            None => minor_entry.clone(),
        };
        result.insert(key.clone(), entry);
    }
    for (key, major_entry) in major {
        if !minor.contains_key(key) {
            result.insert(key.clone(), major_entry.clone());
        }
    }
    result
}

/// [`compose`], rejecting inputs nested deeper than `options.max_depth`.
pub fn compose_with(
    minor: &Patch,
    major: &Patch,
    options: &PatchOptions,
) -> Result<Patch, PatchError> {
    if minor.depth() > options.max_depth || major.depth() > options.max_depth {
        return Err(PatchError::DepthExceeded {
            limit: options.max_depth,
        });
    }
    Ok(compose(minor, major))
}

fn compose_entry(minor: &PatchEntry, major: &PatchEntry) -> PatchEntry {
    let PatchEntry::Edit(major_patch) = major else {
        return major.clone();
    };
    match minor {
        PatchEntry::Edit(minor_patch) => PatchEntry::Edit(compose(minor_patch, major_patch)),
        // Minor leaves a container behind and major edits it. The container is
        // document data, so only the paths major edits are touched.
        PatchEntry::Replace(value @ (Value::Object(_) | Value::Array(_)))
        | PatchEntry::Literal(value @ Value::Object(_)) => {
            PatchEntry::Replace(folded(value, major_patch))
        }
        PatchEntry::Literal(value @ Value::Array(_)) => {
            PatchEntry::Literal(folded(value, major_patch))
        }
        // Scalars and deletes are dropped; major's edits stand on their own.
        PatchEntry::Literal(_) | PatchEntry::Replace(_) | PatchEntry::Delete => {
            PatchEntry::Edit(major_patch.clone())
        }
    }
}

fn folded(value: &Value, patch: &Patch) -> Value {
    let mut value = value.clone();
    fold_edit(&mut value, patch);
    value
}

/// Folds an edit into replacement data. Entries that are stale or would not
/// fit the data are left out.
fn fold_edit(value: &mut Value, patch: &Patch) {
    match value {
        Value::Object(map) => fold_entries(&mut ObjectTarget::new(map), patch),
        Value::Array(items) => fold_entries(&mut ArrayByIdentityTarget::new(items), patch),
        _ => {}
    }
}

fn fold_entries<T: PointerTarget>(target: &mut T, patch: &Patch) {
    for (key, entry) in patch {
        if key == IDENTITY_KEY {
            continue;
        }
        match entry {
            PatchEntry::Literal(value) if T::ACCEPTS_LITERALS => target.set(key, value.clone()),
            PatchEntry::Replace(value) if target.accepts(value) => target.set(key, value.clone()),
            PatchEntry::Delete => {
                target.remove(key);
            }
            PatchEntry::Edit(sub) => {
                if let Some(current) = target.get_mut(key) {
                    fold_edit(current, sub);
                }
            }
            PatchEntry::Literal(_) | PatchEntry::Replace(_) => {}
        }
    }
}

/// Compose a sequence of patches, first to last. No patches compose to the
/// empty patch.
pub fn compose_all<'a, I>(patches: I) -> Patch
where
    I: IntoIterator<Item = &'a Patch>,
{
    patches
        .into_iter()
        .fold(Patch::new(), |acc, next| compose(&acc, next))
}

/// Decode two JSON patches, compose them and encode the result.
pub fn compose_json(minor: &Value, major: &Value) -> Result<Value, PatchError> {
    let minor = from_json(minor)?;
    let major = from_json(major)?;
    Ok(compose(&minor, &major).to_json())
}
