//! Consistency checks over a field forest.
//!
//! Schema emission lets a repeated key silently overwrite its sibling; this
//! pass finds those collisions so callers can surface them.

use crate::Result;
use crate::diagnostics;
use crate::field::{FieldId, FieldKind, FieldNode};

use anyhow::bail;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateKey {
    /// Dotted path of the enclosing object ("" for the root level).
    pub scope: String,
    pub key: String,
    pub ids: Vec<FieldId>,
}

impl fmt::Display for DuplicateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scope = if self.scope.is_empty() { "<root>" } else { self.scope.as_str() };
        let ids: Vec<&str> = self.ids.iter().map(FieldId::as_str).collect();
        write!(
            f,
            "key '{}' is used by {} fields in {}: {}",
            self.key,
            self.ids.len(),
            scope,
            ids.join(", ")
        )
    }
}

/// Keys that map to the same `properties` object more than once.
pub fn duplicate_keys(forest: &[FieldNode]) -> Vec<DuplicateKey> {
    let mut out = Vec::new();
    check_level(forest, "", &mut out);
    out
}

/// Ids that appear more than once anywhere in the forest.
pub fn duplicate_ids(forest: &[FieldNode]) -> Vec<FieldId> {
    let mut seen = BTreeSet::new();
    let mut dups = BTreeSet::new();
    for id in crate::tree::collect_all_ids(forest) {
        if !seen.insert(id.clone()) {
            dups.insert(id);
        }
    }
    dups.into_iter().collect()
}

/// Fail on duplicate ids or keys.
pub fn check_forest(forest: &[FieldNode]) -> Result<()> {
    let ids = duplicate_ids(forest);
    if !ids.is_empty() {
        let ids: Vec<&str> = ids.iter().map(FieldId::as_str).collect();
        bail!(
            "{}",
            diagnostics::error_message(format!("duplicate field ids: {}", ids.join(", ")))
        );
    }

    let keys = duplicate_keys(forest);
    if !keys.is_empty() {
        let lines: Vec<String> = keys.iter().map(ToString::to_string).collect();
        bail!("{}", diagnostics::error_message(lines.join("; ")));
    }
    Ok(())
}

fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", prefix, key)
    }
}

/// Value-holding nodes of one schema level (layouts flattened away).
fn flatten_level<'a>(forest: &'a [FieldNode], out: &mut Vec<&'a FieldNode>) {
    for node in forest {
        match &node.kind {
            FieldKind::Layout { children } => flatten_level(children, out),
            _ => out.push(node),
        }
    }
}

fn check_level(forest: &[FieldNode], path: &str, out: &mut Vec<DuplicateKey>) {
    let mut level = Vec::new();
    flatten_level(forest, &mut level);

    let mut by_key: BTreeMap<&str, Vec<FieldId>> = BTreeMap::new();
    for node in &level {
        if !node.key.is_empty() {
            by_key.entry(node.key.as_str()).or_default().push(node.id.clone());
        }
    }
    for (key, ids) in by_key {
        if ids.len() > 1 {
            out.push(DuplicateKey {
                scope: path.to_string(),
                key: key.to_string(),
                ids,
            });
        }
    }

    for node in level {
        match &node.kind {
            FieldKind::Object { children } => {
                check_level(children, &join_path(path, &node.key), out);
            }
            FieldKind::Array { children } if !children.is_empty() => {
                check_level(children, &format!("{}[]", join_path(path, &node.key)), out);
            }
            _ => {}
        }
    }
}
