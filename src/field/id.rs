//! Field identifiers and the allocator that hands them out.
//!
//! Ids look like `field_12`. The numeric suffix is what `IdAllocator`
//! counts; foreign ids (anything else, including suffixes past
//! `MAX_SEQUENCE`) are accepted but never reused.

use crate::field::FieldNode;
use serde::{Deserialize, Serialize};
use std::fmt;

const ID_PREFIX: &str = "field_";

/// Largest suffix the allocator counts from. Bigger suffixes are foreign.
const MAX_SEQUENCE: u64 = u32::MAX as u64;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldId(pub String);

impl FieldId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Counter value encoded in an allocator-issued id.
    fn sequence(&self) -> Option<u64> {
        self.0
            .strip_prefix(ID_PREFIX)?
            .parse::<u64>()
            .ok()
            .filter(|n| *n <= MAX_SEQUENCE)
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FieldId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Monotonic id source. Owned by whoever creates nodes and passed by `&mut`
/// into anything that needs fresh ids.
#[derive(Debug, Clone)]
pub struct IdAllocator {
    next: u64,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdAllocator {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    pub fn starting_at(next: u64) -> Self {
        Self { next }
    }

    /// Continue numbering after the highest allocator-issued id in `forest`.
    pub fn resume_after(forest: &[FieldNode]) -> Self {
        let max = crate::tree::collect_all_ids(forest)
            .iter()
            .filter_map(FieldId::sequence)
            .max();
        Self {
            next: max.map_or(1, |m| m + 1),
        }
    }

    /// Move the counter past every allocator-issued id in `forest`. Never
    /// moves it backwards.
    pub fn observe(&mut self, forest: &[FieldNode]) {
        self.next = self.next.max(Self::resume_after(forest).next);
    }

    pub fn next_id(&mut self) -> FieldId {
        let id = FieldId(format!("{}{}", ID_PREFIX, self.next));
        self.next = self.next.saturating_add(1);
        id
    }

    /// The counter value the next call to `next_id` will use.
    pub fn peek(&self) -> u64 {
        self.next
    }
}
