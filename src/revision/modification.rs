//! Sparse table of revision modifications
//!
//! Maps a revision boundary (in input numbering) to the offset that applies
//! from that boundary on, until the next boundary. Revisions before the first
//! boundary are unmodified.

use std::collections::BTreeMap;
use std::fmt;

use crate::event::Revision;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModificationTable {
    boundaries: BTreeMap<Revision, i64>,
}

impl ModificationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offset applying to `revision`: the value of the greatest boundary not
    /// after it, `0` if there is none.
    pub fn value_at(&self, revision: Revision) -> i64 {
        self.boundaries
            .range(..=revision)
            .next_back()
            .map_or(0, |(_, modification)| *modification)
    }

    /// Records `modification` from `revision` on. Replaces an existing entry
    /// at the same boundary.
    pub fn add(&mut self, revision: Revision, modification: i64) {
        self.boundaries.insert(revision, modification);
    }

    /// Forgets every boundary at or after `revision`.
    pub fn clear_from(&mut self, revision: Revision) {
        self.boundaries.split_off(&revision);
    }

    pub fn len(&self) -> usize {
        self.boundaries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boundaries.is_empty()
    }

    /// Boundaries in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = (Revision, i64)> + '_ {
        self.boundaries.iter().map(|(r, m)| (*r, *m))
    }
}

impl fmt::Display for ModificationTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (rev, modification)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}: {:+}", rev, modification)?;
        }
        f.write_str("}")
    }
}
