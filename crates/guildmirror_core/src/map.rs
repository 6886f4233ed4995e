//! Run-scoped identity mapping tables.

use std::collections::HashMap;
use std::hash::Hash;

/// Append-only mapping from source entity ids to their newly created
/// target counterparts.
///
/// Two instances exist per clone run (roles and categories), created empty
/// at run start, populated monotonically as entities are created, and
/// discarded at run end. There is no merge, no deletion, and no
/// persistence: the tables carry no cross-run lifetime.
///
/// A lookup miss is not an error. Callers that need a best-effort
/// translation use [`IdMap::translate`], which falls back to the original
/// id: member-subject overwrites are expected to miss, and a missing role
/// entry means that role failed to clone and the reference degrades
/// gracefully rather than failing the run.
///
/// # Example
///
/// ```
/// use guildmirror_core::IdMap;
/// use guildmirror_core::model::RoleId;
///
/// let mut map = IdMap::new();
/// map.insert(RoleId(1), RoleId(100));
/// assert_eq!(map.get(RoleId(1)), Some(RoleId(100)));
/// assert_eq!(map.translate(RoleId(2)), RoleId(2));
/// ```
#[derive(Debug, Clone)]
pub struct IdMap<I> {
    entries: HashMap<I, I>,
}

impl<I: Copy + Eq + Hash> IdMap<I> {
    /// Create an empty mapping table.
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Record that `old` was recreated as `new`.
    pub fn insert(&mut self, old: I, new: I) {
        self.entries.insert(old, new);
    }

    /// Look up the target id recorded for `old`, if any.
    pub fn get(&self, old: I) -> Option<I> {
        self.entries.get(&old).copied()
    }

    /// Translate `old` to its target id, passing the original through on a
    /// miss.
    pub fn translate(&self, old: I) -> I {
        self.get(old).unwrap_or(old)
    }

    /// Number of recorded correspondences.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no entries yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<I: Copy + Eq + Hash> Default for IdMap<I> {
    fn default() -> Self {
        Self::new()
    }
}
