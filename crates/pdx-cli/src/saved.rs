//! Saved-set merge contract.
//!
//! The saved collection for an access code lives as one JSON array per row;
//! these pure functions implement the add/remove semantics over it. Add is
//! idempotent (set difference by id, append only genuinely new entries),
//! remove filters by id. Writes remain last-write-wins: concurrent sessions
//! under the same access code can race and lose updates, an accepted
//! limitation of this storage shape.

use pdx_common::types::SavedProtein;
use std::collections::HashSet;

/// Merge `incoming` into `existing`, keeping existing entries untouched and
/// appending only ids not already present. Duplicates within `incoming`
/// itself also collapse to one entry.
pub fn merge_entries(
    existing: Vec<SavedProtein>,
    incoming: Vec<SavedProtein>,
) -> Vec<SavedProtein> {
    let mut seen: HashSet<i64> = existing.iter().map(|e| e.id).collect();
    let mut merged = existing;

    for entry in incoming {
        if seen.insert(entry.id) {
            merged.push(entry);
        }
    }

    merged
}

/// Remove every entry whose id is in `ids`; unknown ids are ignored.
pub fn remove_entries(existing: Vec<SavedProtein>, ids: &[i64]) -> Vec<SavedProtein> {
    let removals: HashSet<i64> = ids.iter().copied().collect();
    existing
        .into_iter()
        .filter(|e| !removals.contains(&e.id))
        .collect()
}
