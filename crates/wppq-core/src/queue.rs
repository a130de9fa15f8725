//! Queue entry types and the pure reordering planner
//!
//! Everything here works on plain slices of entries and returns the
//! position changes to persist. Nothing in this module touches storage.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::{identity::AccountId, phone::PhoneId, Error, Result};

/// Unique queue entry identifier, assigned by the store
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(String);

impl EntryId {
    /// Create a new queue entry ID
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the ID as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EntryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A caller waiting on a phone line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueEntry {
    /// Unique identifier
    pub id: EntryId,
    /// Phone line this entry waits on
    pub phone_id: PhoneId,
    /// Account owning the phone
    pub account_id: AccountId,
    /// 1-based rank among the phone's active entries. Meaningless when inactive.
    pub position: u32,
    /// `false` means logically removed
    pub active: bool,
    /// When enqueued
    pub created_at: DateTime<Utc>,
}

impl QueueEntry {
    /// Minutes this entry has been waiting at `now`
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn wait_minutes(&self, now: DateTime<Utc>) -> f64 {
        let seconds = (now - self.created_at).num_seconds().max(0);
        seconds as f64 / 60.0
    }
}

/// Fields for an entry about to be created; the store assigns id and timestamp
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEntry {
    pub phone_id: PhoneId,
    pub account_id: AccountId,
    pub position: u32,
}

/// Direction of a reorder request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Direction {
    /// Move to position 1
    Top,
    /// Swap with the entry ahead
    Up,
    /// Swap with the entry behind
    Down,
    /// Move to position N
    Bottom,
}

/// A single position update to persist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionChange {
    pub entry_id: EntryId,
    /// Position the entry is expected to have before the change
    pub from: u32,
    pub to: u32,
}

/// Canonical queue order: position, then creation time, then id.
fn queue_order(a: &QueueEntry, b: &QueueEntry) -> Ordering {
    a.position
        .cmp(&b.position)
        .then_with(|| a.created_at.cmp(&b.created_at))
        .then_with(|| id_order(&a.id, &b.id))
}

/// Store ids end in a decimal counter (`"9"`, `"e-10"`); compare that
/// counter numerically so `"10"` sorts after `"9"`.
fn id_order(a: &EntryId, b: &EntryId) -> Ordering {
    let split = |id: &EntryId| {
        let s = id.as_str();
        let digits = s.len() - s.trim_end_matches(|c: char| c.is_ascii_digit()).len();
        let (prefix, counter) = s.split_at(s.len() - digits);
        (prefix.to_string(), counter.parse::<u128>().ok())
    };
    split(a).cmp(&split(b)).then_with(|| a.cmp(b))
}

/// Active entries in canonical queue order
#[must_use]
pub fn sort_active(entries: &[QueueEntry]) -> Vec<QueueEntry> {
    entries
        .iter()
        .filter(|e| e.active)
        .cloned()
        .sorted_by(queue_order)
        .collect()
}

/// Position for a newly enqueued entry: one past the highest active position
#[must_use]
pub fn next_position(entries: &[QueueEntry]) -> u32 {
    entries
        .iter()
        .filter(|e| e.active)
        .map(|e| e.position)
        .max()
        .map_or(1, |max| max.saturating_add(1))
}

/// Check that active positions are exactly `1..=N`
#[must_use]
pub fn is_contiguous(entries: &[QueueEntry]) -> bool {
    entries
        .iter()
        .filter(|e| e.active)
        .map(|e| e.position)
        .sorted_unstable()
        .zip(1u32..)
        .all(|(position, expected)| position == expected)
}

/// Changes that assign ranks `1..=N` to already-ordered entries
fn rank_changes<'a>(ordered: impl IntoIterator<Item = &'a QueueEntry>) -> Vec<PositionChange> {
    ordered
        .into_iter()
        .zip(1u32..)
        .filter(|(entry, rank)| entry.position != *rank)
        .map(|(entry, rank)| PositionChange {
            entry_id: entry.id.clone(),
            from: entry.position,
            to: rank,
        })
        .collect()
}

/// Plan a move of `target` in `direction`.
///
/// Returns `Ok(None)` when the move is a no-op (already at the boundary).
/// The returned changes renumber the resulting order to `1..=N`, so only
/// the entries that actually shift are touched: two for `up`/`down`, the
/// target plus everything it jumps over for `top`/`bottom`.
///
/// # Errors
///
/// Returns `Error::NotFound` if `target` is not among the active entries
pub fn plan_move(
    entries: &[QueueEntry],
    target: &EntryId,
    direction: Direction,
) -> Result<Option<Vec<PositionChange>>> {
    let mut ordered = sort_active(entries);
    let index = ordered
        .iter()
        .position(|e| &e.id == target)
        .ok_or_else(|| Error::not_found(format!("Queue entry {target} is not active")))?;
    let last = ordered.len() - 1;

    let new_index = match direction {
        Direction::Up => index.saturating_sub(1),
        Direction::Down => (index + 1).min(last),
        Direction::Top => 0,
        Direction::Bottom => last,
    };
    if new_index == index {
        return Ok(None);
    }

    let moved = ordered.remove(index);
    ordered.insert(new_index, moved);

    let changes = rank_changes(&ordered);
    Ok((!changes.is_empty()).then_some(changes))
}

/// Plan a renumbering of the active entries to `1..=N` in queue order.
///
/// Empty when the positions are already contiguous.
#[must_use]
pub fn plan_renumber(entries: &[QueueEntry]) -> Vec<PositionChange> {
    rank_changes(&sort_active(entries))
}

/// Apply planned changes to an in-memory copy of the entries
#[must_use]
pub fn apply_changes(entries: &[QueueEntry], changes: &[PositionChange]) -> Vec<QueueEntry> {
    entries
        .iter()
        .cloned()
        .map(|mut entry| {
            if let Some(change) = changes.iter().find(|c| c.entry_id == entry.id) {
                entry.position = change.to;
            }
            entry
        })
        .collect()
}
