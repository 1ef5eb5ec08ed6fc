//! Partial-update merging for the message timeline
//!
//! While the host streams a long response it repeatedly sends `partialMessage`
//! updates carrying the same timestamp as the entry being streamed. Merging
//! means: find that entry, swap the refined version in, leave everything else
//! alone.
//!
//! Timestamps are not guaranteed unique; rapid successive entries can land
//! in the same millisecond, so the match must prefer the most recently
//! appended entry, which is the one actively being streamed. The scan runs
//! tail-to-head (`rposition`) and is O(distance-from-tail): partial updates
//! almost always target the last few entries.

use std::sync::Arc;

use crate::types::TimelineEntry;

/// Replace the most recent entry whose timestamp equals `update.ts`.
///
/// Copy-on-write: on a match, returns a freshly allocated sequence with the
/// entry swapped; readers holding the previous `Arc` are untouched. Returns
/// `None` when no entry matches: partial updates can only refine an entry
/// that already exists, never append (the caller drops the update).
pub fn merge_partial(
    timeline: &Arc<Vec<TimelineEntry>>,
    update: TimelineEntry,
) -> Option<Arc<Vec<TimelineEntry>>> {
    let index = timeline.iter().rposition(|entry| entry.ts == update.ts)?;

    let mut next = timeline.as_ref().clone();
    next[index] = update;
    Some(Arc::new(next))
}
