//! Line diffing and hunk classification

use similar::{Algorithm, DiffTag};

use crate::types::{Hunk, LineRange, split_lines};

/// A raw line change as reported by an editor's diff primitive.
///
/// Line numbers are 1-indexed and inclusive. An `*_end` of `0` means that side
/// is empty and `*_start` is the line after which the other side's lines sit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawLineChange {
    pub original_start: usize,
    pub original_end: usize,
    pub modified_start: usize,
    pub modified_end: usize,
}

impl RawLineChange {
    pub fn new(
        original_start: usize,
        original_end: usize,
        modified_start: usize,
        modified_end: usize,
    ) -> Self {
        Self {
            original_start,
            original_end,
            modified_start,
            modified_end,
        }
    }

    fn to_hunk(self) -> Hunk {
        Hunk::new(
            LineRange::new(self.original_start, self.original_end),
            LineRange::new(self.modified_start, self.modified_end),
        )
    }
}

/// Line diff engine backed by `similar`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiffEngine;

impl DiffEngine {
    pub fn new() -> Self {
        Self
    }

    /// Computes raw line changes between two texts.
    pub fn line_changes(&self, original: &str, modified: &str) -> Vec<RawLineChange> {
        if original == modified {
            return Vec::new();
        }

        let old_lines = split_lines(original);
        let new_lines = split_lines(modified);
        let ops = similar::capture_diff_slices(Algorithm::Myers, &old_lines, &new_lines);

        ops.iter()
            .filter_map(|op| {
                let (tag, old, new) = op.as_tag_tuple();
                match tag {
                    DiffTag::Equal => None,
                    DiffTag::Delete => Some(RawLineChange::new(old.start + 1, old.end, new.start, 0)),
                    DiffTag::Insert => Some(RawLineChange::new(old.start, 0, new.start + 1, new.end)),
                    DiffTag::Replace => Some(RawLineChange::new(
                        old.start + 1,
                        old.end,
                        new.start + 1,
                        new.end,
                    )),
                }
            })
            .collect()
    }
}

/// Computes the ordered hunks that turn `base` into `proposed`.
pub fn compute_hunks(base: &str, proposed: &str) -> Vec<Hunk> {
    classify(&DiffEngine::default().line_changes(base, proposed))
}

/// Turns raw diff output into hunks.
///
/// A deletion immediately followed by an insertion at the same spot (or the
/// reverse) is folded into a single modification so that one overlay covers
/// the whole replaced region.
pub fn classify(changes: &[RawLineChange]) -> Vec<Hunk> {
    let mut hunks: Vec<Hunk> = Vec::with_capacity(changes.len());

    for change in changes {
        let hunk = change.to_hunk();
        if let Some(merged) = hunks.last().and_then(|prev| merge_adjacent(*prev, hunk)) {
            if let Some(last) = hunks.last_mut() {
                *last = merged;
            }
            continue;
        }
        hunks.push(hunk);
    }

    tracing::trace!(raw = changes.len(), hunks = hunks.len(), "classified line changes");
    hunks
}

fn merge_adjacent(prev: Hunk, next: Hunk) -> Option<Hunk> {
    let (po, pm) = (prev.original_range, prev.modified_range);
    let (no, nm) = (next.original_range, next.modified_range);

    // deletion then insertion
    if pm.is_empty()
        && no.is_empty()
        && !po.is_empty()
        && !nm.is_empty()
        && no.start == po.end
        && nm.start == pm.start + 1
    {
        return Some(Hunk::new(po, nm));
    }

    // insertion then deletion
    if po.is_empty()
        && nm.is_empty()
        && !pm.is_empty()
        && !no.is_empty()
        && no.start == po.start + 1
        && nm.start == pm.end
    {
        return Some(Hunk::new(no, pm));
    }

    None
}
