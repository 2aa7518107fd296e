//! Where a hunk's floating action overlay attaches in the proposed text.

use serde::{Deserialize, Serialize};

use crate::types::{Hunk, HunkKind};

/// How the host should place an overlay relative to its anchor line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnchorPreference {
    /// On the anchor line itself.
    Exact,
    /// Directly below the anchor line.
    Below,
}

/// A line (1-indexed, proposed side) plus a placement preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Anchor {
    pub line: usize,
    pub preference: AnchorPreference,
}

impl Anchor {
    pub fn new(line: usize, preference: AnchorPreference) -> Self {
        Self { line, preference }
    }

    pub fn exact(line: usize) -> Self {
        Self::new(line, AnchorPreference::Exact)
    }

    pub fn below(line: usize) -> Self {
        Self::new(line, AnchorPreference::Below)
    }
}

/// Computes the anchor for a hunk's action overlay.
///
/// Overlays sit below the affected region. A deletion has no lines of its own
/// in the proposed text, so it anchors on the line that follows the gap; a
/// deletion that runs to the end of the base has nothing after it and falls
/// back to sitting below the gap instead.
pub fn compute_anchor(hunk: &Hunk, original_line_count: usize) -> Anchor {
    let modified = hunk.modified_range;

    match hunk.kind() {
        HunkKind::Deletion if hunk.original_range.end == original_line_count => {
            Anchor::below(modified.start + 1)
        }
        HunkKind::Deletion => Anchor::exact(modified.start + 1),
        HunkKind::Insertion | HunkKind::Modification => Anchor::below(modified.end),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LineRange;

    #[test]
    fn test_modification_anchors_below_last_line() {
        let hunk = Hunk::new(LineRange::new(2, 2), LineRange::new(2, 3));
        assert_eq!(compute_anchor(&hunk, 4), Anchor::below(3));
    }

    #[test]
    fn test_insertion_anchors_below_last_inserted_line() {
        let hunk = Hunk::new(LineRange::empty_after(1), LineRange::new(2, 4));
        assert_eq!(compute_anchor(&hunk, 3), Anchor::below(4));
    }

    #[test]
    fn test_deletion_anchors_on_following_line() {
        let hunk = Hunk::new(LineRange::new(2, 3), LineRange::empty_after(1));
        assert_eq!(compute_anchor(&hunk, 5), Anchor::exact(2));
    }

    #[test]
    fn test_deletion_at_bottom_anchors_below() {
        let hunk = Hunk::new(LineRange::new(4, 5), LineRange::empty_after(3));
        let anchor = compute_anchor(&hunk, 5);

        assert_eq!(anchor.preference, AnchorPreference::Below);
        assert_eq!(anchor.line, 4);
    }

    #[test]
    fn test_deletion_of_first_line() {
        let hunk = Hunk::new(LineRange::new(1, 1), LineRange::empty_after(0));
        assert_eq!(compute_anchor(&hunk, 3), Anchor::exact(1));
    }
}
