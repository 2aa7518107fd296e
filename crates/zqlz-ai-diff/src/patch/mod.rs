//! Per-hunk accept/reject by line splicing
//!
//! Accepting a hunk rewrites the base text so that the hunk's region matches
//! the proposal; rejecting it rewrites the proposed text so that the region
//! matches the base. Every line outside the hunk is carried over untouched,
//! including the empty line implied by a trailing newline.
//!
//! # Example
//!
//! ```
//! use zqlz_ai_diff::{DualText, accept_hunk, compute_hunks};
//!
//! let dual = DualText::new("a\nb\n", "a\nc\n");
//! let hunk = compute_hunks(&dual.base, &dual.proposed)[0];
//! assert_eq!(accept_hunk(&dual, &hunk).unwrap(), "a\nc\n");
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{AiDiffError, Result};
use crate::types::{DualText, Hunk, LineRange, split_lines};


/// Which way a hunk action resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatchDirection {
    /// Take the proposed lines into the base. Produces a new base.
    Accept,
    /// Put the base lines back into the proposal. Produces a new proposed text.
    Reject,
}

/// Applies one hunk in the given direction.
///
/// Returns the new base text for [`PatchDirection::Accept`] and the new
/// proposed text for [`PatchDirection::Reject`]. The input is never modified.
///
/// # Errors
/// Returns [`AiDiffError::MalformedSplice`] if the hunk's ranges do not fit the
/// texts.
pub fn apply_hunk(dual: &DualText, hunk: &Hunk, direction: PatchDirection) -> Result<String> {
    if hunk.original_range.is_empty() && hunk.modified_range.is_empty() {
        return Err(AiDiffError::malformed(*hunk, "both sides are empty"));
    }

    let base_lines = split_lines(&dual.base);
    let proposed_lines = split_lines(&dual.proposed);

    let patched = match direction {
        PatchDirection::Accept => splice(
            *hunk,
            base_lines,
            hunk.original_range,
            &proposed_lines,
            hunk.modified_range,
        )?,
        PatchDirection::Reject => splice(
            *hunk,
            proposed_lines,
            hunk.modified_range,
            &base_lines,
            hunk.original_range,
        )?,
    };

    tracing::debug!(
        hunk = %hunk,
        direction = ?direction,
        kind = hunk.kind().label(),
        "applied hunk"
    );

    Ok(patched)
}

/// Accepts a hunk, returning the new base text.
pub fn accept_hunk(dual: &DualText, hunk: &Hunk) -> Result<String> {
    apply_hunk(dual, hunk, PatchDirection::Accept)
}

/// Rejects a hunk, returning the new proposed text.
pub fn reject_hunk(dual: &DualText, hunk: &Hunk) -> Result<String> {
    apply_hunk(dual, hunk, PatchDirection::Reject)
}

/// Replaces `target_range` of `target` with `source_range` of `source`.
///
/// Either range may be empty: an empty target range inserts after its
/// `start` line, an empty source range deletes the target lines. This single
/// shape covers both directions and all three hunk kinds.
fn splice<'a>(
    hunk: Hunk,
    target: Vec<&'a str>,
    target_range: LineRange,
    source: &[&'a str],
    source_range: LineRange,
) -> Result<String> {
    let replacement: &[&'a str] = if source_range.is_empty() {
        &[]
    } else {
        let span = line_span(hunk, source_range, source.len())?;
        &source[span]
    };

    let span = if target_range.is_empty() {
        if target_range.start > target.len() {
            return Err(AiDiffError::malformed(
                hunk,
                format!(
                    "insertion point after line {} is past the end ({} lines)",
                    target_range.start,
                    target.len()
                ),
            ));
        }
        target_range.start..target_range.start
    } else {
        line_span(hunk, target_range, target.len())?
    };

    let mut patched: Vec<&str> =
        Vec::with_capacity(target.len() - span.len() + replacement.len());
    patched.extend_from_slice(&target[..span.start]);
    patched.extend_from_slice(replacement);
    patched.extend_from_slice(&target[span.end..]);
    Ok(patched.join("\n"))
}

/// Converts a non-empty 1-indexed inclusive range to a 0-indexed slice range.
fn line_span(hunk: Hunk, range: LineRange, line_count: usize) -> Result<std::ops::Range<usize>> {
    if range.start == 0 || range.end < range.start || range.end > line_count {
        return Err(AiDiffError::malformed(
            hunk,
            format!("line range {range} does not fit {line_count} lines"),
        ));
    }
    Ok(range.start - 1..range.end)
}

/// Line count the base will have after accepting `hunk`.
pub fn accepted_line_count(original_line_count: usize, hunk: &Hunk) -> usize {
    original_line_count.saturating_sub(hunk.original_range.len()) + hunk.modified_range.len()
}
