//! Core data model: line ranges, hunks and the base/proposed text pair.
//!
//! Line numbers are 1-indexed and inclusive, matching what the editor shows
//! in its gutter. Text is split on `\n` only, so a trailing newline produces a
//! trailing empty line that is a real line as far as diffing and patching are
//! concerned.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An inclusive, 1-indexed range of lines on one side of a diff.
///
/// An `end` of `0` marks an empty range. For an empty range, `start` names the
/// line after which the other side's lines belong (`0` means "before the
/// first line").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LineRange {
    pub start: usize,
    pub end: usize,
}

impl LineRange {
    /// Creates a non-empty range covering `start..=end`.
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Creates an empty range positioned after `line`.
    pub fn empty_after(line: usize) -> Self {
        Self {
            start: line,
            end: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.end == 0
    }

    /// Number of lines covered by the range.
    pub fn len(&self) -> usize {
        if self.is_empty() || self.end < self.start {
            0
        } else {
            self.end - self.start + 1
        }
    }

    /// Whether `line` falls inside the range.
    pub fn contains(&self, line: usize) -> bool {
        !self.is_empty() && line >= self.start && line <= self.end
    }
}

impl fmt::Display for LineRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            write!(f, "(after {})", self.start)
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

/// How a hunk changes the base text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HunkKind {
    Insertion,
    Deletion,
    Modification,
}

impl HunkKind {
    pub fn label(&self) -> &'static str {
        match self {
            HunkKind::Insertion => "insertion",
            HunkKind::Deletion => "deletion",
            HunkKind::Modification => "modification",
        }
    }
}

/// A contiguous line-range correspondence between base and proposed text.
///
/// At most one side is empty. Hunks for one text pair come out in ascending
/// order and never overlap, so the pair of ranges doubles as the geometric key
/// used to find a hunk again at click time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Hunk {
    pub original_range: LineRange,
    pub modified_range: LineRange,
}

impl Hunk {
    pub fn new(original_range: LineRange, modified_range: LineRange) -> Self {
        Self {
            original_range,
            modified_range,
        }
    }

    pub fn kind(&self) -> HunkKind {
        if self.modified_range.is_empty() {
            HunkKind::Deletion
        } else if self.original_range.is_empty() {
            HunkKind::Insertion
        } else {
            HunkKind::Modification
        }
    }
}

impl fmt::Display for Hunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} -> {}",
            self.kind().label(),
            self.original_range,
            self.modified_range
        )
    }
}

/// Which text of the pair an editor model holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Base,
    Proposed,
}

/// The working pair of texts under review.
///
/// Transitions always replace a whole side; nothing mutates a side in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DualText {
    pub base: String,
    pub proposed: String,
}

impl DualText {
    pub fn new(base: impl Into<String>, proposed: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            proposed: proposed.into(),
        }
    }

    /// A pair with no pending suggestion.
    pub fn plain(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            proposed: text.clone(),
            base: text,
        }
    }

    /// When both sides match there is nothing to review and the editor
    /// collapses to a single buffer.
    pub fn is_identical(&self) -> bool {
        self.base == self.proposed
    }

    pub fn side(&self, side: Side) -> &str {
        match side {
            Side::Base => &self.base,
            Side::Proposed => &self.proposed,
        }
    }

    pub fn base_line_count(&self) -> usize {
        line_count(&self.base)
    }
}

/// Splits text into lines on `\n`, keeping any `\r` with its line.
pub(crate) fn split_lines(text: &str) -> Vec<&str> {
    text.split('\n').collect()
}

/// Number of lines the editor shows for `text`.
pub fn line_count(text: &str) -> usize {
    text.split('\n').count()
}
