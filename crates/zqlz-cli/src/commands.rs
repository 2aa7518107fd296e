//! Command implementations, kept apart from argument parsing so they can be
//! driven directly from tests.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::Serialize;
use zqlz_ai_diff::{DualText, Hunk, HunkKind, LineRange, PatchDirection, apply_hunk, compute_hunks};

/// The two files under review.
#[derive(Debug, Clone)]
pub struct ReviewFiles {
    pub base: PathBuf,
    pub proposed: PathBuf,
}

impl ReviewFiles {
    pub fn new(base: impl Into<PathBuf>, proposed: impl Into<PathBuf>) -> Self {
        Self {
            base: base.into(),
            proposed: proposed.into(),
        }
    }

    pub fn read(&self) -> Result<DualText> {
        Ok(DualText::new(read_text(&self.base)?, read_text(&self.proposed)?))
    }

    /// File an action in `direction` rewrites.
    pub fn target(&self, direction: PatchDirection) -> &Path {
        match direction {
            PatchDirection::Accept => &self.base,
            PatchDirection::Reject => &self.proposed,
        }
    }
}

/// One row of `zqlz hunks`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HunkReport {
    pub index: usize,
    pub kind: HunkKind,
    pub original: LineRange,
    pub modified: LineRange,
}

impl From<(usize, &Hunk)> for HunkReport {
    fn from((index, hunk): (usize, &Hunk)) -> Self {
        Self {
            index,
            kind: hunk.kind(),
            original: hunk.original_range,
            modified: hunk.modified_range,
        }
    }
}

pub fn list_hunks(dual: &DualText) -> Vec<HunkReport> {
    compute_hunks(&dual.base, &dual.proposed)
        .iter()
        .enumerate()
        .map(HunkReport::from)
        .collect()
}

/// Formats hunk reports as a plain table or a JSON array.
pub fn render_hunks(reports: &[HunkReport], json: bool) -> Result<String> {
    if json {
        return serde_json::to_string_pretty(reports).context("Failed to serialize hunks");
    }

    if reports.is_empty() {
        return Ok("no differences\n".to_string());
    }

    let mut out = String::new();
    for report in reports {
        writeln!(
            out,
            "{:>3}  {:<12}  base {:<12}  proposed {}",
            report.index,
            report.kind.label(),
            report.original.to_string(),
            report.modified
        )?;
    }
    Ok(out)
}

/// Resolves one hunk (or every hunk when `index` is `None`) and returns the
/// rewritten side: the new base for accept, the new proposal for reject.
pub fn resolve(dual: &DualText, index: Option<usize>, direction: PatchDirection) -> Result<String> {
    let hunks = compute_hunks(&dual.base, &dual.proposed);

    let Some(index) = index else {
        tracing::debug!(hunks = hunks.len(), direction = ?direction, "resolving every hunk");
        return Ok(match direction {
            PatchDirection::Accept => dual.proposed.clone(),
            PatchDirection::Reject => dual.base.clone(),
        });
    };

    let Some(hunk) = hunks.get(index) else {
        bail!(
            "No hunk {} (the texts have {} hunk{})",
            index,
            hunks.len(),
            if hunks.len() == 1 { "" } else { "s" }
        );
    };

    tracing::debug!(index, hunk = %hunk, direction = ?direction, "resolving hunk");
    apply_hunk(dual, hunk, direction).with_context(|| format!("Failed to apply hunk {}", index))
}

/// Runs `accept`/`reject`. Writes the result back into the target file when
/// `write` is set and returns what should be printed.
pub fn run_action(
    files: &ReviewFiles,
    index: Option<usize>,
    direction: PatchDirection,
    write: bool,
) -> Result<String> {
    let dual = files.read()?;
    let text = resolve(&dual, index, direction)?;

    if !write {
        return Ok(text);
    }

    let target = files.target(direction);
    std::fs::write(target, &text)
        .with_context(|| format!("Failed to write {}", target.display()))?;
    tracing::info!(path = %target.display(), "updated file");

    let after = match direction {
        PatchDirection::Accept => DualText::new(text, dual.proposed),
        PatchDirection::Reject => DualText::new(dual.base, text),
    };
    let remaining = compute_hunks(&after.base, &after.proposed).len();
    Ok(format!(
        "updated {} ({} hunk{} left)\n",
        target.display(),
        remaining,
        if remaining == 1 { "" } else { "s" }
    ))
}

fn read_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}
