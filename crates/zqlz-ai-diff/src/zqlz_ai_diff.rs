//! ZQLZ AI Diff - Inline review of AI-suggested SQL edits
//!
//! Shows a suggested replacement next to the current query as a line diff and
//! lets the user take or drop each change on its own.
//!
//! # Features
//!
//! - **Hunks**: Classify line changes as insertions, deletions or modifications
//! - **Hunk Actions**: Accept or reject a single hunk by rebuilding one side
//! - **Anchoring**: Place per-hunk controls where they stay visible
//! - **Overlay Reconciliation**: Keep native editor widgets in sync with the
//!   desired set while preserving focus and avoiding churn
//! - **Prompt Boxes**: Inline instruction boxes that reserve editor space
//!
//! # Example
//!
//! ```
//! use zqlz_ai_diff::{DualText, accept_hunk, compute_hunks};
//!
//! let dual = DualText::new("SELECT *\nFROM users\n", "SELECT id\nFROM users\n");
//! let hunks = compute_hunks(&dual.base, &dual.proposed);
//! assert_eq!(hunks.len(), 1);
//!
//! let base = accept_hunk(&dual, &hunks[0]).unwrap();
//! assert_eq!(base, dual.proposed);
//! ```

mod anchor;
mod diff;
mod error;
mod host;
pub mod overlay;
mod patch;
mod settings;
mod suggest;
mod surface;
mod types;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use anchor::{Anchor, AnchorPreference, compute_anchor};
pub use diff::{DiffEngine, RawLineChange, classify, compute_hunks};
pub use error::{AiDiffError, Result};
pub use host::EditorHost;
pub use overlay::{
    OverlayDescriptor, OverlayEngine, OverlayGeometry, OverlayId, OverlayRenderer, Placement,
    ReconcileStats, RegistryEntry,
};
pub use patch::{PatchDirection, accept_hunk, accepted_line_count, apply_hunk, reject_hunk};
pub use settings::AiDiffSettings;
pub use suggest::{EditRequest, SuggestionProvider};
pub use surface::{AiEditSurface, HunkActions, OverlayPayload, PromptBox};
pub use types::{DualText, Hunk, HunkKind, LineRange, Side, line_count};
