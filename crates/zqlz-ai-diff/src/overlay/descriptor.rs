//! Declarative overlay descriptions handed to the engine each pass.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::anchor::{Anchor, AnchorPreference};

/// Stable identity of one logical overlay.
///
/// The engine keys native widgets by this id, so an id must keep naming the
/// same overlay across passes and must never be reused for a different one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OverlayId(String);

impl OverlayId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Id of the action overlay for the hunk at `index` in the current diff.
    pub fn hunk(index: usize) -> Self {
        Self(format!("hunk-{index}"))
    }

    /// Id of a prompt-entry box.
    pub fn prompt(serial: u64) -> Self {
        Self(format!("prompt-{serial}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OverlayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for OverlayId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// How an overlay occupies the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Placement {
    /// Drawn over the text without moving any lines.
    Floating { preference: AnchorPreference },
    /// Reserves vertical space below its anchor line, pushing later lines down.
    Reserving { height_hint: u32 },
}

impl Placement {
    pub fn is_reserving(&self) -> bool {
        matches!(self, Placement::Reserving { .. })
    }

    pub fn label(&self) -> &'static str {
        match self {
            Placement::Floating { .. } => "floating",
            Placement::Reserving { .. } => "reserving",
        }
    }
}

/// Everything the host needs to position a native widget.
///
/// A registry entry remembers the geometry its handle was built with; any
/// difference on the next pass means the handle is rebuilt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OverlayGeometry {
    pub placement: Placement,
    pub anchor_line: usize,
    /// Height the widget reserves. Always `None` for floating overlays.
    pub size: Option<u32>,
}

impl OverlayGeometry {
    pub fn anchor(&self) -> Anchor {
        match self.placement {
            Placement::Floating { preference } => Anchor::new(self.anchor_line, preference),
            Placement::Reserving { .. } => Anchor::below(self.anchor_line),
        }
    }
}

/// One overlay the caller wants on screen.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayDescriptor<P> {
    pub id: OverlayId,
    pub placement: Placement,
    pub anchor_line: usize,
    /// Opaque content handed to the renderer.
    pub payload: P,
    /// Size reported by the rendered content, once known.
    pub measured_size: Option<u32>,
}

impl<P> OverlayDescriptor<P> {
    pub fn floating(id: OverlayId, anchor: Anchor, payload: P) -> Self {
        Self {
            id,
            placement: Placement::Floating {
                preference: anchor.preference,
            },
            anchor_line: anchor.line,
            payload,
            measured_size: None,
        }
    }

    pub fn reserving(id: OverlayId, anchor_line: usize, height_hint: u32, payload: P) -> Self {
        Self {
            id,
            placement: Placement::Reserving { height_hint },
            anchor_line,
            payload,
            measured_size: None,
        }
    }

    pub fn with_measured_size(mut self, size: u32) -> Self {
        self.measured_size = Some(size);
        self
    }

    /// Resolves the geometry to build with. A measurement from the descriptor
    /// wins over one the engine recorded, which wins over the height hint.
    pub(crate) fn geometry(&self, recorded_size: Option<u32>) -> OverlayGeometry {
        let size = match self.placement {
            Placement::Floating { .. } => None,
            Placement::Reserving { height_hint } => Some(
                self.measured_size
                    .or(recorded_size)
                    .unwrap_or(height_hint),
            ),
        };
        OverlayGeometry {
            placement: self.placement,
            anchor_line: self.anchor_line,
            size,
        }
    }
}
