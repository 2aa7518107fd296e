//! Overlay reconciliation
//!
//! The editor's overlay API is imperative: widgets are created, moved and
//! destroyed through opaque handles. Callers here describe the overlays they
//! want as a plain list of [`OverlayDescriptor`]s, resupplied in full whenever
//! something changes, and the [`OverlayEngine`] works out the smallest set of
//! native calls that gets the editor there.
//!
//! - [`descriptor`] - ids, placements and descriptors
//! - [`engine`] - the keyed registry and reconciliation pass
//! - [`render`] - the seam to whatever paints overlay contents

pub mod descriptor;
pub mod engine;
pub mod render;


pub use descriptor::{OverlayDescriptor, OverlayGeometry, OverlayId, Placement};
pub use engine::{OverlayEngine, ReconcileStats, RegistryEntry};
pub use render::OverlayRenderer;
