//! Seam to the UI layer that paints overlay contents.

use super::OverlayId;

/// Paints overlay contents into host-provided mount nodes.
///
/// `mount` runs once per overlay id, when the id first appears. Later passes
/// only call `update`, even when the native widget around the node is rebuilt,
/// so whatever the UI layer painted (and any focus inside it) survives.
pub trait OverlayRenderer<N, P> {
    fn mount(&mut self, id: &OverlayId, node: &N, payload: &P);

    fn update(&mut self, _id: &OverlayId, _payload: &P) {}

    fn unmount(&mut self, _id: &OverlayId) {}
}

/// A plain render callback is a renderer that only mounts.
impl<N, P, F> OverlayRenderer<N, P> for F
where
    F: FnMut(&OverlayId, &N, &P),
{
    fn mount(&mut self, id: &OverlayId, node: &N, payload: &P) {
        self(id, node, payload)
    }
}
