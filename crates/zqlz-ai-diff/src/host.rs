//! Adapter over the live editing control.
//!
//! The editor is an external, imperative widget. Everything this crate needs
//! from it goes through [`EditorHost`]: its diff primitive, model text, native
//! overlay placement and focus. Implementations wrap one editor instance; when
//! that instance goes away `is_live` turns false and every operation here
//! becomes a no-op on the caller side.

use std::fmt::Debug;

use crate::anchor::Anchor;
use crate::diff::{DiffEngine, RawLineChange};
use crate::overlay::{OverlayGeometry, OverlayId, Placement};
use crate::types::Side;

pub trait EditorHost {
    /// Native widget handle owned by the overlay engine.
    type Handle;
    /// Node that overlay content is rendered into.
    type MountNode;
    /// Something that can hold keyboard focus.
    type Focus: Clone + PartialEq + Debug;

    /// Whether the editor instance still has a live model.
    fn is_live(&self) -> bool;

    /// Current text of one side of the diff editor, if a model is attached.
    fn model_text(&self, side: Side) -> Option<String>;

    /// Replaces the whole text of one side's model. A no-op once the
    /// instance has no live model.
    fn set_model_text(&mut self, side: Side, text: &str);

    /// The editor's line diff. Defaults to the built-in `similar` engine.
    fn compute_line_diff(&self, original: &str, modified: &str) -> Vec<RawLineChange> {
        DiffEngine::default().line_changes(original, modified)
    }

    /// Creates the node an overlay's content is rendered into. Called once per
    /// overlay id; the node outlives rebuilds of the native widget.
    fn create_mount_node(&mut self, id: &OverlayId) -> Self::MountNode;

    fn create_floating_overlay(&mut self, anchor: Anchor, node: &Self::MountNode) -> Self::Handle;

    fn create_reserving_overlay(
        &mut self,
        anchor_line: usize,
        node: &Self::MountNode,
        height_hint: u32,
    ) -> Self::Handle;

    fn destroy_overlay(&mut self, handle: Self::Handle);

    /// Re-lays out an existing widget without recreating it.
    fn update_overlay_placement(&mut self, handle: &Self::Handle, geometry: &OverlayGeometry);

    /// The element that currently has focus, if any.
    fn focused(&self) -> Option<Self::Focus>;

    /// Whether `focus` lives inside the widget behind `handle`.
    fn overlay_contains(&self, handle: &Self::Handle, focus: &Self::Focus) -> bool;

    /// Whether `focus` is still attached to the document.
    fn is_attached(&self, focus: &Self::Focus) -> bool;

    fn restore_focus(&mut self, focus: &Self::Focus);

    /// Creates the native widget for `geometry`. Only this call differs between
    /// placements.
    fn create_overlay(&mut self, geometry: &OverlayGeometry, node: &Self::MountNode) -> Self::Handle {
        match geometry.placement {
            Placement::Floating { .. } => self.create_floating_overlay(geometry.anchor(), node),
            Placement::Reserving { height_hint } => self.create_reserving_overlay(
                geometry.anchor_line,
                node,
                geometry.size.unwrap_or(height_hint),
            ),
        }
    }
}
