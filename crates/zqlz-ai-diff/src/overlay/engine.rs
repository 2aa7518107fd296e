//! Keyed reconciliation of desired overlays against native editor widgets.

use std::collections::HashSet;

use indexmap::IndexMap;

use super::{OverlayDescriptor, OverlayGeometry, OverlayId, OverlayRenderer};
use crate::host::EditorHost;

/// What the engine holds for one overlay id.
pub struct RegistryEntry<H: EditorHost> {
    pub id: OverlayId,
    /// Native widget, absent after the owning editor instance was replaced.
    native_handle: Option<H::Handle>,
    /// Content node; lives as long as the id does.
    node: H::MountNode,
    /// Geometry the current handle was built with.
    geometry: OverlayGeometry,
    /// Last size reported by the rendered content.
    measured_size: Option<u32>,
    dirty: bool,
}

impl<H: EditorHost> RegistryEntry<H> {
    pub fn native_handle(&self) -> Option<&H::Handle> {
        self.native_handle.as_ref()
    }

    pub fn node(&self) -> &H::MountNode {
        &self.node
    }

    pub fn geometry(&self) -> &OverlayGeometry {
        &self.geometry
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }
}

/// Counters for one reconciliation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileStats {
    pub created: usize,
    pub rebuilt: usize,
    pub destroyed: usize,
    pub kept: usize,
    pub relaid_out: usize,
    pub focus_restored: bool,
    /// The host had no live model, so the pass only cleared the registry.
    pub skipped: bool,
}

impl ReconcileStats {
    /// Overlays whose native widget was created, replaced or removed.
    pub fn churn(&self) -> usize {
        self.created + self.rebuilt + self.destroyed
    }
}

/// Owns the overlay registry for one live editor instance.
///
/// Passes are serialized through `&mut self`, and each one starts from the
/// registry the previous pass left behind.
pub struct OverlayEngine<H: EditorHost> {
    registry: IndexMap<OverlayId, RegistryEntry<H>>,
    restore_focus: bool,
    passes: u64,
}

impl<H: EditorHost> Default for OverlayEngine<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: EditorHost> OverlayEngine<H> {
    pub fn new() -> Self {
        Self {
            registry: IndexMap::new(),
            restore_focus: true,
            passes: 0,
        }
    }

    /// Whether focus inside an overlay is put back after a pass.
    pub fn with_focus_restore(mut self, restore_focus: bool) -> Self {
        self.restore_focus = restore_focus;
        self
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    pub fn contains(&self, id: &OverlayId) -> bool {
        self.registry.contains_key(id)
    }

    pub fn entry(&self, id: &OverlayId) -> Option<&RegistryEntry<H>> {
        self.registry.get(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &OverlayId> {
        self.registry.keys()
    }

    pub fn passes(&self) -> u64 {
        self.passes
    }

    /// Declarative entry point: runs one pass against the full desired list.
    pub fn set_desired_overlays<P, R>(
        &mut self,
        desired: &[OverlayDescriptor<P>],
        host: &mut H,
        renderer: &mut R,
    ) -> ReconcileStats
    where
        R: OverlayRenderer<H::MountNode, P>,
    {
        self.reconcile(desired, host, renderer)
    }

    /// Brings native widgets in line with `desired` using as few create and
    /// destroy calls as possible.
    ///
    /// Overlays whose id, anchor and size are unchanged keep their native
    /// handle untouched; recreating one would drop focus inside it and
    /// flicker.
    pub fn reconcile<P, R>(
        &mut self,
        desired: &[OverlayDescriptor<P>],
        host: &mut H,
        renderer: &mut R,
    ) -> ReconcileStats
    where
        R: OverlayRenderer<H::MountNode, P>,
    {
        self.passes += 1;
        let mut stats = ReconcileStats::default();

        if !host.is_live() {
            if !self.registry.is_empty() {
                tracing::debug!(
                    pass = self.passes,
                    overlays = self.registry.len(),
                    "editor model gone, clearing overlay registry"
                );
            }
            self.clear(renderer);
            stats.skipped = true;
            return stats;
        }

        let desired = dedup(desired);
        let saved_focus = self.focus_inside_overlays(host);

        // Absent ids go first so their widgets are gone before anything new
        // is created.
        let wanted: HashSet<&OverlayId> = desired.iter().map(|d| &d.id).collect();
        let absent: Vec<OverlayId> = self
            .registry
            .keys()
            .filter(|id| !wanted.contains(id))
            .cloned()
            .collect();
        let mut reserving_changed = false;
        for id in absent {
            if let Some(entry) = self.registry.swap_remove(&id) {
                reserving_changed |= entry.geometry.placement.is_reserving();
                if let Some(handle) = entry.native_handle {
                    host.destroy_overlay(handle);
                }
                renderer.unmount(&id);
                stats.destroyed += 1;
                tracing::trace!(id = %id, "destroyed overlay");
            }
        }

        let mut next: IndexMap<OverlayId, RegistryEntry<H>> =
            IndexMap::with_capacity(desired.len());
        let mut kept_floating: Vec<OverlayId> = Vec::new();

        for descriptor in desired {
            let id = descriptor.id.clone();
            match self.registry.swap_remove(&id) {
                Some(mut entry) => {
                    let geometry = descriptor.geometry(entry.measured_size);
                    let unchanged = !entry.dirty
                        && entry.native_handle.is_some()
                        && entry.geometry == geometry;

                    if unchanged {
                        renderer.update(&id, &descriptor.payload);
                        if !geometry.placement.is_reserving() {
                            kept_floating.push(id.clone());
                        }
                        stats.kept += 1;
                    } else {
                        if let Some(old) = entry.native_handle.take() {
                            host.destroy_overlay(old);
                        }
                        entry.native_handle = Some(host.create_overlay(&geometry, &entry.node));
                        entry.geometry = geometry;
                        entry.dirty = false;
                        renderer.update(&id, &descriptor.payload);
                        reserving_changed |= geometry.placement.is_reserving();
                        stats.rebuilt += 1;
                        tracing::trace!(
                            id = %id,
                            placement = geometry.placement.label(),
                            line = geometry.anchor_line,
                            "rebuilt overlay"
                        );
                    }
                    next.insert(id, entry);
                }
                None => {
                    let geometry = descriptor.geometry(None);
                    let node = host.create_mount_node(&id);
                    let handle = host.create_overlay(&geometry, &node);
                    renderer.mount(&id, &node, &descriptor.payload);
                    reserving_changed |= geometry.placement.is_reserving();
                    stats.created += 1;
                    tracing::trace!(
                        id = %id,
                        placement = geometry.placement.label(),
                        line = geometry.anchor_line,
                        "created overlay"
                    );
                    next.insert(
                        id.clone(),
                        RegistryEntry {
                            id,
                            native_handle: Some(handle),
                            node,
                            geometry,
                            measured_size: descriptor.measured_size,
                            dirty: false,
                        },
                    );
                }
            }
        }

        self.registry = next;

        // Reserved space above a floating widget moves the line it points at.
        if reserving_changed {
            for id in &kept_floating {
                let Some(entry) = self.registry.get(id) else {
                    continue;
                };
                if let Some(handle) = entry.native_handle.as_ref() {
                    host.update_overlay_placement(handle, &entry.geometry);
                    stats.relaid_out += 1;
                }
            }
        }

        let lost_focus = saved_focus
            .filter(|focus| host.focused().as_ref() != Some(focus) && host.is_attached(focus));
        if let Some(focus) = lost_focus {
            host.restore_focus(&focus);
            stats.focus_restored = true;
        }

        if stats.churn() > 0 {
            tracing::debug!(
                pass = self.passes,
                created = stats.created,
                rebuilt = stats.rebuilt,
                destroyed = stats.destroyed,
                kept = stats.kept,
                "reconciled overlays"
            );
        }

        stats
    }

    /// Records the size an overlay's content laid out at.
    ///
    /// Returns `true` if the overlay must be rebuilt on the next pass because
    /// the space it reserves changed.
    pub fn report_measured_size(&mut self, id: &OverlayId, size: u32) -> bool {
        let Some(entry) = self.registry.get_mut(id) else {
            tracing::trace!(id = %id, size, "size reported for unknown overlay");
            return false;
        };

        entry.measured_size = Some(size);
        if entry.geometry.placement.is_reserving() && entry.geometry.size != Some(size) {
            entry.dirty = true;
            tracing::debug!(id = %id, size, "overlay size changed, marked dirty");
            return true;
        }
        false
    }

    /// The owning editor instance was swapped for a new one. Old handles
    /// belong to the dead instance, so every overlay is rebuilt on the next
    /// pass. Content nodes are kept.
    pub fn editor_replaced(&mut self) {
        for entry in self.registry.values_mut() {
            entry.native_handle = None;
            entry.dirty = true;
        }
        tracing::debug!(overlays = self.registry.len(), "editor replaced, overlays marked dirty");
    }

    /// The owning editor instance unmounted. Drops everything without touching
    /// the (gone) editor.
    pub fn unmount<P, R>(&mut self, renderer: &mut R)
    where
        R: OverlayRenderer<H::MountNode, P>,
    {
        self.clear(renderer);
    }

    fn clear<P, R>(&mut self, renderer: &mut R)
    where
        R: OverlayRenderer<H::MountNode, P>,
    {
        for id in self.registry.keys() {
            renderer.unmount(id);
        }
        self.registry.clear();
    }

    fn focus_inside_overlays(&self, host: &H) -> Option<H::Focus> {
        if !self.restore_focus {
            return None;
        }
        let focus = host.focused()?;
        let inside = self.registry.values().any(|entry| {
            entry
                .native_handle
                .as_ref()
                .is_some_and(|handle| host.overlay_contains(handle, &focus))
        });
        inside.then_some(focus)
    }
}

/// Keeps the first descriptor for each id.
fn dedup<P>(desired: &[OverlayDescriptor<P>]) -> Vec<&OverlayDescriptor<P>> {
    let mut seen: HashSet<&OverlayId> = HashSet::with_capacity(desired.len());
    let mut unique = Vec::with_capacity(desired.len());
    for descriptor in desired {
        if seen.insert(&descriptor.id) {
            unique.push(descriptor);
        } else {
            tracing::warn!(id = %descriptor.id, "duplicate overlay id in desired set, ignoring");
        }
    }
    unique
}
