//! In-memory editor host and renderer for tests.
//!
//! [`FakeEditor`] behaves like a diff editor with native overlay widgets: it
//! hands out opaque handles, records every native call, and drops focus when
//! the widget holding the focused element is destroyed.

use std::cell::Cell;
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::anchor::{Anchor, AnchorPreference};
use crate::diff::{DiffEngine, RawLineChange};
use crate::host::EditorHost;
use crate::overlay::{OverlayGeometry, OverlayId, OverlayRenderer};
use crate::suggest::{EditRequest, SuggestionProvider};
use crate::types::Side;

/// Opaque native handle.
#[derive(Debug, PartialEq, Eq)]
pub struct FakeHandle(u64);

/// Content node; the number identifies it across widget rebuilds.
#[derive(Debug, PartialEq, Eq)]
pub struct FakeNode(pub u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FakeFocus {
    pub node: u64,
    pub element: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FakeWidget {
    pub node: u64,
    pub line: usize,
    pub preference: Option<AnchorPreference>,
    pub height: Option<u32>,
}

/// A native call the editor received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCall {
    CreateFloating { node: u64, line: usize },
    CreateReserving { node: u64, line: usize, height: u32 },
    Destroy { node: u64 },
    UpdatePlacement { node: u64, line: usize },
    RestoreFocus { node: u64 },
}

#[derive(Debug, Default)]
pub struct FakeEditor {
    live: bool,
    base: String,
    proposed: String,
    next_handle: u64,
    next_node: u64,
    widgets: BTreeMap<u64, FakeWidget>,
    nodes: HashMap<u64, OverlayId>,
    focused: Option<FakeFocus>,
    calls: Vec<HostCall>,
    diff_calls: Cell<usize>,
    model_writes: usize,
    forced_diff: Option<Vec<RawLineChange>>,
}

impl FakeEditor {
    pub fn new() -> Self {
        Self {
            live: true,
            ..Self::default()
        }
    }

    pub fn with_texts(base: impl Into<String>, proposed: impl Into<String>) -> Self {
        let mut editor = Self::new();
        editor.set_texts(base, proposed);
        editor
    }

    pub fn set_texts(&mut self, base: impl Into<String>, proposed: impl Into<String>) {
        self.base = base.into();
        self.proposed = proposed.into();
    }

    pub fn set_live(&mut self, live: bool) {
        self.live = live;
    }

    pub fn calls(&self) -> &[HostCall] {
        &self.calls
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    pub fn create_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|call| {
                matches!(
                    call,
                    HostCall::CreateFloating { .. } | HostCall::CreateReserving { .. }
                )
            })
            .count()
    }

    pub fn destroy_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|call| matches!(call, HostCall::Destroy { .. }))
            .count()
    }

    pub fn diff_calls(&self) -> usize {
        self.diff_calls.get()
    }

    /// Number of times a model's text was replaced through the host.
    pub fn model_writes(&self) -> usize {
        self.model_writes
    }

    /// Makes the editor report `changes` for every diff, whatever the texts.
    pub fn force_line_diff(&mut self, changes: Vec<RawLineChange>) {
        self.forced_diff = Some(changes);
    }

    /// Live widgets, in creation order.
    pub fn widgets(&self) -> Vec<&FakeWidget> {
        self.widgets.values().collect()
    }

    /// The widget currently showing overlay `id`.
    pub fn widget_for(&self, id: &OverlayId) -> Option<&FakeWidget> {
        let node = self.node_of(id)?;
        self.widgets.values().find(|widget| widget.node == node)
    }

    /// Puts focus on an element inside overlay `id`.
    pub fn focus_inside(&mut self, id: &OverlayId, element: &str) -> FakeFocus {
        let node = self
            .node_of(id)
            .unwrap_or_else(|| panic!("no mount node for overlay {id}"));
        let focus = FakeFocus {
            node,
            element: element.to_string(),
        };
        self.focused = Some(focus.clone());
        focus
    }

    pub fn focused_element(&self) -> Option<&FakeFocus> {
        self.focused.as_ref()
    }

    fn node_of(&self, id: &OverlayId) -> Option<u64> {
        self.nodes
            .iter()
            .filter(|(_, owner)| *owner == id)
            .map(|(node, _)| *node)
            .max()
    }

    fn insert_widget(&mut self, widget: FakeWidget) -> FakeHandle {
        self.next_handle += 1;
        self.widgets.insert(self.next_handle, widget);
        FakeHandle(self.next_handle)
    }
}

impl EditorHost for FakeEditor {
    type Handle = FakeHandle;
    type MountNode = FakeNode;
    type Focus = FakeFocus;

    fn is_live(&self) -> bool {
        self.live
    }

    fn model_text(&self, side: Side) -> Option<String> {
        if !self.live {
            return None;
        }
        Some(match side {
            Side::Base => self.base.clone(),
            Side::Proposed => self.proposed.clone(),
        })
    }

    fn set_model_text(&mut self, side: Side, text: &str) {
        if !self.live {
            return;
        }
        match side {
            Side::Base => self.base = text.to_string(),
            Side::Proposed => self.proposed = text.to_string(),
        }
        self.model_writes += 1;
    }

    fn compute_line_diff(&self, original: &str, modified: &str) -> Vec<RawLineChange> {
        self.diff_calls.set(self.diff_calls.get() + 1);
        match &self.forced_diff {
            Some(changes) => changes.clone(),
            None => DiffEngine::default().line_changes(original, modified),
        }
    }

    fn create_mount_node(&mut self, id: &OverlayId) -> FakeNode {
        self.next_node += 1;
        self.nodes.insert(self.next_node, id.clone());
        FakeNode(self.next_node)
    }

    fn create_floating_overlay(&mut self, anchor: Anchor, node: &FakeNode) -> FakeHandle {
        self.calls.push(HostCall::CreateFloating {
            node: node.0,
            line: anchor.line,
        });
        self.insert_widget(FakeWidget {
            node: node.0,
            line: anchor.line,
            preference: Some(anchor.preference),
            height: None,
        })
    }

    fn create_reserving_overlay(
        &mut self,
        anchor_line: usize,
        node: &FakeNode,
        height_hint: u32,
    ) -> FakeHandle {
        self.calls.push(HostCall::CreateReserving {
            node: node.0,
            line: anchor_line,
            height: height_hint,
        });
        self.insert_widget(FakeWidget {
            node: node.0,
            line: anchor_line,
            preference: None,
            height: Some(height_hint),
        })
    }

    fn destroy_overlay(&mut self, handle: FakeHandle) {
        let Some(widget) = self.widgets.remove(&handle.0) else {
            return;
        };
        self.calls.push(HostCall::Destroy { node: widget.node });
        if self
            .focused
            .as_ref()
            .is_some_and(|focus| focus.node == widget.node)
        {
            self.focused = None;
        }
    }

    fn update_overlay_placement(&mut self, handle: &FakeHandle, geometry: &OverlayGeometry) {
        if let Some(widget) = self.widgets.get_mut(&handle.0) {
            widget.line = geometry.anchor_line;
            self.calls.push(HostCall::UpdatePlacement {
                node: widget.node,
                line: geometry.anchor_line,
            });
        }
    }

    fn focused(&self) -> Option<FakeFocus> {
        self.focused.clone()
    }

    fn overlay_contains(&self, handle: &FakeHandle, focus: &FakeFocus) -> bool {
        self.widgets
            .get(&handle.0)
            .is_some_and(|widget| widget.node == focus.node)
    }

    fn is_attached(&self, focus: &FakeFocus) -> bool {
        self.widgets.values().any(|widget| widget.node == focus.node)
    }

    fn restore_focus(&mut self, focus: &FakeFocus) {
        self.calls.push(HostCall::RestoreFocus { node: focus.node });
        self.focused = Some(focus.clone());
    }
}

/// Renderer that records what it was asked to paint.
#[derive(Debug)]
pub struct RecordingRenderer<P> {
    pub mounted: Vec<OverlayId>,
    pub unmounted: Vec<OverlayId>,
    pub updates: usize,
    pub content: HashMap<OverlayId, P>,
}

impl<P> Default for RecordingRenderer<P> {
    fn default() -> Self {
        Self {
            mounted: Vec::new(),
            unmounted: Vec::new(),
            updates: 0,
            content: HashMap::new(),
        }
    }
}

impl<P> RecordingRenderer<P> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<P: Clone> OverlayRenderer<FakeNode, P> for RecordingRenderer<P> {
    fn mount(&mut self, id: &OverlayId, _node: &FakeNode, payload: &P) {
        self.mounted.push(id.clone());
        self.content.insert(id.clone(), payload.clone());
    }

    fn update(&mut self, id: &OverlayId, payload: &P) {
        self.updates += 1;
        self.content.insert(id.clone(), payload.clone());
    }

    fn unmount(&mut self, id: &OverlayId) {
        self.unmounted.push(id.clone());
        self.content.remove(id);
    }
}

/// Provider that answers every request with the same text and remembers
/// what it was asked.
#[derive(Debug, Default)]
pub struct CannedSuggestion {
    reply: String,
    requests: Mutex<Vec<EditRequest>>,
}

impl CannedSuggestion {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<EditRequest> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl SuggestionProvider for CannedSuggestion {
    async fn propose(&self, request: &EditRequest) -> anyhow::Result<String> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }
        Ok(self.reply.clone())
    }
}

/// Provider whose backend is always down.
#[derive(Debug, Default)]
pub struct FailingSuggestion;

#[async_trait]
impl SuggestionProvider for FailingSuggestion {
    async fn propose(&self, _request: &EditRequest) -> anyhow::Result<String> {
        anyhow::bail!("suggestion backend unavailable")
    }
}
