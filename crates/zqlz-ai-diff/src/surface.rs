//! The editing surface around one diff editor instance.
//!
//! [`AiEditSurface`] owns the base/proposed pair for a session and wires the
//! pieces together: host events recompute hunks, hunks and prompt boxes are
//! projected into overlay descriptors, and the overlay engine reconciles them.
//! Hunk actions are resolved against a fresh diff at click time and written
//! back by replacing a whole side of the pair.

use crate::anchor::compute_anchor;
use crate::diff::classify;
use crate::error::{AiDiffError, Result};
use crate::host::EditorHost;
use crate::overlay::{OverlayDescriptor, OverlayEngine, OverlayId, OverlayRenderer, ReconcileStats};
use crate::patch::{PatchDirection, apply_hunk};
use crate::settings::AiDiffSettings;
use crate::suggest::{EditRequest, SuggestionProvider};
use crate::types::{DualText, Hunk, HunkKind, Side, line_count};

/// Content of a hunk's accept/reject overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HunkActions {
    pub index: usize,
    pub hunk: Hunk,
    pub kind: HunkKind,
}

/// A prompt-entry box anchored below a line of the proposed text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptBox {
    pub id: OverlayId,
    pub line: usize,
}

/// What the renderer is asked to paint into an overlay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverlayPayload {
    HunkActions(HunkActions),
    Prompt(PromptBox),
}

pub struct AiEditSurface<H: EditorHost> {
    dual: DualText,
    hunks: Vec<Hunk>,
    prompts: Vec<PromptBox>,
    next_prompt: u64,
    engine: OverlayEngine<H>,
    settings: AiDiffSettings,
    abandoned: bool,
}

impl<H: EditorHost> AiEditSurface<H> {
    pub fn new(settings: AiDiffSettings) -> Self {
        Self {
            dual: DualText::default(),
            hunks: Vec::new(),
            prompts: Vec::new(),
            next_prompt: 0,
            engine: OverlayEngine::new().with_focus_restore(settings.restore_focus),
            settings,
            abandoned: false,
        }
    }

    pub fn dual(&self) -> &DualText {
        &self.dual
    }

    pub fn hunks(&self) -> &[Hunk] {
        &self.hunks
    }

    pub fn prompts(&self) -> &[PromptBox] {
        &self.prompts
    }

    pub fn engine(&self) -> &OverlayEngine<H> {
        &self.engine
    }

    pub fn settings(&self) -> &AiDiffSettings {
        &self.settings
    }

    /// Whether the diff view is showing. Off when there is nothing to review,
    /// or after a failed hunk action abandoned the diff.
    pub fn is_diff_mode(&self) -> bool {
        !self.dual.is_identical() && !self.abandoned
    }

    /// Replaces both texts and refreshes overlays.
    pub fn set_texts<R>(&mut self, dual: DualText, host: &mut H, renderer: &mut R) -> ReconcileStats
    where
        R: OverlayRenderer<H::MountNode, OverlayPayload>,
    {
        self.dual = dual;
        self.abandoned = false;
        self.write_back(Side::Base, host);
        self.write_back(Side::Proposed, host);
        self.refresh(host, renderer)
    }

    /// Installs a new candidate text from the AI backend.
    pub fn set_proposed<R>(
        &mut self,
        proposed: impl Into<String>,
        host: &mut H,
        renderer: &mut R,
    ) -> ReconcileStats
    where
        R: OverlayRenderer<H::MountNode, OverlayPayload>,
    {
        let dual = DualText::new(self.dual.base.clone(), proposed);
        self.set_texts(dual, host, renderer)
    }

    /// The host recomputed its diff.
    pub fn on_diff_updated<R>(&mut self, host: &mut H, renderer: &mut R) -> ReconcileStats
    where
        R: OverlayRenderer<H::MountNode, OverlayPayload>,
    {
        self.sync_from_host(host);
        self.refresh(host, renderer)
    }

    /// The user edited one of the models directly.
    pub fn on_content_changed<R>(&mut self, host: &mut H, renderer: &mut R) -> ReconcileStats
    where
        R: OverlayRenderer<H::MountNode, OverlayPayload>,
    {
        if self.sync_from_host(host) {
            self.abandoned = false;
        }
        self.refresh(host, renderer)
    }

    /// Recomputes hunks and reconciles overlays against the current texts.
    pub fn refresh<R>(&mut self, host: &mut H, renderer: &mut R) -> ReconcileStats
    where
        R: OverlayRenderer<H::MountNode, OverlayPayload>,
    {
        self.hunks = if self.is_diff_mode() && host.is_live() {
            classify(&host.compute_line_diff(&self.dual.base, &self.dual.proposed))
        } else {
            Vec::new()
        };

        let desired = self.desired_overlays();
        self.engine.reconcile(&desired, host, renderer)
    }

    /// Projects hunks and prompt boxes into the overlays that should exist.
    pub fn desired_overlays(&self) -> Vec<OverlayDescriptor<OverlayPayload>> {
        let mut desired = Vec::with_capacity(self.hunks.len() + self.prompts.len());

        if self.is_diff_mode() && self.settings.show_hunk_actions {
            let original_line_count = self.dual.base_line_count();
            for (index, hunk) in self.hunks.iter().enumerate() {
                let anchor = compute_anchor(hunk, original_line_count);
                desired.push(OverlayDescriptor::floating(
                    OverlayId::hunk(index),
                    anchor,
                    OverlayPayload::HunkActions(HunkActions {
                        index,
                        hunk: *hunk,
                        kind: hunk.kind(),
                    }),
                ));
            }
        }

        let last_line = line_count(&self.dual.proposed);
        for prompt in &self.prompts {
            desired.push(OverlayDescriptor::reserving(
                prompt.id.clone(),
                prompt.line.clamp(1, last_line),
                self.settings.prompt_box_height,
                OverlayPayload::Prompt(prompt.clone()),
            ));
        }

        desired
    }

    /// Opens a prompt box below `line` and returns its overlay id.
    pub fn open_prompt_box<R>(&mut self, line: usize, host: &mut H, renderer: &mut R) -> OverlayId
    where
        R: OverlayRenderer<H::MountNode, OverlayPayload>,
    {
        self.next_prompt += 1;
        let id = OverlayId::prompt(self.next_prompt);
        self.prompts.push(PromptBox {
            id: id.clone(),
            line,
        });
        tracing::debug!(id = %id, line, "opened prompt box");
        self.refresh(host, renderer);
        id
    }

    /// Closes a prompt box. Returns `false` if it was not open.
    pub fn close_prompt_box<R>(&mut self, id: &OverlayId, host: &mut H, renderer: &mut R) -> bool
    where
        R: OverlayRenderer<H::MountNode, OverlayPayload>,
    {
        let before = self.prompts.len();
        self.prompts.retain(|prompt| &prompt.id != id);
        if self.prompts.len() == before {
            return false;
        }
        self.refresh(host, renderer);
        true
    }

    /// Content inside an overlay laid out at `size`. Runs a pass if the
    /// overlay has to be rebuilt to reserve the new space.
    pub fn report_measured_size<R>(
        &mut self,
        id: &OverlayId,
        size: u32,
        host: &mut H,
        renderer: &mut R,
    ) -> Option<ReconcileStats>
    where
        R: OverlayRenderer<H::MountNode, OverlayPayload>,
    {
        if self.engine.report_measured_size(id, size) {
            let desired = self.desired_overlays();
            Some(self.engine.reconcile(&desired, host, renderer))
        } else {
            None
        }
    }

    /// Accepts the hunk identified by `key`. Returns `Ok(false)` when the
    /// action had nothing to do (stale hunk or no live model).
    pub fn accept<R>(&mut self, key: &Hunk, host: &mut H, renderer: &mut R) -> Result<bool>
    where
        R: OverlayRenderer<H::MountNode, OverlayPayload>,
    {
        self.act(key, PatchDirection::Accept, host, renderer)
    }

    /// Rejects the hunk identified by `key`.
    pub fn reject<R>(&mut self, key: &Hunk, host: &mut H, renderer: &mut R) -> Result<bool>
    where
        R: OverlayRenderer<H::MountNode, OverlayPayload>,
    {
        self.act(key, PatchDirection::Reject, host, renderer)
    }

    /// Runs an action for the hunk that was clicked.
    ///
    /// `key` is the hunk as it was when its overlay rendered. It is looked up
    /// again among the current hunks by its ranges, so a click that raced an
    /// edit does nothing instead of splicing the wrong lines.
    pub fn act<R>(
        &mut self,
        key: &Hunk,
        direction: PatchDirection,
        host: &mut H,
        renderer: &mut R,
    ) -> Result<bool>
    where
        R: OverlayRenderer<H::MountNode, OverlayPayload>,
    {
        let hunk = match self.resolve(key, host) {
            Ok(hunk) => hunk,
            Err(err) if err.is_benign() => {
                tracing::debug!(key = %key, reason = %err, "ignoring hunk action");
                return Ok(false);
            }
            Err(err) => return Err(err),
        };

        match apply_hunk(&self.dual, &hunk, direction) {
            Ok(text) => {
                let side = match direction {
                    PatchDirection::Accept => {
                        self.dual.base = text;
                        Side::Base
                    }
                    PatchDirection::Reject => {
                        self.dual.proposed = text;
                        Side::Proposed
                    }
                };
                self.write_back(side, host);
                tracing::debug!(hunk = %hunk, direction = ?direction, "hunk action applied");
                self.refresh(host, renderer);
                Ok(true)
            }
            Err(err) => {
                tracing::error!(hunk = %hunk, error = %err, "hunk action failed, leaving diff view");
                self.abandon(host, renderer);
                Err(err)
            }
        }
    }

    /// Takes every proposed change.
    pub fn accept_all<R>(&mut self, host: &mut H, renderer: &mut R) -> ReconcileStats
    where
        R: OverlayRenderer<H::MountNode, OverlayPayload>,
    {
        let dual = DualText::plain(self.dual.proposed.clone());
        self.set_texts(dual, host, renderer)
    }

    /// Drops every proposed change.
    pub fn reject_all<R>(&mut self, host: &mut H, renderer: &mut R) -> ReconcileStats
    where
        R: OverlayRenderer<H::MountNode, OverlayPayload>,
    {
        let dual = DualText::plain(self.dual.base.clone());
        self.set_texts(dual, host, renderer)
    }

    /// Asks the AI backend for a candidate and shows it as the proposal.
    pub async fn request_suggestion<S, R>(
        &mut self,
        provider: &S,
        request: EditRequest,
        host: &mut H,
        renderer: &mut R,
    ) -> anyhow::Result<ReconcileStats>
    where
        S: SuggestionProvider + ?Sized,
        R: OverlayRenderer<H::MountNode, OverlayPayload>,
    {
        let proposed = provider.propose(&request).await?;
        tracing::debug!(
            instruction_len = request.instruction.len(),
            proposed_lines = line_count(&proposed),
            "received suggestion"
        );
        Ok(self.set_proposed(proposed, host, renderer))
    }

    /// Sends the instruction typed into a prompt box and closes the box once
    /// a candidate arrives. Returns `Ok(false)` if the box is not open.
    pub async fn submit_prompt<S, R>(
        &mut self,
        id: &OverlayId,
        instruction: &str,
        provider: &S,
        host: &mut H,
        renderer: &mut R,
    ) -> anyhow::Result<bool>
    where
        S: SuggestionProvider + ?Sized,
        R: OverlayRenderer<H::MountNode, OverlayPayload>,
    {
        let Some(prompt) = self.prompts.iter().find(|prompt| &prompt.id == id) else {
            return Ok(false);
        };
        let request = EditRequest::new(self.dual.base.clone(), instruction).at_line(prompt.line);

        self.request_suggestion(provider, request, host, renderer)
            .await?;
        self.close_prompt_box(id, host, renderer);
        Ok(true)
    }

    /// The owning editor instance was replaced; the next pass rebuilds all
    /// overlays in the new one.
    pub fn editor_replaced(&mut self) {
        self.engine.editor_replaced();
    }

    /// The owning editor instance is gone.
    pub fn unmount<R>(&mut self, renderer: &mut R)
    where
        R: OverlayRenderer<H::MountNode, OverlayPayload>,
    {
        self.engine.unmount::<OverlayPayload, R>(renderer);
    }

    /// Pulls current model text from the host. Returns whether anything
    /// changed.
    fn sync_from_host(&mut self, host: &H) -> bool {
        let (Some(base), Some(proposed)) = (host.model_text(Side::Base), host.model_text(Side::Proposed))
        else {
            tracing::debug!(reason = %AiDiffError::MissingModel, "skipping model sync");
            return false;
        };

        if base == self.dual.base && proposed == self.dual.proposed {
            return false;
        }
        self.dual = DualText::new(base, proposed);
        true
    }

    /// Pushes one side of the pair into the editor's model so the next host
    /// event reads back what the surface holds.
    fn write_back(&self, side: Side, host: &mut H) {
        if !host.is_live() {
            return;
        }
        let text = self.dual.side(side);
        if host.model_text(side).as_deref() != Some(text) {
            host.set_model_text(side, text);
        }
    }

    fn resolve(&self, key: &Hunk, host: &H) -> Result<Hunk> {
        if !host.is_live() {
            return Err(AiDiffError::MissingModel);
        }
        if !self.is_diff_mode() {
            return Err(AiDiffError::StaleHunkReference(*key));
        }

        let fresh;
        let current: &[Hunk] = if self.settings.revalidate_before_patch {
            fresh = classify(&host.compute_line_diff(&self.dual.base, &self.dual.proposed));
            &fresh
        } else {
            &self.hunks
        };

        current
            .iter()
            .find(|hunk| *hunk == key)
            .copied()
            .ok_or(AiDiffError::StaleHunkReference(*key))
    }

    /// Drops the diff view in favor of the plain editor.
    fn abandon<R>(&mut self, host: &mut H, renderer: &mut R)
    where
        R: OverlayRenderer<H::MountNode, OverlayPayload>,
    {
        self.abandoned = true;
        self.refresh(host, renderer);
    }
}
