//! End-to-end review flows through `AiEditSurface` against the fake editor.

use futures::executor::block_on;
use indoc::indoc;
use pretty_assertions::assert_eq;
use zqlz_ai_diff::test_support::{
    CannedSuggestion, FailingSuggestion, FakeEditor, HostCall, RecordingRenderer,
};
use zqlz_ai_diff::{
    AiDiffError, AiDiffSettings, AiEditSurface, DualText, EditRequest, EditorHost, HunkKind,
    LineRange, OverlayId, OverlayPayload, RawLineChange, Side,
};

type Surface = AiEditSurface<FakeEditor>;
type Renderer = RecordingRenderer<OverlayPayload>;

const BASE: &str = indoc! {"
    select id
    from users
"};

const PROPOSED: &str = indoc! {"
    select id, name
    from users
    where active
"};

fn reviewing() -> (Surface, FakeEditor, Renderer) {
    let mut surface = Surface::new(AiDiffSettings::default());
    let mut host = FakeEditor::with_texts(BASE, PROPOSED);
    let mut renderer = Renderer::new();
    surface.set_texts(DualText::new(BASE, PROPOSED), &mut host, &mut renderer);
    (surface, host, renderer)
}

// ============================================================================
// Hunk overlays
// ============================================================================

mod hunk_overlay_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_each_hunk_gets_an_action_overlay() {
        let (surface, host, renderer) = reviewing();

        assert!(surface.is_diff_mode());
        assert_eq!(surface.hunks().len(), 2);
        assert_eq!(surface.hunks()[0].kind(), HunkKind::Modification);
        assert_eq!(surface.hunks()[1].kind(), HunkKind::Insertion);

        assert_eq!(host.widget_for(&OverlayId::hunk(0)).unwrap().line, 1);
        assert_eq!(host.widget_for(&OverlayId::hunk(1)).unwrap().line, 3);

        match &renderer.content[&OverlayId::hunk(1)] {
            OverlayPayload::HunkActions(actions) => {
                assert_eq!(actions.index, 1);
                assert_eq!(actions.kind, HunkKind::Insertion);
                assert_eq!(actions.hunk.modified_range, LineRange::new(3, 3));
            }
            other => panic!("unexpected payload {other:?}"),
        }
    }

    #[test]
    fn test_hidden_hunk_actions_still_compute_hunks() {
        let mut surface =
            Surface::new(AiDiffSettings::default().with_show_hunk_actions(false));
        let mut host = FakeEditor::new();
        let mut renderer = Renderer::new();

        surface.set_texts(DualText::new(BASE, PROPOSED), &mut host, &mut renderer);

        assert_eq!(surface.hunks().len(), 2);
        assert!(surface.engine().is_empty());
        assert_eq!(host.create_count(), 0);
    }

    #[test]
    fn test_identical_texts_leave_diff_mode() {
        let mut surface = Surface::new(AiDiffSettings::default());
        let mut host = FakeEditor::new();
        let mut renderer = Renderer::new();

        surface.set_texts(DualText::plain(BASE), &mut host, &mut renderer);

        assert!(!surface.is_diff_mode());
        assert!(surface.hunks().is_empty());
        assert!(surface.engine().is_empty());
    }

    #[test]
    fn test_unchanged_refresh_keeps_widgets() {
        let (mut surface, mut host, mut renderer) = reviewing();
        host.clear_calls();

        let stats = surface.on_diff_updated(&mut host, &mut renderer);

        assert_eq!(stats.churn(), 0);
        assert_eq!(stats.kept, 2);
        assert!(host.calls().is_empty());
    }
}

// ============================================================================
// Accept / reject
// ============================================================================

mod action_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_accept_writes_proposed_lines_into_base() {
        let (mut surface, mut host, mut renderer) = reviewing();
        let modification = surface.hunks()[0];

        let applied = surface
            .accept(&modification, &mut host, &mut renderer)
            .unwrap();

        assert!(applied);
        assert_eq!(
            surface.dual().base,
            indoc! {"
                select id, name
                from users
            "}
        );
        assert_eq!(surface.dual().proposed, PROPOSED);
        assert_eq!(surface.hunks().len(), 1);
        assert_eq!(surface.engine().len(), 1);
    }

    #[test]
    fn test_reject_drops_proposed_lines() {
        let (mut surface, mut host, mut renderer) = reviewing();
        let insertion = surface.hunks()[1];

        let applied = surface
            .reject(&insertion, &mut host, &mut renderer)
            .unwrap();

        assert!(applied);
        assert_eq!(surface.dual().base, BASE);
        assert_eq!(
            surface.dual().proposed,
            indoc! {"
                select id, name
                from users
            "}
        );
        assert_eq!(surface.hunks().len(), 1);
        assert_eq!(surface.hunks()[0].kind(), HunkKind::Modification);
    }

    #[test]
    fn test_resolving_every_hunk_leaves_diff_mode() {
        let (mut surface, mut host, mut renderer) = reviewing();

        while let Some(hunk) = surface.hunks().first().copied() {
            assert!(surface.accept(&hunk, &mut host, &mut renderer).unwrap());
        }

        assert!(!surface.is_diff_mode());
        assert_eq!(surface.dual().base, PROPOSED);
        assert!(surface.engine().is_empty());
    }

    #[test]
    fn test_stale_hunk_is_a_no_op() {
        let (mut surface, mut host, mut renderer) = reviewing();
        let stale = surface.hunks()[0];
        surface.accept(&stale, &mut host, &mut renderer).unwrap();
        let before = surface.dual().clone();

        let applied = surface.accept(&stale, &mut host, &mut renderer).unwrap();

        assert!(!applied);
        assert_eq!(surface.dual(), &before);
    }

    #[test]
    fn test_action_without_live_model_is_a_no_op() {
        let (mut surface, mut host, mut renderer) = reviewing();
        let hunk = surface.hunks()[0];
        host.set_live(false);

        let applied = surface.reject(&hunk, &mut host, &mut renderer).unwrap();

        assert!(!applied);
        assert_eq!(surface.dual(), &DualText::new(BASE, PROPOSED));
    }

    #[test]
    fn test_actions_revalidate_against_a_fresh_diff() {
        let (mut surface, mut host, mut renderer) = reviewing();
        let hunk = surface.hunks()[0];
        let diffs_before = host.diff_calls();

        surface.accept(&hunk, &mut host, &mut renderer).unwrap();

        // one diff to resolve the key, one for the refresh afterwards
        assert_eq!(host.diff_calls(), diffs_before + 2);
    }

    #[test]
    fn test_accepted_base_survives_next_diff_update() {
        let base = "select id\nfrom users\n";
        let proposed = "select id, name\nfrom users\n";
        let mut surface = Surface::new(AiDiffSettings::default());
        let mut host = FakeEditor::with_texts(base, proposed);
        let mut renderer = Renderer::new();
        surface.set_texts(DualText::new(base, proposed), &mut host, &mut renderer);
        let hunk = surface.hunks()[0];

        assert!(surface.accept(&hunk, &mut host, &mut renderer).unwrap());
        surface.on_diff_updated(&mut host, &mut renderer);

        assert_eq!(surface.dual().base, proposed);
        assert_eq!(host.model_text(Side::Base).as_deref(), Some(proposed));
        assert!(surface.hunks().is_empty());
        assert!(!surface.is_diff_mode());
    }

    #[test]
    fn test_rejected_proposal_survives_content_change() {
        let (mut surface, mut host, mut renderer) = reviewing();
        let insertion = surface.hunks()[1];

        surface.reject(&insertion, &mut host, &mut renderer).unwrap();
        surface.on_content_changed(&mut host, &mut renderer);

        assert_eq!(surface.dual().proposed, "select id, name\nfrom users\n");
        assert_eq!(surface.hunks().len(), 1);
        assert_eq!(host.model_writes(), 1);
    }

    #[test]
    fn test_set_texts_writes_both_models() {
        let mut surface = Surface::new(AiDiffSettings::default());
        let mut host = FakeEditor::new();
        let mut renderer = Renderer::new();

        surface.set_texts(DualText::new(BASE, PROPOSED), &mut host, &mut renderer);
        surface.on_diff_updated(&mut host, &mut renderer);

        assert_eq!(host.model_text(Side::Base).as_deref(), Some(BASE));
        assert_eq!(host.model_text(Side::Proposed).as_deref(), Some(PROPOSED));
        assert_eq!(surface.hunks().len(), 2);
    }

    #[test]
    fn test_cached_hunks_used_when_revalidation_is_off() {
        let mut surface =
            Surface::new(AiDiffSettings::default().with_revalidate_before_patch(false));
        let mut host = FakeEditor::with_texts(BASE, PROPOSED);
        let mut renderer = Renderer::new();
        surface.set_texts(DualText::new(BASE, PROPOSED), &mut host, &mut renderer);
        let hunk = surface.hunks()[0];
        let diffs_before = host.diff_calls();

        assert!(surface.accept(&hunk, &mut host, &mut renderer).unwrap());
        // only the refresh after the action diffs
        assert_eq!(host.diff_calls(), diffs_before + 1);

        assert!(!surface.accept(&hunk, &mut host, &mut renderer).unwrap());
    }

    #[test]
    fn test_accept_all_and_reject_all() {
        let (mut surface, mut host, mut renderer) = reviewing();
        surface.accept_all(&mut host, &mut renderer);
        assert_eq!(surface.dual(), &DualText::plain(PROPOSED));
        assert!(surface.engine().is_empty());

        let (mut surface, mut host, mut renderer) = reviewing();
        surface.reject_all(&mut host, &mut renderer);
        assert_eq!(surface.dual(), &DualText::plain(BASE));
        assert!(!surface.is_diff_mode());
    }
}

// ============================================================================
// Failures
// ============================================================================

mod failure_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_out_of_range_hunk_abandons_diff_view() {
        let mut surface = Surface::new(AiDiffSettings::default());
        let mut host = FakeEditor::with_texts(BASE, PROPOSED);
        host.force_line_diff(vec![RawLineChange::new(1, 1, 5, 6)]);
        let mut renderer = Renderer::new();
        surface.set_texts(DualText::new(BASE, PROPOSED), &mut host, &mut renderer);
        assert!(host.widget_for(&OverlayId::hunk(0)).is_some());
        let hunk = surface.hunks()[0];

        let err = surface
            .accept(&hunk, &mut host, &mut renderer)
            .unwrap_err();

        assert!(matches!(err, AiDiffError::MalformedSplice { .. }));
        assert!(!err.is_benign());
        assert!(!surface.is_diff_mode());
        assert!(surface.hunks().is_empty());
        assert!(surface.engine().is_empty());
        assert!(host.widget_for(&OverlayId::hunk(0)).is_none());
        assert_eq!(surface.dual(), &DualText::new(BASE, PROPOSED));
    }

    #[test]
    fn test_editing_after_abandon_reenters_diff_view() {
        let mut surface = Surface::new(AiDiffSettings::default());
        let mut host = FakeEditor::with_texts(BASE, PROPOSED);
        host.force_line_diff(vec![RawLineChange::new(1, 1, 5, 6)]);
        let mut renderer = Renderer::new();
        surface.set_texts(DualText::new(BASE, PROPOSED), &mut host, &mut renderer);
        let hunk = surface.hunks()[0];
        surface.accept(&hunk, &mut host, &mut renderer).unwrap_err();

        host.set_texts(BASE, "select id, name\nfrom users\n");
        surface.on_content_changed(&mut host, &mut renderer);

        assert!(surface.is_diff_mode());
        assert_eq!(surface.hunks().len(), 1);
    }
}

// ============================================================================
// Host events
// ============================================================================

mod host_event_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_content_change_pulls_text_from_host() {
        let (mut surface, mut host, mut renderer) = reviewing();
        host.set_texts(BASE, "select id, name\nfrom users\n");

        surface.on_content_changed(&mut host, &mut renderer);

        assert_eq!(surface.dual().proposed, "select id, name\nfrom users\n");
        assert_eq!(surface.hunks().len(), 1);
        assert!(!surface.engine().contains(&OverlayId::hunk(1)));
    }

    #[test]
    fn test_missing_model_clears_overlays() {
        let (mut surface, mut host, mut renderer) = reviewing();
        host.set_live(false);

        let stats = surface.on_diff_updated(&mut host, &mut renderer);

        assert!(stats.skipped);
        assert!(surface.engine().is_empty());
        assert_eq!(renderer.unmounted.len(), 2);
        assert_eq!(surface.dual(), &DualText::new(BASE, PROPOSED));
    }

    #[test]
    fn test_replaced_editor_rebuilds_without_remounting() {
        let (mut surface, mut host, mut renderer) = reviewing();
        surface.editor_replaced();

        let stats = surface.refresh(&mut host, &mut renderer);

        assert_eq!(stats.rebuilt, 2);
        assert_eq!(stats.created, 0);
        assert_eq!(renderer.mounted.len(), 2);
    }

    #[test]
    fn test_unmount_releases_all_content() {
        let (mut surface, _host, mut renderer) = reviewing();

        surface.unmount(&mut renderer);

        assert!(surface.engine().is_empty());
        assert!(renderer.content.is_empty());
    }
}

// ============================================================================
// Prompt boxes
// ============================================================================

mod prompt_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_prompt_box_reserves_configured_height() {
        let mut surface = Surface::new(AiDiffSettings::default().with_prompt_box_height(50));
        let mut host = FakeEditor::new();
        let mut renderer = Renderer::new();
        surface.set_texts(DualText::plain(BASE), &mut host, &mut renderer);

        let id = surface.open_prompt_box(1, &mut host, &mut renderer);

        assert_eq!(id, OverlayId::prompt(1));
        let widget = host.widget_for(&id).unwrap();
        assert_eq!(widget.line, 1);
        assert_eq!(widget.height, Some(50));
    }

    #[test]
    fn test_prompt_line_is_clamped_to_the_text() {
        let mut surface = Surface::new(AiDiffSettings::default());
        let mut host = FakeEditor::new();
        let mut renderer = Renderer::new();
        surface.set_texts(DualText::plain("select 1"), &mut host, &mut renderer);

        let id = surface.open_prompt_box(40, &mut host, &mut renderer);

        assert_eq!(host.widget_for(&id).unwrap().line, 1);
    }

    #[test]
    fn test_measured_size_rebuilds_and_keeps_focus() {
        let (mut surface, mut host, mut renderer) = reviewing();
        let id = surface.open_prompt_box(2, &mut host, &mut renderer);
        let focus = host.focus_inside(&id, "instruction-input");
        host.clear_calls();

        let stats = surface
            .report_measured_size(&id, 120, &mut host, &mut renderer)
            .expect("size change should trigger a pass");

        assert_eq!(stats.rebuilt, 1);
        assert!(stats.focus_restored);
        assert_eq!(host.widget_for(&id).unwrap().height, Some(120));
        assert_eq!(host.focused_element(), Some(&focus));
        assert!(host
            .calls()
            .contains(&HostCall::RestoreFocus { node: focus.node }));
    }

    #[test]
    fn test_same_measured_size_is_ignored() {
        let (mut surface, mut host, mut renderer) = reviewing();
        let id = surface.open_prompt_box(2, &mut host, &mut renderer);

        let pass = surface.report_measured_size(&id, 72, &mut host, &mut renderer);

        assert!(pass.is_none());
    }

    #[test]
    fn test_closing_prompt_box_destroys_it() {
        let (mut surface, mut host, mut renderer) = reviewing();
        let id = surface.open_prompt_box(2, &mut host, &mut renderer);

        assert!(surface.close_prompt_box(&id, &mut host, &mut renderer));
        assert!(!surface.close_prompt_box(&id, &mut host, &mut renderer));
        assert!(host.widget_for(&id).is_none());
        assert!(surface.prompts().is_empty());
    }
}

// ============================================================================
// Suggestions
// ============================================================================

mod suggestion_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_submitted_prompt_becomes_the_proposal() {
        let mut surface = Surface::new(AiDiffSettings::default());
        let mut host = FakeEditor::new();
        let mut renderer = Renderer::new();
        surface.set_texts(DualText::plain(BASE), &mut host, &mut renderer);
        let id = surface.open_prompt_box(1, &mut host, &mut renderer);
        let provider = CannedSuggestion::new(PROPOSED);

        let submitted = block_on(surface.submit_prompt(
            &id,
            "also select the name",
            &provider,
            &mut host,
            &mut renderer,
        ))
        .unwrap();

        assert!(submitted);
        assert_eq!(
            provider.requests(),
            vec![EditRequest::new(BASE, "also select the name").at_line(1)]
        );
        assert_eq!(surface.dual(), &DualText::new(BASE, PROPOSED));
        assert!(surface.is_diff_mode());
        assert!(surface.prompts().is_empty());
        assert_eq!(surface.engine().len(), 2);
    }

    #[test]
    fn test_failed_suggestion_leaves_texts_alone() {
        let mut surface = Surface::new(AiDiffSettings::default());
        let mut host = FakeEditor::new();
        let mut renderer = Renderer::new();
        surface.set_texts(DualText::plain(BASE), &mut host, &mut renderer);

        let result = block_on(surface.request_suggestion(
            &FailingSuggestion,
            EditRequest::new(BASE, "anything"),
            &mut host,
            &mut renderer,
        ));

        assert!(result.is_err());
        assert_eq!(surface.dual(), &DualText::plain(BASE));
    }

    #[test]
    fn test_submit_to_closed_prompt_does_nothing() {
        let mut surface = Surface::new(AiDiffSettings::default());
        let mut host = FakeEditor::new();
        let mut renderer = Renderer::new();
        let provider = CannedSuggestion::new(PROPOSED);

        let submitted = block_on(surface.submit_prompt(
            &OverlayId::prompt(9),
            "noop",
            &provider,
            &mut host,
            &mut renderer,
        ))
        .unwrap();

        assert!(!submitted);
        assert!(provider.requests().is_empty());
    }
}
