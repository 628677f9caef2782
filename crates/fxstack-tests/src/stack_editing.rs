//! Integration tests for editing a clip's filter stack.
//!
//! Exercises the controller driving structural edits through the edit
//! history onto clips owned by a track.

use std::sync::Arc;

use fxstack_core::{
    shared_clip, Clip, FilterCatalog, NullRenderer, SharedClip, Track, MASK_END_MARKER,
};
use fxstack_edit::{EditDone, EditHistory, FilterEdit};
use fxstack_editor::{EditorPrefs, FilterStackController, MaskTarget, NullSink};

// ── Helpers ────────────────────────────────────────────────────

struct Session {
    controller: FilterStackController,
    track: Track,
}

impl Session {
    fn new(clips: &[&[&str]]) -> Self {
        let catalog = FilterCatalog::builtin();
        let mut track = Track::new_video("V1");
        for (i, names) in clips.iter().enumerate() {
            let filters = names
                .iter()
                .map(|n| fxstack_core::shared(fxstack_core::Filter::new(catalog.find(n).unwrap())))
                .collect();
            track.append_clip(shared_clip(Clip::new(format!("clip {i}")).with_filters(filters)));
        }
        let controller = FilterStackController::new(catalog, Arc::new(NullRenderer), Arc::new(NullSink))
            .with_prefs(
                EditorPrefs {
                    poll_fallback: false,
                    ..EditorPrefs::default()
                },
                None,
            );
        Self { controller, track }
    }

    fn clip(&self, index: usize) -> SharedClip {
        self.track.clip_at(index).unwrap().clone()
    }

    fn edit(&mut self, index: usize) {
        let clip = self.clip(index);
        let location = self.track.location_of(&clip).unwrap();
        self.controller.set_clip(clip, location, true);
    }
}

fn names(clip: &SharedClip) -> Vec<String> {
    clip.read()
        .filters
        .iter()
        .map(|f| f.read().name().to_string())
        .collect()
}

fn row_names(controller: &FilterStackController) -> Vec<String> {
    controller
        .stack()
        .unwrap()
        .rows()
        .iter()
        .map(|r| r.filter.read().name().to_string())
        .collect()
}

// ── Masks ──────────────────────────────────────────────────────

#[test]
fn deleting_mask_start_removes_both_halves() {
    let mut s = Session::new(&[&["Blur", "Mask - Shape", "Color Correct", "Mask - End"]]);
    s.edit(0);
    let mask_start = s.clip(0).read().filters[1].clone();

    s.controller.delete_filter(&mask_start).unwrap();

    assert_eq!(names(&s.clip(0)), ["Blur", "Color Correct"]);
    assert_eq!(row_names(&s.controller), ["Blur", "Color Correct"]);
}

#[test]
fn deleting_mask_end_removes_both_halves() {
    let mut s = Session::new(&[&["Mask - Color", "Blur", "Mask - End", "Saturation"]]);
    s.edit(0);
    let mask_end = s.clip(0).read().filters[2].clone();
    assert_eq!(mask_end.read().info.filter_mask_filter, MASK_END_MARKER);

    s.controller.delete_filter(&mask_end).unwrap();
    assert_eq!(names(&s.clip(0)), ["Blur", "Saturation"]);
}

#[test]
fn mask_delete_is_one_undo_step() {
    let mut s = Session::new(&[&["Blur", "Mask - Shape", "Color Correct", "Mask - End"]]);
    s.edit(0);
    let mask_start = s.clip(0).read().filters[1].clone();
    s.controller.delete_filter(&mask_start).unwrap();

    assert!(s.controller.undo().unwrap());
    assert_eq!(
        names(&s.clip(0)),
        ["Blur", "Mask - Shape", "Color Correct", "Mask - End"]
    );
    assert!(Arc::ptr_eq(&s.clip(0).read().filters[1], &mask_start));
}

#[test]
fn second_mask_is_refused() {
    let mut s = Session::new(&[&["Blur"]]);
    s.edit(0);
    let start = s.controller.catalog().mask_filter("Mask - Shape").unwrap();
    s.controller
        .add_filter_mask(start.clone(), MaskTarget::FullStack)
        .unwrap();
    assert_eq!(names(&s.clip(0)), ["Mask - Shape", "Blur", "Mask - End"]);

    s.controller.add_filter_mask(start, MaskTarget::Filter(1)).unwrap();
    assert_eq!(s.clip(0).read().filter_count(), 3);
}

// ── Reordering ─────────────────────────────────────────────────

#[test]
fn reorder_last_to_first_keeps_others_in_order() {
    let mut s = Session::new(&[&["Blur", "Color Correct", "Saturation", "Curves"]]);
    s.edit(0);
    assert!(s.controller.request_move(0, 3).unwrap());
    assert_eq!(
        names(&s.clip(0)),
        ["Curves", "Blur", "Color Correct", "Saturation"]
    );
    assert!(s.controller.stack().unwrap().rows()[0].expanded);
}

#[test]
fn adjacent_drop_is_ignored() {
    let mut s = Session::new(&[&["Blur", "Color Correct", "Saturation"]]);
    s.edit(0);
    for (insert, delete) in [(0, 0), (1, 0), (0, 1), (2, 1)] {
        assert!(!s.controller.request_move(insert, delete).unwrap());
    }
    assert_eq!(names(&s.clip(0)), ["Blur", "Color Correct", "Saturation"]);
    assert!(!s.controller.history().can_undo());
}

// ── Session ────────────────────────────────────────────────────

#[test]
fn edits_on_another_clip_do_not_rebuild_stack() {
    let mut s = Session::new(&[&["Blur"], &["Saturation"]]);
    s.edit(0);

    // An edit to clip 1 arriving through a separate history.
    let other = s.clip(1);
    let mut history = EditHistory::default();
    let mut seen = 0;
    history
        .submit(&other, FilterEdit::remove(0), &mut |_: &EditDone| seen += 1)
        .unwrap();
    assert_eq!(seen, 1);

    assert!(!s.controller.reinit_stack_if_needed(false));
    assert_eq!(row_names(&s.controller), ["Blur"]);
}

#[test]
fn external_undo_is_detected_and_rebuilt() {
    let mut s = Session::new(&[&["Blur", "Saturation"]]);
    s.edit(0);
    s.clip(0).write().filters.pop();

    assert!(s.controller.reinit_stack_if_needed(false));
    assert_eq!(row_names(&s.controller), ["Blur"]);
    assert!(!s.controller.reinit_stack_if_needed(false));
}

#[test]
fn switching_clips_replaces_stack() {
    let mut s = Session::new(&[&["Blur"], &["Saturation", "Curves"]]);
    s.edit(0);
    s.edit(1);
    assert!(s.controller.clip_is_being_edited(&s.clip(1)));
    assert!(!s.controller.clip_is_being_edited(&s.clip(0)));
    assert_eq!(row_names(&s.controller), ["Saturation", "Curves"]);

    s.controller.clear_clip();
    assert!(s.controller.edited_clip().is_none());
    let first = s.clip(1).read().filters[0].clone();
    assert!(s.controller.delete_filter(&first).is_ok());
    assert_eq!(s.clip(1).read().filter_count(), 2);
}

#[test]
fn undo_after_clip_switch_touches_original_clip_only() {
    let mut s = Session::new(&[&["Blur"], &["Saturation"]]);
    s.edit(0);
    let curves = s.controller.catalog().find("Curves").unwrap();
    s.controller.add_filter(curves).unwrap();
    s.edit(1);

    assert!(s.controller.undo().unwrap());
    assert_eq!(names(&s.clip(0)), ["Blur"]);
    assert_eq!(row_names(&s.controller), ["Saturation"]);
}

// ── Properties ─────────────────────────────────────────────────

mod props {
    use super::*;
    use proptest::prelude::*;

    const POOL: [&str; 4] = ["Blur", "Color Correct", "Saturation", "Curves"];

    proptest! {
        #[test]
        fn accepted_moves_equal_remove_then_insert(insert in 0usize..6, delete in 0usize..4) {
            let mut s = Session::new(&[&POOL]);
            s.edit(0);
            let before: Vec<String> = POOL.iter().map(|n| n.to_string()).collect();

            let moved = s.controller.request_move(insert, delete).unwrap();
            prop_assert_eq!(moved, insert.abs_diff(delete) >= 2);

            let mut expected = before.clone();
            if moved {
                let item = expected.remove(delete);
                expected.insert(insert.min(expected.len()), item);
            }
            prop_assert_eq!(names(&s.clip(0)), expected);
        }
    }
}
