//! Integration tests for change detection: the editor's event path and the
//! background poller fallback.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use fxstack_core::{shared_clip, Clip, FilterCatalog, NullRenderer, SharedClip, Track};
use fxstack_editor::{EditorPrefs, FilterStackController, TimelineSink};

#[derive(Default)]
struct Counter(AtomicUsize);

impl TimelineSink for Counter {
    fn timeline_changed(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

impl Counter {
    fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

const INTERVAL_MS: u64 = 20;

fn polling_controller(sink: Arc<Counter>) -> FilterStackController {
    FilterStackController::new(FilterCatalog::builtin(), Arc::new(NullRenderer), sink).with_prefs(
        EditorPrefs {
            poll_interval_ms: INTERVAL_MS,
            ..EditorPrefs::default()
        },
        None,
    )
}

fn clip_with(names: &[&str]) -> (SharedClip, Track) {
    let catalog = FilterCatalog::builtin();
    let filters = names
        .iter()
        .map(|n| fxstack_core::shared(fxstack_core::Filter::new(catalog.find(n).unwrap())))
        .collect();
    let clip = shared_clip(Clip::new("clip").with_filters(filters));
    let mut track = Track::new_video("V1");
    track.append_clip(clip.clone());
    (clip, track)
}

fn settle() {
    thread::sleep(Duration::from_millis(INTERVAL_MS * 6));
}

#[test]
fn direct_keyframe_write_is_noticed_by_poller() {
    let sink = Arc::new(Counter::default());
    let mut c = polling_controller(sink.clone());
    let (clip, track) = clip_with(&["Blur", "Saturation"]);
    c.set_clip(clip.clone(), track.location_of(&clip).unwrap(), false);
    assert!(c.is_polling());
    settle();
    assert!(!c.changes().is_set());

    // A keyframe editor writing straight into the filter.
    clip.read().filters[1]
        .write()
        .set_property("Saturation", "0=0.125;50=1");
    settle();

    assert!(c.changes().take());
    assert_eq!(sink.count(), 1);
}

#[test]
fn editor_writes_notify_immediately() {
    let sink = Arc::new(Counter::default());
    let mut c = FilterStackController::new(FilterCatalog::builtin(), Arc::new(NullRenderer), sink.clone())
        .with_prefs(
            EditorPrefs {
                poll_fallback: false,
                ..EditorPrefs::default()
            },
            None,
        );
    let (clip, track) = clip_with(&["Blur"]);
    c.set_clip(clip.clone(), track.location_of(&clip).unwrap(), false);
    assert!(!c.is_polling());

    assert!(c.set_property_value(0, "av.luma_radius", "5"));
    assert!(c.changes().is_set());
    assert_eq!(sink.count(), 1);
}

#[test]
fn editor_writes_are_announced_once_while_polling() {
    let sink = Arc::new(Counter::default());
    let mut c = polling_controller(sink.clone());
    let (clip, track) = clip_with(&["Blur", "Saturation"]);
    c.set_clip(clip.clone(), track.location_of(&clip).unwrap(), false);
    assert!(c.is_polling());

    assert!(c.set_property_value(0, "av.luma_radius", "5"));
    settle();

    assert!(c.changes().is_set());
    assert_eq!(sink.count(), 1);
}

#[test]
fn poller_follows_stack_rebuilds() {
    let sink = Arc::new(Counter::default());
    let mut c = polling_controller(sink.clone());
    let (clip, track) = clip_with(&["Blur"]);
    c.set_clip(clip.clone(), track.location_of(&clip).unwrap(), false);

    let sat = c.catalog().find("Saturation").unwrap();
    c.add_filter(sat).unwrap();
    c.changes().take();
    let before = sink.count();

    let added = clip.read().filters[1].clone();
    added.write().set_property("Saturation", "0=1");
    settle();

    assert!(c.changes().is_set());
    assert!(sink.count() > before);
}

#[test]
fn clearing_stops_polling() {
    let sink = Arc::new(Counter::default());
    let mut c = polling_controller(sink.clone());
    let (clip, track) = clip_with(&["Blur"]);
    c.set_clip(clip.clone(), track.location_of(&clip).unwrap(), false);
    c.clear_clip();
    assert!(!c.is_polling());

    clip.read().filters[0]
        .write()
        .set_property("av.luma_radius", "7");
    settle();
    assert!(!c.changes().is_set());
    assert_eq!(sink.count(), 0);
}
