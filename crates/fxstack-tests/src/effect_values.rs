//! Integration tests for saving and loading effect values through the
//! controller.

use std::sync::Arc;

use fxstack_core::{
    shared, shared_clip, Clip, Filter, FilterCatalog, FilterRenderer, FxStackError, PropertyMap,
    Track,
};
use fxstack_edit::EffectValues;
use fxstack_editor::{EditorPrefs, FilterStackController, NullSink, Notice};
use parking_lot::Mutex;
use tempfile::TempDir;
use uuid::Uuid;

#[derive(Default)]
struct Recorder {
    pushes: Mutex<Vec<(Uuid, PropertyMap)>>,
}

impl FilterRenderer for Recorder {
    fn set_disabled(&self, _filter_id: Uuid, _disabled: bool) {}

    fn set_properties(&self, filter_id: Uuid, properties: &PropertyMap) {
        self.pushes.lock().push((filter_id, properties.clone()));
    }
}

fn editing(names: &[&str], recorder: Arc<Recorder>) -> FilterStackController {
    let catalog = FilterCatalog::builtin();
    let filters = names
        .iter()
        .map(|n| shared(Filter::new(catalog.find(n).unwrap()).with_renderer(recorder.clone())))
        .collect();
    let clip = shared_clip(Clip::new("clip").with_filters(filters));
    let mut track = Track::new_video("V1");
    let location = track.append_clip(clip.clone());

    let mut controller = FilterStackController::new(catalog, recorder, Arc::new(NullSink))
        .with_prefs(
            EditorPrefs {
                poll_fallback: false,
                ..EditorPrefs::default()
            },
            None,
        );
    controller.set_clip(clip, location, false);
    controller
}

fn filter(controller: &FilterStackController, index: usize) -> fxstack_core::SharedFilter {
    controller.stack().unwrap().rows()[index].filter.clone()
}

#[test]
fn save_load_round_trip_onto_another_instance() {
    let dir = TempDir::new().unwrap();
    let recorder = Arc::new(Recorder::default());
    let mut c = editing(&["Curves", "Curves"], recorder.clone());

    let source = filter(&c, 0);
    {
        let mut f = source.write();
        f.set_property("Channel", "0.9");
        f.set_property("curve_points", "0/0;100/140;255/255");
        f.value = Some("0.0=0.0;0.5=0.7;1.0=1.0".into());
    }

    let path = dir.path().join(c.default_save_name(0).unwrap());
    assert!(path.ends_with("Curves_effect_values.data"));
    c.save_effect_values(0, &path).unwrap();
    assert!(c.load_effect_values(1, &path).unwrap());

    let (src, dst) = (source.read(), filter(&c, 1));
    let dst = dst.read();
    assert_eq!(dst.properties, src.properties);
    assert_eq!(dst.non_mlt_properties, src.non_mlt_properties);
    assert_eq!(dst.value, src.value);

    let pushes = recorder.pushes.lock();
    assert_eq!(pushes.last().map(|(id, _)| *id), Some(dst.id()));
    assert!(c.stack().unwrap().rows()[1].expanded);
}

#[test]
fn incompatible_load_leaves_target_untouched() {
    let dir = TempDir::new().unwrap();
    let mut c = editing(&["Blur", "Saturation"], Arc::new(Recorder::default()));
    let path = dir.path().join("blur.data");
    c.save_effect_values(0, &path).unwrap();

    let target = filter(&c, 1);
    let before = target.read().properties.clone();

    assert!(!c.load_effect_values(1, &path).unwrap());
    assert_eq!(target.read().properties, before);
    match c.notice() {
        Some(Notice::Warning { message, .. }) => {
            assert!(message.contains("Saved data is for Blur Filter"));
            assert!(message.contains("current edited Filter is Saturation"));
        }
        other => panic!("expected warning, got {other:?}"),
    }
}

#[test]
fn schema_change_with_same_name_is_rejected() {
    let blur = FilterCatalog::builtin().find("Blur").unwrap();
    let saved = EffectValues::capture(&Filter::new(blur.clone()));

    let mut evolved = (*blur).clone();
    evolved.properties.insert("av.chroma_radius".into(), "1".into());
    let mut target = Filter::new(Arc::new(evolved));

    assert!(matches!(
        saved.apply_to(&mut target),
        Err(FxStackError::Incompatible { .. })
    ));
}

#[test]
fn load_errors_propagate() {
    let dir = TempDir::new().unwrap();
    let mut c = editing(&["Blur"], Arc::new(Recorder::default()));

    let missing = dir.path().join("missing.data");
    assert!(matches!(
        c.load_effect_values(0, &missing),
        Err(FxStackError::Io(_))
    ));

    let garbage = dir.path().join("garbage.data");
    std::fs::write(&garbage, b"\x00\x01not json").unwrap();
    assert!(matches!(
        c.load_effect_values(0, &garbage),
        Err(FxStackError::Serialization(_))
    ));
    assert!(c.notice().is_none());
}

#[test]
fn failed_save_keeps_previous_file() {
    let dir = TempDir::new().unwrap();
    let c = editing(&["Blur"], Arc::new(Recorder::default()));
    let path = dir.path().join("values.data");
    c.save_effect_values(0, &path).unwrap();
    let saved = std::fs::read(&path).unwrap();

    // The parent is a regular file, so the write fails.
    let blocked = path.join("nested.data");
    assert!(c.save_effect_values(0, &blocked).is_err());
    assert_eq!(std::fs::read(&path).unwrap(), saved);
}
