// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Detection lifecycle, state reset and overlay observer teardown across
//! image swaps.

use planlite_floorplan::{
    mock_detection, Confidence, DetectionError, DetectionOutcome, DetectionPhase, Error,
    MockDetector, PlanSession, QuotaFallback, RenderedBox, RoomEdit, SceneConfig, Selection,
    SourceImage, Unit, WallEdit,
};

fn image(name: &str) -> SourceImage {
    SourceImage::new(name, 1200, 900, Vec::new())
}

fn detected_session() -> PlanSession {
    let mut session = PlanSession::new(SceneConfig::default());
    session.load_image(image("plan.png"));
    let outcome = session.run_detection(&MockDetector).unwrap();
    assert_eq!(outcome, DetectionOutcome::Applied);
    session
}

#[test]
fn redetection_discards_manual_edits() {
    let mut session = detected_session();
    session.edit_room("room-1", RoomEdit::Width(12.0)).unwrap();
    session.edit_wall("wall-2", WallEdit::Thickness(0.4)).unwrap();
    let store = session.store().unwrap();
    assert_eq!(store.room("room-1").unwrap().confidence, Confidence::Manual);
    assert_eq!(store.wall("wall-2").unwrap().confidence, Confidence::Manual);

    session.run_detection(&MockDetector).unwrap();
    let store = session.store().unwrap();
    assert_eq!(store.room("room-1").unwrap().width, 9.0);
    assert_eq!(store.room("room-1").unwrap().confidence, Confidence::High);
    assert_eq!(store.wall("wall-2").unwrap().thickness, None);
}

#[test]
fn image_swap_drops_late_detection() {
    let mut session = PlanSession::default();
    session.load_image(image("a.png"));
    let ticket = session.begin_detection().unwrap();

    session.load_image(image("b.png"));
    assert_ne!(ticket.generation(), session.generation());

    // new image gets its own request while the old one is still out
    let fresh = session.begin_detection().unwrap();
    assert_eq!(
        session.finish_detection(ticket, Ok(mock_detection())),
        DetectionOutcome::Discarded
    );
    assert!(session.is_pending());

    assert_eq!(
        session.finish_detection(fresh, Ok(mock_detection())),
        DetectionOutcome::Applied
    );
    assert_eq!(session.store().unwrap().rooms().len(), 4);
}

#[test]
fn cleared_image_drops_late_failure() {
    let mut session = PlanSession::default();
    session.load_image(image("a.png"));
    let ticket = session.begin_detection().unwrap();
    session.clear_image();

    assert_eq!(
        session.finish_detection(ticket, Err(DetectionError::Api { status: 500 })),
        DetectionOutcome::Discarded
    );
    assert_eq!(session.phase(), &DetectionPhase::Idle);
    assert!(session.image().is_none());
    assert!(matches!(session.begin_detection(), Err(Error::NoSourceImage)));
}

#[test]
fn quota_errors_become_sample_data_other_errors_surface() {
    struct Status(u16);
    impl planlite_floorplan::Detector for Status {
        fn detect(
            &self,
            _image: &SourceImage,
        ) -> Result<planlite_floorplan::DetectionResult, DetectionError> {
            Err(DetectionError::Api { status: self.0 })
        }
    }

    let mut session = PlanSession::default();
    session.load_image(image("plan.png"));

    let outcome = session.run_detection(&QuotaFallback::new(Status(403))).unwrap();
    assert_eq!(outcome, DetectionOutcome::Applied);
    assert!(session.store().unwrap().used_mock());

    let outcome = session.run_detection(&QuotaFallback::new(Status(502))).unwrap();
    assert_eq!(
        outcome,
        DetectionOutcome::Failed(DetectionError::Api { status: 502 })
    );
    assert!(session.store().is_none());
    match session.phase() {
        DetectionPhase::Failed { message } => assert!(message.contains("API_ERROR_502")),
        other => panic!("unexpected phase {other:?}"),
    }
}

#[test]
fn overlay_observers_are_torn_down_on_image_swap() {
    let mut session = detected_session();
    let mapper = session.observe_overlay();
    assert_eq!(mapper.rendered_box(), RenderedBox::UNMEASURED);

    session.notify_resize(600.0, 450.0);
    let overlay = session.overlay(&mapper);
    assert_eq!(overlay.view_box.width, 600.0);
    assert_eq!(session.resize_source().observer_count(), 1);

    session.load_image(image("other.png"));
    assert!(!mapper.is_attached());
    assert_eq!(session.resize_source().observer_count(), 0);
    assert!(session.overlay(&mapper).rooms.is_empty());

    let fresh = session.observe_overlay();
    assert_eq!(fresh.rendered_box(), RenderedBox::UNMEASURED);
    assert_eq!(session.resize_source().observer_count(), 1);
}

#[test]
fn selection_is_marked_in_overlay() {
    let mut session = detected_session();
    let mapper = session.observe_overlay();
    session.notify_resize(1200.0, 900.0);
    session.select(Selection::Wall("wall-5".into())).unwrap();

    let overlay = session.overlay(&mapper);
    let selected: Vec<&str> = overlay
        .walls
        .iter()
        .filter(|w| w.selected)
        .map(|w| w.id.as_str())
        .collect();
    assert_eq!(selected, ["wall-5"]);
    assert!(overlay.rooms.iter().all(|r| !r.selected));
}

#[test]
fn export_records_display_settings_only() {
    let mut session = detected_session();
    session.set_unit(Unit::Cm);
    session.set_scale(2.0);

    let doc: serde_json::Value = serde_json::from_str(&session.export_rooms().unwrap()).unwrap();
    assert_eq!(doc["meta"]["unit"], "cm");
    assert_eq!(doc["meta"]["scale"], 2.0);
    assert_eq!(doc["rooms"][0]["width"], 9.0);
}
