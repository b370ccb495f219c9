// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Plan session: one source image, its detection lifecycle and the editable
//! geometry derived from it.
//!
//! Detection is at most one in flight. Each request carries the generation
//! that was current when it started; swapping or clearing the image bumps the
//! generation, so a late answer for the old image is dropped instead of
//! overwriting the new state. While a request is pending the store is empty
//! and every consumer renders nothing.

use crate::config::SceneConfig;
use crate::detection::{DetectionError, Detector, SourceImage};
use crate::error::{Error, Result};
use crate::export::export_rooms_json;
use crate::overlay::{build_overlay, Overlay, OverlayMapper, ResizeSource};
use crate::scene::{build_scene, Scene};
use crate::state::{EditOutcome, GeometryStore, RoomEdit, WallEdit};
use crate::types::DetectionResult;
use crate::units::Unit;

/// Transient UI selection; never persisted with the geometry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Room(String),
    Wall(String),
}

/// Where the detection request for the current image stands
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DetectionPhase {
    #[default]
    Idle,
    Pending {
        generation: u64,
    },
    /// Last request failed; `message` is user-facing
    Failed {
        message: String,
    },
}

/// Proof that a detection request was started
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "a started detection must be finished with its ticket"]
pub struct DetectionTicket {
    generation: u64,
}

impl DetectionTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// What happened to a finished detection request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetectionOutcome {
    /// The store was replaced with the new result
    Applied,
    /// The detector failed; the phase carries the message
    Failed(DetectionError),
    /// The image changed while the request was in flight
    Discarded,
}

#[derive(Debug, Default)]
pub struct PlanSession {
    config: SceneConfig,
    image: Option<SourceImage>,
    generation: u64,
    phase: DetectionPhase,
    store: Option<GeometryStore>,
    selection: Option<Selection>,
    resize: ResizeSource,
}

impl PlanSession {
    pub fn new(config: SceneConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn image(&self) -> Option<&SourceImage> {
        self.image.as_ref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn phase(&self) -> &DetectionPhase {
        &self.phase
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.phase, DetectionPhase::Pending { .. })
    }

    pub fn store(&self) -> Option<&GeometryStore> {
        self.store.as_ref()
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    /// Replace the source image. All geometry, manual edits included, is
    /// discarded and every overlay mapper of the old image is detached.
    pub fn load_image(&mut self, image: SourceImage) {
        tracing::info!(
            image = %image.name,
            width = image.width,
            height = image.height,
            "Loading source image"
        );
        self.reset_image_state();
        self.image = Some(image);
    }

    /// Remove the source image and everything derived from it
    pub fn clear_image(&mut self) {
        if self.image.is_some() {
            tracing::info!("Clearing source image");
        }
        self.reset_image_state();
        self.image = None;
    }

    fn reset_image_state(&mut self) {
        self.generation += 1;
        self.phase = DetectionPhase::Idle;
        self.store = None;
        self.selection = None;
        self.resize.disconnect_all();
    }

    /// Start a detection request for the current image.
    ///
    /// The previous geometry is dropped right away; consumers see an empty
    /// plan until the request finishes.
    pub fn begin_detection(&mut self) -> Result<DetectionTicket> {
        if self.image.is_none() {
            return Err(Error::NoSourceImage);
        }
        if self.is_pending() {
            return Err(Error::DetectionInFlight);
        }
        self.phase = DetectionPhase::Pending {
            generation: self.generation,
        };
        self.store = None;
        self.selection = None;
        tracing::debug!(generation = self.generation, "Detection started");
        Ok(DetectionTicket {
            generation: self.generation,
        })
    }

    /// Deliver the answer for a request started with [`Self::begin_detection`]
    pub fn finish_detection(
        &mut self,
        ticket: DetectionTicket,
        result: std::result::Result<DetectionResult, DetectionError>,
    ) -> DetectionOutcome {
        let current = matches!(
            self.phase,
            DetectionPhase::Pending { generation } if generation == ticket.generation
        );
        if !current {
            tracing::warn!(
                ticket = ticket.generation,
                current = self.generation,
                "Discarding stale detection result"
            );
            return DetectionOutcome::Discarded;
        }

        match result {
            Ok(result) => {
                let store = GeometryStore::from_detection(result);
                tracing::info!(
                    rooms = store.rooms().len(),
                    walls = store.walls().len(),
                    doors = store.doors().len(),
                    windows = store.windows().len(),
                    used_mock = store.used_mock(),
                    "Detection applied"
                );
                self.store = Some(store);
                self.phase = DetectionPhase::Idle;
                DetectionOutcome::Applied
            }
            Err(err) => {
                tracing::warn!(error = %err, "Detection failed");
                self.phase = DetectionPhase::Failed {
                    message: err.user_message(),
                };
                DetectionOutcome::Failed(err)
            }
        }
    }

    /// Begin, call the detector and finish in one step
    pub fn run_detection(&mut self, detector: &dyn Detector) -> Result<DetectionOutcome> {
        let ticket = self.begin_detection()?;
        let image = self.image.as_ref().ok_or(Error::NoSourceImage)?;
        let result = detector.detect(image);
        Ok(self.finish_detection(ticket, result))
    }

    /// Global room scale; non-positive values are ignored
    pub fn set_scale(&mut self, scale: f64) -> EditOutcome {
        if scale.is_finite() && scale > 0.0 {
            self.config.scale = scale;
            EditOutcome::Applied
        } else {
            tracing::warn!(scale, "Ignoring non-positive scale");
            EditOutcome::Ignored
        }
    }

    /// Display unit; stored values stay in meters
    pub fn set_unit(&mut self, unit: Unit) {
        self.config.unit = unit;
    }

    pub fn select(&mut self, selection: Selection) -> Result<()> {
        let store = self.store.as_ref().ok_or(Error::NoGeometry)?;
        match &selection {
            Selection::Room(id) if store.room(id).is_none() => {
                return Err(Error::UnknownRoom(id.clone()))
            }
            Selection::Wall(id) if store.wall(id).is_none() => {
                return Err(Error::UnknownWall(id.clone()))
            }
            _ => {}
        }
        self.selection = Some(selection);
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    pub fn edit_room(&mut self, id: &str, edit: RoomEdit) -> Result<EditOutcome> {
        self.store
            .as_mut()
            .ok_or(Error::NoGeometry)?
            .edit_room(id, edit)
    }

    pub fn edit_wall(&mut self, id: &str, edit: WallEdit) -> Result<EditOutcome> {
        self.store
            .as_mut()
            .ok_or(Error::NoGeometry)?
            .edit_wall(id, edit)
    }

    /// Subscribe an overlay mapper to the current image view
    pub fn observe_overlay(&mut self) -> OverlayMapper {
        self.resize.observe()
    }

    /// Rendered size of the image view changed
    pub fn notify_resize(&mut self, width: f64, height: f64) {
        self.resize.notify_resize(width, height);
    }

    pub fn resize_source(&self) -> &ResizeSource {
        &self.resize
    }

    /// 3D scene for the current geometry; empty while nothing is detected
    pub fn build_scene(&self) -> Result<Scene> {
        match &self.store {
            Some(store) => build_scene(store, &self.config),
            None => Ok(Scene::default()),
        }
    }

    /// Overlay shapes for the current geometry; empty while nothing is detected
    pub fn overlay(&self, mapper: &OverlayMapper) -> Overlay {
        match &self.store {
            Some(store) => build_overlay(store, mapper, &self.config, self.selection.as_ref()),
            None => Overlay::empty(mapper.rendered_box()),
        }
    }

    /// Room export document for the current geometry
    pub fn export_rooms(&self) -> Result<String> {
        let rooms = self.store.as_ref().map(GeometryStore::rooms).unwrap_or(&[]);
        export_rooms_json(rooms, self.config.unit, self.config.scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::MockDetector;
    use crate::mock::mock_detection;

    fn image(name: &str) -> SourceImage {
        SourceImage::new(name, 800, 600, Vec::new())
    }

    #[test]
    fn test_detection_requires_image() {
        let mut session = PlanSession::default();
        assert!(matches!(session.begin_detection(), Err(Error::NoSourceImage)));
    }

    #[test]
    fn test_single_request_in_flight() {
        let mut session = PlanSession::default();
        session.load_image(image("plan.png"));
        let ticket = session.begin_detection().unwrap();
        assert!(matches!(session.begin_detection(), Err(Error::DetectionInFlight)));

        assert_eq!(
            session.finish_detection(ticket, Ok(mock_detection())),
            DetectionOutcome::Applied
        );
        assert!(!session.is_pending());
        assert_eq!(session.store().unwrap().rooms().len(), 4);
    }

    #[test]
    fn test_stale_result_is_discarded() {
        let mut session = PlanSession::default();
        session.load_image(image("first.png"));
        let ticket = session.begin_detection().unwrap();

        session.load_image(image("second.png"));
        assert_eq!(
            session.finish_detection(ticket, Ok(mock_detection())),
            DetectionOutcome::Discarded
        );
        assert!(session.store().is_none());
        assert_eq!(session.phase(), &DetectionPhase::Idle);
    }

    #[test]
    fn test_failure_sets_message() {
        let mut session = PlanSession::default();
        session.load_image(image("plan.png"));
        let ticket = session.begin_detection().unwrap();
        let outcome = session.finish_detection(ticket, Err(DetectionError::NoApiKey));
        assert_eq!(outcome, DetectionOutcome::Failed(DetectionError::NoApiKey));
        match session.phase() {
            DetectionPhase::Failed { message } => assert!(message.contains("API key")),
            other => panic!("unexpected phase {other:?}"),
        }
        assert!(session.store().is_none());

        // retry is manual and allowed after a failure
        assert!(session.begin_detection().is_ok());
    }

    #[test]
    fn test_pending_session_renders_nothing() {
        let mut session = PlanSession::default();
        session.load_image(image("plan.png"));
        session.run_detection(&MockDetector).unwrap();
        let _ticket = session.begin_detection().unwrap();

        let scene = session.build_scene().unwrap();
        assert!(scene.is_empty());
        let mapper = session.observe_overlay();
        assert!(session.overlay(&mapper).rooms.is_empty());
    }

    #[test]
    fn test_scale_and_unit() {
        let mut session = PlanSession::default();
        assert_eq!(session.set_scale(0.0), EditOutcome::Ignored);
        assert_eq!(session.set_scale(1.5), EditOutcome::Applied);
        session.set_unit(Unit::Ft);
        assert_eq!(session.config().scale, 1.5);
        assert_eq!(session.config().unit, Unit::Ft);
    }

    #[test]
    fn test_selection_validates_ids() {
        let mut session = PlanSession::default();
        assert!(matches!(
            session.select(Selection::Room("room-1".into())),
            Err(Error::NoGeometry)
        ));

        session.load_image(image("plan.png"));
        session.run_detection(&MockDetector).unwrap();
        session.select(Selection::Wall("wall-3".into())).unwrap();
        assert!(matches!(
            session.select(Selection::Room("nope".into())),
            Err(Error::UnknownRoom(_))
        ));
        assert_eq!(session.selection(), Some(&Selection::Wall("wall-3".into())));

        session.clear_image();
        assert_eq!(session.selection(), None);
    }
}
