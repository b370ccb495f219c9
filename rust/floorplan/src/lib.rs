// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Floor plan detection model, editable geometry and 3D reconstruction
//!
//! This crate turns a detected floor plan into something a user can correct
//! and look at:
//! 1. Normalize the detector's rooms, walls, doors and windows
//! 2. Keep them in an editable store that tracks which values were edited
//! 3. Map normalized coordinates onto the displayed image for the overlay
//! 4. Assemble a Y-up 3D scene with mitered walls and placed openings
//!
//! # Usage
//!
//! ```rust,ignore
//! use planlite_floorplan::{MockDetector, PlanSession, SceneConfig, SourceImage};
//!
//! let mut session = PlanSession::new(SceneConfig::from_env());
//! session.load_image(SourceImage::new("plan.png", 1200, 900, bytes));
//! session.run_detection(&MockDetector)?;
//!
//! let scene = session.build_scene()?;
//! let mapper = session.observe_overlay();
//! session.notify_resize(800.0, 600.0);
//! let svg = session.overlay(&mapper).to_svg();
//! ```

pub mod config;
pub mod detection;
pub mod error;
pub mod export;
pub mod mock;
pub mod openings;
pub mod overlay;
pub mod rooms;
pub mod scene;
pub mod session;
pub mod state;
pub mod types;
pub mod units;
pub mod walls;

// Re-export commonly used types and functions
pub use config::SceneConfig;
pub use detection::{DetectionError, Detector, MockDetector, QuotaFallback, SourceImage};
pub use error::{Error, Result};
pub use export::{export_rooms_json, write_obj};
pub use mock::mock_detection;
pub use openings::{is_horizontal, place_opening, OpeningPlacement, Orientation};
pub use overlay::{build_overlay, Overlay, OverlayMapper, RenderedBox, ResizeSource};
pub use rooms::{place_rooms, LayoutMode, RoomAnchor, RoomLayout};
pub use scene::{build_scene, Scene};
pub use session::{DetectionOutcome, DetectionPhase, DetectionTicket, PlanSession, Selection};
pub use state::{EditOutcome, GeometryStore, RoomEdit, RoomField, WallEdit, WallField};
pub use types::{
    BBox, Confidence, DetectedOpening, DetectedWallSegment, DetectionResult, OpeningType,
    Point2D, Room, WallType, DEFAULT_WALL_HEIGHT, PLAN_SIZE,
};
pub use units::Unit;
pub use walls::{build_wall_solid, mitered_length, resolve_thickness, WallSolid};
