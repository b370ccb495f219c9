// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Door and window placement
//!
//! Openings sit in absolute plan space (the global room scale does not apply).
//! Their orientation comes from the bbox aspect ratio, which assumes
//! axis-aligned openings on orthogonal walls.

use crate::config::SceneConfig;
use crate::types::{DetectedOpening, OpeningType, MIN_EXTENT};
use planlite_geometry::{extrude_footprint, Mesh, Placement, Point3, Profile2D, Vector3};
use std::f64::consts::FRAC_PI_2;

pub const DOOR_HEIGHT_RATIO: f64 = 0.85;
pub const DOOR_MAX_HEIGHT: f64 = 2.1;
pub const WINDOW_SILL_RATIO: f64 = 0.35;
pub const WINDOW_HEIGHT_RATIO: f64 = 0.45;
pub const WINDOW_MAX_HEIGHT: f64 = 1.2;
/// Opening box depth, thicker than any wall so it reads through both faces
pub const OPENING_DEPTH: f64 = 0.3;

/// Which way an opening's long axis runs in the plan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Long axis along world X
    Horizontal,
    /// Long axis along world Z
    Vertical,
}

impl Orientation {
    /// Classify an opening by its plan extents.
    ///
    /// Horizontal only when strictly wider than deep; a square resolves to
    /// `Vertical`.
    pub fn classify(width: f64, depth: f64) -> Self {
        if width > depth {
            Orientation::Horizontal
        } else {
            Orientation::Vertical
        }
    }

    /// Rotation about +Y for the opening's local frame
    pub fn rotation_y(self) -> f64 {
        match self {
            Orientation::Horizontal => 0.0,
            Orientation::Vertical => FRAC_PI_2,
        }
    }
}

/// See [`Orientation::classify`]
pub fn is_horizontal(width: f64, depth: f64) -> bool {
    Orientation::classify(width, depth) == Orientation::Horizontal
}

pub fn door_height(wall_height: f64) -> f64 {
    (DOOR_HEIGHT_RATIO * wall_height).min(DOOR_MAX_HEIGHT)
}

pub fn window_sill(wall_height: f64) -> f64 {
    WINDOW_SILL_RATIO * wall_height
}

pub fn window_height(wall_height: f64) -> f64 {
    (WINDOW_HEIGHT_RATIO * wall_height).min(WINDOW_MAX_HEIGHT)
}

/// World-space box for a door or window
#[derive(Debug, Clone, PartialEq)]
pub struct OpeningPlacement {
    pub id: String,
    pub kind: OpeningType,
    /// Box centroid
    pub position: Point3<f64>,
    /// Along the opening's long axis
    pub width: f64,
    pub height: f64,
    pub depth: f64,
    /// Elevation of the opening's bottom edge
    pub sill: f64,
    pub orientation: Orientation,
}

impl OpeningPlacement {
    pub fn is_horizontal(&self) -> bool {
        self.orientation == Orientation::Horizontal
    }

    pub fn placement(&self) -> Placement {
        Placement::new(
            Vector3::new(self.position.x, self.sill, self.position.z),
            self.orientation.rotation_y(),
        )
    }

    pub fn to_mesh(&self) -> planlite_geometry::Result<Mesh> {
        extrude_footprint(
            &Profile2D::rectangle(self.width, self.depth),
            self.height,
            Some(self.placement().to_matrix()),
        )
    }
}

/// Position and size an opening against the ambient wall height.
pub fn place_opening(
    opening: &DetectedOpening,
    kind: OpeningType,
    wall_height: f64,
    config: &SceneConfig,
) -> OpeningPlacement {
    let center = config.to_world(opening.bbox.center());
    let w_world = opening.bbox.w * config.plan_size;
    let h_world = opening.bbox.h * config.plan_size;
    let orientation = Orientation::classify(w_world, h_world);

    let width = if opening.width_m.is_finite() && opening.width_m > 0.0 {
        opening.width_m.max(MIN_EXTENT)
    } else {
        w_world.max(h_world).max(MIN_EXTENT)
    };

    let (sill, height) = match kind {
        OpeningType::Door => (0.0, door_height(wall_height)),
        OpeningType::Window => (window_sill(wall_height), window_height(wall_height)),
    };

    OpeningPlacement {
        id: opening.id.clone(),
        kind,
        position: Point3::new(center.x, sill + height / 2.0, center.y),
        width,
        height,
        depth: OPENING_DEPTH,
        sill,
        orientation,
    }
}
