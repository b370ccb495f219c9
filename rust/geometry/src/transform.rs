// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Placement transforms for Y-up scenes.
//!
//! Every solid in a floor plan scene stands upright, so a placement is a
//! translation plus a single rotation about the vertical (Y) axis.

use nalgebra::{Matrix4, Point3, Rotation3, Vector3};

/// Translation followed by a rotation about +Y (right-handed, radians)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub translation: Vector3<f64>,
    pub rotation_y: f64,
}

impl Placement {
    pub fn new(translation: Vector3<f64>, rotation_y: f64) -> Self {
        Self {
            translation,
            rotation_y,
        }
    }

    pub fn translation(x: f64, y: f64, z: f64) -> Self {
        Self::new(Vector3::new(x, y, z), 0.0)
    }

    /// Homogeneous matrix: rotate in local space, then translate
    pub fn to_matrix(&self) -> Matrix4<f64> {
        let rotation = Rotation3::from_axis_angle(&Vector3::y_axis(), self.rotation_y);
        Matrix4::new_translation(&self.translation) * rotation.to_homogeneous()
    }

    pub fn transform_point(&self, p: &Point3<f64>) -> Point3<f64> {
        self.to_matrix().transform_point(p)
    }
}

impl Default for Placement {
    fn default() -> Self {
        Self::new(Vector3::zeros(), 0.0)
    }
}
