// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Footprint profiles and triangulation
//!
//! A profile lives in the horizontal plane: its `x` maps to world X and its
//! `y` maps to world Z. Extrusion then lifts it along world Y.

use crate::error::{Error, Result};
use nalgebra::Point2;

/// Closed footprint polygon
#[derive(Debug, Clone)]
pub struct Profile2D {
    /// Outer boundary
    pub outer: Vec<Point2<f64>>,
}

impl Profile2D {
    pub fn new(outer: Vec<Point2<f64>>) -> Self {
        Self { outer }
    }

    /// Axis-aligned rectangle centered on the origin
    pub fn rectangle(width: f64, depth: f64) -> Self {
        let hw = width / 2.0;
        let hd = depth / 2.0;
        Self::new(vec![
            Point2::new(-hw, -hd),
            Point2::new(hw, -hd),
            Point2::new(hw, hd),
            Point2::new(-hw, hd),
        ])
    }

    /// Signed area (positive when counter-clockwise in profile space)
    pub fn signed_area(&self) -> f64 {
        let n = self.outer.len();
        if n < 3 {
            return 0.0;
        }
        let mut area = 0.0;
        for i in 0..n {
            let j = (i + 1) % n;
            area += self.outer[i].x * self.outer[j].y;
            area -= self.outer[j].x * self.outer[i].y;
        }
        area / 2.0
    }

    /// Reorder the boundary so the signed area is positive
    pub fn ensure_counter_clockwise(&mut self) {
        if self.signed_area() < 0.0 {
            self.outer.reverse();
        }
    }

    /// Triangulate the profile using earcutr
    pub fn triangulate(&self) -> Result<Triangulation> {
        if self.outer.len() < 3 {
            return Err(Error::InvalidProfile(
                "Profile must have at least 3 vertices".to_string(),
            ));
        }
        if self.signed_area().abs() < f64::EPSILON {
            return Err(Error::InvalidProfile("Profile has zero area".to_string()));
        }

        let vertices: Vec<f64> = self.outer.iter().flat_map(|p| [p.x, p.y]).collect();

        let indices = earcutr::earcut(&vertices, &[], 2)
            .map_err(|e| Error::TriangulationError(format!("{:?}", e)))?;

        if indices.is_empty() {
            return Err(Error::TriangulationError(
                "earcut produced no triangles".to_string(),
            ));
        }

        Ok(Triangulation {
            points: self.outer.clone(),
            indices,
        })
    }
}

/// Triangulated profile result
#[derive(Debug, Clone)]
pub struct Triangulation {
    pub points: Vec<Point2<f64>>,
    /// Triangle indices into `points`
    pub indices: Vec<usize>,
}
