// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Wall solids from centerline segments
//!
//! A wall becomes an oriented box of `length x thickness x height` standing on
//! the floor. Each box is mitered: half its own thickness is trimmed from
//! both ends, midpoint fixed, so at a right-angle corner the perpendicular
//! wall's half-thickness fills the gap instead of both walls overlapping.
//! Junctions of three or more walls, or non-orthogonal ones, get the same
//! symmetric trim and nothing more.

use crate::config::SceneConfig;
use crate::types::{DetectedWallSegment, Point2D, MIN_EXTENT};
use planlite_geometry::{extrude_footprint, Mesh, Placement, Point3, Profile2D, Vector3};

/// Bounds applied to thickness derived from an image-relative ratio
pub const RATIO_THICKNESS_MIN: f64 = 0.05;
pub const RATIO_THICKNESS_MAX: f64 = 0.5;

/// Effective thickness: explicit value, then ratio-derived, then by type.
/// Never thinner than [`MIN_EXTENT`].
pub fn resolve_thickness(wall: &DetectedWallSegment, plan_size: f64) -> f64 {
    if let Some(t) = wall.thickness.filter(|t| t.is_finite() && *t > 0.0) {
        return t.max(MIN_EXTENT);
    }
    if let Some(ratio) = wall.thickness_ratio.filter(|r| r.is_finite() && *r > 0.0) {
        return (ratio * plan_size).clamp(RATIO_THICKNESS_MIN, RATIO_THICKNESS_MAX);
    }
    wall.wall_type.default_thickness()
}

/// Effective height: the wall's own, else the plan default.
pub fn resolve_wall_height(wall: &DetectedWallSegment, default_height: f64) -> f64 {
    wall.wall_height
        .filter(|h| h.is_finite() && *h > 0.0)
        .unwrap_or(default_height)
}

/// Solid length after trimming half the thickness from each end.
#[inline]
pub fn mitered_length(raw_length: f64, thickness: f64) -> f64 {
    (raw_length - thickness).max(MIN_EXTENT)
}

/// Oriented wall box in world space (Y up, plan Y maps to world Z)
#[derive(Debug, Clone, PartialEq)]
pub struct WallSolid {
    pub id: String,
    /// Centerline length before trimming
    pub raw_length: f64,
    /// Length of the built solid
    pub length: f64,
    pub thickness: f64,
    pub height: f64,
    /// Box centroid; `y` is half the height
    pub center: Point3<f64>,
    /// Centerline direction in the world plan, `atan2(dz, dx)`
    pub heading: f64,
}

impl WallSolid {
    /// Rotation about +Y that aligns the box's local X with the heading
    pub fn rotation_y(&self) -> f64 {
        -self.heading
    }

    /// Transform for a box modeled at the origin with its base on `y = 0`
    pub fn placement(&self) -> Placement {
        Placement::new(
            Vector3::new(self.center.x, 0.0, self.center.z),
            self.rotation_y(),
        )
    }

    /// Footprint corners in world plan coordinates (x, z), counter-clockwise
    pub fn footprint(&self) -> [Point2D; 4] {
        let (sin, cos) = self.heading.sin_cos();
        let (hl, ht) = (self.length / 2.0, self.thickness / 2.0);
        let corner = |l: f64, t: f64| {
            Point2D::new(
                self.center.x + cos * l - sin * t,
                self.center.z + sin * l + cos * t,
            )
        };
        [corner(-hl, -ht), corner(hl, -ht), corner(hl, ht), corner(-hl, ht)]
    }

    pub fn to_mesh(&self) -> planlite_geometry::Result<Mesh> {
        extrude_footprint(
            &Profile2D::rectangle(self.length, self.thickness),
            self.height,
            Some(self.placement().to_matrix()),
        )
    }
}

/// Build the mitered solid for one wall segment.
///
/// Degenerate segments (shorter than their thickness, or zero length) still
/// yield a solid of minimum length.
pub fn build_wall_solid(wall: &DetectedWallSegment, config: &SceneConfig) -> WallSolid {
    let start = config.to_world(wall.start());
    let end = config.to_world(wall.end());

    let dx = end.x - start.x;
    let dz = end.y - start.y;
    let raw_length = (dx * dx + dz * dz).sqrt();
    let heading = dz.atan2(dx);

    let thickness = resolve_thickness(wall, config.plan_size);
    let height = resolve_wall_height(wall, config.default_wall_height);
    let length = mitered_length(raw_length, thickness);

    if raw_length < MIN_EXTENT {
        tracing::warn!(wall = %wall.id, raw_length, "Degenerate wall segment clamped to minimum length");
    } else {
        tracing::debug!(wall = %wall.id, raw_length, length, thickness, height, "Built wall solid");
    }

    WallSolid {
        id: wall.id.clone(),
        raw_length,
        length,
        thickness,
        height,
        center: Point3::new((start.x + end.x) / 2.0, height / 2.0, (start.y + end.y) / 2.0),
        heading,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::WallType;
    use approx::assert_relative_eq;

    fn segment(x1: f64, y1: f64, x2: f64, y2: f64) -> DetectedWallSegment {
        DetectedWallSegment::new(
            "w",
            Point2D::new(x1, y1),
            Point2D::new(x2, y2),
            WallType::Exterior,
        )
    }

    #[test]
    fn test_thickness_resolution_order() {
        let plan = 20.0;
        let mut wall = segment(0.0, 0.0, 0.5, 0.0);
        assert_eq!(resolve_thickness(&wall, plan), 0.25);

        wall.wall_type = WallType::Interior;
        assert_eq!(resolve_thickness(&wall, plan), 0.15);

        wall.thickness_ratio = Some(0.01);
        assert_relative_eq!(resolve_thickness(&wall, plan), 0.2);

        wall.thickness_ratio = Some(0.0001);
        assert_eq!(resolve_thickness(&wall, plan), RATIO_THICKNESS_MIN);

        wall.thickness_ratio = Some(0.9);
        assert_eq!(resolve_thickness(&wall, plan), RATIO_THICKNESS_MAX);

        wall.thickness = Some(0.33);
        assert_eq!(resolve_thickness(&wall, plan), 0.33);

        let wall = wall.with_thickness(1e-20);
        assert_eq!(resolve_thickness(&wall, plan), MIN_EXTENT);
    }

    #[test]
    fn test_wall_height_resolution() {
        let mut wall = segment(0.0, 0.0, 0.5, 0.0);
        assert_eq!(resolve_wall_height(&wall, 2.8), 2.8);
        wall.wall_height = Some(3.2);
        assert_eq!(resolve_wall_height(&wall, 2.8), 3.2);
    }

    #[test]
    fn test_trim_independent_of_heading() {
        let config = SceneConfig::default();
        // raw length 0.2 * 20 = 4m in every direction
        for step in 0..16 {
            let angle = step as f64 * std::f64::consts::PI / 8.0;
            let (sin, cos) = angle.sin_cos();
            let wall = segment(0.5, 0.5, 0.5 + 0.2 * cos, 0.5 + 0.2 * sin);
            let solid = build_wall_solid(&wall, &config);
            assert_relative_eq!(solid.raw_length, 4.0, epsilon = 1e-9);
            assert_relative_eq!(solid.length, 3.75, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_midpoint_stays_fixed() {
        let config = SceneConfig::default();
        let solid = build_wall_solid(&segment(0.25, 0.5, 0.75, 0.5), &config);
        assert_relative_eq!(solid.center.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(solid.center.z, 0.0, epsilon = 1e-12);
        assert_relative_eq!(solid.center.y, 1.4, epsilon = 1e-12);
        assert_relative_eq!(solid.heading, 0.0);
    }

    #[test]
    fn test_short_and_degenerate_walls_clamp() {
        let config = SceneConfig::default();
        // 0.1m long, thinner than its 0.25m thickness
        let short = build_wall_solid(&segment(0.5, 0.5, 0.505, 0.5), &config);
        assert_eq!(short.length, MIN_EXTENT);

        let point = build_wall_solid(&segment(0.3, 0.3, 0.3, 0.3), &config);
        assert_eq!(point.raw_length, 0.0);
        assert_eq!(point.length, MIN_EXTENT);
        assert!(point.to_mesh().is_ok());
    }

    #[test]
    fn test_footprint_of_vertical_wall() {
        let config = SceneConfig::default();
        // runs along +Z from z=-5 to z=5 at x=0
        let solid = build_wall_solid(&segment(0.5, 0.25, 0.5, 0.75), &config);
        let fp = solid.footprint();
        let min_x = fp.iter().map(|p| p.x).fold(f64::MAX, f64::min);
        let max_x = fp.iter().map(|p| p.x).fold(f64::MIN, f64::max);
        let min_z = fp.iter().map(|p| p.y).fold(f64::MAX, f64::min);
        let max_z = fp.iter().map(|p| p.y).fold(f64::MIN, f64::max);
        assert_relative_eq!(max_x - min_x, 0.25, epsilon = 1e-9);
        assert_relative_eq!(min_z, -4.875, epsilon = 1e-9);
        assert_relative_eq!(max_z, 4.875, epsilon = 1e-9);
    }

    #[test]
    fn test_mesh_matches_footprint() {
        let config = SceneConfig::default();
        let solid = build_wall_solid(&segment(0.1, 0.1, 0.4, 0.4), &config);
        let mesh = solid.to_mesh().unwrap();
        let bounds = mesh.bounds();

        let fp = solid.footprint();
        let min_x = fp.iter().map(|p| p.x).fold(f64::MAX, f64::min);
        let max_z = fp.iter().map(|p| p.y).fold(f64::MIN, f64::max);
        assert_relative_eq!(bounds.min.x, min_x, epsilon = 1e-4);
        assert_relative_eq!(bounds.max.z, max_z, epsilon = 1e-4);
        assert_relative_eq!(bounds.max.y, 2.8, epsilon = 1e-4);
        assert_relative_eq!(bounds.min.y, 0.0, epsilon = 1e-6);
    }
}
