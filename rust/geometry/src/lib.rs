// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Plan-Lite Geometry
//!
//! Mesh primitives for extruded floor plan solids: footprint profiles
//! triangulated with earcutr, Y-up extrusion, and placement transforms
//! built on nalgebra.

pub mod error;
pub mod extrusion;
pub mod mesh;
pub mod profile;
pub mod transform;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point2, Point3, Vector3};

pub use error::{Error, Result};
pub use extrusion::{apply_transform, extrude_footprint};
pub use mesh::{Bounds3, Mesh};
pub use profile::{Profile2D, Triangulation};
pub use transform::Placement;
