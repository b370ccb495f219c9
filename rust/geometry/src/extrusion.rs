// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Extrusion operations - lifting footprints into upright solids

use crate::error::{Error, Result};
use crate::mesh::Mesh;
use crate::profile::{Profile2D, Triangulation};
use nalgebra::{Matrix4, Point2, Point3, Vector3};

/// Extrude a footprint upward along +Y from `y = 0` to `y = height`.
///
/// Profile `x` becomes world X and profile `y` becomes world Z. The optional
/// transform is applied to the finished mesh.
pub fn extrude_footprint(
    profile: &Profile2D,
    height: f64,
    transform: Option<Matrix4<f64>>,
) -> Result<Mesh> {
    if height <= 0.0 || !height.is_finite() {
        return Err(Error::InvalidExtrusion(format!(
            "Height must be positive, got {}",
            height
        )));
    }

    let mut profile = profile.clone();
    profile.ensure_counter_clockwise();
    let triangulation = profile.triangulate()?;

    let n = profile.outer.len();
    let mut mesh = Mesh::with_capacity(n * 2 + n * 4, triangulation.indices.len() * 2 + n * 6);

    create_cap_mesh(&triangulation, 0.0, false, &mut mesh);
    create_cap_mesh(&triangulation, height, true, &mut mesh);
    create_side_walls(&profile.outer, height, &mut mesh);

    if let Some(mat) = transform {
        apply_transform(&mut mesh, &mat);
    }

    Ok(mesh)
}

/// Create a horizontal cap at elevation `y`
fn create_cap_mesh(triangulation: &Triangulation, y: f64, is_top: bool, mesh: &mut Mesh) {
    let base_index = mesh.vertex_count() as u32;
    let normal = if is_top {
        Vector3::new(0.0, 1.0, 0.0)
    } else {
        Vector3::new(0.0, -1.0, 0.0)
    };

    for point in &triangulation.points {
        mesh.add_vertex(Point3::new(point.x, y, point.y), normal);
    }

    // A counter-clockwise profile triangle faces -Y once mapped to (x, z),
    // so the top cap flips winding.
    for tri in triangulation.indices.chunks_exact(3) {
        let i0 = base_index + tri[0] as u32;
        let i1 = base_index + tri[1] as u32;
        let i2 = base_index + tri[2] as u32;
        if is_top {
            mesh.add_triangle(i0, i2, i1);
        } else {
            mesh.add_triangle(i0, i1, i2);
        }
    }
}

/// Create vertical side quads for a counter-clockwise boundary
fn create_side_walls(boundary: &[Point2<f64>], height: f64, mesh: &mut Mesh) {
    for i in 0..boundary.len() {
        let j = (i + 1) % boundary.len();
        let p0 = &boundary[i];
        let p1 = &boundary[j];

        let du = p1.x - p0.x;
        let dv = p1.y - p0.y;
        let normal = match Vector3::new(dv, 0.0, -du).try_normalize(1e-10) {
            Some(n) => n,
            None => continue, // duplicate consecutive points
        };

        let idx = mesh.vertex_count() as u32;
        mesh.add_vertex(Point3::new(p0.x, 0.0, p0.y), normal);
        mesh.add_vertex(Point3::new(p1.x, 0.0, p1.y), normal);
        mesh.add_vertex(Point3::new(p1.x, height, p1.y), normal);
        mesh.add_vertex(Point3::new(p0.x, height, p0.y), normal);

        mesh.add_triangle(idx, idx + 2, idx + 1);
        mesh.add_triangle(idx, idx + 3, idx + 2);
    }
}

/// Apply transformation matrix to mesh
pub fn apply_transform(mesh: &mut Mesh, transform: &Matrix4<f64>) {
    mesh.positions.chunks_exact_mut(3).for_each(|chunk| {
        let point = Point3::new(chunk[0] as f64, chunk[1] as f64, chunk[2] as f64);
        let transformed = transform.transform_point(&point);
        chunk[0] = transformed.x as f32;
        chunk[1] = transformed.y as f32;
        chunk[2] = transformed.z as f32;
    });

    // Inverse transpose keeps normals perpendicular under non-uniform scale
    let normal_matrix = transform.try_inverse().unwrap_or(*transform).transpose();

    mesh.normals.chunks_exact_mut(3).for_each(|chunk| {
        let normal = Vector3::new(chunk[0] as f64, chunk[1] as f64, chunk[2] as f64);
        let transformed = (normal_matrix * normal.to_homogeneous()).xyz();
        let n = transformed.try_normalize(1e-12).unwrap_or(normal);
        chunk[0] = n.x as f32;
        chunk[1] = n.y as f32;
        chunk[2] = n.z as f32;
    });
}
