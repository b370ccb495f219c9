// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! 3D scene assembly from the editable geometry
//!
//! Openings are not attached to any room, so doors and windows size against
//! the plan default wall height. A room's own `wall_height` is carried on its
//! [`RoomNode`] and in the room export but does not move any solid.

use crate::config::SceneConfig;
use crate::error::Result;
use crate::openings::{place_opening, OpeningPlacement};
use crate::rooms::{place_rooms, LayoutMode, RoomAnchor};
use crate::state::GeometryStore;
use crate::types::{Confidence, DetectedOpening, OpeningType, WallType};
use crate::walls::{build_wall_solid, WallSolid};
use planlite_geometry::{extrude_footprint, Bounds3, Mesh, Placement, Profile2D};

/// Room floors are thin slabs hanging just below `y = 0`
pub const FLOOR_SLAB_THICKNESS: f64 = 0.1;

#[derive(Debug, Clone)]
pub struct RoomNode {
    pub anchor: RoomAnchor,
    pub name: String,
    /// Informational; walls and openings use their own heights
    pub wall_height: f64,
    pub confidence: Confidence,
    pub mesh: Mesh,
}

#[derive(Debug, Clone)]
pub struct WallNode {
    pub solid: WallSolid,
    pub wall_type: WallType,
    pub confidence: Confidence,
    pub mesh: Mesh,
}

#[derive(Debug, Clone)]
pub struct OpeningNode {
    pub placement: OpeningPlacement,
    pub mesh: Mesh,
}

/// Everything the 3D view draws, in world space (Y up)
#[derive(Debug, Clone, Default)]
pub struct Scene {
    pub rooms: Vec<RoomNode>,
    pub walls: Vec<WallNode>,
    pub doors: Vec<OpeningNode>,
    pub windows: Vec<OpeningNode>,
    /// Room layout path; `None` for a scene without rooms
    pub layout_mode: Option<LayoutMode>,
    /// Carried through for display only
    pub used_mock: bool,
}

impl Scene {
    pub fn is_empty(&self) -> bool {
        self.node_count() == 0
    }

    pub fn node_count(&self) -> usize {
        self.rooms.len() + self.walls.len() + self.doors.len() + self.windows.len()
    }

    /// Every node as `(id, mesh)`, rooms first
    pub fn meshes(&self) -> impl Iterator<Item = (&str, &Mesh)> + '_ {
        let rooms = self.rooms.iter().map(|n| (n.anchor.id.as_str(), &n.mesh));
        let walls = self.walls.iter().map(|n| (n.solid.id.as_str(), &n.mesh));
        let openings = self
            .doors
            .iter()
            .chain(&self.windows)
            .map(|n| (n.placement.id.as_str(), &n.mesh));
        rooms.chain(walls).chain(openings)
    }

    /// All node meshes merged into one
    pub fn combined_mesh(&self) -> Mesh {
        let mut combined = Mesh::new();
        for (_, mesh) in self.meshes() {
            combined.merge(mesh);
        }
        combined
    }

    /// World-space bounds; empty for an empty scene
    pub fn bounds(&self) -> Bounds3 {
        self.meshes()
            .fold(Bounds3::empty(), |acc, (_, mesh)| acc.union(&mesh.bounds()))
    }
}

/// Build the scene for the current store.
///
/// Walls and openings sit in absolute plan space; only room anchors and
/// footprints follow the global scale.
pub fn build_scene(store: &GeometryStore, config: &SceneConfig) -> Result<Scene> {
    let layout = place_rooms(store.rooms(), config);
    let rooms = layout
        .anchors
        .into_iter()
        .zip(store.rooms())
        .map(|(anchor, room)| -> Result<RoomNode> {
            let mesh = floor_slab(&anchor)?;
            Ok(RoomNode {
                name: room.name.clone(),
                wall_height: room.wall_height,
                confidence: room.confidence,
                anchor,
                mesh,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let walls = store
        .walls()
        .iter()
        .map(|wall| -> Result<WallNode> {
            let solid = build_wall_solid(wall, config);
            let mesh = solid.to_mesh()?;
            Ok(WallNode {
                solid,
                wall_type: wall.wall_type,
                confidence: wall.confidence,
                mesh,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let doors = opening_nodes(store.doors(), OpeningType::Door, config)?;
    let windows = opening_nodes(store.windows(), OpeningType::Window, config)?;

    let scene = Scene {
        layout_mode: (!rooms.is_empty()).then_some(layout.mode),
        rooms,
        walls,
        doors,
        windows,
        used_mock: store.used_mock(),
    };

    tracing::info!(
        rooms = scene.rooms.len(),
        walls = scene.walls.len(),
        doors = scene.doors.len(),
        windows = scene.windows.len(),
        "Scene built"
    );
    Ok(scene)
}

fn floor_slab(anchor: &RoomAnchor) -> Result<Mesh> {
    let profile = Profile2D::rectangle(anchor.footprint_width, anchor.footprint_depth);
    let placement = Placement::translation(
        anchor.position.x,
        anchor.position.y - FLOOR_SLAB_THICKNESS,
        anchor.position.z,
    );
    Ok(extrude_footprint(
        &profile,
        FLOOR_SLAB_THICKNESS,
        Some(placement.to_matrix()),
    )?)
}

fn opening_nodes(
    openings: &[DetectedOpening],
    kind: OpeningType,
    config: &SceneConfig,
) -> Result<Vec<OpeningNode>> {
    openings
        .iter()
        .map(|opening| -> Result<OpeningNode> {
            let placement = place_opening(opening, kind, config.default_wall_height, config);
            let mesh = placement.to_mesh()?;
            Ok(OpeningNode { placement, mesh })
        })
        .collect()
}
