// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Room anchors in world space
//!
//! Rooms are anchored at their detected bbox center when every room has a
//! bbox. Otherwise the whole list falls back to a row-major grid so the 3D
//! view stays usable with manually entered rooms; that grid is a display
//! convenience and implies nothing about the real layout.

use crate::config::SceneConfig;
use crate::types::{Room, MIN_EXTENT};
use planlite_geometry::Point3;

/// Gap between neighbouring rooms in a grid row (scene units)
pub const GRID_GAP: f64 = 0.8;
/// Distance between grid rows (scene units)
pub const GRID_ROW_PITCH: f64 = 8.0;

/// Which placement path produced a layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutMode {
    BoundingBox,
    Grid,
}

/// Anchor and scaled footprint for one room
#[derive(Debug, Clone, PartialEq)]
pub struct RoomAnchor {
    pub id: String,
    /// Footprint center on the floor (`y = 0`)
    pub position: Point3<f64>,
    /// Scaled extent along world X
    pub footprint_width: f64,
    /// Scaled extent along world Z
    pub footprint_depth: f64,
}

/// Layout for a full room list, in input order
#[derive(Debug, Clone, PartialEq)]
pub struct RoomLayout {
    pub mode: LayoutMode,
    pub anchors: Vec<RoomAnchor>,
}

/// Pick the layout path for a room list
pub fn layout_mode(rooms: &[Room]) -> LayoutMode {
    if rooms.iter().all(|r| r.bbox.is_some()) {
        LayoutMode::BoundingBox
    } else {
        LayoutMode::Grid
    }
}

/// Place every room. Pure: the same input always yields the same layout.
pub fn place_rooms(rooms: &[Room], config: &SceneConfig) -> RoomLayout {
    let mode = layout_mode(rooms);
    let anchors = match mode {
        LayoutMode::BoundingBox => place_by_bbox(rooms, config),
        LayoutMode::Grid => place_on_grid(rooms, config.scale),
    };
    tracing::debug!(rooms = rooms.len(), ?mode, "Placed rooms");
    RoomLayout { mode, anchors }
}

fn footprint(room: &Room, scale: f64) -> (f64, f64) {
    (
        (room.width * scale).max(MIN_EXTENT),
        (room.height * scale).max(MIN_EXTENT),
    )
}

fn place_by_bbox(rooms: &[Room], config: &SceneConfig) -> Vec<RoomAnchor> {
    rooms
        .iter()
        .filter_map(|room| {
            let bbox = room.bbox?;
            let center = config.to_world(bbox.center());
            let (w, d) = footprint(room, config.scale);
            Some(RoomAnchor {
                id: room.id.clone(),
                position: Point3::new(center.x * config.scale, 0.0, center.y * config.scale),
                footprint_width: w,
                footprint_depth: d,
            })
        })
        .collect()
}

fn place_on_grid(rooms: &[Room], scale: f64) -> Vec<RoomAnchor> {
    if rooms.is_empty() {
        return Vec::new();
    }
    let columns = (rooms.len() as f64).sqrt().ceil() as usize;

    let mut anchors = Vec::with_capacity(rooms.len());
    for (row, chunk) in rooms.chunks(columns).enumerate() {
        let z = row as f64 * GRID_ROW_PITCH;
        let mut cursor = 0.0;
        for room in chunk {
            let (w, d) = footprint(room, scale);
            anchors.push(RoomAnchor {
                id: room.id.clone(),
                position: Point3::new(cursor + w / 2.0, 0.0, z),
                footprint_width: w,
                footprint_depth: d,
            });
            cursor += w + GRID_GAP;
        }
    }
    anchors
}
