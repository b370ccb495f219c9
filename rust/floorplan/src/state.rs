// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Editable geometry state
//!
//! The store is created wholesale from one detection result and is the single
//! source of truth for rooms and walls afterwards. Editing a dimension
//! (`width`, `height`, `thickness`, `wallHeight`) moves the element to
//! [`Confidence::Manual`] for good. Doors and windows are a read-only snapshot.

use crate::error::{Error, Result};
use crate::types::{
    Confidence, DetectedOpening, DetectedWallSegment, DetectionResult, Room, WallType,
};
use crate::units::{parse_input, Unit};
use rustc_hash::FxHashMap;

/// A single edit to a room
#[derive(Debug, Clone, PartialEq)]
pub enum RoomEdit {
    Name(String),
    /// Meters
    Width(f64),
    /// Meters
    Height(f64),
    /// Meters
    WallHeight(f64),
    Material(Option<String>),
    FinishCost(Option<f64>),
}

impl RoomEdit {
    fn is_dimensional(&self) -> bool {
        matches!(
            self,
            RoomEdit::Width(_) | RoomEdit::Height(_) | RoomEdit::WallHeight(_)
        )
    }
}

/// A single edit to a wall
#[derive(Debug, Clone, PartialEq)]
pub enum WallEdit {
    /// Meters
    Thickness(f64),
    /// Meters
    WallHeight(f64),
    ToggleType,
    SetType(WallType),
}

impl WallEdit {
    fn is_dimensional(&self) -> bool {
        matches!(self, WallEdit::Thickness(_) | WallEdit::WallHeight(_))
    }
}

/// Numeric room fields editable through a text input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomField {
    Width,
    Height,
    WallHeight,
}

/// Numeric wall fields editable through a text input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WallField {
    Thickness,
    WallHeight,
}

/// Whether an edit changed the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    Applied,
    /// Invalid value; the previous value was kept
    Ignored,
}

/// In-memory rooms and walls of the current session, plus the opening
/// snapshot from the same detection
#[derive(Debug, Clone, Default)]
pub struct GeometryStore {
    rooms: Vec<Room>,
    walls: Vec<DetectedWallSegment>,
    doors: Vec<DetectedOpening>,
    windows: Vec<DetectedOpening>,
    room_index: FxHashMap<String, usize>,
    wall_index: FxHashMap<String, usize>,
    summary: Option<String>,
    used_mock: bool,
}

impl GeometryStore {
    /// Take ownership of a detection result. The result is normalized first so
    /// ids are present; duplicate ids keep their first occurrence.
    pub fn from_detection(mut result: DetectionResult) -> Self {
        result.normalize();

        let mut room_index = FxHashMap::default();
        let rooms: Vec<Room> = result
            .rooms
            .into_iter()
            .filter(|room| {
                if room_index.contains_key(&room.id) {
                    tracing::warn!(room = %room.id, "Dropping room with duplicate id");
                    return false;
                }
                room_index.insert(room.id.clone(), room_index.len());
                true
            })
            .collect();

        let mut wall_index = FxHashMap::default();
        let walls: Vec<DetectedWallSegment> = result
            .walls
            .into_iter()
            .filter(|wall| {
                if wall_index.contains_key(&wall.id) {
                    tracing::warn!(wall = %wall.id, "Dropping wall with duplicate id");
                    return false;
                }
                wall_index.insert(wall.id.clone(), wall_index.len());
                true
            })
            .collect();

        Self {
            rooms,
            walls,
            doors: result.doors,
            windows: result.windows,
            room_index,
            wall_index,
            summary: result.summary,
            used_mock: result.used_mock,
        }
    }

    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    pub fn walls(&self) -> &[DetectedWallSegment] {
        &self.walls
    }

    pub fn doors(&self) -> &[DetectedOpening] {
        &self.doors
    }

    pub fn windows(&self) -> &[DetectedOpening] {
        &self.windows
    }

    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    /// Informational only; nothing downstream branches on it
    pub fn used_mock(&self) -> bool {
        self.used_mock
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
            && self.walls.is_empty()
            && self.doors.is_empty()
            && self.windows.is_empty()
    }

    pub fn room(&self, id: &str) -> Option<&Room> {
        self.room_index.get(id).map(|&i| &self.rooms[i])
    }

    pub fn wall(&self, id: &str) -> Option<&DetectedWallSegment> {
        self.wall_index.get(id).map(|&i| &self.walls[i])
    }

    /// Total floor area of all rooms (square meters)
    pub fn total_area(&self) -> f64 {
        self.rooms.iter().map(Room::area).sum()
    }

    /// Apply one edit. Dimensions must be finite and positive; anything else
    /// is ignored and leaves the room untouched.
    pub fn edit_room(&mut self, id: &str, edit: RoomEdit) -> Result<EditOutcome> {
        let index = *self
            .room_index
            .get(id)
            .ok_or_else(|| Error::UnknownRoom(id.to_string()))?;
        let room = &mut self.rooms[index];

        let dimensional = edit.is_dimensional();
        match edit {
            RoomEdit::Name(name) => room.name = name,
            RoomEdit::Width(v) => match valid_dimension(v) {
                Some(v) => room.width = v,
                None => return Ok(ignored(id, "width", v)),
            },
            RoomEdit::Height(v) => match valid_dimension(v) {
                Some(v) => room.height = v,
                None => return Ok(ignored(id, "height", v)),
            },
            RoomEdit::WallHeight(v) => match valid_dimension(v) {
                Some(v) => room.wall_height = v,
                None => return Ok(ignored(id, "wallHeight", v)),
            },
            RoomEdit::Material(material) => room.material = material,
            RoomEdit::FinishCost(cost) => room.finish_cost = cost.filter(|c| c.is_finite()),
        }

        if dimensional {
            room.confidence = Confidence::Manual;
        }
        Ok(EditOutcome::Applied)
    }

    /// Apply one edit to a wall; same validity rules as rooms.
    pub fn edit_wall(&mut self, id: &str, edit: WallEdit) -> Result<EditOutcome> {
        let index = *self
            .wall_index
            .get(id)
            .ok_or_else(|| Error::UnknownWall(id.to_string()))?;
        let wall = &mut self.walls[index];

        let dimensional = edit.is_dimensional();
        match edit {
            WallEdit::Thickness(v) => match valid_dimension(v) {
                Some(v) => wall.thickness = Some(v),
                None => return Ok(ignored(id, "thickness", v)),
            },
            WallEdit::WallHeight(v) => match valid_dimension(v) {
                Some(v) => wall.wall_height = Some(v),
                None => return Ok(ignored(id, "wallHeight", v)),
            },
            WallEdit::ToggleType => wall.wall_type = wall.wall_type.toggled(),
            WallEdit::SetType(wall_type) => wall.wall_type = wall_type,
        }

        if dimensional {
            wall.confidence = Confidence::Manual;
        }
        Ok(EditOutcome::Applied)
    }

    /// Edit a room dimension from text typed in the display unit
    pub fn edit_room_input(
        &mut self,
        id: &str,
        field: RoomField,
        input: &str,
        unit: Unit,
    ) -> Result<EditOutcome> {
        if self.room(id).is_none() {
            return Err(Error::UnknownRoom(id.to_string()));
        }
        let Some(meters) = parse_input(input, unit) else {
            tracing::warn!(room = %id, input, "Ignoring non-numeric room edit");
            return Ok(EditOutcome::Ignored);
        };
        let edit = match field {
            RoomField::Width => RoomEdit::Width(meters),
            RoomField::Height => RoomEdit::Height(meters),
            RoomField::WallHeight => RoomEdit::WallHeight(meters),
        };
        self.edit_room(id, edit)
    }

    /// Edit a wall dimension from text typed in the display unit
    pub fn edit_wall_input(
        &mut self,
        id: &str,
        field: WallField,
        input: &str,
        unit: Unit,
    ) -> Result<EditOutcome> {
        if self.wall(id).is_none() {
            return Err(Error::UnknownWall(id.to_string()));
        }
        let Some(meters) = parse_input(input, unit) else {
            tracing::warn!(wall = %id, input, "Ignoring non-numeric wall edit");
            return Ok(EditOutcome::Ignored);
        };
        let edit = match field {
            WallField::Thickness => WallEdit::Thickness(meters),
            WallField::WallHeight => WallEdit::WallHeight(meters),
        };
        self.edit_wall(id, edit)
    }
}

fn valid_dimension(v: f64) -> Option<f64> {
    (v.is_finite() && v > 0.0).then_some(v)
}

fn ignored(id: &str, field: &str, value: f64) -> EditOutcome {
    tracing::warn!(id, field, value, "Ignoring non-positive dimension edit");
    EditOutcome::Ignored
}
