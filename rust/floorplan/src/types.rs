// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Core types for floor plan detection results and editable geometry
//!
//! All lengths are meters. Positions on the source image are normalized to
//! [0,1] x [0,1] with the origin at the top-left corner.

use serde::{Deserialize, Serialize};

/// Side length (meters) of the square world region normalized coordinates
/// are stretched onto when no absolute scale is known
pub const PLAN_SIZE: f64 = 20.0;

/// Wall height applied to rooms the detector leaves unset
pub const DEFAULT_WALL_HEIGHT: f64 = 2.8;

/// Smallest extent any room dimension or solid may collapse to
pub const MIN_EXTENT: f64 = 0.01;

/// A 2D point (normalized image space or world plan space)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Point2D) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Normalized bounding box anchoring an element to the source image
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct BBox {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl BBox {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    pub fn center(&self) -> Point2D {
        Point2D::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    /// Box confined to the unit square (non-finite components become 0)
    pub fn clamped(&self) -> BBox {
        let x = unit_interval(self.x);
        let y = unit_interval(self.y);
        BBox {
            x,
            y,
            w: finite_or_zero(self.w).clamp(0.0, 1.0 - x),
            h: finite_or_zero(self.h).clamp(0.0, 1.0 - y),
        }
    }
}

/// Provenance of an editable value
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    /// Detected, detector is confident
    #[default]
    High,
    /// Detected, detector is unsure
    Low,
    /// Set by the user; never reverts
    Manual,
}

/// Detected (and later user-edited) room
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Horizontal extent (meters)
    #[serde(default)]
    pub width: f64,
    /// Horizontal extent perpendicular to `width` (meters), not elevation
    #[serde(default)]
    pub height: f64,
    #[serde(default = "default_wall_height")]
    pub wall_height: f64,
    #[serde(default)]
    pub confidence: Confidence,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<BBox>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_cost: Option<f64>,
}

impl Room {
    pub fn new(id: impl Into<String>, name: impl Into<String>, width: f64, height: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            width,
            height,
            wall_height: DEFAULT_WALL_HEIGHT,
            confidence: Confidence::High,
            bbox: None,
            material: None,
            finish_cost: None,
        }
    }

    pub fn with_bbox(mut self, bbox: BBox) -> Self {
        self.bbox = Some(bbox);
        self
    }

    pub fn with_confidence(mut self, confidence: Confidence) -> Self {
        self.confidence = confidence;
        self
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }
}

fn default_wall_height() -> f64 {
    DEFAULT_WALL_HEIGHT
}

/// Wall classification
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum WallType {
    Exterior,
    #[default]
    Interior,
}

impl WallType {
    /// Thickness used when the detector supplies neither a value nor a ratio
    pub fn default_thickness(self) -> f64 {
        match self {
            WallType::Exterior => 0.25,
            WallType::Interior => 0.15,
        }
    }

    pub fn toggled(self) -> WallType {
        match self {
            WallType::Exterior => WallType::Interior,
            WallType::Interior => WallType::Exterior,
        }
    }
}

/// Wall centerline segment in normalized image coordinates
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DetectedWallSegment {
    #[serde(default)]
    pub id: String,
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    #[serde(rename = "type", default)]
    pub wall_type: WallType,
    /// Explicit thickness (meters)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thickness: Option<f64>,
    /// Thickness relative to the image side, only when the detector reports it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thickness_ratio: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wall_height: Option<f64>,
    #[serde(default)]
    pub confidence: Confidence,
}

impl DetectedWallSegment {
    pub fn new(id: impl Into<String>, start: Point2D, end: Point2D, wall_type: WallType) -> Self {
        Self {
            id: id.into(),
            x1: start.x,
            y1: start.y,
            x2: end.x,
            y2: end.y,
            wall_type,
            thickness: None,
            thickness_ratio: None,
            wall_height: None,
            confidence: Confidence::High,
        }
    }

    pub fn with_thickness(mut self, thickness: f64) -> Self {
        self.thickness = Some(thickness);
        self
    }

    pub fn start(&self) -> Point2D {
        Point2D::new(self.x1, self.y1)
    }

    pub fn end(&self) -> Point2D {
        Point2D::new(self.x2, self.y2)
    }

    /// Centerline length in normalized units
    pub fn normalized_length(&self) -> f64 {
        self.start().distance_to(&self.end())
    }
}

/// Door or window opening; orientation is derived from the bbox
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DetectedOpening {
    #[serde(default)]
    pub id: String,
    pub bbox: BBox,
    /// Real-world opening width (meters)
    #[serde(default, rename = "widthM")]
    pub width_m: f64,
}

impl DetectedOpening {
    pub fn new(id: impl Into<String>, bbox: BBox, width_m: f64) -> Self {
        Self {
            id: id.into(),
            bbox,
            width_m,
        }
    }
}

/// Opening kind
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum OpeningType {
    Door,
    Window,
}

/// Complete detection result, as returned by the detector or the mock
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DetectionResult {
    #[serde(default)]
    pub rooms: Vec<Room>,
    #[serde(default)]
    pub walls: Vec<DetectedWallSegment>,
    #[serde(default)]
    pub doors: Vec<DetectedOpening>,
    #[serde(default)]
    pub windows: Vec<DetectedOpening>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// The canned fallback dataset stood in for a real detection.
    /// Informational only.
    #[serde(default)]
    pub used_mock: bool,
}

impl DetectionResult {
    /// Parse detector JSON and normalize it
    pub fn from_json(json: &str) -> crate::error::Result<Self> {
        let mut result: DetectionResult = serde_json::from_str(json)?;
        result.normalize();
        Ok(result)
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
            && self.walls.is_empty()
            && self.doors.is_empty()
            && self.windows.is_empty()
    }

    /// Repair malformed entries in place so downstream geometry never sees
    /// blank ids, out-of-range coordinates or non-positive dimensions.
    pub fn normalize(&mut self) {
        for (i, room) in self.rooms.iter_mut().enumerate() {
            if room.id.trim().is_empty() {
                room.id = format!("room-{}", i + 1);
            }
            if room.name.trim().is_empty() {
                room.name = format!("Room {}", i + 1);
            }
            room.width = positive_or_min(room.width);
            room.height = positive_or_min(room.height);
            if !(room.wall_height.is_finite() && room.wall_height > 0.0) {
                room.wall_height = DEFAULT_WALL_HEIGHT;
            }
            room.bbox = room.bbox.map(|b| b.clamped());
        }

        for (i, wall) in self.walls.iter_mut().enumerate() {
            if wall.id.trim().is_empty() {
                wall.id = format!("wall-{}", i + 1);
            }
            wall.x1 = unit_interval(wall.x1);
            wall.y1 = unit_interval(wall.y1);
            wall.x2 = unit_interval(wall.x2);
            wall.y2 = unit_interval(wall.y2);
            wall.thickness = wall.thickness.filter(|t| t.is_finite() && *t > 0.0);
            wall.thickness_ratio = wall.thickness_ratio.filter(|r| r.is_finite() && *r > 0.0);
            wall.wall_height = wall.wall_height.filter(|h| h.is_finite() && *h > 0.0);
        }

        for (prefix, openings) in [("door", &mut self.doors), ("window", &mut self.windows)] {
            for (i, opening) in openings.iter_mut().enumerate() {
                if opening.id.trim().is_empty() {
                    opening.id = format!("{}-{}", prefix, i + 1);
                }
                opening.bbox = opening.bbox.clamped();
                opening.width_m = finite_or_zero(opening.width_m).max(0.0);
            }
        }
    }
}

fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

fn unit_interval(v: f64) -> f64 {
    finite_or_zero(v).clamp(0.0, 1.0)
}

fn positive_or_min(v: f64) -> f64 {
    if v.is_finite() && v > MIN_EXTENT {
        v
    } else {
        MIN_EXTENT
    }
}
