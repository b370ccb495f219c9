// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Canned detection dataset used when no real detection is available

use crate::types::{
    BBox, Confidence, DetectedOpening, DetectedWallSegment, DetectionResult, Point2D, Room,
    WallType,
};

/// A four-room, 16m x 12m single-storey plan (at the default plan size).
///
/// Deterministic: every call returns the same data. `used_mock` is left
/// `false`; whoever substitutes this dataset for a real detection sets it.
pub fn mock_detection() -> DetectionResult {
    let rooms = vec![
        Room::new("room-1", "Living Room", 9.0, 7.0).with_bbox(BBox::new(0.1, 0.2, 0.45, 0.35)),
        Room::new("room-2", "Kitchen", 7.0, 7.0).with_bbox(BBox::new(0.55, 0.2, 0.35, 0.35)),
        Room::new("room-3", "Bedroom", 10.0, 5.0).with_bbox(BBox::new(0.1, 0.55, 0.5, 0.25)),
        Room::new("room-4", "Bathroom", 6.0, 5.0)
            .with_bbox(BBox::new(0.6, 0.55, 0.3, 0.25))
            .with_confidence(Confidence::Low),
    ];

    let wall = |id: &str, x1, y1, x2, y2, wall_type| {
        DetectedWallSegment::new(id, Point2D::new(x1, y1), Point2D::new(x2, y2), wall_type)
    };
    let walls = vec![
        wall("wall-1", 0.1, 0.2, 0.9, 0.2, WallType::Exterior),
        wall("wall-2", 0.9, 0.2, 0.9, 0.8, WallType::Exterior),
        wall("wall-3", 0.9, 0.8, 0.1, 0.8, WallType::Exterior),
        wall("wall-4", 0.1, 0.8, 0.1, 0.2, WallType::Exterior),
        wall("wall-5", 0.55, 0.2, 0.55, 0.55, WallType::Interior),
        wall("wall-6", 0.1, 0.55, 0.9, 0.55, WallType::Interior),
        wall("wall-7", 0.6, 0.55, 0.6, 0.8, WallType::Interior),
    ];

    let doors = vec![
        DetectedOpening::new("door-1", BBox::new(0.3, 0.795, 0.045, 0.01), 0.9),
        DetectedOpening::new("door-2", BBox::new(0.545, 0.4, 0.01, 0.04), 0.8),
        DetectedOpening::new("door-3", BBox::new(0.7, 0.545, 0.04, 0.01), 0.8),
    ];

    let windows = vec![
        DetectedOpening::new("window-1", BBox::new(0.25, 0.195, 0.08, 0.01), 1.6),
        DetectedOpening::new("window-2", BBox::new(0.7, 0.195, 0.06, 0.01), 1.2),
        DetectedOpening::new("window-3", BBox::new(0.095, 0.65, 0.01, 0.07), 1.4),
        DetectedOpening::new("window-4", BBox::new(0.895, 0.35, 0.01, 0.06), 1.2),
    ];

    DetectionResult {
        rooms,
        walls,
        doors,
        windows,
        summary: Some("Sample plan: 4 rooms, 7 walls, 3 doors, 4 windows".to_string()),
        used_mock: false,
    }
}
