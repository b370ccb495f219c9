// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the floor plan pipeline.
//!
//! Malformed detections and degenerate geometry are repaired in place and
//! never show up here; these variants cover lifecycle misuse, unknown ids
//! and I/O.

use thiserror::Error;

/// Result type alias for floor plan operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("room not found: {0}")]
    UnknownRoom(String),

    #[error("wall not found: {0}")]
    UnknownWall(String),

    #[error("no source image loaded")]
    NoSourceImage,

    #[error("a detection request is already in flight")]
    DetectionInFlight,

    #[error("no detected geometry available")]
    NoGeometry,

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("geometry error: {0}")]
    Geometry(#[from] planlite_geometry::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
