// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Display unit conversion.
//!
//! Geometry is stored in meters. Every editable numeric field converts
//! through here on the way in and on the way out; only the displayed string
//! is ever rounded.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Length unit offered for display and editing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    #[default]
    M,
    Cm,
    Mm,
    Ft,
}

impl Unit {
    pub const ALL: [Unit; 4] = [Unit::M, Unit::Cm, Unit::Mm, Unit::Ft];

    /// Fixed conversion factor to the canonical unit
    pub fn meters_per_unit(self) -> f64 {
        match self {
            Unit::M => 1.0,
            Unit::Cm => 0.01,
            Unit::Mm => 0.001,
            Unit::Ft => 0.3048,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Unit::M => "m",
            Unit::Cm => "cm",
            Unit::Mm => "mm",
            Unit::Ft => "ft",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Error for unit labels that are not m/cm/mm/ft
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown unit: {0}")]
pub struct UnknownUnit(pub String);

impl FromStr for Unit {
    type Err = UnknownUnit;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "m" => Ok(Unit::M),
            "cm" => Ok(Unit::Cm),
            "mm" => Ok(Unit::Mm),
            "ft" => Ok(Unit::Ft),
            other => Err(UnknownUnit(other.to_string())),
        }
    }
}

/// Convert a value expressed in `unit` to meters
#[inline]
pub fn to_canonical(value: f64, unit: Unit) -> f64 {
    value * unit.meters_per_unit()
}

/// Convert meters to a value expressed in `unit`
#[inline]
pub fn from_canonical(meters: f64, unit: Unit) -> f64 {
    meters / unit.meters_per_unit()
}

/// Presentation string, rounded to two decimals
pub fn format_display(meters: f64, unit: Unit) -> String {
    format!("{:.2}", from_canonical(meters, unit))
}

/// Parse user input in `unit` into meters.
///
/// Returns `None` for anything that is not a finite number.
pub fn parse_input(input: &str, unit: Unit) -> Option<f64> {
    let value: f64 = input.trim().parse().ok()?;
    if !value.is_finite() {
        return None;
    }
    Some(to_canonical(value, unit))
}

/// Apply an edit to a canonical value; invalid input keeps `previous`.
pub fn apply_input(previous: f64, input: &str, unit: Unit) -> f64 {
    parse_input(input, unit).unwrap_or(previous)
}
