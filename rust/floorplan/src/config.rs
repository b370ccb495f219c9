// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Scene configuration loaded from environment variables.

use crate::types::{Point2D, DEFAULT_WALL_HEIGHT, PLAN_SIZE};
use crate::units::Unit;
use serde::{Deserialize, Serialize};

/// Plan-wide parameters shared by every placement computation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SceneConfig {
    /// Side length (meters) of the square world region the normalized
    /// [0,1]² plan is stretched onto.
    pub plan_size: f64,
    /// Global multiplier applied to room anchors and footprints.
    pub scale: f64,
    /// Wall height for walls and openings that carry none of their own.
    pub default_wall_height: f64,
    /// Unit used for display and editing. Storage is always meters.
    pub unit: Unit,
}

impl SceneConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; missing, unparseable or
    /// non-positive values fall back to the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let positive = |key: &str, fallback: f64| {
            lookup(key)
                .and_then(|v| v.trim().parse::<f64>().ok())
                .filter(|v| v.is_finite() && *v > 0.0)
                .unwrap_or(fallback)
        };

        Self {
            plan_size: positive("PLANLITE_PLAN_SIZE", defaults.plan_size),
            scale: positive("PLANLITE_SCALE", defaults.scale),
            default_wall_height: positive("PLANLITE_WALL_HEIGHT", defaults.default_wall_height),
            unit: lookup("PLANLITE_UNIT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.unit),
        }
    }

    /// Normalized plan coordinate to world plan coordinate, centered on the
    /// origin: `world = n * plan_size - plan_size / 2`.
    #[inline]
    pub fn to_world(&self, n: Point2D) -> Point2D {
        let half = self.plan_size / 2.0;
        Point2D::new(n.x * self.plan_size - half, n.y * self.plan_size - half)
    }

    /// Inverse of [`SceneConfig::to_world`]
    #[inline]
    pub fn to_normalized(&self, w: Point2D) -> Point2D {
        let half = self.plan_size / 2.0;
        Point2D::new((w.x + half) / self.plan_size, (w.y + half) / self.plan_size)
    }
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            plan_size: PLAN_SIZE,
            scale: 1.0,
            default_wall_height: DEFAULT_WALL_HEIGHT,
            unit: Unit::M,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustc_hash::FxHashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: FxHashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = SceneConfig::from_lookup(|_| None);
        assert_eq!(config, SceneConfig::default());
        assert_eq!(config.plan_size, 20.0);
        assert_eq!(config.default_wall_height, 2.8);
    }

    #[test]
    fn test_overrides_and_fallbacks() {
        let config = SceneConfig::from_lookup(lookup_from(&[
            ("PLANLITE_PLAN_SIZE", "30"),
            ("PLANLITE_SCALE", "-1"),
            ("PLANLITE_WALL_HEIGHT", "three"),
            ("PLANLITE_UNIT", "ft"),
        ]));
        assert_eq!(config.plan_size, 30.0);
        assert_eq!(config.scale, 1.0);
        assert_eq!(config.default_wall_height, 2.8);
        assert_eq!(config.unit, Unit::Ft);
    }

    #[test]
    fn test_world_mapping() {
        let config = SceneConfig::default();
        assert_eq!(config.to_world(Point2D::new(0.0, 0.0)), Point2D::new(-10.0, -10.0));
        assert_eq!(config.to_world(Point2D::new(0.5, 1.0)), Point2D::new(0.0, 10.0));
        let back = config.to_normalized(config.to_world(Point2D::new(0.3, 0.7)));
        assert!((back.x - 0.3).abs() < 1e-12);
        assert!((back.y - 0.7).abs() < 1e-12);
    }

    #[test]
    fn test_partial_json() {
        let config: SceneConfig = serde_json::from_str(r#"{"scale": 2.0, "unit": "cm"}"#).unwrap();
        assert_eq!(config.scale, 2.0);
        assert_eq!(config.unit, Unit::Cm);
        assert_eq!(config.plan_size, PLAN_SIZE);
    }
}
