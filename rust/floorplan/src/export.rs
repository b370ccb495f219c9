// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Room export document and Wavefront OBJ output

use crate::error::Result;
use crate::scene::Scene;
use crate::types::Room;
use crate::units::Unit;
use serde::Serialize;
use std::io::Write;

/// Display settings recorded alongside the export; they never rescale it
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ExportMeta {
    pub unit: Unit,
    pub scale: f64,
}

#[derive(Debug, Serialize)]
pub struct RoomExport<'a> {
    pub meta: ExportMeta,
    /// Always meters, whatever the display unit
    pub rooms: &'a [Room],
}

/// Pretty-printed `{ meta: { unit, scale }, rooms: [...] }`
pub fn export_rooms_json(rooms: &[Room], unit: Unit, scale: f64) -> Result<String> {
    let doc = RoomExport {
        meta: ExportMeta { unit, scale },
        rooms,
    };
    Ok(serde_json::to_string_pretty(&doc)?)
}

/// Write the scene as a Y-up OBJ with one object per node
pub fn write_obj<W: Write>(scene: &Scene, mut out: W) -> Result<()> {
    writeln!(out, "# Generated by plan-to-3d (plan-lite)")?;
    writeln!(
        out,
        "# {} rooms, {} walls, {} doors, {} windows",
        scene.rooms.len(),
        scene.walls.len(),
        scene.doors.len(),
        scene.windows.len()
    )?;
    if scene.used_mock {
        writeln!(out, "# Geometry from the sample dataset")?;
    }
    writeln!(out, "# Coordinate system: Y-up")?;
    writeln!(out)?;

    let mut vertex_offset: u32 = 0;
    for (id, mesh) in scene.meshes() {
        writeln!(out, "o {}", obj_name(id))?;

        for v in mesh.positions.chunks_exact(3) {
            writeln!(out, "v {:.6} {:.6} {:.6}", v[0], v[1], v[2])?;
        }
        for n in mesh.normals.chunks_exact(3) {
            writeln!(out, "vn {:.6} {:.6} {:.6}", n[0], n[1], n[2])?;
        }
        for tri in mesh.indices.chunks_exact(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| i + vertex_offset + 1);
            writeln!(out, "f {a}//{a} {b}//{b} {c}//{c}")?;
        }

        vertex_offset += mesh.vertex_count() as u32;
    }
    out.flush()?;
    Ok(())
}

/// OBJ names end at whitespace
fn obj_name(id: &str) -> String {
    id.split_whitespace().collect::<Vec<_>>().join("_")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SceneConfig;
    use crate::mock::mock_detection;
    use crate::scene::build_scene;
    use crate::state::{GeometryStore, RoomEdit};

    #[test]
    fn test_export_stays_in_meters() {
        let mut store = GeometryStore::from_detection(mock_detection());
        store.edit_room("room-1", RoomEdit::Width(4.5)).unwrap();

        let json = export_rooms_json(store.rooms(), Unit::Ft, 2.0).unwrap();
        let doc: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(doc["meta"]["unit"], "ft");
        assert_eq!(doc["meta"]["scale"], 2.0);
        assert_eq!(doc["rooms"].as_array().unwrap().len(), 4);
        assert_eq!(doc["rooms"][0]["width"], 4.5);
        assert_eq!(doc["rooms"][0]["confidence"], "manual");
        assert_eq!(doc["rooms"][0]["wallHeight"], 2.8);
    }

    #[test]
    fn test_export_empty() {
        let json = export_rooms_json(&[], Unit::M, 1.0).unwrap();
        let doc: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(doc["rooms"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_write_obj() {
        let store = GeometryStore::from_detection(mock_detection());
        let scene = build_scene(&store, &SceneConfig::default()).unwrap();

        let mut buf = Vec::new();
        write_obj(&scene, &mut buf).unwrap();
        let obj = String::from_utf8(buf).unwrap();

        let objects = obj.lines().filter(|l| l.starts_with("o ")).count();
        assert_eq!(objects, scene.node_count());
        assert!(obj.contains("o wall-1"));

        let vertices = obj.lines().filter(|l| l.starts_with("v ")).count();
        let combined = scene.combined_mesh();
        assert_eq!(vertices, combined.vertex_count());

        // face indices are 1-based and never exceed the vertex count
        let max_index = obj
            .lines()
            .filter(|l| l.starts_with("f "))
            .flat_map(|l| l[2..].split_whitespace())
            .filter_map(|f| f.split("//").next()?.parse::<usize>().ok())
            .max()
            .unwrap();
        assert_eq!(max_index, vertices);
    }

    #[test]
    fn test_obj_name_has_no_whitespace() {
        assert_eq!(obj_name("living room 1"), "living_room_1");
    }
}
