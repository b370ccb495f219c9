// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Overlay coordinate mapping
//!
//! Overlay shapes are drawn over the *displayed* image, so normalized
//! coordinates scale by the rendered box, not the natural image size. The
//! rendered box changes whenever layout reflows, so the image view owns a
//! [`ResizeSource`] that pushes every measurement to its live
//! [`OverlayMapper`]s. Until the first measurement arrives a mapper reports a
//! 1x1 box.
//!
//! Lifecycle: [`ResizeSource::observe`] subscribes, dropping the mapper or
//! [`ResizeSource::unobserve`] unsubscribes, and
//! [`ResizeSource::disconnect_all`] tears every subscription down when the
//! image is removed or swapped.

use crate::config::SceneConfig;
use crate::session::Selection;
use crate::state::GeometryStore;
use crate::types::{BBox, Confidence, OpeningType, Point2D, WallType};
use crate::walls::build_wall_solid;
use serde::Serialize;
use std::cell::Cell;
use std::fmt::Write as _;
use std::rc::{Rc, Weak};

/// Rendered content box of the displayed image, in pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RenderedBox {
    pub width: f64,
    pub height: f64,
}

impl RenderedBox {
    /// Placeholder used before the first measurement lands
    pub const UNMEASURED: RenderedBox = RenderedBox {
        width: 1.0,
        height: 1.0,
    };

    /// `None` for sizes that cannot be mapped onto (zero, negative, NaN)
    pub fn new(width: f64, height: f64) -> Option<Self> {
        let valid = |v: f64| v.is_finite() && v > 0.0;
        (valid(width) && valid(height)).then_some(Self { width, height })
    }
}

impl Default for RenderedBox {
    fn default() -> Self {
        Self::UNMEASURED
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PixelRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug)]
struct MapperSlot {
    rendered: Cell<RenderedBox>,
    attached: Cell<bool>,
}

/// Resize notifications for one displayed image
#[derive(Debug, Default)]
pub struct ResizeSource {
    observers: Vec<Weak<MapperSlot>>,
    last: Option<RenderedBox>,
}

impl ResizeSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe a new mapper, seeded with the latest measurement
    pub fn observe(&mut self) -> OverlayMapper {
        let slot = Rc::new(MapperSlot {
            rendered: Cell::new(self.last.unwrap_or_default()),
            attached: Cell::new(true),
        });
        self.observers.push(Rc::downgrade(&slot));
        OverlayMapper { slot }
    }

    /// Report the rendered size after a resize or image load.
    ///
    /// Unusable sizes are dropped and the previous box stays in effect.
    pub fn notify_resize(&mut self, width: f64, height: f64) {
        let Some(rendered) = RenderedBox::new(width, height) else {
            tracing::debug!(width, height, "Ignoring unusable rendered size");
            return;
        };
        self.last = Some(rendered);
        self.observers.retain(|weak| match weak.upgrade() {
            Some(slot) if slot.attached.get() => {
                slot.rendered.set(rendered);
                true
            }
            _ => false,
        });
    }

    /// Unsubscribe one mapper
    pub fn unobserve(&mut self, mapper: OverlayMapper) {
        mapper.slot.attached.set(false);
        self.observers
            .retain(|weak| weak.upgrade().is_some_and(|s| !Rc::ptr_eq(&s, &mapper.slot)));
    }

    /// Tear down every subscription (image removed or replaced)
    pub fn disconnect_all(&mut self) {
        for slot in self.observers.drain(..).filter_map(|w| w.upgrade()) {
            slot.attached.set(false);
        }
        self.last = None;
    }

    /// Number of mappers still receiving updates
    pub fn observer_count(&self) -> usize {
        self.observers
            .iter()
            .filter_map(Weak::upgrade)
            .filter(|s| s.attached.get())
            .count()
    }

    pub fn last_measurement(&self) -> Option<RenderedBox> {
        self.last
    }
}

/// Maps normalized coordinates to the current rendered pixel box
#[derive(Debug)]
pub struct OverlayMapper {
    slot: Rc<MapperSlot>,
}

impl OverlayMapper {
    pub fn rendered_box(&self) -> RenderedBox {
        self.slot.rendered.get()
    }

    /// Still subscribed to its image's resize source
    pub fn is_attached(&self) -> bool {
        self.slot.attached.get()
    }

    #[inline]
    pub fn to_pixel(&self, p: Point2D) -> PixelPoint {
        let b = self.rendered_box();
        PixelPoint {
            x: p.x * b.width,
            y: p.y * b.height,
        }
    }

    pub fn to_pixel_rect(&self, bbox: &BBox) -> PixelRect {
        let b = self.rendered_box();
        PixelRect {
            x: bbox.x * b.width,
            y: bbox.y * b.height,
            width: bbox.w * b.width,
            height: bbox.h * b.height,
        }
    }

    /// Inverse of [`OverlayMapper::to_pixel`]; the box is never zero-sized
    pub fn to_normalized(&self, p: PixelPoint) -> Point2D {
        let b = self.rendered_box();
        Point2D::new(p.x / b.width, p.y / b.height)
    }

    /// SVG `viewBox` attribute value
    pub fn view_box(&self) -> String {
        let b = self.rendered_box();
        format!("0 0 {} {}", b.width, b.height)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlayRoom {
    pub id: String,
    pub name: String,
    pub rect: PixelRect,
    pub confidence: Confidence,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlayWall {
    pub id: String,
    /// Trimmed wall footprint corners
    pub outline: [PixelPoint; 4],
    pub wall_type: WallType,
    pub confidence: Confidence,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlayOpening {
    pub id: String,
    pub kind: OpeningType,
    pub rect: PixelRect,
}

/// Editable 2D overlay in rendered pixel space
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overlay {
    pub view_box: RenderedBox,
    pub rooms: Vec<OverlayRoom>,
    pub walls: Vec<OverlayWall>,
    pub doors: Vec<OverlayOpening>,
    pub windows: Vec<OverlayOpening>,
}

impl Overlay {
    pub fn empty(view_box: RenderedBox) -> Self {
        Self {
            view_box,
            rooms: Vec::new(),
            walls: Vec::new(),
            doors: Vec::new(),
            windows: Vec::new(),
        }
    }

    /// Standalone SVG document sized to the rendered box
    pub fn to_svg(&self) -> String {
        let (w, h) = (self.view_box.width, self.view_box.height);
        let mut svg = String::new();
        let _ = writeln!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#
        );

        for room in &self.rooms {
            let r = &room.rect;
            let _ = writeln!(
                svg,
                r#"  <rect id="{}" class="room {}" x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" fill="{}" fill-opacity="0.15" stroke="{}" stroke-width="{}"><title>{}</title></rect>"#,
                escape(&room.id),
                confidence_class(room.confidence),
                r.x,
                r.y,
                r.width,
                r.height,
                confidence_color(room.confidence),
                confidence_color(room.confidence),
                if room.selected { 3 } else { 1 },
                escape(&room.name),
            );
        }

        for wall in &self.walls {
            let points: Vec<String> = wall
                .outline
                .iter()
                .map(|p| format!("{:.2},{:.2}", p.x, p.y))
                .collect();
            let fill = match wall.wall_type {
                WallType::Exterior => "#333333",
                WallType::Interior => "#777777",
            };
            let _ = writeln!(
                svg,
                r#"  <polygon id="{}" class="wall {}" points="{}" fill="{}" fill-opacity="0.6" stroke="{}" stroke-width="{}"/>"#,
                escape(&wall.id),
                confidence_class(wall.confidence),
                points.join(" "),
                fill,
                confidence_color(wall.confidence),
                if wall.selected { 2 } else { 0 },
            );
        }

        for opening in self.doors.iter().chain(&self.windows) {
            let r = &opening.rect;
            let (class, color) = match opening.kind {
                OpeningType::Door => ("door", "#c0392b"),
                OpeningType::Window => ("window", "#2980b9"),
            };
            let _ = writeln!(
                svg,
                r#"  <rect id="{}" class="{}" x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" fill="{}" fill-opacity="0.5"/>"#,
                escape(&opening.id),
                class,
                r.x,
                r.y,
                r.width,
                r.height,
                color,
            );
        }

        svg.push_str("</svg>\n");
        svg
    }
}

/// Build pixel-space overlay shapes for everything in the store.
///
/// Rooms without a bbox have no image position and are left out.
pub fn build_overlay(
    store: &GeometryStore,
    mapper: &OverlayMapper,
    config: &SceneConfig,
    selection: Option<&Selection>,
) -> Overlay {
    let mut overlay = Overlay::empty(mapper.rendered_box());

    overlay.rooms = store
        .rooms()
        .iter()
        .filter_map(|room| {
            let bbox = room.bbox?;
            Some(OverlayRoom {
                id: room.id.clone(),
                name: room.name.clone(),
                rect: mapper.to_pixel_rect(&bbox),
                confidence: room.confidence,
                selected: matches!(selection, Some(Selection::Room(id)) if *id == room.id),
            })
        })
        .collect();

    overlay.walls = store
        .walls()
        .iter()
        .map(|wall| {
            let solid = build_wall_solid(wall, config);
            let outline = solid
                .footprint()
                .map(|corner| mapper.to_pixel(config.to_normalized(corner)));
            OverlayWall {
                id: wall.id.clone(),
                outline,
                wall_type: wall.wall_type,
                confidence: wall.confidence,
                selected: matches!(selection, Some(Selection::Wall(id)) if *id == wall.id),
            }
        })
        .collect();

    let openings = |list: &[crate::types::DetectedOpening], kind| {
        list.iter()
            .map(|o| OverlayOpening {
                id: o.id.clone(),
                kind,
                rect: mapper.to_pixel_rect(&o.bbox),
            })
            .collect::<Vec<_>>()
    };
    overlay.doors = openings(store.doors(), OpeningType::Door);
    overlay.windows = openings(store.windows(), OpeningType::Window);

    overlay
}

fn confidence_class(confidence: Confidence) -> &'static str {
    match confidence {
        Confidence::High => "confidence-high",
        Confidence::Low => "confidence-low",
        Confidence::Manual => "confidence-manual",
    }
}

fn confidence_color(confidence: Confidence) -> &'static str {
    match confidence {
        Confidence::High => "#27ae60",
        Confidence::Low => "#e67e22",
        Confidence::Manual => "#2c6fdb",
    }
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::mock_detection;
    use approx::assert_relative_eq;

    #[test]
    fn test_unmeasured_mapper_is_identity_scale() {
        let mut source = ResizeSource::new();
        let mapper = source.observe();
        assert_eq!(mapper.rendered_box(), RenderedBox::UNMEASURED);
        assert_eq!(
            mapper.to_pixel(Point2D::new(0.25, 0.75)),
            PixelPoint { x: 0.25, y: 0.75 }
        );
    }

    #[test]
    fn test_mapper_follows_resizes() {
        let mut source = ResizeSource::new();
        let mapper = source.observe();

        source.notify_resize(800.0, 600.0);
        assert_eq!(
            mapper.to_pixel(Point2D::new(0.5, 0.5)),
            PixelPoint { x: 400.0, y: 300.0 }
        );

        // panel collapse widens the image
        source.notify_resize(1200.0, 900.0);
        assert_eq!(
            mapper.to_pixel(Point2D::new(0.5, 0.5)),
            PixelPoint { x: 600.0, y: 450.0 }
        );
        assert_eq!(mapper.view_box(), "0 0 1200 900");
    }

    #[test]
    fn test_unusable_sizes_are_ignored() {
        let mut source = ResizeSource::new();
        let mapper = source.observe();
        source.notify_resize(640.0, 480.0);
        source.notify_resize(0.0, 480.0);
        source.notify_resize(f64::NAN, 10.0);
        assert_eq!(mapper.rendered_box(), RenderedBox::new(640.0, 480.0).unwrap());
    }

    #[test]
    fn test_late_observer_gets_latest_measurement() {
        let mut source = ResizeSource::new();
        source.notify_resize(300.0, 200.0);
        let mapper = source.observe();
        assert_eq!(mapper.rendered_box().width, 300.0);
    }

    #[test]
    fn test_inverse_mapping() {
        let mut source = ResizeSource::new();
        let mapper = source.observe();
        source.notify_resize(1024.0, 768.0);
        let back = mapper.to_normalized(mapper.to_pixel(Point2D::new(0.3, 0.6)));
        assert_relative_eq!(back.x, 0.3, epsilon = 1e-12);
        assert_relative_eq!(back.y, 0.6, epsilon = 1e-12);
    }

    #[test]
    fn test_observer_lifecycle() {
        let mut source = ResizeSource::new();
        let a = source.observe();
        let b = source.observe();
        assert_eq!(source.observer_count(), 2);

        drop(b);
        assert_eq!(source.observer_count(), 1);

        source.unobserve(a);
        assert_eq!(source.observer_count(), 0);

        let c = source.observe();
        source.notify_resize(500.0, 500.0);
        source.disconnect_all();
        assert!(!c.is_attached());
        assert_eq!(source.observer_count(), 0);
        assert_eq!(source.last_measurement(), None);

        // detached mappers stop following
        source.notify_resize(10.0, 10.0);
        assert_eq!(c.rendered_box().width, 500.0);
    }

    #[test]
    fn test_build_overlay_from_mock() {
        let store = GeometryStore::from_detection(mock_detection());
        let config = SceneConfig::default();
        let mut source = ResizeSource::new();
        let mapper = source.observe();
        source.notify_resize(1000.0, 500.0);

        let selection = Selection::Room("room-2".into());
        let overlay = build_overlay(&store, &mapper, &config, Some(&selection));
        assert_eq!(overlay.rooms.len(), 4);
        assert_eq!(overlay.walls.len(), 7);
        assert_eq!(overlay.doors.len(), 3);
        assert_eq!(overlay.windows.len(), 4);

        let kitchen = &overlay.rooms[1];
        assert!(kitchen.selected);
        assert!(!overlay.rooms[0].selected);
        assert_relative_eq!(kitchen.rect.x, 550.0, epsilon = 1e-9);
        assert_relative_eq!(kitchen.rect.height, 175.0, epsilon = 1e-9);

        // top exterior wall: trimmed by 0.125m at each end = 0.00625 normalized
        let top = &overlay.walls[0];
        let xs: Vec<f64> = top.outline.iter().map(|p| p.x).collect();
        let min_x = xs.iter().cloned().fold(f64::MAX, f64::min);
        let max_x = xs.iter().cloned().fold(f64::MIN, f64::max);
        assert_relative_eq!(min_x, 106.25, epsilon = 1e-6);
        assert_relative_eq!(max_x, 893.75, epsilon = 1e-6);

        let svg = overlay.to_svg();
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains(r#"viewBox="0 0 1000 500""#));
        assert_eq!(svg.matches("<polygon").count(), 7);
    }

    #[test]
    fn test_rooms_without_bbox_are_skipped() {
        let mut result = mock_detection();
        result.rooms[0].bbox = None;
        let store = GeometryStore::from_detection(result);
        let mut source = ResizeSource::new();
        let overlay = build_overlay(&store, &source.observe(), &SceneConfig::default(), None);
        assert_eq!(overlay.rooms.len(), 3);
    }

    #[test]
    fn test_svg_escapes_names() {
        let mut overlay = Overlay::empty(RenderedBox::UNMEASURED);
        overlay.rooms.push(OverlayRoom {
            id: "r\"1".into(),
            name: "Kids <3 & more".into(),
            rect: PixelRect { x: 0.0, y: 0.0, width: 1.0, height: 1.0 },
            confidence: Confidence::Manual,
            selected: false,
        });
        let svg = overlay.to_svg();
        assert!(svg.contains("Kids &lt;3 &amp; more"));
        assert!(svg.contains("r&quot;1"));
    }
}
