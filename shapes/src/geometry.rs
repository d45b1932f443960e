//! Geometry engine: pure functions over shape coordinates.
//!
//! Coordinates are treated as a flat plane of degrees (longitude on the x
//! axis, latitude on the y axis). That is good enough for label placement
//! and arrowhead construction at the scales operators annotate, and is not
//! meant to be geodesically exact.

#[cfg(test)]
#[path = "geometry_test.rs"]
mod geometry_test;

use crate::consts::{ARROW_HEAD_LENGTH_PER_UNIT, ARROW_HEAD_WIDTH_PER_UNIT};
use crate::model::{Bounds, Geometry, LineStyle, Position};

/// Representative point of a geometry, used for labels and map navigation.
///
/// Point and circle yield their coordinate, rectangle and arrow the midpoint
/// of their two defining corners, and paths the arithmetic mean of their
/// vertices. An empty path yields the origin.
#[must_use]
pub fn centroid(geometry: &Geometry) -> Position {
    match geometry {
        Geometry::Point(g) => g.position,
        Geometry::Circle(g) => g.center,
        Geometry::Rectangle(g) => midpoint(g.bounds.north_east, g.bounds.south_west),
        Geometry::Polyline(g) => mean(&g.path),
        Geometry::Polygon(g) => mean(&g.path),
        Geometry::Arrow(g) => midpoint(g.start, g.end),
    }
}

fn midpoint(a: Position, b: Position) -> Position {
    Position::new((a.latitude + b.latitude) / 2.0, (a.longitude + b.longitude) / 2.0)
}

#[allow(clippy::cast_precision_loss)]
fn mean(path: &[Position]) -> Position {
    if path.is_empty() {
        return Position::default();
    }
    let n = path.len() as f64;
    let (lat, lon) = path
        .iter()
        .fold((0.0, 0.0), |(lat, lon), p| (lat + p.latitude, lon + p.longitude));
    Position::new(lat / n, lon / n)
}

/// Bounds spanned by any two opposite corners. Symmetric in its arguments.
#[must_use]
pub fn normalize_rectangle(a: Position, b: Position) -> Bounds {
    Bounds {
        north_east: Position::new(a.latitude.max(b.latitude), a.longitude.max(b.longitude)),
        south_west: Position::new(a.latitude.min(b.latitude), a.longitude.min(b.longitude)),
    }
}

/// Closed outer ring of a rectangle, counter-clockwise from the south-west corner.
#[must_use]
pub fn rectangle_ring(bounds: &Bounds) -> Vec<Position> {
    let ne = bounds.north_east;
    let sw = bounds.south_west;
    vec![
        sw,
        Position::new(sw.latitude, ne.longitude),
        ne,
        Position::new(ne.latitude, sw.longitude),
        sw,
    ]
}

/// Copy of `path` with the first vertex appended when the ring is open.
///
/// Used for fill rendering only; stored polygon paths stay open.
#[must_use]
pub fn close_polygon_ring(path: &[Position]) -> Vec<Position> {
    let mut ring = path.to_vec();
    if let (Some(first), Some(last)) = (path.first(), path.last()) {
        if first != last {
            ring.push(*first);
        }
    }
    ring
}

/// Stroke dash descriptor as alternating dash/gap lengths in line widths.
///
/// An empty slice means a continuous stroke.
#[must_use]
pub fn dash_pattern(style: LineStyle) -> &'static [f64] {
    match style {
        LineStyle::Solid => &[],
        LineStyle::Dashed => &[4.0, 2.0],
        LineStyle::Dotted => &[1.0, 2.0],
    }
}

/// Conversion from abstract head-size units to coordinate degrees.
///
/// Degrees are not a uniform distance, so these factors only hold
/// approximately near the equator and at modest zoom levels. Hosts rendering
/// far from the equator may want to tune them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrowHeadScale {
    /// Head length in degrees per head-size unit.
    pub length_per_unit: f64,
    /// Head half-width in degrees per head-size unit.
    pub width_per_unit: f64,
}

impl Default for ArrowHeadScale {
    fn default() -> Self {
        Self { length_per_unit: ARROW_HEAD_LENGTH_PER_UNIT, width_per_unit: ARROW_HEAD_WIDTH_PER_UNIT }
    }
}

/// A filled-triangle arrowhead and the shortened shaft that meets its base.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrowHead {
    /// Triangle tip; equal to the arrow's end.
    pub tip: Position,
    pub base_left: Position,
    pub base_right: Position,
    /// Point on the shaft where the triangle base is centered.
    pub base: Position,
    /// Shaft from the arrow's start to `base`.
    pub shaft: [Position; 2],
}

impl ArrowHead {
    /// The closed triangle ring `tip, base_left, base_right, tip`.
    #[must_use]
    pub fn triangle(&self) -> Vec<Position> {
        vec![self.tip, self.base_left, self.base_right, self.tip]
    }
}

/// Build the arrowhead for an arrow from `start` to `end`.
///
/// Returns `None` when the two points coincide (no direction).
#[must_use]
pub fn arrow_head(start: Position, end: Position, head_size: f64, scale: ArrowHeadScale) -> Option<ArrowHead> {
    let dx = end.longitude - start.longitude;
    let dy = end.latitude - start.latitude;
    let len = dx.hypot(dy);
    if !len.is_normal() {
        return None;
    }
    let (ux, uy) = (dx / len, dy / len);
    let head_length = scale.length_per_unit * head_size;
    let head_width = scale.width_per_unit * head_size;

    let base = Position::new(end.latitude - uy * head_length, end.longitude - ux * head_length);
    // Left-hand normal of the direction (ux, uy) is (-uy, ux).
    let base_left = Position::new(base.latitude + ux * head_width, base.longitude - uy * head_width);
    let base_right = Position::new(base.latitude - ux * head_width, base.longitude + uy * head_width);

    Some(ArrowHead { tip: end, base_left, base_right, base, shaft: [start, base] })
}
