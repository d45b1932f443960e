//! Rendering: maps shapes to drawable primitives.
//!
//! The map surface has no native notion of a shape, only markers, geodesic
//! circles, strokes, and filled rings. This module turns each canonical
//! shape (and the transient preview) into that vocabulary plus one hit
//! target at the shape's centroid. It never mutates any state.
//!
//! Arrows have no native primitive: they are drawn as a shaft stroke ending
//! at the head base plus an independently filled triangle.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use crate::consts::{HIT_TARGET_PX, LINE_WIDTH_PX, MARKER_SIZE_PX, OUTLINE_WIDTH_PX};
use crate::geometry::{ArrowHeadScale, arrow_head, centroid, close_polygon_ring, dash_pattern, rectangle_ring};
use crate::model::{Geometry, Position, Shape, ShapeId, ShapeKind, Style};

/// Tunables for primitive generation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderConfig {
    pub arrow_scale: ArrowHeadScale,
    /// Stroke width for fillable outlines, in CSS pixels.
    pub outline_width: f64,
    /// Stroke width for polylines and arrow shafts, in CSS pixels.
    pub line_width: f64,
    pub marker_size: f64,
    pub hit_target_size: f64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            arrow_scale: ArrowHeadScale::default(),
            outline_width: OUTLINE_WIDTH_PX,
            line_width: LINE_WIDTH_PX,
            marker_size: MARKER_SIZE_PX,
            hit_target_size: HIT_TARGET_PX,
        }
    }
}

/// Stroke appearance shared by outlines and lines.
#[derive(Debug, Clone, PartialEq)]
pub struct Pen {
    pub color: String,
    pub width: f64,
    /// Dash descriptor; empty means solid.
    pub dash: &'static [f64],
}

/// One drawable element, in draw order within its shape.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Marker { at: Position, color: String, size: f64 },
    /// Geodesic circle with a real-world radius.
    Circle { center: Position, radius_m: f64, pen: Pen, fill_color: String, fill_opacity: f64 },
    Stroke { path: Vec<Position>, pen: Pen },
    Fill { ring: Vec<Position>, color: String, opacity: f64 },
}

/// Invisible clickable target carrying the shape's visible label.
#[derive(Debug, Clone, PartialEq)]
pub struct HitTarget {
    pub shape_id: ShapeId,
    pub at: Position,
    pub label: String,
    pub size: f64,
}

/// Everything needed to draw one shape.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeDrawing {
    pub shape_id: ShapeId,
    pub kind: ShapeKind,
    pub preview: bool,
    pub primitives: Vec<Primitive>,
    pub hit_target: HitTarget,
}

/// Draw a single shape.
#[must_use]
pub fn draw_shape(shape: &Shape, config: &RenderConfig) -> ShapeDrawing {
    let style = &shape.style;
    let primitives = match &shape.geometry {
        Geometry::Point(g) => {
            vec![Primitive::Marker { at: g.position, color: style.line_color.clone(), size: config.marker_size }]
        }
        Geometry::Circle(g) => vec![Primitive::Circle {
            center: g.center,
            radius_m: g.radius,
            pen: pen(style, config.outline_width),
            fill_color: style.fill_color.clone(),
            fill_opacity: style.fill_opacity,
        }],
        Geometry::Rectangle(g) => filled_outline(rectangle_ring(&g.bounds), style, config),
        Geometry::Polygon(g) => filled_outline(close_polygon_ring(&g.path), style, config),
        Geometry::Polyline(g) => {
            vec![Primitive::Stroke { path: g.path.clone(), pen: pen(style, config.line_width) }]
        }
        Geometry::Arrow(g) => match arrow_head(g.start, g.end, g.head_size, config.arrow_scale) {
            Some(head) => vec![
                Primitive::Stroke { path: head.shaft.to_vec(), pen: pen(style, config.line_width) },
                Primitive::Fill { ring: head.triangle(), color: style.line_color.clone(), opacity: 1.0 },
            ],
            None => vec![Primitive::Stroke { path: vec![g.start, g.end], pen: pen(style, config.line_width) }],
        },
    };

    ShapeDrawing {
        shape_id: shape.id.clone(),
        kind: shape.kind(),
        preview: shape.is_preview(),
        primitives,
        hit_target: HitTarget {
            shape_id: shape.id.clone(),
            at: centroid(&shape.geometry),
            label: shape.name.clone(),
            size: config.hit_target_size,
        },
    }
}

/// Draw the persisted collection followed by the preview, which sits on top.
///
/// Cached entries carrying the reserved preview id are skipped; only the
/// explicit `preview` argument is drawn as a preview.
#[must_use]
pub fn draw_scene(shapes: &[Shape], preview: Option<&Shape>, config: &RenderConfig) -> Vec<ShapeDrawing> {
    shapes
        .iter()
        .filter(|s| !s.is_preview())
        .chain(preview)
        .map(|s| draw_shape(s, config))
        .collect()
}

fn pen(style: &Style, width: f64) -> Pen {
    Pen { color: style.line_color.clone(), width, dash: dash_pattern(style.line_style) }
}

fn filled_outline(ring: Vec<Position>, style: &Style, config: &RenderConfig) -> Vec<Primitive> {
    vec![
        Primitive::Fill { ring: ring.clone(), color: style.fill_color.clone(), opacity: style.fill_opacity },
        Primitive::Stroke { path: ring, pen: pen(style, config.outline_width) },
    ]
}
