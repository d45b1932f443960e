#![allow(clippy::float_cmp)]

use super::*;
use crate::model::{
    ArrowGeometry, Bounds, CircleGeometry, LineStyle, PointGeometry, PolygonGeometry, PolylineGeometry,
    RectangleGeometry, ShapeInput,
};

fn shape(id: &str, geometry: Geometry) -> Shape {
    ShapeInput {
        name: format!("{id} name"),
        description: String::new(),
        style: Style::default(),
        is_enemy: false,
        geometry,
    }
    .into_shape(ShapeId::new(id))
}

fn p(lat: f64, lon: f64) -> Position {
    Position::new(lat, lon)
}

fn strokes(drawing: &ShapeDrawing) -> Vec<&Pen> {
    drawing
        .primitives
        .iter()
        .filter_map(|prim| match prim {
            Primitive::Stroke { pen, .. } => Some(pen),
            _ => None,
        })
        .collect()
}

// =============================================================
// Per-kind primitives
// =============================================================

#[test]
fn point_draws_single_marker() {
    let s = shape("a", Geometry::Point(PointGeometry { position: p(1.0, 2.0) }));
    let d = draw_shape(&s, &RenderConfig::default());
    assert_eq!(d.primitives.len(), 1);
    assert!(matches!(&d.primitives[0], Primitive::Marker { at, .. } if *at == p(1.0, 2.0)));
}

#[test]
fn circle_carries_radius_and_fill() {
    let mut s = shape("c", Geometry::Circle(CircleGeometry { center: p(0.0, 0.0), radius: 500.0 }));
    s.style.fill_opacity = 0.6;
    let d = draw_shape(&s, &RenderConfig::default());
    let Primitive::Circle { radius_m, fill_opacity, pen, .. } = &d.primitives[0] else {
        panic!("expected circle");
    };
    assert_eq!(*radius_m, 500.0);
    assert_eq!(*fill_opacity, 0.6);
    assert_eq!(pen.width, 2.0);
}

#[test]
fn rectangle_fills_then_outlines_closed_ring() {
    let bounds = Bounds { north_east: p(2.0, 2.0), south_west: p(0.0, 0.0) };
    let d = draw_shape(&shape("r", Geometry::Rectangle(RectangleGeometry { bounds })), &RenderConfig::default());
    assert_eq!(d.primitives.len(), 2);
    let Primitive::Fill { ring, .. } = &d.primitives[0] else {
        panic!("expected fill first");
    };
    assert_eq!(ring.len(), 5);
    assert_eq!(ring.first(), ring.last());
    assert!(matches!(d.primitives[1], Primitive::Stroke { .. }));
}

#[test]
fn polygon_ring_closed_for_fill_but_stored_path_untouched() {
    let path = vec![p(0.0, 0.0), p(0.0, 2.0), p(2.0, 2.0)];
    let s = shape("g", Geometry::Polygon(PolygonGeometry { path: path.clone() }));
    let d = draw_shape(&s, &RenderConfig::default());
    let Primitive::Fill { ring, .. } = &d.primitives[0] else {
        panic!("expected fill");
    };
    assert_eq!(ring.len(), 4);
    assert_eq!(ring[3], p(0.0, 0.0));
    assert_eq!(s.geometry, Geometry::Polygon(PolygonGeometry { path }));
}

#[test]
fn polyline_is_stroke_only_at_line_width() {
    let s = shape("l", Geometry::Polyline(PolylineGeometry { path: vec![p(0.0, 0.0), p(1.0, 1.0)] }));
    let d = draw_shape(&s, &RenderConfig::default());
    assert_eq!(d.primitives.len(), 1);
    assert_eq!(strokes(&d)[0].width, 3.0);
}

#[test]
fn arrow_is_shaft_plus_opaque_triangle_in_line_color() {
    let mut s = shape(
        "w",
        Geometry::Arrow(ArrowGeometry { start: p(0.0, 0.0), end: p(0.0, 1.0), head_size: 10.0 }),
    );
    s.style.line_color = "#FF0000".into();
    s.style.fill_opacity = 0.2;
    let d = draw_shape(&s, &RenderConfig::default());
    assert_eq!(d.primitives.len(), 2);

    let Primitive::Stroke { path, .. } = &d.primitives[0] else {
        panic!("expected shaft");
    };
    assert_eq!(path[0], p(0.0, 0.0));
    assert!((path[1].longitude - (1.0 - 0.002)).abs() < 1e-12);

    let Primitive::Fill { ring, color, opacity } = &d.primitives[1] else {
        panic!("expected head");
    };
    assert_eq!(ring[0], p(0.0, 1.0));
    assert_eq!(color, "#FF0000");
    assert_eq!(*opacity, 1.0);
}

#[test]
fn arrow_scale_comes_from_config() {
    let s = shape(
        "w",
        Geometry::Arrow(ArrowGeometry { start: p(0.0, 0.0), end: p(0.0, 1.0), head_size: 1.0 }),
    );
    let config = RenderConfig {
        arrow_scale: ArrowHeadScale { length_per_unit: 0.5, width_per_unit: 0.25 },
        ..RenderConfig::default()
    };
    let d = draw_shape(&s, &config);
    let Primitive::Stroke { path, .. } = &d.primitives[0] else {
        panic!("expected shaft");
    };
    assert_eq!(path[1], p(0.0, 0.5));
}

#[test]
fn dash_pattern_follows_line_style() {
    let mut s = shape("l", Geometry::Polyline(PolylineGeometry { path: vec![p(0.0, 0.0), p(1.0, 1.0)] }));
    s.style.line_style = LineStyle::Dotted;
    let d = draw_shape(&s, &RenderConfig::default());
    assert_eq!(strokes(&d)[0].dash, &[1.0, 2.0]);
}

// =============================================================
// Hit targets and scene
// =============================================================

#[test]
fn hit_target_sits_at_centroid_with_label() {
    let path = vec![p(0.0, 0.0), p(0.0, 2.0), p(2.0, 2.0), p(2.0, 0.0)];
    let d = draw_shape(&shape("g", Geometry::Polygon(PolygonGeometry { path })), &RenderConfig::default());
    assert_eq!(d.hit_target.at, p(1.0, 1.0));
    assert_eq!(d.hit_target.label, "g name");
    assert_eq!(d.hit_target.shape_id, ShapeId::new("g"));
}

#[test]
fn scene_draws_preview_last_and_flags_it() {
    let a = shape("a", Geometry::Point(PointGeometry { position: p(0.0, 0.0) }));
    let mut preview = shape("x", Geometry::Point(PointGeometry { position: p(1.0, 1.0) }));
    preview.id = ShapeId::preview();

    let scene = draw_scene(std::slice::from_ref(&a), Some(&preview), &RenderConfig::default());
    assert_eq!(scene.len(), 2);
    assert!(!scene[0].preview);
    assert!(scene[1].preview);
}

#[test]
fn scene_skips_preview_ids_found_in_collection() {
    let mut stray = shape("x", Geometry::Point(PointGeometry { position: p(1.0, 1.0) }));
    stray.id = ShapeId::preview();
    assert!(draw_scene(&[stray], None, &RenderConfig::default()).is_empty());
}
