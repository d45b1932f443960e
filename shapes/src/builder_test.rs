#![allow(clippy::float_cmp)]

use super::*;
use crate::surface::{ListenerId, ScreenPoint, Viewport};

/// One pixel per degree with the origin at the top-left, so a click at
/// `(lon, -lat)` lands on `(lat, lon)` exactly.
fn map() -> Viewport {
    Viewport::new(Position::default(), 1.0, 0.0, 0.0)
}

fn click(builder: &mut ShapeBuilder, vp: &Viewport, lat: f64, lon: f64) -> Preview {
    let mut preview = builder.preview();
    for event in vp.click(ScreenPoint::new(lon, -lat)) {
        preview = builder.on_map_click(&event, vp);
    }
    preview
}

fn stored(kind: ShapeKind, vp: &mut Viewport) -> Shape {
    let mut b = ShapeBuilder::create(kind, "Existing", vp);
    let coords: &[(f64, f64)] = match kind {
        ShapeKind::Point | ShapeKind::Circle => &[(1.0, 1.0)],
        ShapeKind::Polygon => &[(0.0, 0.0), (0.0, 2.0), (2.0, 2.0)],
        _ => &[(0.0, 0.0), (2.0, 2.0)],
    };
    for &(lat, lon) in coords {
        click(&mut b, vp, lat, lon);
    }
    let submission = b.submit().unwrap();
    b.finish(vp).unwrap();
    submission.input.into_shape(ShapeId::new("s-1"))
}

// =============================================================
// Auto-advancing kinds
// =============================================================

#[test]
fn point_is_ready_after_one_click() {
    let mut vp = map();
    let mut b = ShapeBuilder::create(ShapeKind::Point, "P", &mut vp);
    assert_eq!(b.phase(), BuilderPhase::Picking);
    assert!(b.preview().is_none());

    let preview = click(&mut b, &vp, 3.0, 4.0).unwrap();
    assert_eq!(b.phase(), BuilderPhase::Ready);
    assert!(preview.is_preview());
    assert_eq!(preview.geometry, Geometry::Point(PointGeometry { position: Position::new(3.0, 4.0) }));
}

#[test]
fn circle_uses_draft_radius_in_preview() {
    let mut vp = map();
    let mut b = ShapeBuilder::create(ShapeKind::Circle, "C", &mut vp);
    click(&mut b, &vp, 1.0, 1.0);
    let preview = b.set_radius(250.0).unwrap();
    assert_eq!(
        preview.geometry,
        Geometry::Circle(CircleGeometry { center: Position::new(1.0, 1.0), radius: 250.0 })
    );
}

#[test]
fn rectangle_waits_for_second_corner_and_normalizes() {
    let mut vp = map();
    let mut b = ShapeBuilder::create(ShapeKind::Rectangle, "R", &mut vp);
    assert!(click(&mut b, &vp, 5.0, 1.0).is_none());
    assert_eq!(b.phase(), BuilderPhase::Picking);

    let preview = click(&mut b, &vp, 2.0, 7.0).unwrap();
    assert_eq!(b.phase(), BuilderPhase::Ready);
    let Geometry::Rectangle(g) = preview.geometry else {
        panic!("expected rectangle");
    };
    assert_eq!(g.bounds.north_east, Position::new(5.0, 7.0));
    assert_eq!(g.bounds.south_west, Position::new(2.0, 1.0));
}

#[test]
fn arrow_ready_after_two_clicks_with_default_head() {
    let mut vp = map();
    let mut b = ShapeBuilder::create(ShapeKind::Arrow, "A", &mut vp);
    click(&mut b, &vp, 0.0, 0.0);
    let preview = click(&mut b, &vp, 1.0, 1.0).unwrap();
    assert_eq!(b.phase(), BuilderPhase::Ready);
    let Geometry::Arrow(g) = preview.geometry else {
        panic!("expected arrow");
    };
    assert_eq!(g.head_size, 10.0);
    assert_eq!(g.end, Position::new(1.0, 1.0));
}

#[test]
fn point_click_in_picking_replaces_rather_than_appends() {
    let mut vp = map();
    let mut b = ShapeBuilder::create(ShapeKind::Point, "P", &mut vp);
    click(&mut b, &vp, 1.0, 1.0);
    b.reset_points().unwrap();
    click(&mut b, &vp, 2.0, 2.0);
    assert_eq!(b.points(), &[Position::new(2.0, 2.0)]);
}

// =============================================================
// Manual kinds
// =============================================================

#[test]
fn polyline_stays_picking_until_done() {
    let mut vp = map();
    let mut b = ShapeBuilder::create(ShapeKind::Polyline, "L", &mut vp);
    for i in 0..3 {
        click(&mut b, &vp, f64::from(i), 0.0);
    }
    assert_eq!(b.phase(), BuilderPhase::Picking);
    assert_eq!(b.points().len(), 3);
    b.done().unwrap();
    assert_eq!(b.phase(), BuilderPhase::Ready);
}

#[test]
fn done_rejects_too_few_points() {
    let mut vp = map();
    let mut b = ShapeBuilder::create(ShapeKind::Polygon, "G", &mut vp);
    click(&mut b, &vp, 0.0, 0.0);
    click(&mut b, &vp, 0.0, 1.0);
    let err = b.done().unwrap_err();
    assert_eq!(
        err,
        BuildError::Validation(ValidationError::TooFewPoints { kind: ShapeKind::Polygon, min: 3, got: 2 })
    );
    assert_eq!(b.phase(), BuilderPhase::Picking);
}

#[test]
fn polygon_preview_needs_three_points() {
    let mut vp = map();
    let mut b = ShapeBuilder::create(ShapeKind::Polygon, "G", &mut vp);
    click(&mut b, &vp, 0.0, 0.0);
    assert!(click(&mut b, &vp, 0.0, 1.0).is_none());
    assert!(click(&mut b, &vp, 1.0, 1.0).is_some());
}

#[test]
fn polyline_preview_needs_two_points() {
    let mut vp = map();
    let mut b = ShapeBuilder::create(ShapeKind::Polyline, "L", &mut vp);
    assert!(click(&mut b, &vp, 0.0, 0.0).is_none());
    assert!(click(&mut b, &vp, 0.0, 1.0).is_some());
}

// =============================================================
// Submit
// =============================================================

#[test]
fn polyline_with_one_point_rejected_two_accepted() {
    let mut vp = map();
    let mut b = ShapeBuilder::create(ShapeKind::Polyline, "L", &mut vp);
    click(&mut b, &vp, 0.0, 0.0);
    assert!(matches!(
        b.submit(),
        Err(BuildError::Validation(ValidationError::TooFewPoints { got: 1, .. }))
    ));
    assert_eq!(b.phase(), BuilderPhase::Picking);

    click(&mut b, &vp, 0.0, 1.0);
    let submission = b.submit().unwrap();
    assert_eq!(submission.target, SubmitTarget::Create);
    assert_eq!(submission.input.kind(), ShapeKind::Polyline);
    assert_eq!(b.phase(), BuilderPhase::Submitting);
}

#[test]
fn polygon_with_two_points_rejected_three_accepted() {
    let mut vp = map();
    let mut b = ShapeBuilder::create(ShapeKind::Polygon, "G", &mut vp);
    click(&mut b, &vp, 0.0, 0.0);
    click(&mut b, &vp, 0.0, 1.0);
    assert!(b.submit().is_err());
    click(&mut b, &vp, 1.0, 1.0);
    assert!(b.submit().is_ok());
}

#[test]
fn submit_carries_draft_fields() {
    let mut vp = map();
    let mut b = ShapeBuilder::create(ShapeKind::Circle, "C", &mut vp);
    click(&mut b, &vp, 1.0, 1.0);
    b.set_name("Rally point");
    b.set_description("north gate");
    b.set_line_color("#FF0000");
    b.set_line_style(LineStyle::Dashed);
    b.set_fill_opacity(4.0);
    b.set_enemy(true);

    let input = b.submit().unwrap().input;
    assert_eq!(input.name, "Rally point");
    assert_eq!(input.description, "north gate");
    assert_eq!(input.style.line_color, "#FF0000");
    assert_eq!(input.style.line_style, LineStyle::Dashed);
    assert_eq!(input.style.fill_opacity, 1.0);
    assert!(input.is_enemy);
}

#[test]
fn submit_rejects_non_positive_radius() {
    let mut vp = map();
    let mut b = ShapeBuilder::create(ShapeKind::Circle, "C", &mut vp);
    click(&mut b, &vp, 1.0, 1.0);
    b.set_radius(0.0);
    assert!(matches!(
        b.submit(),
        Err(BuildError::Validation(ValidationError::NonPositiveRadius(_)))
    ));
    assert_eq!(b.phase(), BuilderPhase::Ready);
}

#[test]
fn second_submit_while_in_flight_is_rejected() {
    let mut vp = map();
    let mut b = ShapeBuilder::create(ShapeKind::Point, "P", &mut vp);
    click(&mut b, &vp, 1.0, 1.0);
    b.submit().unwrap();
    assert_eq!(b.submit().unwrap_err(), BuildError::AlreadySubmitting);
}

#[test]
fn failed_submit_returns_to_prior_phase() {
    let mut vp = map();
    let mut b = ShapeBuilder::create(ShapeKind::Polyline, "L", &mut vp);
    click(&mut b, &vp, 0.0, 0.0);
    click(&mut b, &vp, 0.0, 1.0);
    b.submit().unwrap();
    b.submit_failed();
    assert_eq!(b.phase(), BuilderPhase::Picking);
    assert_eq!(b.points().len(), 2);
    assert!(b.is_capturing());
}

#[test]
fn finish_closes_and_releases_listener() {
    let mut vp = map();
    let mut b = ShapeBuilder::create(ShapeKind::Point, "P", &mut vp);
    click(&mut b, &vp, 1.0, 1.0);
    b.submit().unwrap();
    b.finish(&mut vp).unwrap();
    assert_eq!(b.phase(), BuilderPhase::Closed);
    assert_eq!(vp.listener_count(), 0);
    assert!(b.preview().is_none());
}

#[test]
fn finish_without_submission_is_rejected() {
    let mut vp = map();
    let mut b = ShapeBuilder::create(ShapeKind::Point, "P", &mut vp);
    assert_eq!(b.finish(&mut vp).unwrap_err(), BuildError::NotSubmitting);
    b.cancel(&mut vp);
}

// =============================================================
// Cancel and listener ownership
// =============================================================

#[test]
fn cancel_mid_picking_stops_all_further_points() {
    let mut vp = map();
    let mut b = ShapeBuilder::create(ShapeKind::Polyline, "L", &mut vp);
    click(&mut b, &vp, 0.0, 0.0);
    let stale = vp.click(ScreenPoint::new(5.0, 5.0));
    assert_eq!(vp.listener_count(), 1);

    b.cancel(&mut vp);
    assert_eq!(vp.listener_count(), 0);
    assert!(!b.is_capturing());
    assert!(vp.click(ScreenPoint::new(1.0, 1.0)).is_empty());

    for event in &stale {
        b.on_map_click(event, &vp);
    }
    assert_eq!(b.points().len(), 1);
    assert_eq!(b.phase(), BuilderPhase::Closed);
}

#[test]
fn cancel_is_idempotent() {
    let mut vp = map();
    let mut b = ShapeBuilder::create(ShapeKind::Point, "P", &mut vp);
    b.cancel(&mut vp);
    b.cancel(&mut vp);
    assert_eq!(b.phase(), BuilderPhase::Closed);
}

#[test]
fn foreign_listener_events_are_ignored() {
    let mut vp = map();
    let mut b = ShapeBuilder::create(ShapeKind::Polyline, "L", &mut vp);
    let event = ClickEvent { listener: ListenerId(999), screen: ScreenPoint::new(1.0, 1.0) };
    b.on_map_click(&event, &vp);
    assert!(b.points().is_empty());
    b.cancel(&mut vp);
}

#[test]
fn closed_builder_ignores_field_edits() {
    let mut vp = map();
    let mut b = ShapeBuilder::create(ShapeKind::Point, "P", &mut vp);
    b.cancel(&mut vp);
    assert!(b.set_name("changed").is_none());
    assert_eq!(b.draft().name, "P");
    assert_eq!(b.reset_points().unwrap_err(), BuildError::Closed);
    assert_eq!(b.done().unwrap_err(), BuildError::Closed);
}

// =============================================================
// Edit mode
// =============================================================

#[test]
fn edit_starts_ready_with_stored_points() {
    let mut vp = map();
    let shape = stored(ShapeKind::Polygon, &mut vp);
    let b = ShapeBuilder::edit(&shape, &mut vp).unwrap();
    assert_eq!(b.phase(), BuilderPhase::Ready);
    assert_eq!(b.points().len(), 3);
    assert_eq!(b.target(), &SubmitTarget::Update(ShapeId::new("s-1")));
    assert_eq!(b.draft().name, "Existing");
    assert!(b.preview().is_some());
    assert_eq!(vp.listener_count(), 1);
}

#[test]
fn edit_ignores_clicks_until_reset() {
    let mut vp = map();
    let shape = stored(ShapeKind::Polyline, &mut vp);
    let mut b = ShapeBuilder::edit(&shape, &mut vp).unwrap();
    click(&mut b, &vp, 9.0, 9.0);
    assert_eq!(b.points().len(), 2);

    b.reset_points().unwrap();
    assert_eq!(b.phase(), BuilderPhase::Picking);
    assert!(b.points().is_empty());
    click(&mut b, &vp, 9.0, 9.0);
    assert_eq!(b.points(), &[Position::new(9.0, 9.0)]);
}

#[test]
fn edit_keeps_circle_radius_and_arrow_head() {
    let mut vp = map();
    let mut circle = stored(ShapeKind::Circle, &mut vp);
    if let Geometry::Circle(g) = &mut circle.geometry {
        g.radius = 42.0;
    }
    let b = ShapeBuilder::edit(&circle, &mut vp).unwrap();
    assert_eq!(b.draft().radius, 42.0);

    let mut arrow = stored(ShapeKind::Arrow, &mut vp);
    if let Geometry::Arrow(g) = &mut arrow.geometry {
        g.head_size = 3.0;
    }
    let b = ShapeBuilder::edit(&arrow, &mut vp).unwrap();
    assert_eq!(b.draft().head_size, 3.0);
}

#[test]
fn edit_rectangle_preview_matches_stored_bounds() {
    let mut vp = map();
    let shape = stored(ShapeKind::Rectangle, &mut vp);
    let b = ShapeBuilder::edit(&shape, &mut vp).unwrap();
    assert_eq!(b.preview().unwrap().geometry, shape.geometry);
}

#[test]
fn edit_rejects_preview_shape() {
    let mut vp = map();
    let mut shape = stored(ShapeKind::Point, &mut vp);
    shape.id = ShapeId::preview();
    assert_eq!(ShapeBuilder::edit(&shape, &mut vp).unwrap_err(), BuildError::PreviewShape);
    assert_eq!(vp.listener_count(), 0);
}

// =============================================================
// Default names
// =============================================================

#[test]
fn name_sequence_counts_per_kind() {
    let mut names = NameSequence::new();
    assert_eq!(names.next(ShapeKind::Polygon), "Polygon 1");
    assert_eq!(names.next(ShapeKind::Polygon), "Polygon 2");
    assert_eq!(names.next(ShapeKind::Point), "Point 1");
}
