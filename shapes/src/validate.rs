//! Validation rules applied to every payload before it may be submitted.
//!
//! [`validate`] returns a sanitized copy rather than a bare verdict: fill
//! opacity is clamped into `[0, 1]`, rectangle corners are re-ordered, and an
//! explicitly closed polygon ring drops its repeated closing vertex. Anything
//! that cannot be repaired losslessly is rejected.
//!
//! Zero-radius circles, zero-area rectangles, zero-length arrows, and paths
//! that repeat a vertex back-to-back are all rejected.

#[cfg(test)]
#[path = "validate_test.rs"]
mod validate_test;

use crate::geometry::normalize_rectangle;
use crate::model::{Geometry, Position, ShapeInput, ShapeKind};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("shape name is required")]
    MissingName,
    #[error("{kind} needs at least {min} points, got {got}")]
    TooFewPoints { kind: ShapeKind, min: usize, got: usize },
    #[error("circle radius must be positive, got {0}")]
    NonPositiveRadius(f64),
    #[error("arrow head size must be positive, got {0}")]
    NonPositiveHeadSize(f64),
    #[error("rectangle has zero area")]
    DegenerateRectangle,
    #[error("arrow start and end coincide")]
    DegenerateArrow,
    #[error("{kind} repeats vertex {index}")]
    DuplicateVertex { kind: ShapeKind, index: usize },
    #[error("coordinates must be finite numbers")]
    NonFiniteCoordinate,
    #[error("fill opacity must be a number")]
    InvalidOpacity,
}

/// Clamp a fill opacity into `[0, 1]`. `NaN` is passed through for the caller to reject.
#[must_use]
pub fn clamp_opacity(opacity: f64) -> f64 {
    opacity.clamp(0.0, 1.0)
}

/// Check that `got` picked points satisfy the minimum for `kind`.
///
/// # Errors
///
/// Returns `TooFewPoints` when below the kind's minimum.
pub fn check_point_count(kind: ShapeKind, got: usize) -> Result<(), ValidationError> {
    let min = kind.min_points();
    if got < min {
        return Err(ValidationError::TooFewPoints { kind, min, got });
    }
    Ok(())
}

/// Validate a payload and return its sanitized form.
///
/// # Errors
///
/// Returns the first rule the payload violates.
pub fn validate(input: &ShapeInput) -> Result<ShapeInput, ValidationError> {
    let mut out = input.clone();

    if out.name.trim().is_empty() {
        return Err(ValidationError::MissingName);
    }
    if out.style.fill_opacity.is_nan() {
        return Err(ValidationError::InvalidOpacity);
    }
    out.style.fill_opacity = clamp_opacity(out.style.fill_opacity);

    let kind = out.kind();
    match &mut out.geometry {
        Geometry::Point(g) => finite(&[g.position])?,
        Geometry::Circle(g) => {
            finite(&[g.center])?;
            if !(g.radius.is_finite() && g.radius > 0.0) {
                return Err(ValidationError::NonPositiveRadius(g.radius));
            }
        }
        Geometry::Rectangle(g) => {
            finite(&[g.bounds.north_east, g.bounds.south_west])?;
            g.bounds = normalize_rectangle(g.bounds.north_east, g.bounds.south_west);
            let ne = g.bounds.north_east;
            let sw = g.bounds.south_west;
            if ne.latitude <= sw.latitude || ne.longitude <= sw.longitude {
                return Err(ValidationError::DegenerateRectangle);
            }
        }
        Geometry::Polyline(g) => {
            finite(&g.path)?;
            check_point_count(kind, g.path.len())?;
            check_distinct(kind, &g.path, false)?;
        }
        Geometry::Polygon(g) => {
            finite(&g.path)?;
            if g.path.len() > kind.min_points() && g.path.first() == g.path.last() {
                g.path.pop();
            }
            check_point_count(kind, g.path.len())?;
            check_distinct(kind, &g.path, true)?;
        }
        Geometry::Arrow(g) => {
            finite(&[g.start, g.end])?;
            if !(g.head_size.is_finite() && g.head_size > 0.0) {
                return Err(ValidationError::NonPositiveHeadSize(g.head_size));
            }
            if g.start == g.end {
                return Err(ValidationError::DegenerateArrow);
            }
        }
    }

    Ok(out)
}

fn finite(points: &[Position]) -> Result<(), ValidationError> {
    if points.iter().all(Position::is_finite) {
        Ok(())
    } else {
        Err(ValidationError::NonFiniteCoordinate)
    }
}

/// Reject back-to-back repeated vertices; `ring` also compares last to first.
fn check_distinct(kind: ShapeKind, path: &[Position], ring: bool) -> Result<(), ValidationError> {
    if let Some(i) = path.windows(2).position(|w| w[0] == w[1]) {
        return Err(ValidationError::DuplicateVertex { kind, index: i + 1 });
    }
    if ring && path.len() > 1 && path.first() == path.last() {
        return Err(ValidationError::DuplicateVertex { kind, index: path.len() - 1 });
    }
    Ok(())
}
