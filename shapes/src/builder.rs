//! Interactive shape builder: the point-picking state machine.
//!
//! A builder authors exactly one shape. It is opened for a kind (or for an
//! existing shape in edit mode), takes ownership of a map click listener, and
//! moves through these phases:
//!
//! ```text
//!   Picking ──(enough points / done)──▶ Ready ──submit──▶ Submitting ──finish──▶ Closed
//!      ▲                                  │                   │
//!      └──────────── reset_points ────────┘      submit_failed ┘ (back to prior phase)
//! ```
//!
//! `cancel` closes from any phase. Closing always releases the capture
//! session, so a closed builder can never receive another point.
//!
//! Every mutator returns the recomputed preview: a full shape with the
//! reserved preview id, or `None` while too few points exist to draw one.

#[cfg(test)]
#[path = "builder_test.rs"]
mod builder_test;

use std::collections::HashMap;

use crate::consts::{DEFAULT_HEAD_SIZE, DEFAULT_RADIUS_M};
use crate::geometry::normalize_rectangle;
use crate::model::{
    ArrowGeometry, CircleGeometry, Geometry, LineStyle, PointGeometry, PolygonGeometry, PolylineGeometry, Position,
    RectangleGeometry, Shape, ShapeId, ShapeInput, ShapeKind, Style,
};
use crate::surface::{CaptureSession, ClickEvent, MapSurface};
use crate::validate::{ValidationError, check_point_count, clamp_opacity, validate};

/// Live preview published after every change.
pub type Preview = Option<Shape>;

/// Phase of the authoring state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuilderPhase {
    /// Collecting map clicks.
    Picking,
    /// Enough points collected; waiting for submit.
    Ready,
    /// Payload handed to the store; waiting for the outcome.
    Submitting,
    /// Finished or cancelled. Terminal.
    Closed,
}

/// Where a submission goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitTarget {
    Create,
    Update(ShapeId),
}

/// A validated payload ready for the store client.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub target: SubmitTarget,
    pub input: ShapeInput,
}

/// Non-geometry form fields of the shape being authored.
#[derive(Debug, Clone, PartialEq)]
pub struct Draft {
    pub name: String,
    pub description: String,
    pub style: Style,
    pub is_enemy: bool,
    /// Circle radius in meters.
    pub radius: f64,
    /// Arrow head size in head units.
    pub head_size: f64,
}

impl Draft {
    fn named(name: String) -> Self {
        Self {
            name,
            description: String::new(),
            style: Style::default(),
            is_enemy: false,
            radius: DEFAULT_RADIUS_M,
            head_size: DEFAULT_HEAD_SIZE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BuildError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("builder is closed")]
    Closed,
    #[error("a submission is already in flight")]
    AlreadySubmitting,
    #[error("no submission is in flight")]
    NotSubmitting,
    #[error("the preview shape cannot be edited")]
    PreviewShape,
}

/// Per-kind default names: `"Polygon 1"`, `"Polygon 2"`, ...
#[derive(Debug, Default)]
pub struct NameSequence {
    counters: HashMap<ShapeKind, u32>,
}

impl NameSequence {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Next default name for `kind`.
    pub fn next(&mut self, kind: ShapeKind) -> String {
        let n = self.counters.entry(kind).or_insert(0);
        *n += 1;
        format!("{} {n}", kind.label())
    }
}

/// Authoring state for one shape.
#[derive(Debug)]
pub struct ShapeBuilder {
    kind: ShapeKind,
    target: SubmitTarget,
    phase: BuilderPhase,
    /// Phase to return to if the in-flight submission fails.
    resume: BuilderPhase,
    points: Vec<Position>,
    draft: Draft,
    capture: Option<CaptureSession>,
}

impl ShapeBuilder {
    /// Open a builder for a new shape, starting in `Picking`.
    #[must_use]
    pub fn create(kind: ShapeKind, name: impl Into<String>, surface: &mut dyn MapSurface) -> Self {
        tracing::debug!(kind = %kind, "builder opened");
        Self {
            kind,
            target: SubmitTarget::Create,
            phase: BuilderPhase::Picking,
            resume: BuilderPhase::Picking,
            points: Vec::new(),
            draft: Draft::named(name.into()),
            capture: Some(CaptureSession::acquire(surface)),
        }
    }

    /// Open a builder pre-populated from `shape`, starting in `Ready`.
    ///
    /// # Errors
    ///
    /// Returns `PreviewShape` if `shape` is the transient preview.
    pub fn edit(shape: &Shape, surface: &mut dyn MapSurface) -> Result<Self, BuildError> {
        if shape.is_preview() {
            return Err(BuildError::PreviewShape);
        }
        let mut draft = Draft::named(shape.name.clone());
        draft.description.clone_from(&shape.description);
        draft.style = shape.style.clone();
        draft.is_enemy = shape.is_enemy;
        match &shape.geometry {
            Geometry::Circle(g) => draft.radius = g.radius,
            Geometry::Arrow(g) => draft.head_size = g.head_size,
            _ => {}
        }
        tracing::debug!(id = %shape.id, kind = %shape.kind(), "builder opened for edit");
        Ok(Self {
            kind: shape.kind(),
            target: SubmitTarget::Update(shape.id.clone()),
            phase: BuilderPhase::Ready,
            resume: BuilderPhase::Ready,
            points: shape.geometry.picked_points(),
            draft,
            capture: Some(CaptureSession::acquire(surface)),
        })
    }

    // --- Queries ---

    #[must_use]
    pub fn kind(&self) -> ShapeKind {
        self.kind
    }

    #[must_use]
    pub fn phase(&self) -> BuilderPhase {
        self.phase
    }

    #[must_use]
    pub fn target(&self) -> &SubmitTarget {
        &self.target
    }

    #[must_use]
    pub fn points(&self) -> &[Position] {
        &self.points
    }

    #[must_use]
    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    /// Whether this builder still owns a click listener.
    #[must_use]
    pub fn is_capturing(&self) -> bool {
        self.capture.is_some()
    }

    // --- Point picking ---

    /// Handle a click delivered by the map surface.
    ///
    /// Ignored unless the event targets this builder's listener and the
    /// builder is `Picking`.
    pub fn on_map_click(&mut self, event: &ClickEvent, surface: &dyn MapSurface) -> Preview {
        let owned = self.capture.as_ref().is_some_and(|c| c.owns(event));
        if !owned || self.phase != BuilderPhase::Picking {
            return self.preview();
        }

        let point = surface.unproject(event.screen);
        match self.kind {
            ShapeKind::Point | ShapeKind::Circle => {
                self.points = vec![point];
                self.phase = BuilderPhase::Ready;
            }
            ShapeKind::Rectangle | ShapeKind::Arrow => {
                self.points.push(point);
                if self.points.len() >= self.kind.min_points() {
                    self.phase = BuilderPhase::Ready;
                }
            }
            ShapeKind::Polyline | ShapeKind::Polygon => self.points.push(point),
        }
        tracing::trace!(kind = %self.kind, points = self.points.len(), phase = ?self.phase, "point picked");
        self.preview()
    }

    /// Finish manual picking for paths.
    ///
    /// # Errors
    ///
    /// Returns `TooFewPoints` while below the kind's minimum, or a phase error
    /// once submitting or closed.
    pub fn done(&mut self) -> Result<Preview, BuildError> {
        match self.phase {
            BuilderPhase::Picking => {
                check_point_count(self.kind, self.points.len())?;
                self.phase = BuilderPhase::Ready;
            }
            BuilderPhase::Ready => {}
            BuilderPhase::Submitting => return Err(BuildError::AlreadySubmitting),
            BuilderPhase::Closed => return Err(BuildError::Closed),
        }
        Ok(self.preview())
    }

    /// Discard every picked point and return to `Picking`.
    ///
    /// # Errors
    ///
    /// Returns a phase error once submitting or closed.
    pub fn reset_points(&mut self) -> Result<Preview, BuildError> {
        self.ensure_editable()?;
        self.points.clear();
        self.phase = BuilderPhase::Picking;
        Ok(self.preview())
    }

    // --- Form fields ---

    pub fn set_name(&mut self, name: impl Into<String>) -> Preview {
        self.update_draft(|d| d.name = name.into())
    }

    pub fn set_description(&mut self, description: impl Into<String>) -> Preview {
        self.update_draft(|d| d.description = description.into())
    }

    pub fn set_line_color(&mut self, color: impl Into<String>) -> Preview {
        self.update_draft(|d| d.style.line_color = color.into())
    }

    pub fn set_line_style(&mut self, style: LineStyle) -> Preview {
        self.update_draft(|d| d.style.line_style = style)
    }

    pub fn set_fill_color(&mut self, color: impl Into<String>) -> Preview {
        self.update_draft(|d| d.style.fill_color = color.into())
    }

    /// Set fill opacity, clamped into `[0, 1]`.
    pub fn set_fill_opacity(&mut self, opacity: f64) -> Preview {
        self.update_draft(|d| d.style.fill_opacity = clamp_opacity(opacity))
    }

    pub fn set_enemy(&mut self, is_enemy: bool) -> Preview {
        self.update_draft(|d| d.is_enemy = is_enemy)
    }

    /// Set circle radius in meters. Validated on submit.
    pub fn set_radius(&mut self, radius: f64) -> Preview {
        self.update_draft(|d| d.radius = radius)
    }

    /// Set arrow head size. Validated on submit.
    pub fn set_head_size(&mut self, head_size: f64) -> Preview {
        self.update_draft(|d| d.head_size = head_size)
    }

    fn update_draft(&mut self, f: impl FnOnce(&mut Draft)) -> Preview {
        if self.ensure_editable().is_ok() {
            f(&mut self.draft);
        }
        self.preview()
    }

    fn ensure_editable(&self) -> Result<(), BuildError> {
        match self.phase {
            BuilderPhase::Picking | BuilderPhase::Ready => Ok(()),
            BuilderPhase::Submitting => Err(BuildError::AlreadySubmitting),
            BuilderPhase::Closed => Err(BuildError::Closed),
        }
    }

    // --- Preview ---

    /// The transient shape mirroring the current authoring state.
    #[must_use]
    pub fn preview(&self) -> Preview {
        if self.phase == BuilderPhase::Closed {
            return None;
        }
        let geometry = self.geometry()?;
        Some(self.input_with(geometry).into_shape(ShapeId::preview()))
    }

    /// Geometry derivable from the points picked so far.
    fn geometry(&self) -> Option<Geometry> {
        let pts = &self.points;
        if pts.len() < self.kind.min_points() {
            return None;
        }
        let geometry = match self.kind {
            ShapeKind::Point => Geometry::Point(PointGeometry { position: pts[0] }),
            ShapeKind::Circle => Geometry::Circle(CircleGeometry { center: pts[0], radius: self.draft.radius }),
            ShapeKind::Rectangle => {
                Geometry::Rectangle(RectangleGeometry { bounds: normalize_rectangle(pts[0], pts[1]) })
            }
            ShapeKind::Arrow => {
                Geometry::Arrow(ArrowGeometry { start: pts[0], end: pts[1], head_size: self.draft.head_size })
            }
            ShapeKind::Polyline => Geometry::Polyline(PolylineGeometry { path: pts.clone() }),
            ShapeKind::Polygon => Geometry::Polygon(PolygonGeometry { path: pts.clone() }),
        };
        Some(geometry)
    }

    fn input_with(&self, geometry: Geometry) -> ShapeInput {
        ShapeInput {
            name: self.draft.name.clone(),
            description: self.draft.description.clone(),
            style: self.draft.style.clone(),
            is_enemy: self.draft.is_enemy,
            geometry,
        }
    }

    // --- Submission ---

    /// Validate and hand out the payload, moving to `Submitting`.
    ///
    /// # Errors
    ///
    /// Returns a validation error (the builder stays where it was) or a phase
    /// error when already submitting or closed.
    pub fn submit(&mut self) -> Result<Submission, BuildError> {
        self.ensure_editable()?;
        check_point_count(self.kind, self.points.len())?;
        let min = self.kind.min_points();
        let geometry = self.geometry().ok_or(ValidationError::TooFewPoints {
            kind: self.kind,
            min,
            got: self.points.len(),
        })?;
        let input = validate(&self.input_with(geometry))?;

        self.resume = self.phase;
        self.phase = BuilderPhase::Submitting;
        tracing::debug!(kind = %self.kind, target = ?self.target, "submission started");
        Ok(Submission { target: self.target.clone(), input })
    }

    /// The in-flight submission failed; return to the phase it started from.
    pub fn submit_failed(&mut self) -> Preview {
        if self.phase == BuilderPhase::Submitting {
            self.phase = self.resume;
        }
        self.preview()
    }

    /// The in-flight submission succeeded; close and release the listener.
    ///
    /// # Errors
    ///
    /// Returns `NotSubmitting` when no submission is in flight.
    pub fn finish(&mut self, surface: &mut dyn MapSurface) -> Result<(), BuildError> {
        if self.phase != BuilderPhase::Submitting {
            return Err(BuildError::NotSubmitting);
        }
        self.close(surface);
        Ok(())
    }

    /// Abandon authoring from any phase. Idempotent.
    pub fn cancel(&mut self, surface: &mut dyn MapSurface) {
        if self.phase != BuilderPhase::Closed {
            tracing::debug!(kind = %self.kind, phase = ?self.phase, "builder cancelled");
        }
        self.close(surface);
    }

    fn close(&mut self, surface: &mut dyn MapSurface) {
        self.phase = BuilderPhase::Closed;
        if let Some(capture) = self.capture.take() {
            capture.release(surface);
        }
    }
}
