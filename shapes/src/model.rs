//! Shape data model: positions, style fields, and the six tagged geometries.
//!
//! `Shape` is the canonical in-memory form held by the store cache and read
//! by the renderer. `ShapeInput` is the type-discriminated payload the
//! builder produces and the store client sends over the wire; it is a
//! `Shape` without identity or timestamps.
//!
//! Both serialize to the canonical camelCase wire form with a `type` tag:
//!
//! ```json
//! { "id": "a1", "name": "Route", "type": "arrow", "lineColor": "#1E88E5",
//!   "start": { "latitude": 1.0, "longitude": 2.0 }, "end": { ... }, "headSize": 10 }
//! ```
//!
//! Each geometry struct owns only its own fields, so a shape can never carry
//! geometry from two variants at once.

#[cfg(test)]
#[path = "model_test.rs"]
mod model_test;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::consts::{
    DEFAULT_FILL_COLOR, DEFAULT_FILL_OPACITY, DEFAULT_HEAD_SIZE, DEFAULT_LINE_COLOR, MIN_POLYGON_POINTS,
    MIN_POLYLINE_POINTS, PREVIEW_ID, TEMP_ID_PREFIX,
};

/// A geographic coordinate in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
}

impl Position {
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Whether both components are finite numbers.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }
}

/// Rectangle corners. `north_east` is never south or west of `south_west`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bounds {
    pub north_east: Position,
    pub south_west: Position,
}

/// Stroke style for outlines and lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineStyle {
    #[default]
    Solid,
    Dashed,
    Dotted,
}

impl LineStyle {
    /// Parse a wire value, ignoring ASCII case.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "solid" => Some(Self::Solid),
            "dashed" => Some(Self::Dashed),
            "dotted" => Some(Self::Dotted),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Solid => "solid",
            Self::Dashed => "dashed",
            Self::Dotted => "dotted",
        }
    }
}

/// Style fields shared by every shape variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Style {
    /// Stroke color as a CSS color string.
    pub line_color: String,
    pub line_style: LineStyle,
    /// Fill color as a CSS color string.
    pub fill_color: String,
    /// Fill opacity in `[0, 1]`.
    pub fill_opacity: f64,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            line_color: DEFAULT_LINE_COLOR.to_owned(),
            line_style: LineStyle::Solid,
            fill_color: DEFAULT_FILL_COLOR.to_owned(),
            fill_opacity: DEFAULT_FILL_OPACITY,
        }
    }
}

/// Identifier of a shape as assigned by the store (or temporarily by the client).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShapeId(String);

impl ShapeId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The reserved id of the transient authoring preview.
    #[must_use]
    pub fn preview() -> Self {
        Self(PREVIEW_ID.to_owned())
    }

    #[must_use]
    pub fn is_preview(&self) -> bool {
        self.0 == PREVIEW_ID
    }

    /// Whether this id was generated client-side rather than by the store.
    #[must_use]
    pub fn is_temporary(&self) -> bool {
        self.0.starts_with(TEMP_ID_PREFIX)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ShapeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ShapeId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// The geometry kind of a shape; the wire `type` tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Point,
    Circle,
    Rectangle,
    Polyline,
    Polygon,
    Arrow,
}

impl ShapeKind {
    pub const ALL: [Self; 6] = [Self::Point, Self::Circle, Self::Rectangle, Self::Polyline, Self::Polygon, Self::Arrow];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Point => "point",
            Self::Circle => "circle",
            Self::Rectangle => "rectangle",
            Self::Polyline => "polyline",
            Self::Polygon => "polygon",
            Self::Arrow => "arrow",
        }
    }

    /// Parse a wire `type` tag, ignoring ASCII case and surrounding whitespace.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::ALL.into_iter().find(|k| k.as_str().eq_ignore_ascii_case(raw))
    }

    /// Capitalized display name, e.g. `"Polygon"`.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Point => "Point",
            Self::Circle => "Circle",
            Self::Rectangle => "Rectangle",
            Self::Polyline => "Polyline",
            Self::Polygon => "Polygon",
            Self::Arrow => "Arrow",
        }
    }

    /// Number of picked points needed before the geometry is complete.
    #[must_use]
    pub fn min_points(self) -> usize {
        match self {
            Self::Point | Self::Circle => 1,
            Self::Rectangle | Self::Arrow => 2,
            Self::Polyline => MIN_POLYLINE_POINTS,
            Self::Polygon => MIN_POLYGON_POINTS,
        }
    }

    /// Whether point picking ends with an explicit "done" action rather than
    /// automatically once `min_points` is reached.
    #[must_use]
    pub fn is_manual(self) -> bool {
        matches!(self, Self::Polyline | Self::Polygon)
    }

    /// Whether the shape has an area to fill.
    #[must_use]
    pub fn is_fillable(self) -> bool {
        matches!(self, Self::Circle | Self::Rectangle | Self::Polygon)
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointGeometry {
    pub position: Position,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CircleGeometry {
    pub center: Position,
    /// Radius in meters.
    pub radius: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RectangleGeometry {
    pub bounds: Bounds,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolylineGeometry {
    pub path: Vec<Position>,
}

/// An implicitly closed ring; the stored path does not repeat the first vertex.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolygonGeometry {
    pub path: Vec<Position>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArrowGeometry {
    pub start: Position,
    pub end: Position,
    /// Head size in abstract head units; see [`crate::geometry::ArrowHeadScale`].
    #[serde(default = "default_head_size")]
    pub head_size: f64,
}

fn default_head_size() -> f64 {
    DEFAULT_HEAD_SIZE
}

/// Variant geometry, tagged on the wire by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Geometry {
    Point(PointGeometry),
    Circle(CircleGeometry),
    Rectangle(RectangleGeometry),
    Polyline(PolylineGeometry),
    Polygon(PolygonGeometry),
    Arrow(ArrowGeometry),
}

impl Geometry {
    #[must_use]
    pub fn kind(&self) -> ShapeKind {
        match self {
            Self::Point(_) => ShapeKind::Point,
            Self::Circle(_) => ShapeKind::Circle,
            Self::Rectangle(_) => ShapeKind::Rectangle,
            Self::Polyline(_) => ShapeKind::Polyline,
            Self::Polygon(_) => ShapeKind::Polygon,
            Self::Arrow(_) => ShapeKind::Arrow,
        }
    }

    /// The points an author would pick to reproduce this geometry, in pick order.
    #[must_use]
    pub fn picked_points(&self) -> Vec<Position> {
        match self {
            Self::Point(g) => vec![g.position],
            Self::Circle(g) => vec![g.center],
            Self::Rectangle(g) => vec![g.bounds.north_east, g.bounds.south_west],
            Self::Polyline(g) => g.path.clone(),
            Self::Polygon(g) => g.path.clone(),
            Self::Arrow(g) => vec![g.start, g.end],
        }
    }
}

/// A persisted (or preview) map annotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shape {
    pub id: ShapeId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(flatten)]
    pub style: Style,
    #[serde(default)]
    pub is_enemy: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(flatten)]
    pub geometry: Geometry,
}

impl Shape {
    #[must_use]
    pub fn kind(&self) -> ShapeKind {
        self.geometry.kind()
    }

    #[must_use]
    pub fn is_preview(&self) -> bool {
        self.id.is_preview()
    }

    /// The payload that would recreate this shape.
    #[must_use]
    pub fn to_input(&self) -> ShapeInput {
        ShapeInput {
            name: self.name.clone(),
            description: self.description.clone(),
            style: self.style.clone(),
            is_enemy: self.is_enemy,
            geometry: self.geometry.clone(),
        }
    }
}

/// Create/update payload: a shape without identity or timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeInput {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(flatten)]
    pub style: Style,
    #[serde(default)]
    pub is_enemy: bool,
    #[serde(flatten)]
    pub geometry: Geometry,
}

impl ShapeInput {
    #[must_use]
    pub fn kind(&self) -> ShapeKind {
        self.geometry.kind()
    }

    /// Attach an identity, producing a canonical shape with no timestamps.
    #[must_use]
    pub fn into_shape(self, id: ShapeId) -> Shape {
        Shape {
            id,
            name: self.name,
            description: self.description,
            style: self.style,
            is_enemy: self.is_enemy,
            created_at: None,
            updated_at: None,
            geometry: self.geometry,
        }
    }
}
