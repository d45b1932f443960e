//! Shared defaults and numeric constants for the shapes crate.

// ── Style defaults ──────────────────────────────────────────────

/// Stroke color applied when a shape carries none.
pub const DEFAULT_LINE_COLOR: &str = "#1E88E5";

/// Fill color applied when a shape carries none.
pub const DEFAULT_FILL_COLOR: &str = "#1E88E5";

/// Fill opacity applied when a shape carries none.
pub const DEFAULT_FILL_OPACITY: f64 = 0.3;

/// Name given to records that arrive without one.
pub const UNNAMED_SHAPE: &str = "Unnamed Shape";

// ── Geometry defaults ───────────────────────────────────────────

/// Circle radius in meters used when authoring and when a record has none.
pub const DEFAULT_RADIUS_M: f64 = 100.0;

/// Arrowhead size in abstract head units.
pub const DEFAULT_HEAD_SIZE: f64 = 10.0;

/// Arrowhead length in degrees per head-size unit.
pub const ARROW_HEAD_LENGTH_PER_UNIT: f64 = 0.0002;

/// Arrowhead half-width in degrees per head-size unit.
pub const ARROW_HEAD_WIDTH_PER_UNIT: f64 = 0.0001;

// ── Point requirements ──────────────────────────────────────────

/// Minimum vertices in a polyline path.
pub const MIN_POLYLINE_POINTS: usize = 2;

/// Minimum vertices in a polygon path.
pub const MIN_POLYGON_POINTS: usize = 3;

// ── Rendering ───────────────────────────────────────────────────

/// Outline width in pixels for circles, rectangles, and polygons.
pub const OUTLINE_WIDTH_PX: f64 = 2.0;

/// Stroke width in pixels for polylines and arrow shafts.
pub const LINE_WIDTH_PX: f64 = 3.0;

/// Marker diameter in pixels for point shapes.
pub const MARKER_SIZE_PX: f64 = 16.0;

/// Side length in pixels of the invisible square hit target at a centroid.
pub const HIT_TARGET_PX: f64 = 32.0;

// ── Reserved identifiers ────────────────────────────────────────

/// Id of the transient shape mirroring in-progress authoring.
pub const PREVIEW_ID: &str = "preview";

/// Prefix for client-generated temporary ids.
pub const TEMP_ID_PREFIX: &str = "temp-";
