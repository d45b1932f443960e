//! Shape service: body validation, record encoding, and table mutations.
//!
//! DESIGN
//! ======
//! Request bodies use the canonical camelCase client form. Stored records
//! use snake_case style fields plus a type-specific flattened `shape_data`
//! object, so clients must reconcile a schema that differs from what they
//! send. Updates are full replaces; the type is fixed at creation
//! and `created_at` survives every update. Last write wins.

#[cfg(test)]
#[path = "shape_test.rs"]
mod shape_test;

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use shapes::model::LineStyle;
use shapes::{Geometry, ShapeInput, ShapeKind};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::state::AppState;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ShapeError {
    #[error("missing required field `{0}`")]
    MissingField(&'static str),
    #[error("unknown shape type `{0}`")]
    UnknownType(String),
    #[error("{kind} needs at least {min} points, got {got}")]
    TooFewPoints { kind: ShapeKind, min: usize, got: usize },
    #[error("invalid shape body: {0}")]
    InvalidBody(String),
    #[error("shape not found: {0}")]
    NotFound(String),
    #[error("shape type is {stored} and cannot change to {requested}")]
    TypeImmutable { stored: ShapeKind, requested: ShapeKind },
    #[error("seed file: {0}")]
    Seed(String),
}

impl ShapeError {
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::MissingField(_) => "E_MISSING_FIELD",
            Self::UnknownType(_) => "E_UNKNOWN_TYPE",
            Self::TooFewPoints { .. } => "E_TOO_FEW_POINTS",
            Self::InvalidBody(_) => "E_INVALID_BODY",
            Self::NotFound(_) => "E_SHAPE_NOT_FOUND",
            Self::TypeImmutable { .. } => "E_TYPE_IMMUTABLE",
            Self::Seed(_) => "E_SEED",
        }
    }
}

/// A stored shape as the store returns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type")]
    pub kind: ShapeKind,
    pub line_color: String,
    #[serde(default)]
    pub line_style: LineStyle,
    pub fill_color: String,
    pub fill_opacity: f64,
    #[serde(default)]
    pub is_enemy: bool,
    pub shape_data: Map<String, Value>,
    pub created_at: String,
    pub updated_at: String,
}

impl ShapeRecord {
    /// Encode a validated payload as a stored record.
    #[must_use]
    pub fn from_input(id: String, input: &ShapeInput, created_at: String, updated_at: String) -> Self {
        Self {
            id,
            name: input.name.clone(),
            description: input.description.clone(),
            kind: input.kind(),
            line_color: input.style.line_color.clone(),
            line_style: input.style.line_style,
            fill_color: input.style.fill_color.clone(),
            fill_opacity: input.style.fill_opacity,
            is_enemy: input.is_enemy,
            shape_data: shape_data(&input.geometry),
            created_at,
            updated_at,
        }
    }
}

/// Flatten a geometry into the stored `shape_data` layout.
fn shape_data(geometry: &Geometry) -> Map<String, Value> {
    let data = match geometry {
        Geometry::Point(g) => json!({
            "position_lat": g.position.latitude,
            "position_lng": g.position.longitude,
        }),
        Geometry::Circle(g) => json!({
            "center_lat": g.center.latitude,
            "center_lng": g.center.longitude,
            "radius": g.radius,
        }),
        Geometry::Rectangle(g) => json!({
            "ne_lat": g.bounds.north_east.latitude,
            "ne_lng": g.bounds.north_east.longitude,
            "sw_lat": g.bounds.south_west.latitude,
            "sw_lng": g.bounds.south_west.longitude,
        }),
        Geometry::Polyline(g) => json!({ "path": g.path }),
        Geometry::Polygon(g) => json!({ "path": g.path }),
        Geometry::Arrow(g) => json!({
            "start_lat": g.start.latitude,
            "start_lng": g.start.longitude,
            "end_lat": g.end.latitude,
            "end_lng": g.end.longitude,
            "head_size": g.head_size,
        }),
    };
    match data {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

fn now_rfc3339() -> String {
    OffsetDateTime::now_utc().format(&Rfc3339).unwrap_or_default()
}

// =============================================================================
// BODY PARSING
// =============================================================================

/// Parse and check a create/update body.
///
/// # Errors
///
/// Returns `InvalidBody` for non-JSON or non-object bodies, `MissingField`
/// for an absent name, type, or type-specific field, `UnknownType`, or
/// `TooFewPoints` for short paths.
pub fn parse_body(raw: &[u8]) -> Result<ShapeInput, ShapeError> {
    let body: Value = serde_json::from_slice(raw).map_err(|e| ShapeError::InvalidBody(e.to_string()))?;
    let obj = body
        .as_object()
        .ok_or_else(|| ShapeError::InvalidBody("expected a JSON object".into()))?;

    let present = |key: &str| obj.get(key).is_some_and(|v| !v.is_null());
    if !obj.get("name").and_then(Value::as_str).is_some_and(|s| !s.trim().is_empty()) {
        return Err(ShapeError::MissingField("name"));
    }
    let raw_kind = obj.get("type").and_then(Value::as_str).ok_or(ShapeError::MissingField("type"))?;
    let kind = ShapeKind::parse(raw_kind).ok_or_else(|| ShapeError::UnknownType(raw_kind.to_string()))?;

    let required: &[&'static str] = match kind {
        ShapeKind::Point => &["position"],
        ShapeKind::Circle => &["center", "radius"],
        ShapeKind::Rectangle => &["bounds"],
        ShapeKind::Polyline | ShapeKind::Polygon => &["path"],
        ShapeKind::Arrow => &["start", "end"],
    };
    if let Some(missing) = required.iter().find(|k| !present(**k)) {
        return Err(ShapeError::MissingField(*missing));
    }

    let mut canonical = obj.clone();
    canonical.insert("type".into(), Value::String(kind.as_str().into()));
    let input: ShapeInput =
        serde_json::from_value(Value::Object(canonical)).map_err(|e| ShapeError::InvalidBody(e.to_string()))?;

    if let Geometry::Polyline(g) = &input.geometry {
        check_points(kind, g.path.len())?;
    }
    if let Geometry::Polygon(g) = &input.geometry {
        check_points(kind, g.path.len())?;
    }
    Ok(input)
}

fn check_points(kind: ShapeKind, got: usize) -> Result<(), ShapeError> {
    let min = kind.min_points();
    if got < min {
        return Err(ShapeError::TooFewPoints { kind, min, got });
    }
    Ok(())
}

// =============================================================================
// TABLE OPERATIONS
// =============================================================================

pub async fn list_shapes(state: &AppState) -> Vec<ShapeRecord> {
    state.shapes.read().await.clone()
}

/// # Errors
///
/// Returns `NotFound` for an unknown id.
pub async fn get_shape(state: &AppState, id: &str) -> Result<ShapeRecord, ShapeError> {
    state
        .shapes
        .read()
        .await
        .iter()
        .find(|r| r.id == id)
        .cloned()
        .ok_or_else(|| ShapeError::NotFound(id.to_string()))
}

/// Store a new shape under a fresh id.
///
/// # Errors
///
/// Returns a body error from [`parse_body`].
pub async fn create_shape(state: &AppState, raw: &[u8]) -> Result<ShapeRecord, ShapeError> {
    let input = parse_body(raw)?;
    let now = now_rfc3339();
    let record = ShapeRecord::from_input(uuid::Uuid::new_v4().to_string(), &input, now.clone(), now);
    state.shapes.write().await.push(record.clone());
    tracing::info!(id = %record.id, kind = %record.kind, "shape stored");
    Ok(record)
}

/// Replace a stored shape, keeping its id, type, and creation time.
///
/// # Errors
///
/// Returns a body error, `NotFound`, or `TypeImmutable`.
pub async fn update_shape(state: &AppState, id: &str, raw: &[u8]) -> Result<ShapeRecord, ShapeError> {
    let input = parse_body(raw)?;
    let mut shapes = state.shapes.write().await;
    let existing = shapes
        .iter_mut()
        .find(|r| r.id == id)
        .ok_or_else(|| ShapeError::NotFound(id.to_string()))?;
    if existing.kind != input.kind() {
        return Err(ShapeError::TypeImmutable { stored: existing.kind, requested: input.kind() });
    }
    let record = ShapeRecord::from_input(id.to_string(), &input, existing.created_at.clone(), now_rfc3339());
    *existing = record.clone();
    tracing::info!(%id, kind = %record.kind, "shape replaced");
    Ok(record)
}

/// # Errors
///
/// Returns `NotFound` for an unknown id.
pub async fn delete_shape(state: &AppState, id: &str) -> Result<(), ShapeError> {
    let mut shapes = state.shapes.write().await;
    let before = shapes.len();
    shapes.retain(|r| r.id != id);
    if shapes.len() == before {
        return Err(ShapeError::NotFound(id.to_string()));
    }
    tracing::info!(%id, "shape removed");
    Ok(())
}

// =============================================================================
// SEED
// =============================================================================

/// Load stored records from a JSON array file.
///
/// # Errors
///
/// Returns `Seed` when the file cannot be read or parsed, or repeats an id.
pub async fn load_seed(path: &Path) -> Result<Vec<ShapeRecord>, ShapeError> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ShapeError::Seed(format!("{}: {e}", path.display())))?;
    let records: Vec<ShapeRecord> =
        serde_json::from_str(&text).map_err(|e| ShapeError::Seed(format!("{}: {e}", path.display())))?;
    let mut seen = std::collections::HashSet::new();
    if let Some(dup) = records.iter().find(|r| !seen.insert(r.id.as_str())) {
        return Err(ShapeError::Seed(format!("duplicate id {}", dup.id)));
    }
    tracing::info!(path = %path.display(), count = records.len(), "seed loaded");
    Ok(records)
}
