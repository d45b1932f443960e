//! Record normalization: one seam for every record the store returns.
//!
//! The store's schema drifts. A geometry field may arrive as a typed nested
//! object, as flattened scalars, or inside a `shape_data` sub-document that
//! is itself either an object or a JSON string. Each field is probed in a
//! fixed order and the first hit wins:
//!
//! 1. typed nested value on the record (`center: {latitude, longitude}`)
//! 2. typed nested value inside `shape_data`
//! 3. flattened scalars inside `shape_data` (`center_lat`, `center_lng`)
//! 4. flattened scalars on the record
//! 5. zero default (origin, radius 100, head size 10, empty path)
//!
//! Style fields accept camelCase or snake_case. Numbers may be JSON numbers
//! or numeric strings.

#[cfg(test)]
#[path = "normalize_test.rs"]
mod normalize_test;

use serde_json::{Map, Value};
use shapes::consts::{
    DEFAULT_FILL_COLOR, DEFAULT_FILL_OPACITY, DEFAULT_HEAD_SIZE, DEFAULT_LINE_COLOR, DEFAULT_RADIUS_M,
    TEMP_ID_PREFIX, UNNAMED_SHAPE,
};
use shapes::geometry::normalize_rectangle;
use shapes::model::{
    ArrowGeometry, Bounds, CircleGeometry, LineStyle, PointGeometry, PolygonGeometry, PolylineGeometry,
    RectangleGeometry, Style,
};
use shapes::validate::clamp_opacity;
use shapes::{Geometry, Position, Shape, ShapeId, ShapeKind};

type Object = Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NormalizeError {
    #[error("record is not a JSON object")]
    NotAnObject,
    #[error("unknown shape type `{0}`")]
    UnknownKind(String),
    #[error("could not determine shape type from record fields")]
    UndeterminedKind,
    #[error("shape_data is not an object: {0}")]
    InvalidShapeData(String),
    #[error("path is not an array of positions: {0}")]
    InvalidPath(String),
    #[error("path vertex {index} is not a position")]
    InvalidVertex { index: usize },
    #[error("record uses the reserved preview id")]
    PreviewId,
}

/// A fresh client-side temporary id: `temp-<uuid>`.
#[must_use]
pub fn temp_id() -> ShapeId {
    ShapeId::new(format!("{TEMP_ID_PREFIX}{}", uuid::Uuid::new_v4()))
}

/// Normalize one store record into a canonical shape.
///
/// The record's own `type` wins; `hint` is used only when the record has no
/// `type` at all, and field inference only when there is no hint either.
///
/// # Errors
///
/// Returns a [`NormalizeError`] when the record cannot be interpreted.
pub fn normalize_record(record: &Value, hint: Option<ShapeKind>) -> Result<Shape, NormalizeError> {
    let obj = record.as_object().ok_or(NormalizeError::NotAnObject)?;
    let layers = Layers::new(obj)?;

    let kind = match obj.get("type") {
        Some(Value::String(raw)) if !raw.trim().is_empty() => {
            ShapeKind::parse(raw).ok_or_else(|| NormalizeError::UnknownKind(raw.clone()))?
        }
        Some(Value::Null | Value::String(_)) | None => match hint {
            Some(kind) => kind,
            None => layers.infer().ok_or(NormalizeError::UndeterminedKind)?,
        },
        Some(other) => return Err(NormalizeError::UnknownKind(other.to_string())),
    };

    let id = record_id(obj).unwrap_or_else(|| {
        let id = temp_id();
        tracing::warn!(%id, "record has no id; assigned temporary id");
        id
    });
    if id.is_preview() {
        return Err(NormalizeError::PreviewId);
    }

    let geometry = layers.geometry(kind)?;
    Ok(Shape {
        id,
        name: first_str(obj, &["name"])
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(UNNAMED_SHAPE)
            .to_string(),
        description: first_str(obj, &["description"]).unwrap_or_default().to_string(),
        style: style(obj),
        is_enemy: first_bool(obj, &["isEnemy", "is_enemy"]).unwrap_or(false),
        created_at: first_str(obj, &["createdAt", "created_at"]).map(str::to_string),
        updated_at: first_str(obj, &["updatedAt", "updated_at"]).map(str::to_string),
        geometry,
    })
}

/// Guess the kind of a record that carries no `type`.
///
/// Precedence: position, then center/radius, bounds, path with fill fields
/// (polygon), bare path (polyline), start/end.
#[must_use]
pub fn infer_kind(record: &Value) -> Option<ShapeKind> {
    let obj = record.as_object()?;
    Layers::new(obj).ok().and_then(|layers| layers.infer())
}

/// Whether a record carries any geometry field at all, typed or flattened.
#[must_use]
pub fn has_geometry(record: &Value) -> bool {
    let Some(layers) = record.as_object().and_then(|obj| Layers::new(obj).ok()) else {
        return false;
    };
    layers.infer().is_some() || layers.has_any(&["latitude", "lat"])
}

// =============================================================================
// FIELD PROBING
// =============================================================================

/// The record plus its decoded `shape_data`, searched in probe order.
struct Layers<'a> {
    record: &'a Object,
    data: Option<Object>,
}

impl<'a> Layers<'a> {
    fn new(record: &'a Object) -> Result<Self, NormalizeError> {
        let data = match record.get("shape_data") {
            None | Some(Value::Null) => None,
            Some(Value::Object(map)) => Some(map.clone()),
            Some(Value::String(raw)) => match serde_json::from_str::<Value>(raw) {
                Ok(Value::Object(map)) => Some(map),
                Ok(other) => return Err(NormalizeError::InvalidShapeData(other.to_string())),
                Err(e) => return Err(NormalizeError::InvalidShapeData(e.to_string())),
            },
            Some(other) => return Err(NormalizeError::InvalidShapeData(other.to_string())),
        };
        Ok(Self { record, data })
    }

    /// Layers holding typed nested values: record, then `shape_data`.
    fn typed(&self) -> impl Iterator<Item = &Object> {
        std::iter::once(self.record).chain(self.data.as_ref())
    }

    /// Layers holding flattened scalars: `shape_data`, then record.
    fn flat(&self) -> impl Iterator<Item = &Object> {
        self.data.as_ref().into_iter().chain(std::iter::once(self.record))
    }

    fn has_any(&self, keys: &[&str]) -> bool {
        self.typed().any(|m| keys.iter().any(|k| m.get(*k).is_some_and(|v| !v.is_null())))
    }

    fn infer(&self) -> Option<ShapeKind> {
        if self.has_any(&["position", "position_lat"]) {
            Some(ShapeKind::Point)
        } else if self.has_any(&["center", "center_lat", "radius"]) {
            Some(ShapeKind::Circle)
        } else if self.has_any(&["bounds", "ne_lat", "northEast"]) {
            Some(ShapeKind::Rectangle)
        } else if self.has_any(&["path"]) {
            if self.has_any(&["fillColor", "fill_color", "fillOpacity", "fill_opacity"]) {
                Some(ShapeKind::Polygon)
            } else {
                Some(ShapeKind::Polyline)
            }
        } else if self.has_any(&["start", "end", "start_lat"]) {
            Some(ShapeKind::Arrow)
        } else {
            None
        }
    }

    fn position(&self, typed_key: &str, flat_pairs: &[(&str, &str)]) -> Option<Position> {
        if let Some(p) = self.typed().find_map(|m| m.get(typed_key).and_then(position_value)) {
            return Some(p);
        }
        self.flat().find_map(|m| {
            flat_pairs.iter().find_map(|(lat, lng)| {
                Some(Position::new(number(m.get(*lat)?)?, number(m.get(*lng)?)?))
            })
        })
    }

    fn scalar(&self, typed_key: &str, flat_key: &str) -> Option<f64> {
        self.typed()
            .find_map(|m| m.get(typed_key).and_then(number))
            .or_else(|| self.flat().find_map(|m| m.get(flat_key).and_then(number)))
    }

    fn bounds(&self) -> Bounds {
        if let Some(b) = self.typed().find_map(|m| m.get("bounds").and_then(bounds_value)) {
            return normalize_rectangle(b.north_east, b.south_west);
        }
        let ne = self.position("northEast", &[("ne_lat", "ne_lng")]).unwrap_or_default();
        let sw = self.position("southWest", &[("sw_lat", "sw_lng")]).unwrap_or_default();
        normalize_rectangle(ne, sw)
    }

    fn path(&self) -> Result<Vec<Position>, NormalizeError> {
        match self.typed().find_map(|m| m.get("path").filter(|v| !v.is_null())) {
            Some(value) => path_value(value),
            None => Ok(Vec::new()),
        }
    }

    fn geometry(&self, kind: ShapeKind) -> Result<Geometry, NormalizeError> {
        const PLAIN: (&str, &str) = ("latitude", "longitude");
        let geometry = match kind {
            ShapeKind::Point => Geometry::Point(PointGeometry {
                position: self
                    .position("position", &[("position_lat", "position_lng"), PLAIN])
                    .unwrap_or_default(),
            }),
            ShapeKind::Circle => Geometry::Circle(CircleGeometry {
                center: self
                    .position("center", &[("center_lat", "center_lng"), PLAIN])
                    .unwrap_or_default(),
                radius: self.scalar("radius", "radius").unwrap_or(DEFAULT_RADIUS_M),
            }),
            ShapeKind::Rectangle => Geometry::Rectangle(RectangleGeometry { bounds: self.bounds() }),
            ShapeKind::Polyline => Geometry::Polyline(PolylineGeometry { path: self.path()? }),
            ShapeKind::Polygon => Geometry::Polygon(PolygonGeometry { path: self.path()? }),
            ShapeKind::Arrow => Geometry::Arrow(ArrowGeometry {
                start: self.position("start", &[("start_lat", "start_lng")]).unwrap_or_default(),
                end: self.position("end", &[("end_lat", "end_lng")]).unwrap_or_default(),
                head_size: self.scalar("headSize", "head_size").unwrap_or(DEFAULT_HEAD_SIZE),
            }),
        };
        Ok(geometry)
    }
}

// =============================================================================
// VALUE DECODING
// =============================================================================

fn record_id(obj: &Object) -> Option<ShapeId> {
    ["id", "_id"].iter().find_map(|k| match obj.get(*k)? {
        Value::String(s) if !s.trim().is_empty() => Some(ShapeId::new(s.clone())),
        Value::Number(n) => Some(ShapeId::new(n.to_string())),
        _ => None,
    })
}

fn style(obj: &Object) -> Style {
    Style {
        line_color: first_str(obj, &["lineColor", "line_color"])
            .unwrap_or(DEFAULT_LINE_COLOR)
            .to_string(),
        line_style: first_str(obj, &["lineStyle", "line_style"])
            .and_then(LineStyle::parse)
            .unwrap_or_default(),
        fill_color: first_str(obj, &["fillColor", "fill_color"])
            .unwrap_or(DEFAULT_FILL_COLOR)
            .to_string(),
        fill_opacity: ["fillOpacity", "fill_opacity"]
            .iter()
            .find_map(|k| obj.get(*k).and_then(number))
            .map_or(DEFAULT_FILL_OPACITY, clamp_opacity),
    }
}

/// A finite number from a JSON number or numeric string.
fn number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

fn first_number(obj: &Object, keys: &[&str]) -> Option<f64> {
    keys.iter().find_map(|k| obj.get(*k).and_then(number))
}

fn first_str<'a>(obj: &'a Object, keys: &[&str]) -> Option<&'a str> {
    keys.iter().find_map(|k| obj.get(*k).and_then(Value::as_str))
}

fn first_bool(obj: &Object, keys: &[&str]) -> Option<bool> {
    keys.iter().find_map(|k| obj.get(*k).and_then(Value::as_bool))
}

/// `{latitude, longitude}`, `{lat, lng}` or `{lat, lon}`.
fn position_value(value: &Value) -> Option<Position> {
    let obj = value.as_object()?;
    Some(Position::new(
        first_number(obj, &["latitude", "lat"])?,
        first_number(obj, &["longitude", "lng", "lon"])?,
    ))
}

fn bounds_value(value: &Value) -> Option<Bounds> {
    let obj = value.as_object()?;
    let corner = |keys: &[&str]| keys.iter().find_map(|k| obj.get(*k).and_then(position_value));
    Some(Bounds {
        north_east: corner(&["northEast", "north_east", "ne"])?,
        south_west: corner(&["southWest", "south_west", "sw"])?,
    })
}

fn path_value(value: &Value) -> Result<Vec<Position>, NormalizeError> {
    match value {
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(index, v)| position_value(v).ok_or(NormalizeError::InvalidVertex { index }))
            .collect(),
        Value::String(raw) => {
            let decoded: Value =
                serde_json::from_str(raw).map_err(|e| NormalizeError::InvalidPath(e.to_string()))?;
            if decoded.is_string() {
                return Err(NormalizeError::InvalidPath("doubly encoded string".into()));
            }
            path_value(&decoded)
        }
        other => Err(NormalizeError::InvalidPath(other.to_string())),
    }
}
