//! Scripted in-memory [`ShapeApi`] shared by the unit tests.

use std::sync::Mutex;

use serde_json::Value;
use shapes::{ShapeId, ShapeInput};

use crate::api::{ApiError, ShapeApi};

type Queue<T> = Mutex<Vec<Result<T, ApiError>>>;

/// Replays queued responses per method. An empty queue echoes the payload
/// back as a canonical record with a generated id.
#[derive(Default)]
pub(crate) struct MockApi {
    list: Queue<Vec<Value>>,
    create: Queue<Value>,
    update: Queue<Value>,
    delete: Queue<()>,
    calls: Mutex<Vec<String>>,
}

impl MockApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_list(self, response: Result<Vec<Value>, ApiError>) -> Self {
        self.list.lock().unwrap().push(response);
        self
    }

    pub fn with_create(self, response: Result<Value, ApiError>) -> Self {
        self.create.lock().unwrap().push(response);
        self
    }

    pub fn with_update(self, response: Result<Value, ApiError>) -> Self {
        self.update.lock().unwrap().push(response);
        self
    }

    pub fn with_delete(self, response: Result<(), ApiError>) -> Self {
        self.delete.lock().unwrap().push(response);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) -> usize {
        let mut calls = self.calls.lock().unwrap();
        calls.push(call);
        calls.len()
    }
}

fn next<T>(queue: &Queue<T>) -> Option<Result<T, ApiError>> {
    let mut queue = queue.lock().unwrap();
    if queue.is_empty() { None } else { Some(queue.remove(0)) }
}

fn echo(input: &ShapeInput, id: &str) -> Value {
    let mut value = serde_json::to_value(input).unwrap();
    value["id"] = Value::String(id.to_string());
    value
}

#[async_trait::async_trait]
impl ShapeApi for MockApi {
    async fn list(&self) -> Result<Vec<Value>, ApiError> {
        self.record("list".into());
        next(&self.list).unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn create(&self, input: &ShapeInput) -> Result<Value, ApiError> {
        let n = self.record(format!("create {}", input.kind()));
        next(&self.create).unwrap_or_else(|| Ok(echo(input, &format!("srv-{n}"))))
    }

    async fn update(&self, id: &ShapeId, input: &ShapeInput) -> Result<Value, ApiError> {
        self.record(format!("update {id}"));
        next(&self.update).unwrap_or_else(|| Ok(echo(input, id.as_str())))
    }

    async fn delete(&self, id: &ShapeId) -> Result<(), ApiError> {
        self.record(format!("delete {id}"));
        next(&self.delete).unwrap_or(Ok(()))
    }
}

/// A valid payload of each kind.
pub(crate) fn input(kind: shapes::ShapeKind) -> ShapeInput {
    use shapes::model::{
        ArrowGeometry, Bounds, CircleGeometry, PointGeometry, PolygonGeometry, PolylineGeometry, RectangleGeometry,
        Style,
    };
    use shapes::{Geometry, Position, ShapeKind};

    let p = Position::new;
    let geometry = match kind {
        ShapeKind::Point => Geometry::Point(PointGeometry { position: p(1.0, 2.0) }),
        ShapeKind::Circle => Geometry::Circle(CircleGeometry { center: p(1.0, 2.0), radius: 50.0 }),
        ShapeKind::Rectangle => Geometry::Rectangle(RectangleGeometry {
            bounds: Bounds { north_east: p(2.0, 2.0), south_west: p(0.0, 0.0) },
        }),
        ShapeKind::Polyline => Geometry::Polyline(PolylineGeometry { path: vec![p(0.0, 0.0), p(1.0, 1.0)] }),
        ShapeKind::Polygon => {
            Geometry::Polygon(PolygonGeometry { path: vec![p(0.0, 0.0), p(0.0, 1.0), p(1.0, 1.0)] })
        }
        ShapeKind::Arrow => {
            Geometry::Arrow(ArrowGeometry { start: p(0.0, 0.0), end: p(1.0, 1.0), head_size: 10.0 })
        }
    };
    ShapeInput {
        name: format!("{} 1", kind.label()),
        description: String::new(),
        style: Style::default(),
        is_enemy: false,
        geometry,
    }
}
