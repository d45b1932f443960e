//! The canonical local shape collection.
//!
//! The cache is written only after the store confirms a mutation. Each
//! mutation either fully applies or leaves the cache exactly as it was. The
//! reserved preview id never enters the cache.

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;

use std::sync::Arc;

use serde_json::Value;
use shapes::validate::validate;
use shapes::{Shape, ShapeId, ShapeInput, ShapeKind, ValidationError};

use crate::api::{ApiError, ShapeApi};
use crate::normalize::{has_geometry, normalize_record, temp_id};

/// Server error code for a rejected type change.
pub const E_TYPE_IMMUTABLE: &str = "E_TYPE_IMMUTABLE";

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("shape {id} cannot change type to {requested}")]
    TypeImmutable { id: ShapeId, stored: Option<ShapeKind>, requested: ShapeKind },
    #[error("the preview shape is never persisted")]
    PreviewId,
    #[error(transparent)]
    Api(#[from] ApiError),
}

pub struct ShapeStore {
    api: Arc<dyn ShapeApi>,
    shapes: Vec<Shape>,
}

impl ShapeStore {
    #[must_use]
    pub fn new(api: Arc<dyn ShapeApi>) -> Self {
        Self { api, shapes: Vec::new() }
    }

    #[must_use]
    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    #[must_use]
    pub fn get(&self, id: &ShapeId) -> Option<&Shape> {
        self.shapes.iter().find(|s| &s.id == id)
    }

    /// Handle to the underlying API, for requests made outside a `&mut self` borrow.
    #[must_use]
    pub fn api(&self) -> Arc<dyn ShapeApi> {
        Arc::clone(&self.api)
    }

    /// Replace the cache with the store's current collection.
    ///
    /// Records that cannot be normalized are logged and dropped.
    ///
    /// # Errors
    ///
    /// Returns `Api` when the fetch itself fails; the cache is untouched.
    pub async fn list(&mut self) -> Result<&[Shape], StoreError> {
        let records = self.api.list().await?;
        let total = records.len();
        let mut shapes: Vec<Shape> = Vec::with_capacity(total);
        for (index, record) in records.iter().enumerate() {
            match normalize_record(record, None) {
                Ok(shape) if shapes.iter().any(|s| s.id == shape.id) => {
                    tracing::warn!(index, id = %shape.id, "dropping record with duplicate id");
                }
                Ok(shape) => shapes.push(shape),
                Err(e) => tracing::warn!(index, error = %e, record = %record, "dropping unreadable shape record"),
            }
        }
        tracing::info!(total, kept = shapes.len(), "shape list refreshed");
        self.shapes = shapes;
        Ok(&self.shapes)
    }

    /// Persist a new shape and append it to the cache.
    ///
    /// # Errors
    ///
    /// Returns `Validation` before any request is made, or `Api` when the
    /// store rejects the request.
    pub async fn create(&mut self, input: &ShapeInput) -> Result<Shape, StoreError> {
        let input = self.check_create(input)?;
        let record = self.api.create(&input).await?;
        Ok(self.absorb_created(&input, &record))
    }

    /// Replace a stored shape and its cache entry.
    ///
    /// # Errors
    ///
    /// Returns `PreviewId`, `Validation` or `TypeImmutable` before any
    /// request is made, `TypeImmutable` when the store reports one, or `Api`.
    pub async fn update(&mut self, id: &ShapeId, input: &ShapeInput) -> Result<Shape, StoreError> {
        let input = self.check_update(id, input)?;
        match self.api.update(id, &input).await {
            Ok(record) => Ok(self.absorb_updated(id, &input, &record)),
            Err(e) => Err(self.update_error(id, input.kind(), e)),
        }
    }

    /// Delete a shape. A 404 from the store counts as success.
    ///
    /// # Errors
    ///
    /// Returns `Api` for any other failure; the cache is untouched.
    pub async fn delete(&mut self, id: &ShapeId) -> Result<(), StoreError> {
        if id.is_preview() {
            return Err(StoreError::PreviewId);
        }
        match self.api.delete(id).await {
            Ok(()) => {}
            Err(e) if e.is_not_found() => tracing::debug!(%id, "delete of unknown shape treated as success"),
            Err(e) => return Err(e.into()),
        }
        self.shapes.retain(|s| &s.id != id);
        tracing::info!(%id, "shape deleted");
        Ok(())
    }

    // --- Two-phase mutation steps ---

    /// Validate a create payload without touching the network.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for an invalid payload.
    pub fn check_create(&self, input: &ShapeInput) -> Result<ShapeInput, StoreError> {
        Ok(validate(input)?)
    }

    /// Validate an update payload against the cache without touching the network.
    ///
    /// # Errors
    ///
    /// Returns `PreviewId`, `Validation`, or `TypeImmutable` when the cached
    /// entry has a different kind.
    pub fn check_update(&self, id: &ShapeId, input: &ShapeInput) -> Result<ShapeInput, StoreError> {
        if id.is_preview() {
            return Err(StoreError::PreviewId);
        }
        let input = validate(input)?;
        if let Some(stored) = self.get(id).map(Shape::kind) {
            if stored != input.kind() {
                return Err(StoreError::TypeImmutable { id: id.clone(), stored: Some(stored), requested: input.kind() });
            }
        }
        Ok(input)
    }

    /// Fold a confirmed create response into the cache.
    ///
    /// A response without `type` takes the payload's type. A response that
    /// cannot be normalized, or that names a different type, yields a shape
    /// synthesized from the payload, keeping the server's id when it sent
    /// one. A response without geometry keeps the payload's geometry.
    pub fn absorb_created(&mut self, input: &ShapeInput, record: &Value) -> Shape {
        let shape = match normalize_record(record, Some(input.kind())) {
            Ok(shape) if shape.kind() != input.kind() => {
                tracing::warn!(
                    id = %shape.id,
                    echoed = %shape.kind(),
                    requested = %input.kind(),
                    "create response changed type; synthesizing from payload"
                );
                input.clone().into_shape(shape.id)
            }
            Ok(shape) => keep_payload_geometry(shape, input, record),
            Err(e) => {
                let id = echoed_id(record).unwrap_or_else(temp_id);
                tracing::warn!(error = %e, %id, "create response unreadable; synthesizing from payload");
                input.clone().into_shape(id)
            }
        };
        tracing::info!(id = %shape.id, kind = %shape.kind(), "shape created");
        self.upsert(shape.clone());
        shape
    }

    /// Fold a confirmed update response into the cache, replacing the entry for `id`.
    ///
    /// Falls back to the payload the same way [`Self::absorb_created`] does.
    pub fn absorb_updated(&mut self, id: &ShapeId, input: &ShapeInput, record: &Value) -> Shape {
        let mut shape = match normalize_record(record, Some(input.kind())) {
            Ok(shape) if shape.kind() == input.kind() => keep_payload_geometry(shape, input, record),
            Ok(shape) => {
                tracing::warn!(
                    %id,
                    echoed = %shape.kind(),
                    requested = %input.kind(),
                    "update response changed type; synthesizing from payload"
                );
                self.synthesize_update(id, input)
            }
            Err(e) => {
                tracing::warn!(error = %e, %id, "update response unreadable; synthesizing from payload");
                self.synthesize_update(id, input)
            }
        };
        shape.id = id.clone();
        tracing::info!(%id, kind = %shape.kind(), "shape updated");
        self.upsert(shape.clone());
        shape
    }

    fn synthesize_update(&self, id: &ShapeId, input: &ShapeInput) -> Shape {
        let mut shape = input.clone().into_shape(id.clone());
        shape.created_at = self.get(id).and_then(|s| s.created_at.clone());
        shape
    }

    /// Map an update failure, recognizing the store's type-immutability rejection.
    #[must_use]
    pub fn update_error(&self, id: &ShapeId, requested: ShapeKind, err: ApiError) -> StoreError {
        if err.status() == Some(400) && err.code() == Some(E_TYPE_IMMUTABLE) {
            return StoreError::TypeImmutable { id: id.clone(), stored: self.get(id).map(Shape::kind), requested };
        }
        StoreError::Api(err)
    }

    fn upsert(&mut self, shape: Shape) {
        match self.shapes.iter_mut().find(|s| s.id == shape.id) {
            Some(existing) => *existing = shape,
            None => self.shapes.push(shape),
        }
    }
}

/// Replace defaulted geometry with the payload's when the response carries none.
fn keep_payload_geometry(mut shape: Shape, input: &ShapeInput, record: &Value) -> Shape {
    if !has_geometry(record) {
        tracing::debug!(id = %shape.id, "response has no geometry; keeping payload geometry");
        shape.geometry = input.geometry.clone();
    }
    shape
}

/// A usable id from an otherwise unreadable response.
pub(crate) fn echoed_id(record: &Value) -> Option<ShapeId> {
    let id = match record.get("id").or_else(|| record.get("_id"))? {
        Value::String(s) if !s.trim().is_empty() => ShapeId::new(s.clone()),
        Value::Number(n) => ShapeId::new(n.to_string()),
        _ => return None,
    };
    (!id.is_preview()).then_some(id)
}
