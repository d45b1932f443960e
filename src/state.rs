//! Shared application state.
//!
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! holds the in-memory shape table in insertion order. Nothing is persisted;
//! a restart returns to the seed file.

#[cfg(test)]
#[path = "state_test.rs"]
mod state_test;

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::services::shape::ShapeRecord;

/// Shared application state. Clone is required by Axum; the table is Arc-wrapped.
#[derive(Clone, Default)]
pub struct AppState {
    pub shapes: Arc<RwLock<Vec<ShapeRecord>>>,
}

impl AppState {
    #[must_use]
    pub fn new(records: Vec<ShapeRecord>) -> Self {
        Self { shapes: Arc::new(RwLock::new(records)) }
    }

    pub async fn count(&self) -> usize {
        self.shapes.read().await.len()
    }
}
