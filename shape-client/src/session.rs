//! Authoring session controller: one map, one store, at most one builder.
//!
//! Submissions are split into three steps so the network call holds no
//! borrow of the session:
//!
//! 1. [`MapSession::begin_submit`] validates and stamps a [`PendingSubmit`]
//!    with the current generation.
//! 2. [`PendingSubmit::send`] performs the request.
//! 3. [`MapSession::finish_submit`] applies the result, unless the builder it
//!    belonged to was cancelled or replaced in the meantime.
//!
//! Every builder open, cancel, and completed submission bumps the generation.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::sync::Arc;

use serde_json::Value;
use shapes::builder::{NameSequence, Preview};
use shapes::geometry::centroid;
use shapes::layer::{Action, Button, MenuChoice, ShapeLayer};
use shapes::surface::{ClickEvent, ScreenPoint};
use shapes::{
    BuildError, MapSurface, Position, RenderConfig, Shape, ShapeBuilder, ShapeDrawing, ShapeId, ShapeKind,
    Submission, SubmitTarget, draw_scene,
};

use crate::api::{ApiError, ShapeApi};
use crate::store::{ShapeStore, StoreError, echoed_id};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SessionError {
    #[error("no shape is being authored")]
    NoActiveBuilder,
    #[error("unknown shape {0}")]
    UnknownShape(ShapeId),
    #[error(transparent)]
    Build(#[from] BuildError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result of applying a completed submission.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Persisted and absorbed into the cache; the builder is closed.
    Saved(Shape),
    /// The originating builder is gone; nothing was applied.
    Stale,
}

/// A validated submission ready to go over the wire.
pub struct PendingSubmit {
    generation: u64,
    submission: Submission,
    api: Arc<dyn ShapeApi>,
}

impl PendingSubmit {
    #[must_use]
    pub fn submission(&self) -> &Submission {
        &self.submission
    }

    /// Perform the create or update request.
    pub async fn send(self) -> CompletedSubmit {
        let input = &self.submission.input;
        let result = match &self.submission.target {
            SubmitTarget::Create => self.api.create(input).await,
            SubmitTarget::Update(id) => self.api.update(id, input).await,
        };
        CompletedSubmit { generation: self.generation, submission: self.submission, result }
    }
}

/// A finished request awaiting [`MapSession::finish_submit`].
pub struct CompletedSubmit {
    generation: u64,
    submission: Submission,
    result: Result<Value, ApiError>,
}

pub struct MapSession<S: MapSurface> {
    surface: S,
    store: ShapeStore,
    layer: ShapeLayer,
    builder: Option<ShapeBuilder>,
    names: NameSequence,
    generation: u64,
    render: RenderConfig,
}

impl<S: MapSurface> MapSession<S> {
    #[must_use]
    pub fn new(store: ShapeStore, surface: S) -> Self {
        Self {
            surface,
            store,
            layer: ShapeLayer::new(),
            builder: None,
            names: NameSequence::new(),
            generation: 0,
            render: RenderConfig::default(),
        }
    }

    #[must_use]
    pub fn with_render_config(mut self, render: RenderConfig) -> Self {
        self.render = render;
        self
    }

    // --- Accessors ---

    #[must_use]
    pub fn store(&self) -> &ShapeStore {
        &self.store
    }

    #[must_use]
    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    #[must_use]
    pub fn layer(&self) -> &ShapeLayer {
        &self.layer
    }

    #[must_use]
    pub fn builder(&self) -> Option<&ShapeBuilder> {
        self.builder.as_ref()
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub fn preview(&self) -> Preview {
        self.builder.as_ref().and_then(ShapeBuilder::preview)
    }

    // --- Collection ---

    /// Reload the collection from the store, closing popups and menus of
    /// shapes that vanished.
    ///
    /// # Errors
    ///
    /// Returns `Store` when the fetch fails.
    pub async fn refresh(&mut self) -> Result<Vec<Action>, SessionError> {
        let count = self.store.list().await?.len();
        let actions = self.layer.retain(self.store.shapes());
        tracing::debug!(count, "session collection refreshed");
        Ok(actions)
    }

    /// Move the map to a shape's centroid.
    ///
    /// # Errors
    ///
    /// Returns `UnknownShape` when `id` is not cached.
    pub fn center_on(&mut self, id: &ShapeId) -> Result<Position, SessionError> {
        let shape = self.store.get(id).ok_or_else(|| SessionError::UnknownShape(id.clone()))?;
        let at = centroid(&shape.geometry);
        self.surface.center_on(at);
        tracing::debug!(%id, lat = at.latitude, lng = at.longitude, "map centered on shape");
        Ok(at)
    }

    /// Everything to draw: the cached collection plus the live preview.
    #[must_use]
    pub fn scene(&self) -> Vec<ShapeDrawing> {
        let preview = self.preview();
        draw_scene(self.store.shapes(), preview.as_ref(), &self.render)
    }

    // --- Authoring ---

    /// Open a builder for a new shape, closing any builder already open.
    pub fn start_create(&mut self, kind: ShapeKind) -> Preview {
        self.close_builder();
        let name = self.names.next(kind);
        let builder = ShapeBuilder::create(kind, name, &mut self.surface);
        let preview = builder.preview();
        self.builder = Some(builder);
        preview
    }

    /// Open a builder pre-populated from a cached shape.
    ///
    /// # Errors
    ///
    /// Returns `UnknownShape` when `id` is not cached.
    pub fn start_edit(&mut self, id: &ShapeId) -> Result<Preview, SessionError> {
        let shape = self.store.get(id).cloned().ok_or_else(|| SessionError::UnknownShape(id.clone()))?;
        self.close_builder();
        let builder = ShapeBuilder::edit(&shape, &mut self.surface)?;
        let preview = builder.preview();
        self.builder = Some(builder);
        Ok(preview)
    }

    /// Route a map click to the open builder.
    pub fn on_map_click(&mut self, event: &ClickEvent) -> Preview {
        match self.builder.as_mut() {
            Some(builder) => builder.on_map_click(event, &self.surface),
            None => None,
        }
    }

    /// Change draft fields through the builder's setters.
    ///
    /// # Errors
    ///
    /// Returns `NoActiveBuilder` when nothing is being authored.
    pub fn edit_draft(&mut self, edit: impl FnOnce(&mut ShapeBuilder) -> Preview) -> Result<Preview, SessionError> {
        let builder = self.builder.as_mut().ok_or(SessionError::NoActiveBuilder)?;
        Ok(edit(builder))
    }

    /// # Errors
    ///
    /// Returns `NoActiveBuilder`, or the builder's error.
    pub fn done_picking(&mut self) -> Result<Preview, SessionError> {
        Ok(self.active()?.done()?)
    }

    /// # Errors
    ///
    /// Returns `NoActiveBuilder`, or the builder's error.
    pub fn reset_points(&mut self) -> Result<Preview, SessionError> {
        Ok(self.active()?.reset_points()?)
    }

    /// Abandon the open builder, discarding any in-flight submission.
    pub fn cancel(&mut self) {
        self.close_builder();
    }

    /// End the hosting session: close the builder and any popup or menu.
    #[must_use]
    pub fn teardown(&mut self) -> Vec<Action> {
        self.close_builder();
        self.layer.dismiss()
    }

    fn active(&mut self) -> Result<&mut ShapeBuilder, SessionError> {
        self.builder.as_mut().ok_or(SessionError::NoActiveBuilder)
    }

    fn close_builder(&mut self) {
        if let Some(mut builder) = self.builder.take() {
            builder.cancel(&mut self.surface);
        }
        self.generation += 1;
    }

    // --- Submission ---

    /// Validate the builder's payload and stamp it for sending.
    ///
    /// # Errors
    ///
    /// Returns a build or store validation error; the builder is left where
    /// it was.
    pub fn begin_submit(&mut self) -> Result<PendingSubmit, SessionError> {
        let builder = self.builder.as_mut().ok_or(SessionError::NoActiveBuilder)?;
        let submission = builder.submit()?;
        let checked = match &submission.target {
            SubmitTarget::Create => self.store.check_create(&submission.input),
            SubmitTarget::Update(id) => self.store.check_update(id, &submission.input),
        };
        match checked {
            Ok(input) => Ok(PendingSubmit {
                generation: self.generation,
                submission: Submission { target: submission.target, input },
                api: self.store.api(),
            }),
            Err(e) => {
                builder.submit_failed();
                Err(e.into())
            }
        }
    }

    /// Apply a completed request to the cache and close the builder.
    ///
    /// # Errors
    ///
    /// Returns `Store` when the request failed; the builder returns to the
    /// phase it submitted from and the cache is untouched.
    pub fn finish_submit(&mut self, completed: CompletedSubmit) -> Result<SubmitOutcome, SessionError> {
        if completed.generation != self.generation {
            match &completed.result {
                Ok(record) => tracing::info!(
                    stamped = completed.generation,
                    current = self.generation,
                    id = ?echoed_id(record),
                    target = ?completed.submission.target,
                    "store confirmed a submission after its session closed; cache catches up on refresh"
                ),
                Err(e) => tracing::debug!(
                    stamped = completed.generation,
                    current = self.generation,
                    error = %e,
                    "discarding stale failed submission"
                ),
            }
            return Ok(SubmitOutcome::Stale);
        }
        let builder = self.builder.as_mut().ok_or(SessionError::NoActiveBuilder)?;
        let Submission { target, input } = completed.submission;

        let record = match completed.result {
            Ok(record) => record,
            Err(e) => {
                builder.submit_failed();
                let err = match &target {
                    SubmitTarget::Create => StoreError::Api(e),
                    SubmitTarget::Update(id) => self.store.update_error(id, input.kind(), e),
                };
                return Err(err.into());
            }
        };

        let shape = match &target {
            SubmitTarget::Create => self.store.absorb_created(&input, &record),
            SubmitTarget::Update(id) => self.store.absorb_updated(id, &input, &record),
        };
        builder.finish(&mut self.surface)?;
        self.builder = None;
        self.generation += 1;
        Ok(SubmitOutcome::Saved(shape))
    }

    /// Validate, send, and apply in one step.
    ///
    /// # Errors
    ///
    /// Same as [`Self::begin_submit`] and [`Self::finish_submit`].
    pub async fn submit(&mut self) -> Result<SubmitOutcome, SessionError> {
        let pending = self.begin_submit()?;
        let completed = pending.send().await;
        self.finish_submit(completed)
    }

    // --- Shape interaction ---

    pub fn on_shape_hit(&mut self, id: &ShapeId, button: Button, screen: ScreenPoint) -> Vec<Action> {
        self.layer.on_hit(id, button, screen)
    }

    /// Resolve the context menu: open the editor or delete the shape.
    ///
    /// # Errors
    ///
    /// Returns `UnknownShape` for an edit of an uncached shape, or `Store`
    /// when the delete fails.
    pub async fn choose_menu(&mut self, choice: MenuChoice) -> Result<Vec<Action>, SessionError> {
        let mut actions = self.layer.choose(choice);
        let mut follow_up = Vec::new();
        for action in &actions {
            match action {
                Action::EditRequested(id) => {
                    self.start_edit(id)?;
                }
                Action::DeleteRequested(id) => {
                    self.store.delete(id).await?;
                    follow_up.extend(self.layer.retain(self.store.shapes()));
                }
                Action::RenderNeeded => {}
            }
        }
        for action in follow_up {
            if !actions.contains(&action) {
                actions.push(action);
            }
        }
        Ok(actions)
    }
}
