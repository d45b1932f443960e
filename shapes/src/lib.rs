//! Map annotation shapes: data model, geometry, authoring, and rendering.
//!
//! This crate is pure: it performs no I/O and owns no network state. The
//! host wires a map surface (projection and click stream) and a store client
//! around it, feeding clicks into the [`builder`] and drawing whatever
//! [`render`] produces for the current shape collection.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`model`] | Tagged shape types, style fields, wire payloads |
//! | [`validate`] | Pre-submission validation rules |
//! | [`geometry`] | Centroid, rectangle normalization, arrowheads, rings |
//! | [`surface`] | Map surface seam, click capture sessions, reference viewport |
//! | [`builder`] | Point-picking state machine with live preview |
//! | [`render`] | Shapes to drawable primitives, labels, hit targets |
//! | [`layer`] | Popup and context-menu interaction over rendered shapes |
//! | [`consts`] | Shared defaults and numeric constants |

pub mod builder;
pub mod consts;
pub mod geometry;
pub mod layer;
pub mod model;
pub mod render;
pub mod surface;
pub mod validate;

pub use builder::{BuildError, BuilderPhase, ShapeBuilder, Submission, SubmitTarget};
pub use model::{Geometry, Position, Shape, ShapeId, ShapeInput, ShapeKind};
pub use render::{RenderConfig, ShapeDrawing, draw_scene, draw_shape};
pub use surface::{MapSurface, Viewport};
pub use validate::ValidationError;
