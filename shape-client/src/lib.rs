//! Store client for map annotation shapes.
//!
//! Talks to the remote Shape Store through the [`api::ShapeApi`] seam,
//! reconciles whatever record shape the server returns into the canonical
//! [`shapes::Shape`] model ([`normalize`]), keeps the authoritative local
//! cache ([`store`]), and drives one authoring session at a time against a
//! map surface ([`session`]).

pub mod api;
pub mod config;
pub mod normalize;
pub mod session;
pub mod store;

pub use api::{ApiError, HttpShapeApi, ShapeApi};
pub use config::ClientConfig;
pub use normalize::{NormalizeError, normalize_record};
pub use session::{MapSession, SessionError, SubmitOutcome};
pub use store::{ShapeStore, StoreError};

#[cfg(test)]
pub(crate) mod test_support;
