//! Model persistence
//!
//! Fitted models are written as bincode, one file per model in a flat
//! directory, with no sidecar metadata.

mod serializer;

pub use serializer::{load_model, save_model, save_models};
