//! Shared value types for the runway workspace.
//!
//! These are plain `Copy` handles and transforms that cross crate
//! boundaries: the generation core hands them to the materialization
//! capability and gets them back as opaque object ids.

mod types;

pub use types::{GeometryHandle, ObjectId, Transform};
