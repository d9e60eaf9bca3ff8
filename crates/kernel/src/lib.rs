//! Scene kernel: the materialization capability the generator consumes,
//! plus an in-memory scene that implements it.
//!
//! # Invariants
//! - Every object the generator creates goes through a [`Materializer`].
//! - Object ids are allocated sequentially, so seeded runs are reproducible.
//! - All scene mutations are recorded in an append-only event log.

pub mod materializer;
pub mod scene;

pub use materializer::Materializer;
pub use scene::{Scene, SceneEvent, SceneObject};
