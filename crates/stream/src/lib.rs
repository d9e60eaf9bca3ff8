//! Runway streaming: procedural rows, reachability, obstacle timers, the
//! live window and origin rebasing.
//!
//! # Invariants
//! - A lane never rises or falls by more than `max_height_change` per row.
//! - Every rise without a flat neighbour becomes a ramp or an indoor detour.
//! - A tile's shape is frozen once its geometry is materialized.
//! - `current_length - front_row` is always the number of live rows.
//! - Rebasing moves the subject and every live object by the same distance.
//! - Equal seeds and configs give equal levels.

mod config;
mod generator;
mod level;
mod placement;
mod resolver;
mod spawner;
mod subject;
mod terrain;
mod tile;
mod window;

pub use config::{
    ConfigError, DecorationConfig, LevelConfig, LevelSize, ObstacleConfig, SpacingRange,
    TileGeometry,
};
pub use generator::{LevelGenerator, StepReport};
pub use level::{LevelStream, StreamStats, VISIBILITY_HYSTERESIS};
pub use placement::{ObstaclePlanner, Placement, place_decorations};
pub use resolver::{ReachabilityResolver, Resolution};
pub use spawner::{
    Attachment, CenterSpawner, CurbSpawner, DecorationSite, DecorationSpawner,
    DecorationSpawnerKind, DoorSpawner, ObstacleSite, ObstacleSpawner, ObstacleSpawnerKind,
    UnassignedSpawner,
};
pub use subject::{Runner, Subject};
pub use terrain::{FLAT_HEIGHT, TerrainRowGenerator};
pub use tile::{TileBuilder, TileError, TileMetrics, TileRecord};
pub use window::{RowWindow, WindowError};

pub fn crate_info() -> &'static str {
    "runway-stream v0.1.0"
}
