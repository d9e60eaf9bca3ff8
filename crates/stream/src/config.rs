use glam::Vec3;
use rand::Rng;
use runway_common::GeometryHandle;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::spawner::{DecorationSpawnerKind, ObstacleSpawnerKind};
use crate::tile::TileMetrics;

/// Errors raised while loading or validating a [`LevelConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("level needs at least one lane")]
    ZeroLanes,
    #[error("level needs at least one layer")]
    ZeroLayers,
    #[error("{field} must be positive, got {value}")]
    NonPositiveSize { field: &'static str, value: f32 },
    #[error("{field} must be within [0, 1], got {value}")]
    Probability { field: &'static str, value: f32 },
    #[error("{field} has min {min} greater than max {max}")]
    Spacing {
        field: &'static str,
        min: u32,
        max: u32,
    },
    #[error("distance until loop {distance} is shorter than one tile ({tile_length})")]
    LoopTooShort { distance: f32, tile_length: f32 },
}

/// Debug lane/layer preset. When present it replaces `lanes`/`layers`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelSize {
    pub lanes: u32,
    pub layers: u32,
}

/// Inclusive range of rows between two spawns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpacingRange {
    pub min: u32,
    pub max: u32,
}

impl SpacingRange {
    /// Inclusive range `min..=max`.
    pub fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    /// Draw a countdown uniformly from `min..=max`.
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> u32 {
        if self.min >= self.max {
            return self.min;
        }
        rng.gen_range(self.min..=self.max)
    }
}

/// Geometry used to materialize the terrain itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileGeometry {
    /// Solid block under the walkable surface, scaled per tile.
    pub ground: GeometryHandle,
    /// 45 degree slope piece placed on ramp tiles.
    pub ramp: GeometryHandle,
    /// Corridor piece placed at the indoor height.
    pub indoor: GeometryHandle,
}

impl Default for TileGeometry {
    fn default() -> Self {
        Self {
            ground: GeometryHandle(1),
            ramp: GeometryHandle(2),
            indoor: GeometryHandle(3),
        }
    }
}

/// An obstacle that can be dropped on a lane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObstacleConfig {
    pub name: String,
    #[serde(default)]
    pub geometry: Option<GeometryHandle>,
    #[serde(default)]
    pub spawner: ObstacleSpawnerKind,
}

/// A decoration rolled once per generated row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecorationConfig {
    pub name: String,
    #[serde(default)]
    pub geometry: Option<GeometryHandle>,
    #[serde(default)]
    pub spawner: DecorationSpawnerKind,
    /// Chance in [0, 1] that the spawner runs for a given row.
    pub spawn_chance: f32,
}

/// Everything the generator needs, fixed at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelConfig {
    /// Width of a lane in world units.
    pub lane_width: f32,
    /// Height of one layer in world units.
    pub layer_height: f32,
    /// Length of a row along the forward axis.
    pub tile_length: f32,
    pub lanes: u32,
    pub layers: u32,
    pub size_override: Option<LevelSize>,
    /// Largest height change, up or down, a lane may take in one row.
    pub max_height_change: u32,
    /// Rows generated after the flat run-up by `create_level`.
    pub level_length: u32,
    /// Rows of flat, obstacle-free terrain at the start of a level.
    pub initial_flat_length: u32,
    /// Forward distance after which the whole world is moved back to the origin.
    pub distance_until_loop: f32,
    /// Rows the subject must be past the front row before it is deleted.
    pub delete_threshold: u32,
    /// Lanes further than this from the subject are disabled.
    pub disable_distance: u32,
    /// World offset added to every materialized position.
    pub generate_offset: Vec3,
    pub probability_to_change_height: f32,
    pub probability_for_non_required_ramps: f32,
    pub probability_to_spawn_door: f32,
    pub min_indoor_length: u32,
    pub obstacle_spacing: SpacingRange,
    pub indoor_obstacle_spacing: SpacingRange,
    pub geometry: TileGeometry,
    pub obstacles: Vec<ObstacleConfig>,
    pub decorations: Vec<DecorationConfig>,
    /// Seed for reproducible levels. `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            lane_width: 2.0,
            layer_height: 2.0,
            tile_length: 7.0,
            lanes: 3,
            layers: 3,
            size_override: None,
            max_height_change: 3,
            level_length: 20,
            initial_flat_length: 7,
            distance_until_loop: 100.0,
            delete_threshold: 5,
            disable_distance: 7,
            generate_offset: Vec3::ZERO,
            probability_to_change_height: 0.1,
            probability_for_non_required_ramps: 0.5,
            probability_to_spawn_door: 0.1,
            min_indoor_length: 2,
            obstacle_spacing: SpacingRange::new(2, 4),
            indoor_obstacle_spacing: SpacingRange::new(2, 2),
            geometry: TileGeometry::default(),
            obstacles: Vec::new(),
            decorations: Vec::new(),
            seed: None,
        }
    }
}

impl LevelConfig {
    /// Parse a config from YAML. Missing fields take their defaults.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a YAML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    /// Lane count after applying the size override.
    pub fn lane_count(&self) -> u32 {
        self.size_override.map_or(self.lanes, |s| s.lanes)
    }

    /// Layer count after applying the size override.
    pub fn layer_count(&self) -> u32 {
        self.size_override.map_or(self.layers, |s| s.layers)
    }

    /// Whole rows the subject travels between two rebases.
    pub fn loop_rows(&self) -> i32 {
        (self.distance_until_loop / self.tile_length).floor() as i32
    }

    /// `distance_until_loop` rounded down to a multiple of `tile_length`.
    pub fn loop_distance(&self) -> f32 {
        self.loop_rows() as f32 * self.tile_length
    }

    /// Placement metrics derived from the tile sizes.
    pub fn metrics(&self) -> TileMetrics {
        TileMetrics {
            lane_width: self.lane_width,
            layer_height: self.layer_height,
            tile_length: self.tile_length,
            lanes: self.lane_count(),
            offset: self.generate_offset,
        }
    }

    /// Reject configurations the generator cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.lane_count() == 0 {
            return Err(ConfigError::ZeroLanes);
        }
        if self.layer_count() == 0 {
            return Err(ConfigError::ZeroLayers);
        }
        for (field, value) in [
            ("lane_width", self.lane_width),
            ("layer_height", self.layer_height),
            ("tile_length", self.tile_length),
        ] {
            // Written as a negation so NaN is rejected too.
            if !(value > 0.0) {
                return Err(ConfigError::NonPositiveSize { field, value });
            }
        }
        let mut probabilities = vec![
            ("probability_to_change_height", self.probability_to_change_height),
            (
                "probability_for_non_required_ramps",
                self.probability_for_non_required_ramps,
            ),
            ("probability_to_spawn_door", self.probability_to_spawn_door),
        ];
        probabilities.extend(
            self.decorations
                .iter()
                .map(|d| ("decoration spawn_chance", d.spawn_chance)),
        );
        for (field, value) in probabilities {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Probability { field, value });
            }
        }
        for (field, range) in [
            ("obstacle_spacing", self.obstacle_spacing),
            ("indoor_obstacle_spacing", self.indoor_obstacle_spacing),
        ] {
            if range.min > range.max {
                return Err(ConfigError::Spacing {
                    field,
                    min: range.min,
                    max: range.max,
                });
            }
        }
        if self.loop_rows() < 1 {
            return Err(ConfigError::LoopTooShort {
                distance: self.distance_until_loop,
                tile_length: self.tile_length,
            });
        }
        Ok(())
    }
}
