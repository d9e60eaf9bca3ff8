use std::time::Instant;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use runway_kernel::Materializer;
use serde::Serialize;

use crate::config::{ConfigError, LevelConfig};
use crate::level::{LevelStream, StreamStats};
use crate::placement::{self, ObstaclePlanner};
use crate::subject::Subject;
use crate::terrain::TerrainRowGenerator;
use crate::tile::{TileMetrics, TileRecord};
use crate::window::RowWindow;

/// What one fixed step did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StepReport {
    /// At least one front row was dropped and replaced by a new row.
    pub advanced: bool,
    /// The world was moved back towards the origin.
    pub rebased: bool,
    /// The visibility band followed the subject to a new lane.
    pub lane_changed: bool,
}

/// Level lifecycle façade: builds rows, keeps the window moving with the
/// subject, and owns the scene every object lives in.
///
/// All work happens synchronously inside the calling step. Nothing here is
/// re-entrant.
pub struct LevelGenerator<M: Materializer> {
    config: LevelConfig,
    metrics: TileMetrics,
    terrain: TerrainRowGenerator,
    planner: ObstaclePlanner,
    stream: LevelStream,
    scene: M,
    rng: ChaCha8Rng,
    stats: StreamStats,
}

impl<M: Materializer> LevelGenerator<M> {
    /// Validate `config` and seed from `config.seed`, or from entropy when
    /// unset.
    pub fn new(config: LevelConfig, scene: M) -> Result<Self, ConfigError> {
        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self::with_rng(config, scene, rng)
    }

    /// Validate `config` and draw every random decision from `rng`.
    pub fn with_rng(config: LevelConfig, scene: M, rng: ChaCha8Rng) -> Result<Self, ConfigError> {
        config.validate()?;
        tracing::info!(
            lanes = config.lane_count(),
            layers = config.layer_count(),
            loop_distance = config.loop_distance(),
            "level generator ready"
        );
        Ok(Self {
            metrics: config.metrics(),
            terrain: TerrainRowGenerator::new(&config),
            planner: ObstaclePlanner::new(&config),
            stream: LevelStream::new(&config),
            scene,
            rng,
            stats: StreamStats::default(),
            config,
        })
    }

    /// Validated config the generator was built with.
    pub fn config(&self) -> &LevelConfig {
        &self.config
    }

    /// Live rows, oldest first.
    pub fn window(&self) -> &RowWindow {
        self.stream.window()
    }

    /// Streaming state: visibility band and rebase parameters.
    pub fn stream(&self) -> &LevelStream {
        &self.stream
    }

    /// Scene holding every object the level owns.
    pub fn scene(&self) -> &M {
        &self.scene
    }

    /// Mutable scene access, e.g. to drain its event log.
    pub fn scene_mut(&mut self) -> &mut M {
        &mut self.scene
    }

    /// Consume the generator and hand back its scene.
    pub fn into_scene(self) -> M {
        self.scene
    }

    /// Counters accumulated since construction.
    pub fn stats(&self) -> &StreamStats {
        &self.stats
    }

    /// Per-lane obstacle timers.
    pub fn planner(&self) -> &ObstaclePlanner {
        &self.planner
    }

    /// Copy of the tile at a flat window index, or the invalid sentinel.
    pub fn tile_copy(&self, index: isize) -> TileRecord {
        self.stream.window().tile_copy(index)
    }

    /// Start a fresh level: clear the window, redraw the obstacle timers,
    /// lay the flat run-up, then extend by `level_length`.
    pub fn create_level(&mut self) {
        let _span = tracing::info_span!("create_level").entered();
        self.delete_level();
        self.planner.reset(self.config.lane_count(), &mut self.rng);
        self.generate(self.config.initial_flat_length, true);
        self.extend(self.config.level_length);
    }

    /// Append `rows` rows to the window.
    pub fn extend(&mut self, rows: u32) {
        self.generate(rows, false);
    }

    /// Destroy every object and empty the window.
    pub fn delete_level(&mut self) {
        let removed = self.stream.delete_all(&mut self.scene);
        if removed > 0 {
            tracing::debug!(tiles = removed, "level deleted");
        }
    }

    /// Per-step maintenance: follow the subject's lane, keep generation
    /// ahead of it, and rebase once it has run far enough.
    pub fn fixed_step<S: Subject + ?Sized>(&mut self, subject: &mut S) -> StepReport {
        let _span = tracing::info_span!("fixed_step").entered();
        let started = Instant::now();
        let mut report = StepReport::default();

        if self.stream.set_visible_lane(subject.lane(), &mut self.scene) {
            self.stats.visibility_refreshes += 1;
            report.lane_changed = true;
        }

        let forward = self.stream.forward(subject.position());
        // One row per tile crossed, at most a full window per step.
        let mut budget = self.stream.window().rows().max(1);
        while budget > 0 && self.stream.should_advance(forward) {
            if self.stream.delete_front(&mut self.scene) {
                self.stats.rows_deleted += 1;
            }
            self.extend(1);
            report.advanced = true;
            budget -= 1;
        }

        if self.stream.needs_rebase(forward) {
            self.stream.rebase(subject, &mut self.scene);
            self.stats.rebases += 1;
            report.rebased = true;
        }

        self.stats.last_step = started.elapsed();
        report
    }

    fn generate(&mut self, rows: u32, flat: bool) {
        let _span = tracing::info_span!("generate_rows", rows, flat).entered();
        let lanes = self.config.lane_count();
        if self.planner.lane_timers().len() != lanes as usize {
            self.planner.reset(lanes, &mut self.rng);
        }

        for _ in 0..rows {
            let window = self.stream.window_mut();
            let row = window.current_length();
            let (tiles, resolution) = self.terrain.generate_row(window, flat, &mut self.rng);
            if let Err(err) = window.push_row(tiles) {
                tracing::error!(%err, row, "row rejected by window");
                return;
            }

            if !flat {
                let placed = self.planner.place_obstacles(
                    window,
                    row,
                    &self.config.obstacles,
                    &self.metrics,
                    &mut self.scene,
                    &mut self.rng,
                );
                self.stats.obstacles += u64::from(placed.obstacles + placed.indoor_obstacles);
            }

            for lane in 0..lanes {
                if let Some(tile) = window.get_mut(row, lane) {
                    // Errors are logged by the tile; the row carries on.
                    let _ = tile.materialize(&self.config.geometry, &self.metrics, &mut self.scene);
                }
            }

            let decorations = placement::place_decorations(
                window,
                row,
                &self.config.decorations,
                &self.metrics,
                &mut self.scene,
                &mut self.rng,
            );
            self.stats.decorations += u64::from(decorations);

            self.stream.hide_far_lanes(row, &mut self.scene);

            self.stats.rows_generated += 1;
            self.stats.required_ramps += u64::from(resolution.required_ramps);
            self.stats.optional_ramps += u64::from(resolution.optional_ramps);
            self.stats.doors += u64::from(resolution.doors);
            tracing::debug!(row, "row generated");
        }
    }
}
