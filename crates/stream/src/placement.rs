use rand::Rng;
use runway_common::ObjectId;
use runway_kernel::Materializer;

use crate::config::{DecorationConfig, LevelConfig, ObstacleConfig, SpacingRange};
use crate::spawner::{DecorationSite, ObstacleSite};
use crate::tile::TileMetrics;
use crate::window::RowWindow;

/// Objects placed on one row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Placement {
    pub obstacles: u32,
    pub indoor_obstacles: u32,
    pub decorations: u32,
}

/// Per-lane countdowns that space obstacles out along each lane.
///
/// A lane whose timer is non-zero skips the row and counts down. When it
/// reaches zero the next eligible tile gets an obstacle and the timer is
/// redrawn. Ramps never touch the timer and blocked tiles leave it at
/// zero, so consecutive obstacles in a lane are separated by exactly the
/// drawn number of non-ramp rows that counted it down.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObstaclePlanner {
    spacing: SpacingRange,
    indoor_spacing: SpacingRange,
    lane_timers: Vec<u32>,
    indoor_timers: Vec<u32>,
}

impl ObstaclePlanner {
    /// Planner with empty timers; call [`ObstaclePlanner::reset`] before use.
    pub fn new(config: &LevelConfig) -> Self {
        Self {
            spacing: config.obstacle_spacing,
            indoor_spacing: config.indoor_obstacle_spacing,
            lane_timers: Vec::new(),
            indoor_timers: Vec::new(),
        }
    }

    /// Redraw every timer for a fresh level.
    pub fn reset<R: Rng + ?Sized>(&mut self, lanes: u32, rng: &mut R) {
        self.lane_timers = (0..lanes).map(|_| self.spacing.draw(rng)).collect();
        self.indoor_timers = (0..lanes).map(|_| self.indoor_spacing.draw(rng)).collect();
    }

    /// Outdoor countdown per lane.
    pub fn lane_timers(&self) -> &[u32] {
        &self.lane_timers
    }

    /// Indoor countdown per lane.
    pub fn indoor_timers(&self) -> &[u32] {
        &self.indoor_timers
    }

    /// Run the outdoor and indoor obstacle passes over `row`.
    pub fn place_obstacles<R: Rng + ?Sized>(
        &mut self,
        window: &mut RowWindow,
        row: i32,
        obstacles: &[ObstacleConfig],
        metrics: &TileMetrics,
        scene: &mut dyn Materializer,
        rng: &mut R,
    ) -> Placement {
        let mut placed = Placement::default();
        if obstacles.is_empty() {
            return placed;
        }

        for lane in 0..window.lanes() {
            let Some(index) = window.flat_index(row, lane) else {
                continue;
            };
            let Some(timer) = self.lane_timers.get_mut(lane as usize) else {
                continue;
            };
            let Some(tile) = window.tile(index) else {
                continue;
            };
            if tile.is_ramp() {
                continue;
            }
            if *timer > 0 {
                *timer -= 1;
                continue;
            }
            // Nothing in front of a ramp or a corridor exit at this level.
            let blocked = match window.get(row - 1, lane) {
                None => true,
                Some(prev) => {
                    prev.is_ramp() || (prev.has_indoors() && prev.indoor_height() == tile.height())
                }
            };
            if blocked {
                continue;
            }

            let surface = metrics.surface_center(lane, row, tile.height());
            let choice = &obstacles[rng.gen_range(0..obstacles.len())];
            placed.obstacles += spawn_obstacle(choice, window, index, surface, metrics, scene);
            *timer = self.spacing.draw(rng);
        }

        for lane in 0..window.lanes() {
            let Some(index) = window.flat_index(row, lane) else {
                continue;
            };
            let Some(timer) = self.indoor_timers.get_mut(lane as usize) else {
                continue;
            };
            let Some(tile) = window.tile(index) else {
                continue;
            };
            if !tile.has_indoors() {
                continue;
            }
            if *timer > 0 {
                *timer -= 1;
                continue;
            }
            // Keep the corridor entrance clear.
            let deep_inside = window
                .get(row - 2, lane)
                .is_some_and(|t| t.has_indoors());
            if !deep_inside {
                continue;
            }

            let surface = metrics.surface_center(lane, row, tile.indoor_height());
            let choice = &obstacles[rng.gen_range(0..obstacles.len())];
            placed.indoor_obstacles += spawn_obstacle(choice, window, index, surface, metrics, scene);
            *timer = self.indoor_spacing.draw(rng);
        }

        placed
    }
}

fn spawn_obstacle(
    obstacle: &ObstacleConfig,
    window: &mut RowWindow,
    index: usize,
    surface_center: glam::Vec3,
    metrics: &TileMetrics,
    scene: &mut dyn Materializer,
) -> u32 {
    let Some(geometry) = obstacle.geometry else {
        tracing::warn!(obstacle = %obstacle.name, "obstacle has no geometry, skipped");
        return 0;
    };
    let site = ObstacleSite {
        tile: index,
        surface_center,
        metrics: *metrics,
    };
    let objects = obstacle.spawner.spawner().spawn(geometry, window, &site, scene);
    let count = objects.len() as u32;
    if let Err(orphans) = window.attach(index, objects) {
        destroy_orphans(orphans, scene);
        return 0;
    }
    count
}

/// Roll every decoration once for `row` and attach what the spawners place.
///
/// The first live row has no predecessor to compare against and is skipped.
pub fn place_decorations<R: Rng + ?Sized>(
    window: &mut RowWindow,
    row: i32,
    decorations: &[DecorationConfig],
    metrics: &TileMetrics,
    scene: &mut dyn Materializer,
    rng: &mut R,
) -> u32 {
    let (Some(row_start), Some(_)) = (window.row_start(row), window.row_start(row - 1)) else {
        return 0;
    };
    let site = DecorationSite {
        row,
        row_start,
        row_step: window.lanes() as usize,
        metrics: *metrics,
    };

    let mut placed = 0;
    for decoration in decorations {
        let roll: f32 = rng.r#gen();
        if roll >= decoration.spawn_chance {
            continue;
        }
        let Some(geometry) = decoration.geometry else {
            tracing::warn!(decoration = %decoration.name, "decoration has no geometry, skipped");
            continue;
        };
        let attachments = decoration.spawner.spawner().spawn(geometry, window, &site, scene);
        for attachment in attachments {
            match window.attach(attachment.tile, vec![attachment.object]) {
                Ok(()) => placed += 1,
                Err(orphans) => destroy_orphans(orphans, scene),
            }
        }
    }
    placed
}

fn destroy_orphans(orphans: Vec<ObjectId>, scene: &mut dyn Materializer) {
    tracing::error!(count = orphans.len(), "spawner targeted a tile outside the window");
    for object in orphans {
        scene.destroy(object);
    }
}
