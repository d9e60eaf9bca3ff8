use std::time::Duration;

use glam::Vec3;
use runway_kernel::Materializer;
use serde::Serialize;

use crate::config::LevelConfig;
use crate::subject::Subject;
use crate::window::RowWindow;

/// Extra lanes refreshed on each side of the visible band when the subject
/// changes lane.
pub const VISIBILITY_HYSTERESIS: u32 = 2;

/// Running counters for instrumentation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StreamStats {
    pub rows_generated: u64,
    pub rows_deleted: u64,
    pub rebases: u64,
    pub visibility_refreshes: u64,
    pub required_ramps: u64,
    pub optional_ramps: u64,
    pub doors: u64,
    pub obstacles: u64,
    pub decorations: u64,
    /// Wall time spent in the last fixed step.
    pub last_step: Duration,
}

/// Owns the live window and keeps it in step with the subject: deletes
/// rows left behind, hides far lanes, and moves everything back towards
/// the origin once the subject has run far enough.
#[derive(Debug, Clone)]
pub struct LevelStream {
    window: RowWindow,
    tile_length: f32,
    /// Forward coordinate of row 0.
    origin_z: f32,
    delete_threshold: u32,
    disable_distance: u32,
    loop_rows: i32,
    loop_distance: f32,
    visible_lane: u32,
}

impl LevelStream {
    /// Empty stream for `config`, visible band on the centre lane.
    pub fn new(config: &LevelConfig) -> Self {
        Self {
            window: RowWindow::new(config.lane_count()),
            tile_length: config.tile_length,
            origin_z: config.generate_offset.z,
            delete_threshold: config.delete_threshold,
            disable_distance: config.disable_distance,
            loop_rows: config.loop_rows(),
            loop_distance: config.loop_distance(),
            visible_lane: config.lane_count() / 2,
        }
    }

    /// Live rows, oldest first.
    pub fn window(&self) -> &RowWindow {
        &self.window
    }

    /// Mutable access to the live rows.
    pub fn window_mut(&mut self) -> &mut RowWindow {
        &mut self.window
    }

    /// Lane the visibility band is centred on.
    pub fn visible_lane(&self) -> u32 {
        self.visible_lane
    }

    /// Distance subtracted from every position on a rebase.
    pub fn loop_distance(&self) -> f32 {
        self.loop_distance
    }

    /// Rows shifted back on a rebase.
    pub fn loop_rows(&self) -> i32 {
        self.loop_rows
    }

    /// Distance travelled along the runway, measured from row 0.
    pub fn forward(&self, position: Vec3) -> f32 {
        position.z - self.origin_z
    }

    /// Whether the subject is far enough past the front row to drop it.
    pub fn should_advance(&self, forward: f32) -> bool {
        let threshold = (self.window.front_row() + self.delete_threshold as i32) as f32;
        forward > threshold * self.tile_length
    }

    /// Whether the subject has run past the loop distance.
    pub fn needs_rebase(&self, forward: f32) -> bool {
        forward > self.loop_distance
    }

    /// Whether `lane` lies inside the visible band.
    pub fn is_lane_visible(&self, lane: u32) -> bool {
        lane.abs_diff(self.visible_lane) <= self.disable_distance
    }

    /// Destroy the objects of the oldest row and drop it.
    pub fn delete_front(&mut self, scene: &mut dyn Materializer) -> bool {
        let Some(row) = self.window.pop_front() else {
            return false;
        };
        let mut destroyed = 0;
        for mut tile in row {
            destroyed += tile.objects().len();
            tile.destroy_objects(scene);
        }
        tracing::debug!(
            front_row = self.window.front_row(),
            destroyed,
            "front row deleted"
        );
        true
    }

    /// Destroy every object and empty the window. Returns the number of
    /// tiles removed.
    pub fn delete_all(&mut self, scene: &mut dyn Materializer) -> usize {
        let tiles = self.window.clear();
        let count = tiles.len();
        for mut tile in tiles {
            tile.destroy_objects(scene);
        }
        count
    }

    /// Disable the objects of a freshly generated row that fall outside the
    /// visible band.
    pub fn hide_far_lanes(&self, row: i32, scene: &mut dyn Materializer) {
        for tile in self.window.row(row) {
            if !self.is_lane_visible(tile.lane()) {
                tile.set_active(false, scene);
            }
        }
    }

    /// Re-centre the visible band on `lane`.
    ///
    /// Lanes within `disable_distance + VISIBILITY_HYSTERESIS` of the new lane
    /// are refreshed; lanes further out keep their state. Returns `false`
    /// when the lane did not change.
    pub fn set_visible_lane(&mut self, lane: u32, scene: &mut dyn Materializer) -> bool {
        if lane == self.visible_lane {
            return false;
        }
        self.visible_lane = lane;
        let reach = self.disable_distance + VISIBILITY_HYSTERESIS;
        for tile in self.window.iter() {
            if tile.lane().abs_diff(lane) <= reach {
                tile.set_active(self.is_lane_visible(tile.lane()), scene);
            }
        }
        tracing::debug!(lane, "visibility band moved");
        true
    }

    /// Move the subject and every live object back by the loop distance and
    /// renumber the rows to match.
    pub fn rebase<S: Subject + ?Sized>(&mut self, subject: &mut S, scene: &mut dyn Materializer) {
        let _span = tracing::info_span!("rebase", distance = self.loop_distance).entered();
        let shift = Vec3::new(0.0, 0.0, self.loop_distance);

        subject.set_position(subject.position() - shift);
        let mut moved = 0;
        for tile in self.window.iter() {
            for &object in tile.objects() {
                if let Some(position) = scene.position(object) {
                    scene.set_position(object, position - shift);
                    moved += 1;
                }
            }
        }
        self.window.shift_rows(self.loop_rows);

        tracing::debug!(
            moved,
            front_row = self.window.front_row(),
            current_length = self.window.current_length(),
            "origin rebased"
        );
    }
}
