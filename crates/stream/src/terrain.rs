use rand::Rng;

use crate::config::LevelConfig;
use crate::resolver::{ReachabilityResolver, Resolution};
use crate::tile::{TileBuilder, TileRecord};
use crate::window::RowWindow;

/// Height of the run-up rows, clamped to the top layer.
pub const FLAT_HEIGHT: u32 = 1;

/// Decides the shape of each new row from the row before it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TerrainRowGenerator {
    lanes: u32,
    layers: u32,
    max_height_change: u32,
    probability_to_change_height: f32,
    min_indoor_length: u32,
    resolver: ReachabilityResolver,
}

impl TerrainRowGenerator {
    /// Row generator for the lane and layer counts of `config`.
    pub fn new(config: &LevelConfig) -> Self {
        Self {
            lanes: config.lane_count(),
            layers: config.layer_count(),
            max_height_change: config.max_height_change,
            probability_to_change_height: config.probability_to_change_height,
            min_indoor_length: config.min_indoor_length,
            resolver: ReachabilityResolver::new(config),
        }
    }

    /// Shape the row at `window.current_length()`.
    ///
    /// Every lane draws one roll for "change height" even when the outcome is
    /// forced, so the random stream does not depend on the terrain. Flat rows
    /// sit at [`FLAT_HEIGHT`] and never change.
    pub fn generate_row<R: Rng + ?Sized>(
        &self,
        window: &RowWindow,
        flat: bool,
        rng: &mut R,
    ) -> (Vec<TileRecord>, Resolution) {
        let row = window.current_length();
        let top = self.layers.saturating_sub(1);
        let mut builders = Vec::with_capacity(self.lanes as usize);
        let mut prev_heights = Vec::with_capacity(self.lanes as usize);
        let mut two_back = Vec::with_capacity(self.lanes as usize);

        for lane in 0..self.lanes {
            let prev = window.get(row - 1, lane);
            let mut prev_height = prev.map_or(0, |t| t.height());
            prev_heights.push(prev_height);
            two_back.push(window.get(row - 2, lane).map(|t| t.height()));

            let roll: f32 = rng.r#gen();
            let mut change = roll < self.probability_to_change_height;
            match prev {
                None => change = true,
                // A ramp's top must stay level with the next tile.
                Some(p) if p.is_ramp() => change = false,
                Some(_) => {}
            }
            if flat {
                change = false;
                prev_height = FLAT_HEIGHT.min(top);
            }

            let height = if change {
                let low = prev_height.saturating_sub(self.max_height_change);
                let high = (prev_height + self.max_height_change).min(top);
                rng.gen_range(low.min(high)..=high)
            } else {
                prev_height
            };

            let mut builder = TileBuilder::new(lane, row, height);
            if let Some(p) = prev.filter(|p| p.has_indoors()) {
                let too_short = p.indoor_length() < self.min_indoor_length as i32;
                if too_short || height > p.indoor_height() {
                    builder.open_indoors(p.indoor_height(), p.indoor_length() + 1);
                } else {
                    // Leaving the corridor: step out at its floor.
                    builder.set_height(p.indoor_height());
                }
            }
            builders.push(builder);
        }

        let resolution = if window.get(row - 1, 0).is_some() {
            self.resolver
                .resolve(&mut builders, &prev_heights, &two_back, rng)
        } else {
            Resolution::default()
        };

        let tiles = builders.into_iter().map(TileBuilder::build).collect();
        (tiles, resolution)
    }
}
