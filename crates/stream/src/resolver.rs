use rand::Rng;

use crate::config::LevelConfig;
use crate::tile::TileBuilder;

/// What the resolver changed in one row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Resolution {
    /// Ramps placed because the lane had no flat or descending neighbour.
    pub required_ramps: u32,
    /// Ramps rolled on +1 steps that were already reachable.
    pub optional_ramps: u32,
    /// Indoor detours opened.
    pub doors: u32,
}

/// Removes "death walls": rises the subject cannot climb and cannot step
/// around.
///
/// The check is local by intent. Each rising lane is compared with the
/// previous row and with its immediate left and right lanes only; nothing
/// is proven about paths across several rows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReachabilityResolver {
    pub probability_for_non_required_ramps: f32,
    pub probability_to_spawn_door: f32,
}

impl ReachabilityResolver {
    /// Resolver using the ramp and door probabilities of `config`.
    pub fn new(config: &LevelConfig) -> Self {
        Self {
            probability_for_non_required_ramps: config.probability_for_non_required_ramps,
            probability_to_spawn_door: config.probability_to_spawn_door,
        }
    }

    /// Resolve one row against the previous one.
    ///
    /// `prev_heights[lane]` is the height of the tile one row back and
    /// `two_back[lane]` the height two rows back, when that row is live.
    /// Lanes are visited left to right. A lane that became a ramp counts as
    /// flat for the lanes visited after it.
    pub fn resolve<R: Rng + ?Sized>(
        &self,
        tiles: &mut [TileBuilder],
        prev_heights: &[u32],
        two_back: &[Option<u32>],
        rng: &mut R,
    ) -> Resolution {
        let mut outcome = Resolution::default();
        let mut working: Vec<u32> = tiles.iter().map(|t| t.height()).collect();
        let lanes = tiles.len();

        for lane in 0..lanes {
            let prev = prev_heights[lane];
            if working[lane] <= prev {
                continue;
            }
            let rise = working[lane] - prev;

            let offers_path = |n: usize| prev_heights[n] <= prev && working[n] <= prev_heights[n];
            let valid_neighbors = [lane.checked_sub(1), Some(lane + 1)]
                .into_iter()
                .flatten()
                .filter(|&n| n < lanes && offers_path(n))
                .count();

            let tile = &mut tiles[lane];
            let roll: f32 = rng.r#gen();
            let door_allowed = !tile.has_indoors() && two_back[lane] == Some(prev);

            if valid_neighbors == 0 {
                if door_allowed && roll < self.probability_to_spawn_door {
                    tile.open_indoors(prev, 0);
                    outcome.doors += 1;
                    tracing::trace!(lane, row = tile.row(), "wall resolved with indoor detour");
                } else {
                    tile.make_ramp(prev + 1);
                    working[lane] = prev;
                    outcome.required_ramps += 1;
                    tracing::trace!(lane, row = tile.row(), rise, "wall resolved with ramp");
                }
            } else if rise == 1 && roll < self.probability_for_non_required_ramps {
                tile.make_ramp(prev + 1);
                working[lane] = prev;
                outcome.optional_ramps += 1;
            } else if door_allowed && roll < self.probability_to_spawn_door {
                tile.open_indoors(prev, 0);
                outcome.doors += 1;
            }
        }
        outcome
    }
}
