//! Obstacle and decoration spawners.
//!
//! A spawner receives a read-only view of the live tiles and places objects
//! through the materializer. It never edits the terrain; the generator
//! attaches whatever it returns to the tiles it names. The set of spawners
//! is closed and picked per descriptor by a serde tag.

use glam::Vec3;
use runway_common::{GeometryHandle, ObjectId};
use runway_kernel::Materializer;
use serde::{Deserialize, Serialize};

use crate::tile::{TileMetrics, TileRecord};
use crate::window::RowWindow;

/// Where an obstacle is going: one tile of the row being generated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObstacleSite {
    /// Flat index of the target tile in the window.
    pub tile: usize,
    /// Centre of the tile, on top of the walkable (or indoor) surface.
    pub surface_center: Vec3,
    pub metrics: TileMetrics,
}

/// Where a decoration pass runs: one whole row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecorationSite {
    /// Absolute row number.
    pub row: i32,
    /// Flat index of the leftmost tile of the row.
    pub row_start: usize,
    /// Distance in flat indices between two rows, i.e. the lane count.
    pub row_step: usize,
    pub metrics: TileMetrics,
}

/// An object a spawner created, and the tile that should own it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attachment {
    pub tile: usize,
    pub object: ObjectId,
}

pub trait ObstacleSpawner {
    /// Place `geometry` on the site's tile. Returned objects are attached to
    /// that tile.
    fn spawn(
        &self,
        geometry: GeometryHandle,
        tiles: &RowWindow,
        site: &ObstacleSite,
        scene: &mut dyn Materializer,
    ) -> Vec<ObjectId>;
}

pub trait DecorationSpawner {
    /// Decorate the site's row.
    fn spawn(
        &self,
        geometry: GeometryHandle,
        tiles: &RowWindow,
        site: &DecorationSite,
        scene: &mut dyn Materializer,
    ) -> Vec<Attachment>;
}

/// Which obstacle spawner a descriptor uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObstacleSpawnerKind {
    #[default]
    Unassigned,
    Center,
}

impl ObstacleSpawnerKind {
    /// Spawner implementing this kind.
    pub fn spawner(self) -> &'static dyn ObstacleSpawner {
        match self {
            Self::Unassigned => &UnassignedSpawner,
            Self::Center => &CenterSpawner,
        }
    }
}

/// Which decoration spawner a descriptor uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecorationSpawnerKind {
    #[default]
    Unassigned,
    Door,
    Curb,
}

impl DecorationSpawnerKind {
    /// Spawner implementing this kind.
    pub fn spawner(self) -> &'static dyn DecorationSpawner {
        match self {
            Self::Unassigned => &UnassignedSpawner,
            Self::Door => &DoorSpawner,
            Self::Curb => &CurbSpawner,
        }
    }
}

/// Placeholder for descriptors nobody wired up. Logs and places nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnassignedSpawner;

impl ObstacleSpawner for UnassignedSpawner {
    fn spawn(
        &self,
        geometry: GeometryHandle,
        _tiles: &RowWindow,
        site: &ObstacleSite,
        _scene: &mut dyn Materializer,
    ) -> Vec<ObjectId> {
        tracing::error!(?geometry, tile = site.tile, "obstacle has no spawner assigned");
        Vec::new()
    }
}

impl DecorationSpawner for UnassignedSpawner {
    fn spawn(
        &self,
        geometry: GeometryHandle,
        _tiles: &RowWindow,
        site: &DecorationSite,
        _scene: &mut dyn Materializer,
    ) -> Vec<Attachment> {
        tracing::error!(?geometry, row = site.row, "decoration has no spawner assigned");
        Vec::new()
    }
}

/// Drops the obstacle in the middle of the tile.
#[derive(Debug, Default, Clone, Copy)]
pub struct CenterSpawner;

impl ObstacleSpawner for CenterSpawner {
    fn spawn(
        &self,
        geometry: GeometryHandle,
        _tiles: &RowWindow,
        site: &ObstacleSite,
        scene: &mut dyn Materializer,
    ) -> Vec<ObjectId> {
        vec![scene.materialize(geometry, site.surface_center, Vec3::ONE)]
    }
}

/// Puts a door on the near edge of every tile where the row enters or
/// leaves an indoor section.
#[derive(Debug, Default, Clone, Copy)]
pub struct DoorSpawner;

impl DecorationSpawner for DoorSpawner {
    fn spawn(
        &self,
        geometry: GeometryHandle,
        tiles: &RowWindow,
        site: &DecorationSite,
        scene: &mut dyn Materializer,
    ) -> Vec<Attachment> {
        let mut placed = Vec::new();
        for (lane, cur, prev) in row_pairs(tiles, *site) {
            if cur.has_indoors() == prev.has_indoors() {
                continue;
            }
            // Exits use the corridor they leave, entrances the one they open.
            let height = if prev.has_indoors() {
                prev.indoor_height()
            } else {
                cur.indoor_height()
            };
            let position = site.metrics.near_edge(lane, site.row, height);
            placed.push(Attachment {
                tile: site.row_start + lane as usize,
                object: scene.materialize(geometry, position, Vec3::ONE),
            });
        }
        placed
    }
}

/// Puts a curb on the near edge of every tile that drops below its
/// predecessor.
#[derive(Debug, Default, Clone, Copy)]
pub struct CurbSpawner;

impl DecorationSpawner for CurbSpawner {
    fn spawn(
        &self,
        geometry: GeometryHandle,
        tiles: &RowWindow,
        site: &DecorationSite,
        scene: &mut dyn Materializer,
    ) -> Vec<Attachment> {
        let mut placed = Vec::new();
        for (lane, cur, prev) in row_pairs(tiles, *site) {
            if prev.height() <= cur.height() {
                continue;
            }
            let position = site.metrics.near_edge(lane, site.row, prev.height());
            placed.push(Attachment {
                tile: site.row_start + lane as usize,
                object: scene.materialize(geometry, position, Vec3::ONE),
            });
        }
        placed
    }
}

/// `(lane, tile, tile one row back)` for every lane of the site's row that
/// has a live predecessor.
fn row_pairs(
    tiles: &RowWindow,
    site: DecorationSite,
) -> impl Iterator<Item = (u32, &TileRecord, &TileRecord)> {
    let row_start = site.row_start;
    let row_step = site.row_step;
    (0..row_step).filter_map(move |lane| {
        let cur = tiles.tile(row_start + lane)?;
        let prev = tiles.tile((row_start + lane).checked_sub(row_step)?)?;
        Some((lane as u32, cur, prev))
    })
}
