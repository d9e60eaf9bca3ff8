use std::fmt::Write;

use runway_common::ObjectId;
use runway_kernel::Scene;
use runway_stream::RowWindow;
use serde::Serialize;

/// Level inspector for developer tooling.
///
/// Read-only queries against the live window and the scene it populates.
pub struct LevelInspector;

impl LevelInspector {
    /// Produce a summary of the live window.
    pub fn summary(window: &RowWindow, scene: &Scene) -> LevelSummary {
        LevelSummary {
            front_row: window.front_row(),
            current_length: window.current_length(),
            rows: window.rows(),
            tiles: window.len(),
            objects: scene.object_count(),
            active_objects: scene.active_count(),
            ramps: window.iter().filter(|t| t.is_ramp()).count(),
            indoor_tiles: window.iter().filter(|t| t.has_indoors()).count(),
            max_height: window.iter().map(|t| t.height()).max().unwrap_or(0),
        }
    }

    /// Look up one tile by absolute row and lane.
    pub fn inspect_tile(window: &RowWindow, row: i32, lane: u32) -> Option<TileInfo> {
        window.get(row, lane).map(|t| TileInfo {
            lane,
            row,
            height: t.height(),
            is_ramp: t.is_ramp(),
            indoor: t
                .has_indoors()
                .then(|| (t.indoor_height(), t.indoor_length())),
            objects: t.objects().to_vec(),
        })
    }

    /// One line per live row, furthest row first, one cell per lane.
    ///
    /// A cell is the height followed by a marker: `/` ramp, `_` indoor
    /// section, `%` both, `.` plain.
    pub fn ascii_map(window: &RowWindow) -> String {
        let mut out = String::new();
        for row in (window.front_row()..window.current_length()).rev() {
            let _ = write!(out, "{row:>6} |");
            for tile in window.row(row) {
                let marker = match (tile.is_ramp(), tile.has_indoors()) {
                    (true, true) => '%',
                    (true, false) => '/',
                    (false, true) => '_',
                    (false, false) => '.',
                };
                let _ = write!(out, " {:>2}{marker}", tile.height());
            }
            out.push('\n');
        }
        out
    }
}

/// Summary of the live window for the inspector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LevelSummary {
    pub front_row: i32,
    pub current_length: i32,
    pub rows: usize,
    pub tiles: usize,
    pub objects: usize,
    pub active_objects: usize,
    pub ramps: usize,
    pub indoor_tiles: usize,
    pub max_height: u32,
}

impl std::fmt::Display for LevelSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Level: rows={} [{}..{}) tiles={} objects={} active={} ramps={} indoor={} max_height={}",
            self.rows,
            self.front_row,
            self.current_length,
            self.tiles,
            self.objects,
            self.active_objects,
            self.ramps,
            self.indoor_tiles,
            self.max_height
        )
    }
}

/// Detailed info about a single tile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TileInfo {
    pub lane: u32,
    pub row: i32,
    pub height: u32,
    pub is_ramp: bool,
    /// `(height, length)` of the indoor section, if any.
    pub indoor: Option<(u32, i32)>,
    pub objects: Vec<ObjectId>,
}

impl std::fmt::Display for TileInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Tile [row {} lane {}] height={} ramp={}",
            self.row, self.lane, self.height, self.is_ramp
        )?;
        if let Some((height, length)) = self.indoor {
            write!(f, " indoor=(height {height}, length {length})")?;
        }
        write!(f, " objects={}", self.objects.len())
    }
}
