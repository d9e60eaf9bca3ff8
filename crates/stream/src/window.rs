use std::collections::VecDeque;

use runway_common::ObjectId;

use crate::tile::TileRecord;

/// Errors from window mutations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WindowError {
    #[error("row has {got} tiles, window has {expected} lanes")]
    RowWidth { expected: usize, got: usize },
}

/// The live rows of the level, stored row-major.
///
/// Tiles are addressed either by absolute `(row, lane)` or by a flat index
/// `(row - front_row) * lanes + lane`. Both accessors are bounds checked.
///
/// Two cursors describe the window: `front_row` is the absolute row of the
/// oldest live row and `current_length` is the row the next push will get.
/// `current_length - front_row` always equals the number of live rows.
#[derive(Debug, Clone, Default)]
pub struct RowWindow {
    lanes: usize,
    front_row: i32,
    current_length: i32,
    tiles: VecDeque<TileRecord>,
}

impl RowWindow {
    /// Empty window `lanes` tiles wide.
    pub fn new(lanes: u32) -> Self {
        Self {
            lanes: lanes as usize,
            ..Self::default()
        }
    }

    /// Tiles per row.
    pub fn lanes(&self) -> u32 {
        self.lanes as u32
    }

    /// Absolute row number of the oldest live row.
    pub fn front_row(&self) -> i32 {
        self.front_row
    }

    /// Absolute row number the next generated row will get.
    pub fn current_length(&self) -> i32 {
        self.current_length
    }

    /// Number of live rows.
    pub fn rows(&self) -> usize {
        if self.lanes == 0 {
            return 0;
        }
        self.tiles.len() / self.lanes
    }

    /// Number of live tiles.
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Whether no row is live.
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Flat index of `(row, lane)`, if live.
    pub fn flat_index(&self, row: i32, lane: u32) -> Option<usize> {
        if lane as usize >= self.lanes || row < self.front_row || row >= self.current_length {
            return None;
        }
        Some((row - self.front_row) as usize * self.lanes + lane as usize)
    }

    /// Flat index of the leftmost tile of `row`, if live.
    pub fn row_start(&self, row: i32) -> Option<usize> {
        self.flat_index(row, 0)
    }

    /// Tile at absolute `row` and `lane`, if live.
    pub fn get(&self, row: i32, lane: u32) -> Option<&TileRecord> {
        self.flat_index(row, lane).and_then(|i| self.tiles.get(i))
    }

    /// Mutable tile at absolute `row` and `lane`, if live.
    pub fn get_mut(&mut self, row: i32, lane: u32) -> Option<&mut TileRecord> {
        self.flat_index(row, lane).and_then(|i| self.tiles.get_mut(i))
    }

    /// Tile at flat index `index`, if live.
    pub fn tile(&self, index: usize) -> Option<&TileRecord> {
        self.tiles.get(index)
    }

    /// Copy of the tile at a flat index, or the invalid sentinel.
    pub fn tile_copy(&self, index: isize) -> TileRecord {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.tiles.get(i))
            .cloned()
            .unwrap_or_default()
    }

    /// Tiles of one live row, left to right.
    pub fn row(&self, row: i32) -> impl Iterator<Item = &TileRecord> {
        let start = self.row_start(row);
        let lanes = if start.is_some() { self.lanes } else { 0 };
        self.tiles.range(start.unwrap_or(0)..start.unwrap_or(0) + lanes)
    }

    /// Every live tile, row by row.
    pub fn iter(&self) -> impl Iterator<Item = &TileRecord> {
        self.tiles.iter()
    }

    /// Attach objects to the tile at a flat index. Out-of-range indices
    /// hand the objects back so the caller can destroy them.
    pub fn attach(&mut self, index: usize, objects: Vec<ObjectId>) -> Result<(), Vec<ObjectId>> {
        match self.tiles.get_mut(index) {
            Some(tile) => {
                for object in objects {
                    tile.attach(object);
                }
                Ok(())
            }
            None => Err(objects),
        }
    }

    /// Append a full row at `current_length`.
    pub fn push_row(&mut self, row: Vec<TileRecord>) -> Result<(), WindowError> {
        if row.len() != self.lanes {
            return Err(WindowError::RowWidth {
                expected: self.lanes,
                got: row.len(),
            });
        }
        self.tiles.extend(row);
        self.current_length += 1;
        Ok(())
    }

    /// Remove the oldest row and advance `front_row`.
    pub fn pop_front(&mut self) -> Option<Vec<TileRecord>> {
        if self.rows() == 0 {
            return None;
        }
        let row: Vec<TileRecord> = self.tiles.drain(..self.lanes).collect();
        self.front_row += 1;
        Some(row)
    }

    /// Remove every tile and reset both cursors to zero.
    pub fn clear(&mut self) -> Vec<TileRecord> {
        self.front_row = 0;
        self.current_length = 0;
        self.tiles.drain(..).collect()
    }

    /// Move every row number back by `rows` after an origin rebase.
    pub fn shift_rows(&mut self, rows: i32) {
        self.front_row -= rows;
        self.current_length -= rows;
        for tile in &mut self.tiles {
            tile.shift_row(rows);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tile::TileBuilder;

    fn row(row: i32, lanes: u32, height: u32) -> Vec<TileRecord> {
        (0..lanes)
            .map(|lane| TileBuilder::new(lane, row, height).build())
            .collect()
    }

    #[test]
    fn push_and_index() {
        let mut w = RowWindow::new(3);
        w.push_row(row(0, 3, 1)).unwrap();
        w.push_row(row(1, 3, 2)).unwrap();

        assert_eq!(w.rows(), 2);
        assert_eq!(w.len(), 6);
        assert_eq!(w.flat_index(1, 2), Some(5));
        assert_eq!(w.get(1, 0).unwrap().height(), 2);
        assert!(w.get(2, 0).is_none());
        assert!(w.get(0, 3).is_none());
    }

    #[test]
    fn rejects_wrong_width() {
        let mut w = RowWindow::new(3);
        let err = w.push_row(row(0, 2, 0)).unwrap_err();
        assert_eq!(err, WindowError::RowWidth { expected: 3, got: 2 });
        assert!(w.is_empty());
        assert_eq!(w.current_length(), 0);
    }

    #[test]
    fn cursors_track_live_rows() {
        let mut w = RowWindow::new(2);
        for r in 0..5 {
            w.push_row(row(r, 2, 0)).unwrap();
        }
        w.pop_front();
        w.pop_front();
        assert_eq!(w.front_row(), 2);
        assert_eq!(w.current_length(), 5);
        assert_eq!((w.current_length() - w.front_row()) as usize, w.rows());
        assert_eq!(w.get(2, 1).unwrap().row(), 2);
        assert!(w.get(1, 1).is_none());
    }

    #[test]
    fn pop_front_on_empty_window() {
        let mut w = RowWindow::new(2);
        assert!(w.pop_front().is_none());
        assert_eq!(w.front_row(), 0);
    }

    #[test]
    fn tile_copy_out_of_range_is_sentinel() {
        let mut w = RowWindow::new(1);
        w.push_row(row(0, 1, 2)).unwrap();
        assert_eq!(w.tile_copy(0).height(), 2);
        assert_eq!(w.tile_copy(-1), TileRecord::invalid());
        assert_eq!(w.tile_copy(7), TileRecord::invalid());
    }

    #[test]
    fn row_iterates_one_row() {
        let mut w = RowWindow::new(3);
        w.push_row(row(0, 3, 0)).unwrap();
        w.push_row(row(1, 3, 1)).unwrap();
        let lanes: Vec<u32> = w.row(1).map(|t| t.lane()).collect();
        assert_eq!(lanes, vec![0, 1, 2]);
        assert_eq!(w.row(9).count(), 0);
    }

    #[test]
    fn shift_rows_renumbers_everything() {
        let mut w = RowWindow::new(1);
        for r in 0..20 {
            w.push_row(row(r, 1, 0)).unwrap();
        }
        for _ in 0..15 {
            w.pop_front();
        }
        w.shift_rows(14);
        assert_eq!(w.front_row(), 1);
        assert_eq!(w.current_length(), 6);
        assert_eq!(w.get(1, 0).unwrap().row(), 1);
        assert_eq!(w.get(5, 0).unwrap().row(), 5);
    }

    #[test]
    fn attach_out_of_range_returns_objects() {
        let mut w = RowWindow::new(1);
        w.push_row(row(0, 1, 0)).unwrap();
        assert!(w.attach(0, vec![ObjectId(4)]).is_ok());
        assert_eq!(w.tile(0).unwrap().objects(), &[ObjectId(4)]);
        assert_eq!(w.attach(3, vec![ObjectId(5)]), Err(vec![ObjectId(5)]));
    }

    #[test]
    fn clear_resets_cursors() {
        let mut w = RowWindow::new(2);
        w.push_row(row(0, 2, 0)).unwrap();
        w.pop_front();
        w.push_row(row(1, 2, 0)).unwrap();
        let drained = w.clear();
        assert_eq!(drained.len(), 2);
        assert_eq!(w.front_row(), 0);
        assert_eq!(w.current_length(), 0);
    }
}
