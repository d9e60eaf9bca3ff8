use glam::Vec3;
use runway_common::ObjectId;
use runway_kernel::Materializer;
use serde::Serialize;

use crate::config::TileGeometry;

/// Errors from write-once tile operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TileError {
    #[error("tile (lane {lane}, row {row}) has already been generated")]
    AlreadyGenerated { lane: u32, row: i32 },
    #[error("tile (lane {lane}, row {row}) is generated; {field} cannot change")]
    Frozen {
        lane: u32,
        row: i32,
        field: &'static str,
    },
}

/// Sizes and offsets needed to turn (lane, row, layer) into world space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TileMetrics {
    pub lane_width: f32,
    pub layer_height: f32,
    pub tile_length: f32,
    pub lanes: u32,
    pub offset: Vec3,
}

impl TileMetrics {
    /// Point in the centre of a tile, on top of the given layer.
    pub fn surface_center(&self, lane: u32, row: i32, height: u32) -> Vec3 {
        Vec3::new(
            self.lane_width * lane as f32,
            (height as f32 + 0.5) * self.layer_height,
            row as f32 * self.tile_length,
        ) + self.offset
    }

    /// Point on the near edge of a tile (the boundary with the previous row),
    /// on top of the given layer.
    pub fn near_edge(&self, lane: u32, row: i32, height: u32) -> Vec3 {
        self.surface_center(lane, row, height) - Vec3::new(0.0, 0.0, self.tile_length / 2.0)
    }
}

/// One generated cell of the runway.
///
/// Shape fields (height, ramp, indoor section) are decided by a
/// [`TileBuilder`] and frozen once the tile's geometry has been
/// materialized. The tile owns every object attached to it; deleting the
/// tile destroys them.
///
/// `TileRecord::default()` is the sentinel "invalid" tile returned by
/// out-of-range queries: zeroed and never generated.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TileRecord {
    lane: u32,
    row: i32,
    height: u32,
    is_ramp: bool,
    has_indoors: bool,
    indoor_height: u32,
    indoor_length: i32,
    generated: bool,
    objects: Vec<ObjectId>,
}

impl TileRecord {
    /// The sentinel returned for out-of-range lookups.
    pub fn invalid() -> Self {
        Self::default()
    }

    /// Lane index, counted from the left.
    pub fn lane(&self) -> u32 {
        self.lane
    }

    /// Absolute row number ("forward point").
    pub fn row(&self) -> i32 {
        self.row
    }

    /// Surface layer.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Whether the tile climbs one layer from the previous row.
    pub fn is_ramp(&self) -> bool {
        self.is_ramp
    }

    /// Whether an indoor corridor runs under the surface.
    pub fn has_indoors(&self) -> bool {
        self.has_indoors
    }

    /// Corridor floor layer; zero without indoors.
    pub fn indoor_height(&self) -> u32 {
        self.indoor_height
    }

    /// Rows the corridor has run before this tile.
    pub fn indoor_length(&self) -> i32 {
        self.indoor_length
    }

    /// Whether the tile's geometry has been materialized.
    pub fn is_generated(&self) -> bool {
        self.generated
    }

    /// Objects owned by this tile, in attachment order.
    pub fn objects(&self) -> &[ObjectId] {
        &self.objects
    }

    /// Change the height of a tile that has not been materialized yet.
    pub fn set_height(&mut self, height: u32) -> Result<(), TileError> {
        self.ensure_mutable("height")?;
        self.height = height;
        Ok(())
    }

    /// Change the ramp flag of a tile that has not been materialized yet.
    pub fn set_ramp(&mut self, is_ramp: bool) -> Result<(), TileError> {
        self.ensure_mutable("is_ramp")?;
        self.is_ramp = is_ramp;
        Ok(())
    }

    fn ensure_mutable(&self, field: &'static str) -> Result<(), TileError> {
        if self.generated {
            tracing::error!(
                lane = self.lane,
                row = self.row,
                field,
                "tile already generated, write ignored"
            );
            return Err(TileError::Frozen {
                lane: self.lane,
                row: self.row,
                field,
            });
        }
        Ok(())
    }

    /// Materialize the ground block, plus the ramp and indoor pieces when
    /// present, and freeze the tile's shape.
    pub fn materialize(
        &mut self,
        geometry: &TileGeometry,
        metrics: &TileMetrics,
        scene: &mut dyn Materializer,
    ) -> Result<(), TileError> {
        if self.generated {
            tracing::error!(lane = self.lane, row = self.row, "cannot re-generate tile");
            return Err(TileError::AlreadyGenerated {
                lane: self.lane,
                row: self.row,
            });
        }

        let x = metrics.lane_width * self.lane as f32;
        let z = self.row as f32 * metrics.tile_length;

        // A ramp tile's block stops one layer short; the slope piece fills it.
        let block_layers = if self.is_ramp {
            self.height
        } else {
            self.height + 1
        };
        let block_center = if self.is_ramp {
            self.height.saturating_sub(1) as f32 / 2.0
        } else {
            self.height as f32 / 2.0
        };
        let ground = scene.materialize(
            geometry.ground,
            Vec3::new(x, block_center * metrics.layer_height, z) + metrics.offset,
            Vec3::new(
                metrics.lane_width,
                metrics.layer_height * block_layers as f32,
                metrics.tile_length,
            ),
        );
        self.objects.push(ground);

        let piece_scale = Vec3::new(metrics.lane_width, metrics.layer_height, metrics.tile_length);
        if self.is_ramp {
            let ramp = scene.materialize(
                geometry.ramp,
                Vec3::new(x, self.height as f32 * metrics.layer_height, z) + metrics.offset,
                piece_scale,
            );
            self.objects.push(ramp);
        }
        if self.has_indoors {
            let indoor = scene.materialize(
                geometry.indoor,
                Vec3::new(x, self.indoor_height as f32 * metrics.layer_height, z) + metrics.offset,
                piece_scale,
            );
            self.objects.push(indoor);
        }

        self.generated = true;
        Ok(())
    }

    /// Take ownership of an object placed on this tile.
    pub fn attach(&mut self, object: ObjectId) {
        self.objects.push(object);
    }

    /// Enable or disable every object on the tile.
    pub fn set_active(&self, active: bool, scene: &mut dyn Materializer) {
        for &object in &self.objects {
            scene.set_active(object, active);
        }
    }

    /// Destroy every object on the tile. The tile keeps its shape.
    pub fn destroy_objects(&mut self, scene: &mut dyn Materializer) {
        for object in self.objects.drain(..) {
            scene.destroy(object);
        }
    }

    /// Renumber the tile after an origin rebase.
    pub(crate) fn shift_row(&mut self, rows: i32) {
        self.row -= rows;
    }
}

/// Staging type for a tile whose shape is still being decided.
///
/// Terrain generation and the reachability pass edit builders freely; the
/// record produced by [`TileBuilder::build`] carries the final shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileBuilder {
    lane: u32,
    row: i32,
    height: u32,
    is_ramp: bool,
    indoor: Option<Indoor>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Indoor {
    height: u32,
    length: i32,
}

impl TileBuilder {
    /// Plain tile at `height` with no ramp or corridor.
    pub fn new(lane: u32, row: i32, height: u32) -> Self {
        Self {
            lane,
            row,
            height,
            is_ramp: false,
            indoor: None,
        }
    }

    /// Lane index, counted from the left.
    pub fn lane(&self) -> u32 {
        self.lane
    }

    /// Absolute row number.
    pub fn row(&self) -> i32 {
        self.row
    }

    /// Current surface layer.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Whether the tile is marked as a ramp.
    pub fn is_ramp(&self) -> bool {
        self.is_ramp
    }

    /// Whether a corridor is open under the surface.
    pub fn has_indoors(&self) -> bool {
        self.indoor.is_some()
    }

    /// Corridor floor layer, if a corridor is open.
    pub fn indoor_height(&self) -> Option<u32> {
        self.indoor.map(|i| i.height)
    }

    /// Set the surface layer.
    pub fn set_height(&mut self, height: u32) {
        self.height = height;
    }

    /// Turn the tile into a ramp topping out at `height`.
    pub fn make_ramp(&mut self, height: u32) {
        self.is_ramp = true;
        self.height = height;
    }

    /// Put an indoor corridor under the tile. The surface is raised if needed
    /// so that it always sits above the corridor.
    pub fn open_indoors(&mut self, height: u32, length: i32) {
        self.indoor = Some(Indoor { height, length });
        if self.height <= height {
            self.height = height + 1;
        }
    }

    /// Freeze the shape into a record ready to materialize.
    pub fn build(self) -> TileRecord {
        let (has_indoors, indoor_height, indoor_length) = match self.indoor {
            Some(i) => (true, i.height, i.length),
            None => (false, 0, 0),
        };
        TileRecord {
            lane: self.lane,
            row: self.row,
            height: self.height,
            is_ramp: self.is_ramp,
            has_indoors,
            indoor_height,
            indoor_length,
            generated: false,
            objects: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use runway_kernel::Scene;

    fn metrics() -> TileMetrics {
        TileMetrics {
            lane_width: 2.0,
            layer_height: 2.0,
            tile_length: 7.0,
            lanes: 3,
            offset: Vec3::ZERO,
        }
    }

    #[test]
    fn invalid_tile_is_zeroed() {
        let t = TileRecord::invalid();
        assert_eq!(t.height(), 0);
        assert!(!t.is_generated());
        assert!(t.objects().is_empty());
    }

    #[test]
    fn open_indoors_raises_surface_above_corridor() {
        let mut b = TileBuilder::new(0, 4, 1);
        b.open_indoors(1, 0);
        assert_eq!(b.height(), 2);
        let t = b.build();
        assert!(t.has_indoors());
        assert!(t.height() > t.indoor_height());
    }

    #[test]
    fn open_indoors_keeps_higher_surface() {
        let mut b = TileBuilder::new(0, 4, 2);
        b.open_indoors(0, 3);
        assert_eq!(b.height(), 2);
        assert_eq!(b.build().indoor_length(), 3);
    }

    #[test]
    fn materialize_plain_tile() {
        let mut scene = Scene::new();
        let geometry = TileGeometry::default();
        let mut t = TileBuilder::new(1, 2, 1).build();
        t.materialize(&geometry, &metrics(), &mut scene).unwrap();

        assert!(t.is_generated());
        assert_eq!(t.objects().len(), 1);
        let ground = scene.get(t.objects()[0]).unwrap();
        assert_eq!(ground.geometry, geometry.ground);
        assert_eq!(ground.transform.position, Vec3::new(2.0, 1.0, 14.0));
        assert_eq!(ground.transform.scale, Vec3::new(2.0, 4.0, 7.0));
    }

    #[test]
    fn materialize_ramp_and_indoor_pieces() {
        let mut scene = Scene::new();
        let geometry = TileGeometry::default();
        let mut b = TileBuilder::new(0, 0, 1);
        b.make_ramp(2);
        b.open_indoors(0, 0);
        let mut t = b.build();
        t.materialize(&geometry, &metrics(), &mut scene).unwrap();

        assert_eq!(t.objects().len(), 3);
        let ground = scene.get(t.objects()[0]).unwrap();
        assert_eq!(ground.transform.scale.y, 4.0);
        let ramp = scene.get(t.objects()[1]).unwrap();
        assert_eq!(ramp.geometry, geometry.ramp);
        assert_eq!(ramp.transform.position.y, 4.0);
        let indoor = scene.get(t.objects()[2]).unwrap();
        assert_eq!(indoor.geometry, geometry.indoor);
        assert_eq!(indoor.transform.position.y, 0.0);
    }

    #[test]
    fn write_once_after_materialize() {
        let mut scene = Scene::new();
        let mut t = TileBuilder::new(0, 0, 2).build();
        assert!(t.set_height(1).is_ok());
        t.materialize(&TileGeometry::default(), &metrics(), &mut scene)
            .unwrap();

        let err = t.set_height(0).unwrap_err();
        assert!(matches!(err, TileError::Frozen { field: "height", .. }));
        assert_eq!(t.height(), 1);

        assert!(t.set_ramp(true).is_err());
        assert!(!t.is_ramp());
    }

    #[test]
    fn second_materialize_is_a_no_op() {
        let mut scene = Scene::new();
        let mut t = TileBuilder::new(0, 0, 0).build();
        t.materialize(&TileGeometry::default(), &metrics(), &mut scene)
            .unwrap();
        let err = t
            .materialize(&TileGeometry::default(), &metrics(), &mut scene)
            .unwrap_err();
        assert_eq!(err, TileError::AlreadyGenerated { lane: 0, row: 0 });
        assert_eq!(t.objects().len(), 1);
        assert_eq!(scene.object_count(), 1);
    }

    #[test]
    fn destroy_objects_empties_tile() {
        let mut scene = Scene::new();
        let mut t = TileBuilder::new(0, 0, 0).build();
        t.materialize(&TileGeometry::default(), &metrics(), &mut scene)
            .unwrap();
        t.destroy_objects(&mut scene);
        assert!(t.objects().is_empty());
        assert_eq!(scene.object_count(), 0);
    }

    #[test]
    fn surface_center_and_near_edge() {
        let m = TileMetrics {
            offset: Vec3::new(1.0, 0.0, 0.0),
            ..metrics()
        };
        assert_eq!(m.surface_center(2, 3, 1), Vec3::new(5.0, 3.0, 21.0));
        assert_eq!(m.near_edge(2, 3, 1), Vec3::new(5.0, 3.0, 17.5));
    }
}
