use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Opaque identifier of a materialized scene object.
///
/// Ids are handed out by the materializer in allocation order, so a
/// seeded run produces the same ids every time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(pub u64);

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A handle referencing a piece of geometry (a prefab) the host can instantiate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GeometryHandle(pub u64);

/// Spatial transform of a materialized object: position and scale.
///
/// Tiles are axis aligned, so there is no rotation component.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub scale: Vec3,
}

impl Transform {
    /// Transform at `position` with the given scale.
    pub fn new(position: Vec3, scale: Vec3) -> Self {
        Self { position, scale }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_ids_order_by_allocation() {
        let a = ObjectId(1);
        let b = ObjectId(2);
        assert!(a < b);
        assert_eq!(format!("{a}"), "#1");
    }

    #[test]
    fn transform_default_is_identity() {
        let t = Transform::default();
        assert_eq!(t.position, Vec3::ZERO);
        assert_eq!(t.scale, Vec3::ONE);
    }
}
