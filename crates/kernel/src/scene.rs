use glam::Vec3;
use runway_common::{GeometryHandle, ObjectId, Transform};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::materializer::Materializer;

/// An event record produced by every mutation to the scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SceneEvent {
    /// Geometry was instantiated as a new object.
    Materialized {
        id: ObjectId,
        geometry: GeometryHandle,
        transform: Transform,
    },
    /// Object was destroyed. Carries the transform it had.
    Destroyed { id: ObjectId, transform: Transform },
    /// Object was moved.
    Moved { id: ObjectId, old: Vec3, new: Vec3 },
    /// Object was enabled or disabled.
    Toggled { id: ObjectId, active: bool },
}

/// Per-object data stored in the scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneObject {
    pub geometry: GeometryHandle,
    pub transform: Transform,
    pub active: bool,
}

/// In-memory scene: the reference [`Materializer`].
///
/// Stands in for the host engine in the CLI and in tests. Uses BTreeMap for
/// deterministic iteration, and hands out ids from a counter so that the same
/// sequence of calls always yields the same ids.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scene {
    objects: BTreeMap<ObjectId, SceneObject>,
    next_id: u64,
    /// Append-only event log of all mutations.
    #[serde(skip)]
    event_log: Vec<SceneEvent>,
}

impl Scene {
    /// Create an empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live objects.
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Number of live objects that are currently enabled.
    pub fn active_count(&self) -> usize {
        self.objects.values().filter(|o| o.active).count()
    }

    /// Read-only access to all objects.
    pub fn objects(&self) -> &BTreeMap<ObjectId, SceneObject> {
        &self.objects
    }

    /// Get a reference to object data.
    pub fn get(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.get(&id)
    }

    /// Drain and return the event log.
    pub fn drain_events(&mut self) -> Vec<SceneEvent> {
        std::mem::take(&mut self.event_log)
    }

    /// Read-only access to the event log.
    pub fn events(&self) -> &[SceneEvent] {
        &self.event_log
    }

    /// Count live objects built from `geometry`.
    pub fn count_geometry(&self, geometry: GeometryHandle) -> usize {
        self.objects
            .values()
            .filter(|o| o.geometry == geometry)
            .count()
    }

    /// Compute a deterministic hash of the scene for comparison.
    /// Uses canonical (BTreeMap) iteration order.
    pub fn state_hash(&self) -> u64 {
        let mut h: u64 = 0xcbf2_9ce4_8422_2325; // FNV offset basis
        let mix = |h: &mut u64, bytes: &[u8]| {
            for &b in bytes {
                *h ^= b as u64;
                *h = h.wrapping_mul(0x0100_0000_01b3);
            }
        };
        for (id, obj) in &self.objects {
            mix(&mut h, &id.0.to_le_bytes());
            mix(&mut h, &obj.geometry.0.to_le_bytes());
            mix(&mut h, &[obj.active as u8]);
            for v in obj.transform.position.to_array() {
                mix(&mut h, &v.to_le_bytes());
            }
            for v in obj.transform.scale.to_array() {
                mix(&mut h, &v.to_le_bytes());
            }
        }
        h
    }
}

impl Materializer for Scene {
    fn materialize(&mut self, geometry: GeometryHandle, position: Vec3, scale: Vec3) -> ObjectId {
        let id = ObjectId(self.next_id);
        self.next_id += 1;
        let transform = Transform::new(position, scale);
        self.objects.insert(
            id,
            SceneObject {
                geometry,
                transform,
                active: true,
            },
        );
        self.event_log.push(SceneEvent::Materialized {
            id,
            geometry,
            transform,
        });
        id
    }

    fn set_active(&mut self, object: ObjectId, active: bool) {
        let Some(obj) = self.objects.get_mut(&object) else {
            tracing::trace!(%object, "toggle on unknown object ignored");
            return;
        };
        if obj.active != active {
            obj.active = active;
            self.event_log.push(SceneEvent::Toggled { id: object, active });
        }
    }

    fn destroy(&mut self, object: ObjectId) {
        if let Some(obj) = self.objects.remove(&object) {
            self.event_log.push(SceneEvent::Destroyed {
                id: object,
                transform: obj.transform,
            });
        } else {
            tracing::trace!(%object, "destroy on unknown object ignored");
        }
    }

    fn position(&self, object: ObjectId) -> Option<Vec3> {
        self.objects.get(&object).map(|o| o.transform.position)
    }

    fn set_position(&mut self, object: ObjectId, position: Vec3) {
        if let Some(obj) = self.objects.get_mut(&object) {
            let old = obj.transform.position;
            obj.transform.position = position;
            self.event_log.push(SceneEvent::Moved {
                id: object,
                old,
                new: position,
            });
        }
    }
}
