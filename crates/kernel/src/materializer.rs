use glam::Vec3;
use runway_common::{GeometryHandle, ObjectId};

/// Host capability for turning geometry into live scene objects.
///
/// The generator never instantiates anything itself. It asks the host to
/// materialize geometry, toggles or destroys what it got back, and moves
/// objects during an origin rebase. Implementations must treat unknown ids
/// as a no-op: a stale handle must never take the simulation step down.
pub trait Materializer {
    /// Instantiate `geometry` at `position` with the given `scale`.
    fn materialize(&mut self, geometry: GeometryHandle, position: Vec3, scale: Vec3) -> ObjectId;

    /// Enable or disable an object without destroying it.
    fn set_active(&mut self, object: ObjectId, active: bool);

    /// Destroy an object. Destroyed ids are never reused.
    fn destroy(&mut self, object: ObjectId);

    /// Current world position, or `None` for an unknown id.
    fn position(&self, object: ObjectId) -> Option<Vec3>;

    /// Move an object to a new world position.
    fn set_position(&mut self, object: ObjectId, position: Vec3);
}
