use glam::Vec3;
use serde::Serialize;

/// The thing the level streams around, usually the player.
pub trait Subject {
    fn position(&self) -> Vec3;
    fn set_position(&mut self, position: Vec3);
    /// Lane the subject currently occupies.
    fn lane(&self) -> u32;
}

/// A subject that runs forward at constant speed and switches lanes on
/// request. Used by the CLI and tests in place of a real player.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Runner {
    position: Vec3,
    lane: u32,
    lanes: u32,
    lane_width: f32,
    /// Forward speed in world units per second.
    pub speed: f32,
}

impl Runner {
    /// Runner at `z = 0` in the centre lane.
    pub fn new(lanes: u32, lane_width: f32, speed: f32) -> Self {
        let lane = lanes / 2;
        Self {
            position: Vec3::new(lane as f32 * lane_width, 0.0, 0.0),
            lane,
            lanes,
            lane_width,
            speed,
        }
    }

    /// Move forward by `speed * dt`.
    pub fn advance(&mut self, dt: f32) {
        self.position.z += self.speed * dt;
    }

    /// Step `delta` lanes sideways, clamped to the runway.
    pub fn change_lane(&mut self, delta: i32) {
        let last = self.lanes.saturating_sub(1) as i64;
        self.lane = (self.lane as i64 + delta as i64).clamp(0, last) as u32;
        self.position.x = self.lane as f32 * self.lane_width;
    }
}

impl Subject for Runner {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    fn lane(&self) -> u32 {
        self.lane
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_in_middle_lane() {
        let r = Runner::new(5, 2.0, 10.0);
        assert_eq!(r.lane(), 2);
        assert_eq!(r.position(), Vec3::new(4.0, 0.0, 0.0));
    }

    #[test]
    fn advance_moves_forward() {
        let mut r = Runner::new(3, 2.0, 10.0);
        r.advance(0.5);
        r.advance(0.5);
        assert_eq!(r.position().z, 10.0);
    }

    #[test]
    fn lane_changes_are_clamped() {
        let mut r = Runner::new(3, 2.0, 1.0);
        r.change_lane(-5);
        assert_eq!(r.lane(), 0);
        assert_eq!(r.position().x, 0.0);
        r.change_lane(7);
        assert_eq!(r.lane(), 2);
        assert_eq!(r.position().x, 4.0);
    }
}
