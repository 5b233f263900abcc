//! Kinematic state shared by every moving entity

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::{heading_vector, normalize_heading};

/// Position, heading and scalar speed of an entity.
///
/// `position` is the bottom-left corner of the entity's sprite; collision and
/// ray geometry rotate about `centre()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysicsBody {
    pub position: Vec2,
    pub width: f32,
    pub height: f32,
    /// Degrees, 0 = down the course (+Y), positive turns toward -X
    pub heading: f32,
    pub speed: f32,
    pub max_speed: f32,
    /// Passive deceleration per second
    pub drag: f32,
    /// Speed gained per second while driven
    pub acceleration: f32,
    pub rotation_speed: f32,
}

impl PhysicsBody {
    pub fn new(position: Vec2, width: f32, height: f32) -> Self {
        Self {
            position,
            width,
            height,
            heading: 0.0,
            speed: 0.0,
            max_speed: DEFAULT_MAX_SPEED,
            drag: DEFAULT_DRAG,
            acceleration: DEFAULT_ACCELERATION,
            rotation_speed: DEFAULT_ROTATION_SPEED,
        }
    }

    pub fn with_heading(mut self, heading: f32) -> Self {
        self.heading = normalize_heading(heading);
        self
    }

    #[inline]
    pub fn centre(&self) -> Vec2 {
        self.position + Vec2::new(self.width / 2.0, self.height / 2.0)
    }

    /// Unit vector along the current heading
    #[inline]
    pub fn forward(&self) -> Vec2 {
        heading_vector(self.heading)
    }

    pub fn accelerate(&mut self, dt: f32) {
        self.speed = (self.speed + self.acceleration * dt).min(self.max_speed);
    }

    pub fn apply_drag(&mut self, dt: f32) {
        self.speed = (self.speed - self.drag * dt).max(0.0);
    }

    /// `amount` is a direction scale (e.g. ±1 or a fixed turn constant)
    pub fn turn(&mut self, dt: f32, amount: f32) {
        self.heading = normalize_heading(self.heading + amount * self.rotation_speed * dt);
    }

    /// Translate by `speed` along the heading
    pub fn advance(&mut self) {
        self.position += self.forward() * self.speed;
    }

    /// Move then drag, applied once per tick whether or not the body was driven
    pub fn integrate(&mut self, dt: f32) {
        self.advance();
        self.apply_drag(dt);
    }

    /// Add to speed, clamped to [0, max_speed]
    pub fn change_speed(&mut self, delta: f32) {
        self.speed = (self.speed + delta).clamp(0.0, self.max_speed.max(0.0));
    }

    /// Adjust top speed within [floor, ceiling]; current speed follows it down
    pub fn change_max_speed(&mut self, delta: f32, floor: f32, ceiling: f32) {
        self.max_speed = (self.max_speed + delta).clamp(floor, ceiling.max(floor));
        self.speed = self.speed.min(self.max_speed);
    }

    /// Zero speed and heading, as when entering a lane at the start of a leg
    pub fn reset_motion(&mut self) {
        self.speed = 0.0;
        self.heading = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn body() -> PhysicsBody {
        PhysicsBody::new(Vec2::ZERO, 10.0, 20.0)
    }

    #[test]
    fn test_move_forward_along_y() {
        let mut b = body();
        b.speed = 3.0;
        b.advance();
        assert!(b.position.x.abs() < 1e-5);
        assert!((b.position.y - 3.0).abs() < 1e-5);
    }

    #[test]
    fn test_positive_heading_moves_left() {
        let mut b = body().with_heading(90.0);
        b.speed = 2.0;
        b.advance();
        assert!((b.position.x + 2.0).abs() < 1e-5);
        assert!(b.position.y.abs() < 1e-5);
    }

    #[test]
    fn test_drag_floors_at_zero() {
        let mut b = body();
        b.speed = 0.01;
        b.apply_drag(1.0);
        assert_eq!(b.speed, 0.0);
    }

    #[test]
    fn test_integrate_moves_before_drag() {
        let mut b = body();
        b.speed = 5.0;
        b.integrate(1.0);
        // Full pre-drag speed was used for the step
        assert!((b.position.y - 5.0).abs() < 1e-5);
        assert!((b.speed - (5.0 - DEFAULT_DRAG)).abs() < 1e-5);
    }

    #[test]
    fn test_turn_scales_by_rotation_speed() {
        let mut b = body();
        b.turn(0.5, 2.0);
        assert!((b.heading - 2.0 * DEFAULT_ROTATION_SPEED * 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_reset_motion() {
        let mut b = body().with_heading(33.0);
        b.speed = 7.0;
        b.reset_motion();
        assert_eq!(b.speed, 0.0);
        assert_eq!(b.heading, 0.0);
    }

    #[test]
    fn test_change_max_speed_respects_floor() {
        let mut b = body();
        b.speed = b.max_speed;
        for _ in 0..100 {
            b.change_max_speed(-1.0, MIN_MAX_SPEED, 20.0);
        }
        assert_eq!(b.max_speed, MIN_MAX_SPEED);
        assert!(b.speed <= b.max_speed);
    }

    proptest! {
        #[test]
        fn prop_accelerate_converges_to_max(dt in 0.001f32..0.5, steps in 1usize..2000) {
            let mut b = body();
            let mut last = 0.0;
            for _ in 0..steps {
                b.accelerate(dt);
                prop_assert!(b.speed <= b.max_speed);
                prop_assert!(b.speed >= last);
                last = b.speed;
            }
            // Long enough runs must pin to the cap exactly
            let needed = (b.max_speed / (b.acceleration * dt)).ceil() as usize;
            if steps >= needed + 2 {
                prop_assert_eq!(b.speed, b.max_speed);
            }
        }

        #[test]
        fn prop_change_speed_stays_in_range(deltas in proptest::collection::vec(-50.0f32..50.0, 1..50)) {
            let mut b = body();
            for d in deltas {
                b.change_speed(d);
                prop_assert!(b.speed >= 0.0 && b.speed <= b.max_speed);
            }
        }
    }
}
