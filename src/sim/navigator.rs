//! AI steering by ray casting through the spatial index
//!
//! Each tick an AI boat fires three short rays from just ahead of its bow
//! (straight ahead, and one either side) and scores what each ray runs into.
//! Scores are `distance² × collision value`, so obstacles close by score low
//! and powerups score very high; an empty ray scores the full range squared.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entity::Handle;
use super::index::SpatialIndex;
use crate::consts::*;
use crate::heading_vector;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TurnDirection {
    Left,
    #[default]
    Straight,
    Right,
}

impl TurnDirection {
    /// Signed turn amount for `PhysicsBody::turn` (left is positive heading)
    pub fn amount(self, magnitude: f32) -> f32 {
        match self {
            TurnDirection::Left => magnitude,
            TurnDirection::Straight => 0.0,
            TurnDirection::Right => -magnitude,
        }
    }
}

/// Per-boat AI state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Navigator {
    /// Fraction of max speed the AI rows up to
    pub target_speed: f32,
    /// Resting until stamina recovers
    pub regenerating: bool,
}

impl Navigator {
    pub fn new(target_speed: f32) -> Self {
        Self {
            target_speed,
            regenerating: false,
        }
    }

    /// Rowing decision with a stamina hysteresis band
    pub fn wants_to_row(&mut self, stamina: f32, speed: f32, max_speed: f32) -> bool {
        if self.regenerating {
            if stamina < AI_REGEN_STOP {
                return false;
            }
            self.regenerating = false;
        }
        if stamina <= AI_REGEN_START {
            self.regenerating = true;
            return false;
        }
        speed < self.target_speed * max_speed
    }

    /// Fire forward, left and right rays from `origin` and pick a direction.
    ///
    /// `target` resolves an indexed handle to its centre and collision value,
    /// or `None` for handles the ray should pass through (hidden, or the
    /// casting boat itself).
    pub fn scan<F>(origin: Vec2, heading: f32, index: &SpatialIndex<Handle>, mut target: F) -> TurnDirection
    where
        F: FnMut(Handle) -> Option<(Vec2, f32)>,
    {
        let left = cast_ray(origin, heading + RAY_SEPARATION_DEG, index, &mut target);
        let forward = cast_ray(origin, heading, index, &mut target);
        let right = cast_ray(origin, heading - RAY_SEPARATION_DEG, index, &mut target);
        evaluate_turn(left, forward, right)
    }
}

/// Score a single ray.
///
/// Steps along the ray from `origin` in `RAY_STEP` increments. At each step
/// the leaf the point falls in is searched for an entity whose centre lies
/// within `RAY_DETECTION_RADIUS`; the first such entity ends the ray.
pub fn cast_ray<F>(origin: Vec2, angle_deg: f32, index: &SpatialIndex<Handle>, mut target: F) -> f32
where
    F: FnMut(Handle) -> Option<(Vec2, f32)>,
{
    let dir = heading_vector(angle_deg);
    let radius_sq = RAY_DETECTION_RADIUS * RAY_DETECTION_RADIUS;

    let mut distance = 0.0;
    while distance < RAY_RANGE {
        let p = origin + dir * distance;
        for &handle in index.get(p) {
            let Some((centre, value)) = target(handle) else {
                continue;
            };
            if p.distance_squared(centre) <= radius_sq {
                return origin.distance_squared(centre) * value;
            }
        }
        distance += RAY_STEP;
    }

    // Empty ray; measured past the furthest centre a hit can report so it
    // outscores every avoid-class hit, then nudged toward the course direction
    let reach = RAY_RANGE + RAY_DETECTION_RADIUS;
    reach * reach * (1.0 + FORWARD_BIAS * dir.y.max(0.0))
}

/// Choose a direction from three ray scores (larger is better)
pub fn evaluate_turn(left: f32, forward: f32, right: f32) -> TurnDirection {
    let closest = left.min(forward).min(right);
    let furthest = left.max(forward).max(right);

    if closest > 0.0 {
        return if forward == furthest {
            TurnDirection::Straight
        } else if left == furthest {
            TurnDirection::Left
        } else {
            TurnDirection::Right
        };
    }

    // Something must be avoided: steer away from the worst side
    match (left == closest, right == closest) {
        (true, false) => TurnDirection::Right,
        (false, true) => TurnDirection::Left,
        (true, true) => TurnDirection::Straight,
        // Forward is the worst; take the better side
        (false, false) => {
            if left >= right {
                TurnDirection::Left
            } else {
                TurnDirection::Right
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::{LaneObject, PowerupKind, collision_value};

    fn index_with(objects: &[LaneObject]) -> SpatialIndex<Handle> {
        let mut index = SpatialIndex::build(200.0, 200.0, Vec2::new(-100.0, -100.0));
        for (i, o) in objects.iter().enumerate() {
            index.add(o.body.position, Handle::Object(i));
        }
        index
    }

    fn resolve(objects: &[LaneObject]) -> impl FnMut(Handle) -> Option<(Vec2, f32)> + '_ {
        move |h| match h {
            Handle::Object(i) => objects.get(i).filter(|o| o.shown).map(|o| (o.body.centre(), o.collision_value())),
            Handle::Boat(_) => None,
        }
    }

    fn empty_score(angle: f32) -> f32 {
        let index = SpatialIndex::build(200.0, 200.0, Vec2::new(-100.0, -100.0));
        cast_ray(Vec2::ZERO, angle, &index, |_| None)
    }

    #[test]
    fn test_clear_case_prefers_furthest() {
        assert_eq!(evaluate_turn(100.0, 50.0, 10.0), TurnDirection::Left);
        assert_eq!(evaluate_turn(10.0, 50.0, 100.0), TurnDirection::Right);
        assert_eq!(evaluate_turn(10.0, 100.0, 50.0), TurnDirection::Straight);
    }

    #[test]
    fn test_avoid_case_turns_away_from_worst() {
        assert_eq!(evaluate_turn(-50.0, 10.0, 5.0), TurnDirection::Right);
        assert_eq!(evaluate_turn(5.0, 10.0, -50.0), TurnDirection::Left);
        // Forward worst: take the better side
        assert_eq!(evaluate_turn(3.0, -10.0, 7.0), TurnDirection::Right);
        // Both sides equally bad
        assert_eq!(evaluate_turn(-5.0, 10.0, -5.0), TurnDirection::Straight);
    }

    #[test]
    fn test_branch_ahead_scores_below_empty_ray() {
        let objects = [LaneObject::branch(Vec2::new(-30.0, 60.0), 0.0)];
        let index = index_with(&objects);
        let score = cast_ray(Vec2::new(0.0, 10.0), 0.0, &index, resolve(&objects));
        assert!(score < empty_score(0.0));
    }

    #[test]
    fn test_powerup_ahead_scores_above_empty_ray() {
        let objects = [LaneObject::powerup(Vec2::new(-16.0, 60.0), PowerupKind::Boost)];
        let index = index_with(&objects);
        let score = cast_ray(Vec2::new(0.0, 10.0), 0.0, &index, resolve(&objects));
        assert!(score > empty_score(0.0));
    }

    #[test]
    fn test_hidden_objects_are_transparent() {
        let mut objects = [LaneObject::branch(Vec2::new(-30.0, 60.0), 0.0)];
        objects[0].shown = false;
        let index = index_with(&objects);
        let score = cast_ray(Vec2::new(0.0, 10.0), 0.0, &index, resolve(&objects));
        assert_eq!(score, empty_score(0.0));
    }

    #[test]
    fn test_object_beside_ray_is_missed() {
        let objects = [LaneObject::branch(Vec2::new(60.0, 60.0), 0.0)];
        let index = index_with(&objects);
        let score = cast_ray(Vec2::new(0.0, 10.0), 0.0, &index, resolve(&objects));
        assert_eq!(score, empty_score(0.0));
    }

    #[test]
    fn test_empty_ray_biased_forward() {
        assert!(empty_score(0.0) > empty_score(35.0));
        assert!((empty_score(35.0) - empty_score(-35.0)).abs() < 1e-2);
        let reach = RAY_RANGE + RAY_DETECTION_RADIUS;
        assert_eq!(empty_score(135.0), reach * reach);
    }

    /// Index and resolver holding a single rival boat centred at `centre`
    fn rival_boat(centre: Vec2) -> (SpatialIndex<Handle>, impl FnMut(Handle) -> Option<(Vec2, f32)>) {
        let mut index = SpatialIndex::build(400.0, 400.0, Vec2::new(-200.0, -200.0));
        index.add(centre, Handle::Boat(0));
        let target = move |h: Handle| match h {
            Handle::Boat(0) => Some((centre, collision_value::BOAT)),
            _ => None,
        };
        (index, target)
    }

    #[test]
    fn test_boat_at_edge_of_range_scores_below_empty_ray() {
        // Caught by the last step, with its centre a full radius further out
        let centre = heading_vector(0.0) * 150.0;
        let (index, target) = rival_boat(centre);
        let score = cast_ray(Vec2::ZERO, 0.0, &index, target);
        assert_eq!(score, 150.0 * 150.0);
        assert!(score < empty_score(0.0));
        assert!(score < empty_score(RAY_SEPARATION_DEG));
    }

    #[test]
    fn test_scan_does_not_steer_into_rival_boat() {
        let centre = heading_vector(RAY_SEPARATION_DEG) * 150.0;
        let (index, target) = rival_boat(centre);
        let turn = Navigator::scan(Vec2::ZERO, 0.0, &index, target);
        assert_ne!(turn, TurnDirection::Left);
        assert_eq!(turn, TurnDirection::Straight);
    }

    #[test]
    fn test_scan_steers_toward_powerup() {
        // Pickup up and to the left, inside the left ray's path
        let dir = heading_vector(RAY_SEPARATION_DEG);
        let pos = dir * 100.0 - Vec2::splat(16.0);
        let objects = [LaneObject::powerup(pos, PowerupKind::Stamina)];
        let index = index_with(&objects);
        let turn = Navigator::scan(Vec2::ZERO, 0.0, &index, resolve(&objects));
        assert_eq!(turn, TurnDirection::Left);
    }

    #[test]
    fn test_rowing_hysteresis() {
        let mut nav = Navigator::new(0.9);
        assert!(nav.wants_to_row(1.0, 0.0, 20.0));
        // At target speed: coast
        assert!(!nav.wants_to_row(1.0, 18.0, 20.0));

        assert!(!nav.wants_to_row(0.1, 0.0, 20.0));
        assert!(nav.regenerating);
        // Still resting inside the band
        assert!(!nav.wants_to_row(0.3, 0.0, 20.0));
        assert!(nav.wants_to_row(0.5, 0.0, 20.0));
        assert!(!nav.regenerating);
    }

    #[test]
    fn test_turn_amount_sign() {
        assert_eq!(TurnDirection::Left.amount(3.0), 3.0);
        assert_eq!(TurnDirection::Right.amount(3.0), -3.0);
        assert_eq!(TurnDirection::Straight.amount(3.0), 0.0);
    }
}
