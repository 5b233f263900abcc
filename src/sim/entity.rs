//! Lane objects: obstacles, lane dividers and powerups
//!
//! Everything on the course that is not a boat. Objects live in an arena on
//! the race state and are addressed by `Handle::Object(index)`; a consumed
//! object is hidden in place rather than removed, so handles stay valid for
//! the whole leg.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::body::PhysicsBody;
use super::bounds::{Bounds, Rect};

/// Stable address of a collidable entity within one leg
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Handle {
    Boat(usize),
    Object(usize),
}

/// AI navigation weights (larger = more attractive per unit squared distance)
pub mod collision_value {
    pub const BOAT: f32 = 1.0;
    pub const OBSTACLE: f32 = 0.5;
    /// Dividers must be crossed to progress, so they are all but ignored
    pub const LANE_WALL: f32 = 0.0001;
    pub const POWERUP: f32 = 500_000.0;
}

/// Segment height of a lane divider
pub const LANE_WALL_HEIGHT: f32 = 64.0;
pub const LANE_WALL_WIDTH: f32 = 32.0;
pub const BRANCH_SIZE: f32 = 60.0;
pub const DUCK_SIZE: f32 = 30.0;
pub const POWERUP_SIZE: f32 = 32.0;

const DUCK_SPEED: f32 = 0.2;
const DUCK_ROTATION_SPEED: f32 = 0.2;
const DUCK_TURN_AMOUNT: f32 = 5.0;
const FLOATING_BRANCH_SPEED: f32 = 0.3;

/// Single-use hazards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObstacleKind {
    Branch,
    FloatingBranch,
    Duck,
}

/// Powerup effect, applied to the boat that collects it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerupKind {
    Repair,
    Boost,
    Stamina,
    Time,
    Teleport,
}

impl PowerupKind {
    pub const ALL: [PowerupKind; 5] = [
        PowerupKind::Repair,
        PowerupKind::Boost,
        PowerupKind::Stamina,
        PowerupKind::Time,
        PowerupKind::Teleport,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ObjectKind {
    Obstacle(ObstacleKind),
    /// Indestructible divider; `struck` is the cosmetic hit frame for this tick
    LaneWall { struck: bool },
    Powerup(PowerupKind),
}

/// What a boat ran into, as seen by the boat's collision response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contact {
    LaneWall,
    Obstacle,
    Powerup(PowerupKind),
    Boat,
}

/// A non-boat entity on the course
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaneObject {
    pub kind: ObjectKind,
    pub body: PhysicsBody,
    pub shown: bool,
    /// Point the object is currently filed under in the spatial index
    #[serde(skip)]
    pub(crate) indexed_at: Option<Vec2>,
}

impl LaneObject {
    fn new(kind: ObjectKind, body: PhysicsBody) -> Self {
        Self {
            kind,
            body,
            shown: true,
            indexed_at: None,
        }
    }

    pub fn branch(position: Vec2, heading: f32) -> Self {
        let body = PhysicsBody::new(position, BRANCH_SIZE, BRANCH_SIZE).with_heading(heading);
        Self::new(ObjectKind::Obstacle(ObstacleKind::Branch), body)
    }

    /// Branch carried by the current at a constant slow speed
    pub fn floating_branch(position: Vec2, heading: f32) -> Self {
        let mut body = PhysicsBody::new(position, BRANCH_SIZE, BRANCH_SIZE).with_heading(heading);
        body.drag = 0.0;
        body.speed = FLOATING_BRANCH_SPEED;
        Self::new(ObjectKind::Obstacle(ObstacleKind::FloatingBranch), body)
    }

    /// Duck paddling in slow circles
    pub fn duck(position: Vec2, heading: f32) -> Self {
        let mut body = PhysicsBody::new(position, DUCK_SIZE, DUCK_SIZE).with_heading(heading);
        body.drag = 0.0;
        body.speed = DUCK_SPEED;
        body.rotation_speed = DUCK_ROTATION_SPEED;
        Self::new(ObjectKind::Obstacle(ObstacleKind::Duck), body)
    }

    pub fn lane_wall(position: Vec2) -> Self {
        let body = PhysicsBody::new(position, LANE_WALL_WIDTH, LANE_WALL_HEIGHT);
        Self::new(ObjectKind::LaneWall { struck: false }, body)
    }

    pub fn powerup(position: Vec2, kind: PowerupKind) -> Self {
        let body = PhysicsBody::new(position, POWERUP_SIZE, POWERUP_SIZE);
        Self::new(ObjectKind::Powerup(kind), body)
    }

    pub fn collision_value(&self) -> f32 {
        match self.kind {
            ObjectKind::Obstacle(_) => collision_value::OBSTACLE,
            ObjectKind::LaneWall { .. } => collision_value::LANE_WALL,
            ObjectKind::Powerup(_) => collision_value::POWERUP,
        }
    }

    pub fn contact(&self) -> Contact {
        match self.kind {
            ObjectKind::Obstacle(_) => Contact::Obstacle,
            ObjectKind::LaneWall { .. } => Contact::LaneWall,
            ObjectKind::Powerup(kind) => Contact::Powerup(kind),
        }
    }

    pub fn is_struck(&self) -> bool {
        matches!(self.kind, ObjectKind::LaneWall { struck: true })
    }

    /// Collision hull for the current body state
    pub fn bounds(&self) -> Bounds {
        let b = &self.body;
        let (x, y, w, h) = (b.position.x, b.position.y, b.width, b.height);
        match self.kind {
            ObjectKind::Obstacle(ObstacleKind::Branch | ObstacleKind::FloatingBranch) => {
                Bounds::new(b.heading, b.centre())
                    .with_rect(Rect::new(x + 0.31 * w, y + 0.06 * h, 0.31 * w, 0.88 * h))
            }
            ObjectKind::Obstacle(ObstacleKind::Duck) => Bounds::new(b.heading, b.centre())
                .with_rect(Rect::new(x + 0.09 * w, y + 0.13 * h, 0.41 * w, 0.4 * h))
                .with_rect(Rect::new(x + 0.5 * w, y + 0.13 * h, 0.31 * w, 0.75 * h)),
            // Dividers and pickups use their whole unrotated sprite
            ObjectKind::LaneWall { .. } | ObjectKind::Powerup(_) => {
                Bounds::single(Rect::new(x, y, w, h))
            }
        }
    }

    /// Advance one tick; returns true if the object moved
    pub fn advance(&mut self, dt: f32) -> bool {
        if let ObjectKind::LaneWall { struck } = &mut self.kind {
            *struck = false;
            return false;
        }
        if matches!(self.kind, ObjectKind::Obstacle(ObstacleKind::Duck)) {
            self.body.turn(dt, DUCK_TURN_AMOUNT);
        }
        if self.body.speed <= 0.0 {
            return false;
        }
        self.body.integrate(dt);
        true
    }

    /// Response to being hit by a boat
    pub fn on_hit(&mut self) {
        match &mut self.kind {
            ObjectKind::LaneWall { struck } => *struck = true,
            ObjectKind::Obstacle(_) | ObjectKind::Powerup(_) => self.shown = false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;

    #[test]
    fn test_collision_values_order() {
        let wall = LaneObject::lane_wall(Vec2::ZERO);
        let branch = LaneObject::branch(Vec2::ZERO, 0.0);
        let pickup = LaneObject::powerup(Vec2::ZERO, PowerupKind::Boost);
        assert!(wall.collision_value() < branch.collision_value());
        assert!(branch.collision_value() < collision_value::BOAT);
        assert!(pickup.collision_value() > collision_value::BOAT);
    }

    #[test]
    fn test_obstacle_and_powerup_are_single_use() {
        let mut branch = LaneObject::branch(Vec2::ZERO, 10.0);
        branch.on_hit();
        assert!(!branch.shown);

        let mut pickup = LaneObject::powerup(Vec2::ZERO, PowerupKind::Time);
        pickup.on_hit();
        assert!(!pickup.shown);
    }

    #[test]
    fn test_lane_wall_is_indestructible() {
        let mut wall = LaneObject::lane_wall(Vec2::ZERO);
        wall.on_hit();
        assert!(wall.shown);
        assert!(wall.is_struck());

        // Struck frame lasts one tick
        assert!(!wall.advance(SIM_DT));
        assert!(!wall.is_struck());
    }

    #[test]
    fn test_duck_keeps_constant_speed() {
        let mut duck = LaneObject::duck(Vec2::new(0.0, 500.0), 0.0);
        let start = duck.body.position;
        for _ in 0..60 {
            assert!(duck.advance(SIM_DT));
        }
        assert!((duck.body.speed - DUCK_SPEED).abs() < 1e-6);
        assert!(duck.body.position.distance(start) > 0.0);
        assert!(duck.body.heading != 0.0);
    }

    #[test]
    fn test_static_branch_does_not_move() {
        let mut branch = LaneObject::branch(Vec2::new(5.0, 5.0), 45.0);
        assert!(!branch.advance(SIM_DT));
        assert_eq!(branch.body.position, Vec2::new(5.0, 5.0));
    }

    #[test]
    fn test_duck_bounds_have_two_parts() {
        let duck = LaneObject::duck(Vec2::ZERO, 0.0);
        let bounds = duck.bounds();
        assert_eq!(bounds.rects.len(), 2);
        assert_eq!(bounds.origin, Vec2::new(DUCK_SIZE / 2.0, DUCK_SIZE / 2.0));
    }

    #[test]
    fn test_contact_dispatch() {
        assert_eq!(LaneObject::lane_wall(Vec2::ZERO).contact(), Contact::LaneWall);
        assert_eq!(LaneObject::duck(Vec2::ZERO, 0.0).contact(), Contact::Obstacle);
        assert_eq!(
            LaneObject::powerup(Vec2::ZERO, PowerupKind::Repair).contact(),
            Contact::Powerup(PowerupKind::Repair)
        );
    }
}
