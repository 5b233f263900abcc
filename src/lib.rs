//! Pixel Regatta - a multi-lane boat race simulation
//!
//! Core modules:
//! - `sim`: Deterministic race engine (spatial index, physics, collisions, AI, leg lifecycle)
//! - `settings`: Difficulty levels and race configuration
//! - `standings`: Leg-time leaderboard
//! - `championship`: Multi-leg race progression
//! - `persistence`: Save record encoding

pub mod championship;
pub mod persistence;
pub mod settings;
pub mod sim;
pub mod standings;

pub use championship::{Championship, ChampionshipPhase};
pub use settings::{DifficultyLevel, RaceSettings};
pub use standings::Standings;

use glam::Vec2;

/// Simulation constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;

    /// Default movement tuning for every physics body
    pub const DEFAULT_MAX_SPEED: f32 = 15.0;
    pub const DEFAULT_DRAG: f32 = 2.4;
    pub const DEFAULT_ACCELERATION: f32 = 5.0;
    pub const DEFAULT_ROTATION_SPEED: f32 = 10.0;

    /// Boat sprite size
    pub const BOAT_WIDTH: f32 = 80.0;
    pub const BOAT_HEIGHT: f32 = 100.0;
    /// Repeated hits can never push a boat's top speed below this
    pub const MIN_MAX_SPEED: f32 = 5.0;
    /// Speed lost on impact, as a multiple of the per-hit top speed loss
    pub const IMPACT_SPEED_FACTOR: f32 = 2.0;

    /// Powerup tuning
    pub const BOOST_ACCELERATION_FACTOR: f32 = 90.0;
    pub const REPAIR_DURABILITY_FACTOR: f32 = 3.0;
    pub const REPAIR_MAX_SPEED_FACTOR: f32 = 2.0;
    pub const STAMINA_RESTORE: f32 = 0.5;
    /// Seconds knocked off the leg clock by a Time powerup
    pub const TIME_BONUS_SECS: f32 = 5.0;
    /// Forward jump applied by a Teleport powerup
    pub const TELEPORT_DISTANCE: f32 = 250.0;

    /// AI ray casting
    pub const RAY_RANGE: f32 = 140.0;
    /// Smaller than the smallest obstacle so a ray can't step over one
    pub const RAY_STEP: f32 = 29.0;
    pub const RAY_DETECTION_RADIUS: f32 = 40.0;
    /// Angle between the forward ray and each side ray (degrees)
    pub const RAY_SEPARATION_DEG: f32 = 35.0;
    /// Fire point distance in front of the bow
    pub const RAY_BOW_OFFSET: f32 = 5.0;
    /// Extra weight given to an empty ray pointing straight down the course
    pub const FORWARD_BIAS: f32 = 0.01;
    pub const AI_TURN_AMOUNT: f32 = 3.0;
    /// Stamina hysteresis band for AI rowing
    pub const AI_REGEN_START: f32 = 0.1;
    pub const AI_REGEN_STOP: f32 = 0.5;

    /// Player controls
    pub const PLAYER_TURN_AMOUNT: f32 = 15.0;
    pub const FORWARD_LOCK_SECS: f32 = 1.0;

    /// Animation
    pub const BOAT_ANIMATION_FRAMES: u32 = 4;
    pub const TICKS_PER_ANIMATION_FRAME: u32 = 15;

    /// Unfinished-boat estimation (ms per unit of distance per unit of speed)
    pub const ESTIMATE_BIAS_MS: f32 = 67.0;
    pub const ESTIMATE_JITTER: f32 = 0.05;

    /// Shadow times for boats outside the heat
    pub const SHADOW_TIME_BASE_MS: u32 = 65_000;
    pub const SHADOW_TIME_SPREAD_MS: u32 = 10_000;
}

/// Unit direction for a heading in degrees.
///
/// Heading 0 points down the course (+Y); increasing heading sweeps toward -X.
#[inline]
pub fn heading_vector(heading_deg: f32) -> Vec2 {
    let (sin, cos) = heading_deg.to_radians().sin_cos();
    Vec2::new(-sin, cos)
}

/// Rotate `point` counter-clockwise about `origin` by `angle_deg`
#[inline]
pub fn rotate_about(point: Vec2, origin: Vec2, angle_deg: f32) -> Vec2 {
    let (sin, cos) = angle_deg.to_radians().sin_cos();
    let d = point - origin;
    origin + Vec2::new(d.x * cos - d.y * sin, d.x * sin + d.y * cos)
}

/// Normalize a heading to [-180, 180)
#[inline]
pub fn normalize_heading(mut heading: f32) -> f32 {
    while heading >= 180.0 {
        heading -= 360.0;
    }
    while heading < -180.0 {
        heading += 360.0;
    }
    heading
}
