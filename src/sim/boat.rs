//! Boats: durability, stamina, leg timing and collision response

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::body::PhysicsBody;
use super::bounds::{Bounds, Rect};
use super::entity::{Contact, PowerupKind};
use super::navigator::Navigator;
use crate::consts::*;

/// Progress through the current leg
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LegStatus {
    #[default]
    NotStarted,
    Racing,
    Finished,
}

/// Boat handling presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BoatClass {
    /// No stamina drain, no damage
    Debug,
    #[default]
    Standard,
    /// Faster but fragile, with slower stamina recovery
    Racer,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoatSpec {
    pub class: BoatClass,
    /// Nominal top speed, restored at every leg start
    pub max_speed: f32,
    pub durability_per_hit: f32,
    pub max_speed_per_hit: f32,
    /// Stamina drained per second of rowing
    pub stamina_usage: f32,
    /// Stamina recovered per second
    pub stamina_regen: f32,
}

impl BoatSpec {
    pub fn for_class(class: BoatClass) -> Self {
        let standard = Self {
            class,
            max_speed: 20.0,
            durability_per_hit: 0.1,
            max_speed_per_hit: 1.0,
            stamina_usage: 0.3,
            stamina_regen: 0.12,
        };
        match class {
            BoatClass::Debug => Self {
                durability_per_hit: 0.0,
                stamina_usage: 0.0,
                ..standard
            },
            BoatClass::Standard => standard,
            BoatClass::Racer => Self {
                max_speed: 25.0,
                durability_per_hit: 0.2,
                stamina_regen: 0.09,
                ..standard
            },
        }
    }
}

impl Default for BoatSpec {
    fn default() -> Self {
        Self::for_class(BoatClass::Standard)
    }
}

/// Input-side rowing lock for the player.
///
/// Releasing accelerate locks rowing for `FORWARD_LOCK_SECS`, so tapping the
/// key cannot be used to row on a full stamina bar forever.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerControl {
    forward_pressed: bool,
    forward_locked: bool,
    cooldown: f32,
    /// Navigator driving the player boat instead of live input
    pub autopilot: Option<Navigator>,
}

impl PlayerControl {
    /// Whether a requested stroke is allowed this tick
    pub fn gate(&mut self, requested: bool, dt: f32) -> bool {
        if !self.forward_locked || self.forward_pressed {
            if requested {
                self.forward_pressed = true;
                self.forward_locked = true;
                return true;
            }
            self.forward_pressed = false;
            self.cooldown = FORWARD_LOCK_SECS;
        } else {
            self.cooldown = (self.cooldown - dt).max(0.0);
            if self.cooldown < 0.001 {
                self.forward_locked = false;
            }
        }
        false
    }

    pub fn is_locked(&self) -> bool {
        self.forward_locked && !self.forward_pressed
    }
}

/// Who drives a boat
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Pilot {
    Player(PlayerControl),
    Ai(Navigator),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Boat {
    pub name: String,
    pub body: PhysicsBody,
    pub spec: BoatSpec,
    pub pilot: Pilot,
    pub status: LegStatus,
    /// Lane index in the current heat
    pub lane: usize,
    durability: f32,
    stamina: f32,
    /// Seconds on this leg's clock
    leg_elapsed: f32,
    /// Seconds added for leaving the lane
    penalty: f32,
    /// Completed leg times (ms)
    leg_times: Vec<u32>,
    rowing: bool,
    rowing_ticks: u32,
    animation_frame: u32,
    #[serde(skip)]
    pub(crate) indexed_at: Option<Vec2>,
}

impl Boat {
    pub fn new(name: impl Into<String>, spec: BoatSpec, pilot: Pilot) -> Self {
        let mut body = PhysicsBody::new(Vec2::ZERO, BOAT_WIDTH, BOAT_HEIGHT);
        body.max_speed = spec.max_speed;
        Self {
            name: name.into(),
            body,
            spec,
            pilot,
            status: LegStatus::NotStarted,
            lane: 0,
            durability: 1.0,
            stamina: 1.0,
            leg_elapsed: 0.0,
            penalty: 0.0,
            leg_times: Vec::new(),
            rowing: false,
            rowing_ticks: 0,
            animation_frame: 0,
            indexed_at: None,
        }
    }

    pub fn player(name: impl Into<String>, class: BoatClass) -> Self {
        Self::new(name, BoatSpec::for_class(class), Pilot::Player(PlayerControl::default()))
    }

    pub fn ai(name: impl Into<String>, target_speed: f32) -> Self {
        Self::new(name, BoatSpec::default(), Pilot::Ai(Navigator::new(target_speed)))
    }

    pub fn is_player(&self) -> bool {
        matches!(self.pilot, Pilot::Player(_))
    }

    /// Hand the player boat to (or take it back from) an AI navigator
    pub fn set_autopilot(&mut self, target_speed: Option<f32>) {
        if let Pilot::Player(control) = &mut self.pilot {
            control.autopilot = target_speed.map(Navigator::new);
        }
    }

    /// Nominal cruising speed, used to estimate unfinished legs
    pub fn cruise_speed(&self) -> f32 {
        let fraction = match &self.pilot {
            Pilot::Ai(nav) => nav.target_speed,
            Pilot::Player(control) => control.autopilot.as_ref().map_or(1.0, |nav| nav.target_speed),
        };
        (self.spec.max_speed * fraction).max(MIN_MAX_SPEED)
    }

    /// Restore a boat for a fresh leg, sitting still in `lane` with its bow facing the course
    pub fn prepare_for_leg(&mut self, lane: usize, lane_centre_x: f32, start_y: f32) {
        self.lane = lane;
        self.body.reset_motion();
        self.body.position = Vec2::new(lane_centre_x - self.body.width / 2.0, start_y);
        self.body.max_speed = self.spec.max_speed;
        self.durability = 1.0;
        self.stamina = 1.0;
        self.status = LegStatus::NotStarted;
        self.leg_elapsed = 0.0;
        self.penalty = 0.0;
        self.rowing = false;
        self.rowing_ticks = 0;
        self.animation_frame = 0;
        self.indexed_at = None;
        match &mut self.pilot {
            Pilot::Player(control) => {
                let autopilot = control.autopilot.take().map(|nav| Navigator::new(nav.target_speed));
                *control = PlayerControl {
                    autopilot,
                    ..PlayerControl::default()
                };
            }
            Pilot::Ai(nav) => nav.regenerating = false,
        }
    }

    pub fn durability(&self) -> f32 {
        self.durability
    }

    pub fn stamina(&self) -> f32 {
        self.stamina
    }

    pub fn change_durability(&mut self, delta: f32) {
        self.durability = (self.durability + delta).clamp(0.0, 1.0);
    }

    pub fn change_stamina(&mut self, delta: f32) {
        self.stamina = (self.stamina + delta).clamp(0.0, 1.0);
    }

    /// Row for one tick; costs stamina and only gains speed while stamina remains
    pub fn accelerate(&mut self, dt: f32) {
        self.change_stamina(-self.spec.stamina_usage * dt);
        if self.stamina > 0.0 {
            self.body.accelerate(dt);
            self.rowing = true;
        }
    }

    /// End-of-drive integration: move, drag, stamina recovery and leg clock
    pub fn update(&mut self, dt: f32) {
        self.body.integrate(dt);
        self.change_stamina(self.spec.stamina_regen * dt);
        if self.status != LegStatus::Finished {
            self.leg_elapsed += dt;
        }

        if self.rowing {
            self.rowing_ticks += 1;
            self.animation_frame = (self.rowing_ticks / TICKS_PER_ANIMATION_FRAME) % BOAT_ANIMATION_FRAMES;
        } else {
            self.rowing_ticks = 0;
            self.animation_frame = 0;
        }
        self.rowing = false;
    }

    /// Collision response; returns the displacement if the boat was teleported
    pub fn on_hit(&mut self, contact: Contact) -> Option<Vec2> {
        match contact {
            Contact::LaneWall => {}
            Contact::Obstacle => {
                self.change_durability(-self.spec.durability_per_hit);
                self.body
                    .change_max_speed(-self.spec.max_speed_per_hit, MIN_MAX_SPEED, self.spec.max_speed);
                self.body
                    .change_speed(-IMPACT_SPEED_FACTOR * self.spec.max_speed_per_hit);
            }
            Contact::Powerup(kind) => return self.apply_powerup(kind),
            Contact::Boat => self.change_durability(-self.spec.durability_per_hit),
        }
        None
    }

    fn apply_powerup(&mut self, kind: PowerupKind) -> Option<Vec2> {
        match kind {
            PowerupKind::Repair => {
                self.change_durability(self.spec.durability_per_hit * REPAIR_DURABILITY_FACTOR);
                self.body.change_max_speed(
                    self.spec.max_speed_per_hit * REPAIR_MAX_SPEED_FACTOR,
                    MIN_MAX_SPEED,
                    self.spec.max_speed,
                );
            }
            PowerupKind::Boost => {
                self.body
                    .change_speed(self.body.acceleration * BOOST_ACCELERATION_FACTOR);
            }
            PowerupKind::Stamina => self.change_stamina(STAMINA_RESTORE),
            PowerupKind::Time => self.leg_elapsed -= TIME_BONUS_SECS,
            PowerupKind::Teleport => {
                let offset = Vec2::new(0.0, TELEPORT_DISTANCE);
                self.body.position += offset;
                return Some(offset);
            }
        }
        None
    }

    /// Hull in the boat's unrotated frame, rotating about the sprite centre
    pub fn bounds(&self) -> Bounds {
        let b = &self.body;
        let (x, y, w, h) = (b.position.x, b.position.y, b.width, b.height);
        Bounds::new(b.heading, b.centre()).with_rect(Rect::new(x + 0.32 * w, y + 0.117 * h, 0.32 * w, 0.77 * h))
    }

    /// Point just ahead of the bow, offset sideways by `lateral`
    pub fn bow_point(&self, lateral: f32) -> Vec2 {
        let b = &self.body;
        let p = b.position + Vec2::new(b.width / 2.0 + lateral, b.height + RAY_BOW_OFFSET);
        crate::rotate_about(p, b.centre(), b.heading)
    }

    pub fn has_started_leg(&self) -> bool {
        self.status != LegStatus::NotStarted
    }

    pub fn has_finished_leg(&self) -> bool {
        self.status == LegStatus::Finished
    }

    /// Clock zeroes as the boat crosses the start line
    pub fn start_leg(&mut self) {
        self.status = LegStatus::Racing;
        self.leg_elapsed = 0.0;
    }

    /// Close the leg and record elapsed + penalty time; returns the time in ms
    pub fn finish_leg(&mut self) -> u32 {
        let ms = ((self.leg_elapsed + self.penalty).max(0.0) * 1000.0).ceil() as u32;
        self.leg_times.push(ms);
        self.status = LegStatus::Finished;
        ms
    }

    /// Close the leg with an externally decided time (DNF or estimate)
    pub fn force_finish(&mut self, time_ms: u32) {
        self.leg_times.push(time_ms);
        self.status = LegStatus::Finished;
    }

    pub fn leg_elapsed(&self) -> f32 {
        self.leg_elapsed
    }

    pub fn penalty(&self) -> f32 {
        self.penalty
    }

    pub fn add_penalty(&mut self, secs: f32) {
        self.penalty += secs;
    }

    pub fn leg_times(&self) -> &[u32] {
        &self.leg_times
    }

    pub fn set_leg_times(&mut self, times: Vec<u32>) {
        self.leg_times = times;
    }

    pub fn push_leg_time(&mut self, time_ms: u32) {
        self.leg_times.push(time_ms);
    }

    /// Fastest completed leg
    pub fn best_time(&self) -> Option<u32> {
        self.leg_times.iter().copied().min()
    }

    pub fn total_time(&self) -> u64 {
        self.leg_times.iter().map(|&t| t as u64).sum()
    }

    pub fn animation_frame(&self) -> u32 {
        self.animation_frame
    }
}
