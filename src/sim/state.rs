//! Race state for a single leg
//!
//! Owns the heat's boats, the arena of lane objects and the spatial index
//! over both. The index is built fresh for every leg and dropped with it.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::boat::Boat;
use super::entity::{Handle, LANE_WALL_HEIGHT, LANE_WALL_WIDTH, LaneObject, PowerupKind, collision_value};
use super::index::SpatialIndex;
use crate::consts::*;
use crate::settings::RaceSettings;

/// Obstacles and powerups never spawn closer than this past the start line
const SPAWN_CLEARANCE: f32 = 50.0;

/// Something the render/audio/camera layers may want to react to
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum RaceEvent {
    LegStarted { boat: usize },
    LegFinished { boat: usize, time_ms: u32 },
    /// Heat timed out before the boat finished
    DidNotFinish { boat: usize, time_ms: u32 },
    ObstacleHit { boat: usize, object: usize },
    PowerupCollected { boat: usize, kind: PowerupKind },
    BoatsCollided { a: usize, b: usize },
    /// Boat jumped forward; a camera tracking it should follow
    Teleported { boat: usize, dx: f32, dy: f32 },
}

/// Complete state of one leg (deterministic for a given seed and input stream)
#[derive(Debug, Clone)]
pub struct RaceState {
    /// Leg seed
    pub seed: u64,
    /// 0-based leg index
    pub leg: u32,
    pub settings: RaceSettings,
    /// Boats in lane order
    pub boats: Vec<Boat>,
    /// Obstacles, lane walls and powerups; hidden entries stay in place
    pub objects: Vec<LaneObject>,
    /// Seconds since the leg began
    pub elapsed: f32,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Every boat has a time for this leg
    pub finished: bool,
    /// Events raised by the most recent tick
    pub events: Vec<RaceEvent>,
    pub(crate) rng: Pcg32,
    pub(crate) index: SpatialIndex<Handle>,
}

impl RaceState {
    /// Lay out a fresh leg: lanes, walls, obstacles and powerups, with every
    /// boat reset at the start of its lane.
    pub fn new_leg(settings: &RaceSettings, mut boats: Vec<Boat>, leg: u32, seed: u64) -> Self {
        let lanes = boats.len();
        let half_course = lanes as f32 * settings.lane_width / 2.0;

        for (lane, boat) in boats.iter_mut().enumerate() {
            let x = lane_centre(lanes, settings.lane_width, lane);
            boat.prepare_for_leg(lane, x, settings.boat_start_y);
        }

        // One lane of margin either side, plus room past the finish line
        let index = SpatialIndex::with_min_cell(
            (lanes + 2) as f32 * settings.lane_width,
            settings.end_y + settings.lane_width,
            Vec2::new(-half_course - settings.lane_width, 0.0),
            settings.index_min_cell,
        );

        let mut state = Self {
            seed,
            leg,
            settings: settings.clone(),
            boats,
            objects: Vec::new(),
            elapsed: 0.0,
            time_ticks: 0,
            finished: false,
            events: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
            index,
        };

        state.spawn_lane_walls();
        let obstacles = settings.difficulty.obstacle_count(leg);
        let powerups = settings.difficulty.powerup_count();
        state.spawn_obstacles(obstacles);
        state.spawn_powerups(powerups);
        state.index_all();

        log::info!(
            "Leg {}: {} lanes, {} obstacles, {} powerups, course {}",
            leg + 1,
            lanes,
            obstacles,
            powerups,
            settings.end_y
        );

        state
    }

    fn spawn_lane_walls(&mut self) {
        let lanes = self.boats.len();
        let width = self.settings.lane_width;
        for divider in 0..=lanes {
            let x = lane_centre(lanes, width, divider) - width / 2.0 - LANE_WALL_WIDTH / 2.0;
            let mut y = 0.0;
            while y < self.settings.end_y {
                self.objects.push(LaneObject::lane_wall(Vec2::new(x, y)));
                y += LANE_WALL_HEIGHT;
            }
        }
    }

    fn random_spawn_point(&mut self) -> Vec2 {
        let half_course = self.boats.len() as f32 * self.settings.lane_width / 2.0;
        let low_y = self.settings.start_y + SPAWN_CLEARANCE;
        let high_y = self.settings.end_y.max(low_y + 1.0);
        let x = if half_course > 0.0 {
            self.rng.random_range(-half_course..half_course)
        } else {
            0.0
        };
        Vec2::new(x, self.rng.random_range(low_y..high_y))
    }

    fn spawn_obstacles(&mut self, count: u32) {
        for _ in 0..count {
            let pos = self.random_spawn_point();
            let object = match self.rng.random_range(0..3u8) {
                0 => LaneObject::branch(pos, self.rng.random_range(-90.0..90.0)),
                1 => LaneObject::floating_branch(pos, self.rng.random_range(-90.0..90.0)),
                _ => LaneObject::duck(pos, self.rng.random_range(0.0..360.0)),
            };
            self.objects.push(object);
        }
    }

    fn spawn_powerups(&mut self, count: u32) {
        for _ in 0..count {
            let pos = self.random_spawn_point();
            let kind = PowerupKind::ALL[self.rng.random_range(0..PowerupKind::ALL.len())];
            self.objects.push(LaneObject::powerup(pos, kind));
        }
    }

    fn index_all(&mut self) {
        self.index.clear();
        for (i, object) in self.objects.iter_mut().enumerate() {
            let p = object.body.position;
            self.index.add(p, Handle::Object(i));
            object.indexed_at = Some(p);
        }
        for (i, boat) in self.boats.iter_mut().enumerate() {
            let p = boat.body.position;
            self.index.add(p, Handle::Boat(i));
            boat.indexed_at = Some(p);
        }
    }

    /// Move an object's index entry to its current position
    pub(crate) fn reindex_object(&mut self, i: usize) {
        let object = &mut self.objects[i];
        let to = object.body.position;
        match object.indexed_at {
            Some(from) if from == to => {}
            Some(from) => self.index.relocate(from, to, Handle::Object(i)),
            None => return,
        }
        object.indexed_at = Some(to);
    }

    pub(crate) fn reindex_boat(&mut self, i: usize) {
        let boat = &mut self.boats[i];
        let to = boat.body.position;
        match boat.indexed_at {
            Some(from) if from == to => {}
            Some(from) => self.index.relocate(from, to, Handle::Boat(i)),
            None => self.index.add(to, Handle::Boat(i)),
        }
        boat.indexed_at = Some(to);
    }

    /// Drop hidden objects from the index; their arena slots stay
    pub(crate) fn compact(&mut self) {
        for (i, object) in self.objects.iter_mut().enumerate() {
            if object.shown {
                continue;
            }
            if let Some(at) = object.indexed_at.take() {
                self.index.remove(at, Handle::Object(i));
            }
        }
    }

    /// Centre and AI collision value of a live entity, skipping `exclude`
    pub fn ray_target(&self, handle: Handle, exclude: usize) -> Option<(Vec2, f32)> {
        match handle {
            Handle::Boat(i) if i == exclude => None,
            Handle::Boat(i) => self.boats.get(i).map(|b| (b.body.centre(), collision_value::BOAT)),
            Handle::Object(i) => self
                .objects
                .get(i)
                .filter(|o| o.shown)
                .map(|o| (o.body.centre(), o.collision_value())),
        }
    }

    pub fn index(&self) -> &SpatialIndex<Handle> {
        &self.index
    }

    pub fn lane_centre(&self, lane: usize) -> f32 {
        lane_centre(self.boats.len(), self.settings.lane_width, lane)
    }

    /// True while the boat's centre is within its lane's half-width
    pub fn in_lane(&self, boat: usize) -> bool {
        let b = &self.boats[boat];
        (b.body.centre().x - self.lane_centre(b.lane)).abs() <= self.settings.lane_width / 2.0
    }

    /// 1-based rank by distance down the course
    pub fn race_position(&self, boat: usize) -> usize {
        let y = self.boats[boat].body.position.y;
        1 + self
            .boats
            .iter()
            .enumerate()
            .filter(|&(i, b)| i != boat && b.body.position.y > y)
            .count()
    }

    pub fn distance_remaining(&self, boat: usize) -> f32 {
        (self.settings.end_y - self.boats[boat].body.position.y).max(0.0)
    }

    pub fn player_index(&self) -> Option<usize> {
        self.boats.iter().position(Boat::is_player)
    }

    /// Hand the boats back once the leg is over
    pub fn into_boats(self) -> Vec<Boat> {
        self.boats
    }

    /// Shown objects
    pub fn visible_objects(&self) -> impl Iterator<Item = &LaneObject> {
        self.objects.iter().filter(|o| o.shown)
    }

    pub(crate) fn next_jitter(&mut self) -> f32 {
        1.0 + self.rng.random_range(-ESTIMATE_JITTER..=ESTIMATE_JITTER)
    }
}

/// X of a lane's centre line; lanes are laid out symmetrically about x = 0
pub fn lane_centre(lanes: usize, lane_width: f32, lane: usize) -> f32 {
    -(lanes as f32 * lane_width) / 2.0 + lane_width * (lane + 1) as f32 - lane_width / 2.0
}
