//! Deterministic race simulation module
//!
//! All race logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (lane order for boats, arena order for objects)
//! - No rendering or platform dependencies

pub mod body;
pub mod boat;
pub mod bounds;
pub mod entity;
pub mod index;
pub mod navigator;
pub mod state;
pub mod tick;

pub use body::PhysicsBody;
pub use boat::{Boat, BoatClass, BoatSpec, LegStatus, Pilot, PlayerControl};
pub use bounds::{Bounds, Rect, overlaps};
pub use entity::{Contact, Handle, LaneObject, ObjectKind, ObstacleKind, PowerupKind};
pub use index::{MIN_CELL_SIZE, SpatialIndex};
pub use navigator::{Navigator, TurnDirection, cast_ray, evaluate_turn};
pub use state::{RaceEvent, RaceState, lane_centre};
pub use tick::{TickInput, check_collisions, estimate_finish_ms, generate_times_for_unfinished, tick};
