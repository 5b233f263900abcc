//! Fixed timestep race tick
//!
//! One ordered pass per tick: heat timeout, lane objects, leg transitions,
//! boat driving, collisions, lane penalties, heat completion.

use super::boat::{LegStatus, Pilot};
use super::entity::{Contact, Handle};
use super::navigator::{Navigator, TurnDirection};
use super::state::{RaceEvent, RaceState};
use crate::consts::*;

/// Player intent for a single tick (ignored while the player is on autopilot)
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    pub accelerate: bool,
    pub turn: TurnDirection,
}

/// Advance the leg by one fixed timestep
pub fn tick(state: &mut RaceState, input: &TickInput, dt: f32) {
    if state.finished {
        return;
    }
    state.events.clear();
    state.time_ticks += 1;
    state.elapsed += dt;

    if state.elapsed > state.settings.max_leg_secs {
        time_out(state);
        return;
    }

    advance_objects(state, dt);
    update_leg_status(state);
    drive_boats(state, input, dt);
    resolve_collisions(state);
    accrue_lane_penalties(state, dt);

    state.compact();
    if !state.finished && state.boats.iter().all(|b| b.has_finished_leg()) {
        state.finished = true;
        log::info!("Leg {} complete after {:.1}s", state.leg + 1, state.elapsed);
    }
}

/// Record every unfinished boat at the heat's maximum time
fn time_out(state: &mut RaceState) {
    let max_ms = state.settings.max_leg_ms();
    let mut dnf = 0;
    for (i, boat) in state.boats.iter_mut().enumerate() {
        if boat.has_finished_leg() {
            continue;
        }
        boat.force_finish(max_ms);
        state.events.push(RaceEvent::DidNotFinish { boat: i, time_ms: max_ms });
        dnf += 1;
    }
    state.finished = true;
    log::info!("Leg {} timed out at {}ms, {} did not finish", state.leg + 1, max_ms, dnf);
}

fn advance_objects(state: &mut RaceState, dt: f32) {
    for i in 0..state.objects.len() {
        let object = &mut state.objects[i];
        if object.shown && object.advance(dt) {
            state.reindex_object(i);
        }
    }
}

fn update_leg_status(state: &mut RaceState) {
    let (start_y, end_y) = (state.settings.start_y, state.settings.end_y);
    for (i, boat) in state.boats.iter_mut().enumerate() {
        let y = boat.body.position.y;
        match boat.status {
            LegStatus::NotStarted if y >= start_y => {
                boat.start_leg();
                state.events.push(RaceEvent::LegStarted { boat: i });
                log::debug!("{} crossed the start line", boat.name);
            }
            LegStatus::Racing if y >= end_y => {
                let time_ms = boat.finish_leg();
                state.events.push(RaceEvent::LegFinished { boat: i, time_ms });
                log::info!("{} finished leg {} in {}ms", boat.name, state.leg + 1, time_ms);
            }
            _ => {}
        }
    }
}

fn drive_boats(state: &mut RaceState, input: &TickInput, dt: f32) {
    for i in 0..state.boats.len() {
        let steered = match &state.boats[i].pilot {
            Pilot::Player(control) => control.autopilot.is_some(),
            Pilot::Ai(_) => true,
        };

        if steered {
            drive_with_navigator(state, i, dt);
        } else {
            drive_player(state, i, input, dt);
        }
        state.reindex_boat(i);
    }
}

fn drive_player(state: &mut RaceState, i: usize, input: &TickInput, dt: f32) {
    let boat = &mut state.boats[i];
    let row = match &mut boat.pilot {
        Pilot::Player(control) => control.gate(input.accelerate, dt),
        Pilot::Ai(_) => false,
    };
    if row {
        boat.accelerate(dt);
    }
    boat.body.turn(dt, input.turn.amount(PLAYER_TURN_AMOUNT));
    boat.update(dt);
}

fn drive_with_navigator(state: &mut RaceState, i: usize, dt: f32) {
    state.boats[i].body.heading = 0.0;

    // Scan first: the rays read every other entity
    let origin = state.boats[i].bow_point(0.0);
    let heading = state.boats[i].body.heading;
    let turn = Navigator::scan(origin, heading, &state.index, |h| state.ray_target(h, i));

    let boat = &mut state.boats[i];
    let (stamina, speed, max_speed) = (boat.stamina(), boat.body.speed, boat.body.max_speed);
    let nav = match &mut boat.pilot {
        Pilot::Ai(nav) => Some(nav),
        Pilot::Player(control) => control.autopilot.as_mut(),
    };
    let row = nav.is_some_and(|nav| nav.wants_to_row(stamina, speed, max_speed));
    if row {
        boat.accelerate(dt);
    }
    boat.body.turn(dt, turn.amount(AI_TURN_AMOUNT));
    boat.update(dt);
}

fn resolve_collisions(state: &mut RaceState) {
    for i in 0..state.boats.len() {
        check_collisions(state, i);
    }
}

/// Test one boat against everything sharing its index leaf and apply hits to both sides
pub fn check_collisions(state: &mut RaceState, i: usize) {
    let key = state.boats[i].indexed_at.unwrap_or(state.boats[i].body.position);
    let candidates: Vec<Handle> = state.index.get(key).iter().copied().collect();
    let mut bounds = state.boats[i].bounds();

    for handle in candidates {
        match handle {
            Handle::Object(j) => {
                let object = &mut state.objects[j];
                if !object.shown || !object.bounds().overlaps(&bounds) {
                    continue;
                }
                let contact = object.contact();
                object.on_hit();

                let boat = &mut state.boats[i];
                let moved = boat.on_hit(contact);
                match contact {
                    Contact::Obstacle => state.events.push(RaceEvent::ObstacleHit { boat: i, object: j }),
                    Contact::Powerup(kind) => {
                        log::debug!("{} collected {:?}", boat.name, kind);
                        state.events.push(RaceEvent::PowerupCollected { boat: i, kind });
                    }
                    Contact::LaneWall | Contact::Boat => {}
                }
                if let Some(offset) = moved {
                    state.events.push(RaceEvent::Teleported {
                        boat: i,
                        dx: offset.x,
                        dy: offset.y,
                    });
                    bounds = boat.bounds();
                }
            }
            // Each pair once, from the lower index
            Handle::Boat(k) if k > i => {
                if !state.boats[k].bounds().overlaps(&bounds) {
                    continue;
                }
                state.boats[i].on_hit(Contact::Boat);
                state.boats[k].on_hit(Contact::Boat);
                state.events.push(RaceEvent::BoatsCollided { a: i, b: k });
            }
            Handle::Boat(_) => {}
        }
    }
    state.reindex_boat(i);
}

fn accrue_lane_penalties(state: &mut RaceState, dt: f32) {
    let rate = state.settings.lane_penalty_rate;
    for i in 0..state.boats.len() {
        if state.boats[i].has_finished_leg() || state.in_lane(i) {
            continue;
        }
        state.boats[i].add_penalty(rate * dt);
    }
}

/// Projected leg time for a boat that has not finished
pub fn estimate_finish_ms(state: &mut RaceState, boat: usize) -> u32 {
    let jitter = state.next_jitter();
    let b = &state.boats[boat];
    let elapsed_ms = (b.leg_elapsed() + b.penalty()).max(0.0) * 1000.0;
    let remaining = state.distance_remaining(boat);
    let estimate = elapsed_ms + remaining * ESTIMATE_BIAS_MS / b.cruise_speed() * jitter;
    estimate.ceil().max(0.0) as u32
}

/// Close the leg by estimating a time for every boat still on the water
pub fn generate_times_for_unfinished(state: &mut RaceState) {
    for i in 0..state.boats.len() {
        if state.boats[i].has_finished_leg() {
            continue;
        }
        let time_ms = estimate_finish_ms(state, i);
        state.boats[i].force_finish(time_ms);
        state.events.push(RaceEvent::LegFinished { boat: i, time_ms });
    }
    state.finished = true;
}
