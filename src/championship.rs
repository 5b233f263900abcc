//! Multi-leg championship progression
//!
//! A roster of boats races a fixed number of qualifying legs. Only one heat
//! (the player's) is simulated; the rest of the roster gets shadow times.
//! The fastest boats by best leg time then race a final.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::settings::RaceSettings;
use crate::sim::{Boat, BoatClass, RaceState, TickInput, generate_times_for_unfinished, tick};
use crate::standings::Standings;

/// Where the championship is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChampionshipPhase {
    Qualifying,
    Final,
    Complete,
}

#[derive(Debug, Clone)]
pub struct Championship {
    pub settings: RaceSettings,
    pub seed: u64,
    /// Every boat in the championship; the player is always index 0
    pub roster: Vec<Boat>,
    /// Roster indices racing the current leg, in lane order
    heat: Vec<usize>,
    /// Legs fully raced so far
    legs_completed: u32,
    phase: ChampionshipPhase,
    race: Option<RaceState>,
    rng: Pcg32,
}

impl Championship {
    /// Player plus `roster_size - 1` AI boats tuned to the settings' difficulty
    pub fn new(settings: RaceSettings, roster_size: usize, player_class: BoatClass, seed: u64) -> Self {
        let target = settings.difficulty.ai_target_speed();
        let mut roster = vec![Boat::player("Player", player_class)];
        for i in 0..roster_size.saturating_sub(1) {
            roster.push(Boat::ai(format!("AI Boat {}", i), target));
        }

        // Player races from the middle lane of the first heat
        let heat_size = settings.boats_per_heat.min(roster.len());
        let mut heat: Vec<usize> = (0..heat_size).collect();
        if heat_size > 0 {
            heat.swap(0, heat_size / 2);
        }

        Self {
            settings,
            seed,
            roster,
            heat,
            legs_completed: 0,
            phase: ChampionshipPhase::Qualifying,
            race: None,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn phase(&self) -> ChampionshipPhase {
        self.phase
    }

    /// 0-based index of the leg being (or about to be) raced
    pub fn current_leg(&self) -> u32 {
        self.legs_completed
    }

    /// Restore the leg counter, clamped to the qualifying legs; drops any leg in progress
    pub fn set_current_leg(&mut self, leg: u32) {
        self.legs_completed = leg.min(self.settings.qualifying_legs);
        self.race = None;
        if self.legs_completed == self.settings.qualifying_legs {
            self.select_finalists();
        }
        self.phase = self.phase_for(self.legs_completed);
    }

    pub fn race(&self) -> Option<&RaceState> {
        self.race.as_ref()
    }

    pub fn race_mut(&mut self) -> Option<&mut RaceState> {
        self.race.as_mut()
    }

    pub fn heat(&self) -> &[usize] {
        &self.heat
    }

    pub fn player(&self) -> &Boat {
        &self.roster[0]
    }

    pub fn player_mut(&mut self) -> &mut Boat {
        &mut self.roster[0]
    }

    pub fn is_complete(&self) -> bool {
        self.phase == ChampionshipPhase::Complete
    }

    fn phase_for(&self, legs_completed: u32) -> ChampionshipPhase {
        let qualifying = self.settings.qualifying_legs;
        if legs_completed < qualifying {
            ChampionshipPhase::Qualifying
        } else if legs_completed == qualifying {
            ChampionshipPhase::Final
        } else {
            ChampionshipPhase::Complete
        }
    }

    fn leg_seed(&self, leg: u32) -> u64 {
        (leg as u64).wrapping_mul(2654435761).wrapping_add(self.seed)
    }

    /// Lay out the next leg if none is running; false once the championship is over
    pub fn start_leg(&mut self) -> bool {
        if self.is_complete() {
            return false;
        }
        if self.race.is_none() {
            let boats = self.heat.iter().map(|&i| self.roster[i].clone()).collect();
            let leg = self.legs_completed;
            self.race = Some(RaceState::new_leg(&self.settings, boats, leg, self.leg_seed(leg)));
        }
        true
    }

    /// Abandon the current leg and lay it out again from scratch
    pub fn restart_leg(&mut self) {
        self.race = None;
        self.start_leg();
    }

    /// Advance the running leg; returns true on the tick the leg ends
    pub fn tick(&mut self, input: &TickInput, dt: f32) -> bool {
        let Some(race) = self.race.as_mut() else {
            return false;
        };

        // Once the player is home the rest of the heat is estimated
        let player_home = race
            .player_index()
            .is_some_and(|i| race.boats[i].has_finished_leg());
        if player_home && !race.finished {
            generate_times_for_unfinished(race);
        }
        if !race.finished {
            tick(race, input, dt);
        }

        if race.finished {
            self.end_leg();
            return true;
        }
        false
    }

    fn end_leg(&mut self) {
        let Some(race) = self.race.take() else {
            return;
        };
        for (&slot, boat) in self.heat.iter().zip(race.into_boats()) {
            self.roster[slot] = boat;
        }

        if self.phase == ChampionshipPhase::Qualifying {
            self.shadow_times();
        }

        self.legs_completed += 1;
        if self.legs_completed == self.settings.qualifying_legs {
            self.select_finalists();
        }

        let phase = self.phase_for(self.legs_completed);
        if phase != self.phase {
            log::info!("Championship: {:?} -> {:?}", self.phase, phase);
        }
        self.phase = phase;
    }

    /// Plausible times for boats outside the simulated heat
    fn shadow_times(&mut self) {
        for i in 0..self.roster.len() {
            if self.heat.contains(&i) {
                continue;
            }
            let time = SHADOW_TIME_BASE_MS + self.rng.random_range(0..SHADOW_TIME_SPREAD_MS);
            self.roster[i].push_leg_time(time);
        }
    }

    /// Fastest boats by best leg time race the final, fastest in lane 0
    fn select_finalists(&mut self) {
        let mut order: Vec<usize> = (0..self.roster.len()).collect();
        order.sort_by_key(|&i| (self.roster[i].best_time().unwrap_or(u32::MAX), i));
        order.truncate(self.settings.boats_per_heat);
        log::info!(
            "Final heat: {}",
            order
                .iter()
                .map(|&i| self.roster[i].name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
        self.heat = order;
    }

    pub fn standings(&self) -> Standings {
        Standings::from_boats(&self.roster)
    }

    /// Every AI boat, in roster order
    pub fn ai_boats(&self) -> impl Iterator<Item = &Boat> {
        self.roster.iter().skip(1)
    }

    pub fn ai_boats_mut(&mut self) -> impl Iterator<Item = &mut Boat> {
        self.roster.iter_mut().skip(1)
    }
}
