//! Difficulty levels and race configuration
//!
//! Passed explicitly into leg construction; nothing here is global.

use serde::{Deserialize, Serialize};

/// Difficulty levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DifficultyLevel {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl DifficultyLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            DifficultyLevel::Easy => "Easy",
            DifficultyLevel::Medium => "Medium",
            DifficultyLevel::Hard => "Hard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(DifficultyLevel::Easy),
            "medium" | "med" | "normal" => Some(DifficultyLevel::Medium),
            "hard" => Some(DifficultyLevel::Hard),
            _ => None,
        }
    }

    /// Next level up, saturating at Hard
    pub fn harder(&self) -> Self {
        match self {
            DifficultyLevel::Easy => DifficultyLevel::Medium,
            DifficultyLevel::Medium | DifficultyLevel::Hard => DifficultyLevel::Hard,
        }
    }

    /// Next level down, saturating at Easy
    pub fn easier(&self) -> Self {
        match self {
            DifficultyLevel::Hard => DifficultyLevel::Medium,
            DifficultyLevel::Medium | DifficultyLevel::Easy => DifficultyLevel::Easy,
        }
    }

    /// Fraction of max speed AI boats row up to
    pub fn ai_target_speed(&self) -> f32 {
        match self {
            DifficultyLevel::Easy => 0.80,
            DifficultyLevel::Medium => 0.88,
            DifficultyLevel::Hard => 0.99,
        }
    }

    /// Obstacles on the first leg
    pub fn base_obstacle_count(&self) -> u32 {
        match self {
            DifficultyLevel::Easy => 50,
            DifficultyLevel::Medium => 100,
            DifficultyLevel::Hard => 200,
        }
    }

    pub fn powerup_count(&self) -> u32 {
        match self {
            DifficultyLevel::Easy => 50,
            DifficultyLevel::Medium | DifficultyLevel::Hard => 25,
        }
    }

    /// Obstacle growth applied once per completed leg
    pub fn leg_obstacle_multiplier(&self) -> f32 {
        match self {
            DifficultyLevel::Easy => 1.1892,
            DifficultyLevel::Medium => 1.3161,
            DifficultyLevel::Hard => 1.4142,
        }
    }

    /// Obstacle count for a 0-based leg index
    pub fn obstacle_count(&self, leg: u32) -> u32 {
        let scale = self.leg_obstacle_multiplier().powi(leg as i32);
        (self.base_obstacle_count() as f32 * scale).round() as u32
    }
}

/// Race configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RaceSettings {
    pub difficulty: DifficultyLevel,

    // === Course ===
    /// Boats raced side by side in one heat (one lane each)
    pub boats_per_heat: usize,
    pub lane_width: f32,
    /// Crossing this y starts a boat's leg clock
    pub start_y: f32,
    /// Crossing this y finishes the leg
    pub end_y: f32,
    /// Where boats sit before the start
    pub boat_start_y: f32,

    // === Rules ===
    /// Heat timeout; unfinished boats are recorded at this time
    pub max_leg_secs: f32,
    /// Penalty seconds accrued per second spent outside the lane
    pub lane_penalty_rate: f32,
    /// Legs raced before the final
    pub qualifying_legs: u32,

    // === Engine ===
    /// Spatial index leaf floor
    pub index_min_cell: f32,
}

impl Default for RaceSettings {
    fn default() -> Self {
        Self {
            difficulty: DifficultyLevel::Medium,

            boats_per_heat: 7,
            lane_width: 400.0,
            start_y: 200.0,
            end_y: 40_000.0,
            boat_start_y: 40.0,

            max_leg_secs: 300.0,
            lane_penalty_rate: 0.06,
            qualifying_legs: 3,

            index_min_cell: crate::sim::MIN_CELL_SIZE,
        }
    }
}

impl RaceSettings {
    pub fn with_difficulty(difficulty: DifficultyLevel) -> Self {
        Self {
            difficulty,
            ..Self::default()
        }
    }

    /// Leg timeout in whole milliseconds
    pub fn max_leg_ms(&self) -> u32 {
        (self.max_leg_secs.max(0.0) * 1000.0).round() as u32
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_difficulty_round_trips_through_str() {
        for level in [DifficultyLevel::Easy, DifficultyLevel::Medium, DifficultyLevel::Hard] {
            assert_eq!(DifficultyLevel::from_str(level.as_str()), Some(level));
        }
        assert_eq!(DifficultyLevel::from_str("MED"), Some(DifficultyLevel::Medium));
        assert_eq!(DifficultyLevel::from_str("nightmare"), None);
    }

    #[test]
    fn test_harder_and_easier_saturate() {
        assert_eq!(DifficultyLevel::Hard.harder(), DifficultyLevel::Hard);
        assert_eq!(DifficultyLevel::Easy.easier(), DifficultyLevel::Easy);
        assert_eq!(DifficultyLevel::Easy.harder().harder(), DifficultyLevel::Hard);
    }

    #[test]
    fn test_obstacles_compound_per_leg() {
        let hard = DifficultyLevel::Hard;
        assert_eq!(hard.obstacle_count(0), 200);
        // sqrt(2) per leg doubles every two legs
        assert_eq!(hard.obstacle_count(2), 400);
        assert!(DifficultyLevel::Easy.obstacle_count(3) > DifficultyLevel::Easy.obstacle_count(2));
    }

    #[test]
    fn test_ai_faster_on_harder_levels() {
        assert!(DifficultyLevel::Easy.ai_target_speed() < DifficultyLevel::Medium.ai_target_speed());
        assert!(DifficultyLevel::Medium.ai_target_speed() < DifficultyLevel::Hard.ai_target_speed());
    }

    #[test]
    fn test_settings_json_round_trip() {
        let settings = RaceSettings {
            boats_per_heat: 4,
            ..RaceSettings::with_difficulty(DifficultyLevel::Hard)
        };
        let json = settings.to_json().unwrap();
        assert_eq!(RaceSettings::from_json(&json).unwrap(), settings);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings = RaceSettings::from_json(r#"{ "difficulty": "Easy", "end_y": 5000.0 }"#).unwrap();
        assert_eq!(settings.difficulty, DifficultyLevel::Easy);
        assert_eq!(settings.end_y, 5000.0);
        assert_eq!(settings.boats_per_heat, RaceSettings::default().boats_per_heat);
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(RaceSettings::from_json("{ boats").is_err());
    }
}
