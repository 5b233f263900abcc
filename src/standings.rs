//! Leg-time leaderboard
//!
//! Built from the boats' leg-time histories at the end of each leg.

use serde::{Deserialize, Serialize};

use crate::sim::Boat;

/// One boat's line on the leaderboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandingsEntry {
    pub name: String,
    /// Leg times in ms, in the order they were raced
    pub leg_times: Vec<u32>,
    pub total_ms: u64,
    pub best_ms: Option<u32>,
    pub is_player: bool,
}

/// Leaderboard sorted fastest first
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Standings {
    pub entries: Vec<StandingsEntry>,
}

impl Standings {
    /// Create empty leaderboard
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn from_boats<'a>(boats: impl IntoIterator<Item = &'a Boat>) -> Self {
        let mut entries: Vec<StandingsEntry> = boats
            .into_iter()
            .map(|b| StandingsEntry {
                name: b.name.clone(),
                leg_times: b.leg_times().to_vec(),
                total_ms: b.total_time(),
                best_ms: b.best_time(),
                is_player: b.is_player(),
            })
            .collect();

        // More legs raced ranks first, then lower total; name keeps ties stable
        entries.sort_by(|a, b| {
            b.leg_times
                .len()
                .cmp(&a.leg_times.len())
                .then(a.total_ms.cmp(&b.total_ms))
                .then_with(|| a.name.cmp(&b.name))
        });

        Self { entries }
    }

    /// 1-indexed rank of a boat by name
    pub fn rank_of(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.name == name).map(|i| i + 1)
    }

    pub fn player_rank(&self) -> Option<usize> {
        self.entries.iter().position(|e| e.is_player).map(|i| i + 1)
    }

    /// Check if the leaderboard is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn leader(&self) -> Option<&StandingsEntry> {
        self.entries.first()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Format a leg time as `m:ss.mmm`
pub fn format_time(ms: u64) -> String {
    let minutes = ms / 60_000;
    let seconds = (ms / 1000) % 60;
    let millis = ms % 1000;
    format!("{}:{:02}.{:03}", minutes, seconds, millis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::BoatClass;

    fn boat(name: &str, times: &[u32]) -> Boat {
        let mut b = Boat::ai(name, 0.9);
        b.set_leg_times(times.to_vec());
        b
    }

    #[test]
    fn test_sorted_fastest_first() {
        let boats = [
            boat("Slow", &[70_000, 71_000]),
            boat("Fast", &[60_000, 61_000]),
            boat("Mid", &[65_000, 66_000]),
        ];
        let standings = Standings::from_boats(&boats);
        let names: Vec<&str> = standings.entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["Fast", "Mid", "Slow"]);
        assert_eq!(standings.leader().map(|e| e.name.as_str()), Some("Fast"));
        assert_eq!(standings.rank_of("Mid"), Some(2));
        assert_eq!(standings.rank_of("Nobody"), None);
    }

    #[test]
    fn test_best_and_total() {
        let standings = Standings::from_boats(&[boat("A", &[64_000, 62_000, 69_000])]);
        let entry = &standings.entries[0];
        assert_eq!(entry.best_ms, Some(62_000));
        assert_eq!(entry.total_ms, 195_000);
    }

    #[test]
    fn test_more_legs_outrank_fewer() {
        let boats = [boat("Partial", &[50_000]), boat("Full", &[60_000, 60_000])];
        let standings = Standings::from_boats(&boats);
        assert_eq!(standings.rank_of("Full"), Some(1));
    }

    #[test]
    fn test_player_rank() {
        let mut player = Boat::player("You", BoatClass::Standard);
        player.set_leg_times(vec![63_000]);
        let boats = [boat("A", &[61_000]), player, boat("B", &[64_000])];
        let standings = Standings::from_boats(&boats);
        assert_eq!(standings.player_rank(), Some(2));
        assert_eq!(standings.leader().map(|e| e.name.as_str()), Some("A"));
    }

    #[test]
    fn test_empty() {
        let standings = Standings::new();
        assert!(standings.is_empty());
        assert_eq!(standings.player_rank(), None);
    }

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(65_432), "1:05.432");
        assert_eq!(format_time(999), "0:00.999");
    }
}
