//! Championship save records
//!
//! Features:
//! - Compact big-endian binary record (leg counter plus every boat's leg times)
//! - JSON form of the same record
//! - Decoding failures reported as `SaveError`; the caller keeps its in-memory state

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::championship::Championship;

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("save record truncated: needed {needed} bytes, found {available}")]
    Truncated { needed: usize, available: usize },
    #[error("negative {field} in save record: {value}")]
    NegativeCount { field: &'static str, value: i32 },
    #[error("{0} unexpected trailing bytes in save record")]
    TrailingBytes(usize),
    #[error("boat {boat} has {found} leg times, record expects {expected}")]
    MismatchedTimes { boat: usize, expected: usize, found: usize },
    #[error("boat {boat} leg time {time_ms}ms does not fit the record")]
    TimeOutOfRange { boat: usize, time_ms: u32 },
    #[error("save file: {0}")]
    Io(#[from] std::io::Error),
}

/// Everything needed to resume a championship between legs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveRecord {
    /// Legs completed
    pub leg: u32,
    pub player_times: Vec<u32>,
    /// One list per AI boat, in roster order
    pub ai_times: Vec<Vec<u32>>,
}

impl SaveRecord {
    /// Snapshot the completed qualifying legs
    pub fn capture(champ: &Championship) -> Self {
        let leg = champ.current_leg().min(champ.settings.qualifying_legs);
        let first = |times: &[u32]| times.iter().take(leg as usize).copied().collect::<Vec<_>>();
        Self {
            leg,
            player_times: first(champ.player().leg_times()),
            ai_times: champ.ai_boats().map(|b| first(b.leg_times())).collect(),
        }
    }

    /// Restore leg times and the leg counter; AI lists beyond the roster are ignored
    pub fn apply(&self, champ: &mut Championship) {
        champ.player_mut().set_leg_times(self.player_times.clone());
        for (boat, times) in champ.ai_boats_mut().zip(&self.ai_times) {
            boat.set_leg_times(times.clone());
        }
        champ.set_current_leg(self.leg);
        log::info!("Restored championship at leg {}", champ.current_leg() + 1);
    }

    /// `[leg][ai_count][player times][ai times]`, each a big-endian i32.
    ///
    /// Every boat contributes exactly `leg` times.
    pub fn encode(&self) -> Result<Vec<u8>, SaveError> {
        let expected = self.leg as usize;
        let lists = std::iter::once(&self.player_times).chain(&self.ai_times);
        for (boat, times) in lists.clone().enumerate() {
            if times.len() != expected {
                return Err(SaveError::MismatchedTimes {
                    boat,
                    expected,
                    found: times.len(),
                });
            }
        }

        let mut out = Vec::with_capacity(4 * (2 + expected * (1 + self.ai_times.len())));
        out.extend_from_slice(&(self.leg as i32).to_be_bytes());
        out.extend_from_slice(&(self.ai_times.len() as i32).to_be_bytes());
        for (boat, times) in lists.enumerate() {
            for &time_ms in times {
                let t = i32::try_from(time_ms).map_err(|_| SaveError::TimeOutOfRange { boat, time_ms })?;
                out.extend_from_slice(&t.to_be_bytes());
            }
        }
        Ok(out)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, SaveError> {
        let mut reader = Reader { bytes, pos: 0 };
        let leg = reader.count("leg")?;
        let ai_count = reader.count("boat count")?;

        // Size check up front so a hostile count can't drive a huge allocation
        let needed = (leg as usize)
            .saturating_mul(1 + ai_count as usize)
            .saturating_add(2)
            .saturating_mul(4);
        if bytes.len() < needed {
            return Err(SaveError::Truncated {
                needed,
                available: bytes.len(),
            });
        }

        let player_times = reader.times(leg)?;
        let ai_times = (0..ai_count)
            .map(|_| reader.times(leg))
            .collect::<Result<Vec<_>, _>>()?;

        let trailing = bytes.len() - reader.pos;
        if trailing > 0 {
            return Err(SaveError::TrailingBytes(trailing));
        }

        Ok(Self {
            leg,
            player_times,
            ai_times,
        })
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn write_file(&self, path: impl AsRef<Path>) -> Result<(), SaveError> {
        std::fs::write(path, self.encode()?)?;
        Ok(())
    }

    pub fn read_file(path: impl AsRef<Path>) -> Result<Self, SaveError> {
        Self::decode(&std::fs::read(path)?)
    }
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl Reader<'_> {
    fn i32(&mut self) -> Result<i32, SaveError> {
        let end = self.pos + 4;
        let chunk = self.bytes.get(self.pos..end).ok_or(SaveError::Truncated {
            needed: end,
            available: self.bytes.len(),
        })?;
        self.pos = end;
        Ok(i32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
    }

    fn count(&mut self, field: &'static str) -> Result<u32, SaveError> {
        let value = self.i32()?;
        u32::try_from(value).map_err(|_| SaveError::NegativeCount { field, value })
    }

    fn times(&mut self, n: u32) -> Result<Vec<u32>, SaveError> {
        (0..n).map(|_| self.count("leg time")).collect()
    }
}
