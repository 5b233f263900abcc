//! Pixel Regatta headless runner
//!
//! Races a seeded championship with the player boat on autopilot and prints
//! the final standings.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use pixel_regatta::consts::SIM_DT;
use pixel_regatta::persistence::SaveRecord;
use pixel_regatta::sim::{BoatClass, TickInput};
use pixel_regatta::standings::format_time;
use pixel_regatta::{Championship, DifficultyLevel, RaceSettings};

#[derive(Parser, Debug)]
#[command(name = "pixel-regatta")]
#[command(about = "Race a seeded boat championship headlessly and print the standings")]
struct Cli {
    #[arg(long, default_value_t = 12345)]
    seed: u64,
    /// Overrides the difficulty from the settings file
    #[arg(long, value_enum)]
    difficulty: Option<CliDifficulty>,
    /// Boats in the championship, player included
    #[arg(long, default_value_t = 14)]
    roster: usize,
    /// JSON race settings
    #[arg(long)]
    settings: Option<PathBuf>,
    /// Save record, resumed from if present and rewritten after every leg
    #[arg(long)]
    save: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum CliDifficulty {
    Easy,
    Medium,
    Hard,
}

impl From<CliDifficulty> for DifficultyLevel {
    fn from(value: CliDifficulty) -> Self {
        match value {
            CliDifficulty::Easy => DifficultyLevel::Easy,
            CliDifficulty::Medium => DifficultyLevel::Medium,
            CliDifficulty::Hard => DifficultyLevel::Hard,
        }
    }
}

fn load_settings(path: Option<&Path>) -> Result<RaceSettings> {
    let Some(path) = path else {
        return Ok(RaceSettings::default());
    };
    let json =
        std::fs::read_to_string(path).with_context(|| format!("reading settings {}", path.display()))?;
    RaceSettings::from_json(&json).with_context(|| format!("parsing settings {}", path.display()))
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Cli::parse();
    let mut settings = load_settings(args.settings.as_deref())?;
    if let Some(difficulty) = args.difficulty {
        settings.difficulty = difficulty.into();
    }

    log::info!(
        "Pixel Regatta starting: seed {}, {} boats, {}",
        args.seed,
        args.roster,
        settings.difficulty.as_str()
    );

    let target = settings.difficulty.ai_target_speed();
    let mut champ = Championship::new(settings, args.roster, BoatClass::Standard, args.seed);
    champ.player_mut().set_autopilot(Some(target));

    if let Some(path) = args.save.as_deref() {
        match SaveRecord::read_file(path) {
            Ok(record) => record.apply(&mut champ),
            Err(e) => log::warn!("Ignoring save {}: {}", path.display(), e),
        }
    }

    let input = TickInput::default();
    while champ.start_leg() {
        while !champ.tick(&input, SIM_DT) {}

        if let Some(path) = args.save.as_deref() {
            if let Err(e) = SaveRecord::capture(&champ).write_file(path) {
                log::warn!("Could not write save {}: {}", path.display(), e);
            }
        }
    }

    let standings = champ.standings();
    println!("{:>4}  {:<12} {:>10} {:>10}", "Pos", "Boat", "Best", "Total");
    for (rank, entry) in standings.entries.iter().enumerate() {
        println!(
            "{:>4}  {:<12} {:>10} {:>10}",
            rank + 1,
            entry.name,
            entry.best_ms.map_or_else(|| "-".to_string(), |t| format_time(t as u64)),
            format_time(entry.total_ms)
        );
    }
    if let Some(leader) = standings.leader() {
        println!("\nChampion: {} ({})", leader.name, format_time(leader.total_ms));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_defaults_and_flags() {
        let cli = Cli::try_parse_from(["pixel-regatta"]).unwrap();
        assert_eq!(cli.seed, 12345);
        assert_eq!(cli.roster, 14);
        assert!(cli.difficulty.is_none() && cli.save.is_none());

        let cli = Cli::try_parse_from(["pixel-regatta", "--seed", "7", "--difficulty", "hard", "--save", "run.sav"])
            .unwrap();
        assert_eq!(cli.seed, 7);
        assert_eq!(cli.difficulty.map(DifficultyLevel::from), Some(DifficultyLevel::Hard));
        assert_eq!(cli.save, Some(PathBuf::from("run.sav")));

        assert!(Cli::try_parse_from(["pixel-regatta", "--difficulty", "extreme"]).is_err());
    }

    #[test]
    fn test_missing_settings_file_is_reported() {
        let err = load_settings(Some(Path::new("/nonexistent/regatta.json"))).unwrap_err();
        assert!(err.to_string().contains("regatta.json"));
    }
}
