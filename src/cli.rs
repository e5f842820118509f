//! Command-line interface parsing for Pitwall
//!
//! This module handles parsing of CLI arguments using clap: one subcommand
//! per season query, plus the global `--config` and `--json` flags.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use thiserror::Error;

use crate::season::SessionKind;

/// Error types for CLI argument parsing
#[derive(Debug, Error)]
pub enum CliError {
    /// The specified session name is not recognized
    #[error("Invalid session: '{0}'. Valid sessions: race, qualifying, sprint, pitstops")]
    InvalidSession(String),
}

/// Pitwall - Formula 1 schedules, standings and season statistics
#[derive(Parser, Debug)]
#[command(name = "pitwall")]
#[command(about = "Formula 1 schedules, standings and season statistics")]
#[command(version)]
pub struct Cli {
    /// Path to a config file (defaults to ~/.config/pitwall/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Print JSON instead of formatted text
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Which championship to show
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Championship {
    Drivers,
    Constructors,
    /// Both championships together
    Both,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Season calendar
    Schedule {
        /// Season (defaults to the current year)
        year: Option<u16>,

        /// Only the last five completed races
        #[arg(long)]
        recent: bool,
    },

    /// Completed rounds of a season
    ///
    /// Years outside 1950 through next season fall back to the current one.
    Results {
        /// Season, e.g. 2008
        year: String,
    },

    /// Championship standings
    Standings {
        #[arg(value_enum)]
        championship: Championship,

        /// Season (defaults to the current year)
        year: Option<u16>,
    },

    /// Sessions with data for one round
    Sessions { year: u16, round: u32 },

    /// One session of a round
    ///
    /// Valid sessions: race (or results), qualifying (or quali), sprint, pitstops
    Session {
        year: u16,
        round: u32,
        #[arg(value_name = "SESSION", value_parser = parse_session_arg)]
        kind: SessionKind,
    },

    /// Season statistics for a driver
    Driver {
        /// Driver id, e.g. max_verstappen
        id: String,

        /// Season (defaults to the current year)
        #[arg(long)]
        year: Option<u16>,

        /// Also show the latest headlines about the driver
        #[arg(long)]
        news: bool,
    },

    /// Season statistics for a constructor
    Constructor {
        /// Constructor id, e.g. red_bull
        id: String,

        /// Season (defaults to the current year)
        #[arg(long)]
        year: Option<u16>,

        /// Also show the latest headlines about the team
        #[arg(long)]
        news: bool,
    },

    /// Drivers entered in a season
    Drivers { year: Option<u16> },

    /// Constructors entered in a season
    Teams { year: Option<u16> },

    /// Check whether the F1 API is reachable
    Health,

    /// Latest headlines for a search query
    News {
        query: String,

        /// Maximum number of headlines
        #[arg(long)]
        limit: Option<usize>,
    },
}

/// Parses a session string argument into a SessionKind.
///
/// # Returns
/// * `Ok(SessionKind)` if the string names a session or one of its aliases
/// * `Err(CliError::InvalidSession)` otherwise
pub fn parse_session_arg(s: &str) -> Result<SessionKind, CliError> {
    SessionKind::from_name(s).ok_or_else(|| CliError::InvalidSession(s.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_session_arg_aliases() {
        assert_eq!(parse_session_arg("race").unwrap(), SessionKind::Race);
        assert_eq!(parse_session_arg("results").unwrap(), SessionKind::Race);
        assert_eq!(parse_session_arg("quali").unwrap(), SessionKind::Qualifying);
        assert_eq!(parse_session_arg("Qualifying").unwrap(), SessionKind::Qualifying);
        assert_eq!(parse_session_arg("sprint").unwrap(), SessionKind::Sprint);
        assert_eq!(parse_session_arg("pitstops").unwrap(), SessionKind::PitStops);
    }

    #[test]
    fn test_parse_session_arg_invalid() {
        let result = parse_session_arg("fp1");
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(err.to_string().contains("Invalid session"));
        assert!(err.to_string().contains("fp1"));
    }

    #[test]
    fn test_cli_parse_schedule_defaults() {
        let cli = Cli::parse_from(["pitwall", "schedule"]);
        assert_eq!(
            cli.command,
            Command::Schedule {
                year: None,
                recent: false
            }
        );
        assert!(!cli.json);
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_cli_parse_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["pitwall", "standings", "drivers", "2024", "--json"]);
        assert!(cli.json);
        assert_eq!(
            cli.command,
            Command::Standings {
                championship: Championship::Drivers,
                year: Some(2024)
            }
        );
    }

    #[test]
    fn test_cli_parse_session() {
        let cli = Cli::parse_from(["pitwall", "session", "2024", "6", "quali"]);
        match cli.command {
            Command::Session { year, round, kind } => {
                assert_eq!((year, round), (2024, 6));
                assert_eq!(kind, SessionKind::Qualifying);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_cli_rejects_unknown_session_while_parsing() {
        let err = Cli::try_parse_from(["pitwall", "session", "2024", "6", "fp1"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
        assert!(err.to_string().contains("Invalid session: 'fp1'"));
    }

    #[test]
    fn test_cli_parse_driver_with_year() {
        let cli = Cli::parse_from(["pitwall", "driver", "norris", "--year", "2024"]);
        assert_eq!(
            cli.command,
            Command::Driver {
                id: "norris".to_string(),
                year: Some(2024),
                news: false
            }
        );
    }

    #[test]
    fn test_cli_parse_config_path() {
        let cli = Cli::parse_from(["pitwall", "--config", "/tmp/pitwall.toml", "health"]);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/pitwall.toml")));
        assert_eq!(cli.command, Command::Health);
    }

    #[test]
    fn test_cli_rejects_unknown_championship() {
        assert!(Cli::try_parse_from(["pitwall", "standings", "teams"]).is_err());
    }

    #[test]
    fn test_cli_results_year_is_free_text() {
        let cli = Cli::parse_from(["pitwall", "results", "nineteen"]);
        assert_eq!(
            cli.command,
            Command::Results {
                year: "nineteen".to_string()
            }
        );
    }
}
