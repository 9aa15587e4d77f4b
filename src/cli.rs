use std::path::PathBuf;

use ambitus::analysis::session::Step;
use ambitus::classify::range::Grouping;
use ambitus::tones::ToneProfile;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "ambitus")]
#[command(about = "Estimate your vocal range from recorded takes")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Classify a range given its lowest and highest MIDI notes
    Classify {
        /// Lowest comfortable note (MIDI, e.g. 57 for A3)
        #[arg(long)]
        low: f32,

        /// Highest comfortable note (MIDI)
        #[arg(long)]
        high: f32,

        /// Median speaking pitch (MIDI)
        #[arg(long)]
        speaking: Option<f32>,

        /// Which range family to consider (defaults to config)
        #[arg(long, value_enum)]
        grouping: Option<Grouping>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Detect the pitch statistics of one WAV take
    Detect {
        /// Path to a WAV file
        path: PathBuf,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Analyze a session's takes and classify the range
    Analyze {
        /// Speaking take (WAV)
        #[arg(long)]
        speaking: Option<PathBuf>,

        /// Song take (WAV)
        #[arg(long)]
        song: Option<PathBuf>,

        /// Range take (WAV)
        #[arg(long)]
        range: Option<PathBuf>,

        /// Use the latest takes recorded on this date (defaults to today)
        #[arg(long)]
        date: Option<String>,

        /// Which range family to consider (defaults to config)
        #[arg(long, value_enum)]
        grouping: Option<Grouping>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Record one session step with a live level meter
    Record {
        #[arg(value_enum)]
        step: Step,

        /// Recording date (defaults to today)
        #[arg(long)]
        date: Option<String>,
    },

    /// Play or write the reference tone patterns
    Tones {
        /// Tone register (defaults to the configured grouping's)
        #[arg(long, value_enum)]
        profile: Option<ToneProfile>,

        /// Pattern variant; rotates the root notes
        #[arg(long, default_value_t = 0)]
        variant: usize,

        /// Write the patterns as WAV files here instead of playing them
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Play back a WAV take
    Play {
        /// Path to a WAV file
        path: PathBuf,
    },

    /// Quick 2-second mic level check
    MicCheck,

    /// List available audio input devices
    Devices,

    /// Show where data and config files are stored
    Paths,
}

/// Resolve a date string to a NaiveDate, defaulting to today.
pub fn resolve_date(date: Option<&str>) -> anyhow::Result<NaiveDate> {
    match date {
        Some(s) => Ok(NaiveDate::parse_from_str(s, "%Y-%m-%d")?),
        None => Ok(chrono::Local::now().date_naive()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_date_explicit() {
        let date = resolve_date(Some("2026-10-19")).unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2026, 10, 19).unwrap());
    }

    #[test]
    fn resolve_date_today() {
        let date = resolve_date(None).unwrap();
        assert_eq!(date, chrono::Local::now().date_naive());
    }

    #[test]
    fn resolve_date_invalid() {
        assert!(resolve_date(Some("not-a-date")).is_err());
    }

    #[test]
    fn parses_classify() {
        let cli = Cli::try_parse_from([
            "ambitus", "classify", "--low", "48", "--high", "67", "--grouping", "man",
        ])
        .unwrap();
        match cli.command {
            Command::Classify { low, high, speaking, grouping, json } => {
                assert_eq!(low, 48.0);
                assert_eq!(high, 67.0);
                assert_eq!(speaking, None);
                assert_eq!(grouping, Some(Grouping::Man));
                assert!(!json);
            }
            _ => panic!("expected classify"),
        }
    }

    #[test]
    fn parses_record_step() {
        let cli = Cli::try_parse_from(["ambitus", "record", "speaking"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Record { step: Step::Speaking, date: None }
        ));
    }

    #[test]
    fn parses_prefer_not_to_say() {
        let cli = Cli::try_parse_from([
            "ambitus", "analyze", "--grouping", "prefer-not-to-say", "--json",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Command::Analyze { grouping: Some(Grouping::PreferNotToSay), json: true, .. }
        ));
    }

    #[test]
    fn rejects_unknown_step() {
        assert!(Cli::try_parse_from(["ambitus", "record", "warmup"]).is_err());
    }

    #[test]
    fn verifies_command_tree() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
