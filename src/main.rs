mod cli;

use std::path::Path;

use ambitus::analysis::analyzer::{self, TakeSources};
use ambitus::analysis::take;
use ambitus::audio::{devices, mic_check, playback, recorder, wav};
use ambitus::classify::range::{classify_vocal_range, ClassificationInput};
use ambitus::config::{self, AppConfig};
use ambitus::dsp::pitch::PitchConfig;
use ambitus::paths;
use ambitus::tones::ToneProfile;
use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Command};
use console::style;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = config::load_config()?;

    match cli.command {
        Command::Classify {
            low,
            high,
            speaking,
            grouping,
            json,
        } => {
            let grouping = grouping.unwrap_or(config.profile.grouping);
            let input = ClassificationInput {
                lowest_midi: low,
                highest_midi: high,
                speaking_median_midi: speaking,
                grouping,
            };
            let result = classify_vocal_range(&input);

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                analyzer::print_classification(&result, grouping);
            }
            Ok(())
        }

        Command::Detect { path, json } => detect(&path, json, &config),

        Command::Analyze {
            speaking,
            song,
            range,
            date,
            grouping,
            json,
        } => {
            let grouping = grouping.unwrap_or(config.profile.grouping);
            let explicit = TakeSources {
                speaking,
                song,
                range,
            };

            let sources = if explicit.is_empty() {
                let date = cli::resolve_date(date.as_deref())?;
                if !json {
                    println!("{} {}", style("Session:").bold(), date);
                    println!();
                }
                TakeSources::latest_on(&date)
            } else {
                explicit
            };

            let report = analyzer::analyze_session(&sources, grouping, &config, !json)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            }
            Ok(())
        }

        Command::Record { step, date } => {
            let date = cli::resolve_date(date.as_deref())?;
            recorder::record_step(step, &date, &config)?;
            Ok(())
        }

        Command::Tones {
            profile,
            variant,
            out,
        } => {
            let profile =
                profile.unwrap_or_else(|| ToneProfile::for_grouping(config.profile.grouping));
            println!(
                "{} {profile}, variant {variant}",
                style("Reference tones:").bold()
            );
            println!();
            playback::run_patterns(profile, variant, &config.tones, out.as_deref())
        }

        Command::Play { path } => playback::play_file(&path),

        Command::MicCheck => mic_check::run(&config.recording.device),

        Command::Devices => devices::list_devices(),

        Command::Paths => {
            print_paths();
            Ok(())
        }
    }
}

fn detect(path: &Path, json: bool, config: &AppConfig) -> Result<()> {
    let (samples, sample_rate) =
        wav::load_mono(path).with_context(|| format!("Failed to load {}", path.display()))?;
    let pitch_config: PitchConfig = (&config.detection).into();
    let stats = take::analyze_take(&samples, sample_rate, &pitch_config)?;

    if json {
        let out = serde_json::json!({
            "path": path,
            "sample_rate": sample_rate,
            "duration_secs": samples.len() as f32 / sample_rate.max(1) as f32,
            "stats": stats,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("{} {}", style("Take:").bold(), path.display());
        analyzer::print_take(&stats);
    }
    Ok(())
}

fn print_paths() {
    let config_file = paths::config_file();
    let exists = if config_file.exists() {
        style("(found)").green()
    } else {
        style("(not found, using defaults)").dim()
    };

    println!("  Config:      {} {exists}", config_file.display());
    println!("  Data:        {}", paths::data_dir().display());
    println!("  Recordings:  {}", paths::recordings_dir().display());
}
