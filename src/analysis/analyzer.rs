use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use console::style;

use super::session::{self, SessionReport, SessionTakes, SkippedTake, Step};
use super::take::{self, PitchStats};
use crate::audio::wav;
use crate::classify::range::{ClassificationResult, Grouping};
use crate::config::AppConfig;
use crate::dsp::note;
use crate::dsp::pitch::PitchConfig;
use crate::paths;

/// Where each step's take comes from.
#[derive(Debug, Clone, Default)]
pub struct TakeSources {
    pub speaking: Option<PathBuf>,
    pub song: Option<PathBuf>,
    pub range: Option<PathBuf>,
}

impl TakeSources {
    fn get(&self, step: Step) -> Option<&Path> {
        match step {
            Step::Speaking => self.speaking.as_deref(),
            Step::Song => self.song.as_deref(),
            Step::Range => self.range.as_deref(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.speaking.is_none() && self.song.is_none() && self.range.is_none()
    }

    /// The latest recorded attempt of every step on a date.
    pub fn latest_on(date: &NaiveDate) -> Self {
        Self {
            speaking: paths::latest_attempt_path(date, Step::Speaking.as_str()),
            song: paths::latest_attempt_path(date, Step::Song.as_str()),
            range: paths::latest_attempt_path(date, Step::Range.as_str()),
        }
    }
}

/// Analyze every available take and classify the session.
///
/// Each step with a source file is loaded, tracked and reduced to pitch
/// statistics. A take with no voiced frames is reported and skipped rather
/// than failing the whole session. When `verbose` is false nothing is
/// printed, which is what `--json` wants.
pub fn analyze_session(
    sources: &TakeSources,
    grouping: Grouping,
    app_config: &AppConfig,
    verbose: bool,
) -> Result<SessionReport> {
    if sources.is_empty() {
        anyhow::bail!(
            "No takes to analyze. Record some with `ambitus record <step>` \
             or pass WAV files with --speaking/--song/--range."
        );
    }

    let pitch_config: PitchConfig = (&app_config.detection).into();
    let mut takes = SessionTakes::default();
    let mut skipped = Vec::new();

    for step in Step::ALL {
        let Some(path) = sources.get(step) else {
            if verbose {
                println!("  {} no {step} take, skipping", style("SKIP").yellow());
            }
            continue;
        };

        if verbose {
            println!("  {} {step}", style(">>").cyan());
        }

        let (samples, sample_rate) = wav::load_mono(path)
            .with_context(|| format!("Failed to load {}", path.display()))?;

        if verbose {
            let duration = samples.len() as f32 / sample_rate as f32;
            println!("     Loaded: {duration:.1}s, {sample_rate} Hz");
        }

        match take::analyze_take(&samples, sample_rate, &pitch_config) {
            Ok(stats) => {
                if verbose {
                    print_take(&stats);
                }
                takes.set(step, stats);
            }
            // Warnings go to stderr so `--json` output stays parseable.
            Err(err) => {
                eprintln!("     {} {step}: {err}", style("WARNING").red().bold());
                skipped.push(SkippedTake {
                    step,
                    reason: err.to_string(),
                });
            }
        }

        if verbose {
            println!();
        }
    }

    let mut report = session::classify_session(takes, grouping);
    report.skipped = skipped;

    if verbose {
        match &report.classification {
            Some(result) => print_classification(result, grouping),
            None => println!(
                "{} Not enough pitched audio to classify. \
                 Capture speaking, song and range takes and try again.",
                style("NOTE").yellow().bold()
            ),
        }
    }

    Ok(report)
}

/// Format a MIDI value with its note name, e.g. "57.0 (A3)".
pub fn midi_label(midi: f32) -> String {
    match note::note_name(midi) {
        Some(name) => format!("{midi:.1} ({name})"),
        None => "--".into(),
    }
}

pub fn print_take(stats: &PitchStats) {
    println!(
        "     Low:        {}  {:.1} Hz",
        midi_label(stats.min),
        note::midi_to_frequency(stats.min)
    );
    println!(
        "     High:       {}  {:.1} Hz",
        midi_label(stats.max),
        note::midi_to_frequency(stats.max)
    );
    println!("     Median:     {}", midi_label(stats.median));
    println!("     Voiced:     {:.0}%", stats.confidence * 100.0);
}

pub fn print_classification(result: &ClassificationResult, grouping: Grouping) {
    println!(
        "{} {}",
        style("Likely").bold(),
        style(result.category).green().bold()
    );
    println!("  Grouping:        {grouping}");
    println!("  Confidence:      {:.0}%", result.confidence * 100.0);
    println!("  Coverage:        {:.0}%", result.coverage * 100.0);
    println!(
        "  Suggested range: {} to {}",
        midi_label(result.suggested_range.min),
        midi_label(result.suggested_range.max)
    );
    match result.voice_category {
        Some(category) => println!("  Tessitura band:  {category}"),
        None => println!("  Tessitura band:  {}", style("(span wider than any band)").dim()),
    }
}
