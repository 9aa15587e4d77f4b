use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use console::style;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use indicatif::{ProgressBar, ProgressStyle};

use super::capture::{self, InputCapture};
use super::wav;
use crate::analysis::session::Step;
use crate::analysis::{analyzer, take};
use crate::config::AppConfig;
use crate::dsp::level;
use crate::dsp::pitch::PitchConfig;
use crate::paths;

/// Level below which a chunk counts as silence for auto-stop.
/// 0.02 on the meter is an RMS of 0.01, the detector's own silence gate.
const SILENT_LEVEL: f32 = 0.02;

/// Auto-stop never fires before this much audio has been captured.
const MIN_TAKE_SECS: f32 = 3.0;

/// How often the meter is refreshed while recording.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Stats returned after a take completes.
pub struct TakeStats {
    pub duration_secs: f32,
    pub peak_db: f32,
    pub rms_db: f32,
    pub sample_count: usize,
}

/// Restores cooked terminal mode when dropped, even on an early return.
struct RawMode;

impl RawMode {
    fn enable() -> Result<Self> {
        crossterm::terminal::enable_raw_mode().context("Failed to enable raw terminal mode")?;
        Ok(Self)
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        let _ = crossterm::terminal::disable_raw_mode();
    }
}

fn instructions(step: Step) -> &'static str {
    match step {
        Step::Speaking => "Spend about 20 seconds introducing yourself or describing your day.",
        Step::Song => "Sing a chorus or vocalise you love, hitting its highs and lows.",
        Step::Range => {
            "Match each reference tone with a sustained \"ah\" (run `ambitus tones` first). \
             Skip any pitch that feels strained."
        }
    }
}

/// Record one step of a session as the next numbered attempt for `date`,
/// then print its pitch summary.
pub fn record_step(step: Step, date: &NaiveDate, config: &AppConfig) -> Result<PathBuf> {
    let path = paths::next_attempt_path(date, step.as_str());

    println!("{} {}", style("Step:").bold(), style(step).cyan());
    println!("{} {}", style("Date:").bold(), date);
    println!("{} {}", style("Output:").bold(), path.display());
    println!();
    println!("  {}", instructions(step));
    println!();
    println!("Press {} to start recording.", style("Enter").green().bold());

    wait_for_enter()?;

    println!("Recording... press {} to stop.", style("Enter").red().bold());

    let (samples, sample_rate) = capture_take(config)?;
    let stats = take_stats(&samples, sample_rate);

    println!();
    println!("  Duration:  {:.1}s", stats.duration_secs);
    println!("  Samples:   {}", stats.sample_count);
    println!("  Peak:      {:.1} dB", stats.peak_db);
    println!("  RMS:       {:.1} dB", stats.rms_db);

    if stats.peak_db < -60.0 {
        eprintln!();
        eprintln!(
            "  {} Take appears silent. Check your microphone.",
            style("WARNING").red().bold()
        );
    }

    save_take(&path, &samples, sample_rate)?;
    println!();
    println!("  Saved to {}", style(path.display()).green());
    println!();

    let pitch_config: PitchConfig = (&config.detection).into();
    match take::analyze_take(&samples, sample_rate, &pitch_config) {
        Ok(pitch_stats) => analyzer::print_take(&pitch_stats),
        Err(err) => eprintln!("  {} {err}", style("NOTE").yellow().bold()),
    }

    Ok(path)
}

/// Capture from the configured input until Enter (or sustained silence, when
/// auto-stop is configured), showing a live level meter.
fn capture_take(config: &AppConfig) -> Result<(Vec<f32>, u32)> {
    let input = capture::start(&config.recording.device)?;
    let sample_rate = input.sample_rate;

    let meter = ProgressBar::new(100);
    meter.set_style(
        ProgressStyle::with_template("  Level {bar:30.green/dim} {msg}")
            .context("Invalid progress template")?,
    );

    let auto_stop = config.recording.auto_stop_silence_secs;
    let started = Instant::now();
    let mut samples = Vec::new();
    let mut silent_secs = 0.0_f32;

    {
        let _raw = RawMode::enable()?;

        loop {
            while let Ok(chunk) = input.chunks.try_recv() {
                let level = level::compute_rms_level(&chunk);
                let chunk_secs = chunk.len() as f32 / sample_rate as f32;

                if level < SILENT_LEVEL {
                    silent_secs += chunk_secs;
                } else {
                    silent_secs = 0.0;
                }

                meter.set_position((level * 100.0) as u64);
                samples.extend(chunk);
            }

            meter.set_message(format!("{:.1}s", started.elapsed().as_secs_f32()));

            let captured_secs = samples.len() as f32 / sample_rate as f32;
            if auto_stop > 0.0 && captured_secs >= MIN_TAKE_SECS && silent_secs >= auto_stop {
                break;
            }

            if enter_pressed(POLL_INTERVAL)? {
                break;
            }
        }
    }

    // Dropping the stream stops the callback; collect whatever is in flight.
    let InputCapture { stream, chunks, .. } = input;
    drop(stream);
    samples.extend(chunks.try_iter().flatten());

    meter.finish_and_clear();

    Ok((samples, sample_rate))
}

fn take_stats(samples: &[f32], sample_rate: u32) -> TakeStats {
    TakeStats {
        duration_secs: samples.len() as f32 / sample_rate.max(1) as f32,
        peak_db: level::peak_db(samples),
        rms_db: level::rms_db(samples),
        sample_count: samples.len(),
    }
}

fn save_take(path: &Path, samples: &[f32], sample_rate: u32) -> Result<()> {
    wav::write_samples(path, samples, sample_rate)
        .with_context(|| format!("Failed to save take: {}", path.display()))
}

/// True if Enter was pressed within `timeout`.
fn enter_pressed(timeout: Duration) -> Result<bool> {
    if event::poll(timeout)? {
        if let Event::Key(key) = event::read()? {
            return Ok(key.kind == KeyEventKind::Press && key.code == KeyCode::Enter);
        }
    }
    Ok(false)
}

/// Block until the user presses Enter.
pub fn wait_for_enter() -> Result<()> {
    let _raw = RawMode::enable()?;
    while !enter_pressed(Duration::from_millis(100))? {}
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_of_half_scale_take() {
        let samples = vec![0.5; 44100];
        let stats = take_stats(&samples, 44100);
        assert!((stats.duration_secs - 1.0).abs() < 1e-6);
        assert!((stats.peak_db - (-6.02)).abs() < 0.1);
        assert!((stats.rms_db - (-6.02)).abs() < 0.1);
        assert_eq!(stats.sample_count, 44100);
    }

    #[test]
    fn stats_of_empty_take() {
        let stats = take_stats(&[], 48000);
        assert_eq!(stats.duration_secs, 0.0);
        assert!(stats.rms_db.is_infinite());
    }

    #[test]
    fn every_step_has_instructions() {
        for step in Step::ALL {
            assert!(!instructions(step).is_empty());
        }
    }

    #[test]
    fn saved_take_reloads() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("2026-10-19").join("song_001.wav");
        save_take(&path, &[0.25; 1000], 16000).unwrap();
        let (loaded, sample_rate) = wav::load_mono(&path).unwrap();
        assert_eq!(sample_rate, 16000);
        assert_eq!(loaded.len(), 1000);
    }
}
