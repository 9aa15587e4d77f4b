use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use super::capture::{self, InputCapture};
use super::recorder;
use crate::dsp::level;

const CAPTURE_SECONDS: u64 = 2;

/// What a short capture says about the microphone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MicVerdict {
    Silent,
    Quiet,
    Ok,
}

/// Levels measured over a mic-check capture.
#[derive(Debug, Clone, Copy)]
pub struct MicLevels {
    /// RMS on the 0..=1 meter scale.
    pub level: f32,
    /// RMS in dBFS mapped onto 0..=1 (-72 dB to -12 dB).
    pub loudness: f32,
    pub peak_db: f32,
    pub rms_db: f32,
}

impl MicLevels {
    pub fn measure(samples: &[f32]) -> Self {
        let rms_db = level::rms_db(samples);
        Self {
            level: level::compute_rms_level(samples),
            loudness: level::normalise_decibels(rms_db),
            peak_db: level::peak_db(samples),
            rms_db,
        }
    }

    pub fn verdict(&self) -> MicVerdict {
        if self.peak_db < -60.0 {
            MicVerdict::Silent
        } else if self.peak_db < -30.0 {
            MicVerdict::Quiet
        } else {
            MicVerdict::Ok
        }
    }
}

/// Run a quick 2-second mic check: capture audio and report its levels.
///
/// Waits for Enter before capturing, so the user knows exactly when the mic
/// is live.
pub fn run(device_name: &str) -> Result<()> {
    println!(
        "  Press {} to capture a 2-second sample.",
        style("Enter").green().bold()
    );

    recorder::wait_for_enter()?;

    let input = capture::start(device_name)?;
    println!();
    println!("  Device:  {}", style(&input.device_name).cyan().bold());
    println!("  Rate:    {} Hz", input.sample_rate);
    println!();

    let pb = ProgressBar::new(CAPTURE_SECONDS * 10);
    pb.set_style(
        ProgressStyle::with_template("  Listening {bar:30.green/dim} {elapsed_precise}")
            .context("Invalid progress template")?,
    );

    let capture_duration = Duration::from_secs(CAPTURE_SECONDS);
    let tick = Duration::from_millis(100);
    let start = Instant::now();

    let mut samples = Vec::new();

    while start.elapsed() < capture_duration {
        while let Ok(chunk) = input.chunks.try_recv() {
            samples.extend(chunk);
        }
        std::thread::sleep(tick);
        pb.set_position((start.elapsed().as_millis() / 100) as u64);
    }

    let InputCapture { stream, chunks, .. } = input;
    drop(stream);
    samples.extend(chunks.try_iter().flatten());

    pb.finish_and_clear();

    if samples.is_empty() {
        eprintln!(
            "  {} No samples captured. Check your microphone connection.",
            style("WARNING").red().bold()
        );
        return Ok(());
    }

    let levels = MicLevels::measure(&samples);

    println!("  Level:       {:.2}", levels.level);
    println!("  Loudness:    {:.2}", levels.loudness);
    println!("  Peak level:  {:.1} dB", levels.peak_db);
    println!("  RMS level:   {:.1} dB", levels.rms_db);
    println!();

    match levels.verdict() {
        MicVerdict::Silent => {
            eprintln!(
                "  {} Peak is below -60 dB. The mic may be muted or disconnected.",
                style("WARNING").red().bold()
            );
            eprintln!("  Run `ambitus devices` to check available inputs.");
        }
        MicVerdict::Quiet => println!(
            "  {} Signal detected but quiet. Consider increasing mic gain.",
            style("NOTE").yellow().bold()
        ),
        MicVerdict::Ok => println!("  {} Mic is working.", style("OK").green().bold()),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn silence_is_silent() {
        let levels = MicLevels::measure(&[0.0; 1000]);
        assert_eq!(levels.level, 0.0);
        assert_eq!(levels.loudness, 0.0);
        assert_eq!(levels.verdict(), MicVerdict::Silent);
    }

    #[test]
    fn quiet_signal() {
        // Peak of 0.01 is -40 dB
        let levels = MicLevels::measure(&[0.01, -0.01, 0.01, -0.01]);
        assert_eq!(levels.verdict(), MicVerdict::Quiet);
        assert!(levels.loudness > 0.5 && levels.loudness < 0.6);
    }

    #[test]
    fn healthy_signal() {
        let levels = MicLevels::measure(&[0.3, -0.3, 0.3, -0.3]);
        assert_eq!(levels.verdict(), MicVerdict::Ok);
        assert!((levels.level - 0.6).abs() < 1e-5);
        // -12 dB and above saturates the loudness scale
        assert_eq!(levels.loudness, 1.0);
    }
}
