use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use console::style;
use rodio::buffer::SamplesBuffer;
use rodio::{Decoder, OutputStream, Sink};

use crate::config::ToneConfig;
use crate::tones::{self, PatternDefinition, ToneProfile};

/// Play mono f32 samples on the default output device and block until done.
pub fn play_samples(samples: Vec<f32>, sample_rate: u32) -> Result<()> {
    // `_stream` must stay alive until playback ends; dropping it cuts the audio.
    let (_stream, stream_handle) =
        OutputStream::try_default().context("Failed to open audio output device")?;
    let sink = Sink::try_new(&stream_handle).context("Failed to create audio sink")?;

    sink.append(SamplesBuffer::new(1, sample_rate, samples));
    sink.sleep_until_end();

    Ok(())
}

/// Play back a recorded take.
pub fn play_file(path: &Path) -> Result<()> {
    if !path.exists() {
        anyhow::bail!("File not found: {}", path.display());
    }

    println!("Playing {}", style(path.display()).green());

    let (_stream, stream_handle) =
        OutputStream::try_default().context("Failed to open audio output device")?;
    let sink = Sink::try_new(&stream_handle).context("Failed to create audio sink")?;

    let file = File::open(path)
        .with_context(|| format!("Failed to open: {}", path.display()))?;
    let source = Decoder::new(BufReader::new(file))
        .with_context(|| format!("Failed to decode: {}", path.display()))?;

    sink.append(source);
    sink.sleep_until_end();

    println!("Done.");
    Ok(())
}

/// Play a profile's low and high patterns, or render them to WAV files in
/// `out_dir` when one is given.
pub fn run_patterns(
    profile: ToneProfile,
    variant: usize,
    config: &ToneConfig,
    out_dir: Option<&Path>,
) -> Result<()> {
    let patterns = tones::pattern_set(profile, variant);

    for pattern in &patterns {
        print_pattern(pattern);

        let samples = tones::synthesize_pattern(
            pattern,
            config.note_duration_ms,
            config.gap_ms,
            config.sample_rate,
        );

        match out_dir {
            Some(dir) => {
                let path = pattern_path(dir, pattern);
                crate::audio::wav::write_samples(&path, &samples, config.sample_rate)?;
                println!("     Saved to {}", style(path.display()).green());
            }
            None => play_samples(samples, config.sample_rate)?,
        }
        println!();
    }

    Ok(())
}

fn pattern_path(dir: &Path, pattern: &PatternDefinition) -> PathBuf {
    dir.join(format!("{}.wav", pattern.id))
}

fn print_pattern(pattern: &PatternDefinition) {
    println!(
        "  {} {}",
        style(&pattern.label).cyan().bold(),
        style(format!("[{}]", pattern.id)).dim()
    );
    println!("     {}", pattern.description);

    let notes: Vec<String> = pattern
        .frequencies
        .iter()
        .map(|&f| {
            let midi = crate::dsp::note::frequency_to_midi(f);
            crate::dsp::note::note_name(midi).unwrap_or_else(|| format!("{f:.0} Hz"))
        })
        .collect();
    println!("     Notes: {}", notes.join(" "));
}
