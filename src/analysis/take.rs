use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::dsp::{note, pitch, stats};

/// Pitch summary of one recorded take, in MIDI units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PitchStats {
    /// 5th percentile of detected pitch (effective lowest note)
    pub min: f32,
    /// 95th percentile of detected pitch (effective highest note)
    pub max: f32,
    /// Median detected pitch
    pub median: f32,
    /// Fraction of frames with a detected pitch (0.0 to 1.0)
    pub confidence: f32,
}

/// Analyze one take: track its pitch and reduce the track to MIDI statistics.
///
/// Percentiles are used instead of min/max so a stray frame (a breath
/// catching an octave error, a bump on the mic) does not set the extremes.
pub fn analyze_take(
    samples: &[f32],
    sample_rate: u32,
    pitch_config: &pitch::PitchConfig,
) -> Result<PitchStats> {
    let track = pitch::extract_pitch_track(samples, sample_rate, pitch_config);
    let confidence = pitch::voiced_fraction(&track);

    let midi = stats::sorted_finite(
        pitch::voiced_frequencies(&track)
            .into_iter()
            .map(note::frequency_to_midi),
    );

    let (Some(min), Some(median), Some(max)) = (
        stats::percentile(&midi, 0.05),
        stats::percentile(&midi, 0.5),
        stats::percentile(&midi, 0.95),
    ) else {
        anyhow::bail!(
            "No voiced frames detected in take. \
             Recording may be silent, too quiet, or shorter than one analysis window."
        );
    };

    Ok(PitchStats {
        min,
        max,
        median,
        confidence,
    })
}
