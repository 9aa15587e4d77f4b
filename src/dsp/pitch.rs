use serde::{Deserialize, Serialize};

/// Shortest buffer the detector will look at. Anything shorter reports
/// no pitch instead of guessing.
pub const MIN_SAMPLES: usize = 1024;

/// Normalized correlation a lag must exceed to count as a period candidate.
const GOOD_ENOUGH_CORRELATION: f32 = 0.9;

/// RMS below which a buffer is treated as silence.
const SILENCE_RMS: f32 = 0.01;

/// Absolute amplitude that marks the edge of the signal when cropping.
const EDGE_THRESHOLD: f32 = 0.2;

/// Configuration for sliding the detector over a whole take.
#[derive(Debug, Clone)]
pub struct PitchConfig {
    /// Detector window in samples. 2048 is what a browser analyser node
    /// hands over per frame, and comfortably above `MIN_SAMPLES`.
    pub frame_size: usize,

    /// Advance between windows, in samples.
    pub hop_size: usize,

    /// Estimates below this are discarded as rumble or octave errors.
    pub pitch_floor_hz: f32,

    /// Estimates above this are discarded as whistle/noise artifacts.
    pub pitch_ceiling_hz: f32,
}

impl Default for PitchConfig {
    fn default() -> Self {
        Self {
            frame_size: 2048,
            hop_size: 1024,
            // Low enough for a bass's E2 with margin, high enough for a
            // soprano's C6.
            pitch_floor_hz: 60.0,
            pitch_ceiling_hz: 1500.0,
        }
    }
}

/// A single point in a pitch track: a timestamp and an optional frequency.
/// `None` means the frame was unvoiced (no detectable pitch).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PitchFrame {
    /// Time in seconds from the start of the take.
    pub time: f32,

    /// Detected fundamental frequency, or None if unvoiced.
    pub frequency: Option<f32>,
}

/// Estimate the fundamental frequency of a mono buffer by autocorrelation.
///
/// The signal is compared with shifted copies of itself. The first lag whose
/// normalized correlation climbs above 0.9 and then starts falling again is
/// taken as the period. A parabola through the correlations at the lags
/// either side of the peak moves it to its sub-sample position:
///
///   shift = (c[lag-1] - c[lag+1]) / (2 * (c[lag-1] - 2*c[lag] + c[lag+1]))
///   f0    = sample_rate / (lag + shift),  |shift| <= 0.5
///
/// Returns None for short buffers (< 1024 samples), silence, a zero sample
/// rate, or a signal with no positive self-similarity at all.
pub fn detect_pitch(samples: &[f32], sample_rate: u32) -> Option<f32> {
    if samples.len() < MIN_SAMPLES || sample_rate == 0 {
        return None;
    }

    if frame_rms(samples) < SILENCE_RMS {
        return None;
    }

    let window = crop_to_signal(samples);
    let size = window.len();
    let sr = sample_rate as f32;

    // Past half the window the overlap gets too short for a stable estimate.
    let max_lag = size / 2;
    let start = first_lag_after_zero_lobe(window, max_lag);

    let mut best_offset: Option<usize> = None;
    let mut best_correlation = 0.0_f32;
    let mut found_good_correlation = false;

    for offset in start..=max_lag {
        let correlation = normalized_correlation(window, offset);

        if correlation > GOOD_ENOUGH_CORRELATION && correlation > best_correlation {
            best_correlation = correlation;
            best_offset = Some(offset);
            found_good_correlation = true;
        } else if found_good_correlation {
            // The peak is behind us.
            break;
        } else if correlation > best_correlation {
            // Weaker candidate, used only if nothing clears the threshold.
            best_correlation = correlation;
            best_offset = Some(offset);
        }
    }

    best_offset.map(|offset| sr / refine_lag(window, offset))
}

/// Sub-sample position of a correlation peak at `lag`, from the parabola
/// through its neighbours. The offset never leaves [-0.5, 0.5], and a flat
/// or non-peaked neighbourhood keeps the integer lag.
fn refine_lag(window: &[f32], lag: usize) -> f32 {
    let before = normalized_correlation(window, lag - 1);
    let peak = normalized_correlation(window, lag);
    let after = normalized_correlation(window, lag + 1);

    let curvature = before - 2.0 * peak + after;
    if curvature >= 0.0 {
        return lag as f32;
    }

    let shift = 0.5 * (before - after) / curvature;
    lag as f32 + shift.clamp(-0.5, 0.5)
}

/// Crop leading and trailing quiet samples.
///
/// Scans the first half forward and the second half backward for the first
/// sample whose magnitude reaches `EDGE_THRESHOLD`. If none is found on a
/// side, that edge is kept.
fn crop_to_signal(samples: &[f32]) -> &[f32] {
    let len = samples.len();
    let half = len / 2;

    let start = samples[..half]
        .iter()
        .position(|s| s.abs() >= EDGE_THRESHOLD)
        .unwrap_or(0);

    let end = (1..half)
        .map(|i| len - i)
        .find(|&i| samples[i].abs() >= EDGE_THRESHOLD)
        .unwrap_or(len - 1);

    &samples[start..end]
}

/// Skip the lobe around lag zero, where every signal trivially matches
/// itself. Returns the first lag at which the correlation has dropped below
/// the threshold and stopped falling.
fn first_lag_after_zero_lobe(window: &[f32], max_lag: usize) -> usize {
    let mut previous = 1.0_f32;

    for lag in 1..=max_lag {
        let correlation = normalized_correlation(window, lag);
        if correlation < GOOD_ENOUGH_CORRELATION && correlation >= previous {
            return lag;
        }
        previous = correlation;
    }

    max_lag + 1
}

/// Correlation between the window and itself shifted by `lag`, normalized by
/// the energy of both overlapping parts so the result lies in [-1, 1]
/// regardless of loudness.
fn normalized_correlation(window: &[f32], lag: usize) -> f32 {
    if lag >= window.len() {
        return 0.0;
    }

    let head = &window[..window.len() - lag];
    let tail = &window[lag..];

    let (mut cross, mut head_energy, mut tail_energy) = (0.0_f32, 0.0_f32, 0.0_f32);
    for (&a, &b) in head.iter().zip(tail) {
        cross += a * b;
        head_energy += a * a;
        tail_energy += b * b;
    }

    let norm = (head_energy * tail_energy).sqrt();
    if norm > 0.0 {
        cross / norm
    } else {
        0.0
    }
}

/// RMS of a sample buffer (linear, not dB).
fn frame_rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_sq: f32 = samples.iter().map(|&s| s * s).sum();
    (sum_sq / samples.len() as f32).sqrt()
}

/// Extract a pitch track from a whole take.
///
/// Slides a `frame_size` window across the audio by `hop_size` samples and
/// runs `detect_pitch` on each window. Estimates outside the configured
/// floor/ceiling are dropped to None.
pub fn extract_pitch_track(
    samples: &[f32],
    sample_rate: u32,
    config: &PitchConfig,
) -> Vec<PitchFrame> {
    if sample_rate == 0 || config.hop_size == 0 {
        return Vec::new();
    }

    let sr = sample_rate as f32;
    let frame_size = config.frame_size.max(MIN_SAMPLES);

    let mut track = Vec::new();
    let mut pos = 0;

    while pos + frame_size <= samples.len() {
        let time = pos as f32 / sr;
        let frame = &samples[pos..pos + frame_size];

        let frequency = detect_pitch(frame, sample_rate)
            .filter(|&f| f >= config.pitch_floor_hz && f <= config.pitch_ceiling_hz);

        track.push(PitchFrame { time, frequency });

        pos += config.hop_size;
    }

    track
}

/// Extract only the voiced frequencies from a pitch track.
pub fn voiced_frequencies(track: &[PitchFrame]) -> Vec<f32> {
    track.iter().filter_map(|frame| frame.frequency).collect()
}

/// Fraction of frames that are voiced. Returns 0.0 for an empty track.
pub fn voiced_fraction(track: &[PitchFrame]) -> f32 {
    if track.is_empty() {
        return 0.0;
    }
    let voiced = track.iter().filter(|f| f.frequency.is_some()).count();
    voiced as f32 / track.len() as f32
}
