/// Linear amplitude treated as "full" on the level meter.
/// Voice rarely sustains an RMS above this, so anything louder saturates.
const REFERENCE_CEILING: f32 = 0.5;

/// Decibel window mapped onto the meter: quieter than this reads as empty.
const DB_FLOOR: f32 = -72.0;

/// Decibel window mapped onto the meter: louder than this reads as full.
const DB_CEILING: f32 = -12.0;

/// Instantaneous loudness of a buffer for live feedback, in [0.0, 1.0].
///
/// RMS is normalized against a 0.5 linear reference and capped at 1.0.
/// An empty buffer reads as exactly 0.
pub fn compute_rms_level(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }

    let sum_sq: f32 = samples.iter().map(|&s| s * s).sum();
    let rms = (sum_sq / samples.len() as f32).sqrt();

    (rms / REFERENCE_CEILING).min(1.0)
}

/// Map a decibel reading onto [0.0, 1.0].
///
/// The input is clamped to -72..-12 dB and scaled linearly, so anything
/// outside that window saturates. Non-finite input reads as 0.
pub fn normalise_decibels(db: f32) -> f32 {
    if !db.is_finite() {
        return 0.0;
    }

    let clamped = db.clamp(DB_FLOOR, DB_CEILING);
    ((clamped - DB_FLOOR) / (DB_CEILING - DB_FLOOR)).clamp(0.0, 1.0)
}

/// RMS level in dB relative to full scale.
/// Returns -infinity for silent or empty input.
pub fn rms_db(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return f32::NEG_INFINITY;
    }

    let sum_sq: f32 = samples.iter().map(|&s| s * s).sum();
    let rms = (sum_sq / samples.len() as f32).sqrt();

    if rms == 0.0 {
        f32::NEG_INFINITY
    } else {
        20.0 * rms.log10()
    }
}

/// Peak amplitude in dB relative to full scale.
/// Returns -infinity for all-zero input.
pub fn peak_db(samples: &[f32]) -> f32 {
    let peak = samples
        .iter()
        .fold(0.0_f32, |max, &s| max.max(s.abs()));

    if peak == 0.0 {
        f32::NEG_INFINITY
    } else {
        20.0 * peak.log10()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn empty_buffer_is_zero() {
        assert_eq!(compute_rms_level(&[]), 0.0);
    }

    #[test]
    fn silence_is_zero() {
        assert_eq!(compute_rms_level(&[0.0; 512]), 0.0);
    }

    #[test]
    fn loud_sine_saturates() {
        // Amplitude 0.9 → RMS ≈ 0.64, above the 0.5 reference
        let samples: Vec<f32> = (0..2048)
            .map(|i| 0.9 * (2.0 * PI * 220.0 * i as f32 / 44100.0).sin())
            .collect();
        assert_eq!(compute_rms_level(&samples), 1.0);
    }

    #[test]
    fn constant_half_amplitude_saturates() {
        let samples = vec![0.5; 256];
        assert!((compute_rms_level(&samples) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn quarter_amplitude_reads_half() {
        // Constant 0.25 → RMS 0.25 → 0.25 / 0.5 = 0.5
        let samples = vec![-0.25; 100];
        assert!((compute_rms_level(&samples) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn decibels_map_linearly() {
        assert_eq!(normalise_decibels(-72.0), 0.0);
        assert_eq!(normalise_decibels(-12.0), 1.0);
        assert!((normalise_decibels(-42.0) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn decibels_saturate_outside_window() {
        assert_eq!(normalise_decibels(-120.0), 0.0);
        assert_eq!(normalise_decibels(0.0), 1.0);
    }

    #[test]
    fn non_finite_decibels_read_zero() {
        assert_eq!(normalise_decibels(f32::NAN), 0.0);
        assert_eq!(normalise_decibels(f32::NEG_INFINITY), 0.0);
        assert_eq!(normalise_decibels(f32::INFINITY), 0.0);
    }

    #[test]
    fn rms_db_half_scale_dc() {
        // Constant 0.5 → RMS = 0.5 → -6.02 dB
        let samples = vec![0.5, 0.5, 0.5, 0.5];
        assert!((rms_db(&samples) - (-6.02)).abs() < 0.1);
    }

    #[test]
    fn rms_db_silence_and_empty() {
        assert!(rms_db(&[0.0, 0.0]).is_infinite());
        assert!(rms_db(&[]).is_sign_negative());
    }

    #[test]
    fn peak_db_full_scale() {
        let samples = vec![0.0, 0.5, 1.0, -0.5];
        assert!(peak_db(&samples).abs() < 0.01);
    }

    #[test]
    fn peak_db_silence() {
        assert!(peak_db(&[0.0; 8]).is_infinite());
    }
}
