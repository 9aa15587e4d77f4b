//! Vocal range estimation: level metering, autocorrelation pitch detection,
//! note conversion and voice classification, plus the capture and playback
//! plumbing the `ambitus` CLI drives.

pub mod analysis;
pub mod audio;
pub mod classify;
pub mod config;
pub mod dsp;
pub mod paths;
pub mod tones;

pub use classify::heuristic::midi_to_voice_category;
pub use classify::range::{
    classify_vocal_range, ClassificationInput, ClassificationResult, Grouping, RangeDefinition,
    SuggestedRange,
};
pub use classify::Category;
pub use dsp::level::{compute_rms_level, normalise_decibels};
pub use dsp::note::{frequency_to_midi, midi_to_frequency};
pub use dsp::pitch::detect_pitch;
