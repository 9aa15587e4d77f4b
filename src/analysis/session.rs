use std::fmt;

use serde::{Deserialize, Serialize};

use super::take::PitchStats;
use crate::classify::range::{
    classify_vocal_range, ClassificationInput, ClassificationResult, Grouping,
};

/// The three takes a session asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Step {
    /// Talk naturally for ~20 seconds; anchors the speaking median.
    Speaking,
    /// Sing a chorus or vocalise you know well.
    Song,
    /// Match the reference tone patterns from low to high.
    Range,
}

impl Step {
    pub const ALL: [Step; 3] = [Step::Speaking, Step::Song, Step::Range];

    pub fn as_str(self) -> &'static str {
        match self {
            Step::Speaking => "speaking",
            Step::Song => "song",
            Step::Range => "range",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-step statistics for one session.
/// Each field is Option because not every step may have been recorded.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionTakes {
    pub speaking: Option<PitchStats>,
    pub song: Option<PitchStats>,
    pub range: Option<PitchStats>,
}

impl SessionTakes {
    pub fn get(&self, step: Step) -> Option<&PitchStats> {
        match step {
            Step::Speaking => self.speaking.as_ref(),
            Step::Song => self.song.as_ref(),
            Step::Range => self.range.as_ref(),
        }
    }

    pub fn set(&mut self, step: Step, stats: PitchStats) {
        match step {
            Step::Speaking => self.speaking = Some(stats),
            Step::Song => self.song = Some(stats),
            Step::Range => self.range = Some(stats),
        }
    }

    fn iter(&self) -> impl Iterator<Item = &PitchStats> {
        Step::ALL.into_iter().filter_map(|step| self.get(step))
    }
}

/// Session summary: the per-step stats plus the classification, if any.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionReport {
    pub grouping: Grouping,
    pub takes: SessionTakes,
    pub input: Option<ClassificationInput>,
    pub classification: Option<ClassificationResult>,
    /// Takes that were given but yielded no statistics, with the reason.
    #[serde(default)]
    pub skipped: Vec<SkippedTake>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedTake {
    pub step: Step,
    pub reason: String,
}

/// Reduce a session's takes to the extremes the classifier needs.
///
/// Every take contributes its min, max and median; the lowest and highest of
/// those become the observed span. The speaking take's median, when present,
/// becomes the speaking baseline. Returns None when no take has a usable
/// value.
pub fn classification_input(
    takes: &SessionTakes,
    grouping: Grouping,
) -> Option<ClassificationInput> {
    let values: Vec<f32> = takes
        .iter()
        .flat_map(|stats| [stats.min, stats.max, stats.median])
        .filter(|v| v.is_finite())
        .collect();

    if values.is_empty() {
        return None;
    }

    let lowest_midi = values.iter().copied().fold(f32::INFINITY, f32::min);
    let highest_midi = values.iter().copied().fold(f32::NEG_INFINITY, f32::max);

    let speaking_median_midi = takes
        .speaking
        .map(|stats| stats.median)
        .filter(|m| m.is_finite());

    Some(ClassificationInput {
        lowest_midi,
        highest_midi,
        speaking_median_midi,
        grouping,
    })
}

/// Aggregate a session and classify it.
pub fn classify_session(takes: SessionTakes, grouping: Grouping) -> SessionReport {
    let input = classification_input(&takes, grouping);
    let classification = input.as_ref().map(classify_vocal_range);

    SessionReport {
        grouping,
        takes,
        input,
        classification,
        skipped: Vec::new(),
    }
}
