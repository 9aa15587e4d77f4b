use std::fmt;

use serde::{Deserialize, Serialize};

use super::heuristic::midi_to_voice_category;
use super::Category;

/// Width (semitones) over which proximity and range overshoot fade out.
const OCTAVE: f32 = 12.0;

const COVERAGE_WEIGHT: f32 = 0.8;
const PROXIMITY_WEIGHT: f32 = 0.2;
const FIT_PENALTY_WEIGHT: f32 = 0.4;

/// How the singer prefers to be grouped. Decides which range family is
/// considered during classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Grouping {
    Woman,
    Man,
    Nonbinary,
    PreferNotToSay,
}

impl fmt::Display for Grouping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Grouping::Woman => "woman",
            Grouping::Man => "man",
            Grouping::Nonbinary => "nonbinary",
            Grouping::PreferNotToSay => "prefer-not-to-say",
        };
        f.write_str(label)
    }
}

/// A named vocal range with its MIDI bounds (inclusive).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeDefinition {
    pub category: Category,
    pub min: f32,
    pub max: f32,
}

impl RangeDefinition {
    const fn new(category: Category, min: f32, max: f32) -> Self {
        Self { category, min, max }
    }

    fn centre(&self) -> f32 {
        (self.min + self.max) / 2.0
    }
}

/// Upper-voice family, in tie-break order.
pub const UPPER_VOICES: [RangeDefinition; 3] = [
    RangeDefinition::new(Category::Soprano, 60.0, 84.0),
    RangeDefinition::new(Category::Mezzo, 57.0, 81.0),
    RangeDefinition::new(Category::Alto, 52.0, 76.0),
];

/// Lower-voice family, in tie-break order.
pub const LOWER_VOICES: [RangeDefinition; 3] = [
    RangeDefinition::new(Category::Tenor, 48.0, 72.0),
    RangeDefinition::new(Category::Baritone, 44.0, 68.0),
    RangeDefinition::new(Category::Bass, 38.0, 62.0),
];

/// Both families, upper first.
pub const ALL_RANGES: [RangeDefinition; 6] = [
    UPPER_VOICES[0],
    UPPER_VOICES[1],
    UPPER_VOICES[2],
    LOWER_VOICES[0],
    LOWER_VOICES[1],
    LOWER_VOICES[2],
];

/// Observed extremes of a session, ready for classification.
///
/// `lowest_midi <= highest_midi` is expected but not enforced. A reversed
/// pair is scored by the same arithmetic and simply covers nothing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassificationInput {
    pub lowest_midi: f32,
    pub highest_midi: f32,
    /// Median pitch of the speaking take, when one was recorded.
    pub speaking_median_midi: Option<f32>,
    pub grouping: Grouping,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SuggestedRange {
    pub min: f32,
    pub max: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub category: Category,
    /// Winning score clamped to [0, 1].
    pub confidence: f32,
    /// Fraction of the observed span inside the winning range.
    pub coverage: f32,
    /// The winning category's fixed bounds.
    pub suggested_range: SuggestedRange,
    /// Coarse band label for the same span, reported for reference.
    pub voice_category: Option<Category>,
}

/// Sub-scores for one candidate range.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    definition: RangeDefinition,
    coverage: f32,
    score: f32,
}

/// Ranges considered for a grouping, in tie-break order.
pub fn candidate_ranges(grouping: Grouping) -> &'static [RangeDefinition] {
    match grouping {
        Grouping::Woman => &UPPER_VOICES,
        Grouping::Man => &LOWER_VOICES,
        Grouping::Nonbinary | Grouping::PreferNotToSay => &ALL_RANGES,
    }
}

/// Pick the vocal range that best explains the observed extremes.
///
/// Each candidate is scored as
///
///   0.8 * coverage + 0.2 * proximity - 0.4 * fit_penalty
///
/// where coverage is the share of the observed span inside the range,
/// proximity measures how close the range centre sits to the speaking median
/// (or the span midpoint when there is none), and fit_penalty grows with how
/// far the span overshoots the range on either side. Ties keep family order.
pub fn classify_vocal_range(input: &ClassificationInput) -> ClassificationResult {
    classify_among(input, candidate_ranges(input.grouping))
}

fn classify_among(
    input: &ClassificationInput,
    candidates: &[RangeDefinition],
) -> ClassificationResult {
    let low = input.lowest_midi;
    let high = input.highest_midi;

    // A missing, zero or non-finite median falls back to the span midpoint.
    let reference = input
        .speaking_median_midi
        .filter(|m| m.is_finite() && *m != 0.0)
        .unwrap_or(low + (high - low) / 2.0);

    let mut scored: Vec<Candidate> = candidates
        .iter()
        .map(|&definition| {
            let coverage = coverage_score(&definition, low, high);
            let proximity = proximity_score(&definition, reference);
            let penalty = fit_penalty(&definition, low, high);

            Candidate {
                definition,
                coverage,
                score: COVERAGE_WEIGHT * coverage + PROXIMITY_WEIGHT * proximity
                    - FIT_PENALTY_WEIGHT * penalty,
            }
        })
        .collect();

    // sort_by is stable, so equal scores keep family order.
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));

    // Every grouping maps to a non-empty family; the fallback only guards
    // against an empty candidate slice.
    let top = scored.first().copied().unwrap_or(Candidate {
        definition: ALL_RANGES[0],
        coverage: 0.0,
        score: 0.0,
    });

    ClassificationResult {
        category: top.definition.category,
        confidence: top.score.clamp(0.0, 1.0),
        coverage: top.coverage,
        suggested_range: SuggestedRange {
            min: top.definition.min,
            max: top.definition.max,
        },
        voice_category: midi_to_voice_category(&[low, high]),
    }
}

/// Share of [low, high] that falls inside the range. The span is floored at
/// one semitone so a single observed note does not divide by zero.
fn coverage_score(definition: &RangeDefinition, low: f32, high: f32) -> f32 {
    let span = (high - low).max(1.0);
    let overlap_start = definition.min.max(low);
    let overlap_end = definition.max.min(high);
    let overlap = (overlap_end - overlap_start).max(0.0);
    (overlap / span).clamp(0.0, 1.0)
}

/// 1.0 when the range centre sits on `reference`, fading to 0 an octave away.
fn proximity_score(definition: &RangeDefinition, reference: f32) -> f32 {
    let distance = (definition.centre() - reference).abs();
    (1.0 - distance / OCTAVE).max(0.0)
}

/// Semitones the span overshoots the range, in octaves, capped at 1.
fn fit_penalty(definition: &RangeDefinition, low: f32, high: f32) -> f32 {
    let below = (definition.min - low).max(0.0);
    let above = (high - definition.max).max(0.0);
    ((below + above) / OCTAVE).min(1.0)
}
