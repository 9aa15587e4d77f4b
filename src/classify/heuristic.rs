use super::Category;

/// Semitones of slack allowed on either side of a band.
const TOLERANCE: f32 = 2.0;

/// Tessitura bands, tested in this order. The first band that contains the
/// whole observed span wins, so overlapping bands favour the lower voice.
const VOICE_BANDS: [(Category, f32, f32); 6] = [
    (Category::Bass, 40.0, 52.0),
    (Category::Baritone, 48.0, 60.0),
    (Category::Tenor, 52.0, 64.0),
    (Category::Alto, 55.0, 67.0),
    (Category::Mezzo, 60.0, 72.0),
    (Category::Soprano, 65.0, 77.0),
];

/// Coarse, gender-agnostic voice label from a set of MIDI observations.
///
/// Takes the min and max of the observations and returns the first band
/// (bass → soprano) that contains [min, max] once widened by two semitones
/// on each side. Returns None for an empty list or a span no band can hold.
pub fn midi_to_voice_category(midi_values: &[f32]) -> Option<Category> {
    if midi_values.is_empty() {
        return None;
    }

    let min = midi_values.iter().copied().fold(f32::INFINITY, f32::min);
    let max = midi_values.iter().copied().fold(f32::NEG_INFINITY, f32::max);

    VOICE_BANDS
        .iter()
        .find(|&&(_, low, high)| min >= low - TOLERANCE && max <= high + TOLERANCE)
        .map(|&(category, _, _)| category)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_is_none() {
        assert_eq!(midi_to_voice_category(&[]), None);
    }

    #[test]
    fn low_span_is_bass() {
        assert_eq!(midi_to_voice_category(&[41.0, 50.0]), Some(Category::Bass));
    }

    #[test]
    fn tolerance_widens_bands() {
        // 38 is two below the bass floor, 54 two above its ceiling
        assert_eq!(midi_to_voice_category(&[38.0, 54.0]), Some(Category::Bass));
        assert_eq!(midi_to_voice_category(&[37.9, 50.0]), None);
    }

    #[test]
    fn first_matching_band_wins() {
        // [60, 66] fits tenor (50..66 widened), alto and mezzo; tenor is
        // checked first.
        assert_eq!(midi_to_voice_category(&[60.0, 66.0]), Some(Category::Tenor));
    }

    #[test]
    fn upper_middle_span_is_alto() {
        assert_eq!(midi_to_voice_category(&[57.0, 68.0]), Some(Category::Alto));
    }

    #[test]
    fn upper_span_is_mezzo() {
        assert_eq!(midi_to_voice_category(&[62.0, 70.0]), Some(Category::Mezzo));
    }

    #[test]
    fn high_span_is_soprano() {
        assert_eq!(midi_to_voice_category(&[68.0, 78.0]), Some(Category::Soprano));
    }

    #[test]
    fn order_of_observations_is_irrelevant() {
        let values = [66.0, 61.0, 63.5, 60.0];
        assert_eq!(midi_to_voice_category(&values), Some(Category::Tenor));
    }

    #[test]
    fn span_too_wide_is_none() {
        assert_eq!(midi_to_voice_category(&[45.0, 75.0]), None);
    }

    #[test]
    fn single_observation() {
        assert_eq!(midi_to_voice_category(&[45.0]), Some(Category::Bass));
    }
}
