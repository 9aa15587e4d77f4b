/// Compute a percentile from a sorted slice.
/// `p` is in [0.0, 1.0], e.g. 0.05 for the 5th percentile.
/// Returns None for an empty slice.
pub fn percentile(sorted: &[f32], p: f32) -> Option<f32> {
    if sorted.is_empty() {
        return None;
    }
    let idx = (p.clamp(0.0, 1.0) * (sorted.len() - 1) as f32).round() as usize;
    Some(sorted[idx.min(sorted.len() - 1)])
}

/// Sort a list of values ascending, dropping anything non-finite.
pub fn sorted_finite(values: impl IntoIterator<Item = f32>) -> Vec<f32> {
    let mut sorted: Vec<f32> = values.into_iter().filter(|v| v.is_finite()).collect();
    sorted.sort_by(f32::total_cmp);
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentile_basic() {
        let data: Vec<f32> = (0..100).map(|i| i as f32).collect();
        assert!((percentile(&data, 0.0).unwrap() - 0.0).abs() < 0.5);
        assert!((percentile(&data, 0.5).unwrap() - 50.0).abs() < 1.0);
        assert!((percentile(&data, 1.0).unwrap() - 99.0).abs() < 0.5);
    }

    #[test]
    fn percentile_empty() {
        assert_eq!(percentile(&[], 0.5), None);
    }

    #[test]
    fn percentile_single_value() {
        assert_eq!(percentile(&[57.0], 0.95), Some(57.0));
    }

    #[test]
    fn sorted_finite_drops_nan_and_infinity() {
        let sorted = sorted_finite([3.0, f32::NAN, 1.0, f32::NEG_INFINITY, 2.0]);
        assert_eq!(sorted, vec![1.0, 2.0, 3.0]);
    }
}
