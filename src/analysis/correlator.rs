//! Positional cross-correlation of chain type sequences

use std::collections::BTreeMap;

use crate::core::types::TypePair;

/// Correlation of `first` against `second` for every overlap shift.
///
/// At shift `s` (from `1 - len(second)` to `len(first) - 1`) element
/// `first[s + i]` is compared with `second[i]`; the number of equal type
/// pairs is divided by the mean of the two lengths. A sequence against
/// itself scores exactly 1.0 at shift 0.
pub fn correlate(first: &[TypePair], second: &[TypePair]) -> BTreeMap<i64, f64> {
    let mut result = BTreeMap::new();
    if first.is_empty() || second.is_empty() {
        return result;
    }

    let len1 = first.len() as i64;
    let len2 = second.len() as i64;
    let mean_length = (len1 + len2) as f64 / 2.0;

    for shift in (1 - len2)..=(len1 - 1) {
        let start = (-shift).max(0);
        let end = (len1 - shift).min(len2);
        let matches = (start..end)
            .filter(|&i| first[(shift + i) as usize] == second[i as usize])
            .count();
        result.insert(shift, matches as f64 / mean_length);
    }
    result
}

/// Mean self-correlation away from shift 0; high values reveal repeats
pub fn auto_correlation(kinds: &[TypePair]) -> f64 {
    let curve = correlate(kinds, kinds);
    let off_center: Vec<f64> = curve
        .iter()
        .filter(|(shift, _)| **shift != 0)
        .map(|(_, value)| *value)
        .collect();
    if off_center.is_empty() {
        return 0.0;
    }
    off_center.iter().sum::<f64>() / off_center.len() as f64
}

/// Highest point of the correlation curve
pub fn peak_correlation(first: &[TypePair], second: &[TypePair]) -> f64 {
    correlate(first, second)
        .values()
        .copied()
        .fold(0.0, f64::max)
}
