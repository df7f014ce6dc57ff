//! Equal-width binning of numeric values.

/// Bin edges and counts for `bins` equal-width bins spanning the values.
///
/// Every bin is half-open except the last, which also holds the maximum.
/// When all values are equal the edges collapse and every value lands in
/// the first bin. Returns `None` for an empty slice or zero bins.
pub(crate) fn equal_width_bins(values: &[f64], bins: usize) -> Option<(Vec<f64>, Vec<usize>)> {
    if values.is_empty() || bins == 0 {
        return None;
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let width = (max - min) / bins as f64;

    let edges: Vec<f64> = (0..=bins)
        .map(|i| if i == bins { max } else { min + width * i as f64 })
        .collect();

    let mut counts = vec![0usize; bins];
    for &value in values {
        let idx = if width > 0.0 {
            (((value - min) / width) as usize).min(bins - 1)
        } else {
            0
        };
        counts[idx] += 1;
    }

    Some((edges, counts))
}
