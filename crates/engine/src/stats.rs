//! Shared population statistics

/// Arithmetic mean, `None` on empty input
pub(crate) fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Population standard deviation (divides by n, not n - 1).
///
/// A series whose values are all identical has a deviation of exactly 0,
/// independent of floating point error in the mean.
pub(crate) fn population_std_dev(values: &[f64]) -> Option<f64> {
    let mean = mean(values)?;
    if values.iter().all(|v| *v == values[0]) {
        return Some(0.0);
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    Some(variance.sqrt())
}

/// Median of the sorted values; for an even count the lower of the two
/// middle values is taken.
pub(crate) fn lower_median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    Some(sorted[(sorted.len() - 1) / 2])
}
