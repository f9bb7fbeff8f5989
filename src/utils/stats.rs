//! Descriptive statistics over plain `f64` slices

/// Arithmetic mean, `None` for an empty slice
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let n = values.len() as f64;
    let sum: f64 = values.iter().sum();
    if sum.is_finite() {
        Some(sum / n)
    } else {
        // Sum overflowed; divide first so finite inputs keep a finite mean
        Some(values.iter().map(|v| v / n).sum())
    }
}

/// Mean squared deviation as `(unit, ratio)` with `variance = ratio * unit²`.
///
/// Deviations are divided by their largest magnitude before squaring so that
/// spreads near `f64::MAX` do not overflow.
fn scaled_spread(values: &[f64], ddof: usize) -> Option<(f64, f64)> {
    if values.len() <= ddof {
        return None;
    }
    let m = mean(values)?;
    let unit = values.iter().fold(0.0_f64, |acc, v| acc.max((v / 2.0 - m / 2.0).abs()));
    if unit == 0.0 {
        return Some((0.0, 0.0));
    }
    let ss: f64 = values
        .iter()
        .map(|v| {
            let d = (v / 2.0 - m / 2.0) / unit;
            d * d
        })
        .sum();
    Some((2.0 * unit, ss / (values.len() - ddof) as f64))
}

/// Variance with `ddof` delta degrees of freedom (0 = population, 1 = sample)
pub fn variance(values: &[f64], ddof: usize) -> Option<f64> {
    scaled_spread(values, ddof).map(|(unit, ratio)| ratio * unit * unit)
}

/// Standard deviation with `ddof` delta degrees of freedom
pub fn std_dev(values: &[f64], ddof: usize) -> Option<f64> {
    scaled_spread(values, ddof).map(|(unit, ratio)| ratio.sqrt() * unit)
}

/// Median; the mean of the two middle values for even counts
pub fn median(values: &[f64]) -> Option<f64> {
    quantile(values, 0.5)
}

/// Quantile with linear interpolation between closest ranks
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() || !(0.0..=1.0).contains(&q) {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    if lo == hi {
        return Some(sorted[lo]);
    }
    let frac = pos - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// Minimum and maximum in one pass
pub fn min_max(values: &[f64]) -> Option<(f64, f64)> {
    let first = *values.first()?;
    Some(
        values
            .iter()
            .fold((first, first), |(lo, hi), &v| (lo.min(v), hi.max(v))),
    )
}
