pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Simple returns between consecutive values, `v[i] / v[i - 1] - 1`.
pub fn pct_change(values: &[f64]) -> Vec<f64> {
    values.windows(2).map(|w| w[1] / w[0] - 1.0).collect()
}

/// Standard deviation with `ddof` delta degrees of freedom (`ddof = 1` is the
/// sample estimator). Accumulated with Welford's update so long flat series
/// do not lose precision.
pub fn std(values: &[f64], ddof: usize) -> Option<f64> {
    if values.len() <= ddof {
        return None;
    }

    let (_, m2) = values
        .iter()
        .enumerate()
        .fold((0.0_f64, 0.0_f64), |(mean, m2), (i, &x)| {
            let delta = x - mean;
            let mean = mean + delta / (i + 1) as f64;
            (mean, m2 + delta * (x - mean))
        });

    Some((m2 / (values.len() - ddof) as f64).sqrt())
}
