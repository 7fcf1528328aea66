/// Percentile of an already sorted slice using linear interpolation between
/// closest ranks (R-7, the Excel PERCENTILE.INC method).
/// `p` is a fraction in [0, 1]. Empty input yields 0.0.
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    match sorted.len() {
        0 => return 0.0,
        1 => return sorted[0],
        _ => {}
    }

    let p = p.clamp(0.0, 1.0);
    let index = p * (sorted.len() - 1) as f64;
    let lower = index.floor() as usize;
    let upper = lower + 1;
    let weight = index - lower as f64;

    if upper >= sorted.len() {
        return sorted[lower];
    }

    sorted[lower] * (1.0 - weight) + sorted[upper] * weight
}

/// Constant Q1/Q3 bands over the whole input, one entry per input value.
pub fn quartiles(values: &[f64]) -> (Vec<f64>, Vec<f64>) {
    if values.is_empty() {
        return (Vec::new(), Vec::new());
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let q1 = percentile(&sorted, 0.25);
    let q3 = percentile(&sorted, 0.75);

    (vec![q1; values.len()], vec![q3; values.len()])
}

/// Arithmetic mean, 0.0 for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentile_interpolates() {
        let values = [1.0, 2.0, 3.0, 4.0];
        assert!((percentile(&values, 0.25) - 1.75).abs() < 1e-12);
        assert!((percentile(&values, 0.75) - 3.25).abs() < 1e-12);
        assert_eq!(percentile(&values, 0.0), 1.0);
        assert_eq!(percentile(&values, 1.0), 4.0);
    }

    #[test]
    fn test_percentile_small_inputs() {
        assert_eq!(percentile(&[], 0.25), 0.0);
        assert_eq!(percentile(&[42.0], 0.75), 42.0);
    }

    #[test]
    fn test_quartiles_are_constant_bands() {
        // Unsorted on purpose.
        let values = [4.0, 1.0, 3.0, 2.0];
        let (q1, q3) = quartiles(&values);
        assert_eq!(q1.len(), 4);
        assert_eq!(q3.len(), 4);
        assert!(q1.iter().all(|v| (v - 1.75).abs() < 1e-12));
        assert!(q3.iter().all(|v| (v - 3.25).abs() < 1e-12));

        let (e1, e3) = quartiles(&[]);
        assert!(e1.is_empty() && e3.is_empty());
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[]), 0.0);
        assert!((mean(&[1.0, 2.0, 3.0, 4.0]) - 2.5).abs() < 1e-12);
    }
}
