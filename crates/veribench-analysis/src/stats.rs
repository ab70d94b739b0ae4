//! Descriptive statistics over execution times
//!
//! Every function is total: an empty input yields 0 rather than NaN.

// ============================================================================
// Kani Formal Verification Proofs
// ============================================================================

#[cfg(kani)]
mod kani_proofs {
    use super::*;

    /// Verify ratio stays in [0, 1] for count <= total
    #[kani::proof]
    fn proof_ratio_in_unit_interval() {
        let count: u16 = kani::any();
        let total: u16 = kani::any();
        kani::assume(count <= total);
        let r = ratio(usize::from(count), usize::from(total));
        kani::assert(r >= 0.0 && r <= 1.0, "ratio should be within [0, 1]");
    }

    /// Verify ratio is zero for an empty population
    #[kani::proof]
    fn proof_ratio_zero_total() {
        let count: u16 = kani::any();
        kani::assert(ratio(usize::from(count), 0) == 0.0, "empty total yields 0");
    }
}

/// `count / total`, or 0 when `total` is 0
pub fn ratio(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64
    }
}

pub fn sum(values: &[f64]) -> f64 {
    values.iter().sum()
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        sum(values) / values.len() as f64
    }
}

/// Middle value; mean of the two middle values for even lengths
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Sample standard deviation (n - 1 denominator); 0 below two values
pub fn sample_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let squares: f64 = values.iter().map(|v| (v - m) * (v - m)).sum();
    (squares / (values.len() - 1) as f64).sqrt()
}

pub fn min(values: &[f64]) -> f64 {
    values.iter().copied().reduce(f64::min).unwrap_or(0.0)
}

pub fn max(values: &[f64]) -> f64 {
    values.iter().copied().reduce(f64::max).unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_inputs_are_zero() {
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(median(&[]), 0.0);
        assert_eq!(sample_std(&[]), 0.0);
        assert_eq!(min(&[]), 0.0);
        assert_eq!(max(&[]), 0.0);
        assert_eq!(ratio(0, 0), 0.0);
    }

    #[test]
    fn test_median_odd_and_even() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), 2.0);
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), 2.5);
    }

    #[test]
    fn test_sample_std() {
        assert_eq!(sample_std(&[5.0]), 0.0);
        // mean 2, squared deviations 1 + 0 + 1, n - 1 = 2
        assert_eq!(sample_std(&[1.0, 2.0, 3.0]), 1.0);
        assert_eq!(sample_std(&[2.0, 300.0]), (298.0f64 * 298.0 / 2.0).sqrt());
    }

    #[test]
    fn test_min_max_ratio() {
        let values = [2.0, 300.0, 0.5];
        assert_eq!(min(&values), 0.5);
        assert_eq!(max(&values), 300.0);
        assert_eq!(ratio(1, 4), 0.25);
    }
}
