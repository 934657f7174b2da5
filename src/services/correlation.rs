// src/services/correlation.rs
use crate::models::{CorrelationResult, CorrelationStrength, DataPoint};

/// Pearson's r between two series, aligned by index and silently truncated
/// to the shorter length. Alignment is positional, not by shared year
/// label, so both inputs are assumed to already cover the same period.
///
/// A zero-variance side makes the coefficient NaN; the result then carries
/// an explicit "undefined relationship" description and
/// `CorrelationResult::is_degenerate()` returns true.
pub fn correlate(a: &[DataPoint], b: &[DataPoint]) -> CorrelationResult {
    let len = a.len().min(b.len());
    let xs: Vec<f64> = a[..len].iter().map(|point| point.value).collect();
    let ys: Vec<f64> = b[..len].iter().map(|point| point.value).collect();

    let coefficient = pearson(&xs, &ys);
    let strength = classify_coefficient(coefficient);
    let description = if coefficient.is_nan() {
        "두 자료 중 하나가 전혀 변하지 않아서 관계를 계산할 수 없어요.".to_string()
    } else {
        strength.description().to_string()
    };

    CorrelationResult {
        coefficient,
        strength,
        description,
    }
}

fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
    if xs.is_empty() {
        return f64::NAN;
    }

    let n = xs.len() as f64;
    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = ys.iter().sum::<f64>() / n;

    let mut covariance = 0.0;
    let mut variance_x = 0.0;
    let mut variance_y = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        covariance += dx * dy;
        variance_x += dx * dx;
        variance_y += dy * dy;
    }

    covariance / (variance_x * variance_y).sqrt()
}

/// NaN satisfies none of the comparisons and lands in the None bucket.
pub fn classify_coefficient(r: f64) -> CorrelationStrength {
    if r > 0.7 {
        CorrelationStrength::StrongPositive
    } else if r > 0.3 {
        CorrelationStrength::Positive
    } else if r < -0.7 {
        CorrelationStrength::StrongNegative
    } else if r < -0.3 {
        CorrelationStrength::Negative
    } else {
        CorrelationStrength::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn points(values: &[f64]) -> Vec<DataPoint> {
        values
            .iter()
            .enumerate()
            .map(|(i, &value)| DataPoint {
                label: format!("{}", 2015 + i),
                value,
                original_label: "값".to_string(),
                year: Some(format!("{}", 2015 + i)),
            })
            .collect()
    }

    #[test]
    fn perfectly_opposed_ramps_give_minus_one() {
        let a = points(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let b = points(&[5.0, 4.0, 3.0, 2.0, 1.0]);

        let result = correlate(&a, &b);
        assert_eq!(result.coefficient, -1.0);
        assert_eq!(result.strength, CorrelationStrength::StrongNegative);
        assert!(!result.is_degenerate());
    }

    #[test]
    fn correlation_is_symmetric() {
        let a = points(&[3.0, 8.0, 2.0, 9.0, 5.0]);
        let b = points(&[1.0, 6.0, 4.0, 7.0, 2.0]);

        assert_eq!(correlate(&a, &b).coefficient, correlate(&b, &a).coefficient);
    }

    #[test]
    fn longer_series_is_truncated_to_the_shorter() {
        let a = points(&[1.0, 2.0, 3.0, 100.0, -40.0]);
        let b = points(&[2.0, 4.0, 6.0]);

        let truncated = correlate(&a[..3], &b);
        let full = correlate(&a, &b);
        assert_eq!(full.coefficient, truncated.coefficient);
        assert_eq!(full.strength, CorrelationStrength::StrongPositive);
    }

    #[test]
    fn coefficient_stays_bounded() {
        let a = points(&[3.5, 7.1, 2.2, 9.9, 4.4, 6.0]);
        let b = points(&[1.0, 0.5, 8.8, 3.3, 7.7, 2.1]);

        let r = correlate(&a, &b).coefficient;
        assert!((-1.0..=1.0).contains(&r));
    }

    #[test]
    fn zero_variance_is_degenerate() {
        let a = points(&[1.0, 2.0, 3.0]);
        let b = points(&[5.0, 5.0, 5.0]);

        let result = correlate(&a, &b);
        assert!(result.coefficient.is_nan());
        assert!(result.is_degenerate());
        assert_eq!(result.strength, CorrelationStrength::None);
    }

    #[test]
    fn strength_thresholds() {
        assert_eq!(classify_coefficient(0.9), CorrelationStrength::StrongPositive);
        assert_eq!(classify_coefficient(0.7), CorrelationStrength::Positive);
        assert_eq!(classify_coefficient(0.5), CorrelationStrength::Positive);
        assert_eq!(classify_coefficient(0.3), CorrelationStrength::None);
        assert_eq!(classify_coefficient(0.0), CorrelationStrength::None);
        assert_eq!(classify_coefficient(-0.3), CorrelationStrength::None);
        assert_eq!(classify_coefficient(-0.5), CorrelationStrength::Negative);
        assert_eq!(classify_coefficient(-0.7), CorrelationStrength::Negative);
        assert_eq!(classify_coefficient(-0.9), CorrelationStrength::StrongNegative);
    }
}
