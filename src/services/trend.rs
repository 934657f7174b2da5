// src/services/trend.rs
use crate::models::{DataPoint, SeriesStats, TrendDirection, TrendResult};

/// Fits an ordinary least squares line over the series index (x = 0..n-1,
/// y = value) and derives the one-step forecast, slope bucket and summary
/// stats that drive every downstream narrative.
///
/// Callers must pass at least one point (the parser guarantees this). A
/// single observation has no defined slope; the fit degrades to a flat line
/// through the mean so no NaN ever leaves this function and the forecast
/// identity `next_val = slope * n + intercept` still holds.
pub fn analyze_trend(points: &[DataPoint]) -> TrendResult {
    let n = points.len();
    let values: Vec<f64> = points.iter().map(|point| point.value).collect();

    let max = values.iter().copied().fold(f64::MIN, f64::max);
    let min = values.iter().copied().fold(f64::MAX, f64::min);
    let avg = values.iter().sum::<f64>() / n as f64;

    let (slope, intercept) = fit_line(&values).unwrap_or((0.0, avg));
    let next_val = slope * n as f64 + intercept;

    let direction = classify_slope(slope);

    TrendResult {
        slope,
        intercept,
        next_val,
        direction,
        description: direction.description().to_string(),
        stats: SeriesStats {
            max,
            min,
            avg,
            range: max - min,
        },
    }
}

/// OLS coefficients (slope, intercept); None when the x spread is zero.
fn fit_line(values: &[f64]) -> Option<(f64, f64)> {
    let n = values.len() as f64;
    if values.len() < 2 {
        return None;
    }

    let mut sum_x = 0.0;
    let mut sum_y = 0.0;
    let mut sum_xy = 0.0;
    let mut sum_x2 = 0.0;
    for (i, &y) in values.iter().enumerate() {
        let x = i as f64;
        sum_x += x;
        sum_y += y;
        sum_xy += x * y;
        sum_x2 += x * x;
    }

    let denominator = n * sum_x2 - sum_x * sum_x;
    if denominator.abs() < f64::EPSILON {
        return None;
    }

    let slope = (n * sum_xy - sum_x * sum_y) / denominator;
    let intercept = (sum_y - slope * sum_x) / n;
    Some((slope, intercept))
}

/// Buckets a slope by absolute magnitude. Thresholds are absolute, not
/// normalized by the data's own scale; large-valued series read flatter
/// than they look.
pub fn classify_slope(slope: f64) -> TrendDirection {
    let magnitude = slope.abs();
    if magnitude <= 0.2 {
        TrendDirection::Flat
    } else if slope > 0.0 {
        if magnitude > 5.0 {
            TrendDirection::SharpUp
        } else if magnitude > 1.0 {
            TrendDirection::ClearUp
        } else {
            TrendDirection::MildUp
        }
    } else if magnitude > 5.0 {
        TrendDirection::SharpDown
    } else if magnitude > 1.0 {
        TrendDirection::ClearDown
    } else {
        TrendDirection::MildDown
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
                label: format!("{}", 2019 + i),
                value,
                original_label: "인구".to_string(),
                year: Some(format!("{}", 2019 + i)),
            })
            .collect()
    }

    #[test]
    fn fits_the_population_fixture() {
        let trend = analyze_trend(&points(&[100.0, 120.0, 150.0]));

        assert_eq!(trend.slope, 25.0);
        assert!((trend.intercept - 295.0 / 3.0).abs() < 1e-9);
        assert_eq!(trend.next_val, trend.slope * 3.0 + trend.intercept);
        assert!((trend.next_val - 173.333_333).abs() < 1e-3);
        assert_eq!(trend.direction, TrendDirection::SharpUp);
    }

    #[test]
    fn forecast_identity_holds_for_noisy_series() {
        let trend = analyze_trend(&points(&[3.0, 7.0, 2.0, 9.0, 4.0, 8.0]));
        assert_eq!(trend.next_val, trend.slope * 6.0 + trend.intercept);
    }

    #[test]
    fn single_point_degrades_to_flat_mean_fit() {
        let trend = analyze_trend(&points(&[42.0]));

        assert_eq!(trend.slope, 0.0);
        assert_eq!(trend.intercept, 42.0);
        assert_eq!(trend.next_val, 42.0);
        assert_eq!(trend.direction, TrendDirection::Flat);
        assert!(trend.slope.is_finite() && trend.next_val.is_finite());
    }

    #[test]
    fn computes_summary_stats() {
        let trend = analyze_trend(&points(&[10.0, 40.0, 25.0]));
        assert_eq!(trend.stats.max, 40.0);
        assert_eq!(trend.stats.min, 10.0);
        assert_eq!(trend.stats.avg, 25.0);
        assert_eq!(trend.stats.range, 30.0);
    }

    #[test]
    fn downward_series_classifies_negative() {
        let trend = analyze_trend(&points(&[150.0, 120.0, 100.0]));
        assert_eq!(trend.slope, -25.0);
        assert_eq!(trend.direction, TrendDirection::SharpDown);
    }

    #[test]
    fn slope_buckets_follow_the_thresholds() {
        assert_eq!(classify_slope(0.0), TrendDirection::Flat);
        assert_eq!(classify_slope(0.2), TrendDirection::Flat);
        assert_eq!(classify_slope(-0.2), TrendDirection::Flat);
        assert_eq!(classify_slope(0.21), TrendDirection::MildUp);
        assert_eq!(classify_slope(1.0), TrendDirection::MildUp);
        assert_eq!(classify_slope(1.01), TrendDirection::ClearUp);
        assert_eq!(classify_slope(5.0), TrendDirection::ClearUp);
        assert_eq!(classify_slope(5.01), TrendDirection::SharpUp);
        assert_eq!(classify_slope(-0.21), TrendDirection::MildDown);
        assert_eq!(classify_slope(-1.01), TrendDirection::ClearDown);
        assert_eq!(classify_slope(-6.0), TrendDirection::SharpDown);
    }

    #[test]
    fn classification_is_monotone_in_magnitude() {
        fn intensity(direction: TrendDirection) -> u8 {
            match direction {
                TrendDirection::Flat => 0,
                TrendDirection::MildUp | TrendDirection::MildDown => 1,
                TrendDirection::ClearUp | TrendDirection::ClearDown => 2,
                TrendDirection::SharpUp | TrendDirection::SharpDown => 3,
            }
        }

        let slopes = [0.05, 0.2, 0.5, 1.0, 2.5, 5.0, 8.0, 50.0];
        for pair in slopes.windows(2) {
            assert!(intensity(classify_slope(pair[0])) <= intensity(classify_slope(pair[1])));
            assert!(intensity(classify_slope(-pair[0])) <= intensity(classify_slope(-pair[1])));
        }
    }
}
