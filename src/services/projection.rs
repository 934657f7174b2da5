// src/services/projection.rs
use crate::models::{LongTermProjection, TrendResult};

const LOW_SAMPLE_WARNING: &str = "자료가 10개보다 적어서 예측이 많이 빗나갈 수 있어요.";
const VOLATILE_WARNING: &str = "값이 크게 출렁이고 있어서 먼 미래 예측은 믿기 어려워요.";
const LINEAR_ASSUMPTION: &str = "지금의 변화가 앞으로도 그대로 이어진다고 가정한 예측이에요.";

/// Extends the fitted line 10 and 20 years past the forecast point.
///
/// Short series are assumed to span a longer real-world period per point:
/// each point counts as `max(1, 10 / n)` years, so a three-point series
/// treats one step as roughly three years. No confidence interval is
/// computed; the caveat text is the only uncertainty signal.
pub fn project(trend: &TrendResult, n: usize) -> LongTermProjection {
    let years_per_point = (10 / n.max(1)).max(1) as f64;

    let in_10_years = trend.next_val + trend.slope * (10.0 / years_per_point);
    let in_20_years = trend.next_val + trend.slope * (20.0 / years_per_point);

    let mut notes = Vec::new();
    if n < 10 {
        notes.push(LOW_SAMPLE_WARNING);
    }
    if trend.slope.abs() > 5.0 {
        notes.push(VOLATILE_WARNING);
    }
    notes.push(LINEAR_ASSUMPTION);

    LongTermProjection {
        in_10_years,
        in_20_years,
        caveat: notes.join(" "),
    }
}
