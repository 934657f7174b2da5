// src/services/quiz.rs
use std::cmp::Ordering;

use crate::models::{
    CorrelationResult, CorrelationStrength, ParsedSeries, QuizQuestion, TrendResult,
};

/// Three template questions about an analyzed series: where the maximum
/// sits, which way the trend points, and a next-value estimate. Fully
/// deterministic so the same upload always produces the same quiz.
/// Callers must pass a non-empty series (the parser guarantees this).
pub fn trend_quiz(series: &ParsedSeries, trend: &TrendResult) -> Vec<QuizQuestion> {
    vec![
        max_value_question(series),
        direction_question(trend),
        forecast_question(trend),
    ]
}

fn max_value_question(series: &ParsedSeries) -> QuizQuestion {
    let points = &series.points;
    let max_idx = points
        .iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.value.partial_cmp(&b.value).unwrap_or(Ordering::Equal))
        .map(|(i, _)| i)
        .unwrap_or(0);

    // Up to four label choices; the max label always makes the cut.
    let mut choices: Vec<String> = points.iter().take(4).map(|p| p.label.clone()).collect();
    let answer_index = if max_idx < choices.len() {
        max_idx
    } else {
        let last = choices.len() - 1;
        choices[last] = points[max_idx].label.clone();
        last
    };

    QuizQuestion {
        question: format!("{}이(가) 가장 큰 때는 언제인가요?", series.y_label),
        choices,
        answer_index,
        hint: "그래프에서 가장 높이 올라간 곳을 찾아보세요.".to_string(),
    }
}

fn direction_question(trend: &TrendResult) -> QuizQuestion {
    let answer_index = if trend.direction.is_upward() {
        0
    } else if trend.direction.is_downward() {
        1
    } else {
        2
    };

    QuizQuestion {
        question: "그래프는 전체적으로 어떤 모습인가요?".to_string(),
        choices: vec![
            "점점 올라가요".to_string(),
            "점점 내려가요".to_string(),
            "거의 그대로예요".to_string(),
        ],
        answer_index,
        hint: "처음 값과 마지막 값을 비교해 보세요.".to_string(),
    }
}

fn forecast_question(trend: &TrendResult) -> QuizQuestion {
    // Distractors sit one data-range away so they stay plausible but never
    // collide with the real forecast.
    let spread = trend.stats.range.max(1.0);
    let low = trend.next_val - spread;
    let high = trend.next_val + spread;

    QuizQuestion {
        question: "지금처럼 변한다면, 다음번 값은 얼마쯤 될까요?".to_string(),
        choices: vec![
            format!("약 {}", format_value(low)),
            format!("약 {}", format_value(trend.next_val)),
            format!("약 {}", format_value(high)),
        ],
        answer_index: 1,
        hint: "마지막 값에서 한 걸음 더 나아가 보세요.".to_string(),
    }
}

/// One question about how two series move together, keyed off the
/// correlation bucket. The degenerate (NaN) case reads as "no relation".
pub fn correlation_quiz(correlation: &CorrelationResult) -> QuizQuestion {
    let answer_index = match correlation.strength {
        CorrelationStrength::StrongPositive | CorrelationStrength::Positive => 0,
        CorrelationStrength::StrongNegative | CorrelationStrength::Negative => 1,
        CorrelationStrength::None => 2,
    };

    QuizQuestion {
        question: "두 자료는 서로 어떤 관계인가요?".to_string(),
        choices: vec![
            "한쪽이 커지면 다른 쪽도 커져요".to_string(),
            "한쪽이 커지면 다른 쪽은 작아져요".to_string(),
            "둘 사이에 뚜렷한 관계가 없어요".to_string(),
        ],
        answer_index,
        hint: "두 그래프를 나란히 놓고 움직임을 비교해 보세요.".to_string(),
    }
}

/// Rounds to a whole number when close, one decimal otherwise.
fn format_value(value: f64) -> String {
    if (value - value.round()).abs() < 0.05 {
        format!("{}", value.round() as i64)
    } else {
        format!("{:.1}", value)
    }
}
