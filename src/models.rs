// src/models.rs
use serde::{Deserialize, Serialize};

/// One observation extracted from an uploaded table. `label` is the column
/// header token (usually a four-digit year), `original_label` the name cell
/// of the row the value came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataPoint {
    pub label: String,
    pub value: f64,
    pub original_label: String,
    /// Set only when `label` is exactly four ASCII digits.
    pub year: Option<String>,
}

/// A labeled time series in upload order; index position = time step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedSeries {
    pub name: String,
    pub x_label: String,
    pub y_label: String,
    pub points: Vec<DataPoint>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesStats {
    pub max: f64,
    pub min: f64,
    pub avg: f64,
    pub range: f64,
}

/// Qualitative slope bucket, ordered FLAT < MILD < CLEAR < SHARP per sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrendDirection {
    SharpUp,
    ClearUp,
    MildUp,
    Flat,
    MildDown,
    ClearDown,
    SharpDown,
}

impl TrendDirection {
    pub fn is_upward(&self) -> bool {
        matches!(self, Self::SharpUp | Self::ClearUp | Self::MildUp)
    }

    pub fn is_downward(&self) -> bool {
        matches!(self, Self::SharpDown | Self::ClearDown | Self::MildDown)
    }

    /// Kid-friendly one-liner shown when the AI explainer is unavailable.
    pub fn description(&self) -> &'static str {
        match self {
            Self::SharpUp => "롤러코스터처럼 가파르게 쑥쑥 올라가고 있어요!",
            Self::ClearUp => "언덕을 오르는 것처럼 뚜렷하게 올라가고 있어요.",
            Self::MildUp => "느리지만 조금씩 올라가고 있어요.",
            Self::Flat => "거의 변화 없이 평평하게 이어지고 있어요.",
            Self::MildDown => "느리지만 조금씩 내려가고 있어요.",
            Self::ClearDown => "언덕을 내려가는 것처럼 뚜렷하게 내려가고 있어요.",
            Self::SharpDown => "롤러코스터처럼 가파르게 뚝 떨어지고 있어요!",
        }
    }
}

/// Least-squares fit over the series index plus derived narrative inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendResult {
    pub slope: f64,
    pub intercept: f64,
    /// The fitted line evaluated one step past the last observation.
    pub next_val: f64,
    pub direction: TrendDirection,
    pub description: String,
    pub stats: SeriesStats,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CorrelationStrength {
    StrongPositive,
    Positive,
    None,
    Negative,
    StrongNegative,
}

impl CorrelationStrength {
    pub fn description(&self) -> &'static str {
        match self {
            Self::StrongPositive => "한쪽이 커지면 다른 쪽도 확실하게 커지는, 아주 강한 관계예요.",
            Self::Positive => "한쪽이 커지면 다른 쪽도 커지는 편이에요.",
            Self::None => "두 자료 사이에 뚜렷한 관계가 보이지 않아요.",
            Self::Negative => "한쪽이 커지면 다른 쪽은 작아지는 편이에요.",
            Self::StrongNegative => "한쪽이 커지면 다른 쪽은 확실하게 작아지는, 아주 강한 반대 관계예요.",
        }
    }
}

/// Pearson's r over two positionally aligned series. `coefficient` is NaN
/// when either side has zero variance; callers must check before rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrelationResult {
    pub coefficient: f64,
    pub strength: CorrelationStrength,
    pub description: String,
}

impl CorrelationResult {
    /// True when zero variance made the coefficient undefined.
    pub fn is_degenerate(&self) -> bool {
        self.coefficient.is_nan()
    }
}

/// Linear extrapolation of the fitted trend to fixed future horizons.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LongTermProjection {
    pub in_10_years: f64,
    pub in_20_years: f64,
    pub caveat: String,
}

/// Deterministic template quiz question derived from analysis results.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    pub question: String,
    pub choices: Vec<String>,
    pub answer_index: usize,
    pub hint: String,
}
