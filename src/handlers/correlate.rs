// src/handlers/correlate.rs
use std::sync::Arc;

use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::json;
use warp::reply::Json;
use warp::Rejection;

use crate::models::{CorrelationStrength, ParsedSeries, QuizQuestion, TrendResult};
use crate::services::correlation::correlate;
use crate::services::explainer::{ExplainKind, Explainer};
use crate::services::parser::parse_series;
use crate::services::quiz::correlation_quiz;
use crate::services::safety::SafetyFilter;
use crate::services::trend::analyze_trend;

use super::analyze::{default_file_name, ExplanationPayload};
use super::error::ApiError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetInput {
    pub text: String,
    #[serde(default = "default_file_name")]
    pub file_name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrelateRequest {
    pub first: DatasetInput,
    pub second: DatasetInput,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzedDataset {
    series: ParsedSeries,
    trend: TrendResult,
}

/// Wire view of the correlation; a degenerate coefficient serializes as an
/// explicit null instead of leaking NaN into the JSON.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CorrelationView {
    coefficient: Option<f64>,
    strength: CorrelationStrength,
    description: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CorrelateResponse {
    first: AnalyzedDataset,
    second: AnalyzedDataset,
    correlation: CorrelationView,
    quiz: QuizQuestion,
    explanation: ExplanationPayload,
}

pub async fn correlate_datasets(
    req: CorrelateRequest,
    safety: Arc<SafetyFilter>,
    explainer: Arc<dyn Explainer>,
) -> Result<Json, Rejection> {
    info!(
        "Handling request to correlate '{}' and '{}'",
        req.first.file_name, req.second.file_name
    );

    let first = parse_input(&req.first, "첫 번째 자료", &safety)?;
    let second = parse_input(&req.second, "두 번째 자료", &safety)?;

    let first_trend = analyze_trend(&first.points);
    let second_trend = analyze_trend(&second.points);

    let correlation = correlate(&first.points, &second.points);
    let quiz = correlation_quiz(&correlation);

    let coefficient = if correlation.is_degenerate() {
        None
    } else {
        Some(correlation.coefficient)
    };

    let payload = json!({
        "firstLabel": first.y_label.clone(),
        "secondLabel": second.y_label.clone(),
        "firstValues": first.points.iter().map(|p| p.value).collect::<Vec<_>>(),
        "secondValues": second.points.iter().map(|p| p.value).collect::<Vec<_>>(),
        "coefficient": coefficient,
        "strength": correlation.strength,
    });

    let explanation = match explainer.explain(ExplainKind::Correlation, &payload).await {
        Some(explanation) => ExplanationPayload {
            summary: explanation.summary,
            tip: explanation.tip,
            source: "ai",
        },
        None => ExplanationPayload {
            summary: format!(
                "'{}'와(과) '{}'를 비교해 봤어요. {}",
                first.y_label, second.y_label, correlation.description
            ),
            tip: None,
            source: "fallback",
        },
    };

    Ok(warp::reply::json(&CorrelateResponse {
        first: AnalyzedDataset {
            series: first,
            trend: first_trend,
        },
        second: AnalyzedDataset {
            series: second,
            trend: second_trend,
        },
        correlation: CorrelationView {
            coefficient,
            strength: correlation.strength,
            description: correlation.description,
        },
        quiz,
        explanation,
    }))
}

fn parse_input(
    input: &DatasetInput,
    side: &str,
    safety: &SafetyFilter,
) -> Result<ParsedSeries, Rejection> {
    parse_series(&input.text, &input.file_name, safety).map_err(|e| {
        warn!("Failed to parse {} '{}': {}", side, input.file_name, e);
        warp::reject::custom(ApiError::bad_request(format!("{}: {}", side, e)))
    })
}
