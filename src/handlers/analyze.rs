// src/handlers/analyze.rs
use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::json;
use warp::reply::Json;
use warp::Rejection;

use crate::models::{LongTermProjection, ParsedSeries, QuizQuestion, TrendResult};
use crate::services::explainer::{ExplainKind, Explainer};
use crate::services::parser::parse_series;
use crate::services::projection::project;
use crate::services::quiz::trend_quiz;
use crate::services::safety::SafetyFilter;
use crate::services::trend::analyze_trend;

use super::error::ApiError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    pub text: String,
    #[serde(default = "default_file_name")]
    pub file_name: String,
}

pub(crate) fn default_file_name() -> String {
    "자료".to_string()
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ExplanationPayload {
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tip: Option<String>,
    pub source: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeResponse {
    series: ParsedSeries,
    trend: TrendResult,
    projection: LongTermProjection,
    quiz: Vec<QuizQuestion>,
    explanation: ExplanationPayload,
    generated_at: DateTime<Utc>,
}

pub async fn analyze_dataset(
    req: AnalyzeRequest,
    safety: Arc<SafetyFilter>,
    explainer: Arc<dyn Explainer>,
) -> Result<Json, Rejection> {
    info!("Handling request to analyze dataset '{}'", req.file_name);

    let series = parse_series(&req.text, &req.file_name, &safety).map_err(|e| {
        warn!("Failed to parse uploaded dataset '{}': {}", req.file_name, e);
        warp::reject::custom(ApiError::bad_request(e.to_string()))
    })?;

    let trend = analyze_trend(&series.points);
    let projection = project(&trend, series.points.len());
    let quiz = trend_quiz(&series, &trend);

    let payload = json!({
        "name": series.name.clone(),
        "yLabel": series.y_label.clone(),
        "labels": series.points.iter().map(|p| p.label.clone()).collect::<Vec<_>>(),
        "values": series.points.iter().map(|p| p.value).collect::<Vec<_>>(),
        "slope": trend.slope,
        "nextVal": trend.next_val,
        "direction": trend.direction,
    });

    let explanation = match explainer.explain(ExplainKind::Trend, &payload).await {
        Some(explanation) => ExplanationPayload {
            summary: explanation.summary,
            tip: explanation.tip,
            source: "ai",
        },
        None => ExplanationPayload {
            summary: fallback_summary(&series, &trend),
            tip: None,
            source: "fallback",
        },
    };

    Ok(warp::reply::json(&AnalyzeResponse {
        series,
        trend,
        projection,
        quiz,
        explanation,
        generated_at: Utc::now(),
    }))
}

/// Deterministic explanation used whenever the LLM is unavailable.
fn fallback_summary(series: &ParsedSeries, trend: &TrendResult) -> String {
    format!(
        "'{}' 자료를 살펴봤어요. {} 이대로라면 다음번에는 약 {:.1} 정도가 될 것으로 보여요.",
        series.y_label, trend.description, trend.next_val
    )
}
