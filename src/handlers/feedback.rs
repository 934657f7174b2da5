// src/handlers/feedback.rs
use std::sync::Arc;

use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::json;
use warp::reply::Json;
use warp::Rejection;

use crate::services::explainer::{ExplainKind, Explainer};
use crate::services::safety::SafetyFilter;

use super::error::ApiError;

const FALLBACK_FEEDBACK: &str = "정성껏 쓴 보고서 잘 읽었어요! 자료에서 찾은 숫자(가장 큰 값, \
가장 작은 값, 변화 방향)를 이유로 들면 훨씬 더 설득력 있는 보고서가 돼요.";

const MODERATION_NOTICE: &str = "보고서에 학교에서 쓰기 어려운 표현이 있는 것 같아요. 표현을 다듬어서 다시 올려 주세요.";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackRequest {
    pub report: String,
    #[serde(default)]
    pub dataset_name: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FeedbackResponse {
    accepted: bool,
    feedback: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    tip: Option<String>,
    source: &'static str,
}

/// Feedback on a student's free-text report. The local denylist rejects
/// outright; the remote moderation check only declines politely (and allows
/// on failure); the LLM feedback degrades to a fixed encouragement.
pub async fn report_feedback(
    req: FeedbackRequest,
    safety: Arc<SafetyFilter>,
    explainer: Arc<dyn Explainer>,
) -> Result<Json, Rejection> {
    info!("Handling request for report feedback");

    if req.report.trim().is_empty() {
        return Err(warp::reject::custom(ApiError::bad_request(
            "보고서 내용이 비어 있어요. 내용을 쓴 다음 다시 보내 주세요.",
        )));
    }

    let check = safety.check(&req.report);
    if !check.safe {
        let word = check.matched_word.unwrap_or_default();
        warn!("Report rejected by denylist (matched '{}')", word);
        return Err(warp::reject::custom(ApiError::bad_request(format!(
            "보고서에 사용할 수 없는 말('{}')이 들어 있어요. 내용을 고쳐 주세요.",
            word
        ))));
    }

    let verdict = explainer.moderate(&req.report).await;
    if verdict.inappropriate {
        info!("Report declined by remote moderation");
        return Ok(warp::reply::json(&FeedbackResponse {
            accepted: false,
            feedback: verdict.reason.unwrap_or_else(|| MODERATION_NOTICE.to_string()),
            tip: None,
            source: "moderation",
        }));
    }

    let payload = json!({
        "report": req.report,
        "datasetName": req.dataset_name,
    });

    let response = match explainer.explain(ExplainKind::ReportFeedback, &payload).await {
        Some(explanation) => FeedbackResponse {
            accepted: true,
            feedback: explanation.summary,
            tip: explanation.tip,
            source: "ai",
        },
        None => FeedbackResponse {
            accepted: true,
            feedback: FALLBACK_FEEDBACK.to_string(),
            tip: None,
            source: "fallback",
        },
    };

    Ok(warp::reply::json(&response))
}
