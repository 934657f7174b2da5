// src/services/explainer.rs
use std::env;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use log::{error, info, warn};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

const DEFAULT_URL: &str = "https://api.openai.com/v1/chat/completions";
const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_TIMEOUT_SECS: u64 = 8;

const MODERATION_INSTRUCTION: &str = "You review short reports written by Korean elementary school \
students for a data-analysis class. Decide whether the text is inappropriate for school \
(insults, profanity, sexual content, threats). Respond with a JSON object: \
{\"inappropriate\": bool, \"reason\": string}. The reason must be one gentle Korean sentence.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExplainKind {
    Trend,
    Correlation,
    Projection,
    ReportFeedback,
}

impl ExplainKind {
    fn instruction(&self) -> &'static str {
        match self {
            ExplainKind::Trend => {
                "You are a friendly tutor explaining a chart to a Korean elementary school \
                 student. Given the series data and its fitted trend, respond with a JSON \
                 object {\"summary\": string, \"tip\": string} written in simple, warm Korean. \
                 The summary describes what the numbers show; the tip suggests one thing to \
                 look at next."
            }
            ExplainKind::Correlation => {
                "You are a friendly tutor explaining how two charts move together to a Korean \
                 elementary school student. Given both series and their correlation, respond \
                 with a JSON object {\"summary\": string, \"tip\": string} in simple, warm \
                 Korean. Never claim one thing causes the other."
            }
            ExplainKind::Projection => {
                "You are a friendly tutor explaining a long-term projection to a Korean \
                 elementary school student. Given the trend and the projected values, respond \
                 with a JSON object {\"summary\": string, \"tip\": string} in simple, warm \
                 Korean, and remind the student that the future can turn out differently."
            }
            ExplainKind::ReportFeedback => {
                "You are a kind teacher giving feedback on a data-analysis report written by a \
                 Korean elementary school student. Respond with a JSON object \
                 {\"summary\": string, \"tip\": string} in simple, encouraging Korean: the \
                 summary praises something concrete, the tip suggests one improvement."
            }
        }
    }
}

/// Structured text returned by the remote model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Explanation {
    pub summary: String,
    #[serde(default)]
    pub tip: Option<String>,
}

/// Remote moderation verdict. Failures default to permissive so a flaky
/// endpoint never blocks legitimate student work.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Moderation {
    pub inappropriate: bool,
    pub reason: Option<String>,
}

impl Moderation {
    fn permissive() -> Self {
        Moderation {
            inappropriate: false,
            reason: None,
        }
    }
}

/// Optional enrichment boundary. The parser and analyzers never see this
/// trait; handlers call it and fall back to locally computed text whenever
/// it returns nothing.
#[async_trait]
pub trait Explainer: Send + Sync {
    /// None on any failure: network error, non-2xx, malformed JSON.
    async fn explain(&self, kind: ExplainKind, payload: &Value) -> Option<Explanation>;

    async fn moderate(&self, text: &str) -> Moderation;
}

/// Used when no API key is configured; every caller degrades to its
/// deterministic fallback text.
pub struct NoopExplainer;

#[async_trait]
impl Explainer for NoopExplainer {
    async fn explain(&self, _kind: ExplainKind, _payload: &Value) -> Option<Explanation> {
        None
    }

    async fn moderate(&self, _text: &str) -> Moderation {
        Moderation::permissive()
    }
}

/// Chat-completions client for an OpenAI-compatible endpoint.
pub struct LlmExplainer {
    client: Client,
    url: String,
    model: String,
    api_key: String,
}

impl LlmExplainer {
    pub fn new(api_key: String, url: String, model: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(LlmExplainer {
            client,
            url,
            model,
            api_key,
        })
    }

    /// One round trip; the model is told to answer with a JSON object,
    /// which is parsed out of the first choice.
    async fn chat(&self, instruction: &str, user_content: &str) -> Result<Value> {
        let body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": instruction },
                { "role": "user", "content": user_content },
            ],
            "temperature": 0.7,
            "response_format": { "type": "json_object" },
        });

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("explainer endpoint returned {}", status));
        }

        let response: Value = response.json().await?;
        let content = response["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| anyhow!("missing message content in explainer response"))?;

        Ok(serde_json::from_str(content)?)
    }
}

#[async_trait]
impl Explainer for LlmExplainer {
    async fn explain(&self, kind: ExplainKind, payload: &Value) -> Option<Explanation> {
        match self.chat(kind.instruction(), &payload.to_string()).await {
            Ok(value) => match serde_json::from_value::<Explanation>(value) {
                Ok(explanation) if !explanation.summary.trim().is_empty() => Some(explanation),
                Ok(_) => {
                    warn!("Explainer returned an empty summary, using fallback text");
                    None
                }
                Err(e) => {
                    error!("Explainer returned malformed JSON: {}", e);
                    None
                }
            },
            Err(e) => {
                error!("Explainer call failed: {}", e);
                None
            }
        }
    }

    async fn moderate(&self, text: &str) -> Moderation {
        match self.chat(MODERATION_INSTRUCTION, text).await {
            Ok(value) => Moderation {
                inappropriate: value
                    .get("inappropriate")
                    .and_then(Value::as_bool)
                    .unwrap_or(false),
                reason: value
                    .get("reason")
                    .and_then(Value::as_str)
                    .map(str::to_string),
            },
            Err(e) => {
                warn!("Moderation call failed, allowing content: {}", e);
                Moderation::permissive()
            }
        }
    }
}

/// Builds the explainer from the environment. Without EXPLAINER_API_KEY the
/// app still works; every explanation comes from the local templates.
pub fn explainer_from_env() -> Arc<dyn Explainer> {
    match env::var("EXPLAINER_API_KEY") {
        Ok(key) if !key.trim().is_empty() => {
            let url = env::var("EXPLAINER_URL").unwrap_or_else(|_| DEFAULT_URL.to_string());
            let model = env::var("EXPLAINER_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
            let timeout = env::var("EXPLAINER_TIMEOUT_SECS")
                .ok()
                .and_then(|raw| raw.parse().ok())
                .unwrap_or(DEFAULT_TIMEOUT_SECS);

            match LlmExplainer::new(key, url, model, Duration::from_secs(timeout)) {
                Ok(explainer) => {
                    info!("LLM explainer configured (model: {})", explainer.model);
                    Arc::new(explainer)
                }
                Err(e) => {
                    warn!("Failed to build LLM explainer, using static text: {}", e);
                    Arc::new(NoopExplainer)
                }
            }
        }
        _ => {
            warn!("EXPLAINER_API_KEY not set, AI explanations disabled");
            Arc::new(NoopExplainer)
        }
    }
}
