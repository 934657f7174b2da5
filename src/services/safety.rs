// src/services/safety.rs
use serde::Serialize;

/// Built-in denylist for student uploads. Checked as literal substrings,
/// case-sensitive, in list order; first hit wins.
const DEFAULT_DENYLIST: &[&str] = &[
    "씨발",
    "시발",
    "병신",
    "개새끼",
    "꺼져",
    "죽어버려",
    "바보",
    "멍청이",
    "fuck",
    "shit",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SafetyCheck {
    pub safe: bool,
    pub matched_word: Option<String>,
}

impl SafetyCheck {
    fn safe() -> Self {
        SafetyCheck {
            safe: true,
            matched_word: None,
        }
    }
}

/// Substring denylist gate run over raw uploads before parsing. This is not
/// a moderation system; the LLM-backed moderation check lives at the
/// explainer boundary.
#[derive(Debug, Clone)]
pub struct SafetyFilter {
    words: Vec<String>,
}

impl SafetyFilter {
    pub fn new(words: Vec<String>) -> Self {
        SafetyFilter { words }
    }

    /// No normalization: exact, case-sensitive containment. Empty or
    /// whitespace-only text is always safe.
    pub fn check(&self, text: &str) -> SafetyCheck {
        if text.trim().is_empty() {
            return SafetyCheck::safe();
        }

        for word in &self.words {
            if !word.is_empty() && text.contains(word.as_str()) {
                return SafetyCheck {
                    safe: false,
                    matched_word: Some(word.clone()),
                };
            }
        }

        SafetyCheck::safe()
    }
}

impl Default for SafetyFilter {
    fn default() -> Self {
        SafetyFilter::new(DEFAULT_DENYLIST.iter().map(|w| w.to_string()).collect())
    }
}
