use serde::{Deserialize, Serialize};

/// Intents the bot knows how to answer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Intent {
    Greeting,
    AppreciationForContent,
    AppreciationForFollow,
}

impl Intent {
    /// Parse a classifier label. Accepts both the canonical names and the
    /// short labels emitted by the NLU service.
    pub fn from_label(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "greeting" | "hi" => Some(Intent::Greeting),
            "appreciation_for_content" | "nice_article" => Some(Intent::AppreciationForContent),
            "appreciation_for_follow" | "thank_follow" => Some(Intent::AppreciationForFollow),
            _ => None,
        }
    }

    pub fn to_string(&self) -> String {
        match self {
            Intent::Greeting => "greeting".to_string(),
            Intent::AppreciationForContent => "appreciation_for_content".to_string(),
            Intent::AppreciationForFollow => "appreciation_for_follow".to_string(),
        }
    }
}

/// One ranked outcome from the intent classifier.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Classification {
    pub intent: String,
    /// In `[0, 1]`.
    pub confidence: f64,
}

impl Classification {
    pub fn new(intent: impl Into<String>, confidence: f64) -> Self {
        Self {
            intent: intent.into(),
            confidence,
        }
    }
}
