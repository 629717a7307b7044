use serde::{Deserialize, Serialize};

/// Strings rendered at the interface for each label
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LabelsConfig {
    #[serde(default)]
    pub sentiment: SentimentLabels,

    #[serde(default)]
    pub stance: StanceLabels,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentLabels {
    #[serde(default = "default_positive")]
    pub positive: String,
    #[serde(default = "default_negative")]
    pub negative: String,
    #[serde(default = "default_normal")]
    pub neutral: String,
}

impl Default for SentimentLabels {
    fn default() -> Self {
        Self {
            positive: default_positive(),
            negative: default_negative(),
            neutral: default_normal(),
        }
    }
}

/// Stance labels default to the Arabic localization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StanceLabels {
    #[serde(default = "default_supportive")]
    pub supportive: String,
    #[serde(default = "default_opposing")]
    pub opposing: String,
    #[serde(default = "default_stance_neutral")]
    pub neutral: String,
}

impl Default for StanceLabels {
    fn default() -> Self {
        Self {
            supportive: default_supportive(),
            opposing: default_opposing(),
            neutral: default_stance_neutral(),
        }
    }
}

impl StanceLabels {
    pub fn english() -> Self {
        Self {
            supportive: "supportive".to_string(),
            opposing: "opposing".to_string(),
            neutral: "neutral".to_string(),
        }
    }
}

fn default_positive() -> String {
    "positive".to_string()
}
fn default_negative() -> String {
    "negative".to_string()
}
fn default_normal() -> String {
    "normal".to_string()
}
fn default_supportive() -> String {
    "مؤيد".to_string()
}
fn default_opposing() -> String {
    "معارض".to_string()
}
fn default_stance_neutral() -> String {
    "محايد".to_string()
}
