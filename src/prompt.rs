use serde::{Deserialize, Serialize};

/// Positive/negative prompt text recovered from one metadata blob.
///
/// Both fields are always present; an unknown half is an empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptPair {
    pub positive: String,
    pub negative: String,
}

impl PromptPair {
    pub fn new(positive: impl Into<String>, negative: impl Into<String>) -> Self {
        Self {
            positive: positive.into(),
            negative: negative.into(),
        }
    }

    /// Builds a pair from the two halves of a split, trimming both.
    pub fn trimmed(positive: &str, negative: &str) -> Self {
        Self::new(positive.trim(), negative.trim())
    }

    pub fn is_empty(&self) -> bool {
        self.positive.is_empty() && self.negative.is_empty()
    }
}

/// Which strategy produced a [`PromptPair`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetadataFormat {
    Workflow,
    PromptApi,
    PlainText,
    Fallback,
    #[default]
    Empty,
}

impl MetadataFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Workflow => "workflow",
            Self::PromptApi => "prompt_api",
            Self::PlainText => "plain_text",
            Self::Fallback => "fallback",
            Self::Empty => "empty",
        }
    }
}
