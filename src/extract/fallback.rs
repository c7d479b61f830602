//! Last-resort heuristics for text no structured strategy understood.

use crate::prompt::PromptPair;

const NEGATIVE_MARKERS: &[&str] = &[
    "Negative prompt:",
    "negative prompt:",
    "Negative Prompt:",
    "负面提示词:",
    "反向提示词:",
];

/// Terms that almost only ever appear in negative prompts.
const NEGATIVE_KEYWORDS: &[&str] = &["lowres", "bad anatomy", "worst quality", "low quality"];

pub fn extract(text: &str) -> PromptPair {
    for marker in NEGATIVE_MARKERS {
        if let Some((positive, negative)) = text.split_once(marker) {
            return PromptPair::trimmed(positive, negative);
        }
    }

    // Keywords are tried in priority order, not by position in the text.
    for keyword in NEGATIVE_KEYWORDS {
        if let Some(hit) = text.find(keyword) {
            let boundary = text[..hit].rfind('.').map(|dot| dot + 1).unwrap_or(0);
            return PromptPair::trimmed(&text[..boundary], &text[boundary..]);
        }
    }

    PromptPair::trimmed(text, "")
}
