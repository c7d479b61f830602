//! A1111/NovelAI-style text: `{prompt}\nNegative prompt: {negative}`.

use crate::prompt::PromptPair;

pub const NEGATIVE_MARKER: &str = "Negative prompt:";

/// Splits `text` once on the canonical negative marker.
///
/// Without the marker the whole text is the positive prompt.
pub fn extract(text: &str) -> PromptPair {
    split(text).unwrap_or_else(|| PromptPair::trimmed(text, ""))
}

/// Like [`extract`], but reports a missing marker as `None`.
pub fn split(text: &str) -> Option<PromptPair> {
    let (positive, negative) = text.split_once(NEGATIVE_MARKER)?;
    Some(PromptPair::trimmed(positive, negative))
}
