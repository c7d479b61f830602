//! ComfyUI "prompt" API exports: a flat object of node id -> `{class_type, inputs}`.

use crate::error::{ExtractError, ExtractResult};
use crate::prompt::PromptPair;
use serde_json::Value;

const TEXT_ENCODE_CLASS: &str = "CLIPTextEncode";

/// Assigns text-encoder prompts by position.
///
/// The format carries no polarity marker, so the first wired `CLIPTextEncode` in document
/// order is taken as positive and any later one as negative. This is a guess based on how
/// ComfyUI usually orders its default graphs; a graph that defines the negative encoder
/// first comes out swapped.
pub fn extract(json: &str) -> ExtractResult<PromptPair> {
    let root: Value = serde_json::from_str(json)?;
    let nodes = root
        .as_object()
        .ok_or(ExtractError::StructuralMismatch("prompt export root is not an object"))?;

    let mut pair = PromptPair::default();
    for node in nodes.values() {
        let class_type = node.get("class_type").and_then(Value::as_str);
        if class_type != Some(TEXT_ENCODE_CLASS) {
            continue;
        }

        let inputs = node.get("inputs");
        let text = inputs
            .and_then(|inputs| inputs.get("text"))
            .map(text_of)
            .unwrap_or_default();
        let has_clip = inputs
            .and_then(|inputs| inputs.get("clip"))
            .and_then(Value::as_array)
            .is_some_and(|clip| !clip.is_empty());
        if !has_clip {
            continue;
        }

        if pair.positive.is_empty() {
            pair.positive = text;
        } else {
            pair.negative = text;
        }
    }

    Ok(pair)
}

// Non-string scalars are kept as their JSON text; a wired (array) text input has no literal.
fn text_of(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Number(number) => number.to_string(),
        Value::Bool(boolean) => boolean.to_string(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_ENCODERS: &str = r#"{
        "6": {"class_type": "CLIPTextEncode", "inputs": {"text": "A", "clip": ["4", 1]}},
        "3": {"class_type": "KSampler", "inputs": {"positive": ["6", 0], "negative": ["7", 0]}},
        "7": {"class_type": "CLIPTextEncode", "inputs": {"text": "B", "clip": ["4", 1]}}
    }"#;

    #[test]
    fn test_first_encoder_is_positive_second_is_negative() {
        let pair = extract(TWO_ENCODERS).unwrap();
        assert_eq!(pair, PromptPair::new("A", "B"));
    }

    #[test]
    fn test_document_order_not_key_order() {
        let raw = r#"{
            "9": {"class_type": "CLIPTextEncode", "inputs": {"text": "first", "clip": ["4", 1]}},
            "10": {"class_type": "CLIPTextEncode", "inputs": {"text": "second", "clip": ["4", 1]}}
        }"#;
        let pair = extract(raw).unwrap();
        assert_eq!(pair.positive, "first");
        assert_eq!(pair.negative, "second");
    }

    #[test]
    fn test_unwired_encoder_is_ignored() {
        let raw = r#"{
            "1": {"class_type": "CLIPTextEncode", "inputs": {"text": "orphan"}},
            "2": {"class_type": "CLIPTextEncode", "inputs": {"text": "empty clip", "clip": []}},
            "3": {"class_type": "CLIPTextEncode", "inputs": {"text": "wired", "clip": ["4", 1]}}
        }"#;
        let pair = extract(raw).unwrap();
        assert_eq!(pair, PromptPair::new("wired", ""));
    }

    #[test]
    fn test_later_encoders_overwrite_negative() {
        let raw = r#"{
            "1": {"class_type": "CLIPTextEncode", "inputs": {"text": "pos", "clip": ["4", 1]}},
            "2": {"class_type": "CLIPTextEncode", "inputs": {"text": "neg1", "clip": ["4", 1]}},
            "3": {"class_type": "CLIPTextEncode", "inputs": {"text": "neg2", "clip": ["4", 1]}}
        }"#;
        let pair = extract(raw).unwrap();
        assert_eq!(pair, PromptPair::new("pos", "neg2"));
    }

    #[test]
    fn test_non_object_root_is_structural_mismatch() {
        let error = extract(r#"[{"class_type": "CLIPTextEncode"}]"#).unwrap_err();
        assert!(matches!(error, ExtractError::StructuralMismatch(_)));
    }

    #[test]
    fn test_malformed_json_is_parse_failure() {
        let error = extract(r#"{"1": {"class_type": "CLIPTextEncode""#).unwrap_err();
        assert!(matches!(error, ExtractError::ParseFailure(_)));
    }
}
