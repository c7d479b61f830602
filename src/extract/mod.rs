//! Prompt extraction pipeline.
//!
//! Strategies are tried in a fixed order, each returning either a prompt pair or an
//! [`ExtractError`] that the pipeline logs and recovers from:
//!
//! 1. workflow graph (candidate JSON contains `"nodes":`)
//! 2. prompt API export (candidate JSON contains `"class_type":`)
//! 3. plain text split on `Negative prompt:`
//! 4. fallback marker/keyword scan
//!
//! [`extract_prompts`] never fails: unrecognized input yields an empty pair.

pub mod fallback;
pub mod plain_text;
pub mod prompt_api;
pub mod workflow;

use crate::config::ExtractorConfig;
use crate::error::{ExtractError, ExtractResult};
use crate::prompt::{MetadataFormat, PromptPair};
use std::borrow::Cow;
use std::sync::LazyLock;

const WORKFLOW_SIGNAL: &str = "\"nodes\":";
const PROMPT_API_SIGNAL: &str = "\"class_type\":";
const DESCRIPTION_MARKER: &str = "Description:";

static DEFAULT_PIPELINE: LazyLock<Pipeline> = LazyLock::new(Pipeline::default);

/// Prompt pair plus the strategy that produced it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    pub prompts: PromptPair,
    pub format: MetadataFormat,
}

impl Extraction {
    fn new(prompts: PromptPair, format: MetadataFormat) -> Self {
        Self { prompts, format }
    }
}

/// Stateless extraction pipeline; one value can serve any number of threads.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    config: ExtractorConfig,
}

impl Pipeline {
    pub fn new(config: ExtractorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    pub fn extract_prompts(&self, raw: &str) -> PromptPair {
        self.extract(raw).prompts
    }

    pub fn extract(&self, raw: &str) -> Extraction {
        if raw.trim().is_empty() {
            return Extraction::default();
        }

        if let Some(candidate) = self.preprocess(raw.trim()) {
            match self.extract_structured(&candidate) {
                Ok((prompts, format)) if !prompts.is_empty() => {
                    log::debug!("Extracted prompts from {} metadata", format.as_str());
                    return Extraction::new(prompts, format);
                }
                Ok((_, format)) => {
                    log::debug!("{} metadata held no prompts", format.as_str());
                }
                Err(error) => {
                    log::debug!("Structured prompt extraction failed: {}", error);
                }
            }
        }

        if let Some(prompts) = plain_text::split(raw).filter(|pair| !pair.is_empty()) {
            return Extraction::new(prompts, MetadataFormat::PlainText);
        }

        let prompts = fallback::extract(raw);
        if prompts.is_empty() {
            Extraction::default()
        } else {
            Extraction::new(prompts, MetadataFormat::Fallback)
        }
    }

    fn extract_structured(&self, candidate: &str) -> ExtractResult<(PromptPair, MetadataFormat)> {
        if candidate.contains(WORKFLOW_SIGNAL) {
            workflow::extract(candidate, self.config.max_trace_depth)
                .map(|prompts| (prompts, MetadataFormat::Workflow))
        } else if candidate.contains(PROMPT_API_SIGNAL) {
            prompt_api::extract(candidate).map(|prompts| (prompts, MetadataFormat::PromptApi))
        } else {
            Err(ExtractError::Unrecognized)
        }
    }

    /// Picks the part of `metadata` most likely to be a JSON document.
    ///
    /// This is a substring heuristic, not a validator; the extractors parse the result.
    fn preprocess<'a>(&self, metadata: &'a str) -> Option<Cow<'a, str>> {
        // `[prompt: {...}]` / `[workflow: {...}]` wrappers.
        if metadata.starts_with('[') && metadata.contains(':') {
            if let Some(span) = brace_span(metadata) {
                return Some(Cow::Borrowed(span));
            }
            if let Some(description) = metadata.split(DESCRIPTION_MARKER).nth(1) {
                return Some(Cow::Owned(description.replace(']', "")));
            }
        }

        if metadata.starts_with('{') && metadata.ends_with('}') {
            return Some(Cow::Borrowed(metadata));
        }

        brace_span(metadata)
            .filter(|span| span.len() - 1 > self.config.min_embedded_json_span)
            .map(Cow::Borrowed)
    }
}

/// Text from the first `{` to the last `}`, inclusive.
fn brace_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// Recovers the (positive, negative) prompt pair from a raw metadata blob.
pub fn extract_prompts(raw: &str) -> PromptPair {
    DEFAULT_PIPELINE.extract_prompts(raw)
}
