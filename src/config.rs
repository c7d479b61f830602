use serde::{Deserialize, Serialize};
use std::path::Path;

const DEFAULT_MAX_TRACE_DEPTH: usize = 64;
const MAX_TRACE_DEPTH_LIMIT: usize = 1024;
/// Brace spans shorter than this are not treated as embedded JSON.
const DEFAULT_MIN_EMBEDDED_JSON_SPAN: usize = 50;

const MAX_TRACE_DEPTH_ENV: &str = "PROMPT_TAGGER_MAX_TRACE_DEPTH";
const MIN_JSON_SPAN_ENV: &str = "PROMPT_TAGGER_MIN_JSON_SPAN";

/// Tunables for the extraction pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Maximum number of hops followed from a sampler input towards a text encoder.
    pub max_trace_depth: usize,
    pub min_embedded_json_span: usize,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            max_trace_depth: DEFAULT_MAX_TRACE_DEPTH,
            min_embedded_json_span: DEFAULT_MIN_EMBEDDED_JSON_SPAN,
        }
    }
}

impl ExtractorConfig {
    /// Defaults, overridden by `PROMPT_TAGGER_*` environment variables when they parse.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`Self::from_env`], reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(MAX_TRACE_DEPTH_ENV) {
            match raw.trim().parse::<usize>() {
                Ok(parsed) => config.max_trace_depth = parsed.clamp(1, MAX_TRACE_DEPTH_LIMIT),
                Err(error) => log::warn!("Ignoring {}={:?}: {}", MAX_TRACE_DEPTH_ENV, raw, error),
            }
        }

        if let Some(raw) = lookup(MIN_JSON_SPAN_ENV) {
            match raw.trim().parse::<usize>() {
                Ok(parsed) => config.min_embedded_json_span = parsed,
                Err(error) => log::warn!("Ignoring {}={:?}: {}", MIN_JSON_SPAN_ENV, raw, error),
            }
        }

        config
    }

    /// Parses a JSON config document; missing fields keep their defaults.
    pub fn from_json(content: &str) -> Result<Self, String> {
        let mut config: Self = serde_json::from_str(content)
            .map_err(|error| format!("Failed to parse extractor config: {}", error))?;
        config.max_trace_depth = config.max_trace_depth.clamp(1, MAX_TRACE_DEPTH_LIMIT);
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path).map_err(|error| {
            format!(
                "Failed to read extractor config {}: {}",
                path.display(),
                error
            )
        })?;
        Self::from_json(&content)
    }
}
