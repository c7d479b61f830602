use thiserror::Error;

/// Why a single extraction strategy produced nothing.
///
/// Every variant is recovered locally by the pipeline, which moves on to the next
/// strategy. None of these ever reach callers of `extract_prompts`.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The blob parsed, but not into the shape this strategy expects.
    #[error("structural mismatch: {0}")]
    StructuralMismatch(&'static str),
    #[error("failed to parse metadata: {0}")]
    ParseFailure(#[from] serde_json::Error),
    #[error("no extraction strategy recognized the metadata")]
    Unrecognized,
}

pub type ExtractResult<T> = Result<T, ExtractError>;
