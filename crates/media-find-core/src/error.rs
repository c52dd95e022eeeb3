//! Error types for query compilation and scan execution

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PatternError {
    #[error("empty pattern spec")]
    EmptySpec,

    #[error("invalid pattern spec (expected FIELD=VALUE): {0}")]
    MissingValue(String),

    #[error("empty field name in pattern spec: {0}")]
    EmptyField(String),

    #[error("pattern path nests deeper than one level: {0}")]
    TooDeep(String),

    #[error("field {0} is used both as a scalar and as a nested record")]
    MixedNesting(String),
}

/// Aggregate failure from the scan executor.
///
/// Expected per-file failures (ffprobe errors, unparsable output) are
/// contained inside each task and never surface here; this is reserved for
/// task logic that genuinely cannot continue.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("scan task failed: {0}")]
    Task(String),
}
