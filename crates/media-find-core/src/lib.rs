//! Media Find Core - Query evaluation and bounded-concurrency scanning
//!
//! This crate provides the query model (patterns, comparator, structured
//! matcher, per-category filtering) and the scan machinery (bounded task
//! executor, shared scan state with cooperative early stop) used to find
//! media files whose probed streams satisfy a declarative query.

pub mod compare;
pub mod error;
pub mod evaluate;
pub mod executor;
pub mod filter;
pub mod matcher;
pub mod pattern;
pub mod scan;

pub use error::{PatternError, ScanError};
pub use evaluate::{evaluate, Query, StreamCounts};
pub use executor::run_bounded;
pub use filter::{container_matches, filter_streams, CategoryOutcome};
pub use matcher::record_matches;
pub use pattern::{CompareOp, Pattern, PatternValue};
pub use scan::{
    scan, MatchedFile, MediaInspector, ProgressSink, ResultSink, ScanOptions, ScanProgress,
    ScanReport, TaskDisposition,
};
