//! Per-category filtering of probed streams

use crate::matcher::record_matches;
use crate::pattern::Pattern;
use media_find_common::{ContainerRecord, StreamKind, StreamRecord};

/// Outcome of filtering one stream category.
///
/// `Unconstrained` means no pattern was supplied for the category; it is
/// deliberately distinct from `Matched(0)` ("a filter was requested and
/// nothing satisfied it") so summaries can tell the two apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryOutcome {
    Unconstrained,
    Matched(usize),
}

impl CategoryOutcome {
    /// Whether this outcome lets the work item through: unconstrained
    /// categories never block, constrained ones need at least one match.
    #[must_use]
    pub fn is_satisfied(&self) -> bool {
        match self {
            CategoryOutcome::Unconstrained => true,
            CategoryOutcome::Matched(count) => *count > 0,
        }
    }

    /// Match count, or `None` for the unconstrained sentinel
    #[must_use]
    pub fn count(&self) -> Option<usize> {
        match self {
            CategoryOutcome::Unconstrained => None,
            CategoryOutcome::Matched(count) => Some(*count),
        }
    }
}

/// Count the streams of `kind` that satisfy `pattern`. No pattern means
/// the category is unconstrained.
pub fn filter_streams(
    kind: StreamKind,
    streams: &[StreamRecord],
    pattern: Option<&Pattern>,
) -> CategoryOutcome {
    let Some(pattern) = pattern else {
        return CategoryOutcome::Unconstrained;
    };

    let count = streams
        .iter()
        .filter(|stream| stream.kind == Some(kind))
        .filter(|stream| record_matches(*stream, pattern))
        .count();

    CategoryOutcome::Matched(count)
}

/// Boolean variant for the single container record: trivially true without
/// a pattern, otherwise the matcher result.
pub fn container_matches(container: &ContainerRecord, pattern: Option<&Pattern>) -> bool {
    match pattern {
        None => true,
        Some(pattern) => record_matches(container, pattern),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn streams() -> Vec<StreamRecord> {
        vec![
            StreamRecord {
                kind: Some(StreamKind::Video),
                codec_name: Some("h264".to_string()),
                ..Default::default()
            },
            StreamRecord {
                kind: Some(StreamKind::Audio),
                codec_name: Some("aac".to_string()),
                ..Default::default()
            },
            StreamRecord {
                kind: Some(StreamKind::Audio),
                codec_name: Some("eac3".to_string()),
                ..Default::default()
            },
            // untyped stream, never part of a category
            StreamRecord::default(),
        ]
    }

    #[test]
    fn test_no_pattern_returns_sentinel() {
        let outcome = filter_streams(StreamKind::Video, &streams(), None);
        assert_eq!(outcome, CategoryOutcome::Unconstrained);
        assert!(outcome.is_satisfied());
        assert_eq!(outcome.count(), None);
    }

    #[test]
    fn test_zero_matches_is_not_the_sentinel() {
        let pattern = Pattern::from_specs(&["codec_name=vp9"]).unwrap();
        let outcome = filter_streams(StreamKind::Video, &streams(), Some(&pattern));
        assert_eq!(outcome, CategoryOutcome::Matched(0));
        assert!(!outcome.is_satisfied());
        assert_eq!(outcome.count(), Some(0));
    }

    #[test]
    fn test_counts_only_streams_of_the_category() {
        // matches both audio streams, ignores video and untyped streams
        let pattern = Pattern::from_specs(&["codec_name=~a"]).unwrap();
        let outcome = filter_streams(StreamKind::Audio, &streams(), Some(&pattern));
        assert_eq!(outcome, CategoryOutcome::Matched(2));
    }

    #[test]
    fn test_container_matching() {
        let container = ContainerRecord {
            format_name: Some("matroska,webm".to_string()),
            tags: BTreeMap::from([("title".to_string(), "Example".to_string())]),
            ..Default::default()
        };

        assert!(container_matches(&container, None));

        let matching = Pattern::from_specs(&["format_name=~matroska"]).unwrap();
        assert!(container_matches(&container, Some(&matching)));

        let failing = Pattern::from_specs(&["format_name=avi"]).unwrap();
        assert!(!container_matches(&container, Some(&failing)));
    }
}
