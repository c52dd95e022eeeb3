//! Per-file accept/reject decision

use crate::filter::{container_matches, filter_streams, CategoryOutcome};
use crate::pattern::Pattern;
use media_find_common::{ProbeReport, StreamKind};
use std::collections::BTreeMap;

/// Compiled query for one run: an optional container pattern plus
/// per-stream-kind patterns. Shared read-only across all scan tasks.
#[derive(Debug, Clone, Default)]
pub struct Query {
    pub container: Option<Pattern>,
    pub streams: BTreeMap<StreamKind, Pattern>,
}

impl Query {
    /// A query with no constraints at all accepts everything; the CLI
    /// rejects this up front
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.container.is_none() && self.streams.is_empty()
    }
}

/// Match counts per constrained stream kind. Kinds without a pattern do
/// not appear, keeping "not requested" distinguishable from "zero".
pub type StreamCounts = BTreeMap<StreamKind, usize>;

/// Decide whether one probed file satisfies the query.
///
/// The container pattern (if any) must match, and every constrained stream
/// kind must have at least one matching stream. Returns the per-kind match
/// counts on acceptance, `None` on rejection.
pub fn evaluate(report: &ProbeReport, query: &Query) -> Option<StreamCounts> {
    if !container_matches(&report.container, query.container.as_ref()) {
        return None;
    }

    let mut counts = StreamCounts::new();
    for kind in StreamKind::ALL {
        match filter_streams(kind, &report.streams, query.streams.get(&kind)) {
            CategoryOutcome::Unconstrained => {}
            CategoryOutcome::Matched(0) => return None,
            CategoryOutcome::Matched(count) => {
                counts.insert(kind, count);
            }
        }
    }

    Some(counts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use media_find_common::{ContainerRecord, StreamRecord};

    fn report() -> ProbeReport {
        ProbeReport {
            container: ContainerRecord {
                format_name: Some("matroska,webm".to_string()),
                ..Default::default()
            },
            streams: vec![
                StreamRecord {
                    kind: Some(StreamKind::Video),
                    codec_name: Some("h264".to_string()),
                    width: Some(1920),
                    ..Default::default()
                },
                StreamRecord {
                    kind: Some(StreamKind::Video),
                    codec_name: Some("h264".to_string()),
                    width: Some(640),
                    ..Default::default()
                },
                StreamRecord {
                    kind: Some(StreamKind::Audio),
                    codec_name: Some("aac".to_string()),
                    ..Default::default()
                },
            ],
        }
    }

    fn query(container: Option<&[&str]>, streams: &[(StreamKind, &[&str])]) -> Query {
        Query {
            container: container.map(|specs| Pattern::from_specs(specs).unwrap()),
            streams: streams
                .iter()
                .map(|(kind, specs)| (*kind, Pattern::from_specs(specs).unwrap()))
                .collect(),
        }
    }

    #[test]
    fn test_accepted_with_counts_for_constrained_kinds_only() {
        let query = query(None, &[(StreamKind::Video, &["codec_name=h264"])]);

        let counts = evaluate(&report(), &query).expect("should match");
        assert_eq!(counts.get(&StreamKind::Video), Some(&2));
        // audio and subtitle were not requested, so they are absent
        assert!(!counts.contains_key(&StreamKind::Audio));
        assert!(!counts.contains_key(&StreamKind::Subtitle));
    }

    #[test]
    fn test_unconstrained_kind_never_blocks() {
        // the file has no subtitle streams, but none were requested
        let query = query(None, &[(StreamKind::Audio, &["codec_name=aac"])]);
        assert!(evaluate(&report(), &query).is_some());
    }

    #[test]
    fn test_constrained_kind_with_zero_matches_rejects() {
        let query = query(None, &[(StreamKind::Subtitle, &["codec_name=srt"])]);
        assert!(evaluate(&report(), &query).is_none());
    }

    #[test]
    fn test_container_pattern_gates_acceptance() {
        let accepted = query(
            Some(&["format_name=~matroska"]),
            &[(StreamKind::Video, &["codec_name=h264"])],
        );
        assert!(evaluate(&report(), &accepted).is_some());

        let rejected = query(
            Some(&["format_name=avi"]),
            &[(StreamKind::Video, &["codec_name=h264"])],
        );
        assert!(evaluate(&report(), &rejected).is_none());
    }

    #[test]
    fn test_all_constraints_combine_with_and() {
        let query = query(
            None,
            &[
                (StreamKind::Video, &["codec_name=h264", "width=>=1280"]),
                (StreamKind::Audio, &["codec_name=eac3"]),
            ],
        );
        // video matches one stream but the audio constraint fails
        assert!(evaluate(&report(), &query).is_none());
    }
}
