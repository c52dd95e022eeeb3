//! Structured matching of observed records against partial patterns

use crate::compare::compare_scalar;
use crate::pattern::{Pattern, PatternValue};
use media_find_common::{FieldRef, Record};

/// Check an observed record against a partial pattern, field by field.
///
/// Every field named in the pattern must be present and satisfied; an
/// absent observed field never satisfies a constraint. Nested pattern
/// fields recurse one level into nested observed records; all other
/// pattern fields resolve through the scalar comparator. The result is the
/// AND over all pattern fields, short-circuiting on the first failure.
pub fn record_matches(observed: &dyn Record, pattern: &Pattern) -> bool {
    pattern.fields().all(|(name, expected)| {
        match (observed.field(name), expected) {
            (None, _) => false,
            (Some(FieldRef::Nested(inner)), PatternValue::Nested(nested)) => {
                record_matches(inner, nested)
            }
            (Some(observed), expected) => compare_scalar(&observed, expected),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use media_find_common::{StreamKind, StreamRecord};
    use std::collections::BTreeMap;

    fn stream() -> StreamRecord {
        StreamRecord {
            kind: Some(StreamKind::Video),
            codec_name: Some("h264".to_string()),
            profile: Some("Main".to_string()),
            width: Some(1920),
            height: Some(1080),
            tags: BTreeMap::from([("language".to_string(), "eng".to_string())]),
            ..Default::default()
        }
    }

    fn pattern(specs: &[&str]) -> Pattern {
        Pattern::from_specs(specs).unwrap()
    }

    #[test]
    fn test_all_fields_must_match() {
        let observed = stream();

        assert!(record_matches(&observed, &pattern(&["codec_name=h264"])));
        assert!(record_matches(
            &observed,
            &pattern(&["codec_name=h264", "profile=main", "width=>=1280"])
        ));
        assert!(!record_matches(
            &observed,
            &pattern(&["codec_name=h264", "profile=high"])
        ));
    }

    #[test]
    fn test_empty_pattern_is_unconstraining() {
        assert!(record_matches(&stream(), &Pattern::new()));
    }

    #[test]
    fn test_absent_field_never_matches() {
        // sample_rate is unset on a video stream
        assert!(!record_matches(&stream(), &pattern(&["sample_rate=48000"])));
        assert!(!record_matches(&stream(), &pattern(&["sample_rate=!48000"])));
    }

    #[test]
    fn test_nested_record_recursion() {
        let observed = stream();

        assert!(record_matches(&observed, &pattern(&["tags.language=eng"])));
        assert!(!record_matches(&observed, &pattern(&["tags.language=jpn"])));
        assert!(!record_matches(&observed, &pattern(&["tags.title=something"])));
    }

    #[test]
    fn test_scalar_pattern_against_nested_record() {
        // "tags" resolves to a nested record; a scalar constraint on it fails
        assert!(!record_matches(&stream(), &pattern(&["tags=eng"])));
    }

    #[test]
    fn test_monotonic_under_added_fields() {
        let observed = stream();
        let mut specs: Vec<&str> = vec!["codec_name=h264"];
        let mut previous = record_matches(&observed, &pattern(&specs));
        assert!(previous);

        // adding constraints can only flip a match from true to false
        for extra in ["width=>=1280", "profile=main", "height=720"] {
            specs.push(extra);
            let current = record_matches(&observed, &pattern(&specs));
            assert!(previous || !current);
            previous = current;
        }
        assert!(!previous);
    }
}
