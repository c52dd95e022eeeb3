//! Leaf comparison between one observed scalar and one pattern value
//!
//! All textual comparisons are case-insensitive. Numeric operators parse
//! both sides as `f64`; a parse failure on either side yields `false`,
//! never an error.

use crate::pattern::{CompareOp, PatternValue};
use media_find_common::FieldRef;
use std::borrow::Cow;

/// Textual representation of an observed scalar. Integral numbers render
/// without a trailing `.0` so `width=1920` compares equal to the probed
/// value `1920`.
fn scalar_text<'a>(observed: &'a FieldRef<'_>) -> Option<Cow<'a, str>> {
    match observed {
        FieldRef::Text(s) => Some(Cow::Borrowed(s)),
        FieldRef::Number(n) => {
            if n.fract() == 0.0 && n.abs() < 1e15 {
                Some(Cow::Owned(format!("{}", *n as i64)))
            } else {
                Some(Cow::Owned(n.to_string()))
            }
        }
        FieldRef::Nested(_) => None,
    }
}

fn scalar_number(observed: &FieldRef<'_>) -> Option<f64> {
    match observed {
        FieldRef::Number(n) => Some(*n),
        FieldRef::Text(s) => s.trim().parse().ok(),
        FieldRef::Nested(_) => None,
    }
}

/// Compare one observed scalar against one compiled pattern value.
///
/// A nested pattern never matches a scalar here; recursion into nested
/// records is the matcher's job.
pub fn compare_scalar(observed: &FieldRef<'_>, pattern: &PatternValue) -> bool {
    let Some(text) = scalar_text(observed) else {
        return false;
    };

    match pattern {
        PatternValue::Literal(expected) => text.to_lowercase() == expected.to_lowercase(),
        PatternValue::Compare(CompareOp::NotEquals, expected) => {
            text.to_lowercase() != expected.to_lowercase()
        }
        PatternValue::Compare(CompareOp::Contains, expected) => {
            text.to_lowercase().contains(&expected.to_lowercase())
        }
        PatternValue::Compare(op, expected) => {
            let (Some(lhs), Ok(rhs)) = (scalar_number(observed), expected.trim().parse::<f64>())
            else {
                return false;
            };
            match op {
                CompareOp::Ge => lhs >= rhs,
                CompareOp::Gt => lhs > rhs,
                CompareOp::Le => lhs <= rhs,
                CompareOp::Lt => lhs < rhs,
                // textual operators are handled in the arms above
                CompareOp::Contains | CompareOp::NotEquals => false,
            }
        }
        PatternValue::Nested(_) => false,
    }
}
