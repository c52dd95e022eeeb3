//! Query pattern model and compilation
//!
//! Patterns are compiled once per run from `FIELD=VALUE` specs. Operator
//! prefixes on the value are recognized here, at compile time, so the
//! comparator never re-parses them per stream:
//!
//! - `>=`, `>`, `<=`, `<` — numeric comparison
//! - `~` — case-insensitive substring containment
//! - `!` — case-insensitive inequality
//! - anything else — case-insensitive equality
//!
//! A dot in the field name addresses a one-level nested record
//! (`tags.language=eng`); deeper paths are rejected.
//!
//! There is no escape syntax: a literal value that itself starts with `>`,
//! `<`, `~`, or `!` cannot be expressed. This ambiguity is inherited from
//! the original query scheme and kept intact.

use crate::error::PatternError;
use std::collections::BTreeMap;

/// Comparison operator for one pattern field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Ge,
    Gt,
    Le,
    Lt,
    Contains,
    NotEquals,
}

/// One compiled pattern field: a literal, an operator comparison, or a
/// nested partial record
#[derive(Debug, Clone, PartialEq)]
pub enum PatternValue {
    Literal(String),
    Compare(CompareOp, String),
    Nested(Pattern),
}

impl PatternValue {
    /// Split an operator prefix off a raw value. Prefixes are checked
    /// longest-first so `>=` never parses as `>` followed by `=...`.
    fn parse(raw: &str) -> PatternValue {
        const PREFIXES: [(&str, CompareOp); 6] = [
            (">=", CompareOp::Ge),
            (">", CompareOp::Gt),
            ("<=", CompareOp::Le),
            ("<", CompareOp::Lt),
            ("~", CompareOp::Contains),
            ("!", CompareOp::NotEquals),
        ];

        for (prefix, op) in PREFIXES {
            if let Some(rest) = raw.strip_prefix(prefix) {
                return PatternValue::Compare(op, rest.to_string());
            }
        }
        PatternValue::Literal(raw.to_string())
    }
}

/// A partial record of desired field values, matched field-by-field.
/// Fields absent from the pattern are unconstrained.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pattern {
    fields: BTreeMap<String, PatternValue>,
}

impl Pattern {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Iterate the constrained fields in name order
    pub fn fields(&self) -> impl Iterator<Item = (&str, &PatternValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Compile a pattern from `FIELD=VALUE` specs, as supplied on the
    /// command line. Later specs for the same field override earlier ones.
    pub fn from_specs<S: AsRef<str>>(specs: &[S]) -> Result<Pattern, PatternError> {
        let mut pattern = Pattern::new();
        for spec in specs {
            pattern.add_spec(spec.as_ref())?;
        }
        Ok(pattern)
    }

    /// Add one `FIELD=VALUE` spec to the pattern
    pub fn add_spec(&mut self, spec: &str) -> Result<(), PatternError> {
        let spec = spec.trim();
        if spec.is_empty() {
            return Err(PatternError::EmptySpec);
        }
        let (path, raw) = spec
            .split_once('=')
            .ok_or_else(|| PatternError::MissingValue(spec.to_string()))?;
        self.insert(path.trim(), PatternValue::parse(raw.trim()))
            .map_err(|err| match err {
                // report the full spec, not just the path
                PatternError::EmptyField(_) => PatternError::EmptyField(spec.to_string()),
                other => other,
            })
    }

    /// Insert a compiled value at `path`, where a single dot addresses a
    /// one-level nested record
    pub fn insert(&mut self, path: &str, value: PatternValue) -> Result<(), PatternError> {
        match path.split_once('.') {
            None => {
                if path.is_empty() {
                    return Err(PatternError::EmptyField(path.to_string()));
                }
                if matches!(self.fields.get(path), Some(PatternValue::Nested(_)))
                    && !matches!(value, PatternValue::Nested(_))
                {
                    return Err(PatternError::MixedNesting(path.to_string()));
                }
                self.fields.insert(path.to_string(), value);
                Ok(())
            }
            Some((outer, inner)) => {
                if outer.is_empty() || inner.is_empty() {
                    return Err(PatternError::EmptyField(path.to_string()));
                }
                // observed records nest exactly one level deep
                if inner.contains('.') {
                    return Err(PatternError::TooDeep(path.to_string()));
                }
                let nested = self
                    .fields
                    .entry(outer.to_string())
                    .or_insert_with(|| PatternValue::Nested(Pattern::new()));
                match nested {
                    PatternValue::Nested(pattern) => pattern.insert(inner, value),
                    _ => Err(PatternError::MixedNesting(outer.to_string())),
                }
            }
        }
    }
}
