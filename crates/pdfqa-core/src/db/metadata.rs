//! Metadata filters over chunk metadata
//!
//! Chunk metadata is a flat JSON object; filters are evaluated in Rust after
//! the row is loaded.

use crate::error::{PdfQaError, Result};
use crate::providers::Metadata;
use serde_json::Value;

/// Metadata query filter
#[derive(Debug, Clone, PartialEq)]
pub enum MetadataFilter {
    /// Value equals (numbers compare numerically)
    Eq(String, Value),

    /// Text contains
    TextContains(String, String),

    /// Numeric comparison
    Gt(String, f64),
    Gte(String, f64),
    Lt(String, f64),
    Lte(String, f64),
    Range(String, f64, f64),

    /// Value is one of
    In(String, Vec<Value>),

    /// Field exists
    Exists(String),

    /// AND combination
    And(Vec<MetadataFilter>),

    /// OR combination
    Or(Vec<MetadataFilter>),

    /// NOT
    Not(Box<MetadataFilter>),
}

impl MetadataFilter {
    /// Shorthand for an equality filter
    pub fn eq(key: impl Into<String>, value: impl Into<Value>) -> Self {
        MetadataFilter::Eq(key.into(), value.into())
    }

    /// Check if metadata matches this filter
    pub fn matches(&self, metadata: &Metadata) -> bool {
        match self {
            MetadataFilter::Eq(key, value) => {
                metadata.get(key).is_some_and(|v| values_equal(v, value))
            }
            MetadataFilter::TextContains(key, substring) => {
                matches!(metadata.get(key), Some(Value::String(v)) if v.contains(substring.as_str()))
            }
            MetadataFilter::Gt(key, bound) => number(metadata, key).is_some_and(|v| v > *bound),
            MetadataFilter::Gte(key, bound) => number(metadata, key).is_some_and(|v| v >= *bound),
            MetadataFilter::Lt(key, bound) => number(metadata, key).is_some_and(|v| v < *bound),
            MetadataFilter::Lte(key, bound) => number(metadata, key).is_some_and(|v| v <= *bound),
            MetadataFilter::Range(key, min, max) => {
                number(metadata, key).is_some_and(|v| v >= *min && v <= *max)
            }
            MetadataFilter::In(key, values) => metadata
                .get(key)
                .is_some_and(|v| values.iter().any(|candidate| values_equal(v, candidate))),
            MetadataFilter::Exists(key) => metadata.contains_key(key),
            MetadataFilter::And(filters) => filters.iter().all(|f| f.matches(metadata)),
            MetadataFilter::Or(filters) => filters.iter().any(|f| f.matches(metadata)),
            MetadataFilter::Not(filter) => !filter.matches(metadata),
        }
    }

    /// Parse a CLI expression such as `page=2`, `page>=1` or `source=manual.pdf`
    ///
    /// Right-hand sides that parse as JSON (numbers, booleans) keep their
    /// type; anything else is compared as a string.
    pub fn parse(expr: &str) -> Result<Self> {
        const OPERATORS: [&str; 5] = [">=", "<=", ">", "<", "="];

        let (position, op) = OPERATORS
            .iter()
            .filter_map(|op| expr.find(op).map(|i| (i, *op)))
            .min_by_key(|(i, op)| (*i, std::cmp::Reverse(op.len())))
            .ok_or_else(|| {
                PdfQaError::InvalidInput(format!(
                    "Invalid filter '{}': expected key=value, key>=n, key<=n, key>n or key<n",
                    expr
                ))
            })?;

        let key = expr[..position].trim();
        let raw = expr[position + op.len()..].trim();
        if key.is_empty() || raw.is_empty() {
            return Err(PdfQaError::InvalidInput(format!(
                "Invalid filter '{}': key and value must be non-empty",
                expr
            )));
        }

        if op == "=" {
            let value = serde_json::from_str::<Value>(raw)
                .ok()
                .filter(|v| !v.is_object() && !v.is_array())
                .unwrap_or_else(|| Value::String(raw.to_string()));
            return Ok(MetadataFilter::Eq(key.to_string(), value));
        }

        let bound: f64 = raw.parse().map_err(|_| {
            PdfQaError::InvalidInput(format!(
                "Invalid filter '{}': '{}' is not a number",
                expr, raw
            ))
        })?;
        let key = key.to_string();
        Ok(match op {
            ">=" => MetadataFilter::Gte(key, bound),
            "<=" => MetadataFilter::Lte(key, bound),
            ">" => MetadataFilter::Gt(key, bound),
            _ => MetadataFilter::Lt(key, bound),
        })
    }

    /// Combine several filters with AND; `None` when there are none
    pub fn all(mut filters: Vec<MetadataFilter>) -> Option<Self> {
        match filters.len() {
            0 => None,
            1 => filters.pop(),
            _ => Some(MetadataFilter::And(filters)),
        }
    }
}

fn number(metadata: &Metadata, key: &str) -> Option<f64> {
    metadata.get(key).and_then(Value::as_f64)
}

fn values_equal(a: &Value, b: &Value) -> bool {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) if a.is_number() && b.is_number() => x == y,
        _ => a == b,
    }
}
