//! Operator normalization
//!
//! Maps RQL comparison symbols to their Mongo counterparts and compiles
//! LIKE patterns into regular expressions.

use serde_json::{json, Value};

use crate::core::dialect::{Dialect, LikeStyle};
use crate::core::errors::{BuildError, Result};

/// Map an RQL comparison symbol to the target operator.
///
/// Unknown symbols are returned unchanged so newer operators (`$exists`,
/// `$regex`, ...) can flow through untouched.
pub fn normalize_operator(symbol: &str) -> String {
    match symbol {
        ">" => "$gt",
        ">=" => "$gte",
        "<" => "$lt",
        "<=" => "$lte",
        "<>" | "!" => "$ne",
        other => other,
    }
    .to_string()
}

/// Check if an operator is the LIKE operator
pub fn is_like(operator: &str) -> bool {
    operator.eq_ignore_ascii_case("like")
}

/// Normalize a value for the given operator.
///
/// Only LIKE changes the value; everything else, `null` included, passes
/// through as is.
pub fn normalize_value(value: &Value, operator: Option<&str>, dialect: &Dialect) -> Result<Value> {
    match operator {
        Some(op) if is_like(op) => {
            let raw = value.as_str().ok_or_else(|| {
                BuildError::malformed(format!("LIKE expects a string pattern, got {}", value))
            })?;
            Ok(pattern_value(&like_pattern(raw), dialect.like))
        },
        _ => Ok(value.clone()),
    }
}

/// Compile a LIKE pattern into a regular expression.
///
/// `%x%` matches anywhere, `%x` is anchored at the end, `x%` at the start and
/// a pattern without any leading or trailing `%` must match exactly.
/// Interior `%` match any run of characters; everything else is literal.
pub fn like_pattern(raw: &str) -> String {
    let leading = raw.starts_with('%');
    let trailing = raw.ends_with('%') && (raw.len() > 1 || leading);

    let mut inner = raw;
    if leading {
        inner = &inner[1..];
    }
    if trailing {
        inner = inner.strip_suffix('%').unwrap_or(inner);
    }

    let body = inner
        .split('%')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(".*");

    match (leading, trailing) {
        (true, true) => body,
        (true, false) => format!("{}$", body),
        (false, true) => format!("^{}", body),
        (false, false) => format!("^{}$", body),
    }
}

fn pattern_value(pattern: &str, style: LikeStyle) -> Value {
    match style {
        LikeStyle::Regex => json!({ "$regex": pattern }),
        LikeStyle::Literal => json!({
            "$regularExpression": { "pattern": pattern, "options": "" }
        }),
    }
}
