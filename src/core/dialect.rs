//! Output dialect configuration
//!
//! The builder historically emitted two output shapes and two spellings for
//! count statements and LIKE patterns. The choice is made once, at the
//! builder's boundary, and applied uniformly to a whole compile.

use std::fs;
use std::path::Path;
use serde::{Serialize, Deserialize};

use crate::core::errors::Result;

/// Shape of the emitted query object
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputShape {
    /// Mongo command shape: `{find, filter, sort, projection, skip, limit}`, ...
    #[default]
    Wire,
    /// Normalized shape: `{collection, fn, criteria, fields, options}`
    Criteria,
}

/// How COUNT statements are emitted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CountStyle {
    /// `$group` aggregation with a `$sum: 1` accumulator
    #[default]
    Pipeline,
    /// `$exists: true` predicate on every counted field
    Exists,
}

/// How LIKE patterns are emitted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LikeStyle {
    /// `{"$regex": "^Test"}`
    #[default]
    Regex,
    /// Extended JSON regular expression literal
    /// `{"$regularExpression": {"pattern": "^Test", "options": ""}}`
    Literal,
}

/// Complete dialect configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Dialect {
    /// Output shape
    pub shape: OutputShape,
    /// COUNT spelling
    pub count: CountStyle,
    /// LIKE spelling
    pub like: LikeStyle,
}

impl Dialect {
    /// Create the default dialect (wire shape, pipeline count, `$regex`)
    pub fn new() -> Self {
        Dialect::default()
    }

    /// Load a dialect from a JSON file. Missing fields keep their defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Set the output shape
    pub fn with_shape(mut self, shape: OutputShape) -> Self {
        self.shape = shape;
        self
    }

    /// Set the COUNT spelling
    pub fn with_count(mut self, count: CountStyle) -> Self {
        self.count = count;
        self
    }

    /// Set the LIKE spelling
    pub fn with_like(mut self, like: LikeStyle) -> Self {
        self.like = like;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_dialect() {
        let dialect = Dialect::new();
        assert_eq!(dialect.shape, OutputShape::Wire);
        assert_eq!(dialect.count, CountStyle::Pipeline);
        assert_eq!(dialect.like, LikeStyle::Regex);
    }

    #[test]
    fn test_dialect_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"shape": "criteria", "count": "exists"}}"#).unwrap();

        let dialect = Dialect::from_file(file.path()).unwrap();
        assert_eq!(dialect.shape, OutputShape::Criteria);
        assert_eq!(dialect.count, CountStyle::Exists);
        assert_eq!(dialect.like, LikeStyle::Regex);
    }

    #[test]
    fn test_dialect_from_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = Dialect::from_file(dir.path().join("missing.json"));
        assert!(matches!(result, Err(crate::core::errors::BuildError::Io(_))));
    }

    #[test]
    fn test_dialect_builders() {
        let dialect = Dialect::new()
            .with_shape(OutputShape::Criteria)
            .with_like(LikeStyle::Literal);
        assert_eq!(dialect.shape, OutputShape::Criteria);
        assert_eq!(dialect.like, LikeStyle::Literal);
        assert_eq!(dialect.count, CountStyle::Pipeline);
    }
}
