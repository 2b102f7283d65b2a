//! Clause structures for the WHERE compiler
//!
//! The analyzer marks boolean structure with `AND` / `NOT` / `IN` condition
//! tokens. Instead of mixing those markers into untyped expression lists,
//! the builder records them as tagged `Marker`s on the clause they apply to.

use std::fmt;
use serde_json::Value;

use crate::core::errors::{BuildError, Result};

/// Boolean joiner between sibling clauses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Combinator {
    And,
    Or,
}

impl Combinator {
    /// Parse a CONDITION payload into a combinator
    pub fn from_condition(value: &str) -> Option<Self> {
        match value.to_ascii_uppercase().as_str() {
            "AND" => Some(Combinator::And),
            "OR" => Some(Combinator::Or),
            _ => None,
        }
    }

    /// Filter key used to graft clauses under this combinator
    pub fn operator(&self) -> &'static str {
        match self {
            Combinator::And => "$and",
            Combinator::Or => "$or",
        }
    }
}

/// A marker attached to a clause
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Marker {
    And,
    Not,
    In,
}

impl Marker {
    /// Parse a CONDITION payload into a marker
    pub fn from_condition(value: &str) -> Option<Self> {
        match value.to_ascii_uppercase().as_str() {
            "AND" => Some(Marker::And),
            "NOT" => Some(Marker::Not),
            "IN" => Some(Marker::In),
            _ => None,
        }
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Marker::And => write!(f, "AND"),
            Marker::Not => write!(f, "NOT"),
            Marker::In => write!(f, "IN"),
        }
    }
}

/// Resolved modifier of a single clause
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ClauseModifier {
    #[default]
    None,
    Not,
    In,
    NotIn,
}

/// Which part of the filter a clause is emitted into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    /// Merged into the filter root (`where*`)
    Root,
    /// Appended to `$or` (`orWhere*`)
    Or,
    /// Appended to `$and` (`andWhere*`)
    And,
}

impl From<Combinator> for Family {
    fn from(combinator: Combinator) -> Self {
        match combinator {
            Combinator::And => Family::And,
            Combinator::Or => Family::Or,
        }
    }
}

/// A clause-emitting operation: `where`, `orWhereNotIn`, `andWhere`, ...
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WhereFn {
    pub family: Family,
    pub modifier: ClauseModifier,
}

impl WhereFn {
    /// Create a new clause operation
    pub fn new(family: Family, modifier: ClauseModifier) -> Self {
        WhereFn { family, modifier }
    }

    /// Name of the operation, as used in logs
    pub fn name(&self) -> &'static str {
        match (self.family, self.modifier) {
            (Family::Root, ClauseModifier::None) => "where",
            (Family::Root, ClauseModifier::Not) => "whereNot",
            (Family::Root, ClauseModifier::In) => "whereIn",
            (Family::Root, ClauseModifier::NotIn) => "whereNotIn",
            (Family::Or, ClauseModifier::None) => "orWhere",
            (Family::Or, ClauseModifier::Not) => "orWhereNot",
            (Family::Or, ClauseModifier::In) => "orWhereIn",
            (Family::Or, ClauseModifier::NotIn) => "orWhereNotIn",
            (Family::And, ClauseModifier::None) => "andWhere",
            (Family::And, ClauseModifier::Not) => "andWhereNot",
            (Family::And, ClauseModifier::In) => "andWhereIn",
            (Family::And, ClauseModifier::NotIn) => "andWhereNotIn",
        }
    }
}

/// A `key [operator] value` triple
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub key: String,
    pub operator: Option<String>,
    pub value: Value,
}

impl Condition {
    /// Create a new condition
    pub fn new<K: Into<String>, V: Into<Value>>(key: K, operator: Option<&str>, value: V) -> Self {
        Condition {
            key: key.into(),
            operator: operator.map(str::to_string),
            value: value.into(),
        }
    }
}

/// A condition together with the markers that qualify it
#[derive(Debug, Clone, PartialEq)]
pub struct Clause {
    /// Markers in the order the compiler attached them
    pub markers: Vec<Marker>,
    pub condition: Condition,
}

impl Clause {
    /// Create a clause without markers
    pub fn new(condition: Condition) -> Self {
        Clause { markers: Vec::new(), condition }
    }

    /// Attach a marker in front of the existing ones
    pub fn prefix(&mut self, marker: Marker) {
        self.markers.insert(0, marker);
    }
}

/// Member of an expression group
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A single clause
    Clause(Clause),
    /// A nested group whose members are joined by `combinator`
    Group {
        combinator: Combinator,
        members: Vec<Expr>,
    },
}

/// Incremental `[markers] key [operator] value` assembler.
///
/// A new KEY starts a new clause unless only markers have been collected so
/// far. An OPERATOR right after a finished clause reopens it for the same
/// key, so `votes > 100 < 200` yields two clauses on `votes`.
#[derive(Debug, Clone, Default)]
pub struct ClauseBuilder {
    markers: Vec<Marker>,
    key: Option<String>,
    operator: Option<String>,
    done: bool,
}

impl ClauseBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        ClauseBuilder::default()
    }

    /// Create a builder that starts with a single marker
    pub fn with_marker(marker: Marker) -> Self {
        ClauseBuilder {
            markers: vec![marker],
            ..ClauseBuilder::default()
        }
    }

    /// Create a builder holding the given markers, in order
    pub fn with_markers(markers: &[Marker]) -> Self {
        ClauseBuilder {
            markers: markers.to_vec(),
            ..ClauseBuilder::default()
        }
    }

    /// Put a marker in front of the collected ones
    pub fn prefix(&mut self, marker: Marker) {
        self.markers.insert(0, marker);
    }

    /// Check if nothing but markers has been collected
    pub fn is_pending(&self) -> bool {
        self.key.is_none()
    }

    /// Markers still waiting for a KEY. Empty once a clause has started.
    pub fn pending_markers(&self) -> &[Marker] {
        if self.is_pending() {
            self.markers.as_slice()
        } else {
            &[]
        }
    }

    /// Feed a KEY token
    pub fn key(&mut self, key: &str) {
        if !self.is_pending() {
            *self = ClauseBuilder::new();
        }
        self.key = Some(key.to_string());
    }

    /// Feed an OPERATOR token
    pub fn operator(&mut self, operator: &str) -> Result<()> {
        if self.key.is_none() {
            return Err(BuildError::malformed(format!(
                "OPERATOR '{}' without a preceding KEY",
                operator
            )));
        }
        self.done = false;
        self.operator = Some(operator.to_string());
        Ok(())
    }

    /// Feed a VALUE token and return the completed clause
    pub fn value(&mut self, value: &Value) -> Result<Clause> {
        let key = match (&self.key, self.done) {
            (Some(key), false) => key.clone(),
            _ => {
                return Err(BuildError::malformed(format!(
                    "VALUE {} without a preceding KEY",
                    value
                )))
            },
        };
        self.done = true;

        Ok(Clause {
            markers: self.markers.clone(),
            condition: Condition {
                key,
                operator: self.operator.clone(),
                value: value.clone(),
            },
        })
    }
}
