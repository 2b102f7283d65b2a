//! Identifier module
//!
//! Identifiers scope the tokens that follow them (`SELECT`, `WHERE`, ...).
//! Join identifiers are recognized so that their payloads can be dropped.

use std::fmt;
use std::str::FromStr;

/// Kinds of joins the analyzer can emit. None of them are supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JoinKind {
    Join,
    Inner,
    Outer,
    Cross,
    Left,
    LeftOuter,
    Right,
    RightOuter,
    FullOuter,
}

/// A clause identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Identifier {
    Select,
    From,
    Into,
    Using,
    Where,
    Insert,
    Update,
    Delete,
    Limit,
    Skip,
    Offset,
    OrderBy,
    GroupBy,
    Count,
    Distinct,
    /// Any of the join identifiers
    Join(JoinKind),
    /// An identifier the builder does not know about
    Other(String),
}

impl Identifier {
    /// Check if this is a join identifier
    pub fn is_join(&self) -> bool {
        matches!(self, Identifier::Join(_))
    }

    /// Get the canonical analyzer name
    pub fn as_str(&self) -> &str {
        match self {
            Identifier::Select => "SELECT",
            Identifier::From => "FROM",
            Identifier::Into => "INTO",
            Identifier::Using => "USING",
            Identifier::Where => "WHERE",
            Identifier::Insert => "INSERT",
            Identifier::Update => "UPDATE",
            Identifier::Delete => "DELETE",
            Identifier::Limit => "LIMIT",
            Identifier::Skip => "SKIP",
            Identifier::Offset => "OFFSET",
            Identifier::OrderBy => "ORDERBY",
            Identifier::GroupBy => "GROUPBY",
            Identifier::Count => "COUNT",
            Identifier::Distinct => "DISTINCT",
            Identifier::Join(JoinKind::Join) => "JOIN",
            Identifier::Join(JoinKind::Inner) => "INNERJOIN",
            Identifier::Join(JoinKind::Outer) => "OUTERJOIN",
            Identifier::Join(JoinKind::Cross) => "CROSSJOIN",
            Identifier::Join(JoinKind::Left) => "LEFTJOIN",
            Identifier::Join(JoinKind::LeftOuter) => "LEFTOUTERJOIN",
            Identifier::Join(JoinKind::Right) => "RIGHTJOIN",
            Identifier::Join(JoinKind::RightOuter) => "RIGHTOUTERJOIN",
            Identifier::Join(JoinKind::FullOuter) => "FULLOUTERJOIN",
            Identifier::Other(name) => name,
        }
    }

    /// Resolve an analyzer name. Unknown names become `Identifier::Other`.
    pub fn from_name(s: &str) -> Self {
        match s.to_ascii_uppercase().as_str() {
            "SELECT" => Identifier::Select,
            "FROM" => Identifier::From,
            "INTO" => Identifier::Into,
            "USING" => Identifier::Using,
            "WHERE" => Identifier::Where,
            "INSERT" => Identifier::Insert,
            "UPDATE" => Identifier::Update,
            "DELETE" => Identifier::Delete,
            "LIMIT" => Identifier::Limit,
            "SKIP" => Identifier::Skip,
            "OFFSET" => Identifier::Offset,
            "ORDERBY" => Identifier::OrderBy,
            "GROUPBY" => Identifier::GroupBy,
            "COUNT" => Identifier::Count,
            "DISTINCT" => Identifier::Distinct,
            "JOIN" => Identifier::Join(JoinKind::Join),
            "INNERJOIN" => Identifier::Join(JoinKind::Inner),
            "OUTERJOIN" => Identifier::Join(JoinKind::Outer),
            "CROSSJOIN" => Identifier::Join(JoinKind::Cross),
            "LEFTJOIN" => Identifier::Join(JoinKind::Left),
            "LEFTOUTERJOIN" => Identifier::Join(JoinKind::LeftOuter),
            "RIGHTJOIN" => Identifier::Join(JoinKind::Right),
            "RIGHTOUTERJOIN" => Identifier::Join(JoinKind::RightOuter),
            "FULLOUTERJOIN" => Identifier::Join(JoinKind::FullOuter),
            _ => Identifier::Other(s.to_string()),
        }
    }
}

impl FromStr for Identifier {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Identifier::from_name(s))
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
