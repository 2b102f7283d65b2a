//! Token module for the RQL builder
//!
//! This module defines the analyzed tree handed over by the analyzer:
//! a `Tree` is an ordered list of token groups, and a token group is an
//! ordered list of tokens or nested groups. Nesting only ever encodes
//! boolean grouping.
//!
//! The JSON form matches the analyzer output, a token being
//! `{"type": "KEY", "value": "name"}` and a group being an array.

use std::fmt;
use serde::{Serialize, Deserialize};
use serde_json::Value;

use crate::core::errors::Result;

/// The different kinds of tokens in an analyzed tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenKind {
    /// Clause identifier (SELECT, FROM, WHERE, ...)
    Identifier,
    /// Attribute name
    Key,
    /// Comparison operator (`>`, `like`, ...)
    Operator,
    /// Literal value
    Value,
    /// Boolean condition marker (AND, OR, NOT, IN)
    Condition,
}

impl TokenKind {
    /// Get the analyzer name of the kind
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Identifier => "IDENTIFIER",
            TokenKind::Key => "KEY",
            TokenKind::Operator => "OPERATOR",
            TokenKind::Value => "VALUE",
            TokenKind::Condition => "CONDITION",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single analyzed token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    /// Kind of the token
    #[serde(rename = "type")]
    pub kind: TokenKind,
    /// Payload of the token
    pub value: Value,
}

impl Token {
    /// Create a new token
    pub fn new<V: Into<Value>>(kind: TokenKind, value: V) -> Self {
        Token { kind, value: value.into() }
    }

    /// Create an IDENTIFIER token
    pub fn identifier(name: &str) -> Self {
        Token::new(TokenKind::Identifier, name)
    }

    /// Create a KEY token
    pub fn key(name: &str) -> Self {
        Token::new(TokenKind::Key, name)
    }

    /// Create an OPERATOR token
    pub fn operator(symbol: &str) -> Self {
        Token::new(TokenKind::Operator, symbol)
    }

    /// Create a VALUE token
    pub fn value<V: Into<Value>>(value: V) -> Self {
        Token::new(TokenKind::Value, value)
    }

    /// Create a CONDITION token
    pub fn condition(marker: &str) -> Self {
        Token::new(TokenKind::Condition, marker)
    }

    /// Get the payload as a string, if it is one
    pub fn as_str(&self) -> Option<&str> {
        self.value.as_str()
    }

    /// Check if this token is of the given kind
    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.kind, self.value)
    }
}

/// An element of a token group: a token or a nested group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node {
    /// A nested group of nodes
    Group(Vec<Node>),
    /// A single token
    Token(Token),
}

impl Node {
    /// Get the token if this node is one
    pub fn as_token(&self) -> Option<&Token> {
        match self {
            Node::Token(token) => Some(token),
            Node::Group(_) => None,
        }
    }

    /// Get the nested nodes if this node is a group
    pub fn as_group(&self) -> Option<&[Node]> {
        match self {
            Node::Group(nodes) => Some(nodes),
            Node::Token(_) => None,
        }
    }
}

impl From<Token> for Node {
    fn from(token: Token) -> Self {
        Node::Token(token)
    }
}

impl From<Vec<Node>> for Node {
    fn from(nodes: Vec<Node>) -> Self {
        Node::Group(nodes)
    }
}

/// One identifier-scoped statement fragment
pub type TokenGroup = Vec<Node>;

/// A complete analyzed tree
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tree {
    groups: Vec<TokenGroup>,
}

impl Tree {
    /// Create an empty tree
    pub fn new() -> Self {
        Tree { groups: Vec::new() }
    }

    /// Create a tree from its token groups
    pub fn from_groups(groups: Vec<TokenGroup>) -> Self {
        Tree { groups }
    }

    /// Parse a tree from the analyzer's JSON output
    pub fn from_json(input: &str) -> Result<Self> {
        Ok(serde_json::from_str(input)?)
    }

    /// Convert an already parsed JSON value into a tree
    pub fn from_value(value: Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    /// Append a token group
    pub fn push(&mut self, group: TokenGroup) {
        self.groups.push(group);
    }

    /// Get all token groups in order
    pub fn groups(&self) -> &[TokenGroup] {
        &self.groups
    }

    /// Get the number of token groups
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Check if the tree has no groups
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
