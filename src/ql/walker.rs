//! Tree walker
//!
//! Drives a compile. Every token group of the tree gets its own
//! `ParseContext`, a small state machine keyed on the last IDENTIFIER seen.
//! All groups mutate the same `QueryModel`, strictly in order.

use log::{debug, trace, warn};

use crate::core::dialect::Dialect;
use crate::core::errors::{BuildError, Result};
use crate::core::identifier::Identifier;
use crate::core::token::{Node, Token, TokenKind, Tree};
use crate::ql::ast::{ClauseBuilder, Combinator, Family, Marker, WhereFn};
use crate::ql::dispatch::{dispatch_value, flush_pairs, PairBuffer};
use crate::ql::group::compile_group;
use crate::ql::modifiers::ModifierStack;
use crate::ql::query::QueryModel;

/// Compile a tree into a query model
pub fn compile(tree: &Tree, dialect: Dialect) -> Result<QueryModel> {
    let mut query = QueryModel::new(dialect);

    for (idx, group) in tree.groups().iter().enumerate() {
        trace!("Walking group {} ({} nodes)", idx, group.len());

        let mut context = ParseContext::new(&mut query);
        for node in group {
            context.step(node)?;
        }
        context.end_of_clause()?;
    }

    Ok(query)
}

/// Walker state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum State {
    /// No identifier seen yet
    Scanning,
    InWhere,
    InInsert,
    InUpdate,
    InOrderBy,
    /// A clause whose VALUE tokens are dispatched as they come
    InValue(Identifier),
    /// A clause whose tokens are dropped
    Ignoring(Identifier),
}

/// Per-group compile state
pub struct ParseContext<'q> {
    state: State,
    modifiers: ModifierStack,
    combinator: Option<Combinator>,
    expression: ClauseBuilder,
    pairs: PairBuffer,
    query: &'q mut QueryModel,
}

impl<'q> ParseContext<'q> {
    /// Create a context writing into `query`
    pub fn new(query: &'q mut QueryModel) -> Self {
        ParseContext {
            state: State::Scanning,
            modifiers: ModifierStack::new(),
            combinator: None,
            expression: ClauseBuilder::new(),
            pairs: PairBuffer::new(),
            query,
        }
    }

    /// Current state
    pub fn state(&self) -> &State {
        &self.state
    }

    /// Feed the next node of the group
    pub fn step(&mut self, node: &Node) -> Result<()> {
        match node {
            Node::Group(inner) => self.group(inner),
            Node::Token(token) => {
                trace!("{:?} <- {}", self.state, token);

                match token.kind {
                    TokenKind::Identifier => self.identifier(token),
                    TokenKind::Condition => self.condition(token),
                    TokenKind::Key | TokenKind::Operator | TokenKind::Value => self.operand(token),
                }
            },
        }
    }

    /// Close the current clause, flushing any buffered pairs
    pub fn end_of_clause(&mut self) -> Result<()> {
        let identifier = match &self.state {
            State::InInsert => Identifier::Insert,
            State::InUpdate => Identifier::Update,
            State::InOrderBy => Identifier::OrderBy,
            _ => return Ok(()),
        };

        let pairs = self.pairs.take()?;
        if identifier == Identifier::OrderBy && pairs.is_empty() {
            return Ok(());
        }
        flush_pairs(&identifier, pairs, self.query)
    }

    fn identifier(&mut self, token: &Token) -> Result<()> {
        let name = payload(token)?;
        let identifier = Identifier::from_name(name);

        self.end_of_clause()?;
        self.modifiers.clear();
        self.combinator = None;
        self.expression = ClauseBuilder::new();

        self.state = match identifier {
            Identifier::Where => State::InWhere,
            Identifier::Insert => State::InInsert,
            Identifier::Update => State::InUpdate,
            Identifier::OrderBy => State::InOrderBy,
            Identifier::Delete => {
                self.query.del();
                State::InValue(identifier)
            },
            Identifier::Join(_) => {
                warn!("{} is not supported; dropping its payload", identifier);
                State::Ignoring(identifier)
            },
            Identifier::Other(_) => {
                debug!("Ignoring unknown identifier '{}'", identifier);
                State::Ignoring(identifier)
            },
            _ => State::InValue(identifier),
        };

        debug!("Entering {:?}", self.state);
        Ok(())
    }

    fn condition(&mut self, token: &Token) -> Result<()> {
        match self.state {
            State::InWhere => {},
            State::Ignoring(_) => return Ok(()),
            _ => {
                return Err(BuildError::malformed(format!(
                    "CONDITION '{}' outside of a WHERE clause",
                    token.value
                )))
            },
        }

        let condition = payload(token)?;
        match Marker::from_condition(condition) {
            Some(Marker::Not) => self.modifiers.push(Marker::Not),
            Some(Marker::In) => self.modifiers.push(Marker::In),
            _ => match Combinator::from_condition(condition) {
                Some(combinator) => self.combinator = Some(combinator),
                None => debug!("Ignoring condition '{}'", condition),
            },
        }

        Ok(())
    }

    fn operand(&mut self, token: &Token) -> Result<()> {
        match &self.state {
            State::Scanning => Err(BuildError::malformed(format!(
                "{} token before any IDENTIFIER",
                token.kind
            ))),
            State::Ignoring(_) => Ok(()),
            State::InWhere => match token.kind {
                TokenKind::Key => {
                    self.expression.key(payload(token)?);
                    Ok(())
                },
                TokenKind::Operator => self.expression.operator(payload(token)?),
                _ => {
                    let clause = self.expression.value(&token.value)?;
                    let function = WhereFn::new(Family::Root, self.modifiers.resolved());
                    self.modifiers.clear();
                    self.query.apply(function, &clause.condition)
                },
            },
            State::InInsert | State::InUpdate | State::InOrderBy => match token.kind {
                TokenKind::Key => {
                    self.pairs.key(payload(token)?);
                    Ok(())
                },
                TokenKind::Value => self.pairs.value(&token.value),
                _ => Err(BuildError::malformed(format!(
                    "{} token in a key/value clause",
                    token.kind
                ))),
            },
            State::InValue(identifier) => match token.kind {
                TokenKind::Value => dispatch_value(identifier, &token.value, self.query),
                _ => Err(BuildError::malformed(format!(
                    "{} token in a {} clause",
                    token.kind, identifier
                ))),
            },
        }
    }

    fn group(&mut self, inner: &[Node]) -> Result<()> {
        match &self.state {
            State::InWhere => {
                // NOT / IN right before the group belong to the group
                let pending = ClauseBuilder::with_markers(self.modifiers.as_slice());
                self.modifiers.clear();
                self.expression = ClauseBuilder::new();
                compile_group(inner, false, pending, self.combinator, self.query)?;
                Ok(())
            },
            State::Ignoring(identifier) => {
                debug!("Dropping nested group of {}", identifier);
                Ok(())
            },
            other => Err(BuildError::malformed(format!("nested group in {:?}", other))),
        }
    }
}

fn payload(token: &Token) -> Result<&str> {
    token.as_str().ok_or_else(|| {
        BuildError::malformed(format!("{} token expects a string, got {}", token.kind, token.value))
    })
}
