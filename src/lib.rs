//! rql-builder: compiles analyzed RQL trees into MongoDB-style queries
//!
//! The input is the token tree produced by an RQL analyzer: an ordered list
//! of token groups, each starting with an IDENTIFIER (`SELECT`, `WHERE`, ...)
//! followed by KEY / OPERATOR / VALUE / CONDITION tokens and nested groups.
//! The output is a `serde_json::Value` in one of two shapes, selected by
//! the `Dialect`.
//!
//! ```
//! use rql_builder::{compile, Token, Tree};
//! use serde_json::json;
//!
//! let tree = Tree::from_groups(vec![
//!     vec![Token::identifier("SELECT").into(), Token::value("*").into()],
//!     vec![Token::identifier("FROM").into(), Token::value("users").into()],
//! ]);
//!
//! let query = compile(&tree).unwrap();
//! assert_eq!(query["find"], json!("users"));
//! ```

pub mod core;
pub mod ql;

use serde_json::Value;

pub use crate::core::{
    BuildError, CountStyle, Dialect, Identifier, JoinKind, LikeStyle, Node, OutputShape, Result,
    Token, TokenGroup, TokenKind, Tree,
};
pub use crate::ql::query::{QueryModel, StatementKind};

/// Compile a tree with the default dialect
pub fn compile(tree: &Tree) -> Result<Value> {
    Builder::new().build(tree)
}

/// Main entry point of the compiler
#[derive(Debug, Clone, Copy, Default)]
pub struct Builder {
    dialect: Dialect,
}

impl Builder {
    /// Create a builder with the default dialect
    pub fn new() -> Self {
        Builder::default()
    }

    /// Create a builder for the given dialect
    pub fn with_dialect(dialect: Dialect) -> Self {
        Builder { dialect }
    }

    /// Get the dialect this builder emits
    pub fn dialect(&self) -> &Dialect {
        &self.dialect
    }

    /// Compile a tree into a query document
    pub fn build(&self, tree: &Tree) -> Result<Value> {
        ql::build_query(tree, self.dialect)
    }

    /// Compile the analyzer's JSON output into a query document
    pub fn build_json(&self, input: &str) -> Result<Value> {
        let tree = Tree::from_json(input)?;
        self.build(&tree)
    }

    /// Compile a tree and keep the model instead of serializing it
    pub fn compile_model(&self, tree: &Tree) -> Result<QueryModel> {
        ql::walker::compile(tree, self.dialect)
    }
}
