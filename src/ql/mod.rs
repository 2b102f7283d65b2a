//! Query compiler
//!
//! Turns an analyzed RQL tree into a Mongo-style query document. The walker
//! drives the compile; clause structure, modifiers and nested groups are
//! resolved into a `QueryModel` which is serialized once at the end.

pub mod ast;
pub mod operators;
pub mod modifiers;
pub mod query;
pub mod group;
pub mod dispatch;
pub mod walker;

use serde_json::Value;

use crate::core::dialect::Dialect;
use crate::core::errors::Result;
use crate::core::token::Tree;

/// Compile a tree and serialize it for the given dialect
pub fn build_query(tree: &Tree, dialect: Dialect) -> Result<Value> {
    let model = walker::compile(tree, dialect)?;
    Ok(model.to_document())
}
