//! Value dispatch
//!
//! Routes the VALUE tokens of simple clauses (`SELECT`, `FROM`, `LIMIT`,
//! ...) into the query model, and buffers the key/value pairs of `ORDERBY`,
//! `INSERT` and `UPDATE` until their clause ends.

use log::debug;
use serde_json::{Map, Value};

use crate::core::errors::{BuildError, Result};
use crate::core::identifier::Identifier;
use crate::ql::query::{merge_maps, QueryModel};

/// Apply the payload of a VALUE token to the model, according to the
/// identifier it belongs to.
pub fn dispatch_value(identifier: &Identifier, value: &Value, model: &mut QueryModel) -> Result<()> {
    match identifier {
        Identifier::Select => {
            let fields = string_list(identifier, value)?;
            model.select(&fields);
        },
        Identifier::From | Identifier::Into | Identifier::Using => {
            model.from(collection_name(identifier, value)?);
        },
        Identifier::Distinct => {
            let attributes = string_list(identifier, value)?;
            model.distinct(&attributes)?;
        },
        Identifier::Count => match value {
            Value::Bool(true) => model.count(None)?,
            Value::String(s) if s == "*" => model.count(None)?,
            _ => {
                let attributes = string_list(identifier, value)?;
                if attributes.is_empty() {
                    model.count(None)?;
                }
                for attribute in attributes {
                    model.count(Some(attribute))?;
                }
            },
        },
        Identifier::GroupBy => {
            let attributes = string_list(identifier, value)?;
            model.group_by(&attributes)?;
        },
        Identifier::Limit => model.limit(row_count(identifier, value)?),
        Identifier::Skip | Identifier::Offset => model.skip(row_count(identifier, value)?),
        Identifier::Delete => debug!("Ignoring DELETE payload {}", value),
        other => {
            return Err(BuildError::malformed(format!(
                "VALUE {} is not expected in a {} clause",
                value, other
            )))
        },
    }

    Ok(())
}

/// Buffer for `KEY VALUE` pairs of a clause
#[derive(Debug, Clone, Default)]
pub struct PairBuffer {
    key: Option<String>,
    pairs: Vec<(String, Value)>,
}

impl PairBuffer {
    /// Create an empty buffer
    pub fn new() -> Self {
        PairBuffer::default()
    }

    /// Remember the key of the next pair
    pub fn key(&mut self, key: &str) {
        self.key = Some(key.to_string());
    }

    /// Complete the pending pair
    pub fn value(&mut self, value: &Value) -> Result<()> {
        match self.key.take() {
            Some(key) => {
                self.pairs.push((key, value.clone()));
                Ok(())
            },
            None => Err(BuildError::malformed(format!("VALUE {} without a preceding KEY", value))),
        }
    }

    /// Check if nothing has been buffered
    pub fn is_empty(&self) -> bool {
        self.key.is_none() && self.pairs.is_empty()
    }

    /// Drain the buffered pairs. A KEY still waiting for its VALUE is an error.
    pub fn take(&mut self) -> Result<Vec<(String, Value)>> {
        if let Some(key) = self.key.take() {
            self.pairs.clear();
            return Err(BuildError::malformed(format!("KEY '{}' without a VALUE", key)));
        }
        Ok(std::mem::take(&mut self.pairs))
    }
}

/// Flush buffered pairs into the model at the end of their clause
pub fn flush_pairs(identifier: &Identifier, pairs: Vec<(String, Value)>, model: &mut QueryModel) -> Result<()> {
    debug!("Flushing {} pair(s) into {}", pairs.len(), identifier);

    match identifier {
        Identifier::OrderBy => {
            for (field, direction) in &pairs {
                model.sort(field, direction)?;
            }
        },
        Identifier::Insert => model.insert(document(pairs)),
        Identifier::Update => model.update(document(pairs)),
        other => {
            return Err(BuildError::malformed(format!("{} clause does not take key/value pairs", other)))
        },
    }

    Ok(())
}

// Later pairs on the same key win; object values merge
fn document(pairs: Vec<(String, Value)>) -> Map<String, Value> {
    let mut document = Map::new();
    for (key, value) in pairs {
        let mut entry = Map::new();
        entry.insert(key, value);
        merge_maps(&mut document, entry);
    }
    document
}

fn string_list<'a>(identifier: &Identifier, value: &'a Value) -> Result<Vec<&'a str>> {
    match value {
        Value::String(s) => Ok(vec![s.as_str()]),
        Value::Array(items) => items
            .iter()
            .map(|item| {
                item.as_str().ok_or_else(|| {
                    BuildError::malformed(format!("{} expects attribute names, got {}", identifier, item))
                })
            })
            .collect(),
        other => Err(BuildError::malformed(format!(
            "{} expects a name or a list of names, got {}",
            identifier, other
        ))),
    }
}

fn collection_name<'a>(identifier: &Identifier, value: &'a Value) -> Result<&'a str> {
    let name = match value {
        Value::String(s) => Some(s.as_str()),
        Value::Object(map) => map.get("table").and_then(Value::as_str),
        _ => None,
    };

    name.ok_or_else(|| {
        BuildError::malformed(format!("{} expects a collection name, got {}", identifier, value))
    })
}

fn row_count(identifier: &Identifier, value: &Value) -> Result<u64> {
    value.as_u64().ok_or_else(|| {
        BuildError::malformed(format!("{} expects a non-negative integer, got {}", identifier, value))
    })
}
