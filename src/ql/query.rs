//! Query model
//!
//! `QueryModel` is the accumulator the compiler mutates while it walks a
//! tree. It offers the clause-emitting operations (`where`, `orWhereNotIn`,
//! grafting of nested filters, ...) and serializes itself once, at the end,
//! into one of the two output shapes.

use std::fmt;
use log::debug;
use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::core::dialect::{CountStyle, Dialect, OutputShape};
use crate::core::errors::{BuildError, Result};
use crate::ql::ast::{ClauseModifier, Combinator, Condition, Family, WhereFn};
use crate::ql::operators::{is_like, normalize_operator, normalize_value};

/// Kind of statement being built
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatementKind {
    Find,
    Count,
    Distinct,
    Aggregate,
    Insert,
    Update,
    Remove,
}

impl StatementKind {
    /// Get the name used in the normalized output shape
    pub fn as_str(&self) -> &'static str {
        match self {
            StatementKind::Find => "find",
            StatementKind::Count => "count",
            StatementKind::Distinct => "distinct",
            StatementKind::Aggregate => "aggregate",
            StatementKind::Insert => "insert",
            StatementKind::Update => "update",
            StatementKind::Remove => "remove",
        }
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Accumulator for a single compile
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryModel {
    dialect: Dialect,
    kind: Option<StatementKind>,
    collection: String,
    filter: Map<String, Value>,
    projection: Vec<String>,
    sort: Map<String, Value>,
    skip: u64,
    limit: u64,
    values: Map<String, Value>,
    key: Option<String>,
    grouping: Vec<String>,
    pipeline: Vec<Value>,
}

impl QueryModel {
    /// Create an empty model for the given dialect
    pub fn new(dialect: Dialect) -> Self {
        QueryModel {
            dialect,
            ..QueryModel::default()
        }
    }

    /// Create an empty model sharing this model's dialect
    pub fn nested(&self) -> Self {
        QueryModel::new(self.dialect)
    }

    // --- Statement kind -------------------------------------------------

    /// Switch to the given statement kind
    pub fn set_kind(&mut self, kind: StatementKind) {
        if let Some(previous) = self.kind {
            if previous != kind {
                debug!("Statement kind changes from {} to {}", previous, kind);
            }
        }
        self.kind = Some(kind);
    }

    /// Project the given fields. `*` entries select every field.
    pub fn select(&mut self, fields: &[&str]) {
        if self.kind.is_none() {
            self.kind = Some(StatementKind::Find);
        }

        for field in fields.iter().filter(|f| **f != "*") {
            if !self.projection.iter().any(|p| p.as_str() == *field) {
                self.projection.push(field.to_string());
            }
        }
    }

    /// Set the target collection
    pub fn from(&mut self, collection: &str) {
        self.collection = collection.to_string();
    }

    /// Mark the statement as a delete
    pub fn del(&mut self) {
        self.set_kind(StatementKind::Remove);
    }

    /// Count rows, optionally grouped by `attribute`
    pub fn count(&mut self, attribute: Option<&str>) -> Result<()> {
        self.set_kind(StatementKind::Count);

        if let Some(attribute) = attribute {
            self.grouping.push(attribute.to_string());

            if self.dialect.count == CountStyle::Exists {
                let exists = Condition::new(attribute, Some("$exists"), true);
                self.apply(WhereFn::new(Family::Root, ClauseModifier::None), &exists)?;
            }
        }

        Ok(())
    }

    /// Select the distinct values of one or more attributes.
    ///
    /// A single attribute uses the dedicated distinct command; several need
    /// an aggregation grouped on all of them.
    pub fn distinct(&mut self, attributes: &[&str]) -> Result<()> {
        match attributes {
            [] => Err(BuildError::malformed("DISTINCT needs at least one attribute")),
            [attribute] => {
                self.set_kind(StatementKind::Distinct);
                self.key = Some(attribute.to_string());
                Ok(())
            },
            _ => {
                self.set_kind(StatementKind::Aggregate);
                self.pipeline.push(json!({ "$group": { "_id": composite_id(attributes) } }));
                Ok(())
            },
        }
    }

    /// Group rows by one or more attributes
    pub fn group_by(&mut self, attributes: &[&str]) -> Result<()> {
        let id = match attributes {
            [] => return Err(BuildError::malformed("GROUPBY needs at least one attribute")),
            [attribute] => Value::String(format!("${}", attribute)),
            _ => composite_id(attributes),
        };

        self.set_kind(StatementKind::Aggregate);
        self.pipeline.push(json!({ "$group": { "_id": id } }));
        Ok(())
    }

    /// Merge values into the insert document
    pub fn insert(&mut self, values: Map<String, Value>) {
        self.set_kind(StatementKind::Insert);
        merge_maps(&mut self.values, values);
    }

    /// Merge values into the update document
    pub fn update(&mut self, values: Map<String, Value>) {
        self.set_kind(StatementKind::Update);
        merge_maps(&mut self.values, values);
    }

    /// Set the number of rows to return
    pub fn limit(&mut self, count: u64) {
        self.limit = count;
    }

    /// Set the number of rows to skip
    pub fn skip(&mut self, count: u64) {
        self.skip = count;
    }

    /// Add a sort on `attribute`. Later sorts on the same attribute win.
    pub fn sort(&mut self, attribute: &str, direction: &Value) -> Result<()> {
        let direction = normalize_direction(attribute, direction)?;
        self.sort.insert(attribute.to_string(), Value::from(direction));
        Ok(())
    }

    // --- Filter ---------------------------------------------------------

    /// Emit a single condition through one of the `where*` operations
    pub fn apply(&mut self, function: WhereFn, condition: &Condition) -> Result<()> {
        debug!("{}({:?}, {:?}, {})", function.name(), condition.key, condition.operator, condition.value);

        let fragment = self.fragment(function.modifier, condition)?;

        match function.family {
            Family::Root => self.merge_root(&condition.key, fragment),
            Family::Or | Family::And => {
                let mut leaf = Map::new();
                leaf.insert(condition.key.clone(), fragment);
                self.push_grouped(function.family, Value::Object(leaf));
            },
        }

        Ok(())
    }

    /// Attach an already built filter under `$or` or `$and`
    pub fn graft(&mut self, combinator: Combinator, nested: Map<String, Value>) {
        if nested.is_empty() {
            return;
        }
        debug!("{}Where(<nested filter with {} entries>)", match combinator {
            Combinator::And => "and",
            Combinator::Or => "or",
        }, nested.len());

        self.push_grouped(Family::from(combinator), Value::Object(nested));
    }

    // Root-level conditions on the same key combine their operators
    // (`{votes: {$gt: 100, $lt: 200}}`). A condition that would overwrite
    // the existing entry is conjoined under `$and` instead.
    fn merge_root(&mut self, key: &str, fragment: Value) {
        let mergeable = match (self.filter.get(key), &fragment) {
            (None, _) => {
                self.filter.insert(key.to_string(), fragment);
                return;
            },
            (Some(Value::Object(existing)), Value::Object(incoming)) => {
                is_operator_map(existing)
                    && is_operator_map(incoming)
                    && !incoming.keys().any(|op| existing.contains_key(op))
            },
            _ => false,
        };

        if mergeable {
            if let (Some(Value::Object(existing)), Value::Object(incoming)) = (self.filter.get_mut(key), fragment) {
                merge_maps(existing, incoming);
            }
            return;
        }

        let mut leaf = Map::new();
        leaf.insert(key.to_string(), fragment);
        self.push_grouped(Family::And, Value::Object(leaf));
    }

    fn push_grouped(&mut self, family: Family, entry: Value) {
        let operator = match family {
            Family::And => Combinator::And.operator(),
            _ => Combinator::Or.operator(),
        };

        let slot = self
            .filter
            .entry(operator.to_string())
            .or_insert_with(|| Value::Array(Vec::new()));

        match slot {
            Value::Array(entries) => entries.push(entry),
            other => *other = Value::Array(vec![entry]),
        }
    }

    // Render the right-hand side of `{key: ...}` for a condition
    fn fragment(&self, modifier: ClauseModifier, condition: &Condition) -> Result<Value> {
        let value = &condition.value;
        let operator = condition.operator.as_deref();

        let fragment = match modifier {
            ClauseModifier::In => json!({ "$in": as_list(value) }),
            ClauseModifier::NotIn => json!({ "$nin": as_list(value) }),
            ClauseModifier::None => match operator {
                None => value.clone(),
                Some(op) if is_like(op) => normalize_value(value, operator, &self.dialect)?,
                Some(op) => operator_map(op, value.clone()),
            },
            ClauseModifier::Not => match operator {
                None => json!({ "$ne": value }),
                Some(op) if is_like(op) => {
                    json!({ "$not": normalize_value(value, operator, &self.dialect)? })
                },
                Some(op) => json!({ "$not": operator_map(op, value.clone()) }),
            },
        };

        Ok(fragment)
    }

    // --- Accessors ------------------------------------------------------

    /// Statement kind, `find` when nothing else was requested
    pub fn kind(&self) -> StatementKind {
        self.kind.unwrap_or(StatementKind::Find)
    }

    /// Dialect this model serializes to
    pub fn dialect(&self) -> &Dialect {
        &self.dialect
    }

    /// Target collection
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Filter built so far
    pub fn filter(&self) -> &Map<String, Value> {
        &self.filter
    }

    /// Consume the model and keep only its filter
    pub fn into_filter(self) -> Map<String, Value> {
        self.filter
    }

    /// Projected fields in order
    pub fn projection(&self) -> &[String] {
        &self.projection
    }

    /// Sort specification in order
    pub fn sort_spec(&self) -> &Map<String, Value> {
        &self.sort
    }

    /// Rows to skip
    pub fn skip_count(&self) -> u64 {
        self.skip
    }

    /// Rows to return, 0 for no limit
    pub fn limit_count(&self) -> u64 {
        self.limit
    }

    /// Insert / update document
    pub fn values(&self) -> &Map<String, Value> {
        &self.values
    }

    /// Aggregation stages added by DISTINCT / GROUPBY
    pub fn pipeline(&self) -> &[Value] {
        &self.pipeline
    }

    // --- Serialization --------------------------------------------------

    /// Serialize the model into the dialect's output shape
    pub fn to_document(&self) -> Value {
        match self.dialect.shape {
            OutputShape::Wire => self.to_wire(),
            OutputShape::Criteria => self.to_criteria(),
        }
    }

    fn to_wire(&self) -> Value {
        let collection = &self.collection;
        let filter = Value::Object(self.filter.clone());

        match self.kind() {
            StatementKind::Find => json!({
                "find": collection,
                "filter": filter,
                "sort": self.sort,
                "projection": self.projection_map(),
                "skip": self.skip,
                "limit": self.limit,
            }),
            StatementKind::Distinct => json!({
                "distinct": collection,
                "key": self.key,
                "query": filter,
            }),
            StatementKind::Aggregate => json!({
                "aggregate": collection,
                "pipeline": self.matched(self.pipeline.clone()),
            }),
            StatementKind::Count => match self.dialect.count {
                CountStyle::Pipeline => json!({
                    "aggregate": collection,
                    "pipeline": self.matched(vec![self.count_stage()]),
                }),
                CountStyle::Exists => json!({
                    "count": collection,
                    "query": filter,
                }),
            },
            StatementKind::Insert => json!({
                "insert": collection,
                "documents": [self.values],
            }),
            StatementKind::Update => json!({
                "update": collection,
                "updates": [{
                    "q": filter,
                    "u": { "$set": self.values },
                    "multi": true,
                }],
            }),
            StatementKind::Remove => json!({
                "delete": collection,
                "deletes": [{ "q": filter, "limit": 0 }],
            }),
        }
    }

    fn to_criteria(&self) -> Value {
        let collection = &self.collection;
        let criteria = Value::Object(self.filter.clone());
        let fields = self.projection_map();

        match self.kind() {
            StatementKind::Find => json!({
                "collection": collection,
                "fn": "find",
                "criteria": criteria,
                "fields": fields,
                "options": self.find_options(),
            }),
            StatementKind::Distinct => json!({
                "collection": collection,
                "fn": "distinct",
                "criteria": criteria,
                "fields": fields,
                "options": { "val": self.key },
            }),
            StatementKind::Aggregate => json!({
                "collection": collection,
                "fn": "aggregate",
                "criteria": criteria,
                "fields": fields,
                "options": { "val": self.pipeline },
            }),
            StatementKind::Count => match self.dialect.count {
                CountStyle::Pipeline => json!({
                    "collection": collection,
                    "fn": "aggregate",
                    "criteria": criteria,
                    "fields": fields,
                    "options": { "val": [self.count_stage()] },
                }),
                CountStyle::Exists => json!({
                    "collection": collection,
                    "fn": "count",
                    "criteria": criteria,
                    "fields": fields,
                    "options": {},
                }),
            },
            StatementKind::Insert => json!({
                "collection": collection,
                "fn": "insert",
                "criteria": {},
                "fields": {},
                "options": self.values,
            }),
            StatementKind::Update => json!({
                "collection": collection,
                "fn": "update",
                "criteria": criteria,
                "update": { "$set": self.values },
                "options": { "multi": true },
            }),
            StatementKind::Remove => json!({
                "collection": collection,
                "fn": "remove",
                "criteria": criteria,
                "options": {},
            }),
        }
    }

    fn projection_map(&self) -> Map<String, Value> {
        self.projection
            .iter()
            .map(|field| (field.clone(), Value::from(1)))
            .collect()
    }

    fn find_options(&self) -> Map<String, Value> {
        let mut options = Map::new();
        if !self.sort.is_empty() {
            options.insert("sort".to_string(), Value::Object(self.sort.clone()));
        }
        if self.limit > 0 {
            options.insert("limit".to_string(), Value::from(self.limit));
        }
        if self.skip > 0 {
            options.insert("skip".to_string(), Value::from(self.skip));
        }
        options
    }

    fn count_stage(&self) -> Value {
        let id = match self.grouping.as_slice() {
            [] => Value::Null,
            [attribute] => Value::String(format!("${}", attribute)),
            attributes => {
                let attributes: Vec<&str> = attributes.iter().map(String::as_str).collect();
                composite_id(&attributes)
            },
        };

        json!({ "$group": { "_id": id, "count": { "$sum": 1 } } })
    }

    // Prefix a pipeline with a `$match` stage when there is a filter
    fn matched(&self, stages: Vec<Value>) -> Vec<Value> {
        if self.filter.is_empty() {
            return stages;
        }

        let mut pipeline = Vec::with_capacity(stages.len() + 1);
        pipeline.push(json!({ "$match": self.filter }));
        pipeline.extend(stages);
        pipeline
    }
}

/// Normalize a sort direction: `asc` / `1` → 1, `desc` / `-1` → -1
pub fn normalize_direction(attribute: &str, direction: &Value) -> Result<i64> {
    let normalized = match direction {
        Value::Number(n) => match n.as_i64() {
            Some(1) => Some(1),
            Some(-1) => Some(-1),
            _ => None,
        },
        Value::String(s) => match s.to_ascii_lowercase().as_str() {
            "asc" | "1" => Some(1),
            "desc" | "-1" => Some(-1),
            _ => None,
        },
        _ => None,
    };

    normalized.ok_or_else(|| BuildError::InvalidSortDirection {
        field: attribute.to_string(),
        direction: direction.to_string(),
    })
}

fn composite_id(attributes: &[&str]) -> Value {
    let id: Map<String, Value> = attributes
        .iter()
        .map(|attribute| (attribute.to_string(), Value::String(format!("${}", attribute))))
        .collect();
    Value::Object(id)
}

fn operator_map(operator: &str, value: Value) -> Value {
    let mut map = Map::new();
    map.insert(normalize_operator(operator), value);
    Value::Object(map)
}

fn as_list(value: &Value) -> Value {
    match value {
        Value::Array(_) => value.clone(),
        other => Value::Array(vec![other.clone()]),
    }
}

fn is_operator_map(map: &Map<String, Value>) -> bool {
    !map.is_empty() && map.keys().all(|k| k.starts_with('$'))
}

/// Deep merge `incoming` into `target`; objects merge, everything else is
/// replaced by the incoming value.
pub fn merge_maps(target: &mut Map<String, Value>, incoming: Map<String, Value>) {
    for (key, value) in incoming {
        match (target.get_mut(&key), value) {
            (Some(Value::Object(existing)), Value::Object(nested)) => merge_maps(existing, nested),
            (_, value) => {
                target.insert(key, value);
            },
        }
    }
}
