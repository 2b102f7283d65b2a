//! Group compiler
//!
//! Nested token groups inside a WHERE clause encode boolean structure. A
//! group is first reduced to a list of `Expr` members; a top-level group
//! then either emits its single member directly or compiles all of its
//! members into a sub-filter that is grafted onto the parent query.

use log::{debug, trace};

use crate::core::errors::{BuildError, Result};
use crate::core::identifier::Identifier;
use crate::core::token::{Node, Token, TokenKind};
use crate::ql::ast::{ClauseBuilder, Combinator, Expr, Family, Marker, WhereFn};
use crate::ql::modifiers::{resolve_modifiers, Strip};
use crate::ql::query::QueryModel;

/// Compile a WHERE group.
///
/// With `nested` set the reduced expression is returned to the caller
/// instead of being emitted; a group with a single member flattens into
/// that member. `external` is the combinator the enclosing WHERE clause
/// joins this group with. Markers still pending in `pending` (a `NOT` or
/// `IN` right before the group) apply to the group as a whole.
pub fn compile_group(
    group: &[Node],
    nested: bool,
    pending: ClauseBuilder,
    external: Option<Combinator>,
    model: &mut QueryModel,
) -> Result<Option<Expr>> {
    let values = group
        .iter()
        .filter(|node| matches!(node, Node::Token(token) if token.is(TokenKind::Value)))
        .count();
    let has_groups = group.iter().any(|node| matches!(node, Node::Group(_)));
    let conjoined = values > 1 || (values > 0 && has_groups);

    let inherited = pending.pending_markers().to_vec();
    let mut builder = ClauseBuilder::new();
    let mut combinator = None;
    let mut members = Vec::new();

    for node in group {
        match node {
            Node::Group(inner) => {
                let outer = std::mem::take(&mut builder);
                if let Some(member) = compile_group(inner, true, outer, None, model)? {
                    members.push(member);
                }
            },
            Node::Token(token) => {
                trace!("group token {} {}", token.kind, token.value);

                match token.kind {
                    TokenKind::Key => builder.key(payload(token)?),
                    TokenKind::Operator => builder.operator(payload(token)?)?,
                    TokenKind::Value => {
                        let mut clause = builder.value(&token.value)?;
                        if conjoined {
                            clause.prefix(Marker::And);
                        }
                        members.push(Expr::Clause(clause));
                    },
                    TokenKind::Condition => {
                        let condition = payload(token)?;
                        match Marker::from_condition(condition) {
                            Some(Marker::Not) => builder = ClauseBuilder::with_marker(Marker::Not),
                            Some(Marker::In) => builder.prefix(Marker::In),
                            _ => match Combinator::from_condition(condition) {
                                Some(found) => combinator = Some(found),
                                None => trace!("Ignoring condition '{}' inside a group", condition),
                            },
                        }
                    },
                    TokenKind::Identifier => {
                        let name = payload(token)?;
                        let identifier = Identifier::from_name(name);
                        if identifier.is_join() {
                            return Err(BuildError::UnsupportedConstruct(format!(
                                "{} inside a WHERE group",
                                identifier
                            )));
                        }
                        return Err(BuildError::malformed(format!(
                            "IDENTIFIER '{}' inside a WHERE group",
                            name
                        )));
                    },
                }
            },
        }
    }

    let combinator = combinator.unwrap_or(Combinator::Or);

    let reduced = match members.len() {
        0 => {
            if !inherited.is_empty() {
                debug!("Dropping {:?} before an empty group", inherited);
            }
            return Ok(None);
        },
        1 => members.pop(),
        _ => Some(Expr::Group { combinator, members }),
    };
    let reduced = match reduced {
        Some(member) => inherit(&inherited, member)?,
        None => return Ok(None),
    };

    if nested {
        return Ok(Some(reduced));
    }

    emit_single(reduced, external, model)?;
    Ok(None)
}

// Apply the markers found right before a group to its reduced expression.
// NOT toggles the negation of a single clause; a whole boolean group cannot
// be negated or matched with IN.
fn inherit(markers: &[Marker], member: Expr) -> Result<Expr> {
    if markers.is_empty() {
        return Ok(member);
    }

    let mut outer = markers.to_vec();
    let outer = resolve_modifiers(&mut outer, Strip::None).modifiers;

    match member {
        Expr::Clause(mut clause) => {
            if outer.as_slice().contains(&Marker::Not) {
                let inner = resolve_modifiers(&mut clause.markers, Strip::Only(&[Marker::Not]));
                if !inner.modifiers.as_slice().contains(&Marker::Not) {
                    clause.prefix(Marker::Not);
                }
            }
            if outer.as_slice().contains(&Marker::In) && !clause.markers.contains(&Marker::In) {
                clause.prefix(Marker::In);
            }
            Ok(Expr::Clause(clause))
        },
        Expr::Group { members, .. } => Err(BuildError::UnsupportedConstruct(format!(
            "{} before a group of {} members",
            outer
                .as_slice()
                .iter()
                .map(Marker::to_string)
                .collect::<Vec<_>>()
                .join(" "),
            members.len()
        ))),
    }
}

// A lone member goes straight through the caller's combinator family
fn emit_single(member: Expr, external: Option<Combinator>, model: &mut QueryModel) -> Result<()> {
    match member {
        Expr::Clause(mut clause) => {
            let resolution = resolve_modifiers(&mut clause.markers, Strip::All);
            let family = Family::from(external.unwrap_or(Combinator::Or));
            let function = WhereFn::new(family, resolution.modifiers.resolved());
            model.apply(function, &clause.condition)
        },
        Expr::Group { combinator, members } => {
            let filter = build_grouping(&members, combinator, model)?;
            model.graft(external.unwrap_or(Combinator::Or), filter);
            Ok(())
        },
    }
}

// Compile every member into a fresh sub-model and return its filter
fn build_grouping(
    members: &[Expr],
    combinator: Combinator,
    parent: &QueryModel,
) -> Result<serde_json::Map<String, serde_json::Value>> {
    let mut sub = parent.nested();

    for member in members {
        match member {
            Expr::Clause(clause) => {
                let mut markers = clause.markers.clone();
                let resolution = resolve_modifiers(&mut markers, Strip::All);
                let family = match resolution.combinator.unwrap_or(combinator) {
                    Combinator::And => Family::Root,
                    Combinator::Or => Family::Or,
                };
                sub.apply(WhereFn::new(family, resolution.modifiers.resolved()), &clause.condition)?;
            },
            Expr::Group { combinator: inner, members } => {
                let filter = build_grouping(members, *inner, &sub)?;
                sub.graft(combinator, filter);
            },
        }
    }

    Ok(sub.into_filter())
}

fn payload(token: &Token) -> Result<&str> {
    token.as_str().ok_or_else(|| {
        BuildError::malformed(format!("{} token expects a string, got {}", token.kind, token.value))
    })
}
