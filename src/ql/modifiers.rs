//! Modifier resolution
//!
//! Scans the markers of a clause for a combinator (`AND`, otherwise the
//! default OR) and for the `NOT` / `IN` modifiers. Depending on the strip
//! policy the matched markers are consumed or left in place, so the same
//! routine can peek at a clause and later consume it.

use crate::ql::ast::{ClauseModifier, Combinator, Marker};

/// Which matched markers are removed from the scanned list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strip<'a> {
    /// Remove every marker that was found
    All,
    /// Remove only the listed markers
    Only(&'a [Marker]),
    /// Leave the list untouched
    None,
}

impl Strip<'_> {
    fn strips(&self, marker: Marker) -> bool {
        match self {
            Strip::All => true,
            Strip::Only(markers) => markers.contains(&marker),
            Strip::None => false,
        }
    }
}

/// Ordered stack of `NOT` / `IN` modifiers
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModifierStack {
    markers: Vec<Marker>,
}

impl ModifierStack {
    /// Create an empty stack
    pub fn new() -> Self {
        ModifierStack::default()
    }

    /// Push a modifier. `AND` is a combinator and is ignored here.
    pub fn push(&mut self, marker: Marker) {
        if marker != Marker::And {
            self.markers.push(marker);
        }
    }

    /// Remove all modifiers
    pub fn clear(&mut self) {
        self.markers.clear();
    }

    /// Check if the stack is empty
    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    /// Get the modifiers in order
    pub fn as_slice(&self) -> &[Marker] {
        &self.markers
    }

    /// Collapse the stack into a single clause modifier.
    /// `NOT` and `IN` together always mean "not in".
    pub fn resolved(&self) -> ClauseModifier {
        let not = self.markers.contains(&Marker::Not);
        let is_in = self.markers.contains(&Marker::In);

        match (not, is_in) {
            (true, true) => ClauseModifier::NotIn,
            (true, false) => ClauseModifier::Not,
            (false, true) => ClauseModifier::In,
            (false, false) => ClauseModifier::None,
        }
    }
}

/// Outcome of a modifier scan
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    /// `Some(And)` when an AND marker was found
    pub combinator: Option<Combinator>,
    pub modifiers: ModifierStack,
}

/// Scan `markers` for AND, then NOT, then IN.
pub fn resolve_modifiers(markers: &mut Vec<Marker>, strip: Strip<'_>) -> Resolution {
    let mut resolution = Resolution::default();

    if take(markers, Marker::And, strip) {
        resolution.combinator = Some(Combinator::And);
    }
    if take(markers, Marker::Not, strip) {
        resolution.modifiers.push(Marker::Not);
    }
    if take(markers, Marker::In, strip) {
        resolution.modifiers.push(Marker::In);
    }

    resolution
}

// Find the first occurrence of `marker`, removing it when the policy says so
fn take(markers: &mut Vec<Marker>, marker: Marker, strip: Strip<'_>) -> bool {
    match markers.iter().position(|m| *m == marker) {
        Some(idx) => {
            if strip.strips(marker) {
                markers.remove(idx);
            }
            true
        },
        None => false,
    }
}
