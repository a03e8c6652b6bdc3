//! Triple patterns and a small conjunctive select over any [`Store`].
//!
//! This is not a query language: a [`Select`] is a list of required clauses
//! (inner join) followed by optional clauses (left outer join), each clause a
//! triple pattern whose slots are either fixed terms or named variables.

use std::collections::BTreeMap;

use crate::construct::{Node, Resource, Term, Triple};
use crate::error::Result;
use crate::store::Store;

// ------------- TriplePattern -------------
/// The store primitive: `None` matches anything.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TriplePattern {
    pub subject: Option<Node>,
    pub predicate: Option<Resource>,
    pub object: Option<Term>,
}

impl TriplePattern {
    pub fn any() -> Self {
        Self::default()
    }
    pub fn with_subject(mut self, subject: impl Into<Node>) -> Self {
        self.subject = Some(subject.into());
        self
    }
    pub fn with_predicate(mut self, predicate: Resource) -> Self {
        self.predicate = Some(predicate);
        self
    }
    pub fn with_object(mut self, object: impl Into<Term>) -> Self {
        self.object = Some(object.into());
        self
    }
    pub fn matches(&self, triple: &Triple) -> bool {
        self.subject.as_ref().is_none_or(|s| s == triple.subject())
            && self.predicate.as_ref().is_none_or(|p| p == triple.predicate())
            && self.object.as_ref().is_none_or(|o| o == triple.object())
    }
}

// ------------- Select -------------
pub type Binding = BTreeMap<String, Term>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Slot<T> {
    Var(String),
    Fixed(T),
}

impl<T> Slot<T> {
    pub fn var(name: &str) -> Self {
        Slot::Var(name.to_string())
    }
}

#[derive(Clone, Debug)]
pub struct Clause {
    subject: Slot<Node>,
    predicate: Slot<Resource>,
    object: Slot<Term>,
}

impl Clause {
    pub fn new(subject: Slot<Node>, predicate: Slot<Resource>, object: Slot<Term>) -> Self {
        Self {
            subject,
            predicate,
            object,
        }
    }

    /// The pattern for this clause under a binding, or `None` when a bound
    /// variable cannot occupy its position (a literal as subject, say).
    fn pattern(&self, binding: &Binding) -> Option<TriplePattern> {
        let mut pattern = TriplePattern::any();
        pattern.subject = match &self.subject {
            Slot::Fixed(node) => Some(node.clone()),
            Slot::Var(name) => match binding.get(name) {
                Some(term) => Some(term.as_node()?),
                None => None,
            },
        };
        pattern.predicate = match &self.predicate {
            Slot::Fixed(resource) => Some(resource.clone()),
            Slot::Var(name) => match binding.get(name) {
                Some(term) => Some(term.resource()?.clone()),
                None => None,
            },
        };
        pattern.object = match &self.object {
            Slot::Fixed(term) => Some(term.clone()),
            Slot::Var(name) => binding.get(name).cloned(),
        };
        Some(pattern)
    }

    /// Extends a binding with the variables this triple binds. A variable used
    /// twice in one clause must bind the same term both times.
    fn extend(&self, binding: &Binding, triple: &Triple) -> Option<Binding> {
        let mut extended = binding.clone();
        let assignments = [
            (self.subject_var(), Term::from(triple.subject().clone())),
            (self.predicate_var(), Term::from(triple.predicate().clone())),
            (self.object_var(), triple.object().clone()),
        ];
        for (name, term) in assignments {
            let Some(name) = name else { continue };
            match extended.get(name.as_str()) {
                Some(bound) if *bound != term => return None,
                Some(_) => {}
                None => {
                    extended.insert(name, term);
                }
            }
        }
        Some(extended)
    }

    fn subject_var(&self) -> Option<String> {
        match &self.subject {
            Slot::Var(name) => Some(name.clone()),
            Slot::Fixed(_) => None,
        }
    }
    fn predicate_var(&self) -> Option<String> {
        match &self.predicate {
            Slot::Var(name) => Some(name.clone()),
            Slot::Fixed(_) => None,
        }
    }
    fn object_var(&self) -> Option<String> {
        match &self.object {
            Slot::Var(name) => Some(name.clone()),
            Slot::Fixed(_) => None,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Select {
    required: Vec<Clause>,
    optional: Vec<Clause>,
}

impl Select {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn required(mut self, clause: Clause) -> Self {
        self.required.push(clause);
        self
    }
    pub fn optional(mut self, clause: Clause) -> Self {
        self.optional.push(clause);
        self
    }
}

/// Evaluates a select into fully materialized bindings.
pub fn select<S: Store + ?Sized>(store: &S, select: &Select) -> Result<Vec<Binding>> {
    let mut bindings = vec![Binding::new()];
    for clause in &select.required {
        let mut joined = Vec::new();
        for binding in &bindings {
            joined.extend(solutions(store, clause, binding)?);
        }
        bindings = joined;
        if bindings.is_empty() {
            return Ok(bindings);
        }
    }
    for clause in &select.optional {
        let mut joined = Vec::new();
        for binding in bindings {
            let extended = solutions(store, clause, &binding)?;
            if extended.is_empty() {
                joined.push(binding);
            } else {
                joined.extend(extended);
            }
        }
        bindings = joined;
    }
    Ok(bindings)
}

fn solutions<S: Store + ?Sized>(store: &S, clause: &Clause, binding: &Binding) -> Result<Vec<Binding>> {
    let Some(pattern) = clause.pattern(binding) else {
        return Ok(Vec::new());
    };
    Ok(store
        .query(&pattern)?
        .iter()
        .filter_map(|triple| clause.extend(binding, triple))
        .collect())
}
