//! Entity projection: all triples of one subject folded into a multi-valued map.
//!
//! A predicate with exactly one object projects to [`Value::One`], with two or
//! more to [`Value::Many`]; there is never a singleton set. The fold is
//! commutative, so the projection does not depend on triple order.
//!
//! Projections are recomputed per call, each in its own read transaction.
//! Navigation re-enters [`entity`] instead of holding a transaction open.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use serde::ser::{SerializeMap, SerializeSeq, Serializer};

use crate::construct::{Literal, Node, Resource, Term, Triple};
use crate::error::Result;
use crate::query::{Clause, Select, Slot, TriplePattern, select};
use crate::store::Store;
use crate::txn::{Mode, transact_exec};
use crate::vocabulary::RDFS_LABEL;

// ------------- Value -------------
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Value {
    One(Term),
    Many(BTreeSet<Term>),
}

impl Value {
    /// Adds one more object. Folding the same object twice is a no-op.
    pub fn fold(self, term: Term) -> Value {
        match self {
            Value::One(one) if one == term => Value::One(one),
            Value::One(one) => Value::Many(BTreeSet::from([one, term])),
            Value::Many(mut many) => {
                many.insert(term);
                Value::Many(many)
            }
        }
    }
    pub fn is_many(&self) -> bool {
        matches!(self, Value::Many(_))
    }
    pub fn one(&self) -> Option<&Term> {
        match self {
            Value::One(term) => Some(term),
            Value::Many(_) => None,
        }
    }
    pub fn terms(&self) -> Vec<&Term> {
        match self {
            Value::One(term) => vec![term],
            Value::Many(terms) => terms.iter().collect(),
        }
    }
    pub fn len(&self) -> usize {
        match self {
            Value::One(_) => 1,
            Value::Many(terms) => terms.len(),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Value::One(term) => term.serialize(serializer),
            Value::Many(terms) => {
                let mut seq = serializer.serialize_seq(Some(terms.len()))?;
                for term in terms {
                    seq.serialize_element(term)?;
                }
                seq.end()
            }
        }
    }
}

// ------------- Entity -------------
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entity {
    subject: Node,
    properties: BTreeMap<Resource, Value>,
}

impl Entity {
    /// Folds the triples of `subject`; others are ignored. `None` when there are none.
    pub fn from_triples(subject: Node, triples: impl IntoIterator<Item = Triple>) -> Option<Entity> {
        let mut properties: BTreeMap<Resource, Value> = BTreeMap::new();
        for triple in triples {
            if *triple.subject() != subject {
                continue;
            }
            let predicate = triple.predicate().clone();
            let object = triple.object().clone();
            let value = match properties.remove(&predicate) {
                Some(value) => value.fold(object),
                None => Value::One(object),
            };
            properties.insert(predicate, value);
        }
        (!properties.is_empty()).then_some(Entity { subject, properties })
    }
    pub fn subject(&self) -> &Node {
        &self.subject
    }
    pub fn properties(&self) -> &BTreeMap<Resource, Value> {
        &self.properties
    }
    pub fn get(&self, predicate: &Resource) -> Option<&Value> {
        self.properties.get(predicate)
    }

    /// Dereferences the value of `predicate`.
    ///
    /// A single node is projected by a fresh [`entity`] call; a set of literals
    /// turns into the subjects sharing this predicate with any of them.
    pub fn navigate<S: Store + ?Sized>(&self, store: &S, predicate: &Resource) -> Result<Navigation> {
        let Some(value) = self.properties.get(predicate) else {
            return Ok(Navigation::Absent);
        };
        match value {
            Value::One(Term::Literal(literal)) => Ok(Navigation::Literal(literal.clone())),
            Value::One(term) => match term.as_node() {
                Some(node) => Ok(Navigation::Entity(entity(store, &node)?)),
                None => Ok(Navigation::Absent),
            },
            Value::Many(terms) if terms.iter().all(Term::is_literal) => {
                let terms: Vec<Term> = terms.iter().cloned().collect();
                let predicate = predicate.clone();
                let subjects = transact_exec(store, Mode::Read, || {
                    let mut subjects = BTreeSet::new();
                    for term in terms {
                        subjects.extend(reverse_lookup(store, &predicate, term)?);
                    }
                    Ok(subjects)
                })?;
                Ok(Navigation::Subjects(subjects))
            }
            Value::Many(terms) => {
                let mut entities = Vec::new();
                for node in terms.iter().filter_map(Term::as_node) {
                    if let Some(found) = entity(store, &node)? {
                        entities.push(found);
                    }
                }
                Ok(Navigation::Entities(entities))
            }
        }
    }
}

impl Serialize for Entity {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.properties.len() + 1))?;
        map.serialize_entry("@id", &self.subject)?;
        for (predicate, value) in &self.properties {
            map.serialize_entry(predicate.as_str(), value)?;
        }
        map.end()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Navigation {
    /// The predicate is not a property of the entity.
    Absent,
    Entity(Option<Entity>),
    Literal(Literal),
    Subjects(BTreeSet<Node>),
    Entities(Vec<Entity>),
}

// ------------- Projection -------------
/// Projects `subject`, or `None` when the store has no triples for it.
pub fn entity<S: Store + ?Sized>(store: &S, subject: &Node) -> Result<Option<Entity>> {
    let subject = subject.clone();
    transact_exec(store, Mode::Read, || {
        let triples = store.query(&TriplePattern::any().with_subject(subject.clone()))?;
        Ok(Entity::from_triples(subject, triples))
    })
}

/// Subjects that have `predicate` with exactly this object.
pub fn reverse_lookup<S: Store + ?Sized>(store: &S, predicate: &Resource, object: Term) -> Result<BTreeSet<Node>> {
    let pattern = TriplePattern::any()
        .with_predicate(predicate.clone())
        .with_object(object);
    transact_exec(store, Mode::Read, || {
        Ok(store
            .query(&pattern)?
            .into_iter()
            .map(|triple| triple.subject().clone())
            .collect())
    })
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ExpandedEntity {
    pub entity: Entity,
    /// Labels of the predicates and object resources, where they have one.
    pub labels: BTreeMap<Resource, Literal>,
}

/// Projects `subject` together with a label index, in one combined select.
///
/// Labels are optional joins: a predicate or object without a label is simply
/// missing from the index. With several labels the smallest one is chosen.
pub fn expanded_entity<S: Store + ?Sized>(store: &S, subject: &Node) -> Result<Option<ExpandedEntity>> {
    let query = Select::new()
        .required(Clause::new(
            Slot::Fixed(subject.clone()),
            Slot::var("p"),
            Slot::var("o"),
        ))
        .optional(Clause::new(
            Slot::var("p"),
            Slot::Fixed(Resource::new(RDFS_LABEL)),
            Slot::var("pl"),
        ))
        .optional(Clause::new(
            Slot::var("o"),
            Slot::Fixed(Resource::new(RDFS_LABEL)),
            Slot::var("ol"),
        ));
    let bindings = transact_exec(store, Mode::Read, || select(store, &query))?;

    let mut triples = Vec::new();
    let mut labels: BTreeMap<Resource, Literal> = BTreeMap::new();
    for binding in &bindings {
        let (Some(Term::Resource(predicate)), Some(object)) = (binding.get("p"), binding.get("o")) else {
            continue;
        };
        triples.push(Triple::new(subject.clone(), predicate.clone(), object.clone()));
        for (labelled, label) in [
            (Some(predicate), binding.get("pl")),
            (object.resource(), binding.get("ol")),
        ] {
            if let (Some(labelled), Some(Term::Literal(label))) = (labelled, label) {
                labels
                    .entry(labelled.clone())
                    .and_modify(|chosen| {
                        if *label < *chosen {
                            *chosen = label.clone();
                        }
                    })
                    .or_insert_with(|| label.clone());
            }
        }
    }
    Ok(Entity::from_triples(subject.clone(), triples).map(|entity| ExpandedEntity { entity, labels }))
}
