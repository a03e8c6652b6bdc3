//! The in-memory graph and the non-transactional store built on it.
//!
//! Terms are interned as things (`u64`), a triple is kept as three things, and
//! every triple position has a lookup from thing to the rows it appears in.
//! Pattern matching intersects those row bitmaps.

use std::collections::{HashMap, HashSet};
use std::hash::BuildHasherDefault;
use std::sync::Mutex;

use bimap::BiMap;
use roaring::RoaringTreemap;
use seahash::SeaHasher;

use crate::construct::{Term, Triple, TripleSet};
use crate::error::{LexgraphError, Result};
use crate::query::TriplePattern;
use crate::store::{Capability, Store};

// ------------- Thing -------------
pub type Thing = u64;
pub type ThingHasher = BuildHasherDefault<SeaHasher>;

// ------------- TermKeeper -------------
#[derive(Debug, Default)]
pub struct TermKeeper {
    kept: BiMap<Term, Thing>,
    lower_bound: Thing,
}

impl TermKeeper {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn keep(&mut self, term: Term) -> Thing {
        if let Some(thing) = self.kept.get_by_left(&term) {
            return *thing;
        }
        self.lower_bound += 1;
        self.kept.insert(term, self.lower_bound);
        self.lower_bound
    }
    pub fn thing(&self, term: &Term) -> Option<Thing> {
        self.kept.get_by_left(term).copied()
    }
    pub fn term(&self, thing: Thing) -> Option<&Term> {
        self.kept.get_by_right(&thing)
    }
    pub fn len(&self) -> usize {
        self.kept.len()
    }
    pub fn is_empty(&self) -> bool {
        self.kept.is_empty()
    }
}

// ------------- Lookups -------------
#[derive(Debug, Default)]
struct Lookup {
    index: HashMap<Thing, RoaringTreemap, ThingHasher>,
}

impl Lookup {
    fn insert(&mut self, key: Thing, row: u64) {
        self.index.entry(key).or_default().insert(row);
    }
    fn lookup(&self, key: Thing) -> Option<&RoaringTreemap> {
        self.index.get(&key)
    }
}

// ------------- MemoryGraph -------------
#[derive(Debug, Default)]
pub struct MemoryGraph {
    terms: TermKeeper,
    kept: HashSet<[Thing; 3], ThingHasher>,
    rows: Vec<[Thing; 3]>,
    subject_lookup: Lookup,
    predicate_lookup: Lookup,
    object_lookup: Lookup,
}

impl MemoryGraph {
    pub fn new() -> Self {
        Self::default()
    }
    /// Returns false when the triple was already kept.
    pub fn insert(&mut self, triple: &Triple) -> bool {
        let row = [
            self.terms.keep(triple.subject().clone().into()),
            self.terms.keep(triple.predicate().clone().into()),
            self.terms.keep(triple.object().clone()),
        ];
        if !self.kept.insert(row) {
            return false;
        }
        let position = self.rows.len() as u64;
        self.rows.push(row);
        self.subject_lookup.insert(row[0], position);
        self.predicate_lookup.insert(row[1], position);
        self.object_lookup.insert(row[2], position);
        true
    }
    /// Number of triples that were new.
    pub fn extend<'a>(&mut self, triples: impl IntoIterator<Item = &'a Triple>) -> usize {
        triples.into_iter().filter(|triple| self.insert(triple)).count()
    }
    pub fn len(&self) -> usize {
        self.rows.len()
    }
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
    pub fn matching(&self, pattern: &TriplePattern) -> Result<Vec<Triple>> {
        let mut bound = Vec::new();
        if let Some(subject) = &pattern.subject {
            match self.terms.thing(&subject.clone().into()) {
                Some(thing) => bound.push(self.subject_lookup.lookup(thing)),
                None => return Ok(Vec::new()),
            }
        }
        if let Some(predicate) = &pattern.predicate {
            match self.terms.thing(&predicate.clone().into()) {
                Some(thing) => bound.push(self.predicate_lookup.lookup(thing)),
                None => return Ok(Vec::new()),
            }
        }
        if let Some(object) = &pattern.object {
            match self.terms.thing(object) {
                Some(thing) => bound.push(self.object_lookup.lookup(thing)),
                None => return Ok(Vec::new()),
            }
        }
        if bound.is_empty() {
            return self.rows.iter().map(|row| self.decode(row)).collect();
        }
        let mut rows: Option<RoaringTreemap> = None;
        for bitmap in bound {
            let Some(bitmap) = bitmap else {
                return Ok(Vec::new());
            };
            rows = Some(match rows {
                Some(rows) => rows & bitmap,
                None => bitmap.clone(),
            });
        }
        rows.unwrap_or_default()
            .iter()
            .map(|position| {
                self.rows
                    .get(position as usize)
                    .ok_or_else(|| LexgraphError::Invariant(format!("row {} is not kept", position)))
                    .and_then(|row| self.decode(row))
            })
            .collect()
    }
    fn decode(&self, row: &[Thing; 3]) -> Result<Triple> {
        let term = |thing: Thing| {
            self.terms
                .term(thing)
                .ok_or_else(|| LexgraphError::Invariant(format!("thing {} has no term", thing)))
        };
        let subject = term(row[0])?
            .as_node()
            .ok_or_else(|| LexgraphError::Invariant("literal kept as subject".into()))?;
        let predicate = term(row[1])?
            .resource()
            .cloned()
            .ok_or_else(|| LexgraphError::Invariant("non-resource kept as predicate".into()))?;
        Ok(Triple::new(subject, predicate, term(row[2])?.clone()))
    }
}

// ------------- MemoryStore -------------
/// Purely in-memory, never transactional.
#[derive(Debug, Default)]
pub struct MemoryStore {
    graph: Mutex<MemoryGraph>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn from_triples(triples: &TripleSet) -> Self {
        let mut graph = MemoryGraph::new();
        graph.extend(triples);
        Self {
            graph: Mutex::new(graph),
        }
    }
}

impl Store for MemoryStore {
    fn capability(&self) -> Capability {
        Capability::NonTransactional
    }
    fn add(&self, triples: &TripleSet) -> Result<()> {
        self.graph.lock()?.extend(triples);
        Ok(())
    }
    fn query(&self, pattern: &TriplePattern) -> Result<Vec<Triple>> {
        self.graph.lock()?.matching(pattern)
    }
    fn len(&self) -> Result<usize> {
        Ok(self.graph.lock()?.len())
    }
}
