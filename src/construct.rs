//! The graph constructs: resources, literals, blank nodes, triples and triple sets.
//!
//! A [`Triple`] is `(subject, predicate, object)` where the subject is a [`Node`]
//! (resource or blank node), the predicate a [`Resource`] and the object any
//! [`Term`]. A [`TripleSet`] has set semantics: duplicates collapse and equality
//! is independent of insertion order.

use std::collections::BTreeSet;
use std::collections::btree_set;
use std::fmt;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::mint;
use crate::ntriples;
use crate::vocabulary::{LEGACY_BASE, NAMESPACES};

// ------------- Resource -------------
/// An opaque, namespaced identifier such as `dn:synset-999`.
///
/// Identifiers without a known namespace prefix are kept verbatim; this is how
/// unmapped legacy relation tokens survive migration.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Resource(String);

impl Resource {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
    /// The namespace prefix, if the identifier uses one from the namespace table.
    pub fn prefix(&self) -> Option<&str> {
        let (prefix, _) = self.0.split_once(':')?;
        NAMESPACES
            .iter()
            .find(|(known, _)| *known == prefix)
            .map(|(known, _)| *known)
    }
    pub fn local_name(&self) -> &str {
        match self.prefix() {
            Some(prefix) => &self.0[prefix.len() + 1..],
            None => &self.0,
        }
    }
    pub fn is_canonical(&self) -> bool {
        self.prefix().is_some()
    }
    /// Full IRI form, used when serializing.
    pub fn iri(&self) -> String {
        if let Some(prefix) = self.prefix() {
            let base = NAMESPACES
                .iter()
                .find(|(known, _)| *known == prefix)
                .map(|(_, base)| *base)
                .unwrap_or_default();
            return format!("{}{}", base, self.local_name());
        }
        if self.0.contains(':') {
            // already absolute
            self.0.clone()
        } else {
            format!("{}{}", LEGACY_BASE, self.0)
        }
    }
    /// Inverse of [`Resource::iri`]: compresses known namespaces back to prefixes.
    pub fn from_iri(iri: &str) -> Self {
        if let Some(verbatim) = iri.strip_prefix(LEGACY_BASE) {
            return Self::new(verbatim);
        }
        let best = NAMESPACES
            .iter()
            .filter(|(_, base)| iri.starts_with(base))
            .max_by_key(|(_, base)| base.len());
        match best {
            Some((prefix, base)) => Self::new(format!("{}:{}", prefix, &iri[base.len()..])),
            None => Self::new(iri),
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for Resource {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

// ------------- Blank -------------
/// A blank node: an index into the arena of exactly one synthesis call.
///
/// The scope names the call (it is derived from the record key that owns it), so
/// blank nodes from different calls never compare equal.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Blank {
    scope: String,
    index: u32,
}

impl Blank {
    pub fn scope(&self) -> &str {
        &self.scope
    }
    pub fn index(&self) -> u32 {
        self.index
    }
    /// The N-Triples label (without the `_:` marker).
    pub fn label(&self) -> String {
        format!("{}-b{}", self.scope, self.index)
    }
    pub fn from_label(label: &str) -> Option<Self> {
        let (scope, index) = label.rsplit_once("-b")?;
        Some(Self {
            scope: scope.to_string(),
            index: index.parse().ok()?,
        })
    }
}

impl fmt::Display for Blank {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "_:{}", self.label())
    }
}

#[derive(Debug)]
pub struct BlankArena {
    scope: String,
    next: u32,
}

impl BlankArena {
    pub fn new(owner: &str) -> Self {
        Self {
            scope: mint::scope(owner),
            next: 0,
        }
    }
    pub fn fresh(&mut self) -> Blank {
        let blank = Blank {
            scope: self.scope.clone(),
            index: self.next,
        };
        self.next += 1;
        blank
    }
    pub fn len(&self) -> usize {
        self.next as usize
    }
}

// ------------- Literal -------------
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Literal {
    value: String,
    language: Option<String>,
    datatype: Option<Resource>,
}

impl Literal {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            language: None,
            datatype: None,
        }
    }
    pub fn lang(value: impl Into<String>, language: &str) -> Self {
        Self {
            value: value.into(),
            language: Some(language.to_lowercase()),
            datatype: None,
        }
    }
    pub fn typed(value: impl Into<String>, datatype: Resource) -> Self {
        Self {
            value: value.into(),
            language: None,
            datatype: Some(datatype),
        }
    }
    pub fn value(&self) -> &str {
        &self.value
    }
    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }
    pub fn datatype(&self) -> Option<&Resource> {
        self.datatype.as_ref()
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}", self.value)?;
        if let Some(language) = &self.language {
            write!(f, "@{}", language)?;
        } else if let Some(datatype) = &self.datatype {
            write!(f, "^^{}", datatype)?;
        }
        Ok(())
    }
}

impl Serialize for Literal {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.language.is_none() && self.datatype.is_none() {
            return serializer.serialize_str(&self.value);
        }
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("@value", &self.value)?;
        if let Some(language) = &self.language {
            map.serialize_entry("@language", language)?;
        }
        if let Some(datatype) = &self.datatype {
            map.serialize_entry("@type", datatype)?;
        }
        map.end()
    }
}

// ------------- Node & Term -------------
/// Anything that can be a subject.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Node {
    Resource(Resource),
    Blank(Blank),
}

/// Anything that can be an object.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Term {
    Resource(Resource),
    Blank(Blank),
    Literal(Literal),
}

impl Node {
    pub fn resource(&self) -> Option<&Resource> {
        match self {
            Node::Resource(resource) => Some(resource),
            Node::Blank(_) => None,
        }
    }
}

impl Term {
    pub fn as_node(&self) -> Option<Node> {
        match self {
            Term::Resource(resource) => Some(Node::Resource(resource.clone())),
            Term::Blank(blank) => Some(Node::Blank(blank.clone())),
            Term::Literal(_) => None,
        }
    }
    pub fn resource(&self) -> Option<&Resource> {
        match self {
            Term::Resource(resource) => Some(resource),
            _ => None,
        }
    }
    pub fn literal(&self) -> Option<&Literal> {
        match self {
            Term::Literal(literal) => Some(literal),
            _ => None,
        }
    }
    pub fn is_literal(&self) -> bool {
        matches!(self, Term::Literal(_))
    }
}

impl From<Resource> for Node {
    fn from(resource: Resource) -> Self {
        Node::Resource(resource)
    }
}
impl From<Blank> for Node {
    fn from(blank: Blank) -> Self {
        Node::Blank(blank)
    }
}
impl From<Resource> for Term {
    fn from(resource: Resource) -> Self {
        Term::Resource(resource)
    }
}
impl From<Blank> for Term {
    fn from(blank: Blank) -> Self {
        Term::Blank(blank)
    }
}
impl From<Literal> for Term {
    fn from(literal: Literal) -> Self {
        Term::Literal(literal)
    }
}
impl From<Node> for Term {
    fn from(node: Node) -> Self {
        match node {
            Node::Resource(resource) => Term::Resource(resource),
            Node::Blank(blank) => Term::Blank(blank),
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Node::Resource(resource) => write!(f, "{}", resource),
            Node::Blank(blank) => write!(f, "{}", blank),
        }
    }
}
impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Term::Resource(resource) => write!(f, "{}", resource),
            Term::Blank(blank) => write!(f, "{}", blank),
            Term::Literal(literal) => write!(f, "{}", literal),
        }
    }
}

impl Serialize for Term {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Term::Resource(resource) => resource.serialize(serializer),
            Term::Blank(blank) => serializer.serialize_str(&blank.to_string()),
            Term::Literal(literal) => literal.serialize(serializer),
        }
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Node::Resource(resource) => resource.serialize(serializer),
            Node::Blank(blank) => serializer.serialize_str(&blank.to_string()),
        }
    }
}

// ------------- Triple -------------
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Triple {
    subject: Node,
    predicate: Resource,
    object: Term,
}

impl Triple {
    pub fn new(subject: impl Into<Node>, predicate: Resource, object: impl Into<Term>) -> Self {
        Self {
            subject: subject.into(),
            predicate,
            object: object.into(),
        }
    }
    pub fn subject(&self) -> &Node {
        &self.subject
    }
    pub fn predicate(&self) -> &Resource {
        &self.predicate
    }
    pub fn object(&self) -> &Term {
        &self.object
    }
}

impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({}, {}, {})", self.subject, self.predicate, self.object)
    }
}

// ------------- TripleSet -------------
#[derive(Clone, PartialEq, Eq, Default, Debug)]
pub struct TripleSet {
    triples: BTreeSet<Triple>,
}

impl TripleSet {
    pub fn new() -> Self {
        Self::default()
    }
    /// Returns false when the triple was already present.
    pub fn insert(&mut self, triple: Triple) -> bool {
        self.triples.insert(triple)
    }
    pub fn add(&mut self, subject: impl Into<Node>, predicate: Resource, object: impl Into<Term>) -> bool {
        self.insert(Triple::new(subject, predicate, object))
    }
    pub fn union(&mut self, other: TripleSet) {
        self.triples.extend(other.triples);
    }
    pub fn contains(&self, triple: &Triple) -> bool {
        self.triples.contains(triple)
    }
    pub fn len(&self) -> usize {
        self.triples.len()
    }
    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }
    pub fn iter(&self) -> btree_set::Iter<'_, Triple> {
        self.triples.iter()
    }
    /// Triples with the given predicate, in set order.
    pub fn with_predicate<'a>(&'a self, predicate: &'a Resource) -> impl Iterator<Item = &'a Triple> + 'a {
        self.triples.iter().filter(move |t| t.predicate() == predicate)
    }
    /// Fingerprint of the set. Iteration order is the set order, so equal sets
    /// always hash equally regardless of how they were built.
    pub fn digest(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        for triple in &self.triples {
            hasher.update(ntriples::encode_triple(triple).as_bytes());
            hasher.update(b"\n");
        }
        hasher.finalize().to_hex().to_string()
    }
}

impl FromIterator<Triple> for TripleSet {
    fn from_iter<I: IntoIterator<Item = Triple>>(iter: I) -> Self {
        Self {
            triples: iter.into_iter().collect(),
        }
    }
}

impl Extend<Triple> for TripleSet {
    fn extend<I: IntoIterator<Item = Triple>>(&mut self, iter: I) {
        self.triples.extend(iter);
    }
}

impl IntoIterator for TripleSet {
    type Item = Triple;
    type IntoIter = btree_set::IntoIter<Triple>;
    fn into_iter(self) -> Self::IntoIter {
        self.triples.into_iter()
    }
}

impl<'a> IntoIterator for &'a TripleSet {
    type Item = &'a Triple;
    type IntoIter = btree_set::Iter<'a, Triple>;
    fn into_iter(self) -> Self::IntoIter {
        self.triples.iter()
    }
}
