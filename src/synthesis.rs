//! Triple synthesis: one pure function per record kind.
//!
//! Each call owns a [`BlankArena`] scoped by the record key and the row digest
//! ([`Record::digest`]), so the same row always synthesizes the same triples and
//! rows that differ in any field never share a blank node.
//! Usage examples need the finished graph; synsets hand them back as [`Usage`]s
//! and [`resolve_usages`] attaches them in a second pass.

use std::collections::BTreeSet;

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use crate::construct::{BlankArena, Literal, Resource, Term, TripleSet};
use crate::error::Result;
use crate::mint;
use crate::query::{Clause, Select, Slot, select};
use crate::record::{Record, RecordKind};
use crate::store::Store;
use crate::vocabulary::*;

lazy_static! {
    static ref USAGE_PARENTHETICAL: Regex = Regex::new(r"(?s)^(.*?)\s*\(Brug:\s*(.*)\)\s*$").unwrap();
    static ref SENSE_SUFFIX: Regex = Regex::new(r"_\d+(?:§\d+\w*)?$").unwrap();
    static ref SYNSET_REFERENCE: Regex =
        Regex::new(r"(?i)(?:dn:)?synset(?:[ _-]+with[ _-]+id)?[ _:-]*(\d+)").unwrap();
    static ref REGISTER_PATTERNS: Vec<(Regex, Resource, Resource)> = REGISTER_MARKERS
        .iter()
        .map(|(pattern, predicate, value)| {
            (
                Regex::new(&format!(r"(?i)(?:^|[^\p{{L}}])(?:{})", pattern)).unwrap(),
                Resource::new(*predicate),
                Resource::new(*value),
            )
        })
        .collect();
}

const NO_DEFINITION: &str = "(ingen definition)";
const EMPTY_FIELD: &str = "_";

fn r(id: &str) -> Resource {
    Resource::new(id)
}

fn da(value: &str) -> Literal {
    Literal::lang(value, LANGUAGE)
}

fn present(field: &str) -> Option<&str> {
    let field = field.trim();
    (!field.is_empty() && field != EMPTY_FIELD).then_some(field)
}

// ------------- Synthesis -------------
/// A usage example waiting for the graph to be complete.
///
/// `token` is the label word found in the example; without one the usage can
/// never resolve.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Usage {
    pub synset: Resource,
    pub token: Option<String>,
    pub example: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Synthesis {
    pub triples: TripleSet,
    pub usages: Vec<Usage>,
    /// A relation token with no canonical counterpart, kept verbatim.
    pub unmapped: Option<String>,
}

/// Synthesizes one record; `None` when the row has the wrong arity.
pub fn synthesize(record: &Record, vocabulary: &RelationVocabulary) -> Option<Synthesis> {
    if !record.arity_ok() {
        return None;
    }
    let synthesis = match record.kind() {
        RecordKind::Synset => {
            let (triples, usages) = synset(record);
            Synthesis {
                triples,
                usages,
                unmapped: None,
            }
        }
        RecordKind::Relation => {
            let (triples, unmapped) = relation(record, vocabulary);
            Synthesis {
                triples,
                usages: Vec::new(),
                unmapped,
            }
        }
        RecordKind::Word => Synthesis {
            triples: word(record),
            ..Default::default()
        },
        RecordKind::Sense => Synthesis {
            triples: sense(record),
            ..Default::default()
        },
    };
    Some(synthesis)
}

// ------------- Synsets -------------
pub fn synset(record: &Record) -> (TripleSet, Vec<Usage>) {
    let synset = mint::synset_id(record.field(0));
    let label = record.field(1);
    let mut triples = TripleSet::new();
    triples.add(synset.clone(), r(RDF_TYPE), r(ONTOLEX_LEXICAL_CONCEPT));
    if let Some(label) = present(label) {
        triples.add(synset.clone(), r(RDFS_LABEL), da(label));
    }

    let (definition, examples) = split_gloss(record.field(2));
    if let Some(definition) = definition {
        triples.add(synset.clone(), r(SKOS_DEFINITION), da(&definition));
    }

    if let Some(composite) = present(record.field(3)) {
        for facet in facets(composite) {
            triples.add(synset.clone(), r(DNS_ONTOLOGICAL_TYPE), mint::facet_id(&facet));
        }
        triples.add(synset.clone(), r(DNS_ONTOLOGICAL_TYPE_COMPOSITE), Literal::new(composite));
    }

    let words = label_words(label);
    let usages = examples
        .into_iter()
        .map(|example| Usage {
            synset: synset.clone(),
            token: longest_match(&words, &example),
            example,
        })
        .collect();
    (triples, usages)
}

/// Splits a gloss into its definition and the examples of a trailing
/// `(Brug: ...)` parenthetical. Placeholder glosses have no definition.
pub fn split_gloss(gloss: &str) -> (Option<String>, Vec<String>) {
    let gloss = gloss.trim();
    let (definition, usage) = match USAGE_PARENTHETICAL.captures(gloss) {
        Some(captures) => (
            captures.get(1).map_or("", |m| m.as_str()),
            captures.get(2).map_or("", |m| m.as_str()),
        ),
        None => (gloss, ""),
    };
    let definition = definition.trim();
    let definition = (!definition.is_empty() && definition != NO_DEFINITION && definition != EMPTY_FIELD)
        .then(|| definition.to_string());
    let examples = usage
        .split("||")
        .map(|example| example.trim().trim_matches('"').trim().to_string())
        .filter(|example| !example.is_empty())
        .collect();
    (definition, examples)
}

/// The individual facets of a composite ontological type, in order and without
/// duplicates. Parentheses are grouping only.
pub fn facets(composite: &str) -> Vec<String> {
    let mut seen = BTreeSet::new();
    composite
        .split(['-', '+'])
        .map(|facet| facet.replace(['(', ')'], "").trim().to_string())
        .filter(|facet| !facet.is_empty() && seen.insert(facet.clone()))
        .collect()
}

/// Words of a synset label such as `{birk_1§1; birketræ}`, without sense suffixes.
pub fn label_words(label: &str) -> Vec<String> {
    label
        .replace(['{', '}'], "")
        .split([';', ','])
        .map(|word| SENSE_SUFFIX.replace(word.trim(), "").trim().to_string())
        .filter(|word| !word.is_empty())
        .collect()
}

/// The longest label word occurring in the example, ignoring case.
/// The first one wins among equally long words.
fn longest_match(words: &[String], example: &str) -> Option<String> {
    let example = example.to_lowercase();
    let mut best: Option<&String> = None;
    for word in words {
        if !example.contains(&word.to_lowercase()) {
            continue;
        }
        if best.is_none_or(|best| word.chars().count() > best.chars().count()) {
            best = Some(word);
        }
    }
    best.cloned()
}

// ------------- Relations -------------
/// A relation edge. Returns the verbatim token when it has no canonical relation.
pub fn relation(record: &Record, vocabulary: &RelationVocabulary) -> (TripleSet, Option<String>) {
    let source = mint::synset_id(record.field(0));
    let token = record.field(2);
    let target = mint::synset_id(record.field(3));
    let taxonomic = record.field(4);

    let mut unmapped = None;
    let predicate = if token == "has_hyperonym" && taxonomic == "nontaxonomic" {
        r(DNS_ORTHOGONAL_HYPERNYM)
    } else {
        match vocabulary.lookup(token) {
            Some(relation) => relation.clone(),
            None => {
                unmapped = Some(token.to_string());
                Resource::new(token)
            }
        }
    };

    let mut triples = TripleSet::new();
    triples.add(source.clone(), predicate.clone(), target.clone());

    if let Some(comment) = present(record.field(5)) {
        let mut arena = BlankArena::new(&format!(
            "relation-{}-{}-{}-{}",
            record.field(0),
            token,
            record.field(3),
            record.digest()
        ));
        let statement = arena.fresh();
        let rewritten = SYNSET_REFERENCE.replace_all(comment, "dn:synset-$1");
        triples.add(statement.clone(), r(RDF_TYPE), r(RDF_STATEMENT));
        triples.add(statement.clone(), r(RDF_SUBJECT), source);
        triples.add(statement.clone(), r(RDF_PREDICATE), predicate);
        triples.add(statement.clone(), r(RDF_OBJECT), target);
        triples.add(statement, r(RDFS_COMMENT), da(&rewritten));
    }
    (triples, unmapped)
}

// ------------- Words -------------
pub fn word(record: &Record) -> TripleSet {
    let key = record.field(0);
    let written = record.field(1).trim();
    let word = mint::word_id(key);
    let form = mint::form_id(key, written);

    let subtype = if written.contains(' ') {
        ONTOLEX_MULTIWORD_EXPRESSION
    } else if written.starts_with('-') || written.ends_with('-') {
        ONTOLEX_AFFIX
    } else {
        ONTOLEX_WORD
    };

    let mut triples = TripleSet::new();
    triples.add(word.clone(), r(RDF_TYPE), r(subtype));
    triples.add(word.clone(), r(RDFS_LABEL), da(written));
    triples.add(word.clone(), r(ONTOLEX_CANONICAL_FORM), form.clone());
    triples.add(form.clone(), r(RDF_TYPE), r(ONTOLEX_FORM));
    for alternative in written.split('/').map(str::trim).filter(|a| !a.is_empty()) {
        triples.add(form.clone(), r(ONTOLEX_WRITTEN_REP), da(alternative));
    }

    let pos = record.field(2).trim();
    let pos = if pos.eq_ignore_ascii_case("none") {
        part_of_speech_patch(key.trim()).unwrap_or(pos)
    } else {
        pos
    };
    if let Some(pos) = part_of_speech(pos) {
        triples.add(word, r(LEXINFO_PART_OF_SPEECH), pos);
    }
    triples
}

// ------------- Senses -------------
pub fn sense(record: &Record) -> TripleSet {
    let sense = mint::sense_id(record.field(0));
    let word = mint::word_id(record.field(1));
    let synset = mint::synset_id(record.field(2));

    let mut triples = TripleSet::new();
    triples.add(sense.clone(), r(RDF_TYPE), r(ONTOLEX_LEXICAL_SENSE));
    triples.add(word.clone(), r(ONTOLEX_SENSE), sense.clone());
    triples.add(sense.clone(), r(ONTOLEX_IS_SENSE_OF), word.clone());
    triples.add(word, r(ONTOLEX_EVOKES), synset.clone());
    triples.add(synset.clone(), r(ONTOLEX_LEXICALIZED_SENSE), sense.clone());
    triples.add(sense.clone(), r(ONTOLEX_IS_LEXICALIZED_SENSE_OF), synset);

    if let Some(register) = present(record.field(3)) {
        let mut arena = BlankArena::new(&format!("sense-{}-{}", record.field(0), record.digest()));
        let note = arena.fresh();
        triples.add(sense.clone(), r(LEXINFO_USAGE_NOTE), note.clone());
        triples.add(note, r(RDF_VALUE), da(register));
        for (pattern, predicate, value) in REGISTER_PATTERNS.iter() {
            if pattern.is_match(register) {
                triples.add(sense.clone(), predicate.clone(), value.clone());
            }
        }
    }
    triples
}

// ------------- Usages -------------
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UsageResolution {
    pub triples: TripleSet,
    pub resolved: usize,
    pub unresolved: usize,
}

/// Attaches each usage example to the sense realizing its token in its synset.
///
/// Candidate senses are those of the synset whose word has a written
/// representation equal to the token, ignoring case; the smallest one wins.
pub fn resolve_usages<S: Store + ?Sized>(store: &S, usages: &[Usage]) -> Result<UsageResolution> {
    let mut resolution = UsageResolution::default();
    for usage in usages {
        let sense = match &usage.token {
            Some(token) => realizing_sense(store, &usage.synset, token)?,
            None => None,
        };
        match sense {
            Some(sense) => {
                resolution.triples.add(sense, r(LEXINFO_SENSE_EXAMPLE), da(&usage.example));
                resolution.resolved += 1;
            }
            None => {
                debug!(synset = %usage.synset, token = ?usage.token, "unresolved usage");
                resolution.unresolved += 1;
            }
        }
    }
    Ok(resolution)
}

fn realizing_sense<S: Store + ?Sized>(store: &S, synset: &Resource, token: &str) -> Result<Option<Resource>> {
    let query = Select::new()
        .required(Clause::new(
            Slot::Fixed(synset.clone().into()),
            Slot::Fixed(r(ONTOLEX_LEXICALIZED_SENSE)),
            Slot::var("sense"),
        ))
        .required(Clause::new(
            Slot::var("sense"),
            Slot::Fixed(r(ONTOLEX_IS_SENSE_OF)),
            Slot::var("word"),
        ))
        .required(Clause::new(
            Slot::var("word"),
            Slot::Fixed(r(ONTOLEX_CANONICAL_FORM)),
            Slot::var("form"),
        ))
        .required(Clause::new(
            Slot::var("form"),
            Slot::Fixed(r(ONTOLEX_WRITTEN_REP)),
            Slot::var("written"),
        ));
    let token = token.to_lowercase();
    Ok(select(store, &query)?
        .into_iter()
        .filter(|binding| {
            binding
                .get("written")
                .and_then(Term::literal)
                .is_some_and(|written| written.value().to_lowercase() == token)
        })
        .filter_map(|binding| binding.get("sense").and_then(Term::resource).cloned())
        .min())
}
