//! Relation audit: which legacy tokens made it into the graph, and which were
//! kept verbatim because nothing canonical matched them.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::Result;
use crate::query::TriplePattern;
use crate::store::Store;
use crate::txn::{Mode, transact_exec};
use crate::vocabulary::RelationVocabulary;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RelationAudit {
    /// Triples per legacy token, for relations the vocabulary mapped.
    pub mapped: BTreeMap<String, usize>,
    /// Triples per predicate outside every known namespace.
    pub unmapped: BTreeMap<String, usize>,
}

impl RelationAudit {
    pub fn is_clean(&self) -> bool {
        self.unmapped.is_empty()
    }
}

/// Scans the whole store.
pub fn relation_audit<S: Store + ?Sized>(store: &S, vocabulary: &RelationVocabulary) -> Result<RelationAudit> {
    let triples = transact_exec(store, Mode::Read, || store.query(&TriplePattern::any()))?;
    let mut audit = RelationAudit::default();
    for triple in &triples {
        let predicate = triple.predicate();
        if let Some(token) = vocabulary.token(predicate) {
            *audit.mapped.entry(token.to_string()).or_insert(0) += 1;
        } else if !predicate.is_canonical() {
            *audit.unmapped.entry(predicate.to_string()).or_insert(0) += 1;
        }
    }
    Ok(audit)
}
