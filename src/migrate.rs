//! The migration pipeline: legacy records in, a canonical triple set out.
//!
//! [`migrate`] is the pure form. [`Pipeline`] runs the same synthesis against a
//! store in three transactional passes: write the base graph, resolve usage
//! examples against it (read, fully materialized), then write the examples.
//! One bad row never aborts the batch; it is skipped and counted.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::construct::TripleSet;
use crate::error::Result;
use crate::memory::MemoryStore;
use crate::record::{Record, RecordKind};
use crate::store::Store;
use crate::synthesis::{Usage, UsageResolution, resolve_usages, synthesize};
use crate::txn::{Mode, transact, transact_exec};
use crate::vocabulary::RelationVocabulary;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct KindCount {
    pub accepted: usize,
    pub skipped: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MigrationReport {
    pub records: BTreeMap<RecordKind, KindCount>,
    /// Relation tokens kept verbatim, with the number of rows using each.
    pub unmapped: BTreeMap<String, usize>,
    pub usages_resolved: usize,
    pub usages_unresolved: usize,
    pub triples: usize,
    pub digest: String,
    pub started: DateTime<Utc>,
    pub finished: DateTime<Utc>,
}

impl MigrationReport {
    fn new() -> Self {
        let now = Utc::now();
        Self {
            records: RecordKind::ALL
                .into_iter()
                .map(|kind| (kind, KindCount::default()))
                .collect(),
            unmapped: BTreeMap::new(),
            usages_resolved: 0,
            usages_unresolved: 0,
            triples: 0,
            digest: String::new(),
            started: now,
            finished: now,
        }
    }
    pub fn accepted(&self, kind: RecordKind) -> usize {
        self.records.get(&kind).map_or(0, |count| count.accepted)
    }
    pub fn skipped(&self, kind: RecordKind) -> usize {
        self.records.get(&kind).map_or(0, |count| count.skipped)
    }
    pub fn total_skipped(&self) -> usize {
        self.records.values().map(|count| count.skipped).sum()
    }
    fn finish(&mut self, triples: &TripleSet, resolution: &UsageResolution) {
        self.usages_resolved = resolution.resolved;
        self.usages_unresolved = resolution.unresolved;
        self.triples = triples.len();
        self.digest = triples.digest();
        self.finished = Utc::now();
    }
}

#[derive(Clone, Debug)]
pub struct Migration {
    pub triples: TripleSet,
    pub report: MigrationReport,
}

/// Synthesizes every record, tallying accepted and skipped rows and unmapped tokens.
fn synthesize_all(
    records: &[Record],
    vocabulary: &RelationVocabulary,
    report: &mut MigrationReport,
) -> (TripleSet, Vec<Usage>) {
    let mut triples = TripleSet::new();
    let mut usages = Vec::new();
    for record in records {
        let count = report.records.entry(record.kind()).or_default();
        let Some(synthesis) = synthesize(record, vocabulary) else {
            count.skipped += 1;
            debug!(
                kind = %record.kind(),
                line = record.line(),
                arity = record.fields().len(),
                expected = record.kind().arity(),
                "skipping malformed record"
            );
            continue;
        };
        count.accepted += 1;
        if let Some(token) = synthesis.unmapped {
            let uses = report.unmapped.entry(token.clone()).or_insert(0);
            if *uses == 0 {
                warn!(%token, line = record.line(), "relation token has no canonical relation, kept verbatim");
            }
            *uses += 1;
        }
        triples.union(synthesis.triples);
        usages.extend(synthesis.usages);
    }
    (triples, usages)
}

/// Migrates records into a triple set without touching any store.
pub fn migrate(records: &[Record], vocabulary: &RelationVocabulary) -> Result<Migration> {
    let mut report = MigrationReport::new();
    let (mut triples, usages) = synthesize_all(records, vocabulary, &mut report);
    let resolution = resolve_usages(&MemoryStore::from_triples(&triples), &usages)?;
    triples.union(resolution.triples.clone());
    report.finish(&triples, &resolution);
    Ok(Migration { triples, report })
}

// ------------- Pipeline -------------
pub struct Pipeline<'s, S: Store + ?Sized> {
    store: &'s S,
    vocabulary: &'s RelationVocabulary,
}

impl<'s, S: Store + ?Sized> Pipeline<'s, S> {
    pub fn new(store: &'s S, vocabulary: &'s RelationVocabulary) -> Self {
        Self { store, vocabulary }
    }

    pub fn run(&self, records: &[Record]) -> Result<MigrationReport> {
        let store = self.store;
        let mut report = MigrationReport::new();
        let (mut triples, usages) = synthesize_all(records, self.vocabulary, &mut report);

        info!(triples = triples.len(), skipped = report.total_skipped(), "writing base graph");
        transact(store, Mode::Write, || store.add(&triples))?;

        info!(usages = usages.len(), "resolving usage examples");
        let resolution = transact_exec(store, Mode::Read, || resolve_usages(store, &usages))?;

        info!(
            resolved = resolution.resolved,
            unresolved = resolution.unresolved,
            "writing usage examples"
        );
        transact(store, Mode::Write, || store.add(&resolution.triples))?;

        triples.union(resolution.triples.clone());
        report.finish(&triples, &resolution);
        info!(triples = report.triples, digest = %report.digest, "migration complete");
        Ok(report)
    }
}
