//! The multi-resource transactional store.
//!
//! Triples are partitioned over several in-memory graphs by the kind of their
//! subject. One store-wide primitive (a shared-read [`Gate`]) spans all of them:
//! any number of readers, or one writer whose additions are staged and only
//! applied to the partitions on commit.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;

use tracing::debug;

use crate::construct::{Node, Triple, TripleSet};
use crate::error::Result;
use crate::memory::MemoryGraph;
use crate::query::TriplePattern;
use crate::store::{Capability, Requirement, Store};
use crate::txn::{Gate, Mode};

const DEFAULT_PARTITION: &str = "default";
const PARTITIONS: [(&str, &str); 4] = [
    ("synset-", "synsets"),
    ("word-", "words"),
    ("form-", "forms"),
    ("sense-", "senses"),
];

/// The partition a subject lives in.
pub fn partition(subject: &Node) -> &'static str {
    let Node::Resource(resource) = subject else {
        return DEFAULT_PARTITION;
    };
    if resource.prefix() != Some("dn") {
        return DEFAULT_PARTITION;
    }
    PARTITIONS
        .iter()
        .find(|(marker, _)| resource.local_name().starts_with(marker))
        .map(|(_, name)| *name)
        .unwrap_or(DEFAULT_PARTITION)
}

pub struct DatasetStore {
    partitions: Mutex<BTreeMap<&'static str, MemoryGraph>>,
    staged: Mutex<Option<TripleSet>>,
    gate: Gate,
    requirement: Requirement,
}

impl Default for DatasetStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DatasetStore {
    pub fn new() -> Self {
        Self {
            partitions: Mutex::new(BTreeMap::new()),
            staged: Mutex::new(None),
            gate: Gate::shared_reads(),
            requirement: Requirement::Always,
        }
    }
    pub fn with_requirement(mut self, requirement: Requirement) -> Self {
        self.requirement = requirement;
        self
    }
    /// Triple counts per partition.
    pub fn partition_sizes(&self) -> Result<BTreeMap<String, usize>> {
        let _admission = self.gate.enter(Mode::Read, self.requirement)?;
        Ok(self
            .partitions
            .lock()?
            .iter()
            .map(|(name, graph)| (name.to_string(), graph.len()))
            .collect())
    }
    fn apply(&self, triples: &TripleSet) -> Result<usize> {
        let mut partitions = self.partitions.lock()?;
        let mut added = 0;
        for triple in triples {
            added += partitions
                .entry(partition(triple.subject()))
                .or_default()
                .insert(triple) as usize;
        }
        Ok(added)
    }
}

impl Store for DatasetStore {
    fn capability(&self) -> Capability {
        Capability::MultiResource
    }
    fn requirement(&self) -> Requirement {
        self.requirement
    }
    fn add(&self, triples: &TripleSet) -> Result<()> {
        match self.gate.enter(Mode::Write, self.requirement)? {
            // inside this thread's write transaction
            None => {
                self.staged
                    .lock()?
                    .get_or_insert_with(TripleSet::new)
                    .extend(triples.iter().cloned());
            }
            Some(_admission) => {
                self.apply(triples)?;
            }
        }
        Ok(())
    }
    fn query(&self, pattern: &TriplePattern) -> Result<Vec<Triple>> {
        let _admission = self.gate.enter(Mode::Read, self.requirement)?;
        let mut found = BTreeSet::new();
        {
            let partitions = self.partitions.lock()?;
            match &pattern.subject {
                Some(subject) => {
                    if let Some(graph) = partitions.get(partition(subject)) {
                        found.extend(graph.matching(pattern)?);
                    }
                }
                None => {
                    for graph in partitions.values() {
                        found.extend(graph.matching(pattern)?);
                    }
                }
            }
        }
        if self.gate.held() == Some(Mode::Write) {
            if let Some(staged) = self.staged.lock()?.as_ref() {
                found.extend(staged.iter().filter(|triple| pattern.matches(triple)).cloned());
            }
        }
        Ok(found.into_iter().collect())
    }
    fn active(&self) -> Option<Mode> {
        self.gate.held()
    }
    fn begin(&self, mode: Mode) -> Result<()> {
        self.gate.begin(mode)?;
        if mode == Mode::Write {
            *self.staged.lock()? = Some(TripleSet::new());
        }
        Ok(())
    }
    fn commit(&self) -> Result<()> {
        let staged = self.staged.lock()?.take();
        if let Some(staged) = staged {
            let added = self.apply(&staged)?;
            debug!(staged = staged.len(), added, "committed staged triples");
        }
        self.gate.release()?;
        Ok(())
    }
    fn abort(&self) -> Result<()> {
        let discarded = self.staged.lock()?.take();
        if let Some(discarded) = discarded {
            debug!(discarded = discarded.len(), "discarded staged triples");
        }
        self.gate.release()?;
        Ok(())
    }
}
