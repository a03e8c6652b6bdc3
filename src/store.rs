//! The store interface shared by every backend.
//!
//! A store says once, through [`Store::capability`], how it transacts; the
//! transaction layer in [`crate::txn`] dispatches on that and nothing else.

use serde::Deserialize;

use crate::construct::{Triple, TripleSet};
use crate::error::{LexgraphError, Result};
use crate::query::TriplePattern;
use crate::txn::Mode;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Capability {
    NonTransactional,
    SingleResource,
    MultiResource,
}

/// When writes must happen inside a transaction.
///
/// `AfterFirstTransaction` has no observable trigger of its own, so it is a
/// configured property of the store rather than something probed at runtime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Requirement {
    #[default]
    Never,
    Always,
    AfterFirstTransaction,
}

impl Requirement {
    /// Whether a direct write is refused, given if the store has transacted before.
    pub fn demands(&self, transacted: bool) -> bool {
        match self {
            Requirement::Never => false,
            Requirement::Always => true,
            Requirement::AfterFirstTransaction => transacted,
        }
    }
}

pub trait Store: Send + Sync {
    fn capability(&self) -> Capability;
    fn requirement(&self) -> Requirement {
        Requirement::Never
    }
    fn add(&self, triples: &TripleSet) -> Result<()>;
    /// All matching triples, materialized.
    fn query(&self, pattern: &TriplePattern) -> Result<Vec<Triple>>;
    /// The transaction held by the calling thread, if any.
    fn active(&self) -> Option<Mode> {
        None
    }
    fn begin(&self, _mode: Mode) -> Result<()> {
        Err(LexgraphError::TransactionUnsupported)
    }
    fn commit(&self) -> Result<()> {
        Err(LexgraphError::TransactionUnsupported)
    }
    fn abort(&self) -> Result<()> {
        Err(LexgraphError::TransactionUnsupported)
    }
    fn len(&self) -> Result<usize> {
        Ok(self.query(&TriplePattern::any())?.len())
    }
    fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
    /// Everything in the store as one set.
    fn triples(&self) -> Result<TripleSet> {
        Ok(self.query(&TriplePattern::any())?.into_iter().collect())
    }
}
