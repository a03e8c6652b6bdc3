//! Lexgraph – a lexical knowledge graph migrated from a legacy wordnet export.
//!
//! The graph is a set of triples `(subject, predicate, object)` over namespaced
//! resources, literals and blank nodes (see [`construct`]). Three parts do the
//! real work:
//!
//! * the **migration pipeline** ([`migrate`]) turns legacy records ([`record`])
//!   into canonical triples ([`synthesis`]) under a fixed relation vocabulary
//!   ([`vocabulary`]) with deterministic identities ([`mint`]);
//! * the **transaction abstraction** ([`txn`]) gives every store the same
//!   read/write semantics, whatever its transactional capability ([`store`]);
//! * the **entity projection engine** ([`projection`]) folds the triples of one
//!   subject into a navigable, multi-valued entity.
//!
//! ## Stores
//! * [`memory::MemoryStore`] – in-memory, not transactional.
//! * [`persist::SqliteStore`] – one SQLite connection, native transactions.
//! * [`dataset::DatasetStore`] – partitioned in-memory graphs under one
//!   store-wide transaction primitive.
//!
//! ## Quick Start
//! ```
//! use lexgraph::memory::MemoryStore;
//! use lexgraph::migrate::Pipeline;
//! use lexgraph::mint;
//! use lexgraph::projection::entity;
//! use lexgraph::record::{Record, RecordKind};
//! use lexgraph::vocabulary::RelationVocabulary;
//!
//! let store = MemoryStore::new();
//! let records = vec![Record::new(RecordKind::Synset, 1, ["999", "birk", "et træ", "Natural-Plant", ""])];
//! let report = Pipeline::new(&store, RelationVocabulary::dannet()).run(&records).unwrap();
//! assert_eq!(report.accepted(RecordKind::Synset), 1);
//! let birk = entity(&store, &mint::synset_id("999").into()).unwrap().unwrap();
//! assert!(!birk.properties().is_empty());
//! ```
//!
//! ## Serialization
//! [`ntriples`] reads and writes the triple set; a round trip preserves it exactly.

pub mod audit;
pub mod construct;
pub mod dataset;
pub mod error;
pub mod memory;
pub mod migrate;
pub mod mint;
pub mod ntriples;
pub mod persist;
pub mod projection;
pub mod query;
pub mod record;
pub mod settings;
pub mod store;
pub mod synthesis;
pub mod txn;
pub mod vocabulary;

pub use error::{LexgraphError, Result};
