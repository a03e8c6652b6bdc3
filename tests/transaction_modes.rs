use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::mpsc;
use std::thread;

use lexgraph::LexgraphError;
use lexgraph::construct::{Literal, Resource, Triple, TripleSet};
use lexgraph::dataset::DatasetStore;
use lexgraph::memory::MemoryStore;
use lexgraph::mint;
use lexgraph::persist::{PersistenceMode, SqliteStore};
use lexgraph::query::TriplePattern;
use lexgraph::store::{Capability, Requirement, Store};
use lexgraph::txn::{Mode, transact, transact_exec};

fn labelled(key: &str, label: &str) -> TripleSet {
    let mut triples = TripleSet::new();
    triples.add(mint::synset_id(key), Resource::new("rdfs:label"), Literal::lang(label, "da"));
    triples
}

fn sqlite() -> SqliteStore {
    SqliteStore::new(PersistenceMode::InMemory).unwrap()
}

#[test]
fn non_transactional_store_runs_the_thunk_directly() {
    let store = MemoryStore::new();
    assert_eq!(store.capability(), Capability::NonTransactional);
    let value = transact_exec(&store, Mode::Write, || {
        store.add(&labelled("1", "birk"))?;
        Ok(42)
    })
    .unwrap();
    assert_eq!(value, 42);
    assert_eq!(store.len().unwrap(), 1);
    // and directly, with the same effect
    store.add(&labelled("2", "eg")).unwrap();
    assert_eq!(store.len().unwrap(), 2);
}

#[test]
fn direct_write_is_refused_when_transactions_are_required() {
    let store = sqlite();
    assert_eq!(store.requirement(), Requirement::Always);
    let refused = store.add(&labelled("1", "birk"));
    assert!(matches!(
        refused,
        Err(LexgraphError::TransactionCapabilityMismatch {
            requirement: Requirement::Always
        })
    ));
    transact(&store, Mode::Write, || store.add(&labelled("1", "birk"))).unwrap();
    assert_eq!(store.len().unwrap(), 1);
}

#[test]
fn nested_transactions_pass_through() {
    let store = sqlite();
    let inner = transact_exec(&store, Mode::Write, || {
        store.add(&labelled("1", "birk"))?;
        let seen = transact_exec(&store, Mode::Read, || store.len())?;
        transact(&store, Mode::Write, || store.add(&labelled("2", "eg")))?;
        Ok(seen)
    })
    .unwrap();
    assert_eq!(inner, 1);
    assert_eq!(store.len().unwrap(), 2);
    assert_eq!(store.active(), None);
}

#[test]
fn write_inside_read_is_a_mode_conflict() {
    for store in [Box::new(sqlite()) as Box<dyn Store>, Box::new(DatasetStore::new())] {
        let result = transact(store.as_ref(), Mode::Read, || {
            transact(store.as_ref(), Mode::Write, || Ok(()))
        });
        assert!(matches!(
            result,
            Err(LexgraphError::TransactionModeConflict {
                open: Mode::Read,
                requested: Mode::Write
            })
        ));
        assert_eq!(store.active(), None);
    }
}

#[test]
fn failing_thunk_rolls_back() {
    let store = sqlite();
    let result = transact(&store, Mode::Write, || {
        store.add(&labelled("1", "birk"))?;
        Err::<(), _>(LexgraphError::Invariant("stop here".into()))
    });
    assert!(matches!(result, Err(LexgraphError::Invariant(_))));
    assert_eq!(store.len().unwrap(), 0);
    assert_eq!(store.active(), None);
}

#[test]
fn panicking_thunk_rolls_back_and_releases() {
    let store = DatasetStore::new();
    let outcome = catch_unwind(AssertUnwindSafe(|| {
        transact(&store, Mode::Write, || -> lexgraph::Result<()> {
            store.add(&labelled("1", "birk"))?;
            panic!("thunk failed");
        })
    }));
    assert!(outcome.is_err());
    assert_eq!(store.active(), None);
    assert_eq!(store.len().unwrap(), 0);
    // the store is usable afterwards
    transact(&store, Mode::Write, || store.add(&labelled("2", "eg"))).unwrap();
    assert_eq!(store.len().unwrap(), 1);
}

#[test]
fn after_first_transaction_allows_direct_writes_until_then() {
    let store = sqlite().with_requirement(Requirement::AfterFirstTransaction);
    store.add(&labelled("1", "birk")).unwrap();
    transact(&store, Mode::Read, || store.len()).unwrap();
    assert!(matches!(
        store.add(&labelled("2", "eg")),
        Err(LexgraphError::TransactionCapabilityMismatch { .. })
    ));
    assert_eq!(store.len().unwrap(), 1);
}

#[test]
fn dataset_stages_writes_until_commit() {
    let store = DatasetStore::new();
    let birk = Triple::new(mint::synset_id("1"), Resource::new("rdfs:label"), Literal::lang("birk", "da"));
    let seen = transact_exec(&store, Mode::Write, || {
        store.add(&labelled("1", "birk"))?;
        store.query(&TriplePattern::any().with_subject(mint::synset_id("1")))
    })
    .unwrap();
    assert_eq!(seen, vec![birk.clone()]);
    assert!(store.triples().unwrap().contains(&birk));
    assert_eq!(store.partition_sizes().unwrap().get("synsets"), Some(&1));
}

#[test]
fn dataset_abort_discards_staged_writes() {
    let store = DatasetStore::new();
    let _ = transact(&store, Mode::Write, || {
        store.add(&labelled("1", "birk"))?;
        assert_eq!(store.len()?, 1);
        Err::<(), _>(LexgraphError::Invariant("abort".into()))
    });
    assert_eq!(store.len().unwrap(), 0);
    assert!(store.partition_sizes().unwrap().is_empty());
}

#[test]
fn concurrent_reader_never_sees_a_partial_write() {
    let store = DatasetStore::new().with_requirement(Requirement::Never);
    let mut batch = TripleSet::new();
    for key in 0..50 {
        batch.union(labelled(&key.to_string(), "træ"));
    }
    let (started, wait) = mpsc::channel();
    thread::scope(|scope| {
        let writer = scope.spawn(|| {
            transact(&store, Mode::Write, || {
                started.send(()).unwrap();
                for triple in &batch {
                    store.add(&TripleSet::from_iter([triple.clone()]))?;
                }
                Ok(())
            })
        });
        wait.recv().unwrap();
        let reader = scope.spawn(|| transact_exec(&store, Mode::Read, || store.len()));
        let seen = reader.join().unwrap().unwrap();
        assert!(seen == 0 || seen == 50, "reader saw {} triples", seen);
        writer.join().unwrap().unwrap();
    });
    assert_eq!(store.len().unwrap(), 50);
}
