//! The transaction abstraction.
//!
//! [`transact`] and [`transact_exec`] give every backend the same read/write
//! semantics. Dispatch is a closed switch on [`Capability`]:
//!
//! * the calling thread already holds a covering transaction: the thunk runs inside it
//! * it holds a weaker one: [`LexgraphError::TransactionModeConflict`]
//! * `NonTransactional`: the thunk runs directly
//! * `SingleResource` and `MultiResource`: begin, run, then commit or abort
//!
//! [`Gate`] is the bookkeeping the transactional backends share.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Condvar, Mutex};
use std::thread::{self, ThreadId};

use tracing::{trace, warn};

use crate::error::{LexgraphError, Result};
use crate::store::{Capability, Requirement, Store};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Mode {
    Read,
    Write,
}

impl Mode {
    /// A write transaction may serve reads, never the other way around.
    pub fn covers(&self, other: Mode) -> bool {
        *self >= other
    }
}

// ------------- Transact -------------
/// Runs `thunk` in a transaction of the given mode and discards its value.
pub fn transact<S, R, F>(store: &S, mode: Mode, thunk: F) -> Result<()>
where
    S: Store + ?Sized,
    F: FnOnce() -> Result<R>,
{
    transact_exec(store, mode, || thunk().map(|_| ()))
}

/// Runs `thunk` in a transaction of the given mode and returns its value.
///
/// The value is owned (`'static`), so nothing borrowed from the store can be
/// evaluated after the transaction has ended.
pub fn transact_exec<S, T, F>(store: &S, mode: Mode, thunk: F) -> Result<T>
where
    S: Store + ?Sized,
    T: 'static,
    F: FnOnce() -> Result<T>,
{
    if let Some(open) = store.active() {
        if open.covers(mode) {
            trace!(?open, requested = ?mode, "passing through open transaction");
            return thunk();
        }
        return Err(LexgraphError::TransactionModeConflict {
            open,
            requested: mode,
        });
    }
    match store.capability() {
        Capability::NonTransactional => thunk(),
        // the store's own begin maps to its native or store-wide primitive
        capability @ (Capability::SingleResource | Capability::MultiResource) => {
            trace!(?mode, ?capability, "wrapping in a transaction");
            wrapped(store, mode, thunk)
        }
    }
}

fn wrapped<S, T, F>(store: &S, mode: Mode, thunk: F) -> Result<T>
where
    S: Store + ?Sized,
    F: FnOnce() -> Result<T>,
{
    store.begin(mode)?;
    let mut guard = AbortOnUnwind { store, armed: true };
    let result = thunk();
    guard.armed = false;
    match result {
        Ok(value) => match store.commit() {
            Ok(()) => Ok(value),
            Err(e) => {
                abort_quietly(store);
                Err(e)
            }
        },
        Err(e) => {
            abort_quietly(store);
            Err(e)
        }
    }
}

fn abort_quietly<S: Store + ?Sized>(store: &S) {
    if let Err(e) = store.abort() {
        warn!(error = %e, "abort failed");
    }
}

struct AbortOnUnwind<'s, S: Store + ?Sized> {
    store: &'s S,
    armed: bool,
}

impl<S: Store + ?Sized> Drop for AbortOnUnwind<'_, S> {
    fn drop(&mut self) {
        if self.armed {
            abort_quietly(self.store);
        }
    }
}

// ------------- Gate -------------
/// Per-thread transaction ownership for one store.
///
/// An exclusive gate admits one transaction at a time. A shared-read gate admits
/// any number of read transactions, or a single write transaction. Direct
/// operations outside a transaction pass through the same gate, so they never
/// observe another thread's uncommitted writes.
#[derive(Debug)]
pub struct Gate {
    shared_reads: bool,
    holders: Mutex<HashMap<ThreadId, Mode>>,
    released: Condvar,
    transacted: AtomicBool,
}

impl Gate {
    pub fn exclusive() -> Self {
        Self::new(false)
    }
    pub fn shared_reads() -> Self {
        Self::new(true)
    }
    fn new(shared_reads: bool) -> Self {
        Self {
            shared_reads,
            holders: Mutex::new(HashMap::new()),
            released: Condvar::new(),
            transacted: AtomicBool::new(false),
        }
    }
    /// The mode held by the calling thread.
    pub fn held(&self) -> Option<Mode> {
        let holders = self.holders.lock().ok()?;
        holders.get(&thread::current().id()).copied()
    }
    /// Whether any transaction has ever been begun through this gate.
    pub fn transacted(&self) -> bool {
        self.transacted.load(Ordering::SeqCst)
    }
    /// Blocks until the calling thread may hold `mode`.
    pub fn acquire(&self, mode: Mode) -> Result<()> {
        let me = thread::current().id();
        let mut holders = self.holders.lock()?;
        if holders.contains_key(&me) {
            return Err(LexgraphError::Invariant(
                "thread already holds a transaction on this store".into(),
            ));
        }
        while !self.admits(&holders, mode) {
            holders = self.released.wait(holders)?;
        }
        holders.insert(me, mode);
        Ok(())
    }
    /// Begins a transaction: acquires and remembers that the store has transacted.
    pub fn begin(&self, mode: Mode) -> Result<()> {
        self.acquire(mode)?;
        self.transacted.store(true, Ordering::SeqCst);
        Ok(())
    }
    pub fn release(&self) -> Result<Mode> {
        let mut holders = self.holders.lock()?;
        let mode = holders
            .remove(&thread::current().id())
            .ok_or_else(|| LexgraphError::Invariant("no transaction held by this thread".into()))?;
        self.released.notify_all();
        Ok(mode)
    }
    fn admits(&self, holders: &HashMap<ThreadId, Mode>, mode: Mode) -> bool {
        holders.is_empty()
            || (self.shared_reads && mode == Mode::Read && holders.values().all(|held| *held == Mode::Read))
    }

    /// Admits a direct operation.
    ///
    /// Inside a transaction of the calling thread this is free, provided the
    /// transaction covers the operation. Outside one, a write is refused when the
    /// requirement demands a transaction; anything else holds the gate until the
    /// returned admission is dropped.
    pub fn enter(&self, mode: Mode, requirement: Requirement) -> Result<Option<Admission<'_>>> {
        if let Some(open) = self.held() {
            if open.covers(mode) {
                return Ok(None);
            }
            return Err(LexgraphError::TransactionModeConflict {
                open,
                requested: mode,
            });
        }
        if mode == Mode::Write && requirement.demands(self.transacted()) {
            return Err(LexgraphError::TransactionCapabilityMismatch { requirement });
        }
        self.acquire(mode)?;
        Ok(Some(Admission { gate: self }))
    }
}

/// A direct operation's hold on a [`Gate`], released on drop.
#[derive(Debug)]
pub struct Admission<'g> {
    gate: &'g Gate,
}

impl Drop for Admission<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.gate.release() {
            warn!(error = %e, "could not release admission");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_covers_read() {
        assert!(Mode::Write.covers(Mode::Read));
        assert!(Mode::Write.covers(Mode::Write));
        assert!(Mode::Read.covers(Mode::Read));
        assert!(!Mode::Read.covers(Mode::Write));
    }

    #[test]
    fn admission_is_released_on_drop() {
        let gate = Gate::exclusive();
        {
            let admission = gate.enter(Mode::Write, Requirement::Never).unwrap();
            assert!(admission.is_some());
            assert_eq!(gate.held(), Some(Mode::Write));
        }
        assert_eq!(gate.held(), None);
    }

    #[test]
    fn requirement_refuses_direct_writes() {
        let gate = Gate::exclusive();
        assert!(gate.enter(Mode::Read, Requirement::Always).unwrap().is_some());
        assert!(matches!(
            gate.enter(Mode::Write, Requirement::Always),
            Err(LexgraphError::TransactionCapabilityMismatch { .. })
        ));
        assert!(gate.enter(Mode::Write, Requirement::AfterFirstTransaction).is_ok());
        gate.begin(Mode::Read).unwrap();
        gate.release().unwrap();
        assert!(matches!(
            gate.enter(Mode::Write, Requirement::AfterFirstTransaction),
            Err(LexgraphError::TransactionCapabilityMismatch { .. })
        ));
    }
}
