//! The single-resource transactional store: one SQLite connection.
//!
//! Terms are stored in their N-Triples encoding, so the table is a plain
//! serialization of the triple set and can be inspected with any SQLite tool.

use std::sync::Mutex;

use rusqlite::{Connection, params, params_from_iter};
use tracing::{debug, info};

use crate::construct::{Node, Term, Triple, TripleSet};
use crate::error::{LexgraphError, Result};
use crate::ntriples;
use crate::query::TriplePattern;
use crate::store::{Capability, Requirement, Store};
use crate::txn::{Gate, Mode};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PersistenceMode {
    InMemory,
    File(String),
}

// ------------- Persistence -------------
pub struct SqliteStore {
    connection: Mutex<Connection>,
    gate: Gate,
    requirement: Requirement,
}

impl SqliteStore {
    /// Opens (or creates) the store. Writes require a transaction unless
    /// configured otherwise with [`SqliteStore::with_requirement`].
    pub fn new(mode: PersistenceMode) -> Result<Self> {
        let connection = match &mode {
            PersistenceMode::InMemory => Connection::open_in_memory()?,
            PersistenceMode::File(path) => Connection::open(path)?,
        };
        // The "STRICT" keyword is left out so that external tools can still open the file
        connection.execute_batch(
            "
            create table if not exists Triple (
                Subject text not null,
                Predicate text not null,
                Object text not null,
                constraint unique_Triple primary key (
                    Subject,
                    Predicate,
                    Object
                )
            );
            create index if not exists Triple_by_Predicate on Triple (Predicate, Object);
            create index if not exists Triple_by_Object on Triple (Object);
            ",
        )?;
        info!(?mode, "opened sqlite store");
        Ok(Self {
            connection: Mutex::new(connection),
            gate: Gate::exclusive(),
            requirement: Requirement::Always,
        })
    }
    pub fn with_requirement(mut self, requirement: Requirement) -> Self {
        self.requirement = requirement;
        self
    }
    fn execute(&self, sql: &str) -> Result<()> {
        self.connection.lock()?.execute_batch(sql)?;
        Ok(())
    }
}

fn decode(encoded: &str) -> Result<Term> {
    ntriples::parse_term(encoded).map_err(|e| LexgraphError::DataCorruption {
        message: format!("stored term {} could not be decoded: {}", encoded, e),
    })
}

fn decode_triple(subject: &str, predicate: &str, object: &str) -> Result<Triple> {
    let corrupt = |what: &str, encoded: &str| LexgraphError::DataCorruption {
        message: format!("stored {} {} has the wrong kind", what, encoded),
    };
    let subject: Node = decode(subject)?
        .as_node()
        .ok_or_else(|| corrupt("subject", subject))?;
    let Term::Resource(predicate_resource) = decode(predicate)? else {
        return Err(corrupt("predicate", predicate));
    };
    Ok(Triple::new(subject, predicate_resource, decode(object)?))
}

impl Store for SqliteStore {
    fn capability(&self) -> Capability {
        Capability::SingleResource
    }
    fn requirement(&self) -> Requirement {
        self.requirement
    }
    fn add(&self, triples: &TripleSet) -> Result<()> {
        let _admission = self.gate.enter(Mode::Write, self.requirement)?;
        let connection = self.connection.lock()?;
        let mut add_triple = connection.prepare_cached(
            "
            insert or ignore into Triple (
                Subject,
                Predicate,
                Object
            ) values (?1, ?2, ?3)
            ",
        )?;
        let mut added = 0;
        for triple in triples {
            added += add_triple.execute(params![
                ntriples::encode_node(triple.subject()),
                ntriples::encode_resource(triple.predicate()),
                ntriples::encode_term(triple.object()),
            ])?;
        }
        debug!(offered = triples.len(), added, "persisted triples");
        Ok(())
    }
    fn query(&self, pattern: &TriplePattern) -> Result<Vec<Triple>> {
        let _admission = self.gate.enter(Mode::Read, self.requirement)?;
        let mut conditions = Vec::new();
        let mut values = Vec::new();
        if let Some(subject) = &pattern.subject {
            conditions.push("Subject = ?");
            values.push(ntriples::encode_node(subject));
        }
        if let Some(predicate) = &pattern.predicate {
            conditions.push("Predicate = ?");
            values.push(ntriples::encode_resource(predicate));
        }
        if let Some(object) = &pattern.object {
            conditions.push("Object = ?");
            values.push(ntriples::encode_term(object));
        }
        let mut sql = String::from("select Subject, Predicate, Object from Triple");
        if !conditions.is_empty() {
            sql.push_str(" where ");
            sql.push_str(&conditions.join(" and "));
        }
        let connection = self.connection.lock()?;
        let mut statement = connection.prepare_cached(&sql)?;
        let rows = statement.query_map(params_from_iter(values.iter()), |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?;
        let mut triples = Vec::new();
        for row in rows {
            let (subject, predicate, object) = row?;
            triples.push(decode_triple(&subject, &predicate, &object)?);
        }
        Ok(triples)
    }
    fn len(&self) -> Result<usize> {
        let _admission = self.gate.enter(Mode::Read, self.requirement)?;
        let connection = self.connection.lock()?;
        let count: i64 = connection.query_row("select count(*) from Triple", [], |row| row.get(0))?;
        Ok(count as usize)
    }
    fn active(&self) -> Option<Mode> {
        self.gate.held()
    }
    fn begin(&self, mode: Mode) -> Result<()> {
        self.gate.begin(mode)?;
        let sql = match mode {
            Mode::Read => "begin deferred",
            Mode::Write => "begin immediate",
        };
        if let Err(e) = self.execute(sql) {
            self.gate.release()?;
            return Err(e);
        }
        Ok(())
    }
    fn commit(&self) -> Result<()> {
        // on failure the transaction stays open for the abort that follows
        self.execute("commit")?;
        self.gate.release()?;
        Ok(())
    }
    fn abort(&self) -> Result<()> {
        let rolled_back = self.execute("rollback");
        self.gate.release()?;
        rolled_back
    }
}
