//! Legacy records: one row of the tabular export.
//!
//! The export is a directory of four files with `@`-separated fields and a
//! trailing separator on most rows. Field layouts:
//!
//! | file             | fields                                                         |
//! |------------------|----------------------------------------------------------------|
//! | `synsets.csv`    | id, label, gloss, ontological type, (trailing)                 |
//! | `words.csv`      | id, written form, part of speech, (trailing)                   |
//! | `wordsenses.csv` | id, word id, synset id, register, (trailing)                   |
//! | `relations.csv`  | synset id, label, relation, target id, taxonomic, inheritance  |

use std::fmt;
use std::fs;
use std::path::Path;

use serde::Serialize;
use tracing::{debug, info};

use crate::error::Result;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Synset,
    Word,
    Sense,
    Relation,
}

impl RecordKind {
    pub const ALL: [RecordKind; 4] = [
        RecordKind::Synset,
        RecordKind::Word,
        RecordKind::Sense,
        RecordKind::Relation,
    ];
    /// The fixed number of columns a well-formed row has.
    pub fn arity(&self) -> usize {
        match self {
            RecordKind::Synset => 5,
            RecordKind::Word => 4,
            RecordKind::Sense => 5,
            RecordKind::Relation => 6,
        }
    }
    pub fn file_name(&self) -> &'static str {
        match self {
            RecordKind::Synset => "synsets.csv",
            RecordKind::Word => "words.csv",
            RecordKind::Sense => "wordsenses.csv",
            RecordKind::Relation => "relations.csv",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            RecordKind::Synset => "synset",
            RecordKind::Word => "word",
            RecordKind::Sense => "sense",
            RecordKind::Relation => "relation",
        };
        write!(f, "{}", name)
    }
}

// ------------- Record -------------
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Record {
    kind: RecordKind,
    line: usize,
    fields: Vec<String>,
}

impl Record {
    pub fn new<S: Into<String>>(kind: RecordKind, line: usize, fields: impl IntoIterator<Item = S>) -> Self {
        Self {
            kind,
            line,
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }
    /// Splits one line of the export; fields are trimmed.
    pub fn parse(kind: RecordKind, line: usize, text: &str, separator: char) -> Self {
        Self::new(kind, line, text.split(separator).map(str::trim))
    }
    pub fn kind(&self) -> RecordKind {
        self.kind
    }
    pub fn line(&self) -> usize {
        self.line
    }
    pub fn fields(&self) -> &[String] {
        &self.fields
    }
    /// The field at `index`, or the empty string past the end.
    pub fn field(&self, index: usize) -> &str {
        self.fields.get(index).map(String::as_str).unwrap_or_default()
    }
    pub fn arity_ok(&self) -> bool {
        self.fields.len() == self.kind.arity()
    }
    /// Short fingerprint of the kind and every field. Independent of the line,
    /// so identical rows always agree and rows differing in any field never do.
    pub fn digest(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.kind.to_string().as_bytes());
        for field in &self.fields {
            // length prefix keeps field boundaries unambiguous
            hasher.update(&(field.len() as u64).to_le_bytes());
            hasher.update(field.as_bytes());
        }
        hasher.finalize().to_hex().as_str()[..16].to_string()
    }
}

// ------------- Loading -------------
/// Loads all four files of an export directory, synsets first.
pub fn load_directory(directory: &Path, separator: char) -> Result<Vec<Record>> {
    let mut records = Vec::new();
    for kind in RecordKind::ALL {
        let loaded = load_file(&directory.join(kind.file_name()), kind, separator)?;
        info!(%kind, rows = loaded.len(), "loaded legacy file");
        records.extend(loaded);
    }
    Ok(records)
}

pub fn load_file(path: &Path, kind: RecordKind, separator: char) -> Result<Vec<Record>> {
    let text = decode(fs::read(path)?);
    Ok(text
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| Record::parse(kind, index + 1, line, separator))
        .collect())
}

/// UTF-8, falling back to Latin-1 for older exports.
fn decode(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => {
            debug!("export is not UTF-8, reading it as Latin-1");
            e.into_bytes().into_iter().map(char::from).collect()
        }
    }
}
