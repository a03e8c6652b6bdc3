//! Identity minting: deterministic resource identifiers from legacy row keys.
//!
//! Every function here is pure and total. Characters that are unsafe in an
//! identifier are never dropped; they go through one fixed substitution rule:
//!
//! * a space becomes `_`
//! * alphanumerics (any script), `-`, `_` and `.` are kept
//! * anything else becomes `%XX`, one escape per UTF-8 byte
//!
//! So `"citron/citronen"` mints as `citron%2Fcitronen` and `"gå ud"` as `gå_ud`.

use crate::construct::Resource;

pub fn synset_id(key: &str) -> Resource {
    Resource::new(format!("dn:synset-{}", normalize(key)))
}

pub fn word_id(key: &str) -> Resource {
    Resource::new(format!("dn:word-{}", normalize(key)))
}

pub fn sense_id(key: &str) -> Resource {
    Resource::new(format!("dn:sense-{}", normalize(key)))
}

/// One form per word and surface form; alternative spellings joined by `/`
/// stay a single form identity.
pub fn form_id(word_key: &str, surface: &str) -> Resource {
    Resource::new(format!("dn:form-{}-{}", normalize(word_key), normalize(surface)))
}

/// Ontological type facet, e.g. `Liquid` or `1stOrderEntity`.
/// Identifiers must not begin with a digit, so leading ordinals become words.
pub fn facet_id(token: &str) -> Resource {
    Resource::new(format!("dnc:{}", normalize(&spell_ordinal(token.trim()))))
}

fn spell_ordinal(token: &str) -> String {
    for (ordinal, word) in [("1st", "First"), ("2nd", "Second"), ("3rd", "Third")] {
        if let Some(rest) = token.strip_prefix(ordinal) {
            return format!("{}{}", word, rest);
        }
    }
    token.to_string()
}

pub fn normalize(raw: &str) -> String {
    let mut normalized = String::with_capacity(raw.len());
    for c in raw.trim().chars() {
        match c {
            ' ' => normalized.push('_'),
            c if c.is_alphanumeric() || c == '-' || c == '_' || c == '.' => normalized.push(c),
            c => {
                let mut buffer = [0u8; 4];
                for byte in c.encode_utf8(&mut buffer).bytes() {
                    normalized.push_str(&format!("%{:02X}", byte));
                }
            }
        }
    }
    normalized
}

/// Blank node scope for a synthesis call. Only `[A-Za-z0-9-]` pass through;
/// every other byte is written as `_xx`, which keeps the mapping injective and
/// the result a valid N-Triples blank node label.
pub fn scope(owner: &str) -> String {
    let mut scope = String::with_capacity(owner.len());
    for byte in owner.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' {
            scope.push(byte as char);
        } else {
            scope.push_str(&format!("_{:02x}", byte));
        }
    }
    scope
}
