//! N-Triples import and export.
//!
//! Resources are written as full IRIs (see [`Resource::iri`]) and compressed back
//! to prefixed identifiers when read, so a triple set survives a round trip.
//! The grammar lives in `ntriples.pest`.

use std::io::{Read, Write};

use pest::Parser;
use pest::error::LineColLocation;
use pest::iterators::Pair;
use pest_derive::Parser;

use crate::construct::{Blank, Literal, Node, Resource, Term, Triple, TripleSet};
use crate::error::{LexgraphError, Result};

#[derive(Parser)]
#[grammar = "ntriples.pest"]
struct NTriplesParser;

// ------------- Encoding -------------
pub fn encode_resource(resource: &Resource) -> String {
    let mut encoded = String::from("<");
    for c in resource.iri().chars() {
        match c {
            '<' | '>' | '"' | '{' | '}' | '|' | '^' | '`' | '\\' => push_uchar(&mut encoded, c),
            c if (c as u32) <= 0x20 => push_uchar(&mut encoded, c),
            c => encoded.push(c),
        }
    }
    encoded.push('>');
    encoded
}

fn push_uchar(encoded: &mut String, c: char) {
    let code = c as u32;
    if code > 0xFFFF {
        encoded.push_str(&format!("\\U{:08X}", code));
    } else {
        encoded.push_str(&format!("\\u{:04X}", code));
    }
}

pub fn encode_literal(literal: &Literal) -> String {
    let mut encoded = String::from("\"");
    for c in literal.value().chars() {
        match c {
            '"' => encoded.push_str("\\\""),
            '\\' => encoded.push_str("\\\\"),
            '\n' => encoded.push_str("\\n"),
            '\r' => encoded.push_str("\\r"),
            '\t' => encoded.push_str("\\t"),
            c if c.is_control() => push_uchar(&mut encoded, c),
            c => encoded.push(c),
        }
    }
    encoded.push('"');
    if let Some(language) = literal.language() {
        encoded.push('@');
        encoded.push_str(language);
    } else if let Some(datatype) = literal.datatype() {
        encoded.push_str("^^");
        encoded.push_str(&encode_resource(datatype));
    }
    encoded
}

pub fn encode_term(term: &Term) -> String {
    match term {
        Term::Resource(resource) => encode_resource(resource),
        Term::Blank(blank) => format!("_:{}", blank.label()),
        Term::Literal(literal) => encode_literal(literal),
    }
}

pub fn encode_node(node: &Node) -> String {
    match node {
        Node::Resource(resource) => encode_resource(resource),
        Node::Blank(blank) => format!("_:{}", blank.label()),
    }
}

pub fn encode_triple(triple: &Triple) -> String {
    format!(
        "{} {} {} .",
        encode_node(triple.subject()),
        encode_resource(triple.predicate()),
        encode_term(triple.object())
    )
}

/// Writes one line per triple, in set order.
pub fn write<W: Write>(triples: &TripleSet, mut writer: W) -> Result<()> {
    for triple in triples {
        writeln!(writer, "{}", encode_triple(triple))?;
    }
    writer.flush()?;
    Ok(())
}

pub fn to_string(triples: &TripleSet) -> String {
    triples
        .iter()
        .map(|triple| encode_triple(triple) + "\n")
        .collect()
}

// ------------- Decoding -------------
pub fn read<R: Read>(mut reader: R) -> Result<TripleSet> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    parse(&text)
}

pub fn parse(text: &str) -> Result<TripleSet> {
    let mut pairs = NTriplesParser::parse(Rule::document, text).map_err(parse_error)?;
    let mut triples = TripleSet::new();
    if let Some(document) = pairs.next() {
        for pair in document.into_inner() {
            if pair.as_rule() == Rule::triple {
                triples.insert(triple(pair)?);
            }
        }
    }
    Ok(triples)
}

/// Decodes a single encoded term, as written by [`encode_term`].
pub fn parse_term(text: &str) -> Result<Term> {
    let mut pairs = NTriplesParser::parse(Rule::single_term, text).map_err(parse_error)?;
    pairs
        .next()
        .and_then(|single| single.into_inner().find(|pair| pair.as_rule() != Rule::EOI))
        .ok_or_else(|| malformed("empty term", None))
        .and_then(term)
}

fn triple(pair: Pair<Rule>) -> Result<Triple> {
    let position = Some(pair.line_col());
    let mut terms = pair.into_inner().map(term).collect::<Result<Vec<_>>>()?.into_iter();
    let (Some(subject), Some(predicate), Some(object), None) =
        (terms.next(), terms.next(), terms.next(), terms.next())
    else {
        return Err(malformed("a triple has exactly three terms", position));
    };
    let subject = subject
        .as_node()
        .ok_or_else(|| malformed("a literal cannot be a subject", position))?;
    let Term::Resource(predicate) = predicate else {
        return Err(malformed("the predicate must be an IRI", position));
    };
    Ok(Triple::new(subject, predicate, object))
}

fn term(pair: Pair<Rule>) -> Result<Term> {
    let position = Some(pair.line_col());
    match pair.as_rule() {
        Rule::iri => Ok(Term::Resource(iri(pair)?)),
        Rule::blank => {
            let label = pair.into_inner().next().map(|label| label.as_str()).unwrap_or_default();
            Blank::from_label(label)
                .map(Term::Blank)
                .ok_or_else(|| malformed(&format!("blank node label '{}' is not scoped", label), position))
        }
        Rule::literal => {
            let mut inner = pair.into_inner();
            let value = match inner.next() {
                Some(body) => unescape(body.as_str(), position)?,
                None => String::new(),
            };
            let literal = match inner.next() {
                Some(tag) if tag.as_rule() == Rule::lang_tag => Literal::lang(value, &tag.as_str()[1..]),
                Some(datatype) => Literal::typed(value, iri(datatype)?),
                None => Literal::new(value),
            };
            Ok(Term::Literal(literal))
        }
        rule => Err(malformed(&format!("unexpected {:?}", rule), position)),
    }
}

fn iri(pair: Pair<Rule>) -> Result<Resource> {
    let position = Some(pair.line_col());
    let body = pair.into_inner().next().map(|body| body.as_str()).unwrap_or_default();
    Ok(Resource::from_iri(&unescape(body, position)?))
}

fn unescape(escaped: &str, position: Option<(usize, usize)>) -> Result<String> {
    let mut unescaped = String::with_capacity(escaped.len());
    let mut chars = escaped.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            unescaped.push(c);
            continue;
        }
        let c = match chars.next() {
            Some('t') => '\t',
            Some('b') => '\u{8}',
            Some('n') => '\n',
            Some('r') => '\r',
            Some('f') => '\u{c}',
            Some(c @ ('"' | '\'' | '\\')) => c,
            Some(width @ ('u' | 'U')) => {
                let digits: String = chars.by_ref().take(if width == 'u' { 4 } else { 8 }).collect();
                u32::from_str_radix(&digits, 16)
                    .ok()
                    .and_then(char::from_u32)
                    .ok_or_else(|| malformed(&format!("invalid escape \\{}{}", width, digits), position))?
            }
            other => return Err(malformed(&format!("invalid escape \\{}", other.unwrap_or(' ')), position)),
        };
        unescaped.push(c);
    }
    Ok(unescaped)
}

fn malformed(message: &str, position: Option<(usize, usize)>) -> LexgraphError {
    LexgraphError::Parse {
        message: message.to_string(),
        line: position.map(|(line, _)| line),
        col: position.map(|(_, col)| col),
    }
}

fn parse_error(e: pest::error::Error<Rule>) -> LexgraphError {
    let (line, col) = match e.line_col {
        LineColLocation::Pos((line, col)) => (line, col),
        LineColLocation::Span((line, col), _) => (line, col),
    };
    LexgraphError::Parse {
        message: e.variant.message().to_string(),
        line: Some(line),
        col: Some(col),
    }
}
