//! Static vocabulary: namespaces, canonical relations and the legacy lookup tables.
//!
//! Everything here is immutable and built once at start; nothing is mutated at runtime.

use std::collections::HashMap;

use bimap::BiMap;
use lazy_static::lazy_static;

use crate::construct::Resource;

pub const NAMESPACES: [(&str, &str); 11] = [
    ("rdf", "http://www.w3.org/1999/02/22-rdf-syntax-ns#"),
    ("rdfs", "http://www.w3.org/2000/01/rdf-schema#"),
    ("xsd", "http://www.w3.org/2001/XMLSchema#"),
    ("skos", "http://www.w3.org/2004/02/skos/core#"),
    ("ontolex", "http://www.w3.org/ns/lemon/ontolex#"),
    ("lexinfo", "http://www.lexinfo.net/ontology/3.0/lexinfo#"),
    ("wn", "https://globalwordnet.github.io/schemas/wn#"),
    ("dn", "https://wordnet.dk/dannet/data/"),
    ("dns", "https://wordnet.dk/dannet/schema/"),
    ("dnc", "https://wordnet.dk/dannet/concepts/"),
    ("dc", "http://purl.org/dc/terms/"),
];

/// IRI base for identifiers that carry no namespace (verbatim legacy tokens).
pub const LEGACY_BASE: &str = "urn:x-legacy:";

/// Language tag of every literal taken from the legacy dataset.
pub const LANGUAGE: &str = "da";

pub const RDF_TYPE: &str = "rdf:type";
pub const RDF_VALUE: &str = "rdf:value";
pub const RDF_STATEMENT: &str = "rdf:Statement";
pub const RDF_SUBJECT: &str = "rdf:subject";
pub const RDF_PREDICATE: &str = "rdf:predicate";
pub const RDF_OBJECT: &str = "rdf:object";
pub const RDFS_LABEL: &str = "rdfs:label";
pub const RDFS_COMMENT: &str = "rdfs:comment";
pub const SKOS_DEFINITION: &str = "skos:definition";

pub const ONTOLEX_LEXICAL_CONCEPT: &str = "ontolex:LexicalConcept";
pub const ONTOLEX_LEXICAL_SENSE: &str = "ontolex:LexicalSense";
pub const ONTOLEX_WORD: &str = "ontolex:Word";
pub const ONTOLEX_MULTIWORD_EXPRESSION: &str = "ontolex:MultiwordExpression";
pub const ONTOLEX_AFFIX: &str = "ontolex:Affix";
pub const ONTOLEX_FORM: &str = "ontolex:Form";
pub const ONTOLEX_CANONICAL_FORM: &str = "ontolex:canonicalForm";
pub const ONTOLEX_WRITTEN_REP: &str = "ontolex:writtenRep";
pub const ONTOLEX_SENSE: &str = "ontolex:sense";
pub const ONTOLEX_IS_SENSE_OF: &str = "ontolex:isSenseOf";
pub const ONTOLEX_EVOKES: &str = "ontolex:evokes";
pub const ONTOLEX_LEXICALIZED_SENSE: &str = "ontolex:lexicalizedSense";
pub const ONTOLEX_IS_LEXICALIZED_SENSE_OF: &str = "ontolex:isLexicalizedSenseOf";

pub const LEXINFO_PART_OF_SPEECH: &str = "lexinfo:partOfSpeech";
pub const LEXINFO_USAGE_NOTE: &str = "lexinfo:usageNote";
pub const LEXINFO_SENSE_EXAMPLE: &str = "lexinfo:senseExample";
pub const LEXINFO_DATING: &str = "lexinfo:dating";
pub const LEXINFO_OLD: &str = "lexinfo:old";
pub const LEXINFO_FREQUENCY: &str = "lexinfo:frequency";
pub const LEXINFO_RARELY_USED: &str = "lexinfo:rarelyUsed";
pub const LEXINFO_REGISTER: &str = "lexinfo:register";
pub const LEXINFO_TECHNICAL_REGISTER: &str = "lexinfo:technicalRegister";
pub const LEXINFO_SLANG_REGISTER: &str = "lexinfo:slangRegister";

pub const DNS_ONTOLOGICAL_TYPE: &str = "dns:ontologicalType";
pub const DNS_ONTOLOGICAL_TYPE_COMPOSITE: &str = "dns:ontologicalTypeComposite";
pub const DNS_ORTHOGONAL_HYPERNYM: &str = "dns:orthogonalHypernym";

/// Legacy relation tokens and the canonical relation each one maps to.
pub const DANNET_RELATIONS: [(&str, &str); 35] = [
    ("has_hyperonym", "wn:hypernym"),
    ("has_hyponym", "wn:hyponym"),
    ("eq_has_hyperonym", "dns:eqHypernym"),
    ("eq_has_hyponym", "dns:eqHyponym"),
    ("eq_has_synonym", "wn:eq_synonym"),
    ("near_synonym", "wn:similar"),
    ("xpos_near_synonym", "dns:xposNearSynonym"),
    ("near_antonym", "wn:antonym"),
    ("has_holo_part", "wn:holo_part"),
    ("has_mero_part", "wn:mero_part"),
    ("has_holo_member", "wn:holo_member"),
    ("has_mero_member", "wn:mero_member"),
    ("has_holo_madeof", "wn:holo_substance"),
    ("has_mero_madeof", "wn:mero_substance"),
    ("has_holo_location", "wn:holo_location"),
    ("has_mero_location", "wn:mero_location"),
    ("role_agent", "wn:agent"),
    ("involved_agent", "wn:involved_agent"),
    ("role_patient", "wn:patient"),
    ("involved_patient", "wn:involved_patient"),
    ("role_instrument", "wn:instrument"),
    ("involved_instrument", "wn:involved_instrument"),
    ("role_location", "wn:location"),
    ("involved_location", "wn:involved_location"),
    ("role_result", "wn:result"),
    ("involved_result", "wn:involved_result"),
    ("causes", "wn:causes"),
    ("is_caused_by", "wn:is_caused_by"),
    ("entails", "wn:entails"),
    ("is_entailed_by", "wn:is_entailed_by"),
    ("subevent", "wn:subevent"),
    ("is_subevent_of", "wn:is_subevent_of"),
    ("domain", "wn:has_domain_topic"),
    ("used_for", "dns:usedFor"),
    ("used_for_object", "dns:usedForObject"),
];

/// Legacy part-of-speech values (lowercased) and their lexinfo counterparts.
const PARTS_OF_SPEECH: [(&str, &str); 10] = [
    ("noun", "lexinfo:noun"),
    ("verb", "lexinfo:verb"),
    ("adjective", "lexinfo:adjective"),
    ("adverb", "lexinfo:adverb"),
    ("pronoun", "lexinfo:pronoun"),
    ("preposition", "lexinfo:preposition"),
    ("conjunction", "lexinfo:conjunction"),
    ("interjection", "lexinfo:interjection"),
    ("numeral", "lexinfo:numeral"),
    ("article", "lexinfo:article"),
];

/// Part-of-speech patch for word rows exported as "none", keyed by word id.
///
/// FIXTURE DATA: these ids are not taken from a DanNet export. They exercise the
/// patch mechanism only, and no real row is patched until the table is replaced
/// with the ids of the export being migrated.
const PART_OF_SPEECH_PATCHES: [(&str, &str); 10] = [
    ("11007960", "Noun"),
    ("11010717", "Noun"),
    ("11014578", "Adjective"),
    ("11018390", "Noun"),
    ("11021336", "Verb"),
    ("11025478", "Noun"),
    ("11028802", "Adverb"),
    ("11032945", "Noun"),
    ("11036640", "Adjective"),
    ("11040712", "Noun"),
];

/// Register markers: the patterns recognized in free-text register annotations
/// (matched case-insensitively at a word start) and the annotation each implies.
pub const REGISTER_MARKERS: [(&str, &str, &str); 4] = [
    (r"gl\.|gammeldags|old-fashioned", LEXINFO_DATING, LEXINFO_OLD),
    (r"sj\.|sjælden|rare", LEXINFO_FREQUENCY, LEXINFO_RARELY_USED),
    (r"fagspr|jargon", LEXINFO_REGISTER, LEXINFO_TECHNICAL_REGISTER),
    (r"slang", LEXINFO_REGISTER, LEXINFO_SLANG_REGISTER),
];

lazy_static! {
    static ref DANNET: RelationVocabulary = RelationVocabulary::from_pairs(DANNET_RELATIONS);
    static ref POS: HashMap<&'static str, &'static str> = PARTS_OF_SPEECH.into_iter().collect();
    static ref POS_PATCHES: HashMap<&'static str, &'static str> =
        PART_OF_SPEECH_PATCHES.into_iter().collect();
}

// ------------- RelationVocabulary -------------
/// Bidirectional mapping between legacy relation tokens and canonical relations.
#[derive(Debug, Clone)]
pub struct RelationVocabulary {
    relations: BiMap<String, Resource>,
}

impl RelationVocabulary {
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut relations = BiMap::new();
        for (token, relation) in pairs {
            relations.insert(token.to_string(), Resource::new(relation));
        }
        Self { relations }
    }
    /// The built-in DanNet table.
    pub fn dannet() -> &'static RelationVocabulary {
        &DANNET
    }
    pub fn lookup(&self, token: &str) -> Option<&Resource> {
        self.relations.get_by_left(token)
    }
    /// Reverse lookup: the legacy token a canonical relation came from.
    pub fn token(&self, relation: &Resource) -> Option<&str> {
        self.relations.get_by_right(relation).map(String::as_str)
    }
    pub fn len(&self) -> usize {
        self.relations.len()
    }
    pub fn is_empty(&self) -> bool {
        self.relations.is_empty()
    }
}

pub fn part_of_speech(legacy: &str) -> Option<Resource> {
    POS.get(legacy.trim().to_lowercase().as_str())
        .map(|pos| Resource::new(*pos))
}

/// Corrected legacy part of speech for one of the patched word rows
/// (see the fixture note on the patch table).
pub fn part_of_speech_patch(word_key: &str) -> Option<&'static str> {
    POS_PATCHES.get(word_key).copied()
}
