use lexgraph::LexgraphError;
use lexgraph::construct::{BlankArena, Literal, Resource, Term, Triple, TripleSet};
use lexgraph::migrate::migrate;
use lexgraph::mint;
use lexgraph::ntriples;
use lexgraph::record::{Record, RecordKind};
use lexgraph::vocabulary::RelationVocabulary;

#[test]
fn every_term_kind_survives_a_round_trip() {
    let mut arena = BlankArena::new("sense-21");
    let note = arena.fresh();
    let mut triples = TripleSet::new();
    triples.add(mint::sense_id("21"), Resource::new("lexinfo:usageNote"), note.clone());
    triples.add(note, Resource::new("rdf:value"), Literal::lang("gl., \"sj.\"\n\tback\\slash", "da"));
    triples.add(mint::form_id("7", "citron/citronen"), Resource::new("ontolex:writtenRep"), Literal::lang("citron", "da"));
    triples.add(mint::word_id("1"), Resource::new("rdfs:label"), Literal::lang("gå ud", "da"));
    triples.add(
        mint::synset_id("7"),
        Resource::new("dns:ontologicalTypeComposite"),
        Literal::new("Artifact-Liquid"),
    );
    triples.add(
        mint::synset_id("7"),
        Resource::new("dns:frequency"),
        Literal::typed("12", Resource::new("xsd:integer")),
    );
    triples.add(mint::synset_id("7"), Resource::new("has_frobnicator"), mint::synset_id("8"));

    let text = ntriples::to_string(&triples);
    assert_eq!(text.lines().count(), triples.len());
    assert_eq!(ntriples::parse(&text).unwrap(), triples);

    let mut written = Vec::new();
    ntriples::write(&triples, &mut written).unwrap();
    assert_eq!(ntriples::read(written.as_slice()).unwrap(), triples);
}

#[test]
fn migrated_graph_round_trips_with_the_same_digest() {
    let records = vec![
        Record::new(RecordKind::Synset, 1, ["999", "birk", "et træ (Brug: \"en birk\")", "Natural-Plant", ""]),
        Record::new(RecordKind::Word, 1, ["12", "birk", "Noun", ""]),
        Record::new(RecordKind::Sense, 1, ["21", "12", "999", "gl.", ""]),
        Record::new(RecordKind::Relation, 1, ["999", "_", "xpos_near_synonym", "12", "taxonomic", "synset with id 4"]),
    ];
    let migration = migrate(&records, RelationVocabulary::dannet()).unwrap();
    let parsed = ntriples::parse(&ntriples::to_string(&migration.triples)).unwrap();
    assert_eq!(parsed.digest(), migration.report.digest);
}

#[test]
fn resources_are_written_as_full_iris() {
    let mut triples = TripleSet::new();
    triples.add(mint::synset_id("1"), Resource::new("has_frobnicator"), mint::synset_id("2"));
    let text = ntriples::to_string(&triples);
    assert!(text.contains("<urn:x-legacy:has_frobnicator>"));
    assert!(!text.contains("<dn:"));
    assert_eq!(
        ntriples::parse_term(&ntriples::encode_resource(&Resource::new("wn:hypernym"))).unwrap(),
        Term::from(Resource::new("wn:hypernym"))
    );
}

#[test]
fn comments_and_blank_lines_are_ignored() {
    let text = "# header\n\n<urn:x-legacy:a> <urn:x-legacy:b> \"c\"@DA . # trailing\n";
    let triples = ntriples::parse(text).unwrap();
    assert!(triples.contains(&Triple::new(
        Resource::new("a"),
        Resource::new("b"),
        Literal::lang("c", "da")
    )));
    assert_eq!(triples.len(), 1);
}

#[test]
fn syntax_error_reports_its_line() {
    let text = "<urn:x-legacy:a> <urn:x-legacy:b> <urn:x-legacy:c> .\n<urn:x-legacy:a> <urn:x-legacy:b> .\n";
    match ntriples::parse(text) {
        Err(LexgraphError::Parse { line, .. }) => assert_eq!(line, Some(2)),
        other => panic!("expected a parse error, got {:?}", other),
    }
}

#[test]
fn unscoped_blank_label_is_rejected() {
    let text = "_:anonymous <urn:x-legacy:b> \"c\" .\n";
    assert!(matches!(
        ntriples::parse(text),
        Err(LexgraphError::Parse { line: Some(1), .. })
    ));
}
