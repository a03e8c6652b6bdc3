use lexgraph::construct::{Literal, Node, Resource, Term, Triple, TripleSet};
use lexgraph::memory::MemoryStore;
use lexgraph::mint;
use lexgraph::projection::{Entity, Navigation, Value, entity, expanded_entity, reverse_lookup};
use lexgraph::store::Store;

fn r(id: &str) -> Resource {
    Resource::new(id)
}
fn da(value: &str) -> Literal {
    Literal::lang(value, "da")
}
fn node(resource: Resource) -> Node {
    Node::from(resource)
}

/// Two synsets, one hypernym between them, a shared label and a few labelled predicates.
fn populated() -> MemoryStore {
    let birk = mint::synset_id("999");
    let tree = mint::synset_id("500");
    let other = mint::synset_id("501");
    let mut triples = TripleSet::new();
    triples.add(birk.clone(), r("rdfs:label"), da("birk"));
    triples.add(birk.clone(), r("rdf:type"), r("ontolex:LexicalConcept"));
    triples.add(birk.clone(), r("dns:ontologicalType"), mint::facet_id("Natural"));
    triples.add(birk.clone(), r("dns:ontologicalType"), mint::facet_id("Plant"));
    triples.add(birk.clone(), r("wn:hypernym"), tree.clone());
    triples.add(birk.clone(), r("dns:synonym"), da("birketræ"));
    triples.add(birk.clone(), r("dns:synonym"), da("løvtræ"));
    triples.add(tree.clone(), r("rdfs:label"), da("træ"));
    triples.add(tree.clone(), r("rdfs:label"), da("plante"));
    triples.add(other.clone(), r("dns:synonym"), da("løvtræ"));
    triples.add(r("wn:hypernym"), r("rdfs:label"), Literal::lang("hypernym", "en"));
    triples.add(mint::facet_id("Plant"), r("rdfs:label"), Literal::lang("Plant", "en"));
    MemoryStore::from_triples(&triples)
}

#[test]
fn single_and_multi_valued_properties_differ_in_shape() {
    let store = populated();
    let birk = entity(&store, &node(mint::synset_id("999"))).unwrap().unwrap();
    assert_eq!(birk.subject(), &node(mint::synset_id("999")));
    assert_eq!(birk.get(&r("rdfs:label")), Some(&Value::One(Term::from(da("birk")))));
    let facets = birk.get(&r("dns:ontologicalType")).unwrap();
    assert!(facets.is_many());
    assert_eq!(facets.len(), 2);
    assert!(facets.one().is_none());
    assert!(birk.get(&r("skos:definition")).is_none());
}

#[test]
fn absent_subject_projects_to_nothing() {
    let store = populated();
    assert!(entity(&store, &node(mint::synset_id("404"))).unwrap().is_none());
}

#[test]
fn projection_matches_a_fold_over_the_store() {
    let store = populated();
    let subject = node(mint::synset_id("999"));
    let projected = entity(&store, &subject).unwrap().unwrap();
    let folded: usize = projected.properties().values().map(Value::len).sum();
    let direct = store
        .triples()
        .unwrap()
        .iter()
        .filter(|triple| triple.subject() == &subject)
        .count();
    assert_eq!(folded, direct);
}

#[test]
fn fold_is_order_independent_and_never_a_singleton_set() {
    let one = Term::from(da("a"));
    let two = Term::from(da("b"));
    let forward = Value::One(one.clone()).fold(two.clone());
    let backward = Value::One(two.clone()).fold(one.clone());
    assert_eq!(forward, backward);
    assert_eq!(Value::One(one.clone()).fold(one.clone()), Value::One(one));
}

#[test]
fn projection_is_the_same_for_every_triple_order() {
    let birk = mint::synset_id("999");
    let triples = vec![
        Triple::new(birk.clone(), r("rdfs:label"), da("birk")),
        Triple::new(birk.clone(), r("dns:ontologicalType"), mint::facet_id("Natural")),
        Triple::new(birk.clone(), r("dns:synonym"), da("birketræ")),
        Triple::new(birk.clone(), r("dns:ontologicalType"), mint::facet_id("Plant")),
        Triple::new(mint::synset_id("500"), r("rdfs:label"), da("træ")),
        Triple::new(birk.clone(), r("dns:synonym"), da("løvtræ")),
        Triple::new(birk.clone(), r("dns:ontologicalType"), mint::facet_id("Natural")),
    ];
    let expected = Entity::from_triples(node(birk.clone()), triples.clone()).unwrap();
    assert_eq!(expected.properties().len(), 3);
    assert!(expected.get(&r("rdfs:label")).is_some_and(|value| !value.is_many()));
    assert_eq!(expected.get(&r("dns:ontologicalType")).map(Value::len), Some(2));

    // every rotation, each forwards and backwards
    for shift in 0..triples.len() {
        let mut rotated = triples.clone();
        rotated.rotate_left(shift);
        assert_eq!(Entity::from_triples(node(birk.clone()), rotated.clone()).as_ref(), Some(&expected));
        rotated.reverse();
        assert_eq!(Entity::from_triples(node(birk.clone()), rotated).as_ref(), Some(&expected));
    }
}

#[test]
fn navigation_follows_the_value_shape() {
    let store = populated();
    let birk = entity(&store, &node(mint::synset_id("999"))).unwrap().unwrap();

    match birk.navigate(&store, &r("wn:hypernym")).unwrap() {
        Navigation::Entity(Some(tree)) => assert_eq!(tree.subject(), &node(mint::synset_id("500"))),
        other => panic!("expected the hypernym entity, got {:?}", other),
    }
    assert_eq!(
        birk.navigate(&store, &r("rdfs:label")).unwrap(),
        Navigation::Literal(da("birk"))
    );
    match birk.navigate(&store, &r("dns:synonym")).unwrap() {
        Navigation::Subjects(subjects) => {
            assert!(subjects.contains(&node(mint::synset_id("999"))));
            assert!(subjects.contains(&node(mint::synset_id("501"))));
            assert_eq!(subjects.len(), 2);
        }
        other => panic!("expected reverse lookup subjects, got {:?}", other),
    }
    match birk.navigate(&store, &r("dns:ontologicalType")).unwrap() {
        // only Plant has triples of its own
        Navigation::Entities(entities) => assert_eq!(entities.len(), 1),
        other => panic!("expected entities, got {:?}", other),
    }
    assert_eq!(birk.navigate(&store, &r("wn:hyponym")).unwrap(), Navigation::Absent);
}

#[test]
fn reverse_lookup_finds_every_subject_with_the_object() {
    let store = populated();
    let subjects = reverse_lookup(&store, &r("dns:synonym"), da("løvtræ").into()).unwrap();
    assert_eq!(subjects.len(), 2);
    let none = reverse_lookup(&store, &r("dns:synonym"), da("eg").into()).unwrap();
    assert!(none.is_empty());
}

#[test]
fn expanded_entity_carries_labels_where_they_exist() {
    let store = populated();
    let expanded = expanded_entity(&store, &node(mint::synset_id("999"))).unwrap().unwrap();
    assert_eq!(
        Some(&expanded.entity),
        entity(&store, &node(mint::synset_id("999"))).unwrap().as_ref()
    );
    assert_eq!(expanded.labels.get(&r("wn:hypernym")), Some(&Literal::lang("hypernym", "en")));
    // two labels on the hypernym target: the smallest wins
    assert_eq!(expanded.labels.get(&mint::synset_id("500")), Some(&da("plante")));
    assert_eq!(expanded.labels.get(&mint::facet_id("Plant")), Some(&Literal::lang("Plant", "en")));
    // no label, no entry
    assert!(!expanded.labels.contains_key(&mint::facet_id("Natural")));
    assert!(!expanded.labels.contains_key(&r("dns:ontologicalType")));
}

#[test]
fn expanded_entity_of_absent_subject_is_none() {
    let store = populated();
    assert!(expanded_entity(&store, &node(mint::synset_id("404"))).unwrap().is_none());
}

#[test]
fn entity_serializes_as_a_json_object() {
    let store = populated();
    let birk = entity(&store, &node(mint::synset_id("999"))).unwrap().unwrap();
    let json = serde_json::to_value(&birk).unwrap();
    assert_eq!(json["@id"], "dn:synset-999");
    assert_eq!(json["rdfs:label"]["@value"], "birk");
    assert_eq!(json["rdfs:label"]["@language"], "da");
    assert_eq!(json["wn:hypernym"], "dn:synset-500");
    assert!(json["dns:ontologicalType"].is_array());
    assert_eq!(json["dns:ontologicalType"].as_array().unwrap().len(), 2);
}
