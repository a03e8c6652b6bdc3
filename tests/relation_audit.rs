use lexgraph::audit::relation_audit;
use lexgraph::dataset::DatasetStore;
use lexgraph::memory::MemoryStore;
use lexgraph::migrate::Pipeline;
use lexgraph::record::{Record, RecordKind};
use lexgraph::vocabulary::RelationVocabulary;

fn relation(source: &str, token: &str, target: &str) -> Record {
    Record::new(RecordKind::Relation, 1, [source, "_", token, target, "taxonomic", "_"])
}

#[test]
fn audit_counts_mapped_relations_by_legacy_token() {
    let store = MemoryStore::new();
    let records = vec![
        relation("1", "has_hyperonym", "2"),
        relation("3", "has_hyperonym", "2"),
        relation("1", "near_synonym", "4"),
    ];
    Pipeline::new(&store, RelationVocabulary::dannet()).run(&records).unwrap();
    let audit = relation_audit(&store, RelationVocabulary::dannet()).unwrap();
    assert_eq!(audit.mapped.get("has_hyperonym"), Some(&2));
    assert_eq!(audit.mapped.get("near_synonym"), Some(&1));
    assert!(audit.is_clean());
}

#[test]
fn audit_surfaces_tokens_kept_verbatim() {
    let store = DatasetStore::new();
    let records = vec![
        relation("1", "has_frobnicator", "2"),
        relation("2", "has_frobnicator", "3"),
        relation("1", "has_hyperonym", "2"),
    ];
    let report = Pipeline::new(&store, RelationVocabulary::dannet()).run(&records).unwrap();
    let audit = relation_audit(&store, RelationVocabulary::dannet()).unwrap();
    assert!(!audit.is_clean());
    assert_eq!(audit.unmapped.get("has_frobnicator"), Some(&2));
    assert_eq!(report.unmapped.get("has_frobnicator"), Some(&2));
    assert_eq!(audit.mapped.get("has_hyperonym"), Some(&1));
}
