use super::*;

fn record(name: &str, personnel_id: Option<&str>) -> FaceRecord {
    FaceRecord::new(name, &[1.0, 0.0], personnel_id.map(str::to_string))
        .expect("record must be valid")
}

#[test]
fn new_normalizes_embedding() {
    let record = FaceRecord::new("Alice", &[0.0, 3.0, 4.0], None).expect("must succeed");
    assert_eq!(record.embedding, vec![0.0, 0.6, 0.8]);
    assert_eq!(record.dimension(), 3);
}

#[test]
fn new_rejects_blank_name() {
    let error = FaceRecord::new("   ", &[1.0], None).expect_err("must fail");
    assert_eq!(error, ValidationError::BlankName);
}

#[test]
fn new_rejects_unnormalizable_embeddings() {
    let error = FaceRecord::new("Alice", &[], None).expect_err("must fail");
    assert_eq!(error, ValidationError::EmptyEmbedding);

    let error = FaceRecord::new("Alice", &[0.0, 0.0], None).expect_err("must fail");
    assert_eq!(error, ValidationError::ZeroNorm);

    let error = FaceRecord::new("Alice", &[1.0, f32::NAN], None).expect_err("must fail");
    assert_eq!(error, ValidationError::NonFiniteValue { index: 1 });
}

#[test]
fn empty_personnel_id_is_stored_as_absent() {
    let record = FaceRecord::new("Alice", &[1.0], Some(String::new())).expect("must succeed");
    assert_eq!(record.personnel_id, None);
}

#[test]
fn absent_personnel_id_only_matches_absent() {
    let without = record("Alice", None);
    let with = record("Alice", Some("P-1"));

    assert!(without.belongs_to("Alice", None));
    assert!(!without.belongs_to("Alice", Some("")));
    assert!(!without.belongs_to("Alice", Some("P-1")));

    assert!(with.belongs_to("Alice", Some("P-1")));
    assert!(!with.belongs_to("Alice", None));
    assert!(!with.belongs_to("alice", Some("P-1")));

    assert!(Identity::new("Alice", None).matches(&without));
    assert!(!Identity::new("Alice", None).matches(&with));
}

#[test]
fn personnel_id_is_omitted_from_json_when_absent() {
    let json = serde_json::to_value(record("Alice", None)).expect("must serialize");
    assert!(json.get("personnel_id").is_none());

    let json = serde_json::to_value(record("Bob", Some("P-7"))).expect("must serialize");
    assert_eq!(json["personnel_id"], "P-7");
}

#[test]
fn summarize_groups_and_sorts_identities() {
    let records = vec![
        record("Bob", None),
        record("Alice", Some("P-2")),
        record("Alice", None),
        record("Bob", None),
        record("Alice", Some("P-1")),
        record("Alice", Some("P-2")),
    ];

    let summary = summarize(&records);
    let flattened: Vec<(&str, Option<&str>, usize)> = summary
        .iter()
        .map(|entry| {
            (
                entry.name.as_str(),
                entry.personnel_id.as_deref(),
                entry.sample_count,
            )
        })
        .collect();

    assert_eq!(
        flattened,
        vec![
            ("Alice", None, 1),
            ("Alice", Some("P-1"), 1),
            ("Alice", Some("P-2"), 2),
            ("Bob", None, 2),
        ]
    );
}

#[test]
fn summarize_empty_store_is_empty() {
    assert!(summarize(&[]).is_empty());
}

#[test]
fn identity_display_includes_personnel_id() {
    assert_eq!(Identity::new("Alice", None).to_string(), "Alice");
    assert_eq!(
        Identity::new("Alice", Some("P-1".to_string())).to_string(),
        "Alice (P-1)"
    );
}
