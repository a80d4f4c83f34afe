use metacat_model::{
    DataType, Field, TagLabel, clone_without_tags, find_path, find_path_mut, set_field_fqn,
};
use pretty_assertions::assert_eq;

fn payload_tree() -> Vec<Field> {
    vec![
        Field::new("id", DataType::Int).with_tags(vec![TagLabel::classification("PII.None")]),
        Field::new("payload", DataType::Record)
            .with_description("order payload")
            .with_tags(vec![TagLabel::classification("Tier.Tier1")])
            .with_children(vec![
                Field::new("x", DataType::String)
                    .with_tags(vec![TagLabel::classification("PII.Sensitive")]),
                Field::new("a.b", DataType::Long)
                    .with_tags(vec![TagLabel::classification("PII.Sensitive")])
                    .with_children(vec![Field::new("leaf", DataType::Boolean)]),
            ]),
    ]
}

// ── FQN propagation ──────────────────────────────────────────────

#[test]
fn set_field_fqn_recurses_with_parent_fqn() {
    let mut fields = payload_tree();
    set_field_fqn("kafka.orders", &mut fields);

    assert_eq!(fields[0].fqn(), "kafka.orders.id");
    assert_eq!(fields[1].fqn(), "kafka.orders.payload");
    assert_eq!(fields[1].children[0].fqn(), "kafka.orders.payload.x");
    assert_eq!(fields[1].children[1].fqn(), "kafka.orders.payload.\"a.b\"");
    assert_eq!(
        fields[1].children[1].children[0].fqn(),
        "kafka.orders.payload.\"a.b\".leaf"
    );
}

#[test]
fn set_field_fqn_follows_renamed_ancestor() {
    let mut fields = payload_tree();
    set_field_fqn("kafka.orders", &mut fields);
    fields[1].name = "body".to_string();
    set_field_fqn("kafka.orders", &mut fields);
    assert_eq!(fields[1].children[0].fqn(), "kafka.orders.body.x");
}

#[test]
fn fqn_falls_back_to_name() {
    let f = Field::new("loose", DataType::Int);
    assert_eq!(f.fqn(), "loose");
}

// ── Tag stripping and collection ─────────────────────────────────

#[test]
fn clone_without_tags_drops_tags_at_every_level() {
    let mut fields = payload_tree();
    set_field_fqn("kafka.orders", &mut fields);
    let copy = clone_without_tags(&fields);

    assert_eq!(copy.len(), 2);
    for root in &copy {
        root.visit(&mut |f| assert!(f.tags.is_empty(), "{} kept tags", f.name));
    }
    assert_eq!(copy[1].description.as_deref(), Some("order payload"));
    assert_eq!(copy[1].children[1].fqn(), fields[1].children[1].fqn());
    // Source untouched.
    assert_eq!(fields[1].tags.len(), 1);
}

#[test]
fn all_tags_collapses_duplicates() {
    let fields = payload_tree();
    let tags = fields[1].all_tags();
    assert_eq!(tags.len(), 2);
    assert!(tags.contains(&TagLabel::classification("Tier.Tier1")));
    assert!(tags.contains(&TagLabel::classification("PII.Sensitive")));
}

#[test]
fn all_tags_of_leaf_is_own_tags() {
    let fields = payload_tree();
    let tags = fields[0].all_tags();
    assert_eq!(tags.len(), 1);
}

// ── Path lookup ──────────────────────────────────────────────────

#[test]
fn find_path_resolves_nested_fields() {
    let fields = payload_tree();
    let leaf = find_path(&fields, &["payload", "a.b", "leaf"]).unwrap();
    assert_eq!(leaf.data_type, DataType::Boolean);
    assert!(find_path(&fields, &["payload", "leaf"]).is_none());
    assert!(find_path::<&str>(&fields, &[]).is_none());
}

#[test]
fn find_path_mut_allows_edits() {
    let mut fields = payload_tree();
    find_path_mut(&mut fields, &["payload", "x"]).unwrap().description = Some("edited".into());
    assert_eq!(fields[1].children[0].description.as_deref(), Some("edited"));
}

// ── Serde ────────────────────────────────────────────────────────

#[test]
fn serde_uses_camel_case_and_skips_empty() {
    let f = Field::new("id", DataType::Int).with_data_type_display("int");
    let json = serde_json::to_value(&f).unwrap();
    assert_eq!(
        json,
        serde_json::json!({"name": "id", "dataType": "INT", "dataTypeDisplay": "int"})
    );
}

#[test]
fn unknown_data_type_deserializes() {
    let f: Field = serde_json::from_str(r#"{"name":"g","dataType":"GEO_SHAPE"}"#).unwrap();
    assert_eq!(f.data_type, DataType::Unknown);
    assert!(f.children.is_empty());
}
