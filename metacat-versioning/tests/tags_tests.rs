use metacat_model::{DataType, Field, LabelType, TagLabel, set_field_fqn};
use metacat_versioning::{CatalogConfig, TagPropagator, TagRegistry, ValidationError};
use pretty_assertions::assert_eq;

fn propagator() -> TagPropagator {
    let config = CatalogConfig::from_toml_str(
        r#"
        [[classifications]]
        name = "PII"
        mutually_exclusive = true

        [[classifications]]
        name = "Tier"

        [[glossary]]
        term = "Business.Customer"
        related_tags = ["PII.Sensitive", "Domain.Sales"]
        "#,
    )
    .unwrap();
    TagPropagator::new(TagRegistry::from_config(&config))
}

// ── Derived tags ─────────────────────────────────────────────────

#[test]
fn glossary_terms_add_related_tags() {
    let tags = propagator().add_derived_tags(&[TagLabel::glossary("Business.Customer")]);
    let fqns: Vec<&str> = tags.iter().map(|t| t.tag_fqn.as_str()).collect();
    assert_eq!(fqns, vec!["Business.Customer", "Domain.Sales", "PII.Sensitive"]);

    let derived = tags.iter().find(|t| t.tag_fqn == "PII.Sensitive").unwrap();
    assert_eq!(derived.label_type, LabelType::Derived);
}

#[test]
fn derived_tags_do_not_duplicate_manual_ones() {
    let tags = propagator().add_derived_tags(&[
        TagLabel::classification("PII.Sensitive"),
        TagLabel::glossary("Business.Customer"),
    ]);
    assert_eq!(tags.iter().filter(|t| t.tag_fqn == "PII.Sensitive").count(), 1);
    let kept = tags.iter().find(|t| t.tag_fqn == "PII.Sensitive").unwrap();
    assert_eq!(kept.label_type, LabelType::Manual);
}

#[test]
fn classification_tags_derive_nothing() {
    let tags = propagator().add_derived_tags(&[TagLabel::classification("Business.Customer")]);
    assert_eq!(tags.len(), 1);
}

#[test]
fn field_tree_gets_derived_tags_at_every_level() {
    let mut fields = vec![Field::new("payload", DataType::Record).with_children(vec![
        Field::new("customer", DataType::String).with_tags(vec![TagLabel::glossary("Business.Customer")]),
    ])];
    propagator().add_derived_field_tags(&mut fields);
    assert!(fields[0].tags.is_empty());
    assert_eq!(fields[0].children[0].tags.len(), 3);
}

// ── Mutual exclusivity ───────────────────────────────────────────

#[test]
fn two_tags_of_exclusive_classification_fail() {
    let err = propagator()
        .check_mutually_exclusive(
            "kafka.orders",
            &[TagLabel::classification("PII.Sensitive"), TagLabel::classification("PII.None")],
        )
        .unwrap_err();
    match err {
        ValidationError::MutuallyExclusiveTags { target, first, second } => {
            assert_eq!(target, "kafka.orders");
            assert_eq!(first, "PII.Sensitive");
            assert_eq!(second, "PII.None");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn non_exclusive_classification_allows_several() {
    propagator()
        .check_mutually_exclusive(
            "kafka.orders",
            &[TagLabel::classification("Tier.Tier1"), TagLabel::classification("Tier.Tier2")],
        )
        .unwrap();
}

#[test]
fn repeated_tag_is_not_a_conflict() {
    propagator()
        .check_mutually_exclusive(
            "kafka.orders",
            &[TagLabel::classification("PII.Sensitive"), TagLabel::classification("PII.Sensitive")],
        )
        .unwrap();
}

#[test]
fn field_validation_names_nested_field() {
    let mut fields = vec![Field::new("payload", DataType::Record).with_children(vec![
        Field::new("card", DataType::String).with_tags(vec![
            TagLabel::classification("PII.Sensitive"),
            TagLabel::classification("PII.NonSensitive"),
        ]),
    ])];
    set_field_fqn("kafka.orders", &mut fields);

    let err = propagator().validate_field_tags(&fields).unwrap_err();
    assert!(matches!(
        err,
        ValidationError::MutuallyExclusiveTags { ref target, .. } if target == "kafka.orders.payload.card"
    ));
}
