use metacat_types::fqn;
use proptest::prelude::*;

#[test]
fn add_joins_with_dot() {
    assert_eq!(fqn::add("kafka.orders", "payload"), "kafka.orders.payload");
}

#[test]
fn add_to_empty_prefix_is_name() {
    assert_eq!(fqn::add("", "kafka"), "kafka");
}

#[test]
fn add_quotes_dotted_names() {
    assert_eq!(fqn::add("kafka.orders", "a.b"), "kafka.orders.\"a.b\"");
}

#[test]
fn quote_name_leaves_already_quoted() {
    assert_eq!(fqn::quote_name("\"a.b\""), "\"a.b\"");
    assert_eq!(fqn::quote_name("plain"), "plain");
}

#[test]
fn split_honors_quotes() {
    assert_eq!(
        fqn::split("kafka.orders.\"a.b\".c"),
        vec!["kafka", "orders", "a.b", "c"]
    );
}

#[test]
fn split_empty_is_empty() {
    assert!(fqn::split("").is_empty());
}

#[test]
fn parent_drops_last_part() {
    assert_eq!(fqn::parent("PII.Sensitive").as_deref(), Some("PII"));
    assert_eq!(fqn::parent("Glossary.\"x.y\".Term").as_deref(), Some("Glossary.\"x.y\""));
    assert_eq!(fqn::parent("PII"), None);
}

#[test]
fn local_name_strips_prefix() {
    assert_eq!(fqn::local_name("kafka.orders", "kafka.orders.payload.x"), Some("payload.x"));
    assert_eq!(fqn::local_name("kafka.orders", "kafka.ordersX.payload"), None);
}

proptest! {
    #[test]
    fn build_then_split_recovers_parts(parts in prop::collection::vec("[a-z]{1,6}(\\.[a-z]{1,4})?", 1..5)) {
        let built = fqn::build(&parts);
        prop_assert_eq!(fqn::split(&built), parts);
    }
}
