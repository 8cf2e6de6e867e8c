//! Requirement propagation through the public schema API.

use vouch_schema::{Policy, Scalar, SchemaBuilder, ValidationFn};

fn identity() -> ValidationFn {
    ValidationFn::from_fn(|v, _| Ok(v))
}

#[test]
fn test_binding_after_negative_answer_is_seen() {
    let mut builder = SchemaBuilder::new();
    let string = builder.scalar(Scalar::String);
    let tag = builder.composite("Tag").expect("Tag");
    let label = builder.field(tag, "label", string).expect("label");
    let post = builder.composite("Post").expect("Post");
    let tags = builder.list_of(tag);
    let required_tags = builder.required(tags);
    builder.field(post, "tags", required_tags).expect("tags");
    let mut schema = builder.finish();

    assert!(!schema.requires_validation(post));
    assert!(!schema.requires_validation(tag));

    schema
        .bind(label, Some(identity()), Some(Policy::Resolver))
        .expect("bind");
    assert!(schema.requires_validation(tag));
    assert!(schema.requires_validation(post));
}

#[test]
fn test_policy_only_binding_flags_container() {
    let mut builder = SchemaBuilder::new();
    let int = builder.scalar(Scalar::Int);
    let inner = builder.composite("Inner").expect("Inner");
    let n = builder.field(inner, "n", int).expect("n");
    let outer = builder.composite("Outer").expect("Outer");
    builder.field(outer, "inner", inner).expect("inner");
    let mut schema = builder.finish();

    schema.bind(n, None, Some(Policy::Throw)).expect("bind");
    assert!(schema.binding(n).validation.is_none());
    assert!(schema.requires_validation(inner));
    assert!(schema.requires_validation(outer));
}

#[test]
fn test_argument_types_drive_argument_requirement() {
    let mut builder = SchemaBuilder::new();
    let int = builder.scalar(Scalar::Int);
    let filter = builder.composite("Filter").expect("Filter");
    let min = builder.field(filter, "min", int).expect("min");
    let query = builder.composite("Query").expect("Query");
    let search = builder.field(query, "search", int).expect("search");
    builder.argument(search, "filter", filter).expect("filter");
    let mut schema = builder.finish();

    assert!(!schema.arguments_require_validation(search));
    schema.bind(min, Some(identity()), None).expect("bind");
    assert!(schema.arguments_require_validation(search));
}

#[test]
fn test_type_display_and_lookup() {
    let mut builder = SchemaBuilder::new();
    let int = builder.scalar(Scalar::Int);
    let required = builder.required(int);
    let list = builder.list_of(required);
    let outer = builder.required(list);
    let color = builder
        .enumeration("Color", ["RED", "GREEN"])
        .expect("Color");
    let schema = builder.finish();

    assert_eq!(schema.type_display(outer), "[Int!]!");
    assert_eq!(schema.type_named("Color"), Some(color));
    assert!(schema.contains_required_deep(list));
    assert_eq!(schema.final_type(outer), int);
    assert_eq!(schema.kind(color).kind_name(), "enum");
}
