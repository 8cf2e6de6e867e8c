//! Failure policy: recovery, propagation, required dominance and dedup.

use std::sync::Arc;

use serde_json::json;
use vouch::schema::{Policy, Scalar, SchemaBuilder, ValidationFn};
use vouch::value::Value;
use vouch::{Config, Engine, Failure};

fn reject(message: &'static str) -> ValidationFn {
    ValidationFn::from_value_fn(move |_, _| Err(message.into()))
}

fn nullify() -> ValidationFn {
    ValidationFn::from_value_fn(|_, _| Ok(Value::Null))
}

#[test]
fn test_required_violation_ignores_resolver() {
    let mut builder = SchemaBuilder::new();
    let int = builder.scalar(Scalar::Int);
    let required = builder.required(int);
    let entry = builder.entry("id", required).expect("id");
    let mut schema = builder.finish();
    schema
        .bind(entry, Some(nullify()), Some(Policy::Resolver))
        .expect("bind");
    let engine = Engine::new(Arc::new(schema));

    let rejection = engine
        .validate_entry(entry, Some(Value::from(1)), None, &())
        .expect_err("required");
    assert_eq!(rejection.message, "Expected non-null value of type Int!");
    assert!(matches!(
        *rejection.cause,
        Failure::RequiredViolation { .. }
    ));
}

#[test]
fn test_optional_field_recovers_inside_composite() {
    let mut builder = SchemaBuilder::new();
    let string = builder.scalar(Scalar::String);
    let user = builder.composite("User").expect("User");
    builder.field(user, "name", string).expect("name");
    let email = builder.field(user, "email", string).expect("email");
    let entry = builder.entry("user", user).expect("user");
    let mut schema = builder.finish();
    schema
        .bind(email, Some(reject("invalid email")), Some(Policy::Resolver))
        .expect("bind");
    let engine = Engine::new(Arc::new(schema));

    let out = engine
        .validate_entry(
            entry,
            Some(Value::from(json!({"name": "ann", "email": "nope"}))),
            None,
            &(),
        )
        .expect("recovered");
    assert_eq!(
        out.value,
        Some(Value::from(json!({"name": "ann", "email": null})))
    );
    assert_eq!(out.errors[0].path.to_strings(), vec!["user", "email"]);
    assert_eq!(out.errors[0].to_string(), "invalid email at path user.email");
}

#[test]
fn test_failure_without_policy_is_decided_by_ancestor() {
    let mut builder = SchemaBuilder::new();
    let int = builder.scalar(Scalar::Int);
    let inner = builder.composite("Inner").expect("Inner");
    let x = builder.field(inner, "x", int).expect("x");
    let outer = builder.composite("Outer").expect("Outer");
    let slot = builder.field(outer, "inner", inner).expect("inner");
    let entry = builder.entry("root", outer).expect("root");
    let mut schema = builder.finish();
    schema.bind(x, Some(reject("bad x")), None).expect("bind x");
    schema
        .bind(slot, None, Some(Policy::Resolver))
        .expect("policy only");
    let engine = Engine::new(Arc::new(schema));

    let out = engine
        .validate_entry(entry, Some(Value::from(json!({"inner": {"x": 1}}))), None, &())
        .expect("recovered by ancestor");

    assert_eq!(out.value, Some(Value::from(json!({"inner": null}))));
    // Seen by the failing frame and the recovering one, recorded once.
    assert_eq!(out.errors.len(), 1);
    assert_eq!(out.errors[0].path.to_strings(), vec!["root", "inner", "x"]);
}

#[test]
fn test_failure_without_any_policy_aborts() {
    let mut builder = SchemaBuilder::new();
    let int = builder.scalar(Scalar::Int);
    let entry = builder.entry("n", int).expect("n");
    let mut schema = builder.finish();
    schema.bind(entry, Some(reject("nope")), None).expect("bind");
    let engine = Engine::new(Arc::new(schema));

    let rejection = engine
        .validate_entry(entry, Some(Value::from(1)), None, &())
        .expect_err("unhandled");
    assert_eq!(rejection.message, "nope");
    assert!(rejection.properties.is_none());
}

fn non_negative() -> ValidationFn {
    ValidationFn::from_value_fn(|v, _| match v.as_i64() {
        Some(n) if n < 0 => Err("Less than 0".into()),
        _ => Ok(v),
    })
}

#[test]
fn test_required_item_failure_nulls_the_list() {
    let mut builder = SchemaBuilder::new();
    let int = builder.scalar(Scalar::Int);
    let required = builder.required(int);
    let ints = builder.list_of(required);
    let entry = builder.entry("ids", ints).expect("ids");
    let mut schema = builder.finish();
    schema
        .bind(entry, Some(non_negative().each()), Some(Policy::Resolver))
        .expect("bind");
    let engine = Engine::new(Arc::new(schema));

    let out = engine
        .validate_entry(entry, Some(Value::from(json!([50, -1]))), None, &())
        .expect("recovered by the list");
    assert_eq!(out.value, Some(Value::Null));
    assert_eq!(out.errors.len(), 1);
    assert_eq!(out.errors[0].path.to_strings(), vec!["ids", "1"]);
    assert_eq!(out.errors[0].message, "Less than 0");
}

#[test]
fn test_required_item_nulled_by_validator_nulls_the_list() {
    let mut builder = SchemaBuilder::new();
    let int = builder.scalar(Scalar::Int);
    let required = builder.required(int);
    let ints = builder.list_of(required);
    let entry = builder.entry("ids", ints).expect("ids");
    let mut schema = builder.finish();
    let drop_negative = ValidationFn::from_value_fn(|v, _| match v.as_i64() {
        Some(n) if n < 0 => Ok(Value::Null),
        _ => Ok(v),
    })
    .each();
    schema
        .bind(entry, Some(drop_negative), Some(Policy::Resolver))
        .expect("bind");
    let engine = Engine::new(Arc::new(schema));

    let out = engine
        .validate_entry(entry, Some(Value::from(json!([1, -1, 2]))), None, &())
        .expect("recovered by the list");
    assert_eq!(out.value, Some(Value::Null));
    assert_eq!(out.errors.len(), 1);
    assert_eq!(out.errors[0].path.to_strings(), vec!["ids", "1"]);
    assert_eq!(out.errors[0].message, "Expected non-null value of type Int!");
}

#[test]
fn test_required_item_in_required_list_aborts() {
    let mut builder = SchemaBuilder::new();
    let int = builder.scalar(Scalar::Int);
    let required = builder.required(int);
    let ints = builder.list_of(required);
    let required_ints = builder.required(ints);
    let entry = builder.entry("ids", required_ints).expect("ids");
    let mut schema = builder.finish();
    schema
        .bind(entry, Some(non_negative().each()), Some(Policy::Resolver))
        .expect("bind");
    let engine = Engine::new(Arc::new(schema));

    let rejection = engine
        .validate_entry(entry, Some(Value::from(json!([50, -1]))), None, &())
        .expect_err("no nullable position");
    assert_eq!(rejection.path.to_strings(), vec!["ids", "1"]);
    assert_eq!(rejection.message, "Less than 0");
}

#[test]
fn test_required_field_failure_nulls_the_composite() {
    let mut builder = SchemaBuilder::new();
    let int = builder.scalar(Scalar::Int);
    let required = builder.required(int);
    let account = builder.composite("Account").expect("Account");
    let balance = builder.field(account, "balance", required).expect("balance");
    builder.field(account, "owner", int).expect("owner");
    let holder = builder.composite("Holder").expect("Holder");
    let slot = builder.field(holder, "account", account).expect("account");
    let entry = builder.entry("holder", holder).expect("holder");
    let mut schema = builder.finish();
    schema
        .bind(balance, Some(non_negative()), Some(Policy::Resolver))
        .expect("bind balance");
    schema
        .bind(slot, None, Some(Policy::Resolver))
        .expect("bind account");
    let engine = Engine::new(Arc::new(schema));

    let out = engine
        .validate_entry(
            entry,
            Some(Value::from(json!({"account": {"balance": -5, "owner": 1}}))),
            None,
            &(),
        )
        .expect("recovered by the composite");
    assert_eq!(out.value, Some(Value::from(json!({"account": null}))));
    assert_eq!(out.errors.len(), 1);
    assert_eq!(
        out.errors[0].path.to_strings(),
        vec!["holder", "account", "balance"]
    );
}

#[test]
fn test_throw_attaches_chain_diagnostics() {
    let mut builder = SchemaBuilder::new();
    let string = builder.scalar(Scalar::String);
    let entry = builder.entry("slug", string).expect("slug");
    let mut schema = builder.finish();
    let trim = ValidationFn::from_value_fn(|v, _| Ok(Value::from(v.as_str().unwrap_or("").trim())))
        .with_directive("trim");
    let pattern = reject("does not match").with_directive("pattern").with_argument("regex", "^[a-z]+$");
    schema.bind(entry, Some(trim), None).expect("trim");
    schema
        .bind(entry, Some(pattern), Some(Policy::Throw))
        .expect("pattern");
    let engine = Engine::new(Arc::new(schema));

    let rejection = engine
        .validate_entry(entry, Some(Value::from(" A ")), None, &())
        .expect_err("pattern");
    let properties = rejection.properties.expect("diagnostics");
    assert_eq!(properties.directive.as_deref(), Some("pattern"));
    assert_eq!(properties.arguments.get("regex"), Some(&Value::from("^[a-z]+$")));
    assert_eq!(properties.previous.len(), 1);
    assert_eq!(properties.previous[0].directive.as_deref(), Some("trim"));
}

#[test]
fn test_validator_returning_nothing_is_a_failure() {
    let mut builder = SchemaBuilder::new();
    let int = builder.scalar(Scalar::Int);
    let entry = builder.entry("n", int).expect("n");
    let mut schema = builder.finish();
    schema
        .bind(
            entry,
            Some(ValidationFn::from_fn(|_, _| Ok(None))),
            Some(Policy::Resolver),
        )
        .expect("bind");
    let engine = Engine::new(Arc::new(schema));

    let out = engine
        .validate_entry(entry, Some(Value::from(1)), None, &())
        .expect("recovered");
    assert_eq!(out.value, Some(Value::Null));
    assert_eq!(out.errors[0].message, "validation returned undefined");

    // An absent input may stay absent.
    let out = engine.validate_entry(entry, None, None, &()).expect("absent");
    assert_eq!(out.value, None);
    assert!(out.is_valid());
}

#[test]
fn test_shape_mismatch_is_an_engine_fault() {
    let mut builder = SchemaBuilder::new();
    let int = builder.scalar(Scalar::Int);
    let point = builder.composite("Point").expect("Point");
    let x = builder.field(point, "x", int).expect("x");
    let entry = builder.entry("p", point).expect("p");
    let mut schema = builder.finish();
    schema
        .bind(x, Some(ValidationFn::from_fn(|v, _| Ok(v))), Some(Policy::Resolver))
        .expect("bind");
    let engine = Engine::new(Arc::new(schema));

    let rejection = engine
        .validate_entry(entry, Some(Value::from("not an object")), None, &())
        .expect_err("fault");
    assert!(matches!(*rejection.cause, Failure::EngineFault(_)));
}

#[test]
fn test_max_depth_is_enforced() {
    let mut builder = SchemaBuilder::new();
    let int = builder.scalar(Scalar::Int);
    let node = builder.composite("Node").expect("Node");
    let value = builder.field(node, "value", int).expect("value");
    builder.field(node, "next", node).expect("next");
    let entry = builder.entry("head", node).expect("head");
    let mut schema = builder.finish();
    schema
        .bind(value, Some(ValidationFn::from_fn(|v, _| Ok(v))), Some(Policy::Resolver))
        .expect("bind");
    let engine = Engine::with_config(Arc::new(schema), Config::default().with_max_depth(3));

    let shallow = Value::from(json!({"value": 1, "next": {"value": 2}}));
    assert!(engine.validate_entry(entry, Some(shallow), None, &()).is_ok());

    let deep = Value::from(json!({"next": {"next": {"next": {"next": {}}}}}));
    let rejection = engine
        .validate_entry(entry, Some(deep), None, &())
        .expect_err("too deep");
    assert!(matches!(*rejection.cause, Failure::EngineFault(_)));
}

#[test]
fn test_errors_serialize_with_string_paths() {
    let mut builder = SchemaBuilder::new();
    let int = builder.scalar(Scalar::Int);
    let ints = builder.list_of(int);
    let entry = builder.entry("scores", ints).expect("scores");
    let mut schema = builder.finish();
    schema
        .bind(entry, Some(reject("too low").each()), Some(Policy::Resolver))
        .expect("bind");
    let engine = Engine::new(Arc::new(schema));

    let out = engine
        .validate_entry(entry, Some(Value::from(json!([7]))), None, &())
        .expect("recovered");
    let serialized = serde_json::to_value(&out.errors).expect("serialize");
    assert_eq!(
        serialized,
        json!([{"path": ["scores", "0"], "message": "too low"}])
    );
}
