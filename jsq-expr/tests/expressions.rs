//! End-to-end expression behaviour

use jsq_expr::{normalize_expression, Program};
use proptest::prelude::*;
use serde_json::{json, Value};

fn eval(expression: &str, value: Value) -> Value {
    Program::compile(normalize_expression(Some(expression)))
        .unwrap()
        .evaluate(value)
        .unwrap()
}

#[test]
fn placeholder_is_identity() {
    assert_eq!(eval(".", json!([1, 2])), json!([1, 2]));
}

#[test]
fn statements_and_blocks_yield_their_value() {
    assert_eq!(eval("if $.ok { \"yes\" } else { \"no\" }", json!({"ok": true})), json!("yes"));
    assert_eq!(eval("let total = 0; for x in $ { total += x; } total", json!([1, 2, 3])), json!(6));
}

#[test]
fn aliases_in_strings_stay_literal() {
    assert_eq!(eval(r#""$ costs _.x""#, Value::Null), json!("$ costs _.x"));
    assert_eq!(eval("`${$.n} items`", json!({"n": 3})), json!("3 items"));
}

#[test]
fn library_covers_grouping() {
    let people = json!([
        {"name": "ann", "team": "a", "age": 31},
        {"name": "bo", "team": "b", "age": 25},
        {"name": "cy", "team": "a", "age": 40}
    ]);
    assert_eq!(
        eval(r#"_.map(_.group_by($, "team").a, "name")"#, people.clone()),
        json!(["ann", "cy"])
    );
    assert_eq!(eval(r#"_.max_by($, "age").name"#, people.clone()), json!("cy"));
    assert_eq!(eval(r#"$$.filter(#{team: "a"}).size().value()"#, people.clone()), json!(2));
    assert_eq!(eval(r#"_.sum_by($, "age")"#, people), json!(96));
}

#[test]
fn fp_flow_builds_a_pipeline() {
    let expression = r#"fp.flow(fp.map("v"), fp.filter(|v| v > 1))"#;
    assert_eq!(eval(expression, json!([{"v": 1}, {"v": 2}, {"v": 3}])), json!([2, 3]));
}

#[test]
fn function_results_are_applied_once() {
    assert_eq!(eval("|x| x * 2", json!(21)), json!(42));
    assert_eq!(eval("fn double(x) { x * 2 } Fn(\"double\")", json!(4)), json!(8));

    let program = Program::compile("|x| |y| y").unwrap();
    let err = program.evaluate(json!(1)).unwrap_err();
    assert!(err.to_string().contains("cannot be represented as data"));
}

fn arb_data() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| json!(n)),
        "[a-z ]{0,8}".prop_map(Value::String),
    ];
    leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map("[a-z]{1,5}", inner, 0..4)
                .prop_map(|map| Value::Object(map.into_iter().collect())),
        ]
    })
}

proptest! {
    #[test]
    fn dollar_is_the_current_value(value in arb_data()) {
        let program = Program::compile("$").unwrap();
        prop_assert_eq!(program.evaluate(value.clone()).unwrap(), value);
    }
}
