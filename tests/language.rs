use std::sync::Arc;

use serde_json::{Value as Json, json};
use weft::{
    Parser,
    error::{ErrorKind, ParseError, RuntimeError},
    interpreter::{
        compiler::CompileOptions,
        evaluator::{core::InvocationContext, function::core::Outcome},
        registry::ContextOptions,
        value::core::Value,
    },
};

fn eval(src: &str, input: Json) -> Option<Json> {
    let parser = Parser::new();
    let expr = parser.compile_expression(src)
                     .unwrap_or_else(|e| panic!("Failed to compile {src:?}: {e}"));
    expr.retrieve(Value::from(input))
        .unwrap_or_else(|e| panic!("Failed to evaluate {src:?}: {e}"))
        .map(|v| v.to_json())
}

fn render(src: &str, input: Json) -> String {
    let parser = Parser::new();
    let template = parser.compile_interpolation(src)
                         .unwrap_or_else(|e| panic!("Failed to compile {src:?}: {e}"));
    template.construct(Value::from(input))
            .unwrap_or_else(|e| panic!("Failed to render {src:?}: {e}"))
}

fn assert_parse_failure(src: &str) -> ParseError {
    match Parser::new().compile_expression(src) {
        Ok(_) => panic!("{src:?} compiled but was expected to fail"),
        Err(e) => e,
    }
}

fn assert_failure(src: &str, input: Json) -> RuntimeError {
    let expr = Parser::new().compile_expression(src)
                            .unwrap_or_else(|e| panic!("Failed to compile {src:?}: {e}"));
    match expr.retrieve(Value::from(input)) {
        Ok(v) => panic!("{src:?} evaluated to {v:?} but was expected to fail"),
        Err(e) => e,
    }
}

#[test]
fn templates_interpolate_fields() {
    assert_eq!(render("Hello {.id}", json!({"id": 1})), "Hello 1");
    assert_eq!(render("{.a}-{.b}", json!({"a": "x", "b": 2.5})), "x-2.5");
    assert_eq!(render("no braces", Json::Null), "no braces");
    assert_eq!(render("\\{literal\\} {.id}", json!({"id": 7})), "{literal} 7");
    assert_eq!(render("{}", Json::Null), "");
}

#[test]
fn map_collects_in_order() {
    assert_eq!(eval("map . .id", json!([{"id": 1}, {"id": 2}])), Some(json!([1, 2])));
    assert_eq!(eval(".items | map .name", json!({"items": [{"name": "a"}, {}]})),
               Some(json!(["a", null])));
}

#[test]
fn missing_fields_are_absent() {
    assert_eq!(eval(".fake", json!({})), None);
    assert_eq!(eval(".a.b.c", json!({"a": null})), None);
    assert_eq!(eval(".items.5", json!({"items": [1, 2]})), None);
    assert_eq!(eval(".items.1", json!({"items": [1, 2]})), Some(json!(2)));
    assert_eq!(eval(".items.99999999999999999999999", json!({"items": [1, 2]})), None);
    assert_eq!(render("{ .fake }", json!({})), "");
    assert_eq!(render("[{ .fake }]", json!({})), "[]");
}

#[test]
fn reading_a_field_of_a_scalar_is_a_type_error() {
    assert_eq!(assert_failure(".name.first", json!({"name": "ada"})).kind(), ErrorKind::Type);
    assert_eq!(assert_failure(".items.first", json!({"items": [1]})).kind(), ErrorKind::Type);
}

#[test]
fn registered_function_receives_parent_and_argument() {
    let parser = Parser::new();
    parser.register_function("testAppend", |call| {
              let parent = call.parent().and_then(Value::as_str).unwrap_or_default().to_string();
              let arg = call.arg(0)?;
              let suffix = arg.as_ref().and_then(Value::as_str).unwrap_or_default();
              Ok(Outcome::from(Value::from(parent + suffix)))
          });

    let expr = parser.compile_expression("\"Hello, \" | testAppend \"World\"").unwrap();
    assert_eq!(expr.retrieve(Value::Null).unwrap(), Some(Value::from("Hello, World")));
}

#[test]
fn functions_registered_after_compilation_are_seen() {
    let parser = Parser::new();
    let expr = parser.compile_expression("\"x\" | later").unwrap();

    let err = expr.retrieve(Value::Null).unwrap_err();
    assert!(matches!(err, RuntimeError::UnknownFunction { ref name, .. } if name == "later"));

    parser.register_function("later", |_call| Ok(Outcome::from(Value::from("late"))));
    assert_eq!(expr.retrieve(Value::Null).unwrap(), Some(Value::from("late")));

    parser.register_function("later", |_call| Ok(Outcome::from(Value::from("replaced"))));
    assert_eq!(expr.retrieve(Value::Null).unwrap(), Some(Value::from("replaced")));
}

#[test]
fn deferred_outcomes_apply_to_the_current_value() {
    let parser = Parser::new();
    parser.register_function("current_id", |_call| {
              Ok(Outcome::Deferred(Box::new(|current: Option<Value>| {
                  Ok(current.and_then(|v| v.as_mapping().and_then(|m| m.get("id").cloned())))
              })))
          });

    let expr = parser.compile_expression("\"ignored\" | current_id").unwrap();
    let result = expr.retrieve(Value::from(json!({"id": 5}))).unwrap();
    assert_eq!(result, Some(Value::from(5.0)));
}

#[test]
fn closures_bind_their_arguments() {
    assert_eq!(eval("@pair($a, $b) => (concat $a \"-\" $b) | @pair \"x\" \"y\"", Json::Null),
               Some(json!("x-y")));
    assert_eq!(eval("@first($s) => ($s | split \",\") | @first .csv", json!({"csv": "a,b"})),
               Some(json!(["a", "b"])));
    assert_eq!(eval("@none() => (.) | @none", json!(3)), Some(json!(3)));
}

#[test]
fn closure_arity_mismatch_is_an_arity_error() {
    let err = assert_failure("@pair($a, $b) => ($a) | @pair \"x\"", Json::Null);
    assert_eq!(err.kind(), ErrorKind::Arity);

    let err = assert_failure("@one($a) => ($a) | @one 1 2", Json::Null);
    assert_eq!(err.kind(), ErrorKind::Arity);
}

#[test]
fn closures_shadow_and_nest() {
    assert_eq!(eval("@f($x) => (concat \"outer\") | @f($x) => (concat \"inner\") | @f 1",
                    Json::Null),
               Some(json!("inner")));
    assert_eq!(eval("@outer($a) => (@inner($b) => (concat $a $b) | @inner \"!\") | @outer \"hi\"",
                    Json::Null),
               Some(json!("hi!")));
}

#[test]
fn closures_defined_in_an_expression_do_not_recurse() {
    let err = assert_failure("@f($x) => (@f $x) | @f 1", Json::Null);
    assert!(matches!(err, RuntimeError::UnknownClosure { ref name, .. } if name == "f"));
}

#[test]
fn registered_closures_recurse_up_to_the_depth_limit() {
    let parser = Parser::with_options(ContextOptions { max_call_depth: 8 });
    assert_eq!(parser.define_closure("@spin($x) => (@spin $x)").unwrap(), "spin");
    parser.define_closure("@shout($s) => (concat $s \"!\")").unwrap();

    let ok = parser.compile_expression("@shout \"hey\"").unwrap();
    assert_eq!(ok.retrieve(Value::Null).unwrap(), Some(Value::from("hey!")));

    let runaway = parser.compile_expression("@spin 1").unwrap();
    let err = runaway.retrieve(Value::Null).unwrap_err();
    assert!(matches!(err, RuntimeError::CallDepthExceeded { limit: 8, .. }));
    assert_eq!(err.kind(), ErrorKind::Evaluation);

    // The failure leaves the unit usable.
    assert_eq!(ok.retrieve(Value::Null).unwrap(), Some(Value::from("hey!")));
}

#[test]
fn equality_coerces_across_kinds() {
    assert_eq!(eval("eq 9 \"9\"", Json::Null), Some(json!(true)));
    assert_eq!(eval("eq \" 9 \" 9", Json::Null), Some(json!(true)));
    assert_eq!(eval("eq true false", Json::Null), Some(json!(false)));
    assert_eq!(eval("eq true 1", Json::Null), Some(json!(true)));
    assert_eq!(eval("eq \"\" 0", Json::Null), Some(json!(true)));
    assert_eq!(eval("eq \"abc\" 0", Json::Null), Some(json!(false)));
    assert_eq!(eval("eq null .missing", json!({})), Some(json!(true)));
    assert_eq!(eval(".n | eq 3", json!({"n": 3})), Some(json!(true)));
}

#[test]
fn equality_is_reflexive() {
    for input in [json!(1), json!("x"), json!(true), json!(null), json!([1, "2"]), json!({"a": [1]})] {
        assert_eq!(eval("eq . .", input.clone()), Some(json!(true)), "eq a a for {input}");
    }
}

#[test]
fn logic_functions_use_truthiness() {
    assert_eq!(eval("and true 0", Json::Null), Some(json!(false)));
    assert_eq!(eval("and \"x\" 1", Json::Null), Some(json!(true)));
    assert_eq!(eval("or .missing \"\"", json!({})), Some(json!(false)));
    assert_eq!(eval("or 0 .list", json!({"list": []})), Some(json!(true)));
    assert_eq!(eval("not .missing", json!({})), Some(json!(true)));
    assert_eq!(eval(".flag | not", json!({"flag": true})), Some(json!(false)));
}

#[test]
fn split_and_join_round_trip() {
    assert_eq!(eval("\"1,2,3\" | split \",\"", Json::Null), Some(json!(["1", "2", "3"])));
    assert_eq!(eval("\"1,2,3\" | split \",\" | join \",\"", Json::Null), Some(json!("1,2,3")));
    assert_eq!(eval("\"\" | split \",\"", Json::Null), Some(json!([""])));
    assert_eq!(eval("\"abc\" | split \"\"", Json::Null), Some(json!(["a", "b", "c"])));
    assert_eq!(eval("join .nums \"+\"", json!({"nums": [1, 2.5, "x"]})), Some(json!("1+2.5+x")));
    assert_eq!(assert_failure("5 | split \",\"", Json::Null).kind(), ErrorKind::Type);
}

#[test]
fn sets_use_loose_membership() {
    assert_eq!(eval("set_new | set_add 2 | set_has 2", Json::Null), Some(json!(true)));
    assert_eq!(eval("set_new | set_add 20 | set_has 2", Json::Null), Some(json!(false)));
    assert_eq!(eval("set_new | set_add \"2\" | set_has 2", Json::Null), Some(json!(true)));
    assert_eq!(eval("set_new | set_add 1 | set_add \"1\" | len", Json::Null), Some(json!(1)));
}

#[test]
fn set_functions_reject_other_values() {
    assert_eq!(assert_failure(".list | set_has 1", json!({"list": [1]})).kind(), ErrorKind::Type);
    assert_eq!(assert_failure("set_add 1 2", Json::Null).kind(), ErrorKind::Type);
}

#[test]
fn text_helpers() {
    assert_eq!(eval("\"héllo\" | len", Json::Null), Some(json!(5)));
    assert_eq!(eval("len .items", json!({"items": [1, 2, 3]})), Some(json!(3)));
    assert_eq!(eval(".name | concat \" \" .last", json!({"name": "Ada", "last": "L"})),
               Some(json!("Ada L")));
    assert_eq!(eval("concat \"a\" 1 .missing", json!({})), Some(json!("a1")));
    assert_eq!(eval(".missing | default \"x\"", json!({})), Some(json!("x")));
    assert_eq!(eval(".name | default \"x\"", json!({"name": "y"})), Some(json!("y")));
}

#[test]
fn rand_stays_in_range() {
    for _ in 0..50 {
        let n = eval("rand 1 3", Json::Null).and_then(|v| v.as_f64()).unwrap();
        assert!((1.0..=3.0).contains(&n), "{n} out of range");

        let unit = eval("rand", Json::Null).and_then(|v| v.as_f64()).unwrap();
        assert!((0.0..=1.0).contains(&unit), "{unit} out of range");

        let piped = eval(".lo | rand 10", json!({"lo": 5})).and_then(|v| v.as_f64()).unwrap();
        assert!((5.0..=10.0).contains(&piped), "{piped} out of range");
    }
    assert_eq!(eval("rand 4 4", Json::Null), Some(json!(4)));

    assert_eq!(assert_failure("rand 5 1", Json::Null).kind(), ErrorKind::Evaluation);
    assert_eq!(assert_failure("rand \"a\" 2", Json::Null).kind(), ErrorKind::Type);
}

#[test]
fn runtime_errors_carry_their_kind() {
    assert_eq!(assert_failure("nope 1", Json::Null).kind(), ErrorKind::Evaluation);
    assert_eq!(assert_failure("@nope 1", Json::Null).kind(), ErrorKind::Evaluation);
    assert_eq!(assert_failure("5 | len", Json::Null).kind(), ErrorKind::Type);
    assert_eq!(assert_failure("map 5 .id", Json::Null).kind(), ErrorKind::Evaluation);
    assert_eq!(assert_failure("eq 1 2 3", Json::Null).kind(), ErrorKind::Arity);
    assert_eq!(assert_failure("set_new 1", Json::Null).kind(), ErrorKind::Arity);

    let err = assert_failure("\"x\" | nope", Json::Null);
    assert_eq!(err.to_string(), "Error at offset 6: Unknown function 'nope'.");
}

#[test]
fn invalid_sources_never_compile() {
    assert_eq!(assert_parse_failure("split \"abc").kind(), ErrorKind::Lex);
    assert_eq!(assert_parse_failure(". |").kind(), ErrorKind::Parse);
    assert_eq!(assert_parse_failure(". | .id").kind(), ErrorKind::Parse);
    assert_eq!(assert_parse_failure("(map . .id").kind(), ErrorKind::Parse);
    assert_eq!(assert_parse_failure("@f($a, $a) => ($a)").kind(), ErrorKind::Parse);
    assert_eq!(assert_parse_failure("\"bad \\q escape\"").kind(), ErrorKind::Lex);
    assert_eq!(assert_parse_failure(". )").offset(), 2);

    let deep = format!("{}.a{}", "(".repeat(1000), ")".repeat(1000));
    assert!(matches!(assert_parse_failure(&deep), ParseError::NestingTooDeep { .. }));
    assert!(Parser::new().compile_interpolation(&format!("{{{deep}}}")).is_err());

    let parser = Parser::new();
    assert!(parser.compile_interpolation("Hello {.id").is_err());
    assert!(parser.compile_interpolation("Hello }").is_err());
    assert_eq!(parser.context().live_units(), 0);
}

#[test]
fn globals_are_declared_and_supplied() {
    let parser = Parser::new();
    let err = parser.compile_expression("$user").unwrap_err();
    assert!(matches!(err, ParseError::UndeclaredGlobal { ref name, .. } if name == "user"));

    let options = CompileOptions::default().with_global("user");
    let expr = parser.compile_expression_with("$user.name", &options).unwrap();
    assert_eq!(expr.globals(), ["user".to_string()]);

    let missing = expr.evaluate(&InvocationContext::new(Value::Null)).unwrap_err();
    assert!(matches!(missing, RuntimeError::MissingGlobal { ref name } if name == "user"));

    let invocation = InvocationContext::new(Value::Null).with_extra("user",
                                                                     Value::from(json!({"name": "ada"})));
    assert_eq!(expr.evaluate(&invocation).unwrap(), Some(Value::from("ada")));

    let template = parser.compile_interpolation_with("Hi {$user.name}!", &options).unwrap();
    assert_eq!(template.render(&invocation).unwrap(), "Hi ada!");
}

#[test]
fn one_shot_helpers_declare_supplied_globals() {
    let invocation = InvocationContext::new(Value::from(json!({"id": 3}))).with_extra("tag",
                                                                                      Value::from("t"));
    assert_eq!(weft::render_source("{$tag}{.id}", &invocation).unwrap(), "t3");
    assert_eq!(weft::evaluate_source("$tag | concat .id", &invocation).unwrap(),
               Some(Value::from("t3")));
    assert_eq!(weft::evaluate_source("$other", &invocation).unwrap_err().kind(), ErrorKind::Parse);
}

#[test]
fn reevaluation_does_not_leak_state() {
    let parser = Parser::new();
    let expr = parser.compile_expression("map .items .id").unwrap();
    let template = parser.compile_interpolation("#{.id}").unwrap();

    let first = expr.retrieve(Value::from(json!({"items": [{"id": 1}]}))).unwrap();
    let second = expr.retrieve(Value::from(json!({"items": [{"id": 2}, {"id": 3}]}))).unwrap();
    assert_eq!(first.map(|v| v.to_json()), Some(json!([1])));
    assert_eq!(second.map(|v| v.to_json()), Some(json!([2, 3])));

    assert_eq!(template.construct(Value::from(json!({"id": "a"}))).unwrap(), "#a");
    assert_eq!(template.construct(Value::from(json!({}))).unwrap(), "#");
}

#[test]
fn units_evaluate_concurrently() {
    let parser = Parser::new();
    let expr = Arc::new(parser.compile_expression(".n | concat \"-\" .n").unwrap());

    std::thread::scope(|s| {
        for n in 0..8 {
            let expr = Arc::clone(&expr);
            s.spawn(move || {
                 let result = expr.retrieve(Value::from(json!({"n": n}))).unwrap();
                 assert_eq!(result, Some(Value::from(format!("{n}-{n}"))));
             });
        }
    });
}

#[test]
fn live_units_are_released_on_drop() {
    let parser = Parser::new();
    assert_eq!(parser.context().live_units(), 0);

    let expr = parser.compile_expression(".id").unwrap();
    let template = parser.compile_interpolation("{.id}").unwrap();
    let copy = expr.clone();
    assert_eq!(parser.context().live_units(), 3);

    drop(expr);
    drop(template);
    assert_eq!(parser.context().live_units(), 1);
    assert_eq!(copy.retrieve(Value::from(json!({"id": 1}))).unwrap(), Some(Value::from(1.0)));

    drop(copy);
    assert_eq!(parser.context().live_units(), 0);
}
