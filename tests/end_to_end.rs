//! End-to-end program tests driving the public `run_source` API, covering the concrete
//! scenarios and boundary behaviors enumerated in the language specification.

use pythia::Value;

fn eval(src: &str) -> Value {
    let mut out = Vec::new();
    pythia::run_source(src, &mut out).expect("source should parse cleanly")
}

fn eval_with_output(src: &str) -> (Value, String) {
    let mut out = Vec::new();
    let result = pythia::run_source(src, &mut out).expect("source should parse cleanly");
    (result, String::from_utf8(out).unwrap())
}

#[test]
fn scenario_accumulator_loop() {
    let result = eval("let a = 0; for v in [10,20,30] { a += v }; a;");
    assert!(matches!(result, Value::Integer(60)));
}

#[test]
fn scenario_recursive_fibonacci() {
    let result = eval(
        "func fib(n) { if (n < 2) { return n }; return fib(n-1) + fib(n-2); }; fib(10);",
    );
    assert!(matches!(result, Value::Integer(55)));
}

#[test]
fn scenario_hash_grows_with_bracket_assignment() {
    let result = eval(r#"let h = {"a": 1}; h["b"] = 2; len(h);"#);
    assert!(matches!(result, Value::Integer(2)));
}

#[test]
fn scenario_string_concatenation() {
    let result = eval(r#""Hello" + " " + "World!";"#);
    match result {
        Value::String(s) => assert_eq!(&*s, "Hello World!"),
        other => panic!("expected string, got {other:?}"),
    }
}

#[test]
fn scenario_descending_range() {
    let result = eval("range(5,1,-1);");
    match result {
        Value::Array(items) => {
            let ints: Vec<i64> = items
                .borrow()
                .iter()
                .map(|v| match v {
                    Value::Integer(i) => *i,
                    _ => panic!("expected integer"),
                })
                .collect();
            assert_eq!(ints, vec![5, 4, 3, 2]);
        }
        other => panic!("expected array, got {other:?}"),
    }
}

#[test]
fn scenario_closure_captures_by_reference() {
    let result = eval(
        "func make() { let x = 0; func inc() { x += 1; return x }; return inc }; \
         let f = make(); f(); f(); f();",
    );
    assert!(matches!(result, Value::Integer(3)));
}

#[test]
fn scenario_type_mismatch_error() {
    let result = eval("5 + true;");
    match result {
        Value::Error(msg) => assert_eq!(msg, "type mismatch: INTEGER + BOOLEAN"),
        other => panic!("expected error, got {other:?}"),
    }
}

#[test]
fn scenario_array_index_out_of_bound_error() {
    let result = eval("[1,2,3][3];");
    match result {
        Value::Error(msg) => assert_eq!(msg, "array index out of bound: 3"),
        other => panic!("expected error, got {other:?}"),
    }
}

#[test]
fn invariant_equals_is_reflexive_across_kinds() {
    let result = eval(
        r#"let a = [1, {"x": 2}, "s", true, null, 3.5];
           a[0] == a[0] && a[1] == a[1] && a[2] == a[2] && a[3] == a[3] && a[4] == a[4] && a[5] == a[5];"#,
    );
    assert!(matches!(result, Value::Boolean(true)));
}

#[test]
fn invariant_inspect_of_data_values_reparses_to_an_equal_value() {
    // A string's `inspect()` form has no surrounding quotes (spec §6), so a string nested inside
    // an array or hash literal cannot round-trip through re-parsing (its printed form reads back
    // as a bare identifier, not a string literal). The invariant is checked here over the subset
    // where it actually holds: integers, booleans, null, and arrays/hashes built from those.
    let mut out = Vec::new();
    let original = pythia::run_source(r#"[1, 2, {1: 3}, true, null, [4, 5]];"#, &mut out)
        .unwrap();
    let printed = original.inspect();
    let reparsed = eval(&format!("{printed};"));
    assert!(original.equals(&reparsed));
}

#[test]
fn invariant_bare_string_inspect_reparses_to_an_equal_value() {
    let original = eval(r#""hello world";"#);
    let printed = original.inspect();
    let reparsed = eval(&format!(r#""{printed}";"#));
    assert!(original.equals(&reparsed));
}

#[test]
fn boundary_negative_array_index_is_out_of_bounds() {
    assert!(matches!(eval("[1,2,3][-1];"), Value::Error(_)));
}

#[test]
fn boundary_hash_missing_key_read_is_null_but_compound_assign_errors() {
    assert!(matches!(eval(r#"let h = {}; h["x"];"#), Value::Null));
    assert!(matches!(eval(r#"let h = {}; h["x"] += 1;"#), Value::Error(_)));
}

#[test]
fn boundary_division_and_modulo_by_zero_are_errors_not_panics() {
    assert!(matches!(eval("1 / 0;"), Value::Error(_)));
    assert!(matches!(eval("1 % 0;"), Value::Error(_)));
}

#[test]
fn boundary_float_equality_is_structural_for_non_nan() {
    assert!(matches!(eval("1.5 == 1.5;"), Value::Boolean(true)));
    assert!(matches!(eval("1.5 == 1.0;"), Value::Boolean(false)));
}

#[test]
fn parsing_is_total_even_for_malformed_input() {
    let (program, errors) = pythia::parse::parse_program("let = ; func (;");
    assert!(!errors.is_empty());
    // Parsing never aborts early: it always produces a (possibly partial) program.
    let _ = program;
}

#[test]
fn print_decodes_the_literal_backslash_n_escape() {
    let (_, output) = eval_with_output(r#"print("a\nb");"#);
    assert_eq!(output, "a\nb\n");
}

#[test]
fn hash_iteration_order_convention_differs_from_array() {
    let result = eval(
        r#"let arr_idx = []; for i, v in [10, 20] { arr_idx = append(arr_idx, i) };
           let hash_keys = []; for k, v in {"only": 1} { hash_keys = append(hash_keys, k) };
           arr_idx[0] == 0 && hash_keys[0] == "only";"#,
    );
    assert!(matches!(result, Value::Boolean(true)));
}
