//! The builtin function table (spec §4.3.3).
//!
//! Builtins are dispatched by name rather than stored as function pointers so that `print` can
//! reach the [`Evaluator`]'s output sink — the one piece of state a builtin call needs that an
//! ordinary `fn(&[Value]) -> Value` signature can't carry.

use std::io::Write;

use crate::eval::Evaluator;
use crate::value::Value;

/// Every name an identifier can resolve to as a [`Value::Builtin`]. Looked up once at program
/// startup when the root environment is populated (see [`crate::env::Environment::new_root`]
/// callers) rather than re-matched on every lookup.
pub const NAMES: &[&str] = &[
    "len", "append", "print", "type", "range", "delete", "first", "last", "string",
];

pub(crate) fn call<W: Write>(evaluator: &Evaluator<W>, name: &'static str, args: &[Value]) -> Value {
    match name {
        "len" => len(args),
        "append" => append(args),
        "print" => print(evaluator, args),
        "type" => type_of(args),
        "range" => range(args),
        "delete" => delete(args),
        "first" => first(args),
        "last" => last(args),
        "string" => to_string(args),
        other => Value::error(format!("unknown builtin: {other}")),
    }
}

fn arity_error(got: usize, want: usize) -> Value {
    Value::error(format!("wrong number of arguments. got={got}, want={want}"))
}

fn len(args: &[Value]) -> Value {
    if args.len() != 1 {
        return arity_error(args.len(), 1);
    }
    match &args[0] {
        Value::String(s) => Value::Integer(s.len() as i64),
        Value::Array(items) => Value::Integer(items.borrow().len() as i64),
        Value::Hash(pairs) => Value::Integer(pairs.borrow().len() as i64),
        other => Value::error(format!(
            "argument to `len` not supported, got {}",
            other.type_name()
        )),
    }
}

fn append(args: &[Value]) -> Value {
    if args.len() != 2 {
        return arity_error(args.len(), 2);
    }
    match &args[0] {
        Value::Array(items) => {
            let mut new_items = items.borrow().clone();
            new_items.push(args[1].clone());
            Value::array(new_items)
        }
        other => Value::error(format!(
            "argument to `append` must be ARRAY, got {}",
            other.type_name()
        )),
    }
}

fn print<W: Write>(evaluator: &Evaluator<W>, args: &[Value]) -> Value {
    let rendered = args
        .iter()
        .map(|v| v.inspect().replace("\\n", "\n"))
        .collect::<Vec<_>>()
        .join(" ");
    evaluator.write_out(&rendered);
    evaluator.write_out("\n");
    Value::Null
}

fn type_of(args: &[Value]) -> Value {
    match args.len() {
        0 => Value::Type(crate::value::TypeTag::Null),
        1 => Value::Type(args[0].type_tag()),
        n => arity_error(n, 1),
    }
}

fn range(args: &[Value]) -> Value {
    let (start, end, step) = match args {
        [Value::Integer(start), Value::Integer(end)] => (*start, *end, None),
        [Value::Integer(start), Value::Integer(end), Value::Integer(step)] => {
            (*start, *end, Some(*step))
        }
        [a, b] if !matches!(a, Value::Integer(_)) || !matches!(b, Value::Integer(_)) => {
            return Value::error(format!(
                "argument to `range` must be INTEGER, got {}",
                if matches!(a, Value::Integer(_)) {
                    b.type_name()
                } else {
                    a.type_name()
                }
            ))
        }
        [_, _, c] => {
            return Value::error(format!(
                "argument to `range` must be INTEGER, got {}",
                c.type_name()
            ))
        }
        _ => return arity_error(args.len(), 2),
    };

    if start == end {
        return Value::array(Vec::new());
    }

    let ascending = start < end;
    let step = match step {
        Some(s) => s,
        None => {
            if ascending {
                1
            } else {
                -1
            }
        }
    };

    if ascending && step <= 0 {
        return Value::error("range step must be positive for ascending range".to_string());
    }
    if !ascending && step >= 0 {
        return Value::error("range step must be negative for descending range".to_string());
    }

    let mut items = Vec::new();
    let mut v = start;
    if ascending {
        while v < end {
            items.push(Value::Integer(v));
            v += step;
        }
    } else {
        while v > end {
            items.push(Value::Integer(v));
            v += step;
        }
    }
    Value::array(items)
}

fn delete(args: &[Value]) -> Value {
    if args.len() != 2 {
        return arity_error(args.len(), 2);
    }
    match &args[0] {
        Value::Hash(pairs) => match args[1].hash_key() {
            Ok(key) => {
                pairs.borrow_mut().remove(&key);
                Value::Null
            }
            Err(ty) => Value::error(format!("unusable as hash key: {ty}")),
        },
        other => Value::error(format!(
            "argument to `delete` must be HASH, got {}",
            other.type_name()
        )),
    }
}

fn first(args: &[Value]) -> Value {
    if args.len() != 1 {
        return arity_error(args.len(), 1);
    }
    match &args[0] {
        Value::Array(items) => items.borrow().first().cloned().unwrap_or(Value::Null),
        other => Value::error(format!(
            "argument to `first` must be ARRAY, got {}",
            other.type_name()
        )),
    }
}

fn last(args: &[Value]) -> Value {
    if args.len() != 1 {
        return arity_error(args.len(), 1);
    }
    match &args[0] {
        Value::Array(items) => items.borrow().last().cloned().unwrap_or(Value::Null),
        other => Value::error(format!(
            "argument to `last` must be ARRAY, got {}",
            other.type_name()
        )),
    }
}

fn to_string(args: &[Value]) -> Value {
    if args.len() != 1 {
        return arity_error(args.len(), 1);
    }
    Value::string(args[0].inspect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::Environment;
    use crate::parse::parse_program;

    fn eval(src: &str) -> Value {
        let (program, errors) = parse_program(src);
        assert!(errors.is_empty(), "{errors:?}");
        let env = Environment::new_root();
        let evaluator: Evaluator<Vec<u8>> = Evaluator::new(Vec::new());
        evaluator.eval_program(&program, &env)
    }

    #[test]
    fn len_over_string_array_hash() {
        assert!(matches!(eval(r#"len("hello");"#), Value::Integer(5)));
        assert!(matches!(eval("len([1,2,3]);"), Value::Integer(3)));
        assert!(matches!(eval(r#"len({"a": 1, "b": 2});"#), Value::Integer(2)));
    }

    #[test]
    fn len_rejects_unsupported_types() {
        assert!(matches!(eval("len(5);"), Value::Error(_)));
    }

    #[test]
    fn append_does_not_mutate_original() {
        let value = eval("let a = [1,2]; let b = append(a, 3); len(a) == 2 && len(b) == 3;");
        assert!(matches!(value, Value::Boolean(true)));
    }

    #[test]
    fn ascending_range_default_step() {
        let value = eval("range(0, 5);");
        match value {
            Value::Array(items) => assert_eq!(items.borrow().len(), 5),
            other => panic!("expected array, got {other:?}"),
        }
    }

    #[test]
    fn range_rejects_mismatched_step_sign() {
        assert!(matches!(eval("range(0, 5, -1);"), Value::Error(_)));
        assert!(matches!(eval("range(5, 0, 1);"), Value::Error(_)));
    }

    #[test]
    fn range_of_equal_bounds_is_empty() {
        match eval("range(3, 3);") {
            Value::Array(items) => assert!(items.borrow().is_empty()),
            other => panic!("expected array, got {other:?}"),
        }
    }

    #[test]
    fn first_and_last_on_empty_array_are_null() {
        assert!(matches!(eval("first([]);"), Value::Null));
        assert!(matches!(eval("last([]);"), Value::Null));
    }

    #[test]
    fn type_reflects_kind() {
        match eval("type(5);") {
            Value::Type(tag) => assert_eq!(tag.name(), "INTEGER"),
            other => panic!("expected type, got {other:?}"),
        }
    }

    #[test]
    fn string_builtin_renders_inspect_form() {
        match eval("string(5);") {
            Value::String(s) => assert_eq!(&*s, "5"),
            other => panic!("expected string, got {other:?}"),
        }
    }

    #[test]
    fn delete_removes_key_without_error_when_absent() {
        assert!(matches!(eval(r#"let h = {}; delete(h, "x");"#), Value::Null));
    }
}
