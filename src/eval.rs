//! The recursive tree-walking evaluator (spec §4.3).
//!
//! `Evaluator` is generic over its output sink so the CLI can point `print` at real stdout while
//! tests point it at an in-memory buffer — the only side-effecting I/O the language core
//! performs (spec §1, §5 "Shared resources").

use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;

use ahash::AHashMap;
use tracing::{debug, trace, warn};

use crate::ast::{AssignOp, Block, Expr, HashLiteralPair, InfixOp, PrefixOp, Program, Stmt};
use crate::env::Environment;
use crate::value::{HashKey, Value};

pub struct Evaluator<W: Write> {
    out: RefCell<W>,
}

impl<W: Write> Evaluator<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: RefCell::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }

    /// Evaluates a whole program: statements run left to right; a `ReturnMarker` unwraps to
    /// become the final value, an `Error` aborts and becomes the final value, otherwise the
    /// last statement's value is returned (`Null` if the program is empty).
    pub fn eval_program(&self, program: &Program, env: &Rc<RefCell<Environment>>) -> Value {
        match self.eval_statements(program, env) {
            Value::ReturnMarker(inner) => *inner,
            other => other,
        }
    }

    /// Like [`Self::eval_program`] but does not unwrap a trailing `ReturnMarker` — used for
    /// blocks nested inside `if`/`for`/function bodies, which must let `ReturnMarker` propagate
    /// unwrapped up to the nearest function frame (spec §4.3.1 "Block").
    fn eval_block(&self, block: &Block, env: &Rc<RefCell<Environment>>) -> Value {
        self.eval_statements(&block.statements, env)
    }

    fn eval_statements(&self, statements: &[Stmt], env: &Rc<RefCell<Environment>>) -> Value {
        let mut result = Value::Null;
        for stmt in statements {
            result = self.eval_stmt(stmt, env);
            if matches!(result, Value::Error(_) | Value::ReturnMarker(_)) {
                return result;
            }
        }
        result
    }

    fn eval_stmt(&self, stmt: &Stmt, env: &Rc<RefCell<Environment>>) -> Value {
        match stmt {
            Stmt::Let { name, value, .. } => {
                let value = self.eval_expr(value, env);
                if value.is_error() {
                    return value;
                }
                env.borrow_mut().set_inner(name.name.clone(), value);
                Value::Null
            }
            Stmt::Function {
                name, params, body, ..
            } => {
                let func = crate::value::FunctionValue {
                    name: name.name.clone(),
                    params: params.clone(),
                    body: body.clone(),
                    env: Rc::clone(env),
                };
                // Bind first, then let the closure's env pointer refer back to this very scope,
                // so a call to `name` from inside its own body finds itself (spec §4.3.1).
                env.borrow_mut()
                    .set_inner(name.name.clone(), Value::Function(Rc::new(func)));
                Value::Null
            }
            Stmt::Return { value, .. } => {
                let value = match value {
                    Some(expr) => self.eval_expr(expr, env),
                    None => Value::Null,
                };
                if value.is_error() {
                    return value;
                }
                Value::ReturnMarker(Box::new(value))
            }
            Stmt::If {
                condition,
                consequence,
                alternative,
                ..
            } => {
                let condition = self.eval_expr(condition, env);
                if condition.is_error() {
                    return condition;
                }
                if condition.is_truthy() {
                    let child = Environment::new_enclosed(env);
                    self.eval_block(consequence, &child)
                } else if let Some(alt) = alternative {
                    let child = Environment::new_enclosed(env);
                    self.eval_block(alt, &child)
                } else {
                    Value::Null
                }
            }
            Stmt::For {
                value,
                index,
                container,
                body,
                ..
            } => self.eval_for(value, index.as_ref(), container, body, env),
            Stmt::Instruction { word, .. } => {
                if word == "quit" {
                    debug!("executing .quit instruction, terminating");
                    let _ = self.out.borrow_mut().flush();
                    std::process::exit(0);
                }
                Value::error(format!("unknown instruction: {word}"))
            }
            Stmt::Expression { expr, .. } => self.eval_expr(expr, env),
        }
    }

    fn eval_for(
        &self,
        value_ident: &crate::ast::Identifier,
        index_ident: Option<&crate::ast::Identifier>,
        container: &Expr,
        body: &Block,
        env: &Rc<RefCell<Environment>>,
    ) -> Value {
        let container_val = self.eval_expr(container, env);
        if container_val.is_error() {
            return container_val;
        }

        let (is_hash, items) = match iterate(&container_val) {
            Ok(pair) => pair,
            Err(ty) => return Value::error(format!("for loop requires an iterable value, got {ty}")),
        };

        let mut result = Value::Null;
        for (primary, secondary) in items {
            let child = Environment::new_enclosed(env);
            {
                let mut child_mut = child.borrow_mut();
                match index_ident {
                    // Two binders: for hashes the first gets the key, for sequences the first
                    // gets the index — an intentionally retained order convention (spec §9).
                    Some(idx) if is_hash => {
                        child_mut.set_inner(idx.name.clone(), primary.clone());
                        child_mut.set_inner(value_ident.name.clone(), secondary.clone());
                    }
                    Some(idx) => {
                        child_mut.set_inner(idx.name.clone(), secondary.clone());
                        child_mut.set_inner(value_ident.name.clone(), primary.clone());
                    }
                    None => {
                        child_mut.set_inner(value_ident.name.clone(), primary.clone());
                    }
                }
            }
            result = self.eval_block(body, &child);
            if matches!(result, Value::Error(_) | Value::ReturnMarker(_)) {
                return result;
            }
        }
        result
    }

    fn eval_expr(&self, expr: &Expr, env: &Rc<RefCell<Environment>>) -> Value {
        match expr {
            Expr::IntegerLiteral { value, .. } => Value::Integer(*value),
            Expr::FloatLiteral { value, .. } => Value::Float(*value),
            Expr::BooleanLiteral { value, .. } => Value::Boolean(*value),
            Expr::StringLiteral { value, .. } => Value::string(value.clone()),
            Expr::NullLiteral { .. } => Value::Null,
            Expr::ArrayLiteral { elements, .. } => {
                let values = self.eval_expr_list(elements, env);
                if values.len() == 1 && values[0].is_error() {
                    return values.into_iter().next().unwrap();
                }
                Value::array(values)
            }
            Expr::HashLiteral { pairs, .. } => self.eval_hash_literal(pairs, env),
            Expr::Identifier(ident) => match env.borrow().get(&ident.name) {
                Some(v) => v,
                None => Value::error(format!("identifier not found: {}", ident.name)),
            },
            Expr::Prefix { op, right, .. } => {
                let right = self.eval_expr(right, env);
                if right.is_error() {
                    return right;
                }
                eval_prefix(op, right)
            }
            Expr::Infix {
                op, left, right, ..
            } => self.eval_infix_expr(op, left, right, env),
            Expr::Call { callee, args, .. } => self.eval_call(callee, args, env),
            Expr::Index {
                collection, key, ..
            } => self.eval_index(collection, key, env),
            Expr::Assignment {
                target, op, value, ..
            } => self.eval_assignment(target, *op, value, env),
            Expr::MethodCall {
                receiver,
                method,
                args,
                ..
            } => self.eval_method_call(receiver, method, args, env),
        }
    }

    fn eval_expr_list(&self, exprs: &[Expr], env: &Rc<RefCell<Environment>>) -> Vec<Value> {
        let mut out = Vec::with_capacity(exprs.len());
        for expr in exprs {
            let value = self.eval_expr(expr, env);
            if value.is_error() {
                return vec![value];
            }
            out.push(value);
        }
        out
    }

    fn eval_hash_literal(&self, pairs: &[HashLiteralPair], env: &Rc<RefCell<Environment>>) -> Value {
        let mut map: AHashMap<HashKey, (Value, Value)> = AHashMap::new();
        for pair in pairs {
            let key = self.eval_expr(&pair.key, env);
            if key.is_error() {
                return key;
            }
            let value = self.eval_expr(&pair.value, env);
            if value.is_error() {
                return value;
            }
            let hash_key = match key.hash_key() {
                Ok(k) => k,
                Err(ty) => return Value::error(format!("unusable as hash key: {ty}")),
            };
            map.insert(hash_key, (key, value));
        }
        Value::hash(map)
    }

    fn eval_infix_expr(
        &self,
        op: &InfixOp,
        left: &Expr,
        right: &Expr,
        env: &Rc<RefCell<Environment>>,
    ) -> Value {
        // && and || short-circuit and never evaluate the right operand once the left already
        // determines the result (spec §4.3.2, §5 "Ordering").
        match op {
            InfixOp::And => {
                let l = self.eval_expr(left, env);
                if l.is_error() {
                    return l;
                }
                if !l.is_truthy() {
                    return Value::Boolean(false);
                }
                let r = self.eval_expr(right, env);
                if r.is_error() {
                    return r;
                }
                Value::Boolean(r.is_truthy())
            }
            InfixOp::Or => {
                let l = self.eval_expr(left, env);
                if l.is_error() {
                    return l;
                }
                if l.is_truthy() {
                    return Value::Boolean(true);
                }
                let r = self.eval_expr(right, env);
                if r.is_error() {
                    return r;
                }
                Value::Boolean(r.is_truthy())
            }
            _ => {
                let l = self.eval_expr(left, env);
                if l.is_error() {
                    return l;
                }
                let r = self.eval_expr(right, env);
                if r.is_error() {
                    return r;
                }
                eval_infix(op, l, r)
            }
        }
    }

    fn eval_call(&self, callee: &Expr, args: &[Expr], env: &Rc<RefCell<Environment>>) -> Value {
        let callee_val = self.eval_expr(callee, env);
        if callee_val.is_error() {
            return callee_val;
        }

        let args = self.eval_expr_list(args, env);
        if args.len() == 1 && args[0].is_error() {
            return args.into_iter().next().unwrap();
        }

        match callee_val {
            Value::Function(func) => self.call_function(&func, &args),
            Value::Builtin(name) => self.call_builtin(name, &args),
            other => Value::error(format!("{} is not callable object", callee_to_name(callee, &other))),
        }
    }

    fn call_function(&self, func: &crate::value::FunctionValue, args: &[Value]) -> Value {
        if func.params.len() != args.len() {
            return Value::error(format!(
                "wrong number of arguments. got={}, want={}",
                args.len(),
                func.params.len()
            ));
        }
        trace!(function = %func.name, args = args.len(), "calling user function");
        let call_env = Environment::new_enclosed(&func.env);
        {
            let mut call_env_mut = call_env.borrow_mut();
            for (param, arg) in func.params.iter().zip(args) {
                call_env_mut.set_inner(param.name.clone(), arg.clone());
            }
        }
        match self.eval_block(&func.body, &call_env) {
            Value::ReturnMarker(inner) => *inner,
            other => other,
        }
    }

    fn eval_index(&self, collection: &Expr, key: &Expr, env: &Rc<RefCell<Environment>>) -> Value {
        let collection_val = self.eval_expr(collection, env);
        if collection_val.is_error() {
            return collection_val;
        }
        let key_val = self.eval_expr(key, env);
        if key_val.is_error() {
            return key_val;
        }
        index_value(&collection_val, &key_val)
    }

    fn eval_assignment(
        &self,
        target: &Expr,
        op: AssignOp,
        value: &Expr,
        env: &Rc<RefCell<Environment>>,
    ) -> Value {
        let rhs = self.eval_expr(value, env);
        if rhs.is_error() {
            return rhs;
        }

        match target {
            Expr::Identifier(ident) => self.assign_identifier(&ident.name, op, rhs, env),
            Expr::Index {
                collection, key, ..
            } => self.assign_index(collection, key, op, rhs, env),
            other => Value::error(format!("invalid assignment target: {other}")),
        }
    }

    fn assign_identifier(
        &self,
        name: &str,
        op: AssignOp,
        rhs: Value,
        env: &Rc<RefCell<Environment>>,
    ) -> Value {
        let Some(current) = env.borrow().get(name) else {
            return Value::error(format!("identifier not found: {name}"));
        };
        let new_value = match op.as_infix() {
            None => rhs,
            Some(infix) => {
                let combined = eval_infix(&infix, current.clone(), rhs.clone());
                if combined.is_error() {
                    return Value::error(format!(
                        "op= operation is not supported for {}, {}",
                        current.type_name(),
                        rhs.type_name()
                    ));
                }
                combined
            }
        };
        env.borrow_mut().set(name, new_value.clone());
        new_value
    }

    fn assign_index(
        &self,
        collection: &Expr,
        key: &Expr,
        op: AssignOp,
        rhs: Value,
        env: &Rc<RefCell<Environment>>,
    ) -> Value {
        let collection_val = self.eval_expr(collection, env);
        if collection_val.is_error() {
            return collection_val;
        }
        let key_val = self.eval_expr(key, env);
        if key_val.is_error() {
            return key_val;
        }

        match &collection_val {
            Value::Array(items) => {
                let idx = match &key_val {
                    Value::Integer(i) => *i,
                    other => {
                        return Value::error(format!(
                            "index operator not supported for ARRAY with {}",
                            other.type_name()
                        ))
                    }
                };
                let len = items.borrow().len() as i64;
                if idx < 0 || idx >= len {
                    return Value::error(format!("array index out of bound: {idx}"));
                }
                let current = items.borrow()[idx as usize].clone();
                let new_value = match op.as_infix() {
                    None => rhs,
                    Some(infix) => {
                        let combined = eval_infix(&infix, current.clone(), rhs.clone());
                        if combined.is_error() {
                            return Value::error(format!(
                                "op= operation is not supported for {}, {}",
                                current.type_name(),
                                rhs.type_name()
                            ));
                        }
                        combined
                    }
                };
                items.borrow_mut()[idx as usize] = new_value.clone();
                new_value
            }
            Value::Hash(pairs) => {
                let hash_key = match key_val.hash_key() {
                    Ok(k) => k,
                    Err(ty) => return Value::error(format!("unusable as hash key: {ty}")),
                };
                let existing = pairs.borrow().get(&hash_key).cloned();
                match (op, existing) {
                    (AssignOp::Assign, _) => {
                        pairs
                            .borrow_mut()
                            .insert(hash_key, (key_val.clone(), rhs.clone()));
                        rhs
                    }
                    (_, None) => {
                        Value::error(format!("{} is not exist in hash", key_val.inspect()))
                    }
                    (_, Some((orig_key, current))) => {
                        let infix = op.as_infix().expect("non-Assign op always has an infix form");
                        let combined = eval_infix(&infix, current.clone(), rhs.clone());
                        if combined.is_error() {
                            return Value::error(format!(
                                "op= operation is not supported for {}, {}",
                                current.type_name(),
                                rhs.type_name()
                            ));
                        }
                        pairs
                            .borrow_mut()
                            .insert(hash_key, (orig_key, combined.clone()));
                        combined
                    }
                }
            }
            other => Value::error(format!(
                "index operator not supported: {}",
                other.type_name()
            )),
        }
    }

    fn eval_method_call(
        &self,
        receiver: &Expr,
        method: &str,
        args: &[Expr],
        env: &Rc<RefCell<Environment>>,
    ) -> Value {
        let receiver_val = self.eval_expr(receiver, env);
        if receiver_val.is_error() {
            return receiver_val;
        }
        let args = self.eval_expr_list(args, env);
        if args.len() == 1 && args[0].is_error() {
            return args.into_iter().next().unwrap();
        }

        match &receiver_val {
            Value::Array(items) => match method {
                "isEmpty" => Value::Boolean(items.borrow().is_empty()),
                "last" => items.borrow().last().cloned().unwrap_or(Value::Null),
                other => Value::error(format!("{other} is unknown method, ARRAY")),
            },
            Value::Hash(pairs) => match method {
                "isEmpty" => Value::Boolean(pairs.borrow().is_empty()),
                "keys" => Value::array(pairs.borrow().values().map(|(k, _)| k.clone()).collect()),
                "values" => Value::array(pairs.borrow().values().map(|(_, v)| v.clone()).collect()),
                other => Value::error(format!("{other} is unknown method, HASH")),
            },
            other => Value::error(format!("{} is not callable object", other.type_name())),
        }
    }

    fn call_builtin(&self, name: &'static str, args: &[Value]) -> Value {
        crate::builtins::call(self, name, args)
    }

    pub(crate) fn write_out(&self, text: &str) {
        if let Err(err) = self.out.borrow_mut().write_all(text.as_bytes()) {
            warn!(error = %err, "failed to write to print sink");
        }
    }
}

fn callee_to_name(callee: &Expr, _value: &Value) -> String {
    callee.to_string()
}

fn eval_prefix(op: &PrefixOp, right: Value) -> Value {
    match op {
        PrefixOp::Bang => Value::Boolean(!right.is_truthy()),
        PrefixOp::Minus => match right {
            Value::Integer(i) => Value::Integer(-i),
            Value::Float(f) => Value::Float(-f),
            other => Value::error(format!("unknown operator: -{}", other.type_name())),
        },
    }
}

fn is_numeric(v: &Value) -> bool {
    matches!(v, Value::Integer(_) | Value::Float(_))
}

fn as_f64(v: &Value) -> f64 {
    match v {
        Value::Integer(i) => *i as f64,
        Value::Float(f) => *f,
        _ => unreachable!("as_f64 called on a non-numeric value"),
    }
}

fn eval_infix(op: &InfixOp, left: Value, right: Value) -> Value {
    match (&left, &right) {
        (Value::Integer(a), Value::Integer(b)) => eval_integer_infix(op, *a, *b),
        (Value::String(a), Value::String(b)) => eval_string_infix(op, a, b),
        (l, r) if is_numeric(l) && is_numeric(r) => eval_float_infix(op, as_f64(l), as_f64(r)),
        _ => {
            if left.type_tag() == right.type_tag() {
                match op {
                    InfixOp::Eq => Value::Boolean(left.equals(&right)),
                    InfixOp::NotEq => Value::Boolean(!left.equals(&right)),
                    _ => Value::error(format!(
                        "unknown operator: {} {op} {}",
                        left.type_name(),
                        right.type_name()
                    )),
                }
            } else {
                match op {
                    InfixOp::Eq => Value::Boolean(false),
                    InfixOp::NotEq => Value::Boolean(true),
                    _ => Value::error(format!(
                        "type mismatch: {} {op} {}",
                        left.type_name(),
                        right.type_name()
                    )),
                }
            }
        }
    }
}

fn eval_integer_infix(op: &InfixOp, a: i64, b: i64) -> Value {
    match op {
        InfixOp::Add => Value::Integer(a.wrapping_add(b)),
        InfixOp::Sub => Value::Integer(a.wrapping_sub(b)),
        InfixOp::Mul => Value::Integer(a.wrapping_mul(b)),
        InfixOp::Div => {
            if b == 0 {
                Value::error("division by zero")
            } else {
                Value::Integer(a.wrapping_div(b))
            }
        }
        InfixOp::Mod => {
            if b == 0 {
                Value::error("modulo by zero")
            } else {
                Value::Integer(a.wrapping_rem(b))
            }
        }
        InfixOp::Eq => Value::Boolean(a == b),
        InfixOp::NotEq => Value::Boolean(a != b),
        InfixOp::Lt => Value::Boolean(a < b),
        InfixOp::Gt => Value::Boolean(a > b),
        InfixOp::LtEq => Value::Boolean(a <= b),
        InfixOp::GtEq => Value::Boolean(a >= b),
        InfixOp::BitAnd => Value::Integer(a & b),
        InfixOp::BitOr => Value::Integer(a | b),
        InfixOp::BitXor => Value::Integer(a ^ b),
        InfixOp::Shl => Value::Integer(a.wrapping_shl((b.rem_euclid(64)) as u32)),
        InfixOp::Shr => Value::Integer(a.wrapping_shr((b.rem_euclid(64)) as u32)),
        InfixOp::And => Value::Boolean(a != 0 && b != 0),
        InfixOp::Or => Value::Boolean(a != 0 || b != 0),
    }
}

fn eval_float_infix(op: &InfixOp, a: f64, b: f64) -> Value {
    match op {
        InfixOp::Add => Value::Float(a + b),
        InfixOp::Sub => Value::Float(a - b),
        InfixOp::Mul => Value::Float(a * b),
        InfixOp::Div => Value::Float(a / b),
        InfixOp::Mod => Value::Float(a % b), // Rust's `%` on f64 is C fmod: remainder towards zero.
        InfixOp::Eq => Value::Boolean(a == b),
        InfixOp::NotEq => Value::Boolean(a != b),
        InfixOp::Lt => Value::Boolean(a < b),
        InfixOp::Gt => Value::Boolean(a > b),
        InfixOp::LtEq => Value::Boolean(a <= b),
        InfixOp::GtEq => Value::Boolean(a >= b),
        InfixOp::BitAnd | InfixOp::BitOr | InfixOp::BitXor | InfixOp::Shl | InfixOp::Shr => {
            Value::error(format!("unknown operator: {op} FLOAT"))
        }
        InfixOp::And => Value::Boolean(a != 0.0 && b != 0.0),
        InfixOp::Or => Value::Boolean(a != 0.0 || b != 0.0),
    }
}

fn eval_string_infix(op: &InfixOp, a: &str, b: &str) -> Value {
    match op {
        InfixOp::Add => Value::string(format!("{a}{b}")),
        InfixOp::Eq => Value::Boolean(a == b),
        InfixOp::NotEq => Value::Boolean(a != b),
        _ => Value::error(format!("unknown operator: STRING {op} STRING")),
    }
}

pub(crate) fn index_value(collection: &Value, key: &Value) -> Value {
    match collection {
        Value::Array(items) => match key {
            Value::Integer(idx) => {
                let items = items.borrow();
                if *idx < 0 || *idx as usize >= items.len() {
                    Value::error(format!("array index out of bound: {idx}"))
                } else {
                    items[*idx as usize].clone()
                }
            }
            other => Value::error(format!(
                "index operator not supported for ARRAY with {}",
                other.type_name()
            )),
        },
        Value::Hash(pairs) => match key.hash_key() {
            Ok(hash_key) => pairs
                .borrow()
                .get(&hash_key)
                .map(|(_, v)| v.clone())
                .unwrap_or(Value::Null),
            Err(ty) => Value::error(format!("unusable as hash key: {ty}")),
        },
        other => Value::error(format!(
            "index operator not supported: {}",
            other.type_name()
        )),
    }
}

/// Materializes a container's iteration sequence as `(primary, secondary)` pairs up front,
/// rather than mutating a cursor stored on the value itself (spec §9 REDESIGN FLAG direction).
/// Since a fresh `Vec` is built on every `for` entry, a container can be iterated again from
/// scratch with no reset step needed, and (unlike the source interpreter) nested iteration of
/// the same container is safe too — the spec only requires the sequential case to work.
fn iterate(container: &Value) -> Result<(bool, Vec<(Value, Value)>), &'static str> {
    match container {
        Value::Array(items) => {
            let items = items.borrow();
            Ok((
                false,
                items
                    .iter()
                    .enumerate()
                    .map(|(i, v)| (v.clone(), Value::Integer(i as i64)))
                    .collect(),
            ))
        }
        Value::String(s) => Ok((
            false,
            s.chars()
                .enumerate()
                .map(|(i, c)| (Value::string(c.to_string()), Value::Integer(i as i64)))
                .collect(),
        )),
        Value::Hash(pairs) => {
            let pairs = pairs.borrow();
            Ok((
                true,
                pairs
                    .values()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect(),
            ))
        }
        other => Err(other.type_name()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_program;

    fn run(src: &str) -> (Value, Vec<u8>) {
        let (program, errors) = parse_program(src);
        assert!(errors.is_empty(), "{errors:?}");
        let env = Environment::new_root();
        let evaluator = Evaluator::new(Vec::new());
        let result = evaluator.eval_program(&program, &env);
        (result, evaluator.into_inner())
    }

    #[test]
    fn accumulator_loop() {
        let (result, _) = run("let a = 0; for v in [10,20,30] { a += v }; a;");
        assert!(matches!(result, Value::Integer(60)));
    }

    #[test]
    fn recursive_fibonacci() {
        let (result, _) = run(
            "func fib(n) { if (n < 2) { return n }; return fib(n-1) + fib(n-2); }; fib(10);",
        );
        assert!(matches!(result, Value::Integer(55)));
    }

    #[test]
    fn hash_insert_and_len() {
        let (result, _) = run("let h = {\"a\": 1}; h[\"b\"] = 2; len(h);");
        assert!(matches!(result, Value::Integer(2)));
    }

    #[test]
    fn string_concatenation() {
        let (result, _) = run("\"Hello\" + \" \" + \"World!\";");
        match result {
            Value::String(s) => assert_eq!(&*s, "Hello World!"),
            other => panic!("expected string, got {other:?}"),
        }
    }

    #[test]
    fn descending_range() {
        let (result, _) = run("range(5,1,-1);");
        match result {
            Value::Array(items) => {
                let items = items.borrow();
                let ints: Vec<i64> = items
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
    fn closures_capture_by_reference() {
        let (result, _) = run(
            "let c = 0; func make() { let x = 0; func inc() { x += 1; return x }; return inc }; \
             let f = make(); f(); f(); f();",
        );
        assert!(matches!(result, Value::Integer(3)));
    }

    #[test]
    fn type_mismatch_error() {
        let (result, _) = run("5 + true;");
        match result {
            Value::Error(msg) => assert_eq!(msg, "type mismatch: INTEGER + BOOLEAN"),
            other => panic!("expected error, got {other:?}"),
        }
    }

    #[test]
    fn array_index_out_of_bound_error() {
        let (result, _) = run("[1,2,3][3];");
        match result {
            Value::Error(msg) => assert_eq!(msg, "array index out of bound: 3"),
            other => panic!("expected error, got {other:?}"),
        }
    }

    #[test]
    fn negative_array_index_is_out_of_bounds() {
        let (result, _) = run("[1,2,3][-1];");
        assert!(matches!(result, Value::Error(_)));
    }

    #[test]
    fn hash_missing_key_reads_as_null() {
        let (result, _) = run("let h = {}; h[\"missing\"];");
        assert!(matches!(result, Value::Null));
    }

    #[test]
    fn hash_compound_assign_on_missing_key_errors() {
        let (result, _) = run("let h = {}; h[\"x\"] += 1;");
        assert!(matches!(result, Value::Error(_)));
    }

    #[test]
    fn division_by_zero_is_an_error_value() {
        let (result, _) = run("1 / 0;");
        match result {
            Value::Error(msg) => assert_eq!(msg, "division by zero"),
            other => panic!("expected error, got {other:?}"),
        }
    }

    #[test]
    fn short_circuit_or_skips_right_side_error() {
        // If the right side were evaluated, this would error on an undefined identifier.
        let (result, _) = run("true || undefined_name;");
        assert!(matches!(result, Value::Boolean(true)));
    }

    #[test]
    fn for_with_two_binders_over_array_binds_index_then_value() {
        let (result, _) = run("let out = []; for i, v in [10,20] { out = append(out, i) }; out;");
        match result {
            Value::Array(items) => {
                let items = items.borrow();
                assert!(matches!(items[0], Value::Integer(0)));
                assert!(matches!(items[1], Value::Integer(1)));
            }
            other => panic!("expected array, got {other:?}"),
        }
    }

    #[test]
    fn for_with_two_binders_over_hash_binds_key_then_value() {
        let (result, _) = run("let out = []; for k, v in {\"a\": 1} { out = append(out, k) }; out;");
        match result {
            Value::Array(items) => {
                let items = items.borrow();
                match &items[0] {
                    Value::String(s) => assert_eq!(&**s, "a"),
                    other => panic!("expected string key, got {other:?}"),
                }
            }
            other => panic!("expected array, got {other:?}"),
        }
    }

    #[test]
    fn arity_mismatch_is_a_runtime_error_not_a_panic() {
        let (result, _) = run("func f(a, b) { return a + b; }; f(1);");
        match result {
            Value::Error(msg) => assert_eq!(msg, "wrong number of arguments. got=1, want=2"),
            other => panic!("expected error, got {other:?}"),
        }
    }

    #[test]
    fn array_method_dispatch() {
        let (result, _) = run("[1,2,3].last();");
        assert!(matches!(result, Value::Integer(3)));
    }

    #[test]
    fn hash_method_dispatch_keys_and_values() {
        let (result, _) = run("{\"a\": 1}.isEmpty();");
        assert!(matches!(result, Value::Boolean(false)));
    }
}
