//! Lexically scoped environments (spec §3.4).

use std::cell::RefCell;
use std::rc::Rc;

use smallvec::SmallVec;

use crate::value::Value;

/// A single scope: a name-to-value mapping plus an optional parent link.
///
/// Bindings are kept as a flat, linearly-scanned `SmallVec` rather than a hash map — most
/// scopes (function calls, `if`/`for` bodies) hold only a handful of names, so a short inline
/// scan beats hashing for the common case and only the root scope (pre-populated with every
/// builtin) ever spills to the heap.
///
/// Child environments are created on function call (parented to the function's captured
/// environment — the closure discipline), and on every `if`/`else` branch and `for` iteration.
#[derive(Debug)]
pub struct Environment {
    store: SmallVec<[(String, Value); 8]>,
    parent: Option<Rc<RefCell<Environment>>>,
}

impl Environment {
    /// A fresh top-level scope with every builtin name pre-bound (spec §4.3.3) — shadowing one
    /// with `let` is legal, same as any other identifier.
    pub fn new_root() -> Rc<RefCell<Self>> {
        let store = crate::builtins::NAMES
            .iter()
            .map(|&name| (name.to_string(), Value::Builtin(name)))
            .collect();
        Rc::new(RefCell::new(Self {
            store,
            parent: None,
        }))
    }

    pub fn new_enclosed(parent: &Rc<RefCell<Environment>>) -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self {
            store: SmallVec::new(),
            parent: Some(Rc::clone(parent)),
        }))
    }

    /// Looks up `name`, walking parent scopes.
    pub fn get(&self, name: &str) -> Option<Value> {
        if let Some((_, v)) = self.store.iter().find(|(n, _)| n == name) {
            return Some(v.clone());
        }
        match &self.parent {
            Some(parent) => parent.borrow().get(name),
            None => None,
        }
    }

    /// Always inserts into *this* scope, shadowing any outer binding of the same name. Used for
    /// function parameters and loop binders (spec §3.4).
    pub fn set_inner(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        if let Some(slot) = self.store.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = value;
        } else {
            self.store.push((name, value));
        }
    }

    /// Mutates the nearest enclosing scope that already defines `name`. Returns `false` if no
    /// scope defines it (the caller is expected to report "identifier not found").
    pub fn set(&mut self, name: &str, value: Value) -> bool {
        if let Some(slot) = self.store.iter_mut().find(|(n, _)| n == name) {
            slot.1 = value;
            return true;
        }
        match &self.parent {
            Some(parent) => parent.borrow_mut().set(name, value),
            None => false,
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.store.iter().any(|(n, _)| n == name)
            || self.parent.as_ref().is_some_and(|p| p.borrow().contains(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_mutates_nearest_defining_scope() {
        let root = Environment::new_root();
        root.borrow_mut().set_inner("x", Value::Integer(1));

        let child = Environment::new_enclosed(&root);
        assert!(child.borrow_mut().set("x", Value::Integer(2)));
        assert!(matches!(root.borrow().get("x"), Some(Value::Integer(2))));
    }

    #[test]
    fn set_inner_shadows_outer_binding() {
        let root = Environment::new_root();
        root.borrow_mut().set_inner("x", Value::Integer(1));

        let child = Environment::new_enclosed(&root);
        child.borrow_mut().set_inner("x", Value::Integer(99));

        assert!(matches!(child.borrow().get("x"), Some(Value::Integer(99))));
        assert!(matches!(root.borrow().get("x"), Some(Value::Integer(1))));
    }

    #[test]
    fn set_on_undefined_name_fails() {
        let root = Environment::new_root();
        assert!(!root.borrow_mut().set("missing", Value::Null));
    }

    #[test]
    fn get_walks_parent_chain() {
        let root = Environment::new_root();
        root.borrow_mut().set_inner("x", Value::Integer(7));
        let child = Environment::new_enclosed(&root);
        let grandchild = Environment::new_enclosed(&child);
        assert!(matches!(grandchild.borrow().get("x"), Some(Value::Integer(7))));
    }
}
