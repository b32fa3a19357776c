/*
 * namespace.rs
 *
 * Copyright (C) 2026 Nucleus Contributors. All rights reserved.
 *
 */

use std::collections::HashMap;

/// A value a [`crate::runtime::Runtime`] can store in a namespace. This is
/// deliberately tiny — it exists only so the reference `ExprRuntime` (see
/// `runtime.rs`) has something concrete to hold. A production language
/// backend would bring its own object representation and would not touch
/// this type.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Bool(bool),
    Str(String),
    None,
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{n}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Str(s) => write!(f, "{s:?}"),
            Value::None => write!(f, "None"),
        }
    }
}

/// An open mapping from names to values. [`UserNamespace`] is the
/// top-level, long-lived instance; debugger-selected stack frames expose
/// their own locals/globals through the same trait (§3's DebugFrameStack).
pub trait Namespace {
    fn get(&self, name: &str) -> Option<&Value>;
    fn set(&mut self, name: &str, value: Value);
    fn names(&self) -> Vec<String>;
}

/// The single, long-lived, user-visible state (§3). Created at kernel
/// start; never destroyed until process exit; shared by Executor and
/// Debugger, though only one of them is ever active at a time (§5).
pub struct UserNamespace {
    /// Seeded with a distinguished module-like entry treated as "main",
    /// matching the reference REPL's `__main__` module convention.
    vars: HashMap<String, Value>,
}

impl UserNamespace {
    pub fn new() -> Self {
        let mut vars = HashMap::new();
        vars.insert("__name__".to_string(), Value::Str("__main__".to_string()));
        UserNamespace { vars }
    }
}

impl Default for UserNamespace {
    fn default() -> Self {
        Self::new()
    }
}

impl Namespace for UserNamespace {
    fn get(&self, name: &str) -> Option<&Value> {
        self.vars.get(name)
    }

    fn set(&mut self, name: &str, value: Value) {
        self.vars.insert(name.to_string(), value);
    }

    fn names(&self) -> Vec<String> {
        self.vars.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_with_main_module_name() {
        let ns = UserNamespace::new();
        assert_eq!(ns.get("__name__"), Some(&Value::Str("__main__".to_string())));
    }

    #[test]
    fn set_then_get_round_trips() {
        let mut ns = UserNamespace::new();
        ns.set("x", Value::Int(42));
        assert_eq!(ns.get("x"), Some(&Value::Int(42)));
    }
}
