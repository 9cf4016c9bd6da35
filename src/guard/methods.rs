//! Ad-hoc methods registered on a machine at runtime.
//!
//! A method is a closure over JSON values. Dependent predicates named in a
//! [`TransitionRule`](super::TransitionRule) are resolved here first, with
//! the acting role as the only argument.

use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use crate::core::inflect::underscore;
use crate::machine::MachineError;

/// A registered method.
pub type Method = Arc<dyn Fn(&[Value]) -> Value + Send + Sync>;

/// Result of calling a method by name.
#[derive(Clone, Debug, PartialEq)]
pub enum MethodOutcome {
    /// The method exists and returned this value
    Handled(Value),
    /// Nothing is registered under that name
    Unhandled,
}

impl MethodOutcome {
    pub fn is_unhandled(&self) -> bool {
        matches!(self, Self::Unhandled)
    }

    pub fn into_value(self) -> Option<Value> {
        match self {
            Self::Handled(value) => Some(value),
            Self::Unhandled => None,
        }
    }
}

/// Name -> method map. Names are compared in underscored form, so
/// `hasTools` and `has_tools` are the same method.
#[derive(Clone, Default)]
pub struct MethodRegistry {
    methods: HashMap<String, Method>,
    reserved: HashSet<String>,
}

impl MethodRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a name as taken without attaching a callable to it.
    pub(crate) fn reserve(&mut self, name: &str) {
        self.reserved.insert(underscore(name));
    }

    /// Whether `name` is registered or reserved.
    pub fn contains(&self, name: &str) -> bool {
        let key = underscore(name);
        self.methods.contains_key(&key) || self.reserved.contains(&key)
    }

    /// Register `method` under `name`.
    ///
    /// Fails with [`MachineError::DuplicateMethod`] if the name is taken.
    pub fn add<F>(&mut self, name: &str, method: F) -> Result<(), MachineError>
    where
        F: Fn(&[Value]) -> Value + Send + Sync + 'static,
    {
        if self.contains(name) {
            return Err(MachineError::DuplicateMethod {
                name: name.to_string(),
            });
        }
        self.methods.insert(underscore(name), Arc::new(method));
        Ok(())
    }

    /// Call `name` with `args`. Unknown names are not an error.
    pub fn call(&self, name: &str, args: &[Value]) -> MethodOutcome {
        match self.methods.get(&underscore(name)) {
            Some(method) => MethodOutcome::Handled(method(args)),
            None => MethodOutcome::Unhandled,
        }
    }

    /// Evaluate `name` as a role predicate.
    ///
    /// `None` when no method is registered under `name`. A method that
    /// answers with anything but a boolean counts as `false`.
    pub fn predicate(&self, name: &str, role: &str) -> Option<bool> {
        let value = self
            .call(name, &[Value::String(role.to_string())])
            .into_value()?;

        match value {
            Value::Bool(result) => Some(result),
            other => {
                tracing::warn!(method = name, value = %other, "predicate returned a non-boolean value");
                Some(false)
            }
        }
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}

impl fmt::Debug for MethodRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.methods.keys().collect();
        names.sort();
        f.debug_struct("MethodRegistry")
            .field("methods", &names)
            .field("reserved", &self.reserved.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn call_returns_method_value() {
        let mut methods = MethodRegistry::new();
        methods
            .add("whatIsMyName", |args| {
                json!(format!("Vehicle-{}", args[0].as_str().unwrap_or_default()))
            })
            .unwrap();

        assert_eq!(
            methods.call("what_is_my_name", &[json!("Toybota")]),
            MethodOutcome::Handled(json!("Vehicle-Toybota"))
        );
    }

    #[test]
    fn unknown_method_is_unhandled() {
        let methods = MethodRegistry::new();
        assert!(methods.call("foobar", &[]).is_unhandled());
        assert_eq!(methods.predicate("foobar", "driver"), None);
    }

    #[test]
    fn duplicate_registration_fails() {
        let mut methods = MethodRegistry::new();
        methods.add("fooBar", |_| Value::Null).unwrap();
        methods.add("foobar", |_| Value::Null).unwrap();

        let result = methods.add("foo_bar", |_| Value::Null);
        assert!(matches!(
            result,
            Err(MachineError::DuplicateMethod { name }) if name == "foo_bar"
        ));
    }

    #[test]
    fn reserved_names_count_as_taken() {
        let mut methods = MethodRegistry::new();
        methods.reserve("is_parked");

        assert!(methods.contains("isParked"));
        assert!(methods.add("is_parked", |_| Value::Null).is_err());
        assert!(methods.call("is_parked", &[]).is_unhandled());
    }

    #[test]
    fn predicate_receives_role() {
        let mut methods = MethodRegistry::new();
        methods
            .add("has_tools", |args| json!(args[0] == json!("mechanic")))
            .unwrap();

        assert_eq!(methods.predicate("hasTools", "mechanic"), Some(true));
        assert_eq!(methods.predicate("has_tools", "driver"), Some(false));
    }

    #[test]
    fn non_boolean_predicate_is_false() {
        let mut methods = MethodRegistry::new();
        methods.add("has_key", |_| json!("yes")).unwrap();

        assert_eq!(methods.predicate("has_key", "driver"), Some(false));
    }
}
