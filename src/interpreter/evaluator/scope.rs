use std::{collections::HashMap, rc::Rc, sync::Arc};

use crate::interpreter::{compiler::ClosureNode, value::core::Value};

/// A chain of immutable frames binding closure parameters and closures.
///
/// Extending a scope never changes it: [`Scope::with_params`] and
/// [`Scope::with_closure`] return a new scope whose innermost frame shadows
/// the frames below it. Cloning is a reference count bump.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    top: Option<Rc<Frame>>,
}

#[derive(Debug)]
struct Frame {
    binding: Binding,
    parent:  Scope,
}

#[derive(Debug)]
enum Binding {
    Params(HashMap<String, Option<Value>>),
    Closure {
        def: Arc<ClosureNode>,
        env: Scope,
    },
}

impl Scope {
    /// An empty scope.
    #[must_use]
    pub const fn new() -> Self {
        Self { top: None }
    }

    fn push(&self, binding: Binding) -> Self {
        Self { top: Some(Rc::new(Frame { binding,
                                         parent: self.clone() })) }
    }

    /// Returns a scope with one more frame of parameter bindings.
    #[must_use]
    pub fn with_params(&self, params: HashMap<String, Option<Value>>) -> Self {
        self.push(Binding::Params(params))
    }

    /// Returns a scope in which `def` is callable as `@name`.
    ///
    /// The closure captures `self` as its environment, so its body does not
    /// see the closure itself.
    #[must_use]
    pub fn with_closure(&self, def: Arc<ClosureNode>) -> Self {
        self.push(Binding::Closure { def,
                                     env: self.clone() })
    }

    fn frames(&self) -> impl Iterator<Item = &Frame> {
        std::iter::successors(self.top.as_deref(), |&frame| frame.parent.top.as_deref())
    }

    /// Looks up a parameter, innermost frame first.
    ///
    /// The outer `Option` tells whether the name is bound at all; the inner
    /// one is the bound value, which may be absent.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<Option<&Value>> {
        self.frames().find_map(|frame| match &frame.binding {
                         Binding::Params(params) => params.get(name).map(Option::as_ref),
                         Binding::Closure { .. } => None,
                     })
    }

    /// Looks up a closure, innermost frame first.
    ///
    /// # Returns
    /// The definition and the scope it captured.
    #[must_use]
    pub fn closure(&self, name: &str) -> Option<(&Arc<ClosureNode>, &Scope)> {
        self.frames().find_map(|frame| match &frame.binding {
                         Binding::Closure { def, env } if def.name == name => Some((def, env)),
                         _ => None,
                     })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::compiler::Node;

    fn closure(name: &str) -> Arc<ClosureNode> {
        Arc::new(ClosureNode { name:   name.to_string(),
                               params: vec![],
                               body:   Node::Literal(Value::Null),
                               offset: 0, })
    }

    fn params(pairs: &[(&str, f64)]) -> HashMap<String, Option<Value>> {
        pairs.iter()
             .map(|(k, v)| ((*k).to_string(), Some(Value::from(*v))))
             .collect()
    }

    #[test]
    fn inner_frames_shadow_outer_ones() {
        let outer = Scope::new().with_params(params(&[("a", 1.0), ("b", 2.0)]));
        let inner = outer.with_params(params(&[("a", 10.0)]));

        assert_eq!(inner.param("a"), Some(Some(&Value::from(10.0))));
        assert_eq!(inner.param("b"), Some(Some(&Value::from(2.0))));
        assert_eq!(outer.param("a"), Some(Some(&Value::from(1.0))));
        assert_eq!(inner.param("c"), None);
    }

    #[test]
    fn closures_capture_the_scope_before_them() {
        let scope = Scope::new().with_closure(closure("f"));
        let (def, env) = scope.closure("f").unwrap();

        assert_eq!(def.name, "f");
        assert!(env.closure("f").is_none());
    }

    #[test]
    fn absent_parameters_are_bound() {
        let mut bound = HashMap::new();
        bound.insert("x".to_string(), None);
        let scope = Scope::new().with_params(bound);

        assert_eq!(scope.param("x"), Some(None));
    }
}
