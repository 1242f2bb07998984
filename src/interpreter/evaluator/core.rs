use std::{cell::Cell, collections::HashMap, sync::Arc};

use tracing::trace;

use crate::{
    error::RuntimeError,
    interpreter::{
        compiler::{ClosureNode, Node, Root},
        evaluator::{
            access::follow_path,
            function::core::{Call, Outcome},
            scope::Scope,
        },
        registry::{Function, ParserContext},
        value::core::Value,
    },
};

/// Result type used by the evaluator.
///
/// All evaluation functions return either a value of type `T` or a
/// `RuntimeError` describing the failure.
pub type EvalResult<T> = Result<T, RuntimeError>;

/// The per-evaluation inputs: the initial current value and named globals.
///
/// ## Example
/// ```
/// use weft::interpreter::{evaluator::core::InvocationContext, value::core::Value};
///
/// let context = InvocationContext::new(Value::from("root")).with_extra("user", Value::from(7));
///
/// assert_eq!(context.global("user"), Some(&Value::from(7)));
/// assert_eq!(context.global("other"), None);
/// ```
#[derive(Debug, Clone, Default)]
pub struct InvocationContext {
    /// The value `.` refers to at the top level.
    pub default: Value,
    /// Globals available as `$name`.
    pub extra:   HashMap<String, Value>,
}

impl InvocationContext {
    /// Creates a context with no globals.
    #[must_use]
    pub fn new(default: Value) -> Self {
        Self { default,
               extra: HashMap::new() }
    }

    /// Adds a global.
    #[must_use]
    pub fn with_extra(mut self, name: impl Into<String>, value: Value) -> Self {
        self.extra.insert(name.into(), value);
        self
    }

    /// Looks up a global.
    #[must_use]
    pub fn global(&self, name: &str) -> Option<&Value> {
        self.extra.get(name)
    }
}

impl From<Value> for InvocationContext {
    fn from(default: Value) -> Self {
        Self::new(default)
    }
}

/// Walks compiled nodes for one evaluation.
///
/// An evaluator borrows the registry and the invocation context for the
/// duration of a single `evaluate` or `render` call and tracks the current
/// call depth. Function names are resolved against the registry at the moment
/// of each call.
pub struct Evaluator<'a> {
    registry:   &'a ParserContext,
    invocation: &'a InvocationContext,
    depth:      Cell<usize>,
}

/// Decrements the call depth when a call returns, on every exit path.
struct DepthGuard<'a> {
    depth: &'a Cell<usize>,
}

impl Drop for DepthGuard<'_> {
    fn drop(&mut self) {
        self.depth.set(self.depth.get().saturating_sub(1));
    }
}

impl<'a> Evaluator<'a> {
    /// Creates an evaluator over a registry and an invocation context.
    #[must_use]
    pub const fn new(registry: &'a ParserContext, invocation: &'a InvocationContext) -> Self {
        Self { registry,
               invocation,
               depth: Cell::new(0) }
    }

    /// The invocation context of this evaluation.
    #[must_use]
    pub const fn invocation(&self) -> &'a InvocationContext {
        self.invocation
    }

    /// Evaluates a node.
    ///
    /// # Parameters
    /// - `node`: The node to evaluate.
    /// - `current`: The value `.` refers to.
    /// - `scope`: Closure parameters and closures in scope.
    ///
    /// # Returns
    /// The resulting value, or `None` if it is absent.
    pub fn eval(&self,
                node: &Node,
                current: Option<&Value>,
                scope: &Scope)
                -> EvalResult<Option<Value>> {
        match node {
            Node::Literal(value) => Ok(Some(value.clone())),
            Node::Access { root, path, offset } => {
                let base = match root {
                    Root::Current => current,
                    Root::Global(name) => Some(self.global(name)?),
                    Root::Param(name) => scope.param(name).flatten(),
                };
                follow_path(base, path, *offset)
            },
            Node::Pipe { head, stages } => self.eval_pipe(head, stages, current, scope),
            Node::DefineClosure(_) => Ok(current.cloned()),
            Node::Call { .. } | Node::InvokeClosure { .. } => {
                self.eval_stage(node, None, current, scope)
            },
        }
    }

    fn global(&self, name: &str) -> EvalResult<&'a Value> {
        self.invocation
            .global(name)
            .ok_or_else(|| RuntimeError::MissingGlobal { name: name.to_string() })
    }

    /// Threads a value through a pipe chain.
    ///
    /// The head's result seeds the chain; each stage is called with the
    /// previous result as its parent. A closure definition anywhere in the
    /// chain is in scope for every later stage and passes its input through.
    fn eval_pipe(&self,
                 head: &Node,
                 stages: &[Node],
                 current: Option<&Value>,
                 scope: &Scope)
                 -> EvalResult<Option<Value>> {
        let mut scope = scope.clone();

        let mut seed = match head {
            Node::DefineClosure(def) => {
                scope = scope.with_closure(Arc::clone(def));
                current.cloned()
            },
            _ => self.eval(head, current, &scope)?,
        };

        for stage in stages {
            seed = match stage {
                Node::DefineClosure(def) => {
                    scope = scope.with_closure(Arc::clone(def));
                    seed
                },
                _ => self.eval_stage(stage, Some(seed), current, &scope)?,
            };
        }

        Ok(seed)
    }

    /// Calls a function or closure.
    ///
    /// `piped` carries the previous stage's result; without it the parent is
    /// the current value.
    fn eval_stage(&self,
                  node: &Node,
                  piped: Option<Option<Value>>,
                  current: Option<&Value>,
                  scope: &Scope)
                  -> EvalResult<Option<Value>> {
        let is_piped = piped.is_some();
        let parent = piped.unwrap_or_else(|| current.cloned());

        match node {
            Node::Call { name,
                         arguments,
                         offset, } => {
                let function =
                    self.registry
                        .resolve(name)
                        .ok_or_else(|| RuntimeError::UnknownFunction { name:   name.clone(),
                                                                       offset: *offset, })?;
                let call =
                    Call::new(name, arguments, parent, current, scope, self, *offset).piped(is_piped);
                self.dispatch(&function, &call)
            },
            Node::InvokeClosure { name,
                                  arguments,
                                  offset, } => {
                let call =
                    Call::new(name, arguments, parent, current, scope, self, *offset).piped(is_piped);
                if let Some((def, env)) = scope.closure(name) {
                    return self.invoke_closure(def, env, &call);
                }
                match self.registry.resolve(name) {
                    Some(function) => self.dispatch(&function, &call),
                    None => Err(RuntimeError::UnknownClosure { name:   name.clone(),
                                                               offset: *offset, }),
                }
            },
            other => self.eval(other, current, scope),
        }
    }

    /// Runs a registry entry.
    fn dispatch(&self, function: &Function, call: &Call<'_>) -> EvalResult<Option<Value>> {
        match function {
            Function::Native(native) => {
                let _guard = self.enter(call.offset())?;
                trace!(name = call.name(), arguments = call.len(), "calling function");
                match native(call)? {
                    Outcome::Value(value) => Ok(value),
                    Outcome::Deferred(transform) => transform(call.current().cloned()),
                }
            },
            Function::Closure(def) => self.invoke_closure(def, &Scope::new(), call),
        }
    }

    /// Invokes a closure.
    ///
    /// Arguments are evaluated in the caller's scope and bound to the
    /// parameters in a new frame over the closure's captured scope. The body
    /// runs with `.` bound to the parent.
    fn invoke_closure(&self,
                      def: &ClosureNode,
                      env: &Scope,
                      call: &Call<'_>)
                      -> EvalResult<Option<Value>> {
        if call.len() != def.params.len() {
            return Err(RuntimeError::ArgumentCountMismatch { name:     format!("@{}", def.name),
                                                             expected: def.params.len().to_string(),
                                                             found:    call.len(),
                                                             offset:   call.offset(), });
        }

        let bindings = def.params
                          .iter()
                          .cloned()
                          .zip(call.args()?)
                          .collect::<HashMap<_, _>>();

        let _guard = self.enter(call.offset())?;
        trace!(name = %def.name, params = ?def.params, "invoking closure");

        self.eval(&def.body, call.parent(), &env.with_params(bindings))
    }

    /// Enters one level of call nesting.
    ///
    /// # Errors
    /// Returns [`RuntimeError::CallDepthExceeded`] past the registry's limit.
    fn enter(&self, offset: usize) -> EvalResult<DepthGuard<'_>> {
        let limit = self.registry.options().max_call_depth;
        let depth = self.depth.get() + 1;
        if depth > limit {
            return Err(RuntimeError::CallDepthExceeded { limit, offset });
        }
        self.depth.set(depth);
        Ok(DepthGuard { depth: &self.depth })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::interpreter::{
        compiler::{CompileOptions, compile_expression},
        parser::core::parse_expression,
    };

    fn eval_with(registry: &ParserContext,
                 source: &str,
                 input: serde_json::Value)
                 -> EvalResult<Option<Value>> {
        let expr = parse_expression(source).unwrap();
        let compiled = compile_expression(&expr, &CompileOptions::default()).unwrap();
        let invocation = InvocationContext::new(Value::from(input));
        Evaluator::new(registry, &invocation).eval(&compiled.root,
                                                   Some(&invocation.default),
                                                   &Scope::new())
    }

    #[test]
    fn literals_and_accessors() {
        let registry = ParserContext::new();

        assert_eq!(eval_with(&registry, "'x'", json!(null)).unwrap(), Some(Value::from("x")));
        assert_eq!(eval_with(&registry, ".a.b", json!({"a": {"b": 2}})).unwrap(),
                   Some(Value::from(2)));
        assert_eq!(eval_with(&registry, ".fake", json!({})).unwrap(), None);
    }

    #[test]
    fn stages_receive_the_previous_result() {
        let registry = ParserContext::new();
        registry.register_function("parent", |call| Ok(Outcome::Value(call.parent().cloned())));

        let result = eval_with(&registry, ".a | parent | parent", json!({"a": 5})).unwrap();
        assert_eq!(result, Some(Value::from(5)));

        let head = eval_with(&registry, "parent", json!("root")).unwrap();
        assert_eq!(head, Some(Value::from("root")));
    }

    #[test]
    fn unknown_names() {
        let registry = ParserContext::new();

        assert!(matches!(eval_with(&registry, "nope", json!(null)),
                         Err(RuntimeError::UnknownFunction { .. })));
        assert!(matches!(eval_with(&registry, "@nope", json!(null)),
                         Err(RuntimeError::UnknownClosure { .. })));
    }

    #[test]
    fn deferred_outcome_is_applied_to_the_current_value() {
        let registry = ParserContext::new();
        registry.register_function("kind", |_| {
                    Ok(Outcome::Deferred(Box::new(|value: Option<Value>| {
                        Ok(value.map(|v| Value::from(v.type_name())))
                    })))
                });

        let result = eval_with(&registry, "'x' | kind", json!([1])).unwrap();
        assert_eq!(result, Some(Value::from("sequence")));
    }

    #[test]
    fn depth_is_restored_after_errors() {
        let registry = ParserContext::new();
        registry.register_function("fail", |call| Err(call.error("boom")));
        let invocation = InvocationContext::default();
        let evaluator = Evaluator::new(&registry, &invocation);
        let compiled = compile_expression(&parse_expression("fail").unwrap(),
                                          &CompileOptions::default()).unwrap();

        assert!(evaluator.eval(&compiled.root, None, &Scope::new()).is_err());
        assert_eq!(evaluator.depth.get(), 0);
    }
}
