use std::{
    collections::HashMap,
    fmt,
    sync::{
        Arc, PoisonError, RwLock,
        atomic::{AtomicUsize, Ordering},
    },
};

use tracing::debug;

use crate::{
    error::ParseError,
    interpreter::{
        compiler::{ClosureNode, compile_closure},
        evaluator::{
            core::EvalResult,
            function::core::{Call, Outcome},
        },
        parser::core::parse_closure_definition,
    },
};

/// Signature of a native function.
///
/// A native function inspects the [`Call`] (parent value, current value and
/// lazily evaluable arguments) and produces an [`Outcome`].
pub type NativeFn = dyn Fn(&Call<'_>) -> EvalResult<Outcome> + Send + Sync;

/// A registry entry.
#[derive(Clone)]
pub enum Function {
    /// A Rust function, either a builtin or supplied by the host.
    Native(Arc<NativeFn>),
    /// A closure defined in the language and registered by name.
    Closure(Arc<ClosureNode>),
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Native(_) => write!(f, "Native(..)"),
            Self::Closure(def) => write!(f, "Closure(@{}({}))", def.name, def.params.join(", ")),
        }
    }
}

/// Limits applied to every evaluation under a [`ParserContext`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextOptions {
    /// Maximum number of nested function and closure calls.
    pub max_call_depth: usize,
}

/// Default nesting limit for function and closure calls.
pub const DEFAULT_MAX_CALL_DEPTH: usize = 64;

impl Default for ContextOptions {
    fn default() -> Self {
        Self { max_call_depth: DEFAULT_MAX_CALL_DEPTH }
    }
}

/// The registry of named functions shared by a parser and the units it
/// compiles.
///
/// Compiled units store function names, not entries, so registering or
/// replacing a function after compilation changes what the next evaluation
/// calls. The registry is internally locked; a call clones its entry out and
/// releases the lock before running it, so functions may register other
/// functions.
///
/// ## Example
/// ```
/// use weft::interpreter::{
///     evaluator::function::core::Outcome, registry::ParserContext, value::core::Value,
/// };
///
/// let context = ParserContext::new();
/// context.register_function("answer", |_call| Ok(Outcome::from(Value::from(42.0))));
///
/// assert!(context.contains("answer"));
/// assert!(!context.contains("map"));
/// ```
pub struct ParserContext {
    functions:  RwLock<HashMap<String, Function>>,
    options:    ContextOptions,
    live_units: AtomicUsize,
}

impl fmt::Debug for ParserContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParserContext")
         .field("functions", &self.names())
         .field("options", &self.options)
         .field("live_units", &self.live_units())
         .finish()
    }
}

impl Default for ParserContext {
    fn default() -> Self {
        Self::new()
    }
}

impl ParserContext {
    /// Creates an empty registry with default options.
    ///
    /// No builtins are registered; see
    /// [`install`](crate::interpreter::evaluator::function::builtin::install).
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(ContextOptions::default())
    }

    /// Creates an empty registry with the given options.
    #[must_use]
    pub fn with_options(options: ContextOptions) -> Self {
        Self { functions: RwLock::new(HashMap::new()),
               options,
               live_units: AtomicUsize::new(0) }
    }

    /// The options this registry was created with.
    #[must_use]
    pub const fn options(&self) -> &ContextOptions {
        &self.options
    }

    /// Inserts or replaces an entry. The last registration wins.
    pub fn register(&self, name: impl Into<String>, function: Function) {
        let name = name.into();
        debug!(name = %name, kind = ?function, "registering function");
        self.functions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name, function);
    }

    /// Registers a native function under `name`.
    pub fn register_function<F>(&self, name: impl Into<String>, function: F)
        where F: Fn(&Call<'_>) -> EvalResult<Outcome> + Send + Sync + 'static
    {
        self.register(name, Function::Native(Arc::new(function)));
    }

    /// Parses `@name(params) => (body)` and registers the closure under
    /// `name`.
    ///
    /// A registered closure can call itself by name; recursion is bounded by
    /// [`ContextOptions::max_call_depth`].
    ///
    /// # Returns
    /// The registered name.
    ///
    /// # Errors
    /// Returns a [`ParseError`] if the source is not a single closure
    /// definition or its body refers to anything but its own parameters.
    pub fn define_closure(&self, source: &str) -> Result<String, ParseError> {
        let def = parse_closure_definition(source)?;
        let closure = compile_closure(&def)?;
        let name = closure.name.clone();
        self.register(name.clone(), Function::Closure(Arc::new(closure)));
        Ok(name)
    }

    /// Looks up an entry by name.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<Function> {
        self.functions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    /// Returns `true` if `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.functions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(name)
    }

    /// All registered names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.functions
                                    .read()
                                    .unwrap_or_else(PoisonError::into_inner)
                                    .keys()
                                    .cloned()
                                    .collect();
        names.sort();
        names
    }

    /// Number of compiled units bound to this registry that have not been
    /// dropped yet.
    #[must_use]
    pub fn live_units(&self) -> usize {
        self.live_units.load(Ordering::Acquire)
    }

    /// Registers a new compiled unit and returns the handle that keeps it
    /// counted.
    pub(crate) fn acquire(self: &Arc<Self>) -> UnitHandle {
        self.live_units.fetch_add(1, Ordering::AcqRel);
        UnitHandle { context: Arc::clone(self) }
    }
}

/// Ties a compiled unit to its registry.
///
/// Counted in [`ParserContext::live_units`] until dropped.
#[derive(Debug)]
pub struct UnitHandle {
    context: Arc<ParserContext>,
}

impl UnitHandle {
    /// The registry the unit resolves function names against.
    #[must_use]
    pub fn context(&self) -> &ParserContext {
        &self.context
    }
}

impl Clone for UnitHandle {
    fn clone(&self) -> Self {
        self.context.acquire()
    }
}

impl Drop for UnitHandle {
    fn drop(&mut self) {
        self.context.live_units.fetch_sub(1, Ordering::AcqRel);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::value::core::Value;

    #[test]
    fn last_registration_wins() {
        let context = ParserContext::new();
        context.register_function("f", |_| Ok(Outcome::from(Value::from(1.0))));
        context.register_function("f", |_| Ok(Outcome::from(Value::from(2.0))));

        assert_eq!(context.names(), ["f"]);
    }

    #[test]
    fn define_closure_registers_by_name() {
        let context = ParserContext::new();
        let name = context.define_closure("@twice(x) => (concat $x $x)").unwrap();

        assert_eq!(name, "twice");
        assert!(matches!(context.resolve("twice"), Some(Function::Closure(_))));
    }

    #[test]
    fn failed_definition_registers_nothing() {
        let context = ParserContext::new();

        assert!(context.define_closure("@broken(x) => (").is_err());
        assert!(context.define_closure("@g(x) => ($y)").is_err());
        assert!(context.names().is_empty());
    }

    #[test]
    fn handles_are_counted() {
        let context = Arc::new(ParserContext::new());
        let first = context.acquire();
        let second = first.clone();
        assert_eq!(context.live_units(), 2);

        drop(first);
        drop(second);
        assert_eq!(context.live_units(), 0);
    }
}
