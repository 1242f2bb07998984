use std::fmt;

use crate::{
    error::RuntimeError,
    interpreter::{
        compiler::Node,
        evaluator::{
            core::{EvalResult, Evaluator, InvocationContext},
            scope::Scope,
        },
        value::core::Value,
    },
};

/// A transform that a function hands back to be applied to the current value.
pub type Transform = Box<dyn FnOnce(Option<Value>) -> EvalResult<Option<Value>>>;

/// What a native function produces.
///
/// Most functions return a value directly. A function may instead return a
/// transform; the evaluator applies it once more to the current value `.` and
/// the transform's result becomes the result of the call.
pub enum Outcome {
    /// A finished result, possibly absent.
    Value(Option<Value>),
    /// A transform still waiting for the current value.
    Deferred(Transform),
}

impl fmt::Debug for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Self::Deferred(_) => write!(f, "Deferred(..)"),
        }
    }
}

impl From<Value> for Outcome {
    fn from(value: Value) -> Self {
        Self::Value(Some(value))
    }
}

impl From<Option<Value>> for Outcome {
    fn from(value: Option<Value>) -> Self {
        Self::Value(value)
    }
}

/// Everything a native function can see about one call.
///
/// Arguments are not evaluated up front. A function evaluates the ones it
/// needs, either against the caller's current value or with `.` rebound, which
/// is how `map` applies its argument to every element.
pub struct Call<'c> {
    name:      &'c str,
    arguments: &'c [Node],
    parent:    Option<Value>,
    piped:     bool,
    current:   Option<&'c Value>,
    scope:     &'c Scope,
    evaluator: &'c Evaluator<'c>,
    offset:    usize,
}

impl<'c> Call<'c> {
    pub(crate) fn new(name: &'c str,
                      arguments: &'c [Node],
                      parent: Option<Value>,
                      current: Option<&'c Value>,
                      scope: &'c Scope,
                      evaluator: &'c Evaluator<'c>,
                      offset: usize)
                      -> Self {
        Self { name,
               arguments,
               parent,
               piped: false,
               current,
               scope,
               evaluator,
               offset }
    }

    /// Marks the parent as coming from a previous pipe stage.
    pub(crate) fn piped(mut self, piped: bool) -> Self {
        self.piped = piped;
        self
    }

    /// The name the function was called by.
    #[must_use]
    pub const fn name(&self) -> &str {
        self.name
    }

    /// Byte offset of the call in the source text.
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.offset
    }

    /// The value piped into the call. For a call at the head of a chain
    /// this is the current value.
    #[must_use]
    pub const fn parent(&self) -> Option<&Value> {
        self.parent.as_ref()
    }

    /// Returns `true` if the call is a pipe stage rather than the head of a
    /// chain or a standalone term.
    #[must_use]
    pub const fn is_piped(&self) -> bool {
        self.piped
    }

    /// The current value `.` at the call site.
    #[must_use]
    pub const fn current(&self) -> Option<&Value> {
        self.current
    }

    /// The invocation context of the running evaluation, for reading
    /// globals.
    #[must_use]
    pub const fn invocation(&self) -> &InvocationContext {
        self.evaluator.invocation()
    }

    /// Number of explicit arguments.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.arguments.len()
    }

    /// Returns `true` if the call has no explicit arguments.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.arguments.is_empty()
    }

    /// Evaluates argument `index` at the call site.
    ///
    /// A missing argument is absent.
    pub fn arg(&self, index: usize) -> EvalResult<Option<Value>> {
        self.arg_with(index, self.current)
    }

    /// Evaluates argument `index` with `.` bound to `current`.
    ///
    /// A missing argument is absent.
    pub fn arg_with(&self, index: usize, current: Option<&Value>) -> EvalResult<Option<Value>> {
        match self.arguments.get(index) {
            Some(node) => self.evaluator.eval(node, current, self.scope),
            None => Ok(None),
        }
    }

    /// Evaluates every argument at the call site, in order.
    pub fn args(&self) -> EvalResult<Vec<Option<Value>>> {
        (0..self.len()).map(|i| self.arg(i)).collect()
    }

    /// Maps operand `index` of a function whose full form takes `full`
    /// operands onto an argument index.
    ///
    /// Called with fewer arguments than `full`, the parent is the leading
    /// operand and `None` is returned for operand 0.
    #[must_use]
    pub const fn operand_index(&self, full: usize, index: usize) -> Option<usize> {
        if self.len() >= full {
            Some(index)
        } else {
            index.checked_sub(1)
        }
    }

    /// Evaluates operand `index` of a function whose full form takes `full`
    /// operands, letting the parent fill the leading operand when an argument
    /// is left out.
    pub fn operand(&self, full: usize, index: usize) -> EvalResult<Option<Value>> {
        match self.operand_index(full, index) {
            Some(arg) => self.arg(arg),
            None => Ok(self.parent.clone()),
        }
    }

    /// Builds the error a host function reports a failure with.
    #[must_use]
    pub fn error(&self, message: impl Into<String>) -> RuntimeError {
        RuntimeError::Host { name:    self.name.to_string(),
                             message: message.into(),
                             offset:  self.offset, }
    }

    /// Builds a type error located at this call.
    #[must_use]
    pub fn type_error(&self, details: impl Into<String>) -> RuntimeError {
        RuntimeError::TypeError { details: details.into(),
                                  offset:  self.offset, }
    }
}

/// Specifies the allowed number of arguments for a builtin.
///
/// - `Exact(n)` means the builtin must receive exactly `n` arguments.
/// - `OneOf(slice)` means the builtin accepts any arity listed in `slice`.
/// - `AtLeast(n)` means the builtin accepts `n` or more arguments.
#[derive(Debug, Clone, Copy)]
pub enum Arity {
    Exact(usize),
    OneOf(&'static [usize]),
    AtLeast(usize),
}

impl Arity {
    /// Tests whether the given argument count satisfies this arity constraint.
    #[must_use]
    pub fn check(&self, n: usize) -> bool {
        match self {
            Self::Exact(m) => n == *m,
            Self::OneOf(arr) => arr.contains(&n),
            Self::AtLeast(m) => n >= *m,
        }
    }

    fn describe(&self) -> String {
        match self {
            Self::Exact(m) => m.to_string(),
            Self::OneOf(arr) => {
                arr.iter().map(ToString::to_string).collect::<Vec<_>>().join(" or ")
            },
            Self::AtLeast(m) => format!("at least {m}"),
        }
    }
}

/// Checks a call's argument count against an arity.
///
/// # Errors
/// Returns [`RuntimeError::ArgumentCountMismatch`] if the count is not
/// accepted.
pub fn check_arity(call: &Call<'_>, arity: Arity) -> EvalResult<()> {
    if arity.check(call.len()) {
        Ok(())
    } else {
        Err(RuntimeError::ArgumentCountMismatch { name:     call.name().to_string(),
                                                  expected: arity.describe(),
                                                  found:    call.len(),
                                                  offset:   call.offset(), })
    }
}

/// Returns a value's kind for diagnostics, `"nothing"` when absent.
#[must_use]
pub fn describe(value: Option<&Value>) -> &'static str {
    value.map_or("nothing", Value::type_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arity_descriptions() {
        assert_eq!(Arity::Exact(2).describe(), "2");
        assert_eq!(Arity::OneOf(&[1, 2]).describe(), "1 or 2");
        assert_eq!(Arity::AtLeast(0).describe(), "at least 0");
        assert!(Arity::AtLeast(1).check(3));
        assert!(!Arity::OneOf(&[0, 2]).check(1));
    }

    #[test]
    fn absent_is_described_as_nothing() {
        assert_eq!(describe(None), "nothing");
        assert_eq!(describe(Some(&Value::Null)), "null");
    }
}
