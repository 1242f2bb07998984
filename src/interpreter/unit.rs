use std::sync::Arc;

use crate::{
    error::RuntimeError,
    interpreter::{
        compiler::{CompiledExpression, CompiledTemplate, TemplateSegment},
        evaluator::{
            core::{EvalResult, Evaluator, InvocationContext},
            scope::Scope,
        },
        registry::UnitHandle,
        value::{convert::render_text, core::Value},
    },
};

/// Fails fast when the invocation context lacks a global the unit references.
fn check_globals(globals: &[String], invocation: &InvocationContext) -> EvalResult<()> {
    match globals.iter().find(|name| invocation.global(name).is_none()) {
        Some(name) => Err(RuntimeError::MissingGlobal { name: name.clone() }),
        None => Ok(()),
    }
}

/// A compiled expression, evaluated to a value.
///
/// Immutable and `Send + Sync`: one expression can be evaluated any number of
/// times, from any number of threads, each with its own invocation context.
/// Function names are resolved against the registry of the parser that
/// compiled it on every evaluation.
///
/// ## Example
/// ```
/// use serde_json::json;
/// use weft::{Parser, interpreter::value::core::Value};
///
/// let parser = Parser::new();
/// let ids = parser.compile_expression("map . .id").unwrap();
///
/// let result = ids.retrieve(Value::from(json!([{"id": 1}, {"id": 2}]))).unwrap();
/// assert_eq!(result.map(|v| v.to_json()), Some(json!([1, 2])));
/// ```
#[derive(Debug, Clone)]
pub struct Expression {
    source:   Arc<str>,
    compiled: CompiledExpression,
    handle:   UnitHandle,
}

impl Expression {
    pub(crate) fn new(source: &str, compiled: CompiledExpression, handle: UnitHandle) -> Self {
        Self { source: Arc::from(source),
               compiled,
               handle }
    }

    /// The source text the expression was compiled from.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Globals every invocation must supply, sorted.
    #[must_use]
    pub fn globals(&self) -> &[String] {
        &self.compiled.globals
    }

    /// Evaluates the expression.
    ///
    /// # Returns
    /// The result, or `None` if it is absent (for example a missing field).
    ///
    /// # Errors
    /// Returns a [`RuntimeError`] if a referenced global is not supplied or
    /// evaluation fails. The expression stays usable either way.
    pub fn evaluate(&self, invocation: &InvocationContext) -> EvalResult<Option<Value>> {
        check_globals(&self.compiled.globals, invocation)?;
        let evaluator = Evaluator::new(self.handle.context(), invocation);
        evaluator.eval(&self.compiled.root, Some(&invocation.default), &Scope::new())
    }

    /// Evaluates the expression against `default` with no globals.
    ///
    /// # Errors
    /// Same as [`Expression::evaluate`].
    pub fn retrieve(&self, default: Value) -> EvalResult<Option<Value>> {
        self.evaluate(&InvocationContext::new(default))
    }
}

/// A compiled interpolation template, rendered to text.
///
/// Shares the guarantees of [`Expression`].
///
/// ## Example
/// ```
/// use serde_json::json;
/// use weft::{Parser, interpreter::value::core::Value};
///
/// let parser = Parser::new();
/// let greeting = parser.compile_interpolation("Hello {.id}").unwrap();
///
/// assert_eq!(greeting.construct(Value::from(json!({"id": 1}))).unwrap(), "Hello 1");
/// ```
#[derive(Debug, Clone)]
pub struct Template {
    source:   Arc<str>,
    compiled: CompiledTemplate,
    handle:   UnitHandle,
}

impl Template {
    pub(crate) fn new(source: &str, compiled: CompiledTemplate, handle: UnitHandle) -> Self {
        Self { source: Arc::from(source),
               compiled,
               handle }
    }

    /// The source text the template was compiled from.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Globals every invocation must supply, sorted.
    #[must_use]
    pub fn globals(&self) -> &[String] {
        &self.compiled.globals
    }

    /// Renders the template.
    ///
    /// Absent and `null` results render as nothing.
    ///
    /// # Errors
    /// Returns a [`RuntimeError`] if a referenced global is not supplied or an
    /// embedded expression fails.
    pub fn render(&self, invocation: &InvocationContext) -> EvalResult<String> {
        check_globals(&self.compiled.globals, invocation)?;
        let evaluator = Evaluator::new(self.handle.context(), invocation);
        let scope = Scope::new();

        let mut out = String::new();
        for segment in &self.compiled.segments {
            match segment {
                TemplateSegment::Text(text) => out.push_str(text),
                TemplateSegment::Expr(node) => {
                    let value = evaluator.eval(node, Some(&invocation.default), &scope)?;
                    out.push_str(&render_text(value.as_ref()));
                },
            }
        }

        Ok(out)
    }

    /// Renders the template against `default` with no globals.
    ///
    /// # Errors
    /// Same as [`Template::render`].
    pub fn construct(&self, default: Value) -> EvalResult<String> {
        self.render(&InvocationContext::new(default))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn units_are_send_and_sync() {
        assert_send_sync::<Expression>();
        assert_send_sync::<Template>();
    }
}
