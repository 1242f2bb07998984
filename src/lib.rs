//! # weft
//!
//! weft is a small expression and text-interpolation language for pulling
//! values out of structured data and rendering text from it. Sources are
//! compiled once, into an [`Expression`] (`"map . .id"`) or a [`Template`]
//! (`"Hello {.id}"`), and evaluated any number of times against different
//! inputs. Hosts extend the language with native functions and closures.

#![warn(
    clippy::redundant_clone,
    clippy::needless_pass_by_value,
    clippy::similar_names,
    clippy::large_enum_variant,
    clippy::string_lit_as_bytes,
    clippy::match_same_arms,
    clippy::cargo,
    clippy::nursery,
    clippy::perf,
    clippy::style,
    clippy::suspicious,
    clippy::correctness,
    clippy::complexity,
    clippy::pedantic,
    //missing_docs,
)]
#![allow(clippy::missing_errors_doc)]

use std::sync::Arc;

use tracing::debug;

use crate::{
    error::{Error, ParseError},
    interpreter::{
        compiler::{self, CompileOptions},
        evaluator::{
            core::{EvalResult, InvocationContext},
            function::{
                builtin::install,
                core::{Call, Outcome},
            },
        },
        parser::{core::parse_expression, template::parse_template},
        registry::{ContextOptions, ParserContext},
        value::core::Value,
    },
};
pub use crate::interpreter::unit::{Expression, Template};

/// Defines the structure of parsed code.
///
/// This module declares the `Expr` enum and related types that represent the
/// syntactic structure of source code as a tree. The AST is built by the parser
/// and lowered by the compiler.
///
/// # Responsibilities
/// - Defines expression and template types for all language constructs.
/// - Attaches byte offsets to AST nodes for error reporting.
pub mod ast;
/// Provides unified error types for parsing and evaluation.
///
/// This module defines all errors that can be raised during lexing, parsing,
/// compiling or evaluating code. Every error carries a distinguishable kind,
/// a message, and where possible the byte offset it refers to.
///
/// # Responsibilities
/// - Defines error enums for all failure modes (lexer, parser, evaluator).
/// - Maps every failure onto an `ErrorKind`.
/// - Supports integration with standard error handling traits and reporting
///   utilities.
pub mod error;
/// Orchestrates the entire process of code execution.
///
/// This module ties together lexing, parsing, compilation, evaluation, value
/// representations and the function registry.
///
/// # Responsibilities
/// - Coordinates all core components: lexer, parser, compiler, evaluator, and
///   value types.
/// - Provides the compiled unit types handed to callers.
/// - Manages the flow of data and errors between phases.
pub mod interpreter;
/// General utilities for numeric conversion and formatting.
///
/// This module provides reusable helpers used throughout the interpreter:
/// lossless conversions between `usize` and `f64`, loose parsing of numeric
/// text, and canonical number rendering.
pub mod util;

/// Compiles sources against a shared function registry.
///
/// A new parser comes with the builtin functions installed. Every unit it
/// compiles keeps a handle on the registry, so functions registered after
/// compilation are visible to the unit's next evaluation.
///
/// ## Example
/// ```
/// use weft::{
///     Parser,
///     interpreter::{evaluator::function::core::Outcome, value::core::Value},
/// };
///
/// let parser = Parser::new();
/// parser.register_function("shout", |call| {
///           let text = call.parent().map(ToString::to_string).unwrap_or_default();
///           Ok(Outcome::from(Value::from(text.to_uppercase())))
///       });
///
/// let expr = parser.compile_expression(".name | shout").unwrap();
/// let result = expr.retrieve(Value::from(serde_json::json!({"name": "ada"}))).unwrap();
///
/// assert_eq!(result, Some(Value::from("ADA")));
/// ```
#[derive(Debug, Clone)]
pub struct Parser {
    context: Arc<ParserContext>,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser {
    /// Creates a parser with the builtins installed and default limits.
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(ContextOptions::default())
    }

    /// Creates a parser with the builtins installed and the given limits.
    #[must_use]
    pub fn with_options(options: ContextOptions) -> Self {
        let context = ParserContext::with_options(options);
        install(&context);
        Self::with_context(Arc::new(context))
    }

    /// Creates a parser over an existing registry. Nothing is installed.
    #[must_use]
    pub const fn with_context(context: Arc<ParserContext>) -> Self {
        Self { context }
    }

    /// The registry shared by this parser and its units.
    #[must_use]
    pub const fn context(&self) -> &Arc<ParserContext> {
        &self.context
    }

    /// Registers a native function. See [`ParserContext::register_function`].
    pub fn register_function<F>(&self, name: impl Into<String>, function: F)
        where F: Fn(&Call<'_>) -> EvalResult<Outcome> + Send + Sync + 'static
    {
        self.context.register_function(name, function);
    }

    /// Registers a closure from source. See [`ParserContext::define_closure`].
    ///
    /// # Errors
    /// Returns a [`ParseError`] if the source is not a valid closure
    /// definition.
    pub fn define_closure(&self, source: &str) -> Result<String, ParseError> {
        self.context.define_closure(source)
    }

    /// Compiles an expression with no declared globals.
    ///
    /// # Errors
    /// Returns a [`ParseError`] for malformed source or any `$name` global.
    pub fn compile_expression(&self, source: &str) -> Result<Expression, ParseError> {
        self.compile_expression_with(source, &CompileOptions::default())
    }

    /// Compiles an expression.
    ///
    /// # Errors
    /// Returns a [`ParseError`] for malformed source or a global that
    /// `options` does not declare.
    pub fn compile_expression_with(&self,
                                   source: &str,
                                   options: &CompileOptions)
                                   -> Result<Expression, ParseError> {
        let expr = parse_expression(source)?;
        let compiled = compiler::compile_expression(&expr, options)?;
        debug!(source, globals = ?compiled.globals, "compiled expression");
        Ok(Expression::new(source, compiled, self.context.acquire()))
    }

    /// Compiles an interpolation template with no declared globals.
    ///
    /// # Errors
    /// Returns a [`ParseError`] for malformed source or any `$name` global.
    pub fn compile_interpolation(&self, source: &str) -> Result<Template, ParseError> {
        self.compile_interpolation_with(source, &CompileOptions::default())
    }

    /// Compiles an interpolation template.
    ///
    /// # Errors
    /// Returns a [`ParseError`] for malformed source or a global that
    /// `options` does not declare.
    pub fn compile_interpolation_with(&self,
                                      source: &str,
                                      options: &CompileOptions)
                                      -> Result<Template, ParseError> {
        let template = parse_template(source)?;
        let compiled = compiler::compile_template(&template, options)?;
        debug!(source,
               segments = compiled.segments.len(),
               globals = ?compiled.globals,
               "compiled template");
        Ok(Template::new(source, compiled, self.context.acquire()))
    }
}

/// Declares every global of `invocation` so sources may reference them.
fn declared_globals(invocation: &InvocationContext) -> CompileOptions {
    let mut globals: Vec<String> = invocation.extra.keys().cloned().collect();
    globals.sort();
    CompileOptions { globals }
}

/// Compiles and evaluates an expression in one step with a fresh parser.
///
/// Every global in `invocation` is declared.
///
/// # Errors
/// Returns an error if compilation or evaluation fails.
///
/// # Examples
/// ```
/// use weft::{evaluate_source, interpreter::{evaluator::core::InvocationContext, value::core::Value}};
///
/// let result = evaluate_source("eq 9 \"9\"", &InvocationContext::default()).unwrap();
/// assert_eq!(result, Some(Value::from(true)));
///
/// // An unterminated string never compiles.
/// assert!(evaluate_source("split \"abc", &InvocationContext::default()).is_err());
/// ```
pub fn evaluate_source(source: &str, invocation: &InvocationContext) -> Result<Option<Value>, Error> {
    let parser = Parser::new();
    let expr = parser.compile_expression_with(source, &declared_globals(invocation))?;
    Ok(expr.evaluate(invocation)?)
}

/// Compiles and renders a template in one step with a fresh parser.
///
/// Every global in `invocation` is declared.
///
/// # Errors
/// Returns an error if compilation or rendering fails.
///
/// # Examples
/// ```
/// use weft::{render_source, interpreter::{evaluator::core::InvocationContext, value::core::Value}};
///
/// let invocation = InvocationContext::new(Value::from(serde_json::json!({})));
/// assert_eq!(render_source("[{ .fake }]", &invocation).unwrap(), "[]");
/// ```
pub fn render_source(source: &str, invocation: &InvocationContext) -> Result<String, Error> {
    let parser = Parser::new();
    let template = parser.compile_interpolation_with(source, &declared_globals(invocation))?;
    Ok(template.render(invocation)?)
}
