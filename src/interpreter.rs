/// The compiler module lowers syntax trees into executable units.
///
/// Accessor paths are split into segments with their index reading worked out,
/// templates are flattened into text and expression segments, and `$name`
/// references are checked against the declared globals.
///
/// # Responsibilities
/// - Converts `ast` nodes into the `Node` tree the evaluator walks.
/// - Rejects undeclared globals and records the ones a unit needs.
pub mod compiler;
/// The evaluator module executes compiled nodes and computes results.
///
/// The evaluator threads values through pipe chains, resolves function names
/// against the registry at call time, binds closure parameters in immutable
/// scopes, and provides the builtin standard library.
///
/// # Responsibilities
/// - Evaluates compiled nodes against an invocation context.
/// - Dispatches native functions and closures with arity and depth checks.
/// - Reports runtime errors such as unknown functions or type mismatches.
pub mod evaluator;
/// The lexer module tokenizes source code for further parsing.
///
/// The lexer (tokenizer) reads the raw source text and produces a stream of
/// tokens, each corresponding to meaningful language elements such as
/// literals, accessors, function and closure names, and punctuation.
///
/// # Responsibilities
/// - Converts the input character stream into tokens with their byte offsets.
/// - Resolves escapes in string literals.
/// - Reports lexical errors for invalid or malformed input.
pub mod lexer;
/// The parser module builds the abstract syntax tree (AST) from tokens.
///
/// The parser processes the token stream produced by the lexer and constructs
/// an AST for a pipe expression or an interpolation template.
///
/// # Responsibilities
/// - Converts tokens into structured AST nodes.
/// - Validates grammar, reporting errors with byte offsets.
/// - Decides whether each `$name` is a closure parameter or a global.
pub mod parser;
/// The registry of named functions.
///
/// Holds native functions and registered closures by name, the per-context
/// limits, and the count of compiled units still alive.
pub mod registry;
/// Compiled units.
///
/// The reusable expression and template types handed to callers.
pub mod unit;
/// The value module defines the runtime data types for evaluation.
///
/// This module declares the `Value` enum and its supporting types: immutable
/// sets, host objects, the loose comparison rules, and conversions to and from
/// JSON and text.
///
/// # Responsibilities
/// - Defines the `Value` enum and all supported value variants.
/// - Implements loose equality and truthiness.
/// - Converts between values, `serde_json` and template text.
pub mod value;
