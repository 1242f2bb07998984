/// Core parsing logic and entry points.
///
/// Provides the pipe-chain parser, the parse state that tracks closure
/// parameters in scope, and the functions that turn a whole source string
/// into an expression.
pub mod core;

/// Term parsing.
///
/// Parses heads, pipe stages, function calls, arguments and value terms
/// (literals, accessors, `$` references and parenthesized sub-pipes).
pub mod term;

/// Closure parsing.
///
/// Parses `@name(params) => ( body )` definitions and `@name args`
/// invocations, and tells the two apart.
pub mod closure;

/// Interpolation template parsing.
///
/// Splits template text into literal runs and `{ expression }` spans.
pub mod template;

/// Parser utilities.
///
/// Provides helper functions and shared routines used by the parser modules.
pub mod utils;
