/// Accessor path evaluation.
///
/// Defines what reading a field means for every kind of value.
pub mod access;
/// The evaluator and invocation context.
///
/// Walks compiled nodes: threads values through pipes, resolves function names
/// against the registry, invokes closures and enforces the call depth limit.
pub mod core;
/// Native functions.
///
/// The call interface native functions are written against, and the builtin
/// standard library.
pub mod function;
/// Closure scopes.
///
/// Immutable frames binding closure parameters and in-expression closures.
pub mod scope;
