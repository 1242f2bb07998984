/// Parsing errors.
///
/// Defines all error types that can occur while lexing, parsing, or
/// compiling source text. A parse error always aborts compilation; no compiled
/// unit is produced.
pub mod parse_error;
/// Runtime errors.
///
/// Contains all error types that can be raised while evaluating a compiled
/// unit. Runtime errors abort the current evaluation only; the compiled unit
/// and its parser context stay usable.
pub mod runtime_error;

pub use parse_error::ParseError;
pub use runtime_error::RuntimeError;
use thiserror::Error;

/// The distinguishable category of a failure.
///
/// Both [`ParseError`] and [`RuntimeError`] map every variant to one of these
/// kinds so a boundary layer can report failures without matching on the
/// individual variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A malformed token.
    Lex,
    /// Malformed grammar, or a compile-time binding failure.
    Parse,
    /// Catch-all runtime failure.
    Evaluation,
    /// A function or closure was called with the wrong number of arguments.
    Arity,
    /// An operation was applied to an incompatible kind of value.
    Type,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Lex => "LexError",
            Self::Parse => "ParseError",
            Self::Evaluation => "EvaluationError",
            Self::Arity => "ArityError",
            Self::Type => "TypeError",
        };
        write!(f, "{name}")
    }
}

/// Either phase of failure, for callers that compile and evaluate in one go.
#[derive(Debug, Error)]
pub enum Error {
    /// Compilation failed.
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// Evaluation failed.
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

impl Error {
    /// Returns the category of the underlying failure.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Parse(e) => e.kind(),
            Self::Runtime(e) => e.kind(),
        }
    }
}
