use thiserror::Error;

use crate::error::ErrorKind;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// Represents all errors that can occur during evaluation.
///
/// Offsets point into the source text the evaluated unit was compiled from.
pub enum RuntimeError {
    /// Called a function name that is not registered.
    #[error("Error at offset {offset}: Unknown function '{name}'.")]
    UnknownFunction {
        /// The name of the function.
        name:   String,
        /// Byte offset of the call.
        offset: usize,
    },
    /// Invoked a closure name that is neither in scope nor registered.
    #[error("Error at offset {offset}: Unknown closure '@{name}'.")]
    UnknownClosure {
        /// The name of the closure.
        name:   String,
        /// Byte offset of the invocation.
        offset: usize,
    },
    /// The wrong number of arguments was supplied to a function or closure.
    #[error("Error at offset {offset}: '{name}' expects {expected} argument(s) but was given {found}.")]
    ArgumentCountMismatch {
        /// The callee.
        name:     String,
        /// Human readable description of the accepted counts.
        expected: String,
        /// The number of arguments supplied.
        found:    usize,
        /// Byte offset of the call.
        offset:   usize,
    },
    /// A value had an unexpected or incompatible type.
    #[error("Error at offset {offset}: Type error: {details}.")]
    TypeError {
        /// Details about the type mismatch.
        details: String,
        /// Byte offset of the offending term.
        offset:  usize,
    },
    /// A sequence operation was applied to something that is not a sequence.
    #[error("Error at offset {offset}: '{name}' expects an ordered sequence, found {found}.")]
    ExpectedSequence {
        /// The function that needed a sequence.
        name:   String,
        /// The kind of value that was found.
        found:  String,
        /// Byte offset of the call.
        offset: usize,
    },
    /// An argument was present but not acceptable.
    #[error("Error at offset {offset}: Invalid argument: {details}.")]
    InvalidArgument {
        /// Details about why the argument is invalid.
        details: String,
        /// Byte offset of the call.
        offset:  usize,
    },
    /// The invocation context did not supply a global the unit references.
    #[error("Global '{name}' was not supplied to the invocation.")]
    MissingGlobal {
        /// The name of the global.
        name: String,
    },
    /// Nested calls exceeded the configured limit.
    #[error("Error at offset {offset}: Call depth limit of {limit} exceeded.")]
    CallDepthExceeded {
        /// The configured limit.
        limit:  usize,
        /// Byte offset of the call that went too deep.
        offset: usize,
    },
    /// A registered host function reported a failure.
    #[error("Error at offset {offset}: Function '{name}' failed: {message}.")]
    Host {
        /// The function that failed.
        name:    String,
        /// The message supplied by the host.
        message: String,
        /// Byte offset of the call.
        offset:  usize,
    },
}

impl RuntimeError {
    /// Returns the category of this failure.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::ArgumentCountMismatch { .. } => ErrorKind::Arity,
            Self::TypeError { .. } => ErrorKind::Type,
            Self::UnknownFunction { .. }
            | Self::UnknownClosure { .. }
            | Self::ExpectedSequence { .. }
            | Self::InvalidArgument { .. }
            | Self::MissingGlobal { .. }
            | Self::CallDepthExceeded { .. }
            | Self::Host { .. } => ErrorKind::Evaluation,
        }
    }
}
