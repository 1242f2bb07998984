use thiserror::Error;

use crate::error::ErrorKind;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// Represents all errors that can occur during lexing, parsing or compiling.
///
/// Every variant carries the byte offset into the source text where the
/// problem was detected.
pub enum ParseError {
    /// The lexer could not form a token from the input.
    #[error("Error at offset {offset}: Invalid token: {text}.")]
    InvalidToken {
        /// The unrecognized source text.
        text:   String,
        /// Byte offset of the token.
        offset: usize,
    },
    /// A string literal was opened but never closed.
    #[error("Error at offset {offset}: Unterminated string literal.")]
    UnterminatedString {
        /// Byte offset of the opening quote.
        offset: usize,
    },
    /// A string literal contained an escape sequence that is not recognized.
    #[error("Error at offset {offset}: Invalid escape sequence in string literal: {text}.")]
    InvalidEscape {
        /// The literal containing the escape.
        text:   String,
        /// Byte offset of the literal.
        offset: usize,
    },
    /// A number literal could not be represented.
    #[error("Error at offset {offset}: Invalid number literal: {text}.")]
    InvalidNumber {
        /// The literal text.
        text:   String,
        /// Byte offset of the literal.
        offset: usize,
    },
    /// Found a token other than the one the grammar requires.
    #[error("Error at offset {offset}: Expected {expected}, found {found}.")]
    UnexpectedToken {
        /// Description of the expected construct.
        expected: String,
        /// Description of the token that was found.
        found:    String,
        /// Byte offset of the found token.
        offset:   usize,
    },
    /// Reached the end of input while the grammar still required something.
    #[error("Error at offset {offset}: Unexpected end of input, expected {expected}.")]
    UnexpectedEndOfInput {
        /// Description of the expected construct.
        expected: String,
        /// Byte offset of the end of input.
        offset:   usize,
    },
    /// Found extra tokens after a complete expression.
    #[error("Error at offset {offset}: Extra tokens after expression: {token}.")]
    UnexpectedTrailingTokens {
        /// The first extra token.
        token:  String,
        /// Byte offset of the extra token.
        offset: usize,
    },
    /// An interpolation `{` was never closed.
    #[error("Error at offset {offset}: Unterminated interpolation, expected '}}'.")]
    UnterminatedInterpolation {
        /// Byte offset of the opening brace.
        offset: usize,
    },
    /// A `}` appeared in template text without a matching `{`.
    #[error("Error at offset {offset}: Unmatched '}}' in template text. Use '\\}}' for a literal brace.")]
    UnmatchedBrace {
        /// Byte offset of the brace.
        offset: usize,
    },
    /// A closure declared the same parameter twice.
    #[error("Error at offset {offset}: Parameter '{name}' is declared more than once.")]
    DuplicateParameter {
        /// The repeated parameter name.
        name:   String,
        /// Byte offset of the closure definition.
        offset: usize,
    },
    /// Parentheses or closure bodies nested beyond the supported depth.
    #[error("Error at offset {offset}: Expression nests deeper than {limit} levels.")]
    NestingTooDeep {
        /// The maximum nesting depth.
        limit:  usize,
        /// Byte offset of the pipe that went too deep.
        offset: usize,
    },
    /// A `$name` reference is neither a closure parameter nor a declared
    /// global.
    #[error("Error at offset {offset}: Global '{name}' is not declared.")]
    UndeclaredGlobal {
        /// The referenced name.
        name:   String,
        /// Byte offset of the reference.
        offset: usize,
    },
}

impl ParseError {
    /// Returns the category of this failure.
    ///
    /// Malformed tokens report [`ErrorKind::Lex`]; everything else is
    /// [`ErrorKind::Parse`].
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidToken { .. }
            | Self::UnterminatedString { .. }
            | Self::InvalidEscape { .. }
            | Self::InvalidNumber { .. } => ErrorKind::Lex,
            _ => ErrorKind::Parse,
        }
    }

    /// Returns the byte offset the error points at.
    #[must_use]
    pub const fn offset(&self) -> usize {
        match self {
            Self::InvalidToken { offset, .. }
            | Self::UnterminatedString { offset }
            | Self::InvalidEscape { offset, .. }
            | Self::InvalidNumber { offset, .. }
            | Self::UnexpectedToken { offset, .. }
            | Self::UnexpectedEndOfInput { offset, .. }
            | Self::UnexpectedTrailingTokens { offset, .. }
            | Self::UnterminatedInterpolation { offset }
            | Self::UnmatchedBrace { offset }
            | Self::DuplicateParameter { offset, .. }
            | Self::NestingTooDeep { offset, .. }
            | Self::UndeclaredGlobal { offset, .. } => *offset,
        }
    }
}
