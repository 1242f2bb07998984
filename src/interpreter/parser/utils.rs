use std::iter::Peekable;

use crate::{
    error::ParseError,
    interpreter::{
        lexer::Token,
        parser::core::{ParseResult, ParseState},
    },
};

/// Parses a comma-separated list of items until a closing token.
///
/// Used for closure parameter lists. It repeatedly calls `parse_item` to
/// parse one element, expecting either:
///
/// - a comma, to continue the list, or
/// - the specified closing token, to end it.
///
/// An immediately encountered closing token produces an empty list.
///
/// Grammar (simplified): `list := item ("," item)*`
///
/// # Parameters
/// - `tokens`: Token iterator positioned at the first item or closing token.
/// - `state`: Parse state, used for the end-of-input offset.
/// - `parse_item`: Function used to parse each list element.
/// - `closing`: The token that terminates the list (e.g., `)`).
///
/// # Returns
/// A vector of parsed items.
///
/// # Errors
/// Returns a `ParseError` if:
/// - an item fails to parse,
/// - an unexpected token is encountered,
/// - the stream ends before the closing token.
pub(in crate::interpreter::parser) fn parse_comma_separated<'a, I, T>(
    tokens: &mut Peekable<I>,
    state: &ParseState,
    parse_item: impl Fn(&mut Peekable<I>, &ParseState) -> ParseResult<T>,
    closing: &Token)
    -> Result<Vec<T>, ParseError>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let mut items = Vec::new();
    if let Some((tok, _)) = tokens.peek()
       && tok == closing
    {
        tokens.next();

        return Ok(items);
    }
    loop {
        items.push(parse_item(tokens, state)?);
        match tokens.peek() {
            Some((Token::Comma, _)) => {
                tokens.next();
            },
            Some((tok, _)) if tok == closing => {
                tokens.next();
                break;
            },
            Some((tok, offset)) => {
                return Err(ParseError::UnexpectedToken { expected: format!("',' or {}",
                                                                           closing.describe()),
                                                         found:    tok.describe(),
                                                         offset:   *offset, });
            },
            None => {
                return Err(ParseError::UnexpectedEndOfInput { expected: format!("',' or {}",
                                                                                closing.describe()),
                                                              offset:   state.end(), });
            },
        }
    }
    Ok(items)
}

/// Parses a plain identifier and returns its name with its offset.
///
/// The next token must be `Token::Identifier`.
///
/// # Parameters
/// - `tokens`: Token iterator positioned at an identifier.
/// - `state`: Parse state, used for the end-of-input offset.
///
/// # Errors
/// Returns a `ParseError` if:
/// - the next token is not an identifier,
/// - the input ends unexpectedly.
pub(in crate::interpreter::parser) fn parse_identifier<'a, I>(tokens: &mut Peekable<I>,
                                                              state: &ParseState)
                                                              -> ParseResult<(String, usize)>
    where I: Iterator<Item = &'a (Token, usize)>
{
    match tokens.next() {
        Some((Token::Identifier(s), offset)) => Ok((s.clone(), *offset)),
        Some((tok, offset)) => Err(ParseError::UnexpectedToken { expected: "an identifier".to_string(),
                                                                 found:    tok.describe(),
                                                                 offset:   *offset, }),
        None => Err(ParseError::UnexpectedEndOfInput { expected: "an identifier".to_string(),
                                                       offset:   state.end(), }),
    }
}

/// Consumes the next token, which must equal `expected`.
///
/// # Returns
/// The offset of the consumed token.
///
/// # Errors
/// Returns a `ParseError` if the next token differs or the input ends.
pub(in crate::interpreter::parser) fn expect<'a, I>(tokens: &mut Peekable<I>,
                                                    state: &ParseState,
                                                    expected: &Token)
                                                    -> ParseResult<usize>
    where I: Iterator<Item = &'a (Token, usize)>
{
    match tokens.next() {
        Some((tok, offset)) if tok == expected => Ok(*offset),
        Some((tok, offset)) => Err(ParseError::UnexpectedToken { expected: expected.describe(),
                                                                 found:    tok.describe(),
                                                                 offset:   *offset, }),
        None => Err(ParseError::UnexpectedEndOfInput { expected: expected.describe(),
                                                       offset:   state.end(), }),
    }
}
