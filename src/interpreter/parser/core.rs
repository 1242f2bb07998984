use std::iter::Peekable;

use crate::{
    ast::{ClosureDef, Expr},
    error::ParseError,
    interpreter::{
        lexer::{Token, tokenize},
        parser::term::{parse_head, parse_stage},
    },
};

pub type ParseResult<T> = Result<T, ParseError>;

/// How deeply pipes may nest inside parentheses and closure bodies.
pub const MAX_NESTING_DEPTH: usize = 128;

/// State carried through a single parse.
///
/// Tracks the parameter lists of the closure definitions that enclose the
/// current position, which decides whether `$name` is a parameter reference
/// or a global, how deeply pipes are nested, and the offset to report for
/// errors at end of input.
#[derive(Debug)]
pub struct ParseState {
    params: Vec<Vec<String>>,
    depth:  usize,
    end:    usize,
}

impl ParseState {
    /// Creates a state for a token stream that ends at byte offset `end`.
    #[must_use]
    pub const fn new(end: usize) -> Self {
        Self { params: Vec::new(),
               depth: 0,
               end }
    }

    /// Byte offset of the end of input.
    #[must_use]
    pub const fn end(&self) -> usize {
        self.end
    }

    /// Returns `true` if `name` is a parameter of any enclosing closure.
    #[must_use]
    pub fn is_param(&self, name: &str) -> bool {
        self.params.iter().any(|frame| frame.iter().any(|p| p == name))
    }

    /// Enters a closure body with the given parameters.
    pub fn push_params(&mut self, params: Vec<String>) {
        self.params.push(params);
    }

    /// Leaves the innermost closure body.
    pub fn pop_params(&mut self) {
        self.params.pop();
    }

    /// Enters a nested pipe starting at `offset`.
    ///
    /// # Errors
    /// Returns [`ParseError::NestingTooDeep`] past [`MAX_NESTING_DEPTH`].
    fn enter(&mut self, offset: usize) -> ParseResult<()> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(ParseError::NestingTooDeep { limit: MAX_NESTING_DEPTH,
                                                    offset });
        }
        self.depth += 1;
        Ok(())
    }

    const fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }
}

/// Parses a pipe chain.
///
/// The first term establishes the initial value; each term after a `|` must
/// be a function call, a closure invocation or a closure definition.
///
/// Grammar: `pipe := head ( "|" stage )*`
///
/// A chain without any `|` is returned as its head term alone.
///
/// # Parameters
/// - `tokens`: Token iterator providing `(Token, offset)` pairs.
/// - `state`: Parse state for parameter tracking.
///
/// # Returns
/// The parsed expression node.
///
/// # Errors
/// Besides grammar errors, returns [`ParseError::NestingTooDeep`] when pipes
/// nest deeper than [`MAX_NESTING_DEPTH`].
pub fn parse_pipe<'a, I>(tokens: &mut Peekable<I>, state: &mut ParseState) -> ParseResult<Expr>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let offset = tokens.peek().map_or(state.end(), |(_, offset)| *offset);
    state.enter(offset)?;
    let pipe = parse_chain(tokens, state);
    state.leave();
    pipe
}

/// Parses the head and stages of one pipe chain.
fn parse_chain<'a, I>(tokens: &mut Peekable<I>, state: &mut ParseState) -> ParseResult<Expr>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let head = parse_head(tokens, state)?;
    let offset = head.offset();
    let mut stages = Vec::new();

    while let Some((Token::Pipe, _)) = tokens.peek() {
        tokens.next();
        stages.push(parse_stage(tokens, state)?);
    }

    if stages.is_empty() {
        return Ok(head);
    }

    Ok(Expr::Pipe { head: Box::new(head),
                    stages,
                    offset })
}

/// Parses a complete token stream as one pipe chain.
///
/// Fails if the stream is empty or if tokens remain after the chain.
///
/// # Parameters
/// - `tokens`: The tokens to parse.
/// - `end`: Byte offset reported for errors at end of input.
pub fn parse_token_stream(tokens: &[(Token, usize)], end: usize) -> ParseResult<Expr> {
    let mut state = ParseState::new(end);
    let mut iter = tokens.iter().peekable();

    let expr = parse_pipe(&mut iter, &mut state)?;

    if let Some((token, offset)) = iter.next() {
        return Err(ParseError::UnexpectedTrailingTokens { token:  token.describe(),
                                                          offset: *offset, });
    }

    Ok(expr)
}

/// Parses a source string in the expression grammar.
///
/// # Errors
/// Returns a [`ParseError`] for lexical or grammatical problems.
///
/// # Example
/// ```
/// use weft::{ast::Expr, interpreter::parser::core::parse_expression};
///
/// let expr = parse_expression(r#""1,2" | split ",""#).unwrap();
/// assert!(matches!(expr, Expr::Pipe { .. }));
///
/// assert!(parse_expression(r#""1,2" |"#).is_err());
/// ```
pub fn parse_expression(source: &str) -> ParseResult<Expr> {
    let tokens = tokenize(source)?;
    parse_token_stream(&tokens, source.len())
}

/// Parses a source string that must consist of exactly one closure
/// definition.
///
/// # Errors
/// Returns a [`ParseError`] if the source is malformed or is some other kind
/// of expression.
pub fn parse_closure_definition(source: &str) -> ParseResult<ClosureDef> {
    match parse_expression(source)? {
        Expr::ClosureDefinition(def) => Ok(def),
        other => Err(ParseError::UnexpectedToken { expected: "a closure definition \
                                                              '@name(params) => (body)'"
                                                                                   .to_string(),
                                                   found:    "another expression".to_string(),
                                                   offset:   other.offset(), }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::LiteralValue;

    #[test]
    fn nesting_is_limited() {
        let nested = |depth: usize| format!("{}.a{}", "(".repeat(depth), ")".repeat(depth));

        assert!(parse_expression(&nested(MAX_NESTING_DEPTH - 1)).is_ok());

        let err = parse_expression(&nested(MAX_NESTING_DEPTH)).unwrap_err();
        assert_eq!(err,
                   ParseError::NestingTooDeep { limit:  MAX_NESTING_DEPTH,
                                                offset: MAX_NESTING_DEPTH, });

        let err = parse_expression(&nested(5000)).unwrap_err();
        assert!(matches!(err, ParseError::NestingTooDeep { .. }));
    }

    #[test]
    fn single_term_is_not_wrapped() {
        let expr = parse_expression(".id").unwrap();
        assert_eq!(expr,
                   Expr::Accessor { path:   vec!["id".into()],
                                    offset: 0, });
    }

    #[test]
    fn pipe_stages_are_calls() {
        let expr = parse_expression(r#""a,b" | split "," | len"#).unwrap();
        let Expr::Pipe { head, stages, .. } = expr else {
            panic!("expected a pipe");
        };
        assert_eq!(*head,
                   Expr::Literal { value:  LiteralValue::from("a,b"),
                                   offset: 0, });
        assert_eq!(stages.len(), 2);
        assert!(matches!(&stages[1], Expr::FunctionCall { name, arguments, .. }
                         if name == "len" && arguments.is_empty()));
    }

    #[test]
    fn dangling_pipe() {
        let err = parse_expression(".a |").unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedEndOfInput { offset: 4, .. }), "{err:?}");
    }

    #[test]
    fn value_after_pipe_is_rejected() {
        let err = parse_expression(".a | .b").unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedToken { offset: 5, .. }), "{err:?}");
    }

    #[test]
    fn trailing_tokens() {
        let err = parse_expression(".a )").unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedTrailingTokens { offset: 3, .. }),
                "{err:?}");
    }

    #[test]
    fn empty_expression() {
        assert!(matches!(parse_expression("   "),
                         Err(ParseError::UnexpectedEndOfInput { offset: 3, .. })));
    }

    #[test]
    fn closure_definition_source() {
        let def = parse_closure_definition("@twice(x) => ($x | concat $x)").unwrap();
        assert_eq!(def.name, "twice");
        assert_eq!(def.params, ["x"]);

        assert!(parse_closure_definition(".id").is_err());
    }
}
