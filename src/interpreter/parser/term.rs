use std::iter::Peekable;

use crate::{
    ast::{Expr, LiteralValue},
    error::ParseError,
    interpreter::{
        lexer::Token,
        parser::{
            closure::parse_closure,
            core::{ParseResult, ParseState, parse_pipe},
            utils::{expect, parse_identifier},
        },
    },
};

/// Parses the head of a pipe chain.
///
/// The head is the only position where a bare value may appear. A function
/// name or closure name starts a call that takes its following arguments.
///
/// Grammar:
/// ```text
///     head := call | closure_def | closure_call | value
/// ```
pub(crate) fn parse_head<'a, I>(tokens: &mut Peekable<I>,
                                state: &mut ParseState)
                                -> ParseResult<Expr>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    match tokens.peek() {
        Some((Token::Identifier(_), _)) => parse_call(tokens, state),
        Some((Token::ClosureName(_), _)) => parse_closure(tokens, state),
        _ => parse_value(tokens, state),
    }
}

/// Parses a pipe stage, the term after a `|`.
///
/// Stages receive the previous result as their parent, so only calls are
/// allowed here; a literal or accessor after `|` is rejected.
///
/// Grammar:
/// ```text
///     stage := call | closure_def | closure_call
/// ```
pub(crate) fn parse_stage<'a, I>(tokens: &mut Peekable<I>,
                                 state: &mut ParseState)
                                 -> ParseResult<Expr>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    const EXPECTED: &str = "a function or closure call after '|'";

    match tokens.peek() {
        Some((Token::Identifier(_), _)) => parse_call(tokens, state),
        Some((Token::ClosureName(_), _)) => parse_closure(tokens, state),
        Some((tok, offset)) => Err(ParseError::UnexpectedToken { expected: EXPECTED.to_string(),
                                                                 found:    tok.describe(),
                                                                 offset:   *offset, }),
        None => Err(ParseError::UnexpectedEndOfInput { expected: EXPECTED.to_string(),
                                                       offset:   state.end(), }),
    }
}

/// Parses a function call: a name followed by zero or more arguments.
///
/// Grammar: `call := IDENT arg*`
pub(crate) fn parse_call<'a, I>(tokens: &mut Peekable<I>,
                                state: &mut ParseState)
                                -> ParseResult<Expr>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let (name, offset) = parse_identifier(tokens, state)?;
    let arguments = parse_arguments(tokens, state)?;

    Ok(Expr::FunctionCall { name,
                            arguments,
                            offset })
}

/// Parses the arguments of a call.
///
/// Arguments continue until a token that cannot start one: `|`, `)`, `}` or
/// the end of input. A bare function or closure name in argument position is
/// a call that takes no arguments; wrap it in parentheses to pass it
/// arguments of its own.
///
/// Grammar: `arg := value | IDENT | AT_NAME`
pub(crate) fn parse_arguments<'a, I>(tokens: &mut Peekable<I>,
                                     state: &mut ParseState)
                                     -> ParseResult<Vec<Expr>>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let mut arguments = Vec::new();

    loop {
        match tokens.peek() {
            Some((Token::Identifier(name), offset)) => {
                tokens.next();
                arguments.push(Expr::FunctionCall { name:      name.clone(),
                                                    arguments: Vec::new(),
                                                    offset:    *offset, });
            },
            Some((Token::ClosureName(name), offset)) => {
                tokens.next();
                arguments.push(Expr::ClosureInvocation { name:      name.clone(),
                                                         arguments: Vec::new(),
                                                         offset:    *offset, });
            },
            Some((tok, _)) if starts_value(tok) => arguments.push(parse_value(tokens, state)?),
            _ => break,
        }
    }

    Ok(arguments)
}

/// Returns `true` if `token` can begin a value term.
const fn starts_value(token: &Token) -> bool {
    matches!(token,
             Token::Str(_)
             | Token::Number(_)
             | Token::Bool(_)
             | Token::Null
             | Token::Accessor(_)
             | Token::Variable(_)
             | Token::LParen)
}

/// Parses a value term.
///
/// `$name` is a parameter reference when `name` is a parameter of an
/// enclosing closure definition, and a global accessor otherwise.
///
/// Grammar:
/// ```text
///     value := STRING | NUMBER | BOOL | NULL
///            | ACCESSOR
///            | VARIABLE
///            | "(" pipe ")"
/// ```
///
/// # Errors
/// Returns a `ParseError` if the next token cannot start a value or a
/// parenthesized pipe is not closed.
pub(crate) fn parse_value<'a, I>(tokens: &mut Peekable<I>,
                                 state: &mut ParseState)
                                 -> ParseResult<Expr>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    const EXPECTED: &str = "an expression";

    let Some((token, offset)) = tokens.next() else {
        return Err(ParseError::UnexpectedEndOfInput { expected: EXPECTED.to_string(),
                                                      offset:   state.end(), });
    };
    let offset = *offset;

    let literal = |value: LiteralValue| -> ParseResult<Expr> {
        Ok(Expr::Literal { value, offset })
    };

    match token {
        Token::Str(s) => literal(LiteralValue::String(s.clone())),
        Token::Number(n) => literal(LiteralValue::Number(*n)),
        Token::Bool(b) => literal(LiteralValue::Bool(*b)),
        Token::Null => literal(LiteralValue::Null),
        Token::Accessor(path) => Ok(Expr::Accessor { path: path.clone(),
                                                     offset }),
        Token::Variable(var) if state.is_param(&var.name) => {
            Ok(Expr::VariableRef { name: var.name.clone(),
                                   path: var.path.clone(),
                                   offset })
        },
        Token::Variable(var) => Ok(Expr::GlobalAccessor { name: var.name.clone(),
                                                          path: var.path.clone(),
                                                          offset }),
        Token::LParen => {
            let inner = parse_pipe(tokens, state)?;
            expect(tokens, state, &Token::RParen)?;
            Ok(inner)
        },
        tok => Err(ParseError::UnexpectedToken { expected: EXPECTED.to_string(),
                                                 found:    tok.describe(),
                                                 offset }),
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        ast::{Expr, LiteralValue},
        error::ParseError,
        interpreter::parser::core::parse_expression,
    };

    fn call(name: &str, arguments: Vec<Expr>, offset: usize) -> Expr {
        Expr::FunctionCall { name: name.to_string(),
                             arguments,
                             offset }
    }

    #[test]
    fn bare_identifier_argument_is_a_call() {
        let expr = parse_expression("eq len 3").unwrap();

        assert_eq!(expr,
                   call("eq",
                        vec![call("len", vec![], 3),
                             Expr::Literal { value:  LiteralValue::Number(3.0),
                                             offset: 7, }],
                        0));
    }

    #[test]
    fn parenthesized_call_takes_its_own_arguments() {
        let expr = parse_expression(r#"eq (concat "a" "b") "ab""#).unwrap();
        let Expr::FunctionCall { arguments, .. } = expr else {
            panic!("expected a call");
        };

        assert_eq!(arguments.len(), 2);
        assert!(matches!(&arguments[0], Expr::FunctionCall { name, arguments, .. }
                         if name == "concat" && arguments.len() == 2));
    }

    #[test]
    fn dollar_outside_closure_is_global() {
        let expr = parse_expression("$request.id").unwrap();

        assert_eq!(expr,
                   Expr::GlobalAccessor { name:   "request".into(),
                                          path:   vec!["id".into()],
                                          offset: 0, });
    }

    #[test]
    fn unclosed_parenthesis() {
        let err = parse_expression("(.a | len").unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedEndOfInput { offset: 9, .. }), "{err:?}");
    }

    #[test]
    fn comma_cannot_start_a_value() {
        let err = parse_expression(",").unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedToken { offset: 0, .. }), "{err:?}");
    }
}
