use std::iter::Peekable;

use crate::{
    ast::{ClosureDef, Expr},
    error::ParseError,
    interpreter::{
        lexer::Token,
        parser::{
            core::{ParseResult, ParseState, parse_pipe},
            term::parse_arguments,
            utils::{expect, parse_comma_separated, parse_identifier},
        },
    },
};

/// Parses a term that starts with `@name`.
///
/// If the name is followed by a parameter list and `=>`, the term is a
/// closure definition. Otherwise it is an invocation and the following terms
/// are its arguments, so `@f (.a)` passes one parenthesized argument.
///
/// Grammar:
/// ```text
///     closure_def  := AT_NAME "(" params ")" "=>" "(" pipe ")"
///     closure_call := AT_NAME arg*
/// ```
///
/// # Parameters
/// - `tokens`: Token iterator positioned at the closure name.
/// - `state`: Parse state for parameter tracking.
pub(crate) fn parse_closure<'a, I>(tokens: &mut Peekable<I>,
                                   state: &mut ParseState)
                                   -> ParseResult<Expr>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let (name, offset) = match tokens.next() {
        Some((Token::ClosureName(name), offset)) => (name.clone(), *offset),
        Some((tok, offset)) => {
            return Err(ParseError::UnexpectedToken { expected: "a closure name".to_string(),
                                                     found:    tok.describe(),
                                                     offset:   *offset, });
        },
        None => {
            return Err(ParseError::UnexpectedEndOfInput { expected: "a closure name".to_string(),
                                                          offset:   state.end(), });
        },
    };

    if is_definition(tokens.clone()) {
        return parse_definition(tokens, state, name, offset).map(Expr::ClosureDefinition);
    }

    let arguments = parse_arguments(tokens, state)?;

    Ok(Expr::ClosureInvocation { name,
                                 arguments,
                                 offset })
}

/// Looks ahead for `( PARAM? ("," PARAM)* ) =>` without consuming anything.
///
/// A parameter is written either bare (`x`) or as a variable (`$x`).
fn is_definition<'a, I>(mut lookahead: Peekable<I>) -> bool
    where I: Iterator<Item = &'a (Token, usize)>
{
    if !matches!(lookahead.next(), Some((Token::LParen, _))) {
        return false;
    }
    for (token, _) in lookahead.by_ref() {
        match token {
            Token::Identifier(_) | Token::Comma => {},
            Token::Variable(var) if var.path.is_empty() => {},
            Token::RParen => break,
            _ => return false,
        }
    }
    matches!(lookahead.next(), Some((Token::Arrow, _)))
}

/// Parses one parameter name, `x` or `$x`.
fn parse_parameter<'a, I>(tokens: &mut Peekable<I>, state: &ParseState) -> ParseResult<String>
    where I: Iterator<Item = &'a (Token, usize)>
{
    if let Some((Token::Variable(var), _)) = tokens.peek()
       && var.path.is_empty()
    {
        let name = var.name.clone();
        tokens.next();
        return Ok(name);
    }
    parse_identifier(tokens, state).map(|(name, _)| name)
}

/// Parses the parameter list and body of a closure definition.
///
/// Parameters are in scope as `$name` references for the whole body,
/// including nested closure definitions.
///
/// # Errors
/// Returns [`ParseError::DuplicateParameter`] if a name appears twice in the
/// parameter list, or a grammar error for a malformed body.
fn parse_definition<'a, I>(tokens: &mut Peekable<I>,
                           state: &mut ParseState,
                           name: String,
                           offset: usize)
                           -> ParseResult<ClosureDef>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    expect(tokens, state, &Token::LParen)?;
    let params = parse_comma_separated(tokens,
                                       state,
                                       parse_parameter,
                                       &Token::RParen)?;

    if let Some(duplicate) = params.iter()
                                   .enumerate()
                                   .find_map(|(i, p)| params[..i].contains(p).then_some(p))
    {
        return Err(ParseError::DuplicateParameter { name: duplicate.clone(),
                                                    offset });
    }

    expect(tokens, state, &Token::Arrow)?;
    expect(tokens, state, &Token::LParen)?;

    state.push_params(params.clone());
    let body = parse_pipe(tokens, state);
    state.pop_params();
    let body = body?;

    expect(tokens, state, &Token::RParen)?;

    Ok(ClosureDef { name,
                    params,
                    body: Box::new(body),
                    offset })
}

#[cfg(test)]
mod tests {
    use crate::{
        ast::{ClosureDef, Expr},
        error::ParseError,
        interpreter::parser::core::parse_expression,
    };

    #[test]
    fn definition_binds_parameters() {
        let expr = parse_expression("@pick(a, b) => ($b.id)").unwrap();
        let Expr::ClosureDefinition(ClosureDef { name, params, body, .. }) = expr else {
            panic!("expected a closure definition");
        };

        assert_eq!(name, "pick");
        assert_eq!(params, ["a", "b"]);
        assert_eq!(*body,
                   Expr::VariableRef { name:   "b".into(),
                                       path:   vec!["id".into()],
                                       offset: 16, });
    }

    #[test]
    fn parameters_may_be_written_as_variables() {
        let expr = parse_expression("@pair($a, b) => (concat $a $b)").unwrap();
        let Expr::ClosureDefinition(ClosureDef { params, body, .. }) = expr else {
            panic!("expected a closure definition");
        };
        let Expr::FunctionCall { arguments, .. } = *body else {
            panic!("expected a call");
        };

        assert_eq!(params, ["a", "b"]);
        assert!(arguments.iter().all(|a| matches!(a, Expr::VariableRef { .. })));
    }

    #[test]
    fn variable_with_a_path_is_not_a_parameter() {
        let expr = parse_expression("@f ($a.b)").unwrap();
        assert!(matches!(expr, Expr::ClosureInvocation { .. }));
    }

    #[test]
    fn invocation_with_parenthesized_argument() {
        let expr = parse_expression("@f (.a) 2").unwrap();
        let Expr::ClosureInvocation { name, arguments, .. } = expr else {
            panic!("expected an invocation");
        };

        assert_eq!(name, "f");
        assert_eq!(arguments.len(), 2);
    }

    #[test]
    fn parameters_are_visible_in_nested_definitions() {
        let expr = parse_expression("@outer(x) => (@inner(y) => (concat $x $y))").unwrap();
        let Expr::ClosureDefinition(outer) = expr else {
            panic!("expected a closure definition");
        };
        let Expr::ClosureDefinition(inner) = *outer.body else {
            panic!("expected a nested definition");
        };
        let Expr::FunctionCall { arguments, .. } = *inner.body else {
            panic!("expected a call");
        };

        assert!(arguments.iter().all(|a| matches!(a, Expr::VariableRef { .. })));
    }

    #[test]
    fn parameters_do_not_leak_out_of_the_body() {
        let expr = parse_expression("@f(x) => ($x) | concat $x").unwrap();
        let Expr::Pipe { stages, .. } = expr else {
            panic!("expected a pipe");
        };
        let Expr::FunctionCall { arguments, .. } = &stages[0] else {
            panic!("expected a call");
        };

        assert!(matches!(&arguments[0], Expr::GlobalAccessor { name, .. } if name == "x"));
    }

    #[test]
    fn duplicate_parameter() {
        let err = parse_expression("@f(a, a) => ($a)").unwrap_err();
        assert_eq!(err,
                   ParseError::DuplicateParameter { name:   "a".into(),
                                                    offset: 0, });
    }

    #[test]
    fn missing_body_parenthesis() {
        let err = parse_expression("@f(a) => $a").unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedToken { offset: 9, .. }), "{err:?}");
    }
}
