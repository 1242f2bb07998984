use crate::{
    ast::{Template, TemplatePart},
    error::ParseError,
    interpreter::{
        lexer::tokenize_interpolation,
        parser::core::{ParseResult, parse_token_stream},
    },
};

/// Parses an interpolation template.
///
/// Text outside braces is kept literally, except for the escapes `\{`, `\}`
/// and `\\`; any other backslash is kept as written. Each `{ ... }` span is
/// parsed in the expression grammar. An empty span produces an empty part.
/// Offsets in errors point into the whole template.
///
/// # Errors
/// Returns a [`ParseError`] for a stray `}`, an unclosed `{`, or a span that
/// fails to parse.
///
/// # Example
/// ```
/// use weft::{ast::TemplatePart, interpreter::parser::template::parse_template};
///
/// let template = parse_template(r"Hi {.name}\{!\}").unwrap();
///
/// assert_eq!(template.parts.len(), 3);
/// assert_eq!(template.parts[2], TemplatePart::Text("{!}".to_string()));
/// ```
pub fn parse_template(source: &str) -> ParseResult<Template> {
    let mut parts = Vec::new();
    let mut text = String::new();
    let mut pos = 0;

    while let Some(c) = source[pos..].chars().next() {
        match c {
            '\\' => {
                match source[pos + 1..].chars().next() {
                    Some(escaped @ ('{' | '}' | '\\')) => {
                        text.push(escaped);
                        pos += 2;
                    },
                    _ => {
                        text.push('\\');
                        pos += 1;
                    },
                }
            },
            '{' => {
                if !text.is_empty() {
                    parts.push(TemplatePart::Text(std::mem::take(&mut text)));
                }
                let (tokens, end) = tokenize_interpolation(source, pos + 1)?;
                let expr = if tokens.is_empty() {
                    None
                } else {
                    Some(parse_token_stream(&tokens, end - 1)?)
                };
                parts.push(TemplatePart::Expr(expr));
                pos = end;
            },
            '}' => return Err(ParseError::UnmatchedBrace { offset: pos }),
            c => {
                text.push(c);
                pos += c.len_utf8();
            },
        }
    }

    if !text.is_empty() {
        parts.push(TemplatePart::Text(text));
    }

    Ok(Template { parts })
}
