use logos::Logos;

use crate::error::ParseError;

/// A `$name.path` reference as it appears in source.
#[derive(Debug, PartialEq, Clone)]
pub struct VariablePath {
    /// The name after the `$`.
    pub name: String,
    /// Field names following the name.
    pub path: Vec<String>,
}

/// The reason the lexer rejected a slice of input.
#[derive(Debug, PartialEq, Clone, Default)]
pub enum LexicalError {
    /// No token matches the input.
    #[default]
    InvalidToken,
    /// A string literal contains an unknown escape sequence.
    InvalidEscape,
    /// A number literal does not fit a finite `f64`.
    InvalidNumber,
}

/// Represents a lexical token in the source input.
/// A token is a minimal but meaningful unit of text produced by the lexer.
/// This enum defines all recognized tokens in the language.
#[derive(Logos, Debug, PartialEq, Clone)]
#[logos(error = LexicalError)]
#[logos(skip r"[ \t\r\n\f]+")]
pub enum Token {
    /// String literal tokens in double or single quotes, such as `"a,b"`.
    #[regex(r#""([^"\\]|\\.)*""#, parse_string)]
    #[regex(r#"'([^'\\]|\\.)*'"#, parse_string)]
    Str(String),
    /// Numeric literal tokens, such as `3`, `-2.5` or `1e3`.
    #[regex(r"-?[0-9]+(\.[0-9]+)?([eE][+-]?[0-9]+)?", parse_number)]
    Number(f64),
    /// Boolean literal tokens, such as `true`.
    #[token("true", |_| true)]
    #[token("false", |_| false)]
    Bool(bool),
    /// `null`
    #[token("null")]
    Null,
    /// Function names such as `map` or `split`.
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string())]
    Identifier(String),
    /// Accessor paths: `.`, `.id`, `.user.name`, `.items.0`.
    #[regex(r"\.([a-zA-Z0-9_]+(\.[a-zA-Z0-9_]+)*)?", parse_accessor)]
    Accessor(Vec<String>),
    /// Parameter or global references: `$val`, `$request.id`.
    #[regex(r"\$[a-zA-Z_][a-zA-Z0-9_]*(\.[a-zA-Z0-9_]+)*", parse_variable)]
    Variable(VariablePath),
    /// Closure names: `@double`.
    #[regex(r"@[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice()[1..].to_string())]
    ClosureName(String),
    /// `|`
    #[token("|")]
    Pipe,
    /// `(`
    #[token("(")]
    LParen,
    /// `)`
    #[token(")")]
    RParen,
    /// `,`
    #[token(",")]
    Comma,
    /// `=>`
    #[token("=>")]
    Arrow,
    /// `{`
    #[token("{")]
    LBrace,
    /// `}`
    #[token("}")]
    RBrace,
}

impl Token {
    /// A short human readable description, used in parse errors.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Str(s) => format!("string {s:?}"),
            Self::Number(n) => format!("number {n}"),
            Self::Bool(b) => format!("'{b}'"),
            Self::Null => "'null'".to_string(),
            Self::Identifier(name) => format!("identifier '{name}'"),
            Self::Accessor(path) => format!("accessor '.{}'", path.join(".")),
            Self::Variable(var) => {
                if var.path.is_empty() {
                    format!("'${}'", var.name)
                } else {
                    format!("'${}.{}'", var.name, var.path.join("."))
                }
            },
            Self::ClosureName(name) => format!("closure '@{name}'"),
            Self::Pipe => "'|'".to_string(),
            Self::LParen => "'('".to_string(),
            Self::RParen => "')'".to_string(),
            Self::Comma => "','".to_string(),
            Self::Arrow => "'=>'".to_string(),
            Self::LBrace => "'{'".to_string(),
            Self::RBrace => "'}'".to_string(),
        }
    }
}

/// Tokenizes a complete expression.
///
/// Returns `(Token, offset)` pairs where `offset` is the byte offset of the
/// token's first character.
///
/// # Errors
/// Returns a lexical [`ParseError`] for input that does not form a token.
///
/// # Example
/// ```
/// use weft::interpreter::lexer::{Token, tokenize};
///
/// let tokens = tokenize(r#"split ",""#).unwrap();
///
/// assert_eq!(tokens,
///            vec![(Token::Identifier("split".into()), 0), (Token::Str(",".into()), 6)]);
/// ```
pub fn tokenize(source: &str) -> Result<Vec<(Token, usize)>, ParseError> {
    let (tokens, _) = tokenize_from(source, 0, false)?;
    Ok(tokens)
}

/// Tokenizes the expression inside an interpolation span.
///
/// Lexing starts at byte `start` (just after the opening `{`) and stops at the
/// first `}` token. Braces inside string literals do not count.
///
/// # Returns
/// The tokens (offsets relative to the whole source) and the offset just past
/// the closing brace.
///
/// # Errors
/// Returns a lexical [`ParseError`], or `UnterminatedInterpolation` when no
/// closing brace is found.
pub fn tokenize_interpolation(source: &str,
                              start: usize)
                              -> Result<(Vec<(Token, usize)>, usize), ParseError> {
    let (tokens, end) = tokenize_from(source, start, true)?;
    end.map(|end| (tokens, end))
       .ok_or(ParseError::UnterminatedInterpolation { offset: start.saturating_sub(1) })
}

/// Shared tokenizer loop.
///
/// With `stop_at_brace`, returns at the first `}` along with the offset just
/// past it; otherwise the second element is always `None`.
fn tokenize_from(source: &str,
                 start: usize,
                 stop_at_brace: bool)
                 -> Result<(Vec<(Token, usize)>, Option<usize>), ParseError> {
    let mut tokens = Vec::new();
    let mut lexer = Token::lexer(&source[start..]);

    while let Some(token) = lexer.next() {
        let span = lexer.span();
        let offset = start + span.start;
        match token {
            Ok(Token::RBrace) if stop_at_brace => return Ok((tokens, Some(start + span.end))),
            Ok(tok) => tokens.push((tok, offset)),
            Err(error) => return Err(lexical_error(&error, lexer.slice(), offset)),
        }
    }

    Ok((tokens, None))
}

/// Maps a logos failure onto the parse error taxonomy.
fn lexical_error(error: &LexicalError, slice: &str, offset: usize) -> ParseError {
    match error {
        LexicalError::InvalidEscape => ParseError::InvalidEscape { text: slice.to_string(),
                                                                   offset },
        LexicalError::InvalidNumber => ParseError::InvalidNumber { text: slice.to_string(),
                                                                   offset },
        LexicalError::InvalidToken if slice.starts_with(['"', '\'']) => {
            ParseError::UnterminatedString { offset }
        },
        LexicalError::InvalidToken => ParseError::InvalidToken { text: slice.to_string(),
                                                                 offset },
    }
}

/// Resolves the escapes of a quoted string literal.
///
/// Supported escapes: `\"`, `\'`, `\\`, `\/`, `\n`, `\t`, `\r`, `\{`, `\}` and
/// `\u{XXXX}`.
fn parse_string(lex: &logos::Lexer<Token>) -> Result<String, LexicalError> {
    let slice = lex.slice();
    let inner = &slice[1..slice.len() - 1];
    unescape(inner)
}

/// Resolves backslash escapes in `text`.
pub(crate) fn unescape(text: &str) -> Result<String, LexicalError> {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some(c @ ('"' | '\'' | '\\' | '/' | '{' | '}')) => out.push(c),
            Some('u') => out.push(parse_unicode_escape(&mut chars)?),
            _ => return Err(LexicalError::InvalidEscape),
        }
    }

    Ok(out)
}

/// Parses the `{XXXX}` part of a `\u{XXXX}` escape.
fn parse_unicode_escape(chars: &mut std::str::Chars<'_>) -> Result<char, LexicalError> {
    if chars.next() != Some('{') {
        return Err(LexicalError::InvalidEscape);
    }
    let mut hex = String::new();
    for c in chars.by_ref() {
        if c == '}' {
            return u32::from_str_radix(&hex, 16).ok()
                                                .and_then(char::from_u32)
                                                .ok_or(LexicalError::InvalidEscape);
        }
        hex.push(c);
    }
    Err(LexicalError::InvalidEscape)
}

/// Parses a number literal from the current token slice.
fn parse_number(lex: &logos::Lexer<Token>) -> Result<f64, LexicalError> {
    match lex.slice().parse::<f64>() {
        Ok(n) if n.is_finite() => Ok(n),
        _ => Err(LexicalError::InvalidNumber),
    }
}

/// Splits an accessor slice such as `.a.b` into its field names.
fn parse_accessor(lex: &logos::Lexer<Token>) -> Vec<String> {
    split_path(&lex.slice()[1..])
}

/// Splits a `$name.path` slice into name and field names.
fn parse_variable(lex: &logos::Lexer<Token>) -> VariablePath {
    let mut parts = split_path(&lex.slice()[1..]).into_iter();
    let name = parts.next().unwrap_or_default();
    VariablePath { name,
                   path: parts.collect() }
}

fn split_path(text: &str) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }
    text.split('.').map(str::to_string).collect()
}
