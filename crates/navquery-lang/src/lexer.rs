//! Lexer for `$filter` and `$orderby` text using logos.

use crate::error::ParseError;
use crate::span::Span;
use logos::Logos;

/// Token types of the filter grammar.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n]+")]
pub enum Token {
    // Relational operators
    #[token("eq")]
    Eq,
    #[token("ne")]
    Ne,
    #[token("gt")]
    Gt,
    #[token("ge")]
    Ge,
    #[token("lt")]
    Lt,
    #[token("le")]
    Le,

    // Logical operators
    #[token("and")]
    And,
    #[token("or")]
    Or,
    #[token("not")]
    Not,

    // Arithmetic operators
    #[token("add")]
    Add,
    #[token("sub")]
    Sub,
    #[token("mul")]
    Mul,
    #[token("div")]
    Div,
    #[token("mod")]
    Mod,

    // Sort direction
    #[token("asc")]
    Asc,
    #[token("desc")]
    Desc,

    // Keyword literals
    #[token("true")]
    True,
    #[token("false")]
    False,
    #[token("null")]
    Null,

    // Typed literals
    #[regex(r"datetime'[^']*'", |lex| quoted_body(lex.slice()))]
    DateTime(String),
    #[regex(r"datetimeoffset'[^']*'", |lex| quoted_body(lex.slice()))]
    DateTimeOffset(String),
    #[regex(r"guid'[^']*'", |lex| quoted_body(lex.slice()))]
    Guid(String),
    #[regex(r"[xX]'[^']*'", |lex| quoted_body(lex.slice()))]
    #[regex(r"binary'[^']*'", |lex| quoted_body(lex.slice()))]
    Binary(String),

    // Identifier
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string())]
    Ident(String),

    // String literal, `''` escapes a quote
    #[regex(r"'([^']|'')*'", |lex| {
        let s = lex.slice();
        s[1..s.len() - 1].replace("''", "'")
    })]
    String(String),

    // Numeric literals
    #[regex(r"[0-9]+", |lex| lex.slice().parse::<i64>().ok())]
    Int(i64),
    #[regex(r"[0-9]+[lL]", |lex| lex.slice()[..lex.slice().len() - 1].parse::<i64>().ok())]
    Long(i64),
    #[regex(r"[0-9]+(\.[0-9]+)?[mM]", |lex| lex.slice()[..lex.slice().len() - 1].to_string())]
    Decimal(String),
    #[regex(r"[0-9]+\.[0-9]+([eE][+-]?[0-9]+)?[dD]?", parse_double)]
    #[regex(r"[0-9]+[eE][+-]?[0-9]+[dD]?", parse_double)]
    Double(f64),

    // Punctuation
    #[token("/")]
    Slash,
    #[token(",")]
    Comma,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("-")]
    Minus,
}

/// The text between the first and the last quote of a prefixed literal.
fn quoted_body(slice: &str) -> String {
    let start = slice.find('\'').map(|i| i + 1).unwrap_or(0);
    let end = slice.len().saturating_sub(1).max(start);
    slice[start..end].to_string()
}

fn parse_double(lex: &mut logos::Lexer<Token>) -> Option<f64> {
    lex.slice().trim_end_matches(['d', 'D']).parse::<f64>().ok()
}

impl Token {
    /// Short human-readable description for error messages.
    pub fn describe(&self) -> String {
        match self {
            Token::Ident(name) => format!("identifier '{}'", name),
            Token::String(s) => format!("string '{}'", s),
            Token::Int(i) | Token::Long(i) => format!("number {}", i),
            Token::Double(d) => format!("number {}", d),
            Token::Decimal(d) => format!("number {}", d),
            Token::DateTime(_) | Token::DateTimeOffset(_) => "date-time literal".to_string(),
            Token::Guid(_) => "guid literal".to_string(),
            Token::Binary(_) => "binary literal".to_string(),
            other => format!("{:?}", other),
        }
    }
}

/// A token with its span in the source.
#[derive(Debug, Clone, PartialEq)]
pub struct SpannedToken {
    pub token: Token,
    pub span: Span,
}

type LexResult = Result<SpannedToken, ParseError>;

/// Lexer that produces spanned tokens with one token of lookahead.
pub struct Lexer<'source> {
    inner: logos::Lexer<'source, Token>,
    peeked: Option<Option<LexResult>>,
}

impl<'source> Lexer<'source> {
    pub fn new(source: &'source str) -> Self {
        Self {
            inner: Token::lexer(source),
            peeked: None,
        }
    }

    /// Peek at the next token without consuming it.
    pub fn peek(&mut self) -> Option<&LexResult> {
        if self.peeked.is_none() {
            self.peeked = Some(self.next_inner());
        }
        self.peeked.as_ref().and_then(|o| o.as_ref())
    }

    /// Consume the next token.
    pub fn next_token(&mut self) -> Option<LexResult> {
        match self.peeked.take() {
            Some(peeked) => peeked,
            None => self.next_inner(),
        }
    }

    fn next_inner(&mut self) -> Option<LexResult> {
        let token = self.inner.next()?;
        let span: Span = self.inner.span().into();
        Some(match token {
            Ok(token) => Ok(SpannedToken { token, span }),
            Err(()) => Err(ParseError::new(
                format!("unrecognized input '{}'", self.inner.slice()),
                span,
            )),
        })
    }

    /// Get the source string.
    pub fn source(&self) -> &'source str {
        self.inner.source()
    }
}

impl Iterator for Lexer<'_> {
    type Item = LexResult;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token()
    }
}

/// Tokenize a source string, stopping at the first unrecognized input.
pub fn tokenize(source: &str) -> Result<Vec<SpannedToken>, ParseError> {
    Lexer::new(source).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(source: &str) -> Vec<Token> {
        tokenize(source)
            .unwrap()
            .into_iter()
            .map(|t| t.token)
            .collect()
    }

    #[test]
    fn test_simple_filter() {
        assert_eq!(
            tokens("orders/total gt 100"),
            vec![
                Token::Ident("orders".to_string()),
                Token::Slash,
                Token::Ident("total".to_string()),
                Token::Gt,
                Token::Int(100),
            ]
        );
    }

    #[test]
    fn test_keywords_vs_identifiers() {
        assert_eq!(
            tokens("description desc equals eq"),
            vec![
                Token::Ident("description".to_string()),
                Token::Desc,
                Token::Ident("equals".to_string()),
                Token::Eq,
            ]
        );
    }

    #[test]
    fn test_numbers() {
        assert_eq!(
            tokens("12 12L 1.5 2.5M 3M 1e3 4.0d"),
            vec![
                Token::Int(12),
                Token::Long(12),
                Token::Double(1.5),
                Token::Decimal("2.5".to_string()),
                Token::Decimal("3".to_string()),
                Token::Double(1000.0),
                Token::Double(4.0),
            ]
        );
    }

    #[test]
    fn test_string_escapes() {
        assert_eq!(
            tokens("'O''Neil' ''"),
            vec![Token::String("O'Neil".to_string()), Token::String(String::new())]
        );
    }

    #[test]
    fn test_typed_literals() {
        assert_eq!(
            tokens("datetime'2024-01-01T00:00' guid'0123' X'AB01' binary'ff' datetimeoffset'2024-01-01T00:00:00+02:00'"),
            vec![
                Token::DateTime("2024-01-01T00:00".to_string()),
                Token::Guid("0123".to_string()),
                Token::Binary("AB01".to_string()),
                Token::Binary("ff".to_string()),
                Token::DateTimeOffset("2024-01-01T00:00:00+02:00".to_string()),
            ]
        );
    }

    #[test]
    fn test_function_call() {
        assert_eq!(
            tokens("startswith(name,'Al')"),
            vec![
                Token::Ident("startswith".to_string()),
                Token::LParen,
                Token::Ident("name".to_string()),
                Token::Comma,
                Token::String("Al".to_string()),
                Token::RParen,
            ]
        );
    }

    #[test]
    fn test_unrecognized_input() {
        let err = tokenize("name == 'x'").unwrap_err();
        assert_eq!(err.span.start, 5);
        assert!(err.message.contains("unrecognized"));
    }

    #[test]
    fn test_lexer_peek() {
        let mut lexer = Lexer::new("a/b");
        let first = lexer.peek().cloned().unwrap().unwrap();
        assert_eq!(first.token, Token::Ident("a".to_string()));
        let consumed = lexer.next_token().unwrap().unwrap();
        assert_eq!(consumed, first);
        assert_eq!(lexer.next_token().unwrap().unwrap().token, Token::Slash);
    }
}
