//! Recursive descent parser for `$filter` and `$orderby` text.
//!
//! Precedence, loosest first: `or`, `and`, relational (`eq` .. `le`),
//! additive (`add`, `sub`), multiplicative (`mul`, `div`, `mod`), unary
//! (`-`, `not`), primary.

use crate::ast::*;
use crate::error::ParseError;
use crate::lexer::{Lexer, SpannedToken, Token};
use crate::span::{Span, Spanned};

/// Default bound on expression nesting.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Parser for filter expressions.
pub struct Parser<'source> {
    lexer: Lexer<'source>,
    source: &'source str,
    depth: usize,
    max_depth: usize,
}

impl<'source> Parser<'source> {
    pub fn new(source: &'source str) -> Self {
        Self {
            lexer: Lexer::new(source),
            source,
            depth: 0,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Bound the nesting depth of parsed expressions.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Parse a complete `$filter` expression.
    pub fn parse_filter(&mut self) -> Result<Expression, ParseError> {
        let expr = self.parse_expression()?;
        self.expect_end()?;
        Ok(expr)
    }

    /// Parse a complete `$orderby` list.
    pub fn parse_orderby(&mut self) -> Result<Vec<OrderByItem>, ParseError> {
        let mut items = Vec::new();
        loop {
            let expr = self.parse_expression()?;
            let mut span = expr.span();
            let direction = match self.peek_token()? {
                Some(Token::Asc) => {
                    span = span.merge(self.next_token()?.span);
                    SortDirection::Asc
                }
                Some(Token::Desc) => {
                    span = span.merge(self.next_token()?.span);
                    SortDirection::Desc
                }
                _ => SortDirection::Asc,
            };
            items.push(OrderByItem {
                expr,
                direction,
                span,
            });

            match self.peek_token()? {
                Some(Token::Comma) => {
                    self.next_token()?;
                }
                _ => break,
            }
        }
        self.expect_end()?;
        Ok(items)
    }

    fn parse_expression(&mut self) -> Result<Expression, ParseError> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> Result<Expression, ParseError> {
        let mut left = self.parse_and()?;
        while let Some(Token::Or) = self.peek_token()? {
            self.next_token()?;
            let right = self.parse_and()?;
            left = binary(BinaryOp::Or, left, right);
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expression, ParseError> {
        let mut left = self.parse_relational()?;
        while let Some(Token::And) = self.peek_token()? {
            self.next_token()?;
            let right = self.parse_relational()?;
            left = binary(BinaryOp::And, left, right);
        }
        Ok(left)
    }

    fn parse_relational(&mut self) -> Result<Expression, ParseError> {
        let mut left = self.parse_additive()?;
        loop {
            let op = match self.peek_token()? {
                Some(Token::Eq) => BinaryOp::Eq,
                Some(Token::Ne) => BinaryOp::Ne,
                Some(Token::Gt) => BinaryOp::Gt,
                Some(Token::Ge) => BinaryOp::Ge,
                Some(Token::Lt) => BinaryOp::Lt,
                Some(Token::Le) => BinaryOp::Le,
                _ => return Ok(left),
            };
            self.next_token()?;
            let right = self.parse_additive()?;
            left = binary(op, left, right);
        }
    }

    fn parse_additive(&mut self) -> Result<Expression, ParseError> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match self.peek_token()? {
                Some(Token::Add) => BinaryOp::Add,
                Some(Token::Sub) => BinaryOp::Sub,
                _ => return Ok(left),
            };
            self.next_token()?;
            let right = self.parse_multiplicative()?;
            left = binary(op, left, right);
        }
    }

    fn parse_multiplicative(&mut self) -> Result<Expression, ParseError> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek_token()? {
                Some(Token::Mul) => BinaryOp::Mul,
                Some(Token::Div) => BinaryOp::Div,
                Some(Token::Mod) => BinaryOp::Mod,
                _ => return Ok(left),
            };
            self.next_token()?;
            let right = self.parse_unary()?;
            left = binary(op, left, right);
        }
    }

    fn parse_unary(&mut self) -> Result<Expression, ParseError> {
        let op = match self.peek_token()? {
            Some(Token::Minus) => UnaryOp::Negate,
            Some(Token::Not) => UnaryOp::Not,
            _ => return self.parse_primary(),
        };
        let start = self.next_token()?.span;

        self.enter(start)?;
        let operand = self.parse_unary()?;
        self.depth -= 1;

        let span = start.merge(operand.span());
        Ok(Expression::Unary {
            op,
            operand: Box::new(operand),
            span,
        })
    }

    fn parse_primary(&mut self) -> Result<Expression, ParseError> {
        let tok = self.next_token()?;
        let literal = match tok.token {
            Token::LParen => {
                self.enter(tok.span)?;
                let inner = self.parse_expression()?;
                self.depth -= 1;
                self.expect_token(Token::RParen)?;
                return Ok(inner);
            }
            Token::Ident(name) => return self.parse_member_or_call(Spanned::new(name, tok.span)),
            Token::Null => Literal::Null,
            Token::True => Literal::Bool(true),
            Token::False => Literal::Bool(false),
            Token::Int(i) => Literal::Int(i),
            Token::Long(i) => Literal::Long(i),
            Token::Double(d) => Literal::Double(d),
            Token::Decimal(d) => Literal::Decimal(d),
            Token::String(s) => Literal::String(s),
            Token::DateTime(s) => Literal::DateTime(s),
            Token::DateTimeOffset(s) => Literal::DateTimeOffset(s),
            Token::Guid(s) => Literal::Guid(s),
            Token::Binary(s) => Literal::Binary(s),
            other => {
                return Err(ParseError::new(
                    format!("expected expression, found {}", other.describe()),
                    tok.span,
                ))
            }
        };
        Ok(Expression::Literal(Spanned::new(literal, tok.span)))
    }

    /// After an identifier: a function call, or a member path.
    fn parse_member_or_call(&mut self, first: Spanned<String>) -> Result<Expression, ParseError> {
        if let Some(Token::LParen) = self.peek_token()? {
            self.next_token()?;
            self.enter(first.span)?;
            let mut args = Vec::new();
            if self.peek_token()? != Some(Token::RParen) {
                loop {
                    args.push(self.parse_expression()?);
                    match self.peek_token()? {
                        Some(Token::Comma) => {
                            self.next_token()?;
                        }
                        _ => break,
                    }
                }
            }
            self.depth -= 1;
            let end = self.expect_token(Token::RParen)?;
            let span = first.span.merge(end.span);
            return Ok(Expression::Call {
                name: first,
                args,
                span,
            });
        }

        let mut span = first.span;
        let mut segments = vec![first.value];
        while let Some(Token::Slash) = self.peek_token()? {
            self.next_token()?;
            let segment = self.expect_ident()?;
            span = span.merge(segment.span);
            segments.push(segment.value);
        }
        Ok(Expression::Path(Spanned::new(segments, span)))
    }

    fn enter(&mut self, span: Span) -> Result<(), ParseError> {
        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(ParseError::new(
                format!("expression nested deeper than {} levels", self.max_depth),
                span,
            ));
        }
        Ok(())
    }

    fn expect_end(&mut self) -> Result<(), ParseError> {
        match self.lexer.next_token() {
            None => Ok(()),
            Some(Err(e)) => Err(e),
            Some(Ok(tok)) => Err(ParseError::new(
                format!("unexpected {} after expression", tok.token.describe()),
                tok.span,
            )
            .with_hint("combine conditions with 'and' or 'or'")),
        }
    }

    fn expect_ident(&mut self) -> Result<Spanned<String>, ParseError> {
        let tok = self.next_token()?;
        match tok.token {
            Token::Ident(name) => Ok(Spanned::new(name, tok.span)),
            other => Err(ParseError::new(
                format!("expected property name, found {}", other.describe()),
                tok.span,
            )),
        }
    }

    fn expect_token(&mut self, expected: Token) -> Result<SpannedToken, ParseError> {
        let tok = self.next_token()?;
        if std::mem::discriminant(&tok.token) == std::mem::discriminant(&expected) {
            Ok(tok)
        } else {
            Err(ParseError::new(
                format!("expected {:?}, found {}", expected, tok.token.describe()),
                tok.span,
            ))
        }
    }

    fn peek_token(&mut self) -> Result<Option<Token>, ParseError> {
        match self.lexer.peek() {
            None => Ok(None),
            Some(Ok(tok)) => Ok(Some(tok.token.clone())),
            Some(Err(e)) => Err(e.clone()),
        }
    }

    fn next_token(&mut self) -> Result<SpannedToken, ParseError> {
        match self.lexer.next_token() {
            Some(result) => result,
            None => Err(ParseError::new(
                "unexpected end of input",
                Span::new(self.source.len(), self.source.len()),
            )),
        }
    }
}

fn binary(op: BinaryOp, left: Expression, right: Expression) -> Expression {
    let span = left.span().merge(right.span());
    Expression::Binary {
        op,
        left: Box::new(left),
        right: Box::new(right),
        span,
    }
}

/// Parse `$filter` text.
pub fn parse_filter(source: &str) -> Result<Expression, ParseError> {
    Parser::new(source).parse_filter()
}

/// Parse `$orderby` text.
pub fn parse_orderby(source: &str) -> Result<Vec<OrderByItem>, ParseError> {
    Parser::new(source).parse_orderby()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn path(segments: &[&str]) -> Vec<String> {
        segments.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_comparison() {
        let expr = parse_filter("orders/total gt 100").unwrap();
        match expr {
            Expression::Binary {
                op: BinaryOp::Gt,
                left,
                right,
                ..
            } => {
                match *left {
                    Expression::Path(p) => assert_eq!(p.value, path(&["orders", "total"])),
                    other => panic!("expected path, got {:?}", other),
                }
                match *right {
                    Expression::Literal(l) => assert_eq!(l.value, Literal::Int(100)),
                    other => panic!("expected literal, got {:?}", other),
                }
            }
            other => panic!("expected comparison, got {:?}", other),
        }
    }

    #[test]
    fn test_and_binds_tighter_than_or() {
        let expr = parse_filter("a eq 1 or b eq 2 and c eq 3").unwrap();
        match expr {
            Expression::Binary {
                op: BinaryOp::Or,
                right,
                ..
            } => assert!(matches!(*right, Expression::Binary { op: BinaryOp::And, .. })),
            other => panic!("expected or, got {:?}", other),
        }
    }

    #[test]
    fn test_arithmetic_precedence() {
        let expr = parse_filter("price add tax mul 2 gt 10").unwrap();
        let Expression::Binary { op, left, .. } = expr else {
            panic!("expected binary");
        };
        assert_eq!(op, BinaryOp::Gt);
        let Expression::Binary { op, right, .. } = *left else {
            panic!("expected binary");
        };
        assert_eq!(op, BinaryOp::Add);
        assert!(matches!(*right, Expression::Binary { op: BinaryOp::Mul, .. }));
    }

    #[test]
    fn test_parentheses_override_precedence() {
        let expr = parse_filter("(a eq 1 or b eq 2) and c eq 3").unwrap();
        match expr {
            Expression::Binary {
                op: BinaryOp::And,
                left,
                ..
            } => assert!(matches!(*left, Expression::Binary { op: BinaryOp::Or, .. })),
            other => panic!("expected and, got {:?}", other),
        }
    }

    #[test]
    fn test_function_call() {
        let expr = parse_filter("substringof('on', name) eq true").unwrap();
        let Expression::Binary { left, .. } = expr else {
            panic!("expected binary");
        };
        match *left {
            Expression::Call { name, args, .. } => {
                assert_eq!(name.value, "substringof");
                assert_eq!(args.len(), 2);
                assert!(matches!(&args[1], Expression::Path(p) if p.value == path(&["name"])));
            }
            other => panic!("expected call, got {:?}", other),
        }
    }

    #[test]
    fn test_not_and_negate() {
        let expr = parse_filter("not startswith(name,'A') and price gt -5").unwrap();
        let Expression::Binary { left, right, .. } = expr else {
            panic!("expected binary");
        };
        assert!(matches!(*left, Expression::Unary { op: UnaryOp::Not, .. }));
        let Expression::Binary { right, .. } = *right else {
            panic!("expected comparison");
        };
        assert!(matches!(*right, Expression::Unary { op: UnaryOp::Negate, .. }));
    }

    #[test]
    fn test_typed_literals() {
        let expr = parse_filter("created ge datetime'2024-01-01T00:00:00'").unwrap();
        let Expression::Binary { right, .. } = expr else {
            panic!("expected binary");
        };
        assert_eq!(
            *right,
            Expression::Literal(Spanned::new(
                Literal::DateTime("2024-01-01T00:00:00".to_string()),
                Span::new(11, 40)
            ))
        );
    }

    #[test]
    fn test_orderby() {
        let items = parse_orderby("orders/total desc, name").unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].direction, SortDirection::Desc);
        assert_eq!(items[1].direction, SortDirection::Asc);
        assert!(matches!(&items[1].expr, Expression::Path(p) if p.value == path(&["name"])));
    }

    #[test]
    fn test_orderby_function_key() {
        let items = parse_orderby("length(name) asc").unwrap();
        assert!(matches!(&items[0].expr, Expression::Call { .. }));
    }

    #[test]
    fn test_trailing_input_rejected() {
        let err = parse_filter("name eq 'a' 'b'").unwrap_err();
        assert!(err.message.contains("after expression"));
        assert_eq!(err.span, Span::new(12, 15));
    }

    #[test]
    fn test_unexpected_end() {
        let err = parse_filter("name eq").unwrap_err();
        assert_eq!(err.message, "unexpected end of input");
        assert_eq!(err.span, Span::new(7, 7));
    }

    #[test]
    fn test_depth_limit() {
        let source = format!("{}a eq 1{}", "(".repeat(10), ")".repeat(10));
        assert!(Parser::new(&source).with_max_depth(10).parse_filter().is_ok());
        let err = Parser::new(&source).with_max_depth(9).parse_filter().unwrap_err();
        assert!(err.message.contains("deeper than 9"));
    }

    #[test]
    fn test_deep_not_chain_is_an_error() {
        let source = format!("{}a", "not ".repeat(1000));
        assert!(parse_filter(&source).is_err());
    }

    #[test]
    fn test_error_formatting() {
        let source = "status = 'open'";
        let err = parse_filter(source).unwrap_err();
        let formatted = err.format_with_source(source);
        assert!(formatted.contains("line 1:8"));
    }
}
