//! Untyped syntax tree produced by the parser.

use crate::span::{Span, Spanned};

/// A parsed expression, before property paths and functions are resolved.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// `left op right`.
    Binary {
        op: BinaryOp,
        left: Box<Expression>,
        right: Box<Expression>,
        span: Span,
    },
    /// `-operand` or `not operand`.
    Unary {
        op: UnaryOp,
        operand: Box<Expression>,
        span: Span,
    },
    /// A member path such as `orders/total`.
    Path(Spanned<Vec<String>>),
    /// `name(args...)`.
    Call {
        name: Spanned<String>,
        args: Vec<Expression>,
        span: Span,
    },
    /// A literal.
    Literal(Spanned<Literal>),
}

impl Expression {
    pub fn span(&self) -> Span {
        match self {
            Expression::Binary { span, .. }
            | Expression::Unary { span, .. }
            | Expression::Call { span, .. } => *span,
            Expression::Path(p) => p.span,
            Expression::Literal(l) => l.span,
        }
    }
}

/// Binary operators, in filter-text spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Or,
    And,
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Negate,
    Not,
}

/// Literal values as written.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Null,
    Bool(bool),
    Int(i64),
    Long(i64),
    Double(f64),
    Decimal(String),
    String(String),
    DateTime(String),
    DateTimeOffset(String),
    Guid(String),
    Binary(String),
}

/// Sort direction of an `$orderby` item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// One `$orderby` item.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderByItem {
    pub expr: Expression,
    pub direction: SortDirection,
    pub span: Span,
}
