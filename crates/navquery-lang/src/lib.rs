//! navquery filter language
//!
//! This crate turns OData-style `$filter` and `$orderby` text into the typed
//! expression trees of [`navquery_proto`].
//!
//! # Syntax
//!
//! ```text
//! orders/total gt 100 and status eq 'open'
//! startswith(name, 'Al') or substringof('on', name)
//! not (price mul 2 le 10.5M)
//! created ge datetime'2024-01-01T00:00:00' and id ne guid'01234567-89ab-cdef-0123-456789abcdef'
//! customer eq null
//! ```
//!
//! `$orderby` is a comma-separated list of expressions, each optionally
//! followed by `asc` or `desc`.
//!
//! # Usage
//!
//! ```rust
//! use navquery_lang::{parse_filter, parse_orderby};
//!
//! let ast = parse_filter("orders/total gt 100 and status eq 'open'").unwrap();
//! let keys = parse_orderby("name desc, orders/total").unwrap();
//! assert_eq!(keys.len(), 2);
//! # let _ = ast;
//! ```
//!
//! Typing needs a [`MetadataResolver`] for the root entity type:
//!
//! ```ignore
//! let filter = navquery_lang::parse_and_compile_filter(
//!     "orders/total gt 100",
//!     &catalog,
//!     "Customer",
//! )?;
//! ```

pub mod ast;
pub mod compiler;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod span;

pub use ast::{BinaryOp, Expression, Literal, OrderByItem};
pub use compiler::Compiler;
pub use error::{CompileError, CompileErrorKind, LangError, ParseError};
pub use parser::{Parser, DEFAULT_MAX_DEPTH};
pub use span::{Span, Spanned};

use navquery_proto::{Expr, MetadataResolver, OrderKey};

/// Parse `$filter` text into an untyped tree.
///
/// # Example
///
/// ```rust
/// use navquery_lang::parse_filter;
///
/// assert!(parse_filter("name eq 'Alice'").is_ok());
/// assert!(parse_filter("name == 'Alice'").is_err());
/// ```
pub fn parse_filter(source: &str) -> Result<Expression, ParseError> {
    parser::parse_filter(source)
}

/// Parse `$orderby` text into untyped order items.
pub fn parse_orderby(source: &str) -> Result<Vec<OrderByItem>, ParseError> {
    parser::parse_orderby(source)
}

/// Type an untyped `$filter` tree against the entity model.
pub fn compile_filter(
    expr: Expression,
    resolver: &dyn MetadataResolver,
    entity: &str,
) -> Result<Expr, CompileError> {
    compiler::compile_filter(expr, resolver, entity)
}

/// Type untyped `$orderby` items against the entity model.
pub fn compile_orderby(
    items: Vec<OrderByItem>,
    resolver: &dyn MetadataResolver,
    entity: &str,
) -> Result<Vec<OrderKey>, CompileError> {
    compiler::compile_orderby(items, resolver, entity)
}

/// Parse and type `$filter` text in one step.
pub fn parse_and_compile_filter(
    source: &str,
    resolver: &dyn MetadataResolver,
    entity: &str,
) -> Result<Expr, LangError> {
    let ast = parse_filter(source)?;
    Ok(compile_filter(ast, resolver, entity)?)
}

/// Parse and type `$orderby` text in one step.
pub fn parse_and_compile_orderby(
    source: &str,
    resolver: &dyn MetadataResolver,
    entity: &str,
) -> Result<Vec<OrderKey>, LangError> {
    let items = parse_orderby(source)?;
    Ok(compile_orderby(items, resolver, entity)?)
}

/// Tokenize a source string (for debugging/testing).
///
/// # Example
///
/// ```rust
/// use navquery_lang::tokenize;
///
/// let tokens = tokenize("orders/total gt 100").unwrap();
/// assert_eq!(tokens.len(), 5);
/// ```
pub fn tokenize(source: &str) -> Result<Vec<lexer::SpannedToken>, ParseError> {
    lexer::tokenize(source)
}
