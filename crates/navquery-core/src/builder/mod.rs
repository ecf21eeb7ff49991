//! The query-builder boundary.
//!
//! A compiled [`QueryPlan`](crate::query::QueryPlan) is backend-agnostic.
//! Applying it drives an implementation of [`QueryBuilder`], which owns the
//! concrete representation of expressions, predicates and the statement
//! under construction.

mod criteria;

pub use criteria::{CriteriaBuilder, JoinClause, SelectList, SelectStatement, SortClause};

use navquery_proto::{ArithmeticOp, FunctionId, RelationalOp, SortDirection, Value};

/// What a statement returns.
#[derive(Debug, Clone, PartialEq)]
pub enum Selection<E> {
    /// Every column of the root entity.
    All,
    /// The listed value expressions.
    Columns(Vec<E>),
    /// The root entity together with the entities reached by the listed
    /// join aliases.
    Entities(Vec<String>),
}

/// Receives the translated query, one call at a time.
pub trait QueryBuilder {
    /// A value expression.
    type Expr;
    /// A boolean expression.
    type Predicate;

    // Joins and parameters

    /// Join `property` of the entity under `parent_alias` (or the root) as
    /// `alias`.
    fn add_join(&mut self, parent_alias: Option<&str>, property: &str, alias: &str);

    fn bind_parameter(&mut self, name: &str, value: &Value);

    // Value expressions

    fn column(&mut self, alias: Option<&str>, name: &str) -> Self::Expr;

    fn parameter(&mut self, name: &str) -> Self::Expr;

    fn constant(&mut self, value: i64) -> Self::Expr;

    fn function(&mut self, function: FunctionId, args: Vec<Self::Expr>) -> Self::Expr;

    fn arithmetic(&mut self, op: ArithmeticOp, left: Self::Expr, right: Self::Expr) -> Self::Expr;

    fn negate(&mut self, operand: Self::Expr) -> Self::Expr;

    // Predicates

    fn literal(&mut self, value: bool) -> Self::Predicate;

    fn and(&mut self, left: Self::Predicate, right: Self::Predicate) -> Self::Predicate;

    fn or(&mut self, left: Self::Predicate, right: Self::Predicate) -> Self::Predicate;

    fn not(&mut self, operand: Self::Predicate) -> Self::Predicate;

    fn compare(&mut self, op: RelationalOp, left: Self::Expr, right: Self::Expr)
        -> Self::Predicate;

    /// `value LIKE pattern`; the pattern already carries its wildcards.
    fn like(&mut self, value: Self::Expr, pattern: Self::Expr) -> Self::Predicate;

    fn is_null(&mut self, operand: Self::Expr) -> Self::Predicate;

    fn is_not_null(&mut self, operand: Self::Expr) -> Self::Predicate;

    // Statement

    fn where_clause(&mut self, predicate: Self::Predicate);

    fn order_by(&mut self, expr: Self::Expr, direction: SortDirection);

    fn set_first_result(&mut self, first: u64);

    fn set_max_results(&mut self, max: u64);

    fn select(&mut self, selection: Selection<Self::Expr>);
}
