//! A recording query builder.
//!
//! [`CriteriaBuilder`] keeps the intermediate representation as its
//! expression types and records every statement-level call in a
//! [`SelectStatement`]. The CLI renders that statement; tests use it to
//! check the order in which a plan drives a builder.

use navquery_proto::{ArithmeticOp, FunctionId, RelationalOp, SortDirection, Value};
use serde::Serialize;
use std::fmt;

use super::{QueryBuilder, Selection};
use crate::query::{ParameterMap, Predicate, Scalar};

/// A join as recorded by the builder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JoinClause {
    pub parent_alias: Option<String>,
    pub property: String,
    pub alias: String,
}

/// A sort key as recorded by the builder.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SortClause {
    pub expr: Scalar,
    pub direction: SortDirection,
}

/// What a statement selects.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "kind", content = "items", rename_all = "snake_case")]
pub enum SelectList {
    #[default]
    All,
    Columns(Vec<Scalar>),
    Entities(Vec<String>),
}

/// The statement assembled by a [`CriteriaBuilder`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SelectStatement {
    pub root_entity: String,
    pub root_alias: Option<String>,
    pub joins: Vec<JoinClause>,
    pub parameters: ParameterMap,
    #[serde(rename = "where", skip_serializing_if = "Option::is_none")]
    pub where_clause: Option<Predicate>,
    pub order_by: Vec<SortClause>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_result: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_results: Option<u64>,
    pub projection: SelectList,
}

impl fmt::Display for SelectStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let root = match &self.root_alias {
            Some(alias) => format!("{} {}", self.root_entity, alias),
            None => self.root_entity.clone(),
        };
        match &self.projection {
            SelectList::All => write!(f, "select {}", root)?,
            SelectList::Columns(columns) => {
                let list: Vec<String> = columns.iter().map(Scalar::to_string).collect();
                write!(f, "select {} from {}", list.join(", "), root)?;
            }
            SelectList::Entities(aliases) => {
                write!(f, "select {}", root)?;
                for alias in aliases {
                    write!(f, " fetch {}", alias)?;
                }
            }
        }
        for join in &self.joins {
            match &join.parent_alias {
                Some(parent) => write!(f, " join {}.{} {}", parent, join.property, join.alias)?,
                None => write!(f, " join {} {}", join.property, join.alias)?,
            }
        }
        if let Some(predicate) = &self.where_clause {
            write!(f, " where {}", predicate)?;
        }
        if !self.order_by.is_empty() {
            let keys: Vec<String> = self
                .order_by
                .iter()
                .map(|k| match k.direction {
                    SortDirection::Asc => format!("{} asc", k.expr),
                    SortDirection::Desc => format!("{} desc", k.expr),
                })
                .collect();
            write!(f, " order by {}", keys.join(", "))?;
        }
        if let Some(first) = self.first_result {
            write!(f, " offset {}", first)?;
        }
        if let Some(max) = self.max_results {
            write!(f, " limit {}", max)?;
        }
        Ok(())
    }
}

/// Records calls into a [`SelectStatement`].
#[derive(Debug, Default)]
pub struct CriteriaBuilder {
    statement: SelectStatement,
    calls: Vec<&'static str>,
}

impl CriteriaBuilder {
    pub fn new(root_entity: impl Into<String>, root_alias: Option<String>) -> Self {
        Self {
            statement: SelectStatement {
                root_entity: root_entity.into(),
                root_alias,
                ..SelectStatement::default()
            },
            calls: Vec::new(),
        }
    }

    /// Statement-level calls received so far, in order.
    pub fn calls(&self) -> &[&'static str] {
        &self.calls
    }

    pub fn statement(&self) -> &SelectStatement {
        &self.statement
    }

    pub fn into_statement(self) -> SelectStatement {
        self.statement
    }

    fn record(&mut self, call: &'static str) {
        if self.calls.last() != Some(&call) {
            self.calls.push(call);
        }
    }
}

impl QueryBuilder for CriteriaBuilder {
    type Expr = Scalar;
    type Predicate = Predicate;

    fn add_join(&mut self, parent_alias: Option<&str>, property: &str, alias: &str) {
        self.record("add_join");
        self.statement.joins.push(JoinClause {
            parent_alias: parent_alias.map(str::to_string),
            property: property.to_string(),
            alias: alias.to_string(),
        });
    }

    fn bind_parameter(&mut self, name: &str, value: &Value) {
        self.record("bind_parameter");
        self.statement.parameters.insert(name.to_string(), value.clone());
    }

    fn column(&mut self, alias: Option<&str>, name: &str) -> Scalar {
        Scalar::column(alias, name)
    }

    fn parameter(&mut self, name: &str) -> Scalar {
        Scalar::parameter(name)
    }

    fn constant(&mut self, value: i64) -> Scalar {
        Scalar::Constant { value }
    }

    fn function(&mut self, function: FunctionId, args: Vec<Scalar>) -> Scalar {
        Scalar::function(function, args)
    }

    fn arithmetic(&mut self, op: ArithmeticOp, left: Scalar, right: Scalar) -> Scalar {
        Scalar::arithmetic(op, left, right)
    }

    fn negate(&mut self, operand: Scalar) -> Scalar {
        Scalar::negate(operand)
    }

    fn literal(&mut self, value: bool) -> Predicate {
        Predicate::Const { value }
    }

    fn and(&mut self, left: Predicate, right: Predicate) -> Predicate {
        Predicate::and(left, right)
    }

    fn or(&mut self, left: Predicate, right: Predicate) -> Predicate {
        Predicate::or(left, right)
    }

    fn not(&mut self, operand: Predicate) -> Predicate {
        Predicate::not(operand)
    }

    fn compare(&mut self, op: RelationalOp, left: Scalar, right: Scalar) -> Predicate {
        Predicate::compare(op, left, right)
    }

    fn like(&mut self, value: Scalar, pattern: Scalar) -> Predicate {
        Predicate::Like { value, pattern }
    }

    fn is_null(&mut self, operand: Scalar) -> Predicate {
        Predicate::IsNull { operand }
    }

    fn is_not_null(&mut self, operand: Scalar) -> Predicate {
        Predicate::IsNotNull { operand }
    }

    fn where_clause(&mut self, predicate: Predicate) {
        self.record("where_clause");
        self.statement.where_clause = Some(predicate);
    }

    fn order_by(&mut self, expr: Scalar, direction: SortDirection) {
        self.record("order_by");
        self.statement.order_by.push(SortClause { expr, direction });
    }

    fn set_first_result(&mut self, first: u64) {
        self.record("set_first_result");
        self.statement.first_result = Some(first);
    }

    fn set_max_results(&mut self, max: u64) {
        self.record("set_max_results");
        self.statement.max_results = Some(max);
    }

    fn select(&mut self, selection: Selection<Scalar>) {
        self.record("select");
        self.statement.projection = match selection {
            Selection::All => SelectList::All,
            Selection::Columns(columns) => SelectList::Columns(columns),
            Selection::Entities(aliases) => SelectList::Entities(aliases),
        };
    }
}
