//! Backend-agnostic predicate and scalar trees.
//!
//! Both render in a functional notation for diagnostics:
//! `and(gt(orders_alias.total, :p0), eq(status, :p1))`.

use navquery_proto::{ArithmeticOp, FunctionId, RelationalOp, SortDirection};
use serde::Serialize;
use std::fmt;

use crate::builder::QueryBuilder;

/// A value-producing fragment.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Scalar {
    /// A column, qualified by a join alias unless it belongs to an
    /// unaliased root.
    Column { alias: Option<String>, name: String },
    /// A bound parameter placeholder.
    Parameter { name: String },
    /// An integer produced by a rewrite, never by user input.
    Constant { value: i64 },
    /// A scalar function call.
    Function {
        function: FunctionId,
        args: Vec<Scalar>,
    },
    /// `left op right`.
    Arithmetic {
        op: ArithmeticOp,
        left: Box<Scalar>,
        right: Box<Scalar>,
    },
    /// Arithmetic negation.
    Negate { operand: Box<Scalar> },
}

/// A boolean fragment.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Predicate {
    /// A constant truth value.
    Const { value: bool },
    And {
        left: Box<Predicate>,
        right: Box<Predicate>,
    },
    Or {
        left: Box<Predicate>,
        right: Box<Predicate>,
    },
    Not { operand: Box<Predicate> },
    Compare {
        op: RelationalOp,
        left: Scalar,
        right: Scalar,
    },
    /// Pattern match; the pattern carries its own wildcards.
    Like { value: Scalar, pattern: Scalar },
    IsNull { operand: Scalar },
    IsNotNull { operand: Scalar },
}

impl Scalar {
    pub fn column(alias: Option<&str>, name: impl Into<String>) -> Self {
        Scalar::Column {
            alias: alias.map(str::to_string),
            name: name.into(),
        }
    }

    pub fn parameter(name: impl Into<String>) -> Self {
        Scalar::Parameter { name: name.into() }
    }

    pub fn function(function: FunctionId, args: Vec<Scalar>) -> Self {
        Scalar::Function { function, args }
    }

    pub fn arithmetic(op: ArithmeticOp, left: Scalar, right: Scalar) -> Self {
        Scalar::Arithmetic {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn negate(operand: Scalar) -> Self {
        Scalar::Negate {
            operand: Box::new(operand),
        }
    }

    /// Collect the names of all parameters referenced by this fragment.
    pub fn parameters<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Scalar::Parameter { name } => out.push(name),
            Scalar::Column { .. } | Scalar::Constant { .. } => {}
            Scalar::Function { args, .. } => args.iter().for_each(|a| a.parameters(out)),
            Scalar::Arithmetic { left, right, .. } => {
                left.parameters(out);
                right.parameters(out);
            }
            Scalar::Negate { operand } => operand.parameters(out),
        }
    }

    /// Emit this fragment through a query builder.
    pub fn build<B: QueryBuilder>(&self, builder: &mut B) -> B::Expr {
        match self {
            Scalar::Column { alias, name } => builder.column(alias.as_deref(), name),
            Scalar::Parameter { name } => builder.parameter(name),
            Scalar::Constant { value } => builder.constant(*value),
            Scalar::Function { function, args } => {
                let args = args.iter().map(|a| a.build(builder)).collect();
                builder.function(*function, args)
            }
            Scalar::Arithmetic { op, left, right } => {
                let left = left.build(builder);
                let right = right.build(builder);
                builder.arithmetic(*op, left, right)
            }
            Scalar::Negate { operand } => {
                let operand = operand.build(builder);
                builder.negate(operand)
            }
        }
    }
}

impl Predicate {
    pub fn and(left: Predicate, right: Predicate) -> Self {
        Predicate::And {
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn or(left: Predicate, right: Predicate) -> Self {
        Predicate::Or {
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn not(operand: Predicate) -> Self {
        Predicate::Not {
            operand: Box::new(operand),
        }
    }

    pub fn compare(op: RelationalOp, left: Scalar, right: Scalar) -> Self {
        Predicate::Compare { op, left, right }
    }

    /// Collect the names of all parameters referenced by this predicate.
    pub fn parameters<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Predicate::Const { .. } => {}
            Predicate::And { left, right } | Predicate::Or { left, right } => {
                left.parameters(out);
                right.parameters(out);
            }
            Predicate::Not { operand } => operand.parameters(out),
            Predicate::Compare { left, right, .. } => {
                left.parameters(out);
                right.parameters(out);
            }
            Predicate::Like { value, pattern } => {
                value.parameters(out);
                pattern.parameters(out);
            }
            Predicate::IsNull { operand } | Predicate::IsNotNull { operand } => {
                operand.parameters(out)
            }
        }
    }

    /// Emit this predicate through a query builder.
    pub fn build<B: QueryBuilder>(&self, builder: &mut B) -> B::Predicate {
        match self {
            Predicate::Const { value } => builder.literal(*value),
            Predicate::And { left, right } => {
                let left = left.build(builder);
                let right = right.build(builder);
                builder.and(left, right)
            }
            Predicate::Or { left, right } => {
                let left = left.build(builder);
                let right = right.build(builder);
                builder.or(left, right)
            }
            Predicate::Not { operand } => {
                let operand = operand.build(builder);
                builder.not(operand)
            }
            Predicate::Compare { op, left, right } => {
                let left = left.build(builder);
                let right = right.build(builder);
                builder.compare(*op, left, right)
            }
            Predicate::Like { value, pattern } => {
                let value = value.build(builder);
                let pattern = pattern.build(builder);
                builder.like(value, pattern)
            }
            Predicate::IsNull { operand } => {
                let operand = operand.build(builder);
                builder.is_null(operand)
            }
            Predicate::IsNotNull { operand } => {
                let operand = operand.build(builder);
                builder.is_not_null(operand)
            }
        }
    }
}

/// A compiled `$orderby` key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SortKey {
    pub scalar: Scalar,
    pub direction: SortDirection,
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Column {
                alias: Some(alias),
                name,
            } => write!(f, "{}.{}", alias, name),
            Scalar::Column { alias: None, name } => f.write_str(name),
            Scalar::Parameter { name } => write!(f, ":{}", name),
            Scalar::Constant { value } => write!(f, "{}", value),
            Scalar::Function { function, args } => {
                write!(f, "{}(", function)?;
                write_list(f, args)?;
                write!(f, ")")
            }
            Scalar::Arithmetic { op, left, right } => write!(f, "{}({}, {})", op, left, right),
            Scalar::Negate { operand } => write!(f, "negate({})", operand),
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Const { value } => write!(f, "{}", value),
            Predicate::And { left, right } => write!(f, "and({}, {})", left, right),
            Predicate::Or { left, right } => write!(f, "or({}, {})", left, right),
            Predicate::Not { operand } => write!(f, "not({})", operand),
            Predicate::Compare { op, left, right } => write!(f, "{}({}, {})", op, left, right),
            Predicate::Like { value, pattern } => write!(f, "like({}, {})", value, pattern),
            Predicate::IsNull { operand } => write!(f, "isNull({})", operand),
            Predicate::IsNotNull { operand } => write!(f, "isNotNull({})", operand),
        }
    }
}

fn write_list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}
