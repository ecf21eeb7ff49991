//! Typed expression trees.
//!
//! An [`Expr`] is what the grammar hands to the compiler: operators are
//! resolved, property paths are split into segments and typed against the
//! entity model, and function names are resolved to [`FunctionId`]s.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::function::FunctionId;
use crate::types::EdmType;
use crate::value::Value;

/// Logical connectives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogicalOp {
    And,
    Or,
}

/// Arithmetic operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArithmeticOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

/// Relational operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelationalOp {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOp {
    /// Arithmetic negation (`-x`).
    Negate,
    /// Logical negation (`not x`).
    Not,
}

impl LogicalOp {
    /// Keyword in filter text.
    pub fn keyword(&self) -> &'static str {
        match self {
            LogicalOp::And => "and",
            LogicalOp::Or => "or",
        }
    }
}

impl ArithmeticOp {
    /// Keyword in filter text.
    pub fn keyword(&self) -> &'static str {
        match self {
            ArithmeticOp::Add => "add",
            ArithmeticOp::Sub => "sub",
            ArithmeticOp::Mul => "mul",
            ArithmeticOp::Div => "div",
            ArithmeticOp::Mod => "mod",
        }
    }
}

impl RelationalOp {
    /// Keyword in filter text.
    pub fn keyword(&self) -> &'static str {
        match self {
            RelationalOp::Eq => "eq",
            RelationalOp::Ne => "ne",
            RelationalOp::Gt => "gt",
            RelationalOp::Ge => "ge",
            RelationalOp::Lt => "lt",
            RelationalOp::Le => "le",
        }
    }

    /// `eq` and `ne`.
    pub fn is_equality(&self) -> bool {
        matches!(self, RelationalOp::Eq | RelationalOp::Ne)
    }
}

impl fmt::Display for LogicalOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

impl fmt::Display for ArithmeticOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

impl fmt::Display for RelationalOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnaryOp::Negate => f.write_str("-"),
            UnaryOp::Not => f.write_str("not"),
        }
    }
}

/// A node of the typed expression tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum Expr {
    /// `left and right`, `left or right`.
    Logical {
        op: LogicalOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// `left add right`, ...
    Arithmetic {
        op: ArithmeticOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// `left eq right`, ...
    Relational {
        op: RelationalOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// `-operand`, `not operand`.
    Unary { op: UnaryOp, operand: Box<Expr> },
    /// A property path such as `orders/total`, typed by its final segment.
    PropertyAccess { path: Vec<String>, ty: EdmType },
    /// A function call with its arguments.
    FunctionCall { function: FunctionId, args: Vec<Expr> },
    /// A literal with its declared type.
    Constant { value: Value, ty: EdmType },
}

impl Expr {
    /// Build a property access from a slash-separated path.
    pub fn property(path: &str, ty: EdmType) -> Self {
        Expr::PropertyAccess {
            path: path.split('/').map(str::to_string).collect(),
            ty,
        }
    }

    /// Build a constant typed by its value.
    pub fn constant(value: impl Into<Value>) -> Self {
        let value = value.into();
        let ty = value.edm_type();
        Expr::Constant { value, ty }
    }

    /// Build a constant with an explicit declared type.
    pub fn typed_constant(value: impl Into<Value>, ty: EdmType) -> Self {
        Expr::Constant {
            value: value.into(),
            ty,
        }
    }

    /// The `null` literal.
    pub fn null() -> Self {
        Expr::Constant {
            value: Value::Null,
            ty: EdmType::Null,
        }
    }

    /// Build a function call.
    pub fn call(function: FunctionId, args: Vec<Expr>) -> Self {
        Expr::FunctionCall { function, args }
    }

    pub fn logical(op: LogicalOp, left: Expr, right: Expr) -> Self {
        Expr::Logical {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn arithmetic(op: ArithmeticOp, left: Expr, right: Expr) -> Self {
        Expr::Arithmetic {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn relational(op: RelationalOp, left: Expr, right: Expr) -> Self {
        Expr::Relational {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn unary(op: UnaryOp, operand: Expr) -> Self {
        Expr::Unary {
            op,
            operand: Box::new(operand),
        }
    }

    pub fn and(self, other: Expr) -> Self {
        Expr::logical(LogicalOp::And, self, other)
    }

    pub fn or(self, other: Expr) -> Self {
        Expr::logical(LogicalOp::Or, self, other)
    }

    pub fn not(self) -> Self {
        Expr::unary(UnaryOp::Not, self)
    }

    pub fn eq(self, other: Expr) -> Self {
        Expr::relational(RelationalOp::Eq, self, other)
    }

    pub fn ne(self, other: Expr) -> Self {
        Expr::relational(RelationalOp::Ne, self, other)
    }

    pub fn gt(self, other: Expr) -> Self {
        Expr::relational(RelationalOp::Gt, self, other)
    }

    pub fn ge(self, other: Expr) -> Self {
        Expr::relational(RelationalOp::Ge, self, other)
    }

    pub fn lt(self, other: Expr) -> Self {
        Expr::relational(RelationalOp::Lt, self, other)
    }

    pub fn le(self, other: Expr) -> Self {
        Expr::relational(RelationalOp::Le, self, other)
    }

    /// Static type of the node, when it can be read off the tree.
    pub fn ty(&self) -> EdmType {
        match self {
            Expr::Logical { .. } | Expr::Relational { .. } => EdmType::Boolean,
            Expr::Unary { op: UnaryOp::Not, .. } => EdmType::Boolean,
            Expr::Unary { operand, .. } => operand.ty(),
            Expr::Arithmetic { left, .. } => left.ty(),
            Expr::PropertyAccess { ty, .. } | Expr::Constant { ty, .. } => *ty,
            Expr::FunctionCall { function, args } => {
                function.return_type(args.first().map(Expr::ty))
            }
        }
    }

    /// Nesting depth of the tree (a leaf has depth 1).
    pub fn depth(&self) -> usize {
        match self {
            Expr::Logical { left, right, .. }
            | Expr::Arithmetic { left, right, .. }
            | Expr::Relational { left, right, .. } => 1 + left.depth().max(right.depth()),
            Expr::Unary { operand, .. } => 1 + operand.depth(),
            Expr::FunctionCall { args, .. } => {
                1 + args.iter().map(Expr::depth).max().unwrap_or(0)
            }
            Expr::PropertyAccess { .. } | Expr::Constant { .. } => 1,
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Logical { op, left, right } => write!(f, "({} {} {})", left, op, right),
            Expr::Arithmetic { op, left, right } => write!(f, "({} {} {})", left, op, right),
            Expr::Relational { op, left, right } => write!(f, "{} {} {}", left, op, right),
            Expr::Unary {
                op: UnaryOp::Negate,
                operand,
            } => write!(f, "-{}", operand),
            Expr::Unary {
                op: UnaryOp::Not,
                operand,
            } => write!(f, "not {}", operand),
            Expr::PropertyAccess { path, .. } => f.write_str(&path.join("/")),
            Expr::FunctionCall { function, args } => {
                write!(f, "{}(", function)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
            Expr::Constant {
                value: Value::String(s),
                ..
            } => write!(f, "'{}'", s.replace('\'', "''")),
            Expr::Constant { value, .. } => write!(f, "{}", value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_property_path_split() {
        let expr = Expr::property("orders/items/price", EdmType::Decimal);
        match expr {
            Expr::PropertyAccess { path, ty } => {
                assert_eq!(path, vec!["orders", "items", "price"]);
                assert_eq!(ty, EdmType::Decimal);
            }
            other => panic!("unexpected node {:?}", other),
        }
    }

    #[test]
    fn test_static_types() {
        let name = Expr::property("name", EdmType::String);
        let call = Expr::call(FunctionId::StartsWith, vec![name.clone(), Expr::constant("A")]);
        assert_eq!(call.ty(), EdmType::Boolean);
        assert_eq!(Expr::call(FunctionId::Length, vec![name.clone()]).ty(), EdmType::Int32);
        assert_eq!(name.clone().eq(Expr::null()).ty(), EdmType::Boolean);
    }

    #[test]
    fn test_depth() {
        let leaf = Expr::property("price", EdmType::Double);
        assert_eq!(leaf.depth(), 1);
        let expr = leaf.gt(Expr::constant(1i32)).and(Expr::constant(true));
        assert_eq!(expr.depth(), 3);
    }

    #[test]
    fn test_display() {
        let expr = Expr::property("orders/total", EdmType::Int32)
            .gt(Expr::constant(100i32))
            .and(Expr::property("status", EdmType::String).eq(Expr::constant("o'pen")));
        assert_eq!(expr.to_string(), "(orders/total gt 100 and status eq 'o''pen')");
    }

    #[test]
    fn test_json_roundtrip() {
        let expr = Expr::call(
            FunctionId::SubstringOf,
            vec![Expr::constant("on"), Expr::property("name", EdmType::String)],
        )
        .not();
        let json = serde_json::to_string(&expr).unwrap();
        let back: Expr = serde_json::from_str(&json).unwrap();
        assert_eq!(expr, back);
    }
}
