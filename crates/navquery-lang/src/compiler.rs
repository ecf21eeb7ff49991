//! Typing of parsed expressions against the entity model.
//!
//! The compiler walks the untyped tree once, resolving every property path
//! segment through a [`MetadataResolver`] and every function name to a
//! [`FunctionId`], and produces the typed [`Expr`] the query compiler consumes.

use crate::ast::{self, BinaryOp, Expression, Literal, OrderByItem};
use crate::error::CompileError;
use crate::span::Span;
use navquery_proto::{
    ArithmeticOp, EdmType, Expr, FunctionId, LogicalOp, MetadataResolver, OrderKey, RelationalOp,
    SortDirection, UnaryOp, Value,
};

/// Types parsed expressions rooted at one entity type.
pub struct Compiler<'a> {
    resolver: &'a dyn MetadataResolver,
    entity: &'a str,
}

impl<'a> Compiler<'a> {
    pub fn new(resolver: &'a dyn MetadataResolver, entity: &'a str) -> Self {
        Self { resolver, entity }
    }

    /// Type a `$filter` expression.
    pub fn compile_filter(&self, expr: Expression) -> Result<Expr, CompileError> {
        self.check_entity(expr.span())?;
        self.compile(expr)
    }

    /// Type an `$orderby` list.
    pub fn compile_orderby(&self, items: Vec<OrderByItem>) -> Result<Vec<OrderKey>, CompileError> {
        if let Some(first) = items.first() {
            self.check_entity(first.span)?;
        }
        items
            .into_iter()
            .map(|item| {
                let direction = match item.direction {
                    ast::SortDirection::Asc => SortDirection::Asc,
                    ast::SortDirection::Desc => SortDirection::Desc,
                };
                Ok(OrderKey {
                    expr: self.compile(item.expr)?,
                    direction,
                })
            })
            .collect()
    }

    fn check_entity(&self, span: Span) -> Result<(), CompileError> {
        if self.resolver.has_entity_type(self.entity) {
            Ok(())
        } else {
            Err(CompileError::unknown_entity(self.entity, span))
        }
    }

    fn compile(&self, expr: Expression) -> Result<Expr, CompileError> {
        match expr {
            Expression::Binary {
                op, left, right, ..
            } => {
                let left = self.compile(*left)?;
                let right = self.compile(*right)?;
                Ok(match op {
                    BinaryOp::Or => Expr::logical(LogicalOp::Or, left, right),
                    BinaryOp::And => Expr::logical(LogicalOp::And, left, right),
                    BinaryOp::Eq => Expr::relational(RelationalOp::Eq, left, right),
                    BinaryOp::Ne => Expr::relational(RelationalOp::Ne, left, right),
                    BinaryOp::Gt => Expr::relational(RelationalOp::Gt, left, right),
                    BinaryOp::Ge => Expr::relational(RelationalOp::Ge, left, right),
                    BinaryOp::Lt => Expr::relational(RelationalOp::Lt, left, right),
                    BinaryOp::Le => Expr::relational(RelationalOp::Le, left, right),
                    BinaryOp::Add => Expr::arithmetic(ArithmeticOp::Add, left, right),
                    BinaryOp::Sub => Expr::arithmetic(ArithmeticOp::Sub, left, right),
                    BinaryOp::Mul => Expr::arithmetic(ArithmeticOp::Mul, left, right),
                    BinaryOp::Div => Expr::arithmetic(ArithmeticOp::Div, left, right),
                    BinaryOp::Mod => Expr::arithmetic(ArithmeticOp::Mod, left, right),
                })
            }
            Expression::Unary {
                op: ast::UnaryOp::Negate,
                operand,
                span,
            } => match *operand {
                Expression::Literal(lit) => match negate_literal(lit.value) {
                    Some(negated) => self.compile_literal(negated, span),
                    None => Err(CompileError::invalid_literal(
                        "only numeric literals can be negated",
                        span,
                    )),
                },
                other => Ok(Expr::unary(UnaryOp::Negate, self.compile(other)?)),
            },
            Expression::Unary {
                op: ast::UnaryOp::Not,
                operand,
                ..
            } => Ok(Expr::unary(UnaryOp::Not, self.compile(*operand)?)),
            Expression::Path(path) => self.compile_path(path.value, path.span),
            Expression::Call { name, args, span } => {
                let function: FunctionId = name
                    .value
                    .parse()
                    .map_err(|_| CompileError::unknown_function(&name.value, name.span))?;
                let (min, max) = function.arity();
                if args.len() < min || args.len() > max {
                    return Err(CompileError::arity_mismatch(
                        function.name(),
                        (min, max),
                        args.len(),
                        span,
                    ));
                }
                let args = args
                    .into_iter()
                    .map(|arg| self.compile(arg))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Expr::call(function, args))
            }
            Expression::Literal(lit) => self.compile_literal(lit.value, lit.span),
        }
    }

    fn compile_path(&self, segments: Vec<String>, span: Span) -> Result<Expr, CompileError> {
        let Some((last, navigations)) = segments.split_last() else {
            return Err(CompileError::unknown_property(self.entity, "", span));
        };

        let mut entity = self.entity.to_string();
        for segment in navigations {
            if !self.resolver.is_navigation_property(&entity, segment) {
                return Err(CompileError::unknown_navigation(&entity, segment, span));
            }
            entity = self
                .resolver
                .target_entity_type(&entity, segment)
                .ok_or_else(|| CompileError::unknown_navigation(&entity, segment, span))?;
        }

        let ty = if self.resolver.is_scalar_property(&entity, last) {
            self.resolver
                .property_type(&entity, last)
                .ok_or_else(|| CompileError::unknown_property(&entity, last, span))?
        } else if self.resolver.is_navigation_property(&entity, last) {
            // Compared through its foreign key column.
            let column = self
                .resolver
                .foreign_key_column(&entity, last)
                .ok_or_else(|| CompileError::unknown_property(&entity, last, span))?;
            self.resolver
                .property_type(&entity, &column)
                .unwrap_or(EdmType::Int64)
        } else {
            return Err(CompileError::unknown_property(&entity, last, span));
        };

        Ok(Expr::PropertyAccess {
            path: segments,
            ty,
        })
    }

    fn compile_literal(&self, literal: Literal, span: Span) -> Result<Expr, CompileError> {
        Ok(match literal {
            Literal::Null => Expr::null(),
            Literal::Bool(b) => Expr::constant(b),
            Literal::Int(i) => match i32::try_from(i) {
                Ok(small) => Expr::constant(small),
                Err(_) => Expr::constant(i),
            },
            Literal::Long(i) => Expr::constant(i),
            Literal::Double(d) => {
                if !d.is_finite() {
                    return Err(CompileError::invalid_literal(
                        format!("numeric literal {} is out of range", d),
                        span,
                    ));
                }
                Expr::constant(d)
            }
            Literal::Decimal(d) => Expr::typed_constant(Value::Decimal(d), EdmType::Decimal),
            Literal::String(s) => Expr::constant(s),
            Literal::DateTime(s) => Expr::typed_constant(s, EdmType::DateTime),
            Literal::DateTimeOffset(s) => Expr::typed_constant(s, EdmType::DateTimeOffset),
            Literal::Guid(s) => Expr::typed_constant(s, EdmType::Guid),
            Literal::Binary(s) => Expr::typed_constant(s, EdmType::Binary),
        })
    }
}

fn negate_literal(literal: Literal) -> Option<Literal> {
    match literal {
        Literal::Int(i) => Some(Literal::Int(-i)),
        Literal::Long(i) => Some(Literal::Long(-i)),
        Literal::Double(d) => Some(Literal::Double(-d)),
        Literal::Decimal(d) => Some(Literal::Decimal(format!("-{}", d))),
        _ => None,
    }
}

/// Type a parsed `$filter` expression rooted at `entity`.
pub fn compile_filter(
    expr: Expression,
    resolver: &dyn MetadataResolver,
    entity: &str,
) -> Result<Expr, CompileError> {
    Compiler::new(resolver, entity).compile_filter(expr)
}

/// Type a parsed `$orderby` list rooted at `entity`.
pub fn compile_orderby(
    items: Vec<OrderByItem>,
    resolver: &dyn MetadataResolver,
    entity: &str,
) -> Result<Vec<OrderKey>, CompileError> {
    Compiler::new(resolver, entity).compile_orderby(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CompileErrorKind;
    use crate::parser::{parse_filter, parse_orderby};
    use pretty_assertions::assert_eq;

    /// Customer -orders-> Order -customer-> Customer.
    struct Shop;

    impl MetadataResolver for Shop {
        fn is_navigation_property(&self, entity: &str, property: &str) -> bool {
            matches!((entity, property), ("Customer", "orders") | ("Order", "customer"))
        }

        fn target_entity_type(&self, entity: &str, navigation: &str) -> Option<String> {
            match (entity, navigation) {
                ("Customer", "orders") => Some("Order".to_string()),
                ("Order", "customer") => Some("Customer".to_string()),
                _ => None,
            }
        }

        fn is_scalar_property(&self, entity: &str, property: &str) -> bool {
            self.property_type(entity, property).is_some()
        }

        fn property_type(&self, entity: &str, property: &str) -> Option<EdmType> {
            match (entity, property) {
                ("Customer", "name") | ("Customer", "status") => Some(EdmType::String),
                ("Customer", "active") => Some(EdmType::Boolean),
                ("Order", "total") => Some(EdmType::Int32),
                ("Order", "customer_id") => Some(EdmType::Int64),
                ("Order", "placed") => Some(EdmType::DateTime),
                _ => None,
            }
        }

        fn foreign_key_column(&self, entity: &str, navigation: &str) -> Option<String> {
            (entity == "Order" && navigation == "customer").then(|| "customer_id".to_string())
        }

        fn has_entity_type(&self, entity: &str) -> bool {
            matches!(entity, "Customer" | "Order")
        }
    }

    fn typed(source: &str, entity: &str) -> Result<Expr, CompileError> {
        compile_filter(parse_filter(source).unwrap(), &Shop, entity)
    }

    #[test]
    fn test_end_to_end_filter() {
        let expr = typed("orders/total gt 100 and status eq 'open'", "Customer").unwrap();
        let expected = Expr::property("orders/total", EdmType::Int32)
            .gt(Expr::constant(100i32))
            .and(Expr::property("status", EdmType::String).eq(Expr::constant("open")));
        assert_eq!(expr, expected);
    }

    #[test]
    fn test_navigation_leaf_uses_foreign_key_type() {
        let expr = typed("customer eq null", "Order").unwrap();
        assert_eq!(
            expr,
            Expr::property("customer", EdmType::Int64).eq(Expr::null())
        );
    }

    #[test]
    fn test_negative_literals_fold() {
        let expr = typed("total gt -5", "Order").unwrap();
        assert_eq!(
            expr,
            Expr::property("total", EdmType::Int32).gt(Expr::constant(-5i32))
        );
    }

    #[test]
    fn test_wide_integers_become_int64() {
        let expr = typed("total gt 3000000000", "Order").unwrap();
        assert_eq!(
            expr,
            Expr::property("total", EdmType::Int32).gt(Expr::constant(3_000_000_000i64))
        );
    }

    #[test]
    fn test_typed_literal_keeps_declared_type() {
        let expr = typed("placed ge datetime'2024-01-01'", "Order").unwrap();
        assert_eq!(
            expr,
            Expr::property("placed", EdmType::DateTime)
                .ge(Expr::typed_constant("2024-01-01", EdmType::DateTime))
        );
    }

    #[test]
    fn test_unknown_property() {
        let err = typed("orders/totl gt 1", "Customer").unwrap_err();
        assert_eq!(err.kind, CompileErrorKind::UnknownProperty);
        assert!(err.message.contains("'totl'"));
    }

    #[test]
    fn test_scalar_used_as_navigation() {
        let err = typed("name/length eq 1", "Customer").unwrap_err();
        assert_eq!(err.kind, CompileErrorKind::UnknownNavigation);
    }

    #[test]
    fn test_unknown_function() {
        let err = typed("soundex(name) eq 'x'", "Customer").unwrap_err();
        assert_eq!(err.kind, CompileErrorKind::UnknownFunction);
    }

    #[test]
    fn test_arity_mismatch() {
        let err = typed("startswith(name) eq true", "Customer").unwrap_err();
        assert_eq!(err.kind, CompileErrorKind::ArityMismatch);
    }

    #[test]
    fn test_unknown_entity() {
        let err = typed("name eq 'x'", "Supplier").unwrap_err();
        assert_eq!(err.kind, CompileErrorKind::UnknownEntity);
    }

    #[test]
    fn test_orderby() {
        let keys = compile_orderby(parse_orderby("orders/total desc").unwrap(), &Shop, "Customer")
            .unwrap();
        assert_eq!(
            keys,
            vec![OrderKey::desc(Expr::property("orders/total", EdmType::Int32))]
        );
    }

    #[test]
    fn test_negating_a_string_is_rejected() {
        let err = typed("name eq -'x'", "Customer").unwrap_err();
        assert_eq!(err.kind, CompileErrorKind::InvalidLiteral);
    }
}
