//! Expression compiler.
//!
//! Walks a typed [`Expr`] tree and produces a [`Predicate`] over join
//! aliases and bound parameters. Path segments are resolved through the
//! [`JoinResolver`], literals are bound through the [`ParameterBinder`] and
//! function calls go through the translation table in
//! [`functions`](crate::query::functions).

use navquery_proto::{
    EdmType, Expr, LogicalOp, MetadataResolver, OrderKey, RelationalOp, UnaryOp,
};
use serde::Serialize;
use tracing::trace;

use crate::config::CompilerConfig;
use crate::error::{Error, Result};
use crate::query::binder::{ParameterBinder, ParameterMap};
use crate::query::fragment::{Compiled, Fragment};
use crate::query::functions;
use crate::query::ir::{Predicate, Scalar, SortKey};
use crate::query::join::{JoinPlan, JoinResolver};

/// Compiles expressions against one root entity type.
///
/// A compiler accumulates joins and parameters across every expression it
/// compiles, so `$filter` and `$orderby` of the same query share aliases.
pub struct ExpressionCompiler<'a> {
    joins: JoinResolver<'a>,
    binder: ParameterBinder<'a>,
    max_depth: usize,
    depth: usize,
}

impl<'a> ExpressionCompiler<'a> {
    pub fn new(
        metadata: &'a dyn MetadataResolver,
        root_entity: &'a str,
        config: &'a CompilerConfig,
    ) -> Self {
        Self::resume(
            metadata,
            root_entity,
            config,
            JoinPlan::new(),
            ParameterMap::new(),
        )
    }

    /// Continue from the joins and parameters of an earlier pass.
    pub fn resume(
        metadata: &'a dyn MetadataResolver,
        root_entity: &'a str,
        config: &'a CompilerConfig,
        joins: JoinPlan,
        parameters: ParameterMap,
    ) -> Self {
        Self {
            joins: JoinResolver::with_plan(metadata, root_entity, config, joins),
            binder: ParameterBinder::with_parameters(config, parameters),
            max_depth: config.max_depth,
            depth: 0,
        }
    }

    /// Compile a boolean expression.
    pub fn compile_filter(&mut self, expr: &Expr) -> Result<Predicate> {
        self.visit(expr)?.fragment.into_predicate(&mut self.binder)
    }

    /// Compile a value expression.
    pub fn compile_scalar(&mut self, expr: &Expr) -> Result<Scalar> {
        self.visit(expr)?.fragment.into_scalar(&mut self.binder)
    }

    /// Compile an `$orderby` key.
    pub fn compile_sort_key(&mut self, key: &OrderKey) -> Result<SortKey> {
        Ok(SortKey {
            scalar: self.compile_scalar(&key.expr)?,
            direction: key.direction,
        })
    }

    pub fn joins(&self) -> &JoinPlan {
        self.joins.plan()
    }

    pub fn parameters(&self) -> &ParameterMap {
        self.binder.parameters()
    }

    pub(crate) fn resolver(&mut self) -> &mut JoinResolver<'a> {
        &mut self.joins
    }

    /// Hand back the accumulated joins and parameters.
    pub fn finish(self) -> (JoinPlan, ParameterMap) {
        (self.joins.into_plan(), self.binder.into_parameters())
    }

    fn visit(&mut self, expr: &Expr) -> Result<Compiled> {
        if self.depth >= self.max_depth {
            return Err(Error::RecursionLimit(self.max_depth));
        }
        self.depth += 1;
        let result = self.visit_node(expr);
        self.depth -= 1;
        result
    }

    fn visit_node(&mut self, expr: &Expr) -> Result<Compiled> {
        trace!(depth = self.depth, node = %expr, "visiting");
        match expr {
            Expr::Constant { value, ty } => Ok(Compiled::new(Fragment::Literal {
                value: value.clone(),
                ty: *ty,
            })),
            Expr::PropertyAccess { path, ty } => {
                let column = self.joins.resolve_property(path)?;
                Ok(Compiled::value(column, *ty))
            }
            Expr::FunctionCall { function, args } => {
                let args = args
                    .iter()
                    .map(|arg| self.visit(arg).map(|compiled| compiled.fragment))
                    .collect::<Result<Vec<_>>>()?;
                functions::translate(*function, args, &mut self.binder)
            }
            Expr::Unary {
                op: UnaryOp::Negate,
                operand,
            } => {
                let operand = self.visit(operand)?.fragment;
                let ty = operand.ty();
                let scalar = operand.into_scalar(&mut self.binder)?;
                Ok(Compiled::value(Scalar::negate(scalar), ty))
            }
            Expr::Unary {
                op: UnaryOp::Not,
                operand,
            } => {
                let operand = self.visit(operand)?.fragment;
                let predicate = operand.into_predicate(&mut self.binder)?;
                Ok(Compiled::predicate(Predicate::not(predicate)))
            }
            Expr::Arithmetic { op, left, right } => {
                let left = self.visit(left)?.fragment;
                let right = self.visit(right)?.fragment;
                let ty = match left.ty() {
                    EdmType::Null => right.ty(),
                    ty => ty,
                };
                let left = left.into_scalar(&mut self.binder)?;
                let right = right.into_scalar(&mut self.binder)?;
                Ok(Compiled::value(Scalar::arithmetic(*op, left, right), ty))
            }
            Expr::Logical { op, left, right } => {
                let left = self.visit(left)?.fragment;
                let left = left.into_predicate(&mut self.binder)?;
                let right = self.visit(right)?.fragment;
                let right = right.into_predicate(&mut self.binder)?;
                Ok(Compiled::predicate(match op {
                    LogicalOp::And => Predicate::and(left, right),
                    LogicalOp::Or => Predicate::or(left, right),
                }))
            }
            Expr::Relational { op, left, right } => {
                let left = self.visit(left)?;
                let right = self.visit(right)?;
                self.relational(*op, left, right).map(Compiled::predicate)
            }
        }
    }

    fn relational(&mut self, op: RelationalOp, left: Compiled, right: Compiled) -> Result<Predicate> {
        if let Some(pending) = left.pending {
            trace!(operator = %op, "resolving deferred comparison");
            return pending.resolve(op, right.fragment, &mut self.binder);
        }
        // A deferred call on the right has nothing to resolve it.
        if let Fragment::Deferred(_) = right.fragment {
            return Err(Error::unsupported(op, right.fragment.describe()));
        }

        let (left, right) = match (left.fragment, right.fragment) {
            // `true eq p` reads as `p eq true`
            (literal @ Fragment::Literal { .. }, Fragment::Predicate(p)) => {
                (Fragment::Predicate(p), literal)
            }
            pair => pair,
        };

        if let Fragment::Predicate(predicate) = left {
            return match (right.as_bool_literal(), op) {
                (Some(expected), RelationalOp::Eq) => Ok(keep_or_negate(predicate, expected)),
                (Some(expected), RelationalOp::Ne) => Ok(keep_or_negate(predicate, !expected)),
                _ => Err(Error::unsupported(
                    op,
                    format!("the predicate {} and {}", predicate, right.describe()),
                )),
            };
        }

        match (left.is_null_literal(), right.is_null_literal()) {
            (true, true) => {
                return match op {
                    RelationalOp::Eq => Ok(Predicate::Const { value: true }),
                    RelationalOp::Ne => Ok(Predicate::Const { value: false }),
                    _ => Err(Error::NullNotComparable {
                        operator: op.to_string(),
                    }),
                };
            }
            (true, false) => return self.null_check(op, right),
            (false, true) => return self.null_check(op, left),
            (false, false) => {}
        }

        if !op.is_equality() {
            for operand in [&left, &right] {
                if operand.ty().is_equality_only() {
                    return Err(Error::unsupported(op, operand.describe()));
                }
            }
        }
        let left = left.into_scalar(&mut self.binder)?;
        let right = right.into_scalar(&mut self.binder)?;
        Ok(Predicate::compare(op, left, right))
    }

    fn null_check(&mut self, op: RelationalOp, operand: Fragment) -> Result<Predicate> {
        let operand = match op {
            RelationalOp::Eq | RelationalOp::Ne => operand.into_scalar(&mut self.binder)?,
            _ => {
                return Err(Error::NullNotComparable {
                    operator: op.to_string(),
                })
            }
        };
        Ok(match op {
            RelationalOp::Eq => Predicate::IsNull { operand },
            _ => Predicate::IsNotNull { operand },
        })
    }
}

fn keep_or_negate(predicate: Predicate, keep: bool) -> Predicate {
    if keep {
        predicate
    } else {
        Predicate::not(predicate)
    }
}

/// A compiled `$filter` with the joins and parameters it needs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompiledFilter {
    pub predicate: Predicate,
    pub joins: JoinPlan,
    pub parameters: ParameterMap,
}

/// Compile a boolean expression rooted at `root_entity`.
pub fn compile_filter(
    metadata: &dyn MetadataResolver,
    root_entity: &str,
    expr: &Expr,
    config: &CompilerConfig,
) -> Result<CompiledFilter> {
    if !metadata.has_entity_type(root_entity) {
        return Err(Error::UnknownEntity(root_entity.to_string()));
    }
    let mut compiler = ExpressionCompiler::new(metadata, root_entity, config);
    let predicate = compiler.compile_filter(expr)?;
    let (joins, parameters) = compiler.finish();
    Ok(CompiledFilter {
        predicate,
        joins,
        parameters,
    })
}
