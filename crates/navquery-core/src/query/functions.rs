//! Function translation table.
//!
//! Each [`FunctionId`] maps onto one translation strategy. Most functions
//! become scalar function calls or LIKE predicates right away. `indexof` and
//! the opaque comparison functions only make sense inside a comparison, so
//! they compile to a [`Fragment::Deferred`] marker plus a
//! [`PendingComparison`] that only the enclosing relational node consumes.

use navquery_proto::{ArithmeticOp, EdmType, FunctionId, FunctionKind, RelationalOp, Value};
use tracing::trace;

use crate::error::{Error, Result};
use crate::query::binder::ParameterBinder;
use crate::query::fragment::{Compiled, Fragment};
use crate::query::ir::{Predicate, Scalar};

/// A comparison whose translation depends on the enclosing operator.
#[derive(Debug, Clone, PartialEq)]
pub enum PendingComparison {
    /// `indexof(haystack, needle) op k`.
    IndexOf { haystack: Scalar, needle: Scalar },
    /// `compare(left, right) op 0` and its date-time and GUID variants.
    Opaque {
        function: FunctionId,
        left: Scalar,
        right: Scalar,
    },
}

impl PendingComparison {
    /// The function the comparison was written with.
    pub fn function(&self) -> FunctionId {
        match self {
            PendingComparison::IndexOf { .. } => FunctionId::IndexOf,
            PendingComparison::Opaque { function, .. } => *function,
        }
    }

    /// Translate the comparison `<call> op threshold`.
    pub fn resolve(
        self,
        op: RelationalOp,
        threshold: Fragment,
        binder: &mut ParameterBinder<'_>,
    ) -> Result<Predicate> {
        match self {
            PendingComparison::IndexOf { haystack, needle } => {
                if !op.is_equality() {
                    return Err(Error::unsupported(op, "indexof"));
                }
                // indexof(h, n) eq k  =>  substring(h, 0, k + 1) eq n
                let position = threshold.into_scalar(binder)?;
                let end =
                    Scalar::arithmetic(ArithmeticOp::Add, position, Scalar::Constant { value: 1 });
                let prefix = Scalar::function(
                    FunctionId::Substring,
                    vec![haystack, Scalar::Constant { value: 0 }, end],
                );
                let matched = Predicate::compare(RelationalOp::Eq, prefix, needle);
                Ok(match op {
                    RelationalOp::Eq => matched,
                    _ => Predicate::not(matched),
                })
            }
            PendingComparison::Opaque {
                function,
                left,
                right,
            } => {
                let ordering_allowed = function == FunctionId::DateTimeCompare;
                if !op.is_equality() && !ordering_allowed {
                    return Err(Error::unsupported(op, function.name()));
                }
                if !is_zero(&threshold) {
                    return Err(Error::unsupported(
                        op,
                        format!("{} compared with {}", function, threshold.describe()),
                    ));
                }
                Ok(match op {
                    RelationalOp::Eq => Predicate::compare(RelationalOp::Eq, left, right),
                    RelationalOp::Ne => {
                        Predicate::not(Predicate::compare(RelationalOp::Eq, left, right))
                    }
                    ordering => Predicate::compare(ordering, left, right),
                })
            }
        }
    }
}

fn is_zero(fragment: &Fragment) -> bool {
    matches!(
        fragment,
        Fragment::Literal {
            value: Value::Int32(0) | Value::Int64(0),
            ..
        }
    )
}

/// Translate a call whose arguments are already compiled.
pub fn translate(
    function: FunctionId,
    args: Vec<Fragment>,
    binder: &mut ParameterBinder<'_>,
) -> Result<Compiled> {
    check_arity(function, args.len())?;
    trace!(function = %function, args = args.len(), "translating call");

    match function.kind() {
        FunctionKind::DirectValue => {
            let first = args.first().map(Fragment::ty);
            let args = lower_all(args, binder)?;
            Ok(Compiled::value(
                Scalar::function(function, args),
                function.return_type(first),
            ))
        }
        FunctionKind::PatternMatch => {
            let [first, second] = two(function, args)?;
            let (haystack, needle) = match function {
                FunctionId::SubstringOf => (second, first),
                _ => (first, second),
            };
            let value = haystack.into_scalar(binder)?;
            let pattern = match needle {
                Fragment::Literal {
                    value: Value::String(text),
                    ty,
                } => binder.bind(Value::String(wildcard(function, &text)), ty)?,
                other => other.into_scalar(binder)?,
            };
            Ok(Compiled::predicate(Predicate::Like { value, pattern }))
        }
        FunctionKind::OpaqueComparison => {
            let [left, right] = two(function, args)?;
            let (left, right) = if function == FunctionId::DateTimeCompare {
                (as_timestamp(left), as_timestamp(right))
            } else {
                (left, right)
            };
            Ok(Compiled::deferred(PendingComparison::Opaque {
                function,
                left: left.into_scalar(binder)?,
                right: right.into_scalar(binder)?,
            }))
        }
        FunctionKind::IndexOf => {
            let [haystack, needle] = two(function, args)?;
            Ok(Compiled::deferred(PendingComparison::IndexOf {
                haystack: haystack.into_scalar(binder)?,
                needle: needle.into_scalar(binder)?,
            }))
        }
    }
}

/// Text literals given to `datetimecompare` are bound as timestamps, so they
/// are parsed and normalized to UTC like any other date-time literal.
fn as_timestamp(fragment: Fragment) -> Fragment {
    match fragment {
        Fragment::Literal {
            value: value @ Value::String(_),
            ..
        } => Fragment::Literal {
            value,
            ty: EdmType::DateTime,
        },
        other => other,
    }
}

/// The LIKE pattern for a literal needle.
fn wildcard(function: FunctionId, needle: &str) -> String {
    match function {
        FunctionId::StartsWith => format!("{}%", needle),
        FunctionId::EndsWith => format!("%{}", needle),
        _ => format!("%{}%", needle),
    }
}

fn check_arity(function: FunctionId, got: usize) -> Result<()> {
    let (min, max) = function.arity();
    if (min..=max).contains(&got) {
        return Ok(());
    }
    let expected = match (min, max) {
        (min, max) if min == max => min.to_string(),
        (min, usize::MAX) => format!("at least {}", min),
        (min, max) => format!("{} to {}", min, max),
    };
    Err(Error::ArityMismatch {
        function: function.name().to_string(),
        expected,
        got,
    })
}

fn two(function: FunctionId, args: Vec<Fragment>) -> Result<[Fragment; 2]> {
    args.try_into().map_err(|args: Vec<Fragment>| Error::ArityMismatch {
        function: function.name().to_string(),
        expected: "2".to_string(),
        got: args.len(),
    })
}

fn lower_all(args: Vec<Fragment>, binder: &mut ParameterBinder<'_>) -> Result<Vec<Scalar>> {
    args.into_iter().map(|arg| arg.into_scalar(binder)).collect()
}
