//! Intermediate results of the expression compiler.

use navquery_proto::{EdmType, FunctionId, Value};

use crate::error::{Error, Result};
use crate::query::binder::ParameterBinder;
use crate::query::functions::PendingComparison;
use crate::query::ir::{Predicate, Scalar};

/// What a sub-expression compiled to.
#[derive(Debug, Clone, PartialEq)]
pub enum Fragment {
    /// A boolean predicate.
    Predicate(Predicate),
    /// A scalar of known type.
    Value { scalar: Scalar, ty: EdmType },
    /// A literal not yet bound. Binding happens when the literal is lowered
    /// to a scalar, so a literal is bound at most once and may be rewritten
    /// first (pattern wildcards, absorbed thresholds).
    Literal { value: Value, ty: EdmType },
    /// The result of a call that only translates as the left operand of a
    /// comparison. It has no scalar or predicate form of its own; the
    /// translation travels in [`Compiled::pending`].
    Deferred(FunctionId),
}

impl Fragment {
    pub fn is_null_literal(&self) -> bool {
        matches!(self, Fragment::Literal { value: Value::Null, .. })
    }

    pub fn as_bool_literal(&self) -> Option<bool> {
        match self {
            Fragment::Literal {
                value: Value::Bool(b),
                ..
            } => Some(*b),
            _ => None,
        }
    }

    /// The EDM type carried by the fragment.
    pub fn ty(&self) -> EdmType {
        match self {
            Fragment::Predicate(_) => EdmType::Boolean,
            Fragment::Value { ty, .. } | Fragment::Literal { ty, .. } => *ty,
            Fragment::Deferred(_) => EdmType::Int32,
        }
    }

    /// Short description for error messages.
    pub fn describe(&self) -> String {
        match self {
            Fragment::Predicate(_) => "a boolean predicate".to_string(),
            Fragment::Value { ty, .. } => format!("a value of type {}", ty),
            Fragment::Literal { value, .. } => format!("the literal {}", value),
            Fragment::Deferred(function) => {
                format!("{}() outside the left side of a comparison", function)
            }
        }
    }

    /// Lower to a scalar, binding literals.
    pub fn into_scalar(self, binder: &mut ParameterBinder<'_>) -> Result<Scalar> {
        match self {
            Fragment::Value { scalar, .. } => Ok(scalar),
            Fragment::Literal { value, ty } => binder.bind(value, ty),
            Fragment::Predicate(p) => Err(Error::UnsupportedOperator {
                operator: "value".to_string(),
                operand: format!("the predicate {}", p),
            }),
            deferred @ Fragment::Deferred(_) => Err(Error::UnsupportedOperator {
                operator: "value".to_string(),
                operand: deferred.describe(),
            }),
        }
    }

    /// Lower to a predicate.
    ///
    /// Boolean literals become constants and boolean scalars are compared
    /// with a bound `true`.
    pub fn into_predicate(self, binder: &mut ParameterBinder<'_>) -> Result<Predicate> {
        match self {
            Fragment::Predicate(p) => Ok(p),
            Fragment::Literal {
                value: Value::Bool(b),
                ..
            } => Ok(Predicate::Const { value: b }),
            Fragment::Value {
                scalar,
                ty: EdmType::Boolean,
            } => {
                let truth = binder.bind_value(Value::Bool(true));
                Ok(Predicate::compare(
                    navquery_proto::RelationalOp::Eq,
                    scalar,
                    truth,
                ))
            }
            other => Err(Error::UnsupportedOperator {
                operator: "logical".to_string(),
                operand: other.describe(),
            }),
        }
    }
}

/// A compiled fragment together with the deferred comparison it may carry.
#[derive(Debug, Clone, PartialEq)]
pub struct Compiled {
    pub fragment: Fragment,
    pub pending: Option<PendingComparison>,
}

impl Compiled {
    pub fn new(fragment: Fragment) -> Self {
        Self {
            fragment,
            pending: None,
        }
    }

    pub fn deferred(pending: PendingComparison) -> Self {
        Self {
            fragment: Fragment::Deferred(pending.function()),
            pending: Some(pending),
        }
    }

    pub fn predicate(predicate: Predicate) -> Self {
        Self::new(Fragment::Predicate(predicate))
    }

    pub fn value(scalar: Scalar, ty: EdmType) -> Self {
        Self::new(Fragment::Value { scalar, ty })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CompilerConfig;

    #[test]
    fn test_deferred_has_no_standalone_form() {
        let config = CompilerConfig::default();
        let mut binder = ParameterBinder::new(&config);
        let compiled = Compiled::deferred(PendingComparison::IndexOf {
            haystack: Scalar::column(None, "name"),
            needle: Scalar::parameter("p0"),
        });
        assert_eq!(compiled.fragment, Fragment::Deferred(FunctionId::IndexOf));
        assert!(compiled.pending.is_some());

        let err = compiled.fragment.clone().into_scalar(&mut binder).unwrap_err();
        assert!(matches!(
            err,
            Error::UnsupportedOperator { ref operand, .. } if operand.starts_with("indexof()")
        ));
        assert!(compiled.fragment.into_predicate(&mut binder).is_err());

        let opaque = Fragment::Deferred(FunctionId::GuidCompare);
        assert_eq!(opaque.ty(), EdmType::Int32);
        assert!(opaque.into_scalar(&mut binder).is_err());
        assert!(binder.parameters().is_empty());
    }
}
