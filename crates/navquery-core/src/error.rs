//! Core error types.

use navquery_proto::EdmType;
use thiserror::Error;

/// Errors raised while compiling query options.
#[derive(Debug, Error)]
pub enum Error {
    /// The root entity type is not part of the model.
    #[error("unknown entity type '{0}'")]
    UnknownEntity(String),

    /// A non-final path segment is not a navigation property.
    #[error("'{property}' is not a navigation property of entity type '{entity}'")]
    UnknownNavigationProperty { entity: String, property: String },

    /// A path ends in something that is neither a scalar property nor a
    /// navigation with a foreign key column.
    #[error("unknown property '{property}' on entity type '{entity}'")]
    UnknownProperty { entity: String, property: String },

    /// A function name outside the known set.
    #[error("unknown function '{0}'")]
    UnknownFunction(String),

    /// A call with the wrong number of arguments.
    #[error("function '{function}' takes {expected} argument(s), got {got}")]
    ArityMismatch {
        function: String,
        expected: String,
        got: usize,
    },

    /// An operator applied to operands it cannot translate.
    #[error("operator '{operator}' is not supported for {operand}")]
    UnsupportedOperator { operator: String, operand: String },

    /// `null` compared with an ordering operator.
    #[error("null can only be compared with 'eq' or 'ne', not '{operator}'")]
    NullNotComparable { operator: String },

    /// Both `$select` and `$expand` were supplied.
    #[error("$select and $expand cannot be combined")]
    ConflictingProjection,

    /// `$top` or `$skip` is not a non-negative integer.
    #[error("invalid value '{value}' for {option}: expected a non-negative integer")]
    InvalidPagingValue { option: String, value: String },

    /// Literal text that cannot be converted to its declared type.
    #[error("invalid {ty} literal '{text}'")]
    InvalidLiteral { ty: EdmType, text: String },

    /// The expression tree is nested deeper than the configured bound.
    #[error("expression nested deeper than {0} levels")]
    RecursionLimit(usize),

    /// An `$expand` path is longer than the configured bound.
    #[error("expand path '{path}' exceeds the maximum depth of {max}")]
    ExpandTooDeep { path: String, max: usize },

    /// A schema document could not be loaded.
    #[error("invalid schema: {0}")]
    InvalidSchema(String),

    /// Contract-level error.
    #[error("protocol error: {0}")]
    Protocol(navquery_proto::Error),
}

impl From<navquery_proto::Error> for Error {
    fn from(err: navquery_proto::Error) -> Self {
        match err {
            navquery_proto::Error::UnknownFunction(name) => Error::UnknownFunction(name),
            other => Error::Protocol(other),
        }
    }
}

impl Error {
    /// Whether the error was caused by the submitted query options, as
    /// opposed to the model or configuration.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Error::InvalidSchema(_))
    }

    pub(crate) fn unsupported(operator: impl ToString, operand: impl Into<String>) -> Self {
        Error::UnsupportedOperator {
            operator: operator.to_string(),
            operand: operand.into(),
        }
    }
}

/// Result alias for core operations.
pub type Result<T> = std::result::Result<T, Error>;
