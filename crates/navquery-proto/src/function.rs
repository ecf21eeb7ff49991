//! The closed set of functions a filter expression may call.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;
use crate::types::EdmType;

/// Identifier of a filter function.
///
/// Names are resolved once, at the grammar boundary, through [`FromStr`];
/// everything downstream matches on the enum exhaustively. Serialized as
/// the name used in filter text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FunctionId {
    // String functions
    SubstringOf,
    StartsWith,
    EndsWith,
    Length,
    IndexOf,
    Replace,
    Substring,
    ToLower,
    ToUpper,
    Trim,
    Concat,

    // Date-time parts
    Year,
    Month,
    Day,
    Hour,
    Minute,
    Second,

    // Math
    Round,
    Floor,
    Ceiling,

    // Opaque comparisons
    StringCompare,
    DateTimeCompare,
    GuidCompare,
}

/// Broad translation category of a function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionKind {
    /// Maps onto a scalar function of the query builder.
    DirectValue,
    /// Maps onto a LIKE predicate.
    PatternMatch,
    /// Only meaningful inside a comparison against `0`.
    OpaqueComparison,
    /// `indexof`, resolved once the enclosing comparison is known.
    IndexOf,
}

impl FunctionId {
    /// All known functions.
    pub const ALL: [FunctionId; 23] = [
        FunctionId::SubstringOf,
        FunctionId::StartsWith,
        FunctionId::EndsWith,
        FunctionId::Length,
        FunctionId::IndexOf,
        FunctionId::Replace,
        FunctionId::Substring,
        FunctionId::ToLower,
        FunctionId::ToUpper,
        FunctionId::Trim,
        FunctionId::Concat,
        FunctionId::Year,
        FunctionId::Month,
        FunctionId::Day,
        FunctionId::Hour,
        FunctionId::Minute,
        FunctionId::Second,
        FunctionId::Round,
        FunctionId::Floor,
        FunctionId::Ceiling,
        FunctionId::StringCompare,
        FunctionId::DateTimeCompare,
        FunctionId::GuidCompare,
    ];

    /// The name used in filter text.
    pub fn name(&self) -> &'static str {
        match self {
            FunctionId::SubstringOf => "substringof",
            FunctionId::StartsWith => "startswith",
            FunctionId::EndsWith => "endswith",
            FunctionId::Length => "length",
            FunctionId::IndexOf => "indexof",
            FunctionId::Replace => "replace",
            FunctionId::Substring => "substring",
            FunctionId::ToLower => "tolower",
            FunctionId::ToUpper => "toupper",
            FunctionId::Trim => "trim",
            FunctionId::Concat => "concat",
            FunctionId::Year => "year",
            FunctionId::Month => "month",
            FunctionId::Day => "day",
            FunctionId::Hour => "hour",
            FunctionId::Minute => "minute",
            FunctionId::Second => "second",
            FunctionId::Round => "round",
            FunctionId::Floor => "floor",
            FunctionId::Ceiling => "ceiling",
            FunctionId::StringCompare => "compare",
            FunctionId::DateTimeCompare => "datetimecompare",
            FunctionId::GuidCompare => "guidcompare",
        }
    }

    /// Translation category.
    pub fn kind(&self) -> FunctionKind {
        match self {
            FunctionId::SubstringOf | FunctionId::StartsWith | FunctionId::EndsWith => {
                FunctionKind::PatternMatch
            }
            FunctionId::StringCompare | FunctionId::DateTimeCompare | FunctionId::GuidCompare => {
                FunctionKind::OpaqueComparison
            }
            FunctionId::IndexOf => FunctionKind::IndexOf,
            _ => FunctionKind::DirectValue,
        }
    }

    /// Accepted argument count as an inclusive `(min, max)` range.
    pub fn arity(&self) -> (usize, usize) {
        match self {
            FunctionId::Length
            | FunctionId::ToLower
            | FunctionId::ToUpper
            | FunctionId::Trim
            | FunctionId::Year
            | FunctionId::Month
            | FunctionId::Day
            | FunctionId::Hour
            | FunctionId::Minute
            | FunctionId::Second
            | FunctionId::Round
            | FunctionId::Floor
            | FunctionId::Ceiling => (1, 1),
            FunctionId::Substring => (2, 3),
            FunctionId::Replace => (3, 3),
            FunctionId::Concat => (2, usize::MAX),
            FunctionId::SubstringOf
            | FunctionId::StartsWith
            | FunctionId::EndsWith
            | FunctionId::IndexOf
            | FunctionId::StringCompare
            | FunctionId::DateTimeCompare
            | FunctionId::GuidCompare => (2, 2),
        }
    }

    /// The result type of a call, given the type of its first argument.
    pub fn return_type(&self, first_arg: Option<EdmType>) -> EdmType {
        match self {
            FunctionId::SubstringOf | FunctionId::StartsWith | FunctionId::EndsWith => {
                EdmType::Boolean
            }
            FunctionId::Length
            | FunctionId::IndexOf
            | FunctionId::Year
            | FunctionId::Month
            | FunctionId::Day
            | FunctionId::Hour
            | FunctionId::Minute
            | FunctionId::Second
            | FunctionId::StringCompare
            | FunctionId::DateTimeCompare
            | FunctionId::GuidCompare => EdmType::Int32,
            FunctionId::Replace
            | FunctionId::Substring
            | FunctionId::ToLower
            | FunctionId::ToUpper
            | FunctionId::Trim
            | FunctionId::Concat => EdmType::String,
            FunctionId::Round | FunctionId::Floor | FunctionId::Ceiling => {
                first_arg.filter(|t| t.is_numeric()).unwrap_or(EdmType::Double)
            }
        }
    }
}

impl FromStr for FunctionId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FunctionId::ALL
            .iter()
            .copied()
            .find(|f| f.name() == s)
            .ok_or_else(|| Error::UnknownFunction(s.to_string()))
    }
}

impl Serialize for FunctionId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for FunctionId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for FunctionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
