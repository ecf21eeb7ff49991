//! EDM primitive types attached to typed expression nodes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Primitive types of the entity data model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdmType {
    Boolean,
    Byte,
    Int16,
    Int32,
    Int64,
    Single,
    Double,
    Decimal,
    String,
    DateTime,
    DateTimeOffset,
    Time,
    Guid,
    Binary,
    /// The type of the `null` literal.
    Null,
}

impl EdmType {
    /// Check if this type is numeric.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            EdmType::Byte
                | EdmType::Int16
                | EdmType::Int32
                | EdmType::Int64
                | EdmType::Single
                | EdmType::Double
                | EdmType::Decimal
        )
    }

    /// Check if this type is an integral type.
    pub fn is_integral(&self) -> bool {
        matches!(
            self,
            EdmType::Byte | EdmType::Int16 | EdmType::Int32 | EdmType::Int64
        )
    }

    /// Check if this type carries a point in time.
    pub fn is_temporal(&self) -> bool {
        matches!(self, EdmType::DateTime | EdmType::DateTimeOffset)
    }

    /// Types whose values only support equality, never ordering.
    pub fn is_equality_only(&self) -> bool {
        matches!(self, EdmType::Guid | EdmType::Binary | EdmType::Null)
    }

    /// The OData name of the type (e.g. `Edm.Int32`).
    pub fn name(&self) -> &'static str {
        match self {
            EdmType::Boolean => "Edm.Boolean",
            EdmType::Byte => "Edm.Byte",
            EdmType::Int16 => "Edm.Int16",
            EdmType::Int32 => "Edm.Int32",
            EdmType::Int64 => "Edm.Int64",
            EdmType::Single => "Edm.Single",
            EdmType::Double => "Edm.Double",
            EdmType::Decimal => "Edm.Decimal",
            EdmType::String => "Edm.String",
            EdmType::DateTime => "Edm.DateTime",
            EdmType::DateTimeOffset => "Edm.DateTimeOffset",
            EdmType::Time => "Edm.Time",
            EdmType::Guid => "Edm.Guid",
            EdmType::Binary => "Edm.Binary",
            EdmType::Null => "null",
        }
    }
}

impl fmt::Display for EdmType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
