//! Field definitions for entities.

use navquery_proto::EdmType;
use serde::{Deserialize, Serialize};

/// A scalar field of an entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDef {
    /// Field name.
    pub name: String,
    /// EDM type of the field.
    #[serde(rename = "type")]
    pub edm_type: EdmType,
    /// Whether the field may hold null.
    #[serde(default)]
    pub nullable: bool,
}

impl FieldDef {
    /// Create a non-nullable field.
    pub fn new(name: impl Into<String>, edm_type: EdmType) -> Self {
        Self {
            name: name.into(),
            edm_type,
            nullable: false,
        }
    }

    /// Create a nullable field.
    pub fn optional(name: impl Into<String>, edm_type: EdmType) -> Self {
        Self {
            name: name.into(),
            edm_type,
            nullable: true,
        }
    }
}
