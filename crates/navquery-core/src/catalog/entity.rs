//! Entity definitions.

use super::field::FieldDef;
use navquery_proto::EdmType;
use serde::{Deserialize, Serialize};

/// An entity type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityDef {
    /// Entity type name (unique within the schema).
    pub name: String,
    /// Name of the key field.
    pub key: String,
    /// Scalar fields.
    #[serde(default)]
    pub fields: Vec<FieldDef>,
}

impl EntityDef {
    pub fn new(name: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            key: key.into(),
            fields: Vec::new(),
        }
    }

    /// Add a field.
    pub fn with_field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }

    /// Add multiple fields.
    pub fn with_fields(mut self, fields: impl IntoIterator<Item = FieldDef>) -> Self {
        self.fields.extend(fields);
        self
    }

    /// Get a field by name.
    pub fn get_field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// The EDM type of a field, if the field exists.
    pub fn field_type(&self, name: &str) -> Option<EdmType> {
        self.get_field(name).map(|f| f.edm_type)
    }

    /// Get the key field definition.
    pub fn key_field(&self) -> Option<&FieldDef> {
        self.get_field(&self.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_builder() {
        let entity = EntityDef::new("Customer", "id")
            .with_field(FieldDef::new("id", EdmType::Int64))
            .with_field(FieldDef::new("name", EdmType::String))
            .with_field(FieldDef::optional("email", EdmType::String));

        assert_eq!(entity.fields.len(), 3);
        assert_eq!(entity.key_field().map(|f| f.edm_type), Some(EdmType::Int64));
        assert_eq!(entity.field_type("name"), Some(EdmType::String));
        assert!(entity.get_field("email").unwrap().nullable);
        assert!(entity.get_field("missing").is_none());
    }
}
