//! Schema bundle: the full entity model.

use super::foreign_key::{DeclaredForeignKeys, ForeignKeyStrategy};
use super::{EntityDef, RelationDef};
use crate::error::Error;
use navquery_proto::{EdmType, MetadataResolver};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

fn default_foreign_keys() -> Arc<dyn ForeignKeyStrategy> {
    Arc::new(DeclaredForeignKeys)
}

/// A snapshot of the entity model.
///
/// Relations are stored as navigation properties of their source entity;
/// a bidirectional association is two relations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaBundle {
    /// Schema version.
    #[serde(default)]
    pub version: u64,
    /// Entity types.
    pub entities: Vec<EntityDef>,
    /// Navigation properties.
    #[serde(default)]
    pub relations: Vec<RelationDef>,
    #[serde(skip, default = "default_foreign_keys")]
    foreign_keys: Arc<dyn ForeignKeyStrategy>,
}

impl SchemaBundle {
    /// Create an empty schema bundle.
    pub fn new(version: u64) -> Self {
        Self {
            version,
            entities: Vec::new(),
            relations: Vec::new(),
            foreign_keys: default_foreign_keys(),
        }
    }

    /// Load a schema from JSON and check its references.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let schema: Self =
            serde_json::from_str(json).map_err(|e| Error::InvalidSchema(e.to_string()))?;
        schema.validate()?;
        Ok(schema)
    }

    /// Serialize the schema to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, Error> {
        serde_json::to_string_pretty(self).map_err(|e| Error::InvalidSchema(e.to_string()))
    }

    /// Add an entity.
    pub fn with_entity(mut self, entity: EntityDef) -> Self {
        self.entities.retain(|e| e.name != entity.name);
        self.entities.push(entity);
        self
    }

    /// Add a navigation property.
    pub fn with_relation(mut self, relation: RelationDef) -> Self {
        self.relations
            .retain(|r| !(r.from_entity == relation.from_entity && r.name == relation.name));
        self.relations.push(relation);
        self
    }

    /// Replace the foreign key strategy.
    pub fn with_foreign_keys(mut self, strategy: impl ForeignKeyStrategy + 'static) -> Self {
        self.foreign_keys = Arc::new(strategy);
        self
    }

    /// Get an entity by name.
    pub fn get_entity(&self, name: &str) -> Option<&EntityDef> {
        self.entities.iter().find(|e| e.name == name)
    }

    /// Get the navigation property `name` of `entity`.
    pub fn get_relation(&self, entity: &str, name: &str) -> Option<&RelationDef> {
        self.relations
            .iter()
            .find(|r| r.from_entity == entity && r.name == name)
    }

    /// List all entity names.
    pub fn entity_names(&self) -> Vec<&str> {
        self.entities.iter().map(|e| e.name.as_str()).collect()
    }

    /// Check that every relation references known entities and fields, and
    /// that no navigation shadows a scalar field.
    pub fn validate(&self) -> Result<(), Error> {
        for relation in &self.relations {
            let from = self.get_entity(&relation.from_entity).ok_or_else(|| {
                Error::InvalidSchema(format!(
                    "relation '{}' starts at unknown entity '{}'",
                    relation.name, relation.from_entity
                ))
            })?;
            if self.get_entity(&relation.to_entity).is_none() {
                return Err(Error::InvalidSchema(format!(
                    "relation '{}' leads to unknown entity '{}'",
                    relation.name, relation.to_entity
                )));
            }
            if from.get_field(&relation.name).is_some() {
                return Err(Error::InvalidSchema(format!(
                    "navigation '{}' on '{}' has the same name as a field",
                    relation.name, relation.from_entity
                )));
            }
        }
        Ok(())
    }
}

impl Default for SchemaBundle {
    fn default() -> Self {
        Self::new(0)
    }
}

impl MetadataResolver for SchemaBundle {
    fn is_navigation_property(&self, entity_type: &str, property: &str) -> bool {
        self.get_relation(entity_type, property).is_some()
    }

    fn target_entity_type(&self, entity_type: &str, navigation: &str) -> Option<String> {
        self.get_relation(entity_type, navigation)
            .map(|r| r.to_entity.clone())
    }

    fn is_scalar_property(&self, entity_type: &str, property: &str) -> bool {
        self.get_entity(entity_type)
            .is_some_and(|e| e.get_field(property).is_some())
    }

    fn property_type(&self, entity_type: &str, property: &str) -> Option<EdmType> {
        self.get_entity(entity_type)?.field_type(property)
    }

    fn foreign_key_column(&self, entity_type: &str, navigation: &str) -> Option<String> {
        let entity = self.get_entity(entity_type)?;
        let relation = self.get_relation(entity_type, navigation)?;
        self.foreign_keys.foreign_key_column(entity, relation)
    }

    fn has_entity_type(&self, entity_type: &str) -> bool {
        self.get_entity(entity_type).is_some()
    }
}
