//! Strategies mapping a navigation property to its foreign key column.
//!
//! A filter may compare a single-valued navigation directly
//! (`customer eq null`); the catalog answers which column of the source
//! entity stands in for it.

use super::entity::EntityDef;
use super::relation::RelationDef;
use std::fmt;

/// Chooses the foreign key column backing a navigation property.
pub trait ForeignKeyStrategy: fmt::Debug + Send + Sync {
    /// The column on `entity` that stands in for `relation`, if any.
    fn foreign_key_column(&self, entity: &EntityDef, relation: &RelationDef) -> Option<String>;
}

/// Uses only the foreign key declared on single-valued relations.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeclaredForeignKeys;

impl ForeignKeyStrategy for DeclaredForeignKeys {
    fn foreign_key_column(&self, entity: &EntityDef, relation: &RelationDef) -> Option<String> {
        relation
            .source_foreign_key()
            .filter(|column| entity.get_field(column).is_some())
            .map(str::to_string)
    }
}

/// Falls back to a shadow column named `<navigation><suffix>` when the
/// relation declares no usable key.
#[derive(Debug, Clone)]
pub struct SuffixForeignKeys {
    suffix: String,
}

impl SuffixForeignKeys {
    pub fn new(suffix: impl Into<String>) -> Self {
        Self {
            suffix: suffix.into(),
        }
    }
}

impl Default for SuffixForeignKeys {
    fn default() -> Self {
        Self::new("_id")
    }
}

impl ForeignKeyStrategy for SuffixForeignKeys {
    fn foreign_key_column(&self, entity: &EntityDef, relation: &RelationDef) -> Option<String> {
        if let Some(column) = DeclaredForeignKeys.foreign_key_column(entity, relation) {
            return Some(column);
        }
        if !relation.is_single_valued() {
            return None;
        }
        let shadow = format!("{}{}", relation.name, self.suffix);
        entity.get_field(&shadow).map(|f| f.name.clone())
    }
}
