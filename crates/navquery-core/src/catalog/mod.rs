//! In-memory entity catalog.
//!
//! The catalog describes entity types, their scalar fields, and the
//! navigation properties between them, and answers the
//! [`MetadataResolver`](navquery_proto::MetadataResolver) questions the
//! compiler asks.

mod entity;
mod field;
mod foreign_key;
mod relation;
mod schema;

pub use entity::EntityDef;
pub use field::FieldDef;
pub use foreign_key::{DeclaredForeignKeys, ForeignKeyStrategy, SuffixForeignKeys};
pub use relation::{Cardinality, RelationDef};
pub use schema::SchemaBundle;
