//! Navigation properties between entities.

use serde::{Deserialize, Serialize};

/// Cardinality of a navigation, seen from its source entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cardinality {
    /// At most one target; the foreign key lives on the source.
    OneToOne,
    /// Exactly one target; the foreign key lives on the source.
    ManyToOne,
    /// A collection; the foreign key lives on the target.
    OneToMany,
    /// A collection through an edge entity.
    ManyToMany,
}

/// A navigation property `from_entity.name` leading to `to_entity`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationDef {
    /// Navigation property name (unique per source entity).
    pub name: String,
    /// Source entity type.
    pub from_entity: String,
    /// Target entity type.
    pub to_entity: String,
    pub cardinality: Cardinality,
    /// Joining field on the source entity.
    pub from_field: String,
    /// Joining field on the target entity.
    pub to_field: String,
    /// Edge entity for many-to-many navigations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edge_entity: Option<String>,
}

impl RelationDef {
    fn new(
        name: impl Into<String>,
        from_entity: impl Into<String>,
        from_field: impl Into<String>,
        to_entity: impl Into<String>,
        to_field: impl Into<String>,
        cardinality: Cardinality,
    ) -> Self {
        Self {
            name: name.into(),
            from_entity: from_entity.into(),
            to_entity: to_entity.into(),
            cardinality,
            from_field: from_field.into(),
            to_field: to_field.into(),
            edge_entity: None,
        }
    }

    /// A single-valued navigation whose foreign key is `from_field`.
    pub fn many_to_one(
        name: impl Into<String>,
        from_entity: impl Into<String>,
        from_field: impl Into<String>,
        to_entity: impl Into<String>,
        to_field: impl Into<String>,
    ) -> Self {
        Self::new(
            name,
            from_entity,
            from_field,
            to_entity,
            to_field,
            Cardinality::ManyToOne,
        )
    }

    /// A unique single-valued navigation whose foreign key is `from_field`.
    pub fn one_to_one(
        name: impl Into<String>,
        from_entity: impl Into<String>,
        from_field: impl Into<String>,
        to_entity: impl Into<String>,
        to_field: impl Into<String>,
    ) -> Self {
        Self::new(
            name,
            from_entity,
            from_field,
            to_entity,
            to_field,
            Cardinality::OneToOne,
        )
    }

    /// A collection navigation whose foreign key is `to_field`.
    pub fn one_to_many(
        name: impl Into<String>,
        from_entity: impl Into<String>,
        from_field: impl Into<String>,
        to_entity: impl Into<String>,
        to_field: impl Into<String>,
    ) -> Self {
        Self::new(
            name,
            from_entity,
            from_field,
            to_entity,
            to_field,
            Cardinality::OneToMany,
        )
    }

    /// A collection navigation through an edge entity.
    pub fn many_to_many(
        name: impl Into<String>,
        from_entity: impl Into<String>,
        from_field: impl Into<String>,
        to_entity: impl Into<String>,
        to_field: impl Into<String>,
        edge_entity: impl Into<String>,
    ) -> Self {
        let mut relation = Self::new(
            name,
            from_entity,
            from_field,
            to_entity,
            to_field,
            Cardinality::ManyToMany,
        );
        relation.edge_entity = Some(edge_entity.into());
        relation
    }

    /// Whether the navigation yields at most one entity.
    pub fn is_single_valued(&self) -> bool {
        matches!(self.cardinality, Cardinality::OneToOne | Cardinality::ManyToOne)
    }

    /// The source-side column holding the foreign key, if the key lives on
    /// the source entity.
    pub fn source_foreign_key(&self) -> Option<&str> {
        self.is_single_valued().then_some(self.from_field.as_str())
    }

    /// The inverse navigation, named `name`, on the target entity.
    pub fn inverse(&self, name: impl Into<String>) -> Self {
        let cardinality = match self.cardinality {
            Cardinality::OneToOne => Cardinality::OneToOne,
            Cardinality::ManyToOne => Cardinality::OneToMany,
            Cardinality::OneToMany => Cardinality::ManyToOne,
            Cardinality::ManyToMany => Cardinality::ManyToMany,
        };
        Self {
            name: name.into(),
            from_entity: self.to_entity.clone(),
            to_entity: self.from_entity.clone(),
            cardinality,
            from_field: self.to_field.clone(),
            to_field: self.from_field.clone(),
            edge_entity: self.edge_entity.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_many_to_one_foreign_key() {
        let rel = RelationDef::many_to_one("customer", "Order", "customer_id", "Customer", "id");
        assert!(rel.is_single_valued());
        assert_eq!(rel.source_foreign_key(), Some("customer_id"));
    }

    #[test]
    fn test_collection_has_no_source_key() {
        let rel = RelationDef::one_to_many("orders", "Customer", "id", "Order", "customer_id");
        assert!(!rel.is_single_valued());
        assert_eq!(rel.source_foreign_key(), None);
    }

    #[test]
    fn test_inverse() {
        let rel = RelationDef::one_to_many("orders", "Customer", "id", "Order", "customer_id");
        let inv = rel.inverse("customer");
        assert_eq!(inv.from_entity, "Order");
        assert_eq!(inv.to_entity, "Customer");
        assert_eq!(inv.cardinality, Cardinality::ManyToOne);
        assert_eq!(inv.source_foreign_key(), Some("customer_id"));
    }

    #[test]
    fn test_many_to_many_edge() {
        let rel = RelationDef::many_to_many("tags", "Product", "id", "Tag", "id", "ProductTag");
        assert_eq!(rel.edge_entity.as_deref(), Some("ProductTag"));
        assert!(!rel.is_single_valued());
    }
}
