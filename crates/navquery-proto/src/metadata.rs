//! The metadata contract the compiler resolves property paths against.

use crate::types::EdmType;

/// Answers structural questions about the entity model.
///
/// Implementations are expected to be cheap to query; the compiler calls them
/// once per path segment and memoizes nothing beyond the join plan.
pub trait MetadataResolver {
    /// Whether `property` is a navigation property of `entity_type`.
    fn is_navigation_property(&self, entity_type: &str, property: &str) -> bool;

    /// The entity type a navigation property leads to.
    fn target_entity_type(&self, entity_type: &str, navigation: &str) -> Option<String>;

    /// Whether `property` is a scalar (column-backed) property of `entity_type`.
    fn is_scalar_property(&self, entity_type: &str, property: &str) -> bool;

    /// The EDM type of a scalar property.
    fn property_type(&self, entity_type: &str, property: &str) -> Option<EdmType>;

    /// Column on `entity_type` holding the foreign key of `navigation`.
    ///
    /// Used when a navigation property is compared directly
    /// (`customer eq null`).
    fn foreign_key_column(&self, _entity_type: &str, _navigation: &str) -> Option<String> {
        None
    }

    /// Whether `entity_type` is known at all.
    fn has_entity_type(&self, entity_type: &str) -> bool;
}

impl<T: MetadataResolver + ?Sized> MetadataResolver for &T {
    fn is_navigation_property(&self, entity_type: &str, property: &str) -> bool {
        (**self).is_navigation_property(entity_type, property)
    }

    fn target_entity_type(&self, entity_type: &str, navigation: &str) -> Option<String> {
        (**self).target_entity_type(entity_type, navigation)
    }

    fn is_scalar_property(&self, entity_type: &str, property: &str) -> bool {
        (**self).is_scalar_property(entity_type, property)
    }

    fn property_type(&self, entity_type: &str, property: &str) -> Option<EdmType> {
        (**self).property_type(entity_type, property)
    }

    fn foreign_key_column(&self, entity_type: &str, navigation: &str) -> Option<String> {
        (**self).foreign_key_column(entity_type, navigation)
    }

    fn has_entity_type(&self, entity_type: &str) -> bool {
        (**self).has_entity_type(entity_type)
    }
}
