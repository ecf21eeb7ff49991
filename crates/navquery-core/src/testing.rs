//! Shared model for unit tests.

use navquery_proto::EdmType;

use crate::catalog::{EntityDef, FieldDef, RelationDef, SchemaBundle};

/// Customers with orders, order items and products.
pub fn shop() -> SchemaBundle {
    let customer = EntityDef::new("Customer", "id").with_fields([
        FieldDef::new("id", EdmType::Int64),
        FieldDef::new("name", EdmType::String),
        FieldDef::new("status", EdmType::String),
        FieldDef::new("active", EdmType::Boolean),
        FieldDef::optional("created", EdmType::DateTime),
        FieldDef::optional("token", EdmType::Guid),
    ]);
    let order = EntityDef::new("Order", "id").with_fields([
        FieldDef::new("id", EdmType::Int64),
        FieldDef::new("total", EdmType::Decimal),
        FieldDef::new("status", EdmType::String),
        FieldDef::new("customer_id", EdmType::Int64),
        FieldDef::optional("shipped", EdmType::DateTime),
    ]);
    let item = EntityDef::new("Item", "id").with_fields([
        FieldDef::new("id", EdmType::Int64),
        FieldDef::new("quantity", EdmType::Int32),
        FieldDef::new("order_id", EdmType::Int64),
        FieldDef::new("product_id", EdmType::Int64),
    ]);
    let product = EntityDef::new("Product", "id").with_fields([
        FieldDef::new("id", EdmType::Int64),
        FieldDef::new("name", EdmType::String),
        FieldDef::new("price", EdmType::Double),
        FieldDef::optional("digest", EdmType::Binary),
    ]);

    let orders = RelationDef::one_to_many("orders", "Customer", "id", "Order", "customer_id");
    let customer_nav = orders.inverse("customer");
    let items = RelationDef::one_to_many("items", "Order", "id", "Item", "order_id");
    let product_nav = RelationDef::many_to_one("product", "Item", "product_id", "Product", "id");

    SchemaBundle::new(1)
        .with_entity(customer)
        .with_entity(order)
        .with_entity(item)
        .with_entity(product)
        .with_relation(orders)
        .with_relation(customer_nav)
        .with_relation(items)
        .with_relation(product_nav)
}
