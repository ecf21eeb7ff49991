//! Schema and filter generation for benchmarks.
//!
//! Filters are generated from a seeded RNG so runs are reproducible.

use navquery_core::catalog::{EntityDef, FieldDef, RelationDef, SchemaBundle};
use navquery_proto::EdmType;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Size of a generated filter.
#[derive(Clone, Copy, Debug)]
pub enum Scale {
    /// 2 clauses
    Tiny,
    /// 8 clauses
    Small,
    /// 24 clauses
    Medium,
    /// 48 clauses
    Large,
}

impl Scale {
    /// Number of comparison clauses.
    pub fn clauses(&self) -> usize {
        match self {
            Scale::Tiny => 2,
            Scale::Small => 8,
            Scale::Medium => 24,
            Scale::Large => 48,
        }
    }
}

impl Default for Scale {
    fn default() -> Self {
        Scale::Small
    }
}

/// Customer -> orders -> items -> product -> supplier.
pub fn shop_schema() -> SchemaBundle {
    let customer = EntityDef::new("Customer", "id").with_fields([
        FieldDef::new("id", EdmType::Int64),
        FieldDef::new("name", EdmType::String),
        FieldDef::new("status", EdmType::String),
        FieldDef::optional("token", EdmType::Guid),
    ]);
    let order = EntityDef::new("Order", "id").with_fields([
        FieldDef::new("id", EdmType::Int64),
        FieldDef::new("total", EdmType::Decimal),
        FieldDef::new("placed", EdmType::DateTime),
        FieldDef::new("customer_id", EdmType::Int64),
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
        FieldDef::new("supplier_id", EdmType::Int64),
    ]);
    let supplier = EntityDef::new("Supplier", "id").with_fields([
        FieldDef::new("id", EdmType::Int64),
        FieldDef::new("name", EdmType::String),
    ]);

    SchemaBundle::new(1)
        .with_entity(customer)
        .with_entity(order)
        .with_entity(item)
        .with_entity(product)
        .with_entity(supplier)
        .with_relation(RelationDef::one_to_many(
            "orders", "Customer", "id", "Order", "customer_id",
        ))
        .with_relation(RelationDef::one_to_many("items", "Order", "id", "Item", "order_id"))
        .with_relation(RelationDef::many_to_one(
            "product", "Item", "product_id", "Product", "id",
        ))
        .with_relation(RelationDef::many_to_one(
            "supplier", "Product", "supplier_id", "Supplier", "id",
        ))
}

/// A property path on `Customer` crossing `depth` navigations (at most 4).
pub fn navigation_path(depth: usize) -> String {
    const HOPS: [&str; 4] = ["orders", "items", "product", "supplier"];
    const LEAVES: [&str; 5] = ["name", "total", "quantity", "name", "name"];
    let depth = depth.min(HOPS.len());
    let mut segments: Vec<&str> = HOPS[..depth].to_vec();
    segments.push(LEAVES[depth]);
    segments.join("/")
}

/// A `$filter` on `Customer` with `clauses` comparisons.
pub fn generate_filter(clauses: usize, seed: u64) -> String {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut filter = String::new();

    for i in 0..clauses {
        if i > 0 {
            filter.push_str(if rng.gen_bool(0.7) { " and " } else { " or " });
        }
        let n: u32 = rng.gen_range(0..1000);
        let clause = match rng.gen_range(0..7) {
            0 => format!("status eq 'status_{}'", n),
            1 => format!("orders/total gt {}", n),
            2 => format!("startswith(name, 'N{}')", n),
            3 => format!("orders/items/quantity le {}", n % 50),
            4 => format!("indexof(name, 'x') eq {}", n % 10),
            5 => format!(
                "orders/placed lt datetime'2024-01-{:02}T00:00'",
                n % 28 + 1
            ),
            _ => "token ne null".to_string(),
        };
        filter.push_str(&clause);
    }

    filter
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_is_deterministic() {
        assert_eq!(generate_filter(8, 42), generate_filter(8, 42));
        assert_ne!(generate_filter(8, 42), generate_filter(8, 43));
    }

    #[test]
    fn test_generated_filters_compile() {
        let schema = shop_schema();
        let config = navquery_core::CompilerConfig::default();
        for scale in [Scale::Tiny, Scale::Small, Scale::Medium, Scale::Large] {
            let text = generate_filter(scale.clauses(), 7);
            let expr =
                navquery_lang::parse_and_compile_filter(&text, &schema, "Customer").unwrap();
            navquery_core::compile_filter(&schema, "Customer", &expr, &config).unwrap();
        }
    }

    #[test]
    fn test_navigation_paths() {
        assert_eq!(navigation_path(0), "name");
        assert_eq!(navigation_path(2), "orders/items/quantity");
        assert_eq!(navigation_path(4), "orders/items/product/supplier/name");
        assert_eq!(navigation_path(9), navigation_path(4));
    }
}
