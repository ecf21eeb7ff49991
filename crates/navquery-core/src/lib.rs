//! Compiles OData-style query options into backend-agnostic query plans.
//!
//! A `$filter` expression arrives as a typed [`Expr`](navquery_proto::Expr)
//! tree. The [`ExpressionCompiler`] walks it and produces a [`Predicate`] in
//! which every property path has been resolved to a join alias and every
//! literal has been bound as a named parameter. The [`QueryAssembler`] does
//! the same for a whole option set and yields a [`QueryPlan`], which can
//! then drive any [`QueryBuilder`].
//!
//! # Example
//!
//! ```
//! use navquery_core::catalog::{EntityDef, FieldDef, RelationDef, SchemaBundle};
//! use navquery_core::{compile_filter, CompilerConfig};
//! use navquery_proto::{EdmType, Expr};
//!
//! let schema = SchemaBundle::new(1)
//!     .with_entity(EntityDef::new("Customer", "id").with_fields([
//!         FieldDef::new("id", EdmType::Int64),
//!         FieldDef::new("status", EdmType::String),
//!     ]))
//!     .with_entity(EntityDef::new("Order", "id").with_fields([
//!         FieldDef::new("id", EdmType::Int64),
//!         FieldDef::new("total", EdmType::Decimal),
//!         FieldDef::new("customer_id", EdmType::Int64),
//!     ]))
//!     .with_relation(RelationDef::one_to_many(
//!         "orders", "Customer", "id", "Order", "customer_id",
//!     ));
//!
//! let filter = Expr::property("orders/total", EdmType::Decimal)
//!     .gt(Expr::constant(100i32))
//!     .and(Expr::property("status", EdmType::String).eq(Expr::constant("open")));
//!
//! let compiled = compile_filter(&schema, "Customer", &filter, &CompilerConfig::default())?;
//! assert_eq!(
//!     compiled.predicate.to_string(),
//!     "and(gt(orders_alias.total, :p0), eq(status, :p1))"
//! );
//! assert_eq!(compiled.joins.alias_for(&["orders"]), Some("orders_alias"));
//! # Ok::<(), navquery_core::Error>(())
//! ```

pub mod builder;
pub mod catalog;
pub mod config;
pub mod error;
pub mod query;

#[cfg(test)]
mod testing;

pub use builder::{CriteriaBuilder, QueryBuilder, Selection};
pub use config::CompilerConfig;
pub use error::{Error, Result};
pub use query::{
    compile_filter, CompiledFilter, ExpressionCompiler, JoinPlan, ParameterMap, Predicate,
    Projection, QueryAssembler, QueryPlan, Scalar,
};
