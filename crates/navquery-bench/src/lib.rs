//! navquery Benchmark Suite
//!
//! Criterion benchmarks for the filter compiler.
//!
//! # Benchmark Categories
//!
//! - **Parse**: filter text to a typed expression tree
//! - **Compile**: typed tree to predicate, joins and parameters
//! - **Join depth**: association paths of growing length
//! - **Assemble**: a full option set through query assembly

pub mod fixtures;

pub use fixtures::{generate_filter, navigation_path, shop_schema, Scale};
