//! Shared contracts for navquery.
//!
//! This crate defines the types exchanged between the grammar, the
//! compiler, and the metadata provider.
//!
//! # Modules
//!
//! - [`value`] - Literal values for constants and bound parameters
//! - [`types`] - EDM primitive types
//! - [`expr`] - Typed expression trees
//! - [`function`] - The closed set of filter functions
//! - [`metadata`] - The metadata resolver contract
//! - [`options`] - Query option sets
//! - [`error`] - Contract error types
//!
//! # Example
//!
//! ```
//! use navquery_proto::{EdmType, Expr};
//!
//! let filter = Expr::property("orders/total", EdmType::Int32)
//!     .gt(Expr::constant(100i32))
//!     .and(Expr::property("status", EdmType::String).eq(Expr::constant("open")));
//!
//! assert_eq!(filter.to_string(), "(orders/total gt 100 and status eq 'open')");
//! ```

pub mod error;
pub mod expr;
pub mod function;
pub mod metadata;
pub mod options;
pub mod types;
pub mod value;

pub use error::Error;

pub use expr::{ArithmeticOp, Expr, LogicalOp, RelationalOp, UnaryOp};
pub use function::{FunctionId, FunctionKind};
pub use metadata::MetadataResolver;
pub use options::{OrderKey, QueryOptions, SortDirection};
pub use types::EdmType;
pub use value::Value;
