//! Filter compilation and query assembly.

mod assembly;
mod binder;
mod compiler;
mod fragment;
mod functions;
mod ir;
mod join;

pub use assembly::{ExpandItem, Projection, QueryAssembler, QueryPlan};
pub use binder::{normalize, ParameterBinder, ParameterMap};
pub use compiler::{compile_filter, CompiledFilter, ExpressionCompiler};
pub use fragment::{Compiled, Fragment};
pub use functions::{translate, PendingComparison};
pub use ir::{Predicate, Scalar, SortKey};
pub use join::{JoinPlan, JoinResolver, JoinStep, ResolvedPath};
