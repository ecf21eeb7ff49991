//! Query assembly.
//!
//! Turns a full [`QueryOptions`] set into a [`QueryPlan`]. Each option is
//! applied by its own step, which takes the plan built so far and returns an
//! updated one; every step resolves paths against the joins already
//! registered, so `$filter`, `$orderby` and `$select` share aliases.

use std::mem;

use navquery_proto::{Expr, MetadataResolver, OrderKey, QueryOptions};
use serde::Serialize;
use tracing::{debug, instrument};

use crate::builder::{QueryBuilder, Selection};
use crate::config::CompilerConfig;
use crate::error::{Error, Result};
use crate::query::binder::ParameterMap;
use crate::query::compiler::ExpressionCompiler;
use crate::query::ir::{Predicate, Scalar, SortKey};
use crate::query::join::JoinPlan;

/// An entity fetched alongside the root by `$expand`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExpandItem {
    pub path: Vec<String>,
    pub alias: String,
}

/// What the query returns.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "kind", content = "items", rename_all = "snake_case")]
pub enum Projection {
    /// Every column of the root entity.
    #[default]
    All,
    /// `$select` columns.
    Columns(Vec<Scalar>),
    /// `$expand` navigations.
    Expand(Vec<ExpandItem>),
}

/// A query translated from its options, ready to drive a [`QueryBuilder`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryPlan {
    pub root_entity: String,
    pub root_alias: Option<String>,
    pub joins: JoinPlan,
    pub parameters: ParameterMap,
    pub predicate: Option<Predicate>,
    pub order_by: Vec<SortKey>,
    pub first_result: Option<u64>,
    pub max_results: Option<u64>,
    pub projection: Projection,
}

impl QueryPlan {
    /// An empty plan over `root_entity`.
    pub fn new(root_entity: impl Into<String>, root_alias: Option<String>) -> Self {
        Self {
            root_entity: root_entity.into(),
            root_alias,
            joins: JoinPlan::new(),
            parameters: ParameterMap::new(),
            predicate: None,
            order_by: Vec::new(),
            first_result: None,
            max_results: None,
            projection: Projection::All,
        }
    }

    /// Issue the plan to a builder: joins, parameter bindings, where clause,
    /// sort keys, paging, then the selection.
    pub fn apply<B: QueryBuilder>(&self, builder: &mut B) {
        for step in self.joins.steps() {
            builder.add_join(step.parent_alias.as_deref(), &step.property, &step.alias);
        }
        for (name, value) in self.parameters.iter() {
            builder.bind_parameter(name, value);
        }
        if let Some(predicate) = &self.predicate {
            let predicate = predicate.build(builder);
            builder.where_clause(predicate);
        }
        for key in &self.order_by {
            let expr = key.scalar.build(builder);
            builder.order_by(expr, key.direction);
        }
        if let Some(first) = self.first_result {
            builder.set_first_result(first);
        }
        if let Some(max) = self.max_results {
            builder.set_max_results(max);
        }
        let selection = match &self.projection {
            Projection::All => Selection::All,
            Projection::Columns(columns) => {
                Selection::Columns(columns.iter().map(|c| c.build(builder)).collect())
            }
            Projection::Expand(items) => {
                Selection::Entities(items.iter().map(|item| item.alias.clone()).collect())
            }
        };
        builder.select(selection);
    }
}

/// Assembles query plans against one entity model.
pub struct QueryAssembler<'a> {
    metadata: &'a dyn MetadataResolver,
    config: &'a CompilerConfig,
}

impl<'a> QueryAssembler<'a> {
    pub fn new(metadata: &'a dyn MetadataResolver, config: &'a CompilerConfig) -> Self {
        Self { metadata, config }
    }

    /// Translate a complete option set for `entity`.
    #[instrument(skip(self, options))]
    pub fn assemble(&self, entity: &str, options: &QueryOptions) -> Result<QueryPlan> {
        let plan = self.begin(entity)?;
        let plan = self.apply_filter(plan, options.filter.as_ref())?;
        let plan = self.apply_order_by(plan, &options.order_by)?;
        let plan = self.apply_paging(plan, options.top.as_deref(), options.skip.as_deref())?;
        let plan =
            self.apply_projection(plan, options.select.as_deref(), options.expand.as_deref())?;
        debug!(
            joins = plan.joins.len(),
            parameters = plan.parameters.len(),
            "assembled query"
        );
        Ok(plan)
    }

    /// An empty plan over a known entity type.
    pub fn begin(&self, entity: &str) -> Result<QueryPlan> {
        if !self.metadata.has_entity_type(entity) {
            return Err(Error::UnknownEntity(entity.to_string()));
        }
        Ok(QueryPlan::new(entity, self.config.root_alias.clone()))
    }

    /// `$filter`.
    pub fn apply_filter(&self, mut plan: QueryPlan, filter: Option<&Expr>) -> Result<QueryPlan> {
        let Some(filter) = filter else {
            return Ok(plan);
        };
        let root = plan.root_entity.clone();
        let mut compiler = self.resume(&root, &mut plan);
        let predicate = compiler.compile_filter(filter)?;
        (plan.joins, plan.parameters) = compiler.finish();
        plan.predicate = Some(predicate);
        Ok(plan)
    }

    /// `$orderby`.
    pub fn apply_order_by(&self, mut plan: QueryPlan, keys: &[OrderKey]) -> Result<QueryPlan> {
        if keys.is_empty() {
            return Ok(plan);
        }
        let root = plan.root_entity.clone();
        let mut compiler = self.resume(&root, &mut plan);
        let order_by = keys
            .iter()
            .map(|key| compiler.compile_sort_key(key))
            .collect::<Result<Vec<_>>>()?;
        (plan.joins, plan.parameters) = compiler.finish();
        plan.order_by.extend(order_by);
        Ok(plan)
    }

    /// `$top` and `$skip`.
    pub fn apply_paging(
        &self,
        mut plan: QueryPlan,
        top: Option<&str>,
        skip: Option<&str>,
    ) -> Result<QueryPlan> {
        if let Some(skip) = skip {
            plan.first_result = Some(parse_paging("$skip", skip)?);
        }
        if let Some(top) = top {
            let mut top = parse_paging("$top", top)?;
            if let Some(max) = self.config.max_page_size {
                if top > max {
                    debug!(requested = top, max, "clamped $top");
                    top = max;
                }
            }
            plan.max_results = Some(top);
        }
        Ok(plan)
    }

    /// `$select` or `$expand`; supplying both is an error.
    pub fn apply_projection(
        &self,
        mut plan: QueryPlan,
        select: Option<&str>,
        expand: Option<&str>,
    ) -> Result<QueryPlan> {
        let root = plan.root_entity.clone();
        let projection = match (select, expand) {
            (Some(_), Some(_)) => return Err(Error::ConflictingProjection),
            (None, None) => return Ok(plan),
            (Some(select), None) => {
                let items = split_paths(select);
                if items.is_empty() || items.iter().any(|path| path == &["*"]) {
                    Projection::All
                } else {
                    let mut compiler = self.resume(&root, &mut plan);
                    let columns = items
                        .iter()
                        .map(|path| compiler.resolver().resolve_property(path))
                        .collect::<Result<Vec<_>>>()?;
                    (plan.joins, plan.parameters) = compiler.finish();
                    Projection::Columns(columns)
                }
            }
            (None, Some(expand)) => {
                let max = self.config.max_expand_depth;
                let mut compiler = self.resume(&root, &mut plan);
                let mut items = Vec::new();
                for path in split_paths(expand) {
                    if path.len() > max {
                        return Err(Error::ExpandTooDeep {
                            path: path.join("/"),
                            max,
                        });
                    }
                    let resolved = compiler.resolver().resolve(&path)?;
                    let alias = resolved.alias.unwrap_or_else(|| root.clone());
                    if !items.iter().any(|item: &ExpandItem| item.path == path) {
                        items.push(ExpandItem { path, alias });
                    }
                }
                (plan.joins, plan.parameters) = compiler.finish();
                Projection::Expand(items)
            }
        };
        plan.projection = projection;
        Ok(plan)
    }

    fn resume<'p>(&'p self, root: &'p str, plan: &mut QueryPlan) -> ExpressionCompiler<'p> {
        ExpressionCompiler::resume(
            self.metadata,
            root,
            self.config,
            mem::take(&mut plan.joins),
            mem::take(&mut plan.parameters),
        )
    }
}

fn parse_paging(option: &str, text: &str) -> Result<u64> {
    text.trim()
        .parse::<u64>()
        .map_err(|_| Error::InvalidPagingValue {
            option: option.to_string(),
            value: text.to_string(),
        })
}

/// Comma-separated, slash-delimited paths; blank items are ignored.
fn split_paths(text: &str) -> Vec<Vec<String>> {
    text.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| item.split('/').map(|s| s.trim().to_string()).collect())
        .collect()
}
