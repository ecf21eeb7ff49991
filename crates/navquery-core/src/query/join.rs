//! Association-path resolution.
//!
//! Every navigation prefix referenced anywhere in a query maps to exactly one
//! join alias. The resolver walks a path segment by segment, registers a join
//! for each prefix it has not seen, and memoizes the result in a [`JoinPlan`].

use std::collections::HashMap;

use navquery_proto::MetadataResolver;
use serde::Serialize;
use tracing::debug;

use crate::config::CompilerConfig;
use crate::error::{Error, Result};
use crate::query::ir::Scalar;

/// One join: `parent_alias.property` reached under `alias`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JoinStep {
    /// Navigation segments from the root up to and including this join.
    pub path: Vec<String>,
    /// Alias of the parent; `None` for the unaliased root.
    pub parent_alias: Option<String>,
    /// Navigation property followed from the parent.
    pub property: String,
    /// Alias assigned to this join.
    pub alias: String,
    /// Entity type reached by this join.
    pub target_entity: String,
}

/// Ordered, deduplicated joins keyed by navigation prefix.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct JoinPlan {
    steps: Vec<JoinStep>,
    #[serde(skip)]
    index: HashMap<Vec<String>, usize>,
}

impl JoinPlan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Joins in registration order; a parent always precedes its children.
    pub fn steps(&self) -> &[JoinStep] {
        &self.steps
    }

    /// The join registered for a navigation prefix.
    pub fn get(&self, path: &[String]) -> Option<&JoinStep> {
        self.index.get(path).map(|&i| &self.steps[i])
    }

    /// The alias registered for a navigation prefix.
    pub fn alias_for(&self, path: &[&str]) -> Option<&str> {
        let key: Vec<String> = path.iter().map(|s| s.to_string()).collect();
        self.get(&key).map(|step| step.alias.as_str())
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    fn alias_in_use(&self, alias: &str) -> bool {
        self.steps.iter().any(|s| s.alias == alias)
    }

    fn push(&mut self, step: JoinStep) {
        self.index.insert(step.path.clone(), self.steps.len());
        self.steps.push(step);
    }
}

/// A navigation prefix after resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    /// Alias qualifying columns of the reached entity.
    pub alias: Option<String>,
    /// Entity type reached.
    pub entity: String,
}

/// Resolves navigation paths against the entity model, registering joins.
pub struct JoinResolver<'a> {
    metadata: &'a dyn MetadataResolver,
    root_entity: &'a str,
    config: &'a CompilerConfig,
    plan: JoinPlan,
}

impl<'a> JoinResolver<'a> {
    pub fn new(
        metadata: &'a dyn MetadataResolver,
        root_entity: &'a str,
        config: &'a CompilerConfig,
    ) -> Self {
        Self::with_plan(metadata, root_entity, config, JoinPlan::new())
    }

    /// Continue resolving on top of joins registered by an earlier pass.
    pub fn with_plan(
        metadata: &'a dyn MetadataResolver,
        root_entity: &'a str,
        config: &'a CompilerConfig,
        plan: JoinPlan,
    ) -> Self {
        Self {
            metadata,
            root_entity,
            config,
            plan,
        }
    }

    pub fn metadata(&self) -> &'a dyn MetadataResolver {
        self.metadata
    }

    /// Resolve a chain of navigation segments to the alias of its last
    /// prefix. An empty chain resolves to the root.
    pub fn resolve(&mut self, segments: &[String]) -> Result<ResolvedPath> {
        let mut current = ResolvedPath {
            alias: self.config.root_alias.clone(),
            entity: self.root_entity.to_string(),
        };

        for len in 1..=segments.len() {
            let prefix = &segments[..len];
            if let Some(step) = self.plan.get(prefix) {
                current = ResolvedPath {
                    alias: Some(step.alias.clone()),
                    entity: step.target_entity.clone(),
                };
                continue;
            }

            let segment = &segments[len - 1];
            if !self.metadata.is_navigation_property(&current.entity, segment) {
                return Err(Error::UnknownNavigationProperty {
                    entity: current.entity,
                    property: segment.clone(),
                });
            }
            let target = self
                .metadata
                .target_entity_type(&current.entity, segment)
                .ok_or_else(|| Error::UnknownNavigationProperty {
                    entity: current.entity.clone(),
                    property: segment.clone(),
                })?;

            let alias = self.alias_for(prefix);
            debug!(
                parent = current.alias.as_deref().unwrap_or("<root>"),
                property = %segment,
                alias = %alias,
                "registered join"
            );
            self.plan.push(JoinStep {
                path: prefix.to_vec(),
                parent_alias: current.alias,
                property: segment.clone(),
                alias: alias.clone(),
                target_entity: target.clone(),
            });
            current = ResolvedPath {
                alias: Some(alias),
                entity: target,
            };
        }

        Ok(current)
    }

    /// Resolve a property path to a column.
    ///
    /// The last segment must be a scalar property of the entity reached by
    /// the preceding navigations, or a navigation backed by a foreign key
    /// column, in which case that column is returned.
    pub fn resolve_property(&mut self, path: &[String]) -> Result<Scalar> {
        let Some((last, navigations)) = path.split_last() else {
            return Err(Error::UnknownProperty {
                entity: self.root_entity.to_string(),
                property: String::new(),
            });
        };
        let owner = self.resolve(navigations)?;

        if self.metadata.is_scalar_property(&owner.entity, last) {
            return Ok(Scalar::column(owner.alias.as_deref(), last.clone()));
        }
        if self.metadata.is_navigation_property(&owner.entity, last) {
            if let Some(column) = self.metadata.foreign_key_column(&owner.entity, last) {
                return Ok(Scalar::column(owner.alias.as_deref(), column));
            }
        }
        Err(Error::UnknownProperty {
            entity: owner.entity,
            property: last.clone(),
        })
    }

    /// The joins registered so far.
    pub fn plan(&self) -> &JoinPlan {
        &self.plan
    }

    pub fn into_plan(self) -> JoinPlan {
        self.plan
    }

    /// `segment_segment..._suffix`, disambiguated with a counter when a
    /// different prefix or the root already uses the same alias.
    fn alias_for(&self, prefix: &[String]) -> String {
        let base = format!("{}{}", prefix.join("_"), self.config.alias_suffix);
        if !self.alias_taken(&base) {
            return base;
        }
        (2..)
            .map(|n| format!("{}{}", base, n))
            .find(|candidate| !self.alias_taken(candidate))
            .unwrap_or(base)
    }

    fn alias_taken(&self, alias: &str) -> bool {
        self.config.root_alias.as_deref() == Some(alias) || self.plan.alias_in_use(alias)
    }
}
