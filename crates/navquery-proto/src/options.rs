//! Query options as handed to assembly.

use serde::{Deserialize, Serialize};

use crate::expr::Expr;

/// Sort direction of an order key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// One `$orderby` key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderKey {
    pub expr: Expr,
    #[serde(default)]
    pub direction: SortDirection,
}

impl OrderKey {
    pub fn asc(expr: Expr) -> Self {
        Self {
            expr,
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(expr: Expr) -> Self {
        Self {
            expr,
            direction: SortDirection::Desc,
        }
    }
}

/// The option set of a single query.
///
/// `$filter` and `$orderby` arrive already parsed and typed. Paging and
/// projection options are kept as raw text; assembly validates them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryOptions {
    pub filter: Option<Expr>,
    pub order_by: Vec<OrderKey>,
    pub select: Option<String>,
    pub expand: Option<String>,
    pub top: Option<String>,
    pub skip: Option<String>,
}

impl QueryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_filter(mut self, filter: Expr) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn with_order_key(mut self, key: OrderKey) -> Self {
        self.order_by.push(key);
        self
    }

    pub fn with_select(mut self, select: impl Into<String>) -> Self {
        self.select = Some(select.into());
        self
    }

    pub fn with_expand(mut self, expand: impl Into<String>) -> Self {
        self.expand = Some(expand.into());
        self
    }

    pub fn with_top(mut self, top: impl Into<String>) -> Self {
        self.top = Some(top.into());
        self
    }

    pub fn with_skip(mut self, skip: impl Into<String>) -> Self {
        self.skip = Some(skip.into());
        self
    }

    /// Decode an option set from JSON.
    pub fn from_json(json: &str) -> Result<Self, crate::Error> {
        Ok(serde_json::from_str(json)?)
    }
}
