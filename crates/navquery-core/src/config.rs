//! Compiler configuration.

use serde::Deserialize;
use std::collections::BTreeSet;

/// Default bound on expression nesting.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Default prefix of generated parameter names.
pub const DEFAULT_PARAMETER_PREFIX: &str = "p";

/// Default suffix appended to join aliases.
pub const DEFAULT_ALIAS_SUFFIX: &str = "_alias";

/// Default bound on `$expand` path length.
pub const DEFAULT_MAX_EXPAND_DEPTH: usize = 4;

/// Settings shared by the expression compiler and query assembly.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// Maximum nesting depth of a compiled expression.
    pub max_depth: usize,

    /// Prefix of generated parameter names (`p` gives `p0`, `p1`, ...).
    pub parameter_prefix: String,

    /// Parameter names the binder must never generate.
    pub reserved_parameters: BTreeSet<String>,

    /// Suffix appended to every join alias.
    pub alias_suffix: String,

    /// Alias qualifying root-entity columns. Unqualified when `None`.
    pub root_alias: Option<String>,

    /// Upper bound applied to `$top`. Unbounded when `None`.
    pub max_page_size: Option<u64>,

    /// Maximum number of segments in an `$expand` path.
    pub max_expand_depth: usize,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            parameter_prefix: DEFAULT_PARAMETER_PREFIX.to_string(),
            reserved_parameters: BTreeSet::new(),
            alias_suffix: DEFAULT_ALIAS_SUFFIX.to_string(),
            root_alias: None,
            max_page_size: None,
            max_expand_depth: DEFAULT_MAX_EXPAND_DEPTH,
        }
    }
}

impl CompilerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a configuration from JSON. Missing keys take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth.max(1);
        self
    }

    pub fn with_parameter_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.parameter_prefix = prefix.into();
        self
    }

    /// Reserve a parameter name, e.g. one the caller binds itself.
    pub fn with_reserved_parameter(mut self, name: impl Into<String>) -> Self {
        self.reserved_parameters.insert(name.into());
        self
    }

    pub fn with_alias_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.alias_suffix = suffix.into();
        self
    }

    pub fn with_root_alias(mut self, alias: impl Into<String>) -> Self {
        self.root_alias = Some(alias.into());
        self
    }

    pub fn with_max_page_size(mut self, size: u64) -> Self {
        self.max_page_size = Some(size);
        self
    }

    pub fn with_max_expand_depth(mut self, depth: usize) -> Self {
        self.max_expand_depth = depth;
        self
    }
}
