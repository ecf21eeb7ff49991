//! Query option compilation.

use std::path::Path;

use navquery_core::catalog::SchemaBundle;
use navquery_core::{CompilerConfig, CriteriaBuilder, QueryAssembler};
use navquery_proto::QueryOptions;
use thiserror::Error;
use tracing::info;

use crate::formatter::Formatter;

/// Execution errors.
#[derive(Debug, Error)]
pub enum ExecuteError {
    /// A file could not be read.
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid JSON.
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    /// Parse or type error in `$filter` or `$orderby`, rendered with its
    /// source line.
    #[error("{0}")]
    Language(String),

    /// Schema or compilation error.
    #[error(transparent)]
    Compile(#[from] navquery_core::Error),
}

/// The query options given on the command line.
#[derive(Debug, Clone, Default)]
pub struct Request {
    pub entity: String,
    pub filter: Option<String>,
    pub orderby: Option<String>,
    pub select: Option<String>,
    pub expand: Option<String>,
    pub top: Option<String>,
    pub skip: Option<String>,
}

pub fn load_schema(path: &Path) -> Result<SchemaBundle, ExecuteError> {
    let json = read(path)?;
    Ok(SchemaBundle::from_json(&json)?)
}

/// Load a configuration file, or the defaults when none is given.
pub fn load_config(path: Option<&Path>) -> Result<CompilerConfig, ExecuteError> {
    match path {
        Some(path) => Ok(CompilerConfig::from_json(&read(path)?)?),
        None => Ok(CompilerConfig::default()),
    }
}

fn read(path: &Path) -> Result<String, ExecuteError> {
    std::fs::read_to_string(path).map_err(|source| ExecuteError::Io {
        path: path.display().to_string(),
        source,
    })
}

/// Compile a request and return formatted output.
pub fn execute(
    schema: &SchemaBundle,
    config: &CompilerConfig,
    request: &Request,
    formatter: &dyn Formatter,
) -> Result<String, ExecuteError> {
    let options = parse_options(schema, request)?;
    let plan = QueryAssembler::new(schema, config).assemble(&request.entity, &options)?;

    let mut builder = CriteriaBuilder::new(&plan.root_entity, plan.root_alias.clone());
    plan.apply(&mut builder);
    info!(
        entity = %request.entity,
        joins = plan.joins.len(),
        parameters = plan.parameters.len(),
        "compiled query"
    );

    Ok(formatter.format_plan(&plan, builder.statement()))
}

fn parse_options(schema: &SchemaBundle, request: &Request) -> Result<QueryOptions, ExecuteError> {
    let mut options = QueryOptions::new();
    if let Some(source) = &request.filter {
        let expr = navquery_lang::parse_and_compile_filter(source, schema, &request.entity)
            .map_err(|e| ExecuteError::Language(e.format_with_source(source)))?;
        options.filter = Some(expr);
    }
    if let Some(source) = &request.orderby {
        options.order_by =
            navquery_lang::parse_and_compile_orderby(source, schema, &request.entity)
                .map_err(|e| ExecuteError::Language(e.format_with_source(source)))?;
    }
    options.select = request.select.clone();
    options.expand = request.expand.clone();
    options.top = request.top.clone();
    options.skip = request.skip.clone();
    Ok(options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formatter::{create_formatter, OutputFormat};

    const SCHEMA: &str = r#"{
        "entities": [
            {"name": "Customer", "key": "id", "fields": [
                {"name": "id", "type": "Int64"},
                {"name": "status", "type": "String"}
            ]},
            {"name": "Order", "key": "id", "fields": [
                {"name": "id", "type": "Int64"},
                {"name": "total", "type": "Decimal"},
                {"name": "customer_id", "type": "Int64"}
            ]}
        ],
        "relations": [
            {"name": "orders", "from_entity": "Customer", "to_entity": "Order",
             "cardinality": "one_to_many", "from_field": "id", "to_field": "customer_id"}
        ]
    }"#;

    fn request(filter: &str) -> Request {
        Request {
            entity: "Customer".into(),
            filter: Some(filter.into()),
            ..Request::default()
        }
    }

    #[test]
    fn test_execute_json() {
        let schema = SchemaBundle::from_json(SCHEMA).unwrap();
        let formatter = create_formatter(OutputFormat::Json);
        let output = execute(
            &schema,
            &CompilerConfig::default(),
            &request("orders/total gt 100 and status eq 'open'"),
            &*formatter,
        )
        .unwrap();

        let json: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(
            json["statement"],
            "select Customer join orders orders_alias \
             where and(gt(orders_alias.total, :p0), eq(status, :p1))"
        );
        assert_eq!(json["plan"]["parameters"]["p1"]["value"], "open");
    }

    #[test]
    fn test_parse_error_shows_source() {
        let schema = SchemaBundle::from_json(SCHEMA).unwrap();
        let formatter = create_formatter(OutputFormat::Table);
        let err = execute(
            &schema,
            &CompilerConfig::default(),
            &request("status eq"),
            &*formatter,
        )
        .unwrap_err();
        assert!(matches!(err, ExecuteError::Language(ref text) if text.contains("status eq")));
    }

    #[test]
    fn test_compile_error() {
        let schema = SchemaBundle::from_json(SCHEMA).unwrap();
        let formatter = create_formatter(OutputFormat::Table);
        let mut request = request("status eq 'a'");
        request.top = Some("many".into());
        let err = execute(&schema, &CompilerConfig::default(), &request, &*formatter).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid value 'many' for $top: expected a non-negative integer"
        );
    }

    #[test]
    fn test_missing_file() {
        let err = load_schema(Path::new("/nonexistent/schema.json")).unwrap_err();
        assert!(matches!(err, ExecuteError::Io { .. }));
        assert!(load_config(None).is_ok());
    }
}
