//! Output formatters for compiled plans.

use clap::ValueEnum;
use comfy_table::{Cell, Table};
use navquery_core::builder::SelectStatement;
use navquery_core::QueryPlan;

/// Output format for results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// ASCII table format
    Table,
    /// JSON format
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Trait for formatting output.
pub trait Formatter: Send + Sync {
    /// Format a compiled plan and the statement it produced.
    fn format_plan(&self, plan: &QueryPlan, statement: &SelectStatement) -> String;

    /// Format the entity types of a schema.
    fn format_schema(&self, entities: &[String]) -> String;
}

/// Create a formatter for the given output format.
pub fn create_formatter(format: OutputFormat) -> Box<dyn Formatter> {
    match format {
        OutputFormat::Table => Box::new(TableFormatter),
        OutputFormat::Json => Box::new(JsonFormatter),
    }
}

/// Table formatter using comfy-table.
pub struct TableFormatter;

impl Formatter for TableFormatter {
    fn format_plan(&self, plan: &QueryPlan, statement: &SelectStatement) -> String {
        let mut sections = vec![statement.to_string()];

        if !plan.joins.is_empty() {
            let mut table = Table::new();
            table.set_header(vec!["Path", "Parent", "Property", "Alias", "Entity"]);
            for step in plan.joins.steps() {
                table.add_row(vec![
                    Cell::new(step.path.join("/")),
                    Cell::new(step.parent_alias.as_deref().unwrap_or("-")),
                    Cell::new(&step.property),
                    Cell::new(&step.alias),
                    Cell::new(&step.target_entity),
                ]);
            }
            sections.push(table.to_string());
        }

        if !plan.parameters.is_empty() {
            let mut table = Table::new();
            table.set_header(vec!["Parameter", "Type", "Value"]);
            for (name, value) in plan.parameters.iter() {
                table.add_row(vec![
                    Cell::new(name),
                    Cell::new(value.edm_type()),
                    Cell::new(value),
                ]);
            }
            sections.push(table.to_string());
        }

        sections.join("\n\n")
    }

    fn format_schema(&self, entities: &[String]) -> String {
        let mut table = Table::new();
        table.set_header(vec!["Entity"]);

        for entity in entities {
            table.add_row(vec![entity]);
        }

        table.to_string()
    }
}

/// JSON formatter.
pub struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn format_plan(&self, plan: &QueryPlan, statement: &SelectStatement) -> String {
        let output = serde_json::json!({
            "statement": statement.to_string(),
            "plan": plan,
        });
        serde_json::to_string_pretty(&output).unwrap_or_else(|_| "{}".to_string())
    }

    fn format_schema(&self, entities: &[String]) -> String {
        serde_json::json!({ "entities": entities }).to_string()
    }
}
