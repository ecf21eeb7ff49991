//! navquery command-line tool
//!
//! Compiles a set of OData-style query options against a JSON schema and
//! prints the resulting joins, parameters and statement.

mod executor;
mod formatter;

use clap::Parser;
use formatter::OutputFormat;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// navquery command-line tool
#[derive(Parser, Debug)]
#[command(name = "navquery")]
#[command(version, about = "Compile OData-style query options into a query plan")]
pub struct Args {
    /// Schema file (JSON)
    #[arg(short, long)]
    pub schema: PathBuf,

    /// Compiler configuration file (JSON)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Root entity type; lists the entity types when omitted
    #[arg(short, long)]
    pub entity: Option<String>,

    /// $filter expression
    #[arg(long)]
    pub filter: Option<String>,

    /// $orderby list
    #[arg(long)]
    pub orderby: Option<String>,

    /// $select list
    #[arg(long)]
    pub select: Option<String>,

    /// $expand list
    #[arg(long)]
    pub expand: Option<String>,

    /// $top
    #[arg(long)]
    pub top: Option<String>,

    /// $skip
    #[arg(long)]
    pub skip: Option<String>,

    /// Output format
    #[arg(long, default_value = "table", value_enum)]
    pub format: OutputFormat,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("navquery=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    match run(args) {
        Ok(output) => println!("{}", output),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn run(args: Args) -> Result<String, executor::ExecuteError> {
    let schema = executor::load_schema(&args.schema)?;
    let config = executor::load_config(args.config.as_deref())?;
    let formatter = formatter::create_formatter(args.format);

    let Some(entity) = args.entity else {
        let names: Vec<String> = schema.entity_names().into_iter().map(String::from).collect();
        return Ok(formatter.format_schema(&names));
    };

    let request = executor::Request {
        entity,
        filter: args.filter,
        orderby: args.orderby,
        select: args.select,
        expand: args.expand,
        top: args.top,
        skip: args.skip,
    };
    executor::execute(&schema, &config, &request, &*formatter)
}
