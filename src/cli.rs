// command line interface

use clap::{Parser, Subcommand, ValueEnum};
use miette::Result;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use crate::chart::{self, ChartType, Row};
use crate::diagram::{self, PlanNode, Schema};
use crate::files;
use crate::output::Output;
use crate::{BatchCheckResult, DEFAULT_BATCH_THRESHOLD, Error, Server, Validator, ValidatorConfig};

#[derive(Parser)]
#[command(
    name = "deepdive",
    about = "Validate SQL queries for safety, generate charts and schema diagrams"
)]
struct Cli {
    /// debug logging on stderr (RUST_LOG overrides)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate SQL queries for safety
    Validate {
        /// sql query to validate
        #[arg(long, short)]
        query: String,

        /// treat dangerous patterns as errors
        #[arg(long, env = "DEEPDIVE_STRICT")]
        strict: bool,

        /// check batch size implications
        #[arg(long)]
        check_batch: bool,

        /// estimated number of rows affected
        #[arg(long, default_value_t = 0)]
        estimated_rows: u64,

        /// row count above which a write is a batch operation
        #[arg(long, env = "DEEPDIVE_BATCH_THRESHOLD", default_value_t = DEFAULT_BATCH_THRESHOLD)]
        threshold: u64,

        /// print the result as json
        #[arg(long)]
        json: bool,
    },

    /// Generate charts from query results
    Chart {
        /// json file with an array of result rows
        #[arg(long)]
        data_file: PathBuf,

        /// output file path
        #[arg(long)]
        output: PathBuf,

        /// chart type (auto-detect if not specified)
        #[arg(long = "type", value_enum, default_value = "auto")]
        kind: ChartKind,

        /// output format, images fall back to a vega spec next to the output
        #[arg(long, value_enum, default_value = "png")]
        format: ChartFormat,

        #[arg(long)]
        title: Option<String>,

        #[arg(long, default_value_t = 800)]
        width: u32,

        #[arg(long, default_value_t = 400)]
        height: u32,
    },

    /// Generate Mermaid diagrams from database schemas
    Diagram {
        #[arg(value_enum)]
        kind: DiagramKind,

        /// schema json file
        #[arg(long)]
        schema_file: PathBuf,

        /// output path for the .mmd file
        #[arg(long)]
        output: PathBuf,

        /// comma separated tables for the erd
        #[arg(long, value_delimiter = ',')]
        tables: Option<Vec<String>>,

        /// table to focus the lineage diagram on
        #[arg(long)]
        table: Option<String>,

        /// plan json for the query-plan diagram
        #[arg(long)]
        query_plan_file: Option<PathBuf>,
    },

    /// start as http server
    Serve {
        /// port number
        #[arg(long, short, default_value = "3000")]
        port: u16,

        /// host to bind
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// default strictness for requests that don't set it
        #[arg(long, env = "DEEPDIVE_STRICT")]
        strict: bool,

        #[arg(long, env = "DEEPDIVE_BATCH_THRESHOLD", default_value_t = DEFAULT_BATCH_THRESHOLD)]
        threshold: u64,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ChartKind {
    Auto,
    Bar,
    Line,
    Pie,
    Scatter,
    Area,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ChartFormat {
    Png,
    Svg,
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
enum DiagramKind {
    Schema,
    Erd,
    Lineage,
    QueryPlan,
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    // stdout is for results, logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

pub async fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Validate {
            query,
            strict,
            check_batch,
            estimated_rows,
            threshold,
            json,
        } => {
            let config = ValidatorConfig {
                strict,
                batch_threshold: threshold,
            };
            Ok(run_validate(&query, &config, check_batch, estimated_rows, json))
        }

        Commands::Chart {
            data_file,
            output,
            kind,
            format,
            title,
            width,
            height,
        } => run_chart(&data_file, &output, kind, format, title, width, height),

        Commands::Diagram {
            kind,
            schema_file,
            output,
            tables,
            table,
            query_plan_file,
        } => run_diagram(
            kind,
            &schema_file,
            &output,
            tables.as_deref(),
            table.as_deref(),
            query_plan_file.as_deref(),
        ),

        Commands::Serve {
            port,
            host,
            strict,
            threshold,
        } => {
            let config = ValidatorConfig {
                strict,
                batch_threshold: threshold,
            };
            Server::run(config, &host, port).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn run_validate(
    query: &str,
    config: &ValidatorConfig,
    check_batch: bool,
    estimated_rows: u64,
    json: bool,
) -> ExitCode {
    let mut result = Validator::from_config(config).validate(query);

    if check_batch && estimated_rows > 0 {
        let batch = BatchCheckResult::with_threshold(query, estimated_rows, config.batch_threshold);
        for message in batch.messages() {
            result.push_warning(message);
        }
    }

    if json {
        Output::raw(&result);
    } else {
        Output::pretty(&result);
    }

    if result.is_valid {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

// missing or malformed input files are reported on stdout with exit 1,
// anything else is a real error
fn report_input_error(what: &str, err: Error) -> Result<ExitCode> {
    match err {
        Error::NotFound(path) => {
            println!("✗ {what} file not found: {}", path.display());
            Ok(ExitCode::FAILURE)
        }
        Error::Json { path, .. } => {
            println!("✗ Invalid JSON in {} file: {}", what.to_lowercase(), path.display());
            Ok(ExitCode::FAILURE)
        }
        other => Err(other.into()),
    }
}

fn run_chart(
    data_file: &Path,
    output: &Path,
    kind: ChartKind,
    format: ChartFormat,
    title: Option<String>,
    width: u32,
    height: u32,
) -> Result<ExitCode> {
    let rows: Vec<Row> = match files::read_json(data_file) {
        Ok(rows) => rows,
        Err(e) => return report_input_error("Data", e),
    };

    if rows.is_empty() {
        println!("⚠ No data to chart");
        return Ok(ExitCode::SUCCESS);
    }

    let chart_type = match kind {
        ChartKind::Auto => chart::detect_chart_type(&rows),
        ChartKind::Bar => ChartType::Bar,
        ChartKind::Line => ChartType::Line,
        ChartKind::Pie => ChartType::Pie,
        ChartKind::Scatter => ChartType::Scatter,
        ChartKind::Area => ChartType::Area,
    };
    println!("Chart type: {chart_type}");

    let title = title.unwrap_or_else(|| chart::title_from_path(output));

    let Some(spec) = chart::build_vega_spec(&rows, chart_type, &title, width, height) else {
        println!("✗ Could not build chart specification");
        return Ok(ExitCode::FAILURE);
    };

    let text = serde_json::to_string_pretty(&spec)
        .map_err(|e| Error::Chart(e.to_string()))?;

    // no renderer here, so image formats get the spec next to the requested path
    let spec_path = if format == ChartFormat::Json {
        output.to_path_buf()
    } else {
        output.with_extension("json")
    };
    files::write_file(&spec_path, &text)?;
    println!("✓ Vega spec saved: {}", spec_path.display());

    if format != ChartFormat::Json {
        println!("⚠ Could not render image. Vega spec saved for manual rendering.");
    }

    Ok(ExitCode::SUCCESS)
}

fn run_diagram(
    kind: DiagramKind,
    schema_file: &Path,
    output: &Path,
    tables: Option<&[String]>,
    table: Option<&str>,
    query_plan_file: Option<&Path>,
) -> Result<ExitCode> {
    let schema: Schema = match files::read_json(schema_file) {
        Ok(schema) => schema,
        Err(e) => return report_input_error("Schema", e),
    };

    let mermaid = match kind {
        DiagramKind::Schema | DiagramKind::Erd => diagram::generate_erd(&schema, tables),
        DiagramKind::Lineage => diagram::generate_lineage(&schema, table),
        DiagramKind::QueryPlan => {
            let Some(plan_file) = query_plan_file else {
                println!("✗ --query-plan-file required for query-plan type");
                return Ok(ExitCode::FAILURE);
            };
            let plan: Option<PlanNode> = match files::read_json(plan_file) {
                Ok(plan) => plan,
                Err(e) => return report_input_error("Query plan", e),
            };
            diagram::generate_query_plan(plan.as_ref())
        }
    };

    files::write_file(output, &mermaid)?;
    println!("✓ Generated: {}", output.display());

    Ok(ExitCode::SUCCESS)
}
