//! carrier-pivot CLI - Pivot motor-carrier safety records
//!
//! Usage:
//!   carrier-pivot fields [file.json]
//!   carrier-pivot pivot [file.json] [-r <field>]... [-c <field>]... [-v <field>] [-a sum|count] [-b none|year|month|week]
//!   carrier-pivot series [file.json] --field <field> [-b month]
//!
//! Examples:
//!   carrier-pivot pivot carriers.json -r Entity -c "Operating status" -v "Power units"
//!   carrier-pivot pivot carriers.json -r "Created_DT" -a count -b month -f State=TX
//!   carrier-pivot series carriers.json --field "Out of service date" -b month

use clap::{Parser, Subcommand, ValueEnum};
use serde_json::json;
use std::fmt::Display;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use carrier_pivot::config::Settings;
use carrier_pivot::controller::PivotController;
use carrier_pivot::filter::RowFilter;
use carrier_pivot::model::{is_date_like, Dataset};
use carrier_pivot::pivot::{
    bucket_series, is_numeric_field, Aggregation, DateBucket, PivotSpec,
};
use carrier_pivot::worker::{WorkerClient, WorkerError};

const NOT_SUMMABLE: &str = "The selected value column contains non-numeric data, which cannot be summed. \
Please select a numeric column or use \"Count\" as the aggregation method.";

#[derive(Parser)]
#[command(name = "carrier-pivot")]
#[command(about = "carrier-pivot - Pivot aggregation over motor-carrier safety records")]
#[command(version)]
struct Cli {
    /// Settings file (defaults to CARRIER_PIVOT_CONFIG, ./carrier-pivot.toml, then the user config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List dataset fields with date-likeness and sum eligibility
    Fields {
        /// Path to a JSON row file (defaults to [dataset] path)
        file: Option<PathBuf>,
    },

    /// Pivot-aggregate the dataset
    Pivot {
        /// Path to a JSON row file (defaults to [dataset] path)
        file: Option<PathBuf>,

        /// Row dimension (repeatable, in order)
        #[arg(short, long = "row")]
        rows: Vec<String>,

        /// Column dimension (repeatable, in order)
        #[arg(short, long = "column")]
        columns: Vec<String>,

        /// Drop the configured column dimensions
        #[arg(long, conflicts_with = "columns")]
        no_columns: bool,

        /// Value field summed per cell
        #[arg(short, long)]
        value: Option<String>,

        /// Aggregation function
        #[arg(short, long)]
        aggregation: Option<AggregationArg>,

        /// Date bucket for date-like dimensions
        #[arg(short, long)]
        bucket: Option<BucketArg>,

        /// Field filter as FIELD=TEXT (repeatable)
        #[arg(short, long = "filter")]
        filters: Vec<String>,

        /// Free-text search across all fields
        #[arg(short, long)]
        search: Option<String>,

        /// Output format
        #[arg(short, long, default_value = "text")]
        output: OutputFormat,
    },

    /// Count rows per date bucket of one field
    Series {
        /// Path to a JSON row file (defaults to [dataset] path)
        file: Option<PathBuf>,

        /// Field to bucket
        #[arg(long)]
        field: String,

        /// Date bucket
        #[arg(short, long, default_value = "month")]
        bucket: BucketArg,

        /// Output format
        #[arg(short, long, default_value = "text")]
        output: OutputFormat,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum AggregationArg {
    Sum,
    Count,
}

impl From<AggregationArg> for Aggregation {
    fn from(arg: AggregationArg) -> Self {
        match arg {
            AggregationArg::Sum => Aggregation::Sum,
            AggregationArg::Count => Aggregation::Count,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum BucketArg {
    None,
    Year,
    Month,
    Week,
}

impl From<BucketArg> for DateBucket {
    fn from(arg: BucketArg) -> Self {
        match arg {
            BucketArg::None => DateBucket::None,
            BucketArg::Year => DateBucket::Year,
            BucketArg::Month => DateBucket::Month,
            BucketArg::Week => DateBucket::Week,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Aligned text table
    Text,
    /// Pretty-printed JSON
    Json,
}

struct PivotArgs {
    rows: Vec<String>,
    columns: Vec<String>,
    no_columns: bool,
    value: Option<String>,
    aggregation: Option<AggregationArg>,
    bucket: Option<BucketArg>,
    filters: Vec<String>,
    search: Option<String>,
    output: OutputFormat,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => Settings::from_file(path),
        None => Settings::load(),
    };
    let settings = match settings {
        Ok(s) => s,
        Err(e) => return fail("Error loading settings", e),
    };
    init_tracing(&settings);

    match cli.command {
        Commands::Fields { file } => cmd_fields(&settings, file),
        Commands::Pivot {
            file,
            rows,
            columns,
            no_columns,
            value,
            aggregation,
            bucket,
            filters,
            search,
            output,
        } => {
            let args = PivotArgs {
                rows,
                columns,
                no_columns,
                value,
                aggregation,
                bucket,
                filters,
                search,
                output,
            };
            cmd_pivot(&settings, file, args).await
        }
        Commands::Series {
            file,
            field,
            bucket,
            output,
        } => cmd_series(&settings, file, &field, bucket.into(), output),
    }
}

fn init_tracing(settings: &Settings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.logging.filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn fail(context: &str, err: impl Display) -> ExitCode {
    eprintln!("{}: {}", context, err);
    ExitCode::FAILURE
}

fn load_dataset(settings: &Settings, file: Option<PathBuf>) -> Result<Dataset, ExitCode> {
    let path = settings
        .dataset_path(file)
        .map_err(|e| fail("Error", e))?;
    let dataset = Dataset::from_path(&path)
        .map_err(|e| fail(&format!("Error loading '{}'", path.display()), e))?;
    Ok(dataset.with_date_format(&settings.dataset.date_format))
}

fn cmd_fields(settings: &Settings, file: Option<PathBuf>) -> ExitCode {
    let dataset = match load_dataset(settings, file) {
        Ok(d) => d,
        Err(code) => return code,
    };

    println!("{} rows, {} fields", dataset.len(), dataset.schema().len());
    println!();
    for field in dataset.schema().fields() {
        let summable = is_numeric_field(&dataset, field).unwrap_or(false);
        let mut tags = Vec::new();
        if is_date_like(field) {
            tags.push("date");
        }
        if summable {
            tags.push("sum");
        }
        if tags.is_empty() {
            println!("  - {}", field);
        } else {
            println!("  - {} ({})", field, tags.join(", "));
        }
    }
    ExitCode::SUCCESS
}

async fn cmd_pivot(settings: &Settings, file: Option<PathBuf>, args: PivotArgs) -> ExitCode {
    let dataset = match load_dataset(settings, file) {
        Ok(d) => d,
        Err(code) => return code,
    };

    let spec = match build_spec(settings, &args) {
        Ok(spec) => spec,
        Err(e) => return fail("Invalid pivot", e),
    };

    // Eligibility is a property of the whole column, so check before filtering.
    if spec.aggregation == Aggregation::Sum {
        match is_numeric_field(&dataset, &spec.value_field) {
            Ok(true) => {}
            Ok(false) => return fail("Error", NOT_SUMMABLE),
            Err(e) => return fail("Invalid pivot", e),
        }
    }

    let filter = match build_filter(&args) {
        Ok(filter) => filter,
        Err(e) => return fail("Invalid filter", e),
    };
    let rows = match filter.apply(&dataset) {
        Ok(rows) => rows,
        Err(e) => return fail("Invalid filter", e),
    };

    let client = match WorkerClient::with_settings(&settings.worker) {
        Ok(client) => client,
        Err(e) => return fail("Error starting worker", e),
    };
    let mut controller = match PivotController::new(client, rows, spec) {
        Ok(controller) => controller,
        Err(e) => return fail("Invalid pivot", e),
    };

    let timeout = settings.worker.timeout();
    let view = match tokio::time::timeout(timeout, controller.settle()).await {
        Ok(view) => view,
        Err(_) => {
            let err = WorkerError::Timeout(timeout.as_secs());
            return fail(failure_context(&err), err);
        }
    };
    if let Some(err) = view.error {
        return fail(failure_context(err), err);
    }

    let grid = view.grid();
    match args.output {
        OutputFormat::Text => print!("{}", grid),
        OutputFormat::Json => {
            let out = json!({
                "spec": view.spec,
                "result": view.result,
                "axes": view.axes,
                "grid": grid,
            });
            match serde_json::to_string_pretty(&out) {
                Ok(s) => println!("{}", s),
                Err(e) => return fail("Error writing output", e),
            }
        }
    }
    ExitCode::SUCCESS
}

fn failure_context(err: &WorkerError) -> &'static str {
    if err.is_retriable() {
        "Pivot failed (retrying may succeed)"
    } else {
        "Pivot failed"
    }
}

/// Overlay command-line flags on the `[pivot]` settings.
fn build_spec(settings: &Settings, args: &PivotArgs) -> Result<PivotSpec, String> {
    let mut spec = settings.pivot.to_spec().map_err(|e| e.to_string())?;
    if !args.rows.is_empty() {
        spec.row_dimensions = args.rows.clone();
    }
    if args.no_columns {
        spec.column_dimensions.clear();
    } else if !args.columns.is_empty() {
        spec.column_dimensions = args.columns.clone();
    }
    if let Some(value) = &args.value {
        spec.value_field = value.clone();
    }
    if let Some(aggregation) = args.aggregation {
        spec.aggregation = aggregation.into();
    }
    if let Some(bucket) = args.bucket {
        spec.date_bucket = bucket.into();
    }
    Ok(spec)
}

fn build_filter(args: &PivotArgs) -> Result<RowFilter, String> {
    let mut filter = RowFilter::new();
    for raw in &args.filters {
        let (field, needle) = raw
            .split_once('=')
            .ok_or_else(|| format!("expected FIELD=TEXT, got '{}'", raw))?;
        filter.set_field(field.trim(), needle);
    }
    if let Some(search) = &args.search {
        filter.set_search(search.as_str());
    }
    Ok(filter)
}

fn cmd_series(
    settings: &Settings,
    file: Option<PathBuf>,
    field: &str,
    bucket: DateBucket,
    output: OutputFormat,
) -> ExitCode {
    let dataset = match load_dataset(settings, file) {
        Ok(d) => d,
        Err(code) => return code,
    };

    let points = match bucket_series(&dataset, field, bucket) {
        Ok(points) => points,
        Err(e) => return fail("Invalid series", e),
    };

    match output {
        OutputFormat::Text => {
            let width = points
                .iter()
                .map(|p| p.label.chars().count())
                .max()
                .unwrap_or(0);
            for point in &points {
                println!("{:<width$}  {}", point.label, point.count, width = width);
            }
        }
        OutputFormat::Json => match serde_json::to_string_pretty(&points) {
            Ok(s) => println!("{}", s),
            Err(e) => return fail("Error writing output", e),
        },
    }
    ExitCode::SUCCESS
}
