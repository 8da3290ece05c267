use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use flowcal_excel::sync;
use flowcal_excel::{ExcelError, Result};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    if let Err(error) = init_tracing().and_then(|()| run(cli)) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| ExcelError::Logging(err.to_string()))
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Sync(args) => execute_sync(args),
    }
}

fn execute_sync(args: SyncArgs) -> Result<()> {
    if !args.input.exists() {
        return Err(ExcelError::MissingInput(args.input));
    }

    match (args.from, args.to) {
        (DataFormat::Json, DataFormat::Excel) => sync::json_to_excel(&args.input, &args.output),
        (DataFormat::Excel, DataFormat::Json) => sync::excel_to_json(&args.input, &args.output),
        _ => Err(ExcelError::UnsupportedConversion {
            from: args.from.to_string(),
            to: args.to.to_string(),
        }),
    }
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Convert flowcal workbooks to and from JSON sheet content."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Convert a workbook between its Excel and JSON representations.
    Sync(SyncArgs),
}

#[derive(clap::Args)]
struct SyncArgs {
    /// Source representation.
    #[arg(long, value_enum)]
    from: DataFormat,

    /// Input file path.
    #[arg(long)]
    input: PathBuf,

    /// Target representation.
    #[arg(long, value_enum)]
    to: DataFormat,

    /// Output file path.
    #[arg(long)]
    output: PathBuf,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum DataFormat {
    Json,
    Excel,
}

impl std::fmt::Display for DataFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataFormat::Json => write!(f, "json"),
            DataFormat::Excel => write!(f, "xlsx"),
        }
    }
}
