use std::path::PathBuf;

use clap::{ArgAction, Parser};
use tracing_subscriber::EnvFilter;
use trello_xlsx::convert::{ConvertOptions, board_to_excel};
use trello_xlsx::flatten::LayoutOptions;
use trello_xlsx::{Result, ToolError};

fn main() {
    let cli = Cli::parse();
    if let Err(error) = run(cli) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    init_logging(cli.verbose)?;

    let options = ConvertOptions {
        resolve_labels: cli.labels,
        layout: LayoutOptions {
            include_list_info: cli.info,
            include_empty_lists: cli.add_empty,
        },
    };
    board_to_excel(&cli.input, &cli.output, options)?;
    println!("File written to {}", cli.output.display());
    Ok(())
}

fn init_logging(verbose: bool) -> Result<()> {
    let default_level = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|err| ToolError::Logging(err.to_string()))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|err| ToolError::Logging(err.to_string()))
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Convert a Trello board export into an XLSX workbook, one sheet per list."
)]
struct Cli {
    /// JSON formatted board export.
    input: PathBuf,

    /// Path to put the workbook file.
    output: PathBuf,

    /// Make output verbose.
    #[arg(short, long)]
    verbose: bool,

    /// Don't resolve labels to their name.
    #[arg(short = 'l', long = "no-labels", action = ArgAction::SetFalse)]
    labels: bool,

    /// Add list info to each sheet.
    #[arg(short, long)]
    info: bool,

    /// Add empty lists to the workbook.
    #[arg(long)]
    add_empty: bool,
}
