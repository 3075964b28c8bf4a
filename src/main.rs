//! Command-line driver for the workbook pipelines.

use anyhow::Result;
use clap::{Parser, Subcommand};
use resheet::error::{ResheetError, ResultMessage};
use resheet::table::Table;
use resheet::transform::{self, Selection};
use resheet::writer;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(
    name = "resheet",
    version,
    about = "Reshapes purchase-summary workbooks into per-person tables"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Condense the first sheet of a summary workbook into per-person purchase rows
    Itemize {
        /// Input workbook (.xlsx, .xlsm, .xlsb, .xls, .ods)
        input: PathBuf,

        /// Output file; defaults to 改_<input stem>.xlsx next to the input
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Compute per-person total weights for each selected sheet
    Weigh {
        /// Input workbook
        input: PathBuf,

        /// Output file; defaults to 改_<input stem>.xlsx next to the input
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Process only sheets matching one of these glob patterns (repeatable)
        #[arg(long = "sheet", value_name = "PATTERN")]
        sheets: Vec<String>,
    },

    /// Merge the per-person tables of the selected sheets into one wide summary
    Combine {
        /// Input workbook
        input: PathBuf,

        /// Output file; defaults to 改_<input stem>.xlsx next to the input
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Process only sheets matching one of these glob patterns (repeatable)
        #[arg(long = "sheet", value_name = "PATTERN")]
        sheets: Vec<String>,

        /// Amount to split between persons in proportion to their weights
        #[arg(long, value_parser = parse_amount)]
        amount: Option<f64>,
    },
}

fn parse_amount(text: &str) -> Result<f64, String> {
    let amount: f64 = text
        .parse()
        .map_err(|_| format!("'{}' is not a number", text))?;
    if amount > 0.0 {
        Ok(amount)
    } else {
        Err("amount must be greater than zero".to_string())
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    run(cli.command)?;
    Ok(())
}

fn run(command: Command) -> Result<(), ResheetError> {
    match command {
        Command::Itemize { input, output } => {
            let result = outcome(transform::itemize(&input)).with_prefix("reading input")?;
            let Some(table) = result else {
                return Ok(());
            };
            let output = output.unwrap_or_else(|| writer::derive_output_path(&input));
            save_table(&output, &table)?;
            println!("wrote {} ({} rows)", output.display(), table.row_count());
            Ok(())
        }
        Command::Weigh {
            input,
            output,
            sheets,
        } => {
            let selection = Selection::from_patterns(&sheets)?;
            let result =
                outcome(transform::weigh(&input, &selection)).with_prefix("reading input")?;
            let Some(tables) = result else {
                return Ok(());
            };
            let output = output.unwrap_or_else(|| writer::derive_output_path(&input));
            writer::write_sheets(&output, &tables)
                .map_err(ResheetError::from)
                .with_prefix("writing output")?;
            println!("wrote {} ({} sheets)", output.display(), tables.len());
            Ok(())
        }
        Command::Combine {
            input,
            output,
            sheets,
            amount,
        } => {
            let selection = Selection::from_patterns(&sheets)?;
            let result = outcome(transform::combine(&input, &selection, amount))
                .with_prefix("reading input")?;
            let Some(table) = result else {
                return Ok(());
            };
            let output = output.unwrap_or_else(|| writer::derive_output_path(&input));
            writer::write_merged(&output, "Sheet1", &table)
                .map_err(ResheetError::from)
                .with_prefix("writing output")?;
            println!("wrote {} ({} persons)", output.display(), table.row_count());
            Ok(())
        }
    }
}

/// Separates the "pipeline found nothing" signal from real failures:
/// the signal becomes a printed notice and a clean None.
fn outcome<T>(result: Result<T, ResheetError>) -> Result<Option<T>, ResheetError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(ResheetError::TransformError(signal)) => {
            println!("{}; nothing written", signal);
            Ok(None)
        }
        Err(error) => Err(error),
    }
}

fn save_table(path: &Path, table: &Table) -> Result<(), ResheetError> {
    writer::write_table(path, "Sheet1", table)
        .map_err(ResheetError::from)
        .with_prefix("writing output")
}
