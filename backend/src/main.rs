//! dldash CLI - Clean DLD transaction extracts and serve the dashboard
//!
//! # Main Commands
//!
//! ```bash
//! dldash inspect DLD_TRANSACTIONS_OPEN.csv        # Eyeball a raw extract
//! dldash clean DLD_TRANSACTIONS_OPEN.csv -o DLD_CLEAN.csv
//! dldash summary DLD_CLEAN.csv                    # KPIs in the terminal
//! dldash serve --data DLD_CLEAN.csv               # Dashboard API (port 3000)
//! ```

use clap::{Parser, Subcommand};
use dldash::{
    clean_to_file, export_csv, format_compact, format_yoy, inspect_path, kpi_summary,
    pipeline::format_delimiter, CleanOptions, Dataset, FilterSelection,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "dldash")]
#[command(about = "Clean DLD transaction extracts and serve a dashboard", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show first rows, column profiles and sample values of a raw extract
    Inspect {
        /// Input CSV file
        input: PathBuf,

        /// Number of head rows to print
        #[arg(short, long, default_value = "20")]
        rows: usize,

        /// Column to list distinct raw values for
        #[arg(short, long)]
        column: Option<String>,

        /// Maximum distinct values to list
        #[arg(long, default_value = "30")]
        samples: usize,
    },

    /// Clean a raw extract: sanitize fields, derive amount, drop invalid rows
    Clean {
        /// Input CSV file
        input: PathBuf,

        /// Output CSV file
        #[arg(short, long)]
        output: PathBuf,

        /// Rows per output batch (default 200000)
        #[arg(long)]
        chunk_size: Option<usize>,

        /// CSV delimiter (auto-detect if not specified)
        #[arg(short, long)]
        delimiter: Option<char>,
    },

    /// Print dashboard KPIs for a cleaned extract
    Summary {
        /// Cleaned CSV file
        input: PathBuf,

        /// Restrict to years (comma-separated)
        #[arg(short, long)]
        years: Option<String>,

        /// Write the filtered view as CSV to this path
        #[arg(short, long)]
        export: Option<PathBuf>,
    },

    /// Start the dashboard HTTP server
    Serve {
        /// Cleaned CSV file to serve
        #[arg(short, long)]
        data: PathBuf,

        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Inspect {
            input,
            rows,
            column,
            samples,
        } => cmd_inspect(&input, rows, column.as_deref(), samples),

        Commands::Clean {
            input,
            output,
            chunk_size,
            delimiter,
        } => cmd_clean(&input, &output, chunk_size, delimiter),

        Commands::Summary {
            input,
            years,
            export,
        } => cmd_summary(&input, years.as_deref(), export.as_deref()),

        Commands::Serve { data, port } => cmd_serve(&data, port).await,
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn cmd_inspect(
    input: &Path,
    rows: usize,
    column: Option<&str>,
    samples: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Inspecting: {}", input.display());

    let report = inspect_path(input, rows, column, samples)?;

    eprintln!("   Encoding: {}", report.encoding);
    eprintln!("   Delimiter: '{}'", format_delimiter(report.delimiter));
    eprintln!("   Rows: {}", report.row_count);

    println!("\n------ HEAD {} ------", report.head.len());
    println!("{}", report.headers.join(" | "));
    for row in &report.head {
        println!("{}", row.join(" | "));
    }

    println!("\n------ COLUMN PROFILES ------");
    for col in &report.columns {
        println!(
            "{:24} non-empty: {:8}  numeric: {:8}  dates: {:8}",
            col.name, col.non_empty, col.numeric, col.dates
        );
    }

    if let Some((column, values)) = &report.samples {
        println!("\n------ SAMPLE {} ------", column);
        for value in values {
            println!("  '{}'", value);
        }
    }

    Ok(())
}

fn cmd_clean(
    input: &Path,
    output: &Path,
    chunk_size: Option<usize>,
    delimiter: Option<char>,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Cleaning: {}", input.display());

    let options = CleanOptions {
        delimiter,
        chunk_size,
    };
    let summary = clean_to_file(input, output, &options)?;

    eprintln!("\n📊 Results:");
    eprintln!("   Encoding: {}", summary.csv_info.encoding);
    eprintln!(
        "   Delimiter: '{}'",
        format_delimiter(summary.csv_info.delimiter)
    );
    eprintln!("   Input rows: {}", summary.csv_info.row_count);
    eprintln!("   Kept: {}", summary.kept);
    eprintln!("   Dropped: {}", summary.dropped);
    eprintln!("   Chunks: {}", summary.chunks);
    eprintln!("\n✨ Done! Clean file saved as: {}", output.display());

    Ok(())
}

fn cmd_summary(
    input: &Path,
    years: Option<&str>,
    export: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📊 Loading: {}", input.display());

    let dataset = Dataset::load(input)?;
    eprintln!(
        "   {} rows (date: '{}', amount: '{}')",
        dataset.len(),
        dataset.date_column,
        dataset.amount_column
    );

    let selection = FilterSelection {
        years: years
            .unwrap_or("")
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect(),
        ..Default::default()
    };
    let rows = dataset.filter(&selection);

    match kpi_summary(&rows) {
        Some(kpis) => {
            println!(
                "\n{} vs {} ({} rows in view)",
                kpis.current_year,
                kpis.previous_year,
                rows.len()
            );
            println!(
                "  Total Transactions:  {:>12}   YoY: {}",
                format_compact(kpis.transactions.current),
                format_yoy(kpis.transactions.yoy)
            );
            println!(
                "  Total Value (AED):   {:>12}   YoY: {}",
                format_compact(kpis.total_value.current),
                format_yoy(kpis.total_value.yoy)
            );
            println!(
                "  Average Value (AED): {:>12}   YoY: {}",
                format_compact(kpis.average_value.current),
                format_yoy(kpis.average_value.yoy)
            );
        }
        None => println!("\nNo rows match the selection."),
    }

    if let Some(path) = export {
        std::fs::write(path, export_csv(&rows))?;
        eprintln!("\n💾 Filtered view written to: {}", path.display());
    }

    Ok(())
}

async fn cmd_serve(data: &Path, port: u16) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📊 Loading dataset: {}", data.display());

    let dataset = Arc::new(Dataset::load(data)?);
    eprintln!("   {} rows loaded", dataset.len());

    dldash::server::start_server(port, dataset).await?;
    Ok(())
}
