//! Remesas CLI - Turn shipment-status exports into Crystal CSV reports
//!
//! # Main Commands
//!
//! ```bash
//! remesas serve                     # Start HTTP server (port 3000)
//! remesas transform envios.xlsx     # Write envios.xlsx_transformed.csv
//! ```
//!
//! # Debug Commands
//!
//! ```bash
//! remesas parse envios.xlsx         # Just parse the export to JSON
//! remesas classify delivered new    # Show the category of statuses
//! remesas statuses                  # Show the status taxonomy
//! ```

use clap::{Parser, Subcommand};
use remesas::transform::pipeline::failure_notice;
use remesas::{
    parse_file_auto, status_label, taxonomy_description, transform_file, Config, ParseOptions,
    TransformOptions,
};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "remesas")]
#[command(about = "Transform shipment-status exports into Crystal CSV reports", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Transform an export into a Crystal report
    Transform {
        /// Input export (xlsx, xls, ods or delimited text)
        input: PathBuf,

        /// Output file (default: <input>_transformed.csv next to the input)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Worksheet to read (default: first sheet)
        #[arg(long)]
        sheet: Option<String>,

        /// Delimiter of text input (auto-detect if not specified)
        #[arg(short, long)]
        delimiter: Option<char>,
    },

    /// Parse an export and output its rows as JSON
    Parse {
        /// Input export
        input: PathBuf,

        /// Worksheet to read (default: first sheet)
        #[arg(long)]
        sheet: Option<String>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show the report category of one or more statuses
    Classify {
        /// Fine-grained statuses
        #[arg(required = true)]
        statuses: Vec<String>,
    },

    /// Show the status taxonomy
    Statuses,

    /// Start HTTP server
    Serve {
        /// Port to listen on (default: REMESAS_PORT or 3000)
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    if let Err(e) = run(cli.command).await {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

/// Config is only read by the commands that use it.
async fn run(command: Commands) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Transform {
            input,
            output,
            sheet,
            delimiter,
        } => {
            let options = TransformOptions {
                sheet: sheet_or_config(sheet)?,
                delimiter,
            };
            cmd_transform(&input, output.as_deref(), &options)
        }

        Commands::Parse {
            input,
            sheet,
            output,
        } => cmd_parse(&input, sheet_or_config(sheet)?, output.as_deref()),

        Commands::Classify { statuses } => cmd_classify(&statuses),

        Commands::Statuses => cmd_statuses(),

        Commands::Serve { port } => cmd_serve(Config::from_env()?.with_port(port)).await,
    }
}

/// The `--sheet` flag, else `REMESAS_SHEET`.
fn sheet_or_config(sheet: Option<String>) -> Result<Option<String>, Box<dyn std::error::Error>> {
    match sheet {
        Some(sheet) => Ok(Some(sheet)),
        None => Ok(Config::from_env()?.sheet),
    }
}

fn cmd_transform(
    input: &Path,
    output: Option<&Path>,
    options: &TransformOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Processing: {}", input.display());

    let result = transform_file(input, options).map_err(|e| failure_notice(&e))?;

    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| input.with_file_name(&result.file_name));
    fs::write(&output, &result.csv)?;

    eprintln!("\n📊 Summary");
    eprintln!("   Rows:   {}", result.report.rows.len());
    eprintln!("   Issues: {}", result.report.issues.len());
    eprintln!("💾 Report written to: {}", output.display());
    Ok(())
}

fn cmd_parse(
    input: &Path,
    sheet: Option<String>,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Parsing: {}", input.display());

    let options = ParseOptions {
        sheet,
        delimiter: None,
    };
    let table = parse_file_auto(input, &options)?;

    if let Some(ref sheet) = table.sheet {
        eprintln!("   Sheet: {}", sheet);
    }
    if let Some(ref encoding) = table.encoding {
        eprintln!("   Encoding: {}", encoding);
    }
    if let Some(delimiter) = table.delimiter {
        eprintln!("   Delimiter: '{}'", format_delimiter(delimiter));
    }
    eprintln!("   Columns: {}", table.headers.join(", "));
    eprintln!("✅ Parsed {} records", table.records.len());

    let json = serde_json::to_string_pretty(&table.records)?;
    write_output(&json, output)
}

fn cmd_classify(statuses: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    for status in statuses {
        println!("{} -> {}", status, status_label(status));
    }
    Ok(())
}

fn cmd_statuses() -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", taxonomy_description());
    Ok(())
}

async fn cmd_serve(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    remesas::server::start_server(config).await?;
    Ok(())
}

fn format_delimiter(d: char) -> String {
    match d {
        '\t' => "\\t".to_string(),
        c => c.to_string(),
    }
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
