use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;
use teiref::batch::{is_tei_file, BatchConfig};
use teiref::config::{DEFAULT_OUTPUT_FILE, DEFAULT_PREVIEW_REFERENCES};
use teiref::report::Summary;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser)]
#[command(name = "teiref")]
#[command(about = "Extract paper metadata and reference lists from GROBID TEI-XML")]
struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract one TEI document, print a summary and save it as JSON
    Extract(ExtractArgs),
    /// Extract every TEI document in a directory in parallel
    Batch(BatchArgs),
}

#[derive(Args)]
struct ExtractArgs {
    /// Path to the TEI-XML file (defaults to the first .xml file in the current directory)
    input: Option<PathBuf>,

    /// Where to write the JSON (defaults to parsed_references.json next to the input)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Only print the summary
    #[arg(long)]
    no_save: bool,

    /// Number of references shown in the summary
    #[arg(long, default_value_t = DEFAULT_PREVIEW_REFERENCES)]
    preview: usize,
}

#[derive(Args)]
struct BatchArgs {
    /// Directory containing TEI-XML files
    #[arg(short, long)]
    input: PathBuf,

    /// Output directory for per-document JSON files
    #[arg(short, long)]
    output: PathBuf,

    /// Number of worker threads (defaults to one per core)
    #[arg(long)]
    threads: Option<usize>,

    /// Limit number of files to process (for testing)
    #[arg(long)]
    limit: Option<usize>,

    /// Extract without writing output files
    #[arg(long)]
    dry_run: bool,
}

fn find_default_input() -> Result<PathBuf> {
    let mut candidates: Vec<PathBuf> = fs::read_dir(".")
        .context("Failed to read current directory")?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| is_tei_file(path))
        .collect();
    candidates.sort();
    match candidates.into_iter().next() {
        Some(path) => Ok(path),
        None => bail!("No XML files found. Usage: teiref extract [path/to/file.xml]"),
    }
}

fn default_output(input: &Path) -> PathBuf {
    input
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join(DEFAULT_OUTPUT_FILE)
}

fn run_extract(args: ExtractArgs) -> Result<()> {
    let input = match args.input {
        Some(path) => path,
        None => find_default_input()?,
    };

    println!(
        "Parsing: {}",
        input.file_name().unwrap_or_default().to_string_lossy()
    );

    let start = Instant::now();
    let doc = teiref::extract::extract_file(&input)
        .with_context(|| format!("Failed to extract {}", input.display()))?;
    info!(
        duration_secs = start.elapsed().as_secs_f64(),
        references = doc.references.len(),
        "Extraction complete"
    );

    println!();
    print!("{}", Summary::new(&doc, args.preview));

    if !args.no_save {
        let output = args.output.unwrap_or_else(|| default_output(&input));
        teiref::export::write_json(&doc, &output)?;

        let rule = "=".repeat(80);
        println!();
        println!("{}", rule);
        println!("Saved to {}", output.display());
        println!("   Main paper + {} references", doc.references.len());
        println!("{}", rule);
    }

    Ok(())
}

fn run_batch(args: BatchArgs) -> Result<()> {
    let config = BatchConfig {
        input_dir: args.input,
        output_dir: args.output,
        threads: args.threads,
        limit: args.limit,
        dry_run: args.dry_run,
    };

    let start = Instant::now();
    let stats = teiref::batch::run_batch(&config)?;
    let duration = start.elapsed();

    println!();
    println!("=== Summary ===");
    println!("Total time:          {:.2}s", duration.as_secs_f64());
    println!("Documents processed: {}", stats.processed());
    println!("Malformed skipped:   {}", stats.malformed());
    println!("Failed:              {}", stats.failed());
    println!("Untitled papers:     {}", stats.untitled());
    println!("References found:    {}", stats.references());
    println!("Outputs written:     {}", stats.outputs());

    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");

    let result = match cli.command {
        Commands::Extract(args) => run_extract(args),
        Commands::Batch(args) => run_batch(args),
    };

    match result {
        Ok(()) => {
            info!("Completed successfully");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Error: {:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
