//! Haplosig - Allele Signature Finder
//!
//! Command-line front end: loads an aligned FASTA, runs one of the signature
//! searches and prints the result as text or JSON.

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use mimalloc::MiMalloc;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::mpsc::{channel, Receiver};
use std::thread::{self, JoinHandle};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use haplosig::{
    Collection, HaplotypeError, HaplotypeReport, Haplotyper, SearchParams, SearchProgress,
    SearchStrategy, ThreadCount,
};

mod output;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[derive(Parser)]
#[command(name = "haplosig")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Find mutation signatures that single out allele groups", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Greedy signature for all alleles whose name starts with a prefix
    Group(GroupArgs),
    /// All minimal signatures unique to a single allele
    Unique(UniqueArgs),
    /// List alleles that share an identical sequence
    Duplicates(DuplicatesArgs),
}

#[derive(Args)]
struct CommonArgs {
    /// Aligned FASTA file (all sequences the same length, '*' = not sequenced)
    #[arg(value_name = "ALIGNMENT")]
    alignment: PathBuf,

    /// TOML file with search parameters; command-line flags take precedence
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print the report as JSON instead of text
    #[arg(long)]
    json: bool,

    /// Also write the report as pretty JSON to this file
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
}

#[derive(Args)]
struct GroupArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Allele name prefix defining the group (e.g. B*1507)
    prefix: String,

    /// Number of least frequent common mutations to list
    #[arg(long)]
    top: Option<usize>,
}

#[derive(Args)]
struct UniqueArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Allele name
    allele: String,

    /// Largest signature size to search
    #[arg(long)]
    max_size: Option<usize>,

    /// Number of threads (0 = auto-detect)
    #[arg(short = 't', long)]
    threads: Option<usize>,
}

#[derive(Args)]
struct DuplicatesArgs {
    /// Aligned FASTA file
    #[arg(value_name = "ALIGNMENT")]
    alignment: PathBuf,

    /// Print duplicate groups as JSON
    #[arg(long)]
    json: bool,
}

fn main() {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)),
        )
        .init();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);

        // infeasible requests exit 2, everything else 1
        let exit_code = match e.downcast_ref::<HaplotypeError>() {
            Some(HaplotypeError::EmptyGroup { .. })
            | Some(HaplotypeError::AmbiguousGroup { .. })
            | Some(HaplotypeError::UnknownAllele(_)) => 2,
            _ => 1,
        };
        process::exit(exit_code);
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Group(args) => {
            let mut params = load_params(args.common.config.as_deref())?;
            params.strategy = SearchStrategy::GreedyGroup;
            if let Some(top) = args.top {
                params.report_top = top;
            }

            let haplotyper = Haplotyper::new(load_collection(&args.common.alignment)?);
            let report = haplotyper.run(&args.prefix, &params, None)?;
            emit(&report, &args.common)
        }
        Commands::Unique(args) => {
            let mut params = load_params(args.common.config.as_deref())?;
            params.strategy = SearchStrategy::ExhaustiveUnique;
            if let Some(max_size) = args.max_size {
                params.max_signature_size = max_size;
            }
            match args.threads {
                Some(0) => params.thread_count = ThreadCount::Auto,
                Some(n) => params.thread_count = ThreadCount::Fixed(n),
                None => {}
            }

            let haplotyper = Haplotyper::new(load_collection(&args.common.alignment)?);
            let (tx, rx) = channel();
            let progress = spawn_progress(rx)?;
            let report = haplotyper.run(&args.allele, &params, Some(tx));
            finish_progress(progress);
            emit(&report?, &args.common)
        }
        Commands::Duplicates(args) => {
            let collection = load_collection(&args.alignment)?;
            let duplicates = collection.find_duplicates();
            if args.json {
                println!("{}", serde_json::to_string_pretty(&duplicates)?);
            } else {
                print!("{}", output::render_duplicates(&duplicates));
            }
            Ok(())
        }
    }
}

fn load_collection(path: &Path) -> Result<Collection> {
    info!("Reading alignment {}", path.display());
    Collection::from_fasta_path(path)
        .with_context(|| format!("Failed to load alignment {}", path.display()))
}

fn load_params(path: Option<&Path>) -> Result<SearchParams> {
    let Some(path) = path else {
        return Ok(SearchParams::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("Failed to parse config {}", path.display()))
}

fn emit(report: &HaplotypeReport, common: &CommonArgs) -> Result<()> {
    if let Some(path) = &common.output {
        let json = serde_json::to_string_pretty(report)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!("Report written to {}", path.display());
    }

    if common.json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        print!("{}", output::render_report(report));
    }
    Ok(())
}

/// Drive a progress bar from exhaustive search updates until the sender is dropped.
fn spawn_progress(rx: Receiver<SearchProgress>) -> Result<JoinHandle<()>> {
    let style = ProgressStyle::default_bar()
        .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} seeds {msg}")?
        .progress_chars("##-");

    Ok(thread::spawn(move || {
        let bar = ProgressBar::new(0);
        bar.set_style(style);
        let mut completed = 0;
        for update in rx {
            // updates from parallel seeds can arrive out of order
            completed = completed.max(update.seeds_completed);
            bar.set_length(update.total_seeds as u64);
            bar.set_position(completed as u64);
            bar.set_message(format!("{} nodes", update.nodes_visited));
        }
        bar.finish_and_clear();
    }))
}

/// Wait for the progress display; a panic there does not fail the search.
fn finish_progress(handle: JoinHandle<()>) -> bool {
    let clean = handle.join().is_ok();
    if !clean {
        warn!("Progress display thread panicked");
    }
    clean
}
