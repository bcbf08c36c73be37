use std::path::PathBuf;

use clap::{Parser, Subcommand};
use parts_sandbox::model::{FileStatus, RefreshSummary};
use parts_sandbox::query::QueryService;
use parts_sandbox::store::AliasStore;
use parts_sandbox::{Result, SandboxError, refresh};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    if let Err(error) = run(cli) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    init_logging()?;

    match cli.command {
        Command::List(args) => {
            let store = AliasStore::open(&args.store.store)?;
            let service = QueryService::new(&store);
            for name in service.list_candidate_files(&args.dir)? {
                println!("{name}");
            }
            Ok(())
        }
        Command::Refresh(args) => {
            let mut store = AliasStore::open(&args.store.store)?;
            let summary = refresh::refresh_all(&mut store, &args.dir)?;
            report_summary(&summary);
            if !summary.success {
                std::process::exit(1);
            }
            Ok(())
        }
        Command::Update(args) => {
            let mut store = AliasStore::open(&args.store.store)?;
            let summary = refresh::update_from_file(&mut store, &args.file)?;
            report_summary(&summary);
            if !summary.success {
                std::process::exit(1);
            }
            Ok(())
        }
        Command::Search(args) => {
            let store = AliasStore::open(&args.store.store)?;
            let service = QueryService::new(&store);
            let records = service.search(&args.term)?;
            println!("{}", serde_json::to_string_pretty(&records)?);
            Ok(())
        }
        Command::Forecast(args) => {
            let store = AliasStore::open(&args.store.store)?;
            let service = QueryService::new(&store);
            let forecast = service.eau_forecast(&args.part)?;
            println!("{}", serde_json::to_string_pretty(&forecast)?);
            Ok(())
        }
    }
}

fn init_logging() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .map_err(|error| SandboxError::Logging(error.to_string()))
}

fn report_summary(summary: &RefreshSummary) {
    for outcome in &summary.outcomes {
        match &outcome.status {
            FileStatus::Success { merged } => {
                println!("ok: {} ({merged} rows)", outcome.file.display());
            }
            FileStatus::MissingColumns => {
                println!(
                    "warning: {} has no alias/value columns",
                    outcome.file.display()
                );
            }
            FileStatus::MissingSheet => {
                println!(
                    "warning: {} has no 'Master Part List' sheet",
                    outcome.file.display()
                );
            }
            FileStatus::ReadError(reason) => {
                println!("failed: {}: {reason}", outcome.file.display());
            }
        }
    }
    println!(
        "merged {} new aliases across {} files",
        summary.total_merged,
        summary.outcomes.len()
    );
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Consolidate Quote Master alias mappings and query the result."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List candidate Quote Master files.
    List(ListArgs),
    /// Merge every Quote Master file in a directory into the store.
    Refresh(RefreshArgs),
    /// Merge a single Quote Master file into the store.
    Update(UpdateArgs),
    /// Search aliases and values for a substring.
    Search(SearchArgs),
    /// Look up the EAU forecast for one part.
    Forecast(ForecastArgs),
}

#[derive(clap::Args)]
struct StoreArgs {
    /// Location of the alias store database.
    #[arg(long, default_value = "excels/parts_sandbox.db")]
    store: PathBuf,
}

#[derive(clap::Args)]
struct ListArgs {
    /// Directory holding Quote Master files.
    #[arg(long, default_value = "excels")]
    dir: PathBuf,

    #[command(flatten)]
    store: StoreArgs,
}

#[derive(clap::Args)]
struct RefreshArgs {
    /// Directory holding Quote Master files.
    #[arg(long, default_value = "excels")]
    dir: PathBuf,

    #[command(flatten)]
    store: StoreArgs,
}

#[derive(clap::Args)]
struct UpdateArgs {
    /// Quote Master file to merge.
    #[arg(long)]
    file: PathBuf,

    #[command(flatten)]
    store: StoreArgs,
}

#[derive(clap::Args)]
struct SearchArgs {
    /// Substring to match against aliases and values (case-sensitive).
    #[arg(long)]
    term: String,

    #[command(flatten)]
    store: StoreArgs,
}

#[derive(clap::Args)]
struct ForecastArgs {
    /// Part number to look up.
    #[arg(long)]
    part: String,

    #[command(flatten)]
    store: StoreArgs,
}
