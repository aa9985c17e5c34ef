mod error;
mod fetcher;
mod output;
mod parser;
mod pipeline;
mod record;
mod settings;

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};

use fetcher::Fetcher;
use output::OutputMode;
use pipeline::{Outcome, RunOptions};
use settings::{Settings, SourceConfig};

#[derive(Parser)]
#[command(name = "mycen_scraper", about = "Hospital and ambulance directory scraper for mycen.com.my")]
struct Cli {
    /// Settings file (TOML or JSON). Built-in sources are used without one.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch every configured source and write its output file (default)
    Run(RunArgs),
    /// List configured sources
    Sources,
    /// Extract records from a saved HTML page
    Parse {
        /// HTML file to read
        file: PathBuf,
        /// Category tag for every record
        #[arg(long)]
        category: Option<i64>,
        /// Model name for fixture entries
        #[arg(long, default_value = "hospital.hospital")]
        model: String,
        /// Output shape
        #[arg(long, value_enum, default_value_t = OutputMode::Fixture)]
        mode: OutputMode,
    },
}

#[derive(Args, Default)]
struct RunArgs {
    /// Only run these source ids (repeatable)
    #[arg(long)]
    only: Vec<String>,
    /// Print payloads instead of writing output files
    #[arg(long)]
    stdout: bool,
    /// Save each fetched page next to the working directory
    #[arg(long)]
    dump_raw: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref()).context("Failed to load settings")?;

    match cli.command.unwrap_or(Commands::Run(RunArgs::default())) {
        Commands::Run(args) => run(&settings, &args)?,
        Commands::Sources => print_sources(&settings),
        Commands::Parse {
            file,
            category,
            model,
            mode,
        } => {
            let html = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {:?}", file))?;
            let source = SourceConfig {
                id: file.display().to_string(),
                url: None,
                category,
                model,
                mode,
                output: None,
                dump_raw: false,
                raw_path: None,
            };
            let opts = RunOptions {
                pretty: settings.pretty,
                to_stdout: true,
                ..Default::default()
            };
            report(&source, pipeline::process(&html, &source, &opts)?, settings.pretty)?;
        }
    }

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {:.1}s", elapsed.as_secs_f64());
    }
    Ok(())
}

fn run(settings: &Settings, args: &RunArgs) -> Result<()> {
    let sources = settings.select(&args.only)?;
    let fetcher = Fetcher::new()?;
    let opts = RunOptions {
        pretty: settings.pretty,
        dump_raw: args.dump_raw,
        to_stdout: args.stdout,
    };

    for source in sources {
        let outcome = pipeline::run_source(&fetcher, source, &opts)?;
        report(source, outcome, settings.pretty)?;
    }
    Ok(())
}

fn report(source: &SourceConfig, outcome: Outcome, pretty: bool) -> Result<()> {
    match outcome {
        Outcome::Written { path, records } => {
            println!("{}: {} records -> {}", source.id, records, path.display());
        }
        Outcome::InMemory(payload) => println!("{}", payload.render(pretty)?),
        Outcome::Missing(m) => println!("{}: no listing found ({})", source.id, m),
        Outcome::NoUrl => println!("{}: no URL configured", source.id),
    }
    Ok(())
}

fn print_sources(settings: &Settings) {
    println!(
        "{:<22} | {:<8} | {:<26} | {:<7} | {}",
        "Source", "Category", "Model", "Mode", "URL"
    );
    println!("{}", "-".repeat(110));
    for s in &settings.sources {
        let category = s.category.map(|c| c.to_string()).unwrap_or_else(|| "-".into());
        let mode = mode_name(s.mode);
        println!(
            "{:<22} | {:<8} | {:<26} | {:<7} | {}",
            s.id,
            category,
            s.model,
            mode,
            s.url.as_deref().unwrap_or("-")
        );
        if let Some(out) = &s.output {
            println!("{:<22}   -> {}", "", out.display());
        }
    }
}

fn mode_name(mode: OutputMode) -> String {
    mode.to_possible_value()
        .map(|v| v.get_name().to_string())
        .unwrap_or_default()
}
