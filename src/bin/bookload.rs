//! bookload: Load authors and works dumps into JSON Lines stores
//!
//! Usage:
//!   # Paths from a config file
//!   bookload --config bookload.toml
//!
//!   # Paths on the command line, stores written to ./store
//!   bookload --authors ol_dump_authors.txt --works ol_dump_works.txt
//!
//!   # Works only, against an existing authors store, more logging
//!   bookload --works ol_dump_works.txt --output-dir ./store -vv

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use anyhow::{Context, Result};
use bookload::{load_dumps, Author, Book, JsonlStore, LoaderConfig};
use clap::Parser;
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "bookload")]
#[command(about = "Load bibliographic authors and works dumps", long_about = None)]
struct Args {
    /// TOML configuration file
    #[arg(long, short = 'c', value_name = "FILE")]
    config: Option<PathBuf>,

    /// Authors dump (overrides datadump.author)
    #[arg(long, value_name = "PATH")]
    authors: Option<PathBuf>,

    /// Works dump (overrides datadump.works)
    #[arg(long, value_name = "PATH")]
    works: Option<PathBuf>,

    /// Directory for authors.jsonl and books.jsonl (overrides output.dir)
    #[arg(long, short = 'o', value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Skip re-resolving unknown author names after the works import
    #[arg(long)]
    no_deferred: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => LoaderConfig::load(path)?,
        None => LoaderConfig::default(),
    };
    if let Some(path) = args.authors {
        config.datadump.author = Some(path);
    }
    if let Some(path) = args.works {
        config.datadump.works = Some(path);
    }
    if let Some(dir) = args.output_dir {
        config.output.dir = dir;
    }
    if args.no_deferred {
        config.import.deferred_resolution = false;
    }
    config.validate()?;

    let log_level = match args.verbose {
        0 => config.logging.level.as_tracing(),
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut authors: JsonlStore<Author> = JsonlStore::open(config.output.dir.join("authors.jsonl"))
        .context("Failed to open authors store")?;
    let mut books: JsonlStore<Book> = JsonlStore::open(config.output.dir.join("books.jsonl"))
        .context("Failed to open books store")?;

    let report = load_dumps(&config, &mut authors, &mut books);

    authors.flush().context("Failed to write authors store")?;
    books.flush().context("Failed to write books store")?;

    println!("{}", serde_json::to_string_pretty(&report)?);

    if report.has_failures() {
        anyhow::bail!("one or more dumps failed to load");
    }
    Ok(())
}
