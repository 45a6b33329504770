//! redpen - adds review comments and tracked changes to DOCX files
//!
//! Reads a change list, applies it to the document in order, and writes the
//! result once. Any failure is reported on stderr with exit status 1 and
//! leaves the output file untouched.

mod args;

use annotate::{parse_changes, process_document, ReviewerConfig};
use anyhow::Context;
use args::Cli;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let json = match (&cli.changes, &cli.changes_file) {
        (Some(inline), _) => inline.clone(),
        (None, Some(path)) => std::fs::read_to_string(path)
            .with_context(|| format!("cannot read change list {}", path.display()))?,
        (None, None) => anyhow::bail!("no change list given"),
    };
    let changes = parse_changes(&json).context("invalid change list")?;
    tracing::debug!("Loaded {} change(s)", changes.len());

    let config = match &cli.config {
        Some(path) => ReviewerConfig::load(path)
            .with_context(|| format!("cannot load config {}", path.display()))?,
        None => ReviewerConfig::default(),
    };
    let config = config.with_overrides(cli.author.clone(), cli.initials.clone(), cli.date);

    let output = cli.output_path();
    let report = process_document(&cli.document, &changes, &output, &config)
        .with_context(|| format!("failed to annotate {}", cli.document.display()))?;

    for applied in report.iter() {
        println!("{}", applied);
    }
    println!("Saved {} change(s) to {}", report.len(), output.display());
    Ok(())
}
