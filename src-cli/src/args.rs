//! CLI argument definitions using clap

use chrono::{DateTime, Utc};
use clap::{ArgGroup, Parser};
use std::path::PathBuf;

/// Add review comments and tracked changes to a DOCX document
#[derive(Parser, Debug)]
#[command(name = "redpen")]
#[command(version, about, long_about = None)]
#[command(group(ArgGroup::new("change_source").required(true).args(["changes", "changes_file"])))]
pub struct Cli {
    /// Document to annotate
    pub document: PathBuf,

    /// Change list as inline JSON
    #[arg(long)]
    pub changes: Option<String>,

    /// Path to a JSON file holding the change list
    #[arg(long)]
    pub changes_file: Option<PathBuf>,

    /// Where to write the result (defaults to overwriting the document)
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Author stamped on comments and tracked changes
    #[arg(long)]
    pub author: Option<String>,

    /// Author initials for comments
    #[arg(long)]
    pub initials: Option<String>,

    /// Timestamp for every record (RFC 3339)
    #[arg(long, value_parser = parse_date)]
    pub date: Option<DateTime<Utc>>,

    /// Path to a reviewer configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log debug output
    #[arg(long, short)]
    pub verbose: bool,
}

impl Cli {
    /// Output path, falling back to the input document
    pub fn output_path(&self) -> PathBuf {
        self.output.clone().unwrap_or_else(|| self.document.clone())
    }
}

fn parse_date(value: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(value)
        .map(|date| date.with_timezone(&Utc))
        .map_err(|e| format!("expected an RFC 3339 timestamp: {}", e))
}
