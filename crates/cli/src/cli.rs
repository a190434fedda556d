//! Command-line arguments.

use clap::{Parser, ValueEnum};

/// Find cover images for manga series pages.
#[derive(Debug, Parser)]
#[command(name = "coverscout")]
#[command(about = "Resolve a representative cover image for each website", long_about = None)]
pub struct Cli {
    /// Series websites to resolve. A missing scheme defaults to https.
    #[arg(required = true, value_name = "URL")]
    pub urls: Vec<String>,

    /// Allow the headless-browser fallback when static markup has no cover.
    #[arg(long)]
    pub render: bool,

    /// Title used for the placeholder when no cover is found (defaults to the host).
    #[arg(long, value_name = "TITLE")]
    pub title: Option<String>,

    /// Log output format (logs go to stderr).
    #[arg(long, value_enum, default_value_t = LogFormat::Json)]
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Pretty,
    Json,
}
