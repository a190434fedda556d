//! coverscout entry point.
//!
//! Prints one JSON object per URL on stdout. Logging goes to stderr so the
//! output stays machine-readable.

use anyhow::{Context, Result};
use clap::Parser;
use coverscout_client::{CoverPipeline, ExtractedCover, ResolveOptions, canonicalize};
use coverscout_core::{AppConfig, placeholder_cover};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

mod cli;

use cli::{Cli, LogFormat};

#[derive(Debug, PartialEq, Eq, Serialize)]
struct CoverReport {
    url: String,
    cover: String,
    placeholder: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    heuristic: Option<String>,
}

impl CoverReport {
    fn new(url: &str, found: Option<ExtractedCover>, title: Option<&str>, placeholder_base: &str) -> Self {
        match found {
            Some(found) => Self {
                url: url.to_string(),
                heuristic: Some(found.candidate.source_heuristic.to_string()),
                cover: found.cover.into_url(),
                placeholder: false,
            },
            None => {
                let host = canonicalize(url).ok().and_then(|u| u.host_str().map(str::to_string));
                let text = title.map(str::to_string).or(host).unwrap_or_default();
                Self { url: url.to_string(), cover: placeholder_cover(placeholder_base, &text), placeholder: true, heuristic: None }
            }
        }
    }
}

fn init_logging(format: LogFormat) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr);

    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_format);

    let mut config = AppConfig::load().context("loading configuration")?;
    if cli.render {
        config.render_enabled = true;
    }

    let pipeline = CoverPipeline::from_config(&config).context("building cover pipeline")?;
    let options = ResolveOptions::from(&config);

    for url in &cli.urls {
        let found = pipeline.resolve(url, options).await;
        let report = CoverReport::new(url, found, cli.title.as_deref(), &config.placeholder_base);
        println!("{}", serde_json::to_string(&report)?);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use coverscout_client::Heuristic;

    const BASE: &str = "https://placehold.co/300x420";

    #[test]
    fn test_report_with_cover() {
        let found = ExtractedCover::new("/a.jpg".into(), Heuristic::MetaTag, "https://site.test/m/1");
        let report = CoverReport::new("site.test/m/1", Some(found), Some("Ignored"), BASE);
        assert_eq!(report.cover, "https://site.test/a.jpg");
        assert!(!report.placeholder);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["heuristic"], "meta_tag");
    }

    #[test]
    fn test_report_placeholder_uses_title_then_host() {
        let titled = CoverReport::new("https://site.test/m/1", None, Some("One Piece"), BASE);
        assert_eq!(titled.cover, "https://placehold.co/300x420?text=One+Piece");
        assert!(titled.placeholder);

        let untitled = CoverReport::new("site.test/m/1", None, None, BASE);
        assert_eq!(untitled.cover, "https://placehold.co/300x420?text=site.test");

        let json = serde_json::to_value(&untitled).unwrap();
        assert!(json.get("heuristic").is_none());
    }
}
