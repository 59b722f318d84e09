//! Linkloader - direct download links for a video's curated formats
//!
//! Queries yt-dlp for a video's metadata and format listing, keeps the
//! interesting formats, and prints them with their direct links as JSON.

use anyhow::Result;
use clap::Parser;
use linkloader::catalog::CatalogPipeline;
use linkloader::extractor::YtDlpTool;
use linkloader::utils::{CatalogError, Settings};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::error;

#[derive(Parser)]
#[command(name = "linkloader")]
#[command(about = "Print a video's curated formats with direct download links")]
struct Args {
    /// Video URL to query
    url: Option<String>,

    /// Settings file (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// yt-dlp binary to use instead of the discovered one
    #[arg(long)]
    ytdlp: Option<PathBuf>,

    /// Print JSON on a single line
    #[arg(long)]
    compact: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();

    // stdout carries the JSON payload
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let mut settings = Settings::load(args.config.as_deref())?;
    if args.ytdlp.is_some() {
        settings.ytdlp_path = args.ytdlp;
    }

    let url = args.url.unwrap_or_default();
    if url.trim().is_empty() {
        print_json(&CatalogError::MissingInput.to_body(), args.compact)?;
        return Ok(ExitCode::FAILURE);
    }

    let tool = match YtDlpTool::new(settings.ytdlp_path.as_deref()) {
        Ok(tool) => tool,
        Err(e) => {
            error!("{}", e);
            print_json(&CatalogError::from(e).to_body(), args.compact)?;
            return Ok(ExitCode::FAILURE);
        }
    };
    let pipeline = CatalogPipeline::new(Arc::new(tool), settings);

    match pipeline.query(&url).await {
        Ok(response) => {
            print_json(&response, args.compact)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            error!("Query failed: {}", e);
            print_json(&e.to_body(), args.compact)?;
            Ok(ExitCode::FAILURE)
        }
    }
}

fn print_json<T: Serialize>(value: &T, compact: bool) -> Result<()> {
    let json = if compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    println!("{}", json);
    Ok(())
}
