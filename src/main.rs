//! CLI entry point for the PDF link fetcher.

use std::fs;
use std::io::{self, IsTerminal, Read, Write};
use std::path::Path;

use anyhow::{Context, Result, bail};
use clap::Parser;
use pdf_link_fetcher::{InputPayload, PdfLinkService};
use serde::Serialize;
use tracing::{debug, info};

mod app_config;
mod cli;

use cli::{Args, Command};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    // stdout carries the JSON result only
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    debug!(?args, "CLI arguments parsed");

    let file_config = app_config::load_file_config(args.config.as_deref())?;
    let batch = args.command.batch_args();
    let config = app_config::resolve_fetch_config(file_config.as_ref(), batch);

    let input_text = read_input(batch.input.as_deref())?;
    let payload: InputPayload =
        serde_json::from_str(&input_text).context("Input is not a valid record payload")?;
    let records = payload.into_records();
    info!(records = records.len(), "Parsed input");

    let service = PdfLinkService::new(config).context("Invalid fetch configuration")?;
    service.start().context("Failed to start HTTP client")?;

    let outcome = match &args.command {
        Command::Check(_) => match service.check_links(&records).await {
            Ok(response) => print_json(&response),
            Err(e) => Err(e.into()),
        },
        Command::Download(_) => match service.download_links(&records).await {
            Ok(response) => print_json(&response),
            Err(e) => Err(e.into()),
        },
    };

    service.shutdown();
    outcome
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path {
        return fs::read_to_string(path)
            .with_context(|| format!("Failed to read input file '{}'", path.display()));
    }

    if io::stdin().is_terminal() {
        bail!("No input provided. Pass --input FILE or pipe a JSON payload via stdin.");
    }

    let mut buffer = String::new();
    io::stdin()
        .read_to_string(&mut buffer)
        .context("Failed to read stdin")?;
    Ok(buffer)
}

fn print_json<T: Serialize>(response: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(response).context("Failed to encode response")?;
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{rendered}").context("Failed to write response")?;
    Ok(())
}
