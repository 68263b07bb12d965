//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};

/// Check and download the PDF links carried by document records.
///
/// Reads a JSON payload (a single record, an array of records, or
/// `{"data": [...]}`) and prints one status record per unique link.
#[derive(Parser, Debug)]
#[command(name = "pdf-link-fetcher")]
#[command(author, version, about)]
pub struct Args {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Config file to use instead of the default location
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Batch operations.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Probe every link with a HEAD request
    Check(BatchArgs),
    /// Download every link into the output directory
    Download(BatchArgs),
}

impl Command {
    /// Options shared by both operations.
    #[must_use]
    pub fn batch_args(&self) -> &BatchArgs {
        match self {
            Self::Check(args) | Self::Download(args) => args,
        }
    }
}

/// Options for a single batch.
#[derive(ClapArgs, Debug, Clone, Default)]
pub struct BatchArgs {
    /// JSON payload file (reads stdin when omitted)
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Directory downloaded files are written to
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Maximum concurrent requests (1-100)
    #[arg(short = 'c', long, value_parser = clap::value_parser!(u8).range(1..=100))]
    pub concurrency: Option<u8>,

    /// HEAD probe timeout in seconds (1-3600)
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..=3600))]
    pub check_timeout: Option<u64>,

    /// Download timeout in seconds (1-3600)
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..=3600))]
    pub download_timeout: Option<u64>,

    /// Do not follow HTTP redirects
    #[arg(long)]
    pub no_redirects: bool,
}
