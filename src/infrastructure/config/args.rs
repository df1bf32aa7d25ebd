//! Command-line arguments.

use super::app_config::LogLevel;
use clap::Parser;
use std::path::PathBuf;

/// Command-line overrides for [`super::AppConfig`] plus one-shot run options.
#[derive(Debug, Parser)]
#[command(
    name = "photogrid",
    version,
    about = "Browse a paged photo feed from the terminal",
    long_about = None
)]
pub struct CliArgs {
    /// Configuration file path.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log file path.
    #[arg(long, value_name = "PATH")]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Photo API base URL.
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,

    /// Records requested per page.
    #[arg(long)]
    pub page_size: Option<u32>,

    /// HTTP request timeout in seconds.
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Maximum decoded images kept in memory.
    #[arg(long)]
    pub cache_capacity: Option<usize>,

    /// Number of pages to load.
    #[arg(short, long, default_value_t = 1)]
    pub pages: u32,

    /// Only list photos whose title contains this text (case-sensitive).
    #[arg(short, long, value_name = "TEXT")]
    pub search: Option<String>,

    /// Download and decode the listed images.
    #[arg(long)]
    pub images: bool,
}
