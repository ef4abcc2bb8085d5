use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "aeo-audit",
    about = "Audit a web page for answer engine optimization via a remote analysis service",
    version,
    long_about = None
)]
pub struct Args {
    /// Page to audit; omit to enter URLs interactively
    pub url: Option<String>,

    /// Analysis service endpoint
    #[arg(short, long, env = "AEO_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Request timeout in seconds
    #[arg(short, long, env = "AEO_TIMEOUT_SECS")]
    pub timeout: Option<u64>,

    /// Path to a TOML config file
    #[arg(short, long, env = "AEO_CONFIG")]
    pub config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long)]
    pub json: bool,

    /// Check the analysis service health and exit
    #[arg(long, conflicts_with = "url")]
    pub health: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}
