//! Command-line interface

use clap::Parser;
use std::path::PathBuf;

/// Network Path Tester - measures latency, loss, jitter, bandwidth, path MTU and DNS timing
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "npt")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Host every probe is aimed at
    #[arg(short, long, value_name = "HOST")]
    pub target: Option<String>,

    /// Echo requests per sample-based metric
    #[arg(short, long, value_name = "N")]
    pub samples: Option<u32>,

    /// Metrics to run (latency, packet_loss, bandwidth, jitter, mtu, dns_resolution)
    #[arg(short, long, value_name = "METRIC", num_args = 1.., value_delimiter = ',')]
    pub metrics: Vec<String>,

    /// Write the JSON report to this path
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<String>,

    /// Do not save the JSON report
    #[arg(long)]
    pub no_save: bool,

    /// Mirror log output into this file
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<String>,

    /// Minimum log level (trace, debug, info, warn, error, fatal)
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Enable verbose output
    #[arg(long)]
    pub verbose: bool,

    /// Enable debug output
    #[arg(long)]
    pub debug: bool,

    /// First candidate size of the MTU search
    #[arg(long, value_name = "BYTES")]
    pub mtu_max: Option<u32>,

    /// Floor of the MTU search
    #[arg(long, value_name = "BYTES")]
    pub mtu_min: Option<u32>,

    /// Descent step of the MTU search
    #[arg(long, value_name = "BYTES")]
    pub mtu_step: Option<u32>,

    /// List the supported environment variables and exit
    #[arg(long, conflicts_with_all = ["init_env", "check_env"])]
    pub env_help: bool,

    /// Write an example .env file to PATH and exit
    #[arg(long, value_name = "PATH", conflicts_with = "check_env")]
    pub init_env: Option<PathBuf>,

    /// Check ./.env and the environment for invalid values and exit
    #[arg(long)]
    pub check_env: bool,
}

impl Cli {
    /// Check if colors should be enabled
    pub fn use_colors(&self) -> bool {
        !self.no_color && supports_color()
    }

    /// Get configuration summary for display
    pub fn get_config_summary(&self) -> String {
        let mut summary = String::new();

        summary.push_str("Command-line Overrides:\n");
        if let Some(ref target) = self.target {
            summary.push_str(&format!("  Target: {}\n", target));
        }
        if let Some(samples) = self.samples {
            summary.push_str(&format!("  Samples: {}\n", samples));
        }
        if !self.metrics.is_empty() {
            summary.push_str(&format!("  Metrics: {}\n", self.metrics.join(", ")));
        }
        if let Some(ref output) = self.output {
            summary.push_str(&format!("  Report path: {}\n", output));
        }
        summary.push_str(&format!("  Save report: {}\n", !self.no_save));
        summary.push_str(&format!("  Verbose mode: {}\n", self.verbose));
        summary.push_str(&format!("  Debug mode: {}\n", self.debug));

        summary
    }
}

/// Check if the terminal supports color output
fn supports_color() -> bool {
    if let Ok(term) = std::env::var("TERM") {
        if term == "dumb" {
            return false;
        }
    }

    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    if std::env::var("FORCE_COLOR").is_ok() {
        return true;
    }

    #[cfg(target_os = "windows")]
    {
        if std::env::var("ANSICON").is_ok() || std::env::var("ConEmuANSI").is_ok() {
            return true;
        }
    }

    cfg!(unix)
}
