//! Network Path Tester
//!
//! Runs a configurable set of independent measurement probes (latency, jitter,
//! packet loss, bandwidth, DNS resolution time and path MTU) against a target
//! host. Every probe runs under its own time budget and failure domain, so a
//! single misbehaving probe never prevents the rest of the report.

pub mod cli;
pub mod collector;
pub mod config;
pub mod error;
pub mod governor;
pub mod logging;
pub mod models;
pub mod mtu;
pub mod network;
pub mod orchestrator;
pub mod output;
pub mod probes;
pub mod stats;
pub mod types;

// Re-export commonly used types
pub use error::{AppError, ProbeError, Result};
pub use models::{Config, MetricResult, RawSample, Report, Summary};
pub use orchestrator::{ProbeOrchestrator, ProbeOutcome, RunSummary};
pub use types::{Metric, ProbeState};

/// Application version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");

/// Default configuration values
pub mod defaults {
    use std::time::Duration;

    pub const DEFAULT_TARGET_HOST: &str = "8.8.8.8";
    pub const DEFAULT_SAMPLE_SIZE: u32 = 10;
    pub const DEFAULT_SAMPLE_INTERVAL: Duration = Duration::from_millis(100);
    pub const DEFAULT_ECHO_TIMEOUT: Duration = Duration::from_secs(2);
    pub const DEFAULT_DNS_DOMAINS: &[&str] = &["google.com", "microsoft.com", "amazon.com"];
    pub const DEFAULT_DNS_TIMEOUT: Duration = Duration::from_secs(5);
    pub const DEFAULT_MTU_MAX_SIZE: u32 = 1500;
    pub const DEFAULT_MTU_STEP: u32 = 10;
    pub const DEFAULT_MTU_PROBE_TIMEOUT: Duration = Duration::from_secs(1);
    pub const DEFAULT_MTU_TIMEOUT: Duration = Duration::from_secs(10);
    pub const DEFAULT_BANDWIDTH_DOWNLOAD_URL: &str = "https://speed.cloudflare.com/__down?bytes=10000000";
    pub const DEFAULT_BANDWIDTH_UPLOAD_URL: &str = "https://speed.cloudflare.com/__up";
    pub const DEFAULT_BANDWIDTH_BYTES: u64 = 5_000_000;
    pub const DEFAULT_ENABLE_COLOR: bool = true;
}
