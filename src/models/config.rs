//! Configuration data model and validation

use crate::types::{AppError, Metric, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Slack added on top of the computed budget of each governed probe
const PROBE_BUDGET_SLACK: Duration = Duration::from_secs(5);

/// Grace period between the MTU search deadline and the orchestrator's own budget
const MTU_BUDGET_GRACE: Duration = Duration::from_secs(2);

const MAX_ECHO_TIMEOUT_MS: u64 = 60_000;
const MAX_DNS_TIMEOUT_SECS: u64 = 300;
const MAX_MTU_PROBE_TIMEOUT_MS: u64 = 60_000;
const MAX_MTU_TIMEOUT_SECS: u64 = 3_600;
const MAX_BANDWIDTH_TIMEOUT_SECS: u64 = 86_400;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Host every probe is aimed at
    #[serde(default = "default_target_host")]
    pub target_host: String,

    /// Number of echo requests for sample-based metrics
    #[serde(default = "default_sample_size")]
    pub sample_size: u32,

    /// Requested metric names; empty means all, in canonical order
    #[serde(default)]
    pub metrics: Vec<String>,

    /// Pause between consecutive samples
    #[serde(default = "default_sample_interval_ms")]
    pub sample_interval_ms: u64,

    /// Reply deadline of a single echo request
    #[serde(default = "default_echo_timeout_ms")]
    pub echo_timeout_ms: u64,

    /// Domains resolved by the DNS probe
    #[serde(default = "default_dns_domains")]
    pub dns_domains: Vec<String>,

    /// Deadline of a single DNS lookup
    #[serde(default = "default_dns_timeout_secs")]
    pub dns_timeout_secs: u64,

    /// First candidate of the MTU search
    #[serde(default = "default_mtu_max_size")]
    pub mtu_max_size: u32,

    /// Floor of the MTU search
    #[serde(default)]
    pub mtu_min_size: u32,

    /// Descent step of the MTU search
    #[serde(default = "default_mtu_step")]
    pub mtu_step: u32,

    /// Reply deadline of a single sized probe
    #[serde(default = "default_mtu_probe_timeout_ms")]
    pub mtu_probe_timeout_ms: u64,

    /// Budget of the whole MTU search
    #[serde(default = "default_mtu_timeout_secs")]
    pub mtu_timeout_secs: u64,

    /// Endpoint streaming bytes for the download measurement
    #[serde(default = "default_bandwidth_download_url")]
    pub bandwidth_download_url: String,

    /// Endpoint accepting bytes for the upload measurement
    #[serde(default = "default_bandwidth_upload_url")]
    pub bandwidth_upload_url: String,

    /// Payload size of each bandwidth transfer
    #[serde(default = "default_bandwidth_bytes")]
    pub bandwidth_bytes: u64,

    /// Optional outer budget for bandwidth; unset by default
    #[serde(default)]
    pub bandwidth_timeout_secs: Option<u64>,

    /// Where to write the JSON report; `None` picks a timestamped file name
    #[serde(default)]
    pub report_path: Option<String>,

    /// Persist the report after the run
    #[serde(default = "default_save_report")]
    pub save_report: bool,

    /// Mirror log output into this file
    #[serde(default)]
    pub log_file: Option<String>,

    /// Explicit minimum log level, overriding verbose/debug
    #[serde(default)]
    pub log_level: Option<String>,

    /// Enable colored terminal output
    #[serde(default = "default_enable_color")]
    pub enable_color: bool,

    /// Enable verbose output
    #[serde(default)]
    pub verbose: bool,

    /// Enable debug output
    #[serde(default)]
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            target_host: default_target_host(),
            sample_size: default_sample_size(),
            metrics: Vec::new(),
            sample_interval_ms: default_sample_interval_ms(),
            echo_timeout_ms: default_echo_timeout_ms(),
            dns_domains: default_dns_domains(),
            dns_timeout_secs: default_dns_timeout_secs(),
            mtu_max_size: default_mtu_max_size(),
            mtu_min_size: 0,
            mtu_step: default_mtu_step(),
            mtu_probe_timeout_ms: default_mtu_probe_timeout_ms(),
            mtu_timeout_secs: default_mtu_timeout_secs(),
            bandwidth_download_url: default_bandwidth_download_url(),
            bandwidth_upload_url: default_bandwidth_upload_url(),
            bandwidth_bytes: default_bandwidth_bytes(),
            bandwidth_timeout_secs: None,
            report_path: None,
            save_report: default_save_report(),
            log_file: None,
            log_level: None,
            enable_color: default_enable_color(),
            verbose: false,
            debug: false,
        }
    }
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sample_interval(&self) -> Duration {
        Duration::from_millis(self.sample_interval_ms)
    }

    pub fn echo_timeout(&self) -> Duration {
        Duration::from_millis(self.echo_timeout_ms)
    }

    pub fn dns_timeout(&self) -> Duration {
        Duration::from_secs(self.dns_timeout_secs)
    }

    pub fn mtu_probe_timeout(&self) -> Duration {
        Duration::from_millis(self.mtu_probe_timeout_ms)
    }

    pub fn mtu_timeout(&self) -> Duration {
        Duration::from_secs(self.mtu_timeout_secs)
    }

    /// Metrics to run, in execution order
    pub fn requested_metrics(&self) -> Result<Vec<Metric>> {
        Metric::parse_list(&self.metrics)
    }

    /// Time budget the orchestrator grants a metric; `None` means unbounded
    pub fn metric_timeout(&self, metric: Metric) -> Option<Duration> {
        self.metric_timeout_for(metric, self.sample_size)
    }

    /// Like [`metric_timeout`](Self::metric_timeout) for an explicit sample count.
    ///
    /// A budget too large for `Duration` is treated as unbounded.
    pub fn metric_timeout_for(&self, metric: Metric, sample_size: u32) -> Option<Duration> {
        match metric {
            Metric::Latency | Metric::PacketLoss | Metric::Jitter => self
                .echo_timeout()
                .checked_add(self.sample_interval())?
                .checked_mul(sample_size)?
                .checked_add(PROBE_BUDGET_SLACK),
            Metric::DnsResolution => {
                let domains = u32::try_from(self.dns_domains.len()).ok()?;
                self.dns_timeout()
                    .checked_mul(domains)?
                    .checked_add(PROBE_BUDGET_SLACK)
            }
            Metric::Mtu => self.mtu_timeout().checked_add(MTU_BUDGET_GRACE),
            // Transfers are inherently slow; only bounded when explicitly configured
            Metric::Bandwidth => self.bandwidth_timeout_secs.map(Duration::from_secs),
        }
    }

    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Result<()> {
        if self.target_host.trim().is_empty() {
            return Err(AppError::config("Target host cannot be empty"));
        }

        if self.target_host.contains(char::is_whitespace) {
            return Err(AppError::config(format!("Invalid target host '{}'", self.target_host)));
        }

        // Unknown metric names are fatal before any probe starts
        self.requested_metrics()?;

        if self.sample_size > 1000 {
            return Err(AppError::config("Sample size cannot exceed 1000"));
        }

        if self.sample_interval_ms > 10_000 {
            return Err(AppError::config("Sample interval cannot exceed 10000ms"));
        }

        if self.echo_timeout_ms == 0 || self.echo_timeout_ms > MAX_ECHO_TIMEOUT_MS {
            return Err(AppError::config(format!(
                "Echo timeout must be between 1 and {}ms, got: {}",
                MAX_ECHO_TIMEOUT_MS, self.echo_timeout_ms
            )));
        }

        if self.dns_domains.iter().all(|d| d.trim().is_empty()) {
            return Err(AppError::config("At least one DNS domain is required"));
        }

        if self.dns_timeout_secs == 0 || self.dns_timeout_secs > MAX_DNS_TIMEOUT_SECS {
            return Err(AppError::config(format!(
                "DNS timeout must be between 1 and {}s, got: {}",
                MAX_DNS_TIMEOUT_SECS, self.dns_timeout_secs
            )));
        }

        if self.mtu_step == 0 {
            return Err(AppError::config("MTU step must be greater than 0"));
        }

        if self.mtu_min_size >= self.mtu_max_size {
            return Err(AppError::config(format!(
                "MTU minimum ({}) must be below the maximum ({})",
                self.mtu_min_size, self.mtu_max_size
            )));
        }

        if self.mtu_max_size > 65_535 {
            return Err(AppError::config("MTU maximum cannot exceed 65535 bytes"));
        }

        if self.mtu_probe_timeout_ms == 0 || self.mtu_timeout_secs == 0 {
            return Err(AppError::config("MTU timeouts must be greater than 0"));
        }

        if self.mtu_probe_timeout_ms > MAX_MTU_PROBE_TIMEOUT_MS || self.mtu_timeout_secs > MAX_MTU_TIMEOUT_SECS {
            return Err(AppError::config(format!(
                "MTU timeouts cannot exceed {}ms per probe and {}s overall",
                MAX_MTU_PROBE_TIMEOUT_MS, MAX_MTU_TIMEOUT_SECS
            )));
        }

        for (name, raw) in [
            ("download", &self.bandwidth_download_url),
            ("upload", &self.bandwidth_upload_url),
        ] {
            let parsed = url::Url::parse(raw)
                .map_err(|e| AppError::config(format!("Invalid bandwidth {} URL '{}': {}", name, raw, e)))?;
            if parsed.scheme() != "http" && parsed.scheme() != "https" {
                return Err(AppError::config(format!(
                    "Bandwidth {} URL must use http or https: {}",
                    name, raw
                )));
            }
        }

        if self.bandwidth_bytes == 0 {
            return Err(AppError::config("Bandwidth transfer size must be greater than 0"));
        }

        if let Some(secs) = self.bandwidth_timeout_secs {
            if secs == 0 || secs > MAX_BANDWIDTH_TIMEOUT_SECS {
                return Err(AppError::config(format!(
                    "Bandwidth timeout must be between 1 and {}s when set, got: {}",
                    MAX_BANDWIDTH_TIMEOUT_SECS, secs
                )));
            }
        }

        if let Some(ref level) = self.log_level {
            level.parse::<crate::logging::LogLevel>()?;
        }

        Ok(())
    }

    /// Merge environment variables into this configuration
    pub fn merge_from_env(&mut self) -> Result<()> {
        if let Ok(target) = std::env::var("TARGET_HOST") {
            let target = target.trim();
            if !target.is_empty() {
                self.target_host = target.to_string();
            }
        }

        if let Ok(sample_size) = std::env::var("SAMPLE_SIZE") {
            self.sample_size = sample_size.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid SAMPLE_SIZE value '{}': {}", sample_size, e)))?;
        }

        if let Ok(metrics) = std::env::var("METRICS") {
            self.metrics = split_list(&metrics);
        }

        if let Ok(interval) = std::env::var("SAMPLE_INTERVAL_MS") {
            self.sample_interval_ms = interval.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid SAMPLE_INTERVAL_MS value '{}': {}", interval, e)))?;
        }

        if let Ok(timeout) = std::env::var("ECHO_TIMEOUT_MS") {
            self.echo_timeout_ms = timeout.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid ECHO_TIMEOUT_MS value '{}': {}", timeout, e)))?;
        }

        if let Ok(domains) = std::env::var("DNS_DOMAINS") {
            self.dns_domains = split_list(&domains);
        }

        if let Ok(max) = std::env::var("MTU_MAX_SIZE") {
            self.mtu_max_size = max.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid MTU_MAX_SIZE value '{}': {}", max, e)))?;
        }

        if let Ok(min) = std::env::var("MTU_MIN_SIZE") {
            self.mtu_min_size = min.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid MTU_MIN_SIZE value '{}': {}", min, e)))?;
        }

        if let Ok(step) = std::env::var("MTU_STEP") {
            self.mtu_step = step.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid MTU_STEP value '{}': {}", step, e)))?;
        }

        if let Ok(timeout) = std::env::var("MTU_TIMEOUT_SECS") {
            self.mtu_timeout_secs = timeout.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid MTU_TIMEOUT_SECS value '{}': {}", timeout, e)))?;
        }

        if let Ok(url) = std::env::var("BANDWIDTH_DOWNLOAD_URL") {
            self.bandwidth_download_url = url.trim().to_string();
        }

        if let Ok(url) = std::env::var("BANDWIDTH_UPLOAD_URL") {
            self.bandwidth_upload_url = url.trim().to_string();
        }

        if let Ok(enable_color) = std::env::var("ENABLE_COLOR") {
            self.enable_color = enable_color.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid ENABLE_COLOR value '{}': {}", enable_color, e)))?;
        }

        if let Ok(log_file) = std::env::var("LOG_FILE") {
            let log_file = log_file.trim();
            if !log_file.is_empty() {
                self.log_file = Some(log_file.to_string());
            }
        }

        if let Ok(level) = std::env::var("LOG_LEVEL") {
            let level = level.trim();
            if !level.is_empty() {
                self.log_level = Some(level.to_string());
            }
        }

        Ok(())
    }
}

/// Split a comma or whitespace separated list, dropping empty items
pub(crate) fn split_list(raw: &str) -> Vec<String> {
    raw.split(|c: char| c == ',' || c.is_whitespace())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

// Default value functions for serde
fn default_target_host() -> String {
    crate::defaults::DEFAULT_TARGET_HOST.to_string()
}

fn default_sample_size() -> u32 {
    crate::defaults::DEFAULT_SAMPLE_SIZE
}

fn default_sample_interval_ms() -> u64 {
    crate::defaults::DEFAULT_SAMPLE_INTERVAL.as_millis() as u64
}

fn default_echo_timeout_ms() -> u64 {
    crate::defaults::DEFAULT_ECHO_TIMEOUT.as_millis() as u64
}

fn default_dns_domains() -> Vec<String> {
    crate::defaults::DEFAULT_DNS_DOMAINS
        .iter()
        .map(|&s| s.to_string())
        .collect()
}

fn default_dns_timeout_secs() -> u64 {
    crate::defaults::DEFAULT_DNS_TIMEOUT.as_secs()
}

fn default_mtu_max_size() -> u32 {
    crate::defaults::DEFAULT_MTU_MAX_SIZE
}

fn default_mtu_step() -> u32 {
    crate::defaults::DEFAULT_MTU_STEP
}

fn default_mtu_probe_timeout_ms() -> u64 {
    crate::defaults::DEFAULT_MTU_PROBE_TIMEOUT.as_millis() as u64
}

fn default_mtu_timeout_secs() -> u64 {
    crate::defaults::DEFAULT_MTU_TIMEOUT.as_secs()
}

fn default_bandwidth_download_url() -> String {
    crate::defaults::DEFAULT_BANDWIDTH_DOWNLOAD_URL.to_string()
}

fn default_bandwidth_upload_url() -> String {
    crate::defaults::DEFAULT_BANDWIDTH_UPLOAD_URL.to_string()
}

fn default_bandwidth_bytes() -> u64 {
    crate::defaults::DEFAULT_BANDWIDTH_BYTES
}

fn default_save_report() -> bool {
    true
}

fn default_enable_color() -> bool {
    crate::defaults::DEFAULT_ENABLE_COLOR
}
