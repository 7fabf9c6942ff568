//! Environment variable handling and .env file management

use crate::error::{AppError, Result};
use crate::types::Metric;
use std::path::Path;

/// Environment variable configuration manager
pub struct EnvManager;

impl EnvManager {
    /// Load .env file if it exists
    pub fn load_env_file(debug: bool) -> Result<()> {
        Self::load_env_file_from(Path::new(".env"), debug)
    }

    /// Load a specific env file if it exists; variables already set win
    pub fn load_env_file_from(path: &Path, debug: bool) -> Result<()> {
        if path.exists() {
            dotenv::from_path(path)?;

            if debug {
                eprintln!("Loaded configuration from {}", path.display());
            }
        } else if debug {
            eprintln!("No {} file found, using defaults and CLI arguments", path.display());
        }

        Ok(())
    }

    /// Create example .env file content
    pub fn create_example_env_content() -> String {
        r#"# Network Path Tester Configuration
#
# Values here act as defaults and can be overridden by environment
# variables or command-line arguments.

# Host every probe is aimed at
# TARGET_HOST=8.8.8.8

# Echo requests per sample-based metric (0-1000)
# SAMPLE_SIZE=10

# Metrics to run (comma-separated); empty runs all of them
# Known: latency, packet_loss, bandwidth, jitter, mtu, dns_resolution
# METRICS=latency,packet_loss,jitter

# Pause between consecutive echo requests in milliseconds
# SAMPLE_INTERVAL_MS=100

# Reply deadline of a single echo request in milliseconds
# ECHO_TIMEOUT_MS=2000

# Domains timed by the DNS probe (comma-separated)
# DNS_DOMAINS=google.com,microsoft.com,amazon.com

# Path MTU search
# MTU_MAX_SIZE=1500
# MTU_MIN_SIZE=0
# MTU_STEP=10
# MTU_TIMEOUT_SECS=10

# Bandwidth endpoints
# BANDWIDTH_DOWNLOAD_URL=https://speed.cloudflare.com/__down?bytes=10000000
# BANDWIDTH_UPLOAD_URL=https://speed.cloudflare.com/__up

# Enable colored output (true/false)
# ENABLE_COLOR=true

# Mirror log output into a file
# LOG_FILE=network_test.log

# Minimum log level (trace, debug, info, warn, error, fatal)
# LOG_LEVEL=info

# Example configurations for different scenarios:
#
# Quick reachability check:
# METRICS=latency,packet_loss
# SAMPLE_SIZE=5
#
# Jumbo frame path:
# METRICS=mtu
# MTU_MAX_SIZE=9000
# MTU_STEP=100
"#.to_string()
    }

    /// Save example .env file to disk
    pub fn save_example_env_file(path: &Path) -> Result<()> {
        let content = Self::create_example_env_content();
        std::fs::write(path, content)
            .map_err(|e| AppError::config(format!("Failed to write example .env file: {}", e)))?;

        Ok(())
    }

    /// Validate environment variable format before parsing
    pub fn validate_env_var(key: &str, value: &str) -> Result<()> {
        let value = value.trim();
        match key {
            "TARGET_HOST" => {
                if value.is_empty() || value.contains(char::is_whitespace) {
                    return Err(AppError::config(format!("Invalid TARGET_HOST value '{}'", value)));
                }
            }
            "SAMPLE_SIZE" => {
                let size: u32 = parse_number(key, value)?;
                if size > 1000 {
                    return Err(AppError::config(format!("SAMPLE_SIZE must be between 0 and 1000, got: {}", size)));
                }
            }
            "METRICS" => {
                let names = crate::models::config::split_list(value);
                Metric::parse_list(&names)?;
            }
            "SAMPLE_INTERVAL_MS" => {
                let interval: u64 = parse_number(key, value)?;
                if interval > 10_000 {
                    return Err(AppError::config(format!("SAMPLE_INTERVAL_MS cannot exceed 10000, got: {}", interval)));
                }
            }
            "ECHO_TIMEOUT_MS" | "MTU_STEP" | "MTU_TIMEOUT_SECS" => {
                let number: u64 = parse_number(key, value)?;
                let max = match key {
                    "ECHO_TIMEOUT_MS" => 60_000,
                    "MTU_TIMEOUT_SECS" => 3_600,
                    _ => 65_535,
                };
                if number == 0 || number > max {
                    return Err(AppError::config(format!("{} must be between 1 and {}, got: {}", key, max, number)));
                }
            }
            "MTU_MAX_SIZE" | "MTU_MIN_SIZE" => {
                let size: u32 = parse_number(key, value)?;
                if size > 65_535 {
                    return Err(AppError::config(format!("{} cannot exceed 65535, got: {}", key, size)));
                }
            }
            "DNS_DOMAINS" => {
                if crate::models::config::split_list(value).is_empty() {
                    return Err(AppError::config("DNS_DOMAINS must name at least one domain"));
                }
            }
            "BANDWIDTH_DOWNLOAD_URL" | "BANDWIDTH_UPLOAD_URL" => {
                let parsed = url::Url::parse(value)
                    .map_err(|e| AppError::config(format!("Invalid {} value '{}': {}", key, value, e)))?;
                if parsed.scheme() != "http" && parsed.scheme() != "https" {
                    return Err(AppError::config(format!("{} must use http or https: {}", key, value)));
                }
            }
            "ENABLE_COLOR" => {
                value.parse::<bool>()
                    .map_err(|e| AppError::config(format!("Invalid ENABLE_COLOR value '{}': {}", value, e)))?;
            }
            "LOG_LEVEL" => {
                value.parse::<crate::logging::LogLevel>()?;
            }
            _ => {
                // LOG_FILE and unknown variables need no checks
            }
        }

        Ok(())
    }

    /// Get list of all supported environment variables with descriptions
    pub fn get_supported_env_vars() -> Vec<(&'static str, &'static str, &'static str)> {
        vec![
            ("TARGET_HOST", "Host every probe is aimed at", "8.8.8.8"),
            ("SAMPLE_SIZE", "Echo requests per sample metric (0-1000)", "10"),
            ("METRICS", "Comma-separated metrics to run", "latency,packet_loss,jitter"),
            ("SAMPLE_INTERVAL_MS", "Pause between echo requests (ms)", "100"),
            ("ECHO_TIMEOUT_MS", "Reply deadline of one echo request (ms)", "2000"),
            ("DNS_DOMAINS", "Comma-separated domains to resolve", "google.com,microsoft.com"),
            ("MTU_MAX_SIZE", "First candidate of the MTU search", "1500"),
            ("MTU_MIN_SIZE", "Floor of the MTU search", "0"),
            ("MTU_STEP", "Descent step of the MTU search", "10"),
            ("MTU_TIMEOUT_SECS", "Budget of the whole MTU search", "10"),
            ("BANDWIDTH_DOWNLOAD_URL", "Endpoint for the download measurement", "https://speed.cloudflare.com/__down?bytes=10000000"),
            ("BANDWIDTH_UPLOAD_URL", "Endpoint for the upload measurement", "https://speed.cloudflare.com/__up"),
            ("ENABLE_COLOR", "Enable colored output", "true"),
            ("LOG_FILE", "Mirror log output into this file", "network_test.log"),
            ("LOG_LEVEL", "Minimum log level", "info"),
        ]
    }

    /// Display environment variable help
    pub fn display_env_help() -> String {
        let mut help = String::new();
        help.push_str("Supported Environment Variables:\n\n");

        for (var, description, example) in Self::get_supported_env_vars() {
            help.push_str(&format!("  {:<24} {}\n", var, description));
            help.push_str(&format!("  {:<24} Example: {}\n\n", "", example));
        }

        help.push_str("Configuration Priority (highest to lowest):\n");
        help.push_str("  1. Command-line arguments\n");
        help.push_str("  2. Environment variables\n");
        help.push_str("  3. .env file values\n");
        help.push_str("  4. Default values\n");

        help
    }

    /// Validate all currently set environment variables
    pub fn validate_current_env() -> Vec<String> {
        Self::get_supported_env_vars()
            .into_iter()
            .filter_map(|(var_name, _, _)| {
                let value = std::env::var(var_name).ok()?;
                Self::validate_env_var(var_name, &value)
                    .err()
                    .map(|e| format!("Warning: {}", e))
            })
            .collect()
    }

    /// Validate the entries of an env file; `None` when it does not exist
    pub fn check_env_file(path: &Path) -> Result<Option<Vec<String>>> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::config(format!("Failed to read {}: {}", path.display(), e)))?;

        let mut warnings = Vec::new();

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some((key, value)) = line.split_once('=') {
                if let Err(e) = Self::validate_env_var(key.trim(), value) {
                    warnings.push(format!("Line '{}': {}", line, e));
                }
            }
        }

        Ok(Some(warnings))
    }
}

fn parse_number<T>(key: &str, value: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|e| AppError::config(format!("Invalid {} value '{}': {}", key, value, e)))
}
