//! Configuration parsing from CLI arguments and environment variables

use crate::{cli::Cli, config::env::EnvManager, error::Result, models::Config};

/// Configuration parser that combines CLI arguments with environment variables
pub struct ConfigParser {
    cli: Cli,
}

impl ConfigParser {
    /// Create a new configuration parser with CLI arguments
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Parse and build the complete configuration
    pub fn parse(&self) -> Result<Config> {
        let mut config = Config::default();

        self.load_env_file()?;
        config.merge_from_env()?;
        self.apply_cli_overrides(&mut config);
        config.validate()?;

        Ok(config)
    }

    /// Load .env file if it exists
    fn load_env_file(&self) -> Result<()> {
        EnvManager::load_env_file(self.cli.debug)
    }

    /// Apply CLI argument overrides to configuration
    fn apply_cli_overrides(&self, config: &mut Config) {
        let cli = &self.cli;

        if let Some(ref target) = cli.target {
            config.target_host = target.trim().to_string();
        }

        if let Some(samples) = cli.samples {
            config.sample_size = samples;
        }

        if !cli.metrics.is_empty() {
            config.metrics = cli.metrics.clone();
        }

        if let Some(ref output) = cli.output {
            config.report_path = Some(output.clone());
        }

        if cli.no_save {
            config.save_report = false;
        }

        if let Some(ref log_file) = cli.log_file {
            config.log_file = Some(log_file.clone());
        }

        if let Some(ref level) = cli.log_level {
            config.log_level = Some(level.clone());
        }

        if cli.no_color {
            config.enable_color = false;
        }

        if let Some(max) = cli.mtu_max {
            config.mtu_max_size = max;
        }

        if let Some(min) = cli.mtu_min {
            config.mtu_min_size = min;
        }

        if let Some(step) = cli.mtu_step {
            config.mtu_step = step;
        }

        // CLI-only flags
        config.verbose = cli.verbose;
        config.debug = cli.debug;

        if config.debug {
            eprintln!("Applied CLI overrides to configuration");
            eprintln!("{}", display_config_summary(config));
        }
    }
}

/// Convenience function to load complete configuration from CLI arguments
pub fn load_config(cli: Cli) -> Result<Config> {
    ConfigParser::new(cli).parse()
}

/// Display configuration summary for debug purposes
pub fn display_config_summary(config: &Config) -> String {
    let metrics = match config.requested_metrics() {
        Ok(metrics) => metrics.iter().map(|m| m.as_str()).collect::<Vec<_>>().join(", "),
        Err(_) => config.metrics.join(", "),
    };

    let mut summary = Vec::new();

    summary.push(format!("Target: {}", config.target_host));
    summary.push(format!("Metrics: {}", metrics));
    summary.push(format!("Sample Size: {}", config.sample_size));
    summary.push(format!("Sample Interval: {}ms", config.sample_interval_ms));
    summary.push(format!("Echo Timeout: {}ms", config.echo_timeout_ms));
    summary.push(format!("DNS Domains: {}", config.dns_domains.join(", ")));
    summary.push(format!(
        "MTU Search: {} down to {} in steps of {} ({}s budget)",
        config.mtu_max_size, config.mtu_min_size, config.mtu_step, config.mtu_timeout_secs
    ));
    summary.push(format!("Bandwidth Download: {}", config.bandwidth_download_url));
    summary.push(format!("Bandwidth Upload: {}", config.bandwidth_upload_url));
    summary.push(format!(
        "Report: {}",
        match (&config.report_path, config.save_report) {
            (_, false) => "not saved".to_string(),
            (Some(path), true) => path.clone(),
            (None, true) => "timestamped file".to_string(),
        }
    ));
    summary.push(format!("Color Output: {}", config.enable_color));
    summary.push(format!("Verbose: {}", config.verbose));
    summary.push(format!("Debug: {}", config.debug));

    summary.join("\n")
}
