//! Report rendering and persistence
//!
//! Reports are rendered for the terminal through a [`ReportFormatter`] and
//! saved as pretty-printed JSON by [`ReportWriter`].

mod colored;
mod formatter;

pub use colored::{ColorScheme, ColoredFormatter, PerformanceLevel};
pub use formatter::{PlainFormatter, ReportFormatter};

use crate::{
    error::{AppError, Result},
    models::{Config, Report},
    orchestrator::RunSummary,
};
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};

/// Output formatting factory for creating appropriate formatters
pub struct OutputFormatterFactory;

impl OutputFormatterFactory {
    /// Create a formatter based on color support and preferences
    pub fn create_formatter(enable_color: bool) -> Box<dyn ReportFormatter> {
        if enable_color {
            Box::new(ColoredFormatter::new())
        } else {
            Box::new(PlainFormatter::new())
        }
    }
}

/// Renders a finished run for the console
pub struct OutputCoordinator {
    formatter: Box<dyn ReportFormatter>,
    verbose: bool,
}

impl OutputCoordinator {
    pub fn new(formatter: Box<dyn ReportFormatter>, verbose: bool) -> Self {
        Self { formatter, verbose }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            OutputFormatterFactory::create_formatter(config.enable_color),
            config.verbose || config.debug,
        )
    }

    pub fn formatter(&self) -> &dyn ReportFormatter {
        self.formatter.as_ref()
    }

    /// Report text, preceded by per-probe outcomes in verbose mode
    pub fn display_run(&self, summary: &RunSummary) -> Result<String> {
        let mut output = String::new();
        if self.verbose {
            output.push_str(&self.formatter.format_outcomes(&summary.outcomes)?);
            output.push_str("\n\n");
        }
        output.push_str(&self.formatter.format_report(&summary.report)?);
        Ok(output)
    }
}

/// Persists reports as JSON
#[derive(Debug, Clone, Default)]
pub struct ReportWriter {
    path: Option<PathBuf>,
}

impl ReportWriter {
    /// Writer targeting `path`, or a timestamped file in the working directory
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.report_path.as_ref().map(PathBuf::from))
    }

    /// File name used when no explicit path is configured
    pub fn default_file_name(now: DateTime<Local>) -> String {
        format!("network_test_report_{}.json", now.format("%Y%m%d_%H%M%S"))
    }

    /// Path the next save will write to
    pub fn target_path(&self) -> PathBuf {
        self.path
            .clone()
            .unwrap_or_else(|| PathBuf::from(Self::default_file_name(Local::now())))
    }

    /// Write the report and return where it went
    pub fn save(&self, report: &Report) -> Result<PathBuf> {
        let path = self.target_path();
        write_json(&path, report)?;
        Ok(path)
    }
}

fn write_json(path: &Path, report: &Report) -> Result<()> {
    let json = report.to_json_pretty()?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| {
            AppError::io(format!("Failed to create directory {}: {}", parent.display(), e))
        })?;
    }

    std::fs::write(path, json)
        .map_err(|e| AppError::io(format!("Failed to write report to {}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::metrics::{MetricResult, PathMtu, Summary};
    use crate::types::Metric;
    use chrono::TimeZone;
    use std::time::Duration;

    fn report() -> Report {
        let mut report = Report::new();
        report
            .record(
                Metric::Latency,
                Some(MetricResult::Latency(Summary { average: 12.33, min: 10.0, max: 15.0 })),
            )
            .unwrap();
        report
            .record(Metric::Mtu, Some(MetricResult::Mtu(PathMtu { size_bytes: 1500, suspicious: false })))
            .unwrap();
        report.record(Metric::Bandwidth, None).unwrap();
        report
    }

    #[test]
    fn test_default_file_name() {
        let now = Local.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        assert_eq!(
            ReportWriter::default_file_name(now),
            "network_test_report_20240309_070501.json"
        );
    }

    #[test]
    fn test_save_to_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("report.json");

        let written = ReportWriter::new(Some(path.clone())).save(&report()).unwrap();
        assert_eq!(written, path);

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["latency"]["average_ms"], 12.33);
        assert_eq!(json["mtu"]["size_bytes"], 1500);
        assert!(json["bandwidth"].is_null());
    }

    #[test]
    fn test_saved_keys_keep_execution_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        ReportWriter::new(Some(path.clone())).save(&report()).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let latency = text.find("\"latency\"").unwrap();
        let mtu = text.find("\"mtu\"").unwrap();
        let bandwidth = text.find("\"bandwidth\"").unwrap();
        assert!(latency < mtu && mtu < bandwidth);
    }

    #[test]
    fn test_unwritable_path_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        // A directory cannot be overwritten by a file
        let err = ReportWriter::new(Some(dir.path().to_path_buf())).save(&report()).unwrap_err();
        assert_eq!(err.category(), "IO");
    }

    #[test]
    fn test_coordinator_verbose_lists_outcomes() {
        let summary = RunSummary {
            report: report(),
            outcomes: Vec::new(),
            elapsed: Duration::from_millis(10),
        };

        let quiet = OutputCoordinator::new(Box::new(PlainFormatter::new()), false);
        assert!(!quiet.display_run(&summary).unwrap().contains("Probe Outcomes"));

        let verbose = OutputCoordinator::new(Box::new(PlainFormatter::new()), true);
        let text = verbose.display_run(&summary).unwrap();
        assert!(text.starts_with("Probe Outcomes:"));
        assert!(text.contains("=== Network Performance Test Report ==="));
    }
}
