//! Core formatting trait and the plain text implementation

use crate::{
    error::{AppError, Result},
    models::metrics::{MetricResult, Report},
    orchestrator::ProbeOutcome,
    types::Metric,
};
use std::fmt::Write as _;

pub(crate) const REPORT_TITLE: &str = "Network Performance Test Report";
pub(crate) const NO_RESULT: &str = "Test failed or not executed";

/// Main trait for report formatting
pub trait ReportFormatter {
    /// Format a header section
    fn format_header(&self, title: &str) -> Result<String>;

    /// Format one metric section; `None` renders the failure line
    fn format_section(&self, metric: Metric, result: Option<&MetricResult>) -> Result<String>;

    /// Closing rule under the report
    fn format_footer(&self) -> Result<String>;

    /// Per-probe state, timing and message, shown in verbose mode
    fn format_outcomes(&self, outcomes: &[ProbeOutcome]) -> Result<String>;

    /// Format error messages
    fn format_error(&self, error: &str) -> Result<String>;

    /// Format warning messages
    fn format_warning(&self, warning: &str) -> Result<String>;

    /// Format success messages
    fn format_success(&self, message: &str) -> Result<String>;

    /// Render a whole report in execution order
    fn format_report(&self, report: &Report) -> Result<String> {
        let mut output = self.format_header(REPORT_TITLE)?;
        for entry in report.entries() {
            output.push_str("\n\n");
            output.push_str(&self.format_section(entry.metric, entry.result.as_ref())?);
        }
        output.push_str("\n\n");
        output.push_str(&self.format_footer()?);
        Ok(output)
    }
}

/// Plain text formatter mirroring the classic report layout
#[derive(Debug, Clone, Default)]
pub struct PlainFormatter;

impl PlainFormatter {
    pub fn new() -> Self {
        Self
    }
}

pub(crate) fn fmt_err(e: std::fmt::Error) -> AppError {
    AppError::io(format!("Failed to format output: {}", e))
}

pub(crate) fn footer_rule() -> String {
    "=".repeat(REPORT_TITLE.len() + 8)
}

impl ReportFormatter for PlainFormatter {
    fn format_header(&self, title: &str) -> Result<String> {
        Ok(format!("=== {} ===", title))
    }

    fn format_section(&self, metric: Metric, result: Option<&MetricResult>) -> Result<String> {
        let mut output = String::new();
        write!(output, "{}:", metric.as_str().to_uppercase()).map_err(fmt_err)?;

        match result {
            Some(result) => {
                for (key, value) in result.fields() {
                    write!(output, "\n  {}: {}", key, value).map_err(fmt_err)?;
                }
            }
            None => write!(output, "\n  {}", NO_RESULT).map_err(fmt_err)?,
        }

        Ok(output)
    }

    fn format_footer(&self) -> Result<String> {
        Ok(footer_rule())
    }

    fn format_outcomes(&self, outcomes: &[ProbeOutcome]) -> Result<String> {
        let mut output = String::from("Probe Outcomes:");
        for outcome in outcomes {
            write!(
                output,
                "\n  {:<16} {:<10} {:>9.1}ms  {}",
                outcome.metric.as_str(),
                outcome.state.as_str(),
                outcome.elapsed.as_secs_f64() * 1000.0,
                outcome.message
            )
            .map_err(fmt_err)?;
        }
        Ok(output)
    }

    fn format_error(&self, error: &str) -> Result<String> {
        Ok(format!("ERROR: {}", error))
    }

    fn format_warning(&self, warning: &str) -> Result<String> {
        Ok(format!("WARNING: {}", warning))
    }

    fn format_success(&self, message: &str) -> Result<String> {
        Ok(format!("OK: {}", message))
    }
}
