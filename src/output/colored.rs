//! Colored formatter implementation with terminal color support

use super::formatter::{fmt_err, footer_rule, ReportFormatter, NO_RESULT};
use crate::{
    error::Result,
    models::metrics::{FieldValue, MetricResult},
    orchestrator::ProbeOutcome,
    types::{Metric, ProbeState},
};
use colored::*;
use std::fmt::Write as _;

/// Performance level classification for color coding
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PerformanceLevel {
    Excellent,
    Good,
    Fair,
    Poor,
    VeryPoor,
}

impl PerformanceLevel {
    /// Classify a round-trip or lookup time in milliseconds
    pub fn from_response_time(time_ms: f64) -> Self {
        if time_ms < 50.0 {
            Self::Excellent
        } else if time_ms < 100.0 {
            Self::Good
        } else if time_ms < 300.0 {
            Self::Fair
        } else if time_ms < 1000.0 {
            Self::Poor
        } else {
            Self::VeryPoor
        }
    }

    /// Classify a packet loss percentage
    pub fn from_loss_rate(percent: f64) -> Self {
        if percent <= 0.0 {
            Self::Excellent
        } else if percent < 1.0 {
            Self::Good
        } else if percent < 5.0 {
            Self::Fair
        } else if percent < 20.0 {
            Self::Poor
        } else {
            Self::VeryPoor
        }
    }

    /// Get color for this performance level
    pub fn color(&self) -> Color {
        match self {
            Self::Excellent => Color::Green,
            Self::Good => Color::Cyan,
            Self::Fair => Color::Yellow,
            Self::Poor => Color::Magenta,
            Self::VeryPoor => Color::Red,
        }
    }

    /// Get descriptive text
    pub fn description(&self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::Fair => "Fair",
            Self::Poor => "Poor",
            Self::VeryPoor => "Very Poor",
        }
    }
}

/// Color scheme configuration
#[derive(Debug, Clone)]
pub struct ColorScheme {
    pub header: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub info: Color,
    pub muted: Color,
    pub border: Color,
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self {
            header: Color::Blue,
            success: Color::Green,
            warning: Color::Yellow,
            error: Color::Red,
            info: Color::Cyan,
            muted: Color::BrightBlack,
            border: Color::BrightBlack,
        }
    }
}

/// Colored formatter implementation
#[derive(Debug, Clone, Default)]
pub struct ColoredFormatter {
    color_scheme: ColorScheme,
}

impl ColoredFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a colored formatter with custom color scheme
    pub fn with_color_scheme(color_scheme: ColorScheme) -> Self {
        Self { color_scheme }
    }

    /// Color of a field value given the metric it belongs to
    fn value_color(&self, metric: Metric, key: &str, value: FieldValue) -> Color {
        match (metric, value) {
            (_, FieldValue::Missing) => self.color_scheme.error,
            (Metric::Mtu, FieldValue::Flag(true)) => self.color_scheme.warning,
            (Metric::PacketLoss, FieldValue::Float(v)) if key == "loss_rate_percent" => {
                PerformanceLevel::from_loss_rate(v).color()
            }
            (Metric::Latency | Metric::DnsResolution, FieldValue::Float(v)) => {
                PerformanceLevel::from_response_time(v).color()
            }
            // Jitter tolerates a tenth of what latency does
            (Metric::Jitter, FieldValue::Float(v)) => {
                PerformanceLevel::from_response_time(v * 10.0).color()
            }
            _ => self.color_scheme.info,
        }
    }
}

impl ReportFormatter for ColoredFormatter {
    fn format_header(&self, title: &str) -> Result<String> {
        Ok(format!(
            "{} {} {}",
            "===".color(self.color_scheme.border),
            title.bold().color(self.color_scheme.header),
            "===".color(self.color_scheme.border)
        ))
    }

    fn format_section(&self, metric: Metric, result: Option<&MetricResult>) -> Result<String> {
        let mut output = String::new();
        write!(output, "{}", format!("{}:", metric.as_str().to_uppercase()).bold())
            .map_err(fmt_err)?;

        match result {
            Some(result) => {
                for (key, value) in result.fields() {
                    let rendered = value.to_string().color(self.value_color(metric, key, value));
                    write!(output, "\n  {}: {}", key.color(self.color_scheme.muted), rendered)
                        .map_err(fmt_err)?;
                }
            }
            None => {
                write!(output, "\n  {}", NO_RESULT.color(self.color_scheme.error)).map_err(fmt_err)?
            }
        }

        Ok(output)
    }

    fn format_footer(&self) -> Result<String> {
        Ok(footer_rule().color(self.color_scheme.border).to_string())
    }

    fn format_outcomes(&self, outcomes: &[ProbeOutcome]) -> Result<String> {
        let mut output = "Probe Outcomes:".bold().to_string();
        for outcome in outcomes {
            let state_color = match outcome.state {
                ProbeState::Succeeded => self.color_scheme.success,
                ProbeState::TimedOut => self.color_scheme.warning,
                ProbeState::Failed => self.color_scheme.error,
                ProbeState::Pending | ProbeState::Running => self.color_scheme.muted,
            };
            write!(
                output,
                "\n  {:<16} {} {:>9.1}ms  {}",
                outcome.metric.as_str(),
                format!("{:<10}", outcome.state.as_str()).color(state_color),
                outcome.elapsed.as_secs_f64() * 1000.0,
                outcome.message.color(self.color_scheme.muted)
            )
            .map_err(fmt_err)?;
        }
        Ok(output)
    }

    fn format_error(&self, error: &str) -> Result<String> {
        Ok(format!("{} {}", "ERROR:".bold().color(self.color_scheme.error), error))
    }

    fn format_warning(&self, warning: &str) -> Result<String> {
        Ok(format!("{} {}", "WARNING:".bold().color(self.color_scheme.warning), warning))
    }

    fn format_success(&self, message: &str) -> Result<String> {
        Ok(format!("{} {}", "OK:".bold().color(self.color_scheme.success), message))
    }
}
