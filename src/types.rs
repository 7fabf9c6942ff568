//! Type definitions and aliases

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// Re-export commonly used types
pub use crate::error::{AppError, Result};

/// Metrics the tester knows how to measure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// Round-trip time of ICMP echo requests
    Latency,
    /// Share of echo requests without a reply
    PacketLoss,
    /// Download and upload throughput
    Bandwidth,
    /// Variation between consecutive round-trip times
    Jitter,
    /// Largest packet size that elicits a reply
    Mtu,
    /// Time to resolve a set of well-known domains
    DnsResolution,
}

impl Metric {
    /// Canonical execution order used when no metrics are requested explicitly
    pub const ALL: [Metric; 6] = [
        Metric::Latency,
        Metric::PacketLoss,
        Metric::Bandwidth,
        Metric::Jitter,
        Metric::Mtu,
        Metric::DnsResolution,
    ];

    /// Report key for this metric
    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Latency => "latency",
            Metric::PacketLoss => "packet_loss",
            Metric::Bandwidth => "bandwidth",
            Metric::Jitter => "jitter",
            Metric::Mtu => "mtu",
            Metric::DnsResolution => "dns_resolution",
        }
    }

    /// Resolve a list of names into metrics, keeping the first occurrence of duplicates.
    ///
    /// An empty list selects every metric in canonical order.
    pub fn parse_list<S: AsRef<str>>(names: &[S]) -> Result<Vec<Metric>> {
        if names.is_empty() {
            return Ok(Metric::ALL.to_vec());
        }

        let mut metrics = Vec::with_capacity(names.len());
        for name in names {
            let metric: Metric = name.as_ref().parse()?;
            if !metrics.contains(&metric) {
                metrics.push(metric);
            }
        }
        Ok(metrics)
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Metric {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "latency" => Ok(Metric::Latency),
            "packet_loss" | "packet-loss" | "loss" => Ok(Metric::PacketLoss),
            "bandwidth" => Ok(Metric::Bandwidth),
            "jitter" => Ok(Metric::Jitter),
            "mtu" => Ok(Metric::Mtu),
            "dns" | "dns_resolution" | "dns-resolution" => Ok(Metric::DnsResolution),
            other => Err(AppError::config(format!(
                "Unknown metric '{}' (expected one of: latency, packet_loss, bandwidth, jitter, mtu, dns)",
                other
            ))),
        }
    }
}

/// Unit attached to a raw sample value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Unit {
    Milliseconds,
    Percent,
    MegabitsPerSecond,
    Bytes,
}

impl Unit {
    /// Short suffix used in log output
    pub fn suffix(&self) -> &'static str {
        match self {
            Unit::Milliseconds => "ms",
            Unit::Percent => "percent",
            Unit::MegabitsPerSecond => "mbps",
            Unit::Bytes => "bytes",
        }
    }
}

/// Lifecycle of a single probe within a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProbeState {
    /// Requested but not started yet
    Pending,
    /// Currently executing
    Running,
    /// Produced a populated report entry
    Succeeded,
    /// Finished without a usable result
    Failed,
    /// Exceeded its time budget
    TimedOut,
}

impl ProbeState {
    /// Whether no further transition can happen from this state
    pub fn is_terminal(&self) -> bool {
        matches!(self, ProbeState::Succeeded | ProbeState::Failed | ProbeState::TimedOut)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProbeState::Pending => "pending",
            ProbeState::Running => "running",
            ProbeState::Succeeded => "succeeded",
            ProbeState::Failed => "failed",
            ProbeState::TimedOut => "timed_out",
        }
    }
}
