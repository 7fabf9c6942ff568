//! Sample, metric result and report data models

use crate::error::{AppError, Result};
use crate::types::{Metric, Unit};
use chrono::{DateTime, Utc};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt;

/// A single numeric value produced by one probe attempt
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    pub value: f64,
    pub unit: Unit,
}

impl Measurement {
    pub fn new(value: f64, unit: Unit) -> Self {
        Self { value, unit }
    }

    pub fn millis(value: f64) -> Self {
        Self::new(value, Unit::Milliseconds)
    }
}

/// Outcome of one measurement attempt
#[derive(Debug, Clone, PartialEq)]
pub enum RawSample {
    /// The attempt produced a value
    Value {
        value: f64,
        unit: Unit,
        timestamp: DateTime<Utc>,
    },
    /// The attempt failed; there is no value to trust
    Failed {
        reason: String,
        timestamp: DateTime<Utc>,
    },
}

impl RawSample {
    /// Create a successful sample
    pub fn success(value: f64, unit: Unit) -> Self {
        Self::Value {
            value,
            unit,
            timestamp: Utc::now(),
        }
    }

    /// Create a failure marker
    pub fn failed<S: Into<String>>(reason: S) -> Self {
        Self::Failed {
            reason: reason.into(),
            timestamp: Utc::now(),
        }
    }

    /// Numeric value, if the attempt succeeded
    pub fn value(&self) -> Option<f64> {
        match self {
            Self::Value { value, .. } => Some(*value),
            Self::Failed { .. } => None,
        }
    }

    /// Unit of the value, if the attempt succeeded
    pub fn unit(&self) -> Option<Unit> {
        match self {
            Self::Value { unit, .. } => Some(*unit),
            Self::Failed { .. } => None,
        }
    }

    pub fn is_successful(&self) -> bool {
        matches!(self, Self::Value { .. })
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::Value { timestamp, .. } | Self::Failed { timestamp, .. } => *timestamp,
        }
    }
}

impl From<Measurement> for RawSample {
    fn from(measurement: Measurement) -> Self {
        Self::success(measurement.value, measurement.unit)
    }
}

/// Average, minimum and maximum over a set of successful samples
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    pub average: f64,
    pub min: f64,
    pub max: f64,
}

/// Packet loss over a fixed number of echo requests
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PacketLoss {
    pub loss_rate_percent: f64,
    pub packets_sent: u32,
    pub packets_received: u32,
}

/// Throughput in both directions; either side may have failed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bandwidth {
    pub download_mbps: Option<f64>,
    pub upload_mbps: Option<f64>,
}

/// Discovered path MTU
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathMtu {
    pub size_bytes: u32,
    /// The search reached its floor without a single reply
    pub suspicious: bool,
}

/// One named numeric field of a metric result
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue {
    Float(f64),
    Integer(u64),
    Flag(bool),
    Missing,
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Float(v) => write!(f, "{}", v),
            FieldValue::Integer(v) => write!(f, "{}", v),
            FieldValue::Flag(v) => write!(f, "{}", v),
            FieldValue::Missing => f.write_str("None"),
        }
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            FieldValue::Float(v) => serializer.serialize_f64(*v),
            FieldValue::Integer(v) => serializer.serialize_u64(*v),
            FieldValue::Flag(v) => serializer.serialize_bool(*v),
            FieldValue::Missing => serializer.serialize_none(),
        }
    }
}

/// Fixed-shape result for one metric. Immutable once written into a [`Report`].
#[derive(Debug, Clone, PartialEq)]
pub enum MetricResult {
    Latency(Summary),
    PacketLoss(PacketLoss),
    Bandwidth(Bandwidth),
    Jitter(Summary),
    Mtu(PathMtu),
    DnsResolution(Summary),
}

impl MetricResult {
    /// Metric this result belongs to
    pub fn metric(&self) -> Metric {
        match self {
            Self::Latency(_) => Metric::Latency,
            Self::PacketLoss(_) => Metric::PacketLoss,
            Self::Bandwidth(_) => Metric::Bandwidth,
            Self::Jitter(_) => Metric::Jitter,
            Self::Mtu(_) => Metric::Mtu,
            Self::DnsResolution(_) => Metric::DnsResolution,
        }
    }

    /// Named fields in report order
    pub fn fields(&self) -> Vec<(&'static str, FieldValue)> {
        match self {
            Self::Latency(s) | Self::Jitter(s) | Self::DnsResolution(s) => vec![
                ("average_ms", FieldValue::Float(s.average)),
                ("min_ms", FieldValue::Float(s.min)),
                ("max_ms", FieldValue::Float(s.max)),
            ],
            Self::PacketLoss(p) => vec![
                ("loss_rate_percent", FieldValue::Float(p.loss_rate_percent)),
                ("packets_sent", FieldValue::Integer(p.packets_sent as u64)),
                ("packets_received", FieldValue::Integer(p.packets_received as u64)),
            ],
            Self::Bandwidth(b) => vec![
                ("download_mbps", b.download_mbps.map_or(FieldValue::Missing, FieldValue::Float)),
                ("upload_mbps", b.upload_mbps.map_or(FieldValue::Missing, FieldValue::Float)),
            ],
            Self::Mtu(m) => vec![
                ("size_bytes", FieldValue::Integer(m.size_bytes as u64)),
                ("suspicious", FieldValue::Flag(m.suspicious)),
            ],
        }
    }

    /// One-line summary used in log messages
    pub fn headline(&self) -> String {
        match self {
            Self::Latency(s) | Self::Jitter(s) | Self::DnsResolution(s) => {
                format!("{:.2}ms", s.average)
            }
            Self::PacketLoss(p) => format!("{:.2}%", p.loss_rate_percent),
            Self::Bandwidth(b) => format!(
                "Down: {} Mbps, Up: {} Mbps",
                b.download_mbps.map_or("Failed".to_string(), |v| v.to_string()),
                b.upload_mbps.map_or("Failed".to_string(), |v| v.to_string()),
            ),
            Self::Mtu(m) => format!("{} bytes", m.size_bytes),
        }
    }
}

impl Serialize for MetricResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let fields = self.fields();
        let mut map = serializer.serialize_map(Some(fields.len()))?;
        for (key, value) in &fields {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// One report slot: a metric and its result, or an explicit absence
#[derive(Debug, Clone, PartialEq)]
pub struct ReportEntry {
    pub metric: Metric,
    pub result: Option<MetricResult>,
}

/// Ordered mapping from metric to result; insertion order is execution order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Report {
    entries: Vec<ReportEntry>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the result for a metric. Each metric can be written exactly once.
    pub fn record(&mut self, metric: Metric, result: Option<MetricResult>) -> Result<()> {
        if self.contains(metric) {
            return Err(AppError::internal(format!(
                "report entry for '{}' already written",
                metric
            )));
        }
        if let Some(ref value) = result {
            if value.metric() != metric {
                return Err(AppError::internal(format!(
                    "result for '{}' recorded under '{}'",
                    value.metric(),
                    metric
                )));
            }
        }
        self.entries.push(ReportEntry { metric, result });
        Ok(())
    }

    /// `None` when the metric was never requested, `Some(None)` when it is explicitly absent
    pub fn get(&self, metric: Metric) -> Option<Option<&MetricResult>> {
        self.entries
            .iter()
            .find(|e| e.metric == metric)
            .map(|e| e.result.as_ref())
    }

    pub fn contains(&self, metric: Metric) -> bool {
        self.entries.iter().any(|e| e.metric == metric)
    }

    /// Metrics in execution order
    pub fn metrics(&self) -> Vec<Metric> {
        self.entries.iter().map(|e| e.metric).collect()
    }

    pub fn entries(&self) -> &[ReportEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries holding a result
    pub fn populated_count(&self) -> usize {
        self.entries.iter().filter(|e| e.result.is_some()).count()
    }

    /// Pretty JSON document keyed by metric name
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Serialize for Report {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for entry in &self.entries {
            map.serialize_entry(entry.metric.as_str(), &entry.result)?;
        }
        map.end()
    }
}
