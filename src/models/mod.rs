//! Data models and structures for the network path tester

pub mod config;
pub mod metrics;

// Re-export main model types
pub use config::Config;
pub use metrics::{
    Bandwidth, FieldValue, Measurement, MetricResult, PacketLoss, PathMtu, RawSample, Report,
    ReportEntry, Summary,
};
