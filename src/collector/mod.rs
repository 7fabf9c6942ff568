//! Repeated invocation of a single-shot probe
//!
//! A failed attempt is recorded as a failure marker and never stops the
//! sequence, so the output always has exactly `count` entries.

use crate::error::ProbeResult;
use crate::models::metrics::{Measurement, RawSample};
use async_trait::async_trait;
use std::time::Duration;

/// Something that can take one measurement
#[async_trait]
pub trait NetworkProbe: Send + Sync {
    /// Short name used in log records
    fn name(&self) -> &str;

    /// Take one measurement
    async fn once(&self) -> ProbeResult<Measurement>;
}

/// Runs a probe a fixed number of times with a pause between attempts
#[derive(Debug, Clone, Copy)]
pub struct SampleCollector {
    spacing: Duration,
}

impl Default for SampleCollector {
    fn default() -> Self {
        Self::new(crate::defaults::DEFAULT_SAMPLE_INTERVAL)
    }
}

impl SampleCollector {
    pub fn new(spacing: Duration) -> Self {
        Self { spacing }
    }

    pub fn spacing(&self) -> Duration {
        self.spacing
    }

    /// Invoke `probe.once()` exactly `count` times, sequentially.
    ///
    /// The spacing is only applied between attempts, never before the first
    /// or after the last one.
    pub async fn collect(&self, probe: &dyn NetworkProbe, count: usize) -> Vec<RawSample> {
        let mut samples = Vec::with_capacity(count);

        for attempt in 0..count {
            if attempt > 0 && !self.spacing.is_zero() {
                tokio::time::sleep(self.spacing).await;
            }

            let sample = match probe.once().await {
                Ok(measurement) => RawSample::from(measurement),
                Err(error) => RawSample::failed(error.to_string()),
            };
            samples.push(sample);
        }

        samples
    }
}
