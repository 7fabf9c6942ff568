//! Concrete probes built on [`NetworkCapabilities`]

use crate::collector::NetworkProbe;
use crate::error::{ProbeError, ProbeResult};
use crate::models::metrics::{Bandwidth, Measurement};
use crate::network::NetworkCapabilities;
use crate::stats::round_to;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

fn millis(duration: Duration) -> f64 {
    duration.as_nanos() as f64 / 1_000_000.0
}

/// Round-trip time of one ICMP echo request
pub struct EchoProbe {
    network: Arc<dyn NetworkCapabilities>,
    target: String,
}

impl EchoProbe {
    pub fn new<S: Into<String>>(network: Arc<dyn NetworkCapabilities>, target: S) -> Self {
        Self {
            network,
            target: target.into(),
        }
    }
}

#[async_trait]
impl NetworkProbe for EchoProbe {
    fn name(&self) -> &str {
        "icmp_echo"
    }

    async fn once(&self) -> ProbeResult<Measurement> {
        match self.network.icmp_echo(&self.target).await? {
            Some(rtt) => Ok(Measurement::millis(millis(rtt))),
            None => Err(ProbeError::sample(format!("no echo reply from {}", self.target))),
        }
    }
}

/// Resolution time of one domain; successive calls cycle through the domains
pub struct DnsProbe {
    network: Arc<dyn NetworkCapabilities>,
    domains: Vec<String>,
    next: AtomicUsize,
}

impl DnsProbe {
    pub fn new(network: Arc<dyn NetworkCapabilities>, domains: Vec<String>) -> Self {
        Self {
            network,
            domains,
            next: AtomicUsize::new(0),
        }
    }

    pub fn domain_count(&self) -> usize {
        self.domains.len()
    }
}

#[async_trait]
impl NetworkProbe for DnsProbe {
    fn name(&self) -> &str {
        "dns_lookup"
    }

    async fn once(&self) -> ProbeResult<Measurement> {
        if self.domains.is_empty() {
            return Err(ProbeError::unavailable("no domains configured for DNS timing"));
        }

        let index = self.next.fetch_add(1, Ordering::Relaxed) % self.domains.len();
        let domain = &self.domains[index];
        let timing = self.network.resolve(domain).await;

        if timing.success {
            Ok(Measurement::millis(millis(timing.elapsed)))
        } else {
            Err(ProbeError::sample(format!(
                "lookup of {} failed after {:.2}ms",
                domain,
                millis(timing.elapsed)
            )))
        }
    }
}

/// Download and upload throughput, each direction measured independently
pub struct BandwidthProbe {
    network: Arc<dyn NetworkCapabilities>,
}

impl BandwidthProbe {
    pub fn new(network: Arc<dyn NetworkCapabilities>) -> Self {
        Self { network }
    }

    /// Measure both directions in Mbps.
    ///
    /// A failed direction is left empty; only when both fail is the whole
    /// measurement an error.
    pub async fn measure(&self) -> ProbeResult<Bandwidth> {
        let download = self.network.measure_download().await;
        let upload = self.network.measure_upload().await;

        let bandwidth = Bandwidth {
            download_mbps: to_mbps(&download),
            upload_mbps: to_mbps(&upload),
        };

        if bandwidth.download_mbps.is_none() && bandwidth.upload_mbps.is_none() {
            return Err(match (download, upload) {
                (Err(error), _) | (_, Err(error)) => error,
                _ => ProbeError::sample("no data transferred in either direction"),
            });
        }

        Ok(bandwidth)
    }
}

fn to_mbps(reading: &ProbeResult<Option<f64>>) -> Option<f64> {
    match reading {
        Ok(Some(bits_per_second)) => Some(round_to(bits_per_second / 1_000_000.0, 2)),
        _ => None,
    }
}
