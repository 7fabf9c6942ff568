//! Network capabilities consumed by the probes
//!
//! The measurement core only talks to [`NetworkCapabilities`]; the real
//! implementation is [`SystemNetwork`], tests substitute deterministic fakes.

pub mod bandwidth;
pub mod dns;
pub mod icmp;

pub use bandwidth::BandwidthMeter;
pub use dns::DnsTimer;
pub use icmp::{IcmpPinger, DEFAULT_ECHO_PAYLOAD};

use crate::error::{ProbeResult, Result};
use crate::models::Config;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Timing of one DNS lookup
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DnsTiming {
    pub elapsed: Duration,
    pub success: bool,
}

/// Reply to a sized probe
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbeReply {
    pub rtt: Duration,
    /// Size of the answered IP datagram, headers included
    pub packet_bytes: usize,
}

/// Everything the probes need from the network
#[async_trait]
pub trait NetworkCapabilities: Send + Sync {
    /// One echo request. `Ok(None)` means no reply before the echo timeout.
    async fn icmp_echo(&self, host: &str) -> ProbeResult<Option<Duration>>;

    /// Resolve a domain and time it
    async fn resolve(&self, domain: &str) -> DnsTiming;

    /// Download throughput in bits per second
    async fn measure_download(&self) -> ProbeResult<Option<f64>>;

    /// Upload throughput in bits per second
    async fn measure_upload(&self) -> ProbeResult<Option<f64>>;

    /// Send an unfragmentable probe whose IP datagram totals `packet_bytes`,
    /// headers included, and wait up to `timeout` for a reply
    async fn send_sized_probe(
        &self,
        host: &str,
        packet_bytes: usize,
        timeout: Duration,
    ) -> ProbeResult<Option<ProbeReply>>;
}

/// Capabilities backed by the host's sockets, resolver and HTTP stack
#[derive(Clone)]
pub struct SystemNetwork {
    pinger: IcmpPinger,
    dns: DnsTimer,
    bandwidth: BandwidthMeter,
    echo_timeout: Duration,
}

impl SystemNetwork {
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            pinger: IcmpPinger::new(),
            dns: DnsTimer::from_system(config.dns_timeout()),
            bandwidth: BandwidthMeter::new(
                config.bandwidth_download_url.clone(),
                config.bandwidth_upload_url.clone(),
                config.bandwidth_bytes,
            )?,
            echo_timeout: config.echo_timeout(),
        })
    }
}

#[async_trait]
impl NetworkCapabilities for SystemNetwork {
    async fn icmp_echo(&self, host: &str) -> ProbeResult<Option<Duration>> {
        let reply = self
            .pinger
            .ping(host, DEFAULT_ECHO_PAYLOAD, self.echo_timeout)
            .await?;
        Ok(reply.map(|r| r.rtt))
    }

    async fn resolve(&self, domain: &str) -> DnsTiming {
        self.dns.time_lookup(domain).await
    }

    async fn measure_download(&self) -> ProbeResult<Option<f64>> {
        self.bandwidth.download().await
    }

    async fn measure_upload(&self) -> ProbeResult<Option<f64>> {
        self.bandwidth.upload().await
    }

    async fn send_sized_probe(
        &self,
        host: &str,
        packet_bytes: usize,
        timeout: Duration,
    ) -> ProbeResult<Option<ProbeReply>> {
        let reply = self.pinger.probe_packet(host, packet_bytes, timeout).await?;
        Ok(reply.map(|r| ProbeReply {
            rtt: r.rtt,
            packet_bytes,
        }))
    }
}
