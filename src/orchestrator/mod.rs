//! Sequential execution of the requested probes
//!
//! Every requested metric goes through `Pending -> Running -> {Succeeded,
//! Failed, TimedOut}` and ends with exactly one report entry. A probe failure
//! only ever empties its own entry; the run always continues to the next metric.

use crate::collector::SampleCollector;
use crate::error::{ProbeError, ProbeResult, Result};
use crate::governor::TimeoutGovernor;
use crate::logging::{ProbeLogger, ProbeSpan};
use crate::models::metrics::{MetricResult, RawSample, Report};
use crate::models::Config;
use crate::mtu::{MtuDiscoverer, MtuOptions};
use crate::network::NetworkCapabilities;
use crate::probes::{BandwidthProbe, DnsProbe, EchoProbe};
use crate::stats::{successful_count, StatisticsAggregator};
use crate::types::{Metric, ProbeState};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Diagnostics for one probe of a run
#[derive(Debug, Clone, Serialize)]
pub struct ProbeOutcome {
    pub metric: Metric,
    pub state: ProbeState,
    /// When the probe finished
    pub timestamp: DateTime<Utc>,
    pub elapsed: Duration,
    /// Headline of the result, or the reason there is none
    pub message: String,
}

/// Report plus per-probe diagnostics
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub report: Report,
    pub outcomes: Vec<ProbeOutcome>,
    pub elapsed: Duration,
}

impl RunSummary {
    pub fn outcome(&self, metric: Metric) -> Option<&ProbeOutcome> {
        self.outcomes.iter().find(|o| o.metric == metric)
    }

    pub fn count_in_state(&self, state: ProbeState) -> usize {
        self.outcomes.iter().filter(|o| o.state == state).count()
    }
}

/// Runs probes one after another and assembles the report
pub struct ProbeOrchestrator {
    config: Config,
    network: Arc<dyn NetworkCapabilities>,
    logger: ProbeLogger,
    governor: TimeoutGovernor,
    aggregator: StatisticsAggregator,
}

impl ProbeOrchestrator {
    pub fn new(config: Config, network: Arc<dyn NetworkCapabilities>, logger: ProbeLogger) -> Self {
        Self {
            config,
            network,
            logger,
            governor: TimeoutGovernor::new(),
            aggregator: StatisticsAggregator::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run the metrics, target and sample size named by the configuration
    pub async fn run_configured(&self) -> Result<RunSummary> {
        let metrics = self.config.requested_metrics()?;
        Ok(self
            .run_detailed(&metrics, &self.config.target_host, self.config.sample_size)
            .await)
    }

    /// Run `metrics` in order (canonical order when empty) and return the report
    pub async fn run(&self, metrics: &[Metric], target: &str, sample_size: u32) -> Report {
        self.run_detailed(metrics, target, sample_size).await.report
    }

    /// Like [`run`](Self::run), also returning per-probe diagnostics
    pub async fn run_detailed(&self, metrics: &[Metric], target: &str, sample_size: u32) -> RunSummary {
        let plan = execution_plan(metrics);
        let started = Instant::now();
        let mut report = Report::new();
        let mut outcomes = Vec::with_capacity(plan.len());

        self.logger.run_started(target, &plan).await;

        for metric in plan {
            let outcome = self.execute(metric, target, sample_size, &mut report).await;
            outcomes.push(outcome);
        }

        let elapsed = started.elapsed();
        self.logger
            .run_completed(report.populated_count(), report.len(), elapsed)
            .await;

        RunSummary {
            report,
            outcomes,
            elapsed,
        }
    }

    async fn execute(
        &self,
        metric: Metric,
        target: &str,
        sample_size: u32,
        report: &mut Report,
    ) -> ProbeOutcome {
        let mut state = ProbeState::Pending;
        let budget = self.config.metric_timeout_for(metric, sample_size);

        let span = self.logger.probe_started(metric, budget).await;
        state = advance(state, ProbeState::Running);

        let result = self
            .governor
            .run_isolated(self.measure(metric, target, sample_size, &span), budget)
            .await;

        let (next, entry, message) = match result {
            Ok(value) => {
                let headline = value.headline();
                self.logger.probe_succeeded(&span, &headline).await;
                (ProbeState::Succeeded, Some(value), headline)
            }
            Err(ProbeError::TimedOut { budget }) => {
                self.logger.probe_timed_out(&span, budget).await;
                (ProbeState::TimedOut, None, ProbeError::timed_out(budget).to_string())
            }
            Err(error) => {
                self.logger.probe_failed(&span, &error).await;
                (ProbeState::Failed, None, error.to_string())
            }
        };
        state = advance(state, next);

        if let Err(error) = report.record(metric, entry) {
            self.logger
                .logger()
                .error(&format!("Could not record {} result: {}", metric, error))
                .metric(metric)
                .log()
                .await;
        }

        ProbeOutcome {
            metric,
            state,
            timestamp: Utc::now(),
            elapsed: span.elapsed(),
            message,
        }
    }

    async fn measure(
        &self,
        metric: Metric,
        target: &str,
        sample_size: u32,
        span: &ProbeSpan,
    ) -> ProbeResult<MetricResult> {
        match metric {
            Metric::Latency => {
                let samples = self.echo_samples(target, sample_size, span).await;
                self.aggregator
                    .summarize(&samples)
                    .map(MetricResult::Latency)
                    .ok_or_else(|| ProbeError::insufficient(1, 0))
            }
            Metric::PacketLoss => {
                let samples = self.echo_samples(target, sample_size, span).await;
                self.aggregator
                    .packet_loss(&samples)
                    .map(MetricResult::PacketLoss)
                    .ok_or_else(|| ProbeError::insufficient(1, 0))
            }
            Metric::Jitter => {
                let samples = self.echo_samples(target, sample_size, span).await;
                self.aggregator
                    .jitter(&samples)
                    .map(MetricResult::Jitter)
                    .ok_or_else(|| ProbeError::insufficient(2, successful_count(&samples)))
            }
            Metric::Bandwidth => BandwidthProbe::new(self.network.clone())
                .measure()
                .await
                .map(MetricResult::Bandwidth),
            Metric::Mtu => MtuDiscoverer::new(self.network.clone(), MtuOptions::from_config(&self.config))
                .try_discover(target)
                .await
                .map(MetricResult::Mtu),
            Metric::DnsResolution => {
                let probe = DnsProbe::new(self.network.clone(), self.config.dns_domains.clone());
                let samples = SampleCollector::new(Duration::ZERO)
                    .collect(&probe, probe.domain_count())
                    .await;
                self.logger.samples_collected(span, &samples).await;
                self.aggregator
                    .summarize(&samples)
                    .map(MetricResult::DnsResolution)
                    .ok_or_else(|| ProbeError::insufficient(1, 0))
            }
        }
    }

    async fn echo_samples(&self, target: &str, sample_size: u32, span: &ProbeSpan) -> Vec<RawSample> {
        let probe = EchoProbe::new(self.network.clone(), target);
        let samples = SampleCollector::new(self.config.sample_interval())
            .collect(&probe, sample_size as usize)
            .await;
        self.logger.samples_collected(span, &samples).await;
        samples
    }
}

/// Requested metrics without duplicates; canonical order when none requested
fn execution_plan(metrics: &[Metric]) -> Vec<Metric> {
    if metrics.is_empty() {
        return Metric::ALL.to_vec();
    }

    let mut plan = Vec::with_capacity(metrics.len());
    for &metric in metrics {
        if !plan.contains(&metric) {
            plan.push(metric);
        }
    }
    plan
}

fn advance(from: ProbeState, to: ProbeState) -> ProbeState {
    debug_assert!(!from.is_terminal(), "probe left terminal state {:?}", from);
    to
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::metrics::{Bandwidth, PathMtu, Summary};
    use crate::network::{DnsTiming, ProbeReply};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU64, Ordering};

    /// Deterministic network with switchable failure modes
    #[derive(Default)]
    struct FakeNetwork {
        echo_fails: bool,
        download_hangs: bool,
        bandwidth_down: bool,
        mtu_limit: Option<u32>,
        resolver_panics: bool,
        echo_calls: AtomicU64,
    }

    #[async_trait]
    impl NetworkCapabilities for FakeNetwork {
        async fn icmp_echo(&self, _host: &str) -> ProbeResult<Option<Duration>> {
            let call = self.echo_calls.fetch_add(1, Ordering::SeqCst);
            if self.echo_fails {
                return Ok(None);
            }
            // 10, 15, 12, 10, 15, 12, ...
            let rtt = [10, 15, 12][(call % 3) as usize];
            Ok(Some(Duration::from_millis(rtt)))
        }

        async fn resolve(&self, domain: &str) -> DnsTiming {
            if self.resolver_panics {
                panic!("resolver state corrupted while looking up {}", domain);
            }
            DnsTiming {
                elapsed: Duration::from_millis(20),
                success: true,
            }
        }

        async fn measure_download(&self) -> ProbeResult<Option<f64>> {
            if self.download_hangs {
                futures::future::pending::<()>().await;
            }
            if self.bandwidth_down {
                return Err(ProbeError::unavailable("speed test server unreachable"));
            }
            Ok(Some(100_000_000.0))
        }

        async fn measure_upload(&self) -> ProbeResult<Option<f64>> {
            if self.bandwidth_down {
                return Err(ProbeError::unavailable("speed test server unreachable"));
            }
            Ok(Some(20_000_000.0))
        }

        async fn send_sized_probe(
            &self,
            _host: &str,
            packet_bytes: usize,
            _timeout: Duration,
        ) -> ProbeResult<Option<ProbeReply>> {
            match self.mtu_limit {
                Some(limit) if packet_bytes as u32 <= limit => Ok(Some(ProbeReply {
                    rtt: Duration::from_millis(1),
                    packet_bytes,
                })),
                _ => Ok(None),
            }
        }
    }

    fn fast_config() -> Config {
        Config {
            sample_interval_ms: 0,
            echo_timeout_ms: 50,
            ..Config::default()
        }
    }

    fn orchestrator(network: FakeNetwork, config: Config) -> ProbeOrchestrator {
        ProbeOrchestrator::new(config, Arc::new(network), ProbeLogger::quiet())
    }

    #[tokio::test]
    async fn test_all_metrics_succeed() {
        let network = FakeNetwork {
            mtu_limit: Some(1400),
            ..Default::default()
        };
        let summary = orchestrator(network, fast_config())
            .run_detailed(&[], "192.0.2.1", 3)
            .await;

        assert_eq!(summary.report.metrics(), Metric::ALL.to_vec());
        assert_eq!(summary.count_in_state(ProbeState::Succeeded), 6);

        let report = &summary.report;
        assert_eq!(
            report.get(Metric::Latency),
            Some(Some(&MetricResult::Latency(Summary { average: 12.33, min: 10.0, max: 15.0 })))
        );
        assert_eq!(
            report.get(Metric::Mtu),
            Some(Some(&MetricResult::Mtu(PathMtu { size_bytes: 1400, suspicious: false })))
        );
        assert_eq!(
            report.get(Metric::Bandwidth),
            Some(Some(&MetricResult::Bandwidth(Bandwidth {
                download_mbps: Some(100.0),
                upload_mbps: Some(20.0),
            })))
        );
        match report.get(Metric::DnsResolution) {
            Some(Some(MetricResult::DnsResolution(s))) => assert_eq!(s.average, 20.0),
            other => panic!("unexpected DNS entry {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_jitter_from_consecutive_samples() {
        let report = orchestrator(FakeNetwork::default(), fast_config())
            .run(&[Metric::Jitter], "192.0.2.1", 3)
            .await;

        assert_eq!(
            report.get(Metric::Jitter),
            Some(Some(&MetricResult::Jitter(Summary { average: 4.0, min: 3.0, max: 5.0 })))
        );
    }

    #[tokio::test]
    async fn test_key_set_matches_request_order_and_dedup() {
        let requested = [Metric::Mtu, Metric::Latency, Metric::Mtu, Metric::PacketLoss];
        let report = orchestrator(FakeNetwork::default(), fast_config())
            .run(&requested, "192.0.2.1", 2)
            .await;

        assert_eq!(report.metrics(), vec![Metric::Mtu, Metric::Latency, Metric::PacketLoss]);
    }

    #[tokio::test]
    async fn test_zero_sample_size_leaves_sample_metrics_absent() {
        let summary = orchestrator(FakeNetwork::default(), fast_config())
            .run_detailed(
                &[Metric::Latency, Metric::PacketLoss, Metric::Jitter, Metric::DnsResolution],
                "192.0.2.1",
                0,
            )
            .await;

        assert_eq!(summary.report.get(Metric::Latency), Some(None));
        assert_eq!(summary.report.get(Metric::PacketLoss), Some(None));
        assert_eq!(summary.report.get(Metric::Jitter), Some(None));
        assert!(summary.report.get(Metric::DnsResolution).unwrap().is_some());
        assert_eq!(summary.outcome(Metric::Latency).unwrap().state, ProbeState::Failed);
    }

    #[tokio::test]
    async fn test_unreachable_target_isolated() {
        let network = FakeNetwork {
            echo_fails: true,
            ..Default::default()
        };
        let summary = orchestrator(network, fast_config())
            .run_detailed(&[Metric::Latency, Metric::PacketLoss, Metric::Jitter], "192.0.2.1", 4)
            .await;

        assert_eq!(summary.report.get(Metric::Latency), Some(None));
        assert_eq!(summary.report.get(Metric::Jitter), Some(None));
        match summary.report.get(Metric::PacketLoss) {
            Some(Some(MetricResult::PacketLoss(loss))) => {
                assert_eq!(loss.loss_rate_percent, 100.0);
                assert_eq!(loss.packets_received, 0);
            }
            other => panic!("unexpected packet loss entry {:?}", other),
        }
        assert!(summary
            .outcome(Metric::Jitter)
            .unwrap()
            .message
            .contains("insufficient samples"));
    }

    #[tokio::test]
    async fn test_bandwidth_failure_does_not_stop_run() {
        let network = FakeNetwork {
            bandwidth_down: true,
            mtu_limit: Some(1500),
            ..Default::default()
        };
        let summary = orchestrator(network, fast_config())
            .run_detailed(&[Metric::Bandwidth, Metric::Mtu], "192.0.2.1", 1)
            .await;

        assert_eq!(summary.report.get(Metric::Bandwidth), Some(None));
        assert!(summary.report.get(Metric::Mtu).unwrap().is_some());
        assert_eq!(summary.outcome(Metric::Bandwidth).unwrap().state, ProbeState::Failed);
    }

    #[tokio::test]
    async fn test_hanging_probe_times_out_and_run_continues() {
        let network = FakeNetwork {
            download_hangs: true,
            mtu_limit: Some(1500),
            ..Default::default()
        };
        let config = Config {
            bandwidth_timeout_secs: Some(1),
            ..fast_config()
        };

        let started = Instant::now();
        let summary = orchestrator(network, config)
            .run_detailed(&[Metric::Bandwidth, Metric::Mtu], "192.0.2.1", 1)
            .await;

        assert!(started.elapsed() < Duration::from_secs(3));
        assert_eq!(summary.report.get(Metric::Bandwidth), Some(None));
        assert_eq!(summary.outcome(Metric::Bandwidth).unwrap().state, ProbeState::TimedOut);
        assert!(summary.report.get(Metric::Mtu).unwrap().is_some());
    }

    #[tokio::test]
    async fn test_panicking_probe_fails_alone() {
        let network = FakeNetwork {
            resolver_panics: true,
            ..Default::default()
        };

        let summary = orchestrator(network, fast_config())
            .run_detailed(&[Metric::DnsResolution, Metric::Latency], "192.0.2.1", 3)
            .await;

        assert_eq!(summary.report.get(Metric::DnsResolution), Some(None));
        let dns = summary.outcome(Metric::DnsResolution).unwrap();
        assert_eq!(dns.state, ProbeState::Failed);
        assert!(dns.message.contains("resolver state corrupted"));

        // The batch carries on after the panic
        assert!(matches!(summary.report.get(Metric::Latency), Some(Some(_))));
        assert_eq!(summary.outcome(Metric::Latency).unwrap().state, ProbeState::Succeeded);
    }

    #[tokio::test]
    async fn test_silent_mtu_path_is_flagged() {
        let report = orchestrator(FakeNetwork::default(), fast_config())
            .run(&[Metric::Mtu], "192.0.2.1", 1)
            .await;

        assert_eq!(
            report.get(Metric::Mtu),
            Some(Some(&MetricResult::Mtu(PathMtu { size_bytes: 0, suspicious: true })))
        );
    }

    #[tokio::test]
    async fn test_run_configured_uses_config_metrics() {
        let config = Config {
            metrics: vec!["dns".to_string(), "latency".to_string()],
            sample_size: 2,
            ..fast_config()
        };
        let summary = orchestrator(FakeNetwork::default(), config)
            .run_configured()
            .await
            .unwrap();

        assert_eq!(
            summary.report.metrics(),
            vec![Metric::DnsResolution, Metric::Latency]
        );
    }

    #[tokio::test]
    async fn test_run_configured_rejects_unknown_metric() {
        let config = Config {
            metrics: vec!["teleport".to_string()],
            ..fast_config()
        };
        let result = orchestrator(FakeNetwork::default(), config).run_configured().await;
        assert!(result.is_err());
    }

    #[test]
    fn test_execution_plan() {
        assert_eq!(execution_plan(&[]), Metric::ALL.to_vec());
        assert_eq!(
            execution_plan(&[Metric::Jitter, Metric::Jitter, Metric::Latency]),
            vec![Metric::Jitter, Metric::Latency]
        );
    }
}
