//! Performance benchmarks for the network path tester
//!
//! Covers the pure parts of a run: aggregating samples, parsing
//! configuration and rendering reports.

use clap::Parser;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use network_path_tester::{
    cli::Cli,
    config::ConfigParser,
    models::metrics::{MetricResult, PathMtu, Summary},
    output::{PlainFormatter, ReportFormatter},
    stats::StatisticsAggregator,
    types::{Metric, Unit},
    RawSample, Report,
};

/// Samples with a 10% failure rate
fn create_samples(count: usize) -> Vec<RawSample> {
    (0..count)
        .map(|i| {
            if i % 10 == 0 {
                RawSample::failed("timeout")
            } else {
                RawSample::success(10.0 + (i % 50) as f64 * 0.37, Unit::Milliseconds)
            }
        })
        .collect()
}

fn create_report() -> Report {
    let mut report = Report::new();
    for metric in Metric::ALL {
        let result = match metric {
            Metric::Mtu => Some(MetricResult::Mtu(PathMtu { size_bytes: 1500, suspicious: false })),
            Metric::Bandwidth => None,
            Metric::Latency => Some(MetricResult::Latency(Summary { average: 12.33, min: 10.0, max: 15.0 })),
            Metric::Jitter => Some(MetricResult::Jitter(Summary { average: 4.0, min: 3.0, max: 5.0 })),
            Metric::DnsResolution => {
                Some(MetricResult::DnsResolution(Summary { average: 21.5, min: 8.1, max: 40.2 }))
            }
            Metric::PacketLoss => None,
        };
        let _ = report.record(metric, result);
    }
    report
}

fn benchmark_statistics(c: &mut Criterion) {
    let aggregator = StatisticsAggregator::new();
    let mut group = c.benchmark_group("statistics");

    for size in [10usize, 100, 1000] {
        let samples = create_samples(size);

        group.bench_with_input(BenchmarkId::new("summarize", size), &samples, |b, samples| {
            b.iter(|| aggregator.summarize(black_box(samples)))
        });

        group.bench_with_input(BenchmarkId::new("jitter", size), &samples, |b, samples| {
            b.iter(|| aggregator.jitter(black_box(samples)))
        });

        group.bench_with_input(BenchmarkId::new("packet_loss", size), &samples, |b, samples| {
            b.iter(|| aggregator.packet_loss(black_box(samples)))
        });
    }

    group.finish();
}

fn benchmark_metric_parsing(c: &mut Criterion) {
    let names = vec!["latency", "dns", "jitter", "latency", "mtu", "packet_loss"];

    c.bench_function("metric_parse_list", |b| {
        b.iter(|| Metric::parse_list(black_box(&names)))
    });
}

fn benchmark_config_parsing(c: &mut Criterion) {
    c.bench_function("config_parsing", |b| {
        b.iter(|| {
            let cli = Cli::parse_from(black_box([
                "npt",
                "--target",
                "1.1.1.1",
                "--samples",
                "20",
                "--metrics",
                "latency,jitter",
                "--no-save",
            ]));
            ConfigParser::new(cli).parse()
        })
    });
}

fn benchmark_report_rendering(c: &mut Criterion) {
    let report = create_report();
    let formatter = PlainFormatter::new();

    c.bench_function("report_text", |b| {
        b.iter(|| formatter.format_report(black_box(&report)))
    });

    c.bench_function("report_json", |b| b.iter(|| black_box(&report).to_json_pretty()));
}

criterion_group!(
    benches,
    benchmark_statistics,
    benchmark_metric_parsing,
    benchmark_config_parsing,
    benchmark_report_rendering
);

criterion_main!(benches);
