//! Statistical reduction of raw samples into metric results
//!
//! The aggregator only ever looks at successful samples. Failure markers count
//! towards the packet loss denominator and nothing else.


use crate::models::metrics::{PacketLoss, RawSample, Summary};

/// Decimal places kept in every reported figure
pub const DEFAULT_PRECISION: u32 = 2;

/// Reduces sample sequences to summaries
#[derive(Debug, Clone, Copy)]
pub struct StatisticsAggregator {
    precision: u32,
}

impl Default for StatisticsAggregator {
    fn default() -> Self {
        Self {
            precision: DEFAULT_PRECISION,
        }
    }
}

impl StatisticsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mean, minimum and maximum over the successful samples.
    ///
    /// Returns `None` when no sample succeeded.
    pub fn summarize(&self, samples: &[RawSample]) -> Option<Summary> {
        self.summarize_values(&successful_values(samples))
    }

    /// Mean, minimum and maximum over plain values
    pub fn summarize_values(&self, values: &[f64]) -> Option<Summary> {
        if values.is_empty() {
            return None;
        }

        let sum: f64 = values.iter().sum();
        let mean = sum / values.len() as f64;
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        Some(Summary {
            average: self.round(mean),
            min: self.round(min),
            max: self.round(max),
        })
    }

    /// Summary of absolute differences between temporally adjacent successful
    /// samples. Needs at least two successes.
    pub fn jitter(&self, samples: &[RawSample]) -> Option<Summary> {
        let values = successful_values(samples);
        if values.len() < 2 {
            return None;
        }

        let deltas: Vec<f64> = values.windows(2).map(|w| (w[1] - w[0]).abs()).collect();
        self.summarize_values(&deltas)
    }

    /// Share of samples without a value. `None` when nothing was sent.
    pub fn packet_loss(&self, samples: &[RawSample]) -> Option<PacketLoss> {
        if samples.is_empty() {
            return None;
        }

        let sent = samples.len() as u32;
        let received = successful_count(samples) as u32;
        let lost = sent - received;

        Some(PacketLoss {
            loss_rate_percent: self.round(lost as f64 / sent as f64 * 100.0),
            packets_sent: sent,
            packets_received: received,
        })
    }

    pub fn round(&self, value: f64) -> f64 {
        round_to(value, self.precision)
    }
}

/// Round half away from zero to `places` decimal places
pub fn round_to(value: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places as i32);
    (value * factor).round() / factor
}

/// Number of samples that produced a value
pub fn successful_count(samples: &[RawSample]) -> usize {
    samples.iter().filter(|s| s.is_successful()).count()
}

fn successful_values(samples: &[RawSample]) -> Vec<f64> {
    samples.iter().filter_map(RawSample::value).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Unit;

    fn ms(values: &[f64]) -> Vec<RawSample> {
        values
            .iter()
            .map(|&v| RawSample::success(v, Unit::Milliseconds))
            .collect()
    }

    #[test]
    fn test_summarize_empty() {
        let aggregator = StatisticsAggregator::new();
        assert_eq!(aggregator.summarize(&[]), None);
    }

    #[test]
    fn test_summarize_single_value() {
        let aggregator = StatisticsAggregator::new();
        let summary = aggregator.summarize(&ms(&[42.0])).unwrap();
        assert_eq!(summary, Summary { average: 42.0, min: 42.0, max: 42.0 });
    }

    #[test]
    fn test_summarize_three_values() {
        let aggregator = StatisticsAggregator::new();
        let summary = aggregator.summarize(&ms(&[1.0, 2.0, 3.0])).unwrap();
        assert_eq!(summary, Summary { average: 2.0, min: 1.0, max: 3.0 });
    }

    #[test]
    fn test_summarize_ignores_failures() {
        let aggregator = StatisticsAggregator::new();
        let mut samples = ms(&[10.0, 20.0]);
        samples.insert(1, RawSample::failed("no reply"));

        let summary = aggregator.summarize(&samples).unwrap();
        assert_eq!(summary.average, 15.0);

        let all_failed = vec![RawSample::failed("a"), RawSample::failed("b")];
        assert_eq!(aggregator.summarize(&all_failed), None);
    }

    #[test]
    fn test_summarize_rounds_to_two_places() {
        let aggregator = StatisticsAggregator::new();
        let summary = aggregator.summarize(&ms(&[1.0, 1.0, 1.006])).unwrap();
        assert_eq!(summary.max, 1.01);
        assert_eq!(summary.average, 1.0);
    }

    #[test]
    fn test_jitter_example() {
        let aggregator = StatisticsAggregator::new();
        let jitter = aggregator.jitter(&ms(&[10.0, 15.0, 12.0])).unwrap();
        assert_eq!(jitter, Summary { average: 4.0, min: 3.0, max: 5.0 });
    }

    #[test]
    fn test_jitter_needs_two_successes() {
        let aggregator = StatisticsAggregator::new();
        assert_eq!(aggregator.jitter(&ms(&[10.0])), None);
        assert_eq!(
            aggregator.jitter(&[RawSample::success(5.0, Unit::Milliseconds), RawSample::failed("x")]),
            None
        );
    }

    #[test]
    fn test_jitter_skips_failed_samples() {
        let aggregator = StatisticsAggregator::new();
        let samples = vec![
            RawSample::success(10.0, Unit::Milliseconds),
            RawSample::failed("lost"),
            RawSample::success(14.0, Unit::Milliseconds),
        ];
        let jitter = aggregator.jitter(&samples).unwrap();
        assert_eq!(jitter, Summary { average: 4.0, min: 4.0, max: 4.0 });
    }

    #[test]
    fn test_packet_loss() {
        let aggregator = StatisticsAggregator::new();
        let mut samples = ms(&[1.0; 9]);
        samples.push(RawSample::failed("timeout"));

        let loss = aggregator.packet_loss(&samples).unwrap();
        assert_eq!(loss.packets_sent, 10);
        assert_eq!(loss.packets_received, 9);
        assert_eq!(loss.loss_rate_percent, 10.0);

        assert_eq!(aggregator.packet_loss(&[]), None);
    }

    #[test]
    fn test_packet_loss_rounding() {
        let aggregator = StatisticsAggregator::new();
        let samples = vec![
            RawSample::failed("a"),
            RawSample::success(1.0, Unit::Milliseconds),
            RawSample::success(1.0, Unit::Milliseconds),
        ];
        assert_eq!(aggregator.packet_loss(&samples).unwrap().loss_rate_percent, 33.33);
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(2.345678, 2), 2.35);
        assert_eq!(round_to(2.0, 2), 2.0);
        assert_eq!(round_to(1234.5, 0), 1235.0);
    }
}
