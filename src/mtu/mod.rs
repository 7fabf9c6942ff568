//! Path MTU discovery by linear descent
//!
//! Candidates are tried from `max_size` downwards in fixed steps and the first
//! one that draws a reply wins. Reachability is not monotonic in practice, so
//! the search never bisects.

use crate::error::{ProbeError, ProbeResult};
use crate::governor::{CancellationToken, TimeoutGovernor};
use crate::models::metrics::PathMtu;
use crate::models::Config;
use crate::network::NetworkCapabilities;
use std::sync::Arc;
use std::time::Duration;

/// Result of a completed search
pub type MtuOutcome = PathMtu;

/// Search parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MtuOptions {
    pub max_size: u32,
    pub min_size: u32,
    pub step: u32,
    pub probe_timeout: Duration,
    pub overall_timeout: Duration,
}

impl Default for MtuOptions {
    fn default() -> Self {
        use crate::defaults::*;
        Self {
            max_size: DEFAULT_MTU_MAX_SIZE,
            min_size: 0,
            step: DEFAULT_MTU_STEP,
            probe_timeout: DEFAULT_MTU_PROBE_TIMEOUT,
            overall_timeout: DEFAULT_MTU_TIMEOUT,
        }
    }
}

impl MtuOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_size: config.mtu_max_size,
            min_size: config.mtu_min_size,
            step: config.mtu_step,
            probe_timeout: config.mtu_probe_timeout(),
            overall_timeout: config.mtu_timeout(),
        }
    }

    /// Candidate sizes in probing order
    pub fn candidates(&self) -> impl Iterator<Item = u32> {
        let min = self.min_size;
        let step = self.step.max(1);
        std::iter::successors(Some(self.max_size), move |&size| size.checked_sub(step))
            .take_while(move |&size| size > min)
    }
}

/// Finds the largest packet size that elicits a reply
pub struct MtuDiscoverer {
    network: Arc<dyn NetworkCapabilities>,
    options: MtuOptions,
    governor: TimeoutGovernor,
}

impl MtuDiscoverer {
    pub fn new(network: Arc<dyn NetworkCapabilities>, options: MtuOptions) -> Self {
        Self {
            network,
            options,
            governor: TimeoutGovernor::new(),
        }
    }

    pub fn options(&self) -> &MtuOptions {
        &self.options
    }

    /// Discovered MTU, or `None` when the search failed or ran out of time
    pub async fn discover(&self, target: &str) -> Option<MtuOutcome> {
        self.try_discover(target).await.ok()
    }

    /// Like [`discover`](Self::discover), keeping the reason for a missing result.
    ///
    /// The whole descent runs on a background task bounded by
    /// `overall_timeout`; a late answer is dropped rather than reported.
    pub async fn try_discover(&self, target: &str) -> ProbeResult<MtuOutcome> {
        let network = self.network.clone();
        let target = target.to_string();
        let options = self.options;

        self.governor
            .run_cancellable(options.overall_timeout, move |token| {
                descend(network, target, options, token)
            })
            .await
    }
}

async fn descend(
    network: Arc<dyn NetworkCapabilities>,
    target: String,
    options: MtuOptions,
    token: CancellationToken,
) -> ProbeResult<MtuOutcome> {
    for candidate in options.candidates() {
        if token.is_cancelled() {
            return Err(ProbeError::timed_out(options.overall_timeout));
        }

        let wait = options.probe_timeout.min(token.remaining());
        match network.send_sized_probe(&target, candidate as usize, wait).await {
            Ok(Some(_)) => {
                return Ok(PathMtu {
                    size_bytes: candidate,
                    suspicious: false,
                })
            }
            Ok(None) | Err(ProbeError::SampleFailure(_)) => continue,
            Err(error) => return Err(error),
        }
    }

    if token.is_cancelled() {
        return Err(ProbeError::timed_out(options.overall_timeout));
    }

    // Nothing answered at all; the floor is reported but flagged
    Ok(PathMtu {
        size_bytes: options.min_size,
        suspicious: true,
    })
}
