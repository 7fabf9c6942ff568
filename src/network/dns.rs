//! DNS resolution timing

use super::DnsTiming;
use std::time::{Duration, Instant};
use trust_dns_resolver::{
    config::{ResolverConfig, ResolverOpts},
    system_conf, TokioAsyncResolver,
};

/// Times lookups against the system resolver
#[derive(Clone)]
pub struct DnsTimer {
    resolver: TokioAsyncResolver,
    timeout: Duration,
}

impl DnsTimer {
    /// Resolver built from the system configuration, falling back to the
    /// library defaults when that cannot be read
    pub fn from_system(timeout: Duration) -> Self {
        let (config, opts) = system_conf::read_system_conf()
            .unwrap_or_else(|_| (ResolverConfig::default(), ResolverOpts::default()));
        Self::with_config(config, opts, timeout)
    }

    pub fn with_config(config: ResolverConfig, mut opts: ResolverOpts, timeout: Duration) -> Self {
        opts.timeout = timeout;
        opts.attempts = 1;

        Self {
            resolver: TokioAsyncResolver::tokio(config, opts),
            timeout,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Resolve `domain` and report how long it took and whether it produced an address
    pub async fn time_lookup(&self, domain: &str) -> DnsTiming {
        let started = Instant::now();
        let outcome = tokio::time::timeout(self.timeout, self.resolver.lookup_ip(domain)).await;
        let elapsed = started.elapsed();

        let success = matches!(outcome, Ok(Ok(ref lookup)) if lookup.iter().next().is_some());
        DnsTiming { elapsed, success }
    }
}
