//! Pluggable DNS resolution with bounded retry.

#[cfg(feature = "hickory")]
pub mod hickory;

use crate::error::ResolveError;
use crate::limits::Limits;
use async_trait::async_trait;
use std::net::IpAddr;

/// One target produced by an SRV lookup, before the corresponding
/// A/AAAA records for `target` have been resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SrvTarget {
    /// The hostname this SRV record points at.
    pub target: String,
    /// Port to combine with `target`'s resolved addresses.
    pub port: u16,
    /// Lower values are preferred, per RFC 2782.
    pub priority: u16,
    /// Relative weight among same-priority targets, per RFC 2782.
    pub weight: u16,
}

/// Backend-agnostic DNS resolution, implemented for `hickory-resolver`'s
/// [`hickory_resolver::Resolver`] behind the `hickory` feature.
///
/// A single failed call is never fatal to a [`crate::List`]: resolution
/// failures and timeouts are reported to the caller, which keeps the
/// endpoint's previous address set.
#[async_trait]
pub trait Resolver: Send + Sync {
    /// Resolves `host` to its IPv4 and IPv6 addresses in a single
    /// logical query pair. Implementations issue both lookups and
    /// combine the results; a failure on one family alone is not an
    /// error as long as the other succeeds.
    async fn lookup_ip(&self, host: &str) -> Result<Vec<IpAddr>, ResolveError>;

    /// Resolves `name` as an SRV record, returning its targets
    /// unordered; callers combine weight and priority as RFC 2782
    /// specifies.
    async fn lookup_srv(&self, name: &str) -> Result<Vec<SrvTarget>, ResolveError>;
}

/// Drives a single `lookup` future through up to `limits.dns_retransmits`
/// retries, each bounded by `limits.dns_timeout`. Returns the first
/// successful result, or the last error/timeout once retries are
/// exhausted.
pub(crate) async fn resolve_with_retry<T, F, Fut>(
    name: &str,
    limits: &Limits,
    mut lookup: F,
) -> Result<T, ResolveError>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, ResolveError>>,
{
    let attempts = limits.dns_retransmits.max(1);
    let mut last_err = None;
    for attempt in 0..attempts {
        match tokio::time::timeout(limits.dns_timeout, lookup()).await {
            Ok(Ok(value)) => return Ok(value),
            Ok(Err(err)) => last_err = Some(err),
            Err(_) => {
                last_err = Some(ResolveError::Timeout {
                    name: name.to_string(),
                    retries: attempt + 1,
                });
            }
        }
    }
    Err(last_err.unwrap_or_else(|| ResolveError::Timeout {
        name: name.to_string(),
        retries: attempts,
    }))
}
