//! Error types for endpoint parsing and DNS resolution.

use thiserror::Error;

/// Errors encountered while parsing a single endpoint entry or a
/// structured config object describing one.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    /// The input string was empty after trimming whitespace.
    #[error("empty endpoint string")]
    Empty,
    /// A bracketed IPv6 literal was missing its closing `]`.
    #[error("unterminated IPv6 literal in {0:?}")]
    UnterminatedIpv6(String),
    /// The port component did not parse as a `u16`.
    #[error("invalid port {0:?}")]
    InvalidPort(String),
    /// The priority component did not parse as an `i32`.
    #[error("invalid priority {0:?}")]
    InvalidPriority(String),
    /// A nameserver entry's name was not a literal IP address.
    #[error("nameserver entry {0:?} is not a literal IP address")]
    NotALiteralAddress(String),
}

/// Errors encountered while resolving an endpoint's name or an SRV target.
///
/// A [`ResolveError`] is never fatal to an endpoint (see [`crate::resolver`]);
/// it is surfaced here only so the driver can log and account for it.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// A query did not complete within `dns_timeout` after all retransmits
    /// were exhausted.
    #[error("DNS lookup for {name} timed out after {retries} retransmit(s)")]
    Timeout {
        /// Name being resolved.
        name: String,
        /// Number of retransmits attempted.
        retries: u32,
    },
    /// The underlying resolver returned an error.
    #[error("DNS lookup for {name} failed: {source}")]
    Lookup {
        /// Name being resolved.
        name: String,
        /// Underlying resolver error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}
