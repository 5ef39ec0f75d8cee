//! Parsing endpoint strings and structured endpoint configs.

use crate::error::ParseError;
use serde::Deserialize;

/// How an endpoint's name should be treated during resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseKind {
    /// The name is a literal IP address or already a `host:port` pair
    /// naming a single concrete address; never re-resolved.
    Literal,
    /// The name is a hostname to resolve via A/AAAA lookups.
    Hostname,
    /// The name is an SRV record to resolve and expand into child
    /// endpoints.
    Srv,
    /// The name should be resolved via the system's configured
    /// nameservers rather than this list's resolver, mirroring
    /// `RSPAMD_UPSTREAM_PARSE_NAMESERVER` in `original_source/`. Used
    /// for bootstrapping a list of the nameservers themselves.
    Nameserver,
}

/// One endpoint as parsed from a configuration line, before DNS
/// resolution has run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedEndpoint {
    /// Hostname, IP literal, or SRV target name.
    pub name: String,
    /// Effective port: the input's explicit value, or the caller's
    /// `default_port` if the input carried none.
    pub port: u16,
    /// Relative priority read from the `name:port:priority` shorthand;
    /// defaults to 0 when absent. Higher values are preferred by
    /// [`crate::Policy::MasterSlave`]. Weight has no place in the line
    /// grammar — it is always supplied by the caller alongside the
    /// parsed endpoint.
    pub priority: i32,
    /// How the name should be resolved.
    pub kind: ParseKind,
}

/// Parses a single endpoint entry of the form `name[:port[:priority]]`,
/// where `name` may be a bracketed IPv6 literal. `default_port` fills
/// in the port when the input doesn't carry one.
pub fn parse_endpoint(input: &str, default_port: u16) -> Result<ParsedEndpoint, ParseError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(ParseError::Empty);
    }

    let (name_part, rest) = if let Some(stripped) = input.strip_prefix('[') {
        match stripped.find(']') {
            Some(end) => (
                format!("[{}]", &stripped[..end]),
                stripped[end + 1..].strip_prefix(':').unwrap_or(""),
            ),
            None => return Err(ParseError::UnterminatedIpv6(input.to_string())),
        }
    } else {
        match input.split_once(':') {
            Some((name, rest)) => (name.to_string(), rest),
            None => (input.to_string(), ""),
        }
    };

    let mut fields = rest.split(':').filter(|f| !f.is_empty());
    let port = match fields.next() {
        Some(p) => p
            .parse::<u16>()
            .map_err(|_| ParseError::InvalidPort(p.to_string()))?,
        None => default_port,
    };
    let priority = match fields.next() {
        Some(p) => p
            .parse::<i32>()
            .map_err(|_| ParseError::InvalidPriority(p.to_string()))?,
        None => 0,
    };

    let name = name_part
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .map(|s| s.to_string())
        .unwrap_or(name_part);

    let kind = if name.parse::<std::net::IpAddr>().is_ok() {
        ParseKind::Literal
    } else {
        ParseKind::Hostname
    };

    Ok(ParsedEndpoint {
        name,
        port,
        priority,
        kind,
    })
}

/// Default port assumed for a bare nameserver IP with none given,
/// mirroring `RSPAMD_UPSTREAM_PARSE_NAMESERVER`'s DNS-port default.
const DEFAULT_DNS_PORT: u16 = 53;

/// Parses `input` as a nameserver address (`ip[:port]`), always
/// producing [`ParseKind::Nameserver`] so the caller treats it as
/// no-resolve regardless of the list's own flags, mirroring
/// `RSPAMD_UPSTREAM_PARSE_NAMESERVER`. Unlike [`parse_endpoint`], the
/// name must be a literal IP, not a hostname — a nameserver you'd need
/// DNS to find isn't a usable nameserver.
pub fn parse_nameserver(input: &str) -> Result<ParsedEndpoint, ParseError> {
    let parsed = parse_endpoint(input, DEFAULT_DNS_PORT)?;
    if parsed.name.parse::<std::net::IpAddr>().is_err() {
        return Err(ParseError::NotALiteralAddress(parsed.name));
    }
    Ok(ParsedEndpoint {
        kind: ParseKind::Nameserver,
        ..parsed
    })
}

/// Parses a whitespace-, comma- or semicolon-separated list of endpoint
/// entries, as accepted by `rspamd_upstreams_parse_line` in
/// `original_source/`. Malformed entries are skipped and logged rather
/// than failing the whole line: the caller only
/// learns "at least one entry parsed" by checking the returned `Vec`
/// isn't empty.
pub fn parse_endpoint_list(input: &str, default_port: u16) -> Vec<ParsedEndpoint> {
    input
        .split(|c: char| c.is_whitespace() || c == ',' || c == ';')
        .filter(|s| !s.is_empty())
        .filter_map(|entry| match parse_endpoint(entry, default_port) {
            Ok(parsed) => Some(parsed),
            Err(_err) => {
                #[cfg(feature = "log")]
                tracing::warn!(entry, error = %_err, "skipping malformed endpoint entry");
                None
            }
        })
        .collect()
}

/// A structured endpoint description, as accepted from JSON/UCL-style
/// configuration rather than a single parsed line. Mirrors the three
/// shapes a host's config loader may hand back for one list entry: a
/// bare line, a list of bare lines, or a fully keyed object.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum EndpointConfig {
    /// A single `name[:port[:priority]]` line, delegated whole to
    /// [`parse_endpoint_list`] (so it may itself expand into more than
    /// one endpoint if it contains `[,;\s]+`-separated entries).
    Scalar(String),
    /// Multiple lines, each parsed independently as in [`Scalar`](Self::Scalar).
    Array(Vec<String>),
    /// A fully keyed object naming every field explicitly.
    Object(EndpointConfigObject),
}

/// The object form of [`EndpointConfig`]: `{name, port, priority,
/// weight, data}` as described by the structured-config schema.
#[derive(Debug, Clone, Deserialize)]
pub struct EndpointConfigObject {
    /// Hostname, IP literal, or SRV target name.
    pub name: String,
    /// Explicit port; required unless `name` already carries one.
    #[serde(default)]
    pub port: Option<u16>,
    /// Relative weight; defaults to 1.
    #[serde(default = "default_weight")]
    pub weight: u32,
    /// Relative priority; defaults to 0. Higher values are preferred
    /// by [`crate::Policy::MasterSlave`].
    #[serde(default)]
    pub priority: i32,
    /// Treat `name` as an SRV target to expand, rather than a direct
    /// hostname.
    #[serde(default)]
    pub srv: bool,
    /// Opaque, implementation-specific payload. Not interpreted by
    /// this crate; carried through for the host to read back after
    /// deserializing the config object.
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

fn default_weight() -> u32 {
    1
}

impl EndpointConfigObject {
    /// Converts to the same shape `parse_endpoint` produces, filling in
    /// `default_port` if the object didn't carry its own `port`.
    pub fn into_parsed(&self, default_port: u16) -> ParsedEndpoint {
        let kind = if self.srv {
            ParseKind::Srv
        } else if self.name.parse::<std::net::IpAddr>().is_ok() {
            ParseKind::Literal
        } else {
            ParseKind::Hostname
        };
        ParsedEndpoint {
            name: self.name.clone(),
            port: self.port.unwrap_or(default_port),
            priority: self.priority,
            kind,
        }
    }
}
