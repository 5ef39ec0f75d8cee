#![deny(missing_docs)]
#![warn(broken_intra_doc_links)]

/*!
Endpoint pools with health tracking, DNS resolution and pluggable
selection policies.

# Introduction

An `upstream-rs` [`List`] holds a set of named endpoints (hostnames,
literal addresses, or SRV records) along with rolling error accounting,
scheduled revival and a choice of selection policy. Calling code asks
the list for an endpoint with [`List::get`], uses it, then reports the
outcome back with [`Endpoint::ok`] or [`Endpoint::fail`]:

```
# #[tokio::main]
# async fn main() {
use upstream_rs::{List, Policy};

let list: List = List::new();
list.add_endpoint("mail1.example.com:25", 1, ()).unwrap();
list.add_endpoint("mail2.example.com:25", 1, ()).unwrap();
list.set_policy(Policy::RoundRobin);

if let Some(endpoint) = list.get(None) {
    // use endpoint.cur_addr() to connect, then report the outcome:
    endpoint.ok();
}
# }
```

DNS resolution is driven by the caller rather than an internal timer:
call [`List::resolve_all`] (or register the list with a [`Context`] and
call [`Context::reresolve_all`] across every list you've registered)
from whatever scheduler your application already runs. This keeps
`upstream-rs` usable from any executor rather than assuming one.

# Selection Policies

[`Policy`] chooses among a list's alive endpoints: uniform or
weight-biased random, Nginx-style smooth weighted round robin,
consistent hashing via a caller-supplied key, preferring the
highest-priority alive group (master/slave), or a simple first-alive
walk. See [`Policy`] for the full set and their semantics.

# Health Tracking and Revival

An endpoint is marked dead once `max_errors` failures ([`Limits`])
occur within `error_time`, and is scheduled to become eligible for
revival after a jittered `revive_time`. [`List::get`] and
[`List::get_except`] both run the revival sweep and the all-dead
recovery fallback (reviving every endpoint at once so the pool is
never left with zero candidates) before selecting.
*/

mod addr;
mod context;
mod endpoint;
mod error;
mod flags;
mod health;
mod limits;
mod list;
mod parse;
mod policy;
pub mod resolver;
mod select;
mod watcher;

pub use context::Context;
pub use endpoint::Endpoint;
pub use error::{ParseError, ResolveError};
pub use flags::Flags;
pub use limits::Limits;
pub use list::List;
pub use parse::{
    parse_endpoint, parse_endpoint_list, parse_nameserver, EndpointConfig, EndpointConfigObject, ParseKind,
    ParsedEndpoint,
};
pub use policy::Policy;
pub use resolver::Resolver;
pub use watcher::{FreeCallback, WatchCallback, WatchEvent, Watcher};
