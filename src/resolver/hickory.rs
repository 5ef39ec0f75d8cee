//! [`Resolver`] implementation backed by `hickory-resolver`.

use super::{Resolver, SrvTarget};
use crate::error::ResolveError;
use async_trait::async_trait;
use hickory_resolver::name_server::ConnectionProvider;
use std::net::IpAddr;

#[async_trait]
impl<P> Resolver for hickory_resolver::Resolver<P>
where
    P: ConnectionProvider,
{
    async fn lookup_ip(&self, host: &str) -> Result<Vec<IpAddr>, ResolveError> {
        let lookup = self.lookup_ip(host).await.map_err(|err| ResolveError::Lookup {
            name: host.to_string(),
            source: Box::new(err),
        })?;
        Ok(lookup.into_iter().collect())
    }

    async fn lookup_srv(&self, name: &str) -> Result<Vec<SrvTarget>, ResolveError> {
        let lookup = self.srv_lookup(name).await.map_err(|err| ResolveError::Lookup {
            name: name.to_string(),
            source: Box::new(err),
        })?;
        Ok(lookup
            .into_iter()
            .map(|srv| SrvTarget {
                target: srv.target().to_utf8(),
                port: srv.port(),
                priority: srv.priority(),
                weight: srv.weight(),
            })
            .collect())
    }
}

/// A [`hickory_resolver::TokioResolver`] configured from the system's
/// `/etc/resolv.conf`, convenient for hosts that don't need custom
/// nameserver configuration.
pub fn system_resolver() -> Result<hickory_resolver::TokioResolver, ResolveError> {
    hickory_resolver::TokioResolver::tokio_from_system_conf().map_err(|err| ResolveError::Lookup {
        name: "<system-conf>".to_string(),
        source: Box::new(err),
    })
}
