//! Client identity resolution from request transport data.
//!
//! The limiter keys counters on whatever identifies the caller best: the
//! first entry of a forwarded-for header when a proxy chain reported one,
//! else the direct transport peer address. By default the header is trusted
//! unconditionally, matching deployments that always sit behind their own
//! proxy; an optional allow-list restricts header trust to known proxy
//! peers, since a client talking to the server directly can put anything in
//! that header.

use std::collections::HashSet;
use std::net::IpAddr;

use tracing::debug;

use crate::domain::client::ClientKey;

/// Resolves the [`ClientKey`] a request is counted against.
#[derive(Debug, Clone, Default)]
pub struct ClientResolver {
    trusted_proxies: Option<HashSet<IpAddr>>,
}

impl ClientResolver {
    /// Resolver that trusts forwarded-for headers unconditionally.
    pub fn new() -> Self {
        Self {
            trusted_proxies: None,
        }
    }

    /// Resolver that honors forwarded-for headers only when the transport
    /// peer is one of the given proxies.
    pub fn with_trusted_proxies(proxies: impl IntoIterator<Item = IpAddr>) -> Self {
        Self {
            trusted_proxies: Some(proxies.into_iter().collect()),
        }
    }

    /// Whether a header from this peer should be honored.
    fn trusts(&self, peer: IpAddr) -> bool {
        match &self.trusted_proxies {
            None => true,
            Some(proxies) => proxies.contains(&peer),
        }
    }

    /// Resolve the client key for a request.
    ///
    /// `forwarded_for` is the raw header value, if the request carried one;
    /// `peer` is the transport-level remote address. The first non-empty
    /// entry of a trusted header wins, else the peer address is the key.
    pub fn resolve(&self, forwarded_for: Option<&str>, peer: IpAddr) -> ClientKey {
        if let Some(header) = forwarded_for {
            if self.trusts(peer) {
                if let Some(first) = header.split(',').map(str::trim).find(|s| !s.is_empty()) {
                    return ClientKey::new(first);
                }
            } else {
                debug!(peer = %peer, "forwarded-for header from untrusted peer ignored");
            }
        }

        ClientKey::from(peer)
    }
}
