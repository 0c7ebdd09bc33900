//! Client identity for rate limiting.
//!
//! A [`ClientKey`] names the party a request is counted against. Keys are
//! opaque strings: typically an IP address taken from the transport peer, or
//! the first entry of a forwarded-for header when a proxy sits in front.
//! Resolution from request parts lives in
//! [`infrastructure::client`](crate::infrastructure::client).

use std::fmt;
use std::net::IpAddr;

/// Opaque identifier a client's request counters are keyed on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClientKey(String);

impl ClientKey {
    /// Create a key from any identifier string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<IpAddr> for ClientKey {
    fn from(addr: IpAddr) -> Self {
        Self(addr.to_string())
    }
}

impl From<&str> for ClientKey {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for ClientKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
