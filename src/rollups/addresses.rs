//! Well-known rollups framework addresses.

use std::collections::HashSet;

pub use crate::config::schema::NetworkAddresses;

/// True when `address` is `0x` followed by 40 hex characters.
pub fn is_valid_address(address: &str) -> bool {
    address.len() == 42
        && (address.starts_with("0x") || address.starts_with("0X"))
        && address[2..].bytes().all(|b| b.is_ascii_hexdigit())
}

/// Lowercased set of framework contract addresses used by the catch-all
/// rollups route.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KnownAddresses {
    addresses: HashSet<String>,
}

impl KnownAddresses {
    pub fn new<I, S>(addresses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            addresses: addresses
                .into_iter()
                .map(|a| a.as_ref().to_ascii_lowercase())
                .filter(|a| !a.is_empty())
                .collect(),
        }
    }

    pub fn contains(&self, address: &str) -> bool {
        self.addresses.contains(&address.to_ascii_lowercase())
    }

    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }
}

impl From<&NetworkAddresses> for KnownAddresses {
    fn from(network: &NetworkAddresses) -> Self {
        KnownAddresses::new(network.entries().into_iter().map(|(_, address)| address))
    }
}
