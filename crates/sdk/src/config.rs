//! Static lookup tables loaded once at startup.

use std::{collections::HashMap, path::Path, str::FromStr};

use alloy::primitives::Address;
use serde::Deserialize;

use crate::{error::LaunchpadError, types::SaleIndex};

/// Number of listings published when nothing else is configured.
pub const DEFAULT_MAX_LISTINGS: usize = 6;

#[derive(Deserialize)]
struct ChainEntry {
    factory: Option<ContractEntry>,
}

#[derive(Deserialize)]
struct ContractEntry {
    address: Option<String>,
}

/// Mapping of chain ID to the factory deployed on it.
///
/// Chains without an entry (or with an entry lacking the factory address)
/// are unsupported, which is an expected outcome of resolution rather than a
/// configuration error.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DeploymentConfig {
    factories: HashMap<u64, Address>,
}

impl DeploymentConfig {
    pub fn new(factories: impl IntoIterator<Item = (u64, Address)>) -> Self {
        Self { factories: factories.into_iter().collect() }
    }

    /// Parses `{ "<chainId>": { "factory": { "address": "0x…" } } }`.
    pub fn from_json(json: &str) -> Result<Self, LaunchpadError> {
        let entries: HashMap<u64, ChainEntry> = serde_json::from_str(json)?;
        let mut factories = HashMap::with_capacity(entries.len());
        for (chain_id, entry) in entries {
            let Some(address) = entry.factory.and_then(|f| f.address) else {
                continue;
            };
            let address = Address::from_str(&address).map_err(|err| {
                LaunchpadError::Config(format!(
                    "invalid factory address {address:?} for chain {chain_id}: {err}"
                ))
            })?;
            factories.insert(chain_id, address);
        }
        Ok(Self { factories })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, LaunchpadError> {
        Self::from_json(&read_config(path.as_ref())?)
    }

    /// Factory address configured for the chain, if any.
    pub fn factory_address(&self, chain_id: u64) -> Option<Address> {
        self.factories.get(&chain_id).copied()
    }

    /// Chains with a configured factory, ascending.
    pub fn chain_ids(&self) -> Vec<u64> {
        let mut ids: Vec<_> = self.factories.keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}

fn read_config(path: &Path) -> Result<String, LaunchpadError> {
    std::fs::read_to_string(path)
        .map_err(|err| LaunchpadError::Config(format!("reading {}: {err}", path.display())))
}

/// Image references matched to sales by creation index.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ImageTable {
    images: Vec<String>,
}

impl ImageTable {
    pub fn new(images: Vec<String>) -> Self { Self { images } }

    /// Parses a JSON array of image references.
    pub fn from_json(json: &str) -> Result<Self, LaunchpadError> {
        Ok(Self { images: serde_json::from_str(json)? })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, LaunchpadError> {
        Self::from_json(&read_config(path.as_ref())?)
    }

    /// Image for the sale created at `index`.
    pub fn get(&self, index: SaleIndex) -> Option<&str> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.images.get(i))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize { self.images.len() }

    pub fn is_empty(&self) -> bool { self.images.is_empty() }
}

/// Parameters of a synchronization.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SyncSettings {
    /// Maximum number of listings published, newest first.
    pub max_listings: usize,

    /// Number of recent sync events retained for diagnostics.
    pub event_history: usize,
}

impl Default for SyncSettings {
    fn default() -> Self { Self { max_listings: DEFAULT_MAX_LISTINGS, event_history: 32 } }
}

#[cfg(test)]
mod tests {
    use alloy::primitives::address;

    use super::*;

    #[test]
    fn test_deployment_config_from_json() {
        let config = DeploymentConfig::from_json(
            r#"{
                "31337": { "factory": { "address": "0x5FbDB2315678afecb367f032d93F642f64180aa3" } },
                "11155111": { "factory": {} },
                "1": {}
            }"#,
        )
        .unwrap();
        assert_eq!(
            config.factory_address(31337),
            Some(address!("0x5FbDB2315678afecb367f032d93F642f64180aa3"))
        );
        assert_eq!(config.factory_address(11155111), None);
        assert_eq!(config.factory_address(1), None);
        assert_eq!(config.factory_address(5), None);
        assert_eq!(config.chain_ids(), vec![31337]);
    }

    #[test]
    fn test_deployment_config_invalid_address() {
        let err = DeploymentConfig::from_json(r#"{ "1": { "factory": { "address": "0xFAC" } } }"#)
            .unwrap_err();
        assert!(matches!(err, LaunchpadError::Config(_)));
    }

    #[test]
    fn test_deployment_config_malformed() {
        assert!(matches!(
            DeploymentConfig::from_json("[1, 2]").unwrap_err(),
            LaunchpadError::Config(_)
        ));
    }

    #[test]
    fn test_image_table() {
        let images = ImageTable::from_json(r#"["a.png", "b.png"]"#).unwrap();
        assert_eq!(images.len(), 2);
        assert_eq!(images.get(0), Some("a.png"));
        assert_eq!(images.get(1), Some("b.png"));
        assert_eq!(images.get(2), None);
        assert_eq!(images.get(u64::MAX), None);
    }

    #[test]
    fn test_load() {
        let dir = std::env::temp_dir().join(format!("launchpad-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let images = dir.join("images.json");
        std::fs::write(&images, r#"["a.png"]"#).unwrap();
        assert_eq!(ImageTable::load(&images).unwrap().get(0), Some("a.png"));

        let missing = dir.join("config.json");
        let err = DeploymentConfig::load(&missing).unwrap_err();
        assert!(matches!(&err, LaunchpadError::Config(msg) if msg.contains("config.json")));
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
