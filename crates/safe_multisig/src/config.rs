use alloy_primitives::Address;

use std::{
    path::{Component, Path, PathBuf},
    str::FromStr,
};

use crate::{
    consts::{get_transaction_service_url, DEFAULT_SIGNATURES_DIR},
    error::{Error, Result},
};

/// Settings shared by every command, resolved once at process start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafeConfig {
    pub safe_address: Address,
    pub chain_id: u64,
    /// Base URL of the Safe transaction service, including the `/api/v1` prefix.
    pub relay_url: String,
    pub signatures_dir: PathBuf,
    /// Directory searched recursively for Foundry `broadcast` folders.
    pub broadcast_root: PathBuf,
}

impl SafeConfig {
    pub fn new(safe_address: Address, chain_id: u64) -> Result<Self> {
        let relay_url = get_transaction_service_url(chain_id)?;

        Ok(Self {
            safe_address,
            chain_id,
            relay_url,
            signatures_dir: PathBuf::from(DEFAULT_SIGNATURES_DIR),
            broadcast_root: PathBuf::from("."),
        })
    }

    /// Builds the config from raw `SAFE_ADDRESS` / `SAFE_CHAIN_ID` values.
    pub fn from_raw(safe_address: Option<&str>, chain_id: Option<&str>) -> Result<Self> {
        let safe_address = safe_address
            .filter(|s| !s.is_empty())
            .ok_or_else(|| Error::Configuration("SAFE_ADDRESS not set".to_string()))?;
        let chain_id = chain_id
            .filter(|s| !s.is_empty())
            .ok_or_else(|| Error::Configuration("SAFE_CHAIN_ID not set".to_string()))?;

        let safe_address = Address::from_str(safe_address).map_err(|e| {
            Error::Configuration(format!("SAFE_ADDRESS is not a valid address: {e}"))
        })?;
        let chain_id = chain_id.trim().parse::<u64>().map_err(|e| {
            Error::Configuration(format!("SAFE_CHAIN_ID is not a valid chain id: {e}"))
        })?;

        Self::new(safe_address, chain_id)
    }

    pub fn with_relay_url(mut self, relay_url: impl Into<String>) -> Self {
        self.relay_url = relay_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_signatures_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.signatures_dir = dir.into();
        self
    }

    pub fn with_broadcast_root(mut self, dir: impl Into<PathBuf>) -> Self {
        self.broadcast_root = dir.into();
        self
    }

    /// Resolves relative directories against `cwd`.
    ///
    /// Signed batch file names are handed back to `proposeBatch`, which only uses a path
    /// verbatim when it is absolute and under the working directory.
    pub fn anchored_at(mut self, cwd: &Path) -> Self {
        self.signatures_dir = anchor(cwd, &self.signatures_dir);
        self.broadcast_root = anchor(cwd, &self.broadcast_root);
        self
    }
}

fn anchor(cwd: &Path, dir: &Path) -> PathBuf {
    if dir.is_absolute() {
        return dir.to_path_buf();
    }

    dir.components().fold(cwd.to_path_buf(), |path, component| match component {
        Component::CurDir => path,
        other => path.join(other),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    #[test]
    fn missing_values_are_configuration_errors() {
        let err = SafeConfig::from_raw(None, Some("1")).unwrap_err();
        assert!(matches!(err, Error::Configuration(msg) if msg.contains("SAFE_ADDRESS")));

        let err = SafeConfig::from_raw(Some("0x000000000000000000000000000000000000beef"), None)
            .unwrap_err();
        assert!(matches!(err, Error::Configuration(msg) if msg.contains("SAFE_CHAIN_ID")));
    }

    #[test]
    fn unsupported_chain_is_rejected() {
        let err =
            SafeConfig::from_raw(Some("0x000000000000000000000000000000000000beef"), Some("31337"))
                .unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn builds_from_raw_values() {
        let config =
            SafeConfig::from_raw(Some("0x000000000000000000000000000000000000beef"), Some("137"))
                .unwrap()
                .with_relay_url("http://localhost:8000/api/v1/");

        assert_eq!(config.safe_address, address!("000000000000000000000000000000000000beef"));
        assert_eq!(config.chain_id, 137);
        assert_eq!(config.relay_url, "http://localhost:8000/api/v1");
        assert_eq!(config.signatures_dir, PathBuf::from("temp/sign"));
    }

    #[test]
    fn relative_directories_are_anchored_at_the_working_directory() {
        let cwd = Path::new("/work/project");
        let config = SafeConfig::new(address!("000000000000000000000000000000000000beef"), 1)
            .unwrap()
            .anchored_at(cwd);

        assert_eq!(config.signatures_dir, PathBuf::from("/work/project/temp/sign"));
        assert_eq!(config.broadcast_root, PathBuf::from("/work/project"));

        let config = config.with_signatures_dir("/tmp/sign").anchored_at(cwd);
        assert_eq!(config.signatures_dir, PathBuf::from("/tmp/sign"));
    }
}
