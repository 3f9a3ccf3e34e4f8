use alloy_primitives::{Address, Bytes, U256};
use serde::Deserialize;
use tracing::{debug, trace};

use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::error::{Error, Result};

const BROADCAST_DIR: &str = "broadcast";
const DRY_RUN_DIR: &str = "dry-run";

/// A Foundry `forge script` broadcast log (`<name>-latest.json`).
#[derive(Debug, Clone, Deserialize)]
pub struct BroadcastRecord {
    #[serde(default)]
    pub transactions: Vec<BroadcastTransaction>,
    pub chain: u64,
    pub timestamp: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastTransaction {
    #[serde(default)]
    pub transaction_type: Option<String>,
    #[serde(default)]
    pub contract_name: Option<String>,
    #[serde(default)]
    pub contract_address: Option<Address>,
    #[serde(default)]
    pub function: Option<String>,
    #[serde(default)]
    pub arguments: Option<Vec<String>>,
    pub transaction: TransactionFields,
    #[serde(default)]
    pub additional_contracts: Vec<AdditionalContract>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransactionFields {
    #[serde(default)]
    pub to: Option<Address>,
    #[serde(default)]
    pub value: Option<U256>,
    #[serde(default)]
    pub gas: Option<U256>,
    #[serde(default, alias = "data")]
    pub input: Option<Bytes>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdditionalContract {
    pub address: Address,
}

impl BroadcastRecord {
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read(path)?;
        serde_json::from_slice(&contents)
            .map_err(|e| Error::Decode(format!("invalid broadcast file {}: {e}", path.display())))
    }
}

/// Locates `<root>/**/broadcast/**/<chain_id>/dry-run/<name>-latest.json`.
///
/// Exactly one file must match: none is [`Error::NotFound`], several is [`Error::AmbiguousMatch`].
pub fn find_broadcast(root: &Path, name: &str, chain_id: u64) -> Result<PathBuf> {
    let file_name = format!("{name}-latest.json");
    let chain_dir = chain_id.to_string();

    let mut matches = Vec::new();
    walk(root, false, &mut |path| {
        let is_match = path.file_name().is_some_and(|f| f == file_name.as_str())
            && parent_named(path, 1, DRY_RUN_DIR)
            && parent_named(path, 2, &chain_dir);
        if is_match {
            trace!(?path, "Matched broadcast file");
            matches.push(path.to_path_buf());
        }
    })?;

    let pattern = format!("{}/**/{chain_id}/{DRY_RUN_DIR}/{file_name}", root.display());
    match matches.len() {
        0 => Err(Error::NotFound(format!("Expected 1 file, got 0 for {pattern}"))),
        1 => {
            let path = matches.remove(0);
            debug!(?path, "Using broadcast file");
            Ok(path)
        }
        count => Err(Error::AmbiguousMatch { pattern, count }),
    }
}

fn parent_named(path: &Path, depth: usize, name: &str) -> bool {
    path.ancestors().nth(depth).and_then(Path::file_name).is_some_and(|f| f == name)
}

/// Visits every regular file below `dir` that lives inside a `broadcast` directory.
/// Hidden entries and symlinks are skipped.
fn walk(dir: &Path, in_broadcast: bool, visit: &mut dyn FnMut(&Path)) -> Result<()> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => return Ok(()),
        Err(e) => return Err(e.into()),
    };

    for entry in entries {
        let entry = entry?;
        let name = entry.file_name();
        if name.to_string_lossy().starts_with('.') {
            continue;
        }

        let path = entry.path();
        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            walk(&path, in_broadcast || name == BROADCAST_DIR, visit)?;
        } else if file_type.is_file() && in_broadcast {
            visit(&path);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{address, bytes};
    use tempfile::tempdir;

    fn touch(root: &Path, relative: &str) -> PathBuf {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "{}").unwrap();
        path
    }

    #[test]
    fn finds_the_single_dry_run() {
        let dir = tempdir().unwrap();
        let expected = touch(dir.path(), "broadcast/Deploy.s.sol/1/dry-run/Deploy-latest.json");
        touch(dir.path(), "broadcast/Deploy.s.sol/1/Deploy-latest.json");
        touch(dir.path(), "broadcast/Deploy.s.sol/10/dry-run/Deploy-latest.json");

        assert_eq!(find_broadcast(dir.path(), "Deploy", 1).unwrap(), expected);
    }

    #[test]
    fn zero_matches_is_not_found() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "broadcast/Deploy.s.sol/1/dry-run/Other-latest.json");

        assert!(matches!(find_broadcast(dir.path(), "Deploy", 1), Err(Error::NotFound(_))));
    }

    #[test]
    fn several_matches_are_ambiguous() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "a/broadcast/Deploy.s.sol/1/dry-run/Deploy-latest.json");
        touch(dir.path(), "b/broadcast/Deploy.s.sol/1/dry-run/Deploy-latest.json");

        assert!(matches!(
            find_broadcast(dir.path(), "Deploy", 1),
            Err(Error::AmbiguousMatch { count: 2, .. })
        ));
    }

    #[test]
    fn files_outside_broadcast_dirs_are_ignored() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "cache/Deploy.s.sol/1/dry-run/Deploy-latest.json");

        assert!(matches!(find_broadcast(dir.path(), "Deploy", 1), Err(Error::NotFound(_))));
    }

    #[test]
    fn parses_foundry_records() {
        let json = r#"{
            "transactions": [{
                "hash": null,
                "transactionType": "CREATE",
                "contractName": "Counter",
                "contractAddress": "0x5fbdb2315678afecb367f032d93f642f64180aa3",
                "function": null,
                "arguments": null,
                "transaction": {
                    "from": "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266",
                    "gas": "0x1d4c0",
                    "value": "0x0",
                    "input": "0x6080",
                    "nonce": "0x0",
                    "chainId": "0x1"
                },
                "additionalContracts": [],
                "isFixedGasLimit": false
            }],
            "receipts": [],
            "libraries": [],
            "pending": [],
            "returns": {},
            "timestamp": 1700000000,
            "chain": 1,
            "commit": "abc1234"
        }"#;

        let record: BroadcastRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.chain, 1);
        assert_eq!(record.timestamp, 1_700_000_000);

        let tx = &record.transactions[0];
        assert_eq!(tx.transaction_type.as_deref(), Some("CREATE"));
        assert_eq!(tx.contract_address, Some(address!("5fbdb2315678afecb367f032d93f642f64180aa3")));
        assert!(tx.transaction.to.is_none());
        assert_eq!(tx.transaction.gas, Some(U256::from(120_000u64)));
        assert_eq!(tx.transaction.input, Some(bytes!("6080")));
    }
}
