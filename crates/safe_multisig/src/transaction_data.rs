use alloy_primitives::{Address, Bytes, B256, U256};
use alloy_sol_types::sol;
use serde::{Deserialize, Serialize};

use crate::utils::{checksummed, plain_integer};

sol! {
    /// The literal call a Safe executes for one broadcast transaction.
    #[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
    struct Payload {
        address to;
        uint256 value;
        bytes data;
    }

    /// Descriptive metadata kept alongside each [`Payload`].
    #[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
    struct PayloadExtra {
        string name;
        address contractAddr;
        string transactionType;
        string func;
        string funcSig;
        string[] args;
        address[] creations;
        uint256 gas;
    }

    /// A broadcast record decoded into Safe payloads, plus aggregates.
    #[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
    struct Payloads {
        Payload[] payloads;
        PayloadExtra[] extras;
        uint256 txCount;
        uint256 creationCount;
        uint256 totalGas;
        uint256 safeNonce;
        string safeVersion;
        uint256 timestamp;
        uint256 chainId;
    }

    /// A single Safe transaction handed over for signing.
    #[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
    struct Batch {
        address to;
        uint256 value;
        bytes data;
        uint8 operation;
        uint256 safeTxGas;
        uint256 baseGas;
        uint256 gasPrice;
        address gasToken;
        address refundReceiver;
        uint256 nonce;
        bytes32 txHash;
        bytes signature;
    }

    /// EIP-712 message verified by `GnosisSafe.execTransaction`. Field order is part of the hash.
    #[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
    struct SafeTx {
        address to;
        uint256 value;
        bytes data;
        uint8 operation;
        uint256 safeTxGas;
        uint256 baseGas;
        uint256 gasPrice;
        address gasToken;
        address refundReceiver;
        uint256 nonce;
    }

    /// EIP-712 message the transaction service expects when deleting a proposal.
    #[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
    struct DeleteRequest {
        bytes32 safeTxHash;
        uint256 totp;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperationType {
    Call = 0,
    DelegateCall = 1,
}

impl OperationType {
    /// Returns `None` for values the Safe does not define; they are still signed as-is.
    pub fn from_u8(operation: u8) -> Option<Self> {
        match operation {
            0 => Some(Self::Call),
            1 => Some(Self::DelegateCall),
            _ => None,
        }
    }
}

impl From<&Batch> for SafeTx {
    fn from(batch: &Batch) -> Self {
        Self {
            to: batch.to,
            value: batch.value,
            data: batch.data.clone(),
            operation: batch.operation,
            safeTxGas: batch.safeTxGas,
            baseGas: batch.baseGas,
            gasPrice: batch.gasPrice,
            gasToken: batch.gasToken,
            refundReceiver: batch.refundReceiver,
            nonce: batch.nonce,
        }
    }
}

/// The signed batch persisted between `signBatch` and `proposeBatch`.
///
/// Serializes to the exact body the transaction service accepts on
/// `POST /safes/{address}/multisig-transactions/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedBatch {
    #[serde(with = "checksummed")]
    pub to: Address,
    #[serde(with = "plain_integer")]
    pub value: U256,
    pub data: Bytes,
    pub operation: u8,
    #[serde(with = "plain_integer")]
    pub safe_tx_gas: U256,
    #[serde(with = "plain_integer")]
    pub base_gas: U256,
    #[serde(with = "plain_integer")]
    pub gas_price: U256,
    #[serde(with = "checksummed")]
    pub gas_token: Address,
    #[serde(with = "checksummed")]
    pub refund_receiver: Address,
    #[serde(with = "plain_integer")]
    pub nonce: U256,
    #[serde(with = "checksummed")]
    pub safe: Address,
    #[serde(with = "checksummed")]
    pub sender: Address,
    pub signature: Bytes,
    pub contract_transaction_hash: B256,
}

impl SignedBatch {
    pub fn new(batch: &Batch, safe: Address, sender: Address, signature: Bytes) -> Self {
        Self {
            to: batch.to,
            value: batch.value,
            data: batch.data.clone(),
            operation: batch.operation,
            safe_tx_gas: batch.safeTxGas,
            base_gas: batch.baseGas,
            gas_price: batch.gasPrice,
            gas_token: batch.gasToken,
            refund_receiver: batch.refundReceiver,
            nonce: batch.nonce,
            safe,
            sender,
            signature,
            contract_transaction_hash: batch.txHash,
        }
    }
}

/// Subset of `GET /safes/{address}/` the payload codec needs.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SafeInfo {
    #[serde(with = "plain_integer")]
    pub nonce: U256,
    pub version: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteTransactionBody {
    pub signature: Bytes,
    pub safe_tx_hash: B256,
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{address, b256, bytes};

    #[test]
    fn signed_batch_json_shape() {
        let batch = Batch {
            to: address!("5fbdb2315678afecb367f032d93f642f64180aa3"),
            value: U256::from(1_000u64),
            data: bytes!("a9059cbb"),
            operation: 0,
            safeTxGas: U256::ZERO,
            baseGas: U256::ZERO,
            gasPrice: U256::ZERO,
            gasToken: Address::ZERO,
            refundReceiver: Address::ZERO,
            nonce: U256::from(7u64),
            txHash: b256!("1111111111111111111111111111111111111111111111111111111111111111"),
            signature: Bytes::new(),
        };
        let signed = SignedBatch::new(
            &batch,
            address!("000000000000000000000000000000000000beef"),
            address!("000000000000000000000000000000000000cafe"),
            bytes!("01"),
        );

        let json = serde_json::to_value(&signed).unwrap();
        assert_eq!(json["to"], "0x5FbDB2315678afecb367f032d93F642f64180aa3");
        assert_eq!(json["value"], 1000);
        assert_eq!(json["safeTxGas"], 0);
        assert_eq!(json["nonce"], 7);
        assert_eq!(json["operation"], 0);
        assert_eq!(json["data"], "0xa9059cbb");
        assert_eq!(json["safe"], "0x000000000000000000000000000000000000bEEF");
        assert_eq!(
            json["contractTransactionHash"],
            "0x1111111111111111111111111111111111111111111111111111111111111111"
        );

        let back: SignedBatch = serde_json::from_value(json).unwrap();
        assert_eq!(back, signed);
    }

    #[test]
    fn safe_info_accepts_string_and_number_nonces() {
        let info: SafeInfo = serde_json::from_str(r#"{"nonce":"12","version":"1.3.0"}"#).unwrap();
        assert_eq!(info.nonce, U256::from(12u64));

        let info: SafeInfo =
            serde_json::from_str(r#"{"nonce":3,"version":"1.4.1","threshold":2}"#).unwrap();
        assert_eq!(info.nonce, U256::from(3u64));
        assert_eq!(info.version, "1.4.1");
    }

    #[test]
    fn unknown_operations_are_not_mapped() {
        assert_eq!(OperationType::from_u8(0), Some(OperationType::Call));
        assert_eq!(OperationType::from_u8(1), Some(OperationType::DelegateCall));
        assert_eq!(OperationType::from_u8(2), None);
    }
}
