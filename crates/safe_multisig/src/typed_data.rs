//! EIP-712 typed data for Safe transactions and transaction-service delete requests.

use alloy_dyn_abi::TypedData;
use alloy_primitives::{Address, B256, U256};
use alloy_sol_types::{Eip712Domain, SolStruct};
use tracing::warn;

use std::borrow::Cow;

use crate::{
    consts::{DELETE_REQUEST_DOMAIN_NAME, DELETE_REQUEST_DOMAIN_VERSION, TOTP_WINDOW_SECS},
    error::Result,
    transaction_data::{Batch, DeleteRequest, OperationType, SafeTx},
};

/// Domain used by Safe contracts `>= 1.3.0`: `EIP712Domain(uint256 chainId,address verifyingContract)`.
pub fn safe_domain(safe: Address, chain_id: u64) -> Eip712Domain {
    Eip712Domain {
        name: None,
        version: None,
        chain_id: Some(U256::from(chain_id)),
        verifying_contract: Some(safe),
        salt: None,
    }
}

/// Domain the transaction service checks delete-request signatures against.
pub fn delete_request_domain(safe: Address, chain_id: u64) -> Eip712Domain {
    Eip712Domain {
        name: Some(Cow::Borrowed(DELETE_REQUEST_DOMAIN_NAME)),
        version: Some(Cow::Borrowed(DELETE_REQUEST_DOMAIN_VERSION)),
        chain_id: Some(U256::from(chain_id)),
        verifying_contract: Some(safe),
        salt: None,
    }
}

/// Builds the `SafeTx` typed data a Safe verifies for `batch`.
pub fn build_safe_tx(safe: Address, chain_id: u64, batch: &Batch) -> TypedData {
    if OperationType::from_u8(batch.operation).is_none() {
        warn!(operation = batch.operation, "Batch uses an operation the Safe does not define");
    }

    TypedData::from_struct(&SafeTx::from(batch), Some(safe_domain(safe, chain_id)))
}

/// Returns whether the batch's pre-computed `txHash` matches the typed data built for it.
pub fn verify_tx_hash(safe: Address, chain_id: u64, batch: &Batch) -> bool {
    SafeTx::from(batch).eip712_signing_hash(&safe_domain(safe, chain_id)) == batch.txHash
}

/// Current one-hour TOTP window: `floor(unix_seconds / 3600)`.
pub fn totp(unix_seconds: u64) -> u64 {
    unix_seconds / TOTP_WINDOW_SECS
}

/// Builds the `DeleteRequest` typed data for removing a pending proposal.
pub fn build_delete_request(
    safe: Address,
    chain_id: u64,
    safe_tx_hash: B256,
    unix_seconds: u64,
) -> TypedData {
    let request = DeleteRequest { safeTxHash: safe_tx_hash, totp: U256::from(totp(unix_seconds)) };

    TypedData::from_struct(&request, Some(delete_request_domain(safe, chain_id)))
}

/// Hash the signer commits to for `typed`.
pub fn signing_hash(typed: &TypedData) -> Result<B256> {
    Ok(typed.eip712_signing_hash()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{address, b256, bytes, hex, keccak256, Bytes};

    const SAFE: Address = address!("beefbeefbeefbeefbeefbeefbeefbeefbeefbeef");

    fn batch() -> Batch {
        Batch {
            to: address!("5fbdb2315678afecb367f032d93f642f64180aa3"),
            value: U256::from(1_000u64),
            data: bytes!("a9059cbb000000000000000000000000cafecafecafecafecafecafecafecafecafecafe"),
            operation: 0,
            safeTxGas: U256::ZERO,
            baseGas: U256::ZERO,
            gasPrice: U256::ZERO,
            gasToken: Address::ZERO,
            refundReceiver: Address::ZERO,
            nonce: U256::from(3u64),
            txHash: B256::ZERO,
            signature: Bytes::new(),
        }
    }

    fn word(address: Address) -> [u8; 32] {
        let mut out = [0u8; 32];
        out[12..].copy_from_slice(address.as_slice());
        out
    }

    /// Hash computed the way `GnosisSafe.getTransactionHash` does it.
    fn contract_hash(chain_id: u64, safe: Address, b: &Batch) -> B256 {
        let mut domain = hex!("47e79534a245952e8b16893a336b85a3d9ea9fa8c573f3d803afb92a79469218").to_vec();
        domain.extend_from_slice(&U256::from(chain_id).to_be_bytes::<32>());
        domain.extend_from_slice(&word(safe));
        let domain_separator = keccak256(&domain);

        let mut tx = hex!("bb8310d486368db6bd6f849402fdd73ad53d316b5a4b2644ad6efe0f941286d8").to_vec();
        tx.extend_from_slice(&word(b.to));
        tx.extend_from_slice(&b.value.to_be_bytes::<32>());
        tx.extend_from_slice(keccak256(&b.data).as_slice());
        tx.extend_from_slice(&U256::from(b.operation).to_be_bytes::<32>());
        tx.extend_from_slice(&b.safeTxGas.to_be_bytes::<32>());
        tx.extend_from_slice(&b.baseGas.to_be_bytes::<32>());
        tx.extend_from_slice(&b.gasPrice.to_be_bytes::<32>());
        tx.extend_from_slice(&word(b.gasToken));
        tx.extend_from_slice(&word(b.refundReceiver));
        tx.extend_from_slice(&b.nonce.to_be_bytes::<32>());
        let struct_hash = keccak256(&tx);

        let mut digest = vec![0x19, 0x01];
        digest.extend_from_slice(domain_separator.as_slice());
        digest.extend_from_slice(struct_hash.as_slice());
        keccak256(&digest)
    }

    #[test]
    fn safe_tx_type_hash_matches_the_contract() {
        assert_eq!(
            SafeTx::from(&batch()).eip712_type_hash(),
            b256!("bb8310d486368db6bd6f849402fdd73ad53d316b5a4b2644ad6efe0f941286d8")
        );
    }

    #[test]
    fn typed_data_hash_matches_the_contract_hash() {
        let mut b = batch();
        let expected = contract_hash(1, SAFE, &b);

        let typed = build_safe_tx(SAFE, 1, &b);
        assert_eq!(signing_hash(&typed).unwrap(), expected);

        assert!(!verify_tx_hash(SAFE, 1, &b));
        b.txHash = expected;
        assert!(verify_tx_hash(SAFE, 1, &b));
        assert!(!verify_tx_hash(SAFE, 10, &b));
    }

    #[test]
    fn safe_domain_omits_name_and_version() {
        let typed = build_safe_tx(SAFE, 1, &batch());
        assert!(typed.domain.name.is_none());
        assert!(typed.domain.version.is_none());
        assert_eq!(typed.domain.chain_id, Some(U256::from(1u64)));
        assert_eq!(typed.domain.verifying_contract, Some(SAFE));
        assert_eq!(typed.primary_type, "SafeTx");
    }

    #[test]
    fn delete_request_domain_is_named() {
        let hash = b256!("1111111111111111111111111111111111111111111111111111111111111111");
        let typed = build_delete_request(SAFE, 1, hash, 7_200);

        assert_eq!(typed.domain.name.as_deref(), Some("Safe Transaction Service"));
        assert_eq!(typed.domain.version.as_deref(), Some("1.0"));
        assert_eq!(typed.primary_type, "DeleteRequest");
        let totp: U256 = serde_json::from_value(typed.message["totp"].clone()).unwrap();
        assert_eq!(totp, U256::from(2u64));
        assert!(signing_hash(&typed).is_ok());
    }

    #[test]
    fn totp_has_no_grace_window() {
        assert_eq!(totp(3_599), 0);
        assert_eq!(totp(3_600), 1);
        assert_eq!(totp(1_700_000_000), 472_222);
    }

    #[test]
    fn unknown_operations_are_signed_unchanged() {
        let mut b = batch();
        b.operation = 7;
        let typed = build_safe_tx(SAFE, 1, &b);
        assert_eq!(typed.message["operation"], serde_json::json!(7));
        assert_eq!(signing_hash(&typed).unwrap(), contract_hash(1, SAFE, &b));
    }
}
