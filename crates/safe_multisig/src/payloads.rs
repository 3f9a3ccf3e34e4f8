//! Conversion of Foundry broadcast records into ABI-encoded Safe payloads.

use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::SolValue;
use async_trait::async_trait;
use tracing::{debug, warn};

use std::path::Path;

use crate::{
    broadcast::{find_broadcast, BroadcastRecord, BroadcastTransaction},
    error::{Error, Result},
    transaction_data::{Payload, PayloadExtra, Payloads},
    utils::function_selector,
};

/// Read access to the current state of a Safe account.
#[async_trait]
pub trait SafeInfoSource: Send + Sync {
    async fn nonce(&self, safe: Address) -> Result<U256>;

    async fn version(&self, safe: Address) -> Result<String>;
}

/// Finds `<name>-latest.json` for `chain_id` below `broadcast_root` and decodes it.
pub async fn parse_broadcast<S: SafeInfoSource + ?Sized>(
    broadcast_root: &Path,
    name: &str,
    chain_id: u64,
    safe: Address,
    nonce_override: Option<U256>,
    info: &S,
) -> Result<Payloads> {
    let path = find_broadcast(broadcast_root, name, chain_id)?;
    let record = BroadcastRecord::from_file(&path)?;

    decode_broadcast(&record, name, chain_id, safe, nonce_override, info).await
}

/// Maps every broadcast transaction onto a [`Payload`] / [`PayloadExtra`] pair and
/// fills in the batch aggregates.
///
/// The Safe nonce is only queried when `nonce_override` is `None`.
pub async fn decode_broadcast<S: SafeInfoSource + ?Sized>(
    record: &BroadcastRecord,
    name: &str,
    chain_id: u64,
    safe: Address,
    nonce_override: Option<U256>,
    info: &S,
) -> Result<Payloads> {
    if record.transactions.is_empty() {
        return Err(Error::NotFound(format!(
            "No transactions found for {name} on chain {chain_id}"
        )));
    }
    if record.chain != chain_id {
        warn!(record_chain = record.chain, chain_id, "Broadcast record belongs to another chain");
    }

    let (payloads, extras): (Vec<_>, Vec<_>) =
        record.transactions.iter().map(|tx| to_payload(name, tx)).unzip();

    let safe_nonce = match nonce_override {
        Some(nonce) => nonce,
        None => info.nonce(safe).await?,
    };
    let safe_version = info.version(safe).await?;

    let creation_count = extras.iter().map(|e| e.creations.len()).sum::<usize>();
    let total_gas = sum_gas(&extras)?;

    debug!(
        tx_count = payloads.len(),
        creation_count,
        %total_gas,
        %safe_nonce,
        "Decoded broadcast record"
    );

    Ok(Payloads {
        txCount: U256::from(payloads.len()),
        creationCount: U256::from(creation_count),
        totalGas: total_gas,
        safeNonce: safe_nonce,
        safeVersion: safe_version,
        timestamp: U256::from(record.timestamp),
        chainId: U256::from(record.chain),
        payloads,
        extras,
    })
}

fn to_payload(name: &str, tx: &BroadcastTransaction) -> (Payload, PayloadExtra) {
    let func = tx.function.clone().unwrap_or_default();

    let payload = Payload {
        to: tx.transaction.to.unwrap_or(Address::ZERO),
        value: tx.transaction.value.unwrap_or_default(),
        data: tx.transaction.input.clone().unwrap_or_default(),
    };

    let extra = PayloadExtra {
        name: name.to_string(),
        contractAddr: tx.contract_address.unwrap_or(Address::ZERO),
        transactionType: tx.transaction_type.clone().unwrap_or_default(),
        funcSig: function_selector(&func),
        func,
        args: tx.arguments.clone().unwrap_or_default(),
        creations: tx.additional_contracts.iter().map(|c| c.address).collect(),
        gas: tx.transaction.gas.unwrap_or_default(),
    };

    (payload, extra)
}

impl Payloads {
    /// Checks the count and gas aggregates against the per-transaction data.
    pub fn check_invariants(&self) -> Result<()> {
        let tx_count = U256::from(self.payloads.len());
        if self.payloads.len() != self.extras.len() || self.txCount != tx_count {
            return Err(Error::Decode(format!(
                "txCount {} does not match {} payloads and {} extras",
                self.txCount,
                self.payloads.len(),
                self.extras.len()
            )));
        }

        let creations = U256::from(self.extras.iter().map(|e| e.creations.len()).sum::<usize>());
        if self.creationCount != creations {
            return Err(Error::Decode(format!(
                "creationCount {} does not match {creations} creations",
                self.creationCount
            )));
        }

        let total_gas = sum_gas(&self.extras)?;
        if self.totalGas != total_gas {
            return Err(Error::Decode(format!(
                "totalGas {} does not match summed gas {total_gas}",
                self.totalGas
            )));
        }

        Ok(())
    }
}

fn sum_gas(extras: &[PayloadExtra]) -> Result<U256> {
    extras
        .iter()
        .try_fold(U256::ZERO, |acc, e| acc.checked_add(e.gas))
        .ok_or_else(|| Error::Decode("total gas overflows uint256".to_string()))
}

/// ABI-encodes the batch as a single `Payloads` tuple parameter.
pub fn encode_payloads(payloads: &Payloads) -> Bytes {
    Bytes::from(payloads.abi_encode())
}

/// Inverse of [`encode_payloads`]; rejects bytes whose aggregates are inconsistent.
pub fn decode_payloads(data: &[u8]) -> Result<Payloads> {
    let payloads = Payloads::abi_decode(data, true)?;
    payloads.check_invariants()?;
    Ok(payloads)
}
