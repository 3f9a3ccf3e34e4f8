use alloy_primitives::{Address, Bytes, B256, U256};
use alloy_sol_types::SolValue;
use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::{debug, info};

use std::path::Path;

pub use config::SafeConfig;
pub use error::{Error, Result};
pub use payloads::SafeInfoSource;
pub use signer::{SafeSigner, SignerKind, SignerOptions, SignerOutput};
pub use transaction_data::{Batch, Payload, PayloadExtra, Payloads, SignedBatch};

use signing::read_signed_batch_json;
use transaction_data::{DeleteTransactionBody, SafeInfo};
use typed_data::build_delete_request;

pub mod broadcast;
pub mod config;
pub mod consts;
pub mod error;
pub mod lookup;
pub mod payloads;
pub mod signer;
pub mod signing;
pub mod transaction_data;
pub mod typed_data;
pub mod utils;

/// Client for the Safe transaction service of one chain.
pub struct SafeClient {
    chain_id: u64,
    tx_service_url: String,
    client: reqwest::Client,
}

/// Relay answer to a proposal, ABI-encoded as `(string httpStatusLine, string jsonBody)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProposeOutput {
    pub status_line: String,
    pub body: String,
}

impl ProposeOutput {
    pub fn abi_encode(&self) -> Bytes {
        (self.status_line.clone(), self.body.clone()).abi_encode_params().into()
    }

    pub fn abi_decode(data: &[u8]) -> Result<Self> {
        let (status_line, body) = <(String, String)>::abi_decode_params(data, true)?;
        Ok(Self { status_line, body })
    }
}

impl SafeClient {
    pub fn new(config: &SafeConfig) -> Self {
        Self {
            chain_id: config.chain_id,
            tx_service_url: config.relay_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// `GET /safes/{address}/`
    pub async fn safe_info(&self, safe: Address) -> Result<SafeInfo> {
        let url = format!("{}/safes/{}/", self.tx_service_url, safe.to_checksum(None));
        debug!(%url, "Fetching Safe info");

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(Error::RemoteService(format!(
                "Failed to fetch Safe info: {status} - {text}"
            )));
        }

        Ok(response.json().await?)
    }

    /// Submits a signed batch file verbatim as a new multisig transaction.
    pub async fn propose_transaction(&self, signed_batch: &Path) -> Result<ProposeOutput> {
        let (signed, body) = read_signed_batch_json(signed_batch)?;

        let url = format!(
            "{}/safes/{}/multisig-transactions/",
            self.tx_service_url,
            signed.safe.to_checksum(None)
        );
        info!(%url, tx_hash = %signed.contract_transaction_hash, "Proposing signed batch");

        let response = self.client.post(&url).json(&body).send().await?;
        let status_line = status_line(response.status());
        let body = response.text().await?;

        debug!(%status_line, "Transaction service answered");
        Ok(ProposeOutput { status_line, body })
    }

    /// Signs a `DeleteRequest` for `safe_tx_hash` and removes the pending proposal.
    ///
    /// Returns the reason phrase of the response status.
    pub async fn delete_transaction<S: SafeSigner + ?Sized>(
        &self,
        safe: Address,
        safe_tx_hash: B256,
        signer: &S,
        unix_seconds: u64,
    ) -> Result<String> {
        let typed = build_delete_request(safe, self.chain_id, safe_tx_hash, unix_seconds);
        let SignerOutput { signature, .. } = signer.sign_typed_data(&typed).await?;

        let url = format!("{}/transactions/{safe_tx_hash}/", self.tx_service_url);
        info!(%url, "Deleting pending transaction");

        let body = DeleteTransactionBody { signature, safe_tx_hash };
        let response = self.client.delete(&url).json(&body).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::RemoteService(response.text().await?));
        }

        Ok(status.canonical_reason().unwrap_or_default().to_string())
    }
}

#[async_trait]
impl SafeInfoSource for SafeClient {
    async fn nonce(&self, safe: Address) -> Result<U256> {
        Ok(self.safe_info(safe).await?.nonce)
    }

    async fn version(&self, safe: Address) -> Result<String> {
        Ok(self.safe_info(safe).await?.version)
    }
}

fn status_line(status: StatusCode) -> String {
    format!("{}: {}", status.as_u16(), status.canonical_reason().unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_lines_follow_the_fetch_format() {
        assert_eq!(status_line(StatusCode::CREATED), "201: Created");
        assert_eq!(status_line(StatusCode::UNPROCESSABLE_ENTITY), "422: Unprocessable Entity");
    }

    #[test]
    fn propose_output_round_trips() {
        let output =
            ProposeOutput { status_line: "201: Created".to_string(), body: "{}".to_string() };
        assert_eq!(ProposeOutput::abi_decode(&output.abi_encode()).unwrap(), output);
    }
}
