use alloy_dyn_abi::TypedData;
use alloy_primitives::{hex::ToHexExt, Address, Bytes, B256};
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, trace};

use super::{SafeSigner, SignerOutput};
use crate::error::{Error, Result};

/// Signs through the Frame desktop wallet's JSON-RPC endpoint.
///
/// Frame forwards each request to whichever account (hot or hardware) is selected in the app.
#[derive(Debug)]
pub struct FrameSigner {
    client: reqwest::Client,
    url: String,
    address: Address,
}

#[derive(Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Deserialize)]
struct RpcResponse {
    result: Option<Value>,
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

impl FrameSigner {
    /// Connects to Frame and selects the first account it exposes.
    pub async fn connect(url: &str) -> Result<Self> {
        let client = reqwest::Client::new();
        let accounts: Vec<Address> = request(&client, url, "eth_requestAccounts", json!([])).await?;
        let address = accounts
            .first()
            .copied()
            .ok_or_else(|| Error::Signer("Frame did not expose any account".to_string()))?;

        debug!(%address, "Connected to Frame");
        Ok(Self { client, url: url.to_string(), address })
    }

    pub fn address(&self) -> Address {
        self.address
    }

    async fn personal_sign(&self, message: &[u8]) -> Result<SignerOutput> {
        let params = json!([message.encode_hex_with_prefix(), self.address]);
        let signature: Bytes = request(&self.client, &self.url, "personal_sign", params).await?;

        Ok(SignerOutput { signature, address: self.address })
    }
}

#[async_trait]
impl SafeSigner for FrameSigner {
    async fn sign_hash(&self, hash: B256) -> Result<SignerOutput> {
        self.personal_sign(hash.as_slice()).await
    }

    async fn sign_message(&self, message: &[u8]) -> Result<SignerOutput> {
        self.personal_sign(message).await
    }

    async fn sign_typed_data(&self, typed: &TypedData) -> Result<SignerOutput> {
        let payload = serde_json::to_string(typed)?;
        let params = json!([self.address, payload]);
        let signature: Bytes =
            request(&self.client, &self.url, "eth_signTypedData_v4", params).await?;

        Ok(SignerOutput { signature, address: self.address })
    }
}

async fn request<T: DeserializeOwned>(
    client: &reqwest::Client,
    url: &str,
    method: &str,
    params: Value,
) -> Result<T> {
    trace!(method, "Frame request");

    let body = RpcRequest { jsonrpc: "2.0", id: 1, method, params };
    let response: RpcResponse = client
        .post(url)
        .json(&body)
        .send()
        .await
        .map_err(|e| Error::Signer(format!("Frame is not reachable at {url}: {e}")))?
        .json()
        .await
        .map_err(|e| Error::Signer(format!("Invalid response from Frame: {e}")))?;

    if let Some(RpcError { code, message }) = response.error {
        return Err(Error::Signer(format!("Frame rejected {method} ({code}): {message}")));
    }

    let result = response
        .result
        .ok_or_else(|| Error::Signer(format!("Frame returned no result for {method}")))?;
    serde_json::from_value(result)
        .map_err(|e| Error::Signer(format!("Unexpected {method} result from Frame: {e}")))
}
