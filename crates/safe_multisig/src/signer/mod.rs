//! External signing capabilities.
//!
//! Every transport (local key, Frame, Ledger, Trezor) is a [`SafeSigner`]; which one is used
//! is decided by [`SignerOptions`], never by inspecting the signer at runtime.

use alloy_dyn_abi::TypedData;
use alloy_primitives::{Address, Bytes, B256};
use alloy_signer::Signer as _;
use alloy_signer_local::PrivateKeySigner;
use async_trait::async_trait;
use tracing::debug;

use std::{fmt, str::FromStr};

use crate::{
    consts::DEFAULT_FRAME_URL,
    error::{Error, Result},
};

pub use frame::FrameSigner;

mod frame;

/// A raw 65-byte `r || s || v` signature and the address that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignerOutput {
    pub signature: Bytes,
    pub address: Address,
}

#[async_trait]
pub trait SafeSigner: Send + Sync {
    /// Signs a pre-computed 32-byte hash as an EIP-191 personal message.
    ///
    /// This is the only mode hardware wallets offer for opaque hashes; the recovery byte is
    /// returned in the 27/28 range.
    async fn sign_hash(&self, hash: B256) -> Result<SignerOutput>;

    /// Signs arbitrary bytes as an EIP-191 personal message.
    async fn sign_message(&self, message: &[u8]) -> Result<SignerOutput>;

    /// Signs EIP-712 typed data.
    async fn sign_typed_data(&self, typed: &TypedData) -> Result<SignerOutput>;
}

/// Adapter exposing any `alloy_signer::Signer` as a [`SafeSigner`].
#[derive(Debug)]
pub struct AlloySigner<S>(pub S);

#[async_trait]
impl<S> SafeSigner for AlloySigner<S>
where
    S: alloy_signer::Signer + Send + Sync,
{
    async fn sign_hash(&self, hash: B256) -> Result<SignerOutput> {
        self.sign_message(hash.as_slice()).await
    }

    async fn sign_message(&self, message: &[u8]) -> Result<SignerOutput> {
        let signature = self.0.sign_message(message).await?;

        Ok(SignerOutput {
            signature: Bytes::copy_from_slice(&signature.as_bytes()),
            address: self.0.address(),
        })
    }

    async fn sign_typed_data(&self, typed: &TypedData) -> Result<SignerOutput> {
        let signature = self.0.sign_dynamic_typed_data(typed).await?;

        Ok(SignerOutput {
            signature: Bytes::copy_from_slice(&signature.as_bytes()),
            address: self.0.address(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SignerKind {
    #[default]
    Local,
    Frame,
    Ledger,
    Trezor,
}

impl SignerKind {
    pub fn as_str(&self) -> &str {
        match self {
            SignerKind::Local => "local",
            SignerKind::Frame => "frame",
            SignerKind::Ledger => "ledger",
            SignerKind::Trezor => "trezor",
        }
    }
}

impl fmt::Display for SignerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SignerKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "local" => Ok(SignerKind::Local),
            "frame" => Ok(SignerKind::Frame),
            "ledger" => Ok(SignerKind::Ledger),
            "trezor" => Ok(SignerKind::Trezor),
            other => Err(Error::Configuration(format!("Unknown signer {other}"))),
        }
    }
}

/// Selects and configures the signing transport.
#[derive(Debug, Clone)]
pub struct SignerOptions {
    pub kind: SignerKind,
    pub private_key: Option<String>,
    pub frame_url: String,
    /// Account index on the hardware wallet's Ledger Live / Trezor Live derivation path.
    pub hd_index: usize,
    pub chain_id: u64,
}

impl SignerOptions {
    pub fn new(kind: SignerKind, chain_id: u64) -> Self {
        Self {
            kind,
            private_key: None,
            frame_url: DEFAULT_FRAME_URL.to_string(),
            hd_index: 0,
            chain_id,
        }
    }
}

/// Opens the configured signer. Hardware wallets may prompt the user here.
pub async fn connect(options: &SignerOptions) -> Result<Box<dyn SafeSigner>> {
    debug!(kind = %options.kind, "Connecting signer");

    match options.kind {
        SignerKind::Local => {
            let key = options.private_key.as_deref().ok_or_else(|| {
                Error::Configuration("A private key is required for the local signer".to_string())
            })?;
            let signer = PrivateKeySigner::from_str(key.trim())
                .map_err(|e| Error::Configuration(format!("Invalid private key: {e}")))?
                .with_chain_id(Some(options.chain_id));
            Ok(Box::new(AlloySigner(signer)))
        }
        SignerKind::Frame => Ok(Box::new(FrameSigner::connect(&options.frame_url).await?)),
        SignerKind::Ledger => connect_ledger(options).await,
        SignerKind::Trezor => connect_trezor(options).await,
    }
}

#[cfg(feature = "ledger")]
async fn connect_ledger(options: &SignerOptions) -> Result<Box<dyn SafeSigner>> {
    use alloy_signer_ledger::{HDPath, LedgerSigner};

    let signer = LedgerSigner::new(HDPath::LedgerLive(options.hd_index), Some(options.chain_id))
        .await
        .map_err(|e| Error::Signer(format!("Failed to connect to Ledger: {e}")))?;
    Ok(Box::new(AlloySigner(signer)))
}

#[cfg(not(feature = "ledger"))]
async fn connect_ledger(_options: &SignerOptions) -> Result<Box<dyn SafeSigner>> {
    Err(Error::Configuration("Ledger support is not enabled in this build".to_string()))
}

#[cfg(feature = "trezor")]
async fn connect_trezor(options: &SignerOptions) -> Result<Box<dyn SafeSigner>> {
    use alloy_signer_trezor::{HDPath, TrezorSigner};

    let signer = TrezorSigner::new(HDPath::TrezorLive(options.hd_index), Some(options.chain_id))
        .await
        .map_err(|e| Error::Signer(format!("Failed to connect to Trezor: {e}")))?;
    Ok(Box::new(AlloySigner(signer)))
}

#[cfg(not(feature = "trezor"))]
async fn connect_trezor(_options: &SignerOptions) -> Result<Box<dyn SafeSigner>> {
    Err(Error::Configuration("Trezor support is not enabled in this build".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{address, b256, PrimitiveSignature};

    // First anvil development account.
    const ANVIL_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    fn local() -> AlloySigner<PrivateKeySigner> {
        AlloySigner(PrivateKeySigner::from_str(ANVIL_KEY).unwrap())
    }

    #[tokio::test]
    async fn hash_signatures_use_the_low_recovery_range() {
        let hash = b256!("1111111111111111111111111111111111111111111111111111111111111111");
        let out = local().sign_hash(hash).await.unwrap();

        assert_eq!(out.address, address!("f39fd6e51aad88f6f4ce6ab8827279cfffb92266"));
        assert_eq!(out.signature.len(), 65);
        assert!(matches!(out.signature[64], 27 | 28));
    }

    #[tokio::test]
    async fn hash_signatures_recover_over_the_personal_message() {
        let hash = b256!("2222222222222222222222222222222222222222222222222222222222222222");
        let out = local().sign_hash(hash).await.unwrap();

        let signature = PrimitiveSignature::try_from(out.signature.as_ref()).unwrap();
        let recovered = signature.recover_address_from_msg(hash.as_slice()).unwrap();
        assert_eq!(recovered, out.address);
    }

    #[tokio::test]
    async fn local_signer_requires_a_key() {
        let options = SignerOptions::new(SignerKind::Local, 1);
        assert!(matches!(connect(&options).await, Err(Error::Configuration(_))));
    }

    #[tokio::test]
    async fn local_signer_from_options() {
        let mut options = SignerOptions::new(SignerKind::Local, 1);
        options.private_key = Some(format!("0x{ANVIL_KEY}"));
        let signer = connect(&options).await.unwrap();

        let out = signer.sign_message(b"hello").await.unwrap();
        assert_eq!(out.address, address!("f39fd6e51aad88f6f4ce6ab8827279cfffb92266"));
    }

    #[test]
    fn signer_kind_parses() {
        assert_eq!("Frame".parse::<SignerKind>().unwrap(), SignerKind::Frame);
        assert_eq!(SignerKind::Ledger.to_string(), "ledger");
        assert!("metamask".parse::<SignerKind>().is_err());
    }
}
