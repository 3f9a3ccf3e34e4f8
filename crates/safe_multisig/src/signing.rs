//! Batch signing: `Decoded -> Hashed -> Signed -> Persisted -> Encoded`.
//!
//! The signed batch file is the only side effect and is written after every fallible
//! step before it has succeeded.

use alloy_primitives::{Address, Bytes, B256};
use alloy_sol_types::SolValue;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, trace, warn};

use std::{
    fmt, fs,
    path::{Path, PathBuf},
};

use crate::{
    consts::SIGNED_BATCH_SUFFIX,
    error::{Error, Result},
    signer::{SafeSigner, SignerOutput},
    transaction_data::{Batch, SignedBatch},
    typed_data::verify_tx_hash,
};

/// Offset between the 27/28 recovery ids of a personal-message signature and the
/// 31/32 ids a Safe reads as "`eth_sign` over the transaction hash".
pub const ETH_SIGN_V_OFFSET: u8 = 4;

/// Moves the recovery byte of a personal-message signature into the `eth_sign` range.
///
/// The offset is applied unconditionally. A signature that already carries 31/32 ends up
/// at 35/36, which the Safe rejects; this is logged but not corrected.
pub fn adjust_recovery_byte(signature: &[u8]) -> Result<Bytes> {
    let (v, rest) = signature
        .split_last()
        .ok_or_else(|| Error::Signer("Signer returned an empty signature".to_string()))?;

    if *v > 28 {
        warn!(v, "Signature recovery byte is already outside 27/28, adjusting anyway");
    }
    let adjusted = v.checked_add(ETH_SIGN_V_OFFSET).ok_or_else(|| {
        Error::Signer(format!("Signature recovery byte {v:#04x} cannot be adjusted"))
    })?;

    let mut out = rest.to_vec();
    out.push(adjusted);
    Ok(out.into())
}

/// Signs `hash` and adjusts the recovery byte so a Safe accepts it as an approval.
pub async fn safe_sign<S: SafeSigner + ?Sized>(signer: &S, hash: B256) -> Result<SignerOutput> {
    let SignerOutput { signature, address } = signer.sign_hash(hash).await?;
    let signature = adjust_recovery_byte(&signature)?;

    debug!(%address, %hash, "Signed Safe transaction hash");
    Ok(SignerOutput { signature, address })
}

/// Path of the signed batch file for a run started at `timestamp`.
pub fn signed_batch_path(signatures_dir: &Path, timestamp: u64, chain_id: u64) -> PathBuf {
    signatures_dir.join(format!("{timestamp}-{chain_id}-{SIGNED_BATCH_SUFFIX}.json"))
}

/// Result of a signing run, ABI-encoded as `(string fileName, bytes signature, address signer)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignBatchOutput {
    pub file_name: String,
    pub signature: Bytes,
    pub signer: Address,
}

impl SignBatchOutput {
    pub fn abi_encode(&self) -> Bytes {
        (self.file_name.clone(), self.signature.clone(), self.signer).abi_encode_params().into()
    }

    pub fn abi_decode(data: &[u8]) -> Result<Self> {
        let (file_name, signature, signer) =
            <(String, Bytes, Address)>::abi_decode_params(data, true)?;
        Ok(Self { file_name, signature, signer })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SigningStage {
    Decoded,
    Hashed,
    Signed,
    Persisted,
    Encoded,
}

impl fmt::Display for SigningStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stage = match self {
            SigningStage::Decoded => "decoded",
            SigningStage::Hashed => "hashed",
            SigningStage::Signed => "signed",
            SigningStage::Persisted => "persisted",
            SigningStage::Encoded => "encoded",
        };
        f.write_str(stage)
    }
}

enum State {
    Decoded(Batch),
    Hashed { batch: Batch, hash: B256 },
    Signed { batch: Batch, output: SignerOutput },
    Persisted { path: PathBuf, output: SignerOutput },
    Encoded(SignBatchOutput),
}

impl State {
    fn stage(&self) -> SigningStage {
        match self {
            State::Decoded(_) => SigningStage::Decoded,
            State::Hashed { .. } => SigningStage::Hashed,
            State::Signed { .. } => SigningStage::Signed,
            State::Persisted { .. } => SigningStage::Persisted,
            State::Encoded(_) => SigningStage::Encoded,
        }
    }
}

/// One signing run for an ABI-encoded [`Batch`].
pub struct BatchSigning<'a, S: SafeSigner + ?Sized> {
    signer: &'a S,
    signatures_dir: PathBuf,
    safe: Address,
    chain_id: u64,
    timestamp: u64,
}

impl<'a, S: SafeSigner + ?Sized> BatchSigning<'a, S> {
    pub fn new(
        signer: &'a S,
        signatures_dir: impl Into<PathBuf>,
        safe: Address,
        chain_id: u64,
        timestamp: u64,
    ) -> Self {
        Self { signer, signatures_dir: signatures_dir.into(), safe, chain_id, timestamp }
    }

    /// Drives the run to [`SigningStage::Encoded`]. Any failure aborts the run.
    pub async fn run(&self, data: &[u8]) -> Result<SignBatchOutput> {
        let mut state = State::Decoded(decode_batch(data)?);

        loop {
            trace!(stage = %state.stage(), "Batch signing");
            state = match state {
                State::Encoded(output) => return Ok(output),
                state => self.step(state).await?,
            };
        }
    }

    async fn step(&self, state: State) -> Result<State> {
        match state {
            State::Decoded(batch) => {
                if !verify_tx_hash(self.safe, self.chain_id, &batch) {
                    warn!(
                        tx_hash = %batch.txHash,
                        safe = %self.safe,
                        chain_id = self.chain_id,
                        "Batch txHash does not match its SafeTx typed data"
                    );
                }
                let hash = batch.txHash;
                Ok(State::Hashed { batch, hash })
            }
            State::Hashed { batch, hash } => {
                let output = safe_sign(self.signer, hash).await?;
                Ok(State::Signed { batch, output })
            }
            State::Signed { batch, output } => {
                let signed =
                    SignedBatch::new(&batch, self.safe, output.address, output.signature.clone());
                let path = signed_batch_path(&self.signatures_dir, self.timestamp, self.chain_id);
                write_signed_batch(&path, &signed)?;
                Ok(State::Persisted { path, output })
            }
            State::Persisted { path, output } => Ok(State::Encoded(SignBatchOutput {
                file_name: path.display().to_string(),
                signature: output.signature,
                signer: output.address,
            })),
            State::Encoded(output) => Ok(State::Encoded(output)),
        }
    }
}

/// ABI-decodes a single `Batch` tuple parameter.
pub fn decode_batch(data: &[u8]) -> Result<Batch> {
    Ok(Batch::abi_decode(data, true)?)
}

pub fn encode_batch(batch: &Batch) -> Bytes {
    batch.abi_encode().into()
}

fn write_signed_batch(path: &Path, signed: &SignedBatch) -> Result<()> {
    let contents = serde_json::to_vec(signed)?;
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)
            .map_err(|source| Error::UnableToWriteFile { path: path.to_path_buf(), source })?;
    }
    fs::write(path, contents)
        .map_err(|source| Error::UnableToWriteFile { path: path.to_path_buf(), source })?;

    info!(path = %path.display(), "Wrote signed batch");
    Ok(())
}

/// Reads a signed batch written by a previous signing run.
pub fn read_signed_batch(path: &Path) -> Result<SignedBatch> {
    Ok(read_signed_batch_json(path)?.0)
}

/// Reads a signed batch together with the JSON document exactly as it was persisted.
pub fn read_signed_batch_json(path: &Path) -> Result<(SignedBatch, Value)> {
    let invalid = |e: serde_json::Error| {
        Error::Decode(format!("invalid signed batch {}: {e}", path.display()))
    };

    let contents = fs::read(path)?;
    let json: Value = serde_json::from_slice(&contents).map_err(invalid)?;
    let signed = SignedBatch::deserialize(&json).map_err(invalid)?;

    Ok((signed, json))
}
