use clap::Parser;
use safe_multisig::{
    consts::{DEFAULT_FRAME_URL, DEFAULT_SIGNATURES_DIR},
    signer::connect,
    SafeConfig, SafeSigner, SignerKind, SignerOptions,
};

use std::{env, path::PathBuf};

/// Safe and relay settings shared by every command.
#[derive(Debug, Clone, Parser)]
pub struct SafeArgs {
    #[arg(long, env = "SAFE_ADDRESS", value_name = "ADDRESS", help = "The Safe account.")]
    pub safe_address: Option<String>,

    #[arg(
        long,
        env = "SAFE_CHAIN_ID",
        value_name = "CHAIN_ID",
        help = "The chain the Safe is deployed on."
    )]
    pub safe_chain_id: Option<String>,

    #[arg(
        long,
        value_name = "URL",
        help = "Override the Safe transaction service URL, including the /api/v1 prefix."
    )]
    pub relay_url: Option<String>,

    #[arg(
        long,
        value_name = "DIR",
        default_value = DEFAULT_SIGNATURES_DIR,
        help = "Where signed batches are written and looked up."
    )]
    pub signatures_dir: PathBuf,

    #[arg(
        long,
        value_name = "DIR",
        default_value = ".",
        help = "Directory searched for Foundry broadcast folders."
    )]
    pub broadcast_root: PathBuf,
}

impl SafeArgs {
    /// Resolves the settings into a [`SafeConfig`], with relative directories anchored at the
    /// working directory. Fails when the Safe address or chain is unset.
    pub fn load_config(&self) -> eyre::Result<SafeConfig> {
        let Self { safe_address, safe_chain_id, relay_url, signatures_dir, broadcast_root } = self;

        let mut config = SafeConfig::from_raw(safe_address.as_deref(), safe_chain_id.as_deref())?
            .with_signatures_dir(signatures_dir)
            .with_broadcast_root(broadcast_root)
            .anchored_at(&env::current_dir()?);
        if let Some(url) = relay_url {
            config = config.with_relay_url(url);
        }

        Ok(config)
    }
}

#[derive(Debug, Clone, Parser)]
pub struct SignerArgs {
    #[arg(
        long,
        env = "SAFE_SIGNER",
        value_name = "SIGNER",
        default_value = "local",
        help = "The signer to use: local, frame, ledger or trezor."
    )]
    pub signer: SignerKind,

    #[arg(
        long,
        env = "SAFE_SIGNER_PRIVATE_KEY",
        value_name = "KEY",
        hide_env_values = true,
        help = "Private key for the local signer."
    )]
    pub private_key: Option<String>,

    #[arg(long, value_name = "URL", default_value = DEFAULT_FRAME_URL, help = "Frame JSON-RPC endpoint.")]
    pub frame_url: String,

    #[arg(
        long,
        value_name = "INDEX",
        default_value = "0",
        help = "Account index on the hardware wallet derivation path."
    )]
    pub hd_index: usize,
}

impl SignerArgs {
    pub async fn connect(&self, chain_id: u64) -> eyre::Result<Box<dyn SafeSigner>> {
        let Self { signer, private_key, frame_url, hd_index } = self;

        let mut options = SignerOptions::new(*signer, chain_id);
        options.private_key = private_key.clone();
        options.frame_url = frame_url.clone();
        options.hd_index = *hd_index;

        Ok(connect(&options).await?)
    }
}
