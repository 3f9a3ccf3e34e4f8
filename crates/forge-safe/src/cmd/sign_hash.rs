use alloy_primitives::B256;
use clap::Parser;

use crate::common::{CommandOutput, SafeArgs, SignerArgs};

#[derive(Debug, Parser)]
#[clap(about = "Sign a 32-byte hash as a personal message.")]
pub struct SignHashCommand {
    #[arg(value_name = "HASH")]
    hash: B256,

    #[clap(flatten)]
    config: SafeArgs,

    #[clap(flatten)]
    signer: SignerArgs,
}

impl SignHashCommand {
    pub async fn execute(self) -> eyre::Result<CommandOutput> {
        let Self { hash, config, signer } = self;

        let config = config.load_config()?;
        let signer = signer.connect(config.chain_id).await?;

        Ok(signer.sign_hash(hash).await?.into())
    }
}
