use alloy_primitives::B256;
use clap::Parser;
use safe_multisig::signing::safe_sign;

use crate::common::{CommandOutput, SafeArgs, SignerArgs};

#[derive(Debug, Parser)]
#[clap(about = "Sign a Safe transaction hash as an eth_sign approval.")]
pub struct SafeSignCommand {
    #[arg(value_name = "HASH", help = "The Safe transaction hash.")]
    hash: B256,

    #[clap(flatten)]
    config: SafeArgs,

    #[clap(flatten)]
    signer: SignerArgs,
}

impl SafeSignCommand {
    pub async fn execute(self) -> eyre::Result<CommandOutput> {
        let Self { hash, config, signer } = self;

        let config = config.load_config()?;
        let signer = signer.connect(config.chain_id).await?;

        Ok(safe_sign(signer.as_ref(), hash).await?.into())
    }
}
