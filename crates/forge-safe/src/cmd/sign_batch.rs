use alloy_primitives::{Address, Bytes};
use clap::Parser;
use safe_multisig::{signing::BatchSigning, utils::unix_timestamp};

use crate::common::{CommandOutput, SafeArgs, SignerArgs};

#[derive(Debug, Parser)]
#[clap(about = "Sign an ABI-encoded Safe batch and persist it for proposing.")]
pub struct SignBatchCommand {
    #[arg(value_name = "SAFE", help = "The Safe the batch is executed by.")]
    safe: Address,

    #[arg(value_name = "CHAIN_ID", help = "Chain of the Safe.")]
    chain_id: u64,

    #[arg(value_name = "DATA", help = "The ABI-encoded Batch.")]
    data: Bytes,

    #[clap(flatten)]
    config: SafeArgs,

    #[clap(flatten)]
    signer: SignerArgs,
}

impl SignBatchCommand {
    pub async fn execute(self) -> eyre::Result<CommandOutput> {
        let Self { safe, chain_id, data, config, signer } = self;

        let config = config.load_config()?;
        let signer = signer.connect(chain_id).await?;

        let output = BatchSigning::new(
            signer.as_ref(),
            &config.signatures_dir,
            safe,
            chain_id,
            unix_timestamp(),
        )
        .run(&data)
        .await?;

        Ok(CommandOutput::Hex(output.abi_encode()))
    }
}
