use alloy_primitives::B256;
use clap::Parser;
use safe_multisig::{utils::unix_timestamp, SafeClient};

use crate::common::{CommandOutput, SafeArgs, SignerArgs};

#[derive(Debug, Parser)]
#[clap(about = "Delete a pending proposal from the Safe transaction service.")]
pub struct DeleteBatchCommand {
    #[arg(value_name = "SAFE_TX_HASH", help = "Hash of the proposed Safe transaction.")]
    safe_tx_hash: B256,

    #[clap(flatten)]
    config: SafeArgs,

    #[clap(flatten)]
    signer: SignerArgs,
}

impl DeleteBatchCommand {
    pub async fn execute(self) -> eyre::Result<CommandOutput> {
        let Self { safe_tx_hash, config, signer } = self;

        let config = config.load_config()?;
        let signer = signer.connect(config.chain_id).await?;

        let client = SafeClient::new(&config);
        let status = client
            .delete_transaction(
                config.safe_address,
                safe_tx_hash,
                signer.as_ref(),
                unix_timestamp(),
            )
            .await?;

        Ok(CommandOutput::Text(status))
    }
}
