use alloy_primitives::{Address, U256};
use clap::Parser;
use safe_multisig::{
    payloads::{encode_payloads, parse_broadcast},
    SafeClient,
};
use tracing::info;

use crate::common::{CommandOutput, SafeArgs};

#[derive(Debug, Parser)]
#[clap(about = "Decode a dry-run broadcast into ABI-encoded Safe payloads.")]
pub struct GetSafePayloadsCommand {
    #[arg(value_name = "NAME", help = "Script name of the `<NAME>-latest.json` dry-run broadcast.")]
    name: String,

    #[arg(value_name = "CHAIN_ID", help = "Chain the script was dry-run against.")]
    chain_id: u64,

    #[arg(value_name = "SAFE", help = "The Safe that will execute the payloads.")]
    safe: Address,

    #[arg(value_name = "NONCE", help = "Use this nonce instead of the Safe's current one.")]
    nonce: Option<U256>,

    #[clap(flatten)]
    config: SafeArgs,
}

impl GetSafePayloadsCommand {
    pub async fn execute(self) -> eyre::Result<CommandOutput> {
        let Self { name, chain_id, safe, nonce, config } = self;

        let config = config.load_config()?;
        let client = SafeClient::new(&config);

        let payloads =
            parse_broadcast(&config.broadcast_root, &name, chain_id, safe, nonce, &client).await?;
        info!(
            tx_count = %payloads.txCount,
            creation_count = %payloads.creationCount,
            total_gas = %payloads.totalGas,
            nonce = %payloads.safeNonce,
            "Decoded broadcast"
        );

        Ok(CommandOutput::Hex(encode_payloads(&payloads)))
    }
}
