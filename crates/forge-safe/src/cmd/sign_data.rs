use alloy_dyn_abi::TypedData;
use clap::Parser;
use eyre::WrapErr;

use crate::common::{CommandOutput, SafeArgs, SignerArgs};

#[derive(Debug, Parser)]
#[clap(about = "Sign EIP-712 typed data.")]
pub struct SignDataCommand {
    #[arg(value_name = "TYPED_DATA", help = "The typed data as eth_signTypedData_v4 JSON.")]
    typed_data: String,

    #[clap(flatten)]
    config: SafeArgs,

    #[clap(flatten)]
    signer: SignerArgs,
}

impl SignDataCommand {
    pub async fn execute(self) -> eyre::Result<CommandOutput> {
        let Self { typed_data, config, signer } = self;

        let typed: TypedData =
            serde_json::from_str(&typed_data).wrap_err("Invalid typed data JSON")?;

        let config = config.load_config()?;
        let signer = signer.connect(config.chain_id).await?;

        Ok(signer.sign_typed_data(&typed).await?.into())
    }
}
