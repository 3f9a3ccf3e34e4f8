use clap::Parser;

use crate::common::{CommandOutput, SafeArgs, SignerArgs};

#[derive(Debug, Parser)]
#[clap(about = "Sign a UTF-8 message as a personal message.")]
pub struct SignMessageCommand {
    #[arg(value_name = "MESSAGE")]
    message: String,

    #[clap(flatten)]
    config: SafeArgs,

    #[clap(flatten)]
    signer: SignerArgs,
}

impl SignMessageCommand {
    pub async fn execute(self) -> eyre::Result<CommandOutput> {
        let Self { message, config, signer } = self;

        let config = config.load_config()?;
        let signer = signer.connect(config.chain_id).await?;

        Ok(signer.sign_message(message.as_bytes()).await?.into())
    }
}
