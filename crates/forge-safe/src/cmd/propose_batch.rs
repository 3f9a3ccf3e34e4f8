use clap::Parser;
use safe_multisig::{lookup::resolve_signed_batch, SafeClient};

use std::env;

use crate::common::{CommandOutput, SafeArgs};

#[derive(Debug, Parser)]
#[clap(about = "Propose a signed batch to the Safe transaction service.")]
pub struct ProposeBatchCommand {
    #[arg(
        value_name = "FILE",
        help = "Signed batch name inside the signatures directory, or a path under the working directory. Supports * and ? wildcards."
    )]
    file: String,

    #[arg(long, help = "Print the service response body instead of the ABI-encoded result.")]
    print_json: bool,

    #[clap(flatten)]
    config: SafeArgs,
}

impl ProposeBatchCommand {
    pub async fn execute(self) -> eyre::Result<CommandOutput> {
        let Self { file, print_json, config } = self;

        let config = config.load_config()?;
        let cwd = env::current_dir()?;
        let path = resolve_signed_batch(&config.signatures_dir, &cwd, &file)?;

        let output = SafeClient::new(&config).propose_transaction(&path).await?;
        if print_json {
            return Ok(CommandOutput::Text(output.body));
        }

        Ok(CommandOutput::Hex(output.abi_encode()))
    }
}
