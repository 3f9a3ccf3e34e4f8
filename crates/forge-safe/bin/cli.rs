use clap::{
    builder::{styling::AnsiColor, Styles},
    ArgAction, Parser, Subcommand,
};
use forge_safe::{
    cmd::{
        delete_batch::DeleteBatchCommand, get_safe_payloads::GetSafePayloadsCommand,
        propose_batch::ProposeBatchCommand, safe_sign::SafeSignCommand,
        sign_batch::SignBatchCommand, sign_data::SignDataCommand, sign_hash::SignHashCommand,
        sign_message::SignMessageCommand,
    },
    common::CommandOutput,
};
use tracing_subscriber::EnvFilter;

use std::io;

/// The verbosity level.
pub type Verbosity = u8;

#[derive(Debug, Parser)]
#[command(
    name = "forge-safe",
    about = "Turn Foundry dry-run broadcasts into signed Safe multisig proposals.",
    version = env!("CARGO_PKG_VERSION"),
    term_width = 80,
    styles = get_color_style()
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, help = "Enable debug logging")]
    pub debug: bool,

    /// Verbosity level of the log messages.
    ///
    /// Pass multiple times to increase the verbosity (e.g. -v, -vv, -vvv).
    /// Overrides RUST_LOG. Logs are written to stderr.
    #[arg(help_heading = "Display options", global = true, short, long, verbatim_doc_comment, action = ArgAction::Count)]
    verbosity: Verbosity,
}

impl Cli {
    pub fn run(self) -> eyre::Result<()> {
        init_tracing(self.debug, self.verbosity)?;

        let runtime = tokio::runtime::Builder::new_multi_thread().enable_all().build()?;
        let output = runtime.block_on(self.command.execute())?;

        output.write_to(&mut io::stdout().lock())
    }
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    #[command(name = "getSafePayloads")]
    GetSafePayloads(GetSafePayloadsCommand),

    #[command(name = "proposeBatch")]
    ProposeBatch(ProposeBatchCommand),

    #[command(name = "signBatch")]
    SignBatch(SignBatchCommand),

    #[command(name = "safeSign")]
    SafeSign(SafeSignCommand),

    #[command(name = "signData")]
    SignData(SignDataCommand),

    #[command(name = "signHash")]
    SignHash(SignHashCommand),

    #[command(name = "signMessage")]
    SignMessage(SignMessageCommand),

    #[command(name = "deleteBatch")]
    DeleteBatch(DeleteBatchCommand),
}

impl Commands {
    pub fn name(&self) -> &'static str {
        match self {
            Commands::GetSafePayloads(_) => "getSafePayloads",
            Commands::ProposeBatch(_) => "proposeBatch",
            Commands::SignBatch(_) => "signBatch",
            Commands::SafeSign(_) => "safeSign",
            Commands::SignData(_) => "signData",
            Commands::SignHash(_) => "signHash",
            Commands::SignMessage(_) => "signMessage",
            Commands::DeleteBatch(_) => "deleteBatch",
        }
    }

    async fn execute(self) -> eyre::Result<CommandOutput> {
        match self {
            Commands::GetSafePayloads(cmd) => cmd.execute().await,
            Commands::ProposeBatch(cmd) => cmd.execute().await,
            Commands::SignBatch(cmd) => cmd.execute().await,
            Commands::SafeSign(cmd) => cmd.execute().await,
            Commands::SignData(cmd) => cmd.execute().await,
            Commands::SignHash(cmd) => cmd.execute().await,
            Commands::SignMessage(cmd) => cmd.execute().await,
            Commands::DeleteBatch(cmd) => cmd.execute().await,
        }
    }
}

/// Filter directive forced by the command line, if any.
fn log_directive(debug: bool, verbosity: Verbosity) -> Option<&'static str> {
    match (debug, verbosity) {
        (_, v) if v >= 3 => Some("trace"),
        (true, _) | (false, 2) => Some("debug"),
        (false, 1) => Some("info"),
        (false, _) => None,
    }
}

fn init_tracing(debug: bool, verbosity: Verbosity) -> eyre::Result<()> {
    let filter = match log_directive(debug, verbosity) {
        Some(directive) => EnvFilter::new(directive),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init()
        .map_err(|e| eyre::eyre!("Failed to install logger: {e}"))
}

fn get_color_style() -> Styles {
    Styles::styled()
        .usage(AnsiColor::Green.on_default().bold().underline())
        .header(AnsiColor::Yellow.on_default().bold().underline())
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::Green.on_default())
}
