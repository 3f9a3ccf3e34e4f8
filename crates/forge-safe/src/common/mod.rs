pub mod args;
pub mod output;

pub use args::{SafeArgs, SignerArgs};
pub use output::CommandOutput;
