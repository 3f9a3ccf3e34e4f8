mod cli;

use clap::Parser;
use cli::Cli;

fn main() {
    let cli = Cli::parse();
    let command = cli.command.name();

    if let Err(err) = cli.run() {
        eprintln!("{command} -> {err}");
        std::process::exit(1);
    }
}
