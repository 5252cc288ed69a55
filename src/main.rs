use anyhow::Result;
use clap::Parser;

use remake_cli::{cli, commands, logging};

fn main() -> Result<()> {
    let args = cli::Cli::parse();
    logging::init_subscriber(args.verbose);
    let log = logging::Logger::new();

    match args.command {
        cli::Command::Create => commands::create::run(&args.global, &log),
        cli::Command::Apply => commands::apply::run(&args.global, &log),
        cli::Command::Clean => commands::clean::run(&args.global, &log),
        cli::Command::Version => {
            let version = option_env!("REMAKE_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"));
            println!("remake {version}");
            Ok(())
        }
    }
}
