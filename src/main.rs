use anyhow::Result;
use clap::Parser;
use env_logger::Env;

use expenso::cli::{self, Cli};

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    cli::run(Cli::parse())
}
