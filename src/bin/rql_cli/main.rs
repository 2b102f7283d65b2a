mod app;
mod context;
mod commands;
mod formatters;
mod utils;

use anyhow::Result;
use clap::Parser;
use log::info;

fn main() -> Result<()> {
    let cli = app::Cli::parse();

    // Initialize the logger; RUST_LOG still takes precedence over -v
    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    info!("Starting rql-cli");

    let result = app::run(cli);

    info!("rql-cli finished");

    result
}
