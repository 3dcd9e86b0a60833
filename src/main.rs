mod app;
mod cli;
mod config;
mod consts;
mod core;
mod error;
mod output;
mod source;
mod utils;

use clap::Parser;

use app::{CommandContext, handle_command};
use cli::{Cli, parse_command};
use config::Config;
use error::AppError;

fn main() {
    // .env is optional
    let _ = dotenv::dotenv();

    let cli = Cli::parse();
    let config = if cli.is_quiet() {
        Config::load_quiet()
    } else {
        Config::load()
    };
    let cli = cli.with_config(&config);
    utils::init_logging(cli.debug);

    if let Err(e) = run(&cli, &config) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli, config: &Config) -> Result<(), AppError> {
    let command = parse_command(&cli.command, cli.has_custom_bounds())?;
    let ctx = CommandContext::new(cli, config)?;
    handle_command(command, &ctx)
}
