use std::path::PathBuf;

use clap::Parser;
use installation_guard_cli::{config::InputArgs, errors::EXIT_SUCCESS, execute, logging};
use tracing::error;

/// installation-guard: keep sensitive repositories out of a GitHub App installation
#[derive(Parser)]
#[command(name = "installation-guard")]
#[command(
    about = "Keep sensitive repositories out of a GitHub App installation",
    long_about = None
)]
struct Cli {
    #[command(flatten)]
    inputs: InputArgs,

    /// Optional TOML file supplying any input; flags and environment values win
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    logging::init();

    let cli = Cli::parse();
    match execute(&cli.inputs, cli.config.as_deref()).await {
        Ok(_) => std::process::exit(EXIT_SUCCESS),
        Err(e) => {
            error!("{e}");
            std::process::exit(e.exit_code());
        }
    }
}
