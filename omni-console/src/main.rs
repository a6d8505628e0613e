use std::process::ExitCode;

use clap::Parser;
use omni_console::{logging, run, Cli};
use omni_feed::FeedConfig;
use tracing::error;

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env before clap so OMNI_LOG_DIR and RUST_LOG can come from it
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    let _guard = logging::init(cli.debug);

    let config = match FeedConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match run(config, cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
