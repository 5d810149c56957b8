use clap::Parser;
use sqlretry_core::logging;

mod cli;

use crate::cli::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging as early as possible; fall back to stderr if the
    // state dir is unusable.
    let level = cli.log_level.as_deref();
    if let Err(err) = logging::init_logging(level) {
        logging::init_logging_stderr(level);
        tracing::warn!("file logging unavailable: {:#}", err);
    }

    if let Err(err) = cli.run().await {
        eprintln!("sqlretry error: {:#}", err);
        std::process::exit(1);
    }
}
