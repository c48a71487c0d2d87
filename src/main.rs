//! dpshield: differentially private queries over JSON datasets
//!
//! Main entry point for the command-line tool.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use dpshield::cli::{self, Cli};
use dpshield::DpConfig;

fn main() -> Result<()> {
    // Initialize logging.
    //
    // stdout carries the JSON result, so logs go to stderr unless
    // DPSHIELD_LOG_MODE=file sends them to DPSHIELD_LOG_FILE.
    let log_mode = std::env::var("DPSHIELD_LOG_MODE").unwrap_or_else(|_| "stderr".to_string());

    let (writer, _guard) = if log_mode == "file" {
        let log_file = std::env::var("DPSHIELD_LOG_FILE").unwrap_or_else(|_| "dpshield.log".to_string());

        if let Some(parent) = std::path::Path::new(&log_file).parent() {
            // Best-effort: don't fail startup just because the directory is missing.
            let _ = std::fs::create_dir_all(parent);
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)?;
        tracing_appender::non_blocking(file)
    } else {
        tracing_appender::non_blocking(std::io::stderr())
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(writer))
        .init();

    let cli = Cli::parse();
    let config = DpConfig::process();
    tracing::debug!(?config, "loaded configuration");

    let output = cli::execute(cli, config)?;
    println!("{output}");
    Ok(())
}
