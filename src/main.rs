//! Shelob main entry point
//!
//! This is the command-line interface for the Shelob site mirroring crawler.

use anyhow::Context;
use clap::Parser;
use shelob::config::{load_config_with_hash, resolve_config, Config, RawConfig};
use shelob::crawler::crawl;
use shelob::output::log_summary;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Shelob: a concurrent site mirroring crawler
///
/// Shelob starts at a base URL, saves every page it fetches under the
/// download directory and follows links that stay within the base URL.
#[derive(Parser, Debug)]
#[command(name = "shelob")]
#[command(version = "1.0.0")]
#[command(about = "A concurrent site mirroring crawler", long_about = None)]
struct Cli {
    /// Path to an optional TOML configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Number of parallel workers
    #[arg(long, env = "APP_WORKERS")]
    workers: Option<usize>,

    /// URL the crawl starts from; also limits which links are followed
    #[arg(long, env = "APP_BASEURL")]
    baseurl: Option<String>,

    /// Reuse pages already present in the download directory
    #[arg(long)]
    resume: bool,

    /// Directory downloaded pages are written under
    #[arg(long, env = "APP_DOWNLOADPATH")]
    downloadpath: Option<String>,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Cli {
    /// Settings given on the command line or through `APP_` variables
    fn overrides(&self) -> RawConfig {
        RawConfig {
            workers: self.workers,
            base_url: self.baseurl.clone(),
            resume: self.resume.then_some(true).or_else(|| env_flag("APP_RESUME")),
            download_path: self.downloadpath.clone(),
            debug: self.debug.then_some(true).or_else(|| env_flag("APP_DEBUG")),
        }
    }
}

/// Reads a boolean environment variable, ignoring values that are not booleans
fn env_flag(name: &str) -> Option<bool> {
    std::env::var(name).ok()?.trim().parse().ok()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (file, config_hash) = match &cli.config {
        Some(path) => {
            let (file, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
            (Some(file), Some(hash))
        }
        None => (None, None),
    };

    let config = resolve_config(file, cli.overrides()).context("Invalid configuration")?;

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet, config.debug);

    if config.debug {
        tracing::debug!("Debug mode enabled");
    }
    if let (Some(path), Some(hash)) = (&cli.config, &config_hash) {
        tracing::info!(
            "Configuration loaded from {} (hash: {})",
            path.display(),
            hash
        );
    }

    handle_crawl(config).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool, debug: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose.max(u8::from(debug)) {
            0 => EnvFilter::new("shelob=info,warn"),
            1 => EnvFilter::new("shelob=debug,info"),
            _ => EnvFilter::new("shelob=trace,debug"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config) -> anyhow::Result<()> {
    tracing::info!(
        "Mirroring {} into {} ({} workers, resume: {})",
        config.base_url,
        config.download_path,
        config.workers,
        config.resume
    );

    let cancel = CancellationToken::new();
    tokio::spawn(shutdown_on_signal(cancel.clone()));

    match crawl(config, cancel).await {
        Ok(summary) => {
            log_summary(&summary);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}

/// Cancels the crawl on Ctrl-C or SIGTERM
async fn shutdown_on_signal(cancel: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    tracing::info!("Shutting down due to user interrupt...");
    cancel.cancel();
}
