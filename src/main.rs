//!
//! src/main.rs  Andrew Belles  Oct 2nd, 2025
//!
//! Entry point of the playlist loader. Builds the configuration once and
//! runs a single extract and load pass
//!

use std::process::ExitCode;

use playlist_loader::{config, logging, pipeline, LoaderError};

const SERVICE: &str = "rs-playlist-loader";

/// Line printed to stderr when the run ends in error
fn fatal_message(e: &LoaderError) -> String {
    format!("{SERVICE}: {e}")
}

async fn run() -> Result<(), LoaderError> {
    let cfgs = config::load_config()?;
    let _guard = logging::init_logging(&cfgs.logging)?;

    tracing::info!(
        service = SERVICE,
        version = %env!("CARGO_PKG_VERSION"),
        "starting"
    );

    let clients = pipeline::Clients::new(&cfgs)?;
    let summary = pipeline::Pipeline::new(&cfgs, clients).run().await
        .inspect_err(|e| tracing::error!(error = %e, "pipeline.failed"))?;

    tracing::info!(
        playlists = summary.playlists,
        rows = summary.rows,
        loaded = summary.loaded,
        "exit"
    );
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", fatal_message(&e));
            ExitCode::FAILURE
        }
    }
}
