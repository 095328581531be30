//! Copies custom emoji from a Slack workspace to a Rocket.Chat instance.
//!
//! The whole run is one sequential pass: fetch Slack's catalog, log in to
//! Rocket.Chat, look up what's already there, then create or update each image
//! emoji in turn. See [import::run].

use clap::Parser;
use config::{Args, Terminal};
use dotenvy::dotenv;
use error::Failure;
use image::HttpImageSource;
use import::Report;
use std::process::ExitCode;
use tracing::{error, info, warn};

mod config;
mod de;
mod error;
mod image;
mod import;
mod rocketchat;
mod slack;

/// Application entrypoint. Initialises tracing, loads `.env`, collects
/// credentials, and runs the import.
#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_target(false)
        .compact()
        .init();

    let has_dotenv = dotenv().is_ok();
    if !has_dotenv {
        warn!("No .env found");
    }

    let config = match Args::parse().resolve(&Terminal) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    match import::run(&config, &HttpImageSource::default()).await {
        Ok(report) => {
            summarise(&report);
            ExitCode::SUCCESS
        }
        Err(Failure::Aborted { report, source }) => {
            summarise(&report);
            error!("Import aborted: {}", source);
            ExitCode::FAILURE
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn summarise(report: &Report) {
    info!("{}", summary(report));

    let failed: Vec<&str> = report.failed_names().collect();
    if !failed.is_empty() {
        warn!("Not transferred: {}", failed.join(", "));
    }
}

fn summary(report: &Report) -> String {
    format!(
        "Transferred {} of {} image emoji, skipped {} aliases or unsupported entries",
        report.created(),
        report.results.len(),
        report.skipped
    )
}
