#![warn(
    missing_debug_implementations,
    rust_2018_idioms,
    missing_docs,
    rustdoc::broken_intra_doc_links,
    rustdoc::missing_crate_level_docs
)]

//! REST API for the application

use anyhow::Result;
use booking_mailer::infrastructure::{
    email::MailerConfig,
    http::{state::AppState, HttpServer, HttpServerConfig},
};
use clap::Parser;
use tracing::{info, warn};

/// Command-line arguments / environment variables
#[derive(Debug, Parser)]
pub struct Args {
    /// The HTTP server configuration
    #[clap(flatten)]
    pub server: HttpServerConfig,

    /// The mailer configuration
    #[clap(flatten)]
    pub mail: MailerConfig,
}

#[mutants::skip]
#[tokio::main]
async fn main() -> Result<()> {
    let dotenv = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    if let Err(e) = dotenv {
        warn!("No .env file loaded: {}", e);
    }

    let args = Args::parse();

    let state = AppState::new(args.mail.gateway());

    if let Err(e) = HttpServer::new(&args.server, state).await?.run().await {
        tracing::error!("{e:#}");

        return Err(e);
    }

    info!("Goodbye");

    Ok(())
}
