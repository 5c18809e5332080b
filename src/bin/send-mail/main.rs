#![warn(
    missing_debug_implementations,
    rust_2018_idioms,
    missing_docs,
    rustdoc::broken_intra_doc_links,
    rustdoc::missing_crate_level_docs
)]

//! Sends a single email through the configured transport

use anyhow::{Context, Result};
use booking_mailer::{
    domain::communication::mailer::{Body, Mailer, Message, Recipients},
    infrastructure::email::MailerConfig,
};
use clap::Parser;

/// Command-line arguments / environment variables
#[derive(Debug, Parser)]
pub struct Args {
    /// Recipient address, may be repeated
    #[arg(long, required = true)]
    pub to: Vec<String>,

    /// The subject line
    #[arg(long)]
    pub subject: String,

    /// The plain text body
    #[arg(long)]
    pub text: Option<String>,

    /// The HTML body
    #[arg(long)]
    pub html: Option<String>,

    /// The mailer configuration
    #[clap(flatten)]
    pub mail: MailerConfig,
}

#[mutants::skip]
#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt::init();

    let args = Args::parse();

    let body = Body::from_parts(args.text, args.html).context("provide --text and/or --html")?;

    let to = if args.to.len() == 1 {
        Recipients::One(args.to[0].clone())
    } else {
        Recipients::Many(args.to)
    };

    let message = Message::new(to, args.subject, body);

    let result = args.mail.gateway().send_mail(&message).await?;

    println!("{}", serde_json::to_string_pretty(&result)?);

    Ok(())
}
