//! Reference CLI: runs the handshake against a server, then either
//! echoes a message through `/session/test` or uploads a file.

use std::fs::File;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use secchan::config::Config;
use secchan::handshake::Idle;
use secchan::http::wire::FileCategory;
use secchan::http::HttpTransport;

#[derive(Parser)]
#[command(name = "handshake-client", about = "Drives a secure-channel session against a server")]
struct Cli {
    /// Base URL of the server, e.g. `https://example.test`.
    #[arg(long)]
    server: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Handshake, then send a message through `/session/test` and print the echo.
    Echo {
        /// Message to send as the frame payload.
        message: String,
    },
    /// Handshake, then upload a file as an encrypted blob.
    Upload {
        /// Path to the file to upload.
        file: PathBuf,
        /// `X-File-Category` value.
        #[arg(long, value_enum, default_value = "unknown")]
        category: Category,
        /// Bearer token for the upload endpoint.
        #[arg(long)]
        token: String,
    },
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum Category {
    Photo,
    Video,
    Text,
    Unknown,
}

impl From<Category> for FileCategory {
    fn from(value: Category) -> Self {
        match value {
            Category::Photo => FileCategory::Photo,
            Category::Video => FileCategory::Video,
            Category::Text => FileCategory::Text,
            Category::Unknown => FileCategory::Unknown,
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Err(err) = run(cli) {
        tracing::error!("{err}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

fn run(cli: Cli) -> secchan::Result<()> {
    let config = Config::default();
    let transport = HttpTransport::new(cli.server, &config)?;

    let (await_init, m1) = Idle::new(config.clone()).begin()?;
    let init_response = transport.handshake_init(&m1)?;
    let client_id = init_response.client_id.clone();

    let (await_finalize, m2) = await_init.on_init_response(init_response)?;
    let finalize_response = transport.handshake_finalize(&client_id, &m2, config.finalize_timeout)?;
    let established = await_finalize.on_finalize_response(finalize_response)?;
    let session = established.session;

    tracing::info!("handshake established, client_id = `{client_id}`");

    match cli.command {
        Command::Echo { message } => {
            let (encrypted_message, client_signature) = session.seal(message.as_bytes())?;
            let plaintext = transport.session_test(&client_id, &encrypted_message, &client_signature, None)?;
            println!("{plaintext}");
        }
        Command::Upload { file, category, token } => {
            let filename = file
                .file_name()
                .and_then(|name| name.to_str())
                .unwrap_or("upload.bin")
                .to_string();

            let handle = File::open(&file).map_err(|err| secchan::Error::TransportError(err.to_string()))?;
            let response = transport.upload_file(
                &client_id,
                &token,
                &filename,
                "application/octet-stream",
                category.into(),
                session.k_enc(),
                session.k_mac(),
                handle,
            )?;

            println!("{} -> {}", response.name, response.url);
        }
    }

    Ok(())
}
